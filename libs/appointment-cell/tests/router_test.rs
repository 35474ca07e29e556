use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::services::{InMemoryAppointmentStore, InMemorySlotLock};
use appointment_cell::{appointment_routes, AppointmentState, BookingBackends};
use availability_cell::{RegularAvailability, StaticAvailability};
use catalog_cell::{Service, ServiceCategory, StaticCatalog, TransportCost};
use notification_cell::LogNotifier;
use shared_models::LocationType;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn state(config: &TestConfig) -> AppointmentState {
    let catalog = StaticCatalog::new(
        vec![
            Service {
                id: "svc_social".into(),
                name: "Social".into(),
                price: Decimal::from(200),
                duration: 120,
                category: ServiceCategory::Social,
                is_active: true,
            },
            Service {
                id: "svc_hair".into(),
                name: "Peinado".into(),
                price: Decimal::from(80),
                duration: 60,
                category: ServiceCategory::Hairstyle,
                is_active: true,
            },
        ],
        vec![TransportCost { district: "Miraflores".into(), cost: Decimal::from(30), is_active: true }],
    );

    let saturday = RegularAvailability {
        id: "sat-studio".into(),
        day_of_week: 6,
        start_time: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        location_type: LocationType::Studio,
        is_active: true,
    };

    AppointmentState::new(
        config.to_arc(),
        BookingBackends {
            catalog: Arc::new(catalog),
            availability: Arc::new(StaticAvailability::new(vec![saturday], vec![])),
            store: Arc::new(InMemoryAppointmentStore::new()),
            slot_lock: Arc::new(InMemorySlotLock::new()),
            notifier: Arc::new(LogNotifier),
        },
    )
}

fn app(config: &TestConfig) -> Router {
    Router::new().nest("/appointments", appointment_routes(state(config)))
}

fn booking_body(time: &str) -> Value {
    json!({
        "clientName": "Lucía Torres",
        "clientEmail": "lucia@example.pe",
        "clientPhone": "+51 987 654 321",
        "services": { "svc_social": 1, "svc_hair": 1 },
        "appointmentDate": "2025-12-20",
        "appointmentTime": time,
        "locationType": "STUDIO"
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_public_booking_returns_created_with_pricing() {
    let config = TestConfig::default();
    let app = app(&config);

    let response = app
        .oneshot(post_json("/appointments", &booking_body("08:00 - 13:00")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert!(body["appointmentId"].is_string());
    assert_eq!(body["pricing"]["totalPrice"], "280");
    assert_eq!(body["pricing"]["totalDuration"], 180);
}

#[tokio::test]
async fn test_duplicate_slot_is_bad_request() {
    let config = TestConfig::default();
    let app = app(&config);

    let first = app
        .clone()
        .oneshot(post_json("/appointments", &booking_body("08:00 - 13:00")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post_json("/appointments", &booking_body("08:00 - 13:00")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = json_body(second).await;
    assert!(body["error"].as_str().unwrap().contains("choose another time"));
}

#[tokio::test]
async fn test_missing_fields_get_readable_validation_error() {
    let config = TestConfig::default();

    let response = app(&config)
        .oneshot(post_json("/appointments", &json!({ "clientName": "Lucía" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "A valid email address is required");
}

#[tokio::test]
async fn test_quote_endpoint() {
    let config = TestConfig::default();

    let response = app(&config)
        .oneshot(post_json(
            "/appointments/quote",
            &json!({
                "services": { "svc_social": 1 },
                "appointmentTime": "21:00 - 23:00",
                "locationType": "HOME",
                "district": "Miraflores"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["pricing"]["totalPrice"], "250");
}

#[tokio::test]
async fn test_quote_rejects_oversized_quantity() {
    let config = TestConfig::default();

    let response = app(&config)
        .oneshot(post_json(
            "/appointments/quote",
            &json!({
                "services": { "svc_social": 3_000_000_000u32 },
                "appointmentTime": "09:00 - 11:00",
                "locationType": "STUDIO"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "A service can be booked at most 10 times");
}

#[tokio::test]
async fn test_availability_shows_windows_and_taken_slots() {
    let config = TestConfig::default();
    let app = app(&config);

    app.clone()
        .oneshot(post_json("/appointments", &booking_body("08:00 - 13:00")))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appointments/availability?date=2025-12-20&location_type=STUDIO")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["availability"]["blocked"], false);
    assert_eq!(body["availability"]["windows"].as_array().unwrap().len(), 1);
    assert_eq!(body["takenSlots"], json!(["08:00 - 13:00"]));
}

#[tokio::test]
async fn test_admin_routes_require_admin_token() {
    let config = TestConfig::default();
    let app = app(&config);

    let anonymous = app
        .clone()
        .oneshot(Request::builder().uri("/appointments?date=2025-12-20").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let client_token = JwtTestUtils::create_test_token(&TestUser::client("lucia@example.pe"), &config.jwt_secret, None);
    let forbidden = app
        .oneshot(
            Request::builder()
                .uri("/appointments?date=2025-12-20")
                .header(header::AUTHORIZATION, format!("Bearer {}", client_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_confirms_booking() {
    let config = TestConfig::default();
    let app = app(&config);
    let admin_token = JwtTestUtils::create_test_token(&TestUser::admin("admin@studio.test"), &config.jwt_secret, None);

    let created = app
        .clone()
        .oneshot(post_json("/appointments", &booking_body("15:00 - 18:00")))
        .await
        .unwrap();
    let id = json_body(created).await["appointmentId"].as_str().unwrap().to_string();

    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/appointments?date=2025-12-20")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(json_body(listed).await["total"], 1);

    let confirmed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/appointments/{}/status", id))
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "CONFIRMED" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status(), StatusCode::OK);
    assert_eq!(json_body(confirmed).await["appointment"]["status"], "CONFIRMED");

    let reopened = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/appointments/{}/status", id))
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "PENDING" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(reopened.status(), StatusCode::BAD_REQUEST);
}
