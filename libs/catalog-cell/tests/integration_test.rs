use std::sync::Arc;

use axum::{body::Body, http::{Request, StatusCode}};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::{catalog_routes, CatalogReader, ServiceCategory, SupabaseCatalog, TransportCostReader};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

fn supabase_for(server: &MockServer) -> Arc<SupabaseClient> {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_service_key: "service-key".to_string(),
        external_timeout_secs: 2,
        ..AppConfig::default()
    };
    Arc::new(SupabaseClient::new(&config))
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("isActive", "eq.true"))
        .and(header("apikey", "service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "svc_bridal", "name": "Novia", "price": 480, "duration": 180, "category": "BRIDAL", "isActive": true },
            { "id": "svc_social", "name": "Social", "price": 200, "duration": 120, "category": "SOCIAL", "isActive": true }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/transport_costs"))
        .and(query_param("isActive", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "district": "Miraflores", "cost": 30, "isActive": true }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_supabase_catalog_reads_active_rows() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let catalog = SupabaseCatalog::new(supabase_for(&server));

    let services = catalog.active_services().await.unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0].category, ServiceCategory::Bridal);
    assert_eq!(services[1].price, Decimal::from(200));

    let costs = catalog.active_transport_costs().await.unwrap();
    assert_eq!(costs[0].district, "Miraflores");
    assert_eq!(costs[0].cost, Decimal::from(30));
}

#[tokio::test]
async fn test_supabase_catalog_reports_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let catalog = SupabaseCatalog::new(supabase_for(&server));
    assert!(catalog.active_services().await.is_err());
}

#[tokio::test]
async fn test_services_endpoint_lists_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let app = catalog_routes(Arc::new(SupabaseCatalog::new(supabase_for(&server))));

    let response = app
        .oneshot(Request::builder().uri("/services").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["services"][0]["id"], "svc_bridal");
}

#[tokio::test]
async fn test_services_endpoint_hides_backend_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/transport_costs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("relation does not exist"))
        .mount(&server)
        .await;

    let app = catalog_routes(Arc::new(SupabaseCatalog::new(supabase_for(&server))));

    let response = app
        .oneshot(Request::builder().uri("/transport-costs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Transport costs temporarily unavailable");
}
