use axum::{
    Json, Router,
    routing::get,
};
use serde_json::{json, Value};

use appointment_cell::{appointment_routes, AppointmentState};
use catalog_cell::catalog_routes;

async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "glam-booking-api"
    }))
}

pub fn create_router(state: AppointmentState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(catalog_routes(state.catalog.clone()))
        .nest("/appointments", appointment_routes(state))
}
