// libs/appointment-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::admin_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: AppointmentState) -> Router {
    let public_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/quote", post(handlers::quote_appointment))
        .route("/availability", get(handlers::get_availability));

    // Back office
    let admin_routes = Router::new()
        .route("/", get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))
        .layer(middleware::from_fn_with_state(state.config.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
