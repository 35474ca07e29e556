// libs/catalog-cell/src/router.rs
use axum::{routing::get, Router};

use crate::handlers::{self, CatalogState};

/// Public, read-only catalog endpoints.
pub fn catalog_routes(catalog: CatalogState) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services))
        .route("/transport-costs", get(handlers::list_transport_costs))
        .with_state(catalog)
}
