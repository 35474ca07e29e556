// libs/catalog-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::error;

use shared_models::error::AppError;

use crate::services::CatalogSource;

pub type CatalogState = Arc<dyn CatalogSource>;

pub async fn list_services(
    State(catalog): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let services = catalog.active_services().await.map_err(|e| {
        error!("Failed to load services: {}", e);
        AppError::Internal("Service catalog temporarily unavailable".to_string())
    })?;

    Ok(Json(json!({
        "services": services,
        "total": services.len()
    })))
}

pub async fn list_transport_costs(
    State(catalog): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let costs = catalog.active_transport_costs().await.map_err(|e| {
        error!("Failed to load transport costs: {}", e);
        AppError::Internal("Transport costs temporarily unavailable".to_string())
    })?;

    Ok(Json(json!({
        "transport_costs": costs,
        "total": costs.len()
    })))
}
