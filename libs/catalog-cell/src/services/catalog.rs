// libs/catalog-cell/src/services/catalog.rs
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use shared_database::supabase::SupabaseClient;

use crate::models::{CatalogError, Service, TransportCost};

/// Read access to the bookable services. Only active services are returned.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn active_services(&self) -> Result<Vec<Service>, CatalogError>;
}

/// Read access to the per-district transport fees. Only active rows are returned.
#[async_trait]
pub trait TransportCostReader: Send + Sync {
    async fn active_transport_costs(&self) -> Result<Vec<TransportCost>, CatalogError>;
}

/// Everything the booking core needs from the catalog side.
pub trait CatalogSource: CatalogReader + TransportCostReader {}

impl<T: CatalogReader + TransportCostReader> CatalogSource for T {}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseCatalog {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseCatalog {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CatalogError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| CatalogError::InvalidData(e.to_string()))
    }
}

#[async_trait]
impl CatalogReader for SupabaseCatalog {
    async fn active_services(&self) -> Result<Vec<Service>, CatalogError> {
        let services: Vec<Service> = self
            .fetch("/rest/v1/services?isActive=eq.true&order=name.asc")
            .await?;
        debug!("Loaded {} active services", services.len());
        Ok(services)
    }
}

#[async_trait]
impl TransportCostReader for SupabaseCatalog {
    async fn active_transport_costs(&self) -> Result<Vec<TransportCost>, CatalogError> {
        let costs: Vec<TransportCost> = self
            .fetch("/rest/v1/transport_costs?isActive=eq.true&order=district.asc")
            .await?;
        debug!("Loaded {} active transport costs", costs.len());
        Ok(costs)
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

/// Fixed catalog used in dev mode and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    services: Vec<Service>,
    transport_costs: Vec<TransportCost>,
}

impl StaticCatalog {
    pub fn new(services: Vec<Service>, transport_costs: Vec<TransportCost>) -> Self {
        Self { services, transport_costs }
    }
}

#[async_trait]
impl CatalogReader for StaticCatalog {
    async fn active_services(&self) -> Result<Vec<Service>, CatalogError> {
        Ok(self.services.iter().filter(|s| s.is_active).cloned().collect())
    }
}

#[async_trait]
impl TransportCostReader for StaticCatalog {
    async fn active_transport_costs(&self) -> Result<Vec<TransportCost>, CatalogError> {
        Ok(self.transport_costs.iter().filter(|t| t.is_active).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceCategory;
    use rust_decimal::Decimal;

    fn service(id: &str, active: bool) -> Service {
        Service {
            id: id.to_string(),
            name: id.to_string(),
            price: Decimal::from(100),
            duration: 60,
            category: ServiceCategory::Social,
            is_active: active,
        }
    }

    #[tokio::test]
    async fn test_static_catalog_hides_inactive_rows() {
        let catalog = StaticCatalog::new(
            vec![service("on", true), service("off", false)],
            vec![
                TransportCost { district: "Miraflores".into(), cost: Decimal::from(30), is_active: true },
                TransportCost { district: "Ancón".into(), cost: Decimal::from(80), is_active: false },
            ],
        );

        let services = catalog.active_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id, "on");

        let costs = catalog.active_transport_costs().await.unwrap();
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].district, "Miraflores");
    }
}
