pub mod catalog;
pub mod transport;

pub use catalog::{CatalogReader, CatalogSource, StaticCatalog, SupabaseCatalog, TransportCostReader};
pub use transport::find_transport_cost;
