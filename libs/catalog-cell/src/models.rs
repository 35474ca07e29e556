// libs/catalog-cell/src/models.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// SERVICE CATALOG
// ==============================================================================

/// Service grouping used by the booking combination rules.
///
/// The declaration order is also the sort order, so sets of categories
/// iterate deterministically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Bridal,
    Social,
    MatureSkin,
    Hairstyle,
}

impl ServiceCategory {
    pub fn is_makeup(&self) -> bool {
        !matches!(self, ServiceCategory::Hairstyle)
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCategory::Bridal => write!(f, "BRIDAL"),
            ServiceCategory::Social => write!(f, "SOCIAL"),
            ServiceCategory::MatureSkin => write!(f, "MATURE_SKIN"),
            ServiceCategory::Hairstyle => write!(f, "HAIRSTYLE"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Minutes.
    pub duration: i32,
    pub category: ServiceCategory,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

// ==============================================================================
// TRANSPORT COSTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransportCost {
    pub district: String,
    pub cost: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog data could not be parsed: {0}")]
    InvalidData(String),
}
