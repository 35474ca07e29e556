// libs/availability-cell/src/services/reader.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use shared_database::supabase::SupabaseClient;
use shared_models::LocationType;

use crate::models::{AvailabilityError, RegularAvailability, SpecialDate};

#[async_trait]
pub trait AvailabilityReader: Send + Sync {
    async fn regular_availability(
        &self,
        location_type: LocationType,
    ) -> Result<Vec<RegularAvailability>, AvailabilityError>;

    async fn special_dates(&self, date: NaiveDate) -> Result<Vec<SpecialDate>, AvailabilityError>;
}

pub struct SupabaseAvailability {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAvailability {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AvailabilityError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AvailabilityError::Unavailable(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| AvailabilityError::InvalidData(e.to_string()))
    }
}

#[async_trait]
impl AvailabilityReader for SupabaseAvailability {
    async fn regular_availability(
        &self,
        location_type: LocationType,
    ) -> Result<Vec<RegularAvailability>, AvailabilityError> {
        let path = format!(
            "/rest/v1/regular_availability?locationType=eq.{}&isActive=eq.true&order=dayOfWeek.asc,startTime.asc",
            location_type
        );
        self.fetch(&path).await
    }

    async fn special_dates(&self, date: NaiveDate) -> Result<Vec<SpecialDate>, AvailabilityError> {
        let path = format!("/rest/v1/special_dates?date=eq.{}", date.format("%Y-%m-%d"));
        self.fetch(&path).await
    }
}

/// Fixed schedule for dev mode and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAvailability {
    regular: Vec<RegularAvailability>,
    special: Vec<SpecialDate>,
}

impl StaticAvailability {
    pub fn new(regular: Vec<RegularAvailability>, special: Vec<SpecialDate>) -> Self {
        Self { regular, special }
    }
}

#[async_trait]
impl AvailabilityReader for StaticAvailability {
    async fn regular_availability(
        &self,
        location_type: LocationType,
    ) -> Result<Vec<RegularAvailability>, AvailabilityError> {
        Ok(self.regular.iter()
            .filter(|r| r.is_active && r.location_type == location_type)
            .cloned()
            .collect())
    }

    async fn special_dates(&self, date: NaiveDate) -> Result<Vec<SpecialDate>, AvailabilityError> {
        Ok(self.special.iter().filter(|s| s.date == date).cloned().collect())
    }
}
