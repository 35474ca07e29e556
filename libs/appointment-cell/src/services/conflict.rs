// libs/appointment-cell/src/services/conflict.rs
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::StoreError;
use crate::services::store::AppointmentStore;

/// Exact-match slot check: same date, identical time string, active status.
/// Ranges that only overlap (`"09:00 - 11:00"` vs `"10:00 - 12:00"`) do not
/// collide, since slots come from a fixed menu of disjoint ranges.
pub struct SlotConflictChecker {
    store: Arc<dyn AppointmentStore>,
}

impl SlotConflictChecker {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn is_available(&self, date: NaiveDate, time: &str) -> Result<bool, StoreError> {
        debug!("Checking slot {} {}", date, time);

        let taken = self.store.slot_taken(date, time).await?;
        if taken {
            warn!("Slot {} {} is already taken", date, time);
        }
        Ok(!taken)
    }

    /// Time strings already held by active appointments on `date`.
    pub async fn taken_slots(&self, date: NaiveDate) -> Result<Vec<String>, StoreError> {
        let mut slots: Vec<String> = self.store
            .list_by_date(date)
            .await?
            .into_iter()
            .filter(|a| a.status.is_active())
            .map(|a| a.appointment_time)
            .collect();
        slots.sort();
        slots.dedup();
        Ok(slots)
    }
}
