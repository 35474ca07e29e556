// libs/appointment-cell/src/services/booking.rs
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use catalog_cell::{CatalogError, CatalogSource, Service, TransportCost};
use notification_cell::NotificationDispatcher;
use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingError, BookingOutcome,
    PricingBreakdown, QuoteRequest, StoreError, SLOT_TAKEN_MESSAGE,
};
use crate::services::conflict::SlotConflictChecker;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::lock::{slot_key, SlotLease, SlotLock};
use crate::services::pricing::{NightShiftPolicy, PricingEngine};
use crate::services::rules::validate_categories;
use crate::services::store::AppointmentStore;
use crate::services::validation::{validate_booking_request, validate_quote_request, BookingDraft};

#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub night_shift: NightShiftPolicy,
    pub external_timeout: Duration,
    pub slot_lock_ttl: Duration,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            night_shift: NightShiftPolicy::default(),
            external_timeout: Duration::from_secs(10),
            slot_lock_ttl: Duration::from_secs(30),
        }
    }
}

impl BookingSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            night_shift: NightShiftPolicy::from_config(config),
            external_timeout: Duration::from_secs(config.external_timeout_secs),
            slot_lock_ttl: Duration::from_secs(config.slot_lock_ttl_secs),
        }
    }
}

pub struct AppointmentBookingService {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn AppointmentStore>,
    slot_lock: Arc<dyn SlotLock>,
    notifications: NotificationDispatcher,
    conflict_checker: SlotConflictChecker,
    lifecycle_service: AppointmentLifecycleService,
    pricing: PricingEngine,
    external_timeout: Duration,
    slot_lock_ttl: Duration,
}

impl AppointmentBookingService {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn AppointmentStore>,
        slot_lock: Arc<dyn SlotLock>,
        notifications: NotificationDispatcher,
        settings: BookingSettings,
    ) -> Self {
        Self {
            conflict_checker: SlotConflictChecker::new(Arc::clone(&store)),
            lifecycle_service: AppointmentLifecycleService::new(),
            pricing: PricingEngine::new(settings.night_shift),
            slot_lock_ttl: lease_ttl(settings.slot_lock_ttl, settings.external_timeout),
            external_timeout: settings.external_timeout,
            catalog,
            store,
            slot_lock,
            notifications,
        }
    }

    /// Validates, prices and stores a PENDING appointment, then notifies the
    /// studio and the client in the background.
    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<BookingOutcome, BookingError> {
        let draft = validate_booking_request(&request)?;
        debug!("Booking request for {} {} ({})", draft.appointment_date, draft.appointment_time, draft.location_type);

        let (services, transport_costs) = self.load_catalog().await?;

        let pricing = self.pricing.price(
            &draft.services,
            &services,
            draft.location_type,
            draft.district.as_deref(),
            &draft.appointment_time,
            &transport_costs,
        )?;
        self.check_rules(&pricing)?;

        let key = slot_key(draft.appointment_date, &draft.appointment_time);
        let lease = self.acquire_slot(&key).await?;

        let stored = self.check_and_insert(&draft, &pricing).await;
        self.release_slot(&lease).await;
        let appointment = stored?;

        info!(
            "Booked appointment {} for {} {} (total {})",
            appointment.id, appointment.appointment_date, appointment.appointment_time, appointment.total_price
        );

        self.notifications.spawn_booking_created(appointment.to_summary());

        Ok(BookingOutcome {
            appointment_id: appointment.id,
            pricing,
            appointment,
        })
    }

    /// Pricing and rule check for the booking form. Nothing is stored.
    pub async fn quote(&self, request: QuoteRequest) -> Result<PricingBreakdown, BookingError> {
        let (selection, location_type, district) = validate_quote_request(&request)?;
        let (services, transport_costs) = self.load_catalog().await?;

        let pricing = self.pricing.price(
            &selection,
            &services,
            location_type,
            district.as_deref(),
            &request.appointment_time,
            &transport_costs,
        )?;
        self.check_rules(&pricing)?;

        Ok(pricing)
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, BookingError> {
        self.bounded(self.store.get(id)).await?.map_err(store_error)
    }

    pub async fn list_appointments(&self, date: NaiveDate) -> Result<Vec<Appointment>, BookingError> {
        self.bounded(self.store.list_by_date(date)).await?.map_err(store_error)
    }

    /// Time ranges held by PENDING or CONFIRMED appointments on `date`.
    pub async fn taken_slots(&self, date: NaiveDate) -> Result<Vec<String>, BookingError> {
        self.bounded(self.conflict_checker.taken_slots(date)).await?.map_err(store_error)
    }

    pub async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, BookingError> {
        let current = self.get_appointment(id).await?;
        self.lifecycle_service.validate_status_transition(current.status, status)?;

        let updated = self.bounded(self.store.update_status(id, status)).await?.map_err(store_error)?;
        info!("Appointment {} moved from {} to {}", id, current.status, updated.status);
        Ok(updated)
    }

    async fn load_catalog(&self) -> Result<(Vec<Service>, Vec<TransportCost>), BookingError> {
        let loaded = self
            .bounded(async {
                tokio::try_join!(
                    self.catalog.active_services(),
                    self.catalog.active_transport_costs()
                )
            })
            .await?;

        loaded.map_err(|e: CatalogError| {
            error!("Failed to load catalog: {}", e);
            BookingError::Persistence(e.to_string())
        })
    }

    fn check_rules(&self, pricing: &PricingBreakdown) -> Result<(), BookingError> {
        let verdict = validate_categories(&pricing.categories());
        if verdict.valid {
            return Ok(());
        }

        let reason = verdict.reason.unwrap_or_default();
        warn!("Rejected service combination ({}): {}", verdict.rule.unwrap_or("?"), reason);
        Err(BookingError::Validation(reason))
    }

    async fn acquire_slot(&self, key: &str) -> Result<SlotLease, BookingError> {
        let acquired = self.bounded(self.slot_lock.acquire(key, self.slot_lock_ttl)).await?;

        match acquired {
            Ok(Some(lease)) => Ok(lease),
            Ok(None) => {
                warn!("Slot {} is being booked by another request", key);
                Err(BookingError::Conflict(SLOT_TAKEN_MESSAGE.to_string()))
            }
            Err(e) => {
                error!("Slot lock unavailable for {}: {}", key, e);
                Err(BookingError::Persistence(e.to_string()))
            }
        }
    }

    async fn release_slot(&self, lease: &SlotLease) {
        match self.bounded(self.slot_lock.release(lease)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to release slot lock {}: {}", lease.key, e),
            Err(e) => warn!("Failed to release slot lock {}: {}", lease.key, e),
        }
    }

    async fn check_and_insert(&self, draft: &BookingDraft, pricing: &PricingBreakdown) -> Result<Appointment, BookingError> {
        let available = self
            .bounded(self.conflict_checker.is_available(draft.appointment_date, &draft.appointment_time))
            .await?
            .map_err(|e| {
                error!("Conflict check failed: {}", e);
                BookingError::Persistence(e.to_string())
            })?;

        if !available {
            return Err(BookingError::Conflict(SLOT_TAKEN_MESSAGE.to_string()));
        }

        let appointment = new_appointment(draft, pricing);
        match tokio::time::timeout(self.external_timeout, self.store.insert(&appointment)).await {
            Ok(result) => result.map_err(|e| {
                error!("Failed to store appointment {}: {}", appointment.id, e);
                BookingError::Persistence(e.to_string())
            }),
            Err(_) => {
                // The row may still have been committed.
                error!(
                    "Insert of appointment {} for {} {} timed out after {:?}, outcome unknown",
                    appointment.id, appointment.appointment_date, appointment.appointment_time, self.external_timeout
                );
                Err(BookingError::Persistence(format!("insert timed out after {:?}", self.external_timeout)))
            }
        }
    }

    /// Applies the external-call timeout. Expiry is reported as a persistence failure.
    async fn bounded<T>(&self, fut: impl Future<Output = T>) -> Result<T, BookingError> {
        tokio::time::timeout(self.external_timeout, fut).await.map_err(|_| {
            error!("External call exceeded {:?}", self.external_timeout);
            BookingError::Persistence(format!("timed out after {:?}", self.external_timeout))
        })
    }
}

/// The lease must outlive the slot check and the insert, each bounded by
/// `external_timeout`, or a second request could take the slot mid-insert.
fn lease_ttl(configured: Duration, external_timeout: Duration) -> Duration {
    let minimum = external_timeout.saturating_mul(2);
    if configured < minimum {
        warn!(
            "Slot lock TTL {:?} is shorter than two external timeouts, using {:?}",
            configured, minimum
        );
        return minimum;
    }
    configured
}

fn non_zero(amount: Decimal) -> Option<Decimal> {
    (!amount.is_zero()).then_some(amount)
}

fn new_appointment(draft: &BookingDraft, pricing: &PricingBreakdown) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        client_name: draft.client_name.clone(),
        client_email: draft.client_email.clone(),
        client_phone: draft.client_phone.clone(),
        services: pricing.line_items.clone(),
        service_price: pricing.service_price,
        transport_cost: non_zero(pricing.transport_cost),
        night_shift_cost: non_zero(pricing.night_shift_cost),
        total_price: pricing.total_price,
        total_duration: pricing.total_duration,
        appointment_date: draft.appointment_date,
        appointment_time: draft.appointment_time.clone(),
        location_type: draft.location_type,
        district: draft.district.clone(),
        address: draft.address.clone(),
        address_reference: draft.address_reference.clone(),
        notes: draft.notes.clone(),
        status: AppointmentStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

fn store_error(e: StoreError) -> BookingError {
    match e {
        StoreError::NotFound => BookingError::NotFound,
        other => {
            error!("Appointment store failure: {}", other);
            BookingError::Persistence(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_ttl_covers_check_and_insert() {
        let timeout = Duration::from_secs(10);
        assert_eq!(lease_ttl(Duration::from_secs(30), timeout), Duration::from_secs(30));
        assert_eq!(lease_ttl(Duration::from_secs(20), timeout), Duration::from_secs(20));
        assert_eq!(lease_ttl(Duration::from_secs(5), timeout), Duration::from_secs(20));
    }
}
