// libs/appointment-cell/src/state.rs
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use availability_cell::{AvailabilityReader, AvailabilityService, StaticAvailability, SupabaseAvailability};
use catalog_cell::{CatalogSource, StaticCatalog, SupabaseCatalog};
use notification_cell::{notifier_from_config, NotificationDispatcher, Notifier};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::services::booking::{AppointmentBookingService, BookingSettings};
use crate::services::lock::{InMemorySlotLock, RedisSlotLock, SlotLock};
use crate::services::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};

/// Collaborators behind the appointment routes.
pub struct BookingBackends {
    pub catalog: Arc<dyn CatalogSource>,
    pub availability: Arc<dyn AvailabilityReader>,
    pub store: Arc<dyn AppointmentStore>,
    pub slot_lock: Arc<dyn SlotLock>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogSource>,
    pub booking: Arc<AppointmentBookingService>,
    pub availability: Arc<AvailabilityService>,
}

impl AppointmentState {
    pub fn new(config: Arc<AppConfig>, backends: BookingBackends) -> Self {
        let timeout = Duration::from_secs(config.external_timeout_secs);
        let admin_email = Some(config.admin_email.clone());
        let notifications = NotificationDispatcher::new(backends.notifier, admin_email, timeout);

        let booking = AppointmentBookingService::new(
            Arc::clone(&backends.catalog),
            backends.store,
            backends.slot_lock,
            notifications,
            BookingSettings::from_config(&config),
        );

        Self {
            catalog: backends.catalog,
            booking: Arc::new(booking),
            availability: Arc::new(AvailabilityService::new(backends.availability)),
            config,
        }
    }

    /// Supabase-backed when configured, in-memory otherwise. The Redis slot
    /// lock is used when `REDIS_URL` is set and reachable.
    pub async fn from_config(config: Arc<AppConfig>) -> Self {
        let slot_lock = slot_lock_from_config(&config).await;
        let notifier = notifier_from_config(&config);

        let backends = if config.is_configured() {
            let supabase = Arc::new(SupabaseClient::new(&config));
            info!("Using Supabase at {}", supabase.get_base_url());
            BookingBackends {
                catalog: Arc::new(SupabaseCatalog::new(Arc::clone(&supabase))),
                availability: Arc::new(SupabaseAvailability::new(Arc::clone(&supabase))),
                store: Arc::new(SupabaseAppointmentStore::new(supabase)),
                slot_lock,
                notifier,
            }
        } else {
            warn!("Running with an empty in-memory catalog and appointment store");
            BookingBackends {
                catalog: Arc::new(StaticCatalog::default()),
                availability: Arc::new(StaticAvailability::default()),
                store: Arc::new(InMemoryAppointmentStore::new()),
                slot_lock,
                notifier,
            }
        };

        Self::new(config, backends)
    }
}

async fn slot_lock_from_config(config: &AppConfig) -> Arc<dyn SlotLock> {
    let Some(url) = config.redis_url.as_deref() else {
        warn!("REDIS_URL not set, slot locking is limited to this process");
        return Arc::new(InMemorySlotLock::new());
    };

    match RedisSlotLock::connect(url).await {
        Ok(lock) => Arc::new(lock),
        Err(e) => {
            warn!("Redis unavailable ({}), slot locking is limited to this process", e);
            Arc::new(InMemorySlotLock::new())
        }
    }
}
