pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod lock;
pub mod pricing;
pub mod rules;
pub mod store;
pub mod validation;

pub use booking::{AppointmentBookingService, BookingSettings};
pub use conflict::SlotConflictChecker;
pub use lifecycle::AppointmentLifecycleService;
pub use lock::{slot_key, InMemorySlotLock, RedisSlotLock, SlotLease, SlotLock};
pub use pricing::{parse_start_hour, NightShiftPolicy, PricingEngine};
pub use rules::{validate_categories, CATEGORY_RULES};
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
