// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use catalog_cell::ServiceCategory;
use notification_cell::{BookingSummary, SummaryLine};
use shared_models::error::AppError;
use shared_models::LocationType;

/// Requested service id → quantity.
pub type ServiceSelection = BTreeMap<String, u32>;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses that hold their slot.
    pub const ACTIVE: [AppointmentStatus; 2] = [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service as it was when the appointment was booked. Embedded by value so
/// later catalog edits never change history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedService {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub duration: i32,
    pub category: ServiceCategory,
    pub quantity: u32,
}

impl SelectedService {
    /// `None` when the product does not fit.
    pub fn line_price(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    /// `None` when the product does not fit in minutes as `i32`.
    pub fn line_duration(&self) -> Option<i32> {
        i32::try_from(self.quantity)
            .ok()
            .and_then(|quantity| self.duration.checked_mul(quantity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub services: Vec<SelectedService>,
    pub service_price: Decimal,
    pub transport_cost: Option<Decimal>,
    pub night_shift_cost: Option<Decimal>,
    pub total_price: Decimal,
    pub total_duration: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub location_type: LocationType,
    pub district: Option<String>,
    pub address: Option<String>,
    pub address_reference: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn to_summary(&self) -> BookingSummary {
        BookingSummary {
            appointment_id: self.id.to_string(),
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            client_phone: self.client_phone.clone(),
            appointment_date: self.appointment_date.format("%Y-%m-%d").to_string(),
            appointment_time: self.appointment_time.clone(),
            location_type: self.location_type.to_string(),
            district: self.district.clone(),
            address: self.address.clone(),
            services: self.services
                .iter()
                .map(|s| SummaryLine { name: s.name.clone(), quantity: s.quantity })
                .collect(),
            total_price: self.total_price,
            total_duration: self.total_duration,
        }
    }
}

// ==============================================================================
// PRICING
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub service_price: Decimal,
    pub transport_cost: Decimal,
    pub night_shift_cost: Decimal,
    pub total_price: Decimal,
    pub total_duration: i32,
    pub line_items: Vec<SelectedService>,
}

impl PricingBreakdown {
    /// Distinct categories of the priced lines.
    pub fn categories(&self) -> BTreeSet<ServiceCategory> {
        self.line_items.iter().map(|line| line.category).collect()
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Public booking form. Every field defaults so missing values reach the
/// validator and get a readable message instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookAppointmentRequest {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub services: ServiceSelection,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: String,
    pub location_type: Option<LocationType>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub address_reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteRequest {
    pub services: ServiceSelection,
    pub appointment_time: String,
    pub location_type: Option<LocationType>,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub appointment_id: Uuid,
    pub pricing: PricingBreakdown,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub location_type: LocationType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// RULE VERDICT
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleVerdict {
    pub valid: bool,
    pub rule: Option<&'static str>,
    pub reason: Option<String>,
}

impl RuleVerdict {
    pub fn ok() -> Self {
        Self { valid: true, rule: None, reason: None }
    }

    pub fn rejected(rule: &'static str, reason: &str) -> Self {
        Self { valid: false, rule: Some(rule), reason: Some(reason.to_string()) }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

pub const SLOT_TAKEN_MESSAGE: &str = "The selected time slot is already taken, please choose another time";

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    /// Client-correctable input problem; the message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// Detail is for the logs only.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Appointment not found")]
    NotFound,

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition { from: AppointmentStatus, to: AppointmentStatus },
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            // 400, not 409.
            BookingError::Conflict(msg) => AppError::BadRequest(msg),
            BookingError::Persistence(detail) => {
                tracing::error!("Booking persistence failure: {}", detail);
                AppError::Internal("Could not save the appointment, please try again later".to_string())
            }
            BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            e @ BookingError::InvalidStatusTransition { .. } => AppError::BadRequest(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    #[error("Select at least one service")]
    EmptySelection,

    #[error("Unknown or unavailable service: {0}")]
    UnknownService(String),

    #[error("Quantity for service {0} is too large")]
    QuantityOverflow(String),
}

impl From<PricingError> for BookingError {
    fn from(e: PricingError) -> Self {
        BookingError::Validation(e.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Appointment store error: {0}")]
    Backend(String),

    #[error("Appointment data could not be parsed: {0}")]
    InvalidData(String),

    #[error("Appointment not found")]
    NotFound,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LockError {
    #[error("Slot lock backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for LockError {
    fn from(e: redis::RedisError) -> Self {
        LockError::Backend(e.to_string())
    }
}
