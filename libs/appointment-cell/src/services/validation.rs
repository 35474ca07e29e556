// libs/appointment-cell/src/services/validation.rs
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use shared_models::LocationType;

use crate::models::{BookAppointmentRequest, BookingError, QuoteRequest, ServiceSelection};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\-\+\(\)]").expect("phone separator pattern compiles")
});

static PHONE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{9,12}$").expect("phone digit pattern compiles")
});

/// Booking request after shape validation, with optional text normalized.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub services: ServiceSelection,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub location_type: LocationType,
    pub district: Option<String>,
    pub address: Option<String>,
    pub address_reference: Option<String>,
    pub notes: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL.is_match(email)
}

/// 9 to 12 digits once spaces, dashes, plus signs and parentheses are removed.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = PHONE_SEPARATORS.replace_all(phone, "");
    PHONE_DIGITS.is_match(&digits)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Upper bound on the units of a single service in one booking.
pub const MAX_QUANTITY_PER_SERVICE: u32 = 10;

/// Drops zero quantities. At least one service must remain.
fn positive_quantities(services: &ServiceSelection) -> Result<ServiceSelection, BookingError> {
    if services.values().any(|&qty| qty > MAX_QUANTITY_PER_SERVICE) {
        return Err(BookingError::Validation(format!(
            "A service can be booked at most {} times",
            MAX_QUANTITY_PER_SERVICE
        )));
    }

    let selection: ServiceSelection = services
        .iter()
        .filter(|&(_, &qty)| qty > 0)
        .map(|(id, qty)| (id.trim().to_string(), *qty))
        .collect();

    if selection.is_empty() {
        return Err(BookingError::Validation("Select at least one service".to_string()));
    }
    Ok(selection)
}

fn required(value: &str, message: &str) -> Result<String, BookingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BookingError::Validation(message.to_string()));
    }
    Ok(value.to_string())
}

pub fn validate_booking_request(request: &BookAppointmentRequest) -> Result<BookingDraft, BookingError> {
    let client_name = required(&request.client_name, "Client name is required")?;

    let client_email = request.client_email.trim().to_string();
    if !is_valid_email(&client_email) {
        return Err(BookingError::Validation("A valid email address is required".to_string()));
    }

    let client_phone = required(&request.client_phone, "Phone number is required")?;
    if !is_valid_phone(&client_phone) {
        return Err(BookingError::Validation("Phone number must contain 9 to 12 digits".to_string()));
    }

    let appointment_date = request
        .appointment_date
        .ok_or_else(|| BookingError::Validation("Appointment date is required".to_string()))?;
    let appointment_time = required(&request.appointment_time, "Appointment time is required")?;
    let location_type = request
        .location_type
        .ok_or_else(|| BookingError::Validation("Location type is required".to_string()))?;

    let services = positive_quantities(&request.services)?;

    let (district, address, address_reference) = match location_type {
        LocationType::Home => {
            let district = non_empty(request.district.as_deref());
            let address = non_empty(request.address.as_deref());
            if district.is_none() || address.is_none() {
                return Err(BookingError::Validation(
                    "District and address are required for home appointments".to_string(),
                ));
            }
            (district, address, non_empty(request.address_reference.as_deref()))
        }
        LocationType::Studio => (None, None, None),
    };

    Ok(BookingDraft {
        client_name,
        client_email,
        client_phone,
        services,
        appointment_date,
        appointment_time,
        location_type,
        district,
        address,
        address_reference,
        notes: non_empty(request.notes.as_deref()),
    })
}

/// Quotes only need what pricing reads. Returns the normalized selection and district.
pub fn validate_quote_request(
    request: &QuoteRequest,
) -> Result<(ServiceSelection, LocationType, Option<String>), BookingError> {
    let location_type = request
        .location_type
        .ok_or_else(|| BookingError::Validation("Location type is required".to_string()))?;

    let services = positive_quantities(&request.services)?;

    let district = match location_type {
        LocationType::Home => non_empty(request.district.as_deref()),
        LocationType::Studio => None,
    };

    Ok((services, location_type, district))
}
