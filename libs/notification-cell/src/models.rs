use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// What the booking messages need to know about a freshly created appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSummary {
    pub appointment_id: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub location_type: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub services: Vec<SummaryLine>,
    pub total_price: Decimal,
    pub total_duration: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryLine {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Admin,
    Client,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Admin => "admin",
            Channel::Client => "client",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Email provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Email provider unreachable: {0}")]
    Transport(String),

    #[error("Notification timed out after {0} seconds")]
    Timeout(u64),

    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// Per-channel result of one dispatch. `admin` is `None` when no admin
/// address is configured.
#[derive(Debug)]
pub struct DispatchReport {
    pub admin: Option<Result<(), NotificationError>>,
    pub client: Result<(), NotificationError>,
}

impl DispatchReport {
    pub fn failures(&self) -> Vec<(Channel, &NotificationError)> {
        let mut failures = Vec::new();
        if let Some(Err(e)) = &self.admin {
            failures.push((Channel::Admin, e));
        }
        if let Err(e) = &self.client {
            failures.push((Channel::Client, e));
        }
        failures
    }
}
