// libs/appointment-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentStatus, StoreError};

/// Persistence seam for appointments.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// True when a PENDING or CONFIRMED appointment holds exactly this date and time string.
    async fn slot_taken(&self, date: NaiveDate, time: &str) -> Result<bool, StoreError>;

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError>;

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError>;

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, StoreError>;
}

fn active_status_filter() -> String {
    let statuses: Vec<&str> = AppointmentStatus::ACTIVE.iter().map(|s| s.as_str()).collect();
    format!("in.({})", statuses.join(","))
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Appointment>, _>>()
        .map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn first_row(rows: Vec<Value>) -> Result<Appointment, StoreError> {
    parse_rows(rows)?.into_iter().next().ok_or(StoreError::NotFound)
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn slot_taken(&self, date: NaiveDate, time: &str) -> Result<bool, StoreError> {
        let path = format!(
            "/rest/v1/appointments?appointmentDate=eq.{}&appointmentTime=eq.{}&status={}&select=id&limit=1",
            date.format("%Y-%m-%d"),
            urlencoding::encode(time),
            active_status_filter()
        );

        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!("Slot {} {} has {} active appointment(s)", date, time, rows.len());
        Ok(!rows.is_empty())
    }

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let body = serde_json::to_value(appointment)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        let rows: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        first_row(rows).map_err(|e| match e {
            StoreError::NotFound => StoreError::Backend("Insert returned no representation".to_string()),
            other => other,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        first_row(rows)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?appointmentDate=eq.{}&order=appointmentTime.asc",
            date.format("%Y-%m-%d")
        );
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        parse_rows(rows)
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let body = json!({
            "status": status,
            "updatedAt": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        first_row(rows)
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

/// Process-local store for dev mode and tests.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn slot_taken(&self, date: NaiveDate, time: &str) -> Result<bool, StoreError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().any(|a| {
            a.appointment_date == date && a.appointment_time == time && a.status.is_active()
        }))
    }

    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        if appointments.iter().any(|a| a.id == appointment.id) {
            return Err(StoreError::Backend(format!("Duplicate appointment id {}", appointment.id)));
        }
        appointments.push(appointment.clone());
        Ok(appointment.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        self.appointments
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        let mut found: Vec<Appointment> = self.appointments
            .read()
            .await
            .iter()
            .filter(|a| a.appointment_date == date)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.appointment_time.cmp(&b.appointment_time));
        Ok(found)
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;

        appointment.status = status;
        appointment.updated_at = Utc::now();
        Ok(appointment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_status_filter() {
        assert_eq!(active_status_filter(), "in.(PENDING,CONFIRMED)");
    }
}
