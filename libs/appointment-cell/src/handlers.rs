// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentListQuery, AvailabilityQuery, BookAppointmentRequest, QuoteRequest, UpdateStatusRequest,
};
use crate::state::AppointmentState;

// ==============================================================================
// PUBLIC BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = state.booking.book_appointment(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointmentId": outcome.appointment_id,
            "pricing": outcome.pricing,
            "message": "Appointment requested. We will confirm it shortly."
        })),
    ))
}

#[axum::debug_handler]
pub async fn quote_appointment(
    State(state): State<AppointmentState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Value>, AppError> {
    let pricing = state.booking.quote(request).await?;

    Ok(Json(json!({
        "success": true,
        "pricing": pricing
    })))
}

/// Working windows for the day plus the ranges already held.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<AppointmentState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let day = state.availability
        .day_availability(query.date, query.location_type)
        .await
        .map_err(|e| {
            error!("Failed to resolve availability for {}: {}", query.date, e);
            AppError::Internal("Availability temporarily unavailable".to_string())
        })?;

    let taken = state.booking.taken_slots(query.date).await?;

    Ok(Json(json!({
        "availability": day,
        "takenSlots": taken
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.list_appointments(query.date).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.update_status(appointment_id, request.status).await?;
    info!("Admin {} set appointment {} to {}", user.id, appointment_id, appointment.status);

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}
