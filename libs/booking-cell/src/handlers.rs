// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AddSpecialtyRequest, AvailabilityEntry, AvailabilityQuery, BookSlotRequest, BookedSlotView,
    BookingError, BookingsQuery, SpecialtySummary,
};
use crate::state::AppState;

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::NotFound(msg) => AppError::NotFound(msg),
        BookingError::Conflict(msg) => AppError::Conflict(msg),
        BookingError::Unavailable => AppError::Conflict(
            "The slot is no longer available. Another user has booked it.".to_string(),
        ),
        BookingError::Busy => AppError::Busy("The resource is busy. Try again.".to_string()),
        BookingError::Internal(msg) => AppError::Internal(msg),
    }
}

// ==============================================================================
// PUBLIC BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_active_specialties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let specialties: Vec<SpecialtySummary> = state
        .registry
        .list_active()
        .await
        .into_iter()
        .map(SpecialtySummary::from)
        .collect();

    Ok(Json(json!({ "specialties": specialties })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let slots: Vec<AvailabilityEntry> = state
        .slots
        .list_for_day(query.date, &query.specialty_id)
        .await
        .into_iter()
        .map(|(time, available)| AvailabilityEntry { time, available })
        .collect();

    Ok(Json(json!({
        "date": query.date,
        "specialty_id": query.specialty_id,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .coordinator
        .book_slot(request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Slot booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Value>, AppError> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let bookings: Vec<BookedSlotView> = state
        .slots
        .list_booked(email)
        .await
        .into_iter()
        .map(BookedSlotView::from)
        .collect();

    Ok(Json(json!({ "bookings": bookings })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .coordinator
        .cancel_booking(slot_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Booking cancelled"
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_all_slots(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let slots = state.slots.list_all().await;
    Ok(Json(json!({ "slots": slots })))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let specialties = state.registry.list().await;
    Ok(Json(json!({ "specialties": specialties })))
}

#[axum::debug_handler]
pub async fn add_specialty(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let specialty = state
        .coordinator
        .add_specialty(request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "specialty": specialty
    })))
}

#[axum::debug_handler]
pub async fn remove_specialty(
    State(state): State<Arc<AppState>>,
    Path(specialty_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let purged = state
        .coordinator
        .remove_specialty(&specialty_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "purged_slots": purged
    })))
}

#[axum::debug_handler]
pub async fn reset_all(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let released = state
        .coordinator
        .reset_all()
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "released": released
    })))
}
