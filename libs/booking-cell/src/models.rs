// libs/booking-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::booking::{hhmm, Slot, Specialty};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookSlotRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub specialty_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSpecialtyRequest {
    pub name: String,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Minute offsets within each hour, e.g. [0, 30].
    pub granularity: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub specialty_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub email: Option<String>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtySummary {
    pub id: String,
    pub name: String,
}

impl From<Specialty> for SpecialtySummary {
    fn from(specialty: Specialty) -> Self {
        Self {
            id: specialty.id,
            name: specialty.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityEntry {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookedSlotView {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reason: Option<String>,
    pub specialty_id: String,
    pub specialty_name: String,
}

impl From<Slot> for BookedSlotView {
    fn from(slot: Slot) -> Self {
        let details = slot.details.unwrap_or_default();
        Self {
            id: slot.id,
            date: slot.date,
            time: slot.time,
            name: details.name,
            email: details.email,
            phone: details.phone,
            reason: details.reason,
            specialty_id: slot.specialty_id,
            specialty_name: slot.specialty_name,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("The slot is no longer available. Another user has booked it.")]
    Unavailable,

    #[error("The resource is busy. Try again.")]
    Busy,

    #[error("Internal error: {0}")]
    Internal(String),
}
