// =====================================================================================
// SHARED STORE - AUTHORITATIVE SLOT AND SPECIALTY STATE
// =====================================================================================
//
// Repository contracts for the booking engine. The coordinator depends on these
// traits, not on a concrete backend, so the in-memory store can be swapped for a
// durable one without touching the booking logic.
//
// =====================================================================================

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use shared_models::booking::{BookingDetails, Slot, SlotKey, Specialty};

pub mod memory;

pub use memory::InMemoryStore;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("slot not found")]
    SlotNotFound,

    #[error("slot is already booked")]
    AlreadyBooked,

    #[error("slot is not booked")]
    NotBooked,

    #[error("slot was modified concurrently (expected version {expected}, found {found})")]
    VersionMismatch { expected: u64, found: u64 },

    #[error("specialty not found")]
    SpecialtyNotFound,
}

/// Booked-state and version of a slot, captured before lock acquisition and
/// re-checked inside the critical section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotMeta {
    pub booked: bool,
    pub version: u64,
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    /// All slots for one day and specialty as (time, available), ascending by time.
    async fn list_for_day(&self, date: NaiveDate, specialty_id: &str) -> Vec<(NaiveTime, bool)>;

    /// Booked slots, filtered by holder email. Anonymous callers get a bounded
    /// sample of at most three entries, never the full booked set.
    async fn list_booked(&self, email: Option<&str>) -> Vec<Slot>;

    /// Every slot, booked or not. Administrative listing only.
    async fn list_all(&self) -> Vec<Slot>;

    async fn slot_meta(&self, id: Uuid) -> Option<SlotMeta>;

    async fn has_booked(&self, specialty_id: &str) -> bool;

    /// Book the unique unbooked slot matching the natural key.
    async fn claim(&self, key: &SlotKey, details: BookingDetails) -> Result<Slot, StoreError>;

    /// Free a booked slot. The slot's current version must match
    /// `expected_version`; the check happens inside the store mutation, not at
    /// the caller's earlier read.
    async fn cancel(&self, id: Uuid, expected_version: u64) -> Result<Slot, StoreError>;

    /// Free every booked slot. Returns how many were released.
    async fn reset_all(&self) -> usize;

    /// Delete every unbooked slot of one specialty. Booked slots are never
    /// deleted. Returns how many were removed.
    async fn purge_unbooked(&self, specialty_id: &str) -> usize;

    /// Insert generated slots, skipping natural keys that already exist.
    /// Returns how many were actually inserted.
    async fn upsert_slots(&self, batch: Vec<Slot>) -> usize;
}

#[async_trait]
pub trait SpecialtyRegistry: Send + Sync {
    async fn list(&self) -> Vec<Specialty>;

    async fn list_active(&self) -> Vec<Specialty>;

    async fn get(&self, id: &str) -> Option<Specialty>;

    /// Case-insensitive name lookup, covering retired specialties too.
    async fn name_exists(&self, name: &str) -> bool;

    async fn id_exists(&self, id: &str) -> bool;

    async fn insert(&self, specialty: Specialty);

    /// Soft-delete: the record stays, since booked slots may still reference it.
    async fn retire(&self, id: &str) -> Result<(), StoreError>;
}
