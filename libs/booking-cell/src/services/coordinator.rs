// libs/booking-cell/src/services/coordinator.rs
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::booking::{BookingDetails, SlotKey, Specialty, SpecialtyStatus};
use shared_store::{SlotStore, SpecialtyRegistry, StoreError};

use crate::models::{AddSpecialtyRequest, BookSlotRequest, BookingError};
use crate::services::generator;
use crate::services::lock::{LockPolicy, LockTable};

/// Token serializing every change to the specialty set and its slots.
pub const REGISTRY_LOCK: &str = "specialties";
/// Token for the global reset; reset never touches the registry, so it gets
/// its own token instead of sharing `REGISTRY_LOCK`.
pub const RESET_LOCK: &str = "reset";

const MIN_PHONE_LEN: usize = 8;

/// Serializes mutating operations through per-resource locks. Each operation
/// acquires exactly one token, so no lock ordering is needed.
pub struct BookingCoordinator {
    slots: Arc<dyn SlotStore>,
    registry: Arc<dyn SpecialtyRegistry>,
    locks: LockTable,
    horizon_days: u32,
    email_re: Regex,
}

impl BookingCoordinator {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        registry: Arc<dyn SpecialtyRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self {
            slots,
            registry,
            locks: LockTable::new(LockPolicy::from(config)),
            horizon_days: config.horizon_days,
            email_re: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"),
        }
    }

    /// Populate the slot horizon for every active specialty. Safe to call
    /// repeatedly: the store upsert skips natural keys that already exist.
    pub async fn bootstrap(&self) -> Result<usize, BookingError> {
        let today = Utc::now().date_naive();
        let mut inserted = 0;
        for specialty in self.registry.list_active().await {
            let batch = generator::slots_for_horizon(&specialty, today, self.horizon_days);
            inserted += self.slots.upsert_slots(batch).await;
        }
        info!(inserted, horizon_days = self.horizon_days, "slot horizon populated");
        Ok(inserted)
    }

    /// Claim the slot matching the request's natural key for the given holder.
    pub async fn book_slot(&self, request: BookSlotRequest) -> Result<(), BookingError> {
        // Holder validation happens before any lock is taken.
        self.validate_holder(&request)?;

        let key = SlotKey::new(request.date, request.time, request.specialty_id.clone());
        let _guard = self.locks.acquire(&key.lock_token()).await?;

        let details = BookingDetails {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            reason: request.reason,
        };

        match self.slots.claim(&key, details).await {
            Ok(slot) => {
                info!(slot_id = %slot.id, specialty = %slot.specialty_id, "slot booked");
                Ok(())
            }
            // Never existed and booked-in-the-meantime are indistinguishable
            // to the caller.
            Err(StoreError::SlotNotFound) | Err(StoreError::AlreadyBooked) => {
                debug!(token = %key.lock_token(), "claim lost: slot unavailable");
                Err(BookingError::Unavailable)
            }
            Err(other) => Err(BookingError::Internal(other.to_string())),
        }
    }

    /// Release a booked slot. The booked state and version are re-validated
    /// inside the critical section, not at the caller's earlier lookup.
    pub async fn cancel_booking(&self, slot_id: Uuid) -> Result<(), BookingError> {
        let observed = self.slots.slot_meta(slot_id).await.ok_or_else(|| {
            BookingError::NotFound("The slot does not exist or was already cancelled".to_string())
        })?;

        let _guard = self.locks.acquire(&format!("slot:{slot_id}")).await?;

        match self.slots.cancel(slot_id, observed.version).await {
            Ok(slot) => {
                info!(slot_id = %slot.id, "booking cancelled");
                Ok(())
            }
            Err(StoreError::SlotNotFound) | Err(StoreError::NotBooked) => Err(
                BookingError::NotFound("The slot does not exist or was already cancelled".to_string()),
            ),
            Err(StoreError::VersionMismatch { expected, found }) => {
                warn!(%slot_id, expected, found, "cancel raced a concurrent mutation");
                Err(BookingError::Conflict(
                    "The slot was modified by another operation. Try again.".to_string(),
                ))
            }
            Err(other) => Err(BookingError::Internal(other.to_string())),
        }
    }

    /// Register a new specialty and generate its slots for the horizon.
    pub async fn add_specialty(
        &self,
        request: AddSpecialtyRequest,
    ) -> Result<Specialty, BookingError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BookingError::Validation(
                "The specialty name is required".to_string(),
            ));
        }
        if request.start_hour >= request.end_hour {
            return Err(BookingError::Validation(
                "The start hour must be before the end hour".to_string(),
            ));
        }
        if request.end_hour > 24 {
            return Err(BookingError::Validation(
                "The end hour cannot exceed 24".to_string(),
            ));
        }
        let mut granularity = request.granularity;
        granularity.sort_unstable();
        granularity.dedup();
        if granularity.is_empty() {
            return Err(BookingError::Validation(
                "At least one minute offset is required".to_string(),
            ));
        }
        if granularity.iter().any(|&m| m >= 60) {
            return Err(BookingError::Validation(
                "Minute offsets must be below 60".to_string(),
            ));
        }

        let _guard = self.locks.acquire(REGISTRY_LOCK).await?;

        if self.registry.name_exists(&name).await {
            return Err(BookingError::Conflict(
                "A specialty with that name already exists".to_string(),
            ));
        }

        let specialty = Specialty {
            id: self.unique_slug(&name).await,
            name,
            status: SpecialtyStatus::Active,
            start_hour: request.start_hour,
            end_hour: request.end_hour,
            granularity,
        };
        self.registry.insert(specialty.clone()).await;

        let batch =
            generator::slots_for_horizon(&specialty, Utc::now().date_naive(), self.horizon_days);
        let created = self.slots.upsert_slots(batch).await;
        info!(specialty = %specialty.id, created, "specialty added");

        Ok(specialty)
    }

    /// Retire a specialty and purge its unbooked slots. Refused while any of
    /// its slots is booked; booked slots are never deleted.
    pub async fn remove_specialty(&self, id: &str) -> Result<usize, BookingError> {
        let _guard = self.locks.acquire(REGISTRY_LOCK).await?;

        if self.registry.get(id).await.is_none() {
            return Err(BookingError::NotFound(
                "The specialty does not exist".to_string(),
            ));
        }
        if self.slots.has_booked(id).await {
            return Err(BookingError::Conflict(
                "The specialty cannot be removed because it has booked slots".to_string(),
            ));
        }

        self.registry
            .retire(id)
            .await
            .map_err(|e| BookingError::Internal(e.to_string()))?;
        let purged = self.slots.purge_unbooked(id).await;
        info!(specialty = %id, purged, "specialty retired");

        Ok(purged)
    }

    /// Release every booked slot across all specialties.
    pub async fn reset_all(&self) -> Result<usize, BookingError> {
        let _guard = self.locks.acquire(RESET_LOCK).await?;

        let released = self.slots.reset_all().await;
        info!(released, "all booked slots released");
        Ok(released)
    }

    fn validate_holder(&self, request: &BookSlotRequest) -> Result<(), BookingError> {
        if request.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "The holder name is required".to_string(),
            ));
        }
        if !self.email_re.is_match(request.email.trim()) {
            return Err(BookingError::Validation(
                "The email address is not valid".to_string(),
            ));
        }
        if request.phone.trim().len() < MIN_PHONE_LEN {
            return Err(BookingError::Validation(format!(
                "The phone number must have at least {} characters",
                MIN_PHONE_LEN
            )));
        }
        Ok(())
    }

    /// Slug the name and append a random suffix until the id is free.
    async fn unique_slug(&self, name: &str) -> String {
        let base = slugify(name);
        loop {
            let suffix = rand::thread_rng().gen_range(0..1000);
            let candidate = format!("{base}-{suffix}");
            if !self.registry.id_exists(&candidate).await {
                return candidate;
            }
        }
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "especialidad".to_string()
    } else {
        slug.to_string()
    }
}
