use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::booking::{BookingDetails, Slot, SlotKey, Specialty, SpecialtyStatus};

use crate::{SlotMeta, SlotStore, SpecialtyRegistry, StoreError};

#[derive(Default)]
struct StoreState {
    specialties: Vec<Specialty>,
    slots: HashMap<SlotKey, Slot>,
    by_id: HashMap<Uuid, SlotKey>,
}

/// In-memory backend. All reads and writes go through one `RwLock`, so each
/// store call is a single atomic step; cross-call atomicity is the
/// coordinator's job via its lock table.
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Store pre-loaded with the clinic's standard specialties.
    pub fn seeded() -> Self {
        Self {
            state: RwLock::new(StoreState {
                specialties: default_specialties(),
                ..StoreState::default()
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn default_specialties() -> Vec<Specialty> {
    let spec = |id: &str, name: &str, start: u32, end: u32, granularity: &[u32]| Specialty {
        id: id.to_string(),
        name: name.to_string(),
        status: SpecialtyStatus::Active,
        start_hour: start,
        end_hour: end,
        granularity: granularity.to_vec(),
    };

    vec![
        spec("medicina-general", "Medicina General", 8, 18, &[0, 30]),
        spec("cardiologia", "Cardiología", 9, 14, &[0, 30]),
        spec("dermatologia", "Dermatología", 10, 15, &[0, 30]),
        spec("pediatria", "Pediatría", 9, 16, &[0, 30]),
        spec("traumatologia", "Traumatología", 8, 16, &[0]),
    ]
}

#[async_trait]
impl SlotStore for InMemoryStore {
    async fn list_for_day(&self, date: NaiveDate, specialty_id: &str) -> Vec<(NaiveTime, bool)> {
        let state = self.state.read().await;
        let mut entries: Vec<(NaiveTime, bool)> = state
            .slots
            .values()
            .filter(|s| s.date == date && s.specialty_id == specialty_id)
            .map(|s| (s.time, !s.booked))
            .collect();
        entries.sort_by_key(|(time, _)| *time);
        entries
    }

    async fn list_booked(&self, email: Option<&str>) -> Vec<Slot> {
        let state = self.state.read().await;
        let mut booked: Vec<Slot> = state
            .slots
            .values()
            .filter(|s| s.booked)
            .filter(|s| match email {
                Some(email) => s
                    .details
                    .as_ref()
                    .is_some_and(|d| d.email.eq_ignore_ascii_case(email)),
                None => true,
            })
            .cloned()
            .collect();
        booked.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));

        // Identity-less callers only ever see a small sample.
        if email.is_none() {
            booked.truncate(3);
        }
        booked
    }

    async fn list_all(&self) -> Vec<Slot> {
        let state = self.state.read().await;
        let mut all: Vec<Slot> = state.slots.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.specialty_id.as_str(), a.date, a.time).cmp(&(b.specialty_id.as_str(), b.date, b.time))
        });
        all
    }

    async fn slot_meta(&self, id: Uuid) -> Option<SlotMeta> {
        let state = self.state.read().await;
        let key = state.by_id.get(&id)?;
        state.slots.get(key).map(|s| SlotMeta {
            booked: s.booked,
            version: s.version,
        })
    }

    async fn has_booked(&self, specialty_id: &str) -> bool {
        let state = self.state.read().await;
        state
            .slots
            .values()
            .any(|s| s.specialty_id == specialty_id && s.booked)
    }

    async fn claim(&self, key: &SlotKey, details: BookingDetails) -> Result<Slot, StoreError> {
        let mut state = self.state.write().await;
        let slot = state.slots.get_mut(key).ok_or(StoreError::SlotNotFound)?;
        if slot.booked {
            return Err(StoreError::AlreadyBooked);
        }

        slot.booked = true;
        slot.details = Some(details);
        slot.version += 1;
        debug!(slot_id = %slot.id, version = slot.version, "slot claimed");
        Ok(slot.clone())
    }

    async fn cancel(&self, id: Uuid, expected_version: u64) -> Result<Slot, StoreError> {
        let mut state = self.state.write().await;
        let key = state.by_id.get(&id).cloned().ok_or(StoreError::SlotNotFound)?;
        let slot = state.slots.get_mut(&key).ok_or(StoreError::SlotNotFound)?;

        if !slot.booked {
            return Err(StoreError::NotBooked);
        }
        // Re-check the version at mutation time: a mismatch means another
        // caller transitioned this slot after our earlier read.
        if slot.version != expected_version {
            return Err(StoreError::VersionMismatch {
                expected: expected_version,
                found: slot.version,
            });
        }

        slot.booked = false;
        slot.details = None;
        slot.version += 1;
        debug!(slot_id = %slot.id, version = slot.version, "slot released");
        Ok(slot.clone())
    }

    async fn reset_all(&self) -> usize {
        let mut state = self.state.write().await;
        let mut released = 0;
        for slot in state.slots.values_mut() {
            if slot.booked {
                slot.booked = false;
                slot.details = None;
                slot.version += 1;
                released += 1;
            }
        }
        debug!(released, "reset released booked slots");
        released
    }

    async fn purge_unbooked(&self, specialty_id: &str) -> usize {
        let mut state = self.state.write().await;
        let doomed: Vec<SlotKey> = state
            .slots
            .values()
            .filter(|s| s.specialty_id == specialty_id && !s.booked)
            .map(|s| s.key())
            .collect();

        for key in &doomed {
            if let Some(slot) = state.slots.remove(key) {
                state.by_id.remove(&slot.id);
            }
        }
        doomed.len()
    }

    async fn upsert_slots(&self, batch: Vec<Slot>) -> usize {
        let mut state = self.state.write().await;
        let mut inserted = 0;
        for slot in batch {
            let key = slot.key();
            if state.slots.contains_key(&key) {
                continue;
            }
            state.by_id.insert(slot.id, key.clone());
            state.slots.insert(key, slot);
            inserted += 1;
        }
        inserted
    }
}

#[async_trait]
impl SpecialtyRegistry for InMemoryStore {
    async fn list(&self) -> Vec<Specialty> {
        self.state.read().await.specialties.clone()
    }

    async fn list_active(&self) -> Vec<Specialty> {
        self.state
            .read()
            .await
            .specialties
            .iter()
            .filter(|s| s.is_active())
            .cloned()
            .collect()
    }

    async fn get(&self, id: &str) -> Option<Specialty> {
        self.state
            .read()
            .await
            .specialties
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    async fn name_exists(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        self.state
            .read()
            .await
            .specialties
            .iter()
            .any(|s| s.name.to_lowercase() == needle)
    }

    async fn id_exists(&self, id: &str) -> bool {
        self.state.read().await.specialties.iter().any(|s| s.id == id)
    }

    async fn insert(&self, specialty: Specialty) {
        self.state.write().await.specialties.push(specialty);
    }

    async fn retire(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let specialty = state
            .specialties
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::SpecialtyNotFound)?;
        specialty.status = SpecialtyStatus::Retired;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn slot(date: &str, time: &str, specialty: &str) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            date: date.parse().unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            specialty_id: specialty.to_string(),
            specialty_name: specialty.to_string(),
            booked: false,
            details: None,
            version: 1,
        }
    }

    fn holder() -> BookingDetails {
        BookingDetails {
            name: "Ana López".to_string(),
            email: "ana@example.com".to_string(),
            phone: "11223344".to_string(),
            reason: None,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_natural_key() {
        let store = InMemoryStore::new();
        let first = slot("2026-09-01", "09:00", "cardiologia");
        let duplicate = slot("2026-09-01", "09:00", "cardiologia");

        assert_eq!(store.upsert_slots(vec![first]).await, 1);
        assert_eq!(store.upsert_slots(vec![duplicate]).await, 0);
        assert_eq!(store.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn claim_then_cancel_round_trip() {
        let store = InMemoryStore::new();
        let s = slot("2026-09-01", "09:30", "cardiologia");
        let key = s.key();
        store.upsert_slots(vec![s]).await;

        let claimed = store.claim(&key, holder()).await.unwrap();
        assert!(claimed.booked);
        assert_eq!(claimed.version, 2);
        assert_matches!(
            store.claim(&key, holder()).await,
            Err(StoreError::AlreadyBooked)
        );

        let released = store.cancel(claimed.id, claimed.version).await.unwrap();
        assert!(!released.booked);
        assert_eq!(released.details, None);
        assert_eq!(released.version, 3);
    }

    #[tokio::test]
    async fn cancel_rejects_stale_version() {
        let store = InMemoryStore::new();
        let s = slot("2026-09-01", "10:00", "cardiologia");
        let key = s.key();
        store.upsert_slots(vec![s]).await;

        let claimed = store.claim(&key, holder()).await.unwrap();
        assert_matches!(
            store.cancel(claimed.id, claimed.version - 1).await,
            Err(StoreError::VersionMismatch { expected: 1, found: 2 })
        );
        // The failed cancel must not have mutated anything.
        let meta = store.slot_meta(claimed.id).await.unwrap();
        assert_eq!(meta, SlotMeta { booked: true, version: 2 });
    }

    #[tokio::test]
    async fn cancel_of_unbooked_slot_fails() {
        let store = InMemoryStore::new();
        let s = slot("2026-09-01", "11:00", "pediatria");
        let id = s.id;
        store.upsert_slots(vec![s]).await;

        assert_matches!(store.cancel(id, 1).await, Err(StoreError::NotBooked));
        assert_matches!(
            store.cancel(Uuid::new_v4(), 1).await,
            Err(StoreError::SlotNotFound)
        );
    }

    #[tokio::test]
    async fn purge_leaves_booked_slots_alone() {
        let store = InMemoryStore::new();
        let keep = slot("2026-09-01", "09:00", "dermatologia");
        let keep_key = keep.key();
        store
            .upsert_slots(vec![
                keep,
                slot("2026-09-01", "10:00", "dermatologia"),
                slot("2026-09-01", "11:00", "pediatria"),
            ])
            .await;
        store.claim(&keep_key, holder()).await.unwrap();

        assert_eq!(store.purge_unbooked("dermatologia").await, 1);
        let remaining = store.list_all().await;
        assert_eq!(remaining.len(), 2);
        assert!(store.has_booked("dermatologia").await);
    }

    #[tokio::test]
    async fn anonymous_booked_listing_is_bounded() {
        let store = InMemoryStore::new();
        let mut keys = Vec::new();
        for hour in 8..13 {
            let s = slot("2026-09-02", &format!("{:02}:00", hour), "medicina-general");
            keys.push(s.key());
            store.upsert_slots(vec![s]).await;
        }
        for key in &keys {
            store.claim(key, holder()).await.unwrap();
        }

        assert_eq!(store.list_booked(None).await.len(), 3);
        assert_eq!(store.list_booked(Some("ana@example.com")).await.len(), 5);
        assert_eq!(store.list_booked(Some("nadie@example.com")).await.len(), 0);
    }

    #[tokio::test]
    async fn seeded_registry_matches_clinic_defaults() {
        let store = InMemoryStore::seeded();
        assert_eq!(store.list().await.len(), 5);
        assert_eq!(store.list_active().await.len(), 5);
        assert!(store.name_exists("cardiología").await);
        assert!(!store.name_exists("oftalmología").await);

        store.retire("cardiologia").await.unwrap();
        assert_eq!(store.list_active().await.len(), 4);
        // Retired specialties keep their record and still block name reuse.
        assert!(store.get("cardiologia").await.is_some());
        assert!(store.name_exists("Cardiología").await);
    }
}
