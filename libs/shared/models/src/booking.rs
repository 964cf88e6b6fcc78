use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serde helper for zero-padded 24-hour `HH:MM` times, the wire format the
/// booking UI expects.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SpecialtyStatus {
    Active,
    Retired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: String,
    pub name: String,
    pub status: SpecialtyStatus,
    pub start_hour: u32,
    pub end_hour: u32,
    /// Minute offsets within each hour, e.g. [0, 30] for half-hour slots.
    pub granularity: Vec<u32>,
}

impl Specialty {
    pub fn is_active(&self) -> bool {
        self.status == SpecialtyStatus::Active
    }
}

/// Natural key for a slot: at most one slot exists per (date, time, specialty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub specialty_id: String,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime, specialty_id: impl Into<String>) -> Self {
        Self {
            date,
            time,
            specialty_id: specialty_id.into(),
        }
    }

    /// Token used to serialize mutations against this natural key.
    pub fn lock_token(&self) -> String {
        format!(
            "slot:{}:{}:{}",
            self.date,
            self.time.format(hhmm::FORMAT),
            self.specialty_id
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub specialty_id: String,
    pub specialty_name: String,
    pub booked: bool,
    /// Present only while the slot is booked.
    pub details: Option<BookingDetails>,
    /// Bumped on every state transition, never reused.
    pub version: u64,
}

impl Slot {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.time, self.specialty_id.clone())
    }
}
