// libs/booking-cell/src/services/generator.rs
use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;

use shared_models::booking::{Slot, Specialty};

/// Expand a specialty's configuration into unbooked slot records covering
/// `[from, from + horizon_days)` days, `[start_hour, end_hour)` hours and the
/// specialty's minute offsets. Pure: the caller inserts the batch through the
/// store's natural-key upsert, which keeps regeneration idempotent.
pub fn slots_for_horizon(specialty: &Specialty, from: NaiveDate, horizon_days: u32) -> Vec<Slot> {
    let mut minutes = specialty.granularity.clone();
    minutes.sort_unstable();
    minutes.dedup();

    let mut slots = Vec::new();
    for day_offset in 0..horizon_days {
        let date = from + Duration::days(i64::from(day_offset));
        for hour in specialty.start_hour..specialty.end_hour {
            for &minute in &minutes {
                let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
                    continue;
                };
                slots.push(Slot {
                    id: Uuid::new_v4(),
                    date,
                    time,
                    specialty_id: specialty.id.clone(),
                    specialty_name: specialty.name.clone(),
                    booked: false,
                    details: None,
                    version: 1,
                });
            }
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::booking::SpecialtyStatus;

    fn cardiology() -> Specialty {
        Specialty {
            id: "cardiologia".to_string(),
            name: "Cardiología".to_string(),
            status: SpecialtyStatus::Active,
            start_hour: 9,
            end_hour: 14,
            granularity: vec![0, 30],
        }
    }

    #[test]
    fn covers_hours_times_granularity_times_horizon() {
        let from = "2026-09-01".parse().unwrap();
        let slots = slots_for_horizon(&cardiology(), from, 30);

        // 5 hours x 2 offsets = 10 per day.
        assert_eq!(slots.len(), 10 * 30);
        assert_eq!(
            slots
                .iter()
                .filter(|s| s.date == from)
                .count(),
            10
        );
    }

    #[test]
    fn slots_are_ordered_and_zero_padded() {
        let from = "2026-09-01".parse().unwrap();
        let slots = slots_for_horizon(&cardiology(), from, 1);

        let times: Vec<String> = slots
            .iter()
            .map(|s| s.time.format("%H:%M").to_string())
            .collect();
        assert_eq!(
            times,
            vec![
                "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00",
                "13:30"
            ]
        );

        let mut sorted = slots.clone();
        sorted.sort_by_key(|s| (s.date, s.time));
        let original: Vec<_> = slots.iter().map(|s| (s.date, s.time)).collect();
        let expected: Vec<_> = sorted.iter().map(|s| (s.date, s.time)).collect();
        assert_eq!(original, expected);
    }

    #[test]
    fn no_duplicate_natural_keys() {
        let from = "2026-09-01".parse().unwrap();
        let slots = slots_for_horizon(&cardiology(), from, 30);

        let mut keys: Vec<_> = slots.iter().map(Slot::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), slots.len());
    }

    #[test]
    fn unordered_granularity_is_normalized() {
        let mut specialty = cardiology();
        specialty.granularity = vec![30, 0, 30];
        let from = "2026-09-01".parse().unwrap();
        let slots = slots_for_horizon(&specialty, from, 1);

        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].time.format("%H:%M").to_string(), "09:00");
        assert_eq!(slots[1].time.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn fresh_slots_start_unbooked_at_version_one() {
        let from = "2026-09-01".parse().unwrap();
        for slot in slots_for_horizon(&cardiology(), from, 2) {
            assert!(!slot.booked);
            assert_eq!(slot.details, None);
            assert_eq!(slot.version, 1);
        }
    }
}
