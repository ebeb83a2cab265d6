//! Availability models
//!
//! The backend slices a service day into 90 minute slots starting every
//! 30 minutes; each slot lists the tables still free for the requested party.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One bookable slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub available_table_ids: Vec<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

impl AvailabilitySlot {
    /// Whether the slot covers a local wall-clock time
    pub fn covers(&self, time: NaiveTime) -> bool {
        let start = self.start.time();
        let end = self.end.time();
        if end > start {
            start <= time && time < end
        } else {
            // slot runs past midnight
            time >= start || time < end
        }
    }
}

/// Availability payload (`GET /restaurants/{id}/availability`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub slots: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub restaurant_timezone: Option<String>,
}

impl AvailabilityResponse {
    /// Pick the slot matching a requested time.
    ///
    /// Exact start match first, then the latest-starting slot that covers
    /// `time` (including slots running past midnight). Without a time the first slot of the day is used.
    pub fn slot_for(&self, time: Option<NaiveTime>) -> Option<&AvailabilitySlot> {
        let Some(time) = time else {
            return self.slots.first();
        };
        self.slots
            .iter()
            .find(|s| s.start.time() == time)
            .or_else(|| {
                self.slots
                    .iter()
                    .filter(|s| s.covers(time))
                    .max_by_key(|s| s.start)
            })
    }
}

/// What the sync engine polls for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub venue_id: String,
    pub date: NaiveDate,
    pub party_size: u32,
    /// Desired local start time; `None` means the first slot of the day
    #[serde(default)]
    pub time: Option<NaiveTime>,
}

impl AvailabilityQuery {
    pub fn new(venue_id: impl Into<String>, date: NaiveDate, party_size: u32) -> Self {
        Self {
            venue_id: venue_id.into(),
            date,
            party_size,
            time: None,
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }
}

/// Live availability as seen by the map
///
/// `available_table_ids` is `None` until the first successful poll. A failed
/// poll only sets `sync_error`; ids and `last_synced_at` are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub slot_start: Option<DateTime<FixedOffset>>,
    pub slot_end: Option<DateTime<FixedOffset>>,
    pub available_table_ids: Option<HashSet<String>>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub sync_error: Option<String>,
}

impl AvailabilitySnapshot {
    /// Build a fresh snapshot from a slot (or its absence)
    pub fn from_slot(slot: Option<&AvailabilitySlot>, synced_at: DateTime<Utc>) -> Self {
        Self {
            slot_start: slot.map(|s| s.start),
            slot_end: slot.map(|s| s.end),
            available_table_ids: Some(
                slot.map(|s| s.available_table_ids.iter().cloned().collect())
                    .unwrap_or_default(),
            ),
            last_synced_at: Some(synced_at),
            sync_error: None,
        }
    }

    pub fn is_available(&self, table_id: &str) -> bool {
        self.available_table_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(table_id))
    }

    /// Data is shown but the latest poll failed
    pub fn is_stale(&self) -> bool {
        self.sync_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> AvailabilityResponse {
        serde_json::from_str(
            r#"{
                "slots": [
                    {"start": "2026-03-01T10:00:00+04:00", "end": "2026-03-01T11:30:00+04:00",
                     "available_table_ids": ["t1", "t2"], "count": 2},
                    {"start": "2026-03-01T10:30:00+04:00", "end": "2026-03-01T12:00:00+04:00",
                     "available_table_ids": ["t2"], "count": 1},
                    {"start": "2026-03-01T11:00:00+04:00", "end": "2026-03-01T12:30:00+04:00",
                     "available_table_ids": [], "count": 0}
                ],
                "restaurant_timezone": "Asia/Baku"
            }"#,
        )
        .unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_for_exact_start() {
        let resp = response();
        let slot = resp.slot_for(Some(t(10, 30))).unwrap();
        assert_eq!(slot.available_table_ids, vec!["t2".to_string()]);
    }

    #[test]
    fn test_slot_for_between_starts_uses_latest_started() {
        let resp = response();
        let slot = resp.slot_for(Some(t(10, 45))).unwrap();
        assert_eq!(slot.start.time(), t(10, 30));
    }

    #[test]
    fn test_slot_for_after_midnight() {
        let resp: AvailabilityResponse = serde_json::from_str(
            r#"{"slots": [
                {"start": "2026-03-01T22:30:00+04:00", "end": "2026-03-02T00:00:00+04:00",
                 "available_table_ids": ["t1"]},
                {"start": "2026-03-01T23:30:00+04:00", "end": "2026-03-02T01:00:00+04:00",
                 "available_table_ids": ["t2"]}
            ]}"#,
        )
        .unwrap();
        let slot = resp.slot_for(Some(t(0, 30))).unwrap();
        assert_eq!(slot.available_table_ids, vec!["t2".to_string()]);
        let slot = resp.slot_for(Some(t(23, 45))).unwrap();
        assert_eq!(slot.start.time(), t(23, 30));
        assert!(resp.slot_for(Some(t(1, 30))).is_none());
    }

    #[test]
    fn test_slot_for_outside_service() {
        let resp = response();
        assert!(resp.slot_for(Some(t(9, 0))).is_none());
        assert!(resp.slot_for(Some(t(13, 0))).is_none());
        assert_eq!(resp.slot_for(None).unwrap().start.time(), t(10, 0));
    }

    #[test]
    fn test_snapshot_from_slot() {
        let resp = response();
        let now = Utc::now();
        let snap = AvailabilitySnapshot::from_slot(resp.slot_for(Some(t(10, 0))), now);
        assert!(snap.is_available("t1"));
        assert!(!snap.is_available("t9"));
        assert_eq!(snap.last_synced_at, Some(now));
        assert!(!snap.is_stale());

        let empty = AvailabilitySnapshot::from_slot(None, now);
        assert_eq!(empty.available_table_ids, Some(HashSet::new()));
        assert!(empty.slot_start.is_none());
    }

    #[test]
    fn test_default_snapshot_is_unknown() {
        let snap = AvailabilitySnapshot::default();
        assert!(snap.available_table_ids.is_none());
        assert!(!snap.is_available("t1"));
    }
}
