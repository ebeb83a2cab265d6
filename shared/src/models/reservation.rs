//! Reservation model
//!
//! Created by the hosting screen once a table is picked; the seating engine
//! itself never books.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Booked,
    Cancelled,
}

/// Create reservation payload (`POST /reservations`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub restaurant_id: String,
    pub party_size: u32,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub guest_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

impl ReservationCreate {
    /// Client-side mirror of the backend validators
    pub fn validate(&self) -> AppResult<()> {
        if self.party_size < 1 {
            return Err(AppError::validation("party_size must be >= 1")
                .with_detail("field", "party_size"));
        }
        if self.end <= self.start {
            return Err(AppError::validation("end must be after start").with_detail("field", "end"));
        }
        if self.guest_name.trim().is_empty() {
            return Err(AppError::validation("guest_name is required")
                .with_detail("field", "guest_name"));
        }
        Ok(())
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub restaurant_id: String,
    pub party_size: u32,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub guest_name: String,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub status: ReservationStatus,
}
