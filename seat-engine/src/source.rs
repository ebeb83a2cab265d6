//! Collaborator traits
//!
//! The engines never talk HTTP themselves; hosts hand them an implementation
//! (the `seat-client` crate provides one backed by reqwest, tests use fakes).

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;
use shared::models::{AvailabilityResponse, LocationSuggestion};
use tokio_util::sync::CancellationToken;

/// Source of live table availability
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn fetch_availability(
        &self,
        venue_id: &str,
        date: NaiveDate,
        party_size: u32,
    ) -> AppResult<AvailabilityResponse>;
}

/// Source of location suggestions for the arrival picker
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Implementations should stop work once `cancel` fires; the engine
    /// discards whatever they return after that anyway.
    async fn fetch_location_suggestions(
        &self,
        context_id: &str,
        query: &str,
        limit: usize,
        cancel: CancellationToken,
    ) -> AppResult<Vec<LocationSuggestion>>;
}
