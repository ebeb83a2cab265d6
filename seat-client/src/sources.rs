//! `seat-engine` collaborator impls backed by [`HttpClient`]

use async_trait::async_trait;
use chrono::NaiveDate;
use seat_engine::{AvailabilitySource, SuggestionSource};
use shared::error::AppResult;
use shared::models::{AvailabilityResponse, LocationSuggestion};
use tokio_util::sync::CancellationToken;

use crate::HttpClient;

#[async_trait]
impl AvailabilitySource for HttpClient {
    async fn fetch_availability(
        &self,
        venue_id: &str,
        date: NaiveDate,
        party_size: u32,
    ) -> AppResult<AvailabilityResponse> {
        HttpClient::fetch_availability(self, venue_id, date, party_size)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl SuggestionSource for HttpClient {
    async fn fetch_location_suggestions(
        &self,
        context_id: &str,
        query: &str,
        limit: usize,
        cancel: CancellationToken,
    ) -> AppResult<Vec<LocationSuggestion>> {
        HttpClient::fetch_location_suggestions(self, context_id, query, limit, cancel)
            .await
            .map_err(Into::into)
    }
}
