//! HTTP client for the reservation backend

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use seat_engine::SearchConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    AvailabilityResponse, Floorplan, LocationSuggestion, Reservation, ReservationCreate,
};
use tokio_util::sync::CancellationToken;

use crate::{ClientConfig, ClientError, ClientResult};

/// Longest query the suggestions endpoint accepts
pub const MAX_QUERY_CHARS: usize = 80;

/// HTTP client for making requests to the reservation backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        let response = self.authorize(request).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self
            .authorize(self.client.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = error_detail(&response.text().await?);
            tracing::debug!(%status, detail = %text, "Backend returned error");
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(text))
                }
                StatusCode::REQUEST_TIMEOUT
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT => Err(ClientError::Unavailable(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    // ========== Venue API ==========

    /// Floor plan of a venue, raw (not yet normalized)
    pub async fn fetch_floorplan(&self, venue_id: &str) -> ClientResult<Floorplan> {
        self.get(&format!("restaurants/{}/floorplan", venue_id)).await
    }

    /// All slots of one day for a party size
    pub async fn fetch_availability(
        &self,
        venue_id: &str,
        date: NaiveDate,
        party_size: u32,
    ) -> ClientResult<AvailabilityResponse> {
        let date = date.format("%Y-%m-%d").to_string();
        let party_size = party_size.to_string();
        self.get_with_query(
            &format!("restaurants/{}/availability", venue_id),
            &[("date", date.as_str()), ("party_size", party_size.as_str())],
        )
        .await
    }

    // ========== Reservation API ==========

    /// Arrival location suggestions; aborts the request once `cancel` fires
    pub async fn fetch_location_suggestions(
        &self,
        reservation_id: &str,
        query: &str,
        limit: usize,
        cancel: CancellationToken,
    ) -> ClientResult<Vec<LocationSuggestion>> {
        let q: String = query.trim().chars().take(MAX_QUERY_CHARS).collect();
        let limit = limit.clamp(1, SearchConfig::MAX_LIMIT).to_string();
        let path = format!("reservations/{}/arrival_intent/suggestions", reservation_id);

        let params = [("q", q.as_str()), ("limit", limit.as_str())];

        tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.get_with_query(&path, &params) => result,
        }
    }

    /// Book a table; the payload is checked locally before sending
    pub async fn create_reservation(&self, payload: &ReservationCreate) -> ClientResult<Reservation> {
        payload
            .validate()
            .map_err(|e| ClientError::Validation(e.message))?;
        let reservation: Reservation = self.post("reservations", payload).await?;
        tracing::info!(reservation_id = %reservation.id, table_id = ?reservation.table_id, "Reservation created");
        Ok(reservation)
    }
}

/// FastAPI-style `{"detail": "..."}` bodies are unwrapped, anything else is
/// kept verbatim
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.to_string())
}
