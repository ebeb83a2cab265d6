//! Debounced location suggestion search
//!
//! Every `query()` takes a new ticket from the gate, which cancels the
//! previous debounce timer or fetch. A completion is applied only while its
//! sequence is still current, so the visible results always belong to the
//! latest query no matter which response arrives first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::error::{AppError, AppResult};
use shared::models::LocationSuggestion;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::SearchConfig;
use crate::gate::RequestGate;
use crate::source::SuggestionSource;

/// Search failure as shown to the guest
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Location access refused; the picker falls back to presets
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Suggestion fetch failed: {0}")]
    Fetch(String),
}

impl From<AppError> for SearchError {
    fn from(err: AppError) -> Self {
        if err.is_permission_denied() {
            Self::PermissionDenied
        } else {
            Self::Fetch(err.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestionQueryState {
    /// Trimmed, truncated query text
    pub query: String,
    pub results: Vec<LocationSuggestion>,
    pub sequence: u64,
    /// `results` do not belong to `query`
    pub is_stale: bool,
    pub loading: bool,
    pub has_fetched: bool,
    pub error: Option<SearchError>,
}

/// What the picker list should render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestionDisplay<'a> {
    Results(&'a [LocationSuggestion]),
    /// Last known results, dimmed while a newer query is pending or failed
    Stale(&'a [LocationSuggestion]),
    Presets(&'a [LocationSuggestion]),
}

impl SuggestionQueryState {
    pub fn display<'a>(&'a self, presets: &'a [LocationSuggestion]) -> SuggestionDisplay<'a> {
        if self.error == Some(SearchError::PermissionDenied)
            || self.query.is_empty()
            || self.results.is_empty()
        {
            SuggestionDisplay::Presets(presets)
        } else if self.is_stale {
            SuggestionDisplay::Stale(&self.results)
        } else {
            SuggestionDisplay::Results(&self.results)
        }
    }
}

pub struct SuggestionSearchEngine {
    source: Arc<dyn SuggestionSource>,
    config: SearchConfig,
    context_id: String,
    enabled: AtomicBool,
    gate: RequestGate,
    state: watch::Sender<SuggestionQueryState>,
}

impl std::fmt::Debug for SuggestionSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionSearchEngine")
            .field("context_id", &self.context_id)
            .field("config", &self.config)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl SuggestionSearchEngine {
    /// `context_id` is the reservation the arrival picker belongs to
    pub fn new(
        source: Arc<dyn SuggestionSource>,
        context_id: impl Into<String>,
        config: SearchConfig,
    ) -> Self {
        let (state, _) = watch::channel(SuggestionQueryState::default());
        Self {
            source,
            enabled: AtomicBool::new(config.enabled),
            config,
            context_id: context_id.into(),
            gate: RequestGate::new(),
            state,
        }
    }

    /// Submit the current input text; returns the sequence it was tagged with
    pub fn query(self: &Arc<Self>, text: &str) -> u64 {
        let query: String = text.trim().chars().take(self.config.max_query_chars).collect();
        let ticket = self.gate.issue();
        let sequence = ticket.sequence;
        let searchable =
            self.is_enabled() && query.chars().count() >= self.config.min_query_chars;

        self.state.send_modify(|s| {
            s.query = query.clone();
            s.sequence = sequence;
            s.is_stale = true;
            s.loading = searchable;
        });

        if !searchable {
            tracing::debug!(sequence, "Query not searchable, results marked stale");
            return sequence;
        }

        let engine = Arc::clone(self);
        let limit = self.config.effective_limit();
        let debounce = self.config.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = ticket.cancel.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            tracing::debug!(sequence = ticket.sequence, query = %query, "Fetching suggestions");
            let result = tokio::select! {
                _ = ticket.cancel.cancelled() => return,
                result = engine.source.fetch_location_suggestions(
                    &engine.context_id,
                    &query,
                    limit,
                    ticket.cancel.clone(),
                ) => result,
            };
            engine.apply(ticket.sequence, result);
        });

        sequence
    }

    /// Apply a completion if `sequence` is still current
    pub(crate) fn apply(&self, sequence: u64, result: AppResult<Vec<LocationSuggestion>>) -> bool {
        let applied = self.state.send_if_modified(|s| {
            if !self.gate.is_current(sequence) || s.sequence != sequence {
                return false;
            }
            s.loading = false;
            s.has_fetched = true;
            match result {
                Ok(results) => {
                    s.results = results;
                    s.is_stale = false;
                    s.error = None;
                }
                Err(e) => {
                    tracing::warn!(sequence, error = %e, "Suggestion search failed");
                    s.is_stale = true;
                    s.error = Some(e.into());
                }
            }
            true
        });
        if !applied {
            tracing::debug!(sequence, "Discarding stale suggestion response");
        }
        applied
    }

    /// Drop pending work, keep what is shown
    pub fn cancel(&self) {
        self.gate.invalidate();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
    }

    /// Drop pending work and clear everything
    pub fn reset(&self) {
        let sequence = self.gate.invalidate();
        self.state.send_replace(SuggestionQueryState {
            sequence,
            ..Default::default()
        });
    }

    /// Disabling cancels pending work; later queries only mark results stale
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::SeqCst);
        if was && !enabled {
            self.cancel();
            self.state.send_if_modified(|s| !std::mem::replace(&mut s.is_stale, true));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn state(&self) -> SuggestionQueryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionQueryState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct Never;

    #[async_trait]
    impl SuggestionSource for Never {
        async fn fetch_location_suggestions(
            &self,
            _: &str,
            _: &str,
            _: usize,
            cancel: CancellationToken,
        ) -> AppResult<Vec<LocationSuggestion>> {
            cancel.cancelled().await;
            Err(AppError::cancelled())
        }
    }

    fn place(name: &str) -> LocationSuggestion {
        LocationSuggestion {
            id: name.to_string(),
            name: name.to_string(),
            address: None,
            lat: 40.4,
            lon: 49.8,
            distance_km: None,
            eta_minutes: None,
        }
    }

    fn engine() -> Arc<SuggestionSearchEngine> {
        Arc::new(SuggestionSearchEngine::new(
            Arc::new(Never),
            "res-1",
            SearchConfig::default().with_debounce(Duration::from_secs(3600)),
        ))
    }

    #[tokio::test]
    async fn test_latest_sequence_wins_regardless_of_arrival_order() {
        let engine = engine();
        let ko = engine.query("ko");
        let koala = engine.query("koala");
        assert!(koala > ko);

        // koala resolves first
        assert!(engine.apply(koala, Ok(vec![place("koala")])));
        assert!(!engine.apply(ko, Ok(vec![place("ko")])));

        let state = engine.state();
        assert_eq!(state.query, "koala");
        assert_eq!(state.results, vec![place("koala")]);
        assert!(!state.is_stale);
        assert!(state.has_fetched);
    }

    #[tokio::test]
    async fn test_failure_keeps_results_and_marks_stale() {
        let engine = engine();
        let first = engine.query("koala");
        engine.apply(first, Ok(vec![place("koala")]));
        let second = engine.query("koala park");
        engine.apply(second, Err(AppError::network("offline")));

        let state = engine.state();
        assert_eq!(state.results, vec![place("koala")]);
        assert!(state.is_stale);
        assert_eq!(state.error, Some(SearchError::Fetch("offline".into())));
        assert!(matches!(state.display(&[]), SuggestionDisplay::Stale(r) if r.len() == 1));
    }

    #[tokio::test]
    async fn test_query_is_trimmed_and_truncated() {
        let engine = engine();
        let long = format!("  {}  ", "a".repeat(200));
        engine.query(&long);
        assert_eq!(engine.state().query.chars().count(), 80);
        engine.reset();
    }

    #[test]
    fn test_permission_error_maps_to_distinct_state() {
        assert_eq!(SearchError::from(AppError::location_denied()), SearchError::PermissionDenied);
        assert_eq!(
            SearchError::from(AppError::internal("boom")),
            SearchError::Fetch("boom".into())
        );
    }

    #[test]
    fn test_display_prefers_presets_without_results() {
        let presets = vec![place("Home")];
        let state = SuggestionQueryState::default();
        assert_eq!(state.display(&presets), SuggestionDisplay::Presets(&presets));

        let state = SuggestionQueryState {
            query: "koala".into(),
            results: vec![place("koala")],
            error: Some(SearchError::PermissionDenied),
            ..Default::default()
        };
        assert_eq!(state.display(&presets), SuggestionDisplay::Presets(&presets));
    }
}
