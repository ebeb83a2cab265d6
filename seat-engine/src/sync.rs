//! Live availability sync
//!
//! `start()` fetches immediately and then polls on a fixed interval until
//! `stop()`. A failed poll never clears data: the last good table ids and
//! `last_synced_at` stay visible and only `sync_error` is set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{NaiveTime, Utc};
use shared::error::AppError;
use shared::models::{AvailabilityQuery, AvailabilityResponse, AvailabilitySlot, AvailabilitySnapshot};
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::error::{EngineError, EngineResult};
use crate::gate::RequestGate;
use crate::source::AvailabilitySource;

const ALERT_CAPACITY: usize = 16;

/// Who asked for a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Pull-to-refresh: shows `syncing` and raises an alert on failure
    Manual,
    /// Interval tick: silent
    Background,
}

/// Everything the map screen needs about availability
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailabilityState {
    pub query: Option<AvailabilityQuery>,
    pub snapshot: AvailabilitySnapshot,
    /// Last successful payload (all slots of the day)
    pub availability: AvailabilityResponse,
    pub syncing: bool,
}

/// Failure of a manual refresh, for a toast or dialog
#[derive(Debug, Clone, PartialEq)]
pub struct SyncAlert {
    pub venue_id: String,
    pub error: AppError,
}

pub struct AvailabilitySyncEngine {
    source: Arc<dyn AvailabilitySource>,
    config: SyncConfig,
    state: watch::Sender<AvailabilityState>,
    gate: RequestGate,
    /// Sequence of the latest manual refresh; only it may clear `syncing`
    manual: AtomicU64,
    poller: Mutex<Option<CancellationToken>>,
    alerts: broadcast::Sender<SyncAlert>,
}

impl std::fmt::Debug for AvailabilitySyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilitySyncEngine")
            .field("config", &self.config)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl AvailabilitySyncEngine {
    pub fn new(source: Arc<dyn AvailabilitySource>, config: SyncConfig) -> Self {
        let config = if config.poll_interval.is_zero() {
            tracing::warn!("poll_interval is zero, using default");
            SyncConfig::default()
        } else {
            config
        };
        let (state, _) = watch::channel(AvailabilityState::default());
        let (alerts, _) = broadcast::channel(ALERT_CAPACITY);
        Self {
            source,
            config,
            state,
            gate: RequestGate::new(),
            manual: AtomicU64::new(0),
            poller: Mutex::new(None),
            alerts,
        }
    }

    /// Begin polling for `query`: one fetch right away, then every
    /// `poll_interval`. Restarting with a different query drops the old data.
    pub fn start(self: &Arc<Self>, query: AvailabilityQuery) {
        self.stop();

        self.state.send_modify(|s| {
            if s.query.as_ref() != Some(&query) {
                s.snapshot = AvailabilitySnapshot::default();
                s.availability = AvailabilityResponse::default();
            }
            s.query = Some(query.clone());
        });

        let token = CancellationToken::new();
        *self.poller.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        let engine = Arc::downgrade(self);
        let period = self.config.poll_interval;
        tokio::spawn(async move {
            tracing::info!(venue_id = %query.venue_id, ?period, "Availability poller started");
            Self::poll_loop(engine, token, period).await;
            tracing::info!(venue_id = %query.venue_id, "Availability poller stopped");
        });
    }

    async fn poll_loop(engine: Weak<Self>, token: CancellationToken, period: std::time::Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(engine) = engine.upgrade() else { break };
                    // failures are recorded on the snapshot
                    let _ = engine.refresh(RefreshMode::Background).await;
                }
            }
        }
    }

    /// Cancel the poller and any in-flight fetch
    pub fn stop(&self) {
        if let Some(token) = self.poller.lock().unwrap_or_else(PoisonError::into_inner).take() {
            token.cancel();
        }
        self.gate.invalidate();
        self.state.send_if_modified(|s| std::mem::replace(&mut s.syncing, false));
    }

    /// Fetch now.
    ///
    /// A refresh superseded by a newer one (or by `stop()`) returns `Ok(())`
    /// without touching state. A background poll never supersedes a manual
    /// refresh that is still in flight; it is skipped instead.
    pub async fn refresh(&self, mode: RefreshMode) -> EngineResult<()> {
        let Some(query) = self.state.borrow().query.clone() else {
            return Err(EngineError::NotStarted);
        };

        if mode == RefreshMode::Background && self.state.borrow().syncing {
            tracing::debug!(venue_id = %query.venue_id, "Manual refresh in flight, skipping poll");
            return Ok(());
        }

        let ticket = self.gate.issue();
        if mode == RefreshMode::Manual {
            self.manual.store(ticket.sequence, Ordering::SeqCst);
            self.state.send_modify(|s| s.syncing = true);
        }
        tracing::debug!(venue_id = %query.venue_id, sequence = ticket.sequence, ?mode, "Fetching availability");

        let outcome = tokio::select! {
            _ = ticket.cancel.cancelled() => None,
            result = self.source.fetch_availability(&query.venue_id, query.date, query.party_size) => Some(result),
        };
        if mode == RefreshMode::Manual && self.manual.load(Ordering::SeqCst) == ticket.sequence {
            self.state.send_modify(|s| s.syncing = false);
        }

        let result = match outcome {
            Some(result) if self.gate.is_current(ticket.sequence) => result,
            _ => {
                tracing::debug!(sequence = ticket.sequence, "Discarding superseded availability fetch");
                return Ok(());
            }
        };

        match result {
            Ok(response) => {
                let synced_at = Utc::now();
                self.state.send_modify(move |s| {
                    let time = s.query.as_ref().and_then(|q| q.time);
                    s.snapshot = AvailabilitySnapshot::from_slot(response.slot_for(time), synced_at);
                    s.availability = response;
                });
                tracing::debug!(venue_id = %query.venue_id, "Availability synced");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(venue_id = %query.venue_id, error = %error, ?mode, "Availability sync failed");
                self.state.send_modify(|s| s.snapshot.sync_error = Some(error.message.clone()));
                if mode == RefreshMode::Manual {
                    // no receivers is fine
                    let _ = self.alerts.send(SyncAlert {
                        venue_id: query.venue_id.clone(),
                        error: error.clone(),
                    });
                }
                Err(error.into())
            }
        }
    }

    /// Pick another slot from the cached day without a network round-trip
    pub fn set_time(&self, time: Option<NaiveTime>) {
        self.state.send_modify(|s| {
            let Some(query) = s.query.as_mut() else {
                return;
            };
            query.time = time;
            let Some(synced_at) = s.snapshot.last_synced_at else {
                return;
            };
            let error = s.snapshot.sync_error.take();
            s.snapshot = AvailabilitySnapshot::from_slot(s.availability.slot_for(time), synced_at);
            s.snapshot.sync_error = error;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AvailabilityState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> AvailabilitySnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn slots(&self) -> Vec<AvailabilitySlot> {
        self.state.borrow().availability.slots.clone()
    }

    pub fn alerts(&self) -> broadcast::Receiver<SyncAlert> {
        self.alerts.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for AvailabilitySyncEngine {
    fn drop(&mut self) {
        if let Some(token) = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            token.cancel();
        }
    }
}
