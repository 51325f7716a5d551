//! Usage statistics store with optimistic updates and offline fallback.
//!
//! The store owns the in-memory view of the current principal's counters.
//! Durability belongs to the injected `RemoteStatsStore`; identity comes from
//! the injected `SessionGate`. Observers read the state through a `watch`
//! channel and never mutate it.
//!
//! Every operation returns an outcome value instead of an error: a failed
//! load keeps the last known counters, a failed increment is compensated by
//! a rollback of exactly the delta it applied.

use super::remote::{RemoteError, RemoteStatsStore};
use super::types::{LoadPhase, PrincipalId, StatKind, StoreState, UsageStats};
use crate::session_gate::SessionGate;
use crate::structured_logger::StructuredLogger;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Result of `initialize_stats`, `load_user_stats` and `refresh_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// An existing record was overlaid onto local state.
    Loaded,
    /// No record existed; a zeroed one was created.
    Provisioned,
    /// The remote store was unreachable; local state kept.
    Offline,
    /// Any other remote failure; local state kept.
    Failed { reason: String },
    /// Nobody was signed in, so nothing was loaded.
    NoPrincipal,
}

/// Result of `increment_stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The remote store accepted the increment.
    Confirmed { value: u64 },
    /// Persisting failed and the optimistic delta was reverted.
    RolledBack { value: u64, error: RemoteError },
    /// Nobody was signed in; nothing changed.
    NoPrincipal,
}

/// An optimistic delta awaiting remote confirmation.
#[derive(Debug, Clone, Copy)]
struct PendingIncrement {
    kind: StatKind,
    delta: i64,
    /// Whether `delta` is still part of the displayed counters. A load that
    /// overlays a remote snapshot clears this, making a later rollback a no-op.
    reflected: bool,
}

/// Stats store for one app session.
pub struct StatsStore {
    session: Arc<dyn SessionGate>,
    remote: Arc<dyn RemoteStatsStore>,
    state_tx: watch::Sender<StoreState>,
    pending: Mutex<HashMap<u64, PendingIncrement>>,
    next_pending_id: AtomicU64,
    events: Option<Arc<StructuredLogger>>,
}

impl StatsStore {
    /// Creates a store with zeroed counters and `is_loading = true`.
    pub fn new(session: Arc<dyn SessionGate>, remote: Arc<dyn RemoteStatsStore>) -> Self {
        let (state_tx, _) = watch::channel(StoreState::default());
        Self {
            session,
            remote,
            state_tx,
            pending: Mutex::new(HashMap::new()),
            next_pending_id: AtomicU64::new(1),
            events: None,
        }
    }

    /// Attaches a structured event log.
    pub fn with_event_log(mut self, events: Arc<StructuredLogger>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> StoreState {
        self.state_tx.borrow().clone()
    }

    /// Current counters.
    pub fn stats(&self) -> UsageStats {
        self.state_tx.borrow().stats
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state_tx.subscribe()
    }

    /// Number of optimistic increments not yet confirmed or rolled back.
    pub fn pending_increments(&self) -> usize {
        self.lock_pending().len()
    }

    /// Loads the signed-in principal's stats, waiting for a sign-in if needed.
    ///
    /// Subscribes before reading the snapshot so a sign-in between the two
    /// is not missed. The subscription is released after its first event.
    pub async fn initialize_stats(&self) -> LoadOutcome {
        let mut subscription = self.session.subscribe();

        if let Some(principal) = self.session.current_principal() {
            subscription.unsubscribe();
            return self.load_user_stats(&principal).await;
        }

        tracing::debug!("No principal yet, waiting for first session transition");
        let change = subscription.next_change().await;
        subscription.unsubscribe();

        match change {
            Some(Some(principal)) => self.load_user_stats(&principal).await,
            _ => {
                tracing::info!("Session transition carried no principal, skipping stats load");
                self.state_tx.send_modify(|state| {
                    state.is_loading = false;
                });
                self.record_load(None, LoadOutcome::NoPrincipal)
            }
        }
    }

    /// Reads the remote record for `principal`, provisioning it when absent.
    pub async fn load_user_stats(&self, principal: &PrincipalId) -> LoadOutcome {
        self.state_tx.send_modify(|state| {
            state.phase = LoadPhase::Loading;
        });

        let outcome = match self.remote.fetch(principal).await {
            Ok(Some(record)) => {
                let stats = record.to_usage_stats();
                self.finish_load(Some(stats), Some(true), LoadPhase::Ready);
                LoadOutcome::Loaded
            }
            Ok(None) => match self.remote.create_if_absent(principal).await {
                Ok(record) => {
                    tracing::info!("Provisioned stats record for {}", principal);
                    self.finish_load(Some(record.to_usage_stats()), Some(true), LoadPhase::Ready);
                    LoadOutcome::Provisioned
                }
                Err(e) => self.load_failed(principal, e),
            },
            Err(e) => self.load_failed(principal, e),
        };

        self.record_load(Some(principal.as_str()), outcome)
    }

    /// Optimistically increments one counter and persists it.
    ///
    /// The new value is visible to observers before the remote call is issued.
    /// On failure the recorded delta is reverted.
    pub async fn increment_stat(&self, kind: StatKind) -> IncrementOutcome {
        let Some(principal) = self.session.current_principal() else {
            tracing::warn!("Cannot increment {}: no signed-in principal", kind);
            return IncrementOutcome::NoPrincipal;
        };

        let pending_id = self.apply_optimistic(kind, 1);

        match self.remote.increment(&principal, kind, 1).await {
            Ok(()) => {
                self.lock_pending().remove(&pending_id);
                self.state_tx.send_if_modified(|state| {
                    let changed = !state.is_online;
                    state.is_online = true;
                    changed
                });
                if let Some(events) = &self.events {
                    events.log_increment_confirmed(pending_id, kind);
                }
                IncrementOutcome::Confirmed {
                    value: self.stats().get(kind),
                }
            }
            Err(error) => {
                tracing::warn!("Failed to persist {} increment, rolling back: {}", kind, error);
                let value = self.rollback(pending_id, kind, error.is_unavailable());
                if let Some(events) = &self.events {
                    events.log_rollback(pending_id, kind, value, &error.to_string());
                }
                IncrementOutcome::RolledBack { value, error }
            }
        }
    }

    /// Reloads from the remote store, discarding unconfirmed optimistic values.
    pub async fn refresh_stats(&self) -> LoadOutcome {
        match self.session.current_principal() {
            Some(principal) => self.load_user_stats(&principal).await,
            None => {
                tracing::warn!("Cannot refresh stats: no signed-in principal");
                LoadOutcome::NoPrincipal
            }
        }
    }

    /// Probes the remote store and updates `is_online`. Returns the new value.
    ///
    /// Only reachability failures flip the flag to offline.
    pub async fn check_network_status(&self) -> bool {
        match self.remote.probe().await {
            Ok(()) => self.set_online(true),
            Err(e) if e.is_unavailable() => {
                tracing::info!("Remote store unreachable: {}", e);
                self.set_online(false);
            }
            Err(e) => {
                tracing::warn!("Network probe failed without a reachability signal: {}", e);
            }
        }
        self.state_tx.borrow().is_online
    }

    fn apply_optimistic(&self, kind: StatKind, delta: i64) -> u64 {
        let pending_id = self.next_pending_id.fetch_add(1, Ordering::SeqCst);

        // Ledger and counters change together under the state lock
        self.state_tx.send_modify(|state| {
            state.stats.apply_delta(kind, delta);
            self.lock_pending().insert(
                pending_id,
                PendingIncrement {
                    kind,
                    delta,
                    reflected: true,
                },
            );
        });

        if let Some(events) = &self.events {
            events.log_optimistic_applied(pending_id, kind, self.stats().get(kind));
        }
        pending_id
    }

    /// Reverts the delta recorded under `pending_id` if it is still displayed;
    /// returns the resulting value.
    fn rollback(&self, pending_id: u64, kind: StatKind, offline: bool) -> u64 {
        let mut value = 0;
        self.state_tx.send_modify(|state| {
            let pending = self.lock_pending().remove(&pending_id);
            if let Some(pending) = pending.filter(|p| p.reflected) {
                state.stats.apply_delta(pending.kind, -pending.delta);
            }
            value = state.stats.get(kind);
            if offline {
                state.is_online = false;
            }
        });
        value
    }

    fn finish_load(&self, stats: Option<UsageStats>, online: Option<bool>, phase: LoadPhase) {
        self.state_tx.send_modify(|state| {
            if let Some(stats) = stats {
                state.stats = stats;
                // In-flight deltas are not part of the snapshot
                for pending in self.lock_pending().values_mut() {
                    pending.reflected = false;
                }
            }
            if let Some(online) = online {
                state.is_online = online;
            }
            state.is_loading = false;
            state.phase = phase;
        });
    }

    fn load_failed(&self, principal: &PrincipalId, error: RemoteError) -> LoadOutcome {
        if error.is_unavailable() {
            tracing::info!("Remote store offline, keeping cached stats for {}", principal);
            self.finish_load(None, Some(false), LoadPhase::Degraded);
            LoadOutcome::Offline
        } else {
            tracing::error!("Failed to load stats for {}: {}", principal, error);
            self.finish_load(None, None, LoadPhase::Degraded);
            LoadOutcome::Failed {
                reason: error.to_string(),
            }
        }
    }

    fn set_online(&self, online: bool) {
        let changed = self.state_tx.send_if_modified(|state| {
            let changed = state.is_online != online;
            state.is_online = online;
            changed
        });
        if changed {
            if let Some(events) = &self.events {
                events.log_network_status(online);
            }
        }
    }

    fn record_load(&self, principal: Option<&str>, outcome: LoadOutcome) -> LoadOutcome {
        if let Some(events) = &self.events {
            events.log_load_outcome(principal, &outcome);
        }
        outcome
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<u64, PendingIncrement>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
