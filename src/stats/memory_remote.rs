//! In-process remote stats store with fault injection.

use super::remote::{RemoteError, RemoteStatsStore};
use super::types::{PrincipalId, RemoteStatsRecord, StatKind, TimestampUtc};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct MemoryInner {
    records: Mutex<HashMap<PrincipalId, RemoteStatsRecord>>,
    offline: AtomicBool,
    increment_failures: Mutex<VecDeque<RemoteError>>,
    fetch_failures: Mutex<VecDeque<RemoteError>>,
    increment_gate: Mutex<Option<Arc<Notify>>>,
    creates: AtomicUsize,
    increments: AtomicUsize,
}

/// Remote store held entirely in memory. Cloning shares the same records.
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<MemoryInner>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the store becoming unreachable (or reachable again).
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Queues an error returned by the next increment call.
    pub fn fail_next_increment(&self, error: RemoteError) {
        lock(&self.inner.increment_failures).push_back(error);
    }

    /// Queues an error returned by the next fetch call.
    pub fn fail_next_fetch(&self, error: RemoteError) {
        lock(&self.inner.fetch_failures).push_back(error);
    }

    /// Holds every increment until the returned `Notify` is signalled
    /// (one `notify_one` releases one increment).
    pub fn hold_increments(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.inner.increment_gate) = Some(gate.clone());
        gate
    }

    /// Overwrites a record directly, bypassing timestamps.
    pub fn put_record(&self, principal: &PrincipalId, record: RemoteStatsRecord) {
        lock(&self.inner.records).insert(principal.clone(), record);
    }

    pub fn record(&self, principal: &PrincipalId) -> Option<RemoteStatsRecord> {
        lock(&self.inner.records).get(principal).cloned()
    }

    /// Number of records provisioned by `create_if_absent`.
    pub fn create_count(&self) -> usize {
        self.inner.creates.load(Ordering::SeqCst)
    }

    /// Number of increments that reached the store (successful or not).
    pub fn increment_count(&self) -> usize {
        self.inner.increments.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::unavailable("client is offline"));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteStatsStore for MemoryRemoteStore {
    async fn fetch(
        &self,
        principal: &PrincipalId,
    ) -> Result<Option<RemoteStatsRecord>, RemoteError> {
        self.check_online()?;
        if let Some(error) = lock(&self.inner.fetch_failures).pop_front() {
            return Err(error);
        }
        Ok(self.record(principal))
    }

    async fn create_if_absent(
        &self,
        principal: &PrincipalId,
    ) -> Result<RemoteStatsRecord, RemoteError> {
        self.check_online()?;
        let mut records = lock(&self.inner.records);
        let record = records.entry(principal.clone()).or_insert_with(|| {
            self.inner.creates.fetch_add(1, Ordering::SeqCst);
            RemoteStatsRecord::provisioned(TimestampUtc::now())
        });
        Ok(record.clone())
    }

    async fn increment(
        &self,
        principal: &PrincipalId,
        kind: StatKind,
        delta: i64,
    ) -> Result<(), RemoteError> {
        self.inner.increments.fetch_add(1, Ordering::SeqCst);
        let gate = lock(&self.inner.increment_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.check_online()?;
        if let Some(error) = lock(&self.inner.increment_failures).pop_front() {
            return Err(error);
        }

        let mut records = lock(&self.inner.records);
        match records.get_mut(principal) {
            Some(record) => {
                record.increment(kind, delta, TimestampUtc::now());
                Ok(())
            }
            None => Err(RemoteError::NotFound {
                message: format!("no stats document for {}", principal),
            }),
        }
    }

    async fn probe(&self) -> Result<(), RemoteError> {
        self.check_online()
    }
}

#[cfg(test)]
#[path = "tests/memory_remote_tests.rs"]
mod tests;
