//! In-process session gate.

use super::{PrincipalSubscription, SessionGate};
use crate::stats::PrincipalId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

type ListenerMap = HashMap<u64, mpsc::UnboundedSender<Option<PrincipalId>>>;

#[derive(Default)]
struct GateInner {
    current: Mutex<Option<PrincipalId>>,
    listeners: Mutex<ListenerMap>,
    next_listener_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Session gate driven by explicit sign-in/sign-out calls.
///
/// Clones share the same session.
#[derive(Clone, Default)]
pub struct LocalSessionGate {
    inner: Arc<GateInner>,
}

impl LocalSessionGate {
    /// Creates a gate with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate with `principal` already signed in.
    pub fn signed_in(principal: PrincipalId) -> Self {
        let gate = Self::new();
        *lock(&gate.inner.current) = Some(principal);
        gate
    }

    pub fn sign_in(&self, principal: PrincipalId) {
        self.transition(Some(principal));
    }

    pub fn sign_out(&self) {
        self.transition(None);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    fn transition(&self, principal: Option<PrincipalId>) {
        *lock(&self.inner.current) = principal.clone();

        let mut listeners = lock(&self.inner.listeners);
        // Drop listeners whose receiver is gone
        listeners.retain(|_, tx| tx.send(principal.clone()).is_ok());
        tracing::debug!(
            "Principal transition to {:?} delivered to {} listener(s)",
            principal.as_ref().map(PrincipalId::as_str),
            listeners.len()
        );
    }
}

impl SessionGate for LocalSessionGate {
    fn current_principal(&self) -> Option<PrincipalId> {
        lock(&self.inner.current).clone()
    }

    fn subscribe(&self) -> PrincipalSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.inner.listeners).insert(id, tx);

        let weak: Weak<GateInner> = Arc::downgrade(&self.inner);
        PrincipalSubscription::new(rx, move || {
            if let Some(inner) = weak.upgrade() {
                lock(&inner.listeners).remove(&id);
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod tests;
