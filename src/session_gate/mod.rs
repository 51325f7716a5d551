//! Session gate: who is signed in, and a subscription for principal changes.
//!
//! The stats store consumes this interface to know whose counters to load.
//! The identity provider behind it is an external collaborator; `LocalSessionGate`
//! is the in-process implementation used by the CLI and tests.

pub mod local;

pub use local::LocalSessionGate;

use crate::stats::PrincipalId;
use tokio::sync::mpsc;

/// Source of the current authenticated principal.
pub trait SessionGate: Send + Sync {
    /// Synchronous snapshot of the current principal.
    fn current_principal(&self) -> Option<PrincipalId>;

    /// Registers a listener for principal transitions.
    fn subscribe(&self) -> PrincipalSubscription;
}

/// A registered principal-change listener.
///
/// Released by `unsubscribe()` or on drop.
pub struct PrincipalSubscription {
    /// Receiver for principal transitions (`None` = signed out)
    rx: mpsc::UnboundedReceiver<Option<PrincipalId>>,
    /// Removes the listener from the gate
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl PrincipalSubscription {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Option<PrincipalId>>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            release: Some(Box::new(release)),
        }
    }

    /// Waits for the next transition.
    ///
    /// Returns `Some(None)` for a sign-out and `None` if the gate went away.
    pub async fn next_change(&mut self) -> Option<Option<PrincipalId>> {
        self.rx.recv().await
    }

    /// Explicitly releases the listener.
    pub fn unsubscribe(mut self) {
        self.release_listener();
    }

    fn release_listener(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for PrincipalSubscription {
    fn drop(&mut self) {
        self.release_listener();
    }
}
