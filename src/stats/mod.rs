//! Usage statistics for the signed-in principal.
//!
//! This module provides:
//! - The counter data model (`types`)
//! - The remote document store boundary and its backends
//! - The `StatsStore` with optimistic updates, rollback and offline fallback

pub mod file_remote;
pub mod memory_remote;
pub mod remote;
pub mod store;
pub mod types;

pub use file_remote::FileRemoteStore;
pub use memory_remote::MemoryRemoteStore;
pub use remote::{RemoteError, RemoteStatsStore};
pub use store::{IncrementOutcome, LoadOutcome, StatsStore};
pub use types::{
    LoadPhase, PrincipalId, RemoteStatsRecord, StatKind, StoreState, TimestampUtc, UsageStats,
};
