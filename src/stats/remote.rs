//! Remote document store boundary for per-principal stats records.

use super::types::{PrincipalId, RemoteStatsRecord, StatKind};
use async_trait::async_trait;
use std::fmt::{Display, Formatter};

/// Errors reported by a remote stats store.
///
/// Only the `Unavailable` class is interpreted as an offline signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The store could not be reached (offline, connection refused, missing root).
    Unavailable { message: String },
    /// The principal is not allowed to access the record.
    PermissionDenied { message: String },
    /// The record targeted by an update does not exist.
    NotFound { message: String },
    /// The stored document could not be decoded.
    Malformed { message: String },
    /// Any other failure.
    Other { message: String },
}

impl RemoteError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Returns true for the reachability class of errors.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { message } => write!(f, "remote unavailable: {}", message),
            Self::PermissionDenied { message } => write!(f, "permission denied: {}", message),
            Self::NotFound { message } => write!(f, "record not found: {}", message),
            Self::Malformed { message } => write!(f, "malformed record: {}", message),
            Self::Other { message } => write!(f, "remote failure: {}", message),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<std::io::Error> for RemoteError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied {
                message: e.to_string(),
            },
            ErrorKind::NotFound
            | ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::TimedOut => Self::Unavailable {
                message: e.to_string(),
            },
            _ => Self::Other {
                message: e.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}

/// Remote persistence for stats records, one document per principal.
///
/// Timestamps (`createdAt`, `lastUpdated`) are assigned by the store.
#[async_trait]
pub trait RemoteStatsStore: Send + Sync {
    /// Point read. `Ok(None)` when the principal has no record yet.
    async fn fetch(&self, principal: &PrincipalId)
        -> Result<Option<RemoteStatsRecord>, RemoteError>;

    /// Creates a zeroed record unless one exists; returns the stored record.
    async fn create_if_absent(
        &self,
        principal: &PrincipalId,
    ) -> Result<RemoteStatsRecord, RemoteError>;

    /// Atomic server-side increment of one counter, also touching `lastUpdated`.
    async fn increment(
        &self,
        principal: &PrincipalId,
        kind: StatKind,
        delta: i64,
    ) -> Result<(), RemoteError>;

    /// Lightweight reachability probe against a sentinel path.
    async fn probe(&self) -> Result<(), RemoteError>;
}
