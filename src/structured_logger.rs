//! Structured JSONL event log for stats reconciliation and debugging.
//!
//! This module provides machine-parseable logging with:
//! - Monotonic sequence numbers for ordering
//! - ISO 8601 timestamps with microsecond precision
//! - A run ID for correlation across one CLI invocation
//! - Structured event data in JSON format

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::stats::{LoadOutcome, StatKind};

/// Structured JSONL logger.
pub struct StructuredLogger {
    run_id: String,
    seq: AtomicU64,
    log_file: Mutex<File>,
    log_path: PathBuf,
}

/// A single log entry in JSONL format.
#[derive(Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number (unique within a run)
    pub seq: u64,
    /// ISO 8601 timestamp with microseconds
    pub ts: String,
    /// Run ID
    pub run_id: String,
    /// Component that emitted the log
    pub component: String,
    /// Structured event data
    pub event: Value,
}

impl StructuredLogger {
    /// Creates a logger appending to `<logs_dir>/events.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The logs directory cannot be created
    /// - The log file cannot be opened
    pub fn new(run_id: &str, logs_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let log_path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            run_id: run_id.to_string(),
            seq: AtomicU64::new(0),
            log_file: Mutex::new(file),
            log_path,
        })
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Logs a structured event as a single line. Thread-safe.
    pub fn log(&self, component: &str, event: impl Serialize) {
        let entry = LogEntry {
            seq: self.next_seq(),
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            run_id: self.run_id.clone(),
            component: component.to_string(),
            event: serde_json::to_value(event).unwrap_or(Value::Null),
        };

        if let Ok(mut file) = self.log_file.lock() {
            if let Ok(line) = serde_json::to_string(&entry) {
                let _ = writeln!(file, "{}", line);
                let _ = file.flush();
            }
        }
    }

    /// Logs an optimistic counter update applied before persistence.
    pub fn log_optimistic_applied(&self, pending_id: u64, kind: StatKind, value: u64) {
        self.log(
            "Stats",
            serde_json::json!({
                "type": "OptimisticApplied",
                "pending_id": pending_id,
                "stat": kind,
                "value": value
            }),
        );
    }

    /// Logs a persisted increment.
    pub fn log_increment_confirmed(&self, pending_id: u64, kind: StatKind) {
        self.log(
            "Stats",
            serde_json::json!({
                "type": "IncrementConfirmed",
                "pending_id": pending_id,
                "stat": kind
            }),
        );
    }

    /// Logs a compensating rollback after a failed increment.
    pub fn log_rollback(&self, pending_id: u64, kind: StatKind, value: u64, error: &str) {
        self.log(
            "Stats",
            serde_json::json!({
                "type": "RolledBack",
                "pending_id": pending_id,
                "stat": kind,
                "value": value,
                "error": error
            }),
        );
    }

    /// Logs the outcome of a load or refresh.
    pub fn log_load_outcome(&self, principal: Option<&str>, outcome: &LoadOutcome) {
        self.log(
            "Stats",
            serde_json::json!({
                "type": "LoadOutcome",
                "principal": principal,
                "outcome": outcome
            }),
        );
    }

    /// Logs a reachability change.
    pub fn log_network_status(&self, online: bool) {
        self.log(
            "Remote",
            serde_json::json!({
                "type": "NetworkStatus",
                "online": online
            }),
        );
    }

    /// Logs a call to the summarization/chat API.
    pub fn log_api_call(&self, endpoint: &str, success: bool) {
        self.log(
            "Assistant",
            serde_json::json!({
                "type": "ApiCall",
                "endpoint": endpoint,
                "success": success
            }),
        );
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
#[path = "tests/structured_logger_tests.rs"]
mod tests;
