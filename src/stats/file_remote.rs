//! File-backed remote stats store.
//!
//! Stores one JSON document per principal with:
//! - An exclusive lock file around every read-modify-write (atomic increments)
//! - Atomic writes via temp file + rename
//! - A sentinel file for reachability probes
//!
//! A missing root directory is reported as `RemoteError::Unavailable`, which is
//! how an unmounted or disconnected share shows up.

use super::remote::{RemoteError, RemoteStatsStore};
use super::types::{PrincipalId, RemoteStatsRecord, StatKind, TimestampUtc};
use crate::study_paths;
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SENTINEL_FILE: &str = ".health";
const RECORD_FILE: &str = "stats.json";
const LOCK_FILE: &str = "stats.lock";

/// Remote store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileRemoteStore {
    root: PathBuf,
}

impl FileRemoteStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a principal's document: `<root>/users/<key>/`
    pub fn principal_dir(&self, principal: &PrincipalId) -> PathBuf {
        self.root
            .join("users")
            .join(study_paths::principal_key(principal.as_str()))
    }

    fn ensure_root(&self) -> Result<(), RemoteError> {
        match std::fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(RemoteError::unavailable(format!(
                "remote root is not a directory: {}",
                self.root.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RemoteError::unavailable(format!(
                "remote root not reachable: {}",
                self.root.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Opens (creating if needed) the principal's lock file and takes an exclusive lock.
    fn lock_principal(&self, principal: &PrincipalId) -> Result<File, RemoteError> {
        let dir = self.principal_dir(principal);
        std::fs::create_dir_all(&dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }
}

fn read_record(path: &Path) -> Result<Option<RemoteStatsRecord>, RemoteError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let record: RemoteStatsRecord = serde_json::from_str(&content)?;
    Ok(Some(record))
}

fn write_record(path: &Path, record: &RemoteStatsRecord) -> Result<(), RemoteError> {
    let content = serde_json::to_string_pretty(record)
        .map_err(|e| RemoteError::other(e.to_string()))?;

    // Write to temp file, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[async_trait]
impl RemoteStatsStore for FileRemoteStore {
    async fn fetch(
        &self,
        principal: &PrincipalId,
    ) -> Result<Option<RemoteStatsRecord>, RemoteError> {
        self.ensure_root()?;
        read_record(&self.principal_dir(principal).join(RECORD_FILE))
    }

    async fn create_if_absent(
        &self,
        principal: &PrincipalId,
    ) -> Result<RemoteStatsRecord, RemoteError> {
        self.ensure_root()?;
        let lock = self.lock_principal(principal)?;
        let path = self.principal_dir(principal).join(RECORD_FILE);

        let record = match read_record(&path)? {
            Some(existing) => existing,
            None => {
                let record = RemoteStatsRecord::provisioned(TimestampUtc::now());
                write_record(&path, &record)?;
                tracing::debug!("Provisioned stats document for {}", principal);
                record
            }
        };

        lock.unlock()?;
        Ok(record)
    }

    async fn increment(
        &self,
        principal: &PrincipalId,
        kind: StatKind,
        delta: i64,
    ) -> Result<(), RemoteError> {
        self.ensure_root()?;
        let lock = self.lock_principal(principal)?;
        let path = self.principal_dir(principal).join(RECORD_FILE);

        let mut record = read_record(&path)?.ok_or_else(|| RemoteError::NotFound {
            message: format!("no stats document for {}", principal),
        })?;
        record.increment(kind, delta, TimestampUtc::now());
        write_record(&path, &record)?;

        lock.unlock()?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), RemoteError> {
        self.ensure_root()?;
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.root.join(SENTINEL_FILE))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/file_remote_tests.rs"]
mod tests;
