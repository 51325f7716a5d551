//! Centralized home-based storage paths for study-companion persistence.
//!
//! Everything lives under `~/.study-companion/` unless `STUDY_COMPANION_HOME`
//! points somewhere else:
//! - `config.yaml` - Optional user configuration
//! - `accounts.json` - Local account registry
//! - `session.json` - Signed-in principal
//! - `remote/` - File-backed remote stats store (default root)
//! - `logs/events.jsonl` - Structured event log

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

/// The name of the study-companion directory.
const STUDY_DIR: &str = ".study-companion";

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "STUDY_COMPANION_HOME";

/// Returns the home directory: `~/.study-companion/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn study_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .context("Could not determine home directory for study storage")?
            .join(STUDY_DIR),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create study directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the user config path: `~/.study-companion/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(study_home_dir()?.join("config.yaml"))
}

/// Returns the account registry path: `~/.study-companion/accounts.json`
pub fn accounts_path() -> Result<PathBuf> {
    Ok(study_home_dir()?.join("accounts.json"))
}

/// Returns the signed-in session path: `~/.study-companion/session.json`
pub fn session_path() -> Result<PathBuf> {
    Ok(study_home_dir()?.join("session.json"))
}

/// Returns the default root of the file-backed remote store: `~/.study-companion/remote/`
pub fn default_remote_root() -> Result<PathBuf> {
    let dir = study_home_dir()?.join("remote");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create remote directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the logs directory: `~/.study-companion/logs/`
pub fn logs_dir() -> Result<PathBuf> {
    let dir = study_home_dir()?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Hashes a principal identifier into a filesystem-safe key
/// (SHA256 truncated to 16 hex characters).
pub fn principal_key(principal: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(principal.as_bytes());
    let result = hasher.finalize();
    hex_encode(&result[..8])
}

/// Encodes bytes as lowercase hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "tests/study_paths_tests.rs"]
mod tests;
