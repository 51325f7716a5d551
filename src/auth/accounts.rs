//! Local account registry and signed-in session persistence.
//!
//! Stands in for the hosted identity provider when running the CLI:
//! accounts live in `accounts.json`, the current sign-in in `session.json`.

use super::validation::{validate_sign_in, validate_sign_up};
use crate::stats::{PrincipalId, TimestampUtc};
use crate::study_paths::hex_encode;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistent account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    salt: String,
    password_hash: String,
    pub created_at: TimestampUtc,
}

impl AccountRecord {
    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

/// Single-round salted SHA-256. Adequate for a local development registry;
/// this is not a production credential store, which needs a slow KDF.
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Writes `content` to a sibling temp file, then renames it over `path`.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)
}

/// Account registry backed by a JSON file.
pub struct AccountRegistry {
    path: PathBuf,
    accounts: Vec<AccountRecord>,
}

impl AccountRegistry {
    /// Loads the registry, starting empty if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let accounts = match std::fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).context("Failed to parse account registry")?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e).context("Failed to read account registry"),
        };

        Ok(Self {
            path: path.to_path_buf(),
            accounts,
        })
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.accounts)
            .context("Failed to serialize account registry")?;
        write_atomic(&self.path, &content).context("Failed to write account registry")?;
        Ok(())
    }

    /// Creates an account after validating the sign-up form.
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        confirm: &str,
        display_name: Option<&str>,
    ) -> Result<AccountRecord> {
        validate_sign_up(email, password, confirm)?;
        let email = email.trim().to_lowercase();

        if self.find(&email).is_some() {
            anyhow::bail!("Email already in use");
        }

        let salt = hex_encode(&rand::thread_rng().gen::<[u8; 16]>());
        let record = AccountRecord {
            uid: uuid::Uuid::new_v4().to_string(),
            email,
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
            password_hash: hash_password(&salt, password),
            salt,
            created_at: TimestampUtc::now(),
        };
        self.accounts.push(record.clone());
        Ok(record)
    }

    /// Verifies credentials after validating the sign-in form.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<&AccountRecord> {
        validate_sign_in(email, password)?;
        let email = email.trim().to_lowercase();
        match self.find(&email) {
            Some(record) if record.verify(password) => Ok(record),
            _ => anyhow::bail!("Invalid email or password"),
        }
    }

    fn find(&self, email: &str) -> Option<&AccountRecord> {
        self.accounts.iter().find(|a| a.email == email)
    }
}

/// The signed-in principal, persisted between CLI invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub signed_in_at: TimestampUtc,
}

impl SessionFile {
    pub fn for_account(account: &AccountRecord) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            signed_in_at: TimestampUtc::now(),
        }
    }

    pub fn principal(&self) -> Result<PrincipalId> {
        PrincipalId::new(self.uid.clone()).context("Session file has an empty uid")
    }

    pub fn read(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let session =
                    serde_json::from_str(&content).context("Failed to parse session file")?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read session file"),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize session file")?;
        write_atomic(path, &content).context("Failed to write session file")?;
        Ok(())
    }

    /// Removes the session file. Returns whether anyone was signed in.
    pub fn clear(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}

#[cfg(test)]
#[path = "tests/accounts_tests.rs"]
mod tests;
