use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_YAML: &str = include_str!("../study.yaml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudyConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Summarization/chat API endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub kind: RemoteKind,
    /// Root directory for the file store. Defaults to `~/.study-companion/remote`.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// How many previous messages are sent as conversation context.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_accepted_extensions() -> Vec<String> {
    vec![".txt".to_string(), ".pdf".to_string()]
}

impl StudyConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Result<Self> {
        serde_yaml::from_str(DEFAULT_CONFIG_YAML).context("Failed to parse embedded study.yaml")
    }

    /// Loads `explicit` if given, else the user config if it exists, else the defaults.
    pub fn resolve(explicit: Option<&Path>, user_config: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if user_config.exists() => Self::load(user_config),
            None => Self::default_config(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }

        if self.chat.history_limit == 0 {
            anyhow::bail!("chat.history_limit must be greater than zero");
        }

        if self.upload.max_file_bytes == 0 {
            anyhow::bail!("upload.max_file_bytes must be greater than zero");
        }

        if self.upload.accepted_extensions.is_empty() {
            anyhow::bail!("At least one accepted upload extension must be configured");
        }

        for ext in &self.upload.accepted_extensions {
            if !ext.starts_with('.') {
                anyhow::bail!(
                    "Upload extension '{}' must start with a dot (e.g. \".txt\")",
                    ext
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
