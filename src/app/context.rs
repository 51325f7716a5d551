//! Wiring for one CLI invocation: config, session, stats store and assistant.

use crate::assistant::{AssistantApi, HttpAssistantClient};
use crate::auth::SessionFile;
use crate::config::{RemoteKind, StudyConfig};
use crate::session_gate::LocalSessionGate;
use crate::stats::{FileRemoteStore, MemoryRemoteStore, RemoteStatsStore, StatsStore};
use crate::structured_logger::StructuredLogger;
use crate::study_paths;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Files the CLI reads and writes.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
    pub accounts: PathBuf,
    pub session: PathBuf,
    pub logs: PathBuf,
    pub remote_root: PathBuf,
}

impl AppPaths {
    /// Paths under the study home directory (`STUDY_COMPANION_HOME` or `~/.study-companion`).
    pub fn from_home() -> Result<Self> {
        Ok(Self {
            config: study_paths::config_path()?,
            accounts: study_paths::accounts_path()?,
            session: study_paths::session_path()?,
            logs: study_paths::logs_dir()?,
            remote_root: study_paths::default_remote_root()?,
        })
    }
}

pub struct AppContext {
    pub config: StudyConfig,
    pub paths: AppPaths,
    pub session: Option<SessionFile>,
    pub gate: LocalSessionGate,
    pub store: Arc<StatsStore>,
    pub assistant: Arc<dyn AssistantApi>,
    pub events: Arc<StructuredLogger>,
}

impl AppContext {
    /// Builds the context with the HTTP assistant client from `config.api`.
    pub fn open(config: StudyConfig, paths: AppPaths) -> Result<Self> {
        let assistant = Arc::new(HttpAssistantClient::new(&config.api));
        Self::with_assistant(config, paths, assistant)
    }

    pub fn with_assistant(
        config: StudyConfig,
        paths: AppPaths,
        assistant: Arc<dyn AssistantApi>,
    ) -> Result<Self> {
        let session = SessionFile::read(&paths.session)?;
        let gate = match &session {
            Some(session) => LocalSessionGate::signed_in(session.principal()?),
            None => LocalSessionGate::new(),
        };

        let remote: Arc<dyn RemoteStatsStore> = match config.remote.kind {
            RemoteKind::File => {
                let root = config
                    .remote
                    .root
                    .clone()
                    .unwrap_or_else(|| paths.remote_root.clone());
                Arc::new(FileRemoteStore::new(root))
            }
            RemoteKind::Memory => Arc::new(MemoryRemoteStore::new()),
        };
        tracing::debug!(kind = ?config.remote.kind, "stats backend selected");

        let run_id = uuid::Uuid::new_v4().to_string();
        let events = Arc::new(StructuredLogger::new(&run_id, &paths.logs)?);
        let store = Arc::new(
            StatsStore::new(Arc::new(gate.clone()), remote).with_event_log(events.clone()),
        );

        Ok(Self {
            config,
            paths,
            session,
            gate,
            store,
            assistant,
            events,
        })
    }
}
