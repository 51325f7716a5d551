//! Data types for usage statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Authenticated principal (user) identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Creates a principal ID, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidPrincipal> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidPrincipal);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a principal identifier is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPrincipal;

impl Display for InvalidPrincipal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal identifier must not be empty")
    }
}

impl std::error::Error for InvalidPrincipal {}

/// UTC timestamp assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampUtc(pub DateTime<Utc>);

impl TimestampUtc {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

/// The four tracked usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    DocumentsProcessed,
    QuestionsAsked,
    FlashcardsCreated,
    QuizzesCompleted,
}

impl StatKind {
    pub const ALL: [StatKind; 4] = [
        StatKind::DocumentsProcessed,
        StatKind::QuestionsAsked,
        StatKind::FlashcardsCreated,
        StatKind::QuizzesCompleted,
    ];

    /// Field name as stored in the remote record.
    pub fn field_name(self) -> &'static str {
        match self {
            StatKind::DocumentsProcessed => "documentsProcessed",
            StatKind::QuestionsAsked => "questionsAsked",
            StatKind::FlashcardsCreated => "flashcardsCreated",
            StatKind::QuizzesCompleted => "quizzesCompleted",
        }
    }

    /// Human-readable label for dashboards.
    pub fn label(self) -> &'static str {
        match self {
            StatKind::DocumentsProcessed => "Documents Processed",
            StatKind::QuestionsAsked => "Questions Asked",
            StatKind::FlashcardsCreated => "Flashcards Created",
            StatKind::QuizzesCompleted => "Quizzes Completed",
        }
    }
}

impl Display for StatKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for StatKind {
    type Err = UnknownStat;

    /// Accepts the camelCase field name or a kebab/snake-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        StatKind::ALL
            .into_iter()
            .find(|kind| kind.field_name().to_lowercase() == normalized)
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

/// Returned when parsing a name that is not one of the four counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStat(pub String);

impl Display for UnknownStat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown stat '{}' (expected one of documentsProcessed, questionsAsked, flashcardsCreated, quizzesCompleted)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStat {}

/// Usage counters for a single principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub documents_processed: u64,
    pub questions_asked: u64,
    pub flashcards_created: u64,
    pub quizzes_completed: u64,
}

impl UsageStats {
    pub fn get(&self, kind: StatKind) -> u64 {
        match kind {
            StatKind::DocumentsProcessed => self.documents_processed,
            StatKind::QuestionsAsked => self.questions_asked,
            StatKind::FlashcardsCreated => self.flashcards_created,
            StatKind::QuizzesCompleted => self.quizzes_completed,
        }
    }

    fn field_mut(&mut self, kind: StatKind) -> &mut u64 {
        match kind {
            StatKind::DocumentsProcessed => &mut self.documents_processed,
            StatKind::QuestionsAsked => &mut self.questions_asked,
            StatKind::FlashcardsCreated => &mut self.flashcards_created,
            StatKind::QuizzesCompleted => &mut self.quizzes_completed,
        }
    }

    /// Applies a signed delta to one counter, clamping at zero.
    pub fn apply_delta(&mut self, kind: StatKind, delta: i64) {
        let field = self.field_mut(kind);
        *field = if delta >= 0 {
            field.saturating_add(delta.unsigned_abs())
        } else {
            field.saturating_sub(delta.unsigned_abs())
        };
    }
}

/// Persisted per-principal stats document.
///
/// Counters are optional so partially-written records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStatsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_asked: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flashcards_created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quizzes_completed: Option<u64>,
    #[serde(default)]
    pub created_at: Option<TimestampUtc>,
    #[serde(default)]
    pub last_updated: Option<TimestampUtc>,
}

impl RemoteStatsRecord {
    /// A freshly provisioned record: every counter at zero, both timestamps `now`.
    pub fn provisioned(now: TimestampUtc) -> Self {
        Self {
            documents_processed: Some(0),
            questions_asked: Some(0),
            flashcards_created: Some(0),
            quizzes_completed: Some(0),
            created_at: Some(now),
            last_updated: Some(now),
        }
    }

    pub fn counter(&self, kind: StatKind) -> Option<u64> {
        match kind {
            StatKind::DocumentsProcessed => self.documents_processed,
            StatKind::QuestionsAsked => self.questions_asked,
            StatKind::FlashcardsCreated => self.flashcards_created,
            StatKind::QuizzesCompleted => self.quizzes_completed,
        }
    }

    /// Atomically-applied server-side increment. Missing counters start at zero.
    pub fn increment(&mut self, kind: StatKind, delta: i64, now: TimestampUtc) {
        let mut stats = self.to_usage_stats();
        stats.apply_delta(kind, delta);
        let value = Some(stats.get(kind));
        match kind {
            StatKind::DocumentsProcessed => self.documents_processed = value,
            StatKind::QuestionsAsked => self.questions_asked = value,
            StatKind::FlashcardsCreated => self.flashcards_created = value,
            StatKind::QuizzesCompleted => self.quizzes_completed = value,
        }
        self.last_updated = Some(now);
    }

    /// Overlays the record onto default stats, defaulting missing counters to 0.
    pub fn to_usage_stats(&self) -> UsageStats {
        UsageStats {
            documents_processed: self.documents_processed.unwrap_or(0),
            questions_asked: self.questions_asked.unwrap_or(0),
            flashcards_created: self.flashcards_created.unwrap_or(0),
            quizzes_completed: self.quizzes_completed.unwrap_or(0),
        }
    }
}

/// Loading lifecycle of the stats store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    /// Loading failed; defaults retained and loading cleared.
    Degraded,
}

/// Observable state of the stats store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub stats: UsageStats,
    pub is_loading: bool,
    pub is_online: bool,
    pub phase: LoadPhase,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            stats: UsageStats::default(),
            is_loading: true,
            is_online: true,
            phase: LoadPhase::Uninitialized,
        }
    }
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
