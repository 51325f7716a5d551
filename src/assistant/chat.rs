//! Conversation state for the study-assistant chat.

use super::api_client::{AssistantApi, ChatRole, HistoryEntry};
use crate::stats::{IncrementOutcome, StatKind, StatsStore, TimestampUtc};
use anyhow::Result;
use std::sync::Arc;

pub const GREETING: &str =
    "Hi! I'm your study assistant. Ask me about your notes, a concept, or how to prepare for an exam.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub is_error: bool,
    pub at: TimestampUtc,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            role,
            content: content.into(),
            is_error,
            at: TimestampUtc::now(),
        }
    }
}

/// What happened to a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    Answered {
        reply: String,
        model: Option<String>,
        stats: IncrementOutcome,
    },
    Failed {
        error: String,
    },
}

pub struct ChatSession {
    api: Arc<dyn AssistantApi>,
    stats: Arc<StatsStore>,
    history_limit: usize,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Starts a conversation seeded with the assistant greeting.
    pub fn new(api: Arc<dyn AssistantApi>, stats: Arc<StatsStore>, history_limit: usize) -> Self {
        Self {
            api,
            stats,
            history_limit,
            messages: vec![ChatMessage::new(ChatRole::Assistant, GREETING, false)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent `history_limit` messages, oldest first.
    fn context_window(&self) -> Vec<HistoryEntry> {
        let start = self.messages.len().saturating_sub(self.history_limit);
        self.messages[start..]
            .iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// Sends a message with the preceding conversation as context.
    ///
    /// API failures are recorded as an error reply and returned as
    /// `ChatTurn::Failed`; only an empty message is an `Err`.
    pub async fn send(&mut self, text: &str) -> Result<ChatTurn> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Message cannot be empty");
        }

        let history = self.context_window();
        self.messages
            .push(ChatMessage::new(ChatRole::User, text, false));

        match self.api.chat(text, &history).await {
            Ok(reply) => {
                self.messages
                    .push(ChatMessage::new(ChatRole::Assistant, &reply.response, false));
                let stats = self.stats.increment_stat(StatKind::QuestionsAsked).await;
                Ok(ChatTurn::Answered {
                    reply: reply.response,
                    model: reply.model,
                    stats,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                let error = format!("Sorry, I ran into a problem answering that: {}", e);
                self.messages
                    .push(ChatMessage::new(ChatRole::Assistant, &error, true));
                Ok(ChatTurn::Failed { error })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
