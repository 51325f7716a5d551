//! Study assistant: document summarization and chat against the assistant API.

pub mod api_client;
pub mod chat;
pub mod summarize;
pub mod upload;

pub use api_client::{AssistantApi, ChatReply, ChatRole, HistoryEntry, HttpAssistantClient};
pub use chat::{ChatMessage, ChatSession, ChatTurn};
pub use summarize::{summarize_file, SummaryReport};
pub use upload::{format_file_size, validate_upload, UploadCandidate, UploadError};

#[cfg(test)]
pub(crate) mod fake {
    use super::api_client::{AssistantApi, ChatReply, HistoryEntry};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted assistant that records what it was sent.
    #[derive(Default)]
    pub struct FakeAssistant {
        pub fail_with: Mutex<Option<String>>,
        pub chats: Mutex<Vec<(String, Vec<HistoryEntry>)>>,
        pub summarized: Mutex<Vec<String>>,
    }

    impl FakeAssistant {
        pub fn failing(message: &str) -> Self {
            let fake = Self::default();
            *fake.fail_with.lock().unwrap() = Some(message.to_string());
            fake
        }

        fn failure(&self) -> Option<anyhow::Error> {
            self.fail_with
                .lock()
                .unwrap()
                .as_ref()
                .map(|m| anyhow::anyhow!(m.clone()))
        }
    }

    #[async_trait]
    impl AssistantApi for FakeAssistant {
        async fn summarize(&self, text: &str) -> Result<String> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.summarized.lock().unwrap().push(text.to_string());
            Ok(format!("Summary of {} chars", text.chars().count()))
        }

        async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.chats
                .lock()
                .unwrap()
                .push((message.to_string(), history.to_vec()));
            Ok(ChatReply {
                response: format!("Answer to: {}", message),
                model: Some("fake".to_string()),
            })
        }
    }
}
