//! HTTP client for the summarization and chat endpoints.

use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of conversation context sent to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub model: Option<String>,
}

/// The assistant backend. Implemented over HTTP, and by fakes in tests.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;

    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply>;
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_history: &'a [HistoryEntry],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    success: bool,
    response: Option<String>,
    model: Option<String>,
    error: Option<String>,
}

/// Blocking ureq client driven from async code via `spawn_blocking`.
#[derive(Clone)]
pub struct HttpAssistantClient {
    base_url: String,
    timeout: Duration,
}

impl HttpAssistantClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn post_json(&self, path: &str, body: String) -> Result<(u16, String)> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let url = self.endpoint(path);
        let mut response = agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(&body)
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .context("Failed to read response body")?;
        tracing::debug!(url = %url, status, "assistant api response");
        Ok((status, text))
    }

    async fn post_blocking(&self, path: &'static str, body: String) -> Result<(u16, String)> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.post_json(path, body))
            .await
            .context("Assistant request task panicked")?
    }
}

fn summarize_result(status: u16, body: &str) -> Result<String> {
    let parsed: SummarizeResponse = serde_json::from_str(body)
        .with_context(|| format!("Unexpected summarize response (HTTP {})", status))?;
    if let Some(error) = parsed.error {
        anyhow::bail!(error);
    }
    if !(200..300).contains(&status) {
        anyhow::bail!("Summarize request failed with HTTP {}", status);
    }
    parsed
        .summary
        .filter(|s| !s.trim().is_empty())
        .context("Summarize response did not include a summary")
}

fn chat_result(status: u16, body: &str) -> Result<ChatReply> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .with_context(|| format!("Unexpected chat response (HTTP {})", status))?;
    if !parsed.success || !(200..300).contains(&status) {
        let reason = parsed
            .error
            .unwrap_or_else(|| format!("Chat request failed with HTTP {}", status));
        anyhow::bail!(reason);
    }
    let response = parsed
        .response
        .context("Chat response did not include a reply")?;
    Ok(ChatReply {
        response,
        model: parsed.model,
    })
}

#[async_trait]
impl AssistantApi for HttpAssistantClient {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = serde_json::to_string(&SummarizeRequest { text })?;
        let (status, response) = self.post_blocking("summarize", body).await?;
        summarize_result(status, &response)
    }

    async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<ChatReply> {
        let body = serde_json::to_string(&ChatRequest {
            message,
            conversation_history: history,
        })?;
        let (status, response) = self.post_blocking("chat", body).await?;
        chat_result(status, &response)
    }
}

#[cfg(test)]
#[path = "tests/api_client_tests.rs"]
mod tests;
