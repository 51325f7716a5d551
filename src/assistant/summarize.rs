//! Document summarization: validate, extract text, summarize, count.

use super::api_client::AssistantApi;
use super::upload::{format_file_size, validate_upload, UploadCandidate};
use crate::config::UploadConfig;
use crate::stats::{IncrementOutcome, StatKind, StatsStore};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub file_name: String,
    pub size_label: String,
    pub summary: String,
    pub stats: IncrementOutcome,
}

/// Reads the text content of an accepted upload. PDFs go through `pdf-extract`.
pub fn extract_text(path: &Path, file: &UploadCandidate) -> Result<String> {
    match file.extension().as_deref() {
        Some(".pdf") => {
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            extract_pdf_text(&bytes)
                .with_context(|| format!("Failed to extract text from {}", file.name))
        }
        _ => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| anyhow::anyhow!("PDF extraction failed: {}", e))?;
    tracing::debug!(chars = text.len(), "extracted PDF text");
    Ok(text)
}

/// Summarizes a document and counts it once the summary arrives.
pub async fn summarize_file(
    api: &dyn AssistantApi,
    stats: &StatsStore,
    upload: &UploadConfig,
    path: &Path,
) -> Result<SummaryReport> {
    let file = UploadCandidate::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    validate_upload(&file, upload)?;

    let text = extract_text(path, &file)?;
    if text.trim().is_empty() {
        anyhow::bail!("No text found in {}", file.name);
    }

    tracing::info!(file = %file.name, bytes = file.size, "summarizing document");
    let summary = api.summarize(&text).await?;
    let stats = stats.increment_stat(StatKind::DocumentsProcessed).await;

    Ok(SummaryReport {
        size_label: format_file_size(file.size),
        file_name: file.name,
        summary,
        stats,
    })
}

#[cfg(test)]
#[path = "tests/summarize_tests.rs"]
mod tests;
