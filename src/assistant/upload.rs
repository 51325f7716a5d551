//! Upload validation and file-size formatting for documents to summarize.

use crate::config::UploadConfig;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A file offered for summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub mime: Option<String>,
    pub size: u64,
}

impl UploadCandidate {
    /// Describes a file on disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = extension_of(&name)
            .and_then(|ext| mime_for_extension(&ext))
            .map(String::from);
        Ok(Self { name, mime, size })
    }

    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    UnsupportedType { accepted: Vec<String> },
    TooLarge { limit: u64 },
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { accepted } => {
                write!(f, "Please upload only {} files", accepted.join(" or "))
            }
            Self::TooLarge { limit } => write!(
                f,
                "File size must be less than {}",
                format_file_size(*limit).replace(' ', "")
            ),
        }
    }
}

impl std::error::Error for UploadError {}

/// Lowercased extension including the leading dot.
fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        ".txt" => Some("text/plain"),
        ".pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Accepts a file whose MIME type or extension is allowed and whose size is within the limit.
pub fn validate_upload(file: &UploadCandidate, config: &UploadConfig) -> Result<(), UploadError> {
    let accepted = &config.accepted_extensions;
    let mime_ok = file.mime.as_deref().is_some_and(|mime| {
        accepted
            .iter()
            .any(|ext| mime_for_extension(ext) == Some(mime))
    });
    let ext_ok = file
        .extension()
        .is_some_and(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(&ext)));

    if !mime_ok && !ext_ok {
        return Err(UploadError::UnsupportedType {
            accepted: accepted.clone(),
        });
    }

    if file.size > config.max_file_bytes {
        return Err(UploadError::TooLarge {
            limit: config.max_file_bytes,
        });
    }

    Ok(())
}

/// Formats a byte count with base-1024 units and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
