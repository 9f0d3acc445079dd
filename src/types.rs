//! Core types for crowdin-sync

use serde_json::Value;
use std::path::PathBuf;

/// State of the remote export job, as reported by one `export-status` poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportStatus {
    /// No export has ever been produced for this project (`none`)
    NotStarted,
    /// The export is being rendered (`in-progress`)
    InProgress,
    /// The archive is ready for download (`finished`)
    Finished,
    /// The service answered with anything else; carries the upstream message
    Failed(String),
}

impl ExportStatus {
    /// Interpret an `export-status` response body
    ///
    /// Any body without a recognised `status` is a failure whose message is taken
    /// from `error.message`, then `message`, then the JSON dump of the body.
    pub fn from_response(body: &Value) -> Self {
        match body.get("status").and_then(Value::as_str) {
            Some("none") => ExportStatus::NotStarted,
            Some("in-progress") => ExportStatus::InProgress,
            Some("finished") => ExportStatus::Finished,
            _ => ExportStatus::Failed(upstream_message(body)),
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportStatus::NotStarted => write!(f, "none"),
            ExportStatus::InProgress => write!(f, "in-progress"),
            ExportStatus::Finished => write!(f, "finished"),
            ExportStatus::Failed(message) => write!(f, "failed ({})", message),
        }
    }
}

/// Pull the most specific human-readable message out of an error payload
pub(crate) fn upstream_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Kind of an archive entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
}

/// One entry unpacked from the downloaded export archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-relative path, always `/`-separated
    pub path: String,
    /// File or directory
    pub kind: EntryKind,
}

impl ArchiveEntry {
    /// Create a file entry
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a directory entry
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Returns true for file entries
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A translation file resolved to its destination
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocaleFile {
    /// Locale identifier (file name without extension, e.g. `es_ES`)
    pub locale: String,
    /// Extracted file in the scratch area
    pub source: PathBuf,
    /// Target file in the translations directory
    pub destination: PathBuf,
}
