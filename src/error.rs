//! Error types for crowdin-sync
//!
//! Every failure a push or pull can hit maps onto one variant of [`Error`]:
//! - configuration problems (bad project, credential, or options)
//! - the remote export reporting a failure while being polled
//! - transport or archive-format failures while fetching translations
//! - the remote service rejecting an upload
//! - cancellation by interrupt or by the global deadline
//!
//! Each variant renders as a single human-readable line, which is what the
//! command lifecycle hands to the status sink.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for crowdin-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for crowdin-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (wrong project or API key, missing option, malformed config file)
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message, including the upstream message when there is one
        message: String,
        /// The option that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// The remote service reported a failed export while it was being polled
    #[error("an error occurred when trying to poll the export status: {0}")]
    Poll(String),

    /// Downloading or unpacking the translations archive failed
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The remote service rejected the uploaded source file
    #[error("an error occurred when trying to upload the source file: {0}")]
    Upload(String),

    /// The command was cancelled before it finished
    #[error("{0}")]
    Cancelled(CancelReason),

    /// I/O error (including a missing source catalog)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a command was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user interrupted the process (Ctrl+C / SIGTERM) or the embedder cancelled the token
    Interrupted,
    /// The global deadline elapsed before the command finished
    TimedOut(Duration),
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Interrupted => write!(f, "command cancelled by interrupt"),
            CancelReason::TimedOut(after) => {
                write!(f, "timed out after {} - command cancelled", format_duration(*after))
            }
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    } else if secs > 0 {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    } else {
        format!("{} ms", duration.as_millis())
    }
}

impl Error {
    /// Build a configuration error for a specific option
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Returns true if this error is a cancellation (interrupt or timeout)
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }

    /// Returns true if this error is a missing local file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Poll(_) => "poll_error",
            Error::Extraction(_) => "extraction_error",
            Error::Upload(_) => "upload_error",
            Error::Cancelled(CancelReason::Interrupted) => "interrupted",
            Error::Cancelled(CancelReason::TimedOut(_)) => "timed_out",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Process exit code for this error
    ///
    /// Interrupts use the conventional 130 (128 + SIGINT), timeouts use 124 like
    /// coreutils `timeout`, everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Cancelled(CancelReason::Interrupted) => 130,
            Error::Cancelled(CancelReason::TimedOut(_)) => 124,
            _ => 1,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_exit_codes() {
        let cases: Vec<(Error, &str, i32)> = vec![
            (Error::config("api_key", "missing"), "config_error", 1),
            (Error::Poll("export crashed".into()), "poll_error", 1),
            (Error::Extraction("not a zip".into()), "extraction_error", 1),
            (Error::Upload("quota exceeded".into()), "upload_error", 1),
            (
                Error::Cancelled(CancelReason::Interrupted),
                "interrupted",
                130,
            ),
            (
                Error::Cancelled(CancelReason::TimedOut(Duration::from_secs(300))),
                "timed_out",
                124,
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                "io_error",
                1,
            ),
        ];

        for (error, code, exit) in cases {
            assert_eq!(error.error_code(), code, "error code for {}", error);
            assert_eq!(error.exit_code(), exit, "exit code for {}", error);
        }
    }

    #[test]
    fn test_cancel_messages_distinguish_interrupt_from_timeout() {
        let interrupted = Error::Cancelled(CancelReason::Interrupted).to_string();
        let timed_out =
            Error::Cancelled(CancelReason::TimedOut(Duration::from_secs(300))).to_string();

        assert_eq!(interrupted, "command cancelled by interrupt");
        assert_eq!(timed_out, "timed out after 5 minutes - command cancelled");
        assert_ne!(interrupted, timed_out);
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1 minute");
        assert_eq!(format_duration(Duration::from_secs(90)), "90 seconds");
        assert_eq!(format_duration(Duration::from_secs(1)), "1 second");
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
    }

    #[test]
    fn test_upload_error_carries_upstream_message() {
        let err = Error::Upload("quota exceeded".into());
        assert!(err.to_string().ends_with(": quota exceeded"));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_is_not_found() {
        let missing = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let denied = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "nope",
        ));
        assert!(missing.is_not_found());
        assert!(!denied.is_not_found());
        assert!(!Error::Upload("x".into()).is_not_found());
    }
}
