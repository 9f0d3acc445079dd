//! User-facing status output
//!
//! The core never prints. It reports through an injected [`StatusSink`] with a
//! severity per line and a start/stop pair for an indeterminate progress
//! indicator; rendering (colors, spinners) belongs to the sink.

use std::sync::Mutex;

/// Severity of a status line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Plain informational line
    Info,
    /// The command achieved something
    Success,
    /// Something unexpected that did not fail the command
    Warning,
    /// The command failed
    Error,
}

/// Destination for user-facing status lines
pub trait StatusSink: Send + Sync {
    /// Write one line
    fn write_line(&self, severity: Severity, message: &str);

    /// Start (or relabel) the progress indicator
    fn start_progress(&self, label: &str);

    /// Stop the progress indicator; a no-op when none is running
    fn stop_progress(&self);

    /// Write an informational line
    fn info(&self, message: &str) {
        self.write_line(Severity::Info, message);
    }

    /// Write a success line
    fn success(&self, message: &str) {
        self.write_line(Severity::Success, message);
    }

    /// Write a warning line
    fn warn(&self, message: &str) {
        self.write_line(Severity::Warning, message);
    }

    /// Write an error line
    fn error(&self, message: &str) {
        self.write_line(Severity::Error, message);
    }
}

/// Sink that forwards everything to `tracing`, for headless embedding
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn write_line(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!(?severity, "{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }

    fn start_progress(&self, label: &str) {
        tracing::debug!(label, "progress started");
    }

    fn stop_progress(&self) {
        tracing::debug!("progress stopped");
    }
}

/// One recorded sink call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    /// `write_line`
    Line(Severity, String),
    /// `start_progress`
    StartProgress(String),
    /// `stop_progress`
    StopProgress,
}

/// Sink that records every call in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every call so far
    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// Messages written with `severity`, in order
    pub fn lines(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Line(s, message) if *s == severity => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `start_progress` calls with exactly `label`
    pub fn progress_count(&self, label: &str) -> usize {
        self.lock()
            .iter()
            .filter(|event| matches!(event, SinkEvent::StartProgress(l) if l == label))
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        // A poisoned lock only means a recording thread panicked; the data is still usable
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatusSink for MemorySink {
    fn write_line(&self, severity: Severity, message: &str) {
        self.lock().push(SinkEvent::Line(severity, message.to_string()));
    }

    fn start_progress(&self, label: &str) {
        self.lock().push(SinkEvent::StartProgress(label.to_string()));
    }

    fn stop_progress(&self) {
        self.lock().push(SinkEvent::StopProgress);
    }
}
