//! # crowdin-sync
//!
//! Keeps a project's gettext files in sync with a Crowdin project.
//!
//! - **push** uploads the local source catalog (`messages.pot`) for translation
//! - **pull** asks Crowdin to export, waits for the export, downloads the
//!   archive and copies the requested `{locale}.po` files into the
//!   translations directory
//!
//! Each run is a full, stateless round trip inside a scratch directory that is
//! always removed afterwards, bounded by a five minute deadline and
//! cancellable through a [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use crowdin_sync::{CommandRunner, FileConfig, OptionOverrides, PullCommand, TracingSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let root = Path::new(".");
//!     let overrides = OptionOverrides {
//!         project: Some("my-app".to_string()),
//!         api_key: Some("secret".to_string()),
//!         locales: Some(vec!["de".to_string()]),
//!         ..Default::default()
//!     };
//!     let options = crowdin_sync::resolve_options(root, overrides, FileConfig::load(root)?);
//!
//!     let runner = CommandRunner::with_interrupt(
//!         Arc::new(TracingSink),
//!         crowdin_sync::interrupt_on_signal(),
//!     );
//!     runner.run(&PullCommand, &options).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive download and unpacking
pub mod archive;
/// HTTP client for the Crowdin API
pub mod client;
/// Command lifecycle and the push/pull commands
pub mod command;
/// Configuration types and option resolution
pub mod config;
/// Error types
pub mod error;
/// Export readiness polling
pub mod poller;
/// Locale selection and file placement
pub mod reconcile;
/// User-facing status output
pub mod reporter;
/// Per-invocation scratch directory
pub mod scratch;
/// Core types
pub mod types;
/// Source catalog upload
pub mod upload;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use client::RemoteClient;
pub use command::{Command, CommandContext, CommandRunner, PullCommand, PushCommand};
pub use config::{FileConfig, Operation, OptionOverrides, SyncOptions, resolve_options};
pub use error::{CancelReason, Error, Result};
pub use reporter::{MemorySink, Severity, StatusSink, TracingSink};
pub use types::{ArchiveEntry, EntryKind, ExportStatus, LocaleFile};

use tokio_util::sync::CancellationToken;

/// Token that is cancelled when the process receives an interrupt
///
/// Spawns a listener task, so it must be called from within a Tokio runtime.
/// On Unix both SIGINT and SIGTERM interrupt the running command; elsewhere
/// only Ctrl+C does.
pub fn interrupt_on_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        let signal = next_interrupt().await;
        tracing::info!(signal, "interrupt received, cancelling command");
        trigger.cancel();
    });
    token
}

/// Wait for the first interrupt signal and return its name
#[cfg(unix)]
async fn next_interrupt() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut listeners = Vec::new();
    for (kind, name) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        match signal(kind) {
            Ok(listener) => listeners.push((listener, name)),
            Err(e) => tracing::warn!(signal = name, error = %e, "cannot listen for signal"),
        }
    }

    match listeners.as_mut_slice() {
        [] => {
            // No handler could be registered; Ctrl+C still works on most terminals
            tokio::signal::ctrl_c().await.ok();
            "ctrl-c"
        }
        [(only, name)] => {
            only.recv().await;
            *name
        }
        [(first, first_name), (second, second_name), ..] => {
            tokio::select! {
                _ = first.recv() => *first_name,
                _ = second.recv() => *second_name,
            }
        }
    }
}

/// Wait for Ctrl+C and return its name
#[cfg(not(unix))]
async fn next_interrupt() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl-c, interrupts are disabled");
        std::future::pending::<()>().await;
    }
    "ctrl-c"
}
