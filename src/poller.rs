//! Export readiness polling
//!
//! Drives the remote "prepare files for download" job to completion. The export
//! is triggered once, then its status is polled sequentially with a fixed delay
//! until it is `Finished` or `Failed`:
//!
//! ```text
//! NotStarted ──┐
//!              ├─(wait interval)─> poll again
//! InProgress ──┘
//! Finished   ──> done
//! Failed(m)  ──> Error::Poll(m)
//! ```
//!
//! There is no attempt limit. Export latency on the service side is
//! unpredictable; the command deadline is the only bound.

use crate::client::RemoteClient;
use crate::error::{CancelReason, Error, Result};
use crate::reporter::StatusSink;
use crate::types::ExportStatus;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shown once when the very first poll reports that no export exists yet
pub const PREPARING_NOTICE: &str = "Preparing first export, this can take a few minutes...";
/// Progress label shown while the export is running
pub const EXPORTING_NOTICE: &str = "Exporting translation files...";

/// Something that can start an export and report its status
#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Start the export job
    async fn trigger_export(&self) -> Result<()>;

    /// Read the current export status once
    async fn poll_export_status(&self) -> Result<ExportStatus>;
}

#[async_trait]
impl ExportSource for RemoteClient {
    async fn trigger_export(&self) -> Result<()> {
        RemoteClient::trigger_export(self).await
    }

    async fn poll_export_status(&self) -> Result<ExportStatus> {
        RemoteClient::poll_export_status(self).await
    }
}

/// Export poller for one pull
pub struct ExportPoller<'a> {
    source: &'a dyn ExportSource,
    sink: &'a dyn StatusSink,
    interval: Duration,
    cancel: CancellationToken,
}

impl<'a> ExportPoller<'a> {
    /// Create a poller
    pub fn new(
        source: &'a dyn ExportSource,
        sink: &'a dyn StatusSink,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            sink,
            interval,
            cancel,
        }
    }

    /// Trigger the export and wait until it has finished
    ///
    /// Returns the number of status polls performed.
    pub async fn run(&self) -> Result<u32> {
        self.check_cancelled()?;
        self.source.trigger_export().await?;
        self.wait_until_finished().await
    }

    /// Poll until the export reaches a terminal status
    ///
    /// The progress indicator is stopped on every exit path.
    pub async fn wait_until_finished(&self) -> Result<u32> {
        let outcome = self.poll_loop().await;
        self.sink.stop_progress();
        outcome
    }

    async fn poll_loop(&self) -> Result<u32> {
        let mut polls: u32 = 0;

        loop {
            self.check_cancelled()?;
            let status = self.source.poll_export_status().await?;
            self.check_cancelled()?;
            polls += 1;

            match status {
                ExportStatus::NotStarted => {
                    if polls == 1 {
                        self.sink.info(PREPARING_NOTICE);
                    }
                    debug!(polls, "no export yet, waiting");
                }
                ExportStatus::InProgress => {
                    self.sink.start_progress(EXPORTING_NOTICE);
                    debug!(polls, "export in progress, waiting");
                }
                ExportStatus::Finished => {
                    info!(polls, "export finished");
                    return Ok(polls);
                }
                ExportStatus::Failed(message) => {
                    warn!(polls, error = %message, "export failed");
                    return Err(Error::Poll(message));
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(Error::Cancelled(CancelReason::Interrupted));
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!("export polling cancelled");
            return Err(Error::Cancelled(CancelReason::Interrupted));
        }
        Ok(())
    }
}
