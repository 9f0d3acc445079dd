//! Command lifecycle
//!
//! Every push or pull runs inside [`CommandRunner::run`], which:
//! - validates the options the command needs
//! - creates the scratch directory
//! - races the command against the interrupt token and the deadline
//! - removes the scratch directory on every outcome
//! - reports a failure to the status sink before returning it
//!
//! Commands themselves implement [`Command::start`] and only see a
//! [`CommandContext`]; they never manage the scratch area or timeouts.

mod pull;
mod push;


pub use pull::PullCommand;
pub use push::PushCommand;

use crate::client::RemoteClient;
use crate::config::{Operation, SyncOptions};
use crate::error::{CancelReason, Error, Result};
use crate::reporter::StatusSink;
use crate::scratch::ScratchArea;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything a running command may use
pub struct CommandContext<'a> {
    /// Resolved options (read-only)
    pub options: &'a SyncOptions,
    /// Client for the configured project
    pub client: &'a RemoteClient,
    /// Scratch directory owned by this invocation
    pub scratch: &'a ScratchArea,
    /// User-facing status output
    pub sink: &'a dyn StatusSink,
    /// Cancelled when the invocation is interrupted, times out, or ends
    pub cancel: CancellationToken,
}

/// A sync command
#[async_trait]
pub trait Command: Send + Sync {
    /// Command name, e.g. `crowdin:pull`
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Which option set the command needs
    fn operation(&self) -> Operation;

    /// Run the command body
    async fn start(&self, ctx: &CommandContext<'_>) -> Result<()>;
}

/// Command for an operation
pub fn command_for(operation: Operation) -> Box<dyn Command> {
    match operation {
        Operation::Push => Box::new(PushCommand),
        Operation::Pull => Box::new(PullCommand),
    }
}

/// Runs commands with scratch ownership, deadline and interrupt handling
pub struct CommandRunner {
    sink: Arc<dyn StatusSink>,
    interrupt: CancellationToken,
}

impl CommandRunner {
    /// Create a runner with its own interrupt token
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self::with_interrupt(sink, CancellationToken::new())
    }

    /// Create a runner that treats cancellation of `interrupt` as a user interrupt
    pub fn with_interrupt(sink: Arc<dyn StatusSink>, interrupt: CancellationToken) -> Self {
        Self { sink, interrupt }
    }

    /// Token that interrupts the running command when cancelled
    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Run `command` to completion, failure, or cancellation
    ///
    /// The scratch directory is gone when this returns, whatever the outcome.
    /// Failures are written to the sink and returned unchanged.
    pub async fn run(&self, command: &dyn Command, options: &SyncOptions) -> Result<()> {
        let outcome = self.execute(command, options).await;
        if let Err(e) = &outcome {
            self.sink.error(&e.to_string());
        }
        outcome
    }

    async fn execute(&self, command: &dyn Command, options: &SyncOptions) -> Result<()> {
        options.validate(command.operation())?;
        let client = RemoteClient::new(options)?;

        let scratch = ScratchArea::create(&options.tmp_dir).await?;
        let cancel = self.interrupt.child_token();
        let ctx = CommandContext {
            options,
            client: &client,
            scratch: &scratch,
            sink: self.sink.as_ref(),
            cancel: cancel.clone(),
        };

        info!(command = command.name(), project = %options.project, "command started");

        let outcome = tokio::select! {
            biased;
            _ = self.interrupt.cancelled() => {
                warn!(command = command.name(), "command interrupted");
                Err(Error::Cancelled(CancelReason::Interrupted))
            }
            _ = tokio::time::sleep(options.timeout) => {
                warn!(command = command.name(), timeout_secs = options.timeout.as_secs(), "command timed out");
                Err(Error::Cancelled(CancelReason::TimedOut(options.timeout)))
            }
            result = command.start(&ctx) => result,
        };

        // Stop anything still observing the token before the scratch area goes away
        cancel.cancel();
        drop(ctx);

        let cleanup = scratch.remove().await;
        match (outcome, cleanup) {
            (Ok(()), Ok(())) => {
                info!(command = command.name(), "command finished");
                Ok(())
            }
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_error)) => {
                warn!(error = %cleanup_error, "failed to remove scratch directory after error");
                Err(e)
            }
        }
    }
}
