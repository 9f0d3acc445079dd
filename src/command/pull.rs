//! `crowdin:pull` - fetch finished translation files

use super::{Command, CommandContext};
use crate::archive::ArchiveResolver;
use crate::config::Operation;
use crate::error::Result;
use crate::poller::ExportPoller;
use crate::reconcile::{locale_of, reconcile};
use async_trait::async_trait;
use tracing::debug;

/// Export, download, and place translation files
#[derive(Debug, Default, Clone, Copy)]
pub struct PullCommand;

#[async_trait]
impl Command for PullCommand {
    fn name(&self) -> &'static str {
        "crowdin:pull"
    }

    fn description(&self) -> &'static str {
        "Pull translated files from Crowdin"
    }

    fn operation(&self) -> Operation {
        Operation::Pull
    }

    async fn start(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let options = ctx.options;
        ctx.client.check_project_setup().await?;

        let polls = ExportPoller::new(ctx.client, ctx.sink, options.poll_interval, ctx.cancel.clone())
            .run()
            .await?;
        debug!(polls, "export ready");

        let candidates =
            ArchiveResolver::new(ctx.client, &options.remote_folder_name, ctx.cancel.clone())
                .resolve(ctx.scratch)
                .await?;

        let updated = reconcile(&candidates, &options.locales, &options.translations_dir).await?;

        let mut locales: Vec<String> = updated.iter().filter_map(|p| locale_of(p)).collect();
        locales.sort();

        let missing: Vec<&str> = options
            .locales
            .iter()
            .filter(|requested| !locales.contains(*requested))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            ctx.sink.warn(&format!(
                "The following locales were not found in the export: {}",
                missing.join(", ")
            ));
        }

        if locales.is_empty() {
            ctx.sink.warn(&format!(
                "No translation files matched in the '{}' folder of the export",
                options.remote_folder_name
            ));
            return Ok(());
        }

        ctx.sink.success(&format!(
            "The following locales have been successfully fetched from Crowdin: {}",
            locales.join(", ")
        ));
        ctx.sink.success(&format!(
            "They have been saved in {}",
            options.translations_dir.display()
        ));
        Ok(())
    }
}
