//! `crowdin:push` - upload the source catalog

use super::{Command, CommandContext};
use crate::config::Operation;
use crate::error::Result;
use crate::upload::upload_source_catalog;
use async_trait::async_trait;

/// Upload the local source catalog
#[derive(Debug, Default, Clone, Copy)]
pub struct PushCommand;

#[async_trait]
impl Command for PushCommand {
    fn name(&self) -> &'static str {
        "crowdin:push"
    }

    fn description(&self) -> &'static str {
        "Upload your messages.pot file"
    }

    fn operation(&self) -> Operation {
        Operation::Push
    }

    async fn start(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let options = ctx.options;

        // A missing catalog fails before the first request
        tokio::fs::metadata(options.source_catalog_path()).await?;

        ctx.client.check_project_setup().await?;
        upload_source_catalog(ctx.client, options, ctx.sink).await?;

        ctx.sink.success(&format!(
            "The file {} has successfully been uploaded to Crowdin.",
            options.translations_file
        ));
        Ok(())
    }
}
