//! crowdin-sync - push source catalogs to Crowdin and pull translations back
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use crowdin_sync::{
    Command as _, CommandRunner, FileConfig, Operation, OptionOverrides, PullCommand, PushCommand,
    Severity, StatusSink, command::command_for, resolve_options,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "crowdin-sync")]
#[command(about = "Synchronize translation files with Crowdin", long_about = None)]
struct Cli {
    /// Project root containing config/, tmp/ and the translations directory
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Push {
        #[command(flatten)]
        common: CommonArgs,

        /// The file name on Crowdin [default: messages.pot]
        #[arg(long, visible_alias = "file")]
        crowdin_file_name: Option<String>,

        /// The name of the file containing the translation strings [default: messages.pot]
        #[arg(long, visible_alias = "mf")]
        translations_file: Option<String>,
    },
    Pull {
        #[command(flatten)]
        common: CommonArgs,

        /// Locales to pull; pulls all if not set
        #[arg(short, long, value_delimiter = ',')]
        locale: Vec<String>,

        /// The folder name on Crowdin [default: messages]
        #[arg(short = 'f', long)]
        crowdin_folder_name: Option<String>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// The Crowdin project ID
    #[arg(short = 'U', long, env = "CROWDIN_PROJECT")]
    project: Option<String>,

    /// The API key for the Crowdin project
    #[arg(short = 'K', long, visible_aliases = ["key", "api"], env = "CROWDIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// The base URL for the Crowdin API [default: https://api.crowdin.com/api]
    #[arg(long, visible_alias = "url")]
    api_base_url: Option<String>,

    /// The folder where the translation files are kept [default: ./translations]
    #[arg(short = 'd', long)]
    translations_dir: Option<PathBuf>,
}

impl CommonArgs {
    fn into_overrides(self) -> OptionOverrides {
        OptionOverrides {
            project: self.project,
            api_key: self.api_key,
            api_base_url: self.api_base_url,
            translations_dir: self.translations_dir,
            ..Default::default()
        }
    }
}

impl Commands {
    fn into_parts(self) -> (Operation, OptionOverrides) {
        match self {
            Commands::Push {
                common,
                crowdin_file_name,
                translations_file,
            } => (
                Operation::Push,
                OptionOverrides {
                    remote_file_name: crowdin_file_name,
                    translations_file,
                    ..common.into_overrides()
                },
            ),
            Commands::Pull {
                common,
                locale,
                crowdin_folder_name,
            } => (
                Operation::Pull,
                OptionOverrides {
                    locales: (!locale.is_empty()).then_some(locale),
                    remote_folder_name: crowdin_folder_name,
                    ..common.into_overrides()
                },
            ),
        }
    }
}

impl Cli {
    /// Parse the command line, describing each subcommand the way the command itself does
    fn parse_with_descriptions() -> Self {
        let command = Cli::command()
            .mut_subcommand("push", |sub| sub.about(PushCommand.description()))
            .mut_subcommand("pull", |sub| sub.about(PullCommand.description()));
        Cli::from_arg_matches(&command.get_matches()).unwrap_or_else(|e| e.exit())
    }
}

/// Writes status lines to the terminal
#[derive(Default)]
struct ConsoleSink {
    progress: Mutex<Option<String>>,
}

impl StatusSink for ConsoleSink {
    fn write_line(&self, severity: Severity, message: &str) {
        self.stop_progress();
        match severity {
            Severity::Info | Severity::Success => println!("{}", message),
            Severity::Warning => eprintln!("warning: {}", message),
            Severity::Error => eprintln!("error: {}", message),
        }
    }

    fn start_progress(&self, label: &str) {
        let mut progress = self
            .progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if progress.as_deref() != Some(label) {
            eprint!("{} ", label);
            std::io::stderr().flush().ok();
            *progress = Some(label.to_string());
        } else {
            eprint!(".");
            std::io::stderr().flush().ok();
        }
    }

    fn stop_progress(&self) {
        let mut progress = self
            .progress
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if progress.take().is_some() {
            eprintln!();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crowdin_sync=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_with_descriptions();
    let sink = Arc::new(ConsoleSink::default());
    let (operation, overrides) = cli.command.into_parts();

    let file_config = match FileConfig::load(&cli.project_root) {
        Ok(config) => config,
        Err(e) => {
            sink.error(&e.to_string());
            return ExitCode::from(e.exit_code() as u8);
        }
    };
    let options = resolve_options(&cli.project_root, overrides, file_config);

    let runner = CommandRunner::with_interrupt(sink, crowdin_sync::interrupt_on_signal());
    let command = command_for(operation);

    match runner.run(command.as_ref(), &options).await {
        Ok(()) => ExitCode::SUCCESS,
        // The runner already reported the error through the sink
        Err(e) => ExitCode::from(e.exit_code() as u8),
    }
}
