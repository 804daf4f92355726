use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use revbar::core::log::init_logging;
use revbar::core::revenue::SourceId;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Refresh once and display the revenue breakdown
    Status,
    /// Keep refreshing on the configured interval until interrupted
    Watch,
    /// Store the API credential for a source (reads stdin if omitted or "-")
    SetCredential {
        /// stripe or polar
        source: SourceId,
        /// Secret key or access token; empty string removes it
        value: Option<String>,
    },
    /// Restrict Polar orders to one organization (empty for all)
    SetOrgId { id: String },
    /// Seconds between automatic refreshes
    SetInterval {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        seconds: u64,
    },
}

impl TryFrom<Commands> for revbar::AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<revbar::AppCommand> {
        Ok(match cmd {
            Commands::Status => revbar::AppCommand::Status,
            Commands::Watch => revbar::AppCommand::Watch,
            Commands::SetCredential { source, value } => revbar::AppCommand::SetCredential {
                source,
                value: revbar::cli::settings::read_secret(value)?,
            },
            Commands::SetOrgId { id } => revbar::AppCommand::SetOrganizationId(id),
            Commands::SetInterval { seconds } => revbar::AppCommand::SetInterval(seconds),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => revbar::cli::setup::setup(),
        Some(cmd) => match revbar::AppCommand::try_from(cmd) {
            Ok(command) => revbar::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
