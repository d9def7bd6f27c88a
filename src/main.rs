use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xconv::core::log::init_logging;

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

impl From<Commands> for xconv::AppCommand {
    fn from(cmd: Commands) -> xconv::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => xconv::AppCommand::Convert { amount, from, to },
            Commands::Last => xconv::AppCommand::Last,
            Commands::Currencies => xconv::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the source currency, e.g. 100.00
        amount: String,
        /// Source currency code; defaults to the last used one
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code; defaults to the last used one
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Show the last used currency pair
    Last,
    /// List the configured currencies
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xconv::cli::setup::setup(),
        Some(cmd) => xconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
