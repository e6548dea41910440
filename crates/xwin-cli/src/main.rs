mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xwin")]
#[command(version)]
#[command(about = "Inspect the focused window and watch focus changes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the currently focused window
    Active {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List open windows
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print every focus change until interrupted
    Watch {
        /// Output one JSON object per line
        #[arg(long)]
        json: bool,
        /// Poll interval in milliseconds, overrides the config file
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("xwin=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Active { json } => commands::active(json)?,
        Commands::List { json } => commands::list(json)?,
        Commands::Watch { json, interval } => commands::watch(json, interval).await?,
    }

    Ok(())
}
