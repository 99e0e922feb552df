//! Treasure-hunt CLI - Train and replay tabular Q-learning agents
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "treasure")]
#[command(version, about = "Tabular Q-learning on treasure-hunt games", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent and checkpoint its value table
    Train(Box<treasure_hunt::cli::commands::train::TrainArgs>),

    /// Walk the greedy policy of a trained table
    Run(treasure_hunt::cli::commands::run::RunArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => treasure_hunt::cli::commands::train::execute(*args),
        Commands::Run(args) => treasure_hunt::cli::commands::run::execute(args),
    }
}
