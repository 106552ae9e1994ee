//! Ataxx CLI - Command-line interface
//!
//! Commands:
//! - tournament: Run a double round-robin between two agents
//! - maps: List the layouts in a map directory

mod maps_cmd;
mod tournament_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ataxx")]
#[command(about = "Ataxx strategy tournament runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play both colour assignments between two agents and record results
    Tournament(tournament_cmd::TournamentArgs),
    /// List available map files
    Maps(maps_cmd::MapsArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tournament(args) => tournament_cmd::run(args),
        Commands::Maps(args) => maps_cmd::run(args),
    }
}
