//! Chessmind CLI - Command-line interface
//!
//! Commands:
//! - selfplay: Let the engine play itself at chosen skill levels
//! - perft: Count move-tree nodes from a position
//! - moves: Show the position and legal moves after a move sequence

mod moves_cmd;
mod perft_cmd;
mod selfplay;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chessmind")]
#[command(about = "Chess rules engine with a skill-scaled AI")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play engine against engine
    Selfplay(selfplay::SelfplayArgs),
    /// Count leaf nodes of the move tree
    Perft(perft_cmd::PerftArgs),
    /// List legal moves after a sequence of coordinate moves
    Moves(moves_cmd::MovesArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Perft(args) => perft_cmd::run(args),
        Commands::Moves(args) => moves_cmd::run(args),
    }
}
