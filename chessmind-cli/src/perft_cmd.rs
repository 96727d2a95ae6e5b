//! Perft command - count move-tree leaves to check move generation

use std::time::Instant;

use anyhow::{bail, Result};
use clap::Args;

use chessmind_core::{divide, perft};

use crate::moves_cmd::board_after;

/// Deeper counts take minutes on a single core
const MAX_DEPTH: u32 = 6;

#[derive(Args)]
pub struct PerftArgs {
    /// Plies to search
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Print the count below each root move
    #[arg(long)]
    pub divide: bool,

    /// Coordinate moves played before counting
    #[arg(long, value_name = "MOVE", num_args = 0..)]
    pub moves: Vec<String>,
}

/// Run perft command
pub fn run(args: PerftArgs) -> Result<()> {
    if args.depth > MAX_DEPTH {
        bail!("Depth {} exceeds the maximum of {}", args.depth, MAX_DEPTH);
    }
    let board = board_after(&args.moves)?;

    tracing::info!("Counting nodes to depth {}", args.depth);
    let start = Instant::now();

    let total = if args.divide {
        let split = divide(&board, args.depth);
        for (mv, count) in &split {
            println!("{:<10} {}", mv.to_string(), count);
        }
        println!();
        split.iter().map(|(_, count)| count).sum()
    } else {
        perft(&board, args.depth)
    };

    let elapsed = start.elapsed();
    println!("Nodes: {}", total);
    println!("Time:  {:.2}s", elapsed.as_secs_f64());
    if elapsed.as_secs_f64() > 0.0 {
        println!("Rate:  {:.0} nodes/s", total as f64 / elapsed.as_secs_f64());
    }
    Ok(())
}
