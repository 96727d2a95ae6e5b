//! Moves command - replay coordinate moves and list what is legal next

use anyhow::{Context, Result};
use clap::Args;

use chessmind_core::{BoardState, MoveRecord};

#[derive(Args)]
pub struct MovesArgs {
    /// Moves in coordinate form, e.g. e2e4 e7e5 g1f3
    #[arg(value_name = "MOVE")]
    pub moves: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run moves command
pub fn run(args: MovesArgs) -> Result<()> {
    let board = board_after(&args.moves)?;
    let legal = board.legal_moves();

    if args.json {
        print_json(&board, &legal)?;
    } else {
        print_text(&board, &legal);
    }
    Ok(())
}

/// Play `moves` from the initial position. Promotions without a piece
/// letter become queens.
pub fn board_after(moves: &[String]) -> Result<BoardState> {
    let mut board = BoardState::new();
    for (ply, text) in moves.iter().enumerate() {
        let mv = board
            .find_move(text)
            .with_context(|| format!("Move {} ({}) is not legal here", ply + 1, text))?;
        board = board
            .view_move(&mv)
            .with_context(|| format!("Failed to apply move {} ({})", ply + 1, text))?;
    }
    tracing::debug!("Replayed {} moves, {} to move", moves.len(), board.side_to_move());
    Ok(board)
}

fn print_json(board: &BoardState, legal: &[MoveRecord]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        side_to_move: String,
        in_check: bool,
        outcome: String,
        legal_moves: Vec<String>,
    }

    let output = JsonOutput {
        side_to_move: board.side_to_move().to_string(),
        in_check: board.in_check(),
        outcome: board.outcome().to_string(),
        legal_moves: legal.iter().map(|mv| mv.to_string()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(board: &BoardState, legal: &[MoveRecord]) {
    println!("{}", board);
    println!("To move: {}{}", board.side_to_move(), if board.in_check() { " (in check)" } else { "" });
    if board.outcome().is_decided() {
        println!("Outcome: {}", board.outcome());
        return;
    }
    println!("\n{} legal moves:", legal.len());
    let names: Vec<String> = legal.iter().map(|mv| mv.to_string()).collect();
    for row in names.chunks(8) {
        println!("  {}", row.join("  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_board_after_sequence() {
        let board = board_after(&texts(&["e2e4", "e7e5", "g1f3"])).unwrap();
        assert_eq!(board.history().len(), 3);
        assert_eq!(board.side_to_move(), chessmind_core::Side::Black);
    }

    #[test]
    fn test_board_after_rejects_illegal() {
        let err = board_after(&texts(&["e2e4", "e2e4"])).unwrap_err();
        assert!(err.to_string().contains("Move 2"));
    }
}
