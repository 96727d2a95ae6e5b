//! Move-tree node counts for validating move generation

use crate::game::BoardState;
use crate::moves::MoveRecord;
use crate::pieces::PROMOTION_KINDS;

/// Count leaf nodes `depth` plies below `board`. Each promotion piece is a
/// separate branch.
pub fn perft(board: &BoardState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let legal = board.legal_moves();
    if depth == 1 {
        return legal.iter().map(branch_count).sum();
    }
    legal
        .iter()
        .flat_map(|mv| branches(board, mv))
        .map(|(_, next)| perft(&next, depth - 1))
        .sum()
}

/// Node counts below each root move, one entry per promotion piece
pub fn divide(board: &BoardState, depth: u32) -> Vec<(MoveRecord, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    board
        .legal_moves()
        .iter()
        .flat_map(|mv| branches(board, mv))
        .map(|(mv, next)| (mv, perft(&next, depth - 1)))
        .collect()
}

fn branch_count(mv: &MoveRecord) -> u64 {
    if mv.needs_promotion() {
        PROMOTION_KINDS.len() as u64
    } else {
        1
    }
}

fn branches(board: &BoardState, mv: &MoveRecord) -> Vec<(MoveRecord, BoardState)> {
    if !mv.needs_promotion() {
        return vec![(mv.clone(), board.successor(mv))];
    }
    PROMOTION_KINDS
        .iter()
        .map(|&kind| {
            let record = MoveRecord::with_promotion(mv.piece(), mv.from(), mv.to(), kind);
            (record, board.successor_with(mv, kind))
        })
        .collect()
}
