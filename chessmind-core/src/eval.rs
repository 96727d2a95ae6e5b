//! Position evaluation
//!
//! Scores are in `[0, 100]` from one side's point of view: 100 is a won
//! game, 0 a lost one, 50 a balanced or drawn position.

use serde::{Deserialize, Serialize};

use crate::board::Square;
use crate::game::BoardState;
use crate::moves::MoveRecord;
use crate::pieces::{Piece, PieceKind, Side, BASE_VALUES};

/// Score of a won game
pub const WIN_VALUE: f64 = 100.0;

/// Score of a drawn game
pub const DRAW_VALUE: f64 = 50.0;

/// Score of a lost game
pub const LOSS_VALUE: f64 = 0.0;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Material per kind (pawn, bishop, knight, rook, queen, king)
    pub piece_values: [f64; 6],
    /// Added per legal move of the piece
    pub mobility_weight: f64,
    /// Material multiplier per enemy move landing on the piece
    pub attacked_factor: f64,
    /// Multiplier for an attacked piece whose side is not on move
    pub hanging_factor: f64,
    /// Pawn multiplier indexed by ranks left before promotion
    pub pawn_advancement: [f64; 8],
    /// Pawn with its own pawn ahead on the same file
    pub doubled_pawn_factor: f64,
    /// Pawn with no enemy pawn ahead on its own or adjacent files
    pub passed_pawn_factor: f64,
    /// Bonus indexed by remaining castling options
    pub castling_bonus: [f64; 3],
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            piece_values: BASE_VALUES,
            mobility_weight: 0.01,
            attacked_factor: 0.94,
            hanging_factor: 0.2,
            pawn_advancement: [6.5, 3.0, 1.5, 1.1, 1.02, 1.002, 1.0, 0.0],
            doubled_pawn_factor: 0.8,
            passed_pawn_factor: 2.0,
            castling_bonus: [0.0, 0.15, 0.2],
        }
    }
}

impl Heuristics {
    fn value_of(&self, kind: PieceKind) -> f64 {
        kind.index().map_or(0.0, |i| self.piece_values[i])
    }
}

/// Evaluate `board` for `root`, computing both sides' legal moves
pub fn evaluate(root: Side, board: &BoardState, heuristics: &Heuristics) -> f64 {
    if board.outcome().is_decided() {
        return decided_value(root, board);
    }
    let to_move = board.legal_moves();
    let waiting = board.opponent_legal_moves();
    if board.side_to_move() == root {
        score(root, board, &to_move, &waiting, heuristics)
    } else {
        score(root, board, &waiting, &to_move, heuristics)
    }
}

/// Score `board` for `root` given the legal moves of `root` and of its opponent
pub fn score(
    root: Side,
    board: &BoardState,
    root_moves: &[MoveRecord],
    opponent_moves: &[MoveRecord],
    heuristics: &Heuristics,
) -> f64 {
    if board.outcome().is_decided() {
        return decided_value(root, board);
    }

    let mut root_total = 0.0;
    let mut opponent_total = 0.0;
    for (square, piece) in board.pieces() {
        if piece.side == root {
            root_total += piece_value(square, piece, board, root_moves, opponent_moves, heuristics);
        } else {
            opponent_total += piece_value(square, piece, board, opponent_moves, root_moves, heuristics);
        }
    }

    root_total += heuristics.castling_bonus[board.castling_options(root).min(2)];
    opponent_total += heuristics.castling_bonus[board.castling_options(root.opponent()).min(2)];

    let total = root_total + opponent_total;
    if total <= 0.0 {
        return DRAW_VALUE;
    }
    root_total / total * WIN_VALUE
}

fn decided_value(root: Side, board: &BoardState) -> f64 {
    match board.outcome().winner() {
        Some(side) if side == root => WIN_VALUE,
        Some(_) => LOSS_VALUE,
        None => DRAW_VALUE,
    }
}

fn piece_value(
    square: Square,
    piece: Piece,
    board: &BoardState,
    own_moves: &[MoveRecord],
    enemy_moves: &[MoveRecord],
    heuristics: &Heuristics,
) -> f64 {
    let mobility = own_moves.iter().filter(|m| m.from() == square).count();
    let attackers = enemy_moves.iter().filter(|m| m.to() == square).count();

    let mut value = mobility as f64 * heuristics.mobility_weight
        + heuristics.value_of(piece.kind) * heuristics.attacked_factor.powi(attackers as i32);

    if attackers > 0 && piece.side != board.side_to_move() {
        value *= heuristics.hanging_factor;
    }

    if piece.is_pawn() {
        let ranks_left = (piece.side.promotion_rank() - square.y()).unsigned_abs() as usize;
        value *= heuristics.pawn_advancement[ranks_left.min(7)];

        if first_pawn_ahead(board, square.x(), square.y(), piece.side) == Some(piece.side) {
            value *= heuristics.doubled_pawn_factor;
        }

        let enemy = piece.side.opponent();
        let blocked = [-1, 0, 1]
            .into_iter()
            .any(|dx| pawn_ahead_of_side(board, square.x() + dx, square.y(), piece.side, enemy));
        if !blocked {
            value *= heuristics.passed_pawn_factor;
        }
    }

    value
}

/// Side of the nearest pawn in front of rank `y` on file `x`, looking the way
/// `side`'s pawns move
fn first_pawn_ahead(board: &BoardState, x: i8, y: i8, side: Side) -> Option<Side> {
    let dir = side.pawn_direction();
    let mut current = Square::try_new(x, y)?.offset(0, dir);
    while let Some(square) = current {
        let piece = board.piece_at(square);
        if piece.is_pawn() {
            return Some(piece.side);
        }
        current = square.offset(0, dir);
    }
    None
}

/// Any pawn of `owner` in front of rank `y` on file `x`
fn pawn_ahead_of_side(board: &BoardState, x: i8, y: i8, side: Side, owner: Side) -> bool {
    let dir = side.pawn_direction();
    let mut current = Square::try_new(x, y).and_then(|s| s.offset(0, dir));
    while let Some(square) = current {
        let piece = board.piece_at(square);
        if piece.is_pawn() && piece.side == owner {
            return true;
        }
        current = square.offset(0, dir);
    }
    false
}
