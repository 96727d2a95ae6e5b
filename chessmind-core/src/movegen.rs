//! Pseudo-legal move generation per piece
//!
//! Generated moves ignore self-check. Any move landing on a king is put at
//! the front of the list, so a board scan only has to look at the first
//! move of each piece to find attacks on a king.

use crate::board::{
    Square, ALL_LINES, CASTLE_DISTANCE, DIAGONAL, KING_FILE, KINGSIDE_ROOK_FILE, KNIGHT_JUMPS,
    ORTHOGONAL, QUEENSIDE_ROOK_FILE,
};
use crate::game::BoardState;
use crate::moves::MoveRecord;
use crate::pieces::{Piece, PieceKind};

/// Pseudo-legal moves of `piece` standing on `from`
pub fn generate(piece: Piece, from: Square, board: &BoardState) -> Vec<MoveRecord> {
    let mut moves = Vec::with_capacity(16);
    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(piece, from, board, &mut moves),
        PieceKind::Bishop => generate_slide_moves(piece, from, &DIAGONAL, board, &mut moves),
        PieceKind::Rook => generate_slide_moves(piece, from, &ORTHOGONAL, board, &mut moves),
        PieceKind::Queen => generate_slide_moves(piece, from, &ALL_LINES, board, &mut moves),
        PieceKind::Knight => generate_step_moves(piece, from, &KNIGHT_JUMPS, board, &mut moves),
        PieceKind::King => {
            generate_step_moves(piece, from, &ALL_LINES, board, &mut moves);
            generate_castles(piece, from, board, &mut moves);
        }
        PieceKind::Empty => {}
    }
    moves
}

fn push_move(board: &BoardState, piece: Piece, from: Square, to: Square, moves: &mut Vec<MoveRecord>) {
    let mv = MoveRecord::new(piece, from, to);
    if board.piece_at(to).is_king() {
        moves.insert(0, mv);
    } else {
        moves.push(mv);
    }
}

fn generate_slide_moves(
    piece: Piece,
    from: Square,
    directions: &[(i8, i8)],
    board: &BoardState,
    moves: &mut Vec<MoveRecord>,
) {
    for &(dx, dy) in directions {
        let mut current = from;
        while let Some(next) = current.offset(dx, dy) {
            current = next;
            let occupant = board.piece_at(current);
            if occupant.is_empty() {
                push_move(board, piece, from, current, moves);
                continue;
            }
            if occupant.is_enemy_of(piece.side) {
                push_move(board, piece, from, current, moves);
            }
            break; // Blocked
        }
    }
}

fn generate_step_moves(
    piece: Piece,
    from: Square,
    offsets: &[(i8, i8)],
    board: &BoardState,
    moves: &mut Vec<MoveRecord>,
) {
    for &(dx, dy) in offsets {
        if let Some(to) = from.offset(dx, dy) {
            if !board.piece_at(to).is_friend_of(piece.side) {
                push_move(board, piece, from, to, moves);
            }
        }
    }
}

fn generate_castles(king: Piece, from: Square, board: &BoardState, moves: &mut Vec<MoveRecord>) {
    let home = Square::new(KING_FILE, king.side.home_rank());
    if from != home || !board.has_not_moved(home) {
        return;
    }
    for rook_file in [KINGSIDE_ROOK_FILE, QUEENSIDE_ROOK_FILE] {
        let rook_square = Square::new(rook_file, home.y());
        let rook = board.piece_at(rook_square);
        if rook.kind != PieceKind::Rook || !rook.is_friend_of(king.side) {
            continue;
        }
        if !board.has_not_moved(rook_square) {
            continue;
        }
        let step = (rook_file - KING_FILE).signum();
        let mut between = (KING_FILE + step..rook_file).chain(rook_file + 1..KING_FILE);
        if !between.all(|x| board.piece_at(Square::new(x, home.y())).is_empty()) {
            continue;
        }
        if let Some(to) = from.offset(step * CASTLE_DISTANCE, 0) {
            moves.push(MoveRecord::special(king, from, to));
        }
    }
}

fn generate_pawn_moves(pawn: Piece, from: Square, board: &BoardState, moves: &mut Vec<MoveRecord>) {
    let forward = pawn.side.pawn_direction();

    // Diagonal captures and en passant
    for dx in [-1, 1] {
        let Some(target) = from.offset(dx, forward) else {
            continue;
        };
        if board.piece_at(target).is_enemy_of(pawn.side) {
            push_move(board, pawn, from, target, moves);
        } else if en_passant_available(pawn, from, dx, board) {
            moves.push(MoveRecord::special(pawn, from, target));
        }
    }

    // Forward steps
    let Some(one_step) = from.offset(0, forward) else {
        return;
    };
    if !board.piece_at(one_step).is_empty() {
        return;
    }
    moves.push(MoveRecord::new(pawn, from, one_step));
    if from.y() == pawn.side.pawn_start_rank() {
        if let Some(two_step) = one_step.offset(0, forward) {
            if board.piece_at(two_step).is_empty() {
                moves.push(MoveRecord::new(pawn, from, two_step));
            }
        }
    }
}

/// The enemy pawn beside us must have just double-stepped onto that square
fn en_passant_available(pawn: Piece, from: Square, dx: i8, board: &BoardState) -> bool {
    if from.y() != pawn.side.en_passant_rank() {
        return false;
    }
    let Some(beside) = from.offset(dx, 0) else {
        return false;
    };
    let victim = board.piece_at(beside);
    if !victim.is_pawn() || !victim.is_enemy_of(pawn.side) {
        return false;
    }
    match board.last_move() {
        Some(last) => {
            last.piece() == victim
                && last.to() == beside
                && last.from().y() == victim.side.pawn_start_rank()
                && (last.to().y() - last.from().y()).abs() == 2
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::Side;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn targets(moves: &[MoveRecord]) -> Vec<String> {
        let mut names: Vec<String> = moves.iter().map(|m| m.to().to_string()).collect();
        names.sort();
        names
    }

    fn white(kind: PieceKind) -> Piece {
        Piece::new(Side::White, kind)
    }

    fn black(kind: PieceKind) -> Piece {
        Piece::new(Side::Black, kind)
    }

    #[test]
    fn test_initial_pieces() {
        let board = BoardState::new();
        let knight = generate(white(PieceKind::Knight), sq("g1"), &board);
        assert_eq!(targets(&knight), vec!["f3", "h3"]);
        let pawn = generate(white(PieceKind::Pawn), sq("e2"), &board);
        assert_eq!(targets(&pawn), vec!["e3", "e4"]);
        let rook = generate(white(PieceKind::Rook), sq("a1"), &board);
        assert!(rook.is_empty());
    }

    #[test]
    fn test_slider_stops_at_pieces() {
        let board = BoardState::from_pieces(
            &[
                (sq("e1"), white(PieceKind::King)),
                (sq("e8"), black(PieceKind::King)),
                (sq("d4"), white(PieceKind::Rook)),
                (sq("d6"), black(PieceKind::Knight)),
                (sq("f4"), white(PieceKind::Pawn)),
            ],
            Side::White,
        )
        .unwrap();
        let rook = generate(white(PieceKind::Rook), sq("d4"), &board);
        assert_eq!(
            targets(&rook),
            vec!["a4", "b4", "c4", "d1", "d2", "d3", "d5", "d6", "e4"]
        );
    }

    #[test]
    fn test_king_capture_sorted_first() {
        let board = BoardState::from_pieces(
            &[
                (sq("a1"), white(PieceKind::King)),
                (sq("h8"), black(PieceKind::King)),
                (sq("h1"), black(PieceKind::Rook)),
            ],
            Side::White,
        )
        .unwrap();
        let rook = generate(black(PieceKind::Rook), sq("h1"), &board);
        assert_eq!(rook[0].to(), sq("a1"));
    }

    #[test]
    fn test_pawn_blocked_and_captures() {
        let board = BoardState::from_pieces(
            &[
                (sq("e1"), white(PieceKind::King)),
                (sq("e8"), black(PieceKind::King)),
                (sq("d2"), white(PieceKind::Pawn)),
                (sq("d3"), black(PieceKind::Knight)),
                (sq("c3"), black(PieceKind::Bishop)),
            ],
            Side::White,
        )
        .unwrap();
        let pawn = generate(white(PieceKind::Pawn), sq("d2"), &board);
        assert_eq!(targets(&pawn), vec!["c3"]);
    }

    #[test]
    fn test_castle_candidates() {
        let board = BoardState::from_pieces(
            &[
                (sq("e1"), white(PieceKind::King)),
                (sq("a1"), white(PieceKind::Rook)),
                (sq("h1"), white(PieceKind::Rook)),
                (sq("b1"), white(PieceKind::Knight)),
                (sq("e8"), black(PieceKind::King)),
            ],
            Side::White,
        )
        .unwrap();
        let king = generate(white(PieceKind::King), sq("e1"), &board);
        let castles: Vec<_> = king.iter().filter(|m| m.is_castle()).collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to(), sq("g1"));
    }
}
