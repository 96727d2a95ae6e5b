//! Integration tests for the chess engine
//!
//! Exercises the rules engine through random playouts and checks the
//! search engine's behaviour over many seeded requests.

use std::collections::HashSet;

use chessmind_core::{
    evaluate, perft, AutoQueen, BoardState, Heuristics, MoveRecord, Outcome, Piece, PieceKind,
    SearchEngine, Side, SkillLevel, Square,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn play(board: &mut BoardState, moves: &[&str]) {
    for text in moves {
        let mv = board.find_move(text).unwrap();
        board.apply_move(&mv).unwrap();
    }
}

/// Everything observable about a position, for comparing before and after undo
fn snapshot(board: &BoardState) -> (Vec<(Square, Piece)>, Side, Vec<MoveRecord>, bool, Outcome) {
    (
        board.pieces().collect(),
        board.side_to_move(),
        board.legal_moves(),
        board.in_check(),
        board.outcome(),
    )
}

/// Kings on g1 and g8, White queen on d1, undefended Black queen on d5
fn hanging_queen() -> BoardState {
    BoardState::from_pieces(
        &[
            (sq("g1"), Piece::new(Side::White, PieceKind::King)),
            (sq("d1"), Piece::new(Side::White, PieceKind::Queen)),
            (sq("g8"), Piece::new(Side::Black, PieceKind::King)),
            (sq("d5"), Piece::new(Side::Black, PieceKind::Queen)),
        ],
        Side::White,
    )
    .unwrap()
}

// ============================================================================
// RULES ENGINE
// ============================================================================

#[test]
fn test_random_playouts_keep_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..4 {
        let mut board = BoardState::new();
        for _ in 0..50 {
            if board.outcome().is_decided() {
                break;
            }
            let legal = board.legal_moves();
            assert!(!legal.is_empty());
            let before = snapshot(&board);

            // Every legal move must round-trip, not just the one played
            for mv in &legal {
                board.apply_move_with(mv, Some(&mut AutoQueen)).unwrap();

                // The mover's king is never left capturable
                assert!(!board.is_illegal_position(), "illegal after {}", mv);
                let last = board.last_move().unwrap();
                assert_eq!(last.gives_check(), board.in_check());

                let undone = board.undo().unwrap();
                assert_eq!(&undone, mv);
                assert_eq!(snapshot(&board), before, "undo of {} changed the position", mv);
            }

            let mv = &legal[rng.gen_range(0..legal.len())];
            board.apply_move_with(mv, Some(&mut AutoQueen)).unwrap();
        }
    }
}

#[test]
fn test_queen_has_four_moves_after_e4_e5() {
    let mut board = BoardState::new();
    play(&mut board, &["e2e4", "e7e5"]);
    let queen_moves = board
        .legal_moves()
        .iter()
        .filter(|mv| mv.piece().kind == PieceKind::Queen)
        .count();
    assert_eq!(queen_moves, 4);
}

#[test]
fn test_bare_kings_are_drawn() {
    let board = BoardState::from_pieces(
        &[
            (sq("e1"), Piece::new(Side::White, PieceKind::King)),
            (sq("e8"), Piece::new(Side::Black, PieceKind::King)),
        ],
        Side::White,
    )
    .unwrap();
    assert_eq!(board.outcome(), Outcome::InsufficientMaterial);
    assert_eq!(evaluate(Side::White, &board, &Heuristics::default()), 50.0);
}

#[test]
fn test_scholars_mate() {
    let mut board = BoardState::new();
    play(&mut board, &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);
    assert_eq!(board.outcome(), Outcome::WhiteWins);
    assert!(board.in_check());
    assert_eq!(board.legal_move_count(), 0);
    assert!(board.last_move().unwrap().gives_check());
}

#[test]
fn test_stalemate_is_drawn() {
    let mut board = BoardState::from_pieces(
        &[
            (sq("a8"), Piece::new(Side::Black, PieceKind::King)),
            (sq("c6"), Piece::new(Side::White, PieceKind::King)),
            (sq("b1"), Piece::new(Side::White, PieceKind::Queen)),
        ],
        Side::White,
    )
    .unwrap();
    play(&mut board, &["b1b6"]);
    assert_eq!(board.outcome(), Outcome::Stalemate);
    assert!(!board.in_check());
}

#[test]
fn test_castling_and_en_passant_in_one_game() {
    let mut board = BoardState::new();
    play(
        &mut board,
        &["e2e4", "a7a6", "e4e5", "d7d5", "e5d6", "a6a5", "g1f3", "a5a4", "f1e2", "a4a3"],
    );
    // The d5 pawn was taken en passant
    assert!(board.piece_at(sq("d5")).is_empty());
    assert_eq!(board.history()[4].captured().kind, PieceKind::Pawn);

    play(&mut board, &["e1g1"]);
    assert_eq!(board.piece_at(sq("g1")).kind, PieceKind::King);
    assert_eq!(board.piece_at(sq("f1")).kind, PieceKind::Rook);
    assert!(board.last_move().unwrap().is_castle());
    assert_eq!(board.castling_options(Side::White), 0);

    board.undo();
    assert_eq!(board.piece_at(sq("e1")).kind, PieceKind::King);
    assert_eq!(board.piece_at(sq("h1")).kind, PieceKind::Rook);
    assert_eq!(board.castling_options(Side::White), 2);
}

#[test]
fn test_replay_reproduces_position() {
    let mut board = BoardState::new();
    play(&mut board, &["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4"]);
    let replayed = BoardState::replay(board.history()).unwrap();
    assert_eq!(snapshot(&replayed), snapshot(&board));
}

#[test]
fn test_perft_from_initial_position() {
    assert_eq!(perft(&BoardState::new(), 3), 8902);
}

#[test]
fn test_extra_queen_scores_above_even() {
    let board = hanging_queen();
    let mut view = board.clone();
    play(&mut view, &["d1d5"]);
    assert!(evaluate(Side::White, &view, &Heuristics::default()) > 50.0);
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

#[test]
fn test_weak_engine_strays_from_best_move() {
    let board = BoardState::new();
    let mut engine = SearchEngine::with_seed(7);
    let skill = SkillLevel::MIN;

    let runs = 1000;
    let mut distinct = HashSet::new();
    let mut off_best = 0;
    for _ in 0..runs {
        let result = engine.request_move(&board, skill, Side::White).unwrap();
        assert!(board.is_legal(&result.mv));
        if result.mv != result.best {
            off_best += 1;
        }
        distinct.insert(result.mv.to_string());
    }
    // Roughly a third of requests play the worst root move outright
    assert!(off_best > runs / 5, "only {} of {} moves strayed", off_best, runs);
    assert!(distinct.len() > 1);
}

#[test]
fn test_strong_engine_plays_best_move() {
    let board = hanging_queen();
    let mut engine = SearchEngine::with_seed(31);
    let skill = SkillLevel::MAX;

    let runs = 200;
    let mut on_best = 0;
    let mut captures = 0;
    for _ in 0..runs {
        let result = engine.request_move(&board, skill, Side::White).unwrap();
        if result.mv == result.best {
            on_best += 1;
        }
        if result.mv.to() == sq("d5") {
            captures += 1;
        }
    }
    assert!(on_best as f64 / runs as f64 >= 0.95, "best move in {} of {}", on_best, runs);
    assert!(captures as f64 / runs as f64 >= 0.95, "captured in {} of {}", captures, runs);
}

#[test]
fn test_engine_refuses_decided_game() {
    let board = BoardState::from_pieces(
        &[
            (sq("e1"), Piece::new(Side::White, PieceKind::King)),
            (sq("b1"), Piece::new(Side::White, PieceKind::Knight)),
            (sq("e8"), Piece::new(Side::Black, PieceKind::King)),
        ],
        Side::White,
    )
    .unwrap();
    let mut engine = SearchEngine::with_seed(2);
    assert!(engine.request_move(&board, SkillLevel::MAX, Side::White).is_err());
}

#[test]
fn test_engine_games_end_with_legal_histories() {
    let mut engine = SearchEngine::with_seed(5);
    let skill = SkillLevel::new(2).unwrap();
    let mut board = BoardState::new();

    for _ in 0..40 {
        if board.outcome().is_decided() {
            break;
        }
        let side = board.side_to_move();
        let result = engine.request_move(&board, skill, side).unwrap();
        board.apply_move_with(&result.mv, Some(&mut AutoQueen)).unwrap();
    }
    let replayed = BoardState::replay(board.history()).unwrap();
    assert_eq!(snapshot(&replayed), snapshot(&board));
}
