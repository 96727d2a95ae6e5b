//! Chessmind Core - Chess rules engine and skill-scaled AI
//!
//! This crate provides:
//! - Board geometry and algebraic square names
//! - Pieces, move records and pseudo-legal move generation
//! - Game state with legality filtering, undo and outcome detection
//! - Position evaluation in a 0-100 frame
//! - A pruned lookahead search with randomized, skill-scaled move choice

pub mod board;
pub mod pieces;
pub mod moves;
pub mod movegen;
pub mod game;
pub mod error;
pub mod promotion;
pub mod eval;
pub mod config;
pub mod ai;
pub mod perft;

// Re-exports for convenient access
pub use board::Square;
pub use pieces::{Piece, PieceKind, Side, BASE_VALUES};
pub use moves::MoveRecord;
pub use game::{BoardState, DrawReason, Outcome};
pub use error::{ChessError, PreconditionViolation, Result};
pub use promotion::{AutoQueen, FixedPromotion, PromotionResponder};
pub use eval::{evaluate, score, Heuristics, DRAW_VALUE, LOSS_VALUE, WIN_VALUE};
pub use config::{SearchConfig, SkillLevel};
pub use ai::{SearchEngine, SearchResult};
pub use perft::{divide, perft};
