//! Error types for the rules and search engines

use crate::game::Outcome;
use crate::moves::MoveRecord;
use crate::pieces::{PieceKind, Side};

/// A caller broke an operation's contract
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("{0} has no legal moves")]
    NoLegalMoves(Side),

    #[error("promotion piece required but no responder was supplied")]
    PromotionUnanswered,

    #[error("{0} is not the side to move")]
    NotSideToMove(Side),

    #[error("the game is already over: {0}")]
    GameOver(Outcome),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChessError {
    #[error("Illegal move: {0}")]
    InvalidMove(MoveRecord),

    #[error("Invalid promotion piece: {0:?}")]
    InvalidPromotion(PieceKind),

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("No legal move matches '{0}'")]
    UnknownMove(String),

    #[error("Skill level must be 1..=5, got {0}")]
    InvalidSkill(u8),

    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
}

pub type Result<T> = std::result::Result<T, ChessError>;
