//! Move records kept in the game history

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::board::Square;
use crate::error::{ChessError, Result};
use crate::pieces::{Piece, PieceKind};

/// One ply. Equality and hashing only look at the moving piece and its
/// two squares; capture, promotion, flags and note are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    piece: Piece,
    from: Square,
    to: Square,
    captured: Piece,
    promotion: Option<PieceKind>,
    /// Castling or en passant
    special: bool,
    gives_check: bool,
    #[serde(default)]
    note: String,
}

impl MoveRecord {
    pub fn new(piece: Piece, from: Square, to: Square) -> Self {
        Self {
            piece,
            from,
            to,
            captured: Piece::EMPTY,
            promotion: None,
            special: false,
            gives_check: false,
            note: String::new(),
        }
    }

    /// Move carrying the caller's promotion choice
    pub fn with_promotion(piece: Piece, from: Square, to: Square, kind: PieceKind) -> Self {
        let mut mv = Self::new(piece, from, to);
        mv.promotion = Some(kind);
        mv
    }

    pub(crate) fn special(piece: Piece, from: Square, to: Square) -> Self {
        let mut mv = Self::new(piece, from, to);
        mv.special = true;
        mv
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    pub fn from(&self) -> Square {
        self.from
    }

    pub fn to(&self) -> Square {
        self.to
    }

    pub fn captured(&self) -> Piece {
        self.captured
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    pub fn gives_check(&self) -> bool {
        self.gives_check
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn is_castle(&self) -> bool {
        self.special && self.piece.is_king()
    }

    pub fn is_en_passant(&self) -> bool {
        self.special && self.piece.is_pawn()
    }

    /// Pawn arriving on its last rank
    pub fn needs_promotion(&self) -> bool {
        self.piece.is_pawn() && self.to.y() == self.piece.side.promotion_rank()
    }

    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Whether either end of the move is `square`
    pub fn touches(&self, square: Square) -> bool {
        self.from == square || self.to == square
    }

    pub(crate) fn set_captured(&mut self, captured: Piece) {
        self.captured = captured;
    }

    pub(crate) fn set_promotion(&mut self, kind: Option<PieceKind>) {
        self.promotion = kind;
    }

    pub(crate) fn mark_check(&mut self, gives_check: bool) {
        self.gives_check = gives_check;
    }

    /// Parse coordinate text: `e2e4`, `e2-e4`, `e7e8q`, `e7-e8=Q`
    pub fn parse_coordinates(text: &str) -> Result<(Square, Square, Option<PieceKind>)> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '=' | 'x' | '+'))
            .collect();
        if cleaned.len() != 4 && cleaned.len() != 5 {
            return Err(ChessError::UnknownMove(text.to_string()));
        }
        let bad = || ChessError::UnknownMove(text.to_string());
        let from: Square = cleaned.get(0..2).ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let to: Square = cleaned.get(2..4).ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let promotion = match cleaned.chars().nth(4) {
            Some(c) => Some(PieceKind::from_letter(c).ok_or_else(bad)?),
            None => None,
        };
        Ok((from, to, promotion))
    }
}

impl PartialEq for MoveRecord {
    fn eq(&self, other: &Self) -> bool {
        self.piece == other.piece && self.from == other.from && self.to == other.to
    }
}

impl Eq for MoveRecord {}

impl Hash for MoveRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.piece.hash(state);
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.piece.is_pawn() {
            write!(f, "{}", self.piece.kind.letter())?;
        }
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "={}", kind.letter())?;
        }
        if self.gives_check {
            write!(f, "+")?;
        }
        Ok(())
    }
}
