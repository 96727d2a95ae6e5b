//! Sides, piece kinds and the material table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Material value per kind, indexed by `PieceKind::index`
/// (pawn, bishop, knight, rook, queen, king)
pub const BASE_VALUES: [f64; 6] = [1.0, 3.0, 3.0, 5.0, 9.0, 0.0];

/// Kinds a pawn may promote into
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Which side a piece belongs to. `None` marks an empty square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    White,
    Black,
    None,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
            Side::None => Side::None,
        }
    }

    /// Rank delta of a forward pawn step
    pub fn pawn_direction(self) -> i8 {
        match self {
            Side::Black => -1,
            _ => 1,
        }
    }

    /// Back rank where the king and rooks start
    pub fn home_rank(self) -> i8 {
        match self {
            Side::Black => 7,
            _ => 0,
        }
    }

    /// Rank the pawns start on, the only rank allowing a double step
    pub fn pawn_start_rank(self) -> i8 {
        match self {
            Side::Black => 6,
            _ => 1,
        }
    }

    /// Rank a pawn must stand on to capture en passant
    pub fn en_passant_rank(self) -> i8 {
        match self {
            Side::Black => 3,
            _ => 4,
        }
    }

    /// Last rank, where pawns promote
    pub fn promotion_rank(self) -> i8 {
        self.opponent().home_rank()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::White => "white",
            Side::Black => "black",
            Side::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Bishop,
    Knight,
    Rook,
    Queen,
    King,
    Empty,
}

impl PieceKind {
    /// Index into `BASE_VALUES`. `Empty` has no entry.
    pub fn index(self) -> Option<usize> {
        match self {
            PieceKind::Pawn => Some(0),
            PieceKind::Bishop => Some(1),
            PieceKind::Knight => Some(2),
            PieceKind::Rook => Some(3),
            PieceKind::Queen => Some(4),
            PieceKind::King => Some(5),
            PieceKind::Empty => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
            PieceKind::Empty => '.',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn is_minor(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Knight)
    }

    pub fn is_promotable(self) -> bool {
        PROMOTION_KINDS.contains(&self)
    }

    pub fn base_value(self) -> f64 {
        self.index().map(|i| BASE_VALUES[i]).unwrap_or(0.0)
    }
}

/// Immutable occupant of a square
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    pub const EMPTY: Piece = Piece {
        side: Side::None,
        kind: PieceKind::Empty,
    };

    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == PieceKind::Empty
    }

    pub fn is_enemy_of(&self, side: Side) -> bool {
        !self.is_empty() && side != Side::None && self.side == side.opponent()
    }

    pub fn is_friend_of(&self, side: Side) -> bool {
        !self.is_empty() && self.side == side
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    pub fn is_pawn(&self) -> bool {
        self.kind == PieceKind::Pawn
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::EMPTY
    }
}

impl fmt::Display for Piece {
    /// Uppercase for white, lowercase for black
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.kind.letter();
        let c = if self.side == Side::Black { c.to_ascii_lowercase() } else { c };
        write!(f, "{}", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_ranks() {
        assert_eq!(Side::White.promotion_rank(), 7);
        assert_eq!(Side::Black.promotion_rank(), 0);
        assert_eq!(Side::White.pawn_start_rank() + Side::White.pawn_direction(), 2);
        assert_eq!(Side::Black.en_passant_rank(), 3);
        assert_eq!(Side::None.opponent(), Side::None);
    }

    #[test]
    fn test_piece_relations() {
        let white_rook = Piece::new(Side::White, PieceKind::Rook);
        assert!(white_rook.is_friend_of(Side::White));
        assert!(white_rook.is_enemy_of(Side::Black));
        assert!(!Piece::EMPTY.is_enemy_of(Side::White));
        assert!(!Piece::EMPTY.is_friend_of(Side::None));
        assert!(!white_rook.is_enemy_of(Side::None));
    }

    #[test]
    fn test_material_table() {
        assert_eq!(PieceKind::Queen.base_value(), 9.0);
        assert_eq!(PieceKind::King.base_value(), 0.0);
        assert_eq!(PieceKind::Empty.base_value(), 0.0);
        assert!(PieceKind::Knight.is_minor());
        assert!(!PieceKind::King.is_promotable());
        assert!(!PieceKind::Pawn.is_promotable());
    }

    #[test]
    fn test_piece_display() {
        assert_eq!(Piece::new(Side::White, PieceKind::Knight).to_string(), "N");
        assert_eq!(Piece::new(Side::Black, PieceKind::Queen).to_string(), "q");
        assert_eq!(Piece::EMPTY.to_string(), ".");
    }
}
