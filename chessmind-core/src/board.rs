//! Board geometry with file/rank coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// Board length along one edge
pub const BOARD_SIZE: i8 = 8;

/// File of both kings at the start of the game
pub const KING_FILE: i8 = 4;

/// Rook files before castling
pub const QUEENSIDE_ROOK_FILE: i8 = 0;
pub const KINGSIDE_ROOK_FILE: i8 = 7;

/// Rook files after castling
pub const QUEENSIDE_CASTLED_ROOK_FILE: i8 = 3;
pub const KINGSIDE_CASTLED_ROOK_FILE: i8 = 5;

/// Distance the king travels when castling
pub const CASTLE_DISTANCE: i8 = 2;

/// A square on the board: `x` is the file (a..h), `y` the rank (1..8) minus one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    x: i8,
    y: i8,
}

impl Square {
    /// Create a square. Panics on coordinates outside the board.
    pub const fn new(x: i8, y: i8) -> Self {
        assert!(x >= 0 && x < BOARD_SIZE && y >= 0 && y < BOARD_SIZE, "square out of bounds");
        Self { x, y }
    }

    /// Create a square if the coordinates are on the board
    pub fn try_new(x: i8, y: i8) -> Option<Self> {
        if in_bounds(x, y) {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    /// Square reached by a relative step, if still on the board
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Square> {
        Square::try_new(self.x + dx, self.y + dy)
    }

    /// Iterate all 64 squares, file by file
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|x| (0..BOARD_SIZE).map(move |y| Square { x, y }))
    }

    fn file_char(&self) -> char {
        (b'a' + self.x as u8) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.y + 1)
    }
}

impl FromStr for Square {
    type Err = ChessError;

    /// Parse algebraic names such as `e4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        Ok(Square::new((file - b'a') as i8, (rank - b'1') as i8))
    }
}

/// Check that both coordinates are on the board
pub fn in_bounds(x: i8, y: i8) -> bool {
    (0..BOARD_SIZE).contains(&x) && (0..BOARD_SIZE).contains(&y)
}

/// Rook, king and queen line directions (dx, dy)
pub const ORTHOGONAL: [(i8, i8); 4] = [
    (1, 0),  // right
    (-1, 0), // left
    (0, -1), // down
    (0, 1),  // up
];

/// Bishop, king and queen diagonal directions (dx, dy)
pub const DIAGONAL: [(i8, i8); 4] = [
    (1, 1),   // up right
    (-1, -1), // down left
    (1, -1),  // down right
    (-1, 1),  // up left
];

/// All eight line directions, diagonals first
pub const ALL_LINES: [(i8, i8); 8] = [
    DIAGONAL[0],
    DIAGONAL[1],
    DIAGONAL[2],
    DIAGONAL[3],
    ORTHOGONAL[0],
    ORTHOGONAL[1],
    ORTHOGONAL[2],
    ORTHOGONAL[3],
];

/// Knight jump offsets
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (-1, 2),
    (-1, -2),
    (1, 2),
    (1, -2),
];
