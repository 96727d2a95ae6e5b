//! Game state, legality filtering and outcome detection

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{
    Square, BOARD_SIZE, KING_FILE, KINGSIDE_CASTLED_ROOK_FILE, KINGSIDE_ROOK_FILE,
    QUEENSIDE_CASTLED_ROOK_FILE, QUEENSIDE_ROOK_FILE,
};
use crate::error::{ChessError, PreconditionViolation, Result};
use crate::movegen;
use crate::moves::MoveRecord;
use crate::pieces::{Piece, PieceKind, Side};
use crate::promotion::{AutoQueen, PromotionResponder};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Back rank order from the a-file
const ORDER: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Consecutive checking plies that end the game as a draw
const PERPETUAL_CHECK_PLIES: usize = 50;

/// Plies needed before the repetition pattern can match
const REPETITION_MIN_PLIES: usize = 12;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    WhiteWins,
    BlackWins,
    Stalemate,
    InsufficientMaterial,
    PerpetualCheckDraw,
    ThreefoldRepetitionDraw,
}

/// Why a game was drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    PerpetualCheck,
    ThreefoldRepetition,
}

impl Outcome {
    pub fn is_decided(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::WhiteWins => Some(Side::White),
            Outcome::BlackWins => Some(Side::Black),
            _ => None,
        }
    }

    pub fn is_draw(self) -> bool {
        self.draw_reason().is_some()
    }

    /// Draws that a player declares rather than ones the rules impose at once
    pub fn is_forced_draw(self) -> bool {
        matches!(self, Outcome::PerpetualCheckDraw | Outcome::ThreefoldRepetitionDraw)
    }

    pub fn draw_reason(self) -> Option<DrawReason> {
        match self {
            Outcome::Stalemate => Some(DrawReason::Stalemate),
            Outcome::InsufficientMaterial => Some(DrawReason::InsufficientMaterial),
            Outcome::PerpetualCheckDraw => Some(DrawReason::PerpetualCheck),
            Outcome::ThreefoldRepetitionDraw => Some(DrawReason::ThreefoldRepetition),
            _ => None,
        }
    }

    fn win_for(side: Side) -> Self {
        match side {
            Side::White => Outcome::WhiteWins,
            _ => Outcome::BlackWins,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Outcome::InProgress => "in progress",
            Outcome::WhiteWins => "white wins",
            Outcome::BlackWins => "black wins",
            Outcome::Stalemate => "stalemate",
            Outcome::InsufficientMaterial => "draw by insufficient material",
            Outcome::PerpetualCheckDraw => "draw by perpetual check",
            Outcome::ThreefoldRepetitionDraw => "draw by repetition",
        };
        f.write_str(text)
    }
}

/// Pseudo-legal moves of both sides plus the king-attack flags found on the way
#[derive(Default)]
struct Scan {
    mover: Vec<MoveRecord>,
    opponent: Vec<MoveRecord>,
    checked: bool,
    illegal: bool,
}

// ============================================================================
// BOARD STATE
// ============================================================================

/// Full game state. The legal move list is derived and rebuilt after every
/// mutation.
#[derive(Clone, Debug)]
pub struct BoardState {
    /// Indexed `[x][y]`
    grid: [[Piece; 8]; 8],
    side_to_move: Side,
    history: Vec<MoveRecord>,
    legal_moves: Vec<MoveRecord>,
    opponent_pseudo: Vec<MoveRecord>,
    checked: bool,
    illegal_position: bool,
    outcome: Outcome,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// Standard starting position, White to move
    pub fn new() -> Self {
        let mut grid = [[Piece::EMPTY; 8]; 8];
        for (x, kind) in ORDER.iter().enumerate() {
            grid[x][0] = Piece::new(Side::White, *kind);
            grid[x][1] = Piece::new(Side::White, PieceKind::Pawn);
            grid[x][6] = Piece::new(Side::Black, PieceKind::Pawn);
            grid[x][7] = Piece::new(Side::Black, *kind);
        }
        Self::with_grid(grid, Side::White)
    }

    /// Custom position with an empty history
    pub fn from_pieces(placements: &[(Square, Piece)], side_to_move: Side) -> Result<Self> {
        if side_to_move == Side::None {
            return Err(ChessError::InvalidSetup("side to move must be white or black".into()));
        }
        let mut grid = [[Piece::EMPTY; 8]; 8];
        for &(square, piece) in placements {
            if piece.is_empty() || piece.side == Side::None {
                continue;
            }
            if piece.is_pawn() && (square.y() == 0 || square.y() == BOARD_SIZE - 1) {
                return Err(ChessError::InvalidSetup(format!("pawn on back rank at {}", square)));
            }
            grid[square.x() as usize][square.y() as usize] = piece;
        }
        for side in [Side::White, Side::Black] {
            let kings = grid
                .iter()
                .flatten()
                .filter(|p| p.is_king() && p.side == side)
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidSetup(format!("{} has {} kings", side, kings)));
            }
        }
        let board = Self::with_grid(grid, side_to_move);
        if board.illegal_position {
            return Err(ChessError::InvalidSetup(format!(
                "{} king can be captured",
                side_to_move.opponent()
            )));
        }
        Ok(board)
    }

    /// Play a stored sequence from the starting position
    pub fn replay(moves: &[MoveRecord]) -> Result<Self> {
        let mut board = Self::new();
        for mv in moves {
            board.apply_move(mv)?;
        }
        Ok(board)
    }

    fn with_grid(grid: [[Piece; 8]; 8], side_to_move: Side) -> Self {
        let mut board = Self {
            grid,
            side_to_move,
            history: Vec::new(),
            legal_moves: Vec::new(),
            opponent_pseudo: Vec::new(),
            checked: false,
            illegal_position: false,
            outcome: Outcome::InProgress,
        };
        board.refresh();
        board
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn piece_at(&self, square: Square) -> Piece {
        self.grid[square.x() as usize][square.y() as usize]
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    /// Fresh copy of the legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<MoveRecord> {
        self.legal_moves.clone()
    }

    pub fn legal_move_count(&self) -> usize {
        self.legal_moves.len()
    }

    pub fn is_legal(&self, mv: &MoveRecord) -> bool {
        self.legal_moves.contains(mv)
    }

    /// Legal moves of the side not on move, as if it were its turn
    pub fn opponent_legal_moves(&self) -> Vec<MoveRecord> {
        self.filter_legal(self.opponent_pseudo.clone(), self.side_to_move.opponent(), false)
    }

    /// Whether the side to move is in check
    pub fn in_check(&self) -> bool {
        self.checked
    }

    /// Whether the side to move could capture the enemy king
    pub fn is_illegal_position(&self) -> bool {
        self.illegal_position
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn draw_reason(&self) -> Option<DrawReason> {
        self.outcome.draw_reason()
    }

    /// Occupied squares, file by file
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all()
            .map(move |sq| (sq, self.piece_at(sq)))
            .filter(|(_, p)| !p.is_empty())
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is_king() && p.side == side)
            .map(|(sq, _)| sq)
    }

    /// No history entry starts or ends on `square`
    pub fn has_not_moved(&self, square: Square) -> bool {
        !self.history.iter().any(|mv| mv.touches(square))
    }

    /// Number of rooks `side` could still castle with (0..=2)
    pub fn castling_options(&self, side: Side) -> usize {
        let rank = side.home_rank();
        let king_home = Square::new(KING_FILE, rank);
        let king = self.piece_at(king_home);
        if !king.is_king() || !king.is_friend_of(side) || !self.has_not_moved(king_home) {
            return 0;
        }
        [QUEENSIDE_ROOK_FILE, KINGSIDE_ROOK_FILE]
            .into_iter()
            .map(|x| Square::new(x, rank))
            .filter(|&sq| {
                let rook = self.piece_at(sq);
                rook.kind == PieceKind::Rook && rook.is_friend_of(side) && self.has_not_moved(sq)
            })
            .count()
    }

    /// Resolve coordinate text such as `e2e4` or `e7e8q` against the legal moves
    pub fn find_move(&self, text: &str) -> Result<MoveRecord> {
        let (from, to, promotion) = MoveRecord::parse_coordinates(text)?;
        let canonical = self
            .legal_moves
            .iter()
            .find(|mv| mv.from() == from && mv.to() == to)
            .ok_or_else(|| ChessError::UnknownMove(text.to_string()))?;
        Ok(match promotion {
            Some(kind) => MoveRecord::with_promotion(canonical.piece(), from, to, kind),
            None => canonical.clone(),
        })
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Apply a legal move. Promotions must carry their piece.
    pub fn apply_move(&mut self, mv: &MoveRecord) -> Result<()> {
        self.apply_move_with(mv, None)
    }

    /// Apply a legal move, asking `responder` for a promotion piece the move
    /// does not carry. Nothing is mutated on error.
    pub fn apply_move_with(
        &mut self,
        mv: &MoveRecord,
        responder: Option<&mut dyn PromotionResponder>,
    ) -> Result<()> {
        let mut record = self
            .legal_moves
            .iter()
            .find(|legal| *legal == mv)
            .cloned()
            .ok_or_else(|| ChessError::InvalidMove(mv.clone()))?;

        let promotion = if record.needs_promotion() {
            let kind = match (mv.promotion(), responder) {
                (Some(kind), _) => kind,
                (None, Some(responder)) => responder.request_promotion_piece(self.side_to_move),
                (None, None) => return Err(PreconditionViolation::PromotionUnanswered.into()),
            };
            if !kind.is_promotable() {
                return Err(ChessError::InvalidPromotion(kind));
            }
            Some(kind)
        } else {
            None
        };

        if !mv.note().is_empty() {
            record.set_note(mv.note());
        }
        self.place(record, promotion);
        Ok(())
    }

    /// Take back the last move
    pub fn undo(&mut self) -> Option<MoveRecord> {
        let record = self.history.pop()?;
        let from = record.from();
        let to = record.to();

        // The record holds the pawn, not the promoted piece
        self.set(from, record.piece());
        if record.is_en_passant() {
            self.set(to, Piece::EMPTY);
            self.set(Square::new(to.x(), from.y()), record.captured());
        } else if record.is_castle() {
            self.set(to, Piece::EMPTY);
            let (rook_from, rook_to) = castle_rook_squares(&record);
            let rook = self.piece_at(rook_to);
            self.set(rook_to, Piece::EMPTY);
            self.set(rook_from, rook);
        } else {
            self.set(to, record.captured());
        }

        self.side_to_move = self.side_to_move.opponent();
        self.refresh();
        Some(record)
    }

    /// Copy of the board with `mv` applied, promoting to a queen when the
    /// move carries no piece
    pub fn view_move(&self, mv: &MoveRecord) -> Result<BoardState> {
        let mut view = self.clone();
        view.apply_move_with(mv, Some(&mut AutoQueen))?;
        Ok(view)
    }

    /// Copy with a move from `legal_moves` applied. Promotions become queens
    /// unless the move carries its piece.
    pub(crate) fn successor(&self, mv: &MoveRecord) -> BoardState {
        self.successor_with(mv, mv.promotion().unwrap_or(PieceKind::Queen))
    }

    /// Copy with a move from `legal_moves` applied, promoting to `kind` if
    /// the move promotes
    pub(crate) fn successor_with(&self, mv: &MoveRecord, kind: PieceKind) -> BoardState {
        let mut next = self.clone();
        let promotion = mv.needs_promotion().then_some(kind);
        next.place(mv.clone(), promotion);
        next
    }

    fn set(&mut self, square: Square, piece: Piece) {
        self.grid[square.x() as usize][square.y() as usize] = piece;
    }

    /// Move pieces on the grid for one of the four cases and record the ply
    fn place(&mut self, mut record: MoveRecord, promotion: Option<PieceKind>) {
        let from = record.from();
        let to = record.to();
        let mover = record.piece();

        let captured = if record.is_en_passant() {
            let victim = Square::new(to.x(), from.y());
            let taken = self.piece_at(victim);
            self.set(victim, Piece::EMPTY);
            taken
        } else if record.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(&record);
            let rook = self.piece_at(rook_from);
            self.set(rook_from, Piece::EMPTY);
            self.set(rook_to, rook);
            Piece::EMPTY
        } else {
            self.piece_at(to)
        };

        let arriving = promotion.map_or(mover, |kind| Piece::new(mover.side, kind));
        self.set(to, arriving);
        self.set(from, Piece::EMPTY);

        record.set_captured(captured);
        record.set_promotion(promotion);
        self.history.push(record);
        self.side_to_move = self.side_to_move.opponent();

        self.recompute_moves();
        let checked = self.checked;
        if let Some(last) = self.history.last_mut() {
            last.mark_check(checked);
        }
        self.outcome = self.compute_outcome();
    }

    // ------------------------------------------------------------------------
    // Legality
    // ------------------------------------------------------------------------

    fn refresh(&mut self) {
        self.recompute_moves();
        self.outcome = self.compute_outcome();
    }

    fn recompute_moves(&mut self) {
        let scan = self.scan();
        self.checked = scan.checked;
        self.illegal_position = scan.illegal;
        self.legal_moves = self.filter_legal(scan.mover, self.side_to_move, scan.checked);
        self.opponent_pseudo = scan.opponent;
    }

    /// Generate pseudo-legal moves for every piece. The first move of each
    /// piece tells whether it attacks a king.
    fn scan(&self) -> Scan {
        let mut scan = Scan::default();
        for (square, piece) in self.pieces() {
            let moves = movegen::generate(piece, square, self);
            if let Some(first) = moves.first() {
                let target = self.piece_at(first.to());
                if target.is_king() {
                    if target.side != self.side_to_move {
                        scan.illegal = true;
                    } else {
                        scan.checked = true;
                    }
                }
            }
            if piece.side == self.side_to_move {
                scan.mover.extend(moves);
            } else {
                scan.opponent.extend(moves);
            }
        }
        scan
    }

    /// Drop candidates of `mover` that leave its king capturable and flag
    /// the ones that give check
    fn filter_legal(&self, candidates: Vec<MoveRecord>, mover: Side, mover_in_check: bool) -> Vec<MoveRecord> {
        let mut legal = Vec::with_capacity(candidates.len());
        let mut castles = Vec::new();
        for mut mv in candidates {
            let reply = self.simulate(&mv, mover);
            if reply.illegal {
                continue;
            }
            mv.mark_check(reply.checked);
            if mv.is_castle() {
                castles.push(mv);
            } else {
                legal.push(mv);
            }
        }

        // A castle also needs the one-square king step toward the rook to be legal
        for castle in castles {
            if mover_in_check {
                continue;
            }
            let step = (castle.to().x() - castle.from().x()).signum();
            let Some(passed) = castle.from().offset(step, 0) else {
                continue;
            };
            let proxy = MoveRecord::new(castle.piece(), castle.from(), passed);
            if legal.contains(&proxy) {
                legal.push(castle);
            }
        }
        legal
    }

    /// Play `mv` on a scratch grid and scan the reply position. King attacks
    /// never depend on history, so the scratch board carries none.
    fn simulate(&self, mv: &MoveRecord, mover: Side) -> Scan {
        let mut scratch = BoardState {
            grid: self.grid,
            side_to_move: mover.opponent(),
            history: Vec::new(),
            legal_moves: Vec::new(),
            opponent_pseudo: Vec::new(),
            checked: false,
            illegal_position: false,
            outcome: Outcome::InProgress,
        };
        let from = mv.from();
        let to = mv.to();
        if mv.is_en_passant() {
            scratch.set(Square::new(to.x(), from.y()), Piece::EMPTY);
        } else if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(mv);
            let rook = scratch.piece_at(rook_from);
            scratch.set(rook_from, Piece::EMPTY);
            scratch.set(rook_to, rook);
        }
        let arriving = if mv.needs_promotion() {
            Piece::new(mv.piece().side, PieceKind::Queen)
        } else {
            mv.piece()
        };
        scratch.set(to, arriving);
        scratch.set(from, Piece::EMPTY);
        scratch.scan()
    }

    // ------------------------------------------------------------------------
    // Outcome
    // ------------------------------------------------------------------------

    fn compute_outcome(&self) -> Outcome {
        if self.legal_moves.is_empty() {
            return if self.checked {
                Outcome::win_for(self.side_to_move.opponent())
            } else {
                Outcome::Stalemate
            };
        }
        if !self.has_mating_material(Side::White) && !self.has_mating_material(Side::Black) {
            return Outcome::InsufficientMaterial;
        }
        if self.perpetual_check() {
            return Outcome::PerpetualCheckDraw;
        }
        let len = self.history.len();
        if len >= REPETITION_MIN_PLIES && self.repeats_at(len - 1) && self.repeats_at(len - 2) {
            return Outcome::ThreefoldRepetitionDraw;
        }
        Outcome::InProgress
    }

    /// Anything beyond the king and a single minor piece
    fn has_mating_material(&self, side: Side) -> bool {
        let mut minors = 0;
        for (_, piece) in self.pieces().filter(|(_, p)| p.side == side) {
            match piece.kind {
                PieceKind::King => {}
                kind if kind.is_minor() => {
                    minors += 1;
                    if minors > 1 {
                        return true;
                    }
                }
                _ => return true,
            }
        }
        false
    }

    fn perpetual_check(&self) -> bool {
        self.history.len() >= PERPETUAL_CHECK_PLIES
            && self.history[self.history.len() - PERPETUAL_CHECK_PLIES..]
                .iter()
                .all(|mv| mv.gives_check())
    }

    /// Plies `i`, `i-4`, `i-8` are the same move, and so are `i-2`, `i-6`, `i-10`
    fn repeats_at(&self, i: usize) -> bool {
        if i < 10 {
            return false;
        }
        let h = &self.history;
        h[i] == h[i - 4] && h[i] == h[i - 8] && h[i - 2] == h[i - 6] && h[i - 2] == h[i - 10]
    }
}

/// Rook start and end squares for a castling move
fn castle_rook_squares(castle: &MoveRecord) -> (Square, Square) {
    let rank = castle.from().y();
    if castle.to().x() > castle.from().x() {
        (
            Square::new(KINGSIDE_ROOK_FILE, rank),
            Square::new(KINGSIDE_CASTLED_ROOK_FILE, rank),
        )
    } else {
        (
            Square::new(QUEENSIDE_ROOK_FILE, rank),
            Square::new(QUEENSIDE_CASTLED_ROOK_FILE, rank),
        )
    }
}

impl fmt::Display for BoardState {
    /// ASCII diagram, rank 8 on top
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..BOARD_SIZE).rev() {
            write!(f, "{} ", y + 1)?;
            for x in 0..BOARD_SIZE {
                write!(f, " {}", self.piece_at(Square::new(x, y)))?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

// ============================================================================
// TESTS
// ============================================================================
