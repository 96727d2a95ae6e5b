//! Callback hook for choosing a promotion piece

use crate::pieces::{PieceKind, Side};

/// Answers which piece a pawn of `side` becomes on its last rank.
///
/// Interactive front ends implement this to ask a human; the search
/// engine always uses [`AutoQueen`].
pub trait PromotionResponder {
    fn request_promotion_piece(&mut self, side: Side) -> PieceKind;
}

/// Always promotes to a queen
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoQueen;

impl PromotionResponder for AutoQueen {
    fn request_promotion_piece(&mut self, _side: Side) -> PieceKind {
        PieceKind::Queen
    }
}

/// Always answers the same kind
#[derive(Clone, Copy, Debug)]
pub struct FixedPromotion(pub PieceKind);

impl PromotionResponder for FixedPromotion {
    fn request_promotion_piece(&mut self, _side: Side) -> PieceKind {
        self.0
    }
}
