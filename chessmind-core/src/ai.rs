//! Skill-scaled lookahead search
//!
//! Each request builds a fresh tree of board clones, prunes wide nodes to
//! their best few children, backs values up minimax style in the requesting
//! side's frame, and then picks a root move at random with weights that
//! sharpen as skill rises.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{SearchConfig, SkillLevel};
use crate::error::{PreconditionViolation, Result};
use crate::eval::{evaluate, Heuristics, DRAW_VALUE};
use crate::game::BoardState;
use crate::moves::MoveRecord;
use crate::pieces::Side;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Move chosen by the engine plus its draw decisions
#[derive(Clone, Debug, Serialize)]
pub struct SearchResult {
    pub mv: MoveRecord,
    /// Highest-ranked root move, which `mv` equals unless randomness picked another
    pub best: MoveRecord,
    /// Backed-up value of the root position for the requesting side
    pub value: f64,
    /// The engine offers a draw along with this move
    pub requests_draw: bool,
    /// The move completes a perpetual check or repetition, which the engine claims
    pub declares_draw: bool,
    /// Tree nodes created for this request
    pub nodes: usize,
}

/// Search tree node. Owns its board and its children.
struct Node {
    mv: Option<MoveRecord>,
    board: BoardState,
    value: f64,
    children: Vec<Node>,
}

impl Node {
    fn new(mv: Option<MoveRecord>, board: BoardState) -> Self {
        Self {
            mv,
            board,
            value: DRAW_VALUE,
            children: Vec::new(),
        }
    }
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

pub struct SearchEngine {
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Default configuration with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SearchConfig::default().with_seed(seed))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Choose a move for `side`, which must be on move in an undecided game
    pub fn request_move(&mut self, board: &BoardState, skill: SkillLevel, side: Side) -> Result<SearchResult> {
        if board.side_to_move() != side {
            return Err(PreconditionViolation::NotSideToMove(side).into());
        }
        if board.legal_move_count() == 0 {
            return Err(PreconditionViolation::NoLegalMoves(side).into());
        }
        if board.outcome().is_decided() {
            return Err(PreconditionViolation::GameOver(board.outcome()).into());
        }

        let (root, nodes) = self.build_tree(board, skill, side);
        let index = self.select_root_child(&root.children, skill);
        let chosen = root
            .children
            .get(index)
            .ok_or(PreconditionViolation::NoLegalMoves(side))?;
        let mv = chosen
            .mv
            .clone()
            .ok_or(PreconditionViolation::NoLegalMoves(side))?;
        let best = root
            .children
            .first()
            .and_then(|child| child.mv.clone())
            .unwrap_or_else(|| mv.clone());

        let heuristics = &self.config.heuristics;
        let before = evaluate(side, board, heuristics);
        let after = evaluate(side, &chosen.board, heuristics);
        let declares_draw = chosen.board.outcome().is_forced_draw();
        let requests_draw =
            before - after < self.config.draw_drop_threshold && self.willing_to_draw(root.value, skill);

        debug!(
            %side,
            skill = skill.level(),
            nodes,
            chosen = %mv,
            value = root.value,
            requests_draw,
            declares_draw,
            "move selected"
        );

        Ok(SearchResult {
            mv,
            best,
            value: root.value,
            requests_draw,
            declares_draw,
            nodes,
        })
    }

    /// Decide whether `side` accepts a draw offered by its opponent
    pub fn accepts_draw(&mut self, board: &BoardState, skill: SkillLevel, side: Side) -> bool {
        if board.outcome().is_decided() {
            return false;
        }
        let (root, _) = self.build_tree(board, skill, side);
        let accepted = self.willing_to_draw(root.value, skill);
        debug!(%side, value = root.value, accepted, "draw offer answered");
        accepted
    }

    fn build_tree(&mut self, board: &BoardState, skill: SkillLevel, root_side: Side) -> (Node, usize) {
        let mut root = Node::new(None, board.clone());
        let mut nodes = 1;
        self.expand(&mut root, root_side, skill, 0, &mut nodes);
        (root, nodes)
    }

    /// Worse positions make a draw more attractive, more so at higher skill
    fn willing_to_draw(&mut self, root_value: f64, skill: SkillLevel) -> bool {
        self.rng.gen::<f64>() * 100.0 < (DRAW_VALUE - root_value) * skill.draw_scale()
    }

    fn expand(&mut self, node: &mut Node, root_side: Side, skill: SkillLevel, depth: usize, nodes: &mut usize) {
        if depth >= skill.depth() || node.board.outcome().is_decided() {
            node.value = if self.rng.gen::<f64>() < skill.neutral_substitution_chance() {
                self.config.neutral_value
            } else {
                evaluate(root_side, &node.board, &self.config.heuristics)
            };
            return;
        }

        let root_moves = node.board.side_to_move() == root_side;
        let legal = node.board.legal_moves();
        node.children = legal
            .iter()
            .map(|mv| Node::new(Some(mv.clone()), node.board.successor(mv)))
            .collect();
        *nodes += node.children.len();

        if legal.len() > self.config.prune_threshold {
            coarse_score(&mut node.children, root_side, &self.config.heuristics);
            sort_best_first(&mut node.children, root_moves);
            node.children.truncate(self.config.branching_factor.max(1));
            trace!(depth, kept = node.children.len(), generated = legal.len(), "pruned");
        }

        for child in node.children.iter_mut() {
            self.expand(child, root_side, skill, depth + 1, nodes);
        }

        sort_best_first(&mut node.children, root_moves);
        if let Some(best) = node.children.first() {
            node.value = best.value;
        }
    }

    /// Children arrive sorted best-first
    fn select_root_child(&mut self, children: &[Node], skill: SkillLevel) -> usize {
        let last = children.len().saturating_sub(1);
        if self.rng.gen::<f64>() < skill.blunder_chance() {
            return last;
        }

        let worst = children.get(last).map_or(0.0, |c| c.value);
        let spread = skill.spread();
        let weights: Vec<f64> = children
            .iter()
            .map(|c| (c.value * ((c.value - worst) * spread + 1.0)).max(0.0))
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return 0;
        }

        let mut threshold = self.rng.gen_range(0.0..total);
        for (i, weight) in weights.iter().enumerate() {
            if threshold < *weight {
                return i;
            }
            threshold -= weight;
        }
        0
    }
}

/// Best for the root side first when it moves, worst first otherwise
fn sort_best_first(children: &mut [Node], root_moves: bool) {
    if root_moves {
        children.sort_by(|a, b| b.value.total_cmp(&a.value));
    } else {
        children.sort_by(|a, b| a.value.total_cmp(&b.value));
    }
}

#[cfg(feature = "parallel")]
fn coarse_score(children: &mut [Node], root_side: Side, heuristics: &Heuristics) {
    use rayon::prelude::*;

    children
        .par_iter_mut()
        .for_each(|child| child.value = evaluate(root_side, &child.board, heuristics));
}

#[cfg(not(feature = "parallel"))]
fn coarse_score(children: &mut [Node], root_side: Side, heuristics: &Heuristics) {
    for child in children.iter_mut() {
        child.value = evaluate(root_side, &child.board, heuristics);
    }
}

// ============================================================================
// TESTS
// ============================================================================
