//! Depth-limited move search for 2048.
//!
//! Every ply shifts a copy of the board, samples **one** random spawn and
//! recurses; leaves are scored by the corner-weighted heuristic. There is
//! no pruning, no transposition table and no averaging over spawns, so two
//! calls with different RNG states may pick different moves.
//!
//! Two policies share the same surface:
//! - [`Search`]: single-threaded.
//! - [`SearchParallel`]: the four root directions explored on rayon.
//!
//! Quick start
//! ```
//! use solver_2048::engine::{Board, Move};
//! use solver_2048::search::{Search, SearchConfig};
//!
//! let board = Board::from_grid([[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 2]]).unwrap();
//! let mut search = Search::seeded(SearchConfig { depth: 3 }, 42);
//! let m = search.best_move(board);
//! assert!(board.can_shift(m));
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{self, Board, Move};

mod heuristic;
mod search_par;
mod search_seq;

pub use heuristic::heuristic_score;
pub use search_par::SearchParallel;
pub use search_seq::Search;

/// Heuristic value of a board that is already lost.
pub const LOST_SCORE: f64 = -1e12;

/// Value of a simulated node at depth > 0 from which no direction moves.
///
/// Strictly below [`LOST_SCORE`] so a blocked intermediate node never ties
/// with a lost leaf.
pub const DEAD_END_PENALTY: f64 = -1e15;

/// Default number of plies explored per decision.
pub const DEFAULT_DEPTH: u32 = 8;

/// Search knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies to simulate, counting the root move. 0 behaves like 1.
    pub depth: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH }
    }
}

/// Root score for one direction.
///
/// `legal` is false when the move does not change the board; `ev` is then
/// meaningless and the direction is never chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

impl BranchEval {
    fn illegal(dir: Move) -> Self {
        BranchEval { dir, ev: 0.0, legal: false }
    }
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited by the last call.
    pub nodes: u64,
    /// Largest `nodes` seen since construction or the last reset.
    pub peak_nodes: u64,
}

impl SearchStats {
    fn record(&mut self, nodes: u64) {
        self.nodes = nodes;
        self.peak_nodes = self.peak_nodes.max(nodes);
    }
}

/// Anything that can pick the next move for a board.
pub trait MovePolicy {
    /// Best direction for `board`.
    ///
    /// When no direction is legal this returns [`Move::Up`]; check
    /// [`Board::state`] first.
    fn best_move(&mut self, board: Board) -> Move;

    /// Stats of the last [`MovePolicy::best_move`] call.
    fn last_stats(&self) -> SearchStats;
}

/// Build the policy selected on the command line.
///
/// A seed makes the policy reproducible; without one it draws from OS entropy.
pub fn build_policy(cfg: SearchConfig, seed: Option<u64>, parallel: bool) -> Box<dyn MovePolicy> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if parallel {
        Box::new(SearchParallel::with_rng(cfg, rng))
    } else {
        Box::new(Search::with_rng(cfg, rng))
    }
}

/// Build the shift and heuristic tables up front so the first search is not charged for them.
pub fn warm_engine_and_heuristics() {
    engine::new();
    heuristic::warm();
}

/// Pick the highest legal branch; strict `>` keeps the earliest of equal scores.
pub(crate) fn pick_best(branches: &[BranchEval; 4]) -> Move {
    let mut best_move = Move::Up;
    let mut max_score = f64::NEG_INFINITY;
    for branch in branches.iter().filter(|b| b.legal) {
        if branch.ev > max_score {
            max_score = branch.ev;
            best_move = branch.dir;
        }
    }
    best_move
}

/// Score of `board` looking `depth` more plies ahead.
///
/// Depth 0 is a leaf. Otherwise each legal direction is shifted on a copy,
/// given one sampled spawn and recursed into; the maximum is returned, or
/// [`DEAD_END_PENALTY`] when nothing moves.
pub(crate) fn evaluate_path<R: Rng + ?Sized>(board: Board, depth: u32, rng: &mut R, nodes: &mut u64) -> f64 {
    *nodes += 1;
    if depth == 0 {
        return heuristic_score(board);
    }
    let mut best_score = f64::NEG_INFINITY;
    let mut moved_any = false;
    for dir in Move::ALL {
        let mut child = board;
        if child.apply(dir) {
            moved_any = true;
            child.spawn(rng);
            let score = evaluate_path(child, depth - 1, rng, nodes);
            if score > best_score {
                best_score = score;
            }
        }
    }
    if !moved_any {
        return DEAD_END_PENALTY;
    }
    best_score
}

/// Root expansion for one direction: shift, spawn, then score the subtree.
pub(crate) fn evaluate_root<R: Rng + ?Sized>(
    board: Board,
    dir: Move,
    depth: u32,
    rng: &mut R,
    nodes: &mut u64,
) -> BranchEval {
    let mut child = board;
    if !child.apply(dir) {
        return BranchEval::illegal(dir);
    }
    child.spawn(rng);
    let ev = evaluate_path(child, depth.saturating_sub(1), rng, nodes);
    log::trace!("branch {dir}: {ev}");
    BranchEval { dir, ev, legal: true }
}
