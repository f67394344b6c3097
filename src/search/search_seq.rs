use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{Board, Move};

use super::{evaluate_root, pick_best, warm_engine_and_heuristics, BranchEval, MovePolicy, SearchConfig, SearchStats};

/// Single-threaded depth-limited search.
///
/// Owns its RNG so spawns inside the simulation are reproducible from a seed.
pub struct Search<R = StdRng> {
    cfg: SearchConfig,
    rng: R,
    stats: SearchStats,
}

impl Search<StdRng> {
    /// Default config, RNG seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(SearchConfig::default(), StdRng::from_entropy())
    }

    /// Deterministic search: identical seeds give identical choices.
    pub fn seeded(cfg: SearchConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Search<R> {
    pub fn with_rng(cfg: SearchConfig, rng: R) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, rng, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Best direction for `board`.
    ///
    /// Directions are tried Up, Down, Left, Right and a later direction only
    /// wins with a strictly higher score. If nothing is legal the result is
    /// [`Move::Up`].
    ///
    /// ```
    /// use solver_2048::engine::{Board, Move};
    /// use solver_2048::search::{Search, SearchConfig};
    /// // Only Up and Right move this board
    /// let b = Board::from_grid([[0; 4], [0; 4], [0; 4], [2, 0, 0, 0]]).unwrap();
    /// let mut s = Search::seeded(SearchConfig { depth: 2 }, 7);
    /// assert!(matches!(s.best_move(b), Move::Up | Move::Right));
    /// ```
    pub fn best_move(&mut self, board: Board) -> Move {
        let branches = self.branch_evals(board);
        let best = pick_best(&branches);
        log::debug!("best move {best} after {} nodes", self.stats.nodes);
        best
    }

    /// Root score for each direction, in order `[Up, Down, Left, Right]`.
    ///
    /// Illegal directions are marked `legal=false` and consume no randomness.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let mut nodes = 0u64;
        let depth = self.cfg.depth;
        let out = Move::ALL.map(|dir| evaluate_root(board, dir, depth, &mut self.rng, &mut nodes));
        self.stats.record(nodes);
        out
    }

    /// Statistics collected from the last call to [`Self::best_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }
}

impl<R: Rng> MovePolicy for Search<R> {
    fn best_move(&mut self, board: Board) -> Move {
        Search::best_move(self, board)
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

impl Default for Search<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}
