use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::{Board, Move};

use super::{evaluate_root, pick_best, warm_engine_and_heuristics, BranchEval, MovePolicy, SearchConfig, SearchStats};

/// Search with the four root directions explored in parallel on rayon.
///
/// Before fanning out, one seed per direction is drawn from the master RNG
/// in canonical order, so a seeded `SearchParallel` is reproducible no
/// matter how rayon schedules the branches. Ties are resolved after every
/// branch has finished, earliest direction first.
pub struct SearchParallel<R = StdRng> {
    cfg: SearchConfig,
    rng: R,
    stats: SearchStats,
}

impl SearchParallel<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(SearchConfig::default(), StdRng::from_entropy())
    }

    pub fn seeded(cfg: SearchConfig, seed: u64) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SearchParallel<R> {
    pub fn with_rng(cfg: SearchConfig, rng: R) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, rng, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Compute the best move using the parallel root fan-out.
    ///
    /// This is a convenience wrapper around `branch_evals` that just picks the best move.
    pub fn best_move(&mut self, board: Board) -> Move {
        let branches = self.branch_evals(board);
        let best = pick_best(&branches);
        log::debug!("best move {best} after {} nodes (parallel)", self.stats.nodes);
        best
    }

    /// Get both the best move and all branch evaluations from one search.
    pub fn best_move_with_branches(&mut self, board: Board) -> (Move, [BranchEval; 4]) {
        let branches = self.branch_evals(board);
        (pick_best(&branches), branches)
    }

    /// Root score for each direction, in order `[Up, Down, Left, Right]`.
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let depth = self.cfg.depth;
        let seeds: [u64; 4] = [0; 4].map(|_| self.rng.gen());
        let out_vec: Vec<(BranchEval, u64)> = Move::ALL
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(&dir, &seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut nodes = 0u64;
                let eval = evaluate_root(board, dir, depth, &mut rng, &mut nodes);
                (eval, nodes)
            })
            .collect();
        // Convert to fixed array preserving order
        let mut out = Move::ALL.map(|dir| BranchEval { dir, ev: 0.0, legal: false });
        let mut nodes = 0u64;
        for (i, (eval, n)) in out_vec.into_iter().enumerate() {
            out[i] = eval;
            nodes += n;
        }
        self.stats.record(nodes);
        out
    }

    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }
}

impl<R: Rng> MovePolicy for SearchParallel<R> {
    fn best_move(&mut self, board: Board) -> Move {
        SearchParallel::best_move(self, board)
    }

    fn last_stats(&self) -> SearchStats {
        self.stats
    }
}

impl Default for SearchParallel<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}
