//! solver-2048: a 2048 game engine + corner-weighted move search
//!
//! This crate provides:
//! - A compact `Board` type with ergonomic methods (`shift`, `apply`, `can_shift`, `state`, ...)
//! - A `Game` value that is driven by shift-then-spawn
//! - A depth-limited search (`search` module) with single-threaded and parallel variants
//! - The `{"grid": ...}` JSON codec and single-evaluation response (`serialization` module)
//!
//! Quick start:
//! ```
//! use solver_2048::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let before = b.sum();
//! if b.apply(Move::Left) {
//!     // Shifting never changes the total; only spawns add to it
//!     assert_eq!(b.sum(), before);
//! }
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use solver_2048::engine::{Game, GameState};
//! use solver_2048::search::{Search, SearchConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut search = Search::seeded(SearchConfig { depth: 3 }, 7);
//! let mut game = Game::new(&mut rng);
//! let mut moves = 0u32;
//!
//! // Keep doctests fast: a handful of moves only
//! while game.state() == GameState::Ongoing && moves < 8 {
//!     let dir = search.best_move(game.board());
//!     assert!(game.play(dir, &mut rng));
//!     moves += 1;
//! }
//! assert!(moves > 0);
//! ```
//!
//! Note: callers must check [`engine::Board::state`] before asking for a move;
//! on a lost board the search falls back to [`engine::Move::Up`].
//!
pub mod engine;
pub mod search;
pub mod serialization;
