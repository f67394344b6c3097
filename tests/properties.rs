//! Property-based tests for the board mechanics, the heuristic and the JSON codec.

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use solver_2048::engine::{shift_line, Board, GameState, Move};
use solver_2048::search::{heuristic_score, Search, SearchConfig, LOST_SCORE};
use solver_2048::serialization::{decode_board, encode_board};

fn to_value(exp: u8) -> u32 {
    if exp == 0 {
        0
    } else {
        1 << exp
    }
}

/// Boards with tiles up to `2^max_exp`, biased toward crowded positions.
fn board_strategy(max_exp: u8) -> impl Strategy<Value = Board> {
    prop::array::uniform16(prop_oneof![1 => Just(0u8), 3 => 1..=max_exp]).prop_map(|cells| {
        let mut grid = [[0u32; 4]; 4];
        for (i, &exp) in cells.iter().enumerate() {
            grid[i / 4][i % 4] = to_value(exp);
        }
        Board::from_grid(grid).unwrap()
    })
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop::sample::select(Move::ALL.to_vec())
}

/// Some neighbouring pair along the axis of `dir` holds equal tiles.
fn has_equal_pair_along(board: Board, dir: Move) -> bool {
    let vertical = matches!(dir, Move::Up | Move::Down);
    (0..4).any(|a| {
        (0..3).any(|b| {
            let (first, second) = if vertical {
                (board.tile(a, b), board.tile(a, b + 1))
            } else {
                (board.tile(b, a), board.tile(b + 1, a))
            };
            first != 0 && first == second
        })
    })
}

proptest! {
    // 1. Shifting conserves the sum of all tiles
    #[test]
    fn shift_conserves_sum(board in board_strategy(11), dir in move_strategy()) {
        let mut moved = board;
        moved.apply(dir);
        prop_assert_eq!(moved.sum(), board.sum());
    }

    // 2. After a shift every line is packed; a second shift only changes
    //    the board when the first one left an equal pair behind
    #[test]
    fn second_shift_only_merges(board in board_strategy(11), dir in move_strategy()) {
        let mut once = board;
        once.apply(dir);
        let mut twice = once;
        let changed = twice.apply(dir);
        prop_assert_eq!(changed, has_equal_pair_along(once, dir));
        if changed {
            prop_assert!(twice.tile_count() < once.tile_count());
        }
    }

    // 3. The legality probe agrees with actually shifting a copy
    #[test]
    fn can_shift_agrees_with_shift(board in board_strategy(15), dir in move_strategy()) {
        let mut copy = board;
        let changed = copy.apply(dir);
        prop_assert_eq!(board.can_shift(dir), changed);
        prop_assert_eq!(board.can_shift(dir), board.shift(dir) != board);
        if !changed {
            prop_assert_eq!(copy, board);
        }
    }

    // 4. A board is lost exactly when the heuristic returns the lost sentinel
    #[test]
    fn lost_iff_sentinel(board in board_strategy(11)) {
        let lost = board.state() == GameState::Lost;
        prop_assert_eq!(lost, heuristic_score(board) == LOST_SCORE);
    }

    // 5. Any board holding a 2048 is won
    #[test]
    fn win_detection(board in board_strategy(10), cell in 0usize..16) {
        let mut grid = board.to_grid();
        grid[cell / 4][cell % 4] = 2048;
        prop_assert_eq!(Board::from_grid(grid).unwrap().state(), GameState::Won);
    }

    // 6. JSON round trip is exact
    #[test]
    fn encoding_round_trip(board in board_strategy(15)) {
        let json = encode_board(board).unwrap();
        prop_assert_eq!(decode_board(&json).unwrap(), board);
    }

    // 7. Once lost, nothing moves
    #[test]
    fn lost_boards_are_stuck(board in board_strategy(11)) {
        if board.state() == GameState::Lost {
            for dir in Move::ALL {
                prop_assert!(!board.can_shift(dir));
            }
        }
    }

    // 8. A spawn fills exactly one empty cell with a 2 or a 4
    #[test]
    fn spawn_adds_one_small_tile(board in board_strategy(11), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let spawned = board.with_random_tile(&mut rng);
        if board.count_empty() == 0 {
            prop_assert_eq!(spawned, board);
        } else {
            prop_assert_eq!(spawned.tile_count(), board.tile_count() + 1);
            let added = spawned.sum() - board.sum();
            prop_assert!(added == 2 || added == 4, "added {}", added);
        }
    }

    // 9. The line primitive keeps the sum and never merges a tile twice
    #[test]
    fn shift_line_properties(cells in prop::array::uniform4(0u8..=11)) {
        let line = cells.map(to_value);
        let (out, changed) = shift_line(line);
        prop_assert_eq!(out.iter().sum::<u32>(), line.iter().sum::<u32>());
        prop_assert_eq!(changed, out != line);
        let tiles_in = line.iter().filter(|&&v| v != 0).count();
        let tiles_out = out.iter().filter(|&&v| v != 0).count();
        // At most two merges fit in four cells
        prop_assert!(tiles_in - tiles_out <= 2);
    }

    // 10. The search only ever returns a legal move for a live board
    #[test]
    fn search_picks_legal_moves(board in board_strategy(10), seed in any::<u64>()) {
        prop_assume!(board.state() == GameState::Ongoing);
        let mut search = Search::seeded(SearchConfig { depth: 2 }, seed);
        let dir = search.best_move(board);
        prop_assert!(board.can_shift(dir));
    }
}

#[test]
fn concrete_line_examples() {
    assert_eq!(shift_line([2, 2, 0, 0]), ([4, 0, 0, 0], true));
    assert_eq!(shift_line([2, 0, 2, 2]), ([4, 2, 0, 0], true));
}

#[test]
fn merge_can_leave_a_second_merge() {
    // [2,2,4,0] -> [4,4,0,0]; shifting again is not a no-op
    let mut board = Board::from_grid([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    assert!(board.apply(Move::Left));
    assert_eq!(board.to_grid()[0], [4, 4, 0, 0]);
    assert!(board.apply(Move::Left));
    assert_eq!(board.to_grid()[0], [8, 0, 0, 0]);
    assert!(!board.apply(Move::Left));
}
