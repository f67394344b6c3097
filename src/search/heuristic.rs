use std::sync::OnceLock;

use crate::engine::{self as GameEngine, Board, GameState};

use super::LOST_SCORE;

/// Snake path toward the bottom-left corner.
const WEIGHTS: [[f64; 4]; 4] = [
    [0.0, 1.0, 2.0, 3.0],
    [7.0, 6.0, 5.0, 4.0],
    [8.0, 9.0, 10.0, 11.0],
    [15.0, 14.0, 13.0, 12.0],
];
const SMOOTHNESS_WEIGHT: f64 = 15.0;
const EMPTY_WEIGHT: f64 = 10.0;

struct Tables {
    /// Placement, horizontal smoothness and empties for a row at each height.
    rows: [Box<[f64]>; 4],
    /// Vertical smoothness, indexed by a transposed row (i.e. a column).
    cols: Box<[f64]>,
}

static HEURISTIC_TABLES: OnceLock<Tables> = OnceLock::new();

pub(crate) fn warm() {
    let _ = tables();
}

fn tables() -> &'static Tables {
    HEURISTIC_TABLES.get_or_init(|| {
        let build = |f: &dyn Fn(u16) -> f64| -> Box<[f64]> { (0..=u16::MAX).map(f).collect() };
        Tables {
            rows: [0, 1, 2, 3].map(|row| build(&|line| calc_row_score(row, line))),
            cols: build(&|line| -SMOOTHNESS_WEIGHT * calc_roughness(line)),
        }
    })
}

/// Corner-weighted score of a board; higher is better for the mover.
///
/// `placement - 15 * roughness + 10 * empties`, where placement sums
/// `log2(tile) * weight` over the snake weights and roughness sums
/// `|log2(a) - log2(b)|` over occupied right/below neighbours. A lost
/// board short-circuits to [`LOST_SCORE`].
///
/// ```
/// use solver_2048::engine::Board;
/// use solver_2048::search::heuristic_score;
/// let b = Board::from_grid([[0; 4], [0; 4], [0; 4], [2, 0, 0, 0]]).unwrap();
/// assert_eq!(heuristic_score(b), 15.0 + 150.0);
/// ```
pub fn heuristic_score(board: Board) -> f64 {
    if board.state() == GameState::Lost {
        return LOST_SCORE;
    }
    let t = tables();
    let transpose_board = GameEngine::transpose(board.raw());
    (0..4).fold(0.0, |score, line_idx| {
        let row_val = GameEngine::extract_line(board.raw(), line_idx) as usize;
        let col_val = GameEngine::extract_line(transpose_board, line_idx) as usize;
        score + t.rows[line_idx][row_val] + t.cols[col_val]
    })
}

fn calc_row_score(row: usize, line: u16) -> f64 {
    let tiles = GameEngine::line_exponents(line);
    let placement: f64 = tiles
        .iter()
        .zip(WEIGHTS[row].iter())
        .map(|(&exp, &weight)| exp as f64 * weight)
        .sum();
    let empties = tiles.iter().filter(|&&exp| exp == 0).count() as f64;
    placement - SMOOTHNESS_WEIGHT * calc_roughness(line) + EMPTY_WEIGHT * empties
}

/// Sum of exponent gaps between occupied neighbours along a line.
fn calc_roughness(line: u16) -> f64 {
    let tiles = GameEngine::line_exponents(line);
    tiles
        .windows(2)
        .filter(|pair| pair[0] != 0 && pair[1] != 0)
        .map(|pair| pair[0].abs_diff(pair[1]) as f64)
        .sum()
}
