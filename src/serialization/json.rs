use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::engine::{Board, BoardError, Game, Move};
use crate::search::{heuristic_score, MovePolicy};

/// Wire and save-file form of a board: `{"grid": [[..4], ..4]}`, top row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDoc {
    pub grid: [[u32; 4]; 4],
}

impl From<Board> for GridDoc {
    fn from(board: Board) -> Self {
        GridDoc { grid: board.to_grid() }
    }
}

impl TryFrom<GridDoc> for Board {
    type Error = BoardError;

    fn try_from(doc: GridDoc) -> Result<Self, Self::Error> {
        Board::from_grid(doc.grid)
    }
}

/// Answer to a single-evaluation request.
///
/// `heuristic_score` is the score of the board that was sent in, not of the
/// board after `best_move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResponse {
    pub best_move: Move,
    pub direction: u8,
    pub heuristic_score: f64,
    pub duration: String,
}

impl EvalResponse {
    pub fn new(best_move: Move, heuristic_score: f64, elapsed: Duration) -> Self {
        EvalResponse {
            best_move,
            direction: best_move.index(),
            heuristic_score,
            duration: format!("{elapsed:?}"),
        }
    }

    /// Run `policy` on `board` and time it.
    pub fn evaluate(board: Board, policy: &mut dyn MovePolicy) -> Self {
        let start = Instant::now();
        let best_move = policy.best_move(board);
        let score = heuristic_score(board);
        Self::new(best_move, score, start.elapsed())
    }
}

/// Error document printed instead of an [`EvalResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),
}

/// Decode a `{"grid": ...}` document, validating every tile.
///
/// ```
/// use solver_2048::serialization::decode_board;
/// let b = decode_board(r#"{"grid":[[0,0,2,0],[0,0,0,0],[0,4,0,0],[0,0,0,0]]}"#).unwrap();
/// assert_eq!(b.tile(2, 0), 2);
/// assert!(decode_board(r#"{"grid":[[0,0,3,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]}"#).is_err());
/// ```
pub fn decode_board(json: &str) -> Result<Board, SerializationError> {
    let doc: GridDoc = serde_json::from_str(json)?;
    Ok(Board::try_from(doc)?)
}

/// Encode a board as a compact `{"grid": ...}` document.
pub fn encode_board(board: Board) -> Result<String, SerializationError> {
    Ok(serde_json::to_string(&GridDoc::from(board))?)
}

/// Write the game's board as pretty-printed JSON.
pub fn save_game<P: AsRef<Path>>(path: P, game: &Game) -> Result<(), SerializationError> {
    let data = serde_json::to_string_pretty(&GridDoc::from(game.board()))?;
    fs::write(path, data)?;
    Ok(())
}

/// Read a game written by [`save_game`].
pub fn load_game<P: AsRef<Path>>(path: P) -> Result<Game, SerializationError> {
    let data = fs::read_to_string(path)?;
    Ok(Game::from_board(decode_board(&data)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Search, SearchConfig, LOST_SCORE};
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{"grid":[[0,0,2,0],[0,0,0,0],[0,4,0,0],[2048,0,0,8]]}"#;

    #[test]
    fn decode_reads_rows_top_first() {
        let b = decode_board(SAMPLE).unwrap();
        assert_eq!(b.tile(2, 0), 2);
        assert_eq!(b.tile(1, 2), 4);
        assert_eq!(b.tile(0, 3), 2048);
        assert_eq!(b.tile(3, 3), 8);
        assert_eq!(b.tile_count(), 4);
    }

    #[test]
    fn encode_reproduces_input() {
        let b = decode_board(SAMPLE).unwrap();
        assert_eq!(encode_board(b).unwrap(), SAMPLE);
    }

    #[test]
    fn decode_errors() {
        let wrong_shape = r#"{"grid":[[0,0,2],[0,0,0,0],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(decode_board(wrong_shape), Err(SerializationError::Json(_))));
        let negative = r#"{"grid":[[0,0,-2,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(decode_board(negative), Err(SerializationError::Json(_))));
        assert!(matches!(decode_board("not json"), Err(SerializationError::Json(_))));
        assert!(matches!(decode_board(r#"{"board":[]}"#), Err(SerializationError::Json(_))));
        let bad_tile = r#"{"grid":[[0,0,6,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(
            decode_board(bad_tile),
            Err(SerializationError::Board(BoardError::InvalidTile { row: 0, col: 2, value: 6 }))
        ));
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut rng = StdRng::seed_from_u64(8);
        let game = Game::new(&mut rng);
        let tmp = NamedTempFile::new().unwrap();
        save_game(tmp.path(), &game).unwrap();
        let text = fs::read_to_string(tmp.path()).unwrap();
        assert!(text.contains("\"grid\""));
        let loaded = load_game(tmp.path()).unwrap();
        assert_eq!(loaded, game);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_game(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SerializationError::Io(_)));
    }

    #[test]
    fn response_field_names() {
        let resp = EvalResponse::new(Move::Left, 12.5, Duration::from_millis(3));
        let value: serde_json::Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["best_move"], "LEFT");
        assert_eq!(value["direction"], 2);
        assert_eq!(value["heuristic_score"], 12.5);
        assert_eq!(value["duration"], "3ms");

        let err = serde_json::to_string(&ErrorResponse { error: "bad".into() }).unwrap();
        assert_eq!(err, r#"{"error":"bad"}"#);
    }

    #[test]
    fn evaluate_scores_the_input_board() {
        let board = decode_board(r#"{"grid":[[2,4,2,4],[4,2,4,2],[2,4,2,4],[4,2,4,2]]}"#).unwrap();
        let mut search = Search::seeded(SearchConfig { depth: 2 }, 0);
        let resp = EvalResponse::evaluate(board, &mut search);
        assert_eq!(resp.best_move, Move::Up);
        assert_eq!(resp.direction, 0);
        assert_eq!(resp.heuristic_score, LOST_SCORE);

        let board = decode_board(SAMPLE).unwrap();
        let resp = EvalResponse::evaluate(board, &mut search);
        assert_eq!(resp.heuristic_score, heuristic_score(board));
        assert_eq!(resp.direction, resp.best_move.index());
        assert!(board.can_shift(resp.best_move));
    }
}
