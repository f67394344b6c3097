//! Serialization surfaces for exchanging boards with other programs.
//!
//! A board travels as `{"grid": [[...], [...], [...], [...]]}`: four rows,
//! top row first, each tile 0 or a power of two. The same document is the
//! save-file format. Single-evaluation answers are [`EvalResponse`] or, when
//! decoding fails, [`ErrorResponse`].

mod json;

pub use json::{
    GridDoc,
    EvalResponse,
    ErrorResponse,
    SerializationError,
    decode_board,
    encode_board,
    save_game,
    load_game,
};
