use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A direction to move/merge tiles.
///
/// Declaration order is the canonical order: the search iterates
/// `Up, Down, Left, Right` and the earliest direction wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All directions in canonical order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Position in canonical order (`Up = 0` .. `Right = 3`).
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Move::index`].
    pub fn from_index(idx: u8) -> Option<Move> {
        Move::ALL.get(idx as usize).copied()
    }

    /// Upper-case name as used on the wire (`"UP"`, `"DOWN"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a board. Derived from the tiles alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Ongoing,
    Won,
    Lost,
}

/// Smallest tile value that counts as a win.
pub const WIN_TILE: u32 = 2048;
/// Largest tile a `Board` can hold (exponent 15 in a nibble).
pub const MAX_TILE: u32 = 1 << MAX_EXPONENT;

const WIN_EXPONENT: u64 = 11;
const MAX_EXPONENT: u64 = 15;
const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

type BoardRaw = u64;
type Line = u16;

/// Rejected tile value while building a board from plain values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("tile {value} at row {row}, column {col} is not 0 or a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("tile {value} at row {row}, column {col} exceeds the largest supported tile 32768")]
    TooLarge { row: usize, col: usize, value: u32 },
}

struct Stores {
    shift_left: Box<[Line]>,
    shift_right: Box<[Line]>,
}

static STORES: OnceLock<Stores> = OnceLock::new();

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`.
///
/// Row-major, top-left tile in the most significant nibble. A nibble holds
/// `log2(value)`, 0 meaning empty. The board is `Copy`, so every simulated
/// branch works on its own value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self {
        Board(raw)
    }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw {
        self.0
    }

    /// Build a board from tile values, `grid[y][x]`, top row first.
    ///
    /// ```
    /// use solver_2048::engine::Board;
    /// let b = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap();
    /// assert_eq!(b.tile(3, 3), 4);
    /// assert!(Board::from_grid([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_grid(grid: [[u32; 4]; 4]) -> Result<Self, BoardError> {
        let mut raw = 0;
        for (row, line) in grid.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                let exp = value_to_exponent(value).ok_or(if value > MAX_TILE && value.is_power_of_two() {
                    BoardError::TooLarge { row, col, value }
                } else {
                    BoardError::InvalidTile { row, col, value }
                })?;
                raw |= exp << (60 - 4 * (row * 4 + col));
            }
        }
        Ok(Board(raw))
    }

    /// Tile values as `grid[y][x]`, top row first.
    pub fn to_grid(self) -> [[u32; 4]; 4] {
        let mut grid = [[0; 4]; 4];
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.tile(x, y);
            }
        }
        grid
    }

    /// Tile value at column `x`, row `y` (0 if empty).
    #[inline]
    pub fn tile(self, x: usize, y: usize) -> u32 {
        exponent_to_value(self.exponent(y * 4 + x))
    }

    #[inline]
    fn exponent(self, idx: usize) -> u64 {
        (self.0 >> (60 - 4 * idx)) & 0xf
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// If nothing can move the same board comes back.
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        let s = stores();
        match dir {
            Move::Left => Board(shift_rows(self.0, &s.shift_left)),
            Move::Right => Board(shift_rows(self.0, &s.shift_right)),
            Move::Up => Board(transpose(shift_rows(transpose(self.0), &s.shift_left))),
            Move::Down => Board(transpose(shift_rows(transpose(self.0), &s.shift_right))),
        }
    }

    /// Shift in place. Returns false, leaving the board untouched, when `dir` is not legal.
    pub fn apply(&mut self, dir: Move) -> bool {
        if !self.can_shift(dir) {
            return false;
        }
        let moved = self.shift(dir);
        let changed = moved != *self;
        *self = moved;
        changed
    }

    /// Cheap legality probe: some tile has an empty or equal neighbour in the direction of travel.
    pub fn can_shift(self, dir: Move) -> bool {
        let (dx, dy): (isize, isize) = match dir {
            Move::Up => (0, -1),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
        };
        for y in 0..4isize {
            for x in 0..4isize {
                let tile = self.exponent((y * 4 + x) as usize);
                let (nx, ny) = (x + dx, y + dy);
                if tile == 0 || !(0..4).contains(&nx) || !(0..4).contains(&ny) {
                    continue;
                }
                let next = self.exponent((ny * 4 + nx) as usize);
                if next == 0 || (next == tile && tile < MAX_EXPONENT) {
                    return true;
                }
            }
        }
        false
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board comes back unchanged.
    ///
    /// ```
    /// use solver_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let mut index = rng.gen_range(0..empty);
        let mut tmp = self.0;
        let mut tile = generate_random_tile(rng);
        loop {
            while (tmp & 0xf) != 0 {
                tmp >>= 4;
                tile <<= 4;
            }
            if index == 0 {
                break;
            }
            index -= 1;
            tmp >>= 4;
            tile <<= 4;
        }
        Board(self.0 | tile)
    }

    /// In-place form of [`Board::with_random_tile`].
    #[inline]
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = self.with_random_tile(rng);
    }

    /// Won if any tile reaches 2048, else Lost if no direction is legal, else Ongoing.
    pub fn state(self) -> GameState {
        if (0..16).any(|idx| self.exponent(idx) >= WIN_EXPONENT) {
            return GameState::Won;
        }
        if Move::ALL.iter().any(|&dir| self.can_shift(dir)) {
            GameState::Ongoing
        } else {
            GameState::Lost
        }
    }

    /// Sum of all tile values. Shifting preserves it; spawning adds 2 or 4.
    pub fn sum(self) -> u64 {
        (0..16).map(|idx| exponent_to_value(self.exponent(idx)) as u64).sum()
    }

    /// Return the highest tile value present on the board (0 when empty).
    pub fn highest_tile(self) -> u32 {
        exponent_to_value((0..16).map(|idx| self.exponent(idx)).max().unwrap_or(0))
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u64 {
        16 - count_non_empty(self.0)
    }

    /// Count the number of occupied cells on the board.
    #[inline]
    pub fn tile_count(self) -> u64 {
        count_non_empty(self.0)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_grid() {
            for val in row {
                if val == 0 {
                    write!(f, "| {:>5} ", ".")?;
                } else {
                    write!(f, "| {:>5} ", val)?;
                }
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

/// One game in progress: a single board driven by shift-then-spawn.
///
/// Nothing stops further moves once the game is won or lost; callers check
/// [`Game::state`] after every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Game {
    board: Board,
}

impl Game {
    /// Fresh game: empty board plus two random tiles.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Game { board: Board::EMPTY.with_random_tile(rng).with_random_tile(rng) }
    }

    /// Resume from a previously persisted board, verbatim.
    pub fn from_board(board: Board) -> Self {
        Game { board }
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.board.state()
    }

    /// Shift, then spawn one tile if the shift changed the board.
    pub fn play<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> bool {
        let moved = self.board.apply(dir);
        if moved {
            self.board.spawn(rng);
        }
        moved
    }

    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> u32 {
        self.board.tile(x, y)
    }

    #[inline]
    pub fn tile_count(&self) -> u64 {
        self.board.tile_count()
    }
}

impl From<Board> for Game {
    fn from(board: Board) -> Self {
        Game::from_board(board)
    }
}

/// Initialize the line tables on first use. Safe to call multiple times.
pub fn new() {
    let _ = stores();
}

/// Slide one line toward index 0.
///
/// Non-zero tiles are compressed, each adjacent equal pair merges once
/// (the doubled tile is never merged again in the same call), and the
/// result is compressed again. `changed` is true iff the line differs.
///
/// ```
/// use solver_2048::engine::shift_line;
/// assert_eq!(shift_line([2, 0, 2, 2]), ([4, 2, 0, 0], true));
/// assert_eq!(shift_line([2, 4, 8, 16]), ([2, 4, 8, 16], false));
/// ```
pub fn shift_line(line: [u32; 4]) -> ([u32; 4], bool) {
    let mut next = compress(line);
    let mut i = 0;
    while i < 3 {
        if next[i] != 0 && next[i] == next[i + 1] && next[i] < MAX_TILE {
            next[i] *= 2;
            next[i + 1] = 0;
            i += 2;
        } else {
            i += 1;
        }
    }
    let out = compress(next);
    (out, out != line)
}

fn compress(line: [u32; 4]) -> [u32; 4] {
    let mut out = [0; 4];
    for (slot, &tile) in out.iter_mut().zip(line.iter().filter(|&&t| t != 0)) {
        *slot = tile;
    }
    out
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

#[inline]
pub(crate) fn extract_line(board: BoardRaw, line_idx: usize) -> Line {
    ((board >> ((3 - line_idx) * 16)) & 0xffff) as Line
}

/// Exponents of a packed line, first tile first.
#[inline]
pub(crate) fn line_exponents(line: Line) -> [u64; 4] {
    [0, 1, 2, 3].map(|i| ((line >> ((3 - i) * 4)) & 0xf) as u64)
}

#[inline]
fn stores() -> &'static Stores {
    STORES.get_or_init(create_stores)
}

fn create_stores() -> Stores {
    // Allocate on the heap to avoid large stack frames
    let mut shift_left = vec![0 as Line; LINE_TABLE_SIZE];
    let mut shift_right = vec![0 as Line; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let tiles = line_exponents(val as Line).map(exponent_to_value);
        shift_left[val] = pack_line(shift_line(tiles).0);

        let mut reversed = tiles;
        reversed.reverse();
        let (mut shifted, _) = shift_line(reversed);
        shifted.reverse();
        shift_right[val] = pack_line(shifted);
    }

    Stores {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
    }
}

fn pack_line(tiles: [u32; 4]) -> Line {
    tiles.iter().fold(0, |acc, &v| (acc << 4) | value_to_exponent(v).unwrap_or(0) as Line)
}

fn shift_rows(board: BoardRaw, table: &[Line]) -> BoardRaw {
    (0..4).fold(0, |new_board, row_idx| {
        let row_val = extract_line(board, row_idx);
        let new_row_val = table[row_val as usize] as BoardRaw;
        new_board | (new_row_val << (48 - (16 * row_idx)))
    })
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> BoardRaw {
    if rng.gen_range(0..10) < 9 {
        1
    } else {
        2
    }
}

#[inline]
fn exponent_to_value(exp: u64) -> u32 {
    if exp == 0 {
        0
    } else {
        1 << exp
    }
}

#[inline]
fn value_to_exponent(value: u32) -> Option<u64> {
    match value {
        0 => Some(0),
        v if v >= 2 && v <= MAX_TILE && v.is_power_of_two() => Some(v.trailing_zeros() as u64),
        _ => None,
    }
}

// https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
fn count_non_empty(board: BoardRaw) -> u64 {
    let mut board_copy = board;
    board_copy |= board_copy >> 1;
    board_copy |= board_copy >> 2;
    board_copy &= 0x1111111111111111;
    board_copy.count_ones() as u64
}
