//! Board codec.
//!
//! The server sends the board as a 64-token string, one glyph per square,
//! in row-major absolute order. Glyphs are emoji and may span several code
//! points, so decoding splits on extended grapheme clusters rather than
//! bytes or chars.

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::perspective::{Absolute, BOARD_SIZE, Local, Position, orient};
use crate::protocol::Color;

/// Number of squares on the board.
pub const CELL_COUNT: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

/// Emoji presentation selector some encoders append to the piece glyphs.
const PRESENTATION_SELECTOR: char = '\u{FE0F}';

/// Errors raised while decoding a board string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBoard {
    #[error("board has {0} cells, expected 64")]
    WrongLength(usize),

    #[error("unrecognized cell token {token:?} at index {index}")]
    UnknownToken { index: usize, token: String },
}

/// Contents of a single square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    WhiteMan,
    WhiteKing,
    BlackMan,
    BlackKing,
}

impl Cell {
    pub const ALL: [Cell; 5] = [
        Cell::Empty,
        Cell::WhiteMan,
        Cell::WhiteKing,
        Cell::BlackMan,
        Cell::BlackKing,
    ];

    /// Wire glyph for this cell.
    pub fn glyph(self) -> &'static str {
        match self {
            Cell::Empty => "🟦",
            Cell::WhiteMan => "⚪",
            Cell::WhiteKing => "⬜",
            Cell::BlackMan => "⚫",
            Cell::BlackKing => "⬛",
        }
    }

    /// Recognize a single grapheme. A trailing presentation selector is
    /// part of the same grapheme and does not change the cell.
    pub fn from_token(token: &str) -> Option<Self> {
        let bare = token.strip_suffix(PRESENTATION_SELECTOR).unwrap_or(token);
        Self::ALL.into_iter().find(|cell| cell.glyph() == bare)
    }

    /// Owner of the piece on this square, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::WhiteMan | Cell::WhiteKing => Some(Color::White),
            Cell::BlackMan | Cell::BlackKing => Some(Color::Black),
            Cell::Empty => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// A full 8×8 grid in one coordinate space.
///
/// Boards are only ever built whole (decode or reframe), never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<S> {
    cells: [[Cell; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    space: PhantomData<S>,
}

impl<S> Board<S> {
    /// A board with every square empty.
    pub fn empty() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_SIZE as usize]; BOARD_SIZE as usize],
            space: PhantomData,
        }
    }

    pub fn get(&self, pos: Position<S>) -> Cell {
        self.cells[pos.row() as usize][pos.col() as usize]
    }

    /// Rows in order, each a slice of eight cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.iter().map(|row| row.as_slice())
    }

    /// Number of pieces (men and kings) owned by `color`.
    pub fn count(&self, color: Color) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.color() == Some(color))
            .count()
    }

    fn reframe<T>(&self, viewer: Color) -> Board<T> {
        let mut out = Board::<T>::empty();
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let (r, c) = orient(row as u8, col as u8, viewer);
                out.cells[r as usize][c as usize] = *cell;
            }
        }
        out
    }
}

impl<S> Default for Board<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board<Absolute> {
    /// Decode the 64-token wire string into an absolute board.
    ///
    /// Tokens fill the grid left to right, top to bottom. The input must
    /// contain exactly [`CELL_COUNT`] recognized graphemes.
    pub fn decode(text: &str) -> Result<Self, MalformedBoard> {
        let tokens: Vec<&str> = text.graphemes(true).collect();
        if tokens.len() != CELL_COUNT {
            return Err(MalformedBoard::WrongLength(tokens.len()));
        }

        let mut board = Self::empty();
        for (index, token) in tokens.into_iter().enumerate() {
            let cell = Cell::from_token(token).ok_or_else(|| MalformedBoard::UnknownToken {
                index,
                token: token.to_string(),
            })?;
            let size = BOARD_SIZE as usize;
            board.cells[index / size][index % size] = cell;
        }
        Ok(board)
    }

    /// Render this board as the viewer sees it.
    pub fn to_local(&self, viewer: Color) -> Board<Local> {
        self.reframe(viewer)
    }
}

impl Board<Local> {
    /// Map a rendered board back into the server's frame.
    pub fn to_absolute(&self, viewer: Color) -> Board<Absolute> {
        self.reframe(viewer)
    }
}

/// Encodes the board as its 64-token wire string (no separators).
impl<S> fmt::Display for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in self.cells.iter().flatten() {
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(cells: &[(usize, Cell)]) -> String {
        let mut tokens = vec![Cell::Empty.glyph(); CELL_COUNT];
        for (index, cell) in cells {
            tokens[*index] = cell.glyph();
        }
        tokens.concat()
    }

    fn abs(row: u8, col: u8) -> Position<Absolute> {
        Position::new(row, col).unwrap()
    }

    fn local(row: u8, col: u8) -> Position<Local> {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn decodes_row_major() {
        let text = wire(&[(0, Cell::WhiteMan), (9, Cell::BlackKing), (63, Cell::WhiteKing)]);
        let board = Board::decode(&text).unwrap();
        assert_eq!(board.get(abs(0, 0)), Cell::WhiteMan);
        assert_eq!(board.get(abs(1, 1)), Cell::BlackKing);
        assert_eq!(board.get(abs(7, 7)), Cell::WhiteKing);
        assert_eq!(board.get(abs(3, 4)), Cell::Empty);
    }

    #[test]
    fn decodes_graphemes_not_code_units() {
        // Every glyph is multi-byte and 🟦 is outside the BMP.
        let text = wire(&[(5, Cell::BlackMan)]);
        assert!(text.len() > CELL_COUNT);
        assert!(text.encode_utf16().count() > CELL_COUNT);

        let board = Board::decode(&text).unwrap();
        assert_eq!(board.rows().flatten().count(), CELL_COUNT);
        assert_eq!(board.get(abs(0, 5)), Cell::BlackMan);
        assert_eq!(board.count(Color::Black), 1);
        assert_eq!(board.to_string(), text);
    }

    #[test]
    fn presentation_selector_is_same_cell() {
        let mut text = String::from("⚪\u{FE0F}");
        text.push_str(&Cell::Empty.glyph().repeat(CELL_COUNT - 1));
        let board = Board::decode(&text).unwrap();
        assert_eq!(board.get(abs(0, 0)), Cell::WhiteMan);
    }

    #[test]
    fn wrong_length_is_malformed() {
        let short = Cell::Empty.glyph().repeat(63);
        assert_eq!(Board::decode(&short), Err(MalformedBoard::WrongLength(63)));

        let long = Cell::Empty.glyph().repeat(65);
        assert_eq!(Board::decode(&long), Err(MalformedBoard::WrongLength(65)));

        assert_eq!(Board::decode(""), Err(MalformedBoard::WrongLength(0)));
    }

    #[test]
    fn unknown_token_is_malformed() {
        let mut text = Cell::Empty.glyph().repeat(10);
        text.push('x');
        text.push_str(&Cell::Empty.glyph().repeat(53));
        assert_eq!(
            Board::decode(&text),
            Err(MalformedBoard::UnknownToken {
                index: 10,
                token: "x".to_string()
            })
        );
    }

    #[test]
    fn black_view_reverses_flat_sequence() {
        let text = wire(&[(0, Cell::WhiteMan), (1, Cell::BlackMan), (62, Cell::BlackKing)]);
        let board = Board::decode(&text).unwrap();
        let flipped = board.to_local(Color::Black);

        assert_eq!(flipped.get(local(7, 7)), Cell::WhiteMan);
        assert_eq!(flipped.get(local(7, 6)), Cell::BlackMan);
        assert_eq!(flipped.get(local(0, 1)), Cell::BlackKing);

        let reversed: String = text.graphemes(true).rev().collect();
        assert_eq!(flipped.to_string(), reversed);
    }

    #[test]
    fn flipping_twice_restores_board() {
        let text = wire(&[(3, Cell::WhiteKing), (40, Cell::BlackMan), (17, Cell::WhiteMan)]);
        let board = Board::decode(&text).unwrap();
        assert_eq!(board.to_local(Color::Black).to_absolute(Color::Black), board);
        assert_eq!(board.to_local(Color::White).to_string(), board.to_string());
    }

    #[test]
    fn cell_colors() {
        assert_eq!(Cell::WhiteKing.color(), Some(Color::White));
        assert_eq!(Cell::BlackMan.color(), Some(Color::Black));
        assert_eq!(Cell::Empty.color(), None);
    }
}
