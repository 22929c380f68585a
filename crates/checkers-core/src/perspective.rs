//! Coordinate spaces and the viewer-perspective transform.
//!
//! The server speaks in *absolute* coordinates (white-origin frame). The
//! client renders in *local* coordinates, rotated 180° for the black player.
//! [`Position`] carries its space as a type parameter so the two frames can
//! never be compared or sent without going through [`to_local`] /
//! [`to_absolute`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::protocol::Color;

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 8;

/// Marker for the server's canonical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Absolute {}

/// Marker for the frame rendered to the current viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Local {}

/// A square on the board, tagged with the coordinate space it lives in.
///
/// The trait impls are written out so they hold for every space marker
/// without requiring anything of `S`.
pub struct Position<S> {
    row: u8,
    col: u8,
    space: PhantomData<S>,
}

impl<S> Clone for Position<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Position<S> {}

impl<S> PartialEq for Position<S> {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col
    }
}

impl<S> Eq for Position<S> {}

impl<S> Hash for Position<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.row, self.col).hash(state);
    }
}

impl<S> fmt::Debug for Position<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("row", &self.row)
            .field("col", &self.col)
            .finish()
    }
}

impl<S> Position<S> {
    /// Build a position, or `None` if either coordinate is off the board.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self {
                row,
                col,
                space: PhantomData,
            })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Iterate every square in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).map(move |col| Self {
                row,
                col,
                space: PhantomData,
            })
        })
    }

    fn reframe<T>(self, viewer: Color) -> Position<T> {
        let (row, col) = orient(self.row, self.col, viewer);
        Position {
            row,
            col,
            space: PhantomData,
        }
    }
}

impl<S> fmt::Display for Position<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The one shared transform between frames.
///
/// Identity for white; a 180° rotation for black. It is an involution, so
/// it serves both directions.
pub fn orient(row: u8, col: u8, viewer: Color) -> (u8, u8) {
    let last = BOARD_SIZE - 1;
    match viewer {
        Color::White => (row, col),
        Color::Black => (last - row, last - col),
    }
}

/// Map a server position into the viewer's rendered frame.
pub fn to_local(pos: Position<Absolute>, viewer: Color) -> Position<Local> {
    pos.reframe(viewer)
}

/// Map a rendered (clicked) position back into the server's frame.
pub fn to_absolute(pos: Position<Local>, viewer: Color) -> Position<Absolute> {
    pos.reframe(viewer)
}
