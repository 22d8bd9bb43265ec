use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Single coordinate axis used for board columns and rows.
pub type Coord = u8;

/// Two-dimensional coordinates `(x, y)`, `x` being the column.
pub type Coord2 = (Coord, Coord);

/// Row-major linear position of a cell, `y * SIZE + x`.
pub type CellIndex = u8;

/// Width and height of the board.
pub const SIZE: Coord = 4;

/// Number of cells on the board.
pub const CELL_COUNT: usize = (SIZE as usize) * (SIZE as usize);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    /// Boards are stored row-major, so the row comes first.
    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

pub trait CellIndexExt {
    fn cell_index(self) -> CellIndex;
}

impl CellIndexExt for Coord2 {
    fn cell_index(self) -> CellIndex {
        self.1 * SIZE + self.0
    }
}

/// Converts a linear index back into coordinates, `None` when off the board.
pub const fn coords_of(index: CellIndex) -> Option<Coord2> {
    if (index as usize) < CELL_COUNT {
        Some((index % SIZE, index / SIZE))
    } else {
        None
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains on the board.
pub(crate) fn apply_delta(coords: Coord2, delta: (i8, i8)) -> Option<Coord2> {
    let (x, y) = coords;
    let (dx, dy) = delta;

    let next_x = x.checked_add_signed(dx)?;
    if next_x >= SIZE {
        return None;
    }

    let next_y = y.checked_add_signed(dy)?;
    if next_y >= SIZE {
        return None;
    }

    Some((next_x, next_y))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit step of a tile travelling in this direction.
    pub const fn vector(self) -> (i8, i8) {
        use Direction::*;
        match self {
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Accepts both plain names and browser key names (`ArrowLeft`).
impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("Arrow").unwrap_or(s);
        match name {
            "Up" | "up" => Ok(Self::Up),
            "Down" | "down" => Ok(Self::Down),
            "Left" | "left" => Ok(Self::Left),
            "Right" | "right" => Ok(Self::Right),
            _ => Err(GameError::InvalidDirection),
        }
    }
}

/// Traversal order along one axis: farthest cells in the direction of travel come first.
pub(crate) fn traversal(step: i8) -> impl Iterator<Item = Coord> {
    let reverse = step > 0;
    (0..SIZE).map(move |i| if reverse { SIZE - 1 - i } else { i })
}
