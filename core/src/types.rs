use core::fmt;
use serde::{Deserialize, Serialize};

/// Row or column position as written in a grid definition. May be negative.
pub type Coord = i32;

/// Match key printed on a tile.
pub type TileValue = i32;

/// Position `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// One tile of a grid definition, in file order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSpec {
    pub row: Coord,
    pub col: Coord,
    pub value: TileValue,
}

impl TileSpec {
    pub const fn new(row: Coord, col: Coord, value: TileValue) -> Self {
        Self { row, col, value }
    }

    pub const fn position(&self) -> Coord2 {
        (self.row, self.col)
    }
}

/// Stable index of a tile inside a validated grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(usize);

impl TileId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Row => "row",
            Self::Column => "column",
        })
    }
}

/// Inclusive bounding box of a set of tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_row: Coord,
    pub max_row: Coord,
    pub min_col: Coord,
    pub max_col: Coord,
}

impl GridBounds {
    /// Returns `None` for an empty tile list.
    pub fn from_tiles(tiles: &[TileSpec]) -> Option<Self> {
        let (first, rest) = tiles.split_first()?;
        let mut bounds = Self {
            min_row: first.row,
            max_row: first.row,
            min_col: first.col,
            max_col: first.col,
        };
        for tile in rest {
            bounds.min_row = bounds.min_row.min(tile.row);
            bounds.max_row = bounds.max_row.max(tile.row);
            bounds.min_col = bounds.min_col.min(tile.col);
            bounds.max_col = bounds.max_col.max(tile.col);
        }
        Some(bounds)
    }

    pub const fn row_span(&self) -> i64 {
        self.max_row as i64 - self.min_row as i64 + 1
    }

    pub const fn col_span(&self) -> i64 {
        self.max_col as i64 - self.min_col as i64 + 1
    }

    pub const fn span(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Row => self.row_span(),
            Axis::Column => self.col_span(),
        }
    }

    pub const fn contains(&self, (row, col): Coord2) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    /// Offset of `coords` from the top-left corner, for indexing a dense layout.
    pub fn offset_of(&self, coords: Coord2) -> Option<[usize; 2]> {
        if !self.contains(coords) {
            return None;
        }
        let row = (coords.0 as i64 - self.min_row as i64).try_into().ok()?;
        let col = (coords.1 as i64 - self.min_col as i64).try_into().ok()?;
        Some([row, col])
    }

    /// Every cell of the rectangle, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Coord2> + use<> {
        let bounds = *self;
        (bounds.min_row..=bounds.max_row)
            .flat_map(move |row| (bounds.min_col..=bounds.max_col).map(move |col| (row, col)))
    }
}
