#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use document::*;
pub use engine::*;
pub use error::*;
pub use leaderboard::*;
pub use results::*;
pub use scoring::*;
pub use session::*;
pub use storage::*;
pub use tile::*;
pub use types::*;
pub use validator::*;

mod document;
mod engine;
mod error;
mod leaderboard;
mod results;
mod scoring;
mod session;
mod storage;
mod tile;
mod types;
mod validator;

/// Grid definition that passed [`validate`]: a full rectangle of uniquely placed tiles whose
/// values all come in pairs.
///
/// Serializes as its tile list; deserializing runs [`validate`] and fails with the first violation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TileSpec>", into = "Vec<TileSpec>")]
pub struct ValidGrid {
    tiles: Vec<TileSpec>,
    bounds: GridBounds,
    layout: Array2<TileId>,
}

impl ValidGrid {
    /// Callers guarantee the tiles cover `bounds` exactly once.
    pub(crate) fn new_unchecked(tiles: Vec<TileSpec>, bounds: GridBounds) -> Self {
        let shape = (bounds.row_span() as usize, bounds.col_span() as usize);
        let mut layout = Array2::from_elem(shape, TileId::new(0));
        for (index, tile) in tiles.iter().enumerate() {
            if let Some(offset) = bounds.offset_of(tile.position()) {
                layout[offset] = TileId::new(index);
            }
        }
        Self {
            tiles,
            bounds,
            layout,
        }
    }

    pub fn tiles(&self) -> &[TileSpec] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&TileSpec> {
        self.tiles.get(id.index())
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of matches needed to clear the grid.
    pub fn pair_count(&self) -> usize {
        self.tiles.len() / 2
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// `(rows, cols)` of the rectangle.
    pub fn dimensions(&self) -> (usize, usize) {
        self.layout.dim()
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<TileId> {
        self.bounds
            .offset_of(coords)
            .map(|offset| self.layout[offset])
    }

    pub fn locate(&self, (row, col): Coord2) -> Result<TileId> {
        self.tile_at((row, col))
            .ok_or(GameError::NoTileAt { row, col })
    }

    pub fn validate_id(&self, id: TileId) -> Result<TileId> {
        if id.index() < self.tiles.len() {
            Ok(id)
        } else {
            Err(GameError::UnknownTile)
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> + use<> {
        (0..self.tiles.len()).map(TileId::new)
    }

    /// Tile ids of one layout row, left to right.
    ///
    /// Panics if `row` is not below the first of [`Self::dimensions`].
    pub fn row_ids(&self, row: usize) -> impl Iterator<Item = TileId> + '_ {
        self.layout.row(row).into_iter().copied()
    }
}

impl TryFrom<Vec<TileSpec>> for ValidGrid {
    type Error = ConfigError;

    fn try_from(tiles: Vec<TileSpec>) -> core::result::Result<Self, Self::Error> {
        validate(&tiles).map_err(|errors| {
            errors
                .into_iter()
                .next()
                .unwrap_or(ConfigError::EmptyConfig)
        })
    }
}

impl From<ValidGrid> for Vec<TileSpec> {
    fn from(grid: ValidGrid) -> Self {
        grid.tiles
    }
}

impl Index<TileId> for ValidGrid {
    type Output = TileSpec;

    fn index(&self, id: TileId) -> &Self::Output {
        &self.tiles[id.index()]
    }
}

/// Why a selection was ignored. Rejections never change engine state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// A pair is being resolved or the post-resolution cooldown is running
    Busy,
    AlreadyMatched,
    AlreadySelected,
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Rejected(Rejection),
    /// First tile of a pair is face up
    Selected,
    /// Second tile is face up, resolution is scheduled
    PairPending,
}

impl SelectOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::Rejected(_) => false,
            Self::Selected => true,
            Self::PairPending => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ValidGrid {
        validate(&[
            TileSpec::new(1, 1, 1),
            TileSpec::new(1, 2, 1),
            TileSpec::new(2, 2, 2),
            TileSpec::new(2, 1, 2),
        ])
        .unwrap()
    }

    #[test]
    fn layout_maps_positions_to_file_order_ids() {
        let grid = grid();

        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid.tile_at((1, 1)), Some(TileId::new(0)));
        assert_eq!(grid.tile_at((2, 1)), Some(TileId::new(3)));
        assert_eq!(grid.tile_at((3, 1)), None);
        assert_eq!(grid[TileId::new(2)], TileSpec::new(2, 2, 2));
    }

    #[test]
    fn deserializing_revalidates_the_tiles() {
        let text = serde_json::to_string(&grid()).unwrap();

        assert_eq!(serde_json::from_str::<ValidGrid>(&text).unwrap(), grid());

        let odd = r#"[
            {"row": 1, "col": 1, "value": 1},
            {"row": 1, "col": 2, "value": 1},
            {"row": 2, "col": 1, "value": 2}
        ]"#;
        assert!(serde_json::from_str::<ValidGrid>(odd).is_err());
        assert!(serde_json::from_str::<ValidGrid>("[]").is_err());
    }

    #[test]
    fn row_ids_follow_columns() {
        let grid = grid();
        let second_row: Vec<_> = grid.row_ids(1).collect();

        assert_eq!(second_row, [TileId::new(3), TileId::new(2)]);
    }

    #[test]
    fn unknown_ids_and_positions_are_errors() {
        let grid = grid();

        assert_eq!(grid.validate_id(TileId::new(4)), Err(GameError::UnknownTile));
        assert_eq!(
            grid.locate((0, 0)),
            Err(GameError::NoTileAt { row: 0, col: 0 })
        );
        assert_eq!(grid.pair_count(), 2);
    }
}
