use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use hashbrown::HashSet;

use crate::*;

pub const MIN_GRID_SPAN: i64 = 2;
pub const MAX_GRID_SPAN: i64 = 8;
pub const MIN_TILE_VALUE: TileValue = 0;
pub const MAX_TILE_VALUE: TileValue = 9;

/// Gap reporting stops here; a legal grid can miss at most 63 cells.
pub const MAX_REPORTED_GAPS: usize = 1024;

/// Checks a grid definition against every structural rule and reports all violations.
///
/// Violations come out in a fixed order: row span, column span, out-of-range values in file
/// order, unpaired values ascending, gaps row-major, duplicate positions in file order.
///
/// Gap reports are truncated to the first [`MAX_REPORTED_GAPS`] missing cells. Only grids that
/// already break the span rule can reach that many.
pub fn validate(tiles: &[TileSpec]) -> core::result::Result<ValidGrid, Vec<ConfigError>> {
    let Some(bounds) = GridBounds::from_tiles(tiles) else {
        return Err(alloc::vec![ConfigError::EmptyConfig]);
    };

    let mut errors = Vec::new();
    check_spans(&bounds, &mut errors);
    check_values(tiles, &mut errors);
    check_pairs(tiles, &mut errors);
    let occupied = check_duplicates(tiles);
    check_gaps(&bounds, &occupied.positions, &mut errors);
    errors.extend(occupied.duplicates);

    if errors.is_empty() {
        log::debug!(
            "grid accepted: {} tiles, {}x{}",
            tiles.len(),
            bounds.row_span(),
            bounds.col_span()
        );
        Ok(ValidGrid::new_unchecked(tiles.to_vec(), bounds))
    } else {
        log::debug!("grid rejected with {} violations", errors.len());
        Err(errors)
    }
}

fn check_spans(bounds: &GridBounds, errors: &mut Vec<ConfigError>) {
    for dimension in [Axis::Row, Axis::Column] {
        let span = bounds.span(dimension);
        if !(MIN_GRID_SPAN..=MAX_GRID_SPAN).contains(&span) {
            errors.push(ConfigError::GridSizeOutOfRange { dimension, span });
        }
    }
}

fn check_values(tiles: &[TileSpec], errors: &mut Vec<ConfigError>) {
    errors.extend(
        tiles
            .iter()
            .filter(|tile| !(MIN_TILE_VALUE..=MAX_TILE_VALUE).contains(&tile.value))
            .map(|tile| ConfigError::ValueOutOfRange {
                row: tile.row,
                col: tile.col,
                value: tile.value,
            }),
    );
}

/// Parity only: four tiles of one value count as two pairs.
fn check_pairs(tiles: &[TileSpec], errors: &mut Vec<ConfigError>) {
    let mut counts: BTreeMap<TileValue, usize> = BTreeMap::new();
    for tile in tiles {
        *counts.entry(tile.value).or_default() += 1;
    }

    errors.extend(
        counts
            .into_iter()
            .filter(|&(_, count)| count % 2 != 0)
            .map(|(value, count)| ConfigError::UnpairedValue { value, count }),
    );
}

struct Occupancy {
    positions: HashSet<Coord2>,
    duplicates: Vec<ConfigError>,
}

fn check_duplicates(tiles: &[TileSpec]) -> Occupancy {
    let mut positions = HashSet::with_capacity(tiles.len());
    let mut duplicates = Vec::new();
    for tile in tiles {
        if !positions.insert(tile.position()) {
            duplicates.push(ConfigError::DuplicatePosition {
                row: tile.row,
                col: tile.col,
            });
        }
    }
    Occupancy {
        positions,
        duplicates,
    }
}

fn check_gaps(bounds: &GridBounds, occupied: &HashSet<Coord2>, errors: &mut Vec<ConfigError>) {
    let gaps = bounds
        .cells()
        .filter(|cell| !occupied.contains(cell))
        .take(MAX_REPORTED_GAPS)
        .map(|(row, col)| ConfigError::GridGap { row, col });
    errors.extend(gaps);
}
