use alloc::string::String;
use thiserror::Error;

use crate::{Axis, Coord, TileValue};

/// A structural rule broken by a grid definition.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Grid definition contains no tiles")]
    EmptyConfig,
    #[error("Grid {dimension} span {span} is outside the allowed range (2-8)")]
    GridSizeOutOfRange { dimension: Axis, span: i64 },
    #[error("Tile at R={row}, C={col} has value {value}, outside the allowed range (0-9)")]
    ValueOutOfRange {
        row: Coord,
        col: Coord,
        value: TileValue,
    },
    #[error("Value {value} appears {count} times, leaving a tile without a pair")]
    UnpairedValue { value: TileValue, count: usize },
    #[error("Missing tile at R={row}, C={col} leaves a gap in the grid")]
    GridGap { row: Coord, col: Coord },
    #[error("More than one tile at R={row}, C={col}")]
    DuplicatePosition { row: Coord, col: Coord },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Tile id is not part of this grid")]
    UnknownTile,
    #[error("No tile at R={row}, C={col}")]
    NoTileAt { row: Coord, col: Coord },
}

pub type Result<T> = core::result::Result<T, GameError>;

/// A JSON document that does not follow its schema. `path` points at the offending value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Malformed JSON: {0}")]
    Syntax(String),
    #[error("Could not encode document: {0}")]
    Encode(String),
    #[error("Missing field `{path}`")]
    MissingField { path: String },
    #[error("Field `{path}` should be {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
    #[error("Field `{path}` is out of range")]
    OutOfRange { path: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Could not read `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("Could not write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
}
