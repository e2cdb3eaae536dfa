use serde::{Deserialize, Serialize};

use crate::TileSpec;

/// Per-session state of one tile, owned by the match engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRuntimeState {
    pub spec: TileSpec,
    pub matched: bool,
}

impl TileRuntimeState {
    pub const fn new(spec: TileSpec) -> Self {
        Self {
            spec,
            matched: false,
        }
    }
}

/// What a host should show for a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileVisual {
    FaceDown,
    FaceUp,
    Matched,
}

impl TileVisual {
    /// Whether the tile's value is visible to the player
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::FaceUp | Self::Matched)
    }
}

impl Default for TileVisual {
    fn default() -> Self {
        Self::FaceDown
    }
}
