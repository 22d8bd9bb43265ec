use serde::{Deserialize, Serialize};

use crate::CellIndex;

/// Unique per session, never reused.
pub type TileId = u32;

/// Tile face value, always a power of two of at least 2.
pub type TileValue = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: TileValue,
    /// Produced by a merge during the last move.
    pub just_merged: bool,
    /// Spawned after the last move.
    pub is_new: bool,
}

impl Tile {
    pub const fn new(id: TileId, value: TileValue) -> Self {
        Self {
            id,
            value,
            just_merged: false,
            is_new: false,
        }
    }

    pub const fn is_valid_value(value: TileValue) -> bool {
        value >= 2 && value.is_power_of_two()
    }

    /// Energy earned by creating this tile through a merge.
    pub const fn merge_energy(&self) -> u32 {
        let bits = self.value.ilog2();
        if bits > 2 { bits } else { 2 }
    }

    pub(crate) fn clear_transient(&mut self) {
        self.just_merged = false;
        self.is_new = false;
    }
}

/// Lifecycle of a single tile, enough for the presentation layer to animate the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TileEvent {
    Spawned {
        id: TileId,
        index: CellIndex,
        value: TileValue,
    },
    Moved {
        id: TileId,
        from: CellIndex,
        to: CellIndex,
    },
    Merged {
        id: TileId,
        index: CellIndex,
        value: TileValue,
        sources: [TileId; 2],
    },
    Removed {
        id: TileId,
        index: CellIndex,
    },
}
