use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Player hit points ran out.
    SystemIntegrityCritical,
    /// Board locked up with no energy left to purge.
    MemoryOverflow,
}

impl GameOverReason {
    pub const fn message(self) -> &'static str {
        match self {
            Self::SystemIntegrityCritical => "SYSTEM INTEGRITY CRITICAL",
            Self::MemoryOverflow => "MEMORY OVERFLOW",
        }
    }
}

impl core::fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Summary of an accepted or rejected move.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub moved: bool,
    pub merged: bool,
    /// Damage dealt to the enemy, always zero in classic mode.
    pub damage: u32,
    pub energy_gained: u32,
    pub score_gained: u64,
    pub level_complete: bool,
}

impl MoveResult {
    pub const fn has_update(self) -> bool {
        self.moved
    }
}

/// Notifications for the presentation layer, in the order things happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    Reset {
        mode: Mode,
    },
    Tile(TileEvent),
    MoveResolved(MoveResult),
    EnemyHit {
        damage: u32,
        enemy_hp: u32,
    },
    EnemyCharging {
        moves_until_attack: u32,
    },
    PlayerHit {
        damage: u32,
        player_hp: u32,
    },
    LevelComplete {
        level: u32,
        healed: u32,
    },
    LevelStarted {
        level: u32,
        enemy_name: String,
        max_enemy_hp: u32,
    },
    TargetingEntered,
    TargetingExited,
    Undone,
    GameOver {
        reason: GameOverReason,
    },
}
