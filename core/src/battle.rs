use alloc::format;
use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::*;

const NAME_PREFIXES: [&str; 5] = ["FIREWALL", "ICE", "DAEMON", "KERBEROS", "HYDRA"];
const NAME_SUFFIXES: [&str; 5] = ["v1.0", "BETA", "PRIME", "DESTROYER", "CORE"];

/// What the enemy did after an accepted move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnemyTurn {
    /// Still winding up, strikes after this many more moves.
    Charging { moves_until_attack: u32 },
    Attacked { damage: u32, player_hp: u32 },
}

/// Enemy and player hit points for the roguelike mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    level: u32,
    player_hp: u32,
    max_player_hp: u32,
    enemy_hp: u32,
    max_enemy_hp: u32,
    moves_since_attack: u32,
    enemy_name: String,
}

impl Battle {
    pub fn new(rules: &Rules, rng: &mut SmallRng) -> Self {
        let mut battle = Self {
            level: 1,
            player_hp: rules.base_player_hp,
            max_player_hp: rules.base_player_hp,
            enemy_hp: 0,
            max_enemy_hp: 0,
            moves_since_attack: 0,
            enemy_name: String::new(),
        };
        battle.init_level(rules, 1, rng);
        battle
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub fn max_player_hp(&self) -> u32 {
        self.max_player_hp
    }

    pub fn enemy_hp(&self) -> u32 {
        self.enemy_hp
    }

    pub fn max_enemy_hp(&self) -> u32 {
        self.max_enemy_hp
    }

    pub fn moves_since_attack(&self) -> u32 {
        self.moves_since_attack
    }

    pub fn enemy_name(&self) -> &str {
        &self.enemy_name
    }

    pub fn is_enemy_defeated(&self) -> bool {
        self.enemy_hp == 0
    }

    pub fn is_player_dead(&self) -> bool {
        self.player_hp == 0
    }

    /// Spawns a fresh enemy for `level`. The attack counter carries over.
    pub fn init_level(&mut self, rules: &Rules, level: u32, rng: &mut SmallRng) {
        use rand::prelude::*;

        self.level = level.max(1);
        self.max_enemy_hp = rules.enemy_max_hp(self.level);
        self.enemy_hp = self.max_enemy_hp;

        let prefix = NAME_PREFIXES[rng.random_range(0..NAME_PREFIXES.len())];
        let suffix = NAME_SUFFIXES[rng.random_range(0..NAME_SUFFIXES.len())];
        self.enemy_name = format!("{prefix} {suffix}");

        log::debug!(
            "Level {} enemy {} with {} hp",
            self.level,
            self.enemy_name,
            self.max_enemy_hp
        );
    }

    /// Returns whether the enemy went down.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        self.enemy_hp = self.enemy_hp.saturating_sub(damage);
        self.is_enemy_defeated()
    }

    pub fn on_move_accepted(&mut self, rules: &Rules) -> EnemyTurn {
        self.moves_since_attack += 1;
        if self.moves_since_attack < rules.enemy_attack_rate {
            return EnemyTurn::Charging {
                moves_until_attack: rules.enemy_attack_rate - self.moves_since_attack,
            };
        }

        let damage = rules.enemy_attack_damage(self.level);
        self.player_hp = self.player_hp.saturating_sub(damage);
        self.moves_since_attack = 0;
        log::debug!(
            "Enemy hits for {}, player at {}/{}",
            damage,
            self.player_hp,
            self.max_player_hp
        );
        EnemyTurn::Attacked {
            damage,
            player_hp: self.player_hp,
        }
    }

    /// Advances to the next level, returns how much the player was healed.
    pub fn complete_level(&mut self, rules: &Rules, rng: &mut SmallRng) -> u32 {
        let bonus = u64::from(self.max_player_hp) * u64::from(rules.level_heal_percent) / 100;
        let bonus = u32::try_from(bonus).unwrap_or(u32::MAX);
        let healed = self.player_hp.saturating_add(bonus).min(self.max_player_hp);
        let gained = healed - self.player_hp;
        self.player_hp = healed;
        self.init_level(rules, self.level + 1, rng);
        gained
    }

    /// Puts back hit points remembered by the history buffer.
    pub fn restore_hp(&mut self, player_hp: u32, enemy_hp: u32) {
        self.player_hp = player_hp.min(self.max_player_hp);
        self.enemy_hp = enemy_hp.min(self.max_enemy_hp);
    }
}
