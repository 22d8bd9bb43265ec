use serde::{Deserialize, Serialize};

use crate::*;

/// Enemy HP growth per level, kept as an exact fraction so levels stay reproducible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u32,
    pub denominator: u32,
}

impl Ratio {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

/// Tunable constants of a session.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub undo_cost: u32,
    pub purge_cost: u32,
    pub max_energy: u32,
    pub history_capacity: usize,
    /// Chance that a spawned tile is a 4 instead of a 2.
    pub four_probability: f64,
    pub base_player_hp: u32,
    pub base_enemy_hp: u32,
    pub enemy_hp_scale: Ratio,
    /// The enemy strikes back once every this many accepted moves.
    pub enemy_attack_rate: u32,
    pub enemy_damage: u32,
    pub enemy_damage_per_level: u32,
    pub level_heal_percent: u32,
    /// Tiles up to this value are wiped when a level is cleared.
    pub level_clear_max_value: TileValue,
}

impl Rules {
    pub const STANDARD: Self = Self {
        undo_cost: 20,
        purge_cost: 50,
        max_energy: 100,
        history_capacity: 10,
        four_probability: 0.1,
        base_player_hp: 100,
        base_enemy_hp: 128,
        enemy_hp_scale: Ratio::new(3, 2),
        enemy_attack_rate: 10,
        enemy_damage: 15,
        enemy_damage_per_level: 2,
        level_heal_percent: 30,
        level_clear_max_value: 4,
    };

    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Could not parse rules: {}", err);
            GameError::InvalidRules("malformed json")
        })?;
        rules.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if self.max_energy == 0 {
            return Err(GameError::InvalidRules("max_energy must be positive"));
        }
        if self.history_capacity < 2 {
            return Err(GameError::InvalidRules("history_capacity must be at least 2"));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(GameError::InvalidRules("four_probability must be within 0..=1"));
        }
        if self.base_player_hp == 0 || self.base_enemy_hp == 0 {
            return Err(GameError::InvalidRules("hit points must be positive"));
        }
        let Ratio {
            numerator,
            denominator,
        } = self.enemy_hp_scale;
        if denominator == 0 || numerator < denominator {
            return Err(GameError::InvalidRules("enemy_hp_scale must be at least 1"));
        }
        if self.enemy_attack_rate == 0 {
            return Err(GameError::InvalidRules("enemy_attack_rate must be positive"));
        }
        if self.level_heal_percent > 100 {
            return Err(GameError::InvalidRules("level_heal_percent must be at most 100"));
        }
        Ok(self)
    }

    /// `floor(base_enemy_hp * scale^(level - 1))`, saturating at `u32::MAX`.
    pub fn enemy_max_hp(&self, level: u32) -> u32 {
        let cap = u128::from(u32::MAX);
        let scale_num = u128::from(self.enemy_hp_scale.numerator);
        let scale_den = u128::from(self.enemy_hp_scale.denominator.max(1));

        let mut num = u128::from(self.base_enemy_hp);
        let mut den = 1u128;
        for _ in 1..level {
            if num / den > cap {
                break;
            }
            // both sides are huge by now, dropping low bits keeps the ratio
            if num.checked_mul(scale_num).is_none() || den.checked_mul(scale_den).is_none() {
                num >>= 32;
                den = (den >> 32).max(1);
            }
            num = num.saturating_mul(scale_num);
            den = den.saturating_mul(scale_den);
        }
        u32::try_from(num / den).unwrap_or(u32::MAX)
    }

    /// Counterattack strength at `level`.
    pub const fn enemy_attack_damage(&self, level: u32) -> u32 {
        self.enemy_damage
            .saturating_add(level.saturating_mul(self.enemy_damage_per_level))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemy_hp_scales_by_half_per_level() {
        let rules = Rules::STANDARD;
        assert_eq!(rules.enemy_max_hp(1), 128);
        assert_eq!(rules.enemy_max_hp(2), 192);
        assert_eq!(rules.enemy_max_hp(3), 288);
        assert_eq!(rules.enemy_max_hp(4), 432);
        assert_eq!(rules.enemy_max_hp(5), 648);
        // 128 * 1.5^5 = 972
        assert_eq!(rules.enemy_max_hp(6), 972);
        // 128 * 1.5^6 = 1458
        assert_eq!(rules.enemy_max_hp(7), 1458);
        // 128 * 1.5^7 = 2187
        assert_eq!(rules.enemy_max_hp(8), 2187);
    }

    #[test]
    fn enemy_hp_saturates() {
        assert_eq!(Rules::STANDARD.enemy_max_hp(500), u32::MAX);
    }

    #[test]
    fn enemy_attack_grows_with_level() {
        assert_eq!(Rules::STANDARD.enemy_attack_damage(1), 17);
        assert_eq!(Rules::STANDARD.enemy_attack_damage(3), 21);
    }

    #[test]
    fn loads_partial_json_over_defaults() {
        let rules = Rules::from_json(r#"{ "undo_cost": 10, "enemy_attack_rate": 5 }"#).unwrap();
        assert_eq!(rules.undo_cost, 10);
        assert_eq!(rules.enemy_attack_rate, 5);
        assert_eq!(rules.purge_cost, 50);
        assert_eq!(rules.enemy_hp_scale, Ratio::new(3, 2));
    }

    #[test]
    fn rejects_bad_rules() {
        assert_eq!(
            Rules::from_json("{ not json"),
            Err(GameError::InvalidRules("malformed json"))
        );
        assert!(Rules::from_json(r#"{ "four_probability": 1.5 }"#).is_err());
        assert!(Rules::from_json(r#"{ "enemy_hp_scale": { "numerator": 1, "denominator": 2 } }"#).is_err());
        assert!(Rules::from_json(r#"{ "history_capacity": 1 }"#).is_err());
    }
}
