use alloc::vec::Vec;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Classic,
    Roguelike,
}

impl Mode {
    pub const fn is_roguelike(self) -> bool {
        matches!(self, Self::Roguelike)
    }
}

/// Everything the presentation layer renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: Mode,
    pub grid: Grid,
    pub score: u64,
    pub energy: EnergyLedger,
    pub game_over: Option<GameOverReason>,
    /// Waiting for the player to pick a purge target.
    pub targeting: bool,
    /// Only present in roguelike mode.
    pub battle: Option<Battle>,
}

impl GameState {
    fn new(rules: &Rules, mode: Mode, rng: &mut SmallRng) -> Self {
        Self {
            mode,
            grid: Grid::new(),
            score: 0,
            energy: EnergyLedger::new(rules.max_energy),
            game_over: None,
            targeting: false,
            battle: mode.is_roguelike().then(|| Battle::new(rules, rng)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// An empty cell was picked, nothing was spent.
    Cancelled,
    Purged { index: CellIndex, tile: Tile },
}

/// A single play session: owns all state and resolves player commands one at a time.
#[derive(Clone, Debug)]
pub struct Game {
    rules: Rules,
    state: GameState,
    history: HistoryBuffer,
    rng: SmallRng,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(mode: Mode, seed: u64) -> Self {
        Self::build(Rules::STANDARD, mode, seed)
    }

    pub fn with_rules(rules: Rules, mode: Mode, seed: u64) -> Result<Self> {
        Ok(Self::build(rules.validate()?, mode, seed))
    }

    fn build(rules: Rules, mode: Mode, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        // reset builds the battle for the requested mode
        let state = GameState::new(&rules, Mode::Classic, &mut rng);
        let mut game = Self {
            rules,
            state,
            history: HistoryBuffer::new(rules.history_capacity),
            rng,
            events: Vec::new(),
        };
        game.reset(mode);
        game
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn energy(&self) -> u32 {
        self.state.energy.value()
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.state.battle.as_ref()
    }

    pub fn game_over(&self) -> Option<GameOverReason> {
        self.state.game_over
    }

    pub fn is_finished(&self) -> bool {
        self.state.game_over.is_some()
    }

    pub fn is_targeting(&self) -> bool {
        self.state.targeting
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.check_accepting_input().is_ok()
            && self.history.can_rewind()
            && self.state.energy.can_afford(self.rules.undo_cost)
    }

    pub fn can_purge(&self) -> bool {
        self.check_accepting_input().is_ok()
            && self.state.energy.can_afford(self.rules.purge_cost)
    }

    /// Hands over everything that happened since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        core::mem::take(&mut self.events)
    }

    /// Switches between classic and roguelike, which always starts over.
    pub fn set_mode(&mut self, mode: Mode) {
        self.reset(mode);
    }

    pub fn reset(&mut self, mode: Mode) {
        log::info!("New {:?} game", mode);

        self.state = GameState::new(&self.rules, mode, &mut self.rng);
        self.history.clear();
        self.events.clear();
        self.events.push(GameEvent::Reset { mode });
        if let Some(battle) = &self.state.battle {
            self.events.push(level_started(battle));
        }

        self.spawn_tile();
        self.spawn_tile();
        self.push_history();
    }

    pub fn move_tiles(&mut self, direction: Direction) -> Result<MoveResult> {
        self.check_accepting_input()?;

        let report = self.state.grid.shift(direction);
        if !report.moved {
            log::trace!("Move {:?} changes nothing", direction);
            return Ok(MoveResult::default());
        }

        self.state.score += report.score_gained;
        self.state.energy.gain(report.energy_gained);
        self.events
            .extend(report.changes.iter().copied().map(GameEvent::Tile));
        self.push_history();

        let mut result = MoveResult {
            moved: true,
            merged: report.merged,
            damage: 0,
            energy_gained: report.energy_gained,
            score_gained: report.score_gained,
            level_complete: false,
        };

        if let Some(battle) = self.state.battle.as_mut() {
            if report.merged_value > 0 {
                result.damage = report.merged_value;
                result.level_complete = battle.apply_damage(report.merged_value);
                self.events.push(GameEvent::EnemyHit {
                    damage: report.merged_value,
                    enemy_hp: battle.enemy_hp(),
                });
            }
        }

        // a kill skips the spawn and the enemy turn
        if result.level_complete {
            self.complete_level();
            self.events.push(GameEvent::MoveResolved(result));
            return Ok(result);
        }

        self.spawn_tile();

        if let Some(battle) = self.state.battle.as_mut() {
            self.events.push(match battle.on_move_accepted(&self.rules) {
                EnemyTurn::Charging { moves_until_attack } => {
                    GameEvent::EnemyCharging { moves_until_attack }
                }
                EnemyTurn::Attacked { damage, player_hp } => {
                    GameEvent::PlayerHit { damage, player_hp }
                }
            });
        }

        self.events.push(GameEvent::MoveResolved(result));
        self.check_terminal();
        Ok(result)
    }

    pub fn request_undo(&mut self) -> Result<()> {
        self.check_accepting_input()?;
        if !self.history.can_rewind() {
            return Err(GameError::NothingToUndo);
        }
        if !self.state.energy.spend(self.rules.undo_cost) {
            return Err(GameError::InsufficientEnergy);
        }
        let Some(snapshot) = self.history.rewind().cloned() else {
            return Err(GameError::NothingToUndo);
        };

        self.state.grid.restore(&snapshot.board);
        self.state.score = snapshot.score;
        self.state.energy.restore(snapshot.energy);
        if let Some(battle) = self.state.battle.as_mut() {
            battle.restore_hp(snapshot.player_hp, snapshot.enemy_hp);
        }
        log::debug!("Undo, {} entries left", self.history.len());

        self.events.push(GameEvent::Undone);
        self.check_terminal();
        Ok(())
    }

    /// Enters targeting mode, the cost is only paid once a tile is picked.
    pub fn request_purge(&mut self) -> Result<()> {
        self.check_accepting_input()?;
        if !self.state.energy.can_afford(self.rules.purge_cost) {
            return Err(GameError::InsufficientEnergy);
        }
        self.state.targeting = true;
        self.events.push(GameEvent::TargetingEntered);
        Ok(())
    }

    pub fn resolve_target(&mut self, index: CellIndex) -> Result<PurgeOutcome> {
        self.check_not_finished()?;
        if !self.state.targeting {
            return Err(GameError::NotTargeting);
        }
        let coords = coords_of(index).ok_or(GameError::InvalidCoords)?;

        if self.state.grid.tile_at(coords).is_none() {
            self.exit_targeting();
            return Ok(PurgeOutcome::Cancelled);
        }
        if !self.state.energy.spend(self.rules.purge_cost) {
            return Err(GameError::InsufficientEnergy);
        }
        let Some(tile) = self.state.grid.remove(index) else {
            return Err(GameError::InvalidCoords);
        };
        log::debug!("Purged {} at {}", tile.value, index);

        self.exit_targeting();
        self.events
            .push(GameEvent::Tile(TileEvent::Removed { id: tile.id, index }));
        self.push_history();
        Ok(PurgeOutcome::Purged { index, tile })
    }

    pub fn cancel_targeting(&mut self) -> Result<()> {
        if !self.state.targeting {
            return Err(GameError::NotTargeting);
        }
        self.exit_targeting();
        Ok(())
    }

    fn exit_targeting(&mut self) {
        self.state.targeting = false;
        self.events.push(GameEvent::TargetingExited);
    }

    fn complete_level(&mut self) {
        let Some(battle) = self.state.battle.as_mut() else {
            return;
        };
        let cleared = battle.level();
        let healed = battle.complete_level(&self.rules, &mut self.rng);
        log::info!("Level {} cleared, healed {}", cleared, healed);
        self.events.push(GameEvent::LevelComplete {
            level: cleared,
            healed,
        });

        for (index, tile) in self.state.grid.clear_up_to(self.rules.level_clear_max_value) {
            self.events
                .push(GameEvent::Tile(TileEvent::Removed { id: tile.id, index }));
        }

        if let Some(battle) = &self.state.battle {
            self.events.push(level_started(battle));
        }
        self.push_history();
    }

    fn check_terminal(&mut self) {
        let player_dead = self
            .state
            .battle
            .as_ref()
            .is_some_and(Battle::is_player_dead);

        if player_dead {
            self.end_game(GameOverReason::SystemIntegrityCritical);
        } else if !self.state.grid.moves_available()
            && !self.state.energy.can_afford(self.rules.purge_cost)
        {
            self.end_game(GameOverReason::MemoryOverflow);
        }
    }

    fn end_game(&mut self, reason: GameOverReason) {
        if self.state.game_over.is_some() {
            return;
        }
        log::info!("Game over: {} (score {})", reason, self.state.score);
        self.state.game_over = Some(reason);
        self.state.targeting = false;
        self.events.push(GameEvent::GameOver { reason });
    }

    fn spawn_tile(&mut self) {
        let spawned = self
            .state
            .grid
            .spawn_random_tile_with(&mut self.rng, self.rules.four_probability);
        if let Some((index, tile)) = spawned {
            self.events.push(GameEvent::Tile(TileEvent::Spawned {
                id: tile.id,
                index,
                value: tile.value,
            }));
        }
    }

    fn push_history(&mut self) {
        let (player_hp, enemy_hp) = self
            .state
            .battle
            .as_ref()
            .map_or((0, 0), |battle| (battle.player_hp(), battle.enemy_hp()));
        self.history.push(HistorySnapshot {
            board: self.state.grid.snapshot(),
            score: self.state.score,
            energy: self.state.energy.value(),
            player_hp,
            enemy_hp,
        });
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.game_over.is_some() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn check_accepting_input(&self) -> Result<()> {
        self.check_not_finished()?;
        if self.state.targeting {
            Err(GameError::Targeting)
        } else {
            Ok(())
        }
    }
}

fn level_started(battle: &Battle) -> GameEvent {
    GameEvent::LevelStarted {
        level: battle.level(),
        enemy_name: battle.enemy_name().into(),
        max_enemy_hp: battle.max_enemy_hp(),
    }
}
