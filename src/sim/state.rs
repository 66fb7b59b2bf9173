//! Game state and level lifecycle
//!
//! Everything a tick reads or writes lives here, including the single RNG
//! stream. Iteration order is by die id and buffer index, so the same seed
//! and inputs always replay the same run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::buffers::RockBufferManager;
use super::context::SimContext;
use super::die::{Die, DieMode};
use super::kinetics::KineticSimulator;
use super::rock::Rock;
use super::scoring::ScoringFsm;
use crate::consts::*;
use crate::dice::{DieId, DieModel};
use crate::error::{InvariantViolation, SettingsError, SimError};
use crate::hand::{HandRank, HandResult};
use crate::settings::Settings;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Dice at rest, waiting for the first throw
    #[default]
    Idle,
    /// Dice in flight
    Rolling,
    /// Dice at rest, player building a hand
    Selecting,
    /// Scoring FSM is playing the hand out
    Scoring,
    /// Rock counter reached zero
    LevelWon,
    /// Out of hands with rocks left
    LevelLost,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::LevelWon | GamePhase::LevelLost)
    }
}

/// Per-level counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelState {
    /// Goes negative when the last hand overshoots
    pub rocks_remaining: i32,
    pub rolls_remaining: u32,
    pub hands_remaining: u32,
    /// Rank of the hand currently held
    pub best_hand: HandRank,
    /// Sum of `score_hand` over every hand played this level
    pub points: u64,
    /// Rocks spawned for this level
    pub rock_count: usize,
}

impl LevelState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rocks_remaining: settings.rocks_to_clear,
            rolls_remaining: settings.max_rolls,
            hands_remaining: settings.max_hands,
            best_hand: HandRank::NoHand,
            points: 0,
            rock_count: 0,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(super) ctx: SimContext,
    pub phase: GamePhase,
    /// Player dice, sorted by id
    pub dice: Vec<Die>,
    pub rocks: RockBufferManager,
    pub level: LevelState,
    pub scoring: ScoringFsm,
    /// Held dice, in the order they were picked
    pub hand: Vec<DieId>,
    /// Last evaluated hand, if any dice are held
    pub hand_result: Option<HandResult>,
    /// Level number, from 1
    pub level_index: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub rng: Pcg32,
    pub(super) kinetics: KineticSimulator,
    /// Cursor seen on the previous tick, for drag throws
    pub(super) last_cursor: Option<Vec2>,
    /// Unsimulated wall-clock time for the fixed-step driver
    pub(super) accumulator: f32,
}

impl GameState {
    /// Build a run from settings and start its first level
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        Ok(Self::with_context(SimContext::from_settings(settings)?))
    }

    /// Build a run from an already validated context
    pub fn with_context(ctx: SimContext) -> Self {
        let settings = ctx.settings();
        let rng = Pcg32::seed_from_u64(settings.seed);
        let dice = settings
            .palette
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                Die::new(
                    i as DieId,
                    color,
                    DieModel::standard(settings.faces_per_die),
                    Vec2::ZERO,
                )
            })
            .collect();
        let capacity = settings.rock_total_score as usize;
        let rocks = RockBufferManager::new(&ctx.base_colors, capacity);
        let level = LevelState::new(settings);

        let mut state = Self {
            ctx,
            phase: GamePhase::Idle,
            dice,
            rocks,
            level,
            scoring: ScoringFsm::default(),
            hand: Vec::new(),
            hand_result: None,
            level_index: 0,
            time_ticks: 0,
            rng,
            kinetics: KineticSimulator::new(),
            last_cursor: None,
            accumulator: 0.0,
        };
        state.new_level();
        state
    }

    pub fn ctx(&self) -> &SimContext {
        &self.ctx
    }

    /// Reset counters, dice and rocks for the next level
    pub fn new_level(&mut self) {
        self.level_index += 1;
        self.level = LevelState::new(self.ctx.settings());
        self.scoring = ScoringFsm::default();
        self.hand.clear();
        self.hand_result = None;
        self.last_cursor = None;
        self.line_up_dice();
        self.spawn_rocks();
        self.phase = GamePhase::Idle;
        log::info!(
            "Level {} started: {} rocks, {} to clear",
            self.level_index,
            self.level.rock_count,
            self.level.rocks_remaining
        );
    }

    /// Park every die at rest in a centered row of the roll zone
    fn line_up_dice(&mut self) {
        let size = self.ctx.die_size();
        let zone = self.ctx.roll_zone;
        let spacing = size * 1.5;
        let count = self.dice.len() as f32;
        let left = zone.center().x - (count * spacing - (spacing - size)) * 0.5;
        for (i, die) in self.dice.iter_mut().enumerate() {
            die.pos = Vec2::new(left + i as f32 * spacing, zone.center().y - size * 0.5);
            zone.clamp_box(&mut die.pos, size);
            die.fixed = die.pos;
            die.vel = Vec2::ZERO;
            die.height = 0.0;
            die.height_vel = 0.0;
            die.mode = DieMode::Rolling;
        }
    }

    /// Spawn random rocks until their tiers add up to the configured total,
    /// dealt round-robin across the base piles
    fn spawn_rocks(&mut self) {
        self.rocks.clear();
        let target = self.ctx.settings().rock_total_score;
        let tile = self.ctx.rock_tile_size();
        let mut score = 0;
        let mut count = 0;
        while score < target {
            let rock = Rock::random(&mut self.rng, &self.ctx.world, tile);
            score += rock.score_type().tier().value();
            self.rocks.insert_base(count, rock);
            count += 1;
        }
        self.level.rock_count = self.rocks.total_rocks();
    }

    pub fn die(&self, id: DieId) -> Option<&Die> {
        self.dice.iter().find(|d| d.id == id)
    }

    pub fn die_mut(&mut self, id: DieId) -> Option<&mut Die> {
        self.dice.iter_mut().find(|d| d.id == id)
    }

    /// Topmost die under `point`
    pub fn die_at(&self, point: Vec2) -> Option<DieId> {
        let size = self.ctx.die_size();
        self.dice
            .iter()
            .rev()
            .find(|d| d.aabb(size).contains(point))
            .map(|d| d.id)
    }

    pub fn dragged_die(&self) -> Option<DieId> {
        self.dice.iter().find(|d| d.mode == DieMode::Drag).map(|d| d.id)
    }

    pub fn dice_at_rest(&self) -> bool {
        self.dice
            .iter()
            .filter(|d| d.mode == DieMode::Rolling)
            .all(|d| !d.is_moving())
    }

    /// Re-rank the held dice
    pub(super) fn evaluate_hand(&mut self) -> Result<(), SimError> {
        if self.hand.is_empty() {
            self.hand_result = None;
            self.level.best_hand = HandRank::NoHand;
            return Ok(());
        }
        let held: Vec<&Die> = self.hand.iter().filter_map(|&id| self.die(id)).collect();
        let result = self.ctx.evaluator.evaluate(&held)?;
        self.level.best_hand = result.rank;
        self.hand_result = Some(result);
        Ok(())
    }

    /// Check the invariants the simulation relies on
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let total = self.rocks.total_rocks();
        if total != self.level.rock_count {
            violations.push(InvariantViolation::new(format!(
                "rock count {total} != spawned {}",
                self.level.rock_count
            )));
        }

        for (family, buffer) in self.rocks.buffers() {
            if buffer.transition_ticks == 0 && buffer.source_color != buffer.target_color {
                violations.push(InvariantViolation::new(format!(
                    "{family:?} buffer finished blending but source != target"
                )));
            }
            for rock in &buffer.rocks {
                let (sx, sy) = rock.slope();
                if sx.abs() > MAX_SLOPE || sy.abs() > MAX_SLOPE {
                    violations.push(InvariantViolation::new(format!(
                        "rock slope ({sx}, {sy}) out of range"
                    )));
                }
            }
        }

        let dragging = self.dice.iter().filter(|d| d.mode == DieMode::Drag).count();
        if dragging > 1 {
            violations.push(InvariantViolation::new(format!("{dragging} dice dragged at once")));
        }

        for held in self.rocks.held_buffers() {
            if !self.hand.contains(&held.die) {
                violations.push(InvariantViolation::new(format!(
                    "die {} holds rocks outside the hand",
                    held.die
                )));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::RainbowColor;

    fn small_settings() -> Settings {
        Settings {
            rock_total_score: 300,
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(small_settings()).expect("valid");
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.dice.len(), 7);
        assert!(state.level.rock_count > 0);
        assert_eq!(state.rocks.total_rocks(), state.level.rock_count);
        assert!(state.check_invariants().is_empty());
    }

    #[test]
    fn test_spawn_reaches_score_total() {
        let state = GameState::new(small_settings()).expect("valid");
        let score: u32 = state
            .rocks
            .buffers()
            .flat_map(|(_, b)| b.rocks.iter())
            .map(|r| r.score_type().tier().value())
            .sum();
        assert!(score >= 300);
        assert!(score < 300 + 10);
    }

    #[test]
    fn test_dice_start_in_roll_zone_without_overlap() {
        let state = GameState::new(small_settings()).expect("valid");
        let size = state.ctx().die_size();
        for (i, a) in state.dice.iter().enumerate() {
            assert!(state.ctx().roll_zone.contains(a.pos));
            for b in &state.dice[i + 1..] {
                assert!(a.aabb(size).overlap(&b.aabb(size)).is_none());
            }
        }
    }

    #[test]
    fn test_die_ids_follow_palette_order() {
        let mut palette = RainbowColor::ALL.to_vec();
        palette.reverse();
        let state = GameState::new(Settings {
            palette: palette.clone(),
            ..small_settings()
        })
        .expect("valid");
        for (i, die) in state.dice.iter().enumerate() {
            assert_eq!(die.id as usize, i);
            assert_eq!(die.color, palette[i]);
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = GameState::new(small_settings()).expect("valid");
        let b = GameState::new(small_settings()).expect("valid");
        assert_eq!(a.rocks.base_buffers(), b.rocks.base_buffers());

        let c = GameState::new(Settings {
            seed: 99,
            ..small_settings()
        })
        .expect("valid");
        assert_ne!(a.rocks.base_buffers(), c.rocks.base_buffers());
    }

    #[test]
    fn test_die_at_cursor() {
        let state = GameState::new(small_settings()).expect("valid");
        let die = &state.dice[3];
        let inside = die.pos + Vec2::splat(4.0);
        assert_eq!(state.die_at(inside), Some(3));
        assert_eq!(state.die_at(Vec2::new(-10.0, -10.0)), None);
    }

    #[test]
    fn test_new_level_resets() {
        let mut state = GameState::new(small_settings()).expect("valid");
        state.level.rocks_remaining = -3;
        state.level.points = 40;
        state.new_level();
        assert_eq!(state.level_index, 2);
        assert_eq!(state.level.rocks_remaining, 60);
        assert_eq!(state.level.points, 0);
        assert!(state.check_invariants().is_empty());
    }
}
