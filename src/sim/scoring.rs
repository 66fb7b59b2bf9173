//! Scoring animation: held dice travel to the score zone one at a time

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::buffers::RockBufferManager;
use super::context::SimContext;
use super::die::{Die, DieMode};
use super::state::LevelState;
use crate::dice::DieId;
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringState {
    #[default]
    Idle,
    /// Current die is easing into its slot
    Moving,
    /// Current die landed; waiting before the next one
    Pausing { timer: u32 },
}

/// What a scoring step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringEvent {
    None,
    Landed { die: DieId, value: u8 },
    Finished,
}

/// Plays a hand out die by die
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringFsm {
    state: ScoringState,
    index: usize,
    hand: Vec<DieId>,
}

impl ScoringFsm {
    pub fn state(&self) -> ScoringState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ScoringState::Idle
    }

    /// Index of the die currently travelling or pausing
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn hand(&self) -> &[DieId] {
        &self.hand
    }

    /// Start playing `hand` (die ids in slot order). Ignored unless idle or
    /// when the hand is empty.
    pub fn begin(&mut self, hand: &[DieId]) -> bool {
        if !self.is_idle() || hand.is_empty() {
            return false;
        }
        self.hand.clear();
        self.hand.extend_from_slice(hand);
        self.index = 0;
        self.state = ScoringState::Moving;
        log::debug!("Scoring {} dice", hand.len());
        true
    }

    /// Slot for hand position `index`: a centered row along the bottom of
    /// the score zone, one die apart
    pub fn slot(ctx: &SimContext, index: usize, count: usize) -> Vec2 {
        let size = ctx.die_size();
        let left = ctx.score_zone.center().x - count as f32 * size * 0.5;
        Vec2::new(left + index as f32 * size, ctx.score_zone.max_h() - size)
    }

    /// Advance one tick
    pub fn step<R: Rng>(
        &mut self,
        dice: &mut [Die],
        level: &mut LevelState,
        manager: &mut RockBufferManager,
        ctx: &SimContext,
        rng: &mut R,
    ) -> Result<ScoringEvent, SimError> {
        match self.state {
            ScoringState::Idle => Ok(ScoringEvent::None),
            ScoringState::Pausing { timer } => {
                let timer = timer.saturating_sub(1);
                if timer == 0 {
                    self.index += 1;
                    self.state = ScoringState::Moving;
                } else {
                    self.state = ScoringState::Pausing { timer };
                }
                Ok(ScoringEvent::None)
            }
            ScoringState::Moving if self.index >= self.hand.len() => {
                self.finish(dice, manager, ctx, rng);
                Ok(ScoringEvent::Finished)
            }
            ScoringState::Moving => {
                let id = self.hand[self.index];
                let slot = Self::slot(ctx, self.index, self.hand.len());
                let die = dice
                    .iter_mut()
                    .find(|d| d.id == id)
                    .ok_or(SimError::UnknownDie(id))?;
                die.mode = DieMode::Scoring;
                die.fixed = slot;
                if !die.update_scoring(ctx.settings().die_move_factor) {
                    return Ok(ScoringEvent::None);
                }

                let value = die.value();
                level.rocks_remaining -= i32::from(value);
                self.state = ScoringState::Pausing {
                    timer: ctx.settings().scoring_delay,
                };
                log::debug!(
                    "Die {id} scored {value}; {} rocks left",
                    level.rocks_remaining
                );
                Ok(ScoringEvent::Landed { die: id, value })
            }
        }
    }

    /// Release the hand: dice go back to rolling with a fresh throw and their
    /// rocks return to the piles
    fn finish<R: Rng>(
        &mut self,
        dice: &mut [Die],
        manager: &mut RockBufferManager,
        ctx: &SimContext,
        rng: &mut R,
    ) {
        let settings = ctx.settings();
        for &id in &self.hand {
            if let Some(die) = dice.iter_mut().find(|d| d.id == id) {
                die.roll(rng, settings.roll_speed_min, settings.roll_speed_max);
            }
            manager.deselect(id, settings.color_transition_frames);
        }
        log::debug!("Scoring finished after {} dice", self.hand.len());
        self.hand.clear();
        self.index = 0;
        self.state = ScoringState::Idle;
    }
}
