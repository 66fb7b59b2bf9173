//! Fixed timestep simulation tick
//!
//! Order within a tick: input intents, dice physics, rock physics, color
//! transitions, scoring FSM, phase bookkeeping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::die::DieMode;
use super::scoring::ScoringEvent;
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::dice::DieId;
use crate::error::SimError;

/// The complete input vocabulary of the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputEvent {
    /// Throw every unheld die
    Roll,
    /// Button held down: grab or keep dragging the die under the cursor
    Press,
    /// Toggle hold on the die under the cursor
    Select,
    /// Play the held hand
    Score,
    /// Hold every die
    HeldAll,
    /// Release every hold and throw all dice
    RerollAll,
    #[default]
    None,
}

impl InputEvent {
    /// Intents that fire once rather than persisting while a button is down
    pub fn is_one_shot(self) -> bool {
        !matches!(self, InputEvent::Press | InputEvent::None)
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub event: InputEvent,
    /// Cursor in world coordinates, if the host has one
    pub cursor: Option<Vec2>,
}

impl TickInput {
    pub fn new(event: InputEvent, cursor: Option<Vec2>) -> Self {
        Self { event, cursor }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> Result<(), SimError> {
    state.time_ticks += 1;
    let cursor = input.cursor;

    if !state.phase.is_over() && state.scoring.is_idle() {
        update_drag(state, input);
        match input.event {
            InputEvent::Roll => roll(state),
            InputEvent::RerollAll => reroll_all(state)?,
            InputEvent::Select => {
                if let Some(id) = cursor.and_then(|c| state.die_at(c)) {
                    toggle_hold(state, id)?;
                }
            }
            InputEvent::HeldAll => hold_all(state)?,
            InputEvent::Score => score(state)?,
            InputEvent::Press | InputEvent::None => {}
        }
    }

    {
        let GameState {
            ctx,
            dice,
            rocks,
            kinetics,
            rng,
            ..
        } = &mut *state;
        kinetics.step(dice, rocks, ctx, cursor, rng);
        rocks.transition_tick();
    }

    if state.phase == GamePhase::Scoring {
        let GameState {
            ctx,
            dice,
            rocks,
            level,
            scoring,
            rng,
            ..
        } = &mut *state;
        if scoring.step(dice, level, rocks, ctx, rng)? == ScoringEvent::Finished {
            finish_hand(state)?;
        }
    }

    if state.phase == GamePhase::Rolling && state.dice_at_rest() && state.dragged_die().is_none() {
        state.phase = GamePhase::Selecting;
    }

    state.last_cursor = cursor;
    Ok(())
}

/// Run as many fixed ticks as `wall_dt` covers (at most `MAX_SUBSTEPS`).
/// One-shot intents reach the first substep only. Returns the ticks run.
pub fn advance(state: &mut GameState, input: &TickInput, wall_dt: f32) -> Result<u32, SimError> {
    state.accumulator += wall_dt.clamp(0.0, 0.1);

    let mut input = *input;
    let mut substeps = 0;
    while state.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        tick(state, &input)?;
        state.accumulator -= SIM_DT;
        substeps += 1;

        if input.event.is_one_shot() {
            input.event = InputEvent::None;
        }
    }
    Ok(substeps)
}

/// Grab a die while the button is down; throw it when released
fn update_drag(state: &mut GameState, input: &TickInput) {
    let pressed = input.event == InputEvent::Press;
    match (state.dragged_die(), pressed, input.cursor) {
        (None, true, Some(cursor)) => {
            let Some(id) = state.die_at(cursor) else {
                return;
            };
            if let Some(die) = state.die_mut(id)
                && die.mode == DieMode::Rolling
            {
                die.begin_drag(cursor);
                log::debug!("Dragging die {id}");
            }
        }
        (Some(id), false, _) => {
            let throw = match (input.cursor, state.last_cursor) {
                (Some(now), Some(before)) => now - before,
                _ => Vec2::ZERO,
            };
            if let Some(die) = state.die_mut(id) {
                die.throw(throw);
            }
            if throw != Vec2::ZERO {
                state.phase = GamePhase::Rolling;
            }
            log::debug!("Released die {id} at {throw}");
        }
        _ => {}
    }
}

fn roll(state: &mut GameState) {
    if !matches!(state.phase, GamePhase::Idle | GamePhase::Selecting) {
        return;
    }
    if state.level.rolls_remaining == 0 {
        log::debug!("Roll ignored: no rolls left");
        return;
    }
    state.level.rolls_remaining -= 1;

    let settings = state.ctx().settings();
    let (min, max) = (settings.roll_speed_min, settings.roll_speed_max);
    let GameState { dice, rng, .. } = &mut *state;
    for die in dice.iter_mut().filter(|d| d.mode == DieMode::Rolling) {
        die.roll(rng, min, max);
    }
    state.phase = GamePhase::Rolling;
    log::debug!("Rolled; {} rolls left", state.level.rolls_remaining);
}

fn reroll_all(state: &mut GameState) -> Result<(), SimError> {
    if !matches!(state.phase, GamePhase::Idle | GamePhase::Selecting) || state.level.rolls_remaining == 0 {
        return Ok(());
    }
    let frames = state.ctx().color_transition_frames();
    for id in std::mem::take(&mut state.hand) {
        state.rocks.deselect(id, frames);
        if let Some(die) = state.die_mut(id) {
            die.mode = DieMode::Rolling;
        }
    }
    state.evaluate_hand()?;
    roll(state);
    Ok(())
}

/// Hold or release one die, moving rocks with it
fn toggle_hold(state: &mut GameState, id: DieId) -> Result<(), SimError> {
    if !matches!(state.phase, GamePhase::Rolling | GamePhase::Selecting) {
        return Ok(());
    }
    let frames = state.ctx().color_transition_frames();

    if let Some(slot) = state.hand.iter().position(|&h| h == id) {
        state.hand.remove(slot);
        state.rocks.deselect(id, frames);
        if let Some(die) = state.die_mut(id) {
            die.mode = DieMode::Rolling;
        }
        log::debug!("Released die {id}");
    } else {
        hold(state, id)?;
    }
    state.evaluate_hand()
}

fn hold(state: &mut GameState, id: DieId) -> Result<(), SimError> {
    let frames = state.ctx().color_transition_frames();
    let count = state.dice.len();
    let die = state.die_mut(id).ok_or(SimError::UnknownDie(id))?;
    if die.mode != DieMode::Rolling {
        return Ok(());
    }
    die.mode = DieMode::Held;
    die.vel = Vec2::ZERO;
    let color = die.color.rgb();

    state.hand.push(id);
    let GameState { rocks, rng, .. } = &mut *state;
    let moved = rocks.select(id, color, count, frames, rng);
    log::debug!("Holding die {id} with {moved} rocks");
    Ok(())
}

fn hold_all(state: &mut GameState) -> Result<(), SimError> {
    if !matches!(state.phase, GamePhase::Rolling | GamePhase::Selecting) {
        return Ok(());
    }
    let free: Vec<DieId> = state
        .dice
        .iter()
        .filter(|d| d.mode == DieMode::Rolling)
        .map(|d| d.id)
        .collect();
    for id in free {
        hold(state, id)?;
    }
    state.evaluate_hand()
}

/// Bank the held hand and start the scoring animation
fn score(state: &mut GameState) -> Result<(), SimError> {
    if !matches!(state.phase, GamePhase::Rolling | GamePhase::Selecting)
        || state.hand.is_empty()
        || state.level.hands_remaining == 0
    {
        return Ok(());
    }
    state.evaluate_hand()?;
    let rank = state.level.best_hand;
    let held: Vec<_> = state.hand.iter().filter_map(|&id| state.die(id)).collect();
    let points = state.ctx().evaluator.score_hand(&held, rank);

    state.level.points += u64::from(points);
    state.level.hands_remaining -= 1;
    state.scoring.begin(&state.hand);
    state.phase = GamePhase::Scoring;
    log::info!("Scoring {rank} for {points} points; {} hands left", state.level.hands_remaining);
    Ok(())
}

/// Scoring animation finished: settle the level outcome
fn finish_hand(state: &mut GameState) -> Result<(), SimError> {
    state.hand.clear();
    state.evaluate_hand()?;
    state.level.rolls_remaining = state.ctx().settings().max_rolls;

    state.phase = if state.level.rocks_remaining <= 0 {
        GamePhase::LevelWon
    } else if state.level.hands_remaining == 0 {
        GamePhase::LevelLost
    } else {
        GamePhase::Rolling
    };
    if state.phase.is_over() {
        log::info!(
            "Level {} {:?} with {} points",
            state.level_index,
            state.phase,
            state.level.points
        );
    }
    Ok(())
}
