//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by die id, then buffer index)
//! - No rendering or platform dependencies

pub mod buffers;
pub mod context;
pub mod die;
pub mod kinetics;
pub mod rect;
pub mod rock;
pub mod scoring;
pub mod state;
pub mod tick;

pub use buffers::{BufferFamily, HeldBuffer, RockBuffer, RockBufferManager, RockRef};
pub use context::SimContext;
pub use die::{Die, DieMode, collide_dice};
pub use kinetics::{CollisionStats, KineticSimulator};
pub use rect::{Rect, WallHit};
pub use rock::{Rock, RockScoreType, ScoreTier, slope_from_sprite, sprite_from_slope};
pub use scoring::{ScoringEvent, ScoringFsm, ScoringState};
pub use state::{GamePhase, GameState, LevelState};
pub use tick::{InputEvent, TickInput, advance, tick};
