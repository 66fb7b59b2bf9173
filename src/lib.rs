//! Rock Dice - gameplay simulation core
//!
//! Core modules:
//! - `dice`: Die faces, pips and the rainbow palette
//! - `hand`: Hand ranking, contributing-dice selection and scoring
//! - `sim`: Deterministic simulation (dice, rocks, buffers, scoring FSM)
//! - `renderer`: Per-frame instance data handed to the GPU pipeline
//! - `settings`: Startup configuration

pub mod dice;
pub mod error;
pub mod hand;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{HandError, InvariantViolation, SettingsError, SimError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz logical rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Largest per-tick rock displacement, in slope units
    pub const MAX_SLOPE: i8 = 4;
    pub const MIN_SLOPE: i8 = -MAX_SLOPE;
    /// Sprite slopes live in [0, DIRECTIONS_TO_SNAP)
    pub const DIRECTIONS_TO_SNAP: u8 = 2 * MAX_SLOPE as u8;
    /// Pre-rendered rotation frames per rock sprite
    pub const ROTATION_FRAMES: u8 = 16;
    /// Collision jitter range, applied as [-ROCK_JITTER, +ROCK_JITTER]
    pub const ROCK_JITTER: i8 = 1;
    /// World units a rock travels per tick for each unit of slope
    pub const ROCK_BASE_VELOCITY: f32 = 0.5;
    /// Sprite-slope cadence before the speed discount
    pub const TRANSITION_BASE_TICKS: u32 = 14;
    /// Slowest sprite-slope cadence allowed
    pub const TRANSITION_MIN_TICKS: u32 = 2;

    /// Broad-phase radii as a fraction of the precise Manhattan envelope
    pub const CURSOR_CHECK_FACTOR: f32 = 0.6;
    pub const DIE_CHECK_FACTOR: f32 = 0.8;

    /// Rolling dice lose 5% of their speed each tick
    pub const DIE_DRAG: f32 = 0.95;
    /// Below this speed (per axis) a rolling die snaps to rest
    pub const DIE_REST_EPSILON: f32 = 0.05;
    /// Scoring dice count as arrived when both axis distances are below this
    pub const DIE_ARRIVAL_EPSILON: f32 = 0.01;
    /// Die-die bounce: random damping range and inversion factor
    pub const DIE_BOUNCE_DAMPING_MIN: f32 = 0.2;
    pub const DIE_BOUNCE_DAMPING_MAX: f32 = 1.2;
    pub const DIE_BOUNCE_INVERT: f32 = -1.1;
    /// Constant separation impulse so overlapping dice cannot lock
    pub const DIE_SEPARATION_IMPULSE: f32 = 0.5;
    /// Jump arc gravity applied to die height each tick
    pub const DIE_GRAVITY: f32 = 0.6;
    /// z-rotation turns gained per unit of speed
    pub const DIE_SPIN_RATE: f32 = 0.004;

    /// Forceful push kicks in when cos(angle) between rock and die direction exceeds this
    pub const FORCEFUL_PUSH_COS: f32 = std::f32::consts::FRAC_1_SQRT_2;
    /// Fraction of the penetration depth used for the forceful push
    pub const FORCEFUL_PUSH_FACTOR: f32 = 0.5;

    /// Damping runs once every (DAMPING_BASE_CYCLE - score_tier / 2) ticks
    pub const DAMPING_BASE_CYCLE: u32 = 20;
}

/// Wrap a value into [0, 1)
#[inline]
pub fn wrap_unit(value: f32) -> f32 {
    let wrapped = value.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Angle of a vector in degrees, in (-180, 180]
#[inline]
pub fn angle_degrees(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}
