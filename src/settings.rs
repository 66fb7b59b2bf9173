//! Startup configuration
//!
//! Read once (JSON, every field optional) and frozen into a `SimContext`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dice::RainbowColor;
use crate::error::SettingsError;
use crate::hand::{HandRules, StraightLengths};

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for the single RNG stream
    pub seed: u64,

    // === Dice ===
    /// Player dice; must equal the palette length
    pub num_player_dice: usize,
    /// Rainbow slot of each player die, in die-id order
    pub palette: Vec<RainbowColor>,
    pub faces_per_die: u8,
    /// Die side length in world units
    pub die_size: f32,
    /// Fraction of the remaining distance a scoring die covers per tick
    pub die_move_factor: f32,
    /// Throw speed range, world units per tick
    pub roll_speed_min: f32,
    pub roll_speed_max: f32,

    // === Level ===
    pub max_rolls: u32,
    pub max_hands: u32,
    /// Starting value of the level's rocks-to-clear counter
    pub rocks_to_clear: i32,
    /// Ticks the scoring FSM pauses after each die lands
    pub scoring_delay: u32,

    // === Rocks ===
    /// Summed score tiers of all rocks spawned for a level
    pub rock_total_score: u32,
    pub rock_tile_size: f32,
    /// Ticks a rock pile takes to blend between colors
    pub color_transition_frames: u32,
    /// Resting rock colors (linear RGB), one base buffer each
    pub base_colors: Vec<[f32; 3]>,

    // === World ===
    pub world_bounds_x: f32,
    pub world_bounds_y: f32,
    /// Height of the score zone strip along the bottom edge
    pub score_zone_height: f32,

    // === Hands ===
    pub snake_eyes_target: u8,
    pub seven_sevens_target: u8,
    pub straight_lengths: StraightLengths,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED_D1CE,

            num_player_dice: 7,
            palette: RainbowColor::ALL.to_vec(),
            faces_per_die: 6,
            die_size: 32.0,
            die_move_factor: 0.2,
            roll_speed_min: 6.0,
            roll_speed_max: 12.0,

            max_rolls: 3,
            max_hands: 4,
            rocks_to_clear: 60,
            scoring_delay: 15,

            rock_total_score: 2000,
            rock_tile_size: 8.0,
            color_transition_frames: 30,
            base_colors: vec![
                [0.45, 0.40, 0.36],
                [0.55, 0.50, 0.44],
                [0.36, 0.33, 0.31],
                [0.62, 0.57, 0.49],
            ],

            world_bounds_x: 640.0,
            world_bounds_y: 480.0,
            score_zone_height: 64.0,

            snake_eyes_target: 1,
            seven_sevens_target: 7,
            straight_lengths: StraightLengths::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rule constants for the hand evaluator
    pub fn hand_rules(&self) -> HandRules {
        HandRules {
            snake_eyes_target: self.snake_eyes_target,
            seven_sevens_target: self.seven_sevens_target,
            straight_lengths: self.straight_lengths,
        }
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: String| Err(SettingsError::Invalid(msg));

        if self.num_player_dice == 0 || self.num_player_dice > RainbowColor::ALL.len() {
            return invalid(format!(
                "num_player_dice must be 1..={}, got {}",
                RainbowColor::ALL.len(),
                self.num_player_dice
            ));
        }
        if self.num_player_dice != self.palette.len() {
            return invalid(format!(
                "num_player_dice ({}) must equal palette length ({})",
                self.num_player_dice,
                self.palette.len()
            ));
        }
        for (i, color) in self.palette.iter().enumerate() {
            if self.palette[..i].contains(color) {
                return invalid(format!("palette repeats {}", color.name()));
            }
        }
        if !(1..=9).contains(&self.faces_per_die) {
            return invalid(format!("faces_per_die must be 1..=9, got {}", self.faces_per_die));
        }
        if self.base_colors.is_empty() {
            return invalid("base_colors must not be empty".to_string());
        }
        if self.color_transition_frames == 0 {
            return invalid("color_transition_frames must be positive".to_string());
        }
        if self.rock_tile_size <= 0.0 || self.die_size <= 0.0 {
            return invalid("rock_tile_size and die_size must be positive".to_string());
        }
        if !(self.die_move_factor > 0.0 && self.die_move_factor <= 1.0) {
            return invalid(format!("die_move_factor must be in (0, 1], got {}", self.die_move_factor));
        }
        if self.roll_speed_min < 0.0 || self.roll_speed_min > self.roll_speed_max {
            return invalid("roll speed range is empty".to_string());
        }
        let min_height = self.score_zone_height + self.die_size * 2.0;
        if self.world_bounds_x < self.die_size * 2.0 || self.world_bounds_y < min_height {
            return invalid(format!(
                "world {}x{} too small for dice and score zone",
                self.world_bounds_x, self.world_bounds_y
            ));
        }
        if self.score_zone_height < self.die_size {
            return invalid("score_zone_height must fit a die".to_string());
        }
        let s = &self.straight_lengths;
        if !(s.small >= 2 && s.small < s.large && s.large < s.larger && s.larger < s.largest) {
            return invalid(format!("straight lengths must increase, got {s:?}"));
        }
        Ok(())
    }
}
