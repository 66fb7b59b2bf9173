//! Immutable simulation context
//!
//! World bounds, zones, broad-phase radii and rules are fixed at startup and
//! threaded through the simulation by reference.

use glam::Vec3;

use super::rect::Rect;
use crate::consts::{CURSOR_CHECK_FACTOR, DIE_CHECK_FACTOR};
use crate::error::SettingsError;
use crate::hand::HandEvaluator;
use crate::settings::Settings;

/// Process-wide, read-only configuration
#[derive(Debug, Clone)]
pub struct SimContext {
    settings: Settings,
    /// Everything rocks may occupy
    pub world: Rect,
    /// Where dice roll
    pub roll_zone: Rect,
    /// Where dice line up while a hand is scored
    pub score_zone: Rect,
    /// Manhattan radius for cursor broad phase
    pub cursor_check_radius: f32,
    /// Manhattan radius (center to center) for die broad phase
    pub die_check_radius: f32,
    pub base_colors: Vec<Vec3>,
    pub evaluator: HandEvaluator,
}

impl SimContext {
    pub fn from_settings(settings: Settings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let world = Rect::new(0.0, 0.0, settings.world_bounds_x, settings.world_bounds_y);
        let roll_h = settings.world_bounds_y - settings.score_zone_height;
        let roll_zone = Rect::new(0.0, 0.0, settings.world_bounds_x, roll_h);
        let score_zone = Rect::new(
            0.0,
            roll_h,
            settings.world_bounds_x,
            settings.score_zone_height,
        );

        // Radii sit below the exact Manhattan envelope of two touching boxes,
        // trading a few grazing contacts for a much smaller candidate set.
        let cursor_check_radius = CURSOR_CHECK_FACTOR * settings.rock_tile_size;
        let die_check_radius = DIE_CHECK_FACTOR * (settings.die_size + settings.rock_tile_size);

        let base_colors = settings.base_colors.iter().map(|&c| Vec3::from(c)).collect();
        let evaluator = HandEvaluator::new(settings.hand_rules());

        Ok(Self {
            settings,
            world,
            roll_zone,
            score_zone,
            cursor_check_radius,
            die_check_radius,
            base_colors,
            evaluator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn rock_tile_size(&self) -> f32 {
        self.settings.rock_tile_size
    }

    #[inline]
    pub fn die_size(&self) -> f32 {
        self.settings.die_size
    }

    #[inline]
    pub fn color_transition_frames(&self) -> u32 {
        self.settings.color_transition_frames
    }
}
