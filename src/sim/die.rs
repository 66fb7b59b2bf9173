//! Player die entity and its per-mode motion

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;
use crate::dice::{DieId, DieModel, Direction, RainbowColor};
use crate::hand::FaceValue;
use crate::wrap_unit;

/// What drives a die's motion this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DieMode {
    /// Free motion with drag, bouncing off the roll zone walls
    #[default]
    Rolling,
    /// Pinned in place, part of the hand
    Held,
    /// Following the cursor
    Drag,
    /// Easing toward its slot in the score zone
    Scoring,
}

/// A player die
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Die {
    pub id: DieId,
    pub color: RainbowColor,
    /// Top-left corner
    pub pos: Vec2,
    /// Target slot while scoring
    pub fixed: Vec2,
    pub vel: Vec2,
    /// Jump arc height above the table
    pub height: f32,
    pub height_vel: f32,
    /// Spin in turns, [0, 1)
    pub z_rotation: f32,
    pub direction: Direction,
    pub mode: DieMode,
    pub model: DieModel,
    /// Cursor minus position when a drag began
    pub drag_offset: Vec2,
    /// Touched another die this tick
    pub colliding: bool,
}

impl Die {
    pub fn new(id: DieId, color: RainbowColor, model: DieModel, pos: Vec2) -> Self {
        Self {
            id,
            color,
            pos,
            fixed: pos,
            vel: Vec2::ZERO,
            height: 0.0,
            height_vel: 0.0,
            z_rotation: 0.0,
            direction: Direction::default(),
            mode: DieMode::Rolling,
            model,
            drag_offset: Vec2::ZERO,
            colliding: false,
        }
    }

    pub fn aabb(&self, size: f32) -> Rect {
        Rect::square(self.pos, size)
    }

    pub fn center(&self, size: f32) -> Vec2 {
        self.pos + Vec2::splat(size * 0.5)
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    /// Face value currently up
    pub fn value(&self) -> u8 {
        self.model.active_face().value()
    }

    /// Throw in a random compass direction and turn up a random face
    pub fn roll<R: Rng>(&mut self, rng: &mut R, speed_min: f32, speed_max: f32) {
        self.direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        let speed = if speed_max > speed_min {
            rng.random_range(speed_min..speed_max)
        } else {
            speed_min
        };
        self.vel = self.direction.vector() * speed;
        self.height_vel = speed * 0.5;
        self.model.roll(rng);
        self.mode = DieMode::Rolling;
    }

    /// One tick of free motion inside `zone`
    pub fn update_rolling(&mut self, zone: &Rect, size: f32) {
        self.vel *= DIE_DRAG;
        self.pos += self.vel;

        let hit = zone.clamp_box(&mut self.pos, size);
        if hit.x != 0 {
            self.vel.x = -self.vel.x.abs() * hit.x as f32;
        }
        if hit.y != 0 {
            self.vel.y = -self.vel.y.abs() * hit.y as f32;
        }
        if hit.any() && self.is_moving() {
            self.direction = Direction::from_vector(self.vel);
        }

        if self.vel.x.abs() < DIE_REST_EPSILON {
            self.vel.x = 0.0;
        }
        if self.vel.y.abs() < DIE_REST_EPSILON {
            self.vel.y = 0.0;
        }

        self.z_rotation = wrap_unit(self.z_rotation + self.vel.length() * DIE_SPIN_RATE);
        self.update_height();
    }

    fn update_height(&mut self) {
        if self.height <= 0.0 && self.height_vel <= 0.0 {
            self.height = 0.0;
            self.height_vel = 0.0;
            return;
        }
        self.height += self.height_vel;
        self.height_vel -= DIE_GRAVITY;
        if self.height <= 0.0 {
            self.height = 0.0;
            self.height_vel = 0.0;
        }
    }

    /// Start following the cursor
    pub fn begin_drag(&mut self, cursor: Vec2) {
        self.mode = DieMode::Drag;
        self.drag_offset = cursor - self.pos;
        self.vel = Vec2::ZERO;
    }

    /// Track the cursor, kept inside `zone`
    pub fn update_drag(&mut self, cursor: Vec2, zone: &Rect, size: f32) {
        self.pos = cursor - self.drag_offset;
        zone.clamp_box(&mut self.pos, size);
        self.vel = Vec2::ZERO;
    }

    /// Let go of a drag with the cursor's last movement as velocity
    pub fn throw(&mut self, vel: Vec2) {
        self.mode = DieMode::Rolling;
        self.vel = vel;
        if self.is_moving() {
            self.direction = Direction::from_vector(vel);
        }
        self.height_vel = vel.length() * 0.5;
    }

    /// Ease toward `fixed`. Returns true on the tick the die arrives.
    pub fn update_scoring(&mut self, move_factor: f32) -> bool {
        self.vel = (self.fixed - self.pos) * move_factor;
        self.pos += self.vel;
        let delta = (self.fixed - self.pos).abs();
        if delta.x < DIE_ARRIVAL_EPSILON && delta.y < DIE_ARRIVAL_EPSILON {
            self.pos = self.fixed;
            self.vel = Vec2::ZERO;
            return true;
        }
        false
    }
}

impl FaceValue for Die {
    fn value(&self) -> u8 {
        self.model.active_face().value()
    }

    fn pip_count(&self) -> u8 {
        self.model.active_face().pip_count()
    }
}

/// Pairwise die-die collision. Only rolling dice respond; dice already
/// separating are left alone so one contact cannot bounce repeatedly.
pub fn collide_dice<R: Rng>(dice: &mut [Die], size: f32, rng: &mut R) {
    for die in dice.iter_mut() {
        die.colliding = false;
    }

    for i in 0..dice.len() {
        let (head, tail) = dice.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if a.aabb(size).overlap(&b.aabb(size)).is_none() {
                continue;
            }
            a.colliding = true;
            b.colliding = true;

            let a_rolls = a.mode == DieMode::Rolling;
            let b_rolls = b.mode == DieMode::Rolling;
            if !a_rolls && !b_rolls {
                continue;
            }

            let normal = (b.center(size) - a.center(size)).normalize_or(Vec2::X);
            // Only closing pairs reflect, so a lingering overlap cannot flip velocities every tick
            let closing = (a.vel - b.vel).dot(normal) > 0.0;
            if closing {
                let damping = rng.random_range(DIE_BOUNCE_DAMPING_MIN..DIE_BOUNCE_DAMPING_MAX);
                let factor = DIE_BOUNCE_INVERT * damping;
                if a_rolls {
                    a.vel *= factor;
                }
                if b_rolls {
                    b.vel *= factor;
                }
            }

            let nudge = normal * DIE_SEPARATION_IMPULSE;
            if a_rolls {
                a.pos -= nudge;
            }
            if b_rolls {
                b.pos += nudge;
            }
        }
    }
}
