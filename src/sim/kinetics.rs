//! Per-tick physics for dice and rocks
//!
//! Rock phases run strictly in order, each seeing the previous phase's
//! positions:
//! 1. integrate, bounce off the world walls, animate, gather broad-phase
//!    candidates
//! 2. cursor narrow phase
//! 3. die narrow phase
//! 4. damping (base and transition piles only; held rocks keep their speed)

use glam::Vec2;
use rand::Rng;

use super::buffers::{BufferFamily, CollisionScratch, RockBuffer, RockBufferManager, RockRef};
use super::context::SimContext;
use super::die::{Die, DieMode, collide_dice};
use super::rect::Rect;
use crate::angle_degrees;
use crate::consts::*;

/// Die data precomputed once per tick and shared by every candidate rock
#[derive(Debug, Clone, Copy)]
struct DieCollider {
    aabb: Rect,
    center: Vec2,
    /// Unit velocity, zero when at rest
    dir: Vec2,
    /// Velocity heading in degrees
    angle: f32,
    moving: bool,
}

impl DieCollider {
    fn new(die: &Die, size: f32) -> Self {
        let speed = die.vel.length();
        let moving = speed > 0.0;
        Self {
            aabb: die.aabb(size),
            center: die.center(size),
            dir: if moving { die.vel / speed } else { Vec2::ZERO },
            angle: if moving { angle_degrees(die.vel) } else { 0.0 },
            moving,
        }
    }
}

/// What one rock pass touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub cursor_candidates: usize,
    pub die_candidates: usize,
    pub cursor_pushes: usize,
    pub die_hits: usize,
}

/// Physics stepper. Holds only reusable scratch space.
#[derive(Debug, Clone, Default)]
pub struct KineticSimulator {
    colliders: Vec<DieCollider>,
}

impl KineticSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every die by its mode, then resolve die-die contacts. Scoring
    /// dice are driven by the scoring FSM instead.
    pub fn step_dice<R: Rng>(&mut self, dice: &mut [Die], ctx: &SimContext, cursor: Option<Vec2>, rng: &mut R) {
        let size = ctx.die_size();
        for die in dice.iter_mut() {
            match die.mode {
                DieMode::Rolling => die.update_rolling(&ctx.roll_zone, size),
                DieMode::Drag => {
                    if let Some(cursor) = cursor {
                        die.update_drag(cursor, &ctx.roll_zone, size);
                    }
                }
                DieMode::Held | DieMode::Scoring => {}
            }
        }
        collide_dice(dice, size, rng);
    }

    /// Advance every rock one tick against the given dice and cursor
    pub fn step_rocks(
        &mut self,
        manager: &mut RockBufferManager,
        dice: &[Die],
        ctx: &SimContext,
        cursor: Option<Vec2>,
    ) -> CollisionStats {
        let size = ctx.die_size();
        self.colliders.clear();
        self.colliders.extend(dice.iter().map(|d| DieCollider::new(d, size)));

        let cursor = cursor.filter(|c| ctx.world.contains(*c));

        manager.scratch.clear();
        let RockBufferManager {
            base_buffers,
            held_buffers,
            transition_buffers,
            scratch,
        } = &mut *manager;
        for (i, buffer) in base_buffers.iter_mut().enumerate() {
            self.integrate_buffer(BufferFamily::Base, i, buffer, ctx, cursor, scratch);
        }
        for (i, held) in held_buffers.iter_mut().enumerate() {
            self.integrate_buffer(BufferFamily::Held, i, &mut held.buffer, ctx, cursor, scratch);
        }
        for (i, buffer) in transition_buffers.iter_mut().enumerate() {
            self.integrate_buffer(BufferFamily::Transition, i, buffer, ctx, cursor, scratch);
        }

        let mut stats = CollisionStats {
            cursor_candidates: manager.scratch.cursor.len(),
            die_candidates: manager.scratch.die.len(),
            ..CollisionStats::default()
        };

        if let Some(cursor) = cursor {
            stats.cursor_pushes = cursor_phase(manager, cursor, ctx.rock_tile_size());
        }
        stats.die_hits = self.die_phase(manager, ctx.rock_tile_size());

        for buffer in manager.base_buffers.iter_mut() {
            damp_buffer(buffer);
        }
        for buffer in manager.transition_buffers.iter_mut() {
            damp_buffer(buffer);
        }

        stats
    }

    /// Phase 1 for one buffer
    fn integrate_buffer(
        &self,
        family: BufferFamily,
        index: usize,
        buffer: &mut RockBuffer,
        ctx: &SimContext,
        cursor: Option<Vec2>,
        scratch: &mut CollisionScratch,
    ) {
        let tile = ctx.rock_tile_size();
        buffer.frame = buffer.frame.wrapping_add(1);
        let frame = buffer.frame;

        for (rock_index, rock) in buffer.rocks.iter_mut().enumerate() {
            rock.integrate();
            rock.bounce_walls(&ctx.world, tile);
            rock.update_transition(frame);

            let center = rock.center(tile);
            let r = RockRef {
                family,
                buffer: index,
                rock: rock_index,
            };
            if let Some(cursor) = cursor
                && manhattan(center, cursor) < ctx.cursor_check_radius
            {
                scratch.cursor.push(r);
            }
            if self
                .colliders
                .iter()
                .any(|c| manhattan(center, c.center) < ctx.die_check_radius)
            {
                scratch.die.push(r);
            }
        }
    }

    /// Phase 3: each candidate bounces off the die it overlaps most
    fn die_phase(&self, manager: &mut RockBufferManager, tile: f32) -> usize {
        let mut hits = 0;
        for i in 0..manager.scratch.die.len() {
            let r = manager.scratch.die[i];
            let Some(rock) = manager.rock_mut(r) else {
                continue;
            };
            let aabb = rock.aabb(tile);

            let mut deepest: Option<(&DieCollider, f32)> = None;
            for collider in &self.colliders {
                if let Some(overlap) = aabb.overlap(&collider.aabb) {
                    let combined = overlap.x + overlap.y;
                    if deepest.is_none_or(|(_, best)| combined > best) {
                        deepest = Some((collider, combined));
                    }
                }
            }
            let Some((collider, max_overlap)) = deepest else {
                continue;
            };

            let angle = if collider.moving {
                collider.angle
            } else {
                angle_degrees(rock.center(tile) - collider.center)
            };
            rock.resolve_impact(angle);

            if collider.moving {
                let (sx, sy) = rock.slope();
                let heading = Vec2::new(sx as f32, sy as f32).normalize_or_zero();
                if heading.dot(collider.dir) > FORCEFUL_PUSH_COS {
                    rock.pos += collider.dir * max_overlap * FORCEFUL_PUSH_FACTOR;
                }
            }
            hits += 1;
        }
        hits
    }

    /// Full physics step: dice first, then rocks
    pub fn step<R: Rng>(
        &mut self,
        dice: &mut [Die],
        manager: &mut RockBufferManager,
        ctx: &SimContext,
        cursor: Option<Vec2>,
        rng: &mut R,
    ) -> CollisionStats {
        self.step_dice(dice, ctx, cursor, rng);
        self.step_rocks(manager, dice, ctx, cursor)
    }
}

#[inline]
fn manhattan(a: Vec2, b: Vec2) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Phase 2: shove rocks out from under the cursor along the dominant axis
fn cursor_phase(manager: &mut RockBufferManager, cursor: Vec2, tile: f32) -> usize {
    let mut pushes = 0;
    for i in 0..manager.scratch.cursor.len() {
        let r = manager.scratch.cursor[i];
        let Some(rock) = manager.rock_mut(r) else {
            continue;
        };
        if !rock.aabb(tile).contains(cursor) {
            continue;
        }

        let size = rock.size(tile);
        let half = Vec2::splat(size * 0.5);
        let mut center = rock.center(tile);
        let d = center - cursor;
        let old_cell = (rock.pos / tile).floor();

        let axis_x = d.x.abs() >= d.y.abs();
        let dir: i8 = if axis_x {
            if d.x >= 0.0 { 1 } else { -1 }
        } else if d.y >= 0.0 {
            1
        } else {
            -1
        };
        if axis_x {
            center.x = cursor.x + dir as f32 * size;
        } else {
            center.y = cursor.y + dir as f32 * size;
        }
        rock.pos = center - half;

        if (rock.pos / tile).floor() != old_cell {
            rock.nudge_sprite(axis_x, dir);
        }
        pushes += 1;
    }
    pushes
}

/// Phase 4 for one buffer
fn damp_buffer(buffer: &mut RockBuffer) {
    let frame = buffer.frame;
    for rock in buffer.rocks.iter_mut() {
        let cycle = rock.score_type().tier().damping_cycle();
        if frame % cycle == 0 {
            rock.damp();
        }
    }
}
