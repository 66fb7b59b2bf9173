//! Rock entity
//!
//! Rocks move on a discrete slope grid: each tick they advance by
//! `ROCK_BASE_VELOCITY * slope` per axis. The sprite slope lags behind the
//! authoritative slope through a pair of 4-bit step counters so impacts read
//! as a spin rather than a snap.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::{Rect, WallHit};
use crate::consts::*;

/// Score tier, also the rock's rotation cadence in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreTier {
    Small,
    Medium,
    Big,
    Huge,
}

impl ScoreTier {
    pub const ALL: [ScoreTier; 4] = [
        ScoreTier::Small,
        ScoreTier::Medium,
        ScoreTier::Big,
        ScoreTier::Huge,
    ];

    /// Score value: 1, 3, 5 or 10
    pub const fn value(self) -> u32 {
        match self {
            ScoreTier::Small => 1,
            ScoreTier::Medium => 3,
            ScoreTier::Big => 5,
            ScoreTier::Huge => 10,
        }
    }

    /// Slope added on each moving axis after a die impact
    pub const fn speed_boost(self) -> i8 {
        match self {
            ScoreTier::Small => 4,
            ScoreTier::Medium => 3,
            ScoreTier::Big => 2,
            ScoreTier::Huge => 1,
        }
    }

    /// Ticks between damping steps; heavier rocks slow down sooner
    pub const fn damping_cycle(self) -> u32 {
        DAMPING_BASE_CYCLE - self.value() / 2
    }

    /// Relative spawn weight
    const fn spawn_weight(self) -> u32 {
        match self {
            ScoreTier::Small => 60,
            ScoreTier::Medium => 25,
            ScoreTier::Big => 11,
            ScoreTier::Huge => 4,
        }
    }
}

/// Rock variant. Each variant has a fixed tier and size multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RockScoreType {
    Pebble,
    Grit,
    Chip,
    Cobble,
    Nugget,
    Shard,
    Stone,
    Chunk,
    Slab,
    Boulder,
    Monolith,
    Crag,
}

/// Indexed by `RockScoreType as usize`: (tier, size multiplier)
const SCORE_TYPE_TABLE: [(ScoreTier, f32); 12] = [
    (ScoreTier::Small, 0.5),
    (ScoreTier::Small, 0.6),
    (ScoreTier::Small, 0.7),
    (ScoreTier::Medium, 0.8),
    (ScoreTier::Medium, 0.9),
    (ScoreTier::Medium, 1.0),
    (ScoreTier::Big, 1.1),
    (ScoreTier::Big, 1.2),
    (ScoreTier::Big, 1.3),
    (ScoreTier::Huge, 1.5),
    (ScoreTier::Huge, 1.75),
    (ScoreTier::Huge, 2.0),
];

impl RockScoreType {
    pub const ALL: [RockScoreType; 12] = [
        RockScoreType::Pebble,
        RockScoreType::Grit,
        RockScoreType::Chip,
        RockScoreType::Cobble,
        RockScoreType::Nugget,
        RockScoreType::Shard,
        RockScoreType::Stone,
        RockScoreType::Chunk,
        RockScoreType::Slab,
        RockScoreType::Boulder,
        RockScoreType::Monolith,
        RockScoreType::Crag,
    ];

    pub fn tier(self) -> ScoreTier {
        SCORE_TYPE_TABLE[self as usize].0
    }

    pub fn size_multiplier(self) -> f32 {
        SCORE_TYPE_TABLE[self as usize].1
    }

    /// Pick a tier by spawn weight, then a variant within it uniformly
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let total: u32 = ScoreTier::ALL.iter().map(|t| t.spawn_weight()).sum();
        let mut roll = rng.random_range(0..total);
        let mut tier = ScoreTier::Small;
        for t in ScoreTier::ALL {
            if roll < t.spawn_weight() {
                tier = t;
                break;
            }
            roll -= t.spawn_weight();
        }
        let pick = rng.random_range(0..3);
        Self::ALL
            .into_iter()
            .filter(|v| v.tier() == tier)
            .nth(pick)
            .unwrap_or(RockScoreType::Pebble)
    }
}

/// Sprite slope index for an authoritative slope
#[inline]
pub fn sprite_from_slope(slope: i8) -> u8 {
    (slope + MAX_SLOPE).rem_euclid(DIRECTIONS_TO_SNAP as i8) as u8
}

/// Authoritative slope encoded by a sprite slope index
#[inline]
pub fn slope_from_sprite(sprite: u8) -> i8 {
    (sprite % DIRECTIONS_TO_SNAP) as i8 - MAX_SLOPE
}

/// Shortest wrap-around distance between two sprite slopes
#[inline]
fn wrap_distance(from: u8, to: u8) -> u8 {
    let d = (to + DIRECTIONS_TO_SNAP - from) % DIRECTIONS_TO_SNAP;
    if d > DIRECTIONS_TO_SNAP / 2 {
        DIRECTIONS_TO_SNAP - d
    } else {
        d
    }
}

#[inline]
fn wrap_step(sprite: u8, dir: i8) -> u8 {
    (sprite as i8 + dir).rem_euclid(DIRECTIONS_TO_SNAP as i8) as u8
}

/// One sprite-slope step on a single axis; returns the remaining steps.
///
/// More steps than half a turn means a spin is still in progress, so the
/// sprite keeps turning in `spin_dir`. Within half a turn it walks the
/// shortest path to `target` and stops there.
fn step_axis(sprite: &mut u8, steps: u8, target: u8, spin_dir: i8) -> u8 {
    if steps == 0 {
        return 0;
    }
    if steps > DIRECTIONS_TO_SNAP / 2 {
        *sprite = wrap_step(*sprite, spin_dir);
        return steps - 1;
    }
    if *sprite == target {
        return 0;
    }
    let forward = (target + DIRECTIONS_TO_SNAP - *sprite) % DIRECTIONS_TO_SNAP;
    let dir = if forward <= DIRECTIONS_TO_SNAP / 2 { 1 } else { -1 };
    *sprite = wrap_step(*sprite, dir);
    steps - 1
}

/// Xorshift32 seeded from the integer position: identical positions jitter
/// identically, so a rock pinned against a wall settles into a stable pattern.
fn position_hash(pos: Vec2) -> u32 {
    let mut x = (pos.x as i32 as u32).wrapping_mul(0x9E37_79B1)
        ^ (pos.y as i32 as u32).wrapping_mul(0x85EB_CA77);
    if x == 0 {
        x = 0xDEAD_BEEF;
    }
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Jitter in [-ROCK_JITTER, ROCK_JITTER] per axis, plus a sign for the
/// silent-axis nudge
fn position_jitter(pos: Vec2) -> (i8, i8, i8) {
    let r = position_hash(pos);
    let span = (2 * ROCK_JITTER + 1) as u32;
    let jx = (r % span) as i8 - ROCK_JITTER;
    let jy = ((r >> 8) % span) as i8 - ROCK_JITTER;
    let nudge = if r & (1 << 16) != 0 { 1 } else { -1 };
    (jx, jy, nudge)
}

#[inline]
fn clamp_slope(slope: i8) -> i8 {
    slope.clamp(MIN_SLOPE, MAX_SLOPE)
}

/// A single kinetic rock particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    /// Top-left corner in world units
    pub pos: Vec2,
    slope_x: i8,
    slope_y: i8,
    sprite_slope_x: u8,
    sprite_slope_y: u8,
    sprite_index: u8,
    score_type: RockScoreType,
    /// Low nibble: X steps remaining, high nibble: Y steps remaining
    transition_steps: u8,
}

impl Rock {
    pub fn new(pos: Vec2, score_type: RockScoreType, slope_x: i8, slope_y: i8) -> Self {
        let slope_x = clamp_slope(slope_x);
        let slope_y = clamp_slope(slope_y);
        Self {
            pos,
            slope_x,
            slope_y,
            sprite_slope_x: sprite_from_slope(slope_x),
            sprite_slope_y: sprite_from_slope(slope_y),
            sprite_index: 0,
            score_type,
            transition_steps: 0,
        }
    }

    /// Random position inside `zone`, random variant, slope and rotation
    pub fn random<R: Rng>(rng: &mut R, zone: &Rect, tile_size: f32) -> Self {
        let score_type = RockScoreType::random(rng);
        let size = tile_size * score_type.size_multiplier();
        let max = (zone.max() - Vec2::splat(size)).max(zone.min());
        let pos = Vec2::new(
            zone.x + rng.random::<f32>() * (max.x - zone.x),
            zone.y + rng.random::<f32>() * (max.y - zone.y),
        );
        let mut rock = Self::new(
            pos,
            score_type,
            rng.random_range(MIN_SLOPE..=MAX_SLOPE),
            rng.random_range(MIN_SLOPE..=MAX_SLOPE),
        );
        rock.sprite_index = rng.random_range(0..ROTATION_FRAMES);
        rock
    }

    pub fn score_type(&self) -> RockScoreType {
        self.score_type
    }

    pub fn slope(&self) -> (i8, i8) {
        (self.slope_x, self.slope_y)
    }

    /// Set the authoritative slope, clamped into range. Sprite counters are
    /// left alone.
    pub fn set_slope(&mut self, slope_x: i8, slope_y: i8) {
        self.slope_x = clamp_slope(slope_x);
        self.slope_y = clamp_slope(slope_y);
    }

    pub fn sprite_slope(&self) -> (u8, u8) {
        (self.sprite_slope_x, self.sprite_slope_y)
    }

    pub fn sprite_index(&self) -> u8 {
        self.sprite_index
    }

    pub fn transition_steps(&self) -> (u8, u8) {
        (self.transition_steps & 0x0F, self.transition_steps >> 4)
    }

    fn set_transition_steps(&mut self, x: u8, y: u8) {
        self.transition_steps = x.min(0x0F) | (y.min(0x0F) << 4);
    }

    pub fn size(&self, tile_size: f32) -> f32 {
        tile_size * self.score_type.size_multiplier()
    }

    pub fn aabb(&self, tile_size: f32) -> Rect {
        Rect::square(self.pos, self.size(tile_size))
    }

    pub fn center(&self, tile_size: f32) -> Vec2 {
        self.pos + Vec2::splat(self.size(tile_size) * 0.5)
    }

    pub fn is_moving(&self) -> bool {
        self.slope_x != 0 || self.slope_y != 0
    }

    /// Replace the authoritative slope with the one the sprite shows
    pub fn adopt_sprite_slope(&mut self) {
        self.slope_x = slope_from_sprite(self.sprite_slope_x);
        self.slope_y = slope_from_sprite(self.sprite_slope_y);
    }

    /// Advance one tick along the current slope
    pub fn integrate(&mut self) {
        self.pos.x += ROCK_BASE_VELOCITY * self.slope_x as f32;
        self.pos.y += ROCK_BASE_VELOCITY * self.slope_y as f32;
    }

    /// Clamp into `world` and turn the slope back inward on any wall hit.
    /// A top or bottom hit tumbles the sprite by `|slope_x|` frames.
    pub fn bounce_walls(&mut self, world: &Rect, tile_size: f32) -> WallHit {
        let size = self.size(tile_size);
        let hit = world.clamp_box(&mut self.pos, size);
        if hit.x != 0 && self.slope_x.signum() == hit.x {
            self.bounce_x();
        }
        if hit.y != 0 && self.slope_y.signum() == hit.y {
            self.bounce_y();
            self.sprite_index =
                (self.sprite_index + self.slope_x.unsigned_abs()) % ROTATION_FRAMES;
        }
        hit
    }

    /// Retarget both axes and queue a full sprite spin on top of the shortest
    /// path
    pub fn bounce(&mut self, target_x: i8, target_y: i8) {
        self.set_slope(target_x, target_y);
        self.queue_spin();
    }

    fn queue_spin(&mut self) {
        let dx = wrap_distance(self.sprite_slope_x, sprite_from_slope(self.slope_x));
        let dy = wrap_distance(self.sprite_slope_y, sprite_from_slope(self.slope_y));
        self.set_transition_steps(dx + DIRECTIONS_TO_SNAP, dy + DIRECTIONS_TO_SNAP);
    }

    pub fn bounce_x(&mut self) {
        self.slope_x = -self.slope_x;
        let dx = wrap_distance(self.sprite_slope_x, sprite_from_slope(self.slope_x));
        let (_, y) = self.transition_steps();
        self.set_transition_steps(dx, y);
    }

    pub fn bounce_y(&mut self) {
        self.slope_y = -self.slope_y;
        let dy = wrap_distance(self.sprite_slope_y, sprite_from_slope(self.slope_y));
        let (x, _) = self.transition_steps();
        self.set_transition_steps(x, dy);
    }

    /// Bounce along `degrees` (screen convention, 0 = +x, 90 = +y), the
    /// dominant axis saturated to MAX_SLOPE
    pub fn bounce_towards_angle(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dominant = cos.abs().max(sin.abs());
        if dominant <= f32::EPSILON {
            return;
        }
        let scale = MAX_SLOPE as f32 / dominant;
        let target_x = (cos * scale).round() as i8;
        let target_y = (sin * scale).round() as i8;
        self.bounce(target_x, target_y);
    }

    /// Full die-impact response: angle bounce, tier speed boost, positional
    /// jitter, then clamp. The queued spin ends on the clamped slope.
    pub fn resolve_impact(&mut self, degrees: f32) {
        self.bounce_towards_angle(degrees);

        let boost = self.score_type.tier().speed_boost() as i16;
        let boosted = |s: i8| -> i16 {
            let s = s as i16;
            s + s.signum() * boost
        };
        let mut sx = boosted(self.slope_x);
        let mut sy = boosted(self.slope_y);

        let (jx, jy, nudge) = position_jitter(self.pos);
        let silent_x = sx == 0;
        let silent_y = sy == 0;
        sx += jx as i16;
        sy += jy as i16;
        if silent_x {
            sx = nudge as i16;
        } else if silent_y {
            sy = nudge as i16;
        }

        let clamp = |s: i16| s.clamp(MIN_SLOPE as i16, MAX_SLOPE as i16) as i8;
        self.set_slope(clamp(sx), clamp(sy));
        self.queue_spin();
    }

    /// Ticks between sprite-slope steps; faster rocks step more often
    pub fn transition_cadence(&self) -> u32 {
        let ax = self.slope_x.unsigned_abs() as u32;
        let ay = self.slope_y.unsigned_abs() as u32;
        let speed = ax.max(ay) + ax.min(ay) / 2;
        TRANSITION_BASE_TICKS
            .saturating_sub(speed * 3)
            .max(TRANSITION_MIN_TICKS)
    }

    /// Per-tick sprite animation, gated on the owning buffer's frame counter
    pub fn update_transition(&mut self, frame: u32) {
        let tier = self.score_type.tier().value();
        if frame % tier == 0 && self.slope_x != 0 && self.slope_y != 0 {
            let step = self.slope_x.signum() as i16;
            self.sprite_index =
                (self.sprite_index as i16 + step).rem_euclid(ROTATION_FRAMES as i16) as u8;
        }

        if self.transition_steps == 0 || frame % self.transition_cadence() != 0 {
            return;
        }
        let (steps_x, steps_y) = self.transition_steps();
        let spin_x = if self.slope_x < 0 { -1 } else { 1 };
        let spin_y = if self.slope_y < 0 { -1 } else { 1 };
        let target_x = sprite_from_slope(self.slope_x);
        let target_y = sprite_from_slope(self.slope_y);
        let steps_x = step_axis(&mut self.sprite_slope_x, steps_x, target_x, spin_x);
        let steps_y = step_axis(&mut self.sprite_slope_y, steps_y, target_y, spin_y);
        self.set_transition_steps(steps_x, steps_y);
    }

    /// Nudge the sprite slope one step on one axis, as when the cursor shoves
    /// the rock
    pub fn nudge_sprite(&mut self, axis_x: bool, dir: i8) {
        if axis_x {
            self.sprite_slope_x = wrap_step(self.sprite_slope_x, dir);
        } else {
            self.sprite_slope_y = wrap_step(self.sprite_slope_y, dir);
        }
    }

    /// Move each non-zero slope one unit toward zero and keep the sprite
    /// counters long enough to reach the new target
    pub fn damp(&mut self) {
        self.slope_x -= self.slope_x.signum();
        self.slope_y -= self.slope_y.signum();
        let (steps_x, steps_y) = self.transition_steps();
        let dx = wrap_distance(self.sprite_slope_x, sprite_from_slope(self.slope_x));
        let dy = wrap_distance(self.sprite_slope_y, sprite_from_slope(self.slope_y));
        self.set_transition_steps(steps_x.max(dx), steps_y.max(dy));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn settle(rock: &mut Rock) {
        for frame in 1..=2000 {
            rock.update_transition(frame);
            if rock.transition_steps() == (0, 0) {
                break;
            }
        }
    }

    #[test]
    fn test_sprite_slope_mapping() {
        assert_eq!(sprite_from_slope(0), 4);
        assert_eq!(sprite_from_slope(-4), 0);
        assert_eq!(sprite_from_slope(3), 7);
        // +4 and -4 share a sprite
        assert_eq!(sprite_from_slope(4), 0);
        for s in MIN_SLOPE..MAX_SLOPE {
            assert_eq!(slope_from_sprite(sprite_from_slope(s)), s);
        }
    }

    #[test]
    fn test_wrap_distance_takes_short_way() {
        assert_eq!(wrap_distance(0, 7), 1);
        assert_eq!(wrap_distance(1, 5), 4);
        assert_eq!(wrap_distance(6, 2), 4);
        assert_eq!(wrap_distance(3, 3), 0);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(RockScoreType::Pebble.tier(), ScoreTier::Small);
        assert_eq!(RockScoreType::Crag.tier(), ScoreTier::Huge);
        assert_eq!(ScoreTier::Small.damping_cycle(), 20);
        assert_eq!(ScoreTier::Huge.damping_cycle(), 15);
        for tier in ScoreTier::ALL {
            assert_eq!(RockScoreType::ALL.iter().filter(|v| v.tier() == tier).count(), 3);
        }
    }

    #[test]
    fn test_random_variants_cover_tiers() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..2000 {
            let t = RockScoreType::random(&mut rng).tier();
            seen[ScoreTier::ALL.iter().position(|x| *x == t).unwrap_or(0)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_transition_steps_packing() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Pebble, 0, 0);
        rock.set_transition_steps(3, 12);
        assert_eq!(rock.transition_steps(), (3, 12));
        assert_eq!(rock.transition_steps, 0xC3);
        rock.set_transition_steps(40, 0);
        assert_eq!(rock.transition_steps(), (15, 0));
    }

    #[test]
    fn test_bounce_adds_full_spin() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Cobble, 1, 0);
        rock.bounce(-1, 2);
        let (sx, sy) = rock.transition_steps();
        assert_eq!(sx, wrap_distance(sprite_from_slope(1), sprite_from_slope(-1)) + 8);
        assert_eq!(sy, 2 + 8);
        settle(&mut rock);
        assert_eq!(rock.sprite_slope(), (sprite_from_slope(-1), sprite_from_slope(2)));
    }

    #[test]
    fn test_bounce_x_flips_and_settles() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Shard, 3, -2);
        rock.bounce_x();
        assert_eq!(rock.slope(), (-3, -2));
        assert_eq!(rock.transition_steps(), (2, 0));
        settle(&mut rock);
        assert_eq!(rock.sprite_slope().0, sprite_from_slope(-3));
    }

    #[test]
    fn test_bounce_towards_angle_saturates_dominant_axis() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Stone, 0, 0);
        rock.bounce_towards_angle(0.0);
        assert_eq!(rock.slope(), (4, 0));
        rock.bounce_towards_angle(90.0);
        assert_eq!(rock.slope(), (0, 4));
        rock.bounce_towards_angle(225.0);
        assert_eq!(rock.slope(), (-4, -4));
        rock.bounce_towards_angle(30.0);
        assert_eq!(rock.slope(), (4, 2));
    }

    #[test]
    fn test_resolve_impact_injects_silent_axis() {
        let mut rock = Rock::new(Vec2::new(13.0, 77.0), RockScoreType::Pebble, -2, 0);
        rock.resolve_impact(0.0);
        let (sx, sy) = rock.slope();
        assert_eq!(sx, MAX_SLOPE);
        assert_eq!(sy.abs(), 1);
    }

    #[test]
    fn test_resolve_impact_spin_lands_on_final_slope() {
        for degrees in [0.0, 45.0, 135.0, 200.0, 290.0] {
            let mut rock = Rock::new(Vec2::new(41.0, 9.0), RockScoreType::Pebble, -3, 2);
            rock.resolve_impact(degrees);
            let (sx, sy) = rock.slope();
            let target = (sprite_from_slope(sx), sprite_from_slope(sy));
            let (sprite_x, sprite_y) = rock.sprite_slope();
            assert_eq!(
                rock.transition_steps(),
                (
                    wrap_distance(sprite_x, target.0) + DIRECTIONS_TO_SNAP,
                    wrap_distance(sprite_y, target.1) + DIRECTIONS_TO_SNAP,
                ),
                "{degrees}"
            );
            settle(&mut rock);
            assert_eq!(rock.sprite_slope(), target, "{degrees}");
        }
    }

    #[test]
    fn test_jitter_is_reproducible() {
        let pos = Vec2::new(120.5, 33.2);
        assert_eq!(position_jitter(pos), position_jitter(pos));
        for i in 0..200 {
            let (jx, jy, nudge) = position_jitter(Vec2::new(i as f32 * 3.0, i as f32));
            assert!((-ROCK_JITTER..=ROCK_JITTER).contains(&jx));
            assert!((-ROCK_JITTER..=ROCK_JITTER).contains(&jy));
            assert!(nudge == 1 || nudge == -1);
        }
    }

    #[test]
    fn test_cadence_faster_rocks_step_sooner() {
        let slow = Rock::new(Vec2::ZERO, RockScoreType::Pebble, 1, 0);
        let fast = Rock::new(Vec2::ZERO, RockScoreType::Pebble, 4, 4);
        assert_eq!(slow.transition_cadence(), 11);
        assert_eq!(fast.transition_cadence(), TRANSITION_MIN_TICKS);
    }

    #[test]
    fn test_rotation_follows_slope_x_sign() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Pebble, -1, 1);
        rock.update_transition(1);
        assert_eq!(rock.sprite_index(), ROTATION_FRAMES - 1);

        // Single-axis motion does not rotate
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Pebble, 2, 0);
        rock.update_transition(1);
        assert_eq!(rock.sprite_index(), 0);
    }

    #[test]
    fn test_rotation_cadence_follows_tier() {
        let rotation_frames = |score_type| {
            let mut rock = Rock::new(Vec2::ZERO, score_type, 1, 1);
            let mut frames = Vec::new();
            for frame in 1..=30 {
                let before = rock.sprite_index();
                rock.update_transition(frame);
                if rock.sprite_index() != before {
                    frames.push(frame);
                }
            }
            frames
        };
        let every_third: Vec<u32> = (1..=10).map(|i| i * 3).collect();
        assert_eq!(rotation_frames(RockScoreType::Cobble), every_third);
        assert_eq!(rotation_frames(RockScoreType::Boulder), vec![10, 20, 30]);
        assert_eq!(rotation_frames(RockScoreType::Pebble).len(), 30);
    }

    #[test]
    fn test_damp_moves_toward_zero() {
        let mut rock = Rock::new(Vec2::ZERO, RockScoreType::Boulder, 2, -1);
        rock.damp();
        assert_eq!(rock.slope(), (1, 0));
        rock.damp();
        assert_eq!(rock.slope(), (0, 0));
        rock.damp();
        assert_eq!(rock.slope(), (0, 0));
        settle(&mut rock);
        assert_eq!(rock.sprite_slope(), (4, 4));
    }

    #[test]
    fn test_wall_bounce_turns_inward() {
        let world = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut rock = Rock::new(Vec2::new(99.0, 50.0), RockScoreType::Cobble, 3, 1);
        let hit = rock.bounce_walls(&world, 8.0);
        assert_eq!(hit.x, 1);
        assert_eq!(rock.slope(), (-3, 1));
        assert!(rock.pos.x <= 100.0 - rock.size(8.0));

        // Already heading inward: no flip
        let mut rock = Rock::new(Vec2::new(-1.0, 50.0), RockScoreType::Cobble, 2, 0);
        rock.bounce_walls(&world, 8.0);
        assert_eq!(rock.slope(), (2, 0));
    }

    #[test]
    fn test_bottom_wall_tumbles() {
        let world = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut rock = Rock::new(Vec2::new(50.0, 99.0), RockScoreType::Cobble, -3, 2);
        rock.bounce_walls(&world, 8.0);
        assert_eq!(rock.slope(), (-3, -2));
        assert_eq!(rock.sprite_index(), 3);
    }
}
