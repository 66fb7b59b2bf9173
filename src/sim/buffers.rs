//! Rock ownership
//!
//! Every rock lives in exactly one buffer, in one of three families:
//! - base: resting piles, one per configured base color
//! - held: one pile per die that is currently holding rocks
//! - transition: piles fading from a die color back to a base color
//!
//! Rocks only ever move between buffers, so the total count is constant for
//! the lifetime of a level.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rock::Rock;
use crate::dice::DieId;

/// Colors closer than this per channel are the same color
const COLOR_EPSILON: f32 = 1e-3;

/// A contiguous pile of rocks sharing a color blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockBuffer {
    pub rocks: Vec<Rock>,
    pub target_color: Vec3,
    pub source_color: Vec3,
    /// Ticks left in the source-to-target blend; 0 means no blend
    pub transition_ticks: u32,
    /// Buffer-local tick counter driving damping and sprite cadence
    pub frame: u32,
}

impl RockBuffer {
    /// Resting pile of a single color
    pub fn new(color: Vec3) -> Self {
        Self {
            rocks: Vec::new(),
            target_color: color,
            source_color: color,
            transition_ticks: 0,
            frame: 0,
        }
    }

    pub fn blending(rocks: Vec<Rock>, target: Vec3, source: Vec3, ticks: u32, frame: u32) -> Self {
        let mut buffer = Self {
            rocks,
            target_color: target,
            source_color: source,
            transition_ticks: ticks,
            frame,
        };
        if ticks == 0 {
            buffer.source_color = target;
        }
        buffer
    }

    pub fn len(&self) -> usize {
        self.rocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rocks.is_empty()
    }

    /// Remaining share of the blend, 1.0 at its start and 0.0 once settled
    pub fn transition_fraction(&self, total_frames: u32) -> f32 {
        if total_frames == 0 {
            return 0.0;
        }
        (self.transition_ticks as f32 / total_frames as f32).min(1.0)
    }

    /// One tick of the color blend, clamped at zero
    fn tick_blend(&mut self) {
        self.transition_ticks = self.transition_ticks.saturating_sub(1);
        if self.transition_ticks == 0 {
            self.source_color = self.target_color;
        }
    }
}

/// The pile a die is holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldBuffer {
    pub die: DieId,
    pub buffer: RockBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferFamily {
    Base,
    Held,
    Transition,
}

/// Address of one rock, valid until buffers are restructured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RockRef {
    pub family: BufferFamily,
    pub buffer: usize,
    pub rock: usize,
}

/// Per-tick broad-phase output. Truncated every tick, capacity kept.
#[derive(Debug, Clone, Default)]
pub struct CollisionScratch {
    pub cursor: Vec<RockRef>,
    pub die: Vec<RockRef>,
}

impl CollisionScratch {
    pub fn clear(&mut self) {
        self.cursor.clear();
        self.die.clear();
    }
}

/// Owner of every rock in the level
#[derive(Debug, Clone, Default)]
pub struct RockBufferManager {
    pub(super) base_buffers: Vec<RockBuffer>,
    /// Sorted by die id
    pub(super) held_buffers: Vec<HeldBuffer>,
    /// Oldest first, so ascending remaining ticks
    pub(super) transition_buffers: Vec<RockBuffer>,
    pub(super) scratch: CollisionScratch,
}

impl RockBufferManager {
    /// Empty manager with one base buffer per color, each sized to hold every
    /// rock so merges never reallocate
    pub fn new(base_colors: &[Vec3], capacity: usize) -> Self {
        let base_buffers = base_colors
            .iter()
            .map(|&color| {
                let mut buffer = RockBuffer::new(color);
                buffer.rocks.reserve(capacity);
                buffer
            })
            .collect();
        Self {
            base_buffers,
            held_buffers: Vec::new(),
            transition_buffers: Vec::new(),
            scratch: CollisionScratch {
                cursor: Vec::with_capacity(capacity),
                die: Vec::with_capacity(capacity),
            },
        }
    }

    /// Add a freshly spawned rock to base buffer `index` (wrapping)
    pub fn insert_base(&mut self, index: usize, rock: Rock) {
        let count = self.base_buffers.len();
        if count == 0 {
            log::warn!("No base buffers; dropping spawned rock");
            return;
        }
        self.base_buffers[index % count].rocks.push(rock);
    }

    /// Drop every rock and blend, keeping base colors and capacity
    pub fn clear(&mut self) {
        for buffer in &mut self.base_buffers {
            buffer.rocks.clear();
            buffer.frame = 0;
        }
        self.held_buffers.clear();
        self.transition_buffers.clear();
        self.scratch.clear();
    }

    pub fn base_buffers(&self) -> &[RockBuffer] {
        &self.base_buffers
    }

    pub fn held_buffers(&self) -> &[HeldBuffer] {
        &self.held_buffers
    }

    pub fn transition_buffers(&self) -> &[RockBuffer] {
        &self.transition_buffers
    }

    pub fn held(&self, die: DieId) -> Option<&RockBuffer> {
        self.held_index(die).map(|i| &self.held_buffers[i].buffer)
    }

    pub fn is_holding(&self, die: DieId) -> bool {
        self.held_index(die).is_some()
    }

    fn held_index(&self, die: DieId) -> Option<usize> {
        self.held_buffers.binary_search_by_key(&die, |h| h.die).ok()
    }

    /// Base buffer whose color approximately equals `color`
    pub fn base_index(&self, color: Vec3) -> Option<usize> {
        self.base_buffers
            .iter()
            .position(|b| b.target_color.abs_diff_eq(color, COLOR_EPSILON))
    }

    pub fn base_rock_count(&self) -> usize {
        self.base_buffers.iter().map(RockBuffer::len).sum()
    }

    pub fn held_rock_count(&self) -> usize {
        self.held_buffers.iter().map(|h| h.buffer.len()).sum()
    }

    pub fn transition_rock_count(&self) -> usize {
        self.transition_buffers.iter().map(RockBuffer::len).sum()
    }

    /// Rocks across all three families
    pub fn total_rocks(&self) -> usize {
        self.base_rock_count() + self.held_rock_count() + self.transition_rock_count()
    }

    /// Every buffer, base then held then transition
    pub fn buffers(&self) -> impl Iterator<Item = (BufferFamily, &RockBuffer)> {
        let base = self.base_buffers.iter().map(|b| (BufferFamily::Base, b));
        let held = self.held_buffers.iter().map(|h| (BufferFamily::Held, &h.buffer));
        let transition = self
            .transition_buffers
            .iter()
            .map(|b| (BufferFamily::Transition, b));
        base.chain(held).chain(transition)
    }

    /// Buffer at `(family, index)`
    pub fn buffer_mut(&mut self, family: BufferFamily, index: usize) -> Option<&mut RockBuffer> {
        match family {
            BufferFamily::Base => self.base_buffers.get_mut(index),
            BufferFamily::Held => self.held_buffers.get_mut(index).map(|h| &mut h.buffer),
            BufferFamily::Transition => self.transition_buffers.get_mut(index),
        }
    }

    pub fn rock_mut(&mut self, r: RockRef) -> Option<&mut Rock> {
        self.buffer_mut(r.family, r.buffer)?.rocks.get_mut(r.rock)
    }

    /// Hand die `die` a share of the free rocks and tint them `color`.
    ///
    /// The share is an even split of the base pool among the dice that are
    /// not holding yet, falling back to the transition pool when the base
    /// pool is too thin. Returns the number of rocks moved.
    pub fn select<R: Rng>(
        &mut self,
        die: DieId,
        color: Vec3,
        dice_count: usize,
        transition_frames: u32,
        rng: &mut R,
    ) -> usize {
        if self.is_holding(die) {
            return 0;
        }
        let unheld = dice_count.saturating_sub(self.held_buffers.len());
        if unheld == 0 || self.base_buffers.is_empty() {
            log::warn!("Die {die} cannot hold: no free share ({dice_count} dice)");
            return 0;
        }

        let mut take = self.base_rock_count() / unheld;
        if take == 0 {
            take = self.transition_rock_count() / unheld;
        }
        if take == 0 {
            log::debug!("Die {die} holds nothing: rock pools exhausted");
            return 0;
        }

        let base_count = self.base_buffers.len();
        let mut moved: Vec<Rock> = Vec::with_capacity(take);
        let mut contributed = vec![0usize; base_count];
        let mut shortfall = 0;

        for (i, buffer) in self.base_buffers.iter_mut().enumerate() {
            let quota = take / base_count + usize::from(i < take % base_count);
            let n = quota.min(buffer.len());
            moved.extend(buffer.rocks.drain(..n));
            contributed[i] += n;
            shortfall += quota - n;
        }

        if shortfall > 0 {
            let mut order: Vec<usize> = (0..self.transition_buffers.len()).collect();
            order.sort_by_key(|&i| self.transition_buffers[i].transition_ticks);
            for i in order {
                if shortfall == 0 {
                    break;
                }
                let target = self.transition_buffers[i].target_color;
                let home = self.base_index(target).unwrap_or(0);
                let buffer = &mut self.transition_buffers[i];
                let n = shortfall.min(buffer.len());
                moved.extend(buffer.rocks.drain(..n));
                contributed[home] += n;
                shortfall -= n;
            }
            self.transition_buffers.retain(|b| !b.is_empty());
        }

        if moved.is_empty() {
            return 0;
        }

        for (k, rock) in moved.iter_mut().enumerate() {
            rock.adopt_sprite_slope();
            if k % 2 == 0 {
                rock.bounce_x();
            } else {
                rock.bounce_y();
            }
        }

        let source = weighted_pick(&contributed, rng);
        let count = moved.len();
        let held = HeldBuffer {
            die,
            buffer: RockBuffer::blending(
                moved,
                color,
                self.base_buffers[source].target_color,
                transition_frames,
                self.base_buffers[source].frame,
            ),
        };
        let at = self.held_buffers.partition_point(|h| h.die < die);
        self.held_buffers.insert(at, held);

        log::debug!("Die {die} holds {count} of {take} requested rocks");
        count
    }

    /// Release the pile held by `die`, splitting it into one fading pile per
    /// base color. Unknown dice are ignored. Returns the number of rocks
    /// released.
    pub fn deselect(&mut self, die: DieId, transition_frames: u32) -> usize {
        let Some(index) = self.held_index(die) else {
            return 0;
        };
        let HeldBuffer { buffer: held, .. } = self.held_buffers.remove(index);
        let total = held.len();
        let base_count = self.base_buffers.len();
        if base_count == 0 {
            return 0;
        }

        let per = total / base_count;
        let remainder = total % base_count;
        let mut rocks = held.rocks.into_iter();
        for (i, base) in self.base_buffers.iter().enumerate() {
            let count = per + usize::from(i < remainder);
            if count == 0 {
                continue;
            }
            let group: Vec<Rock> = rocks.by_ref().take(count).collect();
            self.transition_buffers.push(RockBuffer::blending(
                group,
                base.target_color,
                held.target_color,
                transition_frames,
                held.frame,
            ));
        }

        log::debug!("Die {die} released {total} rocks");
        total
    }

    /// Advance every color blend one tick; finished transitions merge into
    /// their base buffer
    pub fn transition_tick(&mut self) {
        for held in &mut self.held_buffers {
            held.buffer.tick_blend();
        }

        let mut i = 0;
        while i < self.transition_buffers.len() {
            let buffer = &mut self.transition_buffers[i];
            buffer.transition_ticks = buffer.transition_ticks.saturating_sub(1);
            if buffer.transition_ticks > 0 {
                i += 1;
                continue;
            }
            let finished = self.transition_buffers.remove(i);
            let home = match self.base_index(finished.target_color) {
                Some(home) => home,
                None => {
                    log::warn!("Transition target matches no base color; merging into base 0");
                    0
                }
            };
            if let Some(base) = self.base_buffers.get_mut(home) {
                base.rocks.extend(finished.rocks);
            }
        }
    }
}

/// Index drawn with probability proportional to its weight. All-zero
/// weights pick index 0.
fn weighted_pick<R: Rng>(weights: &[usize], rng: &mut R) -> usize {
    let total: usize = weights.iter().sum();
    if total == 0 {
        return 0;
    }
    let mut roll = rng.random_range(0..total);
    for (i, &w) in weights.iter().enumerate() {
        if roll < w {
            return i;
        }
        roll -= w;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rock::RockScoreType;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAMES: u32 = 30;

    fn colors(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::splat(0.1 * (i + 1) as f32)).collect()
    }

    fn manager(bases: usize, per_base: usize) -> RockBufferManager {
        let mut m = RockBufferManager::new(&colors(bases), bases * per_base);
        for i in 0..bases * per_base {
            let rock = Rock::new(Vec2::new(i as f32, 0.0), RockScoreType::Cobble, 1, -1);
            m.insert_base(i, rock);
        }
        m
    }

    fn base_counts(m: &RockBufferManager) -> Vec<usize> {
        m.base_buffers().iter().map(RockBuffer::len).collect()
    }

    #[test]
    fn test_select_takes_even_share() {
        let mut m = manager(7, 100);
        let mut rng = Pcg32::seed_from_u64(1);
        let moved = m.select(0, Vec3::X, 7, FRAMES, &mut rng);
        assert_eq!(moved, 100);
        assert_eq!(m.held(0).map(RockBuffer::len), Some(100));
        assert_eq!(m.total_rocks(), 700);
        // 100 = 7 * 14 + 2: the first two bases give one extra
        assert_eq!(base_counts(&m), vec![85, 85, 86, 86, 86, 86, 86]);

        let held = m.held(0).expect("held");
        assert_eq!(held.target_color, Vec3::X);
        assert_eq!(held.transition_ticks, FRAMES);
        assert!(m.base_index(held.source_color).is_some());
    }

    #[test]
    fn test_select_same_die_twice_is_noop() {
        let mut m = manager(3, 30);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(m.select(2, Vec3::Y, 3, FRAMES, &mut rng), 30);
        assert_eq!(m.select(2, Vec3::Y, 3, FRAMES, &mut rng), 0);
        assert_eq!(m.held_buffers().len(), 1);
    }

    #[test]
    fn test_select_shares_shrink_as_dice_hold() {
        let mut m = manager(2, 60);
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(m.select(0, Vec3::X, 3, FRAMES, &mut rng), 40);
        assert_eq!(m.select(1, Vec3::Y, 3, FRAMES, &mut rng), 40);
        assert_eq!(m.select(2, Vec3::Z, 3, FRAMES, &mut rng), 40);
        assert_eq!(m.base_rock_count(), 0);
        assert_eq!(m.total_rocks(), 120);
        let ids: Vec<DieId> = m.held_buffers().iter().map(|h| h.die).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_select_exhausted_pools() {
        let mut m = manager(2, 0);
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(m.select(0, Vec3::X, 3, FRAMES, &mut rng), 0);
        assert!(!m.is_holding(0));
    }

    #[test]
    fn test_select_falls_back_to_transitions() {
        let mut m = manager(2, 10);
        let mut rng = Pcg32::seed_from_u64(5);
        m.select(0, Vec3::X, 1, FRAMES, &mut rng);
        assert_eq!(m.base_rock_count(), 0);
        m.deselect(0, FRAMES);
        assert_eq!(m.transition_rock_count(), 20);

        let moved = m.select(1, Vec3::Y, 1, FRAMES, &mut rng);
        assert_eq!(moved, 20);
        assert!(m.transition_buffers().is_empty());
        assert_eq!(m.total_rocks(), 20);
    }

    #[test]
    fn test_select_fans_rocks_out() {
        let mut m = manager(1, 4);
        let mut rng = Pcg32::seed_from_u64(5);
        m.select(0, Vec3::X, 1, FRAMES, &mut rng);
        let held = m.held(0).expect("held");
        assert_eq!(held.rocks[0].slope(), (-1, -1));
        assert_eq!(held.rocks[1].slope(), (1, 1));
    }

    #[test]
    fn test_select_drains_soonest_finishing_transition_first() {
        let mut m = manager(2, 0);
        let palette = colors(2);
        let rocks = |n: usize| -> Vec<Rock> {
            (0..n)
                .map(|i| Rock::new(Vec2::new(i as f32, 8.0), RockScoreType::Pebble, 2, 1))
                .collect()
        };
        m.transition_buffers
            .push(RockBuffer::blending(rocks(10), palette[0], Vec3::Z, 25, 0));
        m.transition_buffers
            .push(RockBuffer::blending(rocks(10), palette[1], Vec3::Z, 5, 0));

        let mut rng = Pcg32::seed_from_u64(17);
        assert_eq!(m.select(0, Vec3::Y, 2, FRAMES, &mut rng), 10);

        // The 5-tick buffer empties and is dropped; the 25-tick one is untouched
        let left: Vec<(u32, usize)> = m
            .transition_buffers()
            .iter()
            .map(|b| (b.transition_ticks, b.len()))
            .collect();
        assert_eq!(left, vec![(25, 10)]);
        assert_eq!(m.held(0).map(|b| b.source_color), Some(palette[1]));
        assert_eq!(m.total_rocks(), 20);
    }

    #[test]
    fn test_buffers_inherit_frame_counter() {
        let mut m = manager(1, 10);
        m.base_buffers[0].frame = 7;
        let mut rng = Pcg32::seed_from_u64(19);
        m.select(2, Vec3::X, 1, FRAMES, &mut rng);
        assert_eq!(m.held(2).map(|b| b.frame), Some(7));

        m.held_buffers[0].buffer.frame = 11;
        assert_eq!(m.deselect(2, FRAMES), 10);
        assert!(!m.transition_buffers().is_empty());
        assert!(m.transition_buffers().iter().all(|b| b.frame == 11));
    }

    #[test]
    fn test_deselect_splits_by_base_color() {
        let mut m = manager(3, 10);
        let mut rng = Pcg32::seed_from_u64(5);
        m.select(4, Vec3::X, 1, FRAMES, &mut rng);
        assert_eq!(m.deselect(4, FRAMES), 30);
        assert!(m.held_buffers().is_empty());
        let sizes: Vec<usize> = m.transition_buffers().iter().map(RockBuffer::len).collect();
        assert_eq!(sizes, vec![10, 10, 10]);
        for (t, base) in m.transition_buffers().iter().zip(m.base_buffers()) {
            assert_eq!(t.target_color, base.target_color);
            assert_eq!(t.source_color, Vec3::X);
        }
    }

    #[test]
    fn test_deselect_unknown_die_is_noop() {
        let mut m = manager(2, 10);
        assert_eq!(m.deselect(3, FRAMES), 0);
        assert_eq!(m.total_rocks(), 20);
    }

    #[test]
    fn test_round_trip_restores_base_partition() {
        let mut m = manager(4, 25);
        let before = base_counts(&m);
        let mut rng = Pcg32::seed_from_u64(11);
        m.select(3, Vec3::X, 7, FRAMES, &mut rng);
        m.deselect(3, FRAMES);
        for _ in 0..FRAMES {
            assert_eq!(m.total_rocks(), 100);
            m.transition_tick();
        }
        assert!(m.transition_buffers().is_empty());
        assert_eq!(base_counts(&m), before);
    }

    #[test]
    fn test_held_blend_settles() {
        let mut m = manager(2, 10);
        let mut rng = Pcg32::seed_from_u64(5);
        m.select(0, Vec3::X, 2, 3, &mut rng);
        for _ in 0..10 {
            m.transition_tick();
        }
        let held = m.held(0).expect("held");
        assert_eq!(held.transition_ticks, 0);
        assert_eq!(held.source_color, held.target_color);
    }

    #[test]
    fn test_transition_tick_without_transitions() {
        let mut m = manager(2, 5);
        m.transition_tick();
        assert_eq!(base_counts(&m), vec![5, 5]);
    }

    #[test]
    fn test_weighted_pick() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            assert_eq!(weighted_pick(&[0, 3, 0], &mut rng), 1);
        }
        assert_eq!(weighted_pick(&[0, 0], &mut rng), 0);
    }
}
