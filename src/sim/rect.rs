//! Axis-aligned rectangles for zones and collision boxes
//!
//! Screen convention: `x` grows right, `y` grows down, `pos` is the top-left
//! corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Which walls a clamp pushed against: -1 for the min wall, +1 for the max
/// wall, 0 for none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallHit {
    /// Left (-1) or right (+1) wall
    pub x: i8,
    /// Top (-1) or bottom (+1) wall
    pub y: i8,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.x != 0 || self.y != 0
    }
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square box of side `size` at top-left `pos`
    pub fn square(pos: Vec2, size: f32) -> Self {
        Self::new(pos.x, pos.y, size, size)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// Bottom edge
    #[inline]
    pub fn max_h(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Point-in-rect, edges inclusive
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Per-axis penetration depth, or None when the boxes do not overlap
    pub fn overlap(&self, other: &Rect) -> Option<Vec2> {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        let ox = a_max.x.min(b_max.x) - a_min.x.max(b_min.x);
        let oy = a_max.y.min(b_max.y) - a_min.y.max(b_min.y);
        (ox > 0.0 && oy > 0.0).then(|| Vec2::new(ox, oy))
    }

    /// Clamp a square of side `size` at top-left `pos` inside this rect
    pub fn clamp_box(&self, pos: &mut Vec2, size: f32) -> WallHit {
        let mut hit = WallHit::default();
        let max_x = (self.x + self.w - size).max(self.x);
        let max_y = (self.y + self.h - size).max(self.y);
        if pos.x < self.x {
            pos.x = self.x;
            hit.x = -1;
        } else if pos.x > max_x {
            pos.x = max_x;
            hit.x = 1;
        }
        if pos.y < self.y {
            pos.y = self.y;
            hit.y = -1;
        } else if pos.y > max_y {
            pos.y = max_y;
            hit.y = 1;
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(r.contains(Vec2::new(15.0, 15.0)));
        assert!(r.contains(Vec2::new(30.0, 20.0)));
        assert!(!r.contains(Vec2::new(31.0, 15.0)));
        assert_eq!(r.max_h(), 20.0);
        assert_eq!(r.center(), Vec2::new(20.0, 15.0));
    }

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(8.0, 5.0, 10.0, 10.0);
        assert_eq!(a.overlap(&b), Some(Vec2::new(2.0, 5.0)));
        let c = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert_eq!(a.overlap(&c), None);
    }

    #[test]
    fn test_clamp_box() {
        let zone = Rect::new(0.0, 0.0, 100.0, 50.0);
        let mut pos = Vec2::new(95.0, -3.0);
        let hit = zone.clamp_box(&mut pos, 10.0);
        assert_eq!(hit, WallHit { x: 1, y: -1 });
        assert_eq!(pos, Vec2::new(90.0, 0.0));

        let mut pos = Vec2::new(20.0, 20.0);
        assert!(!zone.clamp_box(&mut pos, 10.0).any());
    }
}
