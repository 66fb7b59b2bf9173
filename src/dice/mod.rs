//! Dice identity: rainbow palette, throw directions, faces and pips

pub mod face;

pub use face::{DieFace, DieModel, MAX_PIPS, Pip, PipModifier, pip_layout};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Die identity: the die's position in the settings palette.
pub type DieId = u8;

/// The seven rainbow slots a player die can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RainbowColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl RainbowColor {
    pub const ALL: [RainbowColor; 7] = [
        RainbowColor::Red,
        RainbowColor::Orange,
        RainbowColor::Yellow,
        RainbowColor::Green,
        RainbowColor::Blue,
        RainbowColor::Indigo,
        RainbowColor::Violet,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Linear RGB used for dice and held rock piles
    pub fn rgb(self) -> Vec3 {
        match self {
            RainbowColor::Red => Vec3::new(0.91, 0.22, 0.20),
            RainbowColor::Orange => Vec3::new(0.96, 0.55, 0.16),
            RainbowColor::Yellow => Vec3::new(0.98, 0.85, 0.25),
            RainbowColor::Green => Vec3::new(0.30, 0.75, 0.35),
            RainbowColor::Blue => Vec3::new(0.22, 0.52, 0.92),
            RainbowColor::Indigo => Vec3::new(0.33, 0.27, 0.72),
            RainbowColor::Violet => Vec3::new(0.65, 0.35, 0.80),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RainbowColor::Red => "red",
            RainbowColor::Orange => "orange",
            RainbowColor::Yellow => "yellow",
            RainbowColor::Green => "green",
            RainbowColor::Blue => "blue",
            RainbowColor::Indigo => "indigo",
            RainbowColor::Violet => "violet",
        }
    }
}

/// Eight compass directions a die can be thrown or face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit vector in screen space (y grows downward)
    pub fn vector(self) -> Vec2 {
        use std::f32::consts::FRAC_1_SQRT_2 as D;
        match self {
            Direction::North => Vec2::new(0.0, -1.0),
            Direction::NorthEast => Vec2::new(D, -D),
            Direction::East => Vec2::new(1.0, 0.0),
            Direction::SouthEast => Vec2::new(D, D),
            Direction::South => Vec2::new(0.0, 1.0),
            Direction::SouthWest => Vec2::new(-D, D),
            Direction::West => Vec2::new(-1.0, 0.0),
            Direction::NorthWest => Vec2::new(-D, -D),
        }
    }

    /// Nearest compass direction to a vector; zero maps to North
    pub fn from_vector(v: Vec2) -> Self {
        if v == Vec2::ZERO {
            return Direction::North;
        }
        let octant = ((crate::angle_degrees(v) + 90.0) / 45.0).round() as i32;
        Self::ALL[octant.rem_euclid(8) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_indices() {
        for (i, color) in RainbowColor::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
            assert_eq!(RainbowColor::from_index(i), Some(*color));
        }
        assert_eq!(RainbowColor::from_index(7), None);
    }

    #[test]
    fn test_direction_vectors_are_unit() {
        for dir in Direction::ALL {
            assert!((dir.vector().length() - 1.0).abs() < 1e-5);
            assert_eq!(Direction::from_vector(dir.vector() * 3.0), dir);
        }
        assert_eq!(Direction::from_vector(Vec2::new(10.0, 1.0)), Direction::East);
    }
}
