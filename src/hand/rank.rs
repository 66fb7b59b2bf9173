//! Hand categories, ranked low to high

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hand category. Declaration order is rank order, so `Ord` compares strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum HandRank {
    #[default]
    NoHand,
    HighDie,
    OnePair,
    SnakeEyes,
    TwoPair,
    ThreeOfAKind,
    StraightSmall,
    StraightLarge,
    FullHouse,
    FourOfAKind,
    FiveOfAKind,
    ThreePair,
    CrowdedHouse,
    SixOfAKind,
    StraightLarger,
    TwoThreeOfAKind,
    OverpopulatedHouse,
    StraightLargest,
    FullestHouse,
    SevenOfAKind,
    SevenSevens,
    /// Reserved for modifier-extended straights longer than seven dice
    StraightMax,
}

/// Per-rank lookup row
struct RankInfo {
    name: &'static str,
    multiplier: u32,
    /// Contributing dice count; 0 for straights, whose size follows the rules
    dice: usize,
}

const fn info(name: &'static str, multiplier: u32, dice: usize) -> RankInfo {
    RankInfo {
        name,
        multiplier,
        dice,
    }
}

/// Indexed by `HandRank as usize`
const RANK_TABLE: [RankInfo; 22] = [
    info("No Hand", 0, 0),
    info("High Die", 1, 1),
    info("One Pair", 2, 2),
    info("Snake Eyes", 3, 2),
    info("Two Pair", 3, 4),
    info("Three of a Kind", 4, 3),
    info("Small Straight", 5, 0),
    info("Large Straight", 6, 0),
    info("Full House", 7, 5),
    info("Four of a Kind", 8, 4),
    info("Five of a Kind", 10, 5),
    info("Three Pair", 10, 6),
    info("Crowded House", 12, 6),
    info("Six of a Kind", 14, 6),
    info("Larger Straight", 14, 0),
    info("Two Three of a Kind", 15, 6),
    info("Overpopulated House", 16, 7),
    info("Largest Straight", 18, 0),
    info("Fullest House", 20, 7),
    info("Seven of a Kind", 24, 7),
    info("Seven Sevens", 77, 7),
    info("Max Straight", 30, 0),
];

impl HandRank {
    pub const ALL: [HandRank; 22] = [
        HandRank::NoHand,
        HandRank::HighDie,
        HandRank::OnePair,
        HandRank::SnakeEyes,
        HandRank::TwoPair,
        HandRank::ThreeOfAKind,
        HandRank::StraightSmall,
        HandRank::StraightLarge,
        HandRank::FullHouse,
        HandRank::FourOfAKind,
        HandRank::FiveOfAKind,
        HandRank::ThreePair,
        HandRank::CrowdedHouse,
        HandRank::SixOfAKind,
        HandRank::StraightLarger,
        HandRank::TwoThreeOfAKind,
        HandRank::OverpopulatedHouse,
        HandRank::StraightLargest,
        HandRank::FullestHouse,
        HandRank::SevenOfAKind,
        HandRank::SevenSevens,
        HandRank::StraightMax,
    ];

    fn info(self) -> &'static RankInfo {
        &RANK_TABLE[self as usize]
    }

    /// Display name for the HUD
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Score multiplier applied to the summed face values
    pub fn multiplier(self) -> u32 {
        self.info().multiplier
    }

    pub fn is_straight(self) -> bool {
        matches!(
            self,
            HandRank::StraightSmall
                | HandRank::StraightLarge
                | HandRank::StraightLarger
                | HandRank::StraightLargest
                | HandRank::StraightMax
        )
    }

    /// Number of contributing dice for non-straight ranks
    pub fn fixed_dice_count(self) -> Option<usize> {
        if self.is_straight() || self == HandRank::NoHand {
            None
        } else {
            Some(self.info().dice)
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
