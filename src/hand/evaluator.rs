//! Hand evaluation
//!
//! Classifies 1-7 dice into a `HandRank`, picks the dice that realize it and
//! scores them. Straights are detected on distinct values, so a duplicate
//! never breaks a run; everything else is read off the multiset shape.

use serde::{Deserialize, Serialize};

use super::rank::HandRank;
use crate::dice::DieFace;
use crate::error::HandError;

/// Most dice a hand can hold
pub const MAX_HAND_DICE: usize = 7;

/// Anything that shows a face value
pub trait FaceValue {
    /// Value used for grouping and scoring
    fn value(&self) -> u8;

    /// True number of pips, used for tie-breaks between equal values
    fn pip_count(&self) -> u8 {
        self.value()
    }
}

impl FaceValue for u8 {
    fn value(&self) -> u8 {
        *self
    }
}

impl FaceValue for DieFace {
    fn value(&self) -> u8 {
        DieFace::value(self)
    }

    fn pip_count(&self) -> u8 {
        DieFace::pip_count(self)
    }
}

impl<T: FaceValue + ?Sized> FaceValue for &T {
    fn value(&self) -> u8 {
        (**self).value()
    }

    fn pip_count(&self) -> u8 {
        (**self).pip_count()
    }
}

/// Run lengths for each straight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StraightLengths {
    pub small: usize,
    pub large: usize,
    pub larger: usize,
    pub largest: usize,
}

impl Default for StraightLengths {
    fn default() -> Self {
        Self {
            small: 4,
            large: 5,
            larger: 6,
            largest: 7,
        }
    }
}

/// Rule constants the evaluator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRules {
    /// Value a lone pair must show to count as snake eyes
    pub snake_eyes_target: u8,
    /// Value all seven dice must show for seven sevens
    pub seven_sevens_target: u8,
    pub straight_lengths: StraightLengths,
}

impl Default for HandRules {
    fn default() -> Self {
        Self {
            snake_eyes_target: 1,
            seven_sevens_target: 7,
            straight_lengths: StraightLengths::default(),
        }
    }
}

/// Rank, contributing dice and score of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    pub rank: HandRank,
    /// Indices into the evaluated dice, ascending
    pub contributing: Vec<usize>,
    pub score: u32,
}

/// Multiset of face values
struct ValueCounts {
    counts: [u8; 256],
}

impl ValueCounts {
    fn from_dice<T: FaceValue>(dice: &[T]) -> Self {
        let mut counts = [0u8; 256];
        for die in dice {
            let slot = &mut counts[die.value() as usize];
            *slot = slot.saturating_add(1);
        }
        Self { counts }
    }

    fn count(&self, value: u8) -> u8 {
        self.counts[value as usize]
    }

    /// Distinct values, ascending
    fn values(&self) -> impl DoubleEndedIterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&v| self.counts[v as usize] > 0)
    }

    fn distinct(&self) -> usize {
        self.values().count()
    }

    /// Group sizes, largest first
    fn shape(&self) -> Vec<u8> {
        let mut shape: Vec<u8> = self.values().map(|v| self.count(v)).collect();
        shape.sort_unstable_by(|a, b| b.cmp(a));
        shape
    }

    /// Value of the first group with exactly `size` dice
    fn value_with_count(&self, size: u8) -> Option<u8> {
        self.values().find(|&v| self.count(v) == size)
    }

    /// Length of the longest run of consecutive distinct values
    fn longest_run(&self) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<u8> = None;
        for v in self.values() {
            run = match prev {
                Some(p) if u16::from(p) + 1 == u16::from(v) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(v);
        }
        best
    }

    /// Highest-topped window of `len` consecutive values, as its top value
    fn best_window_top(&self, len: usize) -> Option<u8> {
        if len == 0 {
            return None;
        }
        self.values().rev().find(|&top| {
            let top = usize::from(top);
            top + 1 >= len && (top + 1 - len..=top).all(|v| self.counts[v] > 0)
        })
    }
}

/// Stateless hand evaluator parameterized by `HandRules`
#[derive(Debug, Clone, Copy, Default)]
pub struct HandEvaluator {
    rules: HandRules,
}

impl HandEvaluator {
    pub fn new(rules: HandRules) -> Self {
        Self { rules }
    }

    /// Highest-ranked category the dice realize
    pub fn determine_rank<T: FaceValue>(&self, dice: &[T]) -> Result<HandRank, HandError> {
        let n = dice.len();
        let counts = ValueCounts::from_dice(dice);
        let distinct = counts.distinct();
        if n == 0 || n > MAX_HAND_DICE {
            return Err(HandError::UnknownHand { dice: n, distinct });
        }

        let straight = if n >= self.rules.straight_lengths.small {
            self.straight_for_run(counts.longest_run())
        } else {
            None
        };
        let grouped = self.grouped_rank(&counts, n, distinct)?;

        Ok(straight.map_or(grouped, |s| s.max(grouped)))
    }

    /// Decision matrix over (distinct values, dice count)
    fn grouped_rank(
        &self,
        counts: &ValueCounts,
        n: usize,
        distinct: usize,
    ) -> Result<HandRank, HandError> {
        let shape = counts.shape();
        let top = shape.first().copied().unwrap_or(0);
        let second = shape.get(1).copied().unwrap_or(0);

        let rank = match (distinct, n) {
            (d, n) if d == n => HandRank::HighDie,
            // exactly one pair, the rest singles
            (d, n) if d + 1 == n => self.pair_rank(counts),
            (1, 3) => HandRank::ThreeOfAKind,
            (1, 4) => HandRank::FourOfAKind,
            (1, 5) => HandRank::FiveOfAKind,
            (1, 6) => HandRank::SixOfAKind,
            (1, 7) => match counts.value_with_count(7) {
                Some(v) if v == self.rules.seven_sevens_target => HandRank::SevenSevens,
                _ => HandRank::SevenOfAKind,
            },
            (2, 4) => match top {
                3 => HandRank::ThreeOfAKind,
                _ => HandRank::TwoPair,
            },
            (2, 5) => match top {
                4 => HandRank::FourOfAKind,
                _ => HandRank::FullHouse,
            },
            (3, 5) => match top {
                3 => HandRank::ThreeOfAKind,
                _ => HandRank::TwoPair,
            },
            (2, 6) => match top {
                5 => HandRank::FiveOfAKind,
                4 => HandRank::CrowdedHouse,
                _ => HandRank::TwoThreeOfAKind,
            },
            (3, 6) => match top {
                4 => HandRank::FourOfAKind,
                3 => HandRank::FullHouse,
                _ => HandRank::ThreePair,
            },
            (4, 6) => match top {
                3 => HandRank::ThreeOfAKind,
                _ => HandRank::TwoPair,
            },
            (2, 7) => match top {
                6 => HandRank::SixOfAKind,
                5 => HandRank::FullestHouse,
                _ => HandRank::OverpopulatedHouse,
            },
            (3, 7) => match (top, second) {
                (5, _) => HandRank::FiveOfAKind,
                (4, _) => HandRank::CrowdedHouse,
                (3, 3) => HandRank::TwoThreeOfAKind,
                // 3+2+2 holds three pairs
                _ => HandRank::ThreePair,
            },
            (4, 7) => match top {
                4 => HandRank::FourOfAKind,
                3 => HandRank::FullHouse,
                _ => HandRank::ThreePair,
            },
            (5, 7) => match top {
                3 => HandRank::ThreeOfAKind,
                _ => HandRank::TwoPair,
            },
            _ => return Err(HandError::UnknownHand { dice: n, distinct }),
        };
        Ok(rank)
    }

    /// A lone pair is snake eyes only when both dice show the target value
    fn pair_rank(&self, counts: &ValueCounts) -> HandRank {
        match counts.value_with_count(2) {
            Some(v) if v == self.rules.snake_eyes_target => HandRank::SnakeEyes,
            _ => HandRank::OnePair,
        }
    }

    fn straight_for_run(&self, run: usize) -> Option<HandRank> {
        let lengths = &self.rules.straight_lengths;
        if run > lengths.largest {
            Some(HandRank::StraightMax)
        } else if run >= lengths.largest {
            Some(HandRank::StraightLargest)
        } else if run >= lengths.larger {
            Some(HandRank::StraightLarger)
        } else if run >= lengths.large {
            Some(HandRank::StraightLarge)
        } else if run >= lengths.small {
            Some(HandRank::StraightSmall)
        } else {
            None
        }
    }

    /// Run length a straight rank needs. `StraightMax` has no fixed length.
    fn straight_length(&self, rank: HandRank) -> Option<usize> {
        let lengths = &self.rules.straight_lengths;
        match rank {
            HandRank::StraightSmall => Some(lengths.small),
            HandRank::StraightLarge => Some(lengths.large),
            HandRank::StraightLarger => Some(lengths.larger),
            HandRank::StraightLargest => Some(lengths.largest),
            _ => None,
        }
    }

    /// Indices (ascending) of the dice that realize `rank`
    pub fn find_contributing_dice<T: FaceValue>(
        &self,
        rank: HandRank,
        dice: &[T],
    ) -> Result<Vec<usize>, HandError> {
        let counts = ValueCounts::from_dice(dice);

        let selected: Vec<usize> = match rank {
            HandRank::NoHand => return Ok(Vec::new()),
            HandRank::HighDie => Self::high_die(dice).into_iter().collect(),
            HandRank::ThreePair => Self::three_pair_subset(&counts, dice),
            r if r.is_straight() => return self.straight_subset(r, &counts, dice),
            _ => (0..dice.len())
                .filter(|&i| counts.count(dice[i].value()) > 1)
                .collect(),
        };

        let expected = rank.fixed_dice_count().unwrap_or(0);
        if selected.len() != expected {
            return Err(HandError::SubsetMismatch {
                rank,
                expected,
                found: selected.len(),
            });
        }
        Ok(selected)
    }

    /// Highest value; ties go to the first die encountered
    fn high_die<T: FaceValue>(dice: &[T]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, die) in dice.iter().enumerate() {
            match best {
                Some(b) if dice[b].value() >= die.value() => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Two dice from every paired value group, fewest pips first
    fn three_pair_subset<T: FaceValue>(counts: &ValueCounts, dice: &[T]) -> Vec<usize> {
        let mut selected = Vec::with_capacity(6);
        for value in counts.values().filter(|&v| counts.count(v) >= 2) {
            let mut group: Vec<usize> = (0..dice.len())
                .filter(|&i| dice[i].value() == value)
                .collect();
            group.sort_by_key(|&i| (dice[i].pip_count(), i));
            selected.extend(group.into_iter().take(2));
        }
        selected.sort_unstable();
        selected
    }

    /// The straight run with the highest top value; one die per value, fewest pips first
    fn straight_subset<T: FaceValue>(
        &self,
        rank: HandRank,
        counts: &ValueCounts,
        dice: &[T],
    ) -> Result<Vec<usize>, HandError> {
        if !rank.is_straight() {
            return Err(HandError::NotAStraight { rank });
        }
        let len = self
            .straight_length(rank)
            .unwrap_or_else(|| counts.longest_run());

        let Some(top) = counts.best_window_top(len) else {
            return Err(HandError::SubsetMismatch {
                rank,
                expected: len,
                found: 0,
            });
        };

        let low = usize::from(top) + 1 - len;
        let mut selected = Vec::with_capacity(len);
        for value in low..=usize::from(top) {
            let pick = (0..dice.len())
                .filter(|&i| usize::from(dice[i].value()) == value)
                .min_by_key(|&i| (dice[i].pip_count(), i));
            if let Some(i) = pick {
                selected.push(i);
            }
        }
        selected.sort_unstable();

        if selected.len() != len {
            return Err(HandError::SubsetMismatch {
                rank,
                expected: len,
                found: selected.len(),
            });
        }
        Ok(selected)
    }

    /// Sum of the contributing dice of the best hand. Empty input scores 0.
    pub fn score<T: FaceValue>(&self, dice: &[T]) -> Result<u32, HandError> {
        if dice.is_empty() {
            return Ok(0);
        }
        Ok(self.evaluate(dice)?.score)
    }

    /// Summed face values of every die, times the rank multiplier
    pub fn score_hand<T: FaceValue>(&self, dice: &[T], rank: HandRank) -> u32 {
        let sum: u32 = dice.iter().map(|d| u32::from(d.value())).sum();
        sum * rank.multiplier()
    }

    /// Rank, contributing dice and score in one pass
    pub fn evaluate<T: FaceValue>(&self, dice: &[T]) -> Result<HandResult, HandError> {
        let rank = self.determine_rank(dice)?;
        let contributing = self.find_contributing_dice(rank, dice)?;
        let score = contributing
            .iter()
            .map(|&i| u32::from(dice[i].value()))
            .sum();
        Ok(HandResult {
            rank,
            contributing,
            score,
        })
    }
}
