//! Poker-style hands over dice
//!
//! Pure functions: no state survives a call. The evaluator only carries
//! the rule constants (snake-eyes target, straight lengths, ...).

pub mod evaluator;
pub mod rank;

pub use evaluator::{FaceValue, HandEvaluator, HandResult, HandRules, MAX_HAND_DICE, StraightLengths};
pub use rank::HandRank;
