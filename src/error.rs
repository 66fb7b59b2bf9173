//! Error types
//!
//! Hand errors are programmer-error signals: they must never fire for a
//! valid dice set, and they abort the tick that produced them.

use thiserror::Error;

use crate::hand::HandRank;

/// Hand evaluator assertion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("no hand category for {dice} dice with {distinct} distinct values")]
    UnknownHand { dice: usize, distinct: usize },
    #[error("{rank} expects {expected} contributing dice, selected {found}")]
    SubsetMismatch {
        rank: HandRank,
        expected: usize,
        found: usize,
    },
    #[error("{rank} reached the straight selector but is not a straight")]
    NotAStraight { rank: HandRank },
}

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Errors that abort a simulation tick
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("hand evaluation failed: {0}")]
    Hand(#[from] HandError),
    #[error("unknown die {0}")]
    UnknownDie(u8),
}

/// A broken simulation invariant. Never expected in a correct build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
