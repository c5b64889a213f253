//! Error taxonomy for the pet simulation.
//!
//! Configuration errors are fatal and surface when a table or config is built.
//! Interaction errors are caller-visible rejections; none of them is retried.

use std::fmt;

use thiserror::Error;

use crate::need::Need;
use crate::stage::LifeStage;

/// Which of a stage's two rate vectors an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Increase,
    Decrease,
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::Increase => f.write_str("increase"),
            RateKind::Decrease => f.write_str("decrease"),
        }
    }
}

/// Malformed life-stage tables or engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{stage} {kind} rates must have exactly {expected} entries, got {actual}")]
    RateVectorLength {
        stage: LifeStage,
        kind: RateKind,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} {kind} rate for {need} must not be negative (got {value})")]
    NegativeRate {
        stage: LifeStage,
        kind: RateKind,
        need: Need,
        value: i32,
    },

    #[error("{stage} decay interval must be greater than zero")]
    ZeroInterval { stage: LifeStage },

    #[error("life stage {0} is defined more than once")]
    DuplicateStage(LifeStage),

    #[error("life stage {0} is not defined")]
    MissingStage(LifeStage),

    #[error("promotion age of {stage} ({age}) must be greater than that of {previous} ({previous_age})")]
    PromotionOrder {
        stage: LifeStage,
        age: u64,
        previous: LifeStage,
        previous_age: u64,
    },

    #[error("seconds_per_year must be greater than zero")]
    ZeroYear,

    #[error("unknown death policy {0:?} (expected \"any\" or \"mean\")")]
    UnknownDeathPolicy(String),
}

/// Rejections of owner-triggered commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    /// The pet has died; no further interaction is possible.
    #[error("the pet is dead")]
    Dead,

    /// The need is already at its maximum level.
    #[error("{0} is already full")]
    NeedAlreadyFull(Need),

    /// The caller named a need that does not exist.
    #[error("invalid need: {0:?}")]
    InvalidNeed(String),

    #[error("the pet's name can no longer be changed")]
    NameLocked,

    #[error("the pet's name must not be empty")]
    InvalidName,
}
