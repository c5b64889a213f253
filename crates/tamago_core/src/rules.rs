//! The recompute step: mood, health score, health state and growth.
//!
//! Interactions and decay ticks both end by calling [`assess`] and
//! [`promotion_target`], so derived state is always a pure function of the need
//! levels plus age.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigurationError;
use crate::mood::{Health, Mood};
use crate::need::{Need, NeedLevels};
use crate::stage::{LifeStage, LifeStageTable};

/// More than one need under this level makes the pet sad.
pub const SAD_THRESHOLD: u8 = 25;
/// A need under this level shows up in the mood.
pub const CONTENT_THRESHOLD: u8 = 75;
/// A health score under this level makes the pet sick.
pub const SICK_THRESHOLD: u8 = 50;

/// When the pet dies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathPolicy {
    /// Any single need reaching zero is fatal.
    #[default]
    AnyNeedDepleted,
    /// Only a mean of zero (every need empty) is fatal.
    MeanDepleted,
}

impl DeathPolicy {
    pub fn is_fatal(self, levels: &NeedLevels) -> bool {
        match self {
            DeathPolicy::AnyNeedDepleted => levels.any_depleted(),
            DeathPolicy::MeanDepleted => levels.mean() == 0,
        }
    }
}

impl FromStr for DeathPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "strict" | "any_need_depleted" => Ok(DeathPolicy::AnyNeedDepleted),
            "mean" | "average" | "mean_depleted" => Ok(DeathPolicy::MeanDepleted),
            _ => Err(ConfigurationError::UnknownDeathPolicy(s.to_string())),
        }
    }
}

/// Everything derived from the need levels in one recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub mood: Mood,
    pub health_score: u8,
    pub health: Health,
}

impl Assessment {
    /// Fully content: the only condition under which the pet grows.
    pub fn is_thriving(&self) -> bool {
        self.health == Health::Healthy && self.mood == Mood::Happy
    }
}

pub fn assess(levels: &NeedLevels, policy: DeathPolicy) -> Assessment {
    let health_score = levels.mean();
    Assessment {
        mood: classify_mood(levels),
        health_score,
        health: classify_health(levels, health_score, policy),
    }
}

/// Sad if more than one need is under [`SAD_THRESHOLD`]; otherwise the mood of
/// the lowest need under [`CONTENT_THRESHOLD`] (earlier needs win ties);
/// otherwise happy.
pub fn classify_mood(levels: &NeedLevels) -> Mood {
    if levels.count_below(SAD_THRESHOLD) > 1 {
        return Mood::Sad;
    }

    let mut lowest: Option<(Need, u8)> = None;
    for (need, level) in levels.iter() {
        if level >= CONTENT_THRESHOLD {
            continue;
        }
        match lowest {
            Some((_, min)) if level >= min => {}
            _ => lowest = Some((need, level)),
        }
    }

    lowest.map_or(Mood::Happy, |(need, _)| need.mood())
}

pub fn classify_health(levels: &NeedLevels, health_score: u8, policy: DeathPolicy) -> Health {
    if policy.is_fatal(levels) {
        Health::Dead
    } else if health_score < SICK_THRESHOLD {
        Health::Sick
    } else {
        Health::Healthy
    }
}

/// The stage to grow into, if any.
///
/// Growth happens one step at a time and only while the pet is thriving; an
/// age past several thresholds still yields just the next stage.
pub fn promotion_target(
    table: &LifeStageTable,
    current: LifeStage,
    age: u64,
    assessment: &Assessment,
) -> Option<LifeStage> {
    if !assessment.is_thriving() {
        return None;
    }
    let next = current.next()?;
    (age >= table.promotion_age(next)).then_some(next)
}
