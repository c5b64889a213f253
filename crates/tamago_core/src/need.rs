//! The four need categories and their bounded levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InteractionError;
use crate::mood::Mood;

pub const MAX_LEVEL: u8 = 100;
pub const MIN_LEVEL: u8 = 0;

/// A tracked well-being dimension. The set is closed.
///
/// Declaration order is the tie-break priority used when picking the mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Need {
    Hunger,
    Social,
    Hygiene,
    Energy,
}

impl Need {
    pub const COUNT: usize = 4;

    /// All needs in priority order.
    pub const ALL: [Need; Need::COUNT] = [Need::Hunger, Need::Social, Need::Hygiene, Need::Energy];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The mood shown when this need is the most neglected one.
    pub fn mood(self) -> Mood {
        match self {
            Need::Hunger => Mood::Hungry,
            Need::Social => Mood::Bored,
            Need::Hygiene => Mood::Dirty,
            Need::Energy => Mood::Tired,
        }
    }

    /// The owner action that restores this need.
    pub fn action(self) -> &'static str {
        match self {
            Need::Hunger => "feed",
            Need::Social => "play",
            Need::Hygiene => "clean",
            Need::Energy => "sleep",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Need::Hunger => "Hunger",
            Need::Social => "Social",
            Need::Hygiene => "Hygiene",
            Need::Energy => "Energy",
        }
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the need name or its action verb, case-insensitively.
impl FromStr for Need {
    type Err = InteractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hunger" | "feed" => Ok(Need::Hunger),
            "social" | "play" => Ok(Need::Social),
            "hygiene" | "clean" => Ok(Need::Hygiene),
            "energy" | "sleep" => Ok(Need::Energy),
            _ => Err(InteractionError::InvalidNeed(s.to_string())),
        }
    }
}

/// One level in `[MIN_LEVEL, MAX_LEVEL]` per need.
///
/// Every mutation clamps, so a level outside the range is never observable.
/// The type is `Copy`: handing it out is always a defensive copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedLevels([u8; Need::COUNT]);

impl Default for NeedLevels {
    fn default() -> Self {
        Self::full()
    }
}

impl NeedLevels {
    /// Every need satisfied.
    pub fn full() -> Self {
        Self([MAX_LEVEL; Need::COUNT])
    }

    /// Build from raw levels in priority order, clamping each one.
    pub fn from_levels(levels: [u8; Need::COUNT]) -> Self {
        Self(levels.map(|l| l.min(MAX_LEVEL)))
    }

    pub fn get(&self, need: Need) -> u8 {
        self.0[need.index()]
    }

    /// Replace a level, clamping into range.
    pub fn set(&mut self, need: Need, level: i64) {
        self.0[need.index()] = level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8;
    }

    /// Raise a level by `amount`, capped at `MAX_LEVEL`. Returns the new level.
    pub fn raise(&mut self, need: Need, amount: u32) -> u8 {
        let level = self.get(need) as i64 + amount as i64;
        self.set(need, level);
        self.get(need)
    }

    /// Lower a level by `amount`, floored at `MIN_LEVEL`. Returns the new level.
    pub fn lower(&mut self, need: Need, amount: u32) -> u8 {
        let level = self.get(need) as i64 - amount as i64;
        self.set(need, level);
        self.get(need)
    }

    pub fn is_full(&self, need: Need) -> bool {
        self.get(need) >= MAX_LEVEL
    }

    /// Integer mean of all levels, rounded toward zero.
    pub fn mean(&self) -> u8 {
        let total: u32 = self.0.iter().map(|&l| l as u32).sum();
        (total / Need::COUNT as u32) as u8
    }

    pub fn any_depleted(&self) -> bool {
        self.0.iter().any(|&l| l == MIN_LEVEL)
    }

    pub fn count_below(&self, threshold: u8) -> usize {
        self.0.iter().filter(|&&l| l < threshold).count()
    }

    /// `(need, level)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Need, u8)> + '_ {
        Need::ALL.iter().map(move |&n| (n, self.get(n)))
    }

    pub fn as_array(&self) -> [u8; Need::COUNT] {
        self.0
    }
}
