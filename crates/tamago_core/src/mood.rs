//! Derived states shown to the owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the pet feels right now. Recomputed from the need levels on every update,
/// never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Hungry,
    Bored,
    Dirty,
    Tired,
    Sad,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Hungry => "Hungry",
            Mood::Bored => "Bored",
            Mood::Dirty => "Dirty",
            Mood::Tired => "Tired",
            Mood::Sad => "Sad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health bucket derived from the health score.
///
/// `Healthy` and `Sick` oscillate freely; `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Sick,
    Dead,
}

impl Health {
    pub fn as_str(self) -> &'static str {
        match self {
            Health::Healthy => "Healthy",
            Health::Sick => "Sick",
            Health::Dead => "Dead",
        }
    }

    pub fn is_dead(self) -> bool {
        self == Health::Dead
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
