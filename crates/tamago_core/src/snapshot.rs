//! Read-only view of a pet handed to observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mood::{Health, Mood};
use crate::need::NeedLevels;
use crate::stage::LifeStage;

/// A consistent copy of the pet's state taken after a completed recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSnapshot {
    pub name: String,
    /// Age in pet years.
    pub age: u64,
    pub mood: Mood,
    pub health: Health,
    pub health_score: u8,
    pub life_stage: LifeStage,
    pub needs: NeedLevels,
    /// Whether decay is currently suspended.
    pub paused: bool,
    pub taken_at: DateTime<Utc>,
}

impl PetSnapshot {
    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }
}

impl fmt::Display for PetSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Age: {}", self.age)?;
        writeln!(f, "Mood: {}", self.mood)?;
        writeln!(f, "Health: {} ({})", self.health, self.health_score)?;
        writeln!(f, "Life Stage: {}", self.life_stage)?;
        writeln!(f, "Need Levels:")?;
        for (need, level) in self.needs.iter() {
            writeln!(f, "  {need}: {level}")?;
        }
        Ok(())
    }
}
