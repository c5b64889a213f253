//! The pet aggregate: need levels plus everything derived from them.
//!
//! `PetState` has no notion of threads or clocks. Callers pass the current age
//! in and get back what changed; the engine wraps it in a single mutex.

use chrono::Utc;
use tamago_core::rules::{self, Assessment};
use tamago_core::{
    DeathPolicy, Health, InteractionError, LifeStage, LifeStageTable, Mood, Need, NeedLevels,
    PetSnapshot,
};

/// Side effects of a recompute the owner of the clock must act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Stage entered during this recompute.
    pub promoted: Option<LifeStage>,
    /// The pet died during this recompute.
    pub died: bool,
}

#[derive(Debug, Clone)]
pub struct PetState {
    name: String,
    name_locked: bool,
    needs: NeedLevels,
    mood: Mood,
    health: Health,
    health_score: u8,
    stage: LifeStage,
    paused: bool,
    table: LifeStageTable,
    policy: DeathPolicy,
}

impl PetState {
    /// A newborn pet: every need full, happy, healthy, youngest stage.
    pub fn new(name: impl Into<String>, table: LifeStageTable, policy: DeathPolicy) -> Self {
        let needs = NeedLevels::full();
        let Assessment {
            mood,
            health_score,
            health,
        } = rules::assess(&needs, policy);
        Self {
            name: name.into(),
            name_locked: false,
            needs,
            mood,
            health,
            health_score,
            stage: LifeStage::Child,
            paused: false,
            table,
            policy,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn needs(&self) -> NeedLevels {
        self.needs
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn health_score(&self) -> u8 {
        self.health_score
    }

    pub fn life_stage(&self) -> LifeStage {
        self.stage
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn table(&self) -> &LifeStageTable {
        &self.table
    }

    pub fn policy(&self) -> DeathPolicy {
        self.policy
    }

    /// Decay period of the active stage.
    pub fn decay_interval(&self) -> std::time::Duration {
        self.table.interval(self.stage)
    }

    /// Rename the pet. Only allowed before the first interaction.
    pub fn set_name(&mut self, name: &str) -> Result<(), InteractionError> {
        if !self.is_alive() {
            return Err(InteractionError::Dead);
        }
        if self.name_locked {
            return Err(InteractionError::NameLocked);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(InteractionError::InvalidName);
        }
        self.name = name.to_string();
        Ok(())
    }

    /// Flip decay suspension. Returns whether decay is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Restore one need by the active stage's increase rate, then recompute.
    pub fn interact(&mut self, need: Need, age: u64) -> Result<Outcome, InteractionError> {
        if !self.is_alive() {
            return Err(InteractionError::Dead);
        }
        if self.needs.is_full(need) {
            return Err(InteractionError::NeedAlreadyFull(need));
        }

        let amount = self.table.increase_amount(self.stage, need);
        let level = self.needs.raise(need, amount);
        self.name_locked = true;
        tracing::debug!(%need, amount, level, "Interaction applied");

        Ok(self.recompute(age))
    }

    /// Lower every need by the active stage's decrease rate, then recompute.
    ///
    /// Never fails: levels clamp at zero. Does nothing while paused or dead.
    pub fn decay(&mut self, age: u64) -> Outcome {
        if !self.is_alive() || self.paused {
            return Outcome::default();
        }
        for need in Need::ALL {
            let amount = self.table.decrease_amount(self.stage, need);
            self.needs.lower(need, amount);
        }
        tracing::debug!(needs = ?self.needs.as_array(), "Decay tick applied");

        self.recompute(age)
    }

    /// The recompute step shared by interactions and decay ticks.
    fn recompute(&mut self, age: u64) -> Outcome {
        let assessment = rules::assess(&self.needs, self.policy);
        self.mood = assessment.mood;
        self.health_score = assessment.health_score;
        self.health = assessment.health;

        if self.health.is_dead() {
            tracing::warn!(name = %self.name, needs = ?self.needs.as_array(), "Pet has died");
            return Outcome {
                promoted: None,
                died: true,
            };
        }

        let promoted = rules::promotion_target(&self.table, self.stage, age, &assessment);
        if let Some(next) = promoted {
            tracing::info!(name = %self.name, from = %self.stage, to = %next, age, "Pet grew up");
            self.stage = next;
        }
        Outcome {
            promoted,
            died: false,
        }
    }

    pub fn snapshot(&self, age: u64) -> PetSnapshot {
        PetSnapshot {
            name: self.name.clone(),
            age,
            mood: self.mood,
            health: self.health,
            health_score: self.health_score,
            life_stage: self.stage,
            needs: self.needs,
            paused: self.paused,
            taken_at: Utc::now(),
        }
    }

    /// Overwrite the need levels and recompute, as if a tick had just landed.
    #[cfg(test)]
    pub(crate) fn force_needs(&mut self, needs: NeedLevels, age: u64) -> Outcome {
        self.needs = needs;
        self.recompute(age)
    }
}
