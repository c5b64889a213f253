//! Life stages and the rate table that governs them.
//!
//! Each stage carries an increase vector (applied by interactions), a decrease
//! vector (applied by decay ticks) and the decay interval. Stage behaviour is
//! pure table lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{ConfigurationError, RateKind};
use crate::need::Need;

/// Growth phase, youngest first. The derived `Ord` is the growth order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Child,
    Adult,
    Senior,
}

impl LifeStage {
    pub const COUNT: usize = 3;

    pub const ALL: [LifeStage; LifeStage::COUNT] =
        [LifeStage::Child, LifeStage::Adult, LifeStage::Senior];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage that follows this one, or `None` for the oldest.
    pub fn next(self) -> Option<LifeStage> {
        match self {
            LifeStage::Child => Some(LifeStage::Adult),
            LifeStage::Adult => Some(LifeStage::Senior),
            LifeStage::Senior => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifeStage::Child => "Child",
            LifeStage::Adult => "Adult",
            LifeStage::Senior => "Senior",
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated rates for a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRates {
    increase: [u32; Need::COUNT],
    decrease: [u32; Need::COUNT],
    interval: Duration,
}

impl StageRates {
    /// Build from raw vectors in need priority order (Hunger, Social, Hygiene, Energy).
    ///
    /// Fails unless both vectors have exactly one non-negative entry per need and
    /// the interval is non-zero.
    pub fn new(
        stage: LifeStage,
        increase: &[i32],
        decrease: &[i32],
        interval: Duration,
    ) -> Result<Self, ConfigurationError> {
        let increase = rate_vector(stage, RateKind::Increase, increase)?;
        let decrease = rate_vector(stage, RateKind::Decrease, decrease)?;
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval { stage });
        }
        Ok(Self {
            increase,
            decrease,
            interval,
        })
    }

    pub fn increase_amount(&self, need: Need) -> u32 {
        self.increase[need.index()]
    }

    pub fn decrease_amount(&self, need: Need) -> u32 {
        self.decrease[need.index()]
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn rate_vector(
    stage: LifeStage,
    kind: RateKind,
    rates: &[i32],
) -> Result<[u32; Need::COUNT], ConfigurationError> {
    if rates.len() != Need::COUNT {
        return Err(ConfigurationError::RateVectorLength {
            stage,
            kind,
            expected: Need::COUNT,
            actual: rates.len(),
        });
    }
    let mut out = [0u32; Need::COUNT];
    for (need, &value) in Need::ALL.iter().zip(rates) {
        out[need.index()] = u32::try_from(value).map_err(|_| ConfigurationError::NegativeRate {
            stage,
            kind,
            need: *need,
            value,
        })?;
    }
    Ok(out)
}

/// One row of a table as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub stage: LifeStage,
    pub increase: Vec<i32>,
    pub decrease: Vec<i32>,
    pub interval_ms: u64,
    /// Age (in pet years) at which the pet may enter this stage.
    #[serde(default)]
    pub promotion_age: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StageEntry {
    rates: StageRates,
    promotion_age: u64,
}

/// Rates and promotion ages for every life stage.
///
/// All lookups are total over `LifeStage × Need`; invalid tables are rejected
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeStageTable {
    entries: [StageEntry; LifeStage::COUNT],
}

impl Default for LifeStageTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl LifeStageTable {
    /// Build a table from one definition per stage, in any order.
    pub fn from_definitions(defs: &[StageDefinition]) -> Result<Self, ConfigurationError> {
        let mut slots: [Option<StageEntry>; LifeStage::COUNT] = [None, None, None];
        for def in defs {
            let slot = &mut slots[def.stage.index()];
            if slot.is_some() {
                return Err(ConfigurationError::DuplicateStage(def.stage));
            }
            let rates = StageRates::new(
                def.stage,
                &def.increase,
                &def.decrease,
                Duration::from_millis(def.interval_ms),
            )?;
            *slot = Some(StageEntry {
                rates,
                promotion_age: def.promotion_age,
            });
        }

        let [child, adult, senior] = slots;
        let child = child.ok_or(ConfigurationError::MissingStage(LifeStage::Child))?;
        let adult = adult.ok_or(ConfigurationError::MissingStage(LifeStage::Adult))?;
        let senior = senior.ok_or(ConfigurationError::MissingStage(LifeStage::Senior))?;
        Self::assemble([child, adult, senior])
    }

    fn assemble(mut entries: [StageEntry; LifeStage::COUNT]) -> Result<Self, ConfigurationError> {
        // The youngest stage is where every pet starts.
        entries[LifeStage::Child.index()].promotion_age = 0;

        for pair in LifeStage::ALL.windows(2) {
            let (previous, stage) = (pair[0], pair[1]);
            let previous_age = entries[previous.index()].promotion_age;
            let age = entries[stage.index()].promotion_age;
            if age <= previous_age {
                return Err(ConfigurationError::PromotionOrder {
                    stage,
                    age,
                    previous,
                    previous_age,
                });
            }
        }
        Ok(Self { entries })
    }

    /// The reference table: Child, then Adult at age 2, then Senior at age 5.
    pub fn standard() -> Self {
        let defs = Self::standard_definitions();
        // The reference rows are valid by construction; this cannot fail.
        match Self::from_definitions(&defs) {
            Ok(table) => table,
            Err(e) => unreachable!("reference life-stage table is invalid: {e}"),
        }
    }

    /// The reference table as plain definitions, e.g. to seed a config file.
    pub fn standard_definitions() -> Vec<StageDefinition> {
        vec![
            StageDefinition {
                stage: LifeStage::Child,
                increase: vec![10, 15, 8, 15],
                decrease: vec![8, 12, 5, 10],
                interval_ms: 5_000,
                promotion_age: 0,
            },
            StageDefinition {
                stage: LifeStage::Adult,
                increase: vec![10, 10, 5, 10],
                decrease: vec![10, 10, 5, 10],
                interval_ms: 5_000,
                promotion_age: 2,
            },
            StageDefinition {
                stage: LifeStage::Senior,
                increase: vec![5, 5, 5, 10],
                decrease: vec![8, 5, 5, 15],
                interval_ms: 8_000,
                promotion_age: 5,
            },
        ]
    }

    pub fn rates(&self, stage: LifeStage) -> &StageRates {
        &self.entries[stage.index()].rates
    }

    pub fn increase_amount(&self, stage: LifeStage, need: Need) -> u32 {
        self.rates(stage).increase_amount(need)
    }

    pub fn decrease_amount(&self, stage: LifeStage, need: Need) -> u32 {
        self.rates(stage).decrease_amount(need)
    }

    pub fn interval(&self, stage: LifeStage) -> Duration {
        self.rates(stage).interval()
    }

    /// Age required to enter `stage`. Zero for the youngest stage.
    pub fn promotion_age(&self, stage: LifeStage) -> u64 {
        self.entries[stage.index()].promotion_age
    }
}
