//! # Tamago Core
//!
//! Data model and pure care rules for a virtual pet whose well-being is a set of
//! four decaying needs.
//!
//! - [`Need`] / [`NeedLevels`]: the four fixed need categories and their bounded levels
//! - [`Mood`] / [`Health`]: states derived from the need levels on every update
//! - [`LifeStageTable`]: per-stage increase/decrease rates and decay intervals
//! - [`rules`]: the recompute step shared by interactions and decay ticks
//!
//! Nothing in this crate knows about time sources or threads; the engine crate
//! owns the clock and the locking.

pub mod config;
pub mod error;
pub mod mood;
pub mod need;
pub mod rules;
pub mod snapshot;
pub mod stage;

pub use config::PetConfig;
pub use error::{ConfigurationError, InteractionError, RateKind};
pub use mood::{Health, Mood};
pub use need::{Need, NeedLevels, MAX_LEVEL, MIN_LEVEL};
pub use rules::{Assessment, DeathPolicy};
pub use snapshot::PetSnapshot;
pub use stage::{LifeStage, LifeStageTable, StageDefinition, StageRates};
