//! # Tamago Engine
//!
//! Runs a pet over time. A [`PetEngine`] owns the pet's state and a [`Clock`];
//! the clock fires decay ticks at the active life stage's interval while the
//! owner calls [`PetEngine::interact`] from any thread.
//!
//! ## Concurrency
//!
//! All state sits behind one mutex. A decay tick and an interaction each hold
//! it for exactly one recompute, so observers never see half an update.
//! Observers can poll the query methods or [`subscribe`](PetEngine::subscribe)
//! to a watch channel of [`PetSnapshot`](tamago_core::PetSnapshot)s.
//!
//! ## Clocks
//!
//! - [`TokioClock`]: a background tokio task; works with paused test time
//! - [`ManualClock`]: advanced by hand, for deterministic tests and replays

mod clock;
mod engine;
mod manual;
mod state;

pub use clock::{Clock, ClockError, TickControl, TickHandler, TokioClock};
pub use engine::{EngineError, PetEngine};
pub use manual::ManualClock;
pub use state::{Outcome, PetState};
