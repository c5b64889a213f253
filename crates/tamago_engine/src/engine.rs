//! PetEngine: the single owner of a pet's state and its clock.
//!
//! The engine:
//! - Holds the `PetState` behind one mutex, so decay ticks and interactions
//!   never interleave mid-recompute
//! - Schedules decay on its clock at the active stage's interval
//! - Stops the clock when the pet dies
//! - Publishes a fresh snapshot after every recompute

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tamago_core::{
    ConfigurationError, Health, InteractionError, LifeStage, Mood, Need, NeedLevels, PetConfig,
    PetSnapshot,
};
use thiserror::Error;
use tokio::sync::watch;

use crate::clock::{Clock, ClockError, TickControl, TokioClock};
use crate::state::{Outcome, PetState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Clock(#[from] ClockError),
}

struct Inner<C: Clock> {
    state: Mutex<PetState>,
    clock: Arc<C>,
    /// Elapsed clock time that makes one pet year.
    year: Duration,
    snapshot_tx: watch::Sender<PetSnapshot>,
}

impl<C: Clock> Inner<C> {
    fn lock(&self) -> MutexGuard<'_, PetState> {
        // A panic elsewhere must not take the decay task down with it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn age(&self) -> u64 {
        (self.clock.elapsed().as_millis() / self.year.as_millis()) as u64
    }

    fn publish(&self, state: &PetState, age: u64) {
        self.snapshot_tx.send_replace(state.snapshot(age));
    }

    /// One decay tick. Runs on the clock's task.
    fn on_tick(&self) -> TickControl {
        let mut state = self.lock();
        let age = self.age();
        let outcome = state.decay(age);
        self.publish(&state, age);

        if outcome.died {
            TickControl::Stop
        } else if outcome.promoted.is_some() {
            TickControl::Reschedule(state.decay_interval())
        } else {
            TickControl::Continue
        }
    }
}

impl<C: Clock> Drop for Inner<C> {
    fn drop(&mut self) {
        self.clock.stop();
    }
}

/// A live pet. Cheap to clone; all clones share one state and one clock.
pub struct PetEngine<C: Clock = TokioClock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> Clone for PetEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl PetEngine<TokioClock> {
    /// Create a pet on the current tokio runtime.
    pub fn spawn(config: &PetConfig) -> Result<Self, EngineError> {
        let clock = Arc::new(TokioClock::new()?);
        Ok(Self::new(config, clock)?)
    }
}

impl<C: Clock> PetEngine<C> {
    /// Create a pet and start its decay cycle on `clock`.
    pub fn new(config: &PetConfig, clock: Arc<C>) -> Result<Self, ConfigurationError> {
        let table = config.life_stage_table()?;
        let year = config.year()?;
        let state = PetState::new(config.name.clone(), table, config.death_policy);
        let (snapshot_tx, _) = watch::channel(state.snapshot(0));

        let inner = Arc::new(Inner {
            state: Mutex::new(state),
            clock,
            year,
            snapshot_tx,
        });
        let engine = Self { inner };

        let interval = engine.inner.lock().decay_interval();
        engine.schedule_decay(config.initial_delay(), interval);
        tracing::info!(
            name = %config.name,
            policy = ?config.death_policy,
            ?interval,
            "Pet created"
        );
        Ok(engine)
    }

    fn schedule_decay(&self, initial_delay: Duration, interval: Duration) {
        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        self.inner.clock.schedule(
            initial_delay,
            interval,
            Box::new(move || match weak.upgrade() {
                Some(inner) => inner.on_tick(),
                None => TickControl::Stop,
            }),
        );
    }

    /// Act on a recompute that happened outside the clock's task.
    fn settle(&self, outcome: Outcome, interval: Duration) {
        if outcome.died {
            self.inner.clock.stop();
        } else if outcome.promoted.is_some() {
            self.schedule_decay(interval, interval);
        }
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Restore one need by the active stage's increase rate.
    ///
    /// Fails if the pet is dead or the need is already full; state is left
    /// untouched in both cases.
    pub fn interact(&self, need: Need) -> Result<(), InteractionError> {
        let (outcome, interval) = {
            let mut state = self.inner.lock();
            let age = self.inner.age();
            let outcome = state.interact(need, age)?;
            self.inner.publish(&state, age);
            (outcome, state.decay_interval())
        };
        self.settle(outcome, interval);
        Ok(())
    }

    /// Like [`interact`](Self::interact), naming the need as text
    /// (`"hunger"`, `"feed"`, ...). A dead pet reports `Dead` before the name
    /// is looked at.
    pub fn interact_named(&self, need: &str) -> Result<(), InteractionError> {
        if !self.is_alive() {
            return Err(InteractionError::Dead);
        }
        self.interact(need.parse()?)
    }

    /// Rename the pet; allowed until the first interaction.
    pub fn set_name(&self, name: &str) -> Result<(), InteractionError> {
        let mut state = self.inner.lock();
        state.set_name(name)?;
        let age = self.inner.age();
        self.inner.publish(&state, age);
        Ok(())
    }

    /// Toggle decay suspension. Returns whether decay is now paused.
    ///
    /// Time and age keep running while paused; only the ticks are skipped.
    pub fn pause_clock(&self) -> bool {
        let mut state = self.inner.lock();
        let paused = state.toggle_pause();
        let age = self.inner.age();
        self.inner.publish(&state, age);
        tracing::info!(paused, "Decay pause toggled");
        paused
    }

    /// Stop the decay clock without killing the pet.
    pub fn shutdown(&self) {
        self.inner.clock.stop();
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    pub fn name(&self) -> String {
        self.inner.lock().name().to_string()
    }

    /// Age in pet years.
    pub fn age(&self) -> u64 {
        self.inner.age()
    }

    pub fn mood(&self) -> Mood {
        self.inner.lock().mood()
    }

    pub fn health(&self) -> Health {
        self.inner.lock().health()
    }

    pub fn health_score(&self) -> u8 {
        self.inner.lock().health_score()
    }

    pub fn life_stage(&self) -> LifeStage {
        self.inner.lock().life_stage()
    }

    /// A copy of the current need levels.
    pub fn needs(&self) -> NeedLevels {
        self.inner.lock().needs()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.lock().is_alive()
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().is_paused()
    }

    /// Everything at once, taken under a single lock.
    pub fn snapshot(&self) -> PetSnapshot {
        let state = self.inner.lock();
        state.snapshot(self.inner.age())
    }

    /// Receive a snapshot after every recompute.
    pub fn subscribe(&self) -> watch::Receiver<PetSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::ManualClock;
    use tamago_core::{DeathPolicy, LifeStageTable};

    fn manual_engine(config: &PetConfig) -> (PetEngine<ManualClock>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let engine = PetEngine::new(config, Arc::clone(&clock)).unwrap();
        (engine, clock)
    }

    #[test]
    fn test_engine_creation() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        assert_eq!(engine.name(), "Tamago");
        assert_eq!(engine.mood(), Mood::Happy);
        assert_eq!(engine.health(), Health::Healthy);
        assert_eq!(engine.life_stage(), LifeStage::Child);
        assert_eq!(engine.needs(), NeedLevels::full());
        assert_eq!(engine.age(), 0);
        assert_eq!(clock.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_first_tick_after_initial_delay() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        assert_eq!(clock.advance(Duration::from_millis(1_999)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
        assert_eq!(engine.needs().get(Need::Hunger), 92);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut defs = LifeStageTable::standard_definitions();
        defs[1].decrease = vec![1, 2];
        let config = PetConfig {
            stages: Some(defs),
            ..PetConfig::default()
        };
        let clock = Arc::new(ManualClock::new());
        assert!(matches!(
            PetEngine::new(&config, clock),
            Err(ConfigurationError::RateVectorLength { .. })
        ));
    }

    #[test]
    fn test_needs_is_a_copy() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        let mut copy = engine.needs();
        copy.set(Need::Hunger, 0);
        assert_eq!(engine.needs(), NeedLevels::full());
        clock.tick();
        assert_eq!(engine.needs().get(Need::Hunger), 92);
    }

    #[test]
    fn test_death_stops_clock() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        // Child Social drops 12 per tick: 100 -> 4 after 8 ticks, 0 on the 9th.
        for _ in 0..8 {
            assert!(clock.tick());
        }
        assert!(engine.is_alive());
        assert!(clock.tick());
        assert!(!engine.is_alive());
        assert_eq!(engine.health(), Health::Dead);
        assert!(clock.is_stopped());
        assert!(!clock.tick());
        assert_eq!(engine.interact(Need::Social), Err(InteractionError::Dead));
    }

    #[test]
    fn test_dead_pet_reports_dead_before_unknown_need() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        assert_eq!(
            engine.interact_named("juggle"),
            Err(InteractionError::InvalidNeed("juggle".to_string()))
        );
        for _ in 0..9 {
            clock.tick();
        }
        assert!(!engine.is_alive());
        assert_eq!(engine.interact_named("juggle"), Err(InteractionError::Dead));
        assert_eq!(engine.interact_named("feed"), Err(InteractionError::Dead));
    }

    #[test]
    fn test_mean_policy_keeps_pet_alive_longer() {
        let config = PetConfig {
            death_policy: DeathPolicy::MeanDepleted,
            ..PetConfig::default()
        };
        let (engine, clock) = manual_engine(&config);
        for _ in 0..9 {
            clock.tick();
        }
        assert_eq!(engine.needs().get(Need::Social), 0);
        assert!(engine.is_alive());
        assert_eq!(engine.health(), Health::Sick);
        assert_eq!(engine.mood(), Mood::Sad);
    }

    #[test]
    fn test_pause_toggles() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        assert!(engine.pause_clock());
        assert!(engine.is_paused());
        clock.advance(Duration::from_secs(30));
        assert_eq!(engine.needs(), NeedLevels::full());
        assert!(!engine.pause_clock());
        clock.advance(Duration::from_secs(5));
        assert_ne!(engine.needs(), NeedLevels::full());
    }

    fn slow_adult_config() -> PetConfig {
        let mut defs = LifeStageTable::standard_definitions();
        defs[1].interval_ms = 7_000;
        PetConfig {
            stages: Some(defs),
            ..PetConfig::default()
        }
    }

    fn care_for<C: Clock>(engine: &PetEngine<C>) {
        for need in Need::ALL {
            while !engine.needs().is_full(need) {
                engine.interact(need).unwrap();
            }
        }
    }

    #[test]
    fn test_promotion_on_tick_reschedules_decay() {
        let (engine, clock) = manual_engine(&slow_adult_config());

        // Ticks land at 2s, 7s, ..., 112s; top everything up after each.
        for _ in 0..23 {
            clock.advance(Duration::from_secs(5));
            care_for(&engine);
        }
        // Tick at 117s: still age 1.
        clock.advance(Duration::from_secs(5));
        assert_eq!(engine.life_stage(), LifeStage::Child);

        // Tick at 122s: age 2 and every need still at 75 or more.
        clock.advance(Duration::from_secs(2));
        assert_eq!(engine.needs().as_array(), [84, 76, 90, 80]);
        assert_eq!(engine.mood(), Mood::Happy);
        assert_eq!(engine.life_stage(), LifeStage::Adult);
        assert_eq!(clock.interval(), Duration::from_secs(7));

        assert_eq!(clock.advance(Duration::from_secs(6)), 0);
        assert_eq!(clock.advance(Duration::from_secs(1)), 1);
    }

    #[test]
    fn test_promotion_on_interaction_reschedules_decay() {
        let (engine, clock) = manual_engine(&slow_adult_config());

        engine.pause_clock();
        clock.advance(Duration::from_secs(110));
        engine.pause_clock();
        for _ in 0..3 {
            clock.tick();
        }
        assert_eq!(engine.needs().as_array(), [76, 64, 85, 70]);
        assert_eq!(engine.mood(), Mood::Bored);
        assert_eq!(engine.life_stage(), LifeStage::Child);

        engine.pause_clock();
        clock.advance(Duration::from_secs(20));
        assert_eq!(engine.age(), 2);

        engine.interact(Need::Social).unwrap();
        assert_eq!(engine.mood(), Mood::Tired);
        assert_eq!(engine.life_stage(), LifeStage::Child);

        engine.interact(Need::Energy).unwrap();
        assert_eq!(engine.mood(), Mood::Happy);
        assert_eq!(engine.life_stage(), LifeStage::Adult);
        assert_eq!(clock.interval(), Duration::from_secs(7));
    }

    #[test]
    fn test_shutdown_stops_clock_but_not_pet() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        engine.shutdown();
        engine.shutdown();
        assert!(clock.is_stopped());
        assert!(engine.is_alive());
    }

    #[test]
    fn test_dropping_engine_stops_clock() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        drop(engine);
        assert!(clock.is_stopped());
    }

    #[test]
    fn test_subscribe_sees_recompute() {
        let (engine, clock) = manual_engine(&PetConfig::default());
        let mut rx = engine.subscribe();
        clock.tick();
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.needs.get(Need::Hunger), 92);
        assert_eq!(snapshot, PetSnapshot { taken_at: snapshot.taken_at, ..engine.snapshot() });
    }
}
