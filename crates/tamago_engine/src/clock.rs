//! Time sources for the decay cycle.
//!
//! A [`Clock`] runs one repeating task and reports elapsed time since it was
//! created. The engine owns its clock for its whole lifetime and stops it when
//! the pet dies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// What the clock should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    /// Keep ticking at a new period, starting one period from now.
    Reschedule(Duration),
    /// Stop ticking for good.
    Stop,
}

/// Callback run on every tick.
pub type TickHandler = Box<dyn FnMut() -> TickControl + Send + 'static>;

pub trait Clock: Send + Sync + 'static {
    /// Run `handler` after `initial_delay`, then every `interval`.
    ///
    /// Replaces any task scheduled earlier. Does nothing once stopped.
    fn schedule(&self, initial_delay: Duration, interval: Duration, handler: TickHandler);

    /// Monotonic time since the clock was created.
    fn elapsed(&self) -> Duration;

    /// Cancel the scheduled task. Idempotent.
    fn stop(&self);

    fn is_stopped(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("no tokio runtime is available to drive the clock: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// Shortest period a clock will tick at.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Clock backed by a background tokio task and `tokio::time`.
///
/// Uses `tokio::time::Instant`, so paused-time tests drive it deterministically.
pub struct TokioClock {
    started: Instant,
    handle: Handle,
    task: Mutex<Option<JoinHandle<()>>>,
    stopped: Arc<AtomicBool>,
}

impl TokioClock {
    /// Create a clock on the current tokio runtime.
    pub fn new() -> Result<Self, ClockError> {
        Ok(Self::with_handle(Handle::try_current()?))
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            started: Instant::now(),
            handle,
            task: Mutex::new(None),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Clock for TokioClock {
    fn schedule(&self, initial_delay: Duration, interval: Duration, mut handler: TickHandler) {
        if self.is_stopped() {
            tracing::debug!("Clock stopped, ignoring schedule request");
            return;
        }

        let stopped = Arc::clone(&self.stopped);
        let period = interval.max(MIN_PERIOD);

        let task = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if stopped.load(Ordering::Acquire) {
                    break;
                }

                match handler() {
                    TickControl::Continue => {}
                    TickControl::Reschedule(next) => {
                        let next = next.max(MIN_PERIOD);
                        tracing::debug!("Clock period changed to {:?}", next);
                        ticker = tokio::time::interval_at(Instant::now() + next, next);
                        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    }
                    TickControl::Stop => {
                        stopped.store(true, Ordering::Release);
                        tracing::info!("Clock stopped by its task");
                        break;
                    }
                }
            }
        });

        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
        tracing::info!("Clock stopped");
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counting_handler(count: Arc<AtomicUsize>, control: TickControl) -> TickHandler {
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            control
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_tracks_time() {
        let clock = TokioClock::new().unwrap();
        assert_eq!(clock.elapsed().as_secs(), 0);
        sleep(Duration::from_secs(3)).await;
        assert_eq!(clock.elapsed().as_secs(), 3);
        sleep(Duration::from_secs(3)).await;
        assert_eq!(clock.elapsed().as_secs(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_for_initial_delay() {
        let clock = TokioClock::new().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        clock.schedule(
            Duration::from_secs(2),
            Duration::from_secs(1),
            counting_handler(Arc::clone(&count), TickControl::Continue),
        );

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Ticks at 2s, 3s and 4s.
        sleep(Duration::from_millis(3_000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_halts_ticks() {
        let clock = TokioClock::new().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        clock.schedule(
            Duration::ZERO,
            Duration::from_secs(1),
            counting_handler(Arc::clone(&count), TickControl::Continue),
        );

        sleep(Duration::from_millis(1_500)).await;
        let before = count.load(Ordering::SeqCst);
        assert!(before > 0);

        clock.stop();
        clock.stop();
        assert!(clock.is_stopped());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_can_stop_clock() {
        let clock = TokioClock::new().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        clock.schedule(
            Duration::from_secs(1),
            Duration::from_secs(1),
            counting_handler(Arc::clone(&count), TickControl::Stop),
        );

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(clock.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_changes_period() {
        let clock = TokioClock::new().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        clock.schedule(
            Duration::from_secs(1),
            Duration::from_secs(1),
            Box::new(move || {
                if ticks.fetch_add(1, Ordering::SeqCst) == 0 {
                    TickControl::Reschedule(Duration::from_secs(10))
                } else {
                    TickControl::Continue
                }
            }),
        );

        // First tick at 1s, the next not before 11s.
        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_replaces_previous_task() {
        let clock = TokioClock::new().unwrap();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        clock.schedule(
            Duration::from_secs(1),
            Duration::from_secs(1),
            counting_handler(Arc::clone(&first), TickControl::Continue),
        );
        clock.schedule(
            Duration::from_secs(1),
            Duration::from_secs(1),
            counting_handler(Arc::clone(&second), TickControl::Continue),
        );

        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        assert!(matches!(TokioClock::new(), Err(ClockError::NoRuntime(_))));
    }
}
