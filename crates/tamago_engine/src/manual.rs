//! Deterministic clock driven by the caller.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::clock::{Clock, TickControl, TickHandler};

/// A clock whose time only moves when told to.
///
/// [`advance`](ManualClock::advance) moves time forward and fires every tick
/// that falls due on the way; [`tick`](ManualClock::tick) fires the handler
/// once without touching time. The handler never runs while the clock's own
/// lock is held, so it may query [`elapsed`](Clock::elapsed).
#[derive(Default)]
pub struct ManualClock {
    inner: Mutex<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    elapsed: Duration,
    interval: Duration,
    next_due: Duration,
    handler: Option<TickHandler>,
    /// Bumped on every `schedule` so a handler running while it is replaced is dropped.
    generation: u64,
    stopped: bool,
    fired: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire the scheduled handler once, right now. Returns whether it ran.
    pub fn tick(&self) -> bool {
        let (mut handler, generation) = {
            let mut inner = self.lock();
            if inner.stopped {
                return false;
            }
            match inner.handler.take() {
                Some(h) => (h, inner.generation),
                None => return false,
            }
        };

        let control = handler();

        let mut inner = self.lock();
        inner.fired += 1;
        if inner.generation != generation || inner.stopped {
            return true;
        }
        match control {
            TickControl::Continue => inner.handler = Some(handler),
            TickControl::Reschedule(next) => {
                inner.interval = next;
                inner.next_due = inner.elapsed + next;
                inner.handler = Some(handler);
            }
            TickControl::Stop => inner.stopped = true,
        }
        true
    }

    /// Move time forward by `by`, firing each tick that falls due.
    /// Returns how many ticks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().elapsed + by;
        let mut fired = 0;
        loop {
            {
                let mut inner = self.lock();
                let idle = inner.stopped || inner.handler.is_none() || inner.interval.is_zero();
                if idle || inner.next_due > target {
                    inner.elapsed = target;
                    break;
                }
                inner.elapsed = inner.next_due;
                let interval = inner.interval;
                inner.next_due += interval;
            }
            if self.tick() {
                fired += 1;
            }
        }
        fired
    }

    /// Total handler runs so far.
    pub fn ticks_fired(&self) -> u64 {
        self.lock().fired
    }

    /// The period the current task ticks at.
    pub fn interval(&self) -> Duration {
        self.lock().interval
    }
}

impl Clock for ManualClock {
    fn schedule(&self, initial_delay: Duration, interval: Duration, handler: TickHandler) {
        let mut inner = self.lock();
        if inner.stopped {
            return;
        }
        inner.generation += 1;
        inner.interval = interval;
        inner.next_due = inner.elapsed + initial_delay;
        inner.handler = Some(handler);
    }

    fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn stop(&self) {
        let mut inner = self.lock();
        inner.stopped = true;
        inner.handler = None;
    }

    fn is_stopped(&self) -> bool {
        self.lock().stopped
    }
}
