//! Time sources for measuring iterations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source
///
/// `now` returns the time elapsed since an arbitrary fixed origin. Only the
/// difference between two readings is meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
///
/// Useful for hosts and tests that need exact, reproducible timings: share it
/// behind an [`Arc`] and advance it from inside the test body.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Running measurement against a [`Clock`]
pub struct Stopwatch<'c, C: Clock + ?Sized> {
    clock: &'c C,
    started: Duration,
}

impl<'c, C: Clock + ?Sized> Stopwatch<'c, C> {
    /// Start measuring now
    pub fn start(clock: &'c C) -> Self {
        Self {
            started: clock.now(),
            clock,
        }
    }

    /// Stop and return the measured interval
    pub fn stop(self) -> Duration {
        self.clock.now().saturating_sub(self.started)
    }
}
