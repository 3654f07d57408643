//! Monotonic time since boot.
//!
//! Everything in the serving loop measures time as a [`Duration`] since the
//! clock was created, so tests can drive the loop with [`ManualClock`]
//! instead of sleeping.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Time elapsed since the clock started.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]. On ESP-IDF this is `esp_timer` underneath.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    boot: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.boot.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[test]
fn test_manual_clock_shared_between_clones() {
    let clock = ManualClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_millis(1500));
    assert_eq!(other.now(), Duration::from_millis(1500));
    other.set(Duration::from_secs(10));
    assert_eq!(clock.now(), Duration::from_secs(10));
}
