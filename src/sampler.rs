//! Rate-limited polling of the sensor primitive.
//!
//! The sampler is the only writer of the current [`Reading`]. Request
//! handlers hold a [`ReadingHandle`], which can look but not touch.
//!
//! Both live on the serving thread: the slot is an `Rc<Cell<_>>`, so it can't
//! leave that thread, and a `Reading` is replaced as a whole value.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::clock::Clock;
use crate::sensor::SensorPrimitive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f32,
    pub humidity: f32,
    /// Time since boot of the conversion. `None` until the first success.
    pub sampled_at: Option<Duration>,
}

impl Reading {
    /// What handlers see before the sensor has ever answered.
    pub const UNAVAILABLE: Reading = Reading {
        temperature: 0.0,
        humidity: 0.0,
        sampled_at: None,
    };

    pub fn is_available(&self) -> bool {
        self.sampled_at.is_some()
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::UNAVAILABLE
    }
}

/// Read-only view of the current reading.
#[derive(Debug, Clone)]
pub struct ReadingHandle(Rc<Cell<Reading>>);

impl ReadingHandle {
    pub fn get(&self) -> Reading {
        self.0.get()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SamplerStats {
    pub attempts: u32,
    pub successes: u32,
    pub faults: u32,
}

pub struct Sampler<S, C> {
    sensor: S,
    clock: C,
    interval: Duration,
    last_attempt_at: Duration,
    current: Rc<Cell<Reading>>,
    stats: SamplerStats,
}

impl<S: SensorPrimitive, C: Clock> Sampler<S, C> {
    /// The first attempt is due one `interval` after construction.
    pub fn new(sensor: S, clock: C, interval: Duration) -> Self {
        let last_attempt_at = clock.now();
        Self {
            sensor,
            clock,
            interval,
            last_attempt_at,
            current: Rc::new(Cell::new(Reading::UNAVAILABLE)),
            stats: SamplerStats::default(),
        }
    }

    pub fn handle(&self) -> ReadingHandle {
        ReadingHandle(self.current.clone())
    }

    pub fn current(&self) -> Reading {
        self.current.get()
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Issue at most one read attempt per interval.
    ///
    /// Returns the new reading if this call produced one. An attempt that
    /// ends in "not yet" or a fault still uses up the interval.
    pub fn poll(&mut self) -> Option<Reading> {
        let now = self.clock.now();
        if now.saturating_sub(self.last_attempt_at) < self.interval {
            return None;
        }
        self.last_attempt_at = now;
        self.stats.attempts += 1;

        match self.sensor.attempt_read() {
            Ok(m) => {
                let reading = Reading {
                    temperature: m.temperature,
                    humidity: m.humidity,
                    sampled_at: Some(now),
                };
                self.current.set(reading);
                self.stats.successes += 1;
                log::debug!(
                    "sampled {:.1}°C {:.1}%RH at {:?}",
                    m.temperature,
                    m.humidity,
                    now
                );
                Some(reading)
            }
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(e)) => {
                self.stats.faults += 1;
                log::warn!("sensor read failed: {:?}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sensor::Measurement;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    type Script = Rc<RefCell<VecDeque<nb::Result<Measurement, &'static str>>>>;

    /// Plays back scripted outcomes and counts calls.
    struct Scripted {
        script: Script,
        calls: Rc<Cell<u32>>,
    }

    impl SensorPrimitive for Scripted {
        type Error = &'static str;

        fn attempt_read(&mut self) -> nb::Result<Measurement, &'static str> {
            self.calls.set(self.calls.get() + 1);
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(nb::Error::WouldBlock))
        }
    }

    fn m(temperature: f32, humidity: f32) -> Measurement {
        Measurement {
            temperature,
            humidity,
        }
    }

    fn sampler(
        outcomes: Vec<nb::Result<Measurement, &'static str>>,
    ) -> (Sampler<Scripted, ManualClock>, ManualClock, Rc<Cell<u32>>) {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let sensor = Scripted {
            script: Rc::new(RefCell::new(outcomes.into())),
            calls: calls.clone(),
        };
        let sampler = Sampler::new(sensor, clock.clone(), Duration::from_secs(2));
        (sampler, clock, calls)
    }

    #[test]
    fn test_not_due_has_no_side_effect() {
        let (mut sampler, clock, calls) = sampler(vec![Ok(m(20.0, 40.0))]);
        clock.advance(Duration::from_millis(1999));
        assert_eq!(sampler.poll(), None);
        assert_eq!(calls.get(), 0);
        assert_eq!(sampler.current(), Reading::UNAVAILABLE);
    }

    #[test]
    fn test_success_publishes() {
        let (mut sampler, clock, _) = sampler(vec![Ok(m(22.5, 48.0))]);
        let handle = sampler.handle();
        assert!(!handle.get().is_available());
        clock.advance(Duration::from_secs(2));

        let reading = sampler.poll().unwrap();
        assert_eq!(reading.temperature, 22.5);
        assert_eq!(reading.humidity, 48.0);
        assert_eq!(reading.sampled_at, Some(Duration::from_secs(2)));
        assert_eq!(handle.get(), reading);
        assert!(handle.get().is_available());
    }

    #[test]
    fn test_not_yet_consumes_interval() {
        let (mut sampler, clock, calls) =
            sampler(vec![Err(nb::Error::WouldBlock), Ok(m(21.0, 50.0))]);
        clock.advance(Duration::from_secs(2));
        assert_eq!(sampler.poll(), None);
        assert_eq!(calls.get(), 1);

        // no immediate retry
        clock.advance(Duration::from_secs(1));
        assert_eq!(sampler.poll(), None);
        assert_eq!(calls.get(), 1);

        clock.advance(Duration::from_secs(1));
        assert!(sampler.poll().is_some());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_fault_keeps_last_good() {
        let (mut sampler, clock, _) =
            sampler(vec![Ok(m(19.5, 60.0)), Err(nb::Error::Other("checksum"))]);
        clock.advance(Duration::from_secs(2));
        let good = sampler.poll().unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(sampler.poll(), None);
        assert_eq!(sampler.current(), good);
        assert_eq!(
            sampler.stats(),
            SamplerStats {
                attempts: 2,
                successes: 1,
                faults: 1
            }
        );
    }

    #[test]
    fn test_interval_measured_from_attempt() {
        let (mut sampler, clock, calls) = sampler(vec![]);
        // late poll: the next one is due an interval after *this* attempt
        clock.advance(Duration::from_millis(3500));
        sampler.poll();
        clock.advance(Duration::from_millis(1999));
        sampler.poll();
        assert_eq!(calls.get(), 1);
        clock.advance(Duration::from_millis(1));
        sampler.poll();
        assert_eq!(calls.get(), 2);
    }
}
