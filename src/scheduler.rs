//! The serving loop.
//!
//! One thread, no preemption. Every tick services at most one request, then
//! gives the sampler a chance, then yields briefly. Handlers run before the
//! sampler within a tick, so they always see the reading published by an
//! earlier tick.

use std::time::Duration;

use crate::clock::Clock;
use crate::dispatch::{Dispatcher, Outcome};
use crate::http::Transport;
use crate::indicator::StatusIndicator;
use crate::sampler::{Reading, Sampler};
use crate::sensor::SensorPrimitive;

/// Pause at the end of each tick so lower priority tasks get to run.
pub const DEFAULT_YIELD: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub outcome: Outcome,
    /// Set when the sampler published a new reading this tick.
    pub reading: Option<Reading>,
}

pub struct Scheduler<T, I, S, C> {
    transport: T,
    dispatcher: Dispatcher<I>,
    sampler: Sampler<S, C>,
    yield_for: Duration,
}

impl<T, I, S, C> Scheduler<T, I, S, C>
where
    T: Transport,
    I: StatusIndicator,
    S: SensorPrimitive,
    C: Clock,
{
    pub fn new(transport: T, dispatcher: Dispatcher<I>, sampler: Sampler<S, C>) -> Self {
        Self {
            transport,
            dispatcher,
            sampler,
            yield_for: DEFAULT_YIELD,
        }
    }

    pub fn with_yield(mut self, yield_for: Duration) -> Self {
        self.yield_for = yield_for;
        self
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sampler(&self) -> &Sampler<S, C> {
        &self.sampler
    }

    /// One pass: dispatch, then sample. Never waits on the network.
    pub fn tick(&mut self) -> TickReport {
        let outcome = self.dispatcher.dispatch(&mut self.transport);
        let reading = self.sampler.poll();
        TickReport { outcome, reading }
    }

    /// Serve forever.
    pub fn run(mut self) -> ! {
        log::info!(
            "Serving, sampling every {:?}, yielding {:?} per tick",
            self.sampler.interval(),
            self.yield_for
        );
        loop {
            self.tick();
            std::thread::sleep(self.yield_for);
        }
    }
}
