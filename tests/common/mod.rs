#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use climate_web::{
    http::{handlers, ScriptedTransport},
    indicator::LogIndicator,
    sensor::{Measurement, SensorPrimitive},
    Dispatcher, ManualClock, Sampler, Scheduler,
};

pub const INTERVAL: Duration = Duration::from_secs(2);

pub type Outcome = nb::Result<Measurement, &'static str>;

/// Sensor that plays back queued outcomes, then keeps answering "not yet".
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    script: Rc<RefCell<VecDeque<Outcome>>>,
    calls: Rc<Cell<u32>>,
}

impl ScriptedSensor {
    pub fn push(&self, outcome: Outcome) {
        self.script.borrow_mut().push_back(outcome);
    }

    pub fn succeed(&self, temperature: f32, humidity: f32) {
        self.push(Ok(Measurement {
            temperature,
            humidity,
        }));
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl SensorPrimitive for ScriptedSensor {
    type Error = &'static str;

    fn attempt_read(&mut self) -> Outcome {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(nb::Error::WouldBlock))
    }
}

pub type TestScheduler = Scheduler<ScriptedTransport, LogIndicator, ScriptedSensor, ManualClock>;

pub struct Harness {
    pub scheduler: TestScheduler,
    pub clock: ManualClock,
    pub sensor: ScriptedSensor,
}

impl Harness {
    pub fn new() -> Self {
        let clock = ManualClock::new();
        let sensor = ScriptedSensor::default();
        let sampler = Sampler::new(sensor.clone(), clock.clone(), INTERVAL);
        let routes = handlers::register_routes(sampler.handle()).expect("routes");
        let scheduler = Scheduler::new(
            ScriptedTransport::new(),
            Dispatcher::new(routes, LogIndicator::default()),
            sampler,
        )
        .with_yield(Duration::ZERO);

        Self {
            scheduler,
            clock,
            sensor,
        }
    }

    /// Queue `request`, run one tick and return the response body.
    pub fn request(&mut self, request: climate_web::http::Request) -> climate_web::http::Response {
        self.scheduler.transport_mut().push(request);
        self.scheduler.tick();
        self.scheduler
            .transport_mut()
            .last_response()
            .cloned()
            .expect("request was not answered")
    }
}
