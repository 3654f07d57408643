//! Humidity/temperature sensor primitives.
//!
//! A primitive is polled, never waited on. Each call either produces a full
//! measurement, reports that the acquisition is still in progress
//! (`nb::Error::WouldBlock`), or reports a transient fault. How many calls an
//! acquisition takes is the primitive's own business.

use std::convert::Infallible;

pub mod dht;
pub mod simulated;

pub use dht::{Dht22, DhtBus, DhtError};
pub use simulated::SimulatedSensor;

/// One complete temperature/humidity conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
}

pub trait SensorPrimitive {
    type Error: std::fmt::Debug;

    /// Advance the acquisition by one step.
    ///
    /// - `Ok(m)`: a complete reading was produced on this call
    /// - `Err(nb::Error::WouldBlock)`: nothing yet, call again later
    /// - `Err(nb::Error::Other(e))`: transient fault, the attempt is lost
    fn attempt_read(&mut self) -> nb::Result<Measurement, Self::Error>;
}

/// Board without a sensor fitted. Never produces a reading.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSensor;

impl SensorPrimitive for NoSensor {
    type Error = Infallible;

    fn attempt_read(&mut self) -> nb::Result<Measurement, Self::Error> {
        Err(nb::Error::WouldBlock)
    }
}
