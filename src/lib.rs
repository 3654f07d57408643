//! Tiny HTTP API for an ESP32 with a DHT22 attached.
//!
//! A single cooperative loop ([`scheduler::Scheduler`]) answers one HTTP
//! request per tick and polls the sensor through a rate-limited
//! [`sampler::Sampler`]; handlers read the last published
//! [`sampler::Reading`] and never wait on the sensor.
//!
//! Everything here runs on the host as well; the board-specific glue lives
//! in the binary.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod indicator;
pub mod sampler;
pub mod scheduler;
pub mod sensor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use dispatch::{Dispatcher, Outcome};
pub use sampler::{Reading, ReadingHandle, Sampler};
pub use scheduler::{Scheduler, TickReport};
