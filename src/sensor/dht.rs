//! DHT22 (AM2302) single-wire humidity/temperature sensor.
//!
//! The wire transaction itself lives behind [`DhtBus`] so the cadence rules
//! and frame decoding here can run without hardware. The part needs about a
//! second after power-up before it answers, and two seconds between
//! conversions; calls that arrive too early answer `WouldBlock` without
//! touching the bus.

use std::time::Duration;

use crate::clock::Clock;

use super::{Measurement, SensorPrimitive};

/// Power-up settle time before the first transaction.
pub const WARM_UP: Duration = Duration::from_secs(1);
/// Minimum spacing between two conversions.
pub const MIN_PERIOD: Duration = Duration::from_secs(2);

/// A high pulse longer than this encodes a `1` bit (nominal 26-28 µs vs 70 µs).
pub const ONE_BIT_THRESHOLD_US: u32 = 50;

pub const FRAME_BITS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DhtError {
    #[error("sensor did not answer the start signal")]
    NoResponse,
    #[error("timed out waiting for bit {0}")]
    Timeout(usize),
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    Checksum { expected: u8, actual: u8 },
    #[error("reading out of range")]
    OutOfRange,
    #[error("gpio error {0}")]
    Gpio(i32),
}

/// Raw single-wire access: run one complete start-signal + 40-bit transaction.
///
/// Implementations must bound every wait; a transaction never takes more
/// than a few milliseconds.
pub trait DhtBus {
    fn transact(&mut self) -> Result<[u8; 5], DhtError>;
}

/// Pack 40 measured high-pulse widths (µs) into the five frame bytes, MSB first.
pub fn frame_from_pulses(pulses: &[u32; FRAME_BITS]) -> [u8; 5] {
    let mut frame = [0u8; 5];
    for (i, &width) in pulses.iter().enumerate() {
        if width > ONE_BIT_THRESHOLD_US {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    frame
}

/// Check and scale a raw frame: `[rh_hi, rh_lo, t_hi, t_lo, checksum]`.
///
/// Both values are tenths; the top bit of `t_hi` is the sign.
pub fn decode_frame(frame: &[u8; 5]) -> Result<Measurement, DhtError> {
    let expected = frame[..4]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    if expected != frame[4] {
        return Err(DhtError::Checksum {
            expected,
            actual: frame[4],
        });
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]) as f32 / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if !(0.0..=100.0).contains(&humidity) || !(-40.0..=80.0).contains(&temperature) {
        return Err(DhtError::OutOfRange);
    }

    Ok(Measurement {
        temperature,
        humidity,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    WarmingUp { since: Duration },
    Ready,
    Cooldown { since: Duration },
}

pub struct Dht22<B, C> {
    bus: B,
    clock: C,
    cadence: Cadence,
}

impl<B: DhtBus, C: Clock> Dht22<B, C> {
    pub fn new(bus: B, clock: C) -> Self {
        let since = clock.now();
        Self {
            bus,
            clock,
            cadence: Cadence::WarmingUp { since },
        }
    }

    fn is_ready(&mut self, now: Duration) -> bool {
        match self.cadence {
            Cadence::WarmingUp { since } if now.saturating_sub(since) < WARM_UP => false,
            Cadence::Cooldown { since } if now.saturating_sub(since) < MIN_PERIOD => false,
            _ => {
                self.cadence = Cadence::Ready;
                true
            }
        }
    }
}

impl<B: DhtBus, C: Clock> SensorPrimitive for Dht22<B, C> {
    type Error = DhtError;

    fn attempt_read(&mut self) -> nb::Result<Measurement, DhtError> {
        let now = self.clock.now();
        if !self.is_ready(now) {
            return Err(nb::Error::WouldBlock);
        }

        // a failed transaction still needs the full recovery period
        let frame = self.bus.transact();
        self.cadence = Cadence::Cooldown { since: now };
        Ok(decode_frame(&frame?)?)
    }
}
