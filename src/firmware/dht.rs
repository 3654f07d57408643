//! Bit-banged DHT22 transaction on an open-drain GPIO.

use esp_idf_svc::hal::{
    delay::Ets,
    gpio::{IOPin, InputOutput, Level, PinDriver, Pull},
    interrupt,
    peripheral::Peripheral,
};
use esp_idf_svc::sys::{esp_timer_get_time, EspError};

use climate_web::sensor::dht::{frame_from_pulses, DhtBus, DhtError, FRAME_BITS};

/// Host start pulse. The datasheet asks for at least 1 ms.
const START_LOW_US: u32 = 1_100;
/// Longest any single level lasts in a healthy transaction is ~80 µs.
const EDGE_TIMEOUT_US: i64 = 100;

fn gpio(e: EspError) -> DhtError {
    DhtError::Gpio(e.code())
}

pub struct DhtPin<'d, P: IOPin> {
    pin: PinDriver<'d, P, InputOutput>,
}

impl<'d, P: IOPin> DhtPin<'d, P> {
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        Ok(Self { pin })
    }

    /// Microseconds the line stayed at `level`, or `None` past the timeout.
    fn hold_time(&self, level: Level) -> Option<u32> {
        let start = unsafe { esp_timer_get_time() };
        loop {
            let elapsed = unsafe { esp_timer_get_time() } - start;
            if self.pin.get_level() != level {
                return Some(elapsed as u32);
            }
            if elapsed > EDGE_TIMEOUT_US {
                return None;
            }
        }
    }
}

impl<P: IOPin> DhtBus for DhtPin<'_, P> {
    fn transact(&mut self) -> Result<[u8; 5], DhtError> {
        self.pin.set_low().map_err(gpio)?;
        Ets::delay_us(START_LOW_US);

        // the rest is timing critical, ~5 ms
        interrupt::free(|| {
            self.pin.set_high().map_err(gpio)?;

            // sensor answers with 80 µs low, 80 µs high
            self.hold_time(Level::High).ok_or(DhtError::NoResponse)?;
            self.hold_time(Level::Low).ok_or(DhtError::NoResponse)?;
            self.hold_time(Level::High).ok_or(DhtError::NoResponse)?;

            // each bit: 50 µs low, then a high whose width is the value
            let mut pulses = [0u32; FRAME_BITS];
            for (i, width) in pulses.iter_mut().enumerate() {
                self.hold_time(Level::Low).ok_or(DhtError::Timeout(i))?;
                *width = self.hold_time(Level::High).ok_or(DhtError::Timeout(i))?;
            }
            Ok(frame_from_pulses(&pulses))
        })
    }
}
