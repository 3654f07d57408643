use esp_idf_svc::hal::{
    gpio::{Output, OutputPin, PinDriver},
    peripheral::Peripheral,
};

use climate_web::indicator::StatusIndicator;

pub struct StatusLed<'d, P: OutputPin> {
    pin: PinDriver<'d, P, Output>,
}

impl<'d, P: OutputPin> StatusLed<'d, P> {
    pub fn new(pin: impl Peripheral<P = P> + 'd) -> anyhow::Result<Self> {
        let mut pin = PinDriver::output(pin)?;
        pin.set_low()?;
        Ok(Self { pin })
    }
}

impl<P: OutputPin> StatusIndicator for StatusLed<'_, P> {
    fn set(&mut self, on: bool) {
        let r = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = r {
            log::warn!("Failed to drive status LED: {:?}", e);
        }
    }
}
