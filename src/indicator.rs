//! Status light that is lit while a request handler runs.
//!
//! Purely for people looking at the board; nothing reads it back.

pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

/// Logs transitions instead of driving a pin.
#[derive(Debug, Default)]
pub struct LogIndicator {
    lit: bool,
}

impl StatusIndicator for LogIndicator {
    fn set(&mut self, on: bool) {
        if self.lit != on {
            log::trace!("status led {}", if on { "on" } else { "off" });
            self.lit = on;
        }
    }
}
