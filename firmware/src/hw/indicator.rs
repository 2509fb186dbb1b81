//! Activity LED on PA5.

use embassy_stm32::gpio::Output;
use node_core::power::Indicator;

/// Push-pull output driving the status LED.
pub struct StatusLed {
    pin: Output<'static>,
}

impl StatusLed {
    /// Wraps the configured output pin.
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl Indicator for StatusLed {
    fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
