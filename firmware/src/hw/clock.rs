//! RTC calendar readout for wake-report timestamps.

use embassy_stm32::rtc::Rtc;
use node_core::calendar::{Calendar, DateTime};

/// Wraps the RTC driver; shadow-register consistency is handled inside it.
pub struct RtcCalendar {
    rtc: Rtc,
}

impl RtcCalendar {
    /// Takes ownership of the configured RTC driver.
    pub fn new(rtc: Rtc) -> Self {
        Self { rtc }
    }
}

impl Calendar for RtcCalendar {
    fn now(&mut self) -> DateTime {
        match self.rtc.now() {
            Ok(now) => DateTime::new(
                now.year(),
                now.month(),
                now.day(),
                now.hour(),
                now.minute(),
                now.second(),
            ),
            // An unset clock still produces a well-formed timestamp.
            Err(_) => DateTime::new(2000, 1, 1, 0, 0, 0),
        }
    }
}
