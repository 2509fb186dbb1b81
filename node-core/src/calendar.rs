//! Calendar time as reported in wake banners.
//!
//! The node timestamps every wake report with wall-clock time read from a
//! battery-backed RTC. The core only needs a broken-down value and a fixed
//! `YYYY-MM-DD HH:MM:SS` rendering; everything about shadow registers and
//! BCD conversion stays behind the [`Calendar`] capability.

use core::fmt;

/// Broken-down calendar date and time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Creates a new timestamp from its components.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Source of wall-clock time for wake reports.
pub trait Calendar {
    /// Returns the current calendar date and time.
    fn now(&mut self) -> DateTime;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded_timestamp() {
        let stamp = DateTime::new(2025, 3, 7, 9, 4, 5);
        let mut rendered = heapless::String::<24>::new();
        core::fmt::write(&mut rendered, format_args!("{stamp}")).unwrap();
        assert_eq!(rendered.as_str(), "2025-03-07 09:04:05");
    }
}
