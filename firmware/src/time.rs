//! Monotonic instant bridging `embassy-time` and the core's deadline math.
//!
//! The core tracks deadlines through a generic instant bounded by
//! `Add<core::time::Duration>`; Embassy's `Instant` only adds its own
//! duration type, so this newtype adapts between the two.

#![allow(dead_code)]

use core::ops::Add;
use core::time::Duration;

use embassy_time::Instant;

/// Firmware-side instant used by the node controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct NodeInstant(Instant);

impl NodeInstant {
    /// Captures the current monotonic time.
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Unwraps the underlying Embassy instant.
    pub const fn into_embassy(self) -> Instant {
        self.0
    }
}

impl From<Instant> for NodeInstant {
    fn from(value: Instant) -> Self {
        Self(value)
    }
}

impl Add<Duration> for NodeInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Self(self.0 + embassy_time::Duration::from_micros(micros))
    }
}
