//! Hardware implementations of the core capability traits.
//!
//! Each submodule adapts one embassy-stm32 peripheral to the narrow
//! interface `node-core` expects: backup registers, the sensor I2C bus, the
//! RTC calendar, the USART console, the status LED, and the wakeup timer +
//! STOP-mode entry.

pub mod backup;
pub mod bus;
pub mod clock;
pub mod console;
pub mod indicator;
pub mod lowpower;
