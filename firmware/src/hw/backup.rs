//! RTC backup registers as the persistent configuration backing.
//!
//! The backup domain survives STOP mode and VDD loss as long as VBAT is
//! present. Writes require the DBP bit in PWR_CR; the store brackets every
//! write with unlock/lock, so the domain is never left open between writes.

use embassy_stm32::pac::{PWR, RTC};
use node_core::config::{BackupStore, Slot};

/// Backup registers DR0..DR3 hold the marker, wake count, and intervals.
pub struct BackupRegisters;

impl BackupRegisters {
    /// Creates the register-file handle.
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BackupRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStore for BackupRegisters {
    fn unlock(&mut self) {
        PWR.cr().modify(|w| w.set_dbp(true));
    }

    fn lock(&mut self) {
        PWR.cr().modify(|w| w.set_dbp(false));
    }

    fn read(&self, slot: Slot) -> u32 {
        RTC.bkpr(slot.index()).read().bkp()
    }

    fn write(&mut self, slot: Slot, value: u32) {
        RTC.bkpr(slot.index()).write(|w| w.set_bkp(value));
    }
}
