//! Wakeup timer programming and STOP-mode entry.
//!
//! The wake timer runs from the LSE through the fixed /16 prescaler
//! (2048 Hz), matching the tick formula in `node-core::power`. STOP mode
//! with the low-power regulator retains RAM and peripheral state; the WFI
//! returns once the wakeup timer or another qualifying EXTI line fires.

use cortex_m::asm;
use cortex_m::peripheral::SCB;
use embassy_stm32::pac;
use embassy_stm32::pac::{PWR, RTC, TIM3};
use node_core::power::{SleepControl, TimeKeeper};

use crate::time::NodeInstant;

/// Monotonic time source; parks the time-driver timer across retention.
pub struct TickKeeper;

impl TimeKeeper for TickKeeper {
    type Instant = NodeInstant;

    fn now(&mut self) -> NodeInstant {
        NodeInstant::now()
    }

    fn suspend_ticks(&mut self) {
        // The embassy time driver counts on TIM3; it must not run in STOP.
        TIM3.cr1().modify(|w| w.set_cen(false));
    }

    fn resume_ticks(&mut self) {
        TIM3.cr1().modify(|w| w.set_cen(true));
    }
}

/// RTC wakeup timer plus the low-power halt primitive.
pub struct StopControl {
    scb: SCB,
}

impl StopControl {
    /// Takes the system control block for SLEEPDEEP management.
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }
}

impl SleepControl for StopControl {
    fn program_wake_timer(&mut self, ticks: u32) {
        // Unlock the RTC write protection, reload the wakeup timer, and
        // re-arm it with its interrupt. WUT is a 16-bit register; the /16
        // clock bounds one period at 32 s per hardware, exactly as the
        // reference clock tree dictates.
        RTC.wpr().write(|w| w.set_key(0xCA));
        RTC.wpr().write(|w| w.set_key(0x53));

        RTC.cr().modify(|w| w.set_wute(false));
        while !RTC.isr().read().wutwf() {}

        #[allow(clippy::cast_possible_truncation)]
        RTC.wutr().write(|w| w.set_wut(ticks as u16));
        RTC.cr().modify(|w| {
            w.set_wucksel(pac::rtc::vals::Wucksel::DIV16);
            w.set_wute(true);
            w.set_wutie(true);
        });

        RTC.wpr().write(|w| w.set_key(0xFF));
    }

    fn clear_wake_flag(&mut self) {
        RTC.isr().modify(|w| w.set_wutf(false));
        PWR.cr().modify(|w| w.set_cwuf(true));
    }

    fn halt_until_interrupt(&mut self) {
        // STOP with the low-power regulator; RAM and peripherals retain
        // state, so the sensor keeps its configuration across the halt.
        PWR.cr().modify(|w| {
            w.set_pdds(false);
            w.set_lpsdsr(true);
        });
        self.scb.set_sleepdeep();
        asm::wfi();
        self.scb.clear_sleepdeep();
    }
}
