use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::bind_interrupts;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::peripherals;
use embassy_stm32::rtc::{Rtc, RtcConfig};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use static_cell::StaticCell;

use node_core::config::ConfigStore;
use node_core::imu::ImuPipeline;
use node_core::power::{Board, NodeController};

use crate::hw::backup::BackupRegisters;
use crate::hw::bus::ImuBus;
use crate::hw::clock::RtcCalendar;
use crate::hw::console::SerialConsole;
use crate::hw::indicator::StatusLed;
use crate::hw::lowpower::{StopControl, TickKeeper};
use crate::time::NodeInstant;

mod control_task;
mod serial_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Received serial bytes cross from the receive path into the control loop
/// through this bounded single-producer/single-consumer channel.
pub(super) static RX_BYTES: Channel<CriticalSectionRawMutex, u8, 64> = Channel::new();

static RX_RING: StaticCell<[u8; 64]> = StaticCell::new();

bind_interrupts!(struct Irqs {
    USART2 => usart::InterruptHandler<peripherals::USART2>;
});

pub(super) type Controller = NodeController<BackupRegisters, ImuBus, NodeInstant>;
pub(super) type NodeBoard = Board<TickKeeper, RtcCalendar, StopControl, StatusLed, SerialConsole>;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let p = hal::init(config);

    let scb = cortex_m::Peripherals::take()
        .map(|core| core.SCB)
        .expect("core peripherals taken once");

    let led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB6,
        p.PB7,
        Hertz(100_000),
        embassy_stm32::i2c::Config::default(),
    );

    let rtc = Rtc::new(p.RTC, RtcConfig::default());

    let uart = Uart::new(
        p.USART2,
        p.PA3,
        p.PA2,
        Irqs,
        p.DMA1_CH4,
        p.DMA1_CH5,
        usart::Config::default(),
    )
    .expect("usart init");
    let (tx, rx) = uart.split();
    let rx = rx.into_ring_buffered(RX_RING.init([0; 64]));

    let config = ConfigStore::load(BackupRegisters::new());
    defmt::info!(
        "boot: wake count {}, sleep {} s, awake {} s",
        config.wake_count(),
        config.sleep_interval_s(),
        config.awake_interval_s()
    );

    let mut imu = ImuPipeline::new(ImuBus::new(i2c));
    if imu.init().is_err() {
        defmt::warn!("inertial sensor unavailable at boot");
    }

    let controller = NodeController::new(config, imu);
    let board = Board::new(
        TickKeeper,
        RtcCalendar::new(rtc),
        StopControl::new(scb),
        led,
        SerialConsole::new(tx),
    );

    spawner
        .spawn(control_task::run(controller, board))
        .expect("failed to spawn control task");
    spawner
        .spawn(serial_task::run(rx))
        .expect("failed to spawn serial task");

    core::future::pending::<()>().await;
}
