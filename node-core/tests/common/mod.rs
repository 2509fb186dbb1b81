//! Mock capabilities shared by the integration suites.
//!
//! Everything observable funnels into a single [`Trace`] so ordering
//! assertions can compare full transition sequences. Shared handles
//! (`Rc`) let tests advance time, rewrite backup registers, or script bus
//! failures while the controller owns the capability objects.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use core::ops::Add;
use core::time::Duration;

use node_core::calendar::{Calendar, DateTime};
use node_core::config::{BackupStore, ConfigStore, SLOT_COUNT, Slot};
use node_core::console::Console;
use node_core::imu::{BURST_LEN, ImuPipeline, SensorBus};
use node_core::power::{Board, Indicator, NodeController, SleepControl, TimeKeeper};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    LedOn,
    LedOff,
    TimerProgrammed(u32),
    TicksSuspended,
    TicksResumed,
    WakeFlagCleared,
    Halted,
    DomainUnlocked,
    DomainLocked,
    SlotWritten(Slot, u32),
    BusProbe,
    BusWrite(u8, u8),
    BusBurst(u8),
}

pub type Trace = Rc<RefCell<Vec<TraceEvent>>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(u64);

impl MockInstant {
    pub fn micros(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Add<Duration> for MockInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_micros() as u64)
    }
}

#[derive(Clone)]
pub struct MockTime {
    now: Rc<Cell<u64>>,
    trace: Trace,
}

impl TimeKeeper for MockTime {
    type Instant = MockInstant;

    fn now(&mut self) -> MockInstant {
        MockInstant(self.now.get())
    }

    fn suspend_ticks(&mut self) {
        self.trace.borrow_mut().push(TraceEvent::TicksSuspended);
    }

    fn resume_ticks(&mut self) {
        self.trace.borrow_mut().push(TraceEvent::TicksResumed);
    }
}

#[derive(Clone)]
pub struct MockCalendar {
    pub stamp: DateTime,
}

impl Calendar for MockCalendar {
    fn now(&mut self) -> DateTime {
        self.stamp
    }
}

#[derive(Clone)]
pub struct MockSleep {
    trace: Trace,
}

impl SleepControl for MockSleep {
    fn program_wake_timer(&mut self, ticks: u32) {
        self.trace
            .borrow_mut()
            .push(TraceEvent::TimerProgrammed(ticks));
    }

    fn clear_wake_flag(&mut self) {
        self.trace.borrow_mut().push(TraceEvent::WakeFlagCleared);
    }

    fn halt_until_interrupt(&mut self) {
        self.trace.borrow_mut().push(TraceEvent::Halted);
    }
}

#[derive(Clone)]
pub struct MockLed {
    trace: Trace,
}

impl Indicator for MockLed {
    fn set(&mut self, on: bool) {
        self.trace.borrow_mut().push(if on {
            TraceEvent::LedOn
        } else {
            TraceEvent::LedOff
        });
    }
}

#[derive(Clone)]
pub struct MockConsole {
    lines: Rc<RefCell<Vec<String>>>,
}

impl Console for MockConsole {
    fn write_line(&mut self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

/// Backup register file that panics when the bracketing discipline breaks.
#[derive(Clone)]
pub struct MockStore {
    regs: Rc<RefCell<[u32; SLOT_COUNT]>>,
    unlocked: Rc<Cell<bool>>,
    trace: Trace,
}

impl MockStore {
    pub fn new(regs: Rc<RefCell<[u32; SLOT_COUNT]>>, trace: Trace) -> Self {
        Self {
            regs,
            unlocked: Rc::new(Cell::new(false)),
            trace,
        }
    }
}

impl BackupStore for MockStore {
    fn unlock(&mut self) {
        assert!(!self.unlocked.get(), "backup domain already unlocked");
        self.unlocked.set(true);
        self.trace.borrow_mut().push(TraceEvent::DomainUnlocked);
    }

    fn lock(&mut self) {
        assert!(self.unlocked.get(), "backup domain already locked");
        self.unlocked.set(false);
        self.trace.borrow_mut().push(TraceEvent::DomainLocked);
    }

    fn read(&self, slot: Slot) -> u32 {
        self.regs.borrow()[slot.index()]
    }

    fn write(&mut self, slot: Slot, value: u32) {
        assert!(self.unlocked.get(), "backup domain written while locked");
        self.regs.borrow_mut()[slot.index()] = value;
        self.trace
            .borrow_mut()
            .push(TraceEvent::SlotWritten(slot, value));
    }
}

/// Sensor bus whose failures and sample frames are scripted by the test.
#[derive(Clone)]
pub struct ScriptedBus {
    frame: Rc<RefCell<[u8; BURST_LEN]>>,
    fail_probe: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
    fail_next_burst: Rc<Cell<bool>>,
    trace: Trace,
}

impl SensorBus for ScriptedBus {
    type Error = ();

    fn probe(&mut self) -> Result<(), ()> {
        self.trace.borrow_mut().push(TraceEvent::BusProbe);
        if self.fail_probe.get() { Err(()) } else { Ok(()) }
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), ()> {
        self.trace
            .borrow_mut()
            .push(TraceEvent::BusWrite(register, value));
        if self.fail_writes.get() { Err(()) } else { Ok(()) }
    }

    fn read_burst(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), ()> {
        self.trace.borrow_mut().push(TraceEvent::BusBurst(register));
        if self.fail_next_burst.take() {
            return Err(());
        }
        buffer.copy_from_slice(&self.frame.borrow()[..buffer.len()]);
        Ok(())
    }
}

pub type TestController = NodeController<MockStore, ScriptedBus, MockInstant>;
pub type TestBoard = Board<MockTime, MockCalendar, MockSleep, MockLed, MockConsole>;

/// Shared handles into the mock capabilities owned by the bench.
pub struct Handles {
    pub trace: Trace,
    pub clock: Rc<Cell<u64>>,
    pub regs: Rc<RefCell<[u32; SLOT_COUNT]>>,
    pub lines: Rc<RefCell<Vec<String>>>,
    pub frame: Rc<RefCell<[u8; BURST_LEN]>>,
    pub fail_probe: Rc<Cell<bool>>,
    pub fail_writes: Rc<Cell<bool>>,
    pub fail_next_burst: Rc<Cell<bool>>,
}

impl Handles {
    pub fn advance(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap();
        self.clock.set(self.clock.get() + micros);
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    pub fn clear_lines(&self) {
        self.lines.borrow_mut().clear();
    }

    /// Fresh store sharing the same backup registers, as after a power loss.
    pub fn store_after_power_loss(&self) -> MockStore {
        MockStore::new(Rc::clone(&self.regs), Rc::clone(&self.trace))
    }
}

/// Builds a booted bench: blank backup domain, healthy sensor, initialized
/// pipeline, controller in WAKE with entry actions pending.
pub fn bench() -> (TestController, TestBoard, Handles) {
    let trace: Trace = Rc::new(RefCell::new(Vec::new()));
    let clock = Rc::new(Cell::new(0_u64));
    let regs = Rc::new(RefCell::new([0_u32; SLOT_COUNT]));
    let lines = Rc::new(RefCell::new(Vec::new()));
    let frame = Rc::new(RefCell::new([0_u8; BURST_LEN]));
    let fail_probe = Rc::new(Cell::new(false));
    let fail_writes = Rc::new(Cell::new(false));
    let fail_next_burst = Rc::new(Cell::new(false));

    let store = MockStore::new(Rc::clone(&regs), Rc::clone(&trace));
    let bus = ScriptedBus {
        frame: Rc::clone(&frame),
        fail_probe: Rc::clone(&fail_probe),
        fail_writes: Rc::clone(&fail_writes),
        fail_next_burst: Rc::clone(&fail_next_burst),
        trace: Rc::clone(&trace),
    };

    let config = ConfigStore::load(store);
    let mut imu = ImuPipeline::new(bus);
    imu.init().expect("scripted bus starts healthy");

    let controller = NodeController::new(config, imu);
    let board = Board::new(
        MockTime {
            now: Rc::clone(&clock),
            trace: Rc::clone(&trace),
        },
        MockCalendar {
            stamp: DateTime::new(2025, 8, 7, 12, 0, 0),
        },
        MockSleep {
            trace: Rc::clone(&trace),
        },
        MockLed {
            trace: Rc::clone(&trace),
        },
        MockConsole {
            lines: Rc::clone(&lines),
        },
    );

    let handles = Handles {
        trace,
        clock,
        regs,
        lines,
        frame,
        fail_probe,
        fail_writes,
        fail_next_burst,
    };

    (controller, board, handles)
}

/// Encodes an accel/gyro sample into the 14-byte burst frame layout.
pub fn encode_frame(accel: [i16; 3], gyro: [i16; 3]) -> [u8; BURST_LEN] {
    let mut frame = [0_u8; BURST_LEN];
    for axis in 0..3 {
        let a = accel[axis].to_be_bytes();
        frame[axis * 2] = a[0];
        frame[axis * 2 + 1] = a[1];
        let g = gyro[axis].to_be_bytes();
        frame[8 + axis * 2] = g[0];
        frame[9 + axis * 2] = g[1];
    }
    frame
}
