//! WAKE/SLEEP power state machine.
//!
//! The controller owns the whole node context (configuration store, sensor
//! pipeline, cycle state, deadlines) and drives it through injected
//! capabilities, so the identical logic runs under the firmware tasks and the
//! host emulator. Hardware halt is a blocking call on [`SleepControl`]; tests
//! substitute an immediate-return fake.

use core::fmt::Write as _;
use core::ops::Add;
use core::time::Duration;

use heapless::String;

use crate::calendar::Calendar;
use crate::command::{self, CommandEffect, LineEvent};
use crate::config::{BackupStore, ConfigStore};
use crate::console::Console;
use crate::imu::{ImuPipeline, SensorBus};

/// Wake-timer tick rate: 32768 Hz LSE through the fixed /16 prescaler.
pub const WAKE_TIMER_HZ: u32 = 2_048;

/// Indicator half-period while awake; unrelated to the acquisition rate.
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(100);

/// Converts a sleep interval to the hardware wake-timer reload value.
///
/// The timer fires when the counter wraps past the programmed value, hence
/// the minus one: 10 s programs 20479 ticks.
#[must_use]
pub const fn wake_timer_ticks(seconds: u32) -> u32 {
    seconds * WAKE_TIMER_HZ - 1
}

/// Monotonic time plus control over the coarse tick service that must be
/// suspended across deep retention.
pub trait TimeKeeper {
    /// Monotonic timestamp type used for deadlines.
    type Instant: Copy + Ord + Add<Duration, Output = Self::Instant>;

    /// Returns the current monotonic time.
    fn now(&mut self) -> Self::Instant;

    /// Stops the tick service before entering retention.
    fn suspend_ticks(&mut self);

    /// Restarts the tick service after wake.
    fn resume_ticks(&mut self);
}

/// Low-power entry and the hardware wake timer.
pub trait SleepControl {
    /// Arms the wake timer with a tick count from [`wake_timer_ticks`].
    fn program_wake_timer(&mut self, ticks: u32);

    /// Clears any stale wake flag so the halt is entered cleanly.
    fn clear_wake_flag(&mut self);

    /// Blocks in retention until a qualifying interrupt fires.
    fn halt_until_interrupt(&mut self);
}

/// The activity indicator (an LED on hardware).
pub trait Indicator {
    /// Drives the indicator on or off.
    fn set(&mut self, on: bool);
}

/// Capability bundle handed to the controller on every call.
pub struct Board<T, C, W, L, O> {
    pub time: T,
    pub rtc: C,
    pub sleep: W,
    pub led: L,
    pub console: O,
}

impl<T, C, W, L, O> Board<T, C, W, L, O> {
    /// Bundles the five capabilities.
    pub const fn new(time: T, rtc: C, sleep: W, led: L, console: O) -> Self {
        Self {
            time,
            rtc,
            sleep,
            led,
            console,
        }
    }
}

/// Cycle phase of the node.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SystemState {
    Wake,
    Sleep,
}

/// The node controller: explicit context for everything the cycle mutates.
pub struct NodeController<S, B, I> {
    config: ConfigStore<S>,
    imu: ImuPipeline<B>,
    state: SystemState,
    entry_pending: bool,
    wake_deadline: Option<I>,
    blink_deadline: Option<I>,
    led_on: bool,
}

impl<S, B, I> NodeController<S, B, I>
where
    S: BackupStore,
    B: SensorBus,
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Creates the controller in WAKE with entry actions pending.
    pub const fn new(config: ConfigStore<S>, imu: ImuPipeline<B>) -> Self {
        Self {
            config,
            imu,
            state: SystemState::Wake,
            entry_pending: true,
            wake_deadline: None,
            blink_deadline: None,
            led_on: false,
        }
    }

    /// Returns the current cycle phase.
    pub const fn state(&self) -> SystemState {
        self.state
    }

    /// Returns `true` while WAKE entry actions have not yet run for the
    /// current occupancy.
    pub const fn entry_pending(&self) -> bool {
        self.entry_pending
    }

    /// Accesses the configuration store.
    pub const fn config(&self) -> &ConfigStore<S> {
        &self.config
    }

    /// Accesses the sensor pipeline.
    pub const fn imu(&self) -> &ImuPipeline<B> {
        &self.imu
    }

    /// Mutably accesses the sensor pipeline (initialization, re-init).
    pub fn imu_mut(&mut self) -> &mut ImuPipeline<B> {
        &mut self.imu
    }

    /// Returns the deadline at which the current WAKE occupancy ends.
    pub const fn wake_deadline(&self) -> Option<I> {
        self.wake_deadline
    }

    /// Runs one iteration of the WAKE loop.
    ///
    /// Entry actions execute exactly once per occupancy and complete before
    /// the continuous actions (indicator blink, command handling, deadline
    /// check). A `sleep` command or an expired deadline runs the blocking
    /// sleep transition before this call returns.
    pub fn poll<T, C, W, L, O>(&mut self, board: &mut Board<T, C, W, L, O>, event: Option<&LineEvent>)
    where
        T: TimeKeeper<Instant = I>,
        C: Calendar,
        W: SleepControl,
        L: Indicator,
        O: Console,
    {
        if self.entry_pending {
            self.run_wake_entry(board);
            self.entry_pending = false;
        }

        self.drive_indicator(board);

        if let Some(event) = event {
            let effect = command::dispatch(event, &mut self.config, &mut board.console);
            if effect == CommandEffect::EnterSleep {
                self.enter_sleep(board);
                return;
            }
        }

        if let Some(deadline) = self.wake_deadline
            && board.time.now() >= deadline
        {
            self.enter_sleep(board);
        }
    }

    /// Runs the WAKE to SLEEP transition.
    ///
    /// Blocking: whether reached from the deadline check or a command
    /// handler, execution does not proceed past the halt until hardware
    /// wakes the processor. On return the next occupancy is armed and the
    /// state is WAKE again.
    pub fn enter_sleep<T, C, W, L, O>(&mut self, board: &mut Board<T, C, W, L, O>)
    where
        T: TimeKeeper<Instant = I>,
        C: Calendar,
        W: SleepControl,
        L: Indicator,
        O: Console,
    {
        self.state = SystemState::Sleep;

        self.led_on = false;
        board.led.set(false);

        let ticks = wake_timer_ticks(self.config.sleep_interval_s());
        board.sleep.program_wake_timer(ticks);

        board.time.suspend_ticks();
        board.sleep.clear_wake_flag();
        board.sleep.halt_until_interrupt();

        // Execution resumes here after the wake interrupt.
        board.time.resume_ticks();

        let now = board.time.now();
        self.wake_deadline = Some(now + Duration::from_secs(u64::from(self.config.awake_interval_s())));
        self.blink_deadline = None;
        self.entry_pending = true;
        self.state = SystemState::Wake;
    }

    fn run_wake_entry<T, C, W, L, O>(&mut self, board: &mut Board<T, C, W, L, O>)
    where
        T: TimeKeeper<Instant = I>,
        C: Calendar,
        W: SleepControl,
        L: Indicator,
        O: Console,
    {
        let count = self.config.increment_wake_count();
        let stamp = board.rtc.now();

        let mut line: String<48> = String::new();
        board.console.write_line("--- waking up ---");
        let _ = write!(line, "time: {stamp}");
        board.console.write_line(&line);
        line.clear();
        let _ = write!(line, "wake count: {count}");
        board.console.write_line(&line);

        let _ = self.imu.acquire();
        self.imu.report(&mut board.console);

        // First boot has no sleep exit to arm the deadline.
        if self.wake_deadline.is_none() {
            let now = board.time.now();
            self.wake_deadline =
                Some(now + Duration::from_secs(u64::from(self.config.awake_interval_s())));
        }
    }

    fn drive_indicator<T, C, W, L, O>(&mut self, board: &mut Board<T, C, W, L, O>)
    where
        T: TimeKeeper<Instant = I>,
        C: Calendar,
        W: SleepControl,
        L: Indicator,
        O: Console,
    {
        let now = board.time.now();
        match self.blink_deadline {
            Some(deadline) if now < deadline => {}
            _ => {
                self.led_on = !self.led_on;
                board.led.set(self.led_on);
                self.blink_deadline = Some(now + BLINK_HALF_PERIOD);
            }
        }
    }
}
