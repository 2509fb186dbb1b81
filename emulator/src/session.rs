use std::cell::Cell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use node_core::calendar::{Calendar, DateTime};
use node_core::command::CommandSession;
use node_core::config::{BackupStore, ConfigStore, SLOT_COUNT, Slot};
use node_core::console::Console;
use node_core::imu::{ImuPipeline, SensorBus};
use node_core::power::{
    Board, Indicator, NodeController, SleepControl, TimeKeeper, WAKE_TIMER_HZ,
};

/// How long the emulator actually pauses for one simulated sleep phase.
const COMPRESSED_HALT: Duration = Duration::from_millis(300);

/// Backup registers persisted to a small text file, so wake counts survive
/// emulator restarts the way the hardware backup domain survives power loss.
pub struct FileStore {
    path: PathBuf,
    slots: [u32; SLOT_COUNT],
}

impl FileStore {
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let slots = match fs::read_to_string(&path) {
            Ok(contents) => {
                let mut slots = [0_u32; SLOT_COUNT];
                for (slot, line) in slots.iter_mut().zip(contents.lines()) {
                    *slot = line.trim().parse().unwrap_or(0);
                }
                slots
            }
            Err(_) => [0_u32; SLOT_COUNT],
        };
        Ok(Self { path, slots })
    }

    fn flush(&self) {
        let mut contents = String::new();
        for slot in &self.slots {
            contents.push_str(&slot.to_string());
            contents.push('\n');
        }
        if let Err(err) = fs::write(&self.path, contents) {
            eprintln!("warning: backup store not persisted: {err}");
        }
    }
}

impl BackupStore for FileStore {
    // The emulated backup domain has no write protection to model.
    fn unlock(&mut self) {}

    fn lock(&mut self) {}

    fn read(&self, slot: Slot) -> u32 {
        self.slots[slot.index()]
    }

    fn write(&mut self, slot: Slot, value: u32) {
        self.slots[slot.index()] = value;
        self.flush();
    }
}

/// Synthesizes plausible burst frames: gravity on Z plus a slow wobble.
pub struct SyntheticBus {
    samples: Rc<Cell<u32>>,
}

impl SensorBus for SyntheticBus {
    type Error = ();

    fn probe(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn write_register(&mut self, _register: u8, _value: u8) -> Result<(), ()> {
        Ok(())
    }

    fn read_burst(&mut self, _register: u8, buffer: &mut [u8]) -> Result<(), ()> {
        let n = self.samples.get();
        self.samples.set(n.wrapping_add(1));

        let wobble = i16::try_from(n % 40).unwrap() * 8 - 160;
        let accel: [i16; 3] = [wobble, -wobble / 2, 16_384 + wobble];
        let gyro: [i16; 3] = [wobble / 4, wobble / 8, -wobble / 4];

        for axis in 0..3 {
            buffer[axis * 2..axis * 2 + 2].copy_from_slice(&accel[axis].to_be_bytes());
            buffer[8 + axis * 2..10 + axis * 2].copy_from_slice(&gyro[axis].to_be_bytes());
        }
        // Temperature field stays zero; the pipeline skips it anyway.
        Ok(())
    }
}

pub struct HostTime;

impl TimeKeeper for HostTime {
    type Instant = Instant;

    fn now(&mut self) -> Instant {
        Instant::now()
    }

    // The host has no tick service to park.
    fn suspend_ticks(&mut self) {}

    fn resume_ticks(&mut self) {}
}

pub struct HostCalendar;

impl Calendar for HostCalendar {
    fn now(&mut self) -> DateTime {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let seconds = since_epoch.as_secs();
        let (year, month, day) = civil_from_days((seconds / 86_400) as i64);
        let second_of_day = seconds % 86_400;
        DateTime::new(
            u16::try_from(year).unwrap_or(2000),
            month,
            day,
            (second_of_day / 3_600) as u8,
            (second_of_day / 60 % 60) as u8,
            (second_of_day % 60) as u8,
        )
    }
}

/// Days-to-civil conversion for the proleptic Gregorian calendar.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let shifted = days + 719_468;
    let era_base = if shifted >= 0 { shifted } else { shifted - 146_096 };
    let era = era_base / 146_097;
    let day_of_era = shifted - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month as u8, day as u8)
}

pub struct FakeSleep;

impl SleepControl for FakeSleep {
    fn program_wake_timer(&mut self, ticks: u32) {
        let seconds = (ticks + 1) / WAKE_TIMER_HZ;
        println!("[wake timer armed: {ticks} ticks (~{seconds} s)]");
    }

    fn clear_wake_flag(&mut self) {}

    fn halt_until_interrupt(&mut self) {
        println!("[halt: sleep phase compressed to {COMPRESSED_HALT:?}]");
        thread::sleep(COMPRESSED_HALT);
    }
}

pub struct EmuLed;

impl Indicator for EmuLed {
    // Rendering a 100 ms blink on a terminal is all noise; the emulator
    // swallows it.
    fn set(&mut self, _on: bool) {}
}

pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

type EmuController = NodeController<FileStore, SyntheticBus, Instant>;
type EmuBoard = Board<HostTime, HostCalendar, FakeSleep, EmuLed, StdoutConsole>;

/// One emulated node: identical core logic, host capabilities.
pub struct Session {
    controller: EmuController,
    board: EmuBoard,
    line_buffer: CommandSession,
}

impl Session {
    pub fn new(store_path: PathBuf) -> io::Result<Self> {
        let store = FileStore::open(store_path)?;
        let config = ConfigStore::load(store);

        let mut imu = ImuPipeline::new(SyntheticBus {
            samples: Rc::new(Cell::new(0)),
        });
        imu.init().expect("synthetic bus never fails");

        Ok(Self {
            controller: NodeController::new(config, imu),
            board: Board::new(HostTime, HostCalendar, FakeSleep, EmuLed, StdoutConsole),
            line_buffer: CommandSession::new(),
        })
    }

    /// Runs the boot-time WAKE entry (banner, count, first acquisition).
    pub fn boot(&mut self) {
        self.controller.poll(&mut self.board, None);
    }

    /// Feeds one operator line through the byte session and polls the
    /// controller with whatever completed.
    pub fn handle_line(&mut self, line: &str) {
        let mut event = None;
        for byte in line.bytes() {
            if let Some(ready) = self.line_buffer.ingest(byte) {
                event = Some(ready);
            }
        }
        if let Some(ready) = self.line_buffer.ingest(b'\n') {
            event = Some(ready);
        }
        self.controller.poll(&mut self.board, event.as_ref());
    }
}
