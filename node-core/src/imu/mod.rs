//! Inertial sensor acquisition pipeline.
//!
//! Talks to an MPU6050-class device through the [`SensorBus`] capability:
//! one probe plus three configuration writes at init, then a 14-byte burst
//! read per acquisition. Raw counts are converted to physical units with the
//! fixed full-scale factors and smoothed by a per-axis low-pass filter. A bus
//! failure at any point latches the pipeline `Unavailable`; only an explicit
//! re-init can clear the latch.

use core::fmt::Write as _;

use heapless::String;

use crate::console::Console;

pub mod filter;

pub use filter::{IIR_ALPHA, LowPass};

/// 7-bit I2C address with AD0 tied low.
pub const SENSOR_ADDR: u8 = 0x68;

/// Identity register; reads back the 7-bit address on genuine parts.
pub const REG_WHO_AM_I: u8 = 0x75;

/// Power management 1: clock source select, sleep bit.
pub const REG_PWR_MGMT_1: u8 = 0x6B;

/// Gyroscope full-scale configuration.
pub const REG_GYRO_CONFIG: u8 = 0x1B;

/// Accelerometer full-scale configuration.
pub const REG_ACCEL_CONFIG: u8 = 0x1C;

/// First register of the 14-byte accel/temp/gyro burst.
pub const REG_ACCEL_XOUT_H: u8 = 0x3B;

/// PLL with X-axis gyro reference; clears the sleep bit.
pub const CLOCK_SOURCE_PLL_X: u8 = 0x01;

/// Gyro full scale +/- 250 deg/s.
pub const GYRO_FS_250DPS: u8 = 0x00;

/// Accel full scale +/- 2 g.
pub const ACCEL_FS_2G: u8 = 0x00;

/// Bytes in one burst: 6 accel, 2 temperature, 6 gyro.
pub const BURST_LEN: usize = 14;

/// LSB per g at the +/- 2 g range.
pub const ACCEL_SCALE: f32 = 16_384.0;

/// LSB per deg/s at the +/- 250 deg/s range.
pub const GYRO_SCALE: f32 = 131.0;

/// Abstraction over the sensor's register bus.
pub trait SensorBus {
    /// Transport-specific failure detail; the pipeline only latches on it.
    type Error;

    /// Confirms the device responds at its fixed address.
    fn probe(&mut self) -> Result<(), Self::Error>;

    /// Writes a single configuration register.
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Fills `buffer` with consecutive registers starting at `register`.
    fn read_burst(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// Health of the acquisition pipeline.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SensorStatus {
    /// Initialized and answering on the bus.
    Ok,
    /// Latched after any bus failure; cleared only by a successful re-init.
    Unavailable,
}

/// Failure surfaced by pipeline operations.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SensorError {
    /// The latch is set; no bus traffic was attempted.
    Unavailable,
}

/// Acquisition pipeline state: raw counts, filter memory, latched status.
pub struct ImuPipeline<B> {
    bus: B,
    status: SensorStatus,
    accel_raw: [i16; 3],
    gyro_raw: [i16; 3],
    accel_filter: [LowPass; 3],
    gyro_filter: [LowPass; 3],
}

impl<B: SensorBus> ImuPipeline<B> {
    /// Creates an uninitialized pipeline; [`init`](Self::init) must succeed
    /// before the first acquisition.
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            status: SensorStatus::Unavailable,
            accel_raw: [0; 3],
            gyro_raw: [0; 3],
            accel_filter: [LowPass::new(IIR_ALPHA); 3],
            gyro_filter: [LowPass::new(IIR_ALPHA); 3],
        }
    }

    /// Probes the device and writes the three configuration registers.
    ///
    /// Any bus failure leaves the pipeline latched `Unavailable`.
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.status = SensorStatus::Unavailable;

        let sequence = [
            (REG_PWR_MGMT_1, CLOCK_SOURCE_PLL_X),
            (REG_GYRO_CONFIG, GYRO_FS_250DPS),
            (REG_ACCEL_CONFIG, ACCEL_FS_2G),
        ];

        if self.bus.probe().is_err() {
            return Err(SensorError::Unavailable);
        }
        for (register, value) in sequence {
            if self.bus.write_register(register, value).is_err() {
                return Err(SensorError::Unavailable);
            }
        }

        self.status = SensorStatus::Ok;
        Ok(())
    }

    /// Runs one acquisition: burst read, decode, convert, filter.
    ///
    /// Short-circuits without bus traffic while the latch is set. A failed
    /// burst sets the latch and leaves raw and filtered state untouched.
    pub fn acquire(&mut self) -> Result<(), SensorError> {
        if self.status != SensorStatus::Ok {
            return Err(SensorError::Unavailable);
        }

        let mut frame = [0_u8; BURST_LEN];
        if self.bus.read_burst(REG_ACCEL_XOUT_H, &mut frame).is_err() {
            self.status = SensorStatus::Unavailable;
            return Err(SensorError::Unavailable);
        }

        // Accel words lead the frame; two temperature bytes sit between
        // them and the gyro words.
        for axis in 0..3 {
            self.accel_raw[axis] = i16::from_be_bytes([frame[axis * 2], frame[axis * 2 + 1]]);
            self.gyro_raw[axis] = i16::from_be_bytes([frame[8 + axis * 2], frame[9 + axis * 2]]);
        }

        for axis in 0..3 {
            self.accel_filter[axis].update(f32::from(self.accel_raw[axis]) / ACCEL_SCALE);
            self.gyro_filter[axis].update(f32::from(self.gyro_raw[axis]) / GYRO_SCALE);
        }

        Ok(())
    }

    /// Reports the filtered readings, or the unavailable notice, to the
    /// operator console.
    pub fn report<C: Console>(&self, console: &mut C) {
        if self.status != SensorStatus::Ok {
            console.write_line("ERROR: inertial sensor unavailable.");
            return;
        }

        let accel = self.accel_g();
        let gyro = self.gyro_dps();
        let mut line: String<64> = String::new();

        console.write_line("filtered inertial data:");

        let _ = write!(
            line,
            "  accel (g): x={:.3} y={:.3} z={:.3}",
            accel[0], accel[1], accel[2]
        );
        console.write_line(&line);

        line.clear();
        let _ = write!(
            line,
            "  gyro (dps): x={:.3} y={:.3} z={:.3}",
            gyro[0], gyro[1], gyro[2]
        );
        console.write_line(&line);
    }

    /// Returns the latched pipeline status.
    pub const fn status(&self) -> SensorStatus {
        self.status
    }

    /// Returns the most recent raw accelerometer counts.
    pub const fn accel_raw(&self) -> [i16; 3] {
        self.accel_raw
    }

    /// Returns the most recent raw gyroscope counts.
    pub const fn gyro_raw(&self) -> [i16; 3] {
        self.gyro_raw
    }

    /// Returns the filtered acceleration in g.
    pub fn accel_g(&self) -> [f32; 3] {
        [
            self.accel_filter[0].value(),
            self.accel_filter[1].value(),
            self.accel_filter[2].value(),
        ]
    }

    /// Returns the filtered angular rate in deg/s.
    pub fn gyro_dps(&self) -> [f32; 3] {
        [
            self.gyro_filter[0].value(),
            self.gyro_filter[1].value(),
            self.gyro_filter[2].value(),
        ]
    }
}
