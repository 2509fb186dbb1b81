//! Blocking I2C transport for the inertial sensor.

use embassy_stm32::i2c::{Error, I2c};
use embassy_stm32::mode::Blocking;
use node_core::imu::{REG_WHO_AM_I, SENSOR_ADDR, SensorBus};

/// I2C1 wired to the MPU6050 with AD0 low.
pub struct ImuBus {
    i2c: I2c<'static, Blocking>,
}

impl ImuBus {
    /// Wraps the configured bus peripheral.
    pub fn new(i2c: I2c<'static, Blocking>) -> Self {
        Self { i2c }
    }
}

impl SensorBus for ImuBus {
    type Error = Error;

    fn probe(&mut self) -> Result<(), Error> {
        // A successful WHO_AM_I read doubles as the readiness check.
        let mut id = [0_u8; 1];
        self.i2c
            .blocking_write_read(SENSOR_ADDR, &[REG_WHO_AM_I], &mut id)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.i2c.blocking_write(SENSOR_ADDR, &[register, value])
    }

    fn read_burst(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.i2c
            .blocking_write_read(SENSOR_ADDR, &[register], buffer)
    }
}
