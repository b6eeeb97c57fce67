// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Register-level access to the sensor.
//!
//! There are three primitives: writing a 16-bit frame to a register, writing a single byte to a
//! register, and reading one or more bytes starting at a register. Each is a single I²C
//! transaction, and none of them retry.
//!
//! The sensor auto-increments the register address for every byte written, so the low byte of a
//! [`write_register`] frame also lands in the following register. Settings that must change one
//! register and nothing else go through [`write_register_byte`].
//!
//! Reads rely on [`WriteRead`][i2c::WriteRead] issuing a repeated start between writing the
//! register address and reading the data. If the bus is released in between, the sensor may
//! answer from the wrong register or collide with other traffic on the bus.
use core::convert::TryFrom;
use core::time::Duration;

use embedded_hal::blocking::i2c;

use crate::error::{Error, LibraryError};
use crate::register::Register;

/// The I²C address of the sensor.
///
/// The AMG88xx can also be strapped to 0x68, but this driver only talks to 0x69.
pub const DEVICE_ADDRESS: u8 = 0x69;

/// The number of bytes in a [`write_register`] frame: the address, then the value high byte first.
pub const WRITE_FRAME_LENGTH: usize = 3;

/// The number of bytes in a [`write_register_byte`] frame: the address, then the value.
pub const BYTE_WRITE_FRAME_LENGTH: usize = 2;

/// Time budget per byte on the bus, in microseconds.
pub const BYTE_TIMEOUT_US: u32 = 1500;

/// Time budget per byte on the bus.
pub const BYTE_TIMEOUT: Duration = Duration::from_micros(BYTE_TIMEOUT_US as u64);

/// The time a transaction of `byte_count` bytes may take before it should be treated as failed.
///
/// `embedded-hal` doesn't have a way to pass a timeout along with a transaction, so enforcing
/// this is left to the bus implementation. A HAL that reports a timeout as an error will have it
/// surface as [`Error::I2cWriteError`] or [`Error::I2cWriteReadError`]. Byte counts too large for
/// a `u32` saturate.
pub fn transaction_timeout(byte_count: usize) -> Duration {
    let byte_count = u32::try_from(byte_count).unwrap_or(u32::MAX);
    BYTE_TIMEOUT.saturating_mul(byte_count)
}

/// Write a 16-bit value to a register.
///
/// The frame on the wire is always [`WRITE_FRAME_LENGTH`] bytes: the register address, then the
/// high byte of `value`, then the low byte.
pub fn write_register<I2C>(bus: &mut I2C, register: Register, value: u16) -> Result<(), Error<I2C>>
where
    I2C: i2c::Write + i2c::WriteRead,
{
    let [high, low] = value.to_be_bytes();
    let frame: [u8; WRITE_FRAME_LENGTH] = [register.into(), high, low];
    trace!("Writing {} to {:?}", value, register);
    bus.write(DEVICE_ADDRESS, &frame).map_err(|err| {
        warn!("Write to {:?} failed", register);
        Error::I2cWriteError(err)
    })
}

/// Write a single byte to a register, leaving the registers after it alone.
pub fn write_register_byte<I2C>(
    bus: &mut I2C,
    register: Register,
    value: u8,
) -> Result<(), Error<I2C>>
where
    I2C: i2c::Write + i2c::WriteRead,
{
    let frame: [u8; BYTE_WRITE_FRAME_LENGTH] = [register.into(), value];
    trace!("Writing byte {} to {:?}", value, register);
    bus.write(DEVICE_ADDRESS, &frame).map_err(|err| {
        warn!("Write to {:?} failed", register);
        Error::I2cWriteError(err)
    })
}

/// Read `buffer.len()` bytes, starting at `register`.
///
/// The buffer must not be empty; the sensor is never addressed in that case.
pub fn read_register<I2C>(
    bus: &mut I2C,
    register: Register,
    buffer: &mut [u8],
) -> Result<(), Error<I2C>>
where
    I2C: i2c::Write + i2c::WriteRead,
{
    if buffer.is_empty() {
        return Err(LibraryError::InvalidLength.into());
    }
    let address = [register.into()];
    trace!("Reading {} bytes from {:?}", buffer.len(), register);
    bus.write_read(DEVICE_ADDRESS, &address, buffer)
        .map_err(|err| {
            warn!("Read of {} bytes from {:?} failed", buffer.len(), register);
            Error::I2cWriteReadError(err)
        })
}
