// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The AMG88xx register map and the values that can be written to it.
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::util::is_bit_set;

/// Addresses in the sensor's register space.
///
/// Registers 0x06 and 0x11 through 0x7F (other than the interrupt table) are reserved.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Power control (operating mode).
    PowerControl = 0x00,
    /// Software reset.
    Reset = 0x01,
    /// Frame rate.
    FrameRate = 0x02,
    /// Interrupt enable and mode.
    InterruptControl = 0x03,
    /// Interrupt and overflow flags. Read-only.
    Status = 0x04,
    /// Write-only companion to [`Register::Status`] for clearing flags.
    StatusClear = 0x05,
    /// Moving average mode.
    Average = 0x07,
    InterruptHighLow = 0x08,
    InterruptHighHigh = 0x09,
    InterruptLowLow = 0x0A,
    InterruptLowHigh = 0x0B,
    HysteresisLow = 0x0C,
    HysteresisHigh = 0x0D,
    /// Low byte of the thermistor (ambient temperature) sample.
    ThermistorLow = 0x0E,
    /// High byte of the thermistor sample.
    ThermistorHigh = 0x0F,
    /// Start of the 8 byte per-pixel interrupt table.
    InterruptTable = 0x10,
    /// Start of the 128 byte pixel block, two bytes per pixel, low byte first.
    PixelBase = 0x80,
}

/// Operating modes, written to [`Register::PowerControl`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// Continuous measurement. This is the mode set by [`begin`][crate::Amg88xx::begin].
    Normal = 0x00,
    Sleep = 0x01,
    /// Stand-by, waking every 60 seconds.
    StandBy60 = 0x20,
    /// Stand-by, waking every 10 seconds.
    StandBy10 = 0x21,
}

/// Software reset codes, written to [`Register::Reset`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ResetKind {
    /// Clear the status register, interrupt flags and interrupt table.
    Flag = 0x30,
    /// Flag reset plus reloading the adjustment values from the sensor's ROM.
    Initial = 0x3F,
}

/// Frame rates supported by the sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FrameRate {
    /// 10 frames per second, the power-on default.
    Ten = 0x00,
    /// 1 frame per second.
    One = 0x01,
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Ten
    }
}

/// The value written to [`Register::InterruptControl`] to disable the interrupt output.
pub const INTERRUPTS_DISABLED: u8 = 0x00;

/// The flags in [`Register::Status`].
///
/// The same bit positions are used in [`Register::StatusClear`], so a `Status` can be written
/// back to clear exactly the flags that were read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// An interrupt has been raised.
    pub interrupt: bool,

    /// A pixel temperature has overflowed.
    pub pixel_overflow: bool,

    /// The thermistor temperature has overflowed.
    pub thermistor_overflow: bool,
}

impl Status {
    const INTERRUPT_BIT: usize = 1;
    const PIXEL_OVERFLOW_BIT: usize = 2;
    const THERMISTOR_OVERFLOW_BIT: usize = 3;

    /// All flags set, for clearing everything at once.
    pub fn all() -> Self {
        Self {
            interrupt: true,
            pixel_overflow: true,
            thermistor_overflow: true,
        }
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Self {
            interrupt: is_bit_set(raw, Self::INTERRUPT_BIT),
            pixel_overflow: is_bit_set(raw, Self::PIXEL_OVERFLOW_BIT),
            thermistor_overflow: is_bit_set(raw, Self::THERMISTOR_OVERFLOW_BIT),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        let mut raw = 0u8;
        raw |= (status.interrupt as u8) << Status::INTERRUPT_BIT;
        raw |= (status.pixel_overflow as u8) << Status::PIXEL_OVERFLOW_BIT;
        raw |= (status.thermistor_overflow as u8) << Status::THERMISTOR_OVERFLOW_BIT;
        raw
    }
}
