// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use core::convert::TryFrom;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c;
use paste::paste;

use crate::conversion::*;
use crate::error::{Error, LibraryError};
use crate::register::*;
use crate::transport::{read_register, write_register, write_register_byte};

/// How long to wait after bring-up before the registers can be trusted, in milliseconds.
pub const SETTLE_DELAY_MS: u16 = 100;

/// DRY macro for the get and set methods in `Amg88xx` for a register holding an enumerated value.
///
/// Setters write a single byte, so the registers after the target keep their values.
macro_rules! register_field {
    { $name:ident, $register:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = "Read the " $doc " from the sensor."]
        pub fn $name(&mut self) -> Result<$typ, Error<I2C>> {
            let mut raw = [0u8; 1];
            read_register(&mut self.bus, Register::$register, &mut raw)?;
            let value = <$typ>::try_from(raw[0])
                .map_err(|_| LibraryError::InvalidData(concat!("Invalid ", $doc, " given")))?;
            Ok(value)
        }

        #[doc = "Set the sensor's " $doc "."]
        pub fn [< set_ $name >](&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            debug!("Setting {:?} to {:?}", Register::$register, new_value);
            write_register_byte(&mut self.bus, Register::$register, u8::from(new_value))
        }
    }};
}

/// A driver for the Panasonic AMG88xx (Grid-EYE) 8×8 thermal sensor.
///
/// The driver keeps no state about the sensor beyond the bus, so every reading is fetched fresh.
/// Nothing is retried: if an operation fails, it's up to the caller to decide whether to try
/// again. Each method takes `&mut self`, so calls on one device are serialized. If the bus is
/// shared with other devices, keeping those transactions from interleaving is also up to the
/// caller.
#[derive(Clone, Debug)]
pub struct Amg88xx<I2C> {
    /// The I²C bus this sensor is accessible on.
    bus: I2C,

    /// Buffer for reading pixel data off of the sensor.
    pixel_buffer: [u8; FRAME_LENGTH],
}

impl<I2C> Amg88xx<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Create a driver for the sensor on the given bus.
    ///
    /// This doesn't talk to the sensor. Call [`begin`][Amg88xx::begin] before taking readings.
    pub fn new(bus: I2C) -> Self {
        Self {
            bus,
            pixel_buffer: [0u8; FRAME_LENGTH],
        }
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.bus
    }

    /// Bring the sensor up.
    ///
    /// In order: normal power mode, an initial reset, 10 frames per second, and interrupts off.
    /// If any step fails the remaining steps are skipped and the error is returned. Once all
    /// four have been written, this blocks for [`SETTLE_DELAY_MS`] so the sensor can settle.
    pub fn begin<D>(&mut self, delay: &mut D) -> Result<(), Error<I2C>>
    where
        D: DelayMs<u16>,
    {
        let steps = [
            (Register::PowerControl, u8::from(PowerMode::Normal)),
            (Register::Reset, u8::from(ResetKind::Initial)),
            (Register::FrameRate, u8::from(FrameRate::Ten)),
            (Register::InterruptControl, INTERRUPTS_DISABLED),
        ];
        for (register, value) in steps {
            debug!("Bring-up: {:?} = {}", register, value);
            write_register(&mut self.bus, register, u16::from(value))?;
        }
        delay.delay_ms(SETTLE_DELAY_MS);
        Ok(())
    }

    register_field! {
        power_mode,
        PowerControl,
        PowerMode,
        "power mode"
    }

    register_field! {
        frame_rate,
        FrameRate,
        FrameRate,
        "frame rate"
    }

    /// Trigger a software reset.
    pub fn reset(&mut self, kind: ResetKind) -> Result<(), Error<I2C>> {
        debug!("Resetting: {:?}", kind);
        write_register_byte(&mut self.bus, Register::Reset, u8::from(kind))
    }

    /// Read the interrupt and overflow flags.
    pub fn status(&mut self) -> Result<Status, Error<I2C>> {
        let mut raw = [0u8; 1];
        read_register(&mut self.bus, Register::Status, &mut raw)?;
        Ok(Status::from(raw[0]))
    }

    /// Clear the given flags.
    pub fn clear_status(&mut self, flags: Status) -> Result<(), Error<I2C>> {
        write_register_byte(&mut self.bus, Register::StatusClear, u8::from(flags))
    }

    /// Read the raw thermistor sample.
    ///
    /// The low and high bytes live in separate registers, and are read with separate
    /// transactions.
    pub fn read_thermistor_raw(&mut self) -> Result<u16, Error<I2C>> {
        let mut low = [0u8; 1];
        let mut high = [0u8; 1];
        read_register(&mut self.bus, Register::ThermistorLow, &mut low)?;
        read_register(&mut self.bus, Register::ThermistorHigh, &mut high)?;
        Ok(assemble_sample(low[0], high[0]))
    }

    /// Read the ambient temperature from the on-board thermistor, in ℃.
    pub fn read_thermistor(&mut self) -> Result<f32, Error<I2C>> {
        self.read_thermistor_raw().map(thermistor_to_celsius)
    }

    fn read_pixel_block(&mut self) -> Result<&[u8; FRAME_LENGTH], Error<I2C>> {
        read_register(&mut self.bus, Register::PixelBase, &mut self.pixel_buffer)?;
        trace!("Read pixel block");
        Ok(&self.pixel_buffer)
    }

    /// Read the raw samples for every pixel.
    pub fn read_raw_pixels(&mut self) -> Result<[u16; PIXEL_COUNT], Error<I2C>> {
        let pixel_bytes = self.read_pixel_block()?;
        Ok(raw_pixels(pixel_bytes))
    }

    /// Read a full frame of pixel temperatures, in ℃.
    ///
    /// The whole 128 byte pixel block is read in a single transaction.
    pub fn read_pixels(&mut self) -> Result<[f32; PIXEL_COUNT], Error<I2C>> {
        let mut temperatures = [0f32; PIXEL_COUNT];
        self.read_pixels_to(&mut temperatures)?;
        Ok(temperatures)
    }

    /// Read a full frame of pixel temperatures into an existing buffer.
    ///
    /// `destination` is only written to if the read succeeds.
    pub fn read_pixels_to(
        &mut self,
        destination: &mut [f32; PIXEL_COUNT],
    ) -> Result<(), Error<I2C>> {
        let pixel_bytes = self.read_pixel_block()?;
        raw_pixels_to_temperatures(pixel_bytes, destination);
        Ok(())
    }

    /// The height of the thermal image, in pixels.
    pub fn height(&self) -> usize {
        HEIGHT
    }

    /// The width of the thermal image, in pixels.
    pub fn width(&self) -> usize {
        WIDTH
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec;

    use amg88xx_test_data::*;
    use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use float_cmp::assert_approx_eq;

    use crate::{Amg88xx, Error, FrameRate, LibraryError, PowerMode, ResetKind, Status};

    const BRING_UP_REGISTERS: [u8; 4] = [0x00, 0x01, 0x02, 0x03];

    fn create_amg8833() -> (Amg88xx<MockSensorBus>, MockSensorBus) {
        let mocked = example_amg8833();
        (Amg88xx::new(mocked.clone()), mocked)
    }

    #[test]
    fn begin_writes_in_order() {
        let (mut sensor, mocked) = create_amg8833();
        let mut delay = RecordingDelay::default();
        sensor.begin(&mut delay).unwrap();
        let ops = mocked.recent_operations();
        let expected = [
            I2cOperation::Write {
                register: 0x00,
                payload: vec![0x00, 0x00],
            },
            I2cOperation::Write {
                register: 0x01,
                payload: vec![0x00, 0x3F],
            },
            I2cOperation::Write {
                register: 0x02,
                payload: vec![0x00, 0x00],
            },
            I2cOperation::Write {
                register: 0x03,
                payload: vec![0x00, 0x00],
            },
        ];
        assert!(ops.iter().eq(expected.iter()));
        assert_eq!(delay.delays_ms, vec![100]);
    }

    #[test]
    fn begin_stops_at_first_failure() {
        for failing in 0..BRING_UP_REGISTERS.len() {
            let (mut sensor, mocked) = create_amg8833();
            mocked.fail_operation(failing);
            let mut delay = RecordingDelay::default();
            let res = sensor.begin(&mut delay);
            assert!(
                matches!(res, Err(Error::I2cWriteError(MockError::Injected))),
                "Bring-up should fail when step {} fails",
                failing
            );
            let attempted: vec::Vec<u8> = mocked
                .recent_operations()
                .iter()
                .map(|op| op.register())
                .collect();
            assert_eq!(
                attempted,
                BRING_UP_REGISTERS[..=failing],
                "Steps after {} should not be attempted",
                failing
            );
            assert!(delay.delays_ms.is_empty(), "No settle delay after a failure");
        }
    }

    #[test]
    fn begin_can_be_retried() {
        let (mut sensor, mocked) = create_amg8833();
        let mut delay = RecordingDelay::default();
        mocked.fail_register(0x02);
        assert!(sensor.begin(&mut delay).is_err());
        mocked.clear_failures();
        assert!(sensor.begin(&mut delay).is_ok());
        assert_eq!(delay.delays_ms, vec![100]);
    }

    #[test]
    fn read_thermistor() {
        let (mut sensor, mocked) = create_amg8833();
        let temperature = sensor.read_thermistor().unwrap();
        assert_approx_eq!(f32, temperature, 25.0);
        let ops = mocked.recent_operations();
        assert_eq!(
            ops.iter().cloned().collect::<vec::Vec<_>>(),
            vec![
                I2cOperation::Read {
                    register: 0x0E,
                    length: 1
                },
                I2cOperation::Read {
                    register: 0x0F,
                    length: 1
                },
            ],
            "The thermistor bytes should be read with two separate reads, low byte first"
        );
    }

    #[test]
    fn read_thermistor_high_byte() {
        let (mut sensor, mocked) = create_amg8833();
        mocked.set_thermistor(0x1234);
        assert_eq!(sensor.read_thermistor_raw().unwrap(), 0x1234);
        assert_eq!(sensor.read_thermistor().unwrap(), 0x1234 as f32 * 0.0625);
    }

    #[test]
    fn read_thermistor_failure() {
        for failing in [0x0E, 0x0F] {
            let (mut sensor, mocked) = create_amg8833();
            mocked.fail_register(failing);
            let res = sensor.read_thermistor();
            assert!(matches!(
                res,
                Err(Error::I2cWriteReadError(MockError::Injected))
            ));
        }
        // Nothing after the failed low byte read is attempted.
        let (mut sensor, mocked) = create_amg8833();
        mocked.fail_operation(0);
        assert!(sensor.read_thermistor().is_err());
        assert_eq!(mocked.recent_operations().len(), 1);
    }

    #[test]
    fn read_pixels() {
        let (mut sensor, mocked) = create_amg8833();
        let temperatures = sensor.read_pixels().unwrap();
        assert_eq!(temperatures.len(), 64);
        let expected = example_pixels_raw();
        for (index, (actual, raw)) in temperatures.iter().zip(expected.iter()).enumerate() {
            assert_eq!(*actual, *raw as f32 * 0.25, "Pixel {}", index);
        }
        assert_approx_eq!(f32, temperatures[0], 22.5);
        assert_approx_eq!(f32, temperatures[36], 34.0);
        let ops = mocked.recent_operations();
        assert_eq!(ops.len(), 1, "The pixel block should be read in one transaction");
        assert_eq!(
            ops[0],
            I2cOperation::Read {
                register: 0x80,
                length: 128
            }
        );
    }

    #[test]
    fn read_raw_pixels() {
        let (mut sensor, mocked) = create_amg8833();
        let expected = ramp_pixels_raw();
        mocked.update_frame(&expected);
        assert_eq!(sensor.read_raw_pixels().unwrap(), expected);
    }

    #[test]
    fn frames_are_fresh() {
        let (mut sensor, mocked) = create_amg8833();
        let first = sensor.read_pixels().unwrap();
        mocked.update_frame(&[120u16; PIXEL_COUNT]);
        let second = sensor.read_pixels().unwrap();
        assert_ne!(first, second);
        assert!(second.iter().all(|t| *t == 30.0));
    }

    #[test]
    fn failed_pixel_read_leaves_destination_alone() {
        let (mut sensor, mocked) = create_amg8833();
        mocked.fail_operation(0);
        let mut temperatures = [f32::NAN; PIXEL_COUNT];
        let res = sensor.read_pixels_to(&mut temperatures);
        assert!(matches!(
            res,
            Err(Error::I2cWriteReadError(MockError::Injected))
        ));
        assert!(temperatures.iter().all(|t| t.is_nan()));
        // And a later successful read fills it in.
        sensor.read_pixels_to(&mut temperatures).unwrap();
        assert!(temperatures.iter().all(|t| !t.is_nan()));
    }

    #[test]
    fn frame_rate() {
        let (mut sensor, mocked) = create_amg8833();
        assert_eq!(sensor.frame_rate().unwrap(), FrameRate::Ten);
        sensor.set_frame_rate(FrameRate::One).unwrap();
        assert_eq!(
            mocked.recent_operations().back(),
            Some(&I2cOperation::Write {
                register: 0x02,
                payload: vec![0x01]
            })
        );
        mocked.set_register(0x02, 0x07);
        assert!(matches!(
            sensor.frame_rate(),
            Err(Error::LibraryError(LibraryError::InvalidData(_)))
        ));
    }

    #[test]
    fn frame_rate_round_trip() {
        let (mut sensor, mocked) = create_amg8833();
        sensor.begin(&mut RecordingDelay::default()).unwrap();
        for frame_rate in [FrameRate::One, FrameRate::Ten, FrameRate::One] {
            sensor.set_frame_rate(frame_rate).unwrap();
            assert_eq!(sensor.frame_rate().unwrap(), frame_rate);
            // Interrupts stay disabled.
            assert_eq!(mocked.register(0x03), 0x00);
        }
    }

    #[test]
    fn power_mode_round_trip() {
        let (mut sensor, mocked) = create_amg8833();
        sensor.begin(&mut RecordingDelay::default()).unwrap();
        let reset_before = mocked.register(0x01);
        for mode in [
            PowerMode::Sleep,
            PowerMode::StandBy60,
            PowerMode::StandBy10,
            PowerMode::Normal,
        ] {
            sensor.set_power_mode(mode).unwrap();
            assert_eq!(sensor.power_mode().unwrap(), mode);
            assert_eq!(mocked.register(0x01), reset_before);
        }
        mocked.set_register(0x00, 0x02);
        assert!(matches!(
            sensor.power_mode(),
            Err(Error::LibraryError(LibraryError::InvalidData(_)))
        ));
    }

    #[test]
    fn reset_only_touches_reset_register() {
        let (mut sensor, mocked) = create_amg8833();
        sensor.set_frame_rate(FrameRate::One).unwrap();
        sensor.reset(ResetKind::Flag).unwrap();
        assert_eq!(mocked.register(0x01), 0x30);
        assert_eq!(sensor.frame_rate().unwrap(), FrameRate::One);
        assert_eq!(
            mocked.recent_operations().back(),
            Some(&I2cOperation::Write {
                register: 0x01,
                payload: vec![0x30]
            })
        );
    }

    #[test]
    fn status_flags() {
        let (mut sensor, mocked) = create_amg8833();
        assert_eq!(sensor.status().unwrap(), Status::default());
        mocked.set_register(0x04, 0x04);
        let status = sensor.status().unwrap();
        assert!(status.pixel_overflow);
        sensor.clear_status(status).unwrap();
        assert_eq!(mocked.register(0x05), 0x04);
        // The register after the clear register is reserved and must not be written.
        assert_eq!(mocked.register(0x06), 0x00);
        assert_eq!(
            mocked.recent_operations().back(),
            Some(&I2cOperation::Write {
                register: 0x05,
                payload: vec![0x04]
            })
        );
    }

    #[test]
    fn exact_bytes_on_the_wire() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write(DEVICE_ADDRESS, vec![0x00, 0x00, 0x00]),
            I2cTransaction::write(DEVICE_ADDRESS, vec![0x01, 0x00, 0x3F]),
            I2cTransaction::write(DEVICE_ADDRESS, vec![0x02, 0x00, 0x00]),
            I2cTransaction::write(DEVICE_ADDRESS, vec![0x03, 0x00, 0x00]),
            I2cTransaction::write_read(DEVICE_ADDRESS, vec![0x0E], vec![0x90]),
            I2cTransaction::write_read(DEVICE_ADDRESS, vec![0x0F], vec![0x01]),
        ]);
        let mut sensor = Amg88xx::new(i2c);
        sensor.begin(&mut RecordingDelay::default()).unwrap();
        assert_approx_eq!(f32, sensor.read_thermistor().unwrap(), 25.0);
        let mut i2c = sensor.release();
        i2c.done();
    }

    #[test]
    fn dimensions() {
        let (sensor, _) = create_amg8833();
        assert_eq!(sensor.height() * sensor.width(), PIXEL_COUNT);
    }
}
