// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod i2c_mock;

pub use i2c_mock::{
    example_amg8833, I2cOperation, MockError, MockSensorBus, RecordingDelay, DEVICE_ADDRESS,
    REGISTER_SPACE_LENGTH,
};

pub const THERMISTOR_LOW: u8 = 0x0E;
pub const PIXEL_BASE: u8 = 0x80;
pub const PIXEL_COUNT: usize = 64;

/// 25.0 ℃ at 0.0625 ℃ per count.
pub const EXAMPLE_THERMISTOR_RAW: u16 = 0x0190;

/// A warm spot in the middle of a 20 ℃ scene.
///
/// Pixels are 0.25 ℃ per count, so the background (80) is 20 ℃ and the centre four pixels (136)
/// are 34 ℃. The top-left pixel is 22.5 ℃ to make the orientation obvious.
pub fn example_pixels_raw() -> [u16; PIXEL_COUNT] {
    let mut pixels = [80u16; PIXEL_COUNT];
    pixels[0] = 90;
    for index in [27, 28, 35, 36] {
        pixels[index] = 136;
    }
    pixels
}

/// Raw samples covering the full 16-bit range, to exercise the upper byte.
pub fn ramp_pixels_raw() -> [u16; PIXEL_COUNT] {
    let mut pixels = [0u16; PIXEL_COUNT];
    pixels
        .iter_mut()
        .enumerate()
        .for_each(|(index, raw)| *raw = (index as u16) * 0x0401);
    pixels
}
