// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversion from raw sensor samples to degrees Celsius.
//!
//! Every value the sensor reports is a 16-bit sample split over two consecutive registers, low
//! byte first. Converting a sample is a single multiplication by a fixed scale: there is no
//! offset, and no per-device calibration.
//!
//! The sensor documents a sign bit for temperatures below 0 ℃ (sign-magnitude for the
//! thermistor, two's complement for the pixels). That convention is *not* applied here; samples
//! are treated as unsigned. If you need sub-zero readings, read the raw samples and apply the
//! sign yourself.

use crate::util::WORD_SIZE;

/// The height of the thermal image, in pixels.
pub const HEIGHT: usize = 8;

/// The width of the thermal image, in pixels.
pub const WIDTH: usize = 8;

/// The number of pixels in a frame.
pub const PIXEL_COUNT: usize = HEIGHT * WIDTH;

/// The number of bytes in the pixel block.
pub const FRAME_LENGTH: usize = PIXEL_COUNT * WORD_SIZE;

/// ℃ per count for the thermistor.
pub const THERMISTOR_SCALE: f32 = 0.0625;

/// ℃ per count for each pixel.
pub const PIXEL_SCALE: f32 = 0.25;

/// Combine the two bytes of a sample.
pub fn assemble_sample(low: u8, high: u8) -> u16 {
    (u16::from(high) << 8) | u16::from(low)
}

pub fn thermistor_to_celsius(raw: u16) -> f32 {
    f32::from(raw) * THERMISTOR_SCALE
}

pub fn pixel_to_celsius(raw: u16) -> f32 {
    f32::from(raw) * PIXEL_SCALE
}

/// Split the pixel block into raw samples.
///
/// Pixel `i` comes from bytes `2i` (low) and `2i + 1` (high).
pub fn raw_pixels(pixel_bytes: &[u8; FRAME_LENGTH]) -> [u16; PIXEL_COUNT] {
    let mut raw = [0u16; PIXEL_COUNT];
    raw.iter_mut()
        .zip(pixel_bytes.chunks_exact(WORD_SIZE))
        .for_each(|(sample, bytes)| *sample = assemble_sample(bytes[0], bytes[1]));
    raw
}

/// Convert the pixel block into temperatures, writing them into `destination`.
pub fn raw_pixels_to_temperatures(
    pixel_bytes: &[u8; FRAME_LENGTH],
    destination: &mut [f32; PIXEL_COUNT],
) {
    destination
        .iter_mut()
        .zip(pixel_bytes.chunks_exact(WORD_SIZE))
        .for_each(|(temperature, bytes)| {
            *temperature = pixel_to_celsius(assemble_sample(bytes[0], bytes[1]))
        });
}
