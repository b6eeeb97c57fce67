// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Turning temperatures into colours.
//!
//! There are two encodings available. [`convert_to_heatmap`] produces full 8-bit per channel
//! [`Rgb`] pixels along a blue → cyan → green → yellow → red ramp over a caller-chosen
//! [`TemperatureRange`]. [`convert_to_heatmap_packed`] produces single byte [`Rgb332`] pixels
//! (blue fading into red, with green peaking in the middle) over the default 0–55 ℃ range, for
//! when a frame buffer needs to be small.
//!
//! Temperatures outside of the range are clamped to the nearest end, so the output is always a
//! valid colour.
use num_traits::Float;

use crate::conversion::PIXEL_COUNT;
use crate::error::LibraryError;

/// A 24-bit colour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// An 8-bit colour, packed as `RRRGGGBB`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Rgb332(pub u8);

impl Rgb332 {
    /// The 3-bit red channel.
    pub fn red(&self) -> u8 {
        self.0 >> 5
    }

    /// The 3-bit green channel.
    pub fn green(&self) -> u8 {
        (self.0 >> 2) & 0x07
    }

    /// The 2-bit blue channel.
    pub fn blue(&self) -> u8 {
        self.0 & 0x03
    }

    /// Expand back out to 8 bits per channel, stretching each channel to the full 0–255 range.
    pub fn to_rgb(&self) -> Rgb {
        let stretch = |value: u8, max: u16| (u16::from(value) * 255 / max) as u8;
        Rgb {
            r: stretch(self.red(), 7),
            g: stretch(self.green(), 7),
            b: stretch(self.blue(), 3),
        }
    }
}

/// Pack a colour by keeping the top 3 bits of red and green, and the top 2 bits of blue.
impl From<Rgb> for Rgb332 {
    fn from(color: Rgb) -> Self {
        Self((color.r & 0xE0) | ((color.g & 0xE0) >> 3) | (color.b >> 6))
    }
}

impl From<Rgb332> for u8 {
    fn from(color: Rgb332) -> Self {
        color.0
    }
}

/// The temperatures mapped to the two ends of a colour scale.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureRange {
    min: f32,
    max: f32,
}

impl TemperatureRange {
    /// The 0–55 ℃ range used when no other range is given.
    pub const DEFAULT: Self = Self {
        min: 0.0,
        max: 55.0,
    };

    /// Create a new range, in ℃.
    ///
    /// Both ends must be finite, and `min` must be strictly less than `max`.
    pub fn new(min: f32, max: f32) -> Result<Self, LibraryError> {
        if min.is_finite() && max.is_finite() && min < max {
            Ok(Self { min, max })
        } else {
            Err(LibraryError::InvalidRange)
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Map a temperature onto [0, 1], clamping anything outside of the range.
    ///
    /// NaN maps to 0.
    pub fn normalize(&self, temperature: f32) -> f32 {
        let normalized = (temperature - self.min) / (self.max - self.min);
        if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        }
    }
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Width of each band in the full colour ramp.
const BAND_WIDTH: f32 = 0.25;

/// Scale a fraction in [0, 1] to a channel value, truncating.
fn channel(fraction: f32) -> u8 {
    (255.0 * fraction) as u8
}

/// The full colour heatmap colour for a single temperature.
pub fn heatmap_color(temperature: f32, range: TemperatureRange) -> Rgb {
    let t = range.normalize(temperature);
    if t < BAND_WIDTH {
        // Blue to cyan
        Rgb::new(0, channel(t / BAND_WIDTH), 255)
    } else if t < 2.0 * BAND_WIDTH {
        // Cyan to green
        Rgb::new(0, 255, channel(1.0 - (t - BAND_WIDTH) / BAND_WIDTH))
    } else if t < 3.0 * BAND_WIDTH {
        // Green to yellow
        Rgb::new(channel((t - 2.0 * BAND_WIDTH) / BAND_WIDTH), 255, 0)
    } else {
        // Yellow to red
        Rgb::new(255, channel(1.0 - (t - 3.0 * BAND_WIDTH) / BAND_WIDTH), 0)
    }
}

/// The packed heatmap colour for a single temperature, over [`TemperatureRange::DEFAULT`].
pub fn heatmap_color_packed(temperature: f32) -> Rgb332 {
    let n = TemperatureRange::DEFAULT.normalize(temperature);
    let green = 1.0 - 2.0 * Float::abs(n - 0.5);
    Rgb::new(channel(n), channel(green), channel(1.0 - n)).into()
}

/// Convert a frame of temperatures into full colour heatmap pixels.
pub fn convert_to_heatmap(
    temperatures: &[f32; PIXEL_COUNT],
    range: TemperatureRange,
) -> [Rgb; PIXEL_COUNT] {
    let mut colors = [Rgb::default(); PIXEL_COUNT];
    convert_to_heatmap_to(temperatures, &mut colors, range);
    colors
}

/// Like [`convert_to_heatmap`], but writing into an existing buffer.
pub fn convert_to_heatmap_to(
    temperatures: &[f32; PIXEL_COUNT],
    destination: &mut [Rgb; PIXEL_COUNT],
    range: TemperatureRange,
) {
    destination
        .iter_mut()
        .zip(temperatures.iter())
        .for_each(|(color, temperature)| *color = heatmap_color(*temperature, range));
}

/// Convert a frame of temperatures into packed heatmap pixels.
///
/// The range is always [`TemperatureRange::DEFAULT`].
pub fn convert_to_heatmap_packed(temperatures: &[f32; PIXEL_COUNT]) -> [Rgb332; PIXEL_COUNT] {
    let mut colors = [Rgb332::default(); PIXEL_COUNT];
    convert_to_heatmap_packed_to(temperatures, &mut colors);
    colors
}

/// Like [`convert_to_heatmap_packed`], but writing into an existing buffer.
pub fn convert_to_heatmap_packed_to(
    temperatures: &[f32; PIXEL_COUNT],
    destination: &mut [Rgb332; PIXEL_COUNT],
) {
    destination
        .iter_mut()
        .zip(temperatures.iter())
        .for_each(|(color, temperature)| *color = heatmap_color_packed(*temperature));
}
