// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust library for the Panasonic AMG88xx (Grid-EYE) family of 8×8 thermal sensors, like
//! the AMG8833.
//!
//! The sensor needs no calibration data, so getting temperatures out of it is straightforward:
//! bring it up, then read the on-board thermistor or the 64 pixels whenever you like.
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C traits, meaning you should be able to
//! use this library on other platforms, as long as there's an `embedded-hal` I²C implementation
//! available. This library is also `no_std` compatible, and doesn't allocate.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # High-Level API
//! ```no_run
//! use amg88xx::{convert_to_heatmap, Amg88xx, TemperatureRange};
//! use linux_embedded_hal::{Delay, I2cdev};
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! // The sensor is always addressed at 0x69
//! let mut sensor = Amg88xx::new(i2c_bus);
//! sensor.begin(&mut Delay)?;
//! let ambient = sensor.read_thermistor()?;
//! let temperatures = sensor.read_pixels()?;
//! let colours = convert_to_heatmap(&temperatures, TemperatureRange::default());
//! # Ok::<(), amg88xx::Error<I2cdev>>(())
//! ```
//! [`Amg88xx::begin`] puts the sensor into normal mode, resets it, sets the frame rate to 10 FPS
//! and disables interrupts, then waits 100ms for the sensor to settle. Nothing is retried, so if
//! bring-up fails it's safe to just call `begin` again.
//!
//! # Low-Level API
//! The [`transport`] module has the two bus primitives everything else is built on, and the
//! [`conversion`] module turns raw samples into ℃. They're exposed for cases where the driver
//! doesn't fit, like sharing one pixel buffer between several sensors.
//!
//! # Logging
//! Enabling the `log` feature logs through the [`log`](https://docs.rs/log) crate, and enabling
//! `defmt` logs through [`defmt`](https://docs.rs/defmt). Only one of them can be enabled.
//!
//! # Sub-zero Temperatures
//! Samples are converted as unsigned values, so readings below 0 ℃ come out as very large
//! temperatures. See the [`conversion`] module for details.

#![no_std]
#![allow(clippy::float_cmp)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("Either the 'std' or 'libm' feature must be enabled.");

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("Only one of the 'log' or 'defmt' features can be enabled.");

// Must come first so the logging macros are visible in the other modules.
#[macro_use]
mod macros;

pub mod conversion;
#[doc(hidden)]
pub mod driver;
#[doc(hidden)]
pub mod error;
pub mod heatmap;
pub mod register;
pub mod transport;
mod util;

pub use conversion::{HEIGHT, PIXEL_COUNT, WIDTH};
#[doc(inline)]
pub use driver::{Amg88xx, SETTLE_DELAY_MS};
#[doc(inline)]
pub use error::{Error, LibraryError};
pub use heatmap::{
    convert_to_heatmap, convert_to_heatmap_packed, convert_to_heatmap_packed_to,
    convert_to_heatmap_to, heatmap_color, heatmap_color_packed, Rgb, Rgb332, TemperatureRange,
};
pub use register::*;
pub use transport::DEVICE_ADDRESS;
