// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! A pure-Rust library for accessing the Panasonic AMG88xx (Grid-EYE) 8×8 thermopile arrays over
//! I²C.
//!
//! Compared to larger thermal cameras, the Grid-EYE is simple: every register is a single byte
//! offset, there is no calibration data, and every temperature is a 12-bit two's complement count
//! of quarter degrees. Most of the work is in getting those encodings right, and they are
//! different enough between the pixels, the interrupt limits, and the thermistor that each has its
//! own function in [`fixed_point`].
//!
//! This library uses the [`embedded-hal`][embedded-hal] I²C traits, meaning you should be able to
//! use this library on other platforms, as long as there's an `embedded-hal` I²C implementation
//! available. This library is also `no_std` compatible, with the `libm` feature providing the
//! floating point operations that `core` lacks.
//!
//! [embedded-hal]: https://docs.rs/embedded-hal/*/embedded_hal/blocking/i2c/index.html
//!
//! # Driver
//! ```no_run
//! use std::thread::sleep;
//! use std::time::Duration;
//! use grideye::{GridEyeDriver, DEFAULT_ADDRESS};
//! use linux_embedded_hal::I2cdev;
//!
//! let i2c_bus = I2cdev::new("/dev/i2c-1").expect("/dev/i2c-1 needs to be an I2C controller");
//! let mut sensor = GridEyeDriver::new(i2c_bus, DEFAULT_ADDRESS);
//! println!("The sensor is at {}", sensor.thermistor_temperature()?);
//! // Default frame rate is 10Hz
//! sleep(Duration::from_millis(100));
//! let frame = sensor.frame()?;
//! println!("The hottest pixel is {}", frame.max().value);
//! # Ok::<(), grideye::Error<I2cdev>>(())
//! ```
//! [`GridEyeDriver`] takes ownership of the bus, and reads (or writes) the sensor every time one of
//! its methods is called; nothing is cached.
//!
//! # Codec
//! The encoding and decoding functions are usable without a driver, for when the register bytes
//! come from somewhere else (a different bus abstraction, a log file, a test). A [`Frame`] can be
//! assembled from anything implementing [`LineSource`][frame::LineSource], including closures:
//! ```
//! use grideye::frame::{assemble_frame, LineData};
//! use grideye::LibraryError;
//!
//! let frame = assemble_frame(|_line: usize| -> Result<LineData, LibraryError> {
//!     // 0x0190 is 100℃
//!     Ok([0x90, 0x01].iter().copied().cycle().take(16).collect())
//! })?;
//! assert_eq!(frame.min().value.celsius(), 100.0);
//! # Ok::<(), LibraryError>(())
//! ```

#![no_std]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("At least one of the `std` or `libm` features must be enabled");

pub mod driver;
pub mod error;
pub mod fixed_point;
pub mod frame;
pub mod grayscale;
pub mod interrupt;
pub mod register;
pub mod register_map;
mod util;

pub use driver::{GridEyeDriver, ALTERNATE_ADDRESS, DEFAULT_ADDRESS};
pub use error::{Error, LibraryError};
pub use fixed_point::Temperature;
pub use frame::{Extremum, Frame};
pub use grayscale::GrayscaleImage;
pub use interrupt::{InterruptLimits, InterruptTable, PixelCoordinate};
pub use register::*;
pub use register_map::RegisterAddress;
