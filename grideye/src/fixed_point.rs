// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Conversions between temperatures and the fixed-point encodings used by the Grid-EYE.
//!
//! Every temperature the sensor deals with has a resolution of 0.25 ℃, and is transferred as a
//! 12-bit two's complement integer counting quarter degrees. Where the sensor differs is in how
//! those 12 bits are laid out across the two bytes of a register:
//!
//! * The pixel array (and the documented layout for the interrupt limits) is little-endian, with
//!   the low byte first and the upper four bits in the low nibble of the second byte. See
//!   [`pixel_from_bytes`] and [`pixel_to_bytes`].
//! * Interrupt limits are written with the upper bits taken from `value >> 9` and the lower byte
//!   masked with `0x7F`. See [`limit_to_bytes`]. This does *not* match the pixel layout: bits 7
//!   and 8 of a limit never reach the sensor, and reading the limits back uses the pixel layout.
//! * The thermistor is read as an upper 6 bit/lower 2 bit split of a 10-bit quarter degree count.
//!   See [`decode_thermistor`].
//!
//! These are deliberately kept as separate functions; they are not interchangeable.
use core::fmt;

// Various floating point operations are not implemented in core, so we use libm to provide them as
// needed.
#[cfg_attr(feature = "std", allow(unused_imports))]
use num_traits::Float;

use crate::error::LibraryError;
use crate::util::sign_extend;

/// The number of bits in a pixel or limit value.
pub const VALUE_BITS: u32 = 12;

/// The effective number of bits in the thermistor value once it has been reduced to quarter
/// degrees.
pub const THERMISTOR_BITS: u32 = 10;

/// The number of bytes in the thermistor register.
pub const THERMISTOR_LENGTH: usize = 2;

/// The smallest value (in quarter degrees) a 12-bit register can hold.
pub const MIN_QUARTERS: i16 = -2048;

/// The largest value (in quarter degrees) a 12-bit register can hold.
pub const MAX_QUARTERS: i16 = 2047;

/// The number of degrees Celsius each count represents.
pub const CELSIUS_PER_QUARTER: f32 = 0.25;

/// A temperature with a resolution of 0.25 ℃.
///
/// Internally this is the signed number of quarter degrees, which is also what the sensor
/// transfers. Comparisons between temperatures are exact.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Temperature(i16);

impl Temperature {
    /// 0 ℃.
    pub const ZERO: Self = Self(0);

    /// Create a temperature from a count of quarter degrees.
    pub const fn from_quarters(quarters: i16) -> Self {
        Self(quarters)
    }

    /// Create a temperature from degrees Celsius, rounding to the nearest quarter degree.
    ///
    /// Values that cannot be stored in a 12-bit register are rejected.
    /// ```
    /// # use grideye::Temperature;
    /// assert_eq!(Temperature::from_celsius(25.1).unwrap().quarters(), 100);
    /// assert!(Temperature::from_celsius(600.0).is_err());
    /// ```
    pub fn from_celsius(celsius: f32) -> Result<Self, LibraryError> {
        let quarters = (celsius / CELSIUS_PER_QUARTER).round();
        if quarters.is_nan() {
            return Err(LibraryError::InvalidData("Temperatures must be a number"));
        }
        if quarters < f32::from(MIN_QUARTERS) || quarters > f32::from(MAX_QUARTERS) {
            // Saturating float to int conversion, the exact value is only used for reporting.
            return Err(LibraryError::Domain(quarters as i32));
        }
        Ok(Self(quarters as i16))
    }

    /// The number of quarter degrees this temperature represents.
    pub const fn quarters(&self) -> i16 {
        self.0
    }

    /// This temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        f32::from(self.0) * CELSIUS_PER_QUARTER
    }
}

impl From<Temperature> for f32 {
    fn from(temperature: Temperature) -> Self {
        temperature.celsius()
    }
}

impl From<Temperature> for f64 {
    fn from(temperature: Temperature) -> Self {
        f64::from(temperature.0) * 0.25
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}℃", self.celsius())
    }
}

/// Decode a raw 12-bit two's complement value into a temperature.
///
/// Only the lowest 12 bits of `raw` are considered.
/// ```
/// # use grideye::fixed_point::decode12;
/// assert_eq!(decode12(0x0800).celsius(), -512.0);
/// assert_eq!(decode12(0x07FF).celsius(), 511.75);
/// ```
pub fn decode12(raw: u16) -> Temperature {
    Temperature(sign_extend(raw, VALUE_BITS))
}

/// Encode a signed count of quarter degrees into a 12-bit two's complement value.
pub fn encode12(quarters: i16) -> Result<u16, LibraryError> {
    if !(MIN_QUARTERS..=MAX_QUARTERS).contains(&quarters) {
        return Err(LibraryError::Domain(i32::from(quarters)));
    }
    // Casting to u16 is already two's complement, just drop the upper four bits.
    Ok((quarters as u16) & 0x0FFF)
}

/// Reassemble a 12-bit value from the pixel register layout.
///
/// The first byte is the low byte, and the low nibble of the second byte is the upper four bits.
pub fn pixel_from_bytes(low: u8, high: u8) -> u16 {
    u16::from_le_bytes([low, high & 0x0F])
}

/// Split a 12-bit value into the pixel register layout, low byte first.
pub fn pixel_to_bytes(value: u16) -> [u8; 2] {
    (value & 0x0FFF).to_le_bytes()
}

/// Split a 12-bit value into the bytes written to the interrupt limit registers, low byte first.
///
/// The upper byte is `value >> 9` and the lower byte is `value & 0x7F`, so bits 7 and 8 of the
/// value are not transferred.
// TODO: The datasheet documents the limits with the same layout as the pixels. Switch to
// `pixel_to_bytes` once this has been checked against hardware.
pub fn limit_to_bytes(value: u16) -> [u8; 2] {
    let high = (value >> 9) as u8;
    let low = (value & 0x7F) as u8;
    [low, high]
}

/// Decode a temperature from the raw thermistor register bytes.
///
/// `high` is the byte at 0x0F, `low` the byte at 0x0E.
pub fn decode_thermistor(high: u8, low: u8) -> Temperature {
    Temperature(sign_extend(thermistor_raw(high, low), THERMISTOR_BITS))
}

/// Combine the thermistor register bytes into an unscaled count of quarter degrees.
///
/// The upper byte contributes the upper six bits and the lower byte the lower two. The sum is
/// masked to 10 bits, so anything the upper byte shifts past bit 9 is discarded.
pub fn thermistor_raw(high: u8, low: u8) -> u16 {
    let upper = u16::from(high) << 6;
    let lower = u16::from(low) >> 2;
    (upper + lower) & 0x03FF
}
