// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The interrupt table and the interrupt limit registers.
//!
//! When interrupts are enabled, the sensor compares each pixel against the upper and lower
//! limits, and flags the pixels that are outside of them in the interrupt table. Only the register
//! encoding is handled here; delivering interrupts (via the INT pin) is left to the application.
use core::fmt;

use bitvec::array::BitArray;
use bitvec::order::Lsb0;

use crate::error::LibraryError;
use crate::fixed_point::{decode12, encode12, limit_to_bytes, pixel_from_bytes, Temperature};
use crate::frame::{HEIGHT, WIDTH};

/// The number of bytes in the interrupt table, one per row.
pub const TABLE_LENGTH: usize = HEIGHT;

/// The number of bytes making up the three interrupt limits.
pub const LIMITS_LENGTH: usize = 6;

type TableBits = BitArray<[u8; TABLE_LENGTH], Lsb0>;

/// The location of a pixel.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct PixelCoordinate {
    pub row: usize,
    pub column: usize,
}

impl From<(usize, usize)> for PixelCoordinate {
    /// Create a coordinate from a `(row, column)` pair.
    fn from((row, column): (usize, usize)) -> Self {
        Self { row, column }
    }
}

/// The set of pixels that have triggered an interrupt.
///
/// Each byte of the table is one row, with the least significant bit being the first column.
#[derive(Clone, Copy, Default)]
pub struct InterruptTable {
    bits: TableBits,
}

impl InterruptTable {
    /// Decode the interrupt table from the eight bytes read starting at 0x10.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LibraryError> {
        if bytes.len() != TABLE_LENGTH {
            return Err(LibraryError::Length {
                expected: TABLE_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut raw = [0u8; TABLE_LENGTH];
        raw.copy_from_slice(bytes);
        Ok(Self {
            bits: TableBits::new(raw),
        })
    }

    /// The raw bytes of the table.
    pub fn as_bytes(&self) -> [u8; TABLE_LENGTH] {
        self.bits.into_inner()
    }

    /// Check if the pixel at the given row and column has been flagged.
    pub fn contains(&self, row: usize, column: usize) -> bool {
        if row >= HEIGHT || column >= WIDTH {
            return false;
        }
        self.bits[row * WIDTH + column]
    }

    /// The number of flagged pixels.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Iterate over the flagged pixels, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = PixelCoordinate> + '_ {
        self.bits.iter_ones().map(|index| PixelCoordinate {
            row: index / WIDTH,
            column: index % WIDTH,
        })
    }
}

impl PartialEq for InterruptTable {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for InterruptTable {}

impl fmt::Debug for InterruptTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Decode the interrupt table from the eight bytes read starting at 0x10.
///
/// ```
/// # use grideye::interrupt::{decode_interrupt_bitmap, PixelCoordinate};
/// let table = decode_interrupt_bitmap(&[0, 0, 0, 0x01, 0, 0, 0, 0])?;
/// assert!(table.iter().eq([PixelCoordinate { row: 3, column: 0 }]));
/// # Ok::<(), grideye::LibraryError>(())
/// ```
pub fn decode_interrupt_bitmap(bytes: &[u8]) -> Result<InterruptTable, LibraryError> {
    InterruptTable::from_bytes(bytes)
}

/// The thresholds used to trigger interrupts.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InterruptLimits {
    pub upper: Temperature,
    pub lower: Temperature,
    pub hysteresis: Temperature,
}

impl InterruptLimits {
    pub fn new(upper: Temperature, lower: Temperature, hysteresis: Temperature) -> Self {
        Self {
            upper,
            lower,
            hysteresis,
        }
    }

    /// Encode the limits into the bytes to be written to 0x08 through 0x0D, in that order.
    pub fn to_register_bytes(&self) -> Result<[u8; LIMITS_LENGTH], LibraryError> {
        encode_limits(self.upper, self.lower, self.hysteresis)
    }

    /// Decode limits read back from 0x08 through 0x0D.
    ///
    /// Reading uses the documented register layout (the same as the pixels), which is not the
    /// layout [`to_register_bytes`][InterruptLimits::to_register_bytes] writes.
    pub fn from_register_bytes(bytes: &[u8]) -> Result<Self, LibraryError> {
        if bytes.len() != LIMITS_LENGTH {
            return Err(LibraryError::Length {
                expected: LIMITS_LENGTH,
                actual: bytes.len(),
            });
        }
        let decode = |pair: &[u8]| decode12(pixel_from_bytes(pair[0], pair[1]));
        Ok(Self {
            upper: decode(&bytes[0..2]),
            lower: decode(&bytes[2..4]),
            hysteresis: decode(&bytes[4..6]),
        })
    }
}

/// Encode the three interrupt thresholds into register order.
///
/// The bytes are upper-low, upper-high, lower-low, lower-high, hysteresis-low and hysteresis-high,
/// matching the register offsets 0x08 through 0x0D.
pub fn encode_limits(
    upper: Temperature,
    lower: Temperature,
    hysteresis: Temperature,
) -> Result<[u8; LIMITS_LENGTH], LibraryError> {
    let mut bytes = [0u8; LIMITS_LENGTH];
    for (destination, limit) in bytes.chunks_exact_mut(2).zip([upper, lower, hysteresis]) {
        let encoded = encode12(limit.quarters())?;
        destination.copy_from_slice(&limit_to_bytes(encoded));
    }
    Ok(bytes)
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    fn coordinates(table: &InterruptTable) -> Vec<(usize, usize)> {
        table.iter().map(|c| (c.row, c.column)).collect()
    }

    #[test]
    fn empty_table() {
        let table = decode_interrupt_bitmap(&[0u8; 8]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn single_pixel() {
        let table = decode_interrupt_bitmap(&[0, 0, 0, 0x01, 0, 0, 0, 0]).unwrap();
        assert_eq!(coordinates(&table), [(3, 0)]);
        assert!(table.contains(3, 0));
        assert!(!table.contains(0, 3));
    }

    #[test]
    fn full_row() {
        let table = decode_interrupt_bitmap(&[0xFF, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let expected: Vec<(usize, usize)> = (0..8).map(|column| (0, column)).collect();
        assert_eq!(coordinates(&table), expected);
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn bit_position_is_column() {
        let table = decode_interrupt_bitmap(&[0, 0x80, 0, 0, 0, 0, 0x24, 0]).unwrap();
        assert_eq!(coordinates(&table), [(1, 7), (6, 2), (6, 5)]);
        assert_eq!(table.as_bytes(), [0, 0x80, 0, 0, 0, 0, 0x24, 0]);
    }

    #[test]
    fn out_of_bounds_not_contained() {
        let table = decode_interrupt_bitmap(&[0xFF; 8]).unwrap();
        assert_eq!(table.len(), 64);
        assert!(!table.contains(8, 0));
        assert!(!table.contains(0, 8));
    }

    #[test]
    fn wrong_length() {
        assert_eq!(
            decode_interrupt_bitmap(&[0u8; 7]),
            Err(LibraryError::Length {
                expected: 8,
                actual: 7
            })
        );
        assert!(decode_interrupt_bitmap(&[0u8; 9]).is_err());
    }

    #[test]
    fn encode_limits_register_order() {
        let limits = InterruptLimits::new(
            Temperature::from_quarters(120),
            Temperature::from_quarters(-4),
            Temperature::from_quarters(1000),
        );
        // Pinned to the exact bytes written to the sensor.
        assert_eq!(
            limits.to_register_bytes(),
            Ok([0x78, 0x00, 0x7C, 0x07, 0x68, 0x01])
        );
    }

    #[test]
    fn encode_limits_out_of_range() {
        let result = encode_limits(
            Temperature::from_quarters(2048),
            Temperature::ZERO,
            Temperature::ZERO,
        );
        assert_eq!(result, Err(LibraryError::Domain(2048)));
    }

    #[test]
    fn decode_limits() {
        let limits =
            InterruptLimits::from_register_bytes(&[0x78, 0x00, 0xFC, 0x0F, 0x04, 0x00]).unwrap();
        assert_eq!(limits.upper.celsius(), 30.0);
        assert_eq!(limits.lower.celsius(), -1.0);
        assert_eq!(limits.hysteresis.celsius(), 1.0);
        assert!(InterruptLimits::from_register_bytes(&[0u8; 4]).is_err());
    }
}
