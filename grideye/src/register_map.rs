// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! The register map of the Grid-EYE.
//!
//! All of the other modules look up register offsets from here instead of hard-coding them.
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::LibraryError;

/// The first byte of each register (or block of registers) on the sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RegisterAddress {
    /// Power control register.
    OperatingMode = 0x00,

    /// Reset register. Write-only.
    Reset = 0x01,

    FrameRate = 0x02,

    InterruptControl = 0x03,

    /// Status flags. Read-only.
    Status = 0x04,

    /// Writing a set of flags here clears those flags in [`Status`][RegisterAddress::Status].
    StatusClear = 0x05,

    MovingAverage = 0x07,

    InterruptUpperLimit = 0x08,

    InterruptLowerLimit = 0x0A,

    InterruptHysteresis = 0x0C,

    /// The low byte of the thermistor temperature. The high byte follows at 0x0F.
    Thermistor = 0x0E,

    /// The first of eight bytes, one per row, of interrupt flags.
    InterruptTable = 0x10,

    /// The first pixel of the 128 bytes of pixel data.
    PixelArray = 0x80,
}

impl RegisterAddress {
    /// The full description of this register.
    pub fn info(self) -> &'static RegisterInfo {
        let index = match self {
            Self::OperatingMode => 0,
            Self::Reset => 1,
            Self::FrameRate => 2,
            Self::InterruptControl => 3,
            Self::Status => 4,
            Self::StatusClear => 5,
            Self::MovingAverage => 6,
            Self::InterruptUpperLimit => 7,
            Self::InterruptLowerLimit => 8,
            Self::InterruptHysteresis => 9,
            Self::Thermistor => 10,
            Self::InterruptTable => 11,
            Self::PixelArray => 12,
        };
        &REGISTERS[index]
    }
}

/// How a register can be accessed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

/// How the contents of a register are to be interpreted.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Semantics {
    /// One of a fixed set of byte values.
    Enumeration,

    /// Independent single bit flags.
    Bitfield,

    /// A 12-bit two's complement count of quarter degrees, in the pixel byte layout.
    FixedPoint,

    /// A 12-bit two's complement count of quarter degrees, written with the limit byte layout.
    LimitFixedPoint,

    /// The thermistor's 6 bit/2 bit split quarter degree count.
    ThermistorFixedPoint,

    /// A bitmap with one bit per pixel.
    PixelBitmap,
}

/// The description of a single register (or a contiguous block of registers).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegisterInfo {
    pub name: &'static str,
    pub address: RegisterAddress,
    /// The width of the register in bytes.
    pub width: usize,
    pub access: Access,
    pub semantics: Semantics,
}

impl RegisterInfo {
    /// The offset of the first byte of this register.
    pub fn offset(&self) -> u8 {
        self.address.into()
    }

    /// Check if the given offset falls within this register.
    pub fn contains(&self, offset: u8) -> bool {
        let start = usize::from(self.offset());
        (start..(start + self.width)).contains(&usize::from(offset))
    }
}

macro_rules! register {
    ($name:literal, $address:ident, $width:literal, $access:ident, $semantics:ident) => {
        RegisterInfo {
            name: $name,
            address: RegisterAddress::$address,
            width: $width,
            access: Access::$access,
            semantics: Semantics::$semantics,
        }
    };
}

/// Every register on the sensor, in increasing address order.
pub static REGISTERS: [RegisterInfo; 13] = [
    register!("Operating mode", OperatingMode, 1, ReadWrite, Enumeration),
    register!("Reset", Reset, 1, Write, Enumeration),
    register!("Frame rate", FrameRate, 1, ReadWrite, Enumeration),
    register!("Interrupt control", InterruptControl, 1, ReadWrite, Bitfield),
    register!("Status", Status, 1, Read, Bitfield),
    register!("Status clear", StatusClear, 1, Write, Bitfield),
    register!("Moving average", MovingAverage, 1, ReadWrite, Bitfield),
    register!("Interrupt upper limit", InterruptUpperLimit, 2, ReadWrite, LimitFixedPoint),
    register!("Interrupt lower limit", InterruptLowerLimit, 2, ReadWrite, LimitFixedPoint),
    register!("Interrupt hysteresis", InterruptHysteresis, 2, ReadWrite, LimitFixedPoint),
    register!("Thermistor", Thermistor, 2, Read, ThermistorFixedPoint),
    register!("Interrupt table", InterruptTable, 8, Read, PixelBitmap),
    register!("Pixel array", PixelArray, 128, Read, FixedPoint),
];

/// Look up the register that the given offset belongs to.
///
/// Offsets in the middle of a multi-byte register resolve to that register. Reserved offsets
/// result in an error.
/// ```
/// # use grideye::register_map::{describe, RegisterAddress};
/// assert_eq!(describe(0x09).unwrap().address, RegisterAddress::InterruptUpperLimit);
/// assert!(describe(0x06).is_err());
/// ```
pub fn describe(offset: u8) -> Result<&'static RegisterInfo, LibraryError> {
    REGISTERS
        .iter()
        .find(|info| info.contains(offset))
        .ok_or(LibraryError::UnknownRegister(offset))
}

#[cfg(test)]
mod test {
    use core::convert::TryFrom;

    use super::*;

    #[test]
    fn every_address_has_info() {
        for info in REGISTERS.iter() {
            assert_eq!(info.address.info(), info);
            let round_tripped = RegisterAddress::try_from(info.offset()).unwrap();
            assert_eq!(round_tripped, info.address);
        }
    }

    #[test]
    fn sorted_and_disjoint() {
        for pair in REGISTERS.windows(2) {
            let end = usize::from(pair[0].offset()) + pair[0].width;
            assert!(end <= usize::from(pair[1].offset()), "{} overlaps", pair[0].name);
        }
    }

    #[test]
    fn describe_known() {
        assert_eq!(describe(0x00).unwrap().address, RegisterAddress::OperatingMode);
        assert_eq!(describe(0x05).unwrap().access, Access::Write);
        assert_eq!(describe(0x0D).unwrap().address, RegisterAddress::InterruptHysteresis);
        assert_eq!(describe(0x0F).unwrap().address, RegisterAddress::Thermistor);
        assert_eq!(describe(0x17).unwrap().address, RegisterAddress::InterruptTable);
        assert_eq!(describe(0x80).unwrap().semantics, Semantics::FixedPoint);
        assert_eq!(describe(0xFF).unwrap().address, RegisterAddress::PixelArray);
    }

    #[test]
    fn describe_reserved() {
        assert_eq!(describe(0x06), Err(LibraryError::UnknownRegister(0x06)));
        assert_eq!(describe(0x18), Err(LibraryError::UnknownRegister(0x18)));
        assert_eq!(describe(0x7F), Err(LibraryError::UnknownRegister(0x7F)));
    }
}
