// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Typed values for the single byte control and status registers.
use core::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::LibraryError;
use crate::register_map::RegisterAddress;
use crate::util::is_bit_set;

/// Trait for common register functionality.
pub trait Register: Sized {
    /// A bit mask of which bits can be modified by the controller.
    ///
    /// When changing register values on the sensor, the current value should be read, then
    /// bitwise-ANDed with the complement of this mask, then bitwise-ORd with the new value. This
    /// preserves the values of any reserved bits in the registers.
    fn write_mask() -> u8;

    /// The address of this register in the sensor's memory map.
    fn address() -> RegisterAddress;

    /// Decode a register value from the raw byte read from the sensor.
    fn from_raw(raw: u8) -> Result<Self, LibraryError>;

    /// Encode this value into the byte to be written to the sensor.
    fn as_raw(&self) -> u8;
}

/// The power modes of the sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OperatingMode {
    /// Normal operation, the default.
    Normal = 0x00,

    Sleep = 0x10,

    /// Standby, waking every 60 seconds to take a measurement.
    Standby60Seconds = 0x20,

    /// Standby, waking every 10 seconds to take a measurement.
    Standby10Seconds = 0x21,
}

impl OperatingMode {
    /// Decode an operating mode, returning `None` for unrecognized values.
    /// ```
    /// # use grideye::OperatingMode;
    /// assert_eq!(OperatingMode::decode(0x10), Some(OperatingMode::Sleep));
    /// assert_eq!(OperatingMode::decode(0x11), None);
    /// ```
    pub fn decode(raw: u8) -> Option<Self> {
        Self::try_from_primitive(raw).ok()
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Normal
    }
}

impl Register for OperatingMode {
    fn write_mask() -> u8 {
        0xFF
    }

    fn address() -> RegisterAddress {
        RegisterAddress::OperatingMode
    }

    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Self::decode(raw).ok_or(LibraryError::InvalidData("Unknown operating mode"))
    }

    fn as_raw(&self) -> u8 {
        (*self).into()
    }
}

/// The two kinds of reset the sensor supports.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ResetCommand {
    /// Only clear the status register, the interrupt flag, and the interrupt table.
    FlagsOnly = 0x30,

    /// Return to the initial settings, in addition to everything `FlagsOnly` does.
    Initial = 0x3F,
}

impl Register for ResetCommand {
    fn write_mask() -> u8 {
        0xFF
    }

    fn address() -> RegisterAddress {
        RegisterAddress::Reset
    }

    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Self::try_from_primitive(raw)
            .map_err(|_| LibraryError::InvalidData("Unknown reset command"))
    }

    fn as_raw(&self) -> u8 {
        (*self).into()
    }
}

/// The frame rates the sensor supports.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum FrameRate {
    /// 10 frames per second, the default.
    Ten,

    /// 1 frame per second.
    One,
}

impl FrameRate {
    /// Pick the frame rate for a requested number of frames per second.
    ///
    /// Only a request for exactly 1 FPS selects [`FrameRate::One`], everything else selects
    /// [`FrameRate::Ten`].
    pub fn from_fps(fps: u8) -> Self {
        if fps == 1 {
            Self::One
        } else {
            Self::Ten
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::Ten
    }
}

impl Register for FrameRate {
    fn write_mask() -> u8 {
        0x01
    }

    fn address() -> RegisterAddress {
        RegisterAddress::FrameRate
    }

    /// Only 0 is 10 FPS, any other value is treated as 1 FPS.
    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Ok(if raw == 0 { Self::Ten } else { Self::One })
    }

    fn as_raw(&self) -> u8 {
        match self {
            Self::Ten => 0,
            Self::One => 1,
        }
    }
}

impl From<FrameRate> for f32 {
    fn from(frame_rate: FrameRate) -> Self {
        match frame_rate {
            FrameRate::Ten => 10f32,
            FrameRate::One => 1f32,
        }
    }
}

impl From<FrameRate> for u8 {
    /// The number of frames per second.
    fn from(frame_rate: FrameRate) -> Self {
        match frame_rate {
            FrameRate::Ten => 10,
            FrameRate::One => 1,
        }
    }
}

/// How the interrupt limits are compared against pixel values.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum InterruptMode {
    /// Compare the difference between the current and the previous value. The default.
    Difference,

    /// Compare the current value directly.
    Absolute,
}

impl Default for InterruptMode {
    fn default() -> Self {
        Self::Difference
    }
}

/// Represents the possible states of the interrupt control register (0x03).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InterruptControl {
    /// Whether the INT pin is driven when an interrupt occurs.
    enabled: bool,

    mode: InterruptMode,
}

impl InterruptControl {
    pub fn new(enabled: bool, mode: InterruptMode) -> Self {
        Self { enabled, mode }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn mode(&self) -> InterruptMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InterruptMode) {
        self.mode = mode;
    }
}

impl Register for InterruptControl {
    fn write_mask() -> u8 {
        0x03
    }

    fn address() -> RegisterAddress {
        RegisterAddress::InterruptControl
    }

    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        let enabled = is_bit_set(raw, 0);
        let mode = if is_bit_set(raw, 1) {
            InterruptMode::Absolute
        } else {
            InterruptMode::Difference
        };
        Ok(Self { enabled, mode })
    }

    fn as_raw(&self) -> u8 {
        let mut raw = 0u8;
        raw |= self.enabled as u8;
        if self.mode == InterruptMode::Absolute {
            raw |= 1 << 1;
        }
        raw
    }
}

/// The status flags (0x04).
///
/// The same layout is used to clear flags by writing to the status clear register (0x05); set
/// flags are cleared, unset flags are left alone.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatusFlags {
    /// An interrupt has occurred.
    pub interrupt_outbreak: bool,

    /// A pixel temperature has overflowed.
    pub temperature_overflow: bool,

    /// The thermistor temperature has overflowed.
    pub thermistor_overflow: bool,
}

impl StatusFlags {
    /// All flags set, for clearing everything at once.
    pub const ALL: Self = Self {
        interrupt_outbreak: true,
        temperature_overflow: true,
        thermistor_overflow: true,
    };

    pub fn any(&self) -> bool {
        self.interrupt_outbreak || self.temperature_overflow || self.thermistor_overflow
    }
}

impl Register for StatusFlags {
    /// The status register itself is read-only, this is the mask for the status clear register.
    fn write_mask() -> u8 {
        0x07
    }

    fn address() -> RegisterAddress {
        RegisterAddress::Status
    }

    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Ok(Self {
            interrupt_outbreak: is_bit_set(raw, 0),
            temperature_overflow: is_bit_set(raw, 1),
            thermistor_overflow: is_bit_set(raw, 2),
        })
    }

    fn as_raw(&self) -> u8 {
        let mut raw = 0u8;
        raw |= self.interrupt_outbreak as u8;
        raw |= (self.temperature_overflow as u8) << 1;
        raw |= (self.thermistor_overflow as u8) << 2;
        raw
    }
}

/// The moving average control register (0x07).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MovingAverage {
    /// Output the moving average of two frames instead of the raw frame.
    twice: bool,
}

impl MovingAverage {
    pub fn new(twice: bool) -> Self {
        Self { twice }
    }

    pub fn twice(&self) -> bool {
        self.twice
    }

    pub fn set_twice(&mut self, twice: bool) {
        self.twice = twice;
    }
}

impl Register for MovingAverage {
    fn write_mask() -> u8 {
        0x20
    }

    fn address() -> RegisterAddress {
        RegisterAddress::MovingAverage
    }

    fn from_raw(raw: u8) -> Result<Self, LibraryError> {
        Ok(Self {
            twice: is_bit_set(raw, 5),
        })
    }

    fn as_raw(&self) -> u8 {
        (self.twice as u8) << 5
    }
}

impl TryFrom<u8> for FrameRate {
    type Error = LibraryError;

    /// Convert a number of frames per second into a frame rate.
    ///
    /// Unlike [`FrameRate::from_fps`], only the two supported rates are accepted.
    fn try_from(fps: u8) -> Result<Self, Self::Error> {
        match fps {
            10 => Ok(Self::Ten),
            1 => Ok(Self::One),
            _ => Err(LibraryError::InvalidData(
                "The given number does not match a valid frame rate",
            )),
        }
    }
}
