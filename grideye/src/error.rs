// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

use embedded_hal::blocking::i2c;

/// Errors that don't involve I²C.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq)]
pub enum LibraryError {
    /// A value is outside of the range a 12-bit two's complement register can hold.
    ///
    /// The value is given in the unit being encoded (quarter degrees for temperatures).
    Domain(i32),

    /// A line of pixel data had fewer bytes than expected.
    ShortRead {
        /// The index of the line being read (0 through 7).
        line: usize,
        /// How many bytes were actually provided.
        length: usize,
    },

    /// A fixed-length register block was given the wrong number of bytes.
    Length {
        /// The number of bytes the register block requires.
        expected: usize,
        /// The number of bytes that were given.
        actual: usize,
    },

    /// There is no register at the given offset (for example, a reserved address).
    UnknownRegister(u8),

    /// A linear remapping was requested with a source range of zero width.
    DegenerateRange,

    /// When a value from the camera is malformed in some way.
    InvalidData(&'static str),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Domain(value) => write!(
                f,
                "{} is outside of the range of a 12-bit two's complement value",
                value
            ),
            LibraryError::ShortRead { line, length } => write!(
                f,
                "Line {} only had {} bytes of pixel data",
                line, length
            ),
            LibraryError::Length { expected, actual } => {
                write!(f, "Expected {} bytes, got {}", expected, actual)
            }
            LibraryError::UnknownRegister(offset) => {
                write!(f, "No register is defined at {:#04X}", offset)
            }
            LibraryError::DegenerateRange => write!(f, "The source range has a width of zero"),
            LibraryError::InvalidData(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LibraryError {}

/// The error type for operations that touch the I²C bus.
pub enum Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Errors originating from the I²C implementation when reading data.
    I2cWriteReadError(<I2C as i2c::WriteRead>::Error),

    /// Errors originating from the I²C implementation when writing data.
    I2cWriteError(<I2C as i2c::Write>::Error),

    /// Errors originating from within this library.
    LibraryError(LibraryError),
}

// The read and write error types are reached through qualified paths, which derive doesn't bound,
// so Clone and PartialEq are written out.
impl<I2C> Clone for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: Clone,
    <I2C as i2c::Write>::Error: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Error::I2cWriteReadError(i2c_error) => Error::I2cWriteReadError(i2c_error.clone()),
            Error::I2cWriteError(i2c_error) => Error::I2cWriteError(i2c_error.clone()),
            Error::LibraryError(err) => Error::LibraryError(err.clone()),
        }
    }
}

impl<I2C> PartialEq for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: PartialEq,
    <I2C as i2c::Write>::Error: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::I2cWriteReadError(lhs), Error::I2cWriteReadError(rhs)) => lhs == rhs,
            (Error::I2cWriteError(lhs), Error::I2cWriteError(rhs)) => lhs == rhs,
            (Error::LibraryError(lhs), Error::LibraryError(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

// Custom Debug implementation so that I2C doesn't need to implement Debug (like the one from
// linux-embedded-hal).
impl<I2C> fmt::Debug for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => f
                .debug_tuple("Error::I2cWriteReadError")
                .field(i2c_error)
                .finish(),
            Error::I2cWriteError(i2c_error) => f
                .debug_tuple("Error::I2cWriteError")
                .field(i2c_error)
                .finish(),
            Error::LibraryError(err) => f.debug_tuple("Error::LibraryError").field(err).finish(),
        }
    }
}

impl<I2C> fmt::Display for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: fmt::Debug,
    <I2C as i2c::Write>::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2cWriteReadError(i2c_error) => {
                write!(f, "I2C Error while reading: {:?}", i2c_error)
            }
            Error::I2cWriteError(i2c_error) => {
                write!(f, "I2C Error while writing: {:?}", i2c_error)
            }
            Error::LibraryError(err) => write!(f, "Library Error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<I2C> std::error::Error for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: std::error::Error + 'static,
    <I2C as i2c::Write>::Error: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::I2cWriteReadError(i2c_error) => Some(i2c_error),
            Error::I2cWriteError(i2c_error) => Some(i2c_error),
            Error::LibraryError(lib_err) => Some(lib_err),
        }
    }
}

impl<I2C> From<LibraryError> for Error<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    fn from(lib_err: LibraryError) -> Self {
        Self::LibraryError(lib_err)
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::string::ToString;

    use grideye_test_data::{MockError, MockGridEyeBus};

    use super::{Error, LibraryError};

    #[test]
    fn display_messages() {
        assert_eq!(
            LibraryError::UnknownRegister(0x06).to_string(),
            "No register is defined at 0x06"
        );
        assert_eq!(
            LibraryError::ShortRead { line: 3, length: 15 }.to_string(),
            "Line 3 only had 15 bytes of pixel data"
        );
        assert_eq!(
            LibraryError::Length {
                expected: 8,
                actual: 7
            }
            .to_string(),
            "Expected 8 bytes, got 7"
        );
    }

    #[test]
    fn bus_errors_compare() {
        let read_error: Error<MockGridEyeBus> =
            Error::I2cWriteReadError(MockError::IllegalAccess(6));
        assert_eq!(read_error.clone(), read_error);
        assert_ne!(read_error, Error::I2cWriteError(MockError::IllegalAccess(6)));
        let lib_error: Error<MockGridEyeBus> = LibraryError::DegenerateRange.into();
        assert_eq!(lib_error, Error::LibraryError(LibraryError::DegenerateRange));
        assert_ne!(lib_error, Error::LibraryError(LibraryError::UnknownRegister(0x06)));
    }
}
