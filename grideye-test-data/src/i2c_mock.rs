// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
extern crate alloc;

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::{Ref, RefCell};

use embedded_hal::blocking::i2c;

use crate::frame_data::{pixel_bytes, SAMPLE_FRAME};

/// The size of the Grid-EYE's address space. Every offset is a single byte.
pub const REGISTER_FILE_LENGTH: usize = 256;

/// The default I²C address, when the AD_SELECT pin is pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x68;

const OPERATING_MODE: u8 = 0x00;
const RESET: u8 = 0x01;
const FRAME_RATE: u8 = 0x02;
const INTERRUPT_CONTROL: u8 = 0x03;
const STATUS: u8 = 0x04;
const STATUS_CLEAR: u8 = 0x05;
const MOVING_AVERAGE: u8 = 0x07;
const THERMISTOR_LOW: u8 = 0x0E;
const INTERRUPT_TABLE: u8 = 0x10;
const PIXEL_ARRAY: u8 = 0x80;

const FLAG_RESET: u8 = 0x30;
const INITIAL_RESET: u8 = 0x3F;

const VALID_OPERATING_MODES: [u8; 4] = [0x00, 0x10, 0x20, 0x21];

// Bits 0 through 2 are documented for both the status and status clear registers.
const STATUS_MASK: u8 = 0x07;

const RECENT_OPERATIONS_QUEUE_LENGTH: usize = 32;

/// How an offset in the register file may be accessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Access {
    /// Readable, with the given mask of writable bits.
    ReadWrite(u8),
    ReadOnly,
    /// Writable, with the given mask of writable bits, but not readable.
    WriteOnly(u8),
    Reserved,
}

fn access(offset: u8) -> Access {
    match offset {
        OPERATING_MODE => Access::ReadWrite(0xFF),
        RESET => Access::WriteOnly(0xFF),
        FRAME_RATE => Access::ReadWrite(0x01),
        INTERRUPT_CONTROL => Access::ReadWrite(0x03),
        STATUS => Access::ReadOnly,
        STATUS_CLEAR => Access::WriteOnly(STATUS_MASK),
        MOVING_AVERAGE => Access::ReadWrite(0x20),
        // Interrupt limits
        0x08..=0x0D => Access::ReadWrite(0xFF),
        // Thermistor, interrupt table, and the pixels
        0x0E..=0x17 | PIXEL_ARRAY..=0xFF => Access::ReadOnly,
        _ => Access::Reserved,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MockError {
    /// The given offset can't be read.
    IllegalAccess(u8),

    /// The given offset can't be written to.
    IllegalWriteAddress(u8),

    /// The given value is illegal for the given offset.
    IllegalWriteValue(u8, u8),

    /// An unknown I2C address was given.
    UnknownI2cAddress(u8),

    /// The requested operation is not allowed.
    ///
    /// This covers situations such as:
    /// * A write-read transaction that writes more than the single register offset.
    /// * A transaction with no data.
    /// * A read that runs past the end of the address space.
    IllegalOperation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum I2cOperation {
    Write { address: u8, length: usize },
    Read { address: u8, length: usize },
}

/// A mock Grid-EYE, implementing the `embedded-hal` I²C traits.
///
/// The register file is shared between clones, so a clone can be kept around to inspect or
/// modify the sensor while another is owned by a driver.
#[derive(Clone, Debug)]
pub struct MockGridEyeBus {
    i2c_address: u8,
    registers: Rc<RefCell<[u8; REGISTER_FILE_LENGTH]>>,
    recent_operations: Rc<RefCell<VecDeque<I2cOperation>>>,
}

impl MockGridEyeBus {
    /// Create a mock sensor at the given address with its power-on settings, reading 25℃ from the
    /// thermistor and every pixel.
    pub fn new(i2c_address: u8) -> Self {
        let mock = Self {
            i2c_address,
            registers: Rc::new(RefCell::new([0u8; REGISTER_FILE_LENGTH])),
            recent_operations: Rc::new(RefCell::new(VecDeque::new())),
        };
        mock.set_thermistor(0x90, 0x01);
        mock.set_pixels(&[[100i16; 8]; 8]);
        mock
    }

    /// The value at an offset, without any access checks or logging.
    pub fn register(&self, offset: u8) -> u8 {
        self.registers.borrow()[usize::from(offset)]
    }

    /// Set the value at an offset, without any access checks or logging.
    pub fn set_register(&self, offset: u8, value: u8) {
        self.registers.borrow_mut()[usize::from(offset)] = value;
    }

    /// Replace the pixel array with the given quarter degree values.
    pub fn set_pixels(&self, quarters: &[[i16; 8]; 8]) {
        let start = usize::from(PIXEL_ARRAY);
        self.registers.borrow_mut()[start..].copy_from_slice(&pixel_bytes(quarters));
    }

    /// Replace the raw pixel array.
    pub fn set_raw_pixels(&self, data: &[u8; 128]) {
        let start = usize::from(PIXEL_ARRAY);
        self.registers.borrow_mut()[start..].copy_from_slice(data);
    }

    /// Set the raw thermistor bytes (0x0E and 0x0F).
    pub fn set_thermistor(&self, low: u8, high: u8) {
        let start = usize::from(THERMISTOR_LOW);
        self.registers.borrow_mut()[start..(start + 2)].copy_from_slice(&[low, high]);
    }

    /// Set the status register, as if the sensor had raised those flags.
    pub fn set_status(&self, status: u8) {
        self.set_register(STATUS, status & STATUS_MASK);
    }

    /// Set the interrupt table, one byte per row.
    pub fn set_interrupt_table(&self, table: &[u8; 8]) {
        let start = usize::from(INTERRUPT_TABLE);
        self.registers.borrow_mut()[start..(start + 8)].copy_from_slice(table);
    }

    fn reset(&self, command: u8) {
        let mut registers = self.registers.borrow_mut();
        registers[usize::from(STATUS)] = 0;
        let table_start = usize::from(INTERRUPT_TABLE);
        registers[table_start..(table_start + 8)].fill(0);
        if command == INITIAL_RESET {
            for offset in [OPERATING_MODE, FRAME_RATE, INTERRUPT_CONTROL, MOVING_AVERAGE] {
                registers[usize::from(offset)] = 0;
            }
            registers[0x08..=0x0D].fill(0);
        }
    }

    fn get(&self, offset: u8, byte_count: usize) -> Result<Ref<'_, [u8]>, MockError> {
        let start = usize::from(offset);
        let end = start + byte_count;
        if byte_count == 0 || end > REGISTER_FILE_LENGTH {
            return Err(MockError::IllegalOperation);
        }
        // Every byte being read has to be readable.
        for index in start..end {
            match access(index as u8) {
                Access::ReadWrite(_) | Access::ReadOnly => (),
                Access::WriteOnly(_) | Access::Reserved => {
                    return Err(MockError::IllegalAccess(index as u8))
                }
            }
        }
        Ok(Ref::map(self.registers.borrow(), |r| &r[start..end]))
    }

    fn set(&mut self, offset: u8, data: &[u8]) -> Result<(), MockError> {
        let start = usize::from(offset);
        if data.is_empty() || start + data.len() > REGISTER_FILE_LENGTH {
            return Err(MockError::IllegalOperation);
        }
        // Check every byte before changing anything.
        for (index, new_value) in (start..).zip(data.iter().copied()) {
            let index = index as u8;
            let mask = match access(index) {
                Access::ReadWrite(mask) | Access::WriteOnly(mask) => mask,
                Access::ReadOnly | Access::Reserved => {
                    return Err(MockError::IllegalWriteAddress(index))
                }
            };
            let legal = match index {
                OPERATING_MODE => VALID_OPERATING_MODES.contains(&new_value),
                RESET => new_value == FLAG_RESET || new_value == INITIAL_RESET,
                STATUS_CLEAR => new_value & !mask == 0,
                _ => check_new_against_mask(self.register(index), mask, new_value),
            };
            if !legal {
                return Err(MockError::IllegalWriteValue(index, new_value));
            }
        }
        for (index, new_value) in (start..).zip(data.iter().copied()) {
            match index as u8 {
                RESET => self.reset(new_value),
                STATUS_CLEAR => {
                    let status = self.register(STATUS);
                    self.set_register(STATUS, status & !new_value);
                }
                _ => self.registers.borrow_mut()[index] = new_value,
            }
        }
        Ok(())
    }

    fn add_operation(&self, operation: I2cOperation) {
        let mut recent_ops = self.recent_operations.borrow_mut();
        recent_ops.push_front(operation);
        recent_ops.truncate(RECENT_OPERATIONS_QUEUE_LENGTH);
    }

    /// The most recent operations, newest first.
    pub fn recent_operations(&self) -> Ref<'_, VecDeque<I2cOperation>> {
        self.recent_operations.borrow()
    }

    pub fn clear_recent_operations(&self) {
        self.recent_operations.borrow_mut().clear()
    }
}

impl i2c::Write for MockGridEyeBus {
    type Error = MockError;

    fn write(&mut self, i2c_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        let (offset, payload) = bytes.split_first().ok_or(MockError::IllegalOperation)?;
        self.set(*offset, payload)?;
        self.add_operation(I2cOperation::Write {
            address: *offset,
            length: payload.len(),
        });
        Ok(())
    }
}

impl i2c::WriteRead for MockGridEyeBus {
    type Error = MockError;

    fn write_read(
        &mut self,
        i2c_address: u8,
        write_buffer: &[u8],
        out_buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        if i2c_address != self.i2c_address {
            return Err(MockError::UnknownI2cAddress(i2c_address));
        }
        // Write-reads should only be writing the register offset
        if write_buffer.len() != 1 || out_buffer.is_empty() {
            return Err(MockError::IllegalOperation);
        }
        let offset = write_buffer[0];
        self.add_operation(I2cOperation::Read {
            address: offset,
            length: out_buffer.len(),
        });
        let read_data = self.get(offset, out_buffer.len())?;
        out_buffer.copy_from_slice(&read_data[..]);
        Ok(())
    }
}

fn check_new_against_mask(existing: u8, mask: u8, new: u8) -> bool {
    (new & !mask) == (existing & !mask)
}

/// A mock sensor showing [`SAMPLE_FRAME`], with the thermistor at 25℃.
pub fn example_grideye_at_address(i2c_address: u8) -> MockGridEyeBus {
    let mock = MockGridEyeBus::new(i2c_address);
    mock.set_pixels(&SAMPLE_FRAME);
    mock
}

#[cfg(test)]
mod test {
    use embedded_hal::blocking::i2c::{Write, WriteRead};

    use super::*;

    #[test]
    fn power_on_state() {
        let mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        assert_eq!(mock.register(OPERATING_MODE), 0x00);
        assert_eq!(mock.register(0x0E), 0x90);
        assert_eq!(mock.register(0x0F), 0x01);
        assert_eq!(mock.register(0x80), 100);
        assert_eq!(mock.register(0x81), 0);
    }

    #[test]
    fn wrong_address() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        let mut buf = [0u8; 1];
        assert_eq!(
            mock.write_read(0x69, &[0x00], &mut buf),
            Err(MockError::UnknownI2cAddress(0x69))
        );
    }

    #[test]
    fn write_only_registers_are_unreadable() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        let mut buf = [0u8; 1];
        assert_eq!(
            mock.write_read(DEFAULT_ADDRESS, &[RESET], &mut buf),
            Err(MockError::IllegalAccess(RESET))
        );
        assert_eq!(
            mock.write_read(DEFAULT_ADDRESS, &[0x06], &mut buf),
            Err(MockError::IllegalAccess(0x06))
        );
    }

    #[test]
    fn reserved_bits_are_protected() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        assert!(mock.write(DEFAULT_ADDRESS, &[FRAME_RATE, 0x01]).is_ok());
        assert_eq!(
            mock.write(DEFAULT_ADDRESS, &[FRAME_RATE, 0x03]),
            Err(MockError::IllegalWriteValue(FRAME_RATE, 0x03))
        );
        assert_eq!(
            mock.write(DEFAULT_ADDRESS, &[OPERATING_MODE, 0x11]),
            Err(MockError::IllegalWriteValue(OPERATING_MODE, 0x11))
        );
        assert_eq!(
            mock.write(DEFAULT_ADDRESS, &[STATUS, 0x00]),
            Err(MockError::IllegalWriteAddress(STATUS))
        );
    }

    #[test]
    fn status_clear() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        mock.set_status(0x07);
        mock.write(DEFAULT_ADDRESS, &[STATUS_CLEAR, 0x02]).unwrap();
        assert_eq!(mock.register(STATUS), 0x05);
    }

    #[test]
    fn resets() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        mock.set_status(0x01);
        mock.set_interrupt_table(&[0xFF; 8]);
        mock.write(DEFAULT_ADDRESS, &[FRAME_RATE, 0x01]).unwrap();
        mock.write(DEFAULT_ADDRESS, &[RESET, FLAG_RESET]).unwrap();
        assert_eq!(mock.register(STATUS), 0);
        assert_eq!(mock.register(0x13), 0);
        assert_eq!(mock.register(FRAME_RATE), 0x01);
        mock.write(DEFAULT_ADDRESS, &[RESET, INITIAL_RESET]).unwrap();
        assert_eq!(mock.register(FRAME_RATE), 0x00);
    }

    #[test]
    fn operations_are_logged() {
        let mut mock = MockGridEyeBus::new(DEFAULT_ADDRESS);
        let mut buf = [0u8; 16];
        mock.write_read(DEFAULT_ADDRESS, &[0x90], &mut buf).unwrap();
        mock.write(DEFAULT_ADDRESS, &[0x08, 0x10]).unwrap();
        let ops = mock.recent_operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(
            ops[0],
            I2cOperation::Write {
                address: 0x08,
                length: 1
            }
        );
        assert_eq!(
            ops[1],
            I2cOperation::Read {
                address: 0x90,
                length: 16
            }
        );
    }
}
