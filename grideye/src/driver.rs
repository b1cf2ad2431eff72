// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use embedded_hal::blocking::i2c;
use paste::paste;

use crate::error::Error;
use crate::fixed_point::{decode_thermistor, thermistor_raw, Temperature, THERMISTOR_LENGTH};
use crate::frame::{assemble_frame, line_address, Frame, LineData, LINE_LENGTH};
use crate::grayscale::{raw_grayscale, remap, GrayscaleImage};
use crate::interrupt::{InterruptLimits, InterruptTable, LIMITS_LENGTH, TABLE_LENGTH};
use crate::register::*;
use crate::register_map::RegisterAddress;
use crate::util::{debug, trace};

/// The default I²C address of the sensor, used when the AD_SELECT pin is pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// The I²C address of the sensor when the AD_SELECT pin is pulled high.
pub const ALTERNATE_ADDRESS: u8 = 0x69;

/// DRY macro for the set_* methods in `GridEyeDriver` that modify a single register field.
///
/// Most of the fields are boolean values, so that's the default type. Otherwise, add the type in
/// before the docstring.
macro_rules! set_register_field {
    { $register_access:ident, $field:ident, $setter:ident, $doc:literal } => {
        set_register_field! {
            $register_access,
            $field,
            $setter,
            bool,
            $doc
        }
    };
    { $register_access:ident, $field:ident, $setter:ident, $typ:ty, $doc:literal } => {
    paste! {
        #[doc = $doc]
        pub fn $setter(&mut self, new_value: $typ) -> Result<(), Error<I2C>> {
            let mut current = self.$register_access()?;
            if current.$field() != new_value {
                current.[< set_ $field >](new_value);
                self.set_register(current)
            } else {
                Ok(())
            }
        }
    }};
}

/// A driver for a Grid-EYE (AMG88xx) on an I²C bus.
///
/// The driver owns the bus for its lifetime; use [`release`][GridEyeDriver::release] to get it
/// back. No communication with the sensor happens until a method is called, and nothing is cached,
/// so every method reflects the current state of the sensor.
#[derive(Clone, Debug)]
pub struct GridEyeDriver<I2C> {
    /// The I²C bus this sensor is accessible on.
    bus: I2C,

    /// The I²C address this sensor is accessible at.
    address: u8,
}

impl<I2C> GridEyeDriver<I2C>
where
    I2C: i2c::WriteRead + i2c::Write,
{
    /// Create a `GridEyeDriver` for accessing the sensor at the given I²C address.
    ///
    /// Grid-EYEs can only be at one of two addresses, [`DEFAULT_ADDRESS`] or
    /// [`ALTERNATE_ADDRESS`], but any address is accepted here for the sake of I²C multiplexers
    /// and the like.
    pub fn new(bus: I2C, address: u8) -> Self {
        debug!("Creating Grid-EYE driver at {=u8:#x}", address);
        Self { bus, address }
    }

    /// Consume the driver, returning the I²C bus.
    pub fn release(self) -> I2C {
        self.bus
    }

    /// The I²C address of the sensor.
    pub fn address(&self) -> u8 {
        self.address
    }

    fn register<R: Register>(&mut self) -> Result<R, Error<I2C>> {
        let raw = read_byte(&mut self.bus, self.address, R::address().into())
            .map_err(Error::I2cWriteReadError)?;
        Ok(R::from_raw(raw)?)
    }

    /// Write a register value, preserving any reserved bits.
    ///
    /// Registers that are entirely writable are written directly, otherwise the current value is
    /// read first and only the writable bits are changed.
    fn set_register<R: Register>(&mut self, register: R) -> Result<(), Error<I2C>> {
        let offset: u8 = R::address().into();
        let mask = R::write_mask();
        let new_value = if mask == 0xFF {
            register.as_raw()
        } else {
            let current =
                read_byte(&mut self.bus, self.address, offset).map_err(Error::I2cWriteReadError)?;
            (current & !mask) | (register.as_raw() & mask)
        };
        trace!("Writing {=u8:#x} to register {=u8:#x}", new_value, offset);
        write_byte(&mut self.bus, self.address, offset, new_value).map_err(Error::I2cWriteError)
    }

    fn read_block(
        &mut self,
        register: RegisterAddress,
        buffer: &mut [u8],
    ) -> Result<(), Error<I2C>> {
        read_block(&mut self.bus, self.address, register.into(), buffer)
            .map_err(Error::I2cWriteReadError)
    }

    /// Read the current operating mode.
    ///
    /// `None` is returned if the sensor reports a value that isn't a known mode.
    pub fn operating_mode(&mut self) -> Result<Option<OperatingMode>, Error<I2C>> {
        let raw = read_byte(
            &mut self.bus,
            self.address,
            RegisterAddress::OperatingMode.into(),
        )
        .map_err(Error::I2cWriteReadError)?;
        Ok(OperatingMode::decode(raw))
    }

    /// Change the operating mode.
    ///
    /// When leaving [sleep mode][OperatingMode::Sleep], the datasheet says to wait 50ms, then
    /// perform an [initial reset][ResetCommand::Initial].
    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), Error<I2C>> {
        debug!("Setting operating mode to {}", mode);
        self.set_register(mode)
    }

    /// Reset the sensor.
    ///
    /// A [flag reset][ResetCommand::FlagsOnly] clears the status register, the interrupt flag, and
    /// the interrupt table. An [initial reset][ResetCommand::Initial] also returns the settings to
    /// their initial values.
    pub fn reset(&mut self, command: ResetCommand) -> Result<(), Error<I2C>> {
        debug!("Resetting sensor: {}", command);
        write_byte(
            &mut self.bus,
            self.address,
            ResetCommand::address().into(),
            command.as_raw(),
        )
        .map_err(Error::I2cWriteError)
    }

    /// Read the frame rate.
    ///
    /// The default frame rate is [10 FPS][FrameRate::Ten].
    pub fn frame_rate(&mut self) -> Result<FrameRate, Error<I2C>> {
        self.register()
    }

    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) -> Result<(), Error<I2C>> {
        self.set_register(frame_rate)
    }

    /// Read the interrupt control register.
    ///
    /// By default interrupts are disabled, using [difference mode][InterruptMode::Difference].
    pub fn interrupt_control(&mut self) -> Result<InterruptControl, Error<I2C>> {
        self.register()
    }

    pub fn set_interrupt_control(&mut self, control: InterruptControl) -> Result<(), Error<I2C>> {
        self.set_register(control)
    }

    set_register_field! {
        interrupt_control,
        enabled,
        set_interrupts_enabled,
        "Enable (or disable) driving the INT pin when an interrupt occurs."
    }

    set_register_field! {
        interrupt_control,
        mode,
        set_interrupt_mode,
        InterruptMode,
        "Set how pixel values are compared against the interrupt limits."
    }

    /// Read the status flags.
    pub fn status(&mut self) -> Result<StatusFlags, Error<I2C>> {
        self.register()
    }

    /// Clear the given status flags. Flags that are not set in `flags` are left alone.
    pub fn clear_status(&mut self, flags: StatusFlags) -> Result<(), Error<I2C>> {
        // The clear register is write-only, so it can't go through `set_register`.
        write_byte(
            &mut self.bus,
            self.address,
            RegisterAddress::StatusClear.into(),
            flags.as_raw() & StatusFlags::write_mask(),
        )
        .map_err(Error::I2cWriteError)
    }

    /// Read the moving average setting.
    pub fn moving_average(&mut self) -> Result<MovingAverage, Error<I2C>> {
        self.register()
    }

    set_register_field! {
        moving_average,
        twice,
        set_moving_average,
        "Enable (or disable) outputting the twice moving average of the pixel values."
    }

    /// Read the temperature of the thermistor (the sensor's own temperature).
    pub fn thermistor_temperature(&mut self) -> Result<Temperature, Error<I2C>> {
        let [low, high] = self.thermistor_bytes()?;
        Ok(decode_thermistor(high, low))
    }

    /// Read the thermistor without converting it into a temperature.
    pub fn thermistor_raw(&mut self) -> Result<u16, Error<I2C>> {
        let [low, high] = self.thermistor_bytes()?;
        Ok(thermistor_raw(high, low))
    }

    fn thermistor_bytes(&mut self) -> Result<[u8; THERMISTOR_LENGTH], Error<I2C>> {
        let mut bytes = [0u8; THERMISTOR_LENGTH];
        self.read_block(RegisterAddress::Thermistor, &mut bytes)?;
        trace!("Thermistor bytes: {=[u8]:#x}", &bytes[..]);
        Ok(bytes)
    }

    /// Read the current interrupt limits.
    pub fn interrupt_limits(&mut self) -> Result<InterruptLimits, Error<I2C>> {
        let mut bytes = [0u8; LIMITS_LENGTH];
        self.read_block(RegisterAddress::InterruptUpperLimit, &mut bytes)?;
        Ok(InterruptLimits::from_register_bytes(&bytes)?)
    }

    /// Set the interrupt limits.
    ///
    /// The limits are encoded before anything is written, so a limit that is out of range results
    /// in an error without changing any registers on the sensor.
    pub fn set_interrupt_limits(&mut self, limits: &InterruptLimits) -> Result<(), Error<I2C>> {
        let bytes = limits.to_register_bytes()?;
        let start: u8 = RegisterAddress::InterruptUpperLimit.into();
        for (offset, value) in (start..).zip(bytes.iter().copied()) {
            write_byte(&mut self.bus, self.address, offset, value)
                .map_err(Error::I2cWriteError)?;
        }
        Ok(())
    }

    /// Read the table of pixels that have triggered an interrupt.
    pub fn interrupt_table(&mut self) -> Result<InterruptTable, Error<I2C>> {
        let mut bytes = [0u8; TABLE_LENGTH];
        self.read_block(RegisterAddress::InterruptTable, &mut bytes)?;
        Ok(InterruptTable::from_bytes(&bytes)?)
    }

    /// Read a full frame of pixel temperatures.
    ///
    /// The pixels are read one line at a time.
    pub fn frame(&mut self) -> Result<Frame, Error<I2C>> {
        let address = self.address;
        let bus = &mut self.bus;
        let frame = assemble_frame(|line: usize| -> Result<LineData, Error<I2C>> {
            let mut data = [0u8; LINE_LENGTH];
            read_block(bus, address, line_address(line), &mut data)
                .map_err(Error::I2cWriteReadError)?;
            Ok(LineData::from(data))
        })?;
        debug!(
            "Read frame: min {} at ({}, {}), max {} at ({}, {})",
            frame.min().value,
            frame.min().row,
            frame.min().column,
            frame.max().value,
            frame.max().row,
            frame.max().column
        );
        Ok(frame)
    }

    /// Read a frame and convert it into a grayscale image, stretched so that the coldest pixel is
    /// 0 and the hottest is 255.
    ///
    /// If every pixel has the same temperature, there is no range to stretch, and
    /// [`LibraryError::DegenerateRange`][crate::LibraryError::DegenerateRange] is returned.
    pub fn grayscale_image(&mut self) -> Result<GrayscaleImage, Error<I2C>> {
        let frame = self.frame()?;
        Ok(remap(&frame, None, (u8::MIN, u8::MAX))?)
    }

    /// Read a frame and convert it into a grayscale image without remapping, each pixel being the
    /// temperature in whole degrees (clamped to 0 through 255).
    pub fn raw_grayscale_image(&mut self) -> Result<GrayscaleImage, Error<I2C>> {
        let frame = self.frame()?;
        Ok(raw_grayscale(&frame))
    }
}

// Inner functions are kept generic only on the bus to reduce the impact of monomorphization.
fn read_byte<I2C: i2c::WriteRead>(
    bus: &mut I2C,
    i2c_address: u8,
    offset: u8,
) -> Result<u8, I2C::Error> {
    let mut value = [0u8; 1];
    bus.write_read(i2c_address, &[offset], &mut value)?;
    Ok(value[0])
}

fn read_block<I2C: i2c::WriteRead>(
    bus: &mut I2C,
    i2c_address: u8,
    offset: u8,
    buffer: &mut [u8],
) -> Result<(), I2C::Error> {
    bus.write_read(i2c_address, &[offset], buffer)
}

fn write_byte<I2C: i2c::Write>(
    bus: &mut I2C,
    i2c_address: u8,
    offset: u8,
    value: u8,
) -> Result<(), I2C::Error> {
    bus.write(i2c_address, &[offset, value])
}
