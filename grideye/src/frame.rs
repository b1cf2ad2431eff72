// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Assembling a full frame of temperatures from the pixel registers.
//!
//! The pixel array is read one line (row) at a time, as some I²C controllers (the Raspberry Pi's
//! in particular) have trouble reading all 128 bytes in one transaction. Where those lines come
//! from is abstracted behind [`LineSource`], so frames can be assembled from a bus, a file, or a
//! test fixture alike.
use core::fmt;

use arrayvec::ArrayVec;

use crate::error::LibraryError;
use crate::fixed_point::{decode12, pixel_from_bytes, Temperature};
use crate::register_map::RegisterAddress;

/// The number of rows of pixels.
pub const HEIGHT: usize = 8;

/// The number of columns of pixels.
pub const WIDTH: usize = 8;

/// The total number of pixels.
pub const NUM_PIXELS: usize = HEIGHT * WIDTH;

/// The number of bytes in one line of pixel data (two bytes per pixel).
pub const LINE_LENGTH: usize = WIDTH * 2;

/// The data for one line of pixels.
///
/// A line with fewer than [`LINE_LENGTH`] bytes is treated as a short read.
pub type LineData = ArrayVec<u8, LINE_LENGTH>;

/// The register offset of the first byte of the given line.
pub fn line_address(line: usize) -> u8 {
    u8::from(RegisterAddress::PixelArray) + (line * LINE_LENGTH) as u8
}

/// A source of lines of raw pixel data.
///
/// This trait is implemented for closures taking a line index (0 through 7) and returning that
/// line's bytes.
pub trait LineSource {
    /// The error a line source can fail with. Errors from decoding the lines are converted into
    /// this type as well.
    type Error: From<LibraryError>;

    /// Read the raw data for the given line.
    fn read_line(&mut self, line: usize) -> Result<LineData, Self::Error>;
}

impl<F, E> LineSource for F
where
    F: FnMut(usize) -> Result<LineData, E>,
    E: From<LibraryError>,
{
    type Error = E;

    fn read_line(&mut self, line: usize) -> Result<LineData, Self::Error> {
        self(line)
    }
}

/// The location and value of the coldest or hottest pixel in a frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Extremum {
    pub value: Temperature,
    pub column: usize,
    pub row: usize,
}

/// One complete 8×8 snapshot of pixel temperatures.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pixels: [[Temperature; WIDTH]; HEIGHT],
    min: Extremum,
    max: Extremum,
}

impl Frame {
    /// Create a frame from already decoded temperatures, finding the extrema.
    ///
    /// When multiple pixels share the lowest (or highest) value, the first in row-major order is
    /// used.
    pub fn from_pixels(pixels: [[Temperature; WIDTH]; HEIGHT]) -> Self {
        let mut extrema = Extrema::default();
        for (row, line) in pixels.iter().enumerate() {
            for (column, value) in line.iter().enumerate() {
                extrema.update(*value, column, row);
            }
        }
        let (min, max) = extrema.finish();
        Self { pixels, min, max }
    }

    /// The temperatures, indexed by row then column.
    pub fn pixels(&self) -> &[[Temperature; WIDTH]; HEIGHT] {
        &self.pixels
    }

    /// The temperature of a single pixel, or `None` if the coordinates are out of bounds.
    pub fn pixel(&self, row: usize, column: usize) -> Option<Temperature> {
        self.pixels.get(row).and_then(|line| line.get(column)).copied()
    }

    /// The coldest pixel.
    pub fn min(&self) -> Extremum {
        self.min
    }

    /// The hottest pixel.
    pub fn max(&self) -> Extremum {
        self.max
    }

    /// Iterate over all pixels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Temperature> {
        self.pixels.iter().flatten()
    }

    /// The temperatures in degrees Celsius, indexed by row then column.
    pub fn celsius(&self) -> [[f32; WIDTH]; HEIGHT] {
        let mut destination = [[0f32; WIDTH]; HEIGHT];
        for (dest_line, line) in destination.iter_mut().zip(self.pixels.iter()) {
            for (dest, value) in dest_line.iter_mut().zip(line.iter()) {
                *dest = value.celsius();
            }
        }
        destination
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.pixels.iter() {
            for value in line.iter() {
                write!(f, "{:7.2} ", value.celsius())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Running minimum and maximum, keeping the first of any ties.
#[derive(Default)]
struct Extrema {
    min: Option<Extremum>,
    max: Option<Extremum>,
}

impl Extrema {
    fn update(&mut self, value: Temperature, column: usize, row: usize) {
        let candidate = Extremum { value, column, row };
        match self.min {
            Some(min) if value >= min.value => (),
            _ => self.min = Some(candidate),
        }
        match self.max {
            Some(max) if value <= max.value => (),
            _ => self.max = Some(candidate),
        }
    }

    fn finish(self) -> (Extremum, Extremum) {
        // A frame always has pixels, but default to 0 at the origin anyways.
        let origin = Extremum {
            value: Temperature::ZERO,
            column: 0,
            row: 0,
        };
        (self.min.unwrap_or(origin), self.max.unwrap_or(origin))
    }
}

/// Decode the temperatures of one line of pixel data.
fn decode_line(line: usize, data: &[u8]) -> Result<[Temperature; WIDTH], LibraryError> {
    if data.len() < LINE_LENGTH {
        return Err(LibraryError::ShortRead {
            line,
            length: data.len(),
        });
    }
    let temperatures: ArrayVec<Temperature, WIDTH> = data[..LINE_LENGTH]
        .chunks_exact(2)
        .map(|pixel| decode12(pixel_from_bytes(pixel[0], pixel[1])))
        .collect();
    temperatures
        .into_inner()
        .map_err(|_| LibraryError::InvalidData("A line did not have eight pixels"))
}

/// Read and decode all eight lines of pixel data into a [`Frame`].
///
/// Either every line is read and decoded, or an error is returned; a partial frame is never
/// produced.
/// ```
/// # use grideye::frame::{assemble_frame, LineData};
/// # use grideye::LibraryError;
/// // Every pixel is 25℃ (100 quarter degrees)
/// let frame = assemble_frame(|_line: usize| -> Result<LineData, LibraryError> {
///     Ok([0x64, 0x00].iter().copied().cycle().take(16).collect())
/// })?;
/// assert_eq!(frame.max().value.celsius(), 25.0);
/// # Ok::<(), LibraryError>(())
/// ```
pub fn assemble_frame<S: LineSource>(mut source: S) -> Result<Frame, S::Error> {
    let mut pixels = [[Temperature::ZERO; WIDTH]; HEIGHT];
    let mut extrema = Extrema::default();
    for (row, destination) in pixels.iter_mut().enumerate() {
        let data = source.read_line(row)?;
        *destination = decode_line(row, &data)?;
        for (column, value) in destination.iter().enumerate() {
            extrema.update(*value, column, row);
        }
    }
    let (min, max) = extrema.finish();
    Ok(Frame { pixels, min, max })
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::fixed_point::{encode12, pixel_to_bytes};

    /// Build the raw bytes for a frame from quarter degree values.
    fn raw_frame(quarters: &[[i16; WIDTH]; HEIGHT]) -> [LineData; HEIGHT] {
        let mut lines: [LineData; HEIGHT] = Default::default();
        for (line, values) in lines.iter_mut().zip(quarters.iter()) {
            for value in values.iter() {
                line.extend(pixel_to_bytes(encode12(*value).unwrap()));
            }
        }
        lines
    }

    fn ramp() -> [[i16; WIDTH]; HEIGHT] {
        let mut quarters = [[0i16; WIDTH]; HEIGHT];
        for (row, line) in quarters.iter_mut().enumerate() {
            for (column, value) in line.iter_mut().enumerate() {
                *value = (row * WIDTH + column) as i16 * 3 - 40;
            }
        }
        quarters
    }

    #[test]
    fn line_addresses() {
        assert_eq!(line_address(0), 0x80);
        assert_eq!(line_address(1), 0x90);
        assert_eq!(line_address(7), 0xF0);
    }

    #[test]
    fn assemble_ramp() {
        let lines = raw_frame(&ramp());
        let frame = assemble_frame(|line: usize| -> Result<LineData, LibraryError> {
            Ok(lines[line].clone())
        })
        .unwrap();
        assert_approx_eq!(f32, frame.pixel(0, 0).unwrap().celsius(), -10.0);
        assert_approx_eq!(f32, frame.pixel(7, 7).unwrap().celsius(), 37.25);
        assert_eq!(frame.pixel(8, 0), None);
        assert_eq!(
            frame.min(),
            Extremum {
                value: Temperature::from_quarters(-40),
                column: 0,
                row: 0
            }
        );
        assert_eq!(
            frame.max(),
            Extremum {
                value: Temperature::from_quarters(149),
                column: 7,
                row: 7
            }
        );
    }

    #[test]
    fn extrema_bound_every_pixel() {
        let mut quarters = ramp();
        quarters[3][5] = -2048;
        quarters[6][2] = 2047;
        quarters[1][1] = -2047;
        let lines = raw_frame(&quarters);
        let frame = assemble_frame(|line: usize| -> Result<LineData, LibraryError> {
            Ok(lines[line].clone())
        })
        .unwrap();
        for value in frame.iter() {
            assert!(frame.min().value <= *value);
            assert!(*value <= frame.max().value);
        }
        let min = frame.min();
        let max = frame.max();
        assert_eq!(frame.pixel(min.row, min.column), Some(min.value));
        assert_eq!(frame.pixel(max.row, max.column), Some(max.value));
        assert_eq!((min.row, min.column), (3, 5));
        assert_eq!((max.row, max.column), (6, 2));
    }

    #[test]
    fn ties_keep_first_pixel() {
        let mut quarters = [[10i16; WIDTH]; HEIGHT];
        quarters[2][3] = 50;
        quarters[5][1] = 50;
        quarters[4][4] = -5;
        quarters[4][6] = -5;
        let lines = raw_frame(&quarters);
        let frame = assemble_frame(|line: usize| -> Result<LineData, LibraryError> {
            Ok(lines[line].clone())
        })
        .unwrap();
        assert_eq!((frame.max().row, frame.max().column), (2, 3));
        assert_eq!((frame.min().row, frame.min().column), (4, 4));
    }

    #[test]
    fn uniform_frame_extrema_at_origin() {
        let frame = Frame::from_pixels([[Temperature::from_quarters(7); WIDTH]; HEIGHT]);
        assert_eq!((frame.min().row, frame.min().column), (0, 0));
        assert_eq!((frame.max().row, frame.max().column), (0, 0));
        assert_eq!(frame.min().value, frame.max().value);
    }

    #[test]
    fn high_values_are_not_hidden() {
        // Every pixel is hotter than 500℃ (the limit is 511.75℃)
        let lines = raw_frame(&[[2010i16; WIDTH]; HEIGHT]);
        let frame = assemble_frame(|line: usize| -> Result<LineData, LibraryError> {
            Ok(lines[line].clone())
        })
        .unwrap();
        assert_approx_eq!(f32, frame.min().value.celsius(), 502.5);
        assert_approx_eq!(f32, frame.max().value.celsius(), 502.5);
    }

    #[test]
    fn short_line() {
        let lines = raw_frame(&ramp());
        let mut lines_read = 0;
        let result = assemble_frame(|line: usize| -> Result<LineData, LibraryError> {
            lines_read += 1;
            let mut data = lines[line].clone();
            if line == 4 {
                data.truncate(15);
            }
            Ok(data)
        });
        assert_eq!(
            result,
            Err(LibraryError::ShortRead {
                line: 4,
                length: 15
            })
        );
        // Reading stops at the short line
        assert_eq!(lines_read, 5);
    }

    #[test]
    fn short_first_line() {
        let result = assemble_frame(|_line: usize| -> Result<LineData, LibraryError> {
            Ok([0u8; 15].iter().copied().collect())
        });
        assert!(matches!(
            result,
            Err(LibraryError::ShortRead {
                line: 0,
                length: 15
            })
        ));
    }

    #[derive(Debug, PartialEq)]
    enum SourceError {
        Unplugged,
        Library(LibraryError),
    }

    impl From<LibraryError> for SourceError {
        fn from(err: LibraryError) -> Self {
            Self::Library(err)
        }
    }

    #[test]
    fn source_errors_pass_through() {
        let result = assemble_frame(|line: usize| -> Result<LineData, SourceError> {
            if line == 2 {
                Err(SourceError::Unplugged)
            } else {
                Ok([0u8; LINE_LENGTH].iter().copied().collect())
            }
        });
        assert_eq!(result, Err(SourceError::Unplugged));
    }

    #[test]
    fn celsius_matrix() {
        let frame = Frame::from_pixels([[Temperature::from_quarters(-3); WIDTH]; HEIGHT]);
        let celsius = frame.celsius();
        assert_approx_eq!(f32, celsius[4][2], -0.75);
    }
}
