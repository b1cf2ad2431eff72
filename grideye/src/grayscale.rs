// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
//! Turning frames of temperatures into 8-bit grayscale images.
//!
//! The usual approach is to stretch the temperatures in a frame across the full 0 to 255 range,
//! with the coldest pixel black and the hottest white. A fixed source range can be given instead,
//! which keeps the brightness of a temperature consistent between frames.
// Various floating point operations are not implemented in core, so we use libm to provide them as
// needed.
#[cfg_attr(feature = "std", allow(unused_imports))]
use num_traits::Float;

use crate::error::LibraryError;
use crate::frame::{Frame, HEIGHT, WIDTH};

/// An 8×8 grayscale image, indexed by row then column.
pub type GrayscaleImage = [[u8; WIDTH]; HEIGHT];

/// Linearly map `value` from the `source` range onto the `target` range.
///
/// Values outside of the source range are extrapolated, not clamped. A source range with zero
/// width is an error.
/// ```
/// # use grideye::grayscale::map_range;
/// assert_eq!(map_range((0.0, 100.0), (0.0, 255.0), 50.0)?, 127.5);
/// assert!(map_range((20.0, 20.0), (0.0, 255.0), 20.0).is_err());
/// # Ok::<(), grideye::LibraryError>(())
/// ```
pub fn map_range(source: (f32, f32), target: (f32, f32), value: f32) -> Result<f32, LibraryError> {
    let (source_low, source_high) = source;
    let (target_low, target_high) = target;
    let source_width = source_high - source_low;
    if source_width == 0.0 {
        return Err(LibraryError::DegenerateRange);
    }
    Ok(target_low + (value - source_low) * (target_high - target_low) / source_width)
}

/// Map every value in a matrix from the `source` range onto the `target` range.
pub fn remap_values<const H: usize, const W: usize>(
    values: &[[f32; W]; H],
    source: (f32, f32),
    target: (f32, f32),
) -> Result<[[f32; W]; H], LibraryError> {
    let mut destination = [[0f32; W]; H];
    for (dest_row, row) in destination.iter_mut().zip(values.iter()) {
        for (dest, value) in dest_row.iter_mut().zip(row.iter()) {
            *dest = map_range(source, target, *value)?;
        }
    }
    Ok(destination)
}

/// Truncate toward zero, then saturate into a byte. NaN becomes 0.
fn to_byte(value: f32) -> u8 {
    value.trunc() as u8
}

/// Create a grayscale image from a frame.
///
/// If `source` is `None`, the frame's own minimum and maximum temperatures (in ℃) are used. The
/// mapped values are truncated toward zero, and any values outside of 0 to 255 are clamped to that
/// range.
///
/// A frame where every pixel has the same temperature has no range to map from, and results in
/// [`LibraryError::DegenerateRange`] unless a source range is given.
pub fn remap(
    frame: &Frame,
    source: Option<(f32, f32)>,
    target: (u8, u8),
) -> Result<GrayscaleImage, LibraryError> {
    let source =
        source.unwrap_or_else(|| (frame.min().value.celsius(), frame.max().value.celsius()));
    let target = (f32::from(target.0), f32::from(target.1));
    let mapped = remap_values(&frame.celsius(), source, target)?;
    let mut image = [[0u8; WIDTH]; HEIGHT];
    for (image_row, row) in image.iter_mut().zip(mapped.iter()) {
        for (pixel, value) in image_row.iter_mut().zip(row.iter()) {
            *pixel = to_byte(*value);
        }
    }
    Ok(image)
}

/// Create a grayscale image directly from the temperatures, without remapping.
///
/// Each temperature is truncated to a whole degree, so anything below 0 ℃ is black and anything
/// above 255 ℃ is white.
pub fn raw_grayscale(frame: &Frame) -> GrayscaleImage {
    let mut image = [[0u8; WIDTH]; HEIGHT];
    for (image_row, row) in image.iter_mut().zip(frame.pixels().iter()) {
        for (pixel, temperature) in image_row.iter_mut().zip(row.iter()) {
            *pixel = to_byte(temperature.celsius());
        }
    }
    image
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::fixed_point::Temperature;

    fn ramp_frame() -> Frame {
        let mut pixels = [[Temperature::ZERO; WIDTH]; HEIGHT];
        for (row, line) in pixels.iter_mut().enumerate() {
            for (column, pixel) in line.iter_mut().enumerate() {
                // 20℃ through 35.75℃ in 0.25℃ steps
                *pixel = Temperature::from_quarters(80 + (row * WIDTH + column) as i16);
            }
        }
        Frame::from_pixels(pixels)
    }

    #[test]
    fn map_midpoint() {
        assert_approx_eq!(
            f32,
            map_range((0.0, 100.0), (0.0, 255.0), 50.0).unwrap(),
            127.5
        );
        assert_approx_eq!(f32, map_range((10.0, 20.0), (100.0, 0.0), 12.5).unwrap(), 75.0);
    }

    #[test]
    fn map_degenerate() {
        assert_eq!(
            map_range((4.0, 4.0), (0.0, 255.0), 4.0),
            Err(LibraryError::DegenerateRange)
        );
    }

    #[test]
    fn map_extrapolates() {
        assert_approx_eq!(f32, map_range((0.0, 10.0), (0.0, 100.0), 15.0).unwrap(), 150.0);
        assert_approx_eq!(f32, map_range((0.0, 10.0), (0.0, 100.0), -1.0).unwrap(), -10.0);
    }

    #[test]
    fn remap_single_value_truncates() {
        let mut pixels = [[Temperature::ZERO; WIDTH]; HEIGHT];
        pixels[0][0] = Temperature::from_quarters(200);
        let frame = Frame::from_pixels(pixels);
        let image = remap(&frame, Some((0.0, 100.0)), (0, 255)).unwrap();
        // 50℃ is 127.5, truncated
        assert_eq!(image[0][0], 127);
        assert_eq!(image[7][7], 0);
    }

    #[test]
    fn remap_frame_extremes() {
        let frame = ramp_frame();
        let image = remap(&frame, None, (0, 255)).unwrap();
        assert_eq!(image[0][0], 0);
        assert_eq!(image[7][7], 255);
        // Row-major order is preserved
        assert!(image[0][7] < image[1][0]);
    }

    #[test]
    fn remap_uniform_frame() {
        let frame = Frame::from_pixels([[Temperature::from_quarters(100); WIDTH]; HEIGHT]);
        assert_eq!(
            remap(&frame, None, (0, 255)),
            Err(LibraryError::DegenerateRange)
        );
        // Giving a source range works around it
        let image = remap(&frame, Some((0.0, 50.0)), (0, 255)).unwrap();
        assert_eq!(image, [[127u8; WIDTH]; HEIGHT]);
    }

    #[test]
    fn remap_clamps_out_of_range() {
        let mut pixels = [[Temperature::from_quarters(100); WIDTH]; HEIGHT];
        pixels[2][2] = Temperature::from_quarters(-40);
        pixels[3][3] = Temperature::from_quarters(800);
        let frame = Frame::from_pixels(pixels);
        let image = remap(&frame, Some((0.0, 100.0)), (0, 255)).unwrap();
        assert_eq!(image[2][2], 0);
        assert_eq!(image[3][3], 255);
    }

    #[test]
    fn raw_values() {
        let mut pixels = [[Temperature::from_quarters(103); WIDTH]; HEIGHT];
        pixels[1][0] = Temperature::from_quarters(-8);
        pixels[1][1] = Temperature::from_quarters(1200);
        let image = raw_grayscale(&Frame::from_pixels(pixels));
        assert_eq!(image[0][0], 25);
        assert_eq!(image[1][0], 0);
        assert_eq!(image[1][1], 255);
    }

    #[test]
    fn remap_generic_matrix() {
        let values = [[0.0f32, 5.0, 10.0]; 2];
        let mapped = remap_values(&values, (0.0, 10.0), (0.0, 1.0)).unwrap();
        assert_approx_eq!(f32, mapped[1][1], 0.5);
        assert_approx_eq!(f32, mapped[0][2], 1.0);
    }
}
