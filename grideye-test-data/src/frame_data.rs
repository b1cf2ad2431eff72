// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
use arrayvec::ArrayVec;

/// A frame of someone's hand held over the sensor in a 22℃ room, in quarter degrees.
///
/// The hottest pixel is (3, 4) at 34.5℃, and the coldest is (7, 0) at 18.75℃.
#[rustfmt::skip]
pub const SAMPLE_FRAME: [[i16; 8]; 8] = [
    [88,  88,  89,  88,  88,  89,  88,  88],
    [88,  89,  96, 104, 102,  95,  89,  88],
    [89,  97, 118, 127, 129, 117,  98,  89],
    [88, 101, 125, 133, 138, 126, 103,  88],
    [89, 100, 123, 131, 134, 124, 101,  89],
    [88,  94, 108, 120, 119, 107,  93,  88],
    [87,  89,  93, 112, 110,  92,  88,  87],
    [75,  86,  88, 106, 105,  88,  86,  84],
];

/// The coordinates (row, column) of the hottest pixel in [`SAMPLE_FRAME`].
pub const SAMPLE_FRAME_MAX: (usize, usize) = (3, 4);

/// The coordinates (row, column) of the coldest pixel in [`SAMPLE_FRAME`].
pub const SAMPLE_FRAME_MIN: (usize, usize) = (7, 0);

/// Encode quarter degree values into the 128 bytes of the pixel array.
///
/// Each pixel is a 12-bit two's complement value, low byte first.
pub fn pixel_bytes(quarters: &[[i16; 8]; 8]) -> [u8; 128] {
    let bytes: ArrayVec<u8, 128> = quarters
        .iter()
        .flatten()
        .flat_map(|value| ((*value as u16) & 0x0FFF).to_le_bytes())
        .collect();
    bytes
        .into_inner()
        .expect("8×8 pixels should be exactly 128 bytes")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encoding() {
        let mut quarters = [[0i16; 8]; 8];
        quarters[0][0] = 100;
        quarters[0][1] = -1;
        quarters[7][7] = -2048;
        let bytes = pixel_bytes(&quarters);
        assert_eq!(&bytes[..4], &[0x64, 0x00, 0xFF, 0x0F]);
        assert_eq!(&bytes[126..], &[0x00, 0x08]);
    }

    #[test]
    fn sample_extremes() {
        let (max_row, max_column) = SAMPLE_FRAME_MAX;
        let (min_row, min_column) = SAMPLE_FRAME_MIN;
        for value in SAMPLE_FRAME.iter().flatten() {
            assert!(*value <= SAMPLE_FRAME[max_row][max_column]);
            assert!(*value >= SAMPLE_FRAME[min_row][min_column]);
        }
    }
}
