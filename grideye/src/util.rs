// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// Emit a `defmt` trace message if the `defmt` feature is enabled, otherwise do nothing.
macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        {
            defmt::trace!($($arg)+);
        }
    };
}

/// Emit a `defmt` debug message if the `defmt` feature is enabled, otherwise do nothing.
macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        {
            defmt::debug!($($arg)+);
        }
    };
}

pub(crate) use debug;
pub(crate) use trace;

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set<B>(value: B, index: usize) -> bool
where
    B: num_traits::PrimInt + num_traits::Unsigned,
{
    (value & (B::one() << index)) > B::zero()
}

/// Sign extend the lowest `num_bits` bits of `raw` as a two's complement integer.
///
/// Any bits above `num_bits` are ignored.
pub(crate) fn sign_extend(raw: u16, num_bits: u32) -> i16 {
    let mask = (1u16 << num_bits) - 1;
    let value = raw & mask;
    if is_bit_set(value, (num_bits - 1) as usize) {
        (i32::from(value) - (1i32 << num_bits)) as i16
    } else {
        value as i16
    }
}
