// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
mod frame_data;
mod i2c_mock;

pub use frame_data::{pixel_bytes, SAMPLE_FRAME, SAMPLE_FRAME_MAX, SAMPLE_FRAME_MIN};
pub use i2c_mock::{
    example_grideye_at_address, I2cOperation, MockError, MockGridEyeBus, DEFAULT_ADDRESS,
    REGISTER_FILE_LENGTH,
};
