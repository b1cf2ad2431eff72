use std::env;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context};
use linux_embedded_hal::I2cdev;

use grideye::frame::{HEIGHT, WIDTH};
use grideye::{GridEyeDriver, DEFAULT_ADDRESS};

/// Print a single frame to stdout as a binary PGM image.
///
/// Pass `--raw` to skip stretching the temperatures across the full grayscale range.
fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let raw = args.iter().any(|arg| arg == "--raw");
    let positional: Vec<&String> = args.iter().skip(1).filter(|arg| *arg != "--raw").collect();
    if positional.is_empty() || positional.len() > 2 {
        bail!("Usage: heatmap [--raw] <I2C bus> [sensor address]");
    }
    let address = match positional.get(1) {
        Some(arg) => match arg.strip_prefix("0x") {
            Some(hex_digits) => u8::from_str_radix(hex_digits, 16)?,
            None => arg.parse()?,
        },
        None => DEFAULT_ADDRESS,
    };
    let bus_path = Path::new(positional[0]);
    let bus = I2cdev::new(bus_path)
        .with_context(|| format!("Unable to open I2C bus {}", bus_path.display()))?;
    let mut sensor = GridEyeDriver::new(bus, address);
    let image = if raw {
        sensor.raw_grayscale_image()?
    } else {
        sensor.grayscale_image()?
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "P5\n{} {}\n255\n", WIDTH, HEIGHT)?;
    for row in image.iter() {
        out.write_all(row)?;
    }
    out.flush()?;
    Ok(())
}
