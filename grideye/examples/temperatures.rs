use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, Context};
use linux_embedded_hal::I2cdev;

use grideye::{FrameRate, GridEyeDriver, OperatingMode, DEFAULT_ADDRESS};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("Usage: temperatures <I2C bus> [sensor address]");
    }
    let address = match args.get(2) {
        Some(arg) => parse_address(arg)?,
        None => DEFAULT_ADDRESS,
    };
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path)
        .with_context(|| format!("Unable to open I2C bus {}", bus_path.display()))?;
    let mut sensor = GridEyeDriver::new(bus, address);
    if sensor.operating_mode()? != Some(OperatingMode::Normal) {
        sensor.set_operating_mode(OperatingMode::Normal)?;
    }
    sensor.set_frame_rate(FrameRate::One)?;
    loop {
        let thermistor = sensor.thermistor_temperature()?;
        let frame = sensor.frame()?;
        println!("Thermistor: {}", thermistor);
        print!("{}", frame);
        let (min, max) = (frame.min(), frame.max());
        println!(
            "Min: {} at ({}, {}), max: {} at ({}, {})",
            min.value, min.row, min.column, max.value, max.row, max.column
        );
        println!();
        sleep(Duration::from_secs(1));
    }
}

fn parse_address(arg: &str) -> anyhow::Result<u8> {
    let address = match arg.strip_prefix("0x") {
        Some(hex_digits) => u8::from_str_radix(hex_digits, 16)?,
        None => arg.parse()?,
    };
    Ok(address)
}
