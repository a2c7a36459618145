// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::time::Duration;

use canonical_error::{CanonicalError, not_found_error};
use clap::Parser;
use env_logger;
use linux_embedded_hal::{Delay, I2cdev};
use log::{info, warn};

use mipi_sensor::abstract_sensor::AbstractSensor;
use mipi_sensor::auto_exposure::brightness_level;
use mipi_sensor::config::SensorConfig;
use mipi_sensor::select_sensor::create_driver_with_config;

/// Brings up a sensor attached to a Linux I2C bus, verifies its product id,
/// and optionally streams for a while stepping through gain and brightness
/// presets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
struct Args {
    /// I2C bus device the sensor is on.
    #[arg(short, long, default_value = "/dev/i2c-1")]
    bus: String,

    /// Sensor model name, e.g. ov5647.
    #[arg(short, long)]
    sensor: String,

    /// I2C address override (7-bit).
    #[arg(long, value_parser = parse_address)]
    address: Option<u8>,

    /// MIPI lane count override.
    #[arg(long)]
    lanes: Option<u8>,

    /// Frame rate override.
    #[arg(long)]
    fps: Option<u8>,

    /// Seconds to stream for; 0 leaves the sensor in standby.
    #[arg(long, default_value_t = 0)]
    stream_secs: u64,

    /// While streaming, step through the gain table and brightness presets.
    #[arg(long, default_value_t = false)]
    gain_sweep: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", s, e))
}

fn sweep(sensor: &mut dyn AbstractSensor, duration: Duration) -> Result<(), CanonicalError> {
    let steps = sensor.gain_steps() as u32;
    let stride = (steps / 8).max(1);
    let pause = duration / (8 + 11);
    for index in (0..steps).step_by(stride as usize) {
        sensor.set_gain(index)?;
        info!("gain index {} = {}/1000x", index, sensor.gain_value_milli(index));
        std::thread::sleep(pause);
    }
    for level in 0..=10 {
        let preset = brightness_level(level);
        sensor.set_exposure(preset.exposure)?;
        sensor.set_gain(preset.gain_index)?;
        info!("brightness level {}: exposure 0x{:04X}, gain index {}",
              level, preset.exposure, preset.gain_index);
        std::thread::sleep(pause);
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), CanonicalError> {
    let i2c = I2cdev::new(&args.bus).map_err(|e| not_found_error(
        format!("Could not open {}: {}", args.bus, e).as_str()))?;

    let mut config = SensorConfig::default();
    config.i2c_address = args.address;
    config.lane_count = args.lanes;
    config.fps = args.fps;
    let mut sensor = create_driver_with_config(&args.sensor, i2c, Delay, &config)?;
    info!("{} {}: {}x{} Bayer {} at 0x{:02X}",
          sensor.manufacturer(), sensor.name(), sensor.width(), sensor.height(),
          sensor.bayer_pattern(), sensor.i2c_address());

    sensor.bring_up()?;
    info!("PID 0x{:04X} verified", sensor.product_id());

    if args.stream_secs == 0 {
        return Ok(());
    }
    let duration = Duration::from_secs(args.stream_secs);
    sensor.start_stream()?;
    let result = if args.gain_sweep {
        sweep(sensor.as_mut(), duration)
    } else {
        std::thread::sleep(duration);
        Ok(())
    };
    if let Err(e) = sensor.stop_stream() {
        warn!("Could not stop stream: {}", e);
    }
    result
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
