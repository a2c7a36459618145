// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use clap::Parser;
use env_logger;

use mipi_sensor::select_sensor::{RegistryEntry, available_sensors, find_sensor};

/// Lists the sensor models this crate can drive.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
struct Args {
    /// Only show this sensor model (case-insensitive).
    #[arg(short, long)]
    sensor: Option<String>,

    /// Also print each model's gain table.
    #[arg(short, long, default_value_t = false)]
    gains: bool,
}

fn print_entry(entry: &RegistryEntry, gains: bool) {
    let d = entry.descriptor;
    println!("{} ({}): PID 0x{:04X} at 0x{:02X}, {}x{}@{}fps, Bayer {}, {} lane(s) @ {}Mbps, \
              {} init registers, {} gain steps",
             d.name, d.manufacturer, d.product_id, d.default_i2c_address,
             d.width, d.height, d.fps, d.bayer_pattern,
             d.lane_count, d.lane_bitrate_mbps,
             entry.init_sequence.len(), entry.gain_values_milli.len());
    if gains {
        for (i, milli) in entry.gain_values_milli.iter().enumerate() {
            println!("  {:3}: {}.{:03}x", i, milli / 1000, milli % 1000);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(name) = &args.sensor {
        match find_sensor(name) {
            Some(entry) => print_entry(entry, args.gains),
            None => {
                eprintln!("Unknown sensor '{}'", name);
                std::process::exit(1);
            },
        }
        return;
    }
    let sensors = available_sensors();
    println!("{} supported sensors: ", sensors.len());
    for entry in sensors {
        print_entry(entry, args.gains);
    }
}
