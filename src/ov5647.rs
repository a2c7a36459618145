// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// OmniVision OV5647, configured for 800x640 RAW8 at 50fps over two lanes.
// Gain is a real gain in 1/16 steps (0x10 = 1x) written directly, without
// group hold. Exposure is written as three whole bytes, most significant
// first.

use crate::descriptor::{BayerPattern, GainTable, RegisterMap, RegisterOp, SensorDescriptor};
use crate::encoder::{ExposureLayout, ExposureRegisters, GroupHold, RegisterWrite};
use crate::sensor_model::SensorModel;

pub struct Ov5647;

pub const OV5647_DESCRIPTOR: SensorDescriptor = SensorDescriptor {
    name: "ov5647",
    manufacturer: "OmniVision",
    product_id: 0x5647,
    default_i2c_address: 0x36,
    lane_count: 2,
    bayer_pattern: BayerPattern::Bggr,
    lane_bitrate_mbps: 400,
    width: 800,
    height: 640,
    fps: 50,
};

pub const OV5647_REGISTERS: RegisterMap = RegisterMap {
    sensor_id_h: 0x300a,
    sensor_id_l: 0x300b,
    stream_mode: 0x0100,
    software_reset: 0x0103,
};

const GAIN_H: u16 = 0x350a;
const GAIN_L: u16 = 0x350b;

/// Real gain, bits 9..8 in `gain_h` and 7..0 in `gain_l`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ov5647Gain {
    pub gain_h: u8,
    pub gain_l: u8,
}

const fn g(gain_h: u8, gain_l: u8) -> Ov5647Gain {
    Ov5647Gain { gain_h, gain_l }
}

pub const OV5647_INIT_SEQUENCE: [RegisterOp; 92] = [
    // Reset first; the sensor ignores writes for ~10ms afterwards.
    RegisterOp::with_delay(0x0103, 0x01, 10),
    RegisterOp::new(0x0100, 0x00),
    RegisterOp::new(0x3035, 0x41),
    RegisterOp::new(0x303c, 0x11),

    // RAW8, PLL for 800x640@50.
    RegisterOp::new(0x3034, 0x18),
    RegisterOp::new(0x3036, 0x80),
    RegisterOp::new(0x3106, 0xf5),
    RegisterOp::new(0x3821, 0x03),
    RegisterOp::new(0x3820, 0x41),
    RegisterOp::new(0x3827, 0xec),
    RegisterOp::new(0x370c, 0x0f),
    RegisterOp::new(0x3612, 0x59),
    RegisterOp::new(0x3618, 0x00),

    // ISP.
    RegisterOp::new(0x5000, 0xff),
    RegisterOp::new(0x583e, 0xf0),
    RegisterOp::new(0x583f, 0x20),
    RegisterOp::new(0x5002, 0x41),
    RegisterOp::new(0x5003, 0x08),
    RegisterOp::new(0x5a00, 0x08),

    // System control.
    RegisterOp::new(0x3000, 0x00),
    RegisterOp::new(0x3001, 0x00),
    RegisterOp::new(0x3002, 0x00),
    RegisterOp::new(0x3016, 0x08),
    RegisterOp::new(0x3017, 0xe0),
    RegisterOp::new(0x3018, 0x44),
    RegisterOp::new(0x301c, 0xf8),
    RegisterOp::new(0x301d, 0xf0),
    RegisterOp::new(0x3a18, 0x00),
    RegisterOp::new(0x3a19, 0xf8),
    RegisterOp::new(0x3c01, 0x80),
    RegisterOp::new(0x3c00, 0x40),
    RegisterOp::new(0x3b07, 0x0c),

    // HTS 1896, VTS 984.
    RegisterOp::new(0x380c, 0x07),
    RegisterOp::new(0x380d, 0x68),
    RegisterOp::new(0x380e, 0x03),
    RegisterOp::new(0x380f, 0xd8),

    // Subsampling.
    RegisterOp::new(0x3814, 0x31),
    RegisterOp::new(0x3815, 0x31),
    RegisterOp::new(0x3708, 0x64),
    RegisterOp::new(0x3709, 0x52),

    // Crop window x 500..2623, y 0..1953.
    RegisterOp::new(0x3800, 0x01),
    RegisterOp::new(0x3801, 0xf4),
    RegisterOp::new(0x3802, 0x00),
    RegisterOp::new(0x3803, 0x00),

    RegisterOp::new(0x3804, 0x0a),
    RegisterOp::new(0x3805, 0x3f),
    RegisterOp::new(0x3806, 0x07),
    RegisterOp::new(0x3807, 0xa1),

    // Output 800x640.
    RegisterOp::new(0x3808, 0x03),
    RegisterOp::new(0x3809, 0x20),
    RegisterOp::new(0x380a, 0x02),
    RegisterOp::new(0x380b, 0x80),

    // ISP window offset.
    RegisterOp::new(0x3810, 0x00),
    RegisterOp::new(0x3811, 0x08),
    RegisterOp::new(0x3812, 0x00),
    RegisterOp::new(0x3813, 0x00),

    // Analog.
    RegisterOp::new(0x3630, 0x2e),
    RegisterOp::new(0x3632, 0xe2),
    RegisterOp::new(0x3633, 0x23),
    RegisterOp::new(0x3634, 0x44),
    RegisterOp::new(0x3636, 0x06),
    RegisterOp::new(0x3620, 0x64),
    RegisterOp::new(0x3621, 0xe0),
    RegisterOp::new(0x3600, 0x37),
    RegisterOp::new(0x3704, 0xa0),
    RegisterOp::new(0x3703, 0x5a),
    RegisterOp::new(0x3715, 0x78),
    RegisterOp::new(0x3717, 0x01),
    RegisterOp::new(0x3731, 0x02),
    RegisterOp::new(0x370b, 0x60),
    RegisterOp::new(0x3705, 0x1a),

    // FREX.
    RegisterOp::new(0x3f05, 0x02),
    RegisterOp::new(0x3f06, 0x10),
    RegisterOp::new(0x3f01, 0x0a),

    // AEC/AGC limits.
    RegisterOp::new(0x3a08, 0x01),
    RegisterOp::new(0x3a09, 0x27),
    RegisterOp::new(0x3a0a, 0x00),
    RegisterOp::new(0x3a0b, 0xf6),
    RegisterOp::new(0x3a0d, 0x04),
    RegisterOp::new(0x3a0e, 0x03),
    RegisterOp::new(0x3a0f, 0x58),
    RegisterOp::new(0x3a10, 0x50),
    RegisterOp::new(0x3a1b, 0x58),
    RegisterOp::new(0x3a1e, 0x50),
    RegisterOp::new(0x3a11, 0x60),
    RegisterOp::new(0x3a1f, 0x28),

    // Black level.
    RegisterOp::new(0x4001, 0x02),
    RegisterOp::new(0x4004, 0x02),
    RegisterOp::new(0x4000, 0x09),

    // MIPI timing.
    RegisterOp::new(0x4837, 0x28),
    RegisterOp::new(0x4050, 0x6e),
    RegisterOp::new(0x4051, 0x8f),
];

const GAIN_ENTRIES: [Ov5647Gain; 64] = [
    g(0x00, 0x10), g(0x00, 0x11), g(0x00, 0x12), g(0x00, 0x13),
    g(0x00, 0x14), g(0x00, 0x15), g(0x00, 0x16), g(0x00, 0x17),
    g(0x00, 0x18), g(0x00, 0x19), g(0x00, 0x1a), g(0x00, 0x1b),
    g(0x00, 0x1c), g(0x00, 0x1d), g(0x00, 0x1e), g(0x00, 0x1f),
    g(0x00, 0x20), g(0x00, 0x22), g(0x00, 0x24), g(0x00, 0x26),
    g(0x00, 0x28), g(0x00, 0x2a), g(0x00, 0x2c), g(0x00, 0x2e),
    g(0x00, 0x30), g(0x00, 0x32), g(0x00, 0x34), g(0x00, 0x36),
    g(0x00, 0x38), g(0x00, 0x3a), g(0x00, 0x3c), g(0x00, 0x3e),
    g(0x00, 0x40), g(0x00, 0x44), g(0x00, 0x48), g(0x00, 0x4c),
    g(0x00, 0x50), g(0x00, 0x54), g(0x00, 0x58), g(0x00, 0x5c),
    g(0x00, 0x60), g(0x00, 0x64), g(0x00, 0x68), g(0x00, 0x6c),
    g(0x00, 0x70), g(0x00, 0x74), g(0x00, 0x78), g(0x00, 0x7c),
    g(0x00, 0x80), g(0x00, 0x88), g(0x00, 0x90), g(0x00, 0x98),
    g(0x00, 0xa0), g(0x00, 0xa8), g(0x00, 0xb0), g(0x00, 0xb8),
    g(0x00, 0xc0), g(0x00, 0xc8), g(0x00, 0xd0), g(0x00, 0xd8),
    g(0x00, 0xe0), g(0x00, 0xe8), g(0x00, 0xf0), g(0x00, 0xf8),
];

const GAIN_VALUES: [u32; 64] = [
    1000, 1062, 1125, 1187, 1250, 1312, 1375, 1437,
    1500, 1562, 1625, 1687, 1750, 1812, 1875, 1937,
    2000, 2125, 2250, 2375, 2500, 2625, 2750, 2875,
    3000, 3125, 3250, 3375, 3500, 3625, 3750, 3875,
    4000, 4250, 4500, 4750, 5000, 5250, 5500, 5750,
    6000, 6250, 6500, 6750, 7000, 7250, 7500, 7750,
    8000, 8500, 9000, 9500, 10000, 10500, 11000, 11500,
    12000, 12500, 13000, 13500, 14000, 14500, 15000, 15500,
];

pub const OV5647_GAIN_TABLE: GainTable<Ov5647Gain> = GainTable {
    entries: &GAIN_ENTRIES,
    values_milli: &GAIN_VALUES,
};

impl SensorModel for Ov5647 {
    type GainEntry = Ov5647Gain;

    const DESCRIPTOR: &'static SensorDescriptor = &OV5647_DESCRIPTOR;
    const REGISTERS: &'static RegisterMap = &OV5647_REGISTERS;
    const INIT_SEQUENCE: &'static [RegisterOp] = &OV5647_INIT_SEQUENCE;
    const GAIN_TABLE: &'static GainTable<Ov5647Gain> = &OV5647_GAIN_TABLE;
    const EXPOSURE_REGISTERS: ExposureRegisters = ExposureRegisters {
        exposure_h: 0x3500,
        exposure_m: 0x3501,
        exposure_l: 0x3502,
    };
    const EXPOSURE_LAYOUT: ExposureLayout = ExposureLayout::Wide;
    const GROUP_HOLD: Option<GroupHold> = None;

    fn gain_writes(entry: &Ov5647Gain) -> Vec<RegisterWrite> {
        vec![RegisterWrite::new(GAIN_H, entry.gain_h),
             RegisterWrite::new(GAIN_L, entry.gain_l)]
    }
}
