// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// OmniVision OV02C10 at 1288x728, 30fps, one MIPI lane. Gain and exposure
// updates are latched through group hold 0 so they land on one frame.

use crate::descriptor::{BayerPattern, GainTable, RegisterMap, RegisterOp, SensorDescriptor};
use crate::encoder::{ExposureLayout, ExposureRegisters, GroupHold, RegisterWrite};
use crate::sensor_model::SensorModel;

pub struct Ov02c10;

pub const OV02C10_DESCRIPTOR: SensorDescriptor = SensorDescriptor {
    name: "ov02c10",
    manufacturer: "OmniVision",
    product_id: 0x5602,
    default_i2c_address: 0x36,
    lane_count: 1,
    bayer_pattern: BayerPattern::Gbrg,
    lane_bitrate_mbps: 500,
    width: 1288,
    height: 728,
    fps: 30,
};

pub const OV02C10_REGISTERS: RegisterMap = RegisterMap {
    sensor_id_h: 0x300a,
    sensor_id_l: 0x300b,
    stream_mode: 0x0100,
    software_reset: 0x0103,
};

const GAIN_DIG_FINE_H: u16 = 0x350c;
const GAIN_DIG_FINE_L: u16 = 0x350d;
const GAIN_DIG_COARSE: u16 = 0x350a;
const GAIN_ANALOG: u16 = 0x3508;

/// One gain step. `dgain_fine` is an 8-bit fraction (0x80 = 1x) split over
/// two registers; `analog_gain` selects the analog multiplier stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ov02c10Gain {
    pub dgain_fine: u8,
    pub dgain_coarse: u8,
    pub analog_gain: u8,
}

pub const OV02C10_INIT_SEQUENCE: [RegisterOp; 226] = [
    // Standby, then reset and let it settle.
    RegisterOp::new(0x0100, 0x00),
    RegisterOp::with_delay(0x0103, 0x01, 10),

    // PLL.
    RegisterOp::new(0x0301, 0x08),
    RegisterOp::new(0x0303, 0x06),
    RegisterOp::new(0x0304, 0x01),
    RegisterOp::new(0x0305, 0x77),
    RegisterOp::new(0x0313, 0x40),
    RegisterOp::new(0x031c, 0x4f),

    // MIPI, single lane.
    RegisterOp::new(0x3016, 0x12),
    RegisterOp::new(0x301b, 0xf0),
    RegisterOp::new(0x3020, 0x97),
    RegisterOp::new(0x3021, 0x23),
    RegisterOp::new(0x3022, 0x01),
    RegisterOp::new(0x3026, 0xb4),
    RegisterOp::new(0x3027, 0xf1),

    // Clocks.
    RegisterOp::new(0x303b, 0x00),
    RegisterOp::new(0x303c, 0x4f),
    RegisterOp::new(0x303d, 0xe6),
    RegisterOp::new(0x303e, 0x00),
    RegisterOp::new(0x303f, 0x03),

    // Initial exposure and gain.
    RegisterOp::new(0x3501, 0x04),
    RegisterOp::new(0x3502, 0x6c),
    RegisterOp::new(0x3504, 0x0c),
    RegisterOp::new(0x3507, 0x00),
    RegisterOp::new(0x3508, 0x08),
    RegisterOp::new(0x3509, 0x00),
    RegisterOp::new(0x350a, 0x01),
    RegisterOp::new(0x350b, 0x00),
    RegisterOp::new(0x350c, 0x41),

    // Analog.
    RegisterOp::new(0x3600, 0x84),
    RegisterOp::new(0x3603, 0x08),
    RegisterOp::new(0x3610, 0x57),
    RegisterOp::new(0x3611, 0x1b),
    RegisterOp::new(0x3613, 0x78),
    RegisterOp::new(0x3623, 0x00),
    RegisterOp::new(0x3632, 0xa0),
    RegisterOp::new(0x3642, 0xe8),
    RegisterOp::new(0x364c, 0x70),
    RegisterOp::new(0x365d, 0x00),
    RegisterOp::new(0x365f, 0x0f),

    // Sensor core.
    RegisterOp::new(0x3708, 0x30),
    RegisterOp::new(0x3714, 0x24),
    RegisterOp::new(0x3725, 0x02),
    RegisterOp::new(0x3737, 0x08),
    RegisterOp::new(0x3739, 0x28),
    RegisterOp::new(0x3749, 0x32),
    RegisterOp::new(0x374a, 0x32),
    RegisterOp::new(0x374b, 0x32),
    RegisterOp::new(0x374c, 0x32),
    RegisterOp::new(0x374d, 0x81),
    RegisterOp::new(0x374e, 0x81),
    RegisterOp::new(0x374f, 0x81),
    RegisterOp::new(0x3752, 0x36),
    RegisterOp::new(0x3753, 0x36),
    RegisterOp::new(0x3754, 0x36),
    RegisterOp::new(0x3761, 0x00),
    RegisterOp::new(0x376c, 0x81),
    RegisterOp::new(0x3774, 0x18),
    RegisterOp::new(0x3776, 0x08),
    RegisterOp::new(0x377c, 0x81),
    RegisterOp::new(0x377d, 0x81),
    RegisterOp::new(0x377e, 0x81),
    RegisterOp::new(0x37a0, 0x44),
    RegisterOp::new(0x37a6, 0x44),
    RegisterOp::new(0x37aa, 0x0d),
    RegisterOp::new(0x37ae, 0x00),
    RegisterOp::new(0x37cb, 0x03),
    RegisterOp::new(0x37cc, 0x01),
    RegisterOp::new(0x37d8, 0x02),
    RegisterOp::new(0x37d9, 0x10),
    RegisterOp::new(0x37e1, 0x10),
    RegisterOp::new(0x37e2, 0x18),
    RegisterOp::new(0x37e3, 0x08),
    RegisterOp::new(0x37e4, 0x08),
    RegisterOp::new(0x37e5, 0x02),
    RegisterOp::new(0x37e6, 0x08),

    // Crop window x 320..1615, y 180..915.
    RegisterOp::new(0x3800, 0x01),
    RegisterOp::new(0x3801, 0x40),

    RegisterOp::new(0x3802, 0x00),
    RegisterOp::new(0x3803, 0xb4),

    RegisterOp::new(0x3804, 0x06),
    RegisterOp::new(0x3805, 0x4f),

    RegisterOp::new(0x3806, 0x03),
    RegisterOp::new(0x3807, 0x8f),

    // Output 1288x728.
    RegisterOp::new(0x3808, 0x05),
    RegisterOp::new(0x3809, 0x08),
    RegisterOp::new(0x380a, 0x02),
    RegisterOp::new(0x380b, 0xd8),

    // HTS 2280, VTS 1164 (30fps).
    RegisterOp::new(0x380c, 0x08),
    RegisterOp::new(0x380d, 0xe8),

    RegisterOp::new(0x380e, 0x04),
    RegisterOp::new(0x380f, 0x8c),

    // ISP window offset.
    RegisterOp::new(0x3810, 0x00),
    RegisterOp::new(0x3811, 0x07),
    RegisterOp::new(0x3812, 0x00),
    RegisterOp::new(0x3813, 0x04),

    // Subsampling.
    RegisterOp::new(0x3814, 0x01),
    RegisterOp::new(0x3815, 0x01),
    RegisterOp::new(0x3816, 0x01),
    RegisterOp::new(0x3817, 0x01),

    // Mirror/flip and format timing.
    RegisterOp::new(0x3820, 0xa0),
    RegisterOp::new(0x3821, 0x00),
    RegisterOp::new(0x3822, 0x80),
    RegisterOp::new(0x3823, 0x08),
    RegisterOp::new(0x3824, 0x00),
    RegisterOp::new(0x3825, 0x20),
    RegisterOp::new(0x3826, 0x00),
    RegisterOp::new(0x3827, 0x08),
    RegisterOp::new(0x382a, 0x00),
    RegisterOp::new(0x382b, 0x08),
    RegisterOp::new(0x382d, 0x00),
    RegisterOp::new(0x382e, 0x00),
    RegisterOp::new(0x382f, 0x23),
    RegisterOp::new(0x3834, 0x00),
    RegisterOp::new(0x3839, 0x00),
    RegisterOp::new(0x383a, 0xd1),
    RegisterOp::new(0x383e, 0x03),

    // Readout timing.
    RegisterOp::new(0x393d, 0x29),
    RegisterOp::new(0x393f, 0x6e),
    RegisterOp::new(0x394b, 0x06),
    RegisterOp::new(0x394c, 0x06),
    RegisterOp::new(0x394d, 0x08),
    RegisterOp::new(0x394e, 0x0a),
    RegisterOp::new(0x394f, 0x01),
    RegisterOp::new(0x3950, 0x01),
    RegisterOp::new(0x3951, 0x01),
    RegisterOp::new(0x3952, 0x01),
    RegisterOp::new(0x3953, 0x01),
    RegisterOp::new(0x3954, 0x01),
    RegisterOp::new(0x3955, 0x01),
    RegisterOp::new(0x3956, 0x01),
    RegisterOp::new(0x3957, 0x0e),
    RegisterOp::new(0x3958, 0x08),
    RegisterOp::new(0x3959, 0x08),
    RegisterOp::new(0x395a, 0x08),
    RegisterOp::new(0x395b, 0x13),
    RegisterOp::new(0x395c, 0x09),
    RegisterOp::new(0x395d, 0x05),
    RegisterOp::new(0x395e, 0x02),
    RegisterOp::new(0x395f, 0x00),
    RegisterOp::new(0x395f, 0x00),
    RegisterOp::new(0x3960, 0x00),
    RegisterOp::new(0x3961, 0x00),
    RegisterOp::new(0x3962, 0x00),
    RegisterOp::new(0x3963, 0x00),
    RegisterOp::new(0x3964, 0x00),
    RegisterOp::new(0x3965, 0x00),
    RegisterOp::new(0x3966, 0x00),
    RegisterOp::new(0x3967, 0x00),
    RegisterOp::new(0x3968, 0x01),
    RegisterOp::new(0x3969, 0x01),
    RegisterOp::new(0x396a, 0x01),
    RegisterOp::new(0x396b, 0x01),
    RegisterOp::new(0x396c, 0x10),
    RegisterOp::new(0x396d, 0xf0),
    RegisterOp::new(0x396e, 0x11),
    RegisterOp::new(0x396f, 0x00),
    RegisterOp::new(0x3970, 0x37),
    RegisterOp::new(0x3971, 0x37),
    RegisterOp::new(0x3972, 0x37),
    RegisterOp::new(0x3973, 0x37),
    RegisterOp::new(0x3974, 0x00),
    RegisterOp::new(0x3975, 0x3c),
    RegisterOp::new(0x3976, 0x3c),
    RegisterOp::new(0x3977, 0x3c),
    RegisterOp::new(0x3978, 0x3c),

    // VFIFO.
    RegisterOp::new(0x3c00, 0x0f),
    RegisterOp::new(0x3c20, 0x01),
    RegisterOp::new(0x3c21, 0x08),

    // Format.
    RegisterOp::new(0x3f00, 0x8b),
    RegisterOp::new(0x3f02, 0x0f),

    // Black level.
    RegisterOp::new(0x4000, 0xc3),
    RegisterOp::new(0x4001, 0xe0),
    RegisterOp::new(0x4002, 0x00),
    RegisterOp::new(0x4003, 0x40),
    RegisterOp::new(0x4008, 0x04),
    RegisterOp::new(0x4009, 0x23),
    RegisterOp::new(0x400a, 0x04),
    RegisterOp::new(0x400b, 0x01),
    RegisterOp::new(0x4041, 0x20),
    RegisterOp::new(0x4077, 0x06),
    RegisterOp::new(0x4078, 0x00),
    RegisterOp::new(0x4079, 0x1a),
    RegisterOp::new(0x407a, 0x7f),
    RegisterOp::new(0x407b, 0x01),
    RegisterOp::new(0x4080, 0x03),
    RegisterOp::new(0x4081, 0x84),

    // VFIFO control.
    RegisterOp::new(0x4308, 0x03),
    RegisterOp::new(0x4309, 0xff),
    RegisterOp::new(0x430d, 0x00),

    // DVP.
    RegisterOp::new(0x4500, 0x07),
    RegisterOp::new(0x4501, 0x00),
    RegisterOp::new(0x4503, 0x00),
    RegisterOp::new(0x450a, 0x04),
    RegisterOp::new(0x450e, 0x00),
    RegisterOp::new(0x450f, 0x00),

    // MIPI; line sync enabled.
    RegisterOp::new(0x4800, 0x64),
    RegisterOp::new(0x4806, 0x00),
    RegisterOp::new(0x4813, 0x00),
    RegisterOp::new(0x4815, 0x40),
    RegisterOp::new(0x4816, 0x12),
    RegisterOp::new(0x481f, 0x30),
    RegisterOp::new(0x4837, 0x15),
    RegisterOp::new(0x4857, 0x05),
    RegisterOp::new(0x4884, 0x04),

    // ISP.
    RegisterOp::new(0x4900, 0x00),
    RegisterOp::new(0x4901, 0x00),
    RegisterOp::new(0x4902, 0x01),

    // Temperature sensor.
    RegisterOp::new(0x4d00, 0x03),
    RegisterOp::new(0x4d01, 0xd8),
    RegisterOp::new(0x4d02, 0xba),
    RegisterOp::new(0x4d03, 0xa0),
    RegisterOp::new(0x4d04, 0xb7),
    RegisterOp::new(0x4d05, 0x34),
    RegisterOp::new(0x4d0d, 0x00),

    // ISP.
    RegisterOp::new(0x5000, 0xfd),
    RegisterOp::new(0x5001, 0x50),
    RegisterOp::new(0x5006, 0x00),
    RegisterOp::new(0x5080, 0x40),

    // AWB.
    RegisterOp::new(0x5181, 0x2b),
    RegisterOp::new(0x5202, 0xa3),
    RegisterOp::new(0x5206, 0x01),
    RegisterOp::new(0x5207, 0x00),
    RegisterOp::new(0x520a, 0x01),
    RegisterOp::new(0x520b, 0x00),

    // Lens shading.
    RegisterOp::new(0x4f00, 0x01),
];

// Five analog stages, each swept through 32 digital fine steps
// (0x80..=0xfc in steps of 4).
const GAIN_ENTRIES: [Ov02c10Gain; 160] = build_gain_entries();

const fn build_gain_entries() -> [Ov02c10Gain; 160] {
    let mut entries = [Ov02c10Gain { dgain_fine: 0, dgain_coarse: 0, analog_gain: 0 }; 160];
    let mut i = 0;
    while i < 160 {
        entries[i] = Ov02c10Gain {
            dgain_fine: 0x80 + 4 * (i % 32) as u8,
            dgain_coarse: 0x01,
            analog_gain: 1 + (i / 32) as u8,
        };
        i += 1;
    }
    entries
}

const GAIN_VALUES: [u32; 160] = [
    1000, 1031, 1063, 1094, 1125, 1156, 1188, 1219,
    1250, 1281, 1313, 1344, 1375, 1406, 1438, 1469,
    1500, 1531, 1563, 1594, 1625, 1656, 1688, 1719,
    1750, 1781, 1813, 1844, 1875, 1906, 1938, 1969,
    2000, 2062, 2126, 2188, 2250, 2312, 2376, 2438,
    2500, 2562, 2626, 2688, 2750, 2812, 2876, 2938,
    3000, 3062, 3126, 3188, 3250, 3312, 3376, 3438,
    3500, 3562, 3626, 3688, 3750, 3812, 3876, 3938,
    4000, 4124, 4252, 4376, 4500, 4624, 4752, 4876,
    5000, 5124, 5252, 5376, 5500, 5624, 5752, 5876,
    6000, 6124, 6252, 6376, 6500, 6624, 6752, 6876,
    7000, 7124, 7252, 7376, 7500, 7624, 7752, 7876,
    8000, 8248, 8504, 8752, 9000, 9248, 9504, 9752,
    10000, 10248, 10504, 10752, 11000, 11248, 11504, 11752,
    12000, 12248, 12504, 12752, 13000, 13248, 13504, 13752,
    14000, 14248, 14504, 14752, 15000, 15248, 15504, 15752,
    16000, 16496, 17008, 17504, 18000, 18496, 19008, 19504,
    20000, 20496, 21008, 21504, 22000, 22496, 23008, 23504,
    24000, 24496, 25008, 25504, 26000, 26496, 27008, 27504,
    28000, 28496, 29008, 29504, 30000, 30496, 31008, 31504,
];

pub const OV02C10_GAIN_TABLE: GainTable<Ov02c10Gain> = GainTable {
    entries: &GAIN_ENTRIES,
    values_milli: &GAIN_VALUES,
};

impl SensorModel for Ov02c10 {
    type GainEntry = Ov02c10Gain;

    const DESCRIPTOR: &'static SensorDescriptor = &OV02C10_DESCRIPTOR;
    const REGISTERS: &'static RegisterMap = &OV02C10_REGISTERS;
    const INIT_SEQUENCE: &'static [RegisterOp] = &OV02C10_INIT_SEQUENCE;
    const GAIN_TABLE: &'static GainTable<Ov02c10Gain> = &OV02C10_GAIN_TABLE;
    const EXPOSURE_REGISTERS: ExposureRegisters = ExposureRegisters {
        exposure_h: 0x3500,
        exposure_m: 0x3501,
        exposure_l: 0x3502,
    };
    const EXPOSURE_LAYOUT: ExposureLayout = ExposureLayout::Narrow;
    const GROUP_HOLD: Option<GroupHold> = Some(GroupHold {
        register: 0x3208,
        start: 0x00,
        end: 0x10,
    });

    fn gain_writes(entry: &Ov02c10Gain) -> Vec<RegisterWrite> {
        vec![RegisterWrite::new(GAIN_DIG_FINE_H, entry.dgain_fine >> 2),
             RegisterWrite::new(GAIN_DIG_FINE_L, (entry.dgain_fine & 0x03) << 6),
             RegisterWrite::new(GAIN_DIG_COARSE, entry.dgain_coarse),
             RegisterWrite::new(GAIN_ANALOG, entry.analog_gain)]
    }
}
