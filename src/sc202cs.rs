// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// SmartSens SC202CS at 1280x720, 30fps, one MIPI lane.

use crate::descriptor::{BayerPattern, GainTable, RegisterMap, RegisterOp, SensorDescriptor};
use crate::encoder::{ExposureLayout, ExposureRegisters, GroupHold, RegisterWrite};
use crate::sensor_model::SensorModel;

pub struct Sc202cs;

pub const SC202CS_DESCRIPTOR: SensorDescriptor = SensorDescriptor {
    name: "sc202cs",
    manufacturer: "SmartSens",
    product_id: 0xeb52,
    default_i2c_address: 0x36,
    lane_count: 1,
    bayer_pattern: BayerPattern::Bggr,
    lane_bitrate_mbps: 576,
    width: 1280,
    height: 720,
    fps: 30,
};

pub const SC202CS_REGISTERS: RegisterMap = RegisterMap {
    sensor_id_h: 0x3107,
    sensor_id_l: 0x3108,
    stream_mode: 0x0100,
    software_reset: 0x0103,
};

const ANALOG_COARSE: u16 = 0x3e08;
const ANALOG_FINE: u16 = 0x3e09;
const DIGITAL_FINE: u16 = 0x3e07;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sc202csGain {
    pub analog_coarse: u8,
    pub analog_fine: u8,
    pub digital_fine: u8,
}

pub const SC202CS_INIT_SEQUENCE: [RegisterOp; 52] = [
    RegisterOp::with_delay(0x0103, 0x01, 10),
    RegisterOp::new(0x0100, 0x00),

    // PLL: 24MHz in, 576Mbps on one lane.
    RegisterOp::new(0x36e9, 0x80),
    RegisterOp::new(0x37f9, 0x80),
    RegisterOp::new(0x301f, 0x01),
    RegisterOp::new(0x3018, 0x12),
    RegisterOp::new(0x3019, 0x0e),
    RegisterOp::new(0x36ea, 0x3b),
    RegisterOp::new(0x36eb, 0x0e),
    RegisterOp::new(0x36ec, 0x1e),
    RegisterOp::new(0x36ed, 0x03),
    RegisterOp::new(0x37fa, 0x3b),
    RegisterOp::new(0x37fb, 0x1a),
    RegisterOp::new(0x37fc, 0x1f),
    RegisterOp::new(0x37fd, 0x0a),
    RegisterOp::with_delay(0x36e9, 0x00, 1),
    RegisterOp::with_delay(0x37f9, 0x00, 1),

    // Window: 1280x720 centered in the 1600x1200 array.
    RegisterOp::new(0x3200, 0x00),
    RegisterOp::new(0x3201, 0xa0),
    RegisterOp::new(0x3202, 0x00),
    RegisterOp::new(0x3203, 0xf0),
    RegisterOp::new(0x3204, 0x05),
    RegisterOp::new(0x3205, 0xa7),
    RegisterOp::new(0x3206, 0x03),
    RegisterOp::new(0x3207, 0xc7),
    RegisterOp::new(0x3208, 0x05),
    RegisterOp::new(0x3209, 0x00),
    RegisterOp::new(0x320a, 0x02),
    RegisterOp::new(0x320b, 0xd0),
    RegisterOp::new(0x3210, 0x00),
    RegisterOp::new(0x3211, 0x04),
    RegisterOp::new(0x3212, 0x00),
    RegisterOp::new(0x3213, 0x04),

    // Line and frame length: HTS 1920, VTS 1000.
    RegisterOp::new(0x320c, 0x07),
    RegisterOp::new(0x320d, 0x80),
    RegisterOp::new(0x320e, 0x03),
    RegisterOp::new(0x320f, 0xe8),

    // Analog and readout timing.
    RegisterOp::new(0x3301, 0x06),
    RegisterOp::new(0x3304, 0x50),
    RegisterOp::new(0x3306, 0x48),
    RegisterOp::new(0x3308, 0x18),
    RegisterOp::new(0x3309, 0x68),
    RegisterOp::new(0x330b, 0xe8),
    RegisterOp::new(0x3364, 0x1d),
    RegisterOp::new(0x3390, 0x08),
    RegisterOp::new(0x3391, 0x18),

    // Black level.
    RegisterOp::new(0x3900, 0x0d),
    RegisterOp::new(0x3902, 0xc5),

    // Initial exposure 0x9C0 and 1x gain.
    RegisterOp::new(0x3e01, 0x9c),
    RegisterOp::new(0x3e02, 0x00),
    RegisterOp::new(0x3e08, 0x03),
    RegisterOp::new(0x3e09, 0x20),
];

// Four analog coarse stages (1x, 2x, 4x, 8x), each swept through fine
// steps 0x20..=0x3f where 0x20 is 1x. Digital gain stays at 1x.
const STAGES: [u8; 4] = [0x03, 0x07, 0x0f, 0x1f];
const FINE_STEPS: usize = 32;
const GAIN_ROWS: usize = STAGES.len() * FINE_STEPS;

const GAIN_ENTRIES: [Sc202csGain; GAIN_ROWS] = build_gain_entries();
const GAIN_VALUES: [u32; GAIN_ROWS] = build_gain_values();

const fn build_gain_entries() -> [Sc202csGain; GAIN_ROWS] {
    let mut entries = [Sc202csGain { analog_coarse: 0, analog_fine: 0, digital_fine: 0 };
                       GAIN_ROWS];
    let mut i = 0;
    while i < GAIN_ROWS {
        entries[i] = Sc202csGain {
            analog_coarse: STAGES[i / FINE_STEPS],
            analog_fine: 0x20 + (i % FINE_STEPS) as u8,
            digital_fine: 0x80,
        };
        i += 1;
    }
    entries
}

const fn build_gain_values() -> [u32; GAIN_ROWS] {
    let mut values = [0u32; GAIN_ROWS];
    let mut i = 0;
    while i < GAIN_ROWS {
        let multiplier = 1u32 << (i / FINE_STEPS);
        let fine = 0x20 + (i % FINE_STEPS) as u32;
        values[i] = multiplier * fine * 1000 / 0x20;
        i += 1;
    }
    values
}

pub const SC202CS_GAIN_TABLE: GainTable<Sc202csGain> = GainTable {
    entries: &GAIN_ENTRIES,
    values_milli: &GAIN_VALUES,
};

impl SensorModel for Sc202cs {
    type GainEntry = Sc202csGain;

    const DESCRIPTOR: &'static SensorDescriptor = &SC202CS_DESCRIPTOR;
    const REGISTERS: &'static RegisterMap = &SC202CS_REGISTERS;
    const INIT_SEQUENCE: &'static [RegisterOp] = &SC202CS_INIT_SEQUENCE;
    const GAIN_TABLE: &'static GainTable<Sc202csGain> = &SC202CS_GAIN_TABLE;
    const EXPOSURE_REGISTERS: ExposureRegisters = ExposureRegisters {
        exposure_h: 0x3e00,
        exposure_m: 0x3e01,
        exposure_l: 0x3e02,
    };
    const EXPOSURE_LAYOUT: ExposureLayout = ExposureLayout::Narrow;
    const GROUP_HOLD: Option<GroupHold> = Some(GroupHold {
        register: 0x3812,
        start: 0x00,
        end: 0x30,
    });

    fn gain_writes(entry: &Sc202csGain) -> Vec<RegisterWrite> {
        vec![RegisterWrite::new(ANALOG_COARSE, entry.analog_coarse),
             RegisterWrite::new(ANALOG_FINE, entry.analog_fine),
             RegisterWrite::new(DIGITAL_FINE, entry.digital_fine)]
    }
}
