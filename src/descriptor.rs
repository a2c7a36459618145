// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fmt;

/// Color filter arrangement of the raw pixel output, named by the colors of
/// the top-left 2x2 cell in reading order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BayerPattern {
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

impl BayerPattern {
    /// Numeric code used when configuring the CSI receiver and ISP.
    pub fn code(&self) -> u8 {
        match self {
            BayerPattern::Rggb => 0,
            BayerPattern::Grbg => 1,
            BayerPattern::Gbrg => 2,
            BayerPattern::Bggr => 3,
        }
    }
}

impl fmt::Display for BayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BayerPattern::Rggb => "RGGB",
            BayerPattern::Grbg => "GRBG",
            BayerPattern::Gbrg => "GBRG",
            BayerPattern::Bggr => "BGGR",
        };
        f.write_str(s)
    }
}

/// Unchanging facts about a sensor model. One constant per model, shared by
/// every driver of that model.
#[derive(Debug, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: &'static str,
    pub manufacturer: &'static str,
    /// Value read back from the sensor id registers.
    pub product_id: u16,
    /// 7-bit I2C address.
    pub default_i2c_address: u8,
    /// MIPI data lanes, 1..=4.
    pub lane_count: u8,
    pub bayer_pattern: BayerPattern,
    pub lane_bitrate_mbps: u16,
    pub width: u16,
    pub height: u16,
    pub fps: u8,
}

/// Control registers every supported model has.
#[derive(Debug, PartialEq, Eq)]
pub struct RegisterMap {
    pub sensor_id_h: u16,
    pub sensor_id_l: u16,
    /// 1 = streaming, 0 = standby.
    pub stream_mode: u16,
    pub software_reset: u16,
}

/// One step of a bring-up sequence. `post_delay_ms` is waited after this
/// write has been applied, before anything else is sent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterOp {
    pub address: u16,
    pub value: u8,
    pub post_delay_ms: u16,
}

impl RegisterOp {
    pub const fn new(address: u16, value: u8) -> Self {
        RegisterOp { address, value, post_delay_ms: 0 }
    }

    pub const fn with_delay(address: u16, value: u8, post_delay_ms: u16) -> Self {
        RegisterOp { address, value, post_delay_ms }
    }
}

/// Gain register settings indexed by gain index, with the logical gain of
/// each row in milli-units (1000 = 1x). Both slices have the same length and
/// the values are strictly increasing.
#[derive(Debug)]
pub struct GainTable<E: 'static> {
    pub entries: &'static [E],
    pub values_milli: &'static [u32],
}

impl<E: 'static> GainTable<E> {
    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Saturates out-of-range requests to the last row.
    pub fn clamp_index(&self, requested: u32) -> usize {
        let last = self.entries.len().saturating_sub(1);
        usize::min(requested as usize, last)
    }

    pub fn entry(&self, requested: u32) -> &'static E {
        &self.entries[self.clamp_index(requested)]
    }

    pub fn value_milli(&self, requested: u32) -> u32 {
        self.values_milli[self.clamp_index(requested)]
    }

    /// Largest index whose logical gain does not exceed `milli`; 0 when the
    /// request is below the smallest gain.
    pub fn index_for_milli(&self, milli: u32) -> usize {
        self.values_milli.partition_point(|&v| v <= milli).saturating_sub(1)
    }

    /// Checks the co-indexing and ordering invariants.
    pub fn is_consistent(&self) -> bool {
        !self.entries.is_empty() &&
            self.entries.len() == self.values_milli.len() &&
            self.values_milli.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENTRIES: [u8; 4] = [0x10, 0x20, 0x40, 0x80];
    static VALUES: [u32; 4] = [1000, 2000, 4000, 8000];
    static TABLE: GainTable<u8> = GainTable { entries: &ENTRIES, values_milli: &VALUES };

    #[test]
    fn test_clamp_index_saturates() {
        assert_eq!(TABLE.clamp_index(0), 0);
        assert_eq!(TABLE.clamp_index(3), 3);
        assert_eq!(TABLE.clamp_index(4), 3);
        assert_eq!(TABLE.clamp_index(u32::MAX), 3);
        assert_eq!(*TABLE.entry(1000), 0x80);
        assert_eq!(TABLE.value_milli(99), 8000);
    }

    #[test]
    fn test_index_for_milli() {
        assert_eq!(TABLE.index_for_milli(0), 0);
        assert_eq!(TABLE.index_for_milli(1000), 0);
        assert_eq!(TABLE.index_for_milli(3999), 1);
        assert_eq!(TABLE.index_for_milli(4000), 2);
        assert_eq!(TABLE.index_for_milli(1_000_000), 3);
    }

    #[test]
    fn test_consistency_check() {
        assert!(TABLE.is_consistent());
        static SHORT: [u32; 3] = [1000, 2000, 4000];
        let mismatched = GainTable { entries: &ENTRIES[..], values_milli: &SHORT[..] };
        assert!(!mismatched.is_consistent());
    }

    #[test]
    fn test_bayer_codes() {
        assert_eq!(BayerPattern::Rggb.code(), 0);
        assert_eq!(BayerPattern::Bggr.code(), 3);
        assert_eq!(BayerPattern::Gbrg.to_string(), "GBRG");
    }
}
