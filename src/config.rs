// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use crate::descriptor::SensorDescriptor;
use crate::error::ConfigError;

/// Board-specific overrides of a sensor model's defaults. Unset fields fall
/// back to the model's descriptor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SensorConfig {
    pub i2c_address: Option<u8>,
    pub lane_count: Option<u8>,
    pub fps: Option<u8>,
}

/// Settings a driver actually runs with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub i2c_address: u8,
    pub lane_count: u8,
    pub fps: u8,
}

impl SensorConfig {
    #[must_use]
    pub fn with_i2c_address(mut self, address: u8) -> Self {
        self.i2c_address = Some(address);
        self
    }

    #[must_use]
    pub fn with_lane_count(mut self, lanes: u8) -> Self {
        self.lane_count = Some(lanes);
        self
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u8) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Merges these overrides with `descriptor` and range-checks the result.
    pub fn resolve(&self, descriptor: &SensorDescriptor)
                   -> Result<EffectiveConfig, ConfigError> {
        let i2c_address = self.i2c_address.unwrap_or(descriptor.default_i2c_address);
        // 0x00..=0x07 and 0x78..=0x7F are reserved addresses.
        if !(0x08..=0x77).contains(&i2c_address) {
            return Err(ConfigError::InvalidAddress(i2c_address));
        }
        let lane_count = self.lane_count.unwrap_or(descriptor.lane_count);
        if !(1..=4).contains(&lane_count) {
            return Err(ConfigError::InvalidLaneCount(lane_count));
        }
        let fps = self.fps.unwrap_or(descriptor.fps);
        if !(1..=60).contains(&fps) {
            return Err(ConfigError::InvalidFrameRate(fps));
        }
        Ok(EffectiveConfig { i2c_address, lane_count, fps })
    }
}
