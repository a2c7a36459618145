// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// A simple stepping auto-exposure loop. The caller measures frame brightness
// (0..=255) however it likes and feeds it to `update()`; exposure is adjusted
// first and gain only once exposure has hit its limit.

use log::debug;

use crate::abstract_sensor::AbstractSensor;
use crate::error::DriverError;

pub const DEFAULT_TARGET_BRIGHTNESS: u8 = 128;
pub const DEFAULT_TOLERANCE: u8 = 10;
pub const DEFAULT_EXPOSURE: u32 = 0x9C0;
pub const DEFAULT_GAIN_INDEX: u32 = 20;

const EXPOSURE_STEP: u32 = 0x40;
const EXPOSURE_MIN: u32 = 0x200;
const EXPOSURE_MAX: u32 = 0xF00;
const GAIN_STEP: u32 = 2;
const GAIN_INDEX_MAX: u32 = 120;

pub const MAX_BRIGHTNESS_LEVEL: u8 = 10;

/// Settings produced by one controller step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AeStep {
    pub exposure: u32,
    pub gain_index: u32,
}

#[derive(Clone, Debug)]
pub struct AutoExposure {
    target_brightness: u8,
    tolerance: u8,
    exposure: u32,
    gain_index: u32,
}

impl Default for AutoExposure {
    fn default() -> Self {
        AutoExposure {
            target_brightness: DEFAULT_TARGET_BRIGHTNESS,
            tolerance: DEFAULT_TOLERANCE,
            exposure: DEFAULT_EXPOSURE,
            gain_index: DEFAULT_GAIN_INDEX,
        }
    }
}

impl AutoExposure {
    pub fn new(target_brightness: u8, tolerance: u8) -> Self {
        AutoExposure { target_brightness, tolerance, ..Default::default() }
    }

    pub fn target_brightness(&self) -> u8 { self.target_brightness }

    pub fn set_target_brightness(&mut self, target: u8) {
        self.target_brightness = target;
    }

    pub fn current(&self) -> AeStep {
        AeStep { exposure: self.exposure, gain_index: self.gain_index }
    }

    /// Overrides the controller's notion of the current settings, e.g. after
    /// the application applied manual values.
    pub fn set_current(&mut self, exposure: u32, gain_index: u32) {
        self.exposure = exposure;
        self.gain_index = gain_index;
    }

    /// Moves one step toward `measured` brightness matching the target.
    /// Returns the new settings, or None if nothing changed (within
    /// tolerance, or already at the relevant limit).
    pub fn update(&mut self, measured: u8) -> Option<AeStep> {
        let error = self.target_brightness as i32 - measured as i32;
        if error.abs() <= self.tolerance as i32 {
            return None;
        }
        let before = self.current();
        if error > 0 {
            if self.exposure < EXPOSURE_MAX {
                self.exposure += EXPOSURE_STEP;
            } else if self.gain_index < GAIN_INDEX_MAX {
                self.gain_index += GAIN_STEP;
            }
        } else if self.exposure > EXPOSURE_MIN {
            self.exposure -= EXPOSURE_STEP;
        } else if self.gain_index > 0 {
            self.gain_index = self.gain_index.saturating_sub(GAIN_STEP);
        }
        let after = self.current();
        if after == before {
            return None;
        }
        debug!("AE: brightness={} target={} -> exposure=0x{:04X} gain={}",
               measured, self.target_brightness, after.exposure, after.gain_index);
        Some(after)
    }

    /// Writes the current exposure, then the current gain index, to `sensor`.
    pub fn apply(&self, sensor: &mut dyn AbstractSensor) -> Result<(), DriverError> {
        sensor.set_exposure(self.exposure)?;
        sensor.set_gain(self.gain_index)
    }
}

/// Preset settings for a coarse brightness `level`, clamped to
/// 0..=MAX_BRIGHTNESS_LEVEL.
pub fn brightness_level(level: u8) -> AeStep {
    let level = level.min(MAX_BRIGHTNESS_LEVEL) as u32;
    AeStep { exposure: 0x400 + level * 0xB0, gain_index: level * 6 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_sensor::SensorState;
    use crate::mock::MockBus;
    use crate::select_sensor::create_driver;

    #[test]
    fn test_within_tolerance_does_nothing() {
        let mut ae = AutoExposure::default();
        assert_eq!(ae.update(128), None);
        assert_eq!(ae.update(118), None);
        assert_eq!(ae.update(138), None);
        assert_eq!(ae.current(), AeStep { exposure: 0x9C0, gain_index: 20 });
    }

    #[test]
    fn test_dark_raises_exposure_then_gain() {
        let mut ae = AutoExposure::default();
        assert_eq!(ae.update(100), Some(AeStep { exposure: 0xA00, gain_index: 20 }));
        let mut last = None;
        for _ in 0..100 {
            if let Some(step) = ae.update(0) {
                last = Some(step);
            }
        }
        // Exposure saturates first, then gain climbs to its limit.
        assert_eq!(last, Some(AeStep { exposure: 0xF00, gain_index: 120 }));
        assert_eq!(ae.update(0), None);
    }

    #[test]
    fn test_bright_lowers_exposure_then_gain() {
        let mut ae = AutoExposure::default();
        ae.set_current(0x240, 3);
        assert_eq!(ae.update(200), Some(AeStep { exposure: 0x200, gain_index: 3 }));
        assert_eq!(ae.update(200), Some(AeStep { exposure: 0x200, gain_index: 1 }));
        assert_eq!(ae.update(200), Some(AeStep { exposure: 0x200, gain_index: 0 }));
        assert_eq!(ae.update(255), None);
    }

    #[test]
    fn test_custom_target() {
        let mut ae = AutoExposure::new(60, 5);
        assert_eq!(ae.target_brightness(), 60);
        assert_eq!(ae.update(64), None);
        assert!(ae.update(70).is_some());
        ae.set_target_brightness(200);
        assert_eq!(ae.update(196), None);
    }

    #[test]
    fn test_brightness_levels() {
        assert_eq!(brightness_level(0), AeStep { exposure: 0x400, gain_index: 0 });
        assert_eq!(brightness_level(5), AeStep { exposure: 0x770, gain_index: 30 });
        assert_eq!(brightness_level(10), AeStep { exposure: 0xAE0, gain_index: 60 });
        assert_eq!(brightness_level(200), brightness_level(10));
    }

    #[test]
    fn test_apply_writes_exposure_then_gain() {
        let bus = MockBus::new();
        let mut sensor = create_driver("ov02c10", bus.clone(), bus.delay()).unwrap();
        let ae = AutoExposure::default();
        // Not initialized yet.
        assert!(ae.apply(sensor.as_mut()).is_err());
        assert_eq!(bus.transaction_count(), 0);

        sensor.init().unwrap();
        sensor.start_stream().unwrap();
        bus.clear_events();
        ae.apply(sensor.as_mut()).unwrap();
        let writes = bus.register_writes();
        assert_eq!(writes[1], (0x3500, 0x00));
        assert_eq!(writes[2], (0x3501, 0x9c));
        assert_eq!(writes[6], (0x350c, 0x34));
        assert_eq!(sensor.exposure(), Some(0x9C0));
        assert_eq!(sensor.gain_index(), Some(20));
        assert_eq!(sensor.state(), SensorState::Streaming);
    }
}
