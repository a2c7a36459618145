// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::abstract_sensor::AbstractSensor;
use crate::config::SensorConfig;
use crate::descriptor::{RegisterOp, SensorDescriptor};
use crate::error::ConfigError;
use crate::ov02c10::Ov02c10;
use crate::ov5647::Ov5647;
use crate::sc202cs::Sc202cs;
use crate::sensor_driver::SensorDriver;
use crate::sensor_model::SensorModel;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorKind {
    Ov5647,
    Ov02c10,
    Sc202cs,
}

/// One supported sensor model.
#[derive(Debug)]
pub struct RegistryEntry {
    pub kind: SensorKind,
    pub descriptor: &'static SensorDescriptor,
    pub init_sequence: &'static [RegisterOp],
    /// Logical gain of each gain index, in milli-units.
    pub gain_values_milli: &'static [u32],
}

impl RegistryEntry {
    pub fn name(&self) -> &'static str { self.descriptor.name }
}

const fn entry<M: SensorModel>(kind: SensorKind) -> RegistryEntry {
    RegistryEntry {
        kind,
        descriptor: M::DESCRIPTOR,
        init_sequence: M::INIT_SEQUENCE,
        gain_values_milli: M::GAIN_TABLE.values_milli,
    }
}

static SENSORS: [RegistryEntry; 3] = [
    entry::<Ov5647>(SensorKind::Ov5647),
    entry::<Ov02c10>(SensorKind::Ov02c10),
    entry::<Sc202cs>(SensorKind::Sc202cs),
];

/// All supported sensor models, in a fixed order.
pub fn available_sensors() -> &'static [RegistryEntry] {
    &SENSORS
}

/// Looks up a sensor model by name, ignoring ASCII case.
pub fn find_sensor(name: &str) -> Option<&'static RegistryEntry> {
    SENSORS.iter().find(|e| e.name().eq_ignore_ascii_case(name))
}

/// Returns an uninitialized driver for the sensor model `type_name`, talking
/// over `i2c` at the model's default address. No bus traffic happens here;
/// call `init()` or `bring_up()` on the result.
pub fn create_driver<'a, I2C, D>(type_name: &str, i2c: I2C, delay: D)
                                 -> Result<Box<dyn AbstractSensor + Send + 'a>, ConfigError>
where I2C: I2c + Send + 'a, D: DelayNs + Send + 'a
{
    create_driver_with_config(type_name, i2c, delay, &SensorConfig::default())
}

/// As `create_driver()`, with board-specific overrides applied.
pub fn create_driver_with_config<'a, I2C, D>(type_name: &str, i2c: I2C, delay: D,
                                             config: &SensorConfig)
                                             -> Result<Box<dyn AbstractSensor + Send + 'a>,
                                                       ConfigError>
where I2C: I2c + Send + 'a, D: DelayNs + Send + 'a
{
    let Some(entry) = find_sensor(type_name) else {
        return Err(ConfigError::UnknownSensor(type_name.to_string()));
    };
    let effective = config.resolve(entry.descriptor)?;
    debug!("Creating {} driver at 0x{:02X}", entry.name(), effective.i2c_address);
    Ok(match entry.kind {
        SensorKind::Ov5647 =>
            Box::new(SensorDriver::<Ov5647, _, _>::new(i2c, delay, effective)),
        SensorKind::Ov02c10 =>
            Box::new(SensorDriver::<Ov02c10, _, _>::new(i2c, delay, effective)),
        SensorKind::Sc202cs =>
            Box::new(SensorDriver::<Sc202cs, _, _>::new(i2c, delay, effective)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_sensor::SensorState;
    use crate::mock::MockBus;
    use crate::ov02c10::OV02C10_GAIN_TABLE;
    use crate::ov5647::OV5647_GAIN_TABLE;
    use crate::sc202cs::SC202CS_GAIN_TABLE;

    #[test]
    fn test_registry_contents() {
        let names: Vec<&str> = available_sensors().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["ov5647", "ov02c10", "sc202cs"]);
        for entry in available_sensors() {
            assert_eq!(find_sensor(entry.name()).unwrap().kind, entry.kind);
            assert!(!entry.init_sequence.is_empty());
        }
        assert_eq!(available_sensors()[1].gain_values_milli.len(), 160);
        assert_eq!(find_sensor("OV02C10").unwrap().kind, SensorKind::Ov02c10);
        assert!(find_sensor("imx219").is_none());
    }

    #[test]
    fn test_every_gain_table_consistent() {
        assert!(OV5647_GAIN_TABLE.is_consistent());
        assert!(OV02C10_GAIN_TABLE.is_consistent());
        assert!(SC202CS_GAIN_TABLE.is_consistent());
    }

    #[test]
    fn test_unknown_sensor_does_no_io() {
        let bus = MockBus::new();
        let result = create_driver("imx477", bus.clone(), bus.delay());
        match result {
            Err(ConfigError::UnknownSensor(name)) => assert_eq!(name, "imx477"),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("expected an error"),
        }
        assert_eq!(bus.transaction_count(), 0);
    }

    #[test]
    fn test_invalid_override_does_no_io() {
        let bus = MockBus::new();
        let config = SensorConfig::default().with_lane_count(8);
        let result = create_driver_with_config("ov5647", bus.clone(), bus.delay(), &config);
        assert!(matches!(result, Err(ConfigError::InvalidLaneCount(8))));
        assert_eq!(bus.transaction_count(), 0);
    }

    #[test]
    fn test_created_driver_matches_descriptor() {
        for entry in available_sensors() {
            let bus = MockBus::new();
            let sensor = create_driver(entry.name(), bus.clone(), bus.delay()).unwrap();
            assert_eq!(sensor.name(), entry.name());
            assert_eq!(sensor.product_id(), entry.descriptor.product_id);
            assert_eq!(sensor.i2c_address(), entry.descriptor.default_i2c_address);
            assert_eq!(sensor.state(), SensorState::Uninitialized);
            assert_eq!(bus.transaction_count(), 0);
        }
    }

    #[test]
    fn test_config_overrides_reach_driver() {
        let bus = MockBus::new();
        let config = SensorConfig::default().with_i2c_address(0x10).with_fps(15);
        let mut sensor =
            create_driver_with_config("OV5647", bus.clone(), bus.delay(), &config).unwrap();
        assert_eq!(sensor.i2c_address(), 0x10);
        assert_eq!(sensor.fps(), 15);
        assert_eq!(sensor.lane_count(), 2);
        sensor.write_register(0x0100, 0x00).unwrap();
        assert_eq!(bus.events()[0],
                   crate::mock::BusEvent::Write { device: 0x10, bytes: vec![0x01, 0x00, 0x00] });
    }

    #[test]
    fn test_stream_start_stop_through_box() {
        for entry in available_sensors() {
            let bus = MockBus::new();
            let mut sensor = create_driver(entry.name(), bus.clone(), bus.delay()).unwrap();
            sensor.init().unwrap();
            bus.clear_events();
            sensor.start_stream().unwrap();
            sensor.stop_stream().unwrap();
            assert_eq!(bus.register_writes(), vec![(0x0100, 0x01), (0x0100, 0x00)]);
            assert_eq!(sensor.state(), SensorState::Stopped);
        }
    }
}
