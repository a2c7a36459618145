// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::abstract_sensor::{AbstractSensor, SensorState};
use crate::config::EffectiveConfig;
use crate::descriptor::SensorDescriptor;
use crate::encoder::{apply_writes, exposure_writes};
use crate::error::DriverError;
use crate::sensor_model::SensorModel;
use crate::sequencer::run_sequence;
use crate::transport::RegisterTransport;

/// Time given to the sensor after a successful bring-up before frames are
/// expected to be stable.
pub const SETTLE_AFTER_INIT_MS: u32 = 200;

/// Drives one physical sensor of model `M` through bus `I2C`, sleeping with
/// `D` during bring-up.
pub struct SensorDriver<M, I2C, D> {
    transport: RegisterTransport<I2C>,
    delay: D,
    config: EffectiveConfig,

    state: SensorState,
    // Only updated after every register of an apply has been written.
    gain_index: Option<u32>,
    exposure: Option<u32>,

    _model: PhantomData<M>,
}

impl<M, I2C, D> SensorDriver<M, I2C, D>
where M: SensorModel, I2C: I2c, D: DelayNs
{
    pub fn new(i2c: I2C, delay: D, config: EffectiveConfig) -> Self {
        SensorDriver {
            transport: RegisterTransport::new(i2c, config.i2c_address),
            delay,
            config,
            state: SensorState::Uninitialized,
            gain_index: None,
            exposure: None,
            _model: PhantomData,
        }
    }

    /// Gives back the bus handle, e.g. to reuse it for another device.
    pub fn release(self) -> I2C {
        self.transport.release()
    }

    fn require_initialized(&self, operation: &'static str) -> Result<(), DriverError> {
        if !self.state.is_initialized() {
            return Err(DriverError::InvalidState { operation, state: self.state });
        }
        Ok(())
    }
}

impl<M, I2C, D> AbstractSensor for SensorDriver<M, I2C, D>
where M: SensorModel, I2C: I2c, D: DelayNs
{
    fn descriptor(&self) -> &'static SensorDescriptor { M::DESCRIPTOR }

    fn i2c_address(&self) -> u8 { self.config.i2c_address }
    fn lane_count(&self) -> u8 { self.config.lane_count }
    fn fps(&self) -> u8 { self.config.fps }

    fn gain_steps(&self) -> usize { M::GAIN_TABLE.len() }

    fn gain_value_milli(&self, gain_index: u32) -> u32 {
        M::GAIN_TABLE.value_milli(gain_index)
    }

    fn gain_index_for_milli(&self, milli: u32) -> u32 {
        M::GAIN_TABLE.index_for_milli(milli) as u32
    }

    fn state(&self) -> SensorState { self.state }
    fn gain_index(&self) -> Option<u32> { self.gain_index }
    fn exposure(&self) -> Option<u32> { self.exposure }

    fn init(&mut self) -> Result<(), DriverError> {
        let desc = M::DESCRIPTOR;
        info!("Init {} - {}x{}@{}fps, {} lane(s) @ {}Mbps",
              desc.name, desc.width, desc.height, self.config.fps,
              self.config.lane_count, desc.lane_bitrate_mbps);
        // Whatever happens below, the old register state is gone.
        self.state = SensorState::Uninitialized;
        self.gain_index = None;
        self.exposure = None;

        run_sequence(&mut self.transport, &mut self.delay, M::INIT_SEQUENCE)?;
        self.state = SensorState::Initialized;
        info!("{} initialized ({} registers)", desc.name, M::INIT_SEQUENCE.len());
        Ok(())
    }

    fn read_id(&mut self) -> Result<u16, DriverError> {
        self.require_initialized("read_id")?;
        let high = self.transport.read_register(M::REGISTERS.sensor_id_h)?;
        let low = self.transport.read_register(M::REGISTERS.sensor_id_l)?;
        let pid = ((high as u16) << 8) | low as u16;
        debug!("Read PID 0x{:04X} (H=0x{:02X}, L=0x{:02X})", pid, high, low);
        Ok(pid)
    }

    fn bring_up(&mut self) -> Result<(), DriverError> {
        self.init()?;
        self.verify_id()?;
        self.delay.delay_ms(SETTLE_AFTER_INIT_MS);
        info!("{} ready", M::DESCRIPTOR.name);
        Ok(())
    }

    fn start_stream(&mut self) -> Result<(), DriverError> {
        match self.state {
            SensorState::Initialized | SensorState::Stopped => (),
            state => return Err(DriverError::InvalidState { operation: "start_stream", state }),
        }
        self.transport.write_register(M::REGISTERS.stream_mode, 0x01)?;
        self.state = SensorState::Streaming;
        info!("{} streaming", M::DESCRIPTOR.name);
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), DriverError> {
        if self.state != SensorState::Streaming {
            return Err(DriverError::InvalidState { operation: "stop_stream",
                                                   state: self.state });
        }
        self.transport.write_register(M::REGISTERS.stream_mode, 0x00)?;
        self.state = SensorState::Stopped;
        info!("{} stopped", M::DESCRIPTOR.name);
        Ok(())
    }

    fn set_gain(&mut self, gain_index: u32) -> Result<(), DriverError> {
        self.require_initialized("set_gain")?;
        let index = M::GAIN_TABLE.clamp_index(gain_index);
        let writes = M::gain_writes(&M::GAIN_TABLE.entries[index]);
        apply_writes(&mut self.transport, M::GROUP_HOLD.as_ref(), &writes)?;
        self.gain_index = Some(index as u32);
        debug!("Gain index {} ({} requested) = {}/1000x",
               index, gain_index, M::GAIN_TABLE.values_milli[index]);
        Ok(())
    }

    fn set_exposure(&mut self, exposure: u32) -> Result<(), DriverError> {
        self.require_initialized("set_exposure")?;
        let writes = exposure_writes(&M::EXPOSURE_REGISTERS, M::EXPOSURE_LAYOUT, exposure);
        apply_writes(&mut self.transport, M::GROUP_HOLD.as_ref(), &writes)?;
        self.exposure = Some(exposure);
        debug!("Exposure 0x{:04X}", exposure);
        Ok(())
    }

    fn write_register(&mut self, reg: u16, value: u8) -> Result<(), DriverError> {
        Ok(self.transport.write_register(reg, value)?)
    }

    fn read_register(&mut self, reg: u16) -> Result<u8, DriverError> {
        Ok(self.transport.read_register(reg)?)
    }
}
