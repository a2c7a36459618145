// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use crate::descriptor::{BayerPattern, SensorDescriptor};
use crate::error::DriverError;

/// Operational state of a sensor driver.
///
/// `Uninitialized -> Initialized -> Streaming <-> Stopped`; `init()` can be
/// re-run from any state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensorState {
    Uninitialized,
    Initialized,
    Streaming,
    Stopped,
}

impl SensorState {
    /// True once a bring-up sequence has completed successfully.
    pub fn is_initialized(&self) -> bool {
        !matches!(self, SensorState::Uninitialized)
    }
}

/// AbstractSensor is the contract a capture pipeline uses to drive any
/// supported MIPI-CSI image sensor over its I2C control bus. Each sensor
/// model supplies its own register tables and encodings; callers never need
/// to know which model they are talking to.
///
/// All methods block until their bus transactions (and, for `init()`, the
/// bring-up delays) complete. Implementations never retry a failed
/// transaction.
pub trait AbstractSensor {
    // Unchanging attributes.

    fn descriptor(&self) -> &'static SensorDescriptor;

    /// Short lowercase model identifier, e.g. "ov5647".
    fn name(&self) -> &'static str { self.descriptor().name }
    fn manufacturer(&self) -> &'static str { self.descriptor().manufacturer }
    /// Expected value of `read_id()`.
    fn product_id(&self) -> u16 { self.descriptor().product_id }
    fn width(&self) -> u16 { self.descriptor().width }
    fn height(&self) -> u16 { self.descriptor().height }
    fn bayer_pattern(&self) -> BayerPattern { self.descriptor().bayer_pattern }
    fn lane_bitrate_mbps(&self) -> u16 { self.descriptor().lane_bitrate_mbps }

    // Board-level settings; these reflect any configured overrides.

    fn i2c_address(&self) -> u8;
    fn lane_count(&self) -> u8;
    fn fps(&self) -> u8;

    /// Number of rows in the gain table; valid gain indices are
    /// `0..gain_steps()`.
    fn gain_steps(&self) -> usize;

    /// Logical gain of (clamped) `gain_index`, in milli-units (1000 = 1x).
    fn gain_value_milli(&self, gain_index: u32) -> u32;

    /// Largest gain index whose logical gain does not exceed `milli`.
    fn gain_index_for_milli(&self, milli: u32) -> u32;

    // Current state.

    fn state(&self) -> SensorState;

    /// Gain index most recently applied successfully since the last
    /// `init()`, after clamping.
    fn gain_index(&self) -> Option<u32>;

    /// Exposure most recently applied successfully since the last `init()`.
    fn exposure(&self) -> Option<u32>;

    // Action methods.

    /// Replays the model's full bring-up sequence. On success the state
    /// becomes `Initialized`; on failure it is `Uninitialized` and the
    /// sensor's register contents are undefined.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Reads the 16-bit product id (high byte register first).
    fn read_id(&mut self) -> Result<u16, DriverError>;

    /// `read_id()`, failing with `IdMismatch` if it is not `product_id()`.
    fn verify_id(&mut self) -> Result<(), DriverError> {
        let found = self.read_id()?;
        let expected = self.product_id();
        if found != expected {
            return Err(DriverError::IdMismatch { expected, found });
        }
        Ok(())
    }

    /// `init()`, `verify_id()`, then waits for the sensor to stabilize.
    fn bring_up(&mut self) -> Result<(), DriverError>;

    /// Valid from `Initialized` or `Stopped`.
    fn start_stream(&mut self) -> Result<(), DriverError>;

    /// Valid from `Streaming`.
    fn stop_stream(&mut self) -> Result<(), DriverError>;

    /// Applies the gain table row `gain_index`. Indices past the end of the
    /// table are silently treated as the last row.
    fn set_gain(&mut self, gain_index: u32) -> Result<(), DriverError>;

    /// Applies an exposure value in the model's native units.
    fn set_exposure(&mut self, exposure: u32) -> Result<(), DriverError>;

    // Raw register access, for diagnostics. Valid in any state; does not
    // change driver state.

    fn write_register(&mut self, reg: u16, value: u8) -> Result<(), DriverError>;
    fn read_register(&mut self, reg: u16) -> Result<u8, DriverError>;
}
