// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use crate::descriptor::{GainTable, RegisterMap, RegisterOp, SensorDescriptor};
use crate::encoder::{ExposureLayout, ExposureRegisters, GroupHold, RegisterWrite};

/// Compile-time description of one sensor model: its descriptor, register
/// map, bring-up sequence, gain table and encodings. Implemented by a
/// zero-sized marker type per model; `SensorDriver<M, ..>` turns it into an
/// `AbstractSensor`.
pub trait SensorModel: 'static {
    /// One row of this model's gain table, with named register fields.
    type GainEntry: 'static;

    const DESCRIPTOR: &'static SensorDescriptor;
    const REGISTERS: &'static RegisterMap;
    const INIT_SEQUENCE: &'static [RegisterOp];
    const GAIN_TABLE: &'static GainTable<Self::GainEntry>;
    const EXPOSURE_REGISTERS: ExposureRegisters;
    const EXPOSURE_LAYOUT: ExposureLayout;
    /// `None` for models that apply gain and exposure registers directly.
    const GROUP_HOLD: Option<GroupHold>;

    /// Register writes for one gain table row, in the order they must be
    /// sent.
    fn gain_writes(entry: &Self::GainEntry) -> Vec<RegisterWrite>;
}
