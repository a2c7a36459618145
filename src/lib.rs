// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

pub mod abstract_sensor;
pub mod auto_exposure;
pub mod config;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod ov02c10;
pub mod ov5647;
pub mod sc202cs;
pub mod select_sensor;
pub mod sensor_driver;
pub mod sensor_model;
pub mod sequencer;
pub mod transport;

#[cfg(test)]
mod mock;
