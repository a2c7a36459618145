// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use canonical_error::{CanonicalError, failed_precondition_error,
                      invalid_argument_error, not_found_error};
use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

use crate::abstract_sensor::SensorState;

/// Failure of a single bus transaction. Never retried inside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The sensor did not acknowledge its address or a data byte.
    #[error("no acknowledge from device")]
    Nack,

    /// The transaction did not complete in time.
    #[error("bus transaction timed out")]
    Timeout,

    /// Another master held the bus, or the bus reported an electrical fault.
    #[error("bus busy")]
    BusBusy,

    /// Any other controller-reported failure.
    #[error("bus error: {0:?}")]
    Other(ErrorKind),
}

impl From<ErrorKind> for TransportError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => TransportError::Nack,
            ErrorKind::ArbitrationLoss | ErrorKind::Bus => TransportError::BusBusy,
            ErrorKind::Overrun => TransportError::Timeout,
            other => TransportError::Other(other),
        }
    }
}

/// First register of an init sequence that could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("init sequence failed at entry {failed_index} (register 0x{failed_address:04X}): {cause}")]
pub struct InitError {
    pub failed_index: usize,
    pub failed_address: u16,
    #[source]
    pub cause: TransportError,
}

/// Construction-time errors. Raised before any bus I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown sensor type '{0}'")]
    UnknownSensor(String),

    #[error("I2C address 0x{0:02X} is not a valid 7-bit device address")]
    InvalidAddress(u8),

    #[error("lane count {0} out of range 1..=4")]
    InvalidLaneCount(u8),

    #[error("frame rate {0} out of range 1..=60")]
    InvalidFrameRate(u8),
}

/// Errors returned by the operations of an `AbstractSensor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("{operation} not allowed while sensor is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SensorState,
    },

    #[error("wrong sensor id 0x{found:04X} (expected 0x{expected:04X})")]
    IdMismatch { expected: u16, found: u16 },
}

impl From<ConfigError> for CanonicalError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownSensor(_) => not_found_error(&err.to_string()),
            _ => invalid_argument_error(&err.to_string()),
        }
    }
}

impl From<DriverError> for CanonicalError {
    fn from(err: DriverError) -> Self {
        failed_precondition_error(&err.to_string())
    }
}
