// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Byte-level register access for sensors with 16-bit register addresses and
// 8-bit register values (the SCCB-over-I2C convention used by OmniVision and
// SmartSens parts).

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::error;

use crate::error::TransportError;

/// One sensor on an I2C bus. Owns (or mutably borrows, if `I2C` is a
/// reference or a shared-bus device) the bus handle; callers sharing a bus
/// between several sensors are responsible for serializing access.
pub struct RegisterTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RegisterTransport<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        RegisterTransport { i2c, address }
    }

    pub fn address(&self) -> u8 { self.address }

    /// Single write transaction: address high byte, address low byte, value.
    pub fn write_register(&mut self, reg: u16, value: u8) -> Result<(), TransportError> {
        let [reg_h, reg_l] = reg.to_be_bytes();
        self.i2c.write(self.address, &[reg_h, reg_l, value]).map_err(|e| {
            let err = TransportError::from(e.kind());
            error!("I2C write failed for reg 0x{:04X} on device 0x{:02X}: {}",
                   reg, self.address, err);
            err
        })
    }

    /// Writes the 2-byte register address then, after a repeated start,
    /// reads back exactly one byte.
    pub fn read_register(&mut self, reg: u16) -> Result<u8, TransportError> {
        let mut value = [0u8; 1];
        self.i2c.write_read(self.address, &reg.to_be_bytes(), &mut value).map_err(|e| {
            let err = TransportError::from(e.kind());
            error!("I2C read failed for reg 0x{:04X} on device 0x{:02X}: {}",
                   reg, self.address, err);
            err
        })?;
        Ok(value[0])
    }

    pub fn release(self) -> I2C { self.i2c }
}

/// `DelayNs` implementation that blocks the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}
