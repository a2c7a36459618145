// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, error};

use crate::descriptor::RegisterOp;
use crate::error::InitError;
use crate::transport::RegisterTransport;

/// Replays `sequence` strictly in order. Each entry's `post_delay_ms` is
/// slept after that entry is written, so the next write (or the return to
/// the caller, for the last entry) happens only once the sensor has settled.
///
/// Stops at the first failed write; earlier writes are not rolled back and
/// the sensor should be considered to be in an undefined state.
pub fn run_sequence<I2C, D>(transport: &mut RegisterTransport<I2C>,
                            delay: &mut D,
                            sequence: &[RegisterOp]) -> Result<(), InitError>
where I2C: I2c, D: DelayNs
{
    for (index, op) in sequence.iter().enumerate() {
        if let Err(cause) = transport.write_register(op.address, op.value) {
            error!("Init failed at entry {} (reg 0x{:04X})", index, op.address);
            return Err(InitError{failed_index: index,
                                 failed_address: op.address,
                                 cause});
        }
        if op.post_delay_ms > 0 {
            debug!("Waiting {}ms after reg 0x{:04X}", op.post_delay_ms, op.address);
            delay.delay_ms(op.post_delay_ms as u32);
        }
    }
    Ok(())
}
