// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

// Packing of gain and exposure settings into sensor register bytes, and the
// group-hold bracket used to make multi-register updates take effect on a
// single frame boundary.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::error::TransportError;
use crate::transport::RegisterTransport;

/// A single register write produced by an encoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u8,
}

impl RegisterWrite {
    pub const fn new(address: u16, value: u8) -> Self {
        RegisterWrite { address, value }
    }
}

/// Writing `start` to `register` begins buffering register writes; writing
/// `end` closes the group so the buffered values latch together.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupHold {
    pub register: u16,
    pub start: u8,
    pub end: u8,
}

/// How an exposure value (in sensor line units, or fractions of a line for
/// the narrow layout) is spread over three 8-bit registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExposureLayout {
    /// 16-bit value: bits 15..12 in the low nibble of H, bits 11..4 in M,
    /// bits 3..0 in the high nibble of L. Higher bits are ignored.
    Narrow,
    /// 24-bit value: one byte per register, most significant first. Bits
    /// above 23 are ignored.
    Wide,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExposureRegisters {
    pub exposure_h: u16,
    pub exposure_m: u16,
    pub exposure_l: u16,
}

/// Returns the (H, M, L) register bytes for `value`.
pub fn encode_exposure(layout: ExposureLayout, value: u32) -> [u8; 3] {
    match layout {
        ExposureLayout::Narrow => [
            ((value >> 12) & 0x0F) as u8,
            ((value >> 4) & 0xFF) as u8,
            ((value & 0x0F) << 4) as u8,
        ],
        ExposureLayout::Wide => [
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ],
    }
}

pub fn exposure_writes(regs: &ExposureRegisters, layout: ExposureLayout, value: u32)
                       -> [RegisterWrite; 3] {
    let [h, m, l] = encode_exposure(layout, value);
    [RegisterWrite::new(regs.exposure_h, h),
     RegisterWrite::new(regs.exposure_m, m),
     RegisterWrite::new(regs.exposure_l, l)]
}

/// Writes `payload` in order, bracketed by `group_hold` when the model has
/// one. Returns the first failure.
///
/// If a payload write fails after the hold was opened, one attempt is made to
/// close the hold so the sensor does not keep buffering indefinitely; the
/// outcome of that attempt is logged and the original error is returned.
pub fn apply_writes<I2C: I2c>(transport: &mut RegisterTransport<I2C>,
                              group_hold: Option<&GroupHold>,
                              payload: &[RegisterWrite]) -> Result<(), TransportError> {
    let Some(hold) = group_hold else {
        for w in payload {
            transport.write_register(w.address, w.value)?;
        }
        return Ok(());
    };

    transport.write_register(hold.register, hold.start)?;
    for w in payload {
        if let Err(e) = transport.write_register(w.address, w.value) {
            match transport.write_register(hold.register, hold.end) {
                Ok(()) => warn!("Released group hold after failed write to reg 0x{:04X}",
                                w.address),
                Err(release_err) => warn!(
                    "Group hold left open after failed write to reg 0x{:04X}: {}",
                    w.address, release_err),
            }
            return Err(e);
        }
    }
    transport.write_register(hold.register, hold.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;

    const HOLD: GroupHold = GroupHold { register: 0x3208, start: 0x00, end: 0x10 };
    const REGS: ExposureRegisters = ExposureRegisters {
        exposure_h: 0x3500, exposure_m: 0x3501, exposure_l: 0x3502 };

    #[test]
    fn test_narrow_exposure_layout() {
        assert_eq!(encode_exposure(ExposureLayout::Narrow, 0x046C), [0x00, 0x46, 0xC0]);
        assert_eq!(encode_exposure(ExposureLayout::Narrow, 0x9C0), [0x00, 0x9C, 0x00]);
        assert_eq!(encode_exposure(ExposureLayout::Narrow, 0xABCD), [0x0A, 0xBC, 0xD0]);
        // Only 16 bits fit.
        assert_eq!(encode_exposure(ExposureLayout::Narrow, 0x1_FFFF), [0x0F, 0xFF, 0xF0]);
    }

    #[test]
    fn test_wide_exposure_layout() {
        assert_eq!(encode_exposure(ExposureLayout::Wide, 0x046C), [0x00, 0x04, 0x6C]);
        assert_eq!(encode_exposure(ExposureLayout::Wide, 0x12_3456), [0x12, 0x34, 0x56]);
        assert_eq!(encode_exposure(ExposureLayout::Wide, 0xFF12_3456), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_exposure_writes_target_registers() {
        let writes = exposure_writes(&REGS, ExposureLayout::Narrow, 0x046C);
        assert_eq!(writes, [RegisterWrite::new(0x3500, 0x00),
                            RegisterWrite::new(0x3501, 0x46),
                            RegisterWrite::new(0x3502, 0xC0)]);
    }

    #[test]
    fn test_group_hold_brackets_payload() {
        let bus = MockBus::new();
        let mut transport = RegisterTransport::new(bus.clone(), 0x36);
        let payload = [RegisterWrite::new(0x350a, 0x01), RegisterWrite::new(0x3508, 0x02)];
        apply_writes(&mut transport, Some(&HOLD), &payload).unwrap();
        assert_eq!(bus.register_writes(),
                   vec![(0x3208, 0x00), (0x350a, 0x01), (0x3508, 0x02), (0x3208, 0x10)]);
    }

    #[test]
    fn test_without_group_hold_writes_directly() {
        let bus = MockBus::new();
        let mut transport = RegisterTransport::new(bus.clone(), 0x36);
        let payload = [RegisterWrite::new(0x350a, 0x00), RegisterWrite::new(0x350b, 0x10)];
        apply_writes(&mut transport, None, &payload).unwrap();
        assert_eq!(bus.register_writes(), vec![(0x350a, 0x00), (0x350b, 0x10)]);
    }

    #[test]
    fn test_payload_failure_releases_hold() {
        // Write #2 is the second payload write.
        let bus = MockBus::new().fail_write_at(2);
        let mut transport = RegisterTransport::new(bus.clone(), 0x36);
        let payload = [RegisterWrite::new(0x350a, 0x01),
                       RegisterWrite::new(0x3508, 0x02),
                       RegisterWrite::new(0x3509, 0x03)];
        let err = apply_writes(&mut transport, Some(&HOLD), &payload).unwrap_err();
        assert_eq!(err, TransportError::Nack);
        // hold start, payload 0, failed payload 1, release; payload 2 never sent.
        let addresses: Vec<u16> = bus.events().iter().filter_map(|e| match e {
            crate::mock::BusEvent::Write { bytes, .. } =>
                Some(u16::from_be_bytes([bytes[0], bytes[1]])),
            _ => None,
        }).collect();
        assert_eq!(addresses, vec![0x3208, 0x350a, 0x3508, 0x3208]);
        assert_eq!(bus.register_writes().last(), Some(&(0x3208, 0x10)));
    }

    #[test]
    fn test_hold_start_failure_sends_nothing_else() {
        let bus = MockBus::new().fail_write_at(0);
        let mut transport = RegisterTransport::new(bus.clone(), 0x36);
        let payload = [RegisterWrite::new(0x350a, 0x01)];
        assert!(apply_writes(&mut transport, Some(&HOLD), &payload).is_err());
        assert_eq!(bus.transaction_count(), 1);
    }

    #[test]
    fn test_direct_failure_stops_remaining_writes() {
        let bus = MockBus::new().fail_write_at(0);
        let mut transport = RegisterTransport::new(bus.clone(), 0x36);
        let payload = [RegisterWrite::new(0x350a, 0x00), RegisterWrite::new(0x350b, 0x10)];
        assert!(apply_writes(&mut transport, None, &payload).is_err());
        assert_eq!(bus.transaction_count(), 1);
    }
}
