// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

//! Recording I2C bus and delay for testing drivers without hardware.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// Everything a driver did, in order. Bus transactions are recorded even when
/// the mock makes them fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Write { device: u8, bytes: Vec<u8> },
    WriteRead { device: u8, bytes: Vec<u8>, read_len: usize },
    Delay { ms: u32 },
    DelayNs { ns: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError(pub ErrorKind);

impl i2c::Error for MockBusError {
    fn kind(&self) -> ErrorKind { self.0 }
}

#[derive(Default)]
struct Inner {
    events: Vec<BusEvent>,
    registers: HashMap<u16, u8>,
    writes_seen: usize,
    reads_seen: usize,
    fail_write_at: Option<usize>,
    fail_writes_from: Option<usize>,
    fail_read_at: Option<usize>,
    fail_reads: bool,
}

/// Mock bus. Clones share one event log and register file so a test can keep
/// a handle after moving a clone into a driver.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Mutex<Inner>>,
    error_kind: ErrorKind,
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBus {
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Mutex::new(Inner::default())),
            error_kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        }
    }

    /// Value returned when `reg` is read. Unset registers read as 0.
    #[must_use]
    pub fn with_register(self, reg: u16, value: u8) -> Self {
        self.inner.lock().unwrap().registers.insert(reg, value);
        self
    }

    /// Kind reported by injected failures (default: address NACK).
    #[must_use]
    pub fn with_error_kind(mut self, kind: ErrorKind) -> Self {
        self.error_kind = kind;
        self
    }

    /// Fail only the `n`th (0-based) write transaction.
    #[must_use]
    pub fn fail_write_at(self, n: usize) -> Self {
        self.inner.lock().unwrap().fail_write_at = Some(n);
        self
    }

    /// Fail the `n`th (0-based) write transaction and every one after it.
    #[must_use]
    pub fn fail_writes_from(self, n: usize) -> Self {
        self.inner.lock().unwrap().fail_writes_from = Some(n);
        self
    }

    /// Fail only the `n`th (0-based) read transaction.
    #[must_use]
    pub fn fail_read_at(self, n: usize) -> Self {
        self.inner.lock().unwrap().fail_read_at = Some(n);
        self
    }

    #[must_use]
    pub fn fail_reads(self) -> Self {
        self.inner.lock().unwrap().fail_reads = true;
        self
    }

    /// A delay source that records into this bus's event log.
    pub fn delay(&self) -> MockDelay {
        MockDelay { inner: Arc::clone(&self.inner) }
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.inner.lock().unwrap().events.clear();
    }

    /// Just the (register, value) pairs of every register write issued.
    pub fn register_writes(&self) -> Vec<(u16, u8)> {
        self.events().iter().filter_map(|e| match e {
            BusEvent::Write { bytes, .. } if bytes.len() == 3 =>
                Some((u16::from_be_bytes([bytes[0], bytes[1]]), bytes[2])),
            _ => None,
        }).collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.events().iter().filter(|e| matches!(
            e, BusEvent::Write { .. } | BusEvent::WriteRead { .. })).count()
    }
}

impl ErrorType for MockBus {
    type Error = MockBusError;
}

impl I2c for MockBus {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>])
                   -> Result<(), Self::Error> {
        let mut inner = self.inner.lock().unwrap();
        match operations {
            [Operation::Write(bytes)] => {
                inner.events.push(BusEvent::Write { device: address, bytes: bytes.to_vec() });
                let n = inner.writes_seen;
                inner.writes_seen += 1;
                let failed = inner.fail_write_at == Some(n) ||
                    inner.fail_writes_from.is_some_and(|from| n >= from);
                if failed {
                    return Err(MockBusError(self.error_kind));
                }
                if bytes.len() == 3 {
                    let reg = u16::from_be_bytes([bytes[0], bytes[1]]);
                    inner.registers.insert(reg, bytes[2]);
                }
                Ok(())
            },
            [Operation::Write(bytes), Operation::Read(buf)] => {
                inner.events.push(BusEvent::WriteRead {
                    device: address, bytes: bytes.to_vec(), read_len: buf.len() });
                let n = inner.reads_seen;
                inner.reads_seen += 1;
                if inner.fail_reads || inner.fail_read_at == Some(n) {
                    return Err(MockBusError(self.error_kind));
                }
                let reg = u16::from_be_bytes([bytes[0], bytes[1]]);
                let value = inner.registers.get(&reg).copied().unwrap_or(0);
                buf.fill(value);
                Ok(())
            },
            _ => panic!("unexpected I2C transaction shape"),
        }
    }
}

pub struct MockDelay {
    inner: Arc<Mutex<Inner>>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.inner.lock().unwrap().events.push(BusEvent::DelayNs { ns });
    }

    fn delay_ms(&mut self, ms: u32) {
        self.inner.lock().unwrap().events.push(BusEvent::Delay { ms });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_bus_shares_state_between_clones() {
        let bus = MockBus::new();
        let mut handle = bus.clone();
        handle.write(0x36, &[0x01, 0x00, 0x01]).unwrap();
        assert_eq!(bus.register_writes(), vec![(0x0100, 0x01)]);

        let mut readback = [0u8; 1];
        handle.write_read(0x36, &[0x01, 0x00], &mut readback).unwrap();
        assert_eq!(readback[0], 0x01);
        assert_eq!(bus.transaction_count(), 2);
    }

    #[test]
    fn test_mock_bus_failure_injection() {
        let mut bus = MockBus::new().fail_write_at(1);
        assert!(bus.write(0x36, &[0, 0, 0]).is_ok());
        assert!(bus.write(0x36, &[0, 1, 0]).is_err());
        assert!(bus.write(0x36, &[0, 2, 0]).is_ok());
        assert_eq!(bus.transaction_count(), 3);
    }

    #[test]
    fn test_mock_delay_records_into_bus_log() {
        let bus = MockBus::new();
        let mut delay = bus.delay();
        delay.delay_ms(10);
        assert_eq!(bus.events(), vec![BusEvent::Delay { ms: 10 }]);
    }
}
