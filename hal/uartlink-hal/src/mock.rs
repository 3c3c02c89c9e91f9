//! In-memory transport and clock for host testing
//!
//! [`MockClock`] advances by a fixed tick every time it is read, so
//! busy-poll loops always terminate. [`MockSerial`] shares the clock and
//! jumps it forward by the full timeout whenever a timed read runs short,
//! the way a real blocking read would spend the time waiting.

use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::cell::Cell;

use crate::time::Clock;
use crate::uart::{SerialTransport, UartConfig};

/// Deterministic clock shared between a test and its [`MockSerial`]
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
    tick_ms: u64,
}

impl MockClock {
    /// Clock starting at 0 that advances 1 ms per reading
    pub fn new() -> Self {
        Self::with_tick(1)
    }

    /// Clock starting at 0 that advances `tick_ms` per reading
    pub fn with_tick(tick_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            tick_ms,
        }
    }

    /// Move time forward without reading it
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    /// Current time without ticking
    pub fn peek_ms(&self) -> u64 {
        self.now.get()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.tick_ms);
        now
    }
}

/// Errors injected by [`MockSerial`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Write rejected because `fail_writes` is set
    WriteFailed,
}

/// In-memory serial port
///
/// Bytes given to [`inject`](Self::inject) become receivable; every
/// `write_bytes` call is recorded separately so tests can check how a
/// frame was split into writes.
#[derive(Debug)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    clock: MockClock,
    config: Option<UartConfig>,
    fail_writes: bool,
}

impl MockSerial {
    pub fn new(clock: MockClock) -> Self {
        Self {
            rx: VecDeque::new(),
            writes: Vec::new(),
            clock,
            config: None,
            fail_writes: false,
        }
    }

    /// Mock with its own clock; use [`clock`](Self::clock) to share it
    pub fn standalone() -> Self {
        Self::new(MockClock::new())
    }

    /// Make bytes available for reading
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Handle to the clock this port advances
    pub fn clock(&self) -> MockClock {
        self.clock.clone()
    }

    /// Every `write_bytes` call in order
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All written bytes concatenated
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Drain all written bytes, e.g. to feed them into a peer's `inject`
    pub fn take_written(&mut self) -> Vec<u8> {
        let bytes = self.writes.concat();
        self.writes.clear();
        bytes
    }

    /// Bytes still waiting to be read
    pub fn pending(&self) -> Vec<u8> {
        self.rx.iter().copied().collect()
    }

    /// Configuration passed to the last `configure` call
    pub fn config(&self) -> Option<UartConfig> {
        self.config
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl SerialTransport for MockSerial {
    type Error = MockError;

    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        self.config = Some(*config);
        Ok(())
    }

    fn bytes_available(&mut self) -> usize {
        self.rx.len()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.rx.front().copied()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => {
                    self.clock.advance(u64::from(timeout_ms));
                    break;
                }
            }
        }
        Ok(n)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MockError::WriteFailed);
        }
        self.writes.push(data.to_vec());
        Ok(())
    }
}
