//! `embedded-io` adapter
//!
//! Wraps any peripheral implementing the `embedded-io` blocking traits
//! (`Read + Write + ReadReady`) into a [`SerialTransport`]. `embedded-io`
//! has neither peek nor a byte count, so the adapter drains ready bytes
//! into a small lookahead buffer and answers both from there. Timed reads
//! poll `read_ready` against the supplied [`Clock`].
//!
//! A peripheral error hit while filling the lookahead (overrun, framing)
//! is logged and held; the next [`read_bytes`](SerialTransport::read_bytes)
//! returns it.

use embedded_io::{Error as _, ErrorType, Read, ReadReady, Write};
use heapless::Deque;

use crate::time::Clock;
use crate::uart::{SerialTransport, UartConfig};

/// Bytes the adapter can hold back for peeking and counting
pub const LOOKAHEAD: usize = 16;

/// [`SerialTransport`] over an `embedded-io` peripheral
pub struct IoTransport<T: ErrorType, C> {
    io: T,
    clock: C,
    ahead: Deque<u8, LOOKAHEAD>,
    fault: Option<T::Error>,
}

impl<T: ErrorType, C> IoTransport<T, C> {
    /// Wrap a peripheral that is already configured for the link's baud rate
    pub fn new(io: T, clock: C) -> Self {
        Self {
            io,
            clock,
            ahead: Deque::new(),
            fault: None,
        }
    }

    /// Release the peripheral
    ///
    /// Bytes held in the lookahead are dropped.
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T, C> IoTransport<T, C>
where
    T: Read + ReadReady,
{
    /// Move ready bytes into the lookahead until it is full or the
    /// peripheral runs dry
    fn fill(&mut self) {
        while !self.ahead.is_full() {
            match self.poll_byte() {
                Ok(Some(byte)) => {
                    // Not full, checked above
                    let _ = self.ahead.push_back(byte);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("serial read failed: {:?}", e.kind());
                    self.fault = Some(e);
                    break;
                }
            }
        }
    }

    fn poll_byte(&mut self) -> Result<Option<u8>, T::Error> {
        if !self.io.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        Ok((self.io.read(&mut byte)? == 1).then_some(byte[0]))
    }
}

impl<T, C> SerialTransport for IoTransport<T, C>
where
    T: Read + Write + ReadReady,
    C: Clock,
{
    type Error = T::Error;

    /// `embedded-io` peripherals are configured when constructed, so this
    /// only accepts the settings.
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        debug!(
            "embedded-io peripheral keeps its own setup, ignoring {} baud",
            config.baudrate
        );
        Ok(())
    }

    /// Exact up to [`LOOKAHEAD`], a lower bound beyond it
    fn bytes_available(&mut self) -> usize {
        self.fill();
        self.ahead.len()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.fill();
        self.ahead.front().copied()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.fill();
        self.ahead.pop_front()
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        if let Some(e) = self.fault.take() {
            return Err(e);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let start = self.clock.now_ms();
        let mut filled = 0;

        while filled < buf.len() {
            match self.ahead.pop_front() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }

        while filled < buf.len() {
            if self.io.read_ready()? {
                let n = self.io.read(&mut buf[filled..])?;
                if n == 0 {
                    // EOF
                    break;
                }
                filled += n;
            } else if self.clock.elapsed_ms(start) >= u64::from(timeout_ms) {
                break;
            }
        }

        Ok(filled)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(data)?;
        self.io.flush()
    }
}
