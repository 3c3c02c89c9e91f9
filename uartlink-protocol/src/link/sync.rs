//! Header search
//!
//! Scans the receive stream for the header byte. Bytes that are not the
//! header are consumed so the search moves forward; the header itself is
//! only peeked and stays buffered for the decoder. An idle transport is
//! busy-polled until the timeout, never waited on indefinitely.

use uartlink_hal::{Clock, SerialTransport};

use super::{Link, LinkError};
use crate::config::MIN_FRAME_SIZE;
use crate::frame::FrameError;
use crate::lookup::ParamLookup;

impl<T, C, L> Link<T, C, L>
where
    T: SerialTransport,
    C: Clock,
    L: ParamLookup,
{
    /// Wait up to `timeout_ms` for the header to be the next byte
    ///
    /// Returns `true` with the header still unread, or `false` once more
    /// than `timeout_ms` has elapsed.
    pub fn await_header(&mut self, timeout_ms: u32) -> bool {
        let start = self.clock.now_ms();
        let mut discarded = 0usize;

        loop {
            match self.transport.peek_byte() {
                Some(byte) if byte == self.config.header => {
                    trace!("header found after discarding {} bytes", discarded);
                    return true;
                }
                Some(_) => {
                    self.transport.read_byte();
                    discarded += 1;
                }
                None => {}
            }

            if self.clock.elapsed_ms(start) > u64::from(timeout_ms) {
                debug!("no header within {} ms, discarded {} bytes", timeout_ms, discarded);
                return false;
            }
        }
    }

    /// Synchronize on the next header
    ///
    /// With `strict_sync`, fails fast with `InsufficientData` when fewer
    /// than [`MIN_FRAME_SIZE`] bytes are buffered, before anything is
    /// consumed.
    pub fn sync(&mut self, timeout_ms: u32) -> Result<(), LinkError<T::Error>> {
        if self.config.strict_sync {
            let available = self.transport.bytes_available();
            let required = MIN_FRAME_SIZE as usize;
            if available < required {
                debug!("{} bytes buffered, need {} to sync", available, required);
                return Err(FrameError::InsufficientData { available, required }.into());
            }
        }

        if self.await_header(timeout_ms) {
            Ok(())
        } else {
            Err(FrameError::NoHeaderFound.into())
        }
    }
}
