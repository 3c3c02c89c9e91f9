//! Receive path
//!
//! A receive synchronizes on the header (using the configured sync
//! timeout), consumes it, then reads the command, the parameter block and
//! optionally the checksum, each read bounded by the read timeout. Bytes
//! consumed by a failed receive are gone; the link stays usable for the
//! next attempt.

use uartlink_hal::{Clock, SerialTransport};

use super::{Link, LinkError};
use crate::checksum::frame_checksum;
use crate::frame::{wire_len, Frame, FrameError, MAX_PARAMS};
use crate::lookup::ParamLookup;

impl<T, C, L> Link<T, C, L>
where
    T: SerialTransport,
    C: Clock,
    L: ParamLookup,
{
    /// Receive a frame whose parameter count comes from the lookup
    pub fn receive_frame(&mut self, checksummed: bool) -> Result<Frame, LinkError<T::Error>> {
        self.receive_frame_with_timeout(checksummed, self.config.read_timeout_ms)
    }

    /// [`receive_frame`](Self::receive_frame) with an explicit per-read timeout
    pub fn receive_frame_with_timeout(
        &mut self,
        checksummed: bool,
        timeout_ms: u32,
    ) -> Result<Frame, LinkError<T::Error>> {
        let command = self.read_header_and_command(timeout_ms)?;
        let count = self.lookup.param_count(command).ok_or_else(|| {
            warn!("no parameter count for command {:#x}", command);
            FrameError::UnknownCommand(command)
        })?;
        self.read_body(command, count as usize, checksummed, timeout_ms)
    }

    /// Receive a frame with a caller-declared parameter count
    pub fn receive_frame_declared(
        &mut self,
        param_count: usize,
        checksummed: bool,
    ) -> Result<Frame, LinkError<T::Error>> {
        self.receive_frame_declared_with_timeout(param_count, checksummed, self.config.read_timeout_ms)
    }

    /// [`receive_frame_declared`](Self::receive_frame_declared) with an
    /// explicit per-read timeout
    pub fn receive_frame_declared_with_timeout(
        &mut self,
        param_count: usize,
        checksummed: bool,
        timeout_ms: u32,
    ) -> Result<Frame, LinkError<T::Error>> {
        // Reject before consuming anything
        self.check_frame_size(wire_len(param_count, checksummed))?;
        let command = self.read_header_and_command(timeout_ms)?;
        self.read_body(command, param_count, checksummed, timeout_ms)
    }

    /// Raw mode: synchronize, consume the header and return the command
    pub fn read_command(&mut self) -> Result<u8, LinkError<T::Error>> {
        self.read_header_and_command(self.config.read_timeout_ms)
    }

    /// Raw mode: read exactly `buf.len()` bytes within `timeout_ms`
    pub fn read_data(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), LinkError<T::Error>> {
        self.read_exact(buf, timeout_ms)
    }

    /// Raw mode: [`read_data`](Self::read_data) with the link's default timeout
    pub fn read_data_default(&mut self, buf: &mut [u8]) -> Result<(), LinkError<T::Error>> {
        self.read_exact(buf, self.config.read_timeout_ms)
    }

    /// Raw mode: read the checksum byte and compare it against `command`
    /// and `data`
    pub fn verify_checksum(&mut self, command: u8, data: &[u8]) -> Result<(), LinkError<T::Error>> {
        self.read_and_verify_checksum(command, data, self.config.read_timeout_ms)
    }

    fn read_header_and_command(&mut self, timeout_ms: u32) -> Result<u8, LinkError<T::Error>> {
        self.sync(self.config.sync_timeout_ms)?;
        // Header was only peeked
        self.transport.read_byte();

        let mut command = [0u8; 1];
        self.read_exact(&mut command, timeout_ms)?;
        trace!("command {:#x}", command[0]);
        Ok(command[0])
    }

    fn read_body(
        &mut self,
        command: u8,
        param_count: usize,
        checksummed: bool,
        timeout_ms: u32,
    ) -> Result<Frame, LinkError<T::Error>> {
        self.check_frame_size(wire_len(param_count, checksummed))?;

        // check_frame_size bounds param_count by max_frame_size - 2
        let mut params = [0u8; MAX_PARAMS];
        let params = &mut params[..param_count];
        self.read_exact(params, timeout_ms)?;

        if checksummed {
            self.read_and_verify_checksum(command, params, timeout_ms)?;
        }

        debug!("received command {:#x} with {} parameters", command, param_count);
        Ok(Frame::new(command, params)?)
    }

    fn read_and_verify_checksum(
        &mut self,
        command: u8,
        data: &[u8],
        timeout_ms: u32,
    ) -> Result<(), LinkError<T::Error>> {
        let mut received = [0u8; 1];
        self.read_exact(&mut received, timeout_ms)?;

        let expected = frame_checksum(command, data);
        if received[0] != expected {
            warn!("checksum mismatch: computed {:#x}, received {:#x}", expected, received[0]);
            return Err(FrameError::ChecksumMismatch {
                expected,
                received: received[0],
            }
            .into());
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), LinkError<T::Error>> {
        let received = self
            .transport
            .read_bytes(buf, timeout_ms)
            .map_err(LinkError::Transport)?;

        if received < buf.len() {
            debug!("read timed out: {} of {} bytes", received, buf.len());
            return Err(FrameError::Incomplete {
                expected: buf.len(),
                received,
            }
            .into());
        }
        Ok(())
    }
}
