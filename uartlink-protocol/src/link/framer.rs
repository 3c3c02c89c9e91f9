//! Send path
//!
//! [`Link::send_frame`] emits a whole frame in one transport write. The
//! raw-mode operations emit the same bytes in three separate writes for
//! callers that pick the command before the payload length is known:
//!
//! ```text
//! send_command(cmd)        -> [header][cmd]
//! send_data(data)          -> [data...]
//! send_checksum(cmd, data) -> [cmd ^ data...]
//! ```
//!
//! Raw mode checks neither lengths nor ordering; calling the three in
//! order is the caller's job.

use uartlink_hal::{Clock, SerialTransport};

use super::{Link, LinkError};
use crate::checksum::frame_checksum;
use crate::frame::{encode_into, wire_len, Frame, MAX_FRAME_SIZE};
use crate::lookup::ParamLookup;

impl<T, C, L> Link<T, C, L>
where
    T: SerialTransport,
    C: Clock,
    L: ParamLookup,
{
    /// Send one frame as a single contiguous write
    ///
    /// With a negotiating lookup, `params.len()` must match the command's
    /// parameter count.
    pub fn send_frame(&mut self, command: u8, params: &[u8], checksummed: bool) -> Result<(), LinkError<T::Error>> {
        self.check_param_count(command, params.len())?;
        self.check_frame_size(wire_len(params.len(), checksummed))?;

        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = encode_into(self.config.header, command, params, checksummed, &mut buffer)?;

        self.transport
            .write_bytes(&buffer[..len])
            .map_err(LinkError::Transport)?;

        debug!("sent command {:#x} ({} bytes)", command, len);
        Ok(())
    }

    /// Send a prepared [`Frame`]
    pub fn send(&mut self, frame: &Frame, checksummed: bool) -> Result<(), LinkError<T::Error>> {
        self.send_frame(frame.command, &frame.params, checksummed)
    }

    /// Raw mode: write the header and command bytes
    pub fn send_command(&mut self, command: u8) -> Result<(), LinkError<T::Error>> {
        self.transport
            .write_bytes(&[self.config.header, command])
            .map_err(LinkError::Transport)?;
        trace!("sent header and command {:#x}", command);
        Ok(())
    }

    /// Raw mode: write data bytes as they are
    pub fn send_data(&mut self, data: &[u8]) -> Result<(), LinkError<T::Error>> {
        self.transport.write_bytes(data).map_err(LinkError::Transport)?;
        trace!("sent {} data bytes", data.len());
        Ok(())
    }

    /// Raw mode: write the checksum of `command` and `data`
    pub fn send_checksum(&mut self, command: u8, data: &[u8]) -> Result<(), LinkError<T::Error>> {
        let checksum = frame_checksum(command, data);
        self.transport
            .write_bytes(&[checksum])
            .map_err(LinkError::Transport)?;
        trace!("sent checksum {:#x}", checksum);
        Ok(())
    }
}
