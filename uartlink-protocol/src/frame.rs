//! Frame encoding and decoding.
//!
//! Frame format:
//! - HEADER (1 byte): synchronization byte, 0xAA by default
//! - COMMAND (1 byte): command identifier
//! - PARAMS (N bytes): N fixed per command, never sent on the wire
//! - CHECKSUM (1 byte, optional): XOR of COMMAND and all PARAMS bytes
//!
//! [`Frame::encode`] builds the bytes for a transport write;
//! [`FrameParser`] rebuilds frames from bytes fed one at a time, for
//! receivers driven by an RX interrupt rather than blocking reads.

use heapless::Vec;

use crate::checksum::{frame_checksum, Checksum};
use crate::config::LinkConfig;
use crate::lookup::ParamLookup;

/// Largest frame any configuration can describe
pub const MAX_FRAME_SIZE: usize = u8::MAX as usize;

/// Header and command bytes present in every frame
pub const FRAME_OVERHEAD: usize = 2;

/// Largest parameter block any configuration can describe
pub const MAX_PARAMS: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

/// Errors that can occur while building, sending or receiving frames
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Header byte did not appear before the timeout
    #[error("no header byte within timeout")]
    NoHeaderFound,
    /// Fewer bytes buffered than the smallest frame
    #[error("{available} bytes buffered, need at least {required}")]
    InsufficientData { available: usize, required: usize },
    /// Caller's parameter count disagrees with the lookup
    #[error("command expects {expected} parameters, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },
    /// Frame would exceed the configured maximum
    #[error("frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },
    /// Read timed out before all bytes arrived
    #[error("expected {expected} bytes, received {received} before timeout")]
    Incomplete { expected: usize, received: usize },
    /// Received checksum differs from the computed one
    #[error("checksum mismatch: computed {expected:#04x}, received {received:#04x}")]
    ChecksumMismatch { expected: u8, received: u8 },
    /// Lookup has no parameter count for this command
    #[error("unknown command {0:#04x}")]
    UnknownCommand(u8),
    /// Output buffer too small for encoding
    #[error("buffer too small for frame")]
    BufferTooSmall,
}

/// Bytes on the wire for a frame with `param_count` parameters
///
/// Saturates, so an absurd caller-declared count still compares as too large.
pub const fn wire_len(param_count: usize, checksummed: bool) -> usize {
    FRAME_OVERHEAD
        .saturating_add(param_count)
        .saturating_add(checksummed as usize)
}

/// Write a frame into `buffer`
///
/// Returns the number of bytes written. Size limits of a particular link
/// are not checked here.
pub fn encode_into(
    header: u8,
    command: u8,
    params: &[u8],
    checksummed: bool,
    buffer: &mut [u8],
) -> Result<usize, FrameError> {
    let len = wire_len(params.len(), checksummed);
    if buffer.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = header;
    buffer[1] = command;
    buffer[FRAME_OVERHEAD..FRAME_OVERHEAD + params.len()].copy_from_slice(params);
    if checksummed {
        buffer[FRAME_OVERHEAD + params.len()] = frame_checksum(command, params);
    }

    Ok(len)
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Command identifier
    pub command: u8,
    /// Parameter bytes in wire order
    pub params: Vec<u8, MAX_PARAMS>,
}

impl Frame {
    /// Create a new frame with the given command and parameters
    pub fn new(command: u8, params: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(params)
            .map_err(|_| FrameError::FrameTooLarge {
                size: FRAME_OVERHEAD + params.len(),
                max: MAX_FRAME_SIZE,
            })?;

        Ok(Self {
            command,
            params: vec,
        })
    }

    /// Create a frame with no parameters
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            params: Vec::new(),
        }
    }

    /// Checksum this frame carries on the wire
    pub fn checksum(&self) -> u8 {
        frame_checksum(self.command, &self.params)
    }

    /// Bytes this frame occupies on the wire
    pub fn wire_len(&self, checksummed: bool) -> usize {
        wire_len(self.params.len(), checksummed)
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, header: u8, checksummed: bool, buffer: &mut [u8]) -> Result<usize, FrameError> {
        encode_into(header, self.command, &self.params, checksummed, buffer)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self, header: u8, checksummed: bool) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(header, checksummed, &mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// State machine for parsing incoming frames
///
/// Parameter counts come from the lookup, so a parser built with
/// [`Declared`](crate::lookup::Declared) rejects every frame as an
/// unknown command.
#[derive(Debug, Clone)]
pub struct FrameParser<L> {
    lookup: L,
    header: u8,
    max_frame_size: usize,
    checksummed: bool,
    state: ParseState,
    command: u8,
    expected: usize,
    params: Vec<u8, MAX_PARAMS>,
    checksum: Checksum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for HEADER byte
    WaitingForHeader,
    /// Got HEADER, waiting for COMMAND
    WaitingForCommand,
    /// Reading parameter bytes
    ReadingParams,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl<L: ParamLookup> FrameParser<L> {
    /// Create a new frame parser for the given link settings
    pub fn new(config: &LinkConfig, lookup: L, checksummed: bool) -> Self {
        Self {
            lookup,
            header: config.header,
            max_frame_size: config.max_frame_size as usize,
            checksummed,
            state: ParseState::WaitingForHeader,
            command: 0,
            expected: 0,
            params: Vec::new(),
            checksum: Checksum::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.params.clear();
        self.expected = 0;
        self.command = 0;
        self.checksum = Checksum::new();
    }

    /// Whether the parser is between frames
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForHeader
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// Every error leaves the parser waiting for the next header.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader => {
                if byte == self.header {
                    self.state = ParseState::WaitingForCommand;
                }
                // Silently ignore non-HEADER bytes while waiting
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                let Some(count) = self.lookup.param_count(byte) else {
                    self.reset();
                    return Err(FrameError::UnknownCommand(byte));
                };

                let size = wire_len(count as usize, self.checksummed);
                if size > self.max_frame_size {
                    self.reset();
                    return Err(FrameError::FrameTooLarge {
                        size,
                        max: self.max_frame_size,
                    });
                }

                self.command = byte;
                self.expected = count as usize;
                self.params.clear();
                self.checksum = Checksum::new();
                self.checksum.update(byte);

                if self.expected == 0 {
                    return Ok(self.params_done());
                }
                self.state = ParseState::ReadingParams;
                Ok(None)
            }
            ParseState::ReadingParams => {
                // Cannot overflow: expected <= max_frame_size - 2 <= MAX_PARAMS
                let _ = self.params.push(byte);
                self.checksum.update(byte);
                if self.params.len() == self.expected {
                    return Ok(self.params_done());
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                let expected = self.checksum.value();
                if byte != expected {
                    self.reset();
                    return Err(FrameError::ChecksumMismatch {
                        expected,
                        received: byte,
                    });
                }
                Ok(Some(self.take_frame()))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn params_done(&mut self) -> Option<Frame> {
        if self.checksummed {
            self.state = ParseState::WaitingForChecksum;
            None
        } else {
            Some(self.take_frame())
        }
    }

    fn take_frame(&mut self) -> Frame {
        let frame = Frame {
            command: self.command,
            params: self.params.clone(),
        };
        self.reset();
        frame
    }
}
