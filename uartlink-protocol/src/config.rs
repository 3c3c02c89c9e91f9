//! Link configuration
//!
//! Settings fixed for the lifetime of a link. Firmware usually builds one
//! at startup; with the `serde` feature it can also be stored in flash as
//! postcard binary data and restored on boot.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use uartlink_hal::UartConfig;

/// Smallest useful frame: header + command + checksum
pub const MIN_FRAME_SIZE: u8 = 3;

/// Default frame synchronization byte
pub const DEFAULT_HEADER: u8 = 0xAA;

/// Default maximum frame size in bytes
pub const DEFAULT_MAX_FRAME_SIZE: u8 = 10;

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default timeout for each blocking read
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1000;

/// Default timeout for the header search in `receive_frame`
pub const DEFAULT_SYNC_TIMEOUT_MS: u32 = 1000;

/// Invalid link configuration
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A frame must at least hold the header and command bytes
    #[error("max frame size {0} cannot hold header and command")]
    MaxFrameSizeTooSmall(u8),
    /// Reads with a zero timeout can never wait for a byte
    #[error("read timeout must be non-zero")]
    ZeroReadTimeout,
}

/// Per-link protocol settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Byte marking the start of a frame
    pub header: u8,
    /// Largest frame, header and checksum included
    pub max_frame_size: u8,
    /// Transport rate, handed to the transport by `Link::begin`
    pub baud_rate: u32,
    /// Default per-read timeout when the caller gives none
    pub read_timeout_ms: u32,
    /// Header search timeout used by `receive_frame`
    pub sync_timeout_ms: u32,
    /// Require `MIN_FRAME_SIZE` buffered bytes before searching for a header
    pub strict_sync: bool,
}

impl LinkConfig {
    pub const fn new(header: u8, max_frame_size: u8, baud_rate: u32) -> Self {
        Self {
            header,
            max_frame_size,
            baud_rate,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            sync_timeout_ms: DEFAULT_SYNC_TIMEOUT_MS,
            strict_sync: false,
        }
    }

    pub const fn with_read_timeout(mut self, ms: u32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    pub const fn with_sync_timeout(mut self, ms: u32) -> Self {
        self.sync_timeout_ms = ms;
        self
    }

    pub const fn with_strict_sync(mut self, strict: bool) -> Self {
        self.strict_sync = strict;
        self
    }

    /// Check the settings can describe at least one frame
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_size < MIN_FRAME_SIZE - 1 {
            return Err(ConfigError::MaxFrameSizeTooSmall(self.max_frame_size));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroReadTimeout);
        }
        Ok(())
    }

    /// Transport settings for this link (8N1)
    pub fn uart_config(&self) -> UartConfig {
        UartConfig::new(self.baud_rate)
    }

    /// Largest parameter block a frame can carry
    pub fn max_params(&self, checksummed: bool) -> usize {
        (self.max_frame_size as usize).saturating_sub(2 + usize::from(checksummed))
    }

    /// Serialize for flash storage
    #[cfg(feature = "serde")]
    pub fn to_postcard<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Restore from flash storage
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER, DEFAULT_MAX_FRAME_SIZE, DEFAULT_BAUD_RATE)
    }
}
