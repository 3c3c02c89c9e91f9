//! Blocking protocol endpoint for one serial link
//!
//! A [`Link`] owns the transport, a clock and the parameter lookup, and
//! implements both directions of the protocol:
//!
//! - [`framer`]: `send_frame` and the raw-mode send operations
//! - [`sync`]: header search bounded by a timeout
//! - [`decoder`]: `receive_frame` and the raw-mode read operations
//!
//! Header search peeks: once [`Link::await_header`] returns `true`, the
//! header is still the next byte in the transport and the decoder consumes
//! it. Every blocking read takes its timeout as an argument; the link-wide
//! default from [`LinkConfig`] is passed when the caller gives none, so no
//! read ever changes the timeout of another.

pub mod decoder;
pub mod framer;
pub mod sync;

use uartlink_hal::{Clock, SerialTransport};

use crate::config::{ConfigError, LinkConfig};
use crate::frame::FrameError;
use crate::lookup::{Declared, ParamLookup};

/// Failure of a link operation
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Protocol-level failure
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Transport failure
    #[error("transport error: {0:?}")]
    Transport(E),
}

impl<E> LinkError<E> {
    /// Protocol error, if this is one
    pub fn frame_error(&self) -> Option<FrameError> {
        match self {
            LinkError::Frame(e) => Some(*e),
            LinkError::Transport(_) => None,
        }
    }
}

/// Protocol endpoint on one serial link
pub struct Link<T, C, L = Declared> {
    transport: T,
    clock: C,
    lookup: L,
    config: LinkConfig,
}

impl<T, C, L> Link<T, C, L>
where
    T: SerialTransport,
    C: Clock,
    L: ParamLookup,
{
    /// Create a link; the configuration is fixed from here on
    pub fn new(transport: T, clock: C, config: LinkConfig, lookup: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            transport,
            clock,
            lookup,
            config,
        })
    }

    /// Configure the transport for this link's baud rate
    pub fn begin(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport
            .configure(&self.config.uart_config())
            .map_err(LinkError::Transport)?;
        debug!("link initialized at {} baud", self.config.baud_rate);
        Ok(())
    }

    /// Bytes waiting in the transport
    pub fn available(&mut self) -> usize {
        self.transport.bytes_available()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear down the link and return its parts
    pub fn into_parts(self) -> (T, C, L) {
        (self.transport, self.clock, self.lookup)
    }

    /// Check a caller-supplied parameter count against the lookup
    fn check_param_count(&self, command: u8, actual: usize) -> Result<(), FrameError> {
        if !self.lookup.negotiates() {
            return Ok(());
        }
        match self.lookup.param_count(command) {
            None => Err(FrameError::UnknownCommand(command)),
            Some(expected) if expected as usize != actual => Err(FrameError::ParameterCountMismatch {
                expected: expected as usize,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Fail with `FrameTooLarge` if a frame of `size` bytes does not fit
    fn check_frame_size(&self, size: usize) -> Result<(), FrameError> {
        let max = self.config.max_frame_size as usize;
        if size > max {
            warn!("frame of {} bytes exceeds maximum of {}", size, max);
            return Err(FrameError::FrameTooLarge { size, max });
        }
        Ok(())
    }
}
