//! uartlink framing protocol
//!
//! This crate implements a minimal command protocol for half-duplex
//! serial links between microcontrollers. A sender emits a command
//! identifier and a fixed-length parameter block; a receiver finds the
//! start of the frame in a noisy or mid-stream byte sequence, reads the
//! parameters and checks an optional XOR checksum.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌────────┬─────────┬─────────────┬──────────┐
//! │ HEADER │ COMMAND │ PARAMS      │ CHECKSUM │
//! │ 1B     │ 1B      │ N bytes     │ 1B, opt. │
//! └────────┴─────────┴─────────────┴──────────┘
//! ```
//!
//! N is not transmitted. Either the caller declares it for each frame, or
//! both ends share a [`ParamLookup`] that maps each command to its count.
//! The checksum is the XOR of COMMAND and all PARAMS bytes; HEADER is
//! excluded. The total frame never exceeds the link's configured maximum.
//!
//! # Example
//!
//! ```
//! use uartlink_hal::mock::MockSerial;
//! use uartlink_protocol::{CommandTable, Link, LinkConfig};
//!
//! const COMMANDS: CommandTable<'static> = CommandTable::new(&[(0x01, 2), (0x02, 3)]);
//!
//! let mut port = MockSerial::standalone();
//! let clock = port.clock();
//! port.inject(&[0xFF, 0xAA, 0x01, 0x10, 0x20, 0x31]);
//!
//! let mut link = Link::new(port, clock, LinkConfig::default(), COMMANDS).unwrap();
//! let frame = link.receive_frame(true).unwrap();
//! assert_eq!(frame.command, 0x01);
//! assert_eq!(&frame.params[..], &[0x10, 0x20]);
//!
//! link.send_frame(0x02, &[1, 2, 3], true).unwrap();
//! assert_eq!(link.transport().written(), [0xAA, 0x02, 1, 2, 3, 0x02]);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod checksum;
pub mod config;
pub mod frame;
pub mod link;
pub mod lookup;

pub use checksum::{checksum, frame_checksum, Checksum};
pub use config::{ConfigError, LinkConfig, MIN_FRAME_SIZE};
pub use frame::{Frame, FrameError, FrameParser, MAX_FRAME_SIZE, MAX_PARAMS};
pub use link::{Link, LinkError};
pub use lookup::{CommandTable, Declared, FixedCount, ParamLookup};
