//! uartlink Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the framing protocol is
//! written against. Chip-specific firmware implements them for its UART
//! peripheral and timer; host tools and tests use the provided adapters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (command dispatch)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartlink-protocol (framing, sync)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  IoTransport  │       │  MockSerial   │
//! │ (embedded-io) │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialTransport`] - Byte transport with peek and timed reads
//! - [`time::Clock`] - Monotonic millisecond time source

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod io;
pub mod time;
pub mod uart;

#[cfg(feature = "mock")]
pub mod mock;

pub use io::IoTransport;
pub use time::Clock;
pub use uart::{DataBits, Parity, SerialTransport, StopBits, UartConfig};

#[cfg(feature = "std")]
pub use time::StdClock;
