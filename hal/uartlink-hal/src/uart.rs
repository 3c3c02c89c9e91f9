//! UART serial transport abstraction
//!
//! The protocol needs slightly more than a plain byte pipe: it must know
//! how many bytes are buffered, look at the next byte without taking it,
//! and bound every blocking read by a timeout.

/// Byte transport for one half-duplex serial link
///
/// Implementations wrap a UART peripheral (or anything byte oriented)
/// together with whatever receive buffer the platform provides.
pub trait SerialTransport {
    /// Error type for transport operations
    type Error: core::fmt::Debug;

    /// One-time peripheral setup
    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error>;

    /// Number of received bytes ready to be read without blocking
    fn bytes_available(&mut self) -> usize;

    /// Look at the next received byte without consuming it
    fn peek_byte(&mut self) -> Option<u8>;

    /// Consume the next received byte, if one is buffered
    fn read_byte(&mut self) -> Option<u8>;

    /// Fill `buf`, blocking for at most `timeout_ms`
    ///
    /// Returns the number of bytes read, which is less than `buf.len()`
    /// only when the timeout elapsed first. The timeout applies to this
    /// call alone.
    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Write all of `data`, blocking until it has been queued
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: SerialTransport + ?Sized> SerialTransport for &mut T {
    type Error = T::Error;

    fn configure(&mut self, config: &UartConfig) -> Result<(), Self::Error> {
        (**self).configure(config)
    }

    fn bytes_available(&mut self) -> usize {
        (**self).bytes_available()
    }

    fn peek_byte(&mut self) -> Option<u8> {
        (**self).peek_byte()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        (**self).read_bytes(buf, timeout_ms)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_bytes(data)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate
    pub const fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::new(9600)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
