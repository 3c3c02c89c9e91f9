//! End-to-end scenarios over a pair of mock serial ports.
//!
//! Each test builds a sending and a receiving link with the same
//! configuration and lookup, moves the sender's output into the
//! receiver's input, and checks what comes out.

use std::collections::VecDeque;

use uartlink_hal::mock::{MockClock, MockSerial};
use uartlink_hal::IoTransport;
use uartlink_protocol::{
    CommandTable, Declared, Frame, FrameError, FrameParser, Link, LinkConfig, ParamLookup,
};

const COMMANDS: CommandTable<'static> = CommandTable::new(&[(0x01, 2), (0x02, 3), (0x03, 1)]);

type MockLink<L> = Link<MockSerial, MockClock, L>;

fn link<L: ParamLookup>(config: LinkConfig, lookup: L) -> MockLink<L> {
    let port = MockSerial::standalone();
    let clock = port.clock();
    Link::new(port, clock, config, lookup).unwrap()
}

/// Move everything `from` wrote into `to`'s receive buffer
fn deliver<A, B>(from: &mut MockLink<A>, to: &mut MockLink<B>)
where
    A: ParamLookup,
    B: ParamLookup,
{
    let bytes = from.transport_mut().take_written();
    to.transport_mut().inject(&bytes);
}

#[test]
fn reference_frame_encodes_and_decodes() {
    let config = LinkConfig::new(0xAA, 10, 9600);
    let mut tx = link(config, COMMANDS);
    let mut rx = link(config, COMMANDS);

    tx.send_frame(0x01, &[0x10, 0x20], true).unwrap();
    assert_eq!(tx.transport().written(), [0xAA, 0x01, 0x10, 0x20, 0x31]);

    deliver(&mut tx, &mut rx);
    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(frame.command, 0x01);
    assert_eq!(&frame.params[..], &[0x10, 0x20]);
}

#[test]
fn leading_noise_is_discarded() {
    let mut rx = link(LinkConfig::default(), COMMANDS);
    // 0x02 ^ 0x00 ^ 0x00 ^ 0x00
    rx.transport_mut()
        .inject(&[0xFF, 0xFF, 0xAA, 0x02, 0x00, 0x00, 0x00, 0x02]);

    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(frame, Frame::new(0x02, &[0, 0, 0]).unwrap());
    assert!(rx.transport().pending().is_empty());
}

#[test]
fn truncated_frame_is_incomplete_not_corrupt() {
    let mut rx = link(LinkConfig::default(), COMMANDS);
    rx.transport_mut().inject(&[0xAA, 0x01, 0x10, 0x20]);

    let err = rx.receive_frame(true).unwrap_err();
    assert!(matches!(
        err.frame_error(),
        Some(FrameError::Incomplete { expected: 1, received: 0 })
    ));
}

#[test]
fn link_usable_after_failed_receive() {
    let mut rx = link(LinkConfig::default(), COMMANDS);
    rx.transport_mut()
        .inject(&[0xAA, 0x01, 0x10, 0x20, 0x00, 0xAA, 0x03, 0x05, 0x06]);

    assert!(matches!(
        rx.receive_frame(true).unwrap_err().frame_error(),
        Some(FrameError::ChecksumMismatch { .. })
    ));
    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(frame.command, 0x03);
    assert_eq!(&frame.params[..], &[0x05]);
}

#[test]
fn raw_mode_interoperates_with_framed_receive() {
    let mut tx = link(LinkConfig::default(), Declared);
    let mut rx = link(LinkConfig::default(), COMMANDS);

    let data = [0x0A, 0x0B, 0x0C];
    tx.send_command(0x02).unwrap();
    tx.send_data(&data).unwrap();
    tx.send_checksum(0x02, &data).unwrap();
    assert_eq!(tx.transport().writes().len(), 3);

    deliver(&mut tx, &mut rx);
    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(frame.command, 0x02);
    assert_eq!(&frame.params[..], &data);
}

#[test]
fn framed_send_interoperates_with_raw_receive() {
    let mut tx = link(LinkConfig::default(), COMMANDS);
    let mut rx = link(LinkConfig::default(), Declared);

    tx.send_frame(0x02, &[1, 2, 3], true).unwrap();
    deliver(&mut tx, &mut rx);

    let command = rx.read_command().unwrap();
    let mut data = [0u8; 3];
    rx.read_data(&mut data, 100).unwrap();
    rx.verify_checksum(command, &data).unwrap();
    assert_eq!(data, [1, 2, 3]);
}

#[test]
fn stream_parser_reads_link_output() {
    let config = LinkConfig::default();
    let mut tx = link(config, COMMANDS);
    tx.send_frame(0x03, &[0x44], true).unwrap();
    tx.send_frame(0x01, &[0x55, 0x66], true).unwrap();
    let bytes = tx.transport_mut().take_written();

    let mut parser = FrameParser::new(&config, COMMANDS, true);
    let mut frames = Vec::new();
    for &byte in &bytes {
        if let Some(frame) = parser.feed(byte).unwrap() {
            frames.push(frame);
        }
    }

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].command, 0x03);
    assert_eq!(&frames[1].params[..], &[0x55, 0x66]);
}

#[test]
fn custom_header_and_computed_lookup() {
    fn rule(command: u8) -> Option<u8> {
        Some(command & 0x0F)
    }

    let config = LinkConfig::new(0x7E, 32, 115_200);
    let mut tx = link(config, rule);
    let mut rx = link(config, rule);

    tx.send_frame(0x24, &[9, 8, 7, 6], false).unwrap();
    assert_eq!(tx.transport().written()[0], 0x7E);

    deliver(&mut tx, &mut rx);
    let frame = rx.receive_frame(false).unwrap();
    assert_eq!(frame, Frame::new(0x24, &[9, 8, 7, 6]).unwrap());
}

#[test]
fn strict_sync_waits_for_minimum_frame() {
    let config = LinkConfig::default().with_strict_sync(true);
    let mut rx = link(config, COMMANDS);
    rx.transport_mut().inject(&[0xAA, 0x03]);

    assert!(matches!(
        rx.receive_frame(true).unwrap_err().frame_error(),
        Some(FrameError::InsufficientData { available: 2, required: 3 })
    ));

    // 0x03 ^ 0x01
    rx.transport_mut().inject(&[0x01, 0x02]);
    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(&frame.params[..], &[0x01]);
}

/// `embedded-io` peripheral whose receive FIFO already holds `rx`
struct Fifo {
    rx: VecDeque<u8>,
}

impl embedded_io::ErrorType for Fifo {
    type Error = core::convert::Infallible;
}

impl embedded_io::Read for Fifo {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for Fifo {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl embedded_io::Write for Fifo {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn strict_sync_over_embedded_io() {
    let clock = MockClock::new();
    let fifo = Fifo {
        rx: [0xAA, 0x01, 0x10, 0x20, 0x31].into_iter().collect(),
    };
    let port = IoTransport::new(fifo, clock.clone());
    let config = LinkConfig::default().with_strict_sync(true);
    let mut rx = Link::new(port, clock, config, COMMANDS).unwrap();

    assert_eq!(rx.available(), 5);
    let frame = rx.receive_frame(true).unwrap();
    assert_eq!(frame.command, 0x01);
    assert_eq!(&frame.params[..], &[0x10, 0x20]);
    assert_eq!(rx.available(), 0);
}
