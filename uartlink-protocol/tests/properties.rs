//! Property-based tests for framing, sync and checksum.
//!
//! These tests use proptest to verify invariants hold for all inputs:
//! - Frames survive a lossless round trip
//! - The checksum does not depend on byte order
//! - The frame-size limit is exact
//! - Any single corrupted byte in the window is detected
//! - Header search times out on streams without a header

use proptest::prelude::*;
use uartlink_hal::mock::{MockClock, MockSerial};
use uartlink_protocol::{checksum, FixedCount, FrameError, Link, LinkConfig, ParamLookup};

const HEADER: u8 = 0xAA;

fn link<L: ParamLookup>(config: LinkConfig, lookup: L, rx: &[u8]) -> Link<MockSerial, MockClock, L> {
    let mut port = MockSerial::standalone();
    let clock = port.clock();
    port.inject(rx);
    Link::new(port, clock, config, lookup).unwrap()
}

// Command and parameters that fit a 64-byte checksummed frame
fn frame_strategy() -> impl Strategy<Value = (u8, Vec<u8>)> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..=61))
}

#[test]
fn prop_roundtrip_lossless() {
    proptest!(|((command, params) in frame_strategy(), checksummed in any::<bool>())| {
        let config = LinkConfig::new(HEADER, 64, 9600);
        let count = params.len() as u8;

        let mut tx = link(config, FixedCount(count), &[]);
        tx.send_frame(command, &params, checksummed).unwrap();
        let bytes = tx.transport_mut().take_written();

        let mut rx = link(config, FixedCount(count), &bytes);
        let frame = rx.receive_frame(checksummed).unwrap();

        prop_assert_eq!(frame.command, command);
        prop_assert_eq!(&frame.params[..], &params[..]);
        prop_assert!(rx.transport().pending().is_empty());
    });
}

#[test]
fn prop_checksum_order_independent() {
    proptest!(|(bytes in prop::collection::vec(any::<u8>(), 0..64), seed in any::<u64>())| {
        let mut shuffled = bytes.clone();
        // Deterministic Fisher-Yates from the seed
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }

        prop_assert_eq!(checksum(&bytes), checksum(&shuffled));
        let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
        prop_assert_eq!(checksum(&bytes), checksum(&reversed));
    });
}

#[test]
fn prop_frame_too_large_iff_over_limit() {
    proptest!(|(max in 2u8..=40, count in 0u8..=45, checksummed in any::<bool>())| {
        let config = LinkConfig::new(HEADER, max, 9600);
        let params = vec![0x5Au8; count as usize];
        let size = 2 + count as usize + usize::from(checksummed);

        let mut tx = link(config, FixedCount(count), &[]);
        let result = tx.send_frame(0x01, &params, checksummed);

        if size > max as usize {
            prop_assert_eq!(
                result.unwrap_err().frame_error(),
                Some(FrameError::FrameTooLarge { size, max: max as usize })
            );
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(tx.transport().written().len(), size);
        }
    });
}

#[test]
fn prop_single_byte_corruption_detected() {
    proptest!(|(
        (command, params) in frame_strategy(),
        offset in any::<prop::sample::Index>(),
        flip in 1u8..=255
    )| {
        let config = LinkConfig::new(HEADER, 64, 9600);
        let count = params.len() as u8;

        let mut tx = link(config, FixedCount(count), &[]);
        tx.send_frame(command, &params, true).unwrap();
        let mut bytes = tx.transport_mut().take_written();

        // Corrupt one byte of the window: command or a parameter
        let window_len = 1 + params.len();
        let at = 1 + offset.index(window_len);
        bytes[at] ^= flip;

        let mut rx = link(config, FixedCount(count), &bytes);
        let result = rx.receive_frame(true);
        prop_assert!(
            matches!(
                result.unwrap_err().frame_error(),
                Some(FrameError::ChecksumMismatch { .. })
            ),
            "corruption at byte {} not detected", at
        );
    });
}

#[test]
fn prop_no_header_times_out() {
    proptest!(|(
        noise in prop::collection::vec(any::<u8>().prop_filter("not header", |b| *b != HEADER), 0..200),
        timeout in 0u32..50
    )| {
        let mut rx = link(LinkConfig::default(), FixedCount(0), &noise);
        prop_assert!(!rx.await_header(timeout));
    });
}

#[test]
fn prop_header_first_found_immediately() {
    proptest!(|(tail in prop::collection::vec(any::<u8>(), 0..16), timeout in 0u32..50)| {
        let mut stream = vec![HEADER];
        stream.extend_from_slice(&tail);

        let mut rx = link(LinkConfig::default(), FixedCount(0), &stream);
        prop_assert!(rx.await_header(timeout));
        prop_assert_eq!(rx.transport().pending(), stream);
    });
}
