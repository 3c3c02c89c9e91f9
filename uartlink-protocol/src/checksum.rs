//! XOR checksum
//!
//! The checksum window is the command byte followed by every parameter
//! byte. The header byte is not part of it. Both directions use this
//! window; a peer folding the header in as well will reject every frame.

/// XOR-fold all bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Checksum of a frame: `command ^ params[0] ^ ... ^ params[n-1]`
pub fn frame_checksum(command: u8, params: &[u8]) -> u8 {
    command ^ checksum(params)
}

/// Running checksum for bytes that arrive one at a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum(u8);

impl Checksum {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Fold in one byte
    pub fn update(&mut self, byte: u8) {
        self.0 ^= byte;
    }

    /// Fold in a slice
    pub fn update_slice(&mut self, bytes: &[u8]) {
        self.0 ^= checksum(bytes);
    }

    pub fn value(self) -> u8 {
        self.0
    }
}
