/// Packs bits MSB-first into bytes
#[derive(Debug, Default, Clone)]
pub struct ByteAccumulator {
    partial: u8,
    filled: u8,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift one bit in; returns the byte once eight bits have arrived
    pub fn push(&mut self, bit: bool) -> Option<u8> {
        self.partial = (self.partial << 1) | bit as u8;
        self.filled += 1;
        if self.filled == 8 {
            let byte = self.partial;
            self.partial = 0;
            self.filled = 0;
            Some(byte)
        } else {
            None
        }
    }

    /// Bits waiting for a full byte; these are dropped when decoding ends
    pub fn pending_bits(&self) -> u8 {
        self.filled
    }
}

/// Expand bytes into bits, MSB first
pub fn bits_msb_first(data: &[u8]) -> impl Iterator<Item = bool> + '_ {
    data.iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
}
