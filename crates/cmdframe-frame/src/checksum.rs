//! CRC-32C (Castagnoli) checksum engine.
//!
//! Uses the reflected Castagnoli polynomial `0x82F63B78` with an initial value
//! and final xor of `0xFFFFFFFF`, the variant used by iSCSI and SCTP. Peers in
//! other languages must produce byte-identical results for the same input.
//!
//! The 256-entry lookup table is built at compile time and never written.

/// Width in bytes of an encoded checksum.
pub const CHECKSUM_WIDTH: usize = 4;

/// Reflected Castagnoli polynomial.
const POLY: u32 = 0x82F6_3B78;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Incremental CRC-32C computation.
///
/// Feeding the same bytes split across any number of [`update`](Self::update)
/// calls yields the same value as [`crc32c`].
#[derive(Debug, Clone, Copy)]
pub struct Crc32c {
    state: u32,
}

impl Crc32c {
    /// Start a new checksum.
    pub fn new() -> Self {
        Self { state: !0 }
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            crc = TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.state = crc;
    }

    /// The checksum of everything fed so far.
    pub fn finalize(self) -> u32 {
        !self.state
    }
}

impl Default for Crc32c {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC-32C value of `data`.
pub fn crc32c(data: &[u8]) -> u32 {
    let mut hasher = Crc32c::new();
    hasher.update(data);
    hasher.finalize()
}

/// Compute the CRC-32C of `data` encoded as a big-endian checksum field.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_WIDTH] {
    crc32c(data).to_be_bytes()
}
