//! Table-driven CRC-32 (IEEE 802.3, reflected polynomial `0xEDB88320`).

const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Streaming CRC-32 state. Feed data with [`Crc32::append`] as many times
/// as needed, then read the checksum with [`Crc32::finalize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crc32 {
    crc: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    pub const fn new() -> Self {
        Self { crc: u32::MAX }
    }

    /// Fold `data` into the running checksum.
    pub fn append(&mut self, data: &[u8]) -> &mut Self {
        let mut crc = self.crc;
        for &byte in data {
            crc = (crc >> 8) ^ TABLE[((crc ^ u32::from(byte)) & 0xff) as usize];
        }
        self.crc = crc;
        self
    }

    /// Checksum of everything appended so far. Does not reset the state.
    pub fn finalize(&self) -> u32 {
        !self.crc
    }

    /// One-shot checksum of `data`.
    pub fn checksum(data: &[u8]) -> u32 {
        Self::new().append(data).finalize()
    }
}
