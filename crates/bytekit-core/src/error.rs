use thiserror::Error;

/// Canonical error type exposed by the core primitives.
#[derive(Debug, Error)]
pub enum BytekitError {
    /// Base64-url text whose length leaves a remainder of one modulo four;
    /// no amount of padding can make it decodable.
    #[error("invalid base64url length {len}: cannot determine padding")]
    InvalidLength { len: usize },

    /// Symbol outside the base58 alphabet.
    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    /// Compressed point whose prefix byte is not 2 or 3.
    #[error("invalid compressed point prefix 0x{0:02x}")]
    InvalidPointEncoding(u8),

    /// Frame header or payload extends past the end of the buffer.
    #[error("frame overrun: need {needed} bytes, {available} available")]
    FrameOverrun { needed: usize, available: usize },

    /// Value that does not fit in its fixed-width field.
    #[error("value {value} does not fit in a {slot_size}-byte field")]
    FieldOverflow { value: u64, slot_size: usize },

    /// Frame slot widths must lie in `1..=frame::MAX_SLOT_SIZE` bytes.
    #[error("invalid slot size {0}, expected 1..=8 bytes")]
    InvalidSlotSize(usize),

    /// Named frame whose name list and payload list disagree in length.
    #[error("named frame has {names} names but {payloads} payloads")]
    EntryCountMismatch { names: usize, payloads: usize },

    /// Entry name bytes are not valid UTF-8.
    #[error("entry name is not valid utf-8")]
    InvalidUtf8,

    /// Curve prime unsupported by the square-root shortcut.
    #[error("curve prime must be congruent to 3 mod 4")]
    UnsupportedPrime,

    /// Hex decoding failure.
    #[error("hex error: {0}")]
    InvalidHex(#[from] ::hex::FromHexError),

    /// Base64 decoding failure.
    #[error("base64 error: {0}")]
    InvalidBase64(#[from] ::base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, BytekitError>;
