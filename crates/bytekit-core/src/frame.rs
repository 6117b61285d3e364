//! Length-prefixed packing of byte-array lists.
//!
//! # Frame Format
//!
//! ```text
//! +----------------------+
//! | count     (slot)     |  big-endian, `slot_size` bytes
//! +----------------------+
//! | size_0    (slot)     |
//! | ...                  |
//! | size_n-1  (slot)     |
//! +----------------------+
//! | payload_0            |  size_0 bytes
//! | ...                  |
//! | payload_n-1          |  size_n-1 bytes
//! +----------------------+
//! ```
//!
//! The slot width is not recorded in the frame; both ends must agree on it.
//! A named frame is two frames back to back: the entry names framed with
//! [`FrameLayout::name_slot`], then the payloads framed with
//! [`FrameLayout::payload_slot`].

use malachite::Natural;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bigint;
use crate::error::{BytekitError, Result};

/// Widest supported count/size field. Eight bytes already describe any
/// length a `u64` can hold.
pub const MAX_SLOT_SIZE: usize = 8;

/// Pack `items` into a single frame using `slot_size`-byte count and size
/// fields.
pub fn auto_pack<T: AsRef<[u8]>>(items: &[T], slot_size: usize) -> Result<Vec<u8>> {
    check_slot(slot_size)?;
    let payload_len: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let mut frame = Vec::with_capacity(slot_size * (items.len() + 1) + payload_len);

    frame.extend_from_slice(&encode_field(items.len(), slot_size)?);
    for item in items {
        frame.extend_from_slice(&encode_field(item.as_ref().len(), slot_size)?);
    }
    for item in items {
        frame.extend_from_slice(item.as_ref());
    }
    Ok(frame)
}

/// Unpack a frame produced by [`auto_pack`].
///
/// Bytes left over after the declared payloads are returned as one extra
/// trailing segment.
pub fn auto_unpack(buffer: &[u8], slot_size: usize) -> Result<Vec<Vec<u8>>> {
    let (mut items, consumed) = unpack_exact(buffer, slot_size)?;
    if consumed < buffer.len() {
        items.push(buffer[consumed..].to_vec());
    }
    Ok(items)
}

/// Parse exactly one frame from the front of `buffer`, returning the items
/// and the number of bytes the frame occupies.
fn unpack_exact(buffer: &[u8], slot_size: usize) -> Result<(Vec<Vec<u8>>, usize)> {
    check_slot(slot_size)?;
    let count = read_field(take(buffer, 0, slot_size)?);

    let header_len = count
        .checked_add(1)
        .and_then(|fields| fields.checked_mul(slot_size))
        .ok_or(BytekitError::FrameOverrun {
            needed: usize::MAX,
            available: buffer.len(),
        })?;
    if header_len > buffer.len() {
        debug!(count, header_len, available = buffer.len(), "frame header overrun");
        return Err(BytekitError::FrameOverrun {
            needed: header_len,
            available: buffer.len(),
        });
    }

    let mut items = Vec::with_capacity(count);
    let mut cursor = header_len;
    for idx in 0..count {
        let size = read_field(take(buffer, slot_size * (idx + 1), slot_size)?);
        let item = take(buffer, cursor, size).map_err(|err| {
            debug!(idx, size, cursor, "frame payload overrun");
            err
        })?;
        items.push(item.to_vec());
        cursor += size;
    }
    Ok((items, cursor))
}

fn check_slot(slot_size: usize) -> Result<()> {
    if slot_size == 0 || slot_size > MAX_SLOT_SIZE {
        return Err(BytekitError::InvalidSlotSize(slot_size));
    }
    Ok(())
}

fn take(buffer: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    let end = start.checked_add(len).ok_or(BytekitError::FrameOverrun {
        needed: usize::MAX,
        available: buffer.len(),
    })?;
    buffer.get(start..end).ok_or(BytekitError::FrameOverrun {
        needed: end,
        available: buffer.len(),
    })
}

fn encode_field(value: usize, slot_size: usize) -> Result<Vec<u8>> {
    let value = value as u64;
    if slot_size < 8 && value >> (8 * slot_size) != 0 {
        return Err(BytekitError::FieldOverflow { value, slot_size });
    }
    Ok(bigint::to_bytes_fixed(&Natural::from(value), slot_size))
}

// Saturates to usize::MAX, which can never fit in a real buffer.
fn read_field(field: &[u8]) -> usize {
    field
        .iter()
        .try_fold(0usize, |acc, &b| acc.checked_mul(256)?.checked_add(usize::from(b)))
        .unwrap_or(usize::MAX)
}

/// A named payload carried by [`pack_named`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

impl NamedEntry {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// Slot widths used by the named frame variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLayout {
    pub name_slot: usize,
    pub payload_slot: usize,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            name_slot: 3,
            payload_slot: 4,
        }
    }
}

impl FrameLayout {
    /// Reject slot widths outside `1..=MAX_SLOT_SIZE`.
    pub fn validate(self) -> Result<Self> {
        check_slot(self.name_slot)?;
        check_slot(self.payload_slot)?;
        Ok(self)
    }

    /// Longest name, in bytes, that a `name_slot`-byte size field can
    /// describe: `2^(8 * name_slot) - 1`.
    pub fn name_cap(&self) -> usize {
        match self.name_slot {
            0 => 0,
            slot if slot >= std::mem::size_of::<usize>() => usize::MAX,
            slot => (1usize << (8 * slot)) - 1,
        }
    }
}

/// Pack `entries` with the default [`FrameLayout`].
pub fn pack_named(entries: &[NamedEntry]) -> Result<Vec<u8>> {
    pack_named_with(entries, FrameLayout::default())
}

/// Pack `entries` as a name frame followed by a payload frame. Names longer
/// than [`FrameLayout::name_cap`] are cut at the last character boundary
/// that fits.
pub fn pack_named_with(entries: &[NamedEntry], layout: FrameLayout) -> Result<Vec<u8>> {
    let layout = layout.validate()?;
    let cap = layout.name_cap();
    let names: Vec<&[u8]> = entries
        .iter()
        .map(|entry| truncate_name(&entry.name, cap).as_bytes())
        .collect();
    let payloads: Vec<&[u8]> = entries.iter().map(|entry| entry.payload.as_slice()).collect();

    let mut out = auto_pack(&names, layout.name_slot)?;
    out.extend_from_slice(&auto_pack(&payloads, layout.payload_slot)?);
    Ok(out)
}

/// Unpack a buffer produced by [`pack_named`].
pub fn unpack_named(buffer: &[u8]) -> Result<Vec<NamedEntry>> {
    unpack_named_with(buffer, FrameLayout::default())
}

/// Unpack a buffer produced by [`pack_named_with`] using the same layout.
pub fn unpack_named_with(buffer: &[u8], layout: FrameLayout) -> Result<Vec<NamedEntry>> {
    let layout = layout.validate()?;
    let (names, consumed) = unpack_exact(buffer, layout.name_slot)?;
    let payloads = auto_unpack(&buffer[consumed..], layout.payload_slot)?;
    if names.len() != payloads.len() {
        return Err(BytekitError::EntryCountMismatch {
            names: names.len(),
            payloads: payloads.len(),
        });
    }

    names
        .into_iter()
        .zip(payloads)
        .map(|(name, payload)| {
            let name = String::from_utf8(name).map_err(|_| BytekitError::InvalidUtf8)?;
            Ok(NamedEntry { name, payload })
        })
        .collect()
}

fn truncate_name(name: &str, cap: usize) -> &str {
    if name.len() <= cap {
        return name;
    }
    let mut end = cap;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
