//! In-memory, store-only ZIP writer.
//!
//! Each [`ArchiveWriter::add`] serialises one local file header plus the
//! raw payload immediately and remembers where that block starts. The
//! central directory and end record are produced by
//! [`ArchiveWriter::serialize`], whose output is cached until the next
//! `add`. Offsets depend on insertion order, so a writer must only ever be
//! mutated by one owner at a time.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::crc32::Crc32;
use crate::error::{BytekitError, Result};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIGNATURE: u32 = 0x0605_4b50;

const VERSION: u16 = 0x0014;
const METHOD_STORED: u16 = 0;
const DIRECTORY_ATTR: u32 = 0x10;

/// Size of a local file header without the name.
pub const LOCAL_HEADER_LEN: usize = 30;
/// Size of a central directory record without name and comment.
pub const CENTRAL_HEADER_LEN: usize = 46;
/// Size of the end-of-central-directory record without comment.
pub const END_RECORD_LEN: usize = 22;

/// Civil UTC timestamp with the resolution of the DOS date/time fields.
///
/// Out-of-range fields are clamped when packed, so a bad value never spills
/// into a neighbouring bit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DosDateTime {
    /// 1980..=2107
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=59, stored with two-second resolution
    pub second: u8,
}

impl DosDateTime {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// `second / 2 | minute << 5 | hour << 11`
    pub fn dos_time(&self) -> u16 {
        let second = u16::from(self.second.min(59) >> 1);
        let minute = u16::from(self.minute.min(59));
        let hour = u16::from(self.hour.min(23));
        second | minute << 5 | hour << 11
    }

    /// `day | month << 5 | (year - 1980) << 9`
    pub fn dos_date(&self) -> u16 {
        let years = self.year.saturating_sub(1980).min(127);
        let day = u16::from(self.day.clamp(1, 31));
        let month = u16::from(self.month.clamp(1, 12));
        day | month << 5 | years << 9
    }
}

impl From<SystemTime> for DosDateTime {
    fn from(time: SystemTime) -> Self {
        let secs = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let days = (secs / 86_400) as i64;
        let rem = secs % 86_400;
        let (year, month, day) = civil_from_days(days);
        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (rem / 3600) as u8,
            minute: (rem % 3600 / 60) as u8,
            second: (rem % 60) as u8,
        }
    }
}

// Days since 1970-01-01 to (year, month, day) in the proleptic Gregorian
// calendar.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// One stored file inside an [`ArchiveWriter`].
#[derive(Clone, Debug)]
pub struct ArchiveEntry {
    name: String,
    crc32: u32,
    timestamp: DosDateTime,
    byte_offset: u64,
    // Local header, name and payload exactly as they appear in the archive.
    block: Vec<u8>,
}

impl ArchiveEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    pub fn timestamp(&self) -> DosDateTime {
        self.timestamp
    }

    /// Offset of this entry's local header from the start of the archive.
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    pub fn payload(&self) -> &[u8] {
        &self.block[LOCAL_HEADER_LEN + self.name.len()..]
    }

    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Accumulates entries into a store-only ZIP archive.
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    entries: Vec<ArchiveEntry>,
    total_offset: u64,
    cache: Option<Vec<u8>>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Append `payload` under `name`. A `None` timestamp stamps the current
    /// time. Names ending in `/` are recorded as directories.
    ///
    /// Duplicate names are not detected. Fails only when the name or the
    /// payload is too long for the 16/32-bit ZIP size fields.
    pub fn add(
        &mut self,
        name: &str,
        payload: &[u8],
        timestamp: Option<DosDateTime>,
    ) -> Result<()> {
        let name_len = u16_field(name.len())?;
        let payload_len = u32_field(payload.len() as u64)?;
        let timestamp = timestamp.unwrap_or_else(DosDateTime::now);
        let crc32 = Crc32::checksum(payload);

        let mut block = Vec::with_capacity(LOCAL_HEADER_LEN + name.len() + payload.len());
        block.extend_from_slice(&LOCAL_HEADER_SIGNATURE.to_le_bytes());
        block.extend_from_slice(&VERSION.to_le_bytes());
        block.extend_from_slice(&0u16.to_le_bytes()); // flags
        block.extend_from_slice(&METHOD_STORED.to_le_bytes());
        block.extend_from_slice(&timestamp.dos_time().to_le_bytes());
        block.extend_from_slice(&timestamp.dos_date().to_le_bytes());
        block.extend_from_slice(&crc32.to_le_bytes());
        block.extend_from_slice(&payload_len.to_le_bytes()); // compressed
        block.extend_from_slice(&payload_len.to_le_bytes()); // uncompressed
        block.extend_from_slice(&name_len.to_le_bytes());
        block.extend_from_slice(&0u16.to_le_bytes()); // extra
        block.extend_from_slice(name.as_bytes());
        block.extend_from_slice(payload);

        let byte_offset = self.total_offset;
        self.total_offset += block.len() as u64;
        self.cache = None;

        debug!(
            name,
            byte_offset,
            size = payload.len(),
            crc32,
            "archive entry added"
        );

        self.entries.push(ArchiveEntry {
            name: name.to_string(),
            crc32,
            timestamp,
            byte_offset,
            block,
        });
        Ok(())
    }

    /// Complete archive bytes. Repeated calls return the cached result
    /// until the next [`ArchiveWriter::add`].
    pub fn serialize(&mut self) -> Result<&[u8]> {
        match &self.cache {
            Some(bytes) => {
                debug!(entries = self.entries.len(), size = bytes.len(), "archive cache hit");
            }
            None => {
                let bytes = self.build()?;
                debug!(
                    entries = self.entries.len(),
                    size = bytes.len(),
                    "archive serialized"
                );
                self.cache = Some(bytes);
            }
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }

    fn build(&self) -> Result<Vec<u8>> {
        let count = u16_field(self.entries.len())?;
        let central_offset = u32_field(self.total_offset)?;

        let mut central = Vec::new();
        for entry in &self.entries {
            let name = entry.name.as_bytes();
            let comment: &[u8] = &[];
            let external_attrs = if entry.is_directory() { DIRECTORY_ATTR } else { 0 };

            central.extend_from_slice(&CENTRAL_HEADER_SIGNATURE.to_le_bytes());
            central.extend_from_slice(&VERSION.to_le_bytes()); // made by
            // version needed .. extra length, as written in the local header
            central.extend_from_slice(&entry.block[4..LOCAL_HEADER_LEN]);
            central.extend_from_slice(&u16_field(comment.len())?.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // disk number
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&external_attrs.to_le_bytes());
            central.extend_from_slice(&u32_field(entry.byte_offset)?.to_le_bytes());
            central.extend_from_slice(name);
            central.extend_from_slice(comment);
        }
        let central_len = u32_field(central.len() as u64)?;

        let mut out = Vec::with_capacity(self.total_offset as usize + central.len() + END_RECORD_LEN);
        for entry in &self.entries {
            out.extend_from_slice(&entry.block);
        }
        out.extend_from_slice(&central);

        out.extend_from_slice(&END_OF_CENTRAL_DIR_SIGNATURE.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // this disk
        out.extend_from_slice(&0u16.to_le_bytes()); // disk with central directory
        out.extend_from_slice(&count.to_le_bytes()); // entries on this disk
        out.extend_from_slice(&count.to_le_bytes()); // entries total
        out.extend_from_slice(&central_len.to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length
        Ok(out)
    }
}

fn u16_field(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| BytekitError::FieldOverflow {
        value: value as u64,
        slot_size: 2,
    })
}

fn u32_field(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| BytekitError::FieldOverflow {
        value,
        slot_size: 4,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> DosDateTime {
        DosDateTime::new(2021, 3, 4, 5, 6, 7)
    }

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn dos_packing() {
        assert_eq!(stamp().dos_time(), 0x28c3);
        assert_eq!(stamp().dos_date(), 0x5264);
        assert_eq!(DosDateTime::new(1970, 1, 1, 0, 0, 0).dos_date(), 0x21);
    }

    #[test]
    fn out_of_range_fields_are_clamped() {
        let wild = DosDateTime::new(2300, 40, 99, 40, 200, 250);
        let max = DosDateTime::new(2107, 12, 31, 23, 59, 59);
        assert_eq!(wild.dos_time(), max.dos_time());
        assert_eq!(wild.dos_date(), max.dos_date());
        assert_eq!(max.dos_time(), 0xbf7d);
        assert_eq!(max.dos_date(), 0xff9f);

        let zero = DosDateTime::new(1980, 0, 0, 0, 0, 0);
        assert_eq!(zero.dos_date(), 0x21);
    }

    #[test]
    fn system_time_conversion() {
        let t = UNIX_EPOCH + std::time::Duration::from_secs(1_614_834_367);
        assert_eq!(DosDateTime::from(t), stamp());
        let leap = UNIX_EPOCH + std::time::Duration::from_secs(951_868_799);
        let leap = DosDateTime::from(leap);
        assert_eq!(leap, DosDateTime::new(2000, 2, 29, 23, 59, 59));
        assert_eq!(leap.dos_time(), 0xbf7d);
        assert_eq!(leap.dos_date(), 0x285d);
    }

    #[test]
    fn local_header_layout() {
        let mut writer = ArchiveWriter::new();
        writer.add("a.txt", b"hello", Some(stamp())).expect("add");
        let bytes = writer.serialize().expect("serialize").to_vec();

        assert_eq!(u32_at(&bytes, 0), LOCAL_HEADER_SIGNATURE);
        assert_eq!(u16_at(&bytes, 4), 0x0014);
        assert_eq!(u16_at(&bytes, 6), 0);
        assert_eq!(u16_at(&bytes, 8), 0);
        assert_eq!(u16_at(&bytes, 10), 0x28c3);
        assert_eq!(u16_at(&bytes, 12), 0x5264);
        assert_eq!(u32_at(&bytes, 14), 0x3610_a686);
        assert_eq!(u32_at(&bytes, 18), 5);
        assert_eq!(u32_at(&bytes, 22), 5);
        assert_eq!(u16_at(&bytes, 26), 5);
        assert_eq!(u16_at(&bytes, 28), 0);
        assert_eq!(&bytes[30..35], b"a.txt");
        assert_eq!(&bytes[35..40], b"hello");
    }

    #[test]
    fn offsets_accumulate_in_insertion_order() {
        let mut writer = ArchiveWriter::new();
        writer.add("a.txt", b"hello", Some(stamp())).expect("add");
        writer.add("b.txt", b"world!", Some(stamp())).expect("add");
        writer.add("c/", b"", Some(stamp())).expect("add");

        let offsets: Vec<u64> = writer.entries().iter().map(|e| e.byte_offset()).collect();
        assert_eq!(offsets, vec![0, 40, 81]);
        assert!(writer.entries()[2].is_directory());
        assert_eq!(writer.entries()[1].payload(), b"world!");
    }

    #[test]
    fn central_directory_and_end_record() {
        let mut writer = ArchiveWriter::new();
        writer.add("a.txt", b"hello", Some(stamp())).expect("add");
        writer.add("dir/", b"", Some(stamp())).expect("add");
        let bytes = writer.serialize().expect("serialize").to_vec();

        let locals = (30 + 5 + 5) + (30 + 4);
        let central_len = (46 + 5) + (46 + 4);
        assert_eq!(bytes.len(), locals + central_len + END_RECORD_LEN);

        let cd = &bytes[locals..];
        assert_eq!(u32_at(cd, 0), CENTRAL_HEADER_SIGNATURE);
        assert_eq!(u16_at(cd, 4), 0x0014);
        assert_eq!(&cd[6..32], &bytes[4..30]);
        assert_eq!(u16_at(cd, 32), 0); // comment length
        assert_eq!(u32_at(cd, 38), 0); // file attrs
        assert_eq!(u32_at(cd, 42), 0); // offset
        assert_eq!(&cd[46..51], b"a.txt");

        let second = &cd[51..];
        assert_eq!(u32_at(second, 38), DIRECTORY_ATTR);
        assert_eq!(u32_at(second, 42), 40);
        assert_eq!(&second[46..50], b"dir/");

        let end = &bytes[bytes.len() - END_RECORD_LEN..];
        assert_eq!(u32_at(end, 0), END_OF_CENTRAL_DIR_SIGNATURE);
        assert_eq!(u16_at(end, 8), 2);
        assert_eq!(u16_at(end, 10), 2);
        assert_eq!(u32_at(end, 12), central_len as u32);
        assert_eq!(u32_at(end, 16), locals as u32);
        assert_eq!(u16_at(end, 20), 0);
    }

    #[test]
    fn serialize_is_cached_until_next_add() {
        let mut writer = ArchiveWriter::new();
        writer.add("a", b"1", Some(stamp())).expect("add");
        let first = writer.serialize().expect("serialize").to_vec();
        let again = writer.serialize().expect("serialize").to_vec();
        assert_eq!(first, again);

        writer.add("b", b"2", Some(stamp())).expect("add");
        let grown = writer.serialize().expect("serialize").to_vec();
        assert!(grown.len() > first.len());
        assert_eq!(u16_at(&grown, grown.len() - 12), 2);
    }

    #[test]
    fn empty_archive_is_only_an_end_record() {
        let mut writer = ArchiveWriter::new();
        let bytes = writer.serialize().expect("serialize");
        assert_eq!(bytes.len(), END_RECORD_LEN);
        assert_eq!(u32_at(bytes, 0), END_OF_CENTRAL_DIR_SIGNATURE);
    }

    #[test]
    fn oversized_name_is_refused() {
        let mut writer = ArchiveWriter::new();
        let name = "n".repeat(70_000);
        assert!(matches!(
            writer.add(&name, b"", Some(stamp())),
            Err(BytekitError::FieldOverflow { slot_size: 2, .. })
        ));
        assert!(writer.is_empty());
    }
}
