//! Reads archives back with a minimal, independent ZIP directory parser.

use bytekit_core::archive::{ArchiveWriter, DosDateTime, CENTRAL_HEADER_LEN, END_RECORD_LEN};
use bytekit_core::crc32::Crc32;

#[derive(Debug)]
struct Listed {
    name: String,
    crc32: u32,
    contents: Vec<u8>,
    external_attrs: u32,
}

fn u16_at(bytes: &[u8], at: usize) -> usize {
    u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Walk EOCD -> central directory -> local headers, the way unzip tools do.
fn list(archive: &[u8]) -> Vec<Listed> {
    let end = archive.len() - END_RECORD_LEN;
    assert_eq!(u32_at(archive, end), 0x0605_4b50, "end record signature");
    let total = u16_at(archive, end + 10);
    assert_eq!(u16_at(archive, end + 8), total);
    let cd_size = u32_at(archive, end + 12) as usize;
    let cd_offset = u32_at(archive, end + 16) as usize;
    assert_eq!(cd_offset + cd_size, end, "central directory must end at EOCD");

    let mut listed = Vec::new();
    let mut cursor = cd_offset;
    for _ in 0..total {
        let record = &archive[cursor..];
        assert_eq!(u32_at(record, 0), 0x0201_4b50, "central header signature");
        assert_eq!(u16_at(record, 10), 0, "stored method");
        let crc32 = u32_at(record, 16);
        let compressed = u32_at(record, 20) as usize;
        let uncompressed = u32_at(record, 24) as usize;
        assert_eq!(compressed, uncompressed);
        let name_len = u16_at(record, 28);
        let extra_len = u16_at(record, 30);
        let comment_len = u16_at(record, 32);
        let external_attrs = u32_at(record, 38);
        let local_offset = u32_at(record, 42) as usize;
        let name = String::from_utf8(record[46..46 + name_len].to_vec()).expect("utf-8 name");

        let local = &archive[local_offset..];
        assert_eq!(u32_at(local, 0), 0x0403_4b50, "local header signature");
        assert_eq!(u32_at(local, 14), crc32, "local/central crc agree");
        let local_name_len = u16_at(local, 26);
        let local_extra_len = u16_at(local, 28);
        assert_eq!(&local[30..30 + local_name_len], name.as_bytes());
        let data_start = 30 + local_name_len + local_extra_len;
        let contents = local[data_start..data_start + compressed].to_vec();

        listed.push(Listed {
            name,
            crc32,
            contents,
            external_attrs,
        });
        cursor += CENTRAL_HEADER_LEN + name_len + extra_len + comment_len;
    }
    assert_eq!(cursor, end);
    listed
}

#[test]
fn two_text_files() {
    let mut writer = ArchiveWriter::new();
    writer.add("a.txt", b"hello", None).expect("add a");
    writer.add("b.txt", b"world", None).expect("add b");
    let bytes = writer.serialize().expect("serialize").to_vec();

    let listed = list(&bytes);
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "a.txt");
    assert_eq!(listed[0].contents, b"hello");
    assert_eq!(listed[0].crc32, 0x3610_A686);
    assert_eq!(listed[1].name, "b.txt");
    assert_eq!(listed[1].contents, b"world");
    assert_eq!(listed[1].crc32, 0x3A77_1143);
}

#[test]
fn mixed_entries_with_directory() {
    let stamp = DosDateTime::new(2024, 12, 31, 23, 59, 58);
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    let mut writer = ArchiveWriter::new();
    writer.add("docs/", b"", Some(stamp)).expect("add dir");
    writer.add("docs/readme.md", b"# bytekit\n", Some(stamp)).expect("add readme");
    writer.add("data.bin", &payload, Some(stamp)).expect("add data");
    writer.add("empty", b"", Some(stamp)).expect("add empty");
    let bytes = writer.serialize().expect("serialize").to_vec();

    let listed = list(&bytes);
    let names: Vec<&str> = listed.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["docs/", "docs/readme.md", "data.bin", "empty"]);
    assert_eq!(listed[0].external_attrs, 0x10);
    assert_eq!(listed[1].external_attrs, 0);
    assert_eq!(listed[2].contents, payload);
    assert_eq!(listed[2].crc32, Crc32::checksum(&payload));
    assert!(listed[3].contents.is_empty());

    for (entry, listed) in writer.entries().iter().zip(&listed) {
        assert_eq!(entry.crc32(), listed.crc32);
        assert_eq!(entry.timestamp(), stamp);
    }
}
