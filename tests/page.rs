use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};

use streamdb::codec::NullCodec;
use streamdb::page::{Pager, FLAG_DATA, HEADER_SIZE, NO_PAGE, PAGE_HEADER_SIZE, PAGE_SIZE};

fn open_pager(path: &std::path::Path) -> Pager<NullCodec> {
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path).unwrap();
    Pager::new(file, NullCodec, false)
}

#[test]
fn page_offsets_are_independent_of_payload_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.sdb");
    let mut pager = open_pager(&path);

    let id0 = pager.allocate_page();
    let id1 = pager.allocate_page();
    pager.write_raw_page(id0, b"short", FLAG_DATA, 0, NO_PAGE, id1).unwrap();
    pager.write_raw_page(id1, &vec![7u8; 2000], FLAG_DATA, 0, id0, NO_PAGE).unwrap();

    let file_len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(file_len, HEADER_SIZE + 2 * PAGE_SIZE as u64);

    let (_, payload0) = pager.read_raw_page(id0).unwrap();
    let (_, payload1) = pager.read_raw_page(id1).unwrap();
    assert_eq!(payload0, b"short");
    assert_eq!(payload1, vec![7u8; 2000]);
}

#[test]
fn flipping_a_stored_byte_breaks_the_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.sdb");
    let mut pager = open_pager(&path);
    let id = pager.allocate_page();
    pager.write_raw_page(id, b"hello world", FLAG_DATA, 0, NO_PAGE, NO_PAGE).unwrap();
    drop(pager);

    let payload_offset = HEADER_SIZE + id as u64 * PAGE_SIZE as u64 + PAGE_HEADER_SIZE as u64;
    let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let mut byte = [0u8; 1];
    file.seek(SeekFrom::Start(payload_offset)).unwrap();
    file.read_exact(&mut byte).unwrap();
    file.seek(SeekFrom::Start(payload_offset)).unwrap();
    file.write_all(&[byte[0] ^ 0xFF]).unwrap();
    drop(file);

    let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let mut pager = Pager::new(file, NullCodec, false);
    let err = pager.read_raw_page(id).unwrap_err();
    assert!(matches!(err, streamdb::Error::ChecksumMismatch { page_id } if page_id == id));
}

#[test]
fn truncated_page_on_disk_surfaces_as_a_short_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.sdb");
    let mut pager = open_pager(&path);
    let id = pager.allocate_page();
    pager.write_raw_page(id, b"hello world", FLAG_DATA, 0, NO_PAGE, NO_PAGE).unwrap();
    drop(pager);

    // Chop the file off partway through the page's header.
    let truncated_len = HEADER_SIZE + id as u64 * PAGE_SIZE as u64 + (PAGE_HEADER_SIZE as u64 / 2);
    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(truncated_len).unwrap();
    drop(file);

    let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let mut pager = Pager::new(file, NullCodec, false);
    let err = pager.read_raw_page(id).unwrap_err();
    assert!(matches!(
        err,
        streamdb::Error::ShortRead { page_id, expected, got }
        if page_id == id && expected == PAGE_HEADER_SIZE && got == PAGE_HEADER_SIZE / 2
    ));
}

#[test]
fn empty_payload_still_produces_a_valid_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.sdb");
    let mut pager = open_pager(&path);
    let id = pager.allocate_page();
    pager.write_raw_page(id, &[], FLAG_DATA, 0, NO_PAGE, NO_PAGE).unwrap();
    let (header, payload) = pager.read_raw_page(id).unwrap();
    assert_eq!(header.payload_len, 0);
    assert!(payload.is_empty());
}
