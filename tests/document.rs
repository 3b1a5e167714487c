use std::fs::OpenOptions;

use streamdb::codec::NullCodec;
use streamdb::document::{read_chain, write_chain};
use streamdb::page::{Pager, NO_PAGE, PAGE_PAYLOAD_BUDGET};

fn open_pager(path: &std::path::Path) -> Pager<NullCodec> {
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path).unwrap();
    Pager::new(file, NullCodec, false)
}

#[test]
fn chain_links_are_doubly_linked_with_terminator_sentinels() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(&dir.path().join("chain.sdb"));

    let payload = vec![0x42u8; PAGE_PAYLOAD_BUDGET * 3 + 17];
    let first_page = write_chain(&mut pager, &payload, 0).unwrap();

    let (h0, _) = pager.read_raw_page(first_page).unwrap();
    assert_eq!(h0.prev_page, NO_PAGE);
    let (h1, _) = pager.read_raw_page(h0.next_page).unwrap();
    assert_eq!(h1.prev_page, first_page);
    let (h2, _) = pager.read_raw_page(h1.next_page).unwrap();
    assert_eq!(h2.prev_page, h0.next_page);
    let (h3, _) = pager.read_raw_page(h2.next_page).unwrap();
    assert_eq!(h3.prev_page, h1.next_page);
    assert_eq!(h3.next_page, NO_PAGE);

    assert_eq!(read_chain(&mut pager, first_page).unwrap(), payload);
}

#[test]
fn single_page_chain_has_no_page_sentinels_on_both_ends() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(&dir.path().join("chain.sdb"));

    let first_page = write_chain(&mut pager, b"short payload", 0).unwrap();
    let (header, payload) = pager.read_raw_page(first_page).unwrap();
    assert_eq!(header.prev_page, NO_PAGE);
    assert_eq!(header.next_page, NO_PAGE);
    assert_eq!(payload, b"short payload");
}

#[test]
fn chain_pages_carry_the_requested_version() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(&dir.path().join("chain.sdb"));

    let payload = vec![0u8; PAGE_PAYLOAD_BUDGET + 1];
    let first_page = write_chain(&mut pager, &payload, 3).unwrap();
    let (h0, _) = pager.read_raw_page(first_page).unwrap();
    let (h1, _) = pager.read_raw_page(h0.next_page).unwrap();
    assert_eq!(h0.version, 3);
    assert_eq!(h1.version, 3);
}
