//! Document metadata and the chain writer that segments a payload across
//! fixed-size `DATA` pages.

use uuid::Uuid;

use crate::codec::Codec;
use crate::error::Result;
use crate::page::{PageId, Pager, FLAG_DATA, NO_PAGE, PAGE_PAYLOAD_BUDGET};

/// A named payload, realized on disk as a chain of `DATA` pages.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub first_page: PageId,
    pub current_version: i32,
    pub paths: Vec<String>,
}

impl Document {
    #[must_use]
    pub fn new(first_page: PageId, current_version: i32, path: String) -> Self {
        Self { id: Uuid::new_v4(), first_page, current_version, paths: vec![path] }
    }
}

/// Segments `payload` into `PAGE_PAYLOAD_BUDGET`-sized chunks (the
/// *uncompressed* budget, per spec) and writes them as a doubly-linked
/// chain of `DATA` pages. Returns the first page of the chain.
///
/// An empty payload still produces exactly one page with `payload_len = 0`
/// so that `first_page` is always valid.
pub fn write_chain<C: Codec>(pager: &mut Pager<C>, payload: &[u8], version: i32) -> Result<PageId> {
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&[][..]]
    } else {
        payload.chunks(PAGE_PAYLOAD_BUDGET).collect()
    };

    let mut prev_page = NO_PAGE;
    let mut pending_id = pager.allocate_page();
    let first_page = pending_id;

    for (i, chunk) in chunks.iter().enumerate() {
        let this_id = pending_id;
        let is_last = i + 1 == chunks.len();
        let next_id = if is_last { NO_PAGE } else { pager.allocate_page() };
        pager.write_raw_page(this_id, chunk, FLAG_DATA, version, prev_page, next_id)?;
        prev_page = this_id;
        pending_id = next_id;
    }

    Ok(first_page)
}

/// Reconstructs a document's full payload by following the `DATA` chain
/// from `first_page`.
pub fn read_chain<C: Codec>(pager: &mut Pager<C>, first_page: PageId) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut cur = first_page;
    while cur != NO_PAGE {
        let (header, payload) = pager.read_raw_page(cur)?;
        out.extend_from_slice(&payload);
        cur = header.next_page;
    }
    Ok(out)
}
