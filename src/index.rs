//! The in-memory document index and its single-page on-disk serialization.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::codec::Codec;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::page::{PageId, Pager, FLAG_INDEX, NO_PAGE};

/// Maps document id to its metadata; iteration order is the insertion order,
/// but serialization always sorts by `doc_id` bytes ascending (invariant 9).
#[derive(Debug, Default)]
pub struct DocumentIndex {
    documents: BTreeMap<Uuid, Document>,
}

impl DocumentIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.id, document);
    }

    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<&Document> {
        self.documents.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Serializes every record sorted by `doc_id` bytes ascending and writes
    /// it as a single `INDEX` page. A `BTreeMap<Uuid, _>` already iterates in
    /// that order, since `Uuid`'s `Ord` compares its underlying 16 bytes.
    pub fn write_page<C: Codec>(&self, pager: &mut Pager<C>, page_id: PageId) -> Result<()> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.documents.len() as i32).to_le_bytes());
        for doc in self.documents.values() {
            buf.extend_from_slice(doc.id.as_bytes());
            buf.extend_from_slice(&doc.first_page.to_le_bytes());
            buf.extend_from_slice(&doc.current_version.to_le_bytes());
            buf.extend_from_slice(&(doc.paths.len() as i32).to_le_bytes());
            for path in &doc.paths {
                let bytes = path.as_bytes();
                buf.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
                buf.extend_from_slice(bytes);
            }
        }
        pager.write_raw_page(page_id, &buf, FLAG_INDEX, 0, NO_PAGE, NO_PAGE)
    }

    /// Reads and parses the `INDEX` page at `page_id`.
    pub fn read_page<C: Codec>(pager: &mut Pager<C>, page_id: PageId) -> Result<Self> {
        let (_, payload) = pager.read_raw_page(page_id)?;
        let mut pos = 0usize;
        let doc_count = read_i32(&payload, &mut pos, page_id)? as usize;
        let mut documents = BTreeMap::new();
        for _ in 0..doc_count {
            let id_bytes = read_bytes(&payload, &mut pos, 16, page_id)?;
            let id = Uuid::from_bytes(id_bytes.try_into().unwrap());
            let first_page = read_i64(&payload, &mut pos, page_id)?;
            let current_version = read_i32(&payload, &mut pos, page_id)?;
            let path_count = read_i32(&payload, &mut pos, page_id)? as usize;
            let mut paths = Vec::with_capacity(path_count);
            for _ in 0..path_count {
                let len = read_i32(&payload, &mut pos, page_id)? as usize;
                let bytes = read_bytes(&payload, &mut pos, len, page_id)?;
                let path = String::from_utf8(bytes.to_vec())
                    .map_err(|_| Error::MalformedNode { page_id, reason: "non-utf8 path in index".into() })?;
                paths.push(path);
            }
            documents.insert(id, Document { id, first_page, current_version, paths });
        }
        Ok(Self { documents })
    }
}

fn read_bytes<'a>(buf: &'a [u8], pos: &mut usize, n: usize, page_id: PageId) -> Result<&'a [u8]> {
    if *pos + n > buf.len() {
        return Err(Error::MalformedNode { page_id, reason: "unexpected end of index page".into() });
    }
    let slice = &buf[*pos..*pos + n];
    *pos += n;
    Ok(slice)
}

fn read_i32(buf: &[u8], pos: &mut usize, page_id: PageId) -> Result<i32> {
    Ok(i32::from_le_bytes(read_bytes(buf, pos, 4, page_id)?.try_into().unwrap()))
}

fn read_i64(buf: &[u8], pos: &mut usize, page_id: PageId) -> Result<i64> {
    Ok(i64::from_le_bytes(read_bytes(buf, pos, 8, page_id)?.try_into().unwrap()))
}
