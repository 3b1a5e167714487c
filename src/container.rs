//! The container driver: open/write_document/close on the write side,
//! open_read/resolve/load on the read side.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use uuid::Uuid;

use crate::codec::{Codec, SnappyCodec};
use crate::document;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::fsutil;
use crate::index::DocumentIndex;
use crate::page::{PageId, Pager, MAGIC, NO_PAGE};
use crate::trie::Trie;

#[derive(Debug, Clone, Copy)]
pub struct ContainerOptions {
    pub use_compression: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self { use_compression: true }
    }
}

/// Reverses `path` by Unicode character, not by byte, so a multi-byte
/// character is moved as a unit and the result stays valid UTF-8.
#[must_use]
pub fn reverse_path(path: &str) -> String {
    path.chars().rev().collect()
}

/// Owns the lifecycle of a `.sdb` being written: one file handle, open to
/// close. The codec is fixed to [`SnappyCodec`] per instance; whether it is
/// actually invoked is governed by [`ContainerOptions::use_compression`].
#[derive(Debug)]
pub struct Container {
    pager: Pager<SnappyCodec>,
    index: DocumentIndex,
    trie: Trie,
    seen_paths: HashSet<String>,
}

impl Container {
    /// Creates (truncating) `path` and writes the placeholder header.
    pub fn open(path: &Path, options: ContainerOptions) -> Result<Self> {
        let file = fsutil::create_rw_truncate(path)?;
        let mut pager = Pager::new(file, SnappyCodec, options.use_compression);
        write_placeholder_header(&mut pager)?;
        log::info!("opened container for write: {}", path.display());
        Ok(Self { pager, index: DocumentIndex::new(), trie: Trie::new(), seen_paths: HashSet::new() })
    }

    /// Segments `payload` into a `DATA` page chain, records the document in
    /// the index, and inserts `reverse(logical_path)` into the trie.
    ///
    /// Rejects an empty path and a path already written in this session,
    /// before any page is allocated for either.
    pub fn write_document(&mut self, logical_path: &str, payload: &[u8]) -> Result<Uuid> {
        if logical_path.is_empty() {
            return Err(Error::EmptyPath);
        }
        if !self.seen_paths.insert(logical_path.to_string()) {
            return Err(Error::DuplicatePath(logical_path.to_string()));
        }

        let first_page = document::write_chain(&mut self.pager, payload, 0)?;
        let doc = Document::new(first_page, 0, logical_path.to_string());
        let doc_id = doc.id;
        self.index.insert(doc);

        let reversed = reverse_path(logical_path);
        self.trie.insert(&mut self.pager, reversed.as_bytes(), doc_id)?;

        log::debug!("wrote document {doc_id} ({} bytes) at '{logical_path}'", payload.len());
        Ok(doc_id)
    }

    /// Writes the index page, rewrites the final header, and flushes.
    pub fn close(mut self) -> Result<()> {
        let index_page = self.pager.allocate_page();
        self.index.write_page(&mut self.pager, index_page)?;
        write_final_header(&mut self.pager, index_page, self.trie.root_page)?;
        self.pager.flush()?;
        log::info!(
            "closed container: {} documents, trie root page {}, index page {index_page}",
            self.index.len(),
            self.trie.root_page
        );
        Ok(())
    }
}

/// A `.sdb` opened for reading: header parsed, index loaded, trie root
/// known.
#[derive(Debug)]
pub struct ReadContainer {
    pager: Pager<SnappyCodec>,
    index: DocumentIndex,
    trie: Trie,
}

impl ReadContainer {
    pub fn open_read(path: &Path) -> Result<Self> {
        let mut file = fsutil::open_ro(path)?;
        file.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 8];
        file.read_exact(&mut magic)?;
        if magic != MAGIC {
            log::error!("magic mismatch opening {}", path.display());
            return Err(Error::MagicMismatch);
        }

        let (index_page, _) = read_slot(&mut file)?;
        let (trie_root, _) = read_slot(&mut file)?;
        let (_free_list, _) = read_slot(&mut file)?;

        // use_compression only gates *writes*; reads decompress purely from
        // each page's FLAG_COMPRESSED bit, so the read-side codec choice
        // never needs to match what the writer used.
        let mut pager = Pager::new(file, SnappyCodec, false);
        let index = DocumentIndex::read_page(&mut pager, index_page)?;
        let trie = Trie { root_page: trie_root };

        log::info!("opened container for read: {} ({} documents)", path.display(), index.len());
        Ok(Self { pager, index, trie })
    }

    /// Resolves a logical path to its document id via the reverse trie.
    pub fn resolve(&mut self, logical_path: &str) -> Result<Option<Uuid>> {
        let reversed = reverse_path(logical_path);
        self.trie.lookup(&mut self.pager, reversed.as_bytes())
    }

    /// Resolves every document whose path ends with `suffix` (e.g. a
    /// filename tail or extension), using the trie's native right-anchored
    /// ordering.
    pub fn resolve_suffix(&mut self, suffix: &str) -> Result<Vec<Uuid>> {
        let reversed = reverse_path(suffix);
        self.trie.resolve_prefix(&mut self.pager, reversed.as_bytes())
    }

    pub fn load(&mut self, id: Uuid) -> Result<Vec<u8>> {
        let doc = self.index.get(&id).ok_or(Error::NotFound)?;
        document::read_chain(&mut self.pager, doc.first_page)
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.index.len()
    }
}

fn write_placeholder_header<C: Codec>(pager: &mut Pager<C>) -> Result<()> {
    let file = pager.file_mut();
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&MAGIC)?;
    write_slot(file, NO_PAGE, 0)?;
    write_slot(file, NO_PAGE, 0)?;
    write_slot(file, NO_PAGE, 0)?;
    file.flush()?;
    Ok(())
}

fn write_final_header<C: Codec>(pager: &mut Pager<C>, index_page: PageId, trie_root: PageId) -> Result<()> {
    let file = pager.file_mut();
    file.seek(SeekFrom::Start(MAGIC.len() as u64))?;
    write_slot(file, index_page, 0)?;
    write_slot(file, trie_root, 0)?;
    write_slot(file, NO_PAGE, 0)?;
    file.flush()?;
    Ok(())
}

fn write_slot(file: &mut File, page_id: PageId, version: i32) -> Result<()> {
    file.write_all(&page_id.to_le_bytes())?;
    file.write_all(&version.to_le_bytes())?;
    Ok(())
}

fn read_slot(file: &mut File) -> Result<(PageId, i32)> {
    let mut page_buf = [0u8; 8];
    file.read_exact(&mut page_buf)?;
    let mut version_buf = [0u8; 4];
    file.read_exact(&mut version_buf)?;
    Ok((i64::from_le_bytes(page_buf), i32::from_le_bytes(version_buf)))
}
