//! Fixed-size pages and the pager that reads/writes them.
//!
//! Every page kind (data, trie node, index, manifest) shares the same
//! 32-byte header and 4096-byte slot; the header's flag byte says what the
//! payload actually is, rather than giving each page kind its own class
//! hierarchy.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::codec::{self, Codec};
use crate::error::{Error, Result};

/// Page identifier. `-1` is the sentinel for "absent".
pub type PageId = i64;

pub const NO_PAGE: PageId = -1;

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_HEADER_SIZE: usize = 32;
pub const PAGE_PAYLOAD_BUDGET: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

/// Size of the file header: an 8-byte `MAGIC` followed by three
/// `(page_id: i64, version: i32)` slots (`index_page`, `trie_root_page`,
/// `free_list_page`), 12 bytes each — `8 + 3 * 12 = 44`.
pub const HEADER_SIZE: u64 = 44;
pub const MAGIC: [u8; 8] = [0x55, 0xAA, 0xFE, 0xED, 0xFA, 0xCE, 0xDA, 0x7A];

pub const FLAG_DATA: u8 = 0x01;
pub const FLAG_TRIE: u8 = 0x02;
pub const FLAG_FREE: u8 = 0x04;
pub const FLAG_INDEX: u8 = 0x08;
/// Set when the stored payload was compressed by the codec. Resolves the
/// spec's open question about per-page budget overflow: a chunk that would
/// not fit once compressed is instead stored raw without this bit, so a
/// single pathological chunk never fails the whole write.
pub const FLAG_COMPRESSED: u8 = 0x10;

/// The fixed 32-byte page header. All multi-byte integers are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub crc32: u32,
    pub version: i32,
    pub prev_page: PageId,
    pub next_page: PageId,
    pub flags: u8,
    pub payload_len: i32,
}

impl PageHeader {
    #[must_use]
    pub const fn new(flags: u8, version: i32, prev_page: PageId, next_page: PageId, payload_len: i32) -> Self {
        Self { crc32: 0, version, prev_page, next_page, flags, payload_len }
    }

    fn to_bytes(self) -> [u8; PAGE_HEADER_SIZE] {
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.crc32.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..16].copy_from_slice(&self.prev_page.to_le_bytes());
        buf[16..24].copy_from_slice(&self.next_page.to_le_bytes());
        buf[24] = self.flags;
        buf[25..29].copy_from_slice(&self.payload_len.to_le_bytes());
        // buf[29..32] reserved, left zeroed
        buf
    }

    fn from_bytes(buf: &[u8; PAGE_HEADER_SIZE]) -> Self {
        Self {
            crc32: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            version: i32::from_le_bytes(buf[4..8].try_into().unwrap()),
            prev_page: i64::from_le_bytes(buf[8..16].try_into().unwrap()),
            next_page: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            flags: buf[24],
            payload_len: i32::from_le_bytes(buf[25..29].try_into().unwrap()),
        }
    }

    #[must_use]
    pub const fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }
}

/// Owns the backing file and the monotonic page-id counter.
#[derive(Debug)]
pub struct Pager<C: Codec> {
    file: File,
    codec: C,
    use_compression: bool,
    current_page_id: PageId,
}

impl<C: Codec> Pager<C> {
    #[must_use]
    pub const fn new(file: File, codec: C, use_compression: bool) -> Self {
        Self { file, codec, use_compression, current_page_id: 0 }
    }

    pub const fn current_page_id(&self) -> PageId {
        self.current_page_id
    }

    /// Returns `current_page_id`, then increments it. No I/O.
    pub fn allocate_page(&mut self) -> PageId {
        let id = self.current_page_id;
        self.current_page_id += 1;
        id
    }

    fn offset_of(page_id: PageId) -> u64 {
        HEADER_SIZE + page_id as u64 * PAGE_SIZE as u64
    }

    /// Writes a raw page, compressing the payload when the pager was opened
    /// with compression enabled and the compressed form still fits the
    /// per-page budget; otherwise the payload is stored uncompressed.
    pub fn write_raw_page(
        &mut self,
        page_id: PageId,
        payload: &[u8],
        kind_flags: u8,
        version: i32,
        prev: PageId,
        next: PageId,
    ) -> Result<()> {
        let (stored, flags) = if self.use_compression {
            let compressed = self.codec.compress(payload);
            if compressed.len() <= PAGE_PAYLOAD_BUDGET {
                (compressed, kind_flags | FLAG_COMPRESSED)
            } else {
                (payload.to_vec(), kind_flags)
            }
        } else {
            (payload.to_vec(), kind_flags)
        };

        if stored.len() > PAGE_PAYLOAD_BUDGET {
            return Err(Error::PayloadTooLarge { len: stored.len(), budget: PAGE_PAYLOAD_BUDGET });
        }

        let crc32 = codec::crc32(&stored);

        let header = PageHeader { crc32, version, prev_page: prev, next_page: next, flags, payload_len: stored.len() as i32 };

        log::trace!("write_raw_page: id={page_id} flags={flags:#x} len={}", stored.len());

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        self.file.write_all(&header.to_bytes())?;
        self.file.write_all(&stored)?;
        // Pad the unused tail of the slot so every page occupies exactly PAGE_SIZE.
        let pad = PAGE_PAYLOAD_BUDGET - stored.len();
        if pad > 0 {
            let zeros = vec![0u8; pad];
            self.file.write_all(&zeros)?;
        }
        self.file.flush()?;
        Ok(())
    }

    /// Reads a page back, verifying the CRC and decompressing as needed.
    pub fn read_raw_page(&mut self, page_id: PageId) -> Result<(PageHeader, Vec<u8>)> {
        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        let mut header_buf = [0u8; PAGE_HEADER_SIZE];
        read_full(&mut self.file, &mut header_buf, page_id)?;
        let header = PageHeader::from_bytes(&header_buf);

        let mut region = vec![0u8; PAGE_PAYLOAD_BUDGET];
        read_full(&mut self.file, &mut region, page_id)?;

        let payload_len = header.payload_len as usize;
        if payload_len > PAGE_PAYLOAD_BUDGET {
            return Err(Error::MalformedNode { page_id, reason: "payload_len exceeds page budget".into() });
        }
        let stored = &region[..payload_len];

        if codec::crc32(stored) != header.crc32 {
            log::error!("checksum mismatch on page {page_id}");
            return Err(Error::ChecksumMismatch { page_id });
        }

        let payload = if header.is_compressed() {
            self.codec.decompress(stored).map_err(|_| Error::Decompress { page_id })?
        } else {
            stored.to_vec()
        };

        log::trace!("read_raw_page: id={page_id} flags={:#x} len={}", header.flags, payload.len());
        Ok((header, payload))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    pub fn into_file(self) -> File {
        self.file
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// Fills `buf` completely or reports exactly how short the read fell,
/// distinguishing a truncated file from a generic I/O failure.
fn read_full(file: &mut File, buf: &mut [u8], page_id: PageId) -> Result<()> {
    let expected = buf.len();
    let mut got = 0;
    while got < expected {
        match file.read(&mut buf[got..])? {
            0 => return Err(Error::ShortRead { page_id, expected, got }),
            n => got += n,
        }
    }
    Ok(())
}
