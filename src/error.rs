use thiserror::Error;

use crate::page::PageId;

/// Crate-wide error type for every fallible StreamDb operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checksum mismatch on page {page_id}")]
    ChecksumMismatch { page_id: PageId },

    #[error("file magic mismatch")]
    MagicMismatch,

    #[error("short read on page {page_id}: expected {expected} bytes, got {got}")]
    ShortRead { page_id: PageId, expected: usize, got: usize },

    #[error("payload of {len} bytes exceeds the {budget}-byte page budget")]
    PayloadTooLarge { len: usize, budget: usize },

    #[error("codec failed to decompress page {page_id}")]
    Decompress { page_id: PageId },

    #[error("malformed node on page {page_id}: {reason}")]
    MalformedNode { page_id: PageId, reason: String },

    #[error("duplicate logical path: {0}")]
    DuplicatePath(String),

    #[error("empty logical path")]
    EmptyPath,

    #[error("not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
