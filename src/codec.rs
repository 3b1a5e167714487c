//! Swappable byte-level compression codec and the CRC-32 checksum.
//!
//! The pager never depends on Snappy directly — it depends on this trait,
//! treating the codec as an external collaborator it invokes opaquely.

use crc32fast::Hasher as Crc32Hasher;

use crate::error::Result;

/// Checksum used to cover a page's stored (possibly compressed) payload.
#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

pub trait Codec {
    fn compress(&self, data: &[u8]) -> Vec<u8>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Snappy, via the `snap` crate — the default codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        snap::raw::Encoder::new().compress_vec(data).unwrap_or_else(|_| data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|_| crate::error::Error::Decompress { page_id: crate::page::NO_PAGE })
    }
}

/// Identity codec, used when a container is opened with `use_compression:
/// false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCodec;

impl Codec for NullCodec {
    fn compress(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}
