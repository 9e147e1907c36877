//! Single-buffer gzip codec.
//!
//! Output is a standard RFC 1952 gzip member (deflate body, 10-byte header,
//! CRC32 + ISIZE trailer) and is readable by any gzip-compatible tool.
//!
//! Compression writes into a buffer sized by [`gzip_bound`] with a single
//! `Finish` call. Decompression drains a fixed scratch buffer until the codec
//! reports the end of the stream.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use thiserror::Error;
use tracing::debug;

/// Weakest accepted compression level.
pub const MIN_LEVEL: u32 = 1;
/// Strongest accepted compression level.
pub const MAX_LEVEL: u32 = 9;
/// Level used when none is given.
pub const DEFAULT_LEVEL: u32 = 6;

/// Scratch buffer size used by the inflate loop.
pub const SCRATCH_SIZE: usize = 4096;

/// Window size for both directions (32 KiB).
const WINDOW_BITS: u8 = 15;

/// gzip header (10 bytes) plus CRC32/ISIZE trailer (8 bytes).
const GZIP_WRAPPER_LEN: usize = 18;

/// Errors reported by the codec layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid compression level {0} (expected {MIN_LEVEL}..={MAX_LEVEL})")]
    InvalidLevel(u32),
    #[error("deflate failed: {0}")]
    Compress(String),
    #[error("deflate did not finish within the {bound}-byte bound")]
    BufferTooSmall { bound: usize },
    #[error("invalid or corrupt gzip data: {0}")]
    Corrupt(String),
    #[error("gzip stream is truncated")]
    Truncated,
}

/// Compress and decompress one complete buffer.
///
/// Implementations must be self-describing: `decompress` takes nothing but the
/// bytes `compress` produced.
pub trait SingleBufferCodec {
    /// Human readable algorithm name.
    fn name(&self) -> &'static str;

    /// Conventional file extension including the leading dot.
    fn file_extension(&self) -> &'static str;

    fn compress(&self, data: &[u8], level: u32) -> Result<Vec<u8>, CodecError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Worst-case size of a gzip member holding `len` input bytes.
///
/// Matches zlib's conservative `deflateBound` for stored blocks, which holds for
/// every level and memory setting.
pub fn gzip_bound(len: usize) -> usize {
    len.saturating_add((len.saturating_add(7)) >> 3)
        .saturating_add((len.saturating_add(63)) >> 6)
        .saturating_add(5)
        .saturating_add(GZIP_WRAPPER_LEN)
}

/// Reject levels outside `1..=9`.
pub fn check_level(level: u32) -> Result<Compression, CodecError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(Compression::new(level))
    } else {
        Err(CodecError::InvalidLevel(level))
    }
}

/// gzip codec backed by flate2.
///
/// Every call builds its own deflate/inflate state, so one `GzipCodec` can be
/// shared freely; the state is dropped on every return path.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipCodec;

impl GzipCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SingleBufferCodec for GzipCodec {
    fn name(&self) -> &'static str {
        "Gzip"
    }

    fn file_extension(&self) -> &'static str {
        ".gz"
    }

    fn compress(&self, data: &[u8], level: u32) -> Result<Vec<u8>, CodecError> {
        let compression = check_level(level)?;
        let mut deflater = Compress::new_gzip(compression, WINDOW_BITS);

        let bound = gzip_bound(data.len());
        let mut out = Vec::with_capacity(bound);
        let status = deflater
            .compress_vec(data, &mut out, FlushCompress::Finish)
            .map_err(|e| CodecError::Compress(e.to_string()))?;

        match status {
            Status::StreamEnd => {}
            Status::Ok | Status::BufError => return Err(CodecError::BufferTooSmall { bound }),
        }
        // compress_vec only writes into spare capacity; `out.len()` is exactly
        // the number of bytes produced.
        debug_assert_eq!(out.len() as u64, deflater.total_out());
        out.shrink_to_fit();

        debug!(
            input = data.len(),
            output = out.len(),
            level,
            "gzip compress"
        );
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut inflater = Decompress::new_gzip(WINDOW_BITS);
        let mut scratch = [0u8; SCRATCH_SIZE];
        let mut out = Vec::new();

        loop {
            let consumed = inflater.total_in() as usize;
            let before_in = inflater.total_in();
            let before_out = inflater.total_out();

            let status = inflater
                .decompress(&data[consumed..], &mut scratch, FlushDecompress::None)
                .map_err(|e| CodecError::Corrupt(e.to_string()))?;

            let produced = (inflater.total_out() - before_out) as usize;
            out.extend_from_slice(&scratch[..produced]);

            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let progressed = produced > 0 || inflater.total_in() > before_in;
                    if !progressed {
                        return Err(CodecError::Truncated);
                    }
                }
            }
        }

        let trailing = data.len() - inflater.total_in() as usize;
        if trailing > 0 {
            debug!(trailing, "ignoring bytes after gzip member");
        }
        debug!(input = data.len(), output = out.len(), "gzip decompress");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bounds() {
        assert!(check_level(1).is_ok());
        assert!(check_level(9).is_ok());
        assert_eq!(check_level(0).unwrap_err(), CodecError::InvalidLevel(0));
        assert_eq!(check_level(10).unwrap_err(), CodecError::InvalidLevel(10));
    }

    #[test]
    fn output_is_gzip_member() {
        let out = GzipCodec.compress(b"hello hello hello", 6).unwrap();
        assert_eq!(&out[..3], &[0x1f, 0x8b, 0x08]);
        let isize = u32::from_le_bytes(out[out.len() - 4..].try_into().unwrap());
        assert_eq!(isize, 17);
    }

    #[test]
    fn bound_covers_incompressible_input() {
        let data: Vec<u8> = (0..70_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect();
        for level in MIN_LEVEL..=MAX_LEVEL {
            let out = GzipCodec.compress(&data, level).unwrap();
            assert!(out.len() <= gzip_bound(data.len()));
        }
    }

    #[test]
    fn empty_input_has_minimal_envelope() {
        let out = GzipCodec.compress(&[], 6).unwrap();
        assert_eq!(out.len(), 20);
        assert!(GzipCodec.decompress(&out).unwrap().is_empty());
    }

    #[test]
    fn empty_stream_is_truncated() {
        assert_eq!(GzipCodec.decompress(&[]).unwrap_err(), CodecError::Truncated);
    }

    #[test]
    fn output_larger_than_scratch() {
        let data = vec![7u8; SCRATCH_SIZE * 5 + 3];
        let out = GzipCodec.compress(&data, 9).unwrap();
        assert_eq!(GzipCodec.decompress(&out).unwrap(), data);
    }
}
