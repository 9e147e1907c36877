//! Flat multi-file archive container.
//!
//! An archive blob is a plain sequence of frames with no magic number, version
//! or overall length. All integers are little-endian:
//!
//! ```text
//! repeat until end-of-blob {
//!     name_length    : u32
//!     name           : name_length bytes of UTF-8, no terminator
//!     payload_length : u64
//!     payload        : payload_length bytes
//! }
//! ```
//!
//! End of input is the only terminator, so every length field is checked
//! against the bytes that remain before anything is read.

use thiserror::Error;
use tracing::debug;

use crate::codec::{CodecError, GzipCodec, SingleBufferCodec};
use crate::AnalyzerError;

/// Size of the `name_length` field.
pub const NAME_LEN_SIZE: usize = 4;
/// Size of the `payload_length` field.
pub const PAYLOAD_LEN_SIZE: usize = 8;

/// Errors raised while building entries or parsing a blob.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("truncated archive at offset {offset}: need {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        needed: u64,
        available: usize,
    },
    #[error("empty entry name at offset {offset}")]
    EmptyName { offset: usize },
    #[error("entry name at offset {offset} is not valid UTF-8")]
    InvalidName { offset: usize },
    #[error("entry name is {0} bytes, longer than a u32 length allows")]
    NameTooLong(usize),
}

/// One named payload inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    payload: Vec<u8>,
}

impl Entry {
    /// Build an entry. The name must be non-empty and its byte length must fit
    /// in a `u32`.
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Result<Self, ArchiveError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ArchiveError::EmptyName { offset: 0 });
        }
        if u32::try_from(name.len()).is_err() {
            return Err(ArchiveError::NameTooLong(name.len()));
        }
        Ok(Self { name, payload })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of this entry once framed.
    pub fn framed_len(&self) -> usize {
        NAME_LEN_SIZE + self.name.len() + PAYLOAD_LEN_SIZE + self.payload.len()
    }
}

/// Sum of payload lengths, excluding framing.
pub fn total_payload_len(entries: &[Entry]) -> u64 {
    entries.iter().map(|e| e.payload.len() as u64).sum()
}

/// Exact length of `serialize(entries)`.
pub fn serialized_len(entries: &[Entry]) -> usize {
    entries.iter().map(Entry::framed_len).sum()
}

/// Concatenate `entries` into one blob, in order.
pub fn serialize(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(serialized_len(entries));
    for entry in entries {
        // Entry::new guarantees the name length fits.
        out.extend_from_slice(&(entry.name.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(&(entry.payload.len() as u64).to_le_bytes());
        out.extend_from_slice(&entry.payload);
    }
    out
}

/// Bounds-checked cursor over a blob.
struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: u64) -> Result<&'a [u8], ArchiveError> {
        let available = self.remaining();
        if len > available as u64 {
            return Err(ArchiveError::Truncated {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let len = len as usize;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        let bytes = self.take(NAME_LEN_SIZE as u64)?;
        let mut buf = [0u8; NAME_LEN_SIZE];
        buf.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, ArchiveError> {
        let bytes = self.take(PAYLOAD_LEN_SIZE as u64)?;
        let mut buf = [0u8; PAYLOAD_LEN_SIZE];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }
}

/// Split a blob back into its entries.
///
/// Fails with [`ArchiveError`] instead of returning a partial list when any
/// frame is cut short.
pub fn parse(blob: &[u8]) -> Result<Vec<Entry>, ArchiveError> {
    let mut reader = FrameReader::new(blob);
    let mut entries = Vec::new();

    while !reader.is_empty() {
        let frame_start = reader.pos;
        let name_len = reader.read_u32()?;
        if name_len == 0 {
            return Err(ArchiveError::EmptyName {
                offset: frame_start,
            });
        }
        let name_bytes = reader.take(name_len as u64)?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| ArchiveError::InvalidName {
                offset: frame_start,
            })?
            .to_owned();
        let payload_len = reader.read_u64()?;
        let payload = reader.take(payload_len)?.to_vec();
        entries.push(Entry { name, payload });
    }

    debug!(entries = entries.len(), bytes = blob.len(), "parsed archive");
    Ok(entries)
}

/// Pack several entries into one compressed file and back.
pub trait MultiFileArchiver {
    fn name(&self) -> String;

    fn file_extension(&self) -> String;

    /// Serialize then compress.
    fn pack(&self, entries: &[Entry], level: u32) -> Result<Vec<u8>, CodecError>;

    /// Decompress then parse.
    fn unpack(&self, data: &[u8]) -> Result<Vec<Entry>, AnalyzerError>;
}

/// Archive container compressed with a [`SingleBufferCodec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecArchiver<C> {
    codec: C,
}

/// The archive container over gzip, `Archive+Gzip`.
pub type GzipArchiver = CodecArchiver<GzipCodec>;

impl<C: SingleBufferCodec> CodecArchiver<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: SingleBufferCodec> MultiFileArchiver for CodecArchiver<C> {
    fn name(&self) -> String {
        format!("Archive+{}", self.codec.name())
    }

    fn file_extension(&self) -> String {
        format!(".tar{}", self.codec.file_extension())
    }

    fn pack(&self, entries: &[Entry], level: u32) -> Result<Vec<u8>, CodecError> {
        let blob = serialize(entries);
        self.codec.compress(&blob, level)
    }

    fn unpack(&self, data: &[u8]) -> Result<Vec<Entry>, AnalyzerError> {
        let blob = self.codec.decompress(data)?;
        Ok(parse(&blob)?)
    }
}
