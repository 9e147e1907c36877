use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::codec::CodecError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The compression library rejected the level or the stream.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A length field or name in an archive blob is invalid.
    #[error("malformed archive: {0}")]
    MalformedArchive(#[from] ArchiveError),

    /// An operation that needs bytes received none.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Reading or writing a file failed.
    #[error("cannot access '{}': {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decompressed output differs from the original input.
    #[error("round-trip verification failed: {0}")]
    Verification(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// Writing a CSV or JSON report failed.
    #[error("export error: {0}")]
    Export(String),
}

/// Coarse grouping used when reporting a failed batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FailureKind {
    /// The input could not be read.
    Unreadable,
    /// The input could not be compressed or decompressed.
    Codec,
    /// The archive is corrupted.
    CorruptArchive,
    /// The input holds no bytes.
    EmptyInput,
    Other,
}

impl FailureKind {
    /// One-line description for the user.
    pub fn describe(self) -> &'static str {
        match self {
            FailureKind::Unreadable => "this file could not be read",
            FailureKind::Codec => "this file could not be compressed/decompressed",
            FailureKind::CorruptArchive => "this archive is corrupted",
            FailureKind::EmptyInput => "this file is empty",
            FailureKind::Other => "this file could not be processed",
        }
    }
}

impl AnalyzerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalyzerError::Resource { .. } => FailureKind::Unreadable,
            AnalyzerError::Codec(_) | AnalyzerError::Verification(_) => FailureKind::Codec,
            AnalyzerError::MalformedArchive(_) => FailureKind::CorruptArchive,
            AnalyzerError::EmptyInput(_) => FailureKind::EmptyInput,
            AnalyzerError::Config(_) | AnalyzerError::Export(_) => FailureKind::Other,
        }
    }

    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalyzerError::Resource {
            path: path.into(),
            source,
        }
    }
}
