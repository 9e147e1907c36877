use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::AnalyzerError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Read a whole file into memory.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, AnalyzerError> {
    std::fs::read(path).map_err(|e| AnalyzerError::resource(path, e))
}

/// Write `data` to `path`, replacing any existing file.
pub fn write_bytes(path: &Path, data: &[u8]) -> Result<(), AnalyzerError> {
    std::fs::write(path, data).map_err(|e| AnalyzerError::resource(path, e))
}

/// `input` with its extension replaced by `suffix`; when that file exists a
/// counter is appended (`.gz1`, `.gz2`, ...) until the name is free.
pub fn unique_output_path(input: &Path, suffix: &str) -> PathBuf {
    let suffix = suffix.trim_start_matches('.');
    let candidate = input.with_extension(suffix);
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| input.with_extension(format!("{suffix}{n}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated or corrupted.",
        WriteZero => "Disk may be full. Free up space and try again.",
        Other if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn analyzer_cli_error(context: &str, err: AnalyzerError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for an error variant.
pub fn cli_hint(err: &AnalyzerError) -> String {
    use crate::AnalyzerError::*;
    match err {
        Codec(e) => format!("{e}. The data could not be compressed or decompressed."),
        MalformedArchive(e) => format!("{e}. The archive is corrupted, try recreating it."),
        EmptyInput(msg) => format!("{msg}. Nothing to measure."),
        Resource { path, source } => format_io_error("accessing", path, source),
        Verification(msg) => format!("{msg}. This is a bug."),
        Config(msg) => format!("{msg}. Invalid configuration."),
        Export(msg) => msg.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_bytes(&dir.path().join("nope.bin")).unwrap_err();
        assert!(matches!(err, AnalyzerError::Resource { .. }));
        assert!(cli_hint(&err).contains("Check that the file exists"));
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.txt");
        let first = unique_output_path(&input, ".gz");
        assert_eq!(first, dir.path().join("data.gz"));
        std::fs::write(&first, b"x").unwrap();
        assert_eq!(unique_output_path(&input, ".gz"), dir.path().join("data.gz1"));
    }
}
