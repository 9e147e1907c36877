use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};
use crate::AnalyzerError;

/// How a batch of inputs is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchMode {
    /// One record per input file.
    #[default]
    Single,
    /// All inputs packed into one archive, one record.
    Archive,
}

/// Parameters for one benchmark run. Passed by value into every call; nothing
/// is read from shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Single-file or archive measurement.
    pub mode: BenchMode,
    /// gzip level, 1 (fastest) to 9 (smallest).
    pub level: u32,
    /// Compare the decompressed output with the input.
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            mode: BenchMode::Single,
            level: DEFAULT_LEVEL,
            verify: true,
        }
    }
}

impl BenchConfig {
    pub fn with_mode(mut self, mode: BenchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(AnalyzerError::Config(format!(
                "level {} out of range {MIN_LEVEL}..={MAX_LEVEL}",
                self.level
            )));
        }
        Ok(())
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AnalyzerError> {
        let data = crate::io_utils::read_bytes(path)?;
        let config: Self = serde_json::from_slice(&data)
            .map_err(|e| AnalyzerError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }
}
