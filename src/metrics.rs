//! Benchmark result records and their aggregation.

use serde::Serialize;

use crate::detect::ContentCategory;
use crate::stats::to_mib_per_sec;
use crate::AnalyzerError;

/// One measured row. Built once by the benchmark and then only read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    /// File name, or `Archive (N files)` in archive mode.
    pub label: String,
    pub category: ContentCategory,
    /// Algorithm name without parameters, e.g. `Gzip`.
    pub algorithm: String,
    pub level: u32,
    /// `compressed_size / original_size`; below 1.0 means the input shrank.
    pub ratio: f64,
    /// Bits per byte of the measured buffer, `0.0..=8.0`.
    pub entropy: f64,
    pub compression_us: u64,
    pub decompression_us: u64,
    /// Original bytes per second of compression time.
    pub compression_throughput: f64,
    /// Original bytes per second of decompression time.
    pub decompression_throughput: f64,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Number of inputs the record covers.
    pub entries: usize,
    /// Resident memory of the process after the measurement, in bytes.
    pub memory_used: u64,
}

impl BenchmarkRecord {
    /// `Gzip (Level 6)`
    pub fn algorithm_label(&self) -> String {
        format!("{} (Level {})", self.algorithm, self.level)
    }

    pub fn compression_ms(&self) -> f64 {
        self.compression_us as f64 / 1000.0
    }

    pub fn decompression_ms(&self) -> f64 {
        self.decompression_us as f64 / 1000.0
    }

    pub fn compression_mib_per_sec(&self) -> f64 {
        to_mib_per_sec(self.compression_throughput)
    }

    pub fn decompression_mib_per_sec(&self) -> f64 {
        to_mib_per_sec(self.decompression_throughput)
    }

    /// Percentage of the original size removed by compression.
    pub fn space_saved_percent(&self) -> f64 {
        (1.0 - self.ratio) * 100.0
    }
}

/// Means and totals over a list of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_ratio: f64,
    pub mean_entropy: f64,
    pub mean_compression_us: f64,
    pub mean_decompression_us: f64,
    pub mean_compression_throughput: f64,
    pub mean_decompression_throughput: f64,
    pub total_original: u64,
    pub total_compressed: u64,
    /// `(1 - total_compressed / total_original) * 100`
    pub percent_saved: f64,
}

impl Summary {
    /// Aggregate `records`. Fails on an empty list or a zero original total
    /// instead of producing NaN.
    pub fn from_records(records: &[BenchmarkRecord]) -> Result<Self, AnalyzerError> {
        if records.is_empty() {
            return Err(AnalyzerError::EmptyInput("no records to summarize".into()));
        }
        let total_original: u64 = records.iter().map(|r| r.original_size).sum();
        if total_original == 0 {
            return Err(AnalyzerError::EmptyInput(
                "records cover zero original bytes".into(),
            ));
        }
        let total_compressed: u64 = records.iter().map(|r| r.compressed_size).sum();
        let n = records.len() as f64;
        let mean = |f: fn(&BenchmarkRecord) -> f64| records.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            count: records.len(),
            mean_ratio: mean(|r| r.ratio),
            mean_entropy: mean(|r| r.entropy),
            mean_compression_us: mean(|r| r.compression_us as f64),
            mean_decompression_us: mean(|r| r.decompression_us as f64),
            mean_compression_throughput: mean(|r| r.compression_throughput),
            mean_decompression_throughput: mean(|r| r.decompression_throughput),
            total_original,
            total_compressed,
            percent_saved: (1.0 - total_compressed as f64 / total_original as f64) * 100.0,
        })
    }

    pub fn mean_compression_ms(&self) -> f64 {
        self.mean_compression_us / 1000.0
    }

    pub fn mean_decompression_ms(&self) -> f64 {
        self.mean_decompression_us / 1000.0
    }
}
