//! Compression benchmarking core.
//!
//! A small multi-file archive container ([`archive`]), a gzip codec over
//! flate2 ([`codec`]), and a benchmark driver ([`bench`]) that times both
//! directions and reports ratio, entropy and throughput ([`metrics`]).
//!
//! ```no_run
//! use compression_analyzer::{BenchConfig, CompressionBenchmark};
//!
//! let mut bench = CompressionBenchmark::default();
//! let data = std::fs::read("input.bin").unwrap();
//! let record = bench
//!     .benchmark_single("input.bin", &data, &BenchConfig::default())
//!     .unwrap();
//! println!("ratio {:.3}", record.ratio);
//! ```

pub mod archive;
pub mod bench;
pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod memory;
pub mod metrics;
pub mod stats;

pub use archive::{
    parse, serialize, total_payload_len, ArchiveError, CodecArchiver, Entry, GzipArchiver,
    MultiFileArchiver,
};
pub use bench::{
    spawn_batch, BatchHandle, BatchReport, BatchRunner, ByteSource, CancelFlag,
    CodecRun, CompressionBenchmark, FsSource, ItemFailure, Progress,
};
pub use codec::{gzip_bound, CodecError, GzipCodec, SingleBufferCodec};
pub use config::{BenchConfig, BenchMode};
pub use detect::{detect_content_category, ContentCategory};
pub use error::{AnalyzerError, FailureKind};
pub use metrics::{BenchmarkRecord, Summary};
pub use stats::{shannon_entropy, throughput};
