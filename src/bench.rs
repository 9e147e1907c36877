//! Timed compression benchmarks and the batch driver around them.
//!
//! Each measured phase is bracketed by its own `Instant`, taken immediately
//! before and read immediately after the call it measures. Nothing else runs
//! inside a bracket.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::archive::{total_payload_len, CodecArchiver, Entry, MultiFileArchiver};
use crate::codec::{CodecError, GzipCodec, SingleBufferCodec};
use crate::config::{BenchConfig, BenchMode};
use crate::detect::{detect_content_category, ContentCategory};
use crate::error::FailureKind;
use crate::memory::MemoryProbe;
use crate::metrics::BenchmarkRecord;
use crate::stats::{micros, shannon_entropy, throughput};
use crate::AnalyzerError;

/// Compressed output of one timed call, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecRun {
    pub bytes: Vec<u8>,
    pub elapsed: Duration,
}

impl CodecRun {
    fn measure<E>(op: impl FnOnce() -> Result<Vec<u8>, E>) -> Result<Self, E> {
        let start = Instant::now();
        let result = op();
        let elapsed = start.elapsed();
        result.map(|bytes| Self { bytes, elapsed })
    }
}

/// Runs single-buffer and archive measurements with one codec.
pub struct CompressionBenchmark<C = GzipCodec> {
    archiver: CodecArchiver<C>,
    probe: MemoryProbe,
}

impl Default for CompressionBenchmark<GzipCodec> {
    fn default() -> Self {
        Self::new(GzipCodec)
    }
}

impl<C: SingleBufferCodec> CompressionBenchmark<C> {
    pub fn new(codec: C) -> Self {
        Self {
            archiver: CodecArchiver::new(codec),
            probe: MemoryProbe::new(),
        }
    }

    pub fn codec(&self) -> &C {
        self.archiver.codec()
    }

    /// Compress `data` once and report how long it took.
    pub fn compress_timed(&self, data: &[u8], level: u32) -> Result<CodecRun, CodecError> {
        let codec = self.archiver.codec();
        CodecRun::measure(|| codec.compress(data, level))
    }

    /// Time `compress` and `decompress` of one buffer.
    pub fn benchmark_single(
        &mut self,
        label: &str,
        data: &[u8],
        config: &BenchConfig,
    ) -> Result<BenchmarkRecord, AnalyzerError> {
        if data.is_empty() {
            return Err(AnalyzerError::EmptyInput(format!(
                "'{label}' has no bytes; ratio is undefined"
            )));
        }
        let CodecRun {
            bytes: compressed,
            elapsed: compress_time,
        } = self.compress_timed(data, config.level)?;
        let codec = self.archiver.codec();

        let start = Instant::now();
        let restored = codec.decompress(&compressed)?;
        let decompress_time = start.elapsed();

        if config.verify && restored != data {
            return Err(AnalyzerError::Verification(format!(
                "'{label}': decompressed {} bytes do not match the {} original bytes",
                restored.len(),
                data.len()
            )));
        }

        let original = data.len() as u64;
        let record = BenchmarkRecord {
            label: label.to_owned(),
            category: detect_content_category(data),
            algorithm: codec.name().to_owned(),
            level: config.level,
            ratio: compressed.len() as f64 / original as f64,
            entropy: shannon_entropy(data),
            compression_us: micros(compress_time),
            decompression_us: micros(decompress_time),
            compression_throughput: throughput(original, compress_time),
            decompression_throughput: throughput(original, decompress_time),
            original_size: original,
            compressed_size: compressed.len() as u64,
            entries: 1,
            memory_used: self.probe.resident_bytes(),
        };
        debug!(label, ratio = record.ratio, "single benchmark done");
        Ok(record)
    }

    /// Time serialize+compress and decompress+parse of a set of entries.
    ///
    /// The ratio baseline is the sum of payload lengths, so framing overhead
    /// counts against the compressed size. Entropy covers the first entry's
    /// payload only.
    pub fn benchmark_archive(
        &mut self,
        label: &str,
        entries: &[Entry],
        config: &BenchConfig,
    ) -> Result<BenchmarkRecord, AnalyzerError> {
        let original = total_payload_len(entries);
        if original == 0 {
            return Err(AnalyzerError::EmptyInput(format!(
                "'{label}' holds no payload bytes; ratio is undefined"
            )));
        }

        let archiver = &self.archiver;
        let CodecRun {
            bytes: packed,
            elapsed: compress_time,
        } = CodecRun::measure(|| archiver.pack(entries, config.level))?;

        let start = Instant::now();
        let restored = self.archiver.unpack(&packed)?;
        let decompress_time = start.elapsed();

        if config.verify && restored != entries {
            return Err(AnalyzerError::Verification(format!(
                "'{label}': unpacked {} entries differ from the {} packed entries",
                restored.len(),
                entries.len()
            )));
        }

        let representative = entries.first().map(Entry::payload).unwrap_or_default();
        let record = BenchmarkRecord {
            label: label.to_owned(),
            category: ContentCategory::Archive,
            algorithm: self.archiver.name(),
            level: config.level,
            ratio: packed.len() as f64 / original as f64,
            entropy: shannon_entropy(representative),
            compression_us: micros(compress_time),
            decompression_us: micros(decompress_time),
            compression_throughput: throughput(original, compress_time),
            decompression_throughput: throughput(original, decompress_time),
            original_size: original,
            compressed_size: packed.len() as u64,
            entries: entries.len(),
            memory_used: self.probe.resident_bytes(),
        };
        debug!(label, ratio = record.ratio, "archive benchmark done");
        Ok(record)
    }
}

/// Where batch inputs come from.
pub trait ByteSource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AnalyzerError>;
}

/// Reads inputs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ByteSource for FsSource {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, AnalyzerError> {
        crate::io_utils::read_bytes(path)
    }
}

/// Shared flag checked between batch items.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A batch item that produced no record.
#[derive(Debug)]
pub struct ItemFailure {
    pub label: String,
    /// `None` when the failure belongs to the packed archive as a whole.
    pub path: Option<PathBuf>,
    pub error: AnalyzerError,
}

impl ItemFailure {
    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }

    /// `name: this file could not be read (cannot access ...)`
    pub fn message(&self) -> String {
        format!("{}: {} ({})", self.label, self.kind().describe(), self.error)
    }
}

/// Everything a batch produced, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<BenchmarkRecord>,
    pub failures: Vec<ItemFailure>,
    /// The batch stopped early because its [`CancelFlag`] was set.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_total_failure(&self) -> bool {
        self.records.is_empty() && !self.failures.is_empty()
    }
}

/// Progress notification sent after each input is handled.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub done: usize,
    pub total: usize,
    pub label: &'a str,
    pub failed: bool,
}

/// Display label for an input path: its file name when it has one.
pub fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs a list of inputs through [`CompressionBenchmark`] one at a time.
///
/// A failing item is recorded in the report and the batch moves on.
pub struct BatchRunner<S, C = GzipCodec> {
    source: S,
    bench: CompressionBenchmark<C>,
    config: BenchConfig,
    cancel: CancelFlag,
}

impl<S: ByteSource> BatchRunner<S, GzipCodec> {
    pub fn gzip(source: S, config: BenchConfig) -> Self {
        Self::new(source, GzipCodec, config)
    }
}

impl<S: ByteSource, C: SingleBufferCodec> BatchRunner<S, C> {
    pub fn new(source: S, codec: C, config: BenchConfig) -> Self {
        Self {
            source,
            bench: CompressionBenchmark::new(codec),
            config,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Measure every path. Only an invalid config fails the whole call.
    pub fn run(
        &mut self,
        paths: &[PathBuf],
        mut on_progress: impl FnMut(Progress<'_>),
    ) -> Result<BatchReport, AnalyzerError> {
        self.config.validate()?;
        info!(
            inputs = paths.len(),
            mode = ?self.config.mode,
            level = self.config.level,
            "starting batch"
        );
        let report = match self.config.mode {
            BenchMode::Single => self.run_single(paths, &mut on_progress),
            BenchMode::Archive => self.run_archive(paths, &mut on_progress),
        };
        info!(
            records = report.records.len(),
            failures = report.failures.len(),
            cancelled = report.cancelled,
            "batch finished"
        );
        Ok(report)
    }

    fn run_single(
        &mut self,
        paths: &[PathBuf],
        on_progress: &mut impl FnMut(Progress<'_>),
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let config = self.config;
        for (i, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = paths.len() - i, "batch cancelled");
                report.cancelled = true;
                break;
            }
            let label = label_for(path);
            let result = self
                .source
                .read_bytes(path)
                .and_then(|data| self.bench.benchmark_single(&label, &data, &config));
            let failed = result.is_err();
            match result {
                Ok(record) => {
                    info!(file = %label, ratio = record.ratio, "benchmarked");
                    report.records.push(record);
                }
                Err(error) => {
                    warn!(file = %label, %error, "item failed");
                    report.failures.push(ItemFailure {
                        label: label.clone(),
                        path: Some(path.clone()),
                        error,
                    });
                }
            }
            on_progress(Progress {
                done: i + 1,
                total: paths.len(),
                label: &label,
                failed,
            });
        }
        report
    }

    fn run_archive(
        &mut self,
        paths: &[PathBuf],
        on_progress: &mut impl FnMut(Progress<'_>),
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut entries = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = paths.len() - i, "batch cancelled");
                report.cancelled = true;
                return report;
            }
            let label = label_for(path);
            let result = self
                .source
                .read_bytes(path)
                .and_then(|data| Entry::new(label.clone(), data).map_err(AnalyzerError::from));
            let failed = result.is_err();
            match result {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    warn!(file = %label, %error, "skipping input");
                    report.failures.push(ItemFailure {
                        label: label.clone(),
                        path: Some(path.clone()),
                        error,
                    });
                }
            }
            on_progress(Progress {
                done: i + 1,
                total: paths.len(),
                label: &label,
                failed,
            });
        }

        if entries.is_empty() {
            return report;
        }
        let label = format!("Archive ({} files)", entries.len());
        let config = self.config;
        match self.bench.benchmark_archive(&label, &entries, &config) {
            Ok(record) => {
                info!(archive = %label, ratio = record.ratio, "benchmarked");
                report.records.push(record);
            }
            Err(error) => {
                warn!(archive = %label, %error, "archive failed");
                report.failures.push(ItemFailure {
                    label,
                    path: None,
                    error,
                });
            }
        }
        report
    }
}

/// A batch running on its own thread.
pub struct BatchHandle {
    cancel: CancelFlag,
    handle: JoinHandle<Result<BatchReport, AnalyzerError>>,
}

impl BatchHandle {
    /// Ask the worker to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker. A panic in the worker is resumed on this thread.
    pub fn join(self) -> Result<BatchReport, AnalyzerError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Run a whole batch on a background thread.
///
/// The runner moves into the worker together with its codec, so no codec
/// state is shared between threads.
pub fn spawn_batch<S, C>(mut runner: BatchRunner<S, C>, paths: Vec<PathBuf>) -> BatchHandle
where
    S: ByteSource + Send + 'static,
    C: SingleBufferCodec + Send + 'static,
{
    let cancel = runner.cancel_flag();
    let handle = thread::spawn(move || runner.run(&paths, |_| {}));
    BatchHandle { cancel, handle }
}
