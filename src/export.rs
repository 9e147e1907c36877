//! CSV and JSON reports of benchmark records.
//!
//! Both formats share [`HEADERS`]. The JSON layout is
//! `{"headers": [...], "data": [{header: value, ...}], "summary": {...}, "config": {...}}`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::config::BenchConfig;
use crate::metrics::{BenchmarkRecord, Summary};
use crate::AnalyzerError;

pub const HEADERS: [&str; 12] = [
    "File",
    "Category",
    "Algorithm",
    "Ratio",
    "Entropy (bits/byte)",
    "Compression Time (ms)",
    "Decompression Time (ms)",
    "Compression Throughput (MiB/s)",
    "Decompression Throughput (MiB/s)",
    "Original Size",
    "Compressed Size",
    "Memory Used (KB)",
];

/// One record as display strings, in [`HEADERS`] order.
pub fn record_row(r: &BenchmarkRecord) -> [String; 12] {
    [
        r.label.clone(),
        r.category.label().to_string(),
        r.algorithm_label(),
        format!("{:.6}", r.ratio),
        format!("{:.6}", r.entropy),
        format!("{:.3}", r.compression_ms()),
        format!("{:.3}", r.decompression_ms()),
        format!("{:.3}", r.compression_mib_per_sec()),
        format!("{:.3}", r.decompression_mib_per_sec()),
        r.original_size.to_string(),
        r.compressed_size.to_string(),
        format!("{:.1}", r.memory_used as f64 / 1024.0),
    ]
}

fn create(path: &Path) -> Result<BufWriter<File>, AnalyzerError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AnalyzerError::resource(path, e))
}

/// Write records as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, records: &[BenchmarkRecord]) -> Result<(), AnalyzerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)
        .map_err(|e| AnalyzerError::Export(e.to_string()))?;
    for r in records {
        wtr.write_record(record_row(r))
            .map_err(|e| AnalyzerError::Export(e.to_string()))?;
    }
    wtr.flush()
        .map_err(|e| AnalyzerError::Export(e.to_string()))
}

pub fn export_csv(path: &Path, records: &[BenchmarkRecord]) -> Result<(), AnalyzerError> {
    write_csv(create(path)?, records)
}

/// Build the JSON report value. `summary` and `config` are omitted when absent.
pub fn json_report(
    records: &[BenchmarkRecord],
    summary: Option<&Summary>,
    config: Option<&BenchConfig>,
) -> Value {
    let data: Vec<Value> = records
        .iter()
        .map(|r| {
            let row: Map<String, Value> = HEADERS
                .iter()
                .zip(record_row(r))
                .map(|(h, v)| (h.to_string(), Value::String(v)))
                .collect();
            Value::Object(row)
        })
        .collect();
    let mut report = json!({
        "headers": HEADERS,
        "data": data,
    });
    if let Some(summary) = summary {
        report["summary"] = json!(summary);
    }
    if let Some(config) = config {
        report["config"] = json!(config);
    }
    report
}

pub fn export_json(
    path: &Path,
    records: &[BenchmarkRecord],
    summary: Option<&Summary>,
    config: Option<&BenchConfig>,
) -> Result<(), AnalyzerError> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, &json_report(records, summary, config))
        .map_err(|e| AnalyzerError::Export(e.to_string()))?;
    out.write_all(b"\n")
        .and_then(|_| out.flush())
        .map_err(|e| AnalyzerError::resource(path, e))
}
