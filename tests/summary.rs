use compression_analyzer::{AnalyzerError, BenchmarkRecord, ContentCategory, Summary};

fn record(original: u64, compressed: u64, comp_us: u64, decomp_us: u64) -> BenchmarkRecord {
    BenchmarkRecord {
        label: format!("{original}.bin"),
        category: ContentCategory::Binary,
        algorithm: "Gzip".into(),
        level: 6,
        ratio: compressed as f64 / original as f64,
        entropy: 4.0,
        compression_us: comp_us,
        decompression_us: decomp_us,
        compression_throughput: original as f64 * 1e6 / comp_us as f64,
        decompression_throughput: original as f64 * 1e6 / decomp_us as f64,
        original_size: original,
        compressed_size: compressed,
        entries: 1,
        memory_used: 0,
    }
}

#[test]
fn totals_and_percent_saved() {
    let records = vec![record(1000, 400, 100, 50), record(2000, 1800, 300, 150)];
    let summary = Summary::from_records(&records).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total_original, 3000);
    assert_eq!(summary.total_compressed, 2200);
    assert!((summary.percent_saved - 26.666_666).abs() < 1e-3);
    assert!((summary.mean_ratio - 0.65).abs() < 1e-12);
    assert_eq!(summary.mean_compression_us, 200.0);
    assert_eq!(summary.mean_decompression_ms(), 0.1);
    assert_eq!(summary.mean_entropy, 4.0);
}

#[test]
fn empty_list_fails() {
    assert!(matches!(
        Summary::from_records(&[]),
        Err(AnalyzerError::EmptyInput(_))
    ));
}

#[test]
fn zero_original_total_fails() {
    let mut r = record(1000, 400, 100, 50);
    r.original_size = 0;
    assert!(matches!(
        Summary::from_records(&[r]),
        Err(AnalyzerError::EmptyInput(_))
    ));
}

#[test]
fn record_helpers() {
    let r = record(1000, 400, 1500, 500);
    assert_eq!(r.algorithm_label(), "Gzip (Level 6)");
    assert_eq!(r.compression_ms(), 1.5);
    assert!((r.space_saved_percent() - 60.0).abs() < 1e-9);
}
