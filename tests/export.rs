use compression_analyzer::export::{export_csv, export_json, json_report, write_csv, HEADERS};
use compression_analyzer::{
    BenchConfig, BenchMode, BenchmarkRecord, CompressionBenchmark, Summary,
};

fn records() -> Vec<BenchmarkRecord> {
    let mut bench = CompressionBenchmark::default();
    let config = BenchConfig::default();
    vec![
        bench
            .benchmark_single("a.txt", &b"aaaa".repeat(500), &config)
            .unwrap(),
        bench
            .benchmark_single("b, with comma.txt", &b"abcd".repeat(500), &config)
            .unwrap(),
    ]
}

#[test]
fn csv_has_header_and_one_row_per_record() {
    let mut out = Vec::new();
    write_csv(&mut out, &records()).unwrap();
    let mut rdr = csv::Reader::from_reader(&out[..]);
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, HEADERS);
    let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][0], "b, with comma.txt");
    assert_eq!(&rows[0][2], "Gzip (Level 6)");
}

#[test]
fn json_mirrors_headers() {
    let recs = records();
    let summary = Summary::from_records(&recs).unwrap();
    let config = BenchConfig::default().with_mode(BenchMode::Archive).with_level(3);
    let value = json_report(&recs, Some(&summary), Some(&config));
    assert_eq!(value["headers"].as_array().unwrap().len(), HEADERS.len());
    assert_eq!(value["data"][0]["File"], "a.txt");
    assert_eq!(value["data"][1]["Category"], "Text");
    assert_eq!(value["summary"]["total_original"], 4000);
    assert_eq!(value["config"]["mode"], "archive");
    assert_eq!(value["config"]["level"], 3);
    assert_eq!(value["config"]["verify"], true);
}

#[test]
fn files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let recs = records();
    let csv_path = dir.path().join("results.csv");
    let json_path = dir.path().join("results.json");
    export_csv(&csv_path, &recs).unwrap();
    export_json(&json_path, &recs, None, None).unwrap();

    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("File,Category,Algorithm,Ratio"));
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(value["data"].as_array().unwrap().len(), 2);
    assert!(value.get("summary").is_none());
    assert!(value.get("config").is_none());
}
