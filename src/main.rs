use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use compression_analyzer::{
    bench::label_for,
    codec::DEFAULT_LEVEL,
    export::{export_csv, export_json},
    io_utils::{analyzer_cli_error, read_bytes, simple_cli_error, unique_output_path, write_bytes},
    AnalyzerError, BatchReport, BatchRunner, BenchConfig, BenchMode, Entry, FsSource, GzipArchiver,
    MultiFileArchiver, Summary,
};

/// Measure gzip compression of files, alone or packed into one archive.
#[derive(Parser)]
#[command(name = "compression-analyzer", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Benchmark compression and decompression of the given files
    Bench(BenchArgs),
    /// Pack files into one Archive+Gzip file
    Pack {
        /// Files to pack
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output path; defaults to the first file with a .tar.gz extension
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// gzip level 1..=9
        #[arg(short, long, default_value_t = DEFAULT_LEVEL)]
        level: u32,
    },
    /// Restore the files of an Archive+Gzip file
    Unpack {
        /// Archive to read
        archive: PathBuf,
        /// Directory to write the entries into
        #[arg(short = 'd', long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args)]
struct BenchArgs {
    /// Input files
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// gzip level 1..=9 (overrides --config)
    #[arg(short, long)]
    level: Option<u32>,
    /// Pack all inputs into one archive and measure that
    #[arg(long)]
    archive: bool,
    /// JSON config file with mode, level and verify
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip comparing the decompressed output with the input
    #[arg(long)]
    no_verify: bool,
    /// Write the results as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write the results as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli.command) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Bench(args) => bench(args),
        Command::Pack {
            files,
            output,
            level,
        } => pack(&files, output, level),
        Command::Unpack { archive, dir } => unpack(&archive, &dir),
    }
}

fn bench_config(args: &BenchArgs) -> Result<BenchConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_json_file(path)
            .map_err(|e| analyzer_cli_error("loading config", e))?,
        None => BenchConfig::default(),
    };
    if let Some(level) = args.level {
        config = config.with_level(level);
    }
    if args.archive {
        config = config.with_mode(BenchMode::Archive);
    }
    if args.no_verify {
        config = config.with_verify(false);
    }
    config
        .validate()
        .map_err(|e| analyzer_cli_error("invalid options", e))?;
    Ok(config)
}

fn bench(args: BenchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = bench_config(&args)?;

    let bar = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(args.files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("##-"),
        );
        bar
    };

    let mut runner = BatchRunner::gzip(FsSource, config);
    let report = runner
        .run(&args.files, |p| {
            bar.set_message(p.label.to_string());
            bar.set_position(p.done as u64);
        })
        .map_err(|e| analyzer_cli_error("benchmark failed", e))?;
    bar.finish_and_clear();

    print_report(&report);
    let summary = Summary::from_records(&report.records).ok();
    if let Some(summary) = &summary {
        print_summary(summary);
    }

    if let Some(path) = &args.csv {
        export_csv(path, &report.records).map_err(|e| analyzer_cli_error("exporting CSV", e))?;
        info!(path = %path.display(), "wrote CSV");
    }
    if let Some(path) = &args.json {
        export_json(path, &report.records, summary.as_ref(), Some(&config))
            .map_err(|e| analyzer_cli_error("exporting JSON", e))?;
        info!(path = %path.display(), "wrote JSON");
    }

    if report.is_total_failure() {
        return Err(simple_cli_error("no input could be benchmarked").into());
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!(
        "{:<32} {:<8} {:<20} {:>8} {:>8} {:>12} {:>12}",
        "File", "Category", "Algorithm", "Ratio", "Entropy", "Comp (ms)", "Decomp (ms)"
    );
    println!("{}", "-".repeat(106));
    for r in &report.records {
        println!(
            "{:<32} {:<8} {:<20} {:>8.4} {:>8.3} {:>12.3} {:>12.3}",
            r.label,
            r.category.label(),
            r.algorithm_label(),
            r.ratio,
            r.entropy,
            r.compression_ms(),
            r.decompression_ms()
        );
    }
    for r in &report.records {
        if r.category.is_compressed() && r.ratio >= 1.0 {
            eprintln!(
                "Note: {} is already {}-compressed; a ratio of {:.4} is expected.",
                r.label,
                r.category.label(),
                r.ratio
            );
        }
    }
    for failure in &report.failures {
        eprintln!("Error: {}", failure.message());
    }
    if report.cancelled {
        eprintln!("Batch cancelled before all inputs ran.");
    }
}

fn print_summary(summary: &Summary) {
    println!();
    println!("Average Compression Ratio: {:.4}", summary.mean_ratio);
    println!("Average Entropy: {:.3} bits/byte", summary.mean_entropy);
    println!(
        "Average Compression Time: {:.3} ms",
        summary.mean_compression_ms()
    );
    println!(
        "Average Decompression Time: {:.3} ms",
        summary.mean_decompression_ms()
    );
    println!(
        "Total: {} -> {} bytes ({:.2}% saved)",
        summary.total_original, summary.total_compressed, summary.percent_saved
    );
}

fn pack(
    files: &[PathBuf],
    output: Option<PathBuf>,
    level: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let archiver = GzipArchiver::default();
    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let data = read_bytes(path).map_err(|e| analyzer_cli_error("reading input", e))?;
        let entry = Entry::new(label_for(path), data)
            .map_err(|e| analyzer_cli_error("adding entry", e.into()))?;
        entries.push(entry);
    }
    let packed = archiver
        .pack(&entries, level)
        .map_err(|e| analyzer_cli_error("packing", e.into()))?;
    let output = output.unwrap_or_else(|| unique_output_path(&files[0], &archiver.file_extension()));
    write_bytes(&output, &packed).map_err(|e| analyzer_cli_error("writing archive", e))?;
    info!(
        entries = entries.len(),
        bytes = packed.len(),
        path = %output.display(),
        "packed archive"
    );
    println!("{}", output.display());
    Ok(())
}

fn unpack(archive: &Path, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_bytes(archive).map_err(|e| analyzer_cli_error("reading archive", e))?;
    let entries = GzipArchiver::default()
        .unpack(&data)
        .map_err(|e| analyzer_cli_error("unpacking", e))?;
    // Only plain file names are restored; anything with a path component
    // could escape `dir`. No file is written unless every name passes.
    if let Some(bad) = entries.iter().find(|e| {
        let name = Path::new(e.name());
        name.file_name() != Some(name.as_os_str())
    }) {
        return Err(simple_cli_error(&format!(
            "refusing to unpack entry '{}': not a plain file name",
            bad.name()
        ))
        .into());
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| analyzer_cli_error("creating output directory", AnalyzerError::resource(dir, e)))?;
    for entry in &entries {
        let target = dir.join(entry.name());
        write_bytes(&target, entry.payload())
            .map_err(|e| analyzer_cli_error("writing entry", e))?;
        println!("{}", target.display());
    }
    Ok(())
}
