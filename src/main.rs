//! sumwalk - digest every file under a directory with a bounded worker pool.
//!
//! Usage:
//!   sumwalk [ROOT]                 SHA-256 of every file, one line per file
//!   sumwalk -j 8 [ROOT]            Use 8 digest workers
//!   sumwalk -a blake3 [ROOT]       Use BLAKE3 instead of SHA-256
//!   sumwalk --buffer [ROOT]        Hold output until the run finishes
//!   sumwalk --help                 Show help

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use sumwalk_core::{
    BufferedSink, DEFAULT_QUEUE_CAPACITY, DigestAlgorithm, OutputFormat, PipelineConfig,
    PipelineSummary, WriterSink,
};
use sumwalk_digest::Pipeline;

#[derive(Parser)]
#[command(
    name = "sumwalk",
    version,
    about = "Recursively digest every file under a directory",
    long_about = "sumwalk walks a directory tree once and streams each regular file \
                  through SHA-256 (or BLAKE3) on a pool of worker threads.\n\n\
                  Each file produces one line: `<digest>  <worker>  <path>`, or an \
                  `error ...` line if it could not be read."
)]
struct Cli {
    /// Directory to digest (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Number of digest workers (defaults to half the CPUs, at least 1)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Capacity of the work queue between the walker and the workers
    #[arg(short, long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Hash algorithm
    #[arg(short, long, default_value = "sha256")]
    algorithm: Algorithm,

    /// Buffer results in memory and print them after the run
    #[arg(short, long)]
    buffer: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: Format,

    /// Follow symbolic links to directories
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Maximum depth to descend
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Log unreadable directories and keep going instead of failing
    #[arg(long)]
    skip_walk_errors: bool,

    /// Verbose logging to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Algorithm {
    #[default]
    Sha256,
    Blake3,
}

impl From<Algorithm> for DigestAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Sha256 => DigestAlgorithm::Sha256,
            Algorithm::Blake3 => DigestAlgorithm::Blake3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    #[default]
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PipelineConfig::builder()
        .root(cli.root.clone())
        .workers(cli.workers.unwrap_or(0))
        .queue_capacity(cli.queue_capacity)
        .algorithm(DigestAlgorithm::from(cli.algorithm))
        .follow_symlinks(cli.follow_symlinks)
        .include_hidden(!cli.no_hidden)
        .max_depth(cli.max_depth)
        .skip_walk_errors(cli.skip_walk_errors)
        .build()?;

    let summary = run(Pipeline::new(config), cli.buffer, cli.format.into())?;
    print_summary(&summary);

    Ok(())
}

/// Install a stderr subscriber; digest output owns stdout.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run the pipeline into the chosen sink.
fn run(pipeline: Pipeline, buffer: bool, format: OutputFormat) -> Result<PipelineSummary> {
    let root = pipeline.config().root.display().to_string();

    if buffer {
        let sink = Arc::new(BufferedSink::with_format(format));
        let result = pipeline.run(sink.clone());

        // Print whatever was digested even if the walk failed part way.
        let mut stdout = io::stdout().lock();
        sink.drain_into(&mut stdout).context("Failed to write buffered results")?;

        return result.with_context(|| format!("Digest run failed for {root}"));
    }

    let sink = Arc::new(WriterSink::with_format(io::stdout(), format));
    let result = pipeline.run(sink.clone());
    sink.flush().context("Failed to flush results")?;

    result.with_context(|| format!("Digest run failed for {root}"))
}

/// Print the end-of-run summary line.
fn print_summary(summary: &PipelineSummary) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(
        stderr,
        "workers={} files={} failed={} bytes={} elapsed={:.2?} rate={}/s",
        summary.workers,
        summary.files_digested,
        summary.files_failed,
        humansize::format_size(summary.bytes_hashed, humansize::BINARY),
        summary.elapsed,
        humansize::format_size(summary.bytes_per_second() as u64, humansize::BINARY),
    );
    if summary.walk_errors > 0 {
        let _ = writeln!(stderr, "{} walk error(s) skipped", summary.walk_errors);
    }
}
