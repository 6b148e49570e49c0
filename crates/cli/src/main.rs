//! nodeidw CLI - transfer mesh node fields onto query points by IDW

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nodeidw_algorithms::interpolation::{
    IdwParams, DEFAULT_K, DEFAULT_POWER, DEFAULT_SNAP_DISTANCE, DEFAULT_ZERO_THRESHOLD,
};
use nodeidw_core::io::{
    list_source_files, read_queries, read_samples, write_results, CsvResultWriter, SampleParse,
    SourceFilter, SourceFormat,
};
use nodeidw_core::QueryPoint;
use nodeidw_parallel::{run_one_file, BatchOptions, BatchRunner, DEFAULT_MAX_WORKERS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nodeidw")]
#[command(author, version, about = "Inverse distance weighted transfer of mesh node fields", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a source node file
    Info {
        /// Source node file
        input: PathBuf,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Interpolate one source file onto the query points
    Interpolate {
        /// Source node file
        input: PathBuf,
        /// Query point list (id x y z per line)
        queries: PathBuf,
        /// Output CSV file
        output: PathBuf,
        #[command(flatten)]
        idw: IdwArgs,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Interpolate every source file in a directory, in parallel
    Batch {
        /// Directory containing source node files
        data_dir: PathBuf,
        /// Query point list (id x y z per line)
        queries: PathBuf,
        /// Directory for the `<name>_results.csv` tables
        output_dir: PathBuf,
        /// Number of files processed concurrently
        #[arg(short, long, default_value_t = DEFAULT_MAX_WORKERS)]
        workers: usize,
        /// Only process files whose name starts with this
        #[arg(long, default_value = "")]
        prefix: String,
        /// Only process files whose name ends with this
        #[arg(long, default_value = ".txt")]
        suffix: String,
        #[command(flatten)]
        idw: IdwArgs,
        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(Args)]
struct IdwArgs {
    /// Number of nearest source nodes blended per query point
    #[arg(short, long, default_value_t = DEFAULT_K)]
    k: usize,
    /// Distance exponent of the weights
    #[arg(short, long, default_value_t = DEFAULT_POWER)]
    power: f64,
    /// Distance below which a source node's value is used directly
    #[arg(long, default_value_t = DEFAULT_SNAP_DISTANCE)]
    snap_distance: f64,
    /// Results with smaller magnitude are written as 0
    #[arg(long, default_value_t = DEFAULT_ZERO_THRESHOLD)]
    zero_threshold: f64,
}

impl From<&IdwArgs> for IdwParams {
    fn from(args: &IdwArgs) -> Self {
        IdwParams {
            k: args.k,
            power: args.power,
            snap_distance: args.snap_distance,
            zero_threshold: args.zero_threshold,
        }
    }
}

#[derive(Args)]
struct FormatArgs {
    /// Records start after the line containing this word
    #[arg(long, default_value = "nodenumber")]
    header_marker: String,
    /// Number of fields in a record line
    #[arg(long, default_value_t = 9)]
    columns: usize,
    /// 0-based field holding the scalar value
    #[arg(long, default_value_t = 8)]
    value_column: usize,
}

impl From<&FormatArgs> for SourceFormat {
    fn from(args: &FormatArgs) -> Self {
        SourceFormat {
            header_marker: args.header_marker.clone(),
            columns: args.columns,
            value_column: args.value_column,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn file_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

fn load_queries(path: &Path) -> Result<Vec<QueryPoint>> {
    let pb = spinner("Reading query points...")?;
    let queries = read_queries(path)
        .with_context(|| format!("Failed to read query points from {}", path.display()))?;
    pb.finish_and_clear();
    info!("Query points: {}", queries.len());
    Ok(queries)
}

fn load_samples(path: &Path, format: &SourceFormat) -> Result<SampleParse> {
    let pb = spinner("Reading source nodes...")?;
    let parsed = read_samples(path, format)
        .with_context(|| format!("Failed to read source nodes from {}", path.display()))?;
    pb.finish_and_clear();
    info!(
        "Source nodes: {} ({} malformed records skipped)",
        parsed.samples.len(),
        parsed.malformed.len()
    );
    Ok(parsed)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, format } => {
            let parsed = load_samples(&input, &SourceFormat::from(&format))?;
            let samples = &parsed.samples;

            println!("File: {}", input.display());
            println!("Nodes: {}", samples.len());
            println!("Malformed records: {}", parsed.malformed.len());
            for e in parsed.malformed.iter().take(10) {
                println!("  {}", e);
            }
            if let Some(b) = samples.bounds() {
                println!(
                    "Bounds: ({:.6}, {:.6}, {:.6}) - ({:.6}, {:.6}, {:.6})",
                    b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
                );
            }
            if let Some((min, max)) = samples.value_range() {
                println!("\nValues:");
                println!("  Min: {:.6}", min);
                println!("  Max: {:.6}", max);
            }
        }

        // ── Single file ──────────────────────────────────────────────
        Commands::Interpolate {
            input,
            queries,
            output,
            idw,
            format,
        } => {
            let queries = load_queries(&queries)?;
            let parsed = load_samples(&input, &SourceFormat::from(&format))?;
            let start = Instant::now();
            let results = run_one_file(&parsed.samples, &queries, &IdwParams::from(&idw))
                .with_context(|| format!("Failed to interpolate {}", input.display()))?;
            let elapsed = start.elapsed();

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            write_results(&output, &results).context("Failed to write output")?;
            done("Interpolated values", &output, elapsed);
        }

        // ── Batch ────────────────────────────────────────────────────
        Commands::Batch {
            data_dir,
            queries,
            output_dir,
            workers,
            prefix,
            suffix,
            idw,
            format,
        } => {
            let filter = SourceFilter { prefix, suffix };
            let files = list_source_files(&data_dir, &filter)
                .with_context(|| format!("Failed to list {}", data_dir.display()))?;
            if files.is_empty() {
                anyhow::bail!(
                    "No source files matching '{}*{}' in {}",
                    filter.prefix,
                    filter.suffix,
                    data_dir.display()
                );
            }
            let queries = load_queries(&queries)?;

            let runner = BatchRunner::new(BatchOptions {
                max_workers: workers,
                idw: IdwParams::from(&idw),
            })
            .context("Invalid batch options")?;
            let writer = CsvResultWriter::new(&output_dir);
            let format = SourceFormat::from(&format);

            let pb = file_bar(files.len())?;
            let start = Instant::now();
            let report = runner
                .run_files_with_progress(&files, &queries, &format, &writer, |path, _| {
                    if let Some(name) = path.file_name() {
                        pb.set_message(name.to_string_lossy().into_owned());
                    }
                    pb.inc(1);
                })
                .context("Batch run failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            println!(
                "Processed {} files: {} succeeded, {} failed",
                report.len(),
                report.succeeded(),
                report.len() - report.succeeded()
            );
            println!("  Results in: {}", writer.output_dir().display());
            println!("  Processing time: {:.2?}", elapsed);

            if !report.all_succeeded() {
                for (path, e) in report.failures() {
                    eprintln!("  FAILED {}: {}", path.display(), e);
                }
                anyhow::bail!(
                    "{} of {} files failed",
                    report.len() - report.succeeded(),
                    report.len()
                );
            }
        }
    }

    Ok(())
}
