//! Batch interpolation of many source files against one query list
//!
//! Each source file is an independent task: load its samples, build a k-d
//! tree, interpolate every query point, hand the finished table to a sink.
//! Tasks run on a bounded worker pool and never share mutable state. A
//! failing file is recorded and the remaining files carry on; the batch
//! returns once every task has finished. A panic inside one task is caught
//! and recorded as that file's failure.

use std::any::Any;
use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use nodeidw_algorithms::interpolation::{idw, IdwParams};
use nodeidw_core::io::{read_samples, CsvResultWriter, SourceFormat};
use nodeidw_core::{Error, InterpolationResult, QueryPoint, Result, SampleSet};
use tracing::{debug, info, warn};

use crate::strategy::{ParallelStrategy, ProcessingMode};

/// Default size of the worker pool.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Options for a batch run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// Maximum number of files processed concurrently (default: 4)
    pub max_workers: usize,
    /// IDW parameters applied to every file
    pub idw: IdwParams,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            idw: IdwParams::default(),
        }
    }
}

/// Outcome of one file's task.
#[derive(Debug)]
pub struct FileOutcome<H> {
    pub file: H,
    /// Number of result rows handed to the sink, or why the file failed
    pub result: Result<usize>,
}

impl<H> FileOutcome<H> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of a batch, in input file order.
#[derive(Debug)]
pub struct BatchReport<H> {
    pub outcomes: Vec<FileOutcome<H>>,
}

impl<H> BatchReport<H> {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of files that completed.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Files that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&H, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.file, e)))
    }

    /// Whether every file completed.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_ok())
    }
}

/// Interpolate every query point from one file's samples.
///
/// One result per query point, in query order. Fails with
/// [`Error::NoSamples`] for an empty sample set.
pub fn run_one_file(
    samples: &SampleSet,
    queries: &[QueryPoint],
    params: &IdwParams,
) -> Result<Vec<InterpolationResult>> {
    idw(samples, queries, *params)
}

/// Runs per-file interpolation tasks on a bounded worker pool.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    params: IdwParams,
    mode: ProcessingMode,
}

impl BatchRunner {
    /// Create a runner; fails if `options` are invalid.
    pub fn new(options: BatchOptions) -> Result<Self> {
        options.idw.validate()?;
        Ok(Self {
            params: options.idw,
            mode: ProcessingMode::for_workers(options.max_workers)?,
        })
    }

    pub fn params(&self) -> &IdwParams {
        &self.params
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Process every file and wait for all of them.
    ///
    /// `load` produces a file's samples and `sink` receives its finished
    /// result table; neither is called concurrently for the same file. The
    /// outer `Result` only fails if the worker pool cannot be created.
    pub fn run<H, L, W>(
        &self,
        files: &[H],
        queries: &[QueryPoint],
        load: L,
        sink: W,
    ) -> Result<BatchReport<H>>
    where
        H: Clone + Debug + Send + Sync,
        L: Fn(&H) -> Result<SampleSet> + Sync + Send,
        W: Fn(&H, &[InterpolationResult]) -> Result<()> + Sync + Send,
    {
        self.run_with_progress(files, queries, load, sink, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress` as each file finishes.
    pub fn run_with_progress<H, L, W, P>(
        &self,
        files: &[H],
        queries: &[QueryPoint],
        load: L,
        sink: W,
        progress: P,
    ) -> Result<BatchReport<H>>
    where
        H: Clone + Debug + Send + Sync,
        L: Fn(&H) -> Result<SampleSet> + Sync + Send,
        W: Fn(&H, &[InterpolationResult]) -> Result<()> + Sync + Send,
        P: Fn(&H, &Result<usize>) + Sync + Send,
    {
        info!(
            "interpolating {} files x {} query points on up to {} workers",
            files.len(),
            queries.len(),
            self.mode.max_workers()
        );

        let outcomes = self.mode.par_map(0..files.len(), |i| {
            let file = &files[i];
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                self.run_file(file, queries, &load, &sink)
            }))
            .unwrap_or_else(|payload| Err(Error::TaskPanicked(panic_message(payload.as_ref()))));
            match &result {
                Ok(rows) => debug!("{:?}: {} rows", file, rows),
                Err(e) => warn!("{:?} failed: {}", file, e),
            }
            progress(file, &result);
            FileOutcome {
                file: file.clone(),
                result,
            }
        })?;

        let report = BatchReport { outcomes };
        info!(
            "batch finished: {} succeeded, {} failed",
            report.succeeded(),
            report.len() - report.succeeded()
        );
        Ok(report)
    }

    fn run_file<H, L, W>(&self, file: &H, queries: &[QueryPoint], load: &L, sink: &W) -> Result<usize>
    where
        L: Fn(&H) -> Result<SampleSet>,
        W: Fn(&H, &[InterpolationResult]) -> Result<()>,
    {
        let samples = load(file)?;
        let results = run_one_file(&samples, queries, &self.params)?;
        sink(file, &results)?;
        Ok(results.len())
    }

    /// Process source files on disk, writing one CSV table per file.
    pub fn run_files(
        &self,
        files: &[PathBuf],
        queries: &[QueryPoint],
        format: &SourceFormat,
        writer: &CsvResultWriter,
    ) -> Result<BatchReport<PathBuf>> {
        self.run_files_with_progress(files, queries, format, writer, |_, _| {})
    }

    /// Like [`run_files`](Self::run_files), calling `progress` as each file
    /// finishes.
    pub fn run_files_with_progress<P>(
        &self,
        files: &[PathBuf],
        queries: &[QueryPoint],
        format: &SourceFormat,
        writer: &CsvResultWriter,
        progress: P,
    ) -> Result<BatchReport<PathBuf>>
    where
        P: Fn(&PathBuf, &Result<usize>) + Sync + Send,
    {
        self.run_with_progress(
            files,
            queries,
            |path| read_samples(path, format).map(|parsed| parsed.samples),
            |path, results| {
                let written = writer.write(path, results)?;
                debug!("wrote {}", written.display());
                Ok(())
            },
            progress,
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
