//! Parallel processing strategies

use nodeidw_core::{Error, Result};
use rayon::prelude::*;

/// Processing mode for batch work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Single-threaded processing on the calling thread
    Sequential,
    /// Parallel on a dedicated pool with the given number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Mode for a bounded pool of `workers` threads; one worker runs
    /// sequentially on the calling thread.
    pub fn for_workers(workers: usize) -> Result<Self> {
        match workers {
            0 => Err(Error::invalid_argument(
                "max_workers",
                workers,
                "must be at least 1",
            )),
            1 => Ok(ProcessingMode::Sequential),
            n => Ok(ProcessingMode::ParallelWith(n)),
        }
    }

    /// Upper bound on concurrently running tasks.
    pub fn max_workers(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::ParallelWith(n) => *n,
        }
    }

    fn pool(threads: usize) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("nodeidw-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))
    }
}

/// Strategy for parallel execution
pub trait ParallelStrategy {
    /// Map a function over indices and collect results in index order
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;
}

impl ParallelStrategy for ProcessingMode {
    fn par_map<T, F>(&self, range: std::ops::Range<usize>, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            ProcessingMode::Sequential => Ok(range.map(f).collect()),
            ProcessingMode::ParallelWith(threads) => {
                let pool = Self::pool(*threads)?;
                // One index per task so a slow file never holds others back
                Ok(pool.install(|| range.into_par_iter().with_max_len(1).map(f).collect()))
            }
        }
    }
}
