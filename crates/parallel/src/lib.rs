//! # nodeidw Parallel
//!
//! Parallel processing strategies for batch interpolation.
//!
//! This crate provides:
//! - `ProcessingMode`: sequential or bounded-pool execution
//! - `BatchRunner`: one independent task per source file on a bounded
//!   worker pool, with per-file failure isolation

pub mod batch;
pub mod strategy;

pub use batch::{
    run_one_file, BatchOptions, BatchReport, BatchRunner, FileOutcome, DEFAULT_MAX_WORKERS,
};
pub use strategy::{ParallelStrategy, ProcessingMode};
