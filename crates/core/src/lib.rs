//! # nodeidw Core
//!
//! Core types and I/O for the nodeidw interpolation toolkit.
//!
//! This crate provides:
//! - `Position`, `ScalarSample`, `SampleSet`: source samples of a scalar field
//! - `QueryPoint`, `InterpolationResult`: target points and their values
//! - `Error`: the shared error taxonomy
//! - Text I/O for source node files, query lists and result tables

pub mod error;
pub mod field;
pub mod io;

pub use error::{Error, Result};
pub use field::{InterpolationResult, Position, QueryPoint, SampleSet, ScalarSample};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::field::{InterpolationResult, Position, QueryPoint, SampleSet, ScalarSample};
}
