//! Scalar field data model
//!
//! - `Position`: a point in 3-D space
//! - `ScalarSample`: a source node carrying a known field value
//! - `SampleSet`: the ordered samples of one source file
//! - `QueryPoint` / `InterpolationResult`: target locations and their values

mod position;
mod sample_set;

pub use position::Position;
pub use sample_set::{Bounds, SampleSet};

use serde::{Deserialize, Serialize};

/// A source mesh node with a known scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarSample {
    pub id: i64,
    pub position: Position,
    pub value: f64,
}

impl ScalarSample {
    pub fn new(id: i64, position: Position, value: f64) -> Self {
        Self {
            id,
            position,
            value,
        }
    }
}

/// A target location that needs an interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub id: i64,
    pub position: Position,
}

impl QueryPoint {
    pub fn new(id: i64, position: Position) -> Self {
        Self { id, position }
    }
}

/// Interpolated value for one query point of one source file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationResult {
    pub query_id: i64,
    pub position: Position,
    pub value: f64,
}

impl InterpolationResult {
    /// Pair a query point with its interpolated value.
    pub fn for_query(query: &QueryPoint, value: f64) -> Self {
        Self {
            query_id: query.id,
            position: query.position,
            value,
        }
    }
}
