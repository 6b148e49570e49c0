//! # nodeidw Algorithms
//!
//! Spatial interpolation algorithms for nodeidw.
//!
//! ## Available Algorithms
//!
//! - **interpolation::kdtree**: static 3-D k-d tree with k-nearest queries
//! - **interpolation::idw**: k-nearest inverse distance weighting with
//!   near-coincidence snapping and small-value clamping

pub mod interpolation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        idw, idw_at, IdwParams, KdTree, Neighbor, DEFAULT_K, DEFAULT_SNAP_DISTANCE,
        DEFAULT_ZERO_THRESHOLD,
    };
    pub use nodeidw_core::prelude::*;
}
