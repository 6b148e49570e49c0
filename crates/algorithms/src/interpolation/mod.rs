//! Spatial interpolation of scattered 3-D samples
//!
//! - k-d tree: static nearest-neighbor index over sample positions
//! - IDW: Inverse Distance Weighting over the k nearest samples

mod idw;
pub mod kdtree;

pub use idw::{
    clamp_small, idw, idw_at, idw_weight, IdwParams, DEFAULT_K, DEFAULT_POWER,
    DEFAULT_SNAP_DISTANCE, DEFAULT_ZERO_THRESHOLD,
};
pub use kdtree::{KdTree, Neighbor};
