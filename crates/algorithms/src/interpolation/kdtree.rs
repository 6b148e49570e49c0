//! 3D k-d tree for spatial indexing
//!
//! Provides O(log n) nearest-neighbor and k-nearest-neighbor queries
//! over scattered sample positions. Built once per sample set and never
//! modified afterwards.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use std::cmp::Ordering;

use nodeidw_core::{Error, Position, Result};
use serde::{Deserialize, Serialize};

/// A static 3D k-d tree over sample positions.
///
/// Sample indices returned by queries refer to the order of the slice the
/// tree was built from.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Copy of the input positions, in input order
    points: Vec<Position>,
}

#[derive(Debug, Clone)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension: 0 = x, 1 = y, 2 = z
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// One neighbor returned by a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Index of the sample in the build input
    pub index: usize,
    /// Euclidean distance to the query point
    pub distance: f64,
}

/// Candidate ordering: squared distance, then sample index.
#[inline]
fn precedes(a: (f64, usize), b: (f64, usize)) -> bool {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)) == Ordering::Less
}

impl KdTree {
    /// Build a k-d tree from sample positions.
    ///
    /// Construction is O(n log n) using median selection on the cycling
    /// split axis. The positions are copied.
    pub fn build(positions: &[Position]) -> Self {
        let points = positions.to_vec();
        let mut nodes = Vec::with_capacity(points.len());

        if !points.is_empty() {
            let mut indices: Vec<usize> = (0..points.len()).collect();
            build_recursive(&points, &mut indices, 0, &mut nodes);
        }

        Self { nodes, points }
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of sample `index`.
    pub fn position(&self, index: usize) -> Option<&Position> {
        self.points.get(index)
    }

    /// Find the single nearest sample to `point`.
    ///
    /// Returns `None` if the tree is empty. Equidistant samples resolve to
    /// the lowest index.
    pub fn nearest(&self, point: &Position) -> Option<Neighbor> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = Vec::with_capacity(2);
        self.knn_recursive(0, point, 1, &mut best);
        best.first().map(|&(dist_sq, index)| Neighbor {
            index,
            distance: dist_sq.sqrt(),
        })
    }

    /// Find the `k` nearest samples to `point`.
    ///
    /// Returns `min(k, len)` neighbors sorted by ascending distance; equal
    /// distances are ordered by ascending sample index, so the result is the
    /// same on every call. An empty tree gives an empty result.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `k` is 0.
    pub fn query(&self, point: &Position, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(Error::invalid_argument("k", k, "must be at least 1"));
        }
        if self.nodes.is_empty() {
            return Ok(Vec::new());
        }

        let k = k.min(self.points.len());
        // Ascending by (dist_sq, index); the last entry is the current k-th best
        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.knn_recursive(0, point, k, &mut best);

        Ok(best
            .into_iter()
            .map(|(dist_sq, index)| Neighbor {
                index,
                distance: dist_sq.sqrt(),
            })
            .collect())
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        point: &Position,
        k: usize,
        best: &mut Vec<(f64, usize)>,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];
        let candidate = (point.dist_sq(p), node.point_idx);

        if best.len() < k || precedes(candidate, best[best.len() - 1]) {
            let pos = best.partition_point(|&c| precedes(c, candidate));
            best.insert(pos, candidate);
            best.truncate(k);
        }

        let dim = node.split_dim as usize;
        let diff = point.coord(dim) - p.coord(dim);
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.knn_recursive(child, point, k, best);
        }

        let threshold = if best.len() >= k {
            best[best.len() - 1].0
        } else {
            f64::INFINITY
        };

        // `<=` keeps equidistant samples across the plane in play for the
        // index tie-break.
        if diff * diff <= threshold {
            if let Some(child) = second {
                self.knn_recursive(child, point, k, best);
            }
        }
    }
}

/// Recursively build the k-d tree over `indices`, returning the node index
/// of the subtree root.
fn build_recursive(
    points: &[Position],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let split_dim = (depth % 3) as u8;
    let dim = split_dim as usize;
    let median = indices.len() / 2;

    // Left of the median: coordinate <= median's, right: >=
    indices.select_nth_unstable_by(median, |&a, &b| {
        points[a].coord(dim).total_cmp(&points[b].coord(dim))
    });

    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx: indices[median],
        split_dim,
        left: None,
        right: None,
    });

    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    if !left.is_empty() {
        let left_idx = build_recursive(points, left, depth + 1, nodes);
        nodes[node_idx].left = Some(left_idx);
    }

    if !right.is_empty() {
        let right_idx = build_recursive(points, right, depth + 1, nodes);
        nodes[node_idx].right = Some(right_idx);
    }

    node_idx
}
