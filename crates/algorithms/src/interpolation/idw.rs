//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates values at query points as a weighted average of the k nearest
//! sample points, where weights are inversely proportional to distance
//! raised to a power parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use nodeidw_core::{Error, InterpolationResult, Position, QueryPoint, Result, SampleSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::kdtree::KdTree;

/// Default number of nearest samples blended per query point.
pub const DEFAULT_K: usize = 4;
/// Default distance exponent; 1 gives plain `1 / d` weights.
pub const DEFAULT_POWER: f64 = 1.0;
/// Default distance below which a sample is taken as a direct hit.
pub const DEFAULT_SNAP_DISTANCE: f64 = 1e-6;
/// Default magnitude below which results are reported as exactly zero.
pub const DEFAULT_ZERO_THRESHOLD: f64 = 1e-3;

/// Parameters for IDW interpolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdwParams {
    /// Number of nearest samples to blend (default: 4).
    /// Clamped to the number of available samples.
    pub k: usize,
    /// Power parameter (default: 1.0).
    /// Higher values give more weight to nearby points.
    pub power: f64,
    /// If a sample is closer than this to the query point, its value is
    /// used directly (avoids the singularity at d = 0). Must be positive.
    pub snap_distance: f64,
    /// Results with magnitude below this are set to exactly 0.
    pub zero_threshold: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            power: DEFAULT_POWER,
            snap_distance: DEFAULT_SNAP_DISTANCE,
            zero_threshold: DEFAULT_ZERO_THRESHOLD,
        }
    }
}

impl IdwParams {
    /// Default parameters with a different neighbor count.
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::invalid_argument("k", self.k, "must be at least 1"));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::invalid_argument(
                "power",
                self.power,
                "must be finite and positive",
            ));
        }
        // Zero would let a coincident sample through to a 1/0 weight
        if !(self.snap_distance.is_finite() && self.snap_distance > 0.0) {
            return Err(Error::invalid_argument(
                "snap_distance",
                self.snap_distance,
                "must be finite and positive",
            ));
        }
        if !(self.zero_threshold.is_finite() && self.zero_threshold >= 0.0) {
            return Err(Error::invalid_argument(
                "zero_threshold",
                self.zero_threshold,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// IDW weight of a neighbor at `distance`.
#[inline]
pub fn idw_weight(distance: f64, power: f64) -> f64 {
    1.0 / distance.powf(power)
}

/// Report values with magnitude below `threshold` as exactly zero.
#[inline]
pub fn clamp_small(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

/// Interpolate a single point from a prebuilt index.
///
/// # Algorithm
///
/// With the `k` nearest samples sorted by distance:
///
/// ```text
/// if some d_i < snap_distance:  z = v_i   (first such neighbor only)
/// else:                         z = Σ(w_i * v_i) / Σ(w_i),  w_i = 1 / d_i^p
/// ```
///
/// Either way, `|z| < zero_threshold` yields exactly 0.
///
/// # Arguments
/// * `index` - k-d tree over the sample positions
/// * `values` - Sample values, aligned with the positions `index` was built from
/// * `point` - Query position
/// * `params` - IDW parameters
///
/// # Errors
/// * [`Error::NoSamples`] if the index is empty
/// * [`Error::InvalidArgument`] for invalid parameters, a non-finite query
///   position, or `values` not matching the index size
pub fn idw_at(index: &KdTree, values: &[f64], point: &Position, params: &IdwParams) -> Result<f64> {
    params.validate()?;
    if values.len() != index.len() {
        return Err(Error::invalid_argument(
            "values",
            values.len(),
            format!("expected one value per indexed sample ({})", index.len()),
        ));
    }
    if !point.is_finite() {
        return Err(Error::invalid_argument(
            "point",
            format!("{:?}", point),
            "coordinates must be finite",
        ));
    }

    let neighbors = index.query(point, params.k)?;
    if neighbors.is_empty() {
        return Err(Error::NoSamples);
    }

    if let Some(hit) = neighbors.iter().find(|n| n.distance < params.snap_distance) {
        return Ok(clamp_small(values[hit.index], params.zero_threshold));
    }

    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for n in &neighbors {
        let w = idw_weight(n.distance, params.power);
        sum_w += w;
        sum_wz += w * values[n.index];
    }

    let value = if sum_w == 0.0 { 0.0 } else { sum_wz / sum_w };
    Ok(clamp_small(value, params.zero_threshold))
}

/// Interpolate every query point from one sample set.
///
/// Builds a k-d tree over the samples once, then resolves the query points
/// sequentially. Results are in query order.
///
/// # Errors
/// [`Error::NoSamples`] if `samples` is empty, [`Error::InvalidArgument`]
/// if a sample has a non-finite position or value, otherwise any error from
/// [`idw_at`].
pub fn idw(
    samples: &SampleSet,
    queries: &[QueryPoint],
    params: IdwParams,
) -> Result<Vec<InterpolationResult>> {
    if samples.is_empty() {
        return Err(Error::NoSamples);
    }
    params.validate()?;
    if let Some(bad) = samples
        .iter()
        .find(|s| !(s.position.is_finite() && s.value.is_finite()))
    {
        return Err(Error::invalid_argument(
            "samples",
            format!("node {} at {:?} = {}", bad.id, bad.position, bad.value),
            "sample positions and values must be finite",
        ));
    }

    let index = KdTree::build(&samples.positions());
    let values = samples.values();
    debug!(
        "k-d tree over {} samples, {} query points, k = {}",
        index.len(),
        queries.len(),
        params.k.min(index.len())
    );

    queries
        .iter()
        .map(|q| {
            idw_at(&index, &values, &q.position, &params)
                .map(|value| InterpolationResult::for_query(q, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeidw_core::ScalarSample;

    fn sample(id: i64, x: f64, y: f64, z: f64, value: f64) -> ScalarSample {
        ScalarSample::new(id, Position::new(x, y, z), value)
    }

    fn corner_samples() -> SampleSet {
        vec![
            sample(1, 0.0, 0.0, 0.0, 10.0),
            sample(2, 10.0, 0.0, 0.0, 20.0),
            sample(3, 0.0, 10.0, 0.0, 30.0),
            sample(4, 0.0, 0.0, 10.0, 40.0),
            sample(5, 10.0, 10.0, 10.0, 50.0),
        ]
        .into()
    }

    fn interpolate(samples: &SampleSet, point: Position, params: &IdwParams) -> Result<f64> {
        let index = KdTree::build(&samples.positions());
        idw_at(&index, &samples.values(), &point, params)
    }

    #[test]
    fn test_exact_match_returns_sample_value() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 10.0), sample(2, 10.0, 0.0, 0.0, 0.0)].into();
        let v = interpolate(&samples, Position::ORIGIN, &IdwParams::with_k(2)).unwrap();
        assert_eq!(v, 10.0);
    }

    #[test]
    fn test_exact_match_every_sample() {
        let samples = corner_samples();
        for s in &samples {
            let v = interpolate(&samples, s.position, &IdwParams::default()).unwrap();
            assert_eq!(v, s.value);
        }
    }

    #[test]
    fn test_exact_match_small_value_clamped() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, -0.0009), sample(2, 1.0, 0.0, 0.0, 5.0)].into();
        let v = interpolate(&samples, Position::ORIGIN, &IdwParams::default()).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_negative_values_kept() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, -4.0), sample(2, 2.0, 0.0, 0.0, -4.0)].into();
        let v = interpolate(&samples, Position::new(1.0, 0.0, 0.0), &IdwParams::default())
            .unwrap();
        assert!((v + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average_below_threshold() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 0.0005), sample(2, 10.0, 0.0, 0.0, 0.0005)].into();
        let v = interpolate(&samples, Position::new(5.0, 0.0, 0.0), &IdwParams::with_k(2))
            .unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_threshold_boundary_is_kept() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 0.001), sample(2, 5.0, 0.0, 0.0, 0.0)].into();
        let v = interpolate(&samples, Position::ORIGIN, &IdwParams::default()).unwrap();
        assert_eq!(v, 0.001);
    }

    #[test]
    fn test_single_sample_with_large_k() {
        let samples: SampleSet = vec![sample(1, 0.0, 0.0, 0.0, 5.0)].into();
        let v = interpolate(&samples, Position::new(1.0, 0.0, 0.0), &IdwParams::with_k(4))
            .unwrap();
        assert_eq!(v, 5.0);
    }

    #[test]
    fn test_inverse_distance_weights() {
        // d = 1 and d = 3 → w = 1 and 1/3 → (1*4 + 8/3) / (4/3) = 5
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 4.0), sample(2, 4.0, 0.0, 0.0, 8.0)].into();
        let v = interpolate(&samples, Position::new(1.0, 0.0, 0.0), &IdwParams::with_k(2))
            .unwrap();
        assert!((v - 5.0).abs() < 1e-12, "got {}", v);
    }

    #[test]
    fn test_k_one_uses_nearest_only() {
        let samples = corner_samples();
        let v = interpolate(&samples, Position::new(9.0, 1.0, 0.0), &IdwParams::with_k(1))
            .unwrap();
        assert!((v - 20.0).abs() < 1e-12, "got {}", v);
    }

    #[test]
    fn test_k_clamped_to_sample_count() {
        let samples = corner_samples();
        let q = Position::new(3.0, 4.0, 2.0);
        let at_n = interpolate(&samples, q, &IdwParams::with_k(samples.len())).unwrap();
        let above_n = interpolate(&samples, q, &IdwParams::with_k(50)).unwrap();
        assert_eq!(at_n, above_n);
    }

    #[test]
    fn test_order_invariance() {
        let samples = corner_samples();
        let mut permuted: Vec<ScalarSample> = samples.as_slice().to_vec();
        permuted.reverse();
        permuted.swap(0, 2);
        let permuted: SampleSet = permuted.into();

        for q in [
            Position::new(3.0, 4.0, 2.0),
            Position::new(7.5, 1.0, 8.0),
            Position::new(-2.0, 6.0, 1.0),
        ] {
            for k in 1..=5 {
                let params = IdwParams::with_k(k);
                let a = interpolate(&samples, q, &params).unwrap();
                let b = interpolate(&permuted, q, &params).unwrap();
                assert_eq!(a, b, "query {:?}, k = {}", q, k);
            }
        }
    }

    #[test]
    fn test_snap_uses_first_close_neighbor_only() {
        // Both samples are 0.5 away; the lower index wins and is not blended
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 1.0), sample(2, 1.0, 0.0, 0.0, 3.0)].into();
        let params = IdwParams {
            k: 2,
            snap_distance: 0.6,
            ..Default::default()
        };
        let v = interpolate(&samples, Position::new(0.5, 0.0, 0.0), &params).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_snap_distance_is_strict() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 1.0), sample(2, 2.0, 0.0, 0.0, 3.0)].into();
        let params = IdwParams {
            k: 2,
            snap_distance: 0.5,
            ..Default::default()
        };
        // d = 0.5 and 1.5: no snap → (2*1 + 3*(2/3)) / (2 + 2/3) = 1.5
        let v = interpolate(&samples, Position::new(0.5, 0.0, 0.0), &params).unwrap();
        assert!((v - 1.5).abs() < 1e-12, "got {}", v);
    }

    #[test]
    fn test_overridable_threshold() {
        let samples: SampleSet = vec![sample(1, 0.0, 0.0, 0.0, 0.05)].into();
        let params = IdwParams {
            zero_threshold: 0.1,
            ..Default::default()
        };
        let v = interpolate(&samples, Position::new(1.0, 1.0, 1.0), &params).unwrap();
        assert_eq!(v, 0.0);

        let params = IdwParams {
            zero_threshold: 0.0,
            ..Default::default()
        };
        let v = interpolate(&samples, Position::new(1.0, 1.0, 1.0), &params).unwrap();
        assert!((v - 0.05).abs() < 1e-12, "got {}", v);
    }

    #[test]
    fn test_weight_monotonic_in_distance() {
        for power in [0.5, 1.0, 2.0, 3.0] {
            let mut prev = 0.0;
            for step in (1..=100).rev() {
                let w = idw_weight(step as f64 * 0.1, power);
                assert!(w >= prev, "power {}: weight decreased moving closer", power);
                prev = w;
            }
        }
    }

    #[test]
    fn test_moving_closer_increases_influence() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 10.0), sample(2, 10.0, 0.0, 0.0, 20.0)].into();
        let params = IdwParams::with_k(2);
        let mut prev = f64::MAX;
        for x in [6.0, 5.0, 4.0, 3.0, 2.0, 1.0] {
            let v = interpolate(&samples, Position::new(x, 1.0, 0.0), &params).unwrap();
            assert!(v <= prev, "value at x = {} rose to {}", x, v);
            prev = v;
        }
    }

    #[test]
    fn test_clamp_small() {
        assert_eq!(clamp_small(0.0009, 0.001), 0.0);
        assert_eq!(clamp_small(-0.0009, 0.001), 0.0);
        assert_eq!(clamp_small(-0.002, 0.001), -0.002);
        assert_eq!(clamp_small(0.001, 0.001), 0.001);
    }

    #[test]
    fn test_empty_index_is_no_samples() {
        let index = KdTree::build(&[]);
        let result = idw_at(&index, &[], &Position::ORIGIN, &IdwParams::default());
        assert!(matches!(result, Err(Error::NoSamples)));
    }

    #[test]
    fn test_k_zero_is_invalid() {
        let samples = corner_samples();
        let result = interpolate(&samples, Position::ORIGIN, &IdwParams::with_k(0));
        assert!(matches!(result, Err(Error::InvalidArgument { name: "k", .. })));
    }

    #[test]
    fn test_misaligned_values_rejected() {
        let samples = corner_samples();
        let index = KdTree::build(&samples.positions());
        let result = idw_at(&index, &[1.0, 2.0], &Position::ORIGIN, &IdwParams::default());
        assert!(matches!(result, Err(Error::InvalidArgument { name: "values", .. })));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = [
            IdwParams { power: 0.0, ..Default::default() },
            IdwParams { power: f64::NAN, ..Default::default() },
            IdwParams { snap_distance: -1.0, ..Default::default() },
            IdwParams { snap_distance: 0.0, ..Default::default() },
            IdwParams { zero_threshold: f64::INFINITY, ..Default::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{:?} should be rejected", params);
        }
        assert!(IdwParams::default().validate().is_ok());
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let samples = corner_samples();
        let result = interpolate(&samples, Position::new(f64::NAN, 0.0, 0.0), &IdwParams::default());
        assert!(matches!(result, Err(Error::InvalidArgument { name: "point", .. })));
    }

    #[test]
    fn test_idw_over_queries_keeps_order() {
        let samples = corner_samples();
        let queries = vec![
            QueryPoint::new(30, Position::new(0.0, 10.0, 0.0)),
            QueryPoint::new(10, Position::ORIGIN),
            QueryPoint::new(20, Position::new(4.0, 4.0, 4.0)),
        ];
        let results = idw(&samples, &queries, IdwParams::default()).unwrap();
        assert_eq!(results.len(), 3);
        let ids: Vec<i64> = results.iter().map(|r| r.query_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(results[0].value, 30.0);
        assert_eq!(results[1].value, 10.0);
        assert_eq!(results[2].position, Position::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn test_idw_empty_samples() {
        let queries = vec![QueryPoint::new(1, Position::ORIGIN)];
        let result = idw(&SampleSet::new(), &queries, IdwParams::default());
        assert!(matches!(result, Err(Error::NoSamples)));
    }

    #[test]
    fn test_zero_snap_distance_rejected_at_exact_hit() {
        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 10.0), sample(2, 10.0, 0.0, 0.0, 0.0)].into();
        let params = IdwParams {
            snap_distance: 0.0,
            ..IdwParams::with_k(2)
        };
        let result = interpolate(&samples, Position::ORIGIN, &params);
        assert!(matches!(
            result,
            Err(Error::InvalidArgument { name: "snap_distance", .. })
        ));

        // The smallest positive snap distance still resolves the exact hit
        let params = IdwParams {
            snap_distance: f64::MIN_POSITIVE,
            ..IdwParams::with_k(2)
        };
        assert_eq!(interpolate(&samples, Position::ORIGIN, &params).unwrap(), 10.0);
    }

    #[test]
    fn test_idw_rejects_non_finite_samples() {
        let queries = vec![QueryPoint::new(1, Position::new(5.5, 0.0, 0.0))];
        let mut samples: Vec<ScalarSample> =
            (0..20).map(|i| sample(i, i as f64, 0.0, 0.0, 1.0)).collect();
        samples.push(sample(99, f64::NAN, 0.0, 0.0, 99.0));
        let samples: SampleSet = samples.into();
        let result = idw(&samples, &queries, IdwParams::with_k(50));
        assert!(matches!(result, Err(Error::InvalidArgument { name: "samples", .. })));

        let samples: SampleSet =
            vec![sample(1, 0.0, 0.0, 0.0, 1.0), sample(2, 1.0, 0.0, 0.0, f64::INFINITY)].into();
        let result = idw(&samples, &queries, IdwParams::default());
        assert!(matches!(result, Err(Error::InvalidArgument { name: "samples", .. })));
    }
}
