//! Ordered sample collection for one source file

use serde::{Deserialize, Serialize};

use super::{Position, ScalarSample};

/// The samples parsed from one source file, in insertion order.
///
/// The position of a sample in this sequence is its row identity: the
/// position and value arrays derived from a `SampleSet` share that order, and
/// neighbor indices returned by the spatial index refer back to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<ScalarSample>,
}

/// Axis-aligned bounding box of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl SampleSet {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: ScalarSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScalarSample> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScalarSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[ScalarSample] {
        &self.samples
    }

    /// Sample positions, aligned with [`values`](Self::values).
    pub fn positions(&self) -> Vec<Position> {
        self.samples.iter().map(|s| s.position).collect()
    }

    /// Sample values, aligned with [`positions`](Self::positions).
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Bounding box of all sample positions, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.samples.first()?.position;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for s in &self.samples[1..] {
            let p = s.position;
            bounds.min = Position::new(
                bounds.min.x.min(p.x),
                bounds.min.y.min(p.y),
                bounds.min.z.min(p.z),
            );
            bounds.max = Position::new(
                bounds.max.x.max(p.x),
                bounds.max.y.max(p.y),
                bounds.max.z.max(p.z),
            );
        }
        Some(bounds)
    }

    /// Minimum and maximum sample value, `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|s| s.value);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl From<Vec<ScalarSample>> for SampleSet {
    fn from(samples: Vec<ScalarSample>) -> Self {
        Self { samples }
    }
}

impl FromIterator<ScalarSample> for SampleSet {
    fn from_iter<I: IntoIterator<Item = ScalarSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a ScalarSample;
    type IntoIter = std::slice::Iter<'a, ScalarSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> SampleSet {
        vec![
            ScalarSample::new(7, Position::new(1.0, -2.0, 3.0), 0.5),
            ScalarSample::new(3, Position::new(-4.0, 5.0, 0.0), -1.5),
            ScalarSample::new(9, Position::new(2.0, 0.0, -6.0), 4.0),
        ]
        .into()
    }

    #[test]
    fn test_positions_and_values_aligned() {
        let set = sample_set();
        let positions = set.positions();
        let values = set.values();
        assert_eq!(positions.len(), set.len());
        assert_eq!(values.len(), set.len());
        for (i, s) in set.iter().enumerate() {
            assert_eq!(positions[i], s.position);
            assert_eq!(values[i], s.value);
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set = sample_set();
        let ids: Vec<i64> = set.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[test]
    fn test_bounds() {
        let b = sample_set().bounds().unwrap();
        assert_eq!(b.min, Position::new(-4.0, -2.0, -6.0));
        assert_eq!(b.max, Position::new(2.0, 5.0, 3.0));
    }

    #[test]
    fn test_value_range() {
        assert_eq!(sample_set().value_range(), Some((-1.5, 4.0)));
    }

    #[test]
    fn test_empty() {
        let set = SampleSet::new();
        assert!(set.is_empty());
        assert!(set.bounds().is_none());
        assert!(set.value_range().is_none());
    }
}
