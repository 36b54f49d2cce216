//! Grouping contours by elevation.
//!
//! Every stage works on one elevation bucket at a time and buckets never
//! exchange contours, so a bucket is the unit of independent work.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::contour::Contour;

/// Elevation used as an ordered map key.
///
/// Ordering is IEEE total order, so equal elevations from different
/// tiles land in the same bucket and iteration runs from lowest to
/// highest. Built through [`ElevationKey::new`], which folds `-0.0` into
/// `0.0`.
#[derive(Debug, Clone, Copy)]
struct ElevationKey(f64);

impl ElevationKey {
    fn new(elevation: f64) -> Self {
        if elevation == 0.0 {
            Self(0.0)
        } else {
            Self(elevation)
        }
    }
}

impl PartialEq for ElevationKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ElevationKey {}

impl PartialOrd for ElevationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ElevationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Contours grouped by exact elevation, ordered low to high.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationBuckets {
    buckets: BTreeMap<ElevationKey, Vec<Contour>>,
}

impl ElevationBuckets {
    /// Create an empty set of buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contour to the bucket for its elevation.
    pub fn insert(&mut self, contour: Contour) {
        self.buckets
            .entry(ElevationKey::new(contour.elevation()))
            .or_default()
            .push(contour);
    }

    /// Replace the contents of the bucket at `elevation`.
    ///
    /// An empty `contours` removes the bucket.
    pub fn set_bucket(&mut self, elevation: f64, contours: Vec<Contour>) {
        if contours.is_empty() {
            self.buckets.remove(&ElevationKey::new(elevation));
        } else {
            self.buckets.insert(ElevationKey::new(elevation), contours);
        }
    }

    /// Contours at `elevation`, if any.
    #[must_use]
    pub fn get(&self, elevation: f64) -> Option<&[Contour]> {
        self.buckets
            .get(&ElevationKey::new(elevation))
            .map(Vec::as_slice)
    }

    /// Number of distinct elevations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of contours across all buckets.
    #[must_use]
    pub fn contour_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Elevations present, lowest first.
    pub fn elevations(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.keys().map(|k| k.0)
    }

    /// Iterate `(elevation, contours)` pairs, lowest elevation first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[Contour])> {
        self.buckets.iter().map(|(k, v)| (k.0, v.as_slice()))
    }

}

impl IntoIterator for ElevationBuckets {
    type Item = (f64, Vec<Contour>);
    type IntoIter = std::vec::IntoIter<(f64, Vec<Contour>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets
            .into_iter()
            .map(|(k, v)| (k.0, v))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl FromIterator<Contour> for ElevationBuckets {
    fn from_iter<I: IntoIterator<Item = Contour>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for contour in iter {
            buckets.insert(contour);
        }
        buckets
    }
}

impl Extend<Contour> for ElevationBuckets {
    fn extend<I: IntoIterator<Item = Contour>>(&mut self, iter: I) {
        for contour in iter {
            self.insert(contour);
        }
    }
}
