//! Contour combining: stitch fragments that share an endpoint into maximal
//! contours.
//!
//! Fragments are clipped wherever a contour crossed a tile edge. Within
//! one elevation bucket, a fragment whose end lies off the boundary must
//! continue in some other fragment whose matching end lies within `eps`.
//! The combiner repeatedly takes an incomplete contour and extends it,
//! fixing the start before the end, by absorbing the fragment whose
//! opposite endpoint is nearest. Nearest means minimum Euclidean
//! distance; ties go to the fragment seen first.
//!
//! A contour that cannot be extended within `eps` is a data-quality
//! problem for that contour only. It is reported and the rest of the
//! bucket carries on.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::bucket::ElevationBuckets;
use crate::contour::Contour;
use crate::diagnostics::UnresolvedContour;
use crate::types::{ContourError, Point};

/// What to do with a contour that could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnresolvedPolicy {
    /// Drop it from the output. Its points are still reported in
    /// diagnostics.
    #[default]
    Exclude,
    /// Keep its best-effort extension in the output so the closer can
    /// try it.
    Keep,
}

/// Result of combining one elevation bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketCombine {
    /// Complete contours, plus unresolved ones under
    /// [`UnresolvedPolicy::Keep`].
    pub contours: Vec<Contour>,
    /// Contours that could not be completed.
    pub unresolved: Vec<UnresolvedContour>,
}

/// Result of combining every bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Combined {
    /// Combined contours by elevation.
    pub buckets: ElevationBuckets,
    /// Contours that could not be completed, in bucket order.
    pub unresolved: Vec<UnresolvedContour>,
}

/// Stitches fragments against a fixed bounding box.
#[derive(Debug, Clone, Copy)]
pub struct ContourCombiner {
    bbox: BoundingBox,
    policy: UnresolvedPolicy,
}

impl ContourCombiner {
    /// Create a combiner for `bbox`.
    #[must_use]
    pub const fn new(bbox: BoundingBox, policy: UnresolvedPolicy) -> Self {
        Self { bbox, policy }
    }

    /// Combine every bucket independently.
    #[must_use = "returns the combined contours"]
    pub fn combine(&self, buckets: ElevationBuckets) -> Combined {
        let mut combined = Combined::default();
        for (elevation, fragments) in buckets {
            let BucketCombine {
                contours,
                mut unresolved,
            } = self.combine_bucket(elevation, fragments);
            combined.buckets.set_bucket(elevation, contours);
            combined.unresolved.append(&mut unresolved);
        }
        combined
    }

    /// Combine the fragments of a single elevation bucket.
    #[must_use = "returns the combined contours"]
    pub fn combine_bucket(&self, elevation: f64, fragments: Vec<Contour>) -> BucketCombine {
        let (mut contours, incomplete): (Vec<Contour>, Vec<Contour>) = fragments
            .into_iter()
            .partition(|c| c.is_complete(&self.bbox));
        let mut pool: VecDeque<Contour> = incomplete.into();
        let mut unresolved = Vec::new();

        while let Some(mut current) = pool.pop_front() {
            match self.extend(&mut current, &mut pool) {
                Ok(()) => contours.push(current),
                Err(error) => {
                    log::warn!(
                        "elevation {elevation}: contour {} left incomplete: {error}",
                        current.id()
                    );
                    let record = UnresolvedContour {
                        id: current.id().to_string(),
                        elevation,
                        error,
                        points: current.points().to_vec(),
                        kept: self.policy == UnresolvedPolicy::Keep,
                    };
                    unresolved.push(record);
                    if self.policy == UnresolvedPolicy::Keep {
                        contours.push(current);
                    }
                }
            }
        }

        BucketCombine {
            contours,
            unresolved,
        }
    }

    /// Extend `current` from the pool until it is complete.
    fn extend(
        &self,
        current: &mut Contour,
        pool: &mut VecDeque<Contour>,
    ) -> Result<(), ContourError> {
        while !current.is_complete(&self.bbox) {
            if !self.bbox.is_boundary_point(current.start()) {
                let matched = self.take_nearest(current, pool, current.start(), Contour::end)?;
                current.stitch_before(matched);
            } else if !self.bbox.is_boundary_point(current.end()) {
                let matched = self.take_nearest(current, pool, current.end(), Contour::start)?;
                current.stitch_after(matched);
            } else {
                return Err(ContourError::MalformedInput {
                    id: current.id().to_string(),
                    reason: "both ends on boundary but contour is not complete".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Remove and return the pool contour whose `endpoint` is nearest to
    /// `target`, if it is within tolerance.
    fn take_nearest(
        &self,
        current: &Contour,
        pool: &mut VecDeque<Contour>,
        target: Point,
        endpoint: fn(&Contour) -> Point,
    ) -> Result<Contour, ContourError> {
        let Some((index, distance)) = nearest(pool, target, endpoint) else {
            return Err(ContourError::UnresolvableContour {
                id: current.id().to_string(),
                distance: None,
            });
        };
        if distance > self.bbox.eps() {
            return Err(ContourError::UnresolvableContour {
                id: current.id().to_string(),
                distance: Some(distance),
            });
        }
        pool.remove(index)
            .ok_or_else(|| ContourError::UnresolvableContour {
                id: current.id().to_string(),
                distance: None,
            })
    }
}

/// Index and distance of the pool contour whose `endpoint` is nearest to
/// `target`. The first of several equally near contours wins.
fn nearest(
    pool: &VecDeque<Contour>,
    target: Point,
    endpoint: fn(&Contour) -> Point,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in pool.iter().enumerate() {
        let distance = endpoint(candidate).distance(target);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(0.0, 10.0, 0.0, 10.0, 1e-6).unwrap()
    }

    fn combiner() -> ContourCombiner {
        ContourCombiner::new(unit_box(), UnresolvedPolicy::Exclude)
    }

    fn contour(id: &str, points: &[(f64, f64)]) -> Contour {
        Contour::new(
            id,
            100.0,
            points.iter().map(|&(lat, lon)| Point::new(lat, lon)).collect(),
        )
        .unwrap()
    }

    fn coords(c: &Contour) -> Vec<(f64, f64)> {
        c.points().iter().map(|p| (p.lat, p.lon)).collect()
    }

    #[test]
    fn complete_fragments_pass_through() {
        let span = contour("span", &[(10.0, 3.0), (5.0, 5.0), (0.0, 4.0)]);
        let result = combiner().combine_bucket(100.0, vec![span.clone()]);
        assert_eq!(result.contours, vec![span]);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn shared_endpoint_is_kept_once() {
        // A leaves the north edge and stops inside; B picks up there.
        let a = contour("a", &[(10.0, 3.0), (8.0, 3.0), (6.0, 4.0)]);
        let b = contour("b", &[(6.0, 4.0), (4.0, 5.0), (0.0, 5.0)]);
        let result = combiner().combine_bucket(100.0, vec![a, b]);
        assert_eq!(result.contours.len(), 1);
        assert_eq!(
            coords(&result.contours[0]),
            [(10.0, 3.0), (8.0, 3.0), (6.0, 4.0), (4.0, 5.0), (0.0, 5.0)]
        );
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn start_is_extended_before_end() {
        // Middle piece has both ends inside; it is taken first and grows
        // backwards onto `head`, then forwards onto `tail`.
        let middle = contour("middle", &[(6.0, 3.0), (5.0, 5.0), (4.0, 7.0)]);
        let head = contour("head", &[(10.0, 2.0), (6.0, 3.0)]);
        let tail = contour("tail", &[(4.0, 7.0), (4.0, 10.0)]);
        let result = combiner().combine_bucket(100.0, vec![middle, tail, head]);
        assert_eq!(result.contours.len(), 1);
        let merged = &result.contours[0];
        assert_eq!(merged.id(), "middle");
        assert_eq!(
            coords(merged),
            [(10.0, 2.0), (6.0, 3.0), (5.0, 5.0), (4.0, 7.0), (4.0, 10.0)]
        );
    }

    #[test]
    fn near_miss_within_tolerance_is_stitched() {
        let a = contour("a", &[(10.0, 3.0), (6.0, 4.0)]);
        let b = contour("b", &[(6.0, 4.000_000_5), (0.0, 5.0)]);
        let result = combiner().combine_bucket(100.0, vec![a, b]);
        assert_eq!(result.contours.len(), 1);
        assert_eq!(result.contours[0].len(), 3);
    }

    #[test]
    fn interior_loop_from_two_fragments_closes() {
        let a = contour("a", &[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]);
        let b = contour("b", &[(6.0, 6.0), (5.0, 6.0), (5.0, 5.0)]);
        let result = combiner().combine_bucket(100.0, vec![a, b]);
        assert_eq!(result.contours.len(), 1);
        assert!(result.contours[0].is_closed(&unit_box()));
        assert_eq!(result.contours[0].len(), 5);
    }

    #[test]
    fn far_apart_fragments_are_both_unresolved() {
        let a = contour("a", &[(10.0, 3.0), (6.0, 4.0)]);
        let b = contour("b", &[(6.0, 4.5), (0.0, 5.0)]);
        let result = combiner().combine_bucket(100.0, vec![a, b]);
        assert!(result.contours.is_empty());
        let ids: Vec<&str> = result.unresolved.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(matches!(
            result.unresolved[0].error,
            ContourError::UnresolvableContour {
                distance: Some(d),
                ..
            } if (d - 0.5).abs() < 1e-9
        ));
        // The last one ran out of candidates.
        assert!(matches!(
            result.unresolved[1].error,
            ContourError::UnresolvableContour { distance: None, .. }
        ));
        assert_eq!(result.unresolved[0].points.len(), 2);
    }

    #[test]
    fn keep_policy_forwards_unresolved_contours() {
        let a = contour("a", &[(10.0, 3.0), (6.0, 4.0)]);
        let result = ContourCombiner::new(unit_box(), UnresolvedPolicy::Keep)
            .combine_bucket(100.0, vec![a]);
        assert_eq!(result.contours.len(), 1);
        assert_eq!(result.unresolved.len(), 1);
        assert!(result.unresolved[0].kept);
    }

    #[test]
    fn nearest_ties_go_to_first_candidate() {
        let pool: VecDeque<Contour> = vec![
            contour("first", &[(0.0, 0.0), (5.0, 6.0)]),
            contour("second", &[(0.0, 0.0), (5.0, 4.0)]),
        ]
        .into();
        let (index, distance) = nearest(&pool, Point::new(5.0, 5.0), Contour::end).unwrap();
        assert_eq!(index, 0);
        assert!((distance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_in_empty_pool_is_none() {
        assert!(nearest(&VecDeque::new(), Point::new(0.0, 0.0), Contour::start).is_none());
    }

    #[test]
    fn one_failure_does_not_stop_the_bucket() {
        let orphan = contour("orphan", &[(10.0, 8.0), (7.0, 8.0)]);
        let a = contour("a", &[(10.0, 3.0), (6.0, 4.0)]);
        let b = contour("b", &[(6.0, 4.0), (0.0, 5.0)]);
        let result = combiner().combine_bucket(100.0, vec![orphan, a, b]);
        assert_eq!(result.contours.len(), 1);
        assert_eq!(result.contours[0].id(), "a");
        assert_eq!(result.unresolved.len(), 1);
        assert_eq!(result.unresolved[0].id, "orphan");
    }

    #[test]
    fn combine_keeps_buckets_separate() {
        let low_a = Contour::new(
            "low_a",
            10.0,
            vec![Point::new(10.0, 3.0), Point::new(6.0, 4.0)],
        )
        .unwrap();
        let high_b = Contour::new(
            "high_b",
            20.0,
            vec![Point::new(6.0, 4.0), Point::new(0.0, 5.0)],
        )
        .unwrap();
        let buckets: ElevationBuckets = [low_a, high_b].into_iter().collect();
        let combined = combiner().combine(buckets);
        assert!(combined.buckets.is_empty());
        assert_eq!(combined.unresolved.len(), 2);
    }
}
