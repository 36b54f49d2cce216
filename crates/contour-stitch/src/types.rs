//! Shared types for the contour assembly pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combine::UnresolvedPolicy;
use crate::tile::FlipMatch;

/// A 2D point in geographic coordinates.
///
/// Distances are plain Euclidean distances in `(lat, lon)` space. Tiles
/// are small enough to be treated as locally planar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point from a GIS `(lon, lat)` coordinate pair.
    #[must_use]
    pub const fn from_lon_lat([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat.mul_add(dlat, dlon * dlon)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Render as a `(lon, lat, 0.0)` triple for downstream renderers.
    #[must_use]
    pub const fn to_lon_lat_z(self) -> [f64; 3] {
        [self.lon, self.lat, 0.0]
    }
}

/// Errors that can occur while stitching and closing contours.
///
/// Per-contour variants (`NotOnBoundary`, `UnresolvableContour`,
/// `MalformedInput`, `EmptyContour`) are recorded in
/// [`AssemblyDiagnostics`](crate::diagnostics::AssemblyDiagnostics) and
/// never abort a run. `InvalidBoundingBox` and `EmptyInput` are fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum ContourError {
    /// A point is not within tolerance of any bounding-box edge.
    #[error("point ({lat}, {lon}) is not on the bounding box boundary")]
    NotOnBoundary {
        /// Latitude of the offending point.
        lat: f64,
        /// Longitude of the offending point.
        lon: f64,
    },

    /// No fragment endpoint lies within tolerance of the open end.
    #[error("contour {id} cannot be extended within tolerance")]
    UnresolvableContour {
        /// Id of the contour being extended.
        id: String,
        /// Distance to the nearest candidate endpoint, `None` when the
        /// candidate pool was exhausted.
        distance: Option<f64>,
    },

    /// Source geometry is inconsistent beyond the tolerance model.
    #[error("malformed contour {id}: {reason}")]
    MalformedInput {
        /// Id of the offending contour.
        id: String,
        /// What was inconsistent.
        reason: String,
    },

    /// A fragment arrived with no points.
    #[error("contour {id} has no points")]
    EmptyContour {
        /// Id of the empty fragment.
        id: String,
    },

    /// Bounding box or tolerance is unusable.
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Nothing to assemble.
    #[error("no contour fragments to assemble")]
    EmptyInput,
}

/// Configuration for contour assembly.
///
/// Deserializing a partial object fills the missing fields from
/// [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Coincidence tolerance in degrees. Two points within `eps` are the
    /// same point, and a point within `eps` of an edge line is on that
    /// edge.
    ///
    /// Must be finite and positive.
    pub eps: f64,

    /// What to do with contours the combiner could not complete.
    pub unresolved_policy: UnresolvedPolicy,

    /// Ids of fragments known to be wound the wrong way. Matching
    /// fragments are reversed before combining.
    pub flip_ids: BTreeSet<String>,

    /// How fragment ids are matched against `flip_ids`.
    pub flip_match: FlipMatch,
}

impl AssemblyConfig {
    /// Default coincidence tolerance.
    pub const DEFAULT_EPS: f64 = 1e-6;

    /// Check the configuration before a run.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidBoundingBox`] if `eps` is not a
    /// finite positive number.
    pub fn validate(&self) -> Result<(), ContourError> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(ContourError::InvalidBoundingBox(format!(
                "tolerance must be finite and positive, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            eps: Self::DEFAULT_EPS,
            unresolved_policy: UnresolvedPolicy::default(),
            flip_ids: BTreeSet::new(),
            flip_match: FlipMatch::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point::new(47.5, -122.3);
        assert!(p.distance(p).abs() < f64::EPSILON);
    }

    #[test]
    fn lon_lat_order_is_swapped_on_the_way_in_and_out() {
        let p = Point::from_lon_lat([-122.3, 47.5]);
        assert_eq!(p, Point::new(47.5, -122.3));
        assert_eq!(p.to_lon_lat_z(), [-122.3, 47.5, 0.0]);
    }

    #[test]
    fn error_display() {
        let err = ContourError::UnresolvableContour {
            id: "abc_1".to_string(),
            distance: Some(0.5),
        };
        assert_eq!(
            err.to_string(),
            "contour abc_1 cannot be extended within tolerance",
        );
        assert_eq!(
            ContourError::EmptyInput.to_string(),
            "no contour fragments to assemble",
        );
    }

    #[test]
    fn default_config_is_valid() {
        let config = AssemblyConfig::default();
        assert!((config.eps - 1e-6).abs() < f64::EPSILON);
        assert_eq!(config.unresolved_policy, UnresolvedPolicy::Exclude);
        assert_eq!(config.flip_match, FlipMatch::Exact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_tolerance() {
        for eps in [0.0, -1e-6, f64::NAN, f64::INFINITY] {
            let config = AssemblyConfig {
                eps,
                ..AssemblyConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ContourError::InvalidBoundingBox(_))),
                "eps {eps} should be rejected",
            );
        }
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn partial_config_json_fills_defaults() {
        let config: AssemblyConfig =
            serde_json::from_str(r#"{"flip_ids": ["ridge_"], "flip_match": "Contains"}"#)
                .unwrap();
        assert!((config.eps - AssemblyConfig::DEFAULT_EPS).abs() < f64::EPSILON);
        assert!(config.flip_ids.contains("ridge_"));
        assert_eq!(config.flip_match, FlipMatch::Contains);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn error_serde_round_trip() {
        let err = ContourError::MalformedInput {
            id: "x".to_string(),
            reason: "both ends on boundary".to_string(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let deserialized: ContourError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }
}
