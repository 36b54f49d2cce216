//! Axis-aligned bounding box and the tolerance used by every geometric
//! comparison in the crate.

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::types::{ContourError, Point};

/// Tile extent in the `(lon_min, lon_max, lat_min, lat_max)` order GIS
/// layers report it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Western boundary.
    pub lon_min: f64,
    /// Eastern boundary.
    pub lon_max: f64,
    /// Southern boundary.
    pub lat_min: f64,
    /// Northern boundary.
    pub lat_max: f64,
}

/// The rectangle that contour fragments were clipped against.
///
/// `eps` governs both point equality and edge membership: a point is on
/// an edge when its relevant coordinate is within `eps` of the edge, and
/// two points coincide when they are within `eps` of each other.
///
/// Only constructed through [`BoundingBox::new`], so it is serialized but
/// never deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    eps: f64,
}

impl BoundingBox {
    /// Create a bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::InvalidBoundingBox`] if any bound is not
    /// finite, if `lat_min >= lat_max` or `lon_min >= lon_max`, or if `eps`
    /// is not a finite positive number.
    pub fn new(
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
        eps: f64,
    ) -> Result<Self, ContourError> {
        if ![lat_min, lat_max, lon_min, lon_max].iter().all(|v| v.is_finite()) {
            return Err(ContourError::InvalidBoundingBox(format!(
                "bounds must be finite (lat {lat_min}..{lat_max}, lon {lon_min}..{lon_max})"
            )));
        }
        if lat_min >= lat_max {
            return Err(ContourError::InvalidBoundingBox(format!(
                "lat_min {lat_min} must be less than lat_max {lat_max}"
            )));
        }
        if lon_min >= lon_max {
            return Err(ContourError::InvalidBoundingBox(format!(
                "lon_min {lon_min} must be less than lon_max {lon_max}"
            )));
        }
        if !(eps.is_finite() && eps > 0.0) {
            return Err(ContourError::InvalidBoundingBox(format!(
                "tolerance must be finite and positive, got {eps}"
            )));
        }
        Ok(Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            eps,
        })
    }

    /// Create a bounding box from a GIS layer extent.
    ///
    /// # Errors
    ///
    /// Same as [`BoundingBox::new`].
    pub fn from_extent(extent: Extent, eps: f64) -> Result<Self, ContourError> {
        Self::new(
            extent.lat_min,
            extent.lat_max,
            extent.lon_min,
            extent.lon_max,
            eps,
        )
    }

    /// Smallest box covering both `self` and `other`, keeping `self`'s
    /// tolerance.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
            eps: self.eps,
        }
    }

    /// Southern boundary.
    #[must_use]
    pub const fn lat_min(&self) -> f64 {
        self.lat_min
    }

    /// Northern boundary.
    #[must_use]
    pub const fn lat_max(&self) -> f64 {
        self.lat_max
    }

    /// Western boundary.
    #[must_use]
    pub const fn lon_min(&self) -> f64 {
        self.lon_min
    }

    /// Eastern boundary.
    #[must_use]
    pub const fn lon_max(&self) -> f64 {
        self.lon_max
    }

    /// Comparison tolerance.
    #[must_use]
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    /// Geometric center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            f64::midpoint(self.lat_min, self.lat_max),
            f64::midpoint(self.lon_min, self.lon_max),
        )
    }

    /// Whether two points coincide within tolerance.
    #[must_use]
    pub fn coincide(&self, a: Point, b: Point) -> bool {
        a.distance(b) <= self.eps
    }

    /// Value of `edge`'s boundary line (a latitude for North/South, a
    /// longitude for West/East).
    #[must_use]
    pub const fn edge_value(&self, edge: Edge) -> f64 {
        match edge {
            Edge::North => self.lat_max,
            Edge::West => self.lon_min,
            Edge::South => self.lat_min,
            Edge::East => self.lon_max,
        }
    }

    /// Distance from `point` to the line of `edge`, measured along the
    /// axis perpendicular to the edge.
    #[must_use]
    pub fn edge_distance(&self, edge: Edge, point: Point) -> f64 {
        let coordinate = match edge {
            Edge::North | Edge::South => point.lat,
            Edge::West | Edge::East => point.lon,
        };
        (coordinate - self.edge_value(edge)).abs()
    }

    /// Which edge `point` lies on.
    ///
    /// Edges are tested North, South, West, East and the first match
    /// wins, so a corner point is always reported as North or South.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::NotOnBoundary`] if the point is farther
    /// than `eps` from every edge.
    pub fn classify(&self, point: Point) -> Result<Edge, ContourError> {
        [Edge::North, Edge::South, Edge::West, Edge::East]
            .into_iter()
            .find(|&edge| self.edge_distance(edge, point) <= self.eps)
            .ok_or(ContourError::NotOnBoundary {
                lat: point.lat,
                lon: point.lon,
            })
    }

    /// Whether `point` lies on any edge within tolerance.
    #[must_use]
    pub fn is_boundary_point(&self, point: Point) -> bool {
        self.classify(point).is_ok()
    }

    /// The corner where the walk leaves `edge` for the next edge.
    #[must_use]
    pub const fn terminal_corner(&self, edge: Edge) -> Point {
        match edge {
            Edge::North => Point::new(self.lat_max, self.lon_min),
            Edge::West => Point::new(self.lat_min, self.lon_min),
            Edge::South => Point::new(self.lat_min, self.lon_max),
            Edge::East => Point::new(self.lat_max, self.lon_max),
        }
    }

    /// Project `point` onto the line of `edge`, keeping the coordinate
    /// that varies along the edge.
    #[must_use]
    pub const fn snap_to_edge(&self, edge: Edge, point: Point) -> Point {
        match edge {
            Edge::North | Edge::South => Point::new(self.edge_value(edge), point.lon),
            Edge::West | Edge::East => Point::new(point.lat, self.edge_value(edge)),
        }
    }
}
