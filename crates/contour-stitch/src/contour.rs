//! The contour entity: an identified, never-empty sequence of points at a
//! single elevation, mutated only at its two ends.
//!
//! Contours are owned linearly through the pipeline. Merging moves the
//! absorbed contour's points into the survivor and drops the absorbed
//! instance, so a fragment can never be reachable from two contours.

use serde::Serialize;

use crate::bbox::BoundingBox;
use crate::types::{ContourError, Point};

/// A contour line (or fragment of one) at a single elevation.
///
/// Deserialization goes through [`FragmentRecord`](crate::tile::FragmentRecord)
/// so the non-empty invariant is always checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contour {
    id: String,
    elevation: f64,
    points: Vec<Point>,
}

impl Contour {
    /// Create a contour.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::EmptyContour`] if `points` is empty.
    pub fn new(
        id: impl Into<String>,
        elevation: f64,
        points: Vec<Point>,
    ) -> Result<Self, ContourError> {
        let id = id.into();
        if points.is_empty() {
            return Err(ContourError::EmptyContour { id });
        }
        Ok(Self {
            id,
            elevation,
            points,
        })
    }

    /// Create a contour from GIS `(lon, lat)` coordinate pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::EmptyContour`] if `coordinates` is empty.
    pub fn from_lon_lat(
        id: impl Into<String>,
        elevation: f64,
        coordinates: &[[f64; 2]],
    ) -> Result<Self, ContourError> {
        let points = coordinates.iter().copied().map(Point::from_lon_lat).collect();
        Self::new(id, elevation, points)
    }

    /// Stable fragment id. Merged contours keep the id of the contour
    /// that was being extended.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Elevation value shared by every fragment in this contour.
    #[must_use]
    pub const fn elevation(&self) -> f64 {
        self.elevation
    }

    /// All points, in order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points (always at least one).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point.
    #[must_use]
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Last point.
    #[must_use]
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Whether start and end coincide within the box tolerance.
    #[must_use]
    pub fn is_closed(&self, bbox: &BoundingBox) -> bool {
        bbox.coincide(self.start(), self.end())
    }

    /// Whether no further stitching is needed: the contour is closed, or
    /// both of its ends lie on the boundary.
    #[must_use]
    pub fn is_complete(&self, bbox: &BoundingBox) -> bool {
        self.is_closed(bbox)
            || (bbox.is_boundary_point(self.start()) && bbox.is_boundary_point(self.end()))
    }

    /// Insert a point before the start.
    pub fn prepend_point(&mut self, point: Point) {
        self.points.insert(0, point);
    }

    /// Add a point after the end.
    pub fn append_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Absorb `other`'s full point sequence before this contour's start.
    pub fn prepend_contour(&mut self, other: Self) {
        let mut points = other.points;
        points.append(&mut self.points);
        self.points = points;
    }

    /// Absorb `other`'s full point sequence after this contour's end.
    pub fn append_contour(&mut self, mut other: Self) {
        self.points.append(&mut other.points);
    }

    /// Join `other` before this contour's start, `other`'s end being the
    /// junction shared with this contour's start. The junction is kept
    /// once, from this contour.
    pub fn stitch_before(&mut self, mut other: Self) {
        other.points.pop();
        other.points.append(&mut self.points);
        self.points = other.points;
    }

    /// Join `other` after this contour's end, `other`'s start being the
    /// junction shared with this contour's end. The junction is kept
    /// once, from this contour.
    pub fn stitch_after(&mut self, other: Self) {
        self.points.extend(other.points.into_iter().skip(1));
    }

    /// Reverse point order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Consume the contour and return its points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Points as `(lon, lat, 0.0)` triples, the layout renderers expect.
    #[must_use]
    pub fn to_lon_lat_z(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.to_lon_lat_z()).collect()
    }
}

impl From<&Contour> for geo::LineString<f64> {
    /// Longitude maps to `x` and latitude to `y`.
    fn from(contour: &Contour) -> Self {
        contour
            .points
            .iter()
            .map(|p| geo::Coord { x: p.lon, y: p.lat })
            .collect()
    }
}
