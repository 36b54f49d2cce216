//! The four edges of the bounding box and the fixed order in which the
//! boundary is walked.
//!
//! Walking goes `N -> W -> S -> E -> N`, i.e. counter-clockwise when north
//! is up. Each edge ends at the corner where the walk turns onto the next
//! edge, and each edge carries a winding sign that tells which way its
//! relevant coordinate moves during the walk.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// One of the four cardinal edges of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// `lat == lat_max`.
    North,
    /// `lon == lon_min`.
    West,
    /// `lat == lat_min`.
    South,
    /// `lon == lon_max`.
    East,
}

impl Edge {
    /// All edges in traversal order.
    pub const TRAVERSAL_ORDER: [Self; 4] = [Self::North, Self::West, Self::South, Self::East];

    /// The edge that follows this one in traversal order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Direction the relevant coordinate moves while walking this edge.
    ///
    /// North runs east-to-west and West runs north-to-south (both
    /// decreasing), South and East run the other way.
    #[must_use]
    pub const fn winding_sign(self) -> f64 {
        match self {
            Self::North | Self::West => -1.0,
            Self::South | Self::East => 1.0,
        }
    }

    /// The coordinate that varies along this edge: longitude for
    /// North/South, latitude for West/East.
    #[must_use]
    pub const fn relevant_coordinate(self, point: Point) -> f64 {
        match self {
            Self::North | Self::South => point.lon,
            Self::West | Self::East => point.lat,
        }
    }

    /// Whether `to` lies strictly ahead of `from` when walking this edge.
    ///
    /// A zero offset is not ahead.
    #[must_use]
    pub fn is_ahead(self, from: Point, to: Point) -> bool {
        let offset = self.relevant_coordinate(to) - self.relevant_coordinate(from);
        offset * self.winding_sign() > 0.0
    }

    /// Single-letter label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::West => "W",
            Self::South => "S",
            Self::East => "E",
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all_edges() {
        let mut edge = Edge::North;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(edge);
            edge = edge.next();
        }
        assert_eq!(seen, Edge::TRAVERSAL_ORDER);
        assert_eq!(edge, Edge::North);
    }

    #[test]
    fn winding_signs() {
        assert!((Edge::North.winding_sign() + 1.0).abs() < f64::EPSILON);
        assert!((Edge::West.winding_sign() + 1.0).abs() < f64::EPSILON);
        assert!((Edge::South.winding_sign() - 1.0).abs() < f64::EPSILON);
        assert!((Edge::East.winding_sign() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn relevant_coordinate_picks_the_varying_axis() {
        let p = Point::new(3.0, 7.0);
        assert!((Edge::North.relevant_coordinate(p) - 7.0).abs() < f64::EPSILON);
        assert!((Edge::South.relevant_coordinate(p) - 7.0).abs() < f64::EPSILON);
        assert!((Edge::West.relevant_coordinate(p) - 3.0).abs() < f64::EPSILON);
        assert!((Edge::East.relevant_coordinate(p) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn north_walks_toward_decreasing_longitude() {
        let east_side = Point::new(10.0, 8.0);
        let west_side = Point::new(10.0, 2.0);
        assert!(Edge::North.is_ahead(east_side, west_side));
        assert!(!Edge::North.is_ahead(west_side, east_side));
    }

    #[test]
    fn east_walks_toward_increasing_latitude() {
        let low = Point::new(1.0, 10.0);
        let high = Point::new(9.0, 10.0);
        assert!(Edge::East.is_ahead(low, high));
        assert!(!Edge::East.is_ahead(high, low));
    }

    #[test]
    fn equal_coordinates_are_not_ahead() {
        let p = Point::new(0.0, 4.0);
        assert!(!Edge::South.is_ahead(p, p));
    }

    #[test]
    fn display_uses_compass_letters() {
        let labels: Vec<String> = Edge::TRAVERSAL_ORDER
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(labels, ["N", "W", "S", "E"]);
    }
}
