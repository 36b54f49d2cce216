//! Contour closing: turn a contour whose ends sit on the bounding box into
//! a closed loop by walking the boundary.
//!
//! Per contour the closer moves through
//! `open -> (repair start) -> (repair end) -> {already closed | same-edge
//! direct | corner walk} -> closed`. There is no retry: a contour that
//! cannot be classified after repair is a fault for that contour alone.
//!
//! # Repair
//!
//! An endpoint that misses the boundary by more than `eps` is repaired by
//! choosing the cheapest of five corrections: snapping onto the North,
//! West, South or East edge line, or declaring it coincident with the
//! opposite endpoint. Ties go to the earlier candidate in that order. A
//! repaired start is inserted before the original start and a repaired
//! end is appended after the original end.
//!
//! # Corner walk
//!
//! From the end's edge, append that edge's terminal corner and move to the
//! next edge in `N -> W -> S -> E` order, until the current edge is the
//! start's edge; then append the start. This inserts at most four corners
//! and always travels the same way around the box.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::contour::Contour;
use crate::edge::Edge;
use crate::types::{ContourError, Point};

/// Which end of a contour a repair touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    /// The first point.
    Start,
    /// The last point.
    End,
}

/// The correction chosen for an off-boundary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairTarget {
    /// Snapped onto this edge's line.
    Edge(Edge),
    /// Treated as the same point as the opposite endpoint.
    OppositeEndpoint,
}

/// One boundary repair applied to a contour endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    /// Which end was repaired.
    pub endpoint: Endpoint,
    /// The endpoint as it was before repair.
    pub original: Point,
    /// The point inserted by the repair.
    pub repaired: Point,
    /// Which correction won.
    pub target: RepairTarget,
    /// Length of the correction.
    pub distance: f64,
}

/// How a contour ended up closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Closing {
    /// Start and end already coincided (possibly after a repair onto the
    /// opposite endpoint). No boundary points were added.
    AlreadyClosed,
    /// Both ends on one edge with the end ahead of the start; closed by
    /// appending the start.
    SameEdgeDirect,
    /// Closed by walking the boundary, inserting `corners` corner points
    /// before the start.
    CornerWalk {
        /// Number of corner points inserted (1 to 4).
        corners: usize,
    },
}

/// Result of closing one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseOutcome {
    /// How the loop was closed.
    pub closing: Closing,
    /// Repairs applied before closing, start first.
    pub repairs: Vec<Repair>,
}

/// Closes contours against a fixed bounding box.
#[derive(Debug, Clone, Copy)]
pub struct ContourCloser {
    bbox: BoundingBox,
}

impl ContourCloser {
    /// Create a closer for `bbox`.
    #[must_use]
    pub const fn new(bbox: BoundingBox) -> Self {
        Self { bbox }
    }

    /// Close `contour` in place.
    ///
    /// On success the first and last points coincide within `eps`.
    /// Closing an already closed contour leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::MalformedInput`] if a repaired endpoint
    /// still fails edge classification. The contour may have been
    /// partially extended when this happens.
    pub fn close(&self, contour: &mut Contour) -> Result<CloseOutcome, ContourError> {
        if contour.is_closed(&self.bbox) {
            log::debug!("contour {} already closed", contour.id());
            return Ok(CloseOutcome {
                closing: Closing::AlreadyClosed,
                repairs: Vec::new(),
            });
        }

        let mut repairs = Vec::new();

        let start_edge = match self.bbox.classify(contour.start()) {
            Ok(edge) => edge,
            Err(_) => {
                let repair = self.plan_repair(Endpoint::Start, contour.start(), contour.end());
                log_repair(contour, &repair);
                repairs.push(repair);
                contour.prepend_point(repair.repaired);
                if repair.target == RepairTarget::OppositeEndpoint {
                    return Ok(CloseOutcome {
                        closing: Closing::AlreadyClosed,
                        repairs,
                    });
                }
                self.reclassify(contour, repair.repaired)?
            }
        };

        let end_edge = match self.bbox.classify(contour.end()) {
            Ok(edge) => edge,
            Err(_) => {
                let repair = self.plan_repair(Endpoint::End, contour.end(), contour.start());
                log_repair(contour, &repair);
                repairs.push(repair);
                contour.append_point(repair.repaired);
                if repair.target == RepairTarget::OppositeEndpoint {
                    return Ok(CloseOutcome {
                        closing: Closing::AlreadyClosed,
                        repairs,
                    });
                }
                self.reclassify(contour, repair.repaired)?
            }
        };

        if contour.is_closed(&self.bbox) {
            log::debug!("contour {} closed by repair", contour.id());
            return Ok(CloseOutcome {
                closing: Closing::AlreadyClosed,
                repairs,
            });
        }

        let start = contour.start();

        if start_edge == end_edge && start_edge.is_ahead(start, contour.end()) {
            log::debug!(
                "contour {} closed directly along {start_edge} edge",
                contour.id()
            );
            contour.append_point(start);
            return Ok(CloseOutcome {
                closing: Closing::SameEdgeDirect,
                repairs,
            });
        }

        let corners = self.walk_corners(contour, end_edge, start_edge);
        log::debug!(
            "contour {} closed from {end_edge} to {start_edge} edge with {corners} corner(s)",
            contour.id()
        );
        Ok(CloseOutcome {
            closing: Closing::CornerWalk { corners },
            repairs,
        })
    }

    /// Choose the cheapest correction for an endpoint that is off the
    /// boundary.
    ///
    /// Candidates are snapping to North, West, South, East, then
    /// coinciding with `opposite`; the first minimum wins.
    #[must_use]
    pub fn plan_repair(&self, endpoint: Endpoint, point: Point, opposite: Point) -> Repair {
        let mut best = Repair {
            endpoint,
            original: point,
            repaired: opposite,
            target: RepairTarget::OppositeEndpoint,
            distance: point.distance(opposite),
        };

        for edge in Edge::TRAVERSAL_ORDER.into_iter().rev() {
            let distance = self.bbox.edge_distance(edge, point);
            if distance <= best.distance {
                best = Repair {
                    endpoint,
                    original: point,
                    repaired: self.bbox.snap_to_edge(edge, point),
                    target: RepairTarget::Edge(edge),
                    distance,
                };
            }
        }

        best
    }

    /// Classify a freshly snapped point. Failure means the geometry is
    /// inconsistent with the tolerance model.
    fn reclassify(&self, contour: &Contour, repaired: Point) -> Result<Edge, ContourError> {
        self.bbox
            .classify(repaired)
            .map_err(|err| ContourError::MalformedInput {
                id: contour.id().to_string(),
                reason: format!("repaired endpoint still off boundary: {err}"),
            })
    }

    /// Append terminal corners from `from` around to `to`, then the start
    /// point. Returns the number of corners appended.
    fn walk_corners(&self, contour: &mut Contour, from: Edge, to: Edge) -> usize {
        let start = contour.start();
        let mut edge = from;
        let mut corners = 0;
        loop {
            contour.append_point(self.bbox.terminal_corner(edge));
            corners += 1;
            edge = edge.next();
            if edge == to {
                contour.append_point(start);
                return corners;
            }
        }
    }
}

fn log_repair(contour: &Contour, repair: &Repair) {
    log::warn!(
        "contour {} ({}): {:?} ({}, {}) off boundary, repaired via {:?} at distance {:e}",
        contour.id(),
        contour.elevation(),
        repair.endpoint,
        repair.original.lat,
        repair.original.lon,
        repair.target,
        repair.distance,
    );
}
