//! Assembly diagnostics: per-contour events and run-level counts.
//!
//! Every call to [`assemble`](crate::assemble) returns diagnostics
//! alongside the closed contours. Contours that needed a boundary repair,
//! that could not be stitched, or that failed to close are listed here
//! with their ids and point data so an external tool can report or plot
//! them. Nothing is dropped silently.

use serde::{Deserialize, Serialize};

use crate::close::{Closing, Repair};
use crate::types::{ContourError, Point};

/// Pipeline stage at which a contour failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Building contours from tile fragment records.
    Ingest,
    /// Closing against the bounding box.
    Close,
}

/// A boundary repair applied to one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRecord {
    /// Contour id.
    pub id: String,
    /// Contour elevation.
    pub elevation: f64,
    /// What was repaired and how.
    pub repair: Repair,
}

/// A contour the combiner could not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedContour {
    /// Contour id.
    pub id: String,
    /// Contour elevation.
    pub elevation: f64,
    /// Why extension stopped.
    pub error: ContourError,
    /// Points of the best-effort extension.
    pub points: Vec<Point>,
    /// Whether the contour was forwarded to the closer anyway.
    pub kept: bool,
}

/// A contour dropped because of a fault at some stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedContour {
    /// Contour id.
    pub id: String,
    /// Contour elevation.
    pub elevation: f64,
    /// Where it failed.
    pub stage: Stage,
    /// The fault.
    pub error: ContourError,
    /// Points at the time of failure (empty for ingest failures).
    pub points: Vec<Point>,
}

/// Run-level counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblySummary {
    /// Tiles ingested.
    pub tile_count: usize,
    /// Fragments turned into contours.
    pub fragment_count: usize,
    /// Distinct elevations.
    pub bucket_count: usize,
    /// Contours leaving the combiner.
    pub combined_count: usize,
    /// Closed contours in the output.
    pub closed_count: usize,
    /// Contours that needed no boundary walk.
    pub already_closed_count: usize,
    /// Contours closed along a single edge.
    pub same_edge_count: usize,
    /// Contours closed by walking corners.
    pub corner_walk_count: usize,
    /// Corner points inserted across all corner walks.
    pub corner_point_count: usize,
}

impl AssemblySummary {
    /// Count one successful closing.
    pub const fn record_closing(&mut self, closing: Closing) {
        self.closed_count += 1;
        match closing {
            Closing::AlreadyClosed => self.already_closed_count += 1,
            Closing::SameEdgeDirect => self.same_edge_count += 1,
            Closing::CornerWalk { corners } => {
                self.corner_walk_count += 1;
                self.corner_point_count += corners;
            }
        }
    }
}

/// Diagnostics collected from one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyDiagnostics {
    /// Ids of fragments reversed before combining.
    pub flipped: Vec<String>,
    /// Boundary repairs, in processing order.
    pub repaired: Vec<RepairRecord>,
    /// Contours the combiner could not complete.
    pub unresolved: Vec<UnresolvedContour>,
    /// Contours dropped during ingest or closing.
    pub failed: Vec<FailedContour>,
    /// Counts.
    pub summary: AssemblySummary,
}

impl AssemblyDiagnostics {
    /// Ids of contours that needed a boundary repair, without duplicates.
    #[must_use]
    pub fn repaired_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for record in &self.repaired {
            if !ids.contains(&record.id.as_str()) {
                ids.push(&record.id);
            }
        }
        ids
    }

    /// Ids of contours that were left open: unresolved by the combiner or
    /// failed while closing.
    #[must_use]
    pub fn open_ids(&self) -> Vec<&str> {
        self.unresolved
            .iter()
            .map(|u| u.id.as_str())
            .chain(
                self.failed
                    .iter()
                    .filter(|f| f.stage == Stage::Close)
                    .map(|f| f.id.as_str()),
            )
            .collect()
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let s = &self.summary;
        let mut lines = Vec::new();

        lines.push(format!("Contour Assembly Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Tiles: {}  |  Fragments: {}  |  Elevations: {}",
            s.tile_count, s.fragment_count, s.bucket_count,
        ));
        lines.push(format!(
            "Combined: {}  |  Closed: {} (already {}, same-edge {}, corner walk {} / {} corners)",
            s.combined_count,
            s.closed_count,
            s.already_closed_count,
            s.same_edge_count,
            s.corner_walk_count,
            s.corner_point_count,
        ));
        lines.push(format!(
            "Flipped: {}  |  Repaired: {}  |  Unresolved: {}  |  Failed: {}",
            self.flipped.len(),
            self.repaired.len(),
            self.unresolved.len(),
            self.failed.len(),
        ));

        if !self.repaired.is_empty() {
            lines.push(String::new());
            lines.push(format!("{:<40} {:>10}  {}", "Repaired", "Elevation", "Details"));
            lines.push("-".repeat(80));
            for r in &self.repaired {
                lines.push(format!(
                    "{:<40} {:>10}  {:?} -> {:?} (d={:.3e})",
                    r.id, r.elevation, r.repair.endpoint, r.repair.target, r.repair.distance,
                ));
            }
        }

        if !self.unresolved.is_empty() {
            lines.push(String::new());
            lines.push(format!("{:<40} {:>10}  {}", "Unresolved", "Elevation", "Reason"));
            lines.push("-".repeat(80));
            for u in &self.unresolved {
                let kept = if u.kept { " [kept]" } else { "" };
                lines.push(format!(
                    "{:<40} {:>10}  {} ({} pts){kept}",
                    u.id,
                    u.elevation,
                    u.error,
                    u.points.len(),
                ));
            }
        }

        if !self.failed.is_empty() {
            lines.push(String::new());
            lines.push(format!("{:<40} {:>10}  {}", "Failed", "Elevation", "Reason"));
            lines.push("-".repeat(80));
            for f in &self.failed {
                lines.push(format!(
                    "{:<40} {:>10}  {:?}: {}",
                    f.id, f.elevation, f.stage, f.error,
                ));
            }
        }

        lines.join("\n")
    }
}
