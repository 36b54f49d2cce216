//! contour-stitch: Reassemble clipped contour fragments into closed
//! polygons (sans-IO).
//!
//! Adjacent map tiles each clip their contour lines at the tile boundary.
//! This crate turns those fragments back into closed loops through:
//! ingest -> bucket by elevation -> combine (stitch across seams) ->
//! close (walk the bounding box perimeter).
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! tile records and returns structured data plus diagnostics. Reading
//! files and printing reports lives in `contour-stitch-bench`.

pub mod bbox;
pub mod bucket;
pub mod close;
pub mod combine;
pub mod contour;
pub mod diagnostics;
pub mod edge;
pub mod tile;
pub mod types;

pub use bbox::{BoundingBox, Extent};
pub use bucket::ElevationBuckets;
pub use close::{CloseOutcome, Closing, ContourCloser};
pub use combine::{ContourCombiner, UnresolvedPolicy};
pub use contour::Contour;
pub use diagnostics::AssemblyDiagnostics;
pub use edge::Edge;
pub use tile::{ContourRecord, FlipMatch, FragmentRecord, TileRecord};
pub use types::{AssemblyConfig, ContourError, Point};

use diagnostics::{FailedContour, RepairRecord, Stage};

/// Closed contours and everything that happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// The box contours were closed against.
    pub bbox: BoundingBox,
    /// Closed contours by elevation.
    pub buckets: ElevationBuckets,
    /// Repairs, unresolved and failed contours, and counts.
    pub diagnostics: AssemblyDiagnostics,
}

impl Assembly {
    /// Closed contours in renderer layout, lowest elevation first.
    #[must_use]
    pub fn records(&self) -> Vec<ContourRecord> {
        self.buckets
            .iter()
            .flat_map(|(_, contours)| contours.iter().map(ContourRecord::from))
            .collect()
    }
}

/// Run the full assembly pipeline over a set of adjacent tiles.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Union the tile extents into the working bounding box
/// 3. Build contours from fragment records, reversing configured ids
/// 4. Group contours by elevation
/// 5. Combine fragments within each elevation
/// 6. Close each combined contour against the bounding box
///
/// Per-contour problems never abort the run; they are recorded in
/// [`Assembly::diagnostics`].
///
/// # Errors
///
/// Returns [`ContourError::EmptyInput`] if there are no tiles or no
/// fragments. Returns [`ContourError::InvalidBoundingBox`] if `eps` or a
/// tile extent is unusable.
pub fn assemble(tiles: Vec<TileRecord>, config: &AssemblyConfig) -> Result<Assembly, ContourError> {
    let tile_count = tiles.len();

    // 1-4. Validate, union, ingest and bucket.
    let ingested = tile::ingest(tiles, config)?;

    // 5-6. Combine and close.
    let mut assembly = run(ingested.buckets, ingested.bbox, config.unresolved_policy);

    let diagnostics = &mut assembly.diagnostics;
    diagnostics.flipped = ingested.flipped;
    let mut failed = ingested.failed;
    failed.append(&mut diagnostics.failed);
    diagnostics.failed = failed;
    diagnostics.summary.tile_count = tile_count;
    diagnostics.summary.fragment_count = ingested.fragment_count;

    log_summary(&assembly.diagnostics);
    Ok(assembly)
}

/// Combine and close contours that are already bucketed.
///
/// Flip handling is skipped: callers holding [`Contour`]s can
/// [`Contour::reverse`] them directly.
///
/// # Errors
///
/// Returns [`ContourError::EmptyInput`] if `buckets` holds no contours.
pub fn assemble_buckets(
    buckets: ElevationBuckets,
    bbox: BoundingBox,
    policy: UnresolvedPolicy,
) -> Result<Assembly, ContourError> {
    if buckets.is_empty() {
        return Err(ContourError::EmptyInput);
    }
    let fragment_count = buckets.contour_count();
    let mut assembly = run(buckets, bbox, policy);
    assembly.diagnostics.summary.fragment_count = fragment_count;
    log_summary(&assembly.diagnostics);
    Ok(assembly)
}

fn run(buckets: ElevationBuckets, bbox: BoundingBox, policy: UnresolvedPolicy) -> Assembly {
    let mut diagnostics = AssemblyDiagnostics::default();
    diagnostics.summary.bucket_count = buckets.len();

    let combined = ContourCombiner::new(bbox, policy).combine(buckets);
    diagnostics.summary.combined_count = combined.buckets.contour_count();
    diagnostics.unresolved = combined.unresolved;

    let closer = ContourCloser::new(bbox);
    let mut closed_buckets = ElevationBuckets::new();
    for (elevation, contours) in combined.buckets {
        let mut closed = Vec::with_capacity(contours.len());
        for mut contour in contours {
            match closer.close(&mut contour) {
                Ok(outcome) => {
                    diagnostics
                        .repaired
                        .extend(outcome.repairs.into_iter().map(|repair| RepairRecord {
                            id: contour.id().to_string(),
                            elevation,
                            repair,
                        }));
                    diagnostics.summary.record_closing(outcome.closing);
                    closed.push(contour);
                }
                Err(error) => {
                    log::warn!(
                        "elevation {elevation}: contour {} could not be closed: {error}",
                        contour.id()
                    );
                    diagnostics.failed.push(FailedContour {
                        id: contour.id().to_string(),
                        elevation,
                        stage: Stage::Close,
                        error,
                        points: contour.into_points(),
                    });
                }
            }
        }
        closed_buckets.set_bucket(elevation, closed);
    }

    Assembly {
        bbox,
        buckets: closed_buckets,
        diagnostics,
    }
}

fn log_summary(diagnostics: &AssemblyDiagnostics) {
    let s = &diagnostics.summary;
    log::info!(
        "assembled {} fragment(s) into {} closed contour(s) across {} elevation(s): \
         {} repaired, {} unresolved, {} failed",
        s.fragment_count,
        s.closed_count,
        s.bucket_count,
        diagnostics.repaired.len(),
        diagnostics.unresolved.len(),
        diagnostics.failed.len(),
    );
}
