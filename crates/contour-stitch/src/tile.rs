//! Tile records: the serde shapes contour fragments arrive in and closed
//! contours leave in, and ingestion into elevation buckets.
//!
//! Coordinates are GIS `(lon, lat)` pairs on the way in and
//! `(lon, lat, 0.0)` triples on the way out. Everything inside the crate
//! works in `(lat, lon)` [`Point`](crate::types::Point)s.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::bbox::{BoundingBox, Extent};
use crate::bucket::ElevationBuckets;
use crate::contour::Contour;
use crate::diagnostics::{FailedContour, Stage};
use crate::types::{AssemblyConfig, ContourError};

/// How fragment ids are matched against the configured flip list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlipMatch {
    /// The id must equal a listed entry.
    #[default]
    Exact,
    /// The id must contain a listed entry. Tile extractors suffix ids
    /// with a feature index, so a stable prefix can name a whole family.
    Contains,
}

impl FlipMatch {
    /// Whether `id` is named by `flip_ids`.
    #[must_use]
    pub fn matches(self, id: &str, flip_ids: &BTreeSet<String>) -> bool {
        match self {
            Self::Exact => flip_ids.contains(id),
            Self::Contains => flip_ids.iter().any(|entry| id.contains(entry.as_str())),
        }
    }
}

/// One contour fragment as delivered by a tile extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    /// Fragment id, unique within the run.
    pub id: String,
    /// Elevation of the contour line.
    pub elevation: f64,
    /// `(lon, lat)` pairs in traversal order.
    pub coordinates: Vec<[f64; 2]>,
}

impl TryFrom<FragmentRecord> for Contour {
    type Error = ContourError;

    fn try_from(record: FragmentRecord) -> Result<Self, Self::Error> {
        Self::from_lon_lat(record.id, record.elevation, &record.coordinates)
    }
}

/// One map tile: its extent and the fragments clipped against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Tile bounds.
    pub extent: Extent,
    /// Contour fragments in this tile.
    #[serde(default)]
    pub fragments: Vec<FragmentRecord>,
}

/// A closed contour in the renderer's coordinate layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourRecord {
    /// Id of the contour that survived merging.
    pub id: String,
    /// Elevation of the contour line.
    pub elevation: f64,
    /// `(lon, lat, 0.0)` triples, first and last coinciding.
    pub coordinates: Vec<[f64; 3]>,
}

impl From<&Contour> for ContourRecord {
    fn from(contour: &Contour) -> Self {
        Self {
            id: contour.id().to_string(),
            elevation: contour.elevation(),
            coordinates: contour.to_lon_lat_z(),
        }
    }
}

/// Fragments from every tile, grouped and ready to combine.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    /// Union of all tile extents.
    pub bbox: BoundingBox,
    /// Contours by elevation.
    pub buckets: ElevationBuckets,
    /// Number of fragment records seen, including rejected ones.
    pub fragment_count: usize,
    /// Ids of fragments reversed on the way in.
    pub flipped: Vec<String>,
    /// Fragments rejected on the way in.
    pub failed: Vec<FailedContour>,
}

/// Working bounding box for a set of tiles: the union of their extents.
///
/// # Errors
///
/// Returns [`ContourError::EmptyInput`] if `tiles` is empty, or
/// [`ContourError::InvalidBoundingBox`] if any extent or `eps` is
/// unusable.
pub fn union_bbox(tiles: &[TileRecord], eps: f64) -> Result<BoundingBox, ContourError> {
    let mut bbox: Option<BoundingBox> = None;
    for tile in tiles {
        let tile_bbox = BoundingBox::from_extent(tile.extent, eps)?;
        bbox = Some(bbox.map_or(tile_bbox, |b| b.union(&tile_bbox)));
    }
    bbox.ok_or(ContourError::EmptyInput)
}

/// Turn tile records into elevation buckets.
///
/// Fragments with no coordinates are recorded as failures and skipped.
/// Fragments named by the configured flip list are reversed.
///
/// # Errors
///
/// Returns [`ContourError::EmptyInput`] if there are no tiles or no
/// fragments in any tile, or [`ContourError::InvalidBoundingBox`] if the
/// configuration or a tile extent is unusable.
pub fn ingest(tiles: Vec<TileRecord>, config: &AssemblyConfig) -> Result<Ingested, ContourError> {
    config.validate()?;
    let bbox = union_bbox(&tiles, config.eps)?;

    let fragment_count: usize = tiles.iter().map(|t| t.fragments.len()).sum();
    if fragment_count == 0 {
        return Err(ContourError::EmptyInput);
    }

    let mut buckets = ElevationBuckets::new();
    let mut flipped = Vec::new();
    let mut failed = Vec::new();

    for record in tiles.into_iter().flat_map(|t| t.fragments) {
        let id = record.id.clone();
        let elevation = record.elevation;
        match Contour::try_from(record) {
            Ok(mut contour) => {
                if config.flip_match.matches(contour.id(), &config.flip_ids) {
                    log::info!("flipping fragment {}", contour.id());
                    contour.reverse();
                    flipped.push(id);
                }
                buckets.insert(contour);
            }
            Err(error) => {
                log::warn!("skipping fragment {id} ({elevation}): {error}");
                failed.push(FailedContour {
                    id,
                    elevation,
                    stage: Stage::Ingest,
                    error,
                    points: Vec::new(),
                });
            }
        }
    }

    Ok(Ingested {
        bbox,
        buckets,
        fragment_count,
        flipped,
        failed,
    })
}
