//! Integration test: assemble two adjacent tiles end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use contour_stitch::{AssemblyConfig, FlipMatch, TileRecord, UnresolvedPolicy};

fn load_tiles() -> Vec<TileRecord> {
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let path = workspace_root.join("assets/tiles/two-tiles.json");
    assert!(path.exists(), "tile fixture not found at {path:?}");
    let json = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&json).expect("fixture should parse")
}

fn config() -> AssemblyConfig {
    AssemblyConfig {
        flip_ids: ["_rev_".to_string()].into_iter().collect(),
        flip_match: FlipMatch::Contains,
        ..AssemblyConfig::default()
    }
}

#[test]
fn two_tiles_assemble_into_closed_contours() {
    let assembly = contour_stitch::assemble(load_tiles(), &config()).unwrap();
    eprintln!("{}", assembly.diagnostics.report());

    let records = assembly.records();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["w_100_1", "w_200_1", "e_300_rev_1"]);
    for record in &records {
        assert_eq!(
            record.coordinates.first(),
            record.coordinates.last(),
            "{} is not closed",
            record.id
        );
    }

    // Stitched across the seam at lon 5, then closed through the NE corner.
    assert_eq!(
        records[0].coordinates,
        vec![
            [2.0, 10.0, 0.0],
            [3.0, 7.0, 0.0],
            [5.0, 5.0, 0.0],
            [8.0, 4.0, 0.0],
            [10.0, 3.0, 0.0],
            [10.0, 10.0, 0.0],
            [2.0, 10.0, 0.0],
        ]
    );

    // An interior loop split by the seam needs no boundary points.
    assert_eq!(records[1].coordinates.len(), 5);

    // Flipped to run S -> E, then walked E -> N -> W back to S.
    assert_eq!(
        records[2].coordinates[3..],
        [
            [10.0, 10.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, 0.0],
            [7.0, 0.0, 0.0],
        ]
    );
}

#[test]
fn two_tiles_diagnostics() {
    let assembly = contour_stitch::assemble(load_tiles(), &config()).unwrap();
    let d = &assembly.diagnostics;

    assert_eq!(d.flipped, ["e_300_rev_1"]);
    assert!(d.repaired.is_empty());
    assert!(d.failed.is_empty());
    assert_eq!(d.open_ids(), ["e_400_1"]);

    let s = &d.summary;
    assert_eq!(s.tile_count, 2);
    assert_eq!(s.fragment_count, 6);
    assert_eq!(s.bucket_count, 4);
    assert_eq!(s.combined_count, 3);
    assert_eq!(s.closed_count, 3);
    assert_eq!(s.already_closed_count, 1);
    assert_eq!(s.corner_walk_count, 2);
    assert_eq!(s.corner_point_count, 4);
}

#[test]
fn keeping_unresolved_contours_closes_them_too() {
    let config = AssemblyConfig {
        unresolved_policy: UnresolvedPolicy::Keep,
        ..config()
    };
    let assembly = contour_stitch::assemble(load_tiles(), &config).unwrap();
    assert_eq!(assembly.buckets.contour_count(), 4);
    assert_eq!(assembly.diagnostics.repaired_ids(), ["e_400_1"]);
    assert!(assembly.diagnostics.unresolved[0].kept);
}

#[test]
fn without_flip_config_the_mis_wound_fragment_walks_the_other_way() {
    let assembly = contour_stitch::assemble(load_tiles(), &AssemblyConfig::default()).unwrap();
    assert!(assembly.diagnostics.flipped.is_empty());
    // Runs E -> S, so the walk from S to E adds just the SE corner.
    let records = assembly.records();
    let rev = records.iter().find(|r| r.id == "e_300_rev_1").unwrap();
    assert_eq!(rev.coordinates.len(), 5);
    assert_eq!(rev.coordinates[3], [10.0, 0.0, 0.0]);
}
