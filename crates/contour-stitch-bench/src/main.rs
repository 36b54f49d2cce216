//! contour-stitch-bench: CLI tool for running contour assembly on tile
//! files and inspecting diagnostics.
//!
//! Reads a JSON array of tile records, stitches and closes every contour,
//! and prints the diagnostics report. Useful for:
//!
//! - Finding fragments that fail to stitch across tile seams
//! - Tuning the coincidence tolerance for a data source
//! - Working out which fragment ids need flipping
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin contour-stitch-bench -- [OPTIONS] <TILES_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use contour_stitch::{AssemblyConfig, FlipMatch, TileRecord, UnresolvedPolicy};

/// Contour fragment assembly and diagnostics.
///
/// Stitches clipped contour fragments from adjacent tiles, closes them
/// against the union of the tile extents, and reports what needed repair
/// or could not be resolved.
#[derive(Parser)]
#[command(name = "contour-stitch-bench", version)]
struct Cli {
    /// Path to a JSON array of tile records.
    tiles_path: PathBuf,

    /// Coincidence tolerance in degrees.
    #[arg(long, default_value_t = AssemblyConfig::DEFAULT_EPS)]
    eps: f64,

    /// Keep contours that could not be stitched and try to close them.
    #[arg(long)]
    keep_unresolved: bool,

    /// Fragment id to reverse before combining. May be repeated.
    #[arg(long = "flip-id", value_name = "ID")]
    flip_ids: Vec<String>,

    /// Flip fragments whose id contains a `--flip-id` entry instead of
    /// matching it exactly.
    #[arg(long)]
    flip_contains: bool,

    /// Full assembly config as a JSON string.
    ///
    /// When provided, all other assembly parameter flags are ignored.
    /// The JSON must be a valid `AssemblyConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Write closed contours as JSON to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` also works.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Build an [`AssemblyConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<AssemblyConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(AssemblyConfig {
        eps: cli.eps,
        unresolved_policy: if cli.keep_unresolved {
            UnresolvedPolicy::Keep
        } else {
            UnresolvedPolicy::Exclude
        },
        flip_ids: cli.flip_ids.iter().cloned().collect(),
        flip_match: if cli.flip_contains {
            FlipMatch::Contains
        } else {
            FlipMatch::Exact
        },
    })
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stderr);
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let json = match std::fs::read_to_string(&cli.tiles_path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.tiles_path.display());
            return ExitCode::FAILURE;
        }
    };

    let tiles: Vec<TileRecord> = match serde_json::from_str(&json) {
        Ok(tiles) => tiles,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", cli.tiles_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Tiles: {} ({} tile(s))",
        cli.tiles_path.display(),
        tiles.len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!();

    let assembly = match contour_stitch::assemble(tiles, &config) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprintln!("Assembly error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&assembly.diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", assembly.diagnostics.report());
    }

    if let Some(ref output_path) = cli.output {
        let records = assembly.records();
        let json = match serde_json::to_string(&records) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing contours: {e}");
                return ExitCode::FAILURE;
            }
        };
        match std::fs::write(output_path, &json) {
            Ok(()) => {
                eprintln!(
                    "{} contour(s) written to {} ({} bytes)",
                    records.len(),
                    output_path.display(),
                    json.len(),
                );
            }
            Err(e) => {
                eprintln!("Error writing contours to {}: {e}", output_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
