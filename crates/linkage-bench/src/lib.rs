//! Distance matrix generator and benchmark utilities for linkage clustering.
//!
//! This crate provides deterministic generation of distance matrices with
//! planted cluster structure for benchmarking and property-based testing of
//! `linkage-core`.

use std::path::PathBuf;

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_matrix, planted_groups};

/// Returns the path where the large-tier matrix fixture is stored on disk.
///
/// The file lives under `target/bench-fixtures/xlarge.sim` so it is
/// automatically gitignored and shared between the generator binary and
/// the benchmark harness.
pub fn xlarge_fixture_path() -> PathBuf {
    fixtures_dir().join("xlarge.sim")
}

/// Returns the path of the statistics sidecar written next to the fixture.
pub fn xlarge_stats_path() -> PathBuf {
    fixtures_dir().join("xlarge.stats.json")
}

fn fixtures_dir() -> PathBuf {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest
        .join("..")
        .join("..")
        .join("target")
        .join("bench-fixtures")
}
