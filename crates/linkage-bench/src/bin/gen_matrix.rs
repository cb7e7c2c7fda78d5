//! Generates the xlarge-tier benchmark fixture to disk.
//!
//! Writes the binary matrix and a JSON statistics sidecar to
//! `target/bench-fixtures/`. The matrix is loaded by `benches/codec.rs` at
//! benchmark time when present.

use std::error::Error;
use std::fs;
use std::io::{BufWriter, Write as _};

use linkage_bench::{SizeTier, generate_matrix, xlarge_fixture_path, xlarge_stats_path};
use linkage_core::write_triangle_matrix;

fn main() -> Result<(), Box<dyn Error>> {
    let matrix_path = xlarge_fixture_path();
    let stats_path = xlarge_stats_path();

    if let Some(parent) = matrix_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = SizeTier::XLarge.config(42);
    eprintln!("Generating XLarge tier ({} items)...", config.items);
    let matrix = generate_matrix(&config)?;

    eprintln!("Writing matrix to {}...", matrix_path.display());
    let mut writer = BufWriter::new(fs::File::create(&matrix_path)?);
    write_triangle_matrix(&matrix, &mut writer)?;
    writer.flush()?;

    let meta = fs::metadata(&matrix_path)?;
    eprintln!("Matrix: {:.1} MB", meta.len() as f64 / (1024.0 * 1024.0));

    let stats = matrix.stats();
    fs::write(&stats_path, serde_json::to_vec_pretty(&stats)?)?;
    eprintln!(
        "{} pairs, {} exact matches, stats in {}",
        stats.pairs,
        stats.zero_pairs,
        stats_path.display()
    );

    Ok(())
}
