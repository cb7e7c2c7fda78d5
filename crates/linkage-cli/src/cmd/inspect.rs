//! Implementation of `linkage inspect <matrix>`.
//!
//! Decodes a binary distance matrix and prints summary statistics to stdout:
//! item count, pair count, distance range and mean, and the number of
//! exact-match (zero) and non-finite pairs.
//!
//! In `--format json` mode a single JSON object is emitted to stdout.
//! In human mode, aligned key/value lines are printed.
//!
//! Exit codes: 0 = success, 2 = the matrix could not be read or decoded.
use linkage_core::MatrixStats;

use crate::cli::{OutputFormat, PathOrStdin};
use crate::error::CliError;
use crate::io::load_matrix;

/// Runs the `inspect` command.
///
/// # Errors
///
/// Returns [`CliError`] with exit code 2 if the matrix cannot be loaded.
pub fn run(source: &PathOrStdin, format: &OutputFormat, max_file_size: u64) -> Result<(), CliError> {
    let matrix = load_matrix(source, max_file_size)?;
    let stats = matrix.stats();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Human => print_human(&mut out, &stats),
        OutputFormat::Json => print_json(&mut out, &stats),
    }
    .map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}

fn fmt_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

/// Writes inspect statistics in human-readable aligned format.
fn print_human<W: std::io::Write>(w: &mut W, stats: &MatrixStats) -> std::io::Result<()> {
    writeln!(w, "items:      {}", stats.items)?;
    writeln!(w, "pairs:      {}", stats.pairs)?;
    writeln!(w, "min:        {}", fmt_opt(stats.min))?;
    writeln!(w, "max:        {}", fmt_opt(stats.max))?;
    writeln!(w, "mean:       {}", fmt_opt(stats.mean))?;
    writeln!(w, "zero:       {}", stats.zero_pairs)?;
    writeln!(w, "non-finite: {}", stats.non_finite_pairs)?;
    Ok(())
}

/// Writes inspect statistics as a single JSON object.
fn print_json<W: std::io::Write>(w: &mut W, stats: &MatrixStats) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, stats).map_err(std::io::Error::other)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn stats() -> MatrixStats {
        MatrixStats {
            items: 3,
            pairs: 3,
            min: Some(0.0),
            max: Some(2.5),
            mean: Some(1.0),
            zero_pairs: 1,
            non_finite_pairs: 0,
        }
    }

    #[test]
    fn human_output_lists_every_field() {
        let mut buf = Vec::new();
        print_human(&mut buf, &stats()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        for key in ["items:", "pairs:", "min:", "max:", "mean:", "zero:", "non-finite:"] {
            assert!(text.contains(key), "missing {key} in:\n{text}");
        }
        assert!(text.contains("2.5"));
    }

    #[test]
    fn human_output_marks_missing_values() {
        let empty = MatrixStats {
            items: 1,
            pairs: 0,
            min: None,
            max: None,
            mean: None,
            zero_pairs: 0,
            non_finite_pairs: 0,
        };
        let mut buf = Vec::new();
        print_human(&mut buf, &empty).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("min:        -"), "text:\n{text}");
    }

    #[test]
    fn json_output_is_an_object() {
        let mut buf = Vec::new();
        print_json(&mut buf, &stats()).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["items"], 3);
        assert_eq!(value["zero_pairs"], 1);
        assert_eq!(value["max"], 2.5);
    }
}
