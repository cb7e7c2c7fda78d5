//! Implementation of `linkage cluster <matrix> <out-dir>`.
//!
//! Loads a binary distance matrix, runs single-linkage clustering to
//! completion and writes the partition before each recorded merge to
//! `<out-dir>/<step>.json`. Progress and warnings go to stderr; the number of
//! merge steps is printed to stdout.
//!
//! Exit codes:
//! - 0 = success (possibly with warnings for snapshots that failed to write)
//! - 1 = a snapshot failed under `--strict`, or the history file failed
//! - 2 = the matrix could not be read or decoded, or the output directory is unusable
use std::io::Write as _;
use std::path::{Path, PathBuf};

use linkage_core::{
    ClusterConfig, ClusterError, Clustering, EmissionPolicy, RunReport, SinkError, Snapshot,
    SnapshotSink,
};

use crate::cli::{PathOrStdin, Policy, Verbosity};
use crate::error::CliError;
use crate::io::load_matrix;
use crate::sink::DirectorySink;

/// Options for the `cluster` command.
#[derive(Debug, Clone)]
pub struct ClusterArgs {
    /// Matrix source.
    pub matrix: PathOrStdin,
    /// Snapshot directory.
    pub out_dir: PathBuf,
    /// Emission policy selector.
    pub policy: Policy,
    /// Threshold for [`Policy::Threshold`].
    pub threshold: f32,
    /// Abort on the first failed snapshot.
    pub strict: bool,
    /// Pretty-print snapshot JSON.
    pub pretty: bool,
    /// Optional merge-history output path.
    pub history: Option<PathBuf>,
}

impl ClusterArgs {
    /// Translates the CLI flags into a core [`ClusterConfig`].
    pub fn config(&self) -> ClusterConfig {
        let policy = match self.policy {
            Policy::Eager => EmissionPolicy::Eager,
            Policy::Threshold => EmissionPolicy::Threshold(self.threshold),
        };
        ClusterConfig {
            policy,
            strict_emission: self.strict,
        }
    }
}

/// Runs the `cluster` command.
///
/// # Errors
///
/// - [`CliError::MalformedMatrix`] and other exit-2 variants when the input
///   cannot be loaded or the output directory cannot be prepared.
/// - [`CliError::EmissionFailed`] when a snapshot fails under `--strict`.
/// - [`CliError::HistoryWriteFailed`] when `--history` cannot be written.
pub fn run(args: &ClusterArgs, max_file_size: u64, verbosity: Verbosity) -> Result<(), CliError> {
    let stderr = std::io::stderr();
    let mut err_out = stderr.lock();
    let log_err = |e: std::io::Error| CliError::IoError {
        source: "stderr".to_owned(),
        detail: e.to_string(),
    };

    if verbosity != Verbosity::Quiet {
        writeln!(
            err_out,
            "Loading distance matrix from {}...",
            args.matrix.label()
        )
        .map_err(log_err)?;
    }

    let matrix = load_matrix(&args.matrix, max_file_size)?;
    let mut clustering =
        Clustering::new(matrix, args.config()).map_err(|e| cluster_error(e, &args.matrix))?;
    let mut dir_sink = DirectorySink::create(&args.out_dir, args.pretty)?;

    if verbosity != Verbosity::Quiet {
        writeln!(
            err_out,
            "Loaded {} items. Beginning clustering",
            clustering.distances().size()
        )
        .map_err(log_err)?;
    }

    let verbose = verbosity == Verbosity::Verbose;
    let mut sink = |snapshot: Snapshot| -> Result<(), SinkError> {
        let step = snapshot.step;
        let clusters = snapshot.clusters.len();
        let distance = snapshot.distance;
        dir_sink.emit(snapshot)?;
        if verbose {
            eprintln!("step {step}: {clusters} cluster(s) before merge at distance {distance}");
        }
        Ok(())
    };

    let report = clustering
        .run(&mut sink)
        .map_err(|e| cluster_error(e, &args.matrix))?;

    if let Some(path) = &args.history {
        write_history(path, &report)?;
    }

    if verbosity != Verbosity::Quiet {
        for failure in &report.failed_steps {
            writeln!(err_out, "warning: {failure}").map_err(log_err)?;
        }
        writeln!(err_out, "{}", report.summary()).map_err(log_err)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", report.merges).map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;

    Ok(())
}

/// Maps a core clustering error onto the CLI error for `source`.
fn cluster_error(e: ClusterError, source: &PathOrStdin) -> CliError {
    match e {
        ClusterError::Emission(failure) => CliError::EmissionFailed {
            detail: failure.to_string(),
        },
        ClusterError::InvalidThreshold { .. } => CliError::InvalidConfig {
            detail: e.to_string(),
        },
        ClusterError::EmptyInput | ClusterError::AlreadyStarted { .. } => {
            CliError::MalformedMatrix {
                source: source.label(),
                detail: e.to_string(),
            }
        }
    }
}

/// Writes the merge history of `report` as a JSON array.
fn write_history(path: &Path, report: &RunReport) -> Result<(), CliError> {
    let mut bytes =
        serde_json::to_vec_pretty(&report.history).map_err(|e| CliError::HistoryWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).map_err(|e| CliError::HistoryWriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn args(policy: Policy, threshold: f32, strict: bool) -> ClusterArgs {
        ClusterArgs {
            matrix: PathOrStdin::Stdin,
            out_dir: PathBuf::from("out"),
            policy,
            threshold,
            strict,
            pretty: false,
            history: None,
        }
    }

    #[test]
    fn eager_flags_map_to_eager_policy() {
        let config = args(Policy::Eager, 5.0, false).config();
        assert_eq!(config.policy, EmissionPolicy::Eager);
        assert!(!config.strict_emission);
    }

    #[test]
    fn threshold_flags_carry_the_threshold() {
        let config = args(Policy::Threshold, 0.75, true).config();
        assert_eq!(config.policy, EmissionPolicy::Threshold(0.75));
        assert!(config.strict_emission);
    }

    #[test]
    fn invalid_threshold_is_an_input_failure() {
        let err = cluster_error(
            ClusterError::InvalidThreshold {
                threshold: f32::NAN,
            },
            &PathOrStdin::Stdin,
        );
        assert!(matches!(err, CliError::InvalidConfig { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn non_finite_threshold_writes_no_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let matrix = dir.path().join("m.sim");
        let m = linkage_core::TriangleMatrix::new(3).expect("size 3");
        std::fs::write(&matrix, linkage_core::encode_triangle_matrix(&m).expect("encode"))
            .expect("write");
        let out_dir = dir.path().join("out");
        let args = ClusterArgs {
            matrix: PathOrStdin::Path(matrix),
            out_dir: out_dir.clone(),
            ..args(Policy::Threshold, f32::INFINITY, false)
        };
        let err = run(&args, 1024, Verbosity::Quiet).expect_err("should fail");
        assert_eq!(err.exit_code(), 2);
        assert!(!out_dir.exists());
    }

    #[test]
    fn history_is_written_as_json_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        let report = RunReport {
            items: 2,
            merges: 1,
            snapshots_emitted: 1,
            failed_steps: Vec::new(),
            history: vec![linkage_core::MergeStep {
                step: 0,
                from: 1,
                to: 0,
                distance: 0.5,
                emitted: true,
            }],
        };
        write_history(&path, &report).expect("write");
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value[0]["from"], 1);
        assert_eq!(value[0]["to"], 0);
        assert_eq!(value[0]["distance"], 0.5);
    }

    #[test]
    fn history_to_missing_directory_fails_with_exit_1() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("history.json");
        let err = write_history(&path, &RunReport::default()).expect_err("should fail");
        assert_eq!(err.exit_code(), 1);
    }
}
