//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl PathOrStdin {
    /// Label used in diagnostics: `-` for stdin, otherwise the path.
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "-".to_owned(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for reporting commands.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Aligned key/value lines (default).
    Human,
    /// A single JSON object.
    Json,
}

/// Parses a `--threshold` value, rejecting NaN and infinities.
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{s}' is not a finite number"))
    }
}

/// Which merge steps write a snapshot.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Policy {
    /// Write a snapshot before every merge (default).
    Eager,
    /// Write a snapshot only when the merge distance exceeds `--threshold`.
    Threshold,
}

/// All top-level subcommands exposed by the `linkage` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Cluster a binary distance matrix and write one JSON snapshot per step.
    Cluster {
        /// Path to the binary distance matrix, or `-` for stdin.
        #[arg(value_name = "MATRIX")]
        matrix: PathOrStdin,
        /// Directory receiving `<step>.json` snapshots (created if missing).
        ///
        /// Must not already hold `<step>.json` snapshot files from another run.
        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
        /// Snapshot emission policy: eager (default) or threshold.
        #[arg(long, default_value = "eager", value_enum)]
        policy: Policy,
        /// Distance a merge must exceed to be recorded under `--policy threshold`.
        ///
        /// Any finite number; negative values record every merge.
        #[arg(
            long,
            default_value = "0.0",
            value_name = "DISTANCE",
            value_parser = parse_threshold,
            allow_negative_numbers = true
        )]
        threshold: f32,
        /// Abort on the first snapshot that cannot be written.
        #[arg(long)]
        strict: bool,
        /// Pretty-print snapshot JSON with 2-space indentation.
        #[arg(long)]
        pretty: bool,
        /// Also write the full merge history as JSON to this path.
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
    },

    /// Print size and distance statistics for a binary distance matrix.
    Inspect {
        /// Path to the binary distance matrix, or `-` for stdin.
        #[arg(value_name = "MATRIX")]
        matrix: PathOrStdin,
        /// Output format: human (default) or json.
        #[arg(long, short = 'f', default_value = "human")]
        format: OutputFormat,
    },

    /// Print the linkage-core library version.
    Version,
}

/// Root CLI struct for the `linkage` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "linkage",
    version,
    about = "Single-linkage clustering of precomputed distance matrices",
    long_about = "Hierarchical single-linkage clustering over a binary triangular\n\
                  distance matrix. Writes the partition before each merge as a JSON\n\
                  snapshot so the dendrogram can be cut at any level."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report every written snapshot on stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `LINKAGE_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 1073741824 (1 GiB).
    #[arg(
        long,
        global = true,
        env = "LINKAGE_MAX_FILE_SIZE",
        default_value = "1073741824"
    )]
    pub max_file_size: u64,
}

/// Stderr verbosity derived from `--quiet` / `--verbose`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Progress and warnings.
    Normal,
    /// Progress, warnings and per-step detail.
    Verbose,
}

impl Verbosity {
    /// Resolves the verbosity from the global flags.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}
