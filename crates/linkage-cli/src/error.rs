/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `linkage` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The matrix could not be read or decoded,
///   or the output directory is unusable. Nothing has been clustered and no
///   snapshot has been written.
/// - Exit code **1**: the run started but stopped on a failure (a snapshot
///   could not be written under `--strict`, or the history file failed).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `linkage` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only).
        actual: Option<u64>,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input bytes are not a valid distance matrix.
    MalformedMatrix {
        /// A human-readable label for the source.
        source: String,
        /// Why decoding failed.
        detail: String,
    },

    /// The snapshot output directory could not be created or is not a directory.
    OutputDirUnusable {
        /// The requested output directory.
        path: PathBuf,
        /// The underlying error message.
        detail: String,
    },

    /// The clustering options were rejected before the run started.
    InvalidConfig {
        /// Why the options were rejected.
        detail: String,
    },

    // --- Exit code 1: run failures ---
    /// A snapshot could not be written and `--strict` was set.
    EmissionFailed {
        /// Description of the failed step.
        detail: String,
    },

    /// The merge history could not be written.
    HistoryWriteFailed {
        /// The requested history path.
        path: PathBuf,
        /// The underlying error message.
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2`: input failure (file not found, malformed matrix, etc.).
    /// - `1`: run failure (strict emission failure, history write failure).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::MalformedMatrix { .. }
            | Self::OutputDirUnusable { .. }
            | Self::InvalidConfig { .. } => 2,

            Self::EmissionFailed { .. } | Self::HistoryWriteFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::MalformedMatrix { source, detail } => {
                format!("error: malformed distance matrix in {source}: {detail}")
            }
            Self::OutputDirUnusable { path, detail } => {
                format!(
                    "error: cannot use output directory {}: {detail}",
                    path.display()
                )
            }
            Self::InvalidConfig { detail } => {
                format!("error: invalid clustering options: {detail}")
            }
            Self::EmissionFailed { detail } => {
                format!("error: aborting run: {detail}")
            }
            Self::HistoryWriteFailed { path, detail } => {
                format!(
                    "error: could not write merge history to {}: {detail}",
                    path.display()
                )
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
