//! The merge loop tying the distance store, the assignment and the nearest-pair
//! search together.
//!
//! A [`Clustering`] moves through `Initialized -> Running -> Complete`, or to
//! `Failed` when the input is unusable or a strict-mode emission fails. Each
//! iteration of [`Clustering::run`]:
//!
//! 1. asks [`min_link`] for the closest pair in different clusters; `None`
//!    completes the run;
//! 2. hands a snapshot of the current partition to the sink when the
//!    [`EmissionPolicy`] accepts the candidate;
//! 3. merges the pair and advances the step counter.
//!
//! Snapshots therefore always show the partition *before* the merge at their
//! step. A run over `N` items performs exactly `N - 1` merges.
use std::fmt;

use serde::Serialize;

use crate::assignment::{ClusterAssignment, Partition};
use crate::link::{Candidate, min_link};
use crate::matrix::DistanceLookup;
use crate::snapshot::{SinkError, Snapshot, SnapshotSink};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which merge steps produce a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EmissionPolicy {
    /// Every merge step emits, starting with the all-singleton partition.
    #[default]
    Eager,
    /// Only steps whose candidate distance is strictly greater than the
    /// threshold emit. A threshold of `0.0` suppresses exact-match merges.
    ///
    /// The threshold must be finite; [`Clustering::new`] rejects NaN and
    /// infinities with [`ClusterError::InvalidThreshold`].
    Threshold(f32),
}

impl EmissionPolicy {
    /// Threshold that skips merges at distance exactly zero.
    pub const EXACT_MATCH: Self = Self::Threshold(0.0);

    /// Returns `true` if the step merging `candidate` should be recorded.
    pub fn accepts(&self, candidate: &Candidate) -> bool {
        match self {
            Self::Eager => true,
            Self::Threshold(limit) => candidate.distance > *limit,
        }
    }
}

/// Configuration for a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusterConfig {
    /// Snapshot emission policy.
    ///
    /// Default: [`EmissionPolicy::Eager`].
    pub policy: EmissionPolicy,

    /// Abort the run on the first sink failure instead of recording it.
    ///
    /// Default: `false`.
    pub strict_emission: bool,
}

// ---------------------------------------------------------------------------
// ClusterError
// ---------------------------------------------------------------------------

/// Errors that stop a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// The distance store covers no items.
    EmptyInput,
    /// A [`EmissionPolicy::Threshold`] limit is NaN or infinite.
    InvalidThreshold {
        /// The rejected limit.
        threshold: f32,
    },
    /// [`Clustering::run`] was called on a clustering that already started.
    AlreadyStarted {
        /// State at the time of the call.
        state: DriverState,
    },
    /// A sink failure in strict mode.
    Emission(EmissionFailure),
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("distance matrix contains no items"),
            Self::InvalidThreshold { threshold } => {
                write!(f, "emission threshold must be a finite number, got {threshold}")
            }
            Self::AlreadyStarted { state } => {
                write!(f, "clustering cannot be run again from state {state}")
            }
            Self::Emission(failure) => write!(f, "{failure}"),
        }
    }
}

impl std::error::Error for ClusterError {}

// ---------------------------------------------------------------------------
// DriverState
// ---------------------------------------------------------------------------

/// Lifecycle of a [`Clustering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Store loaded and validated; every item is a singleton.
    Initialized,
    /// The merge loop is in progress.
    Running,
    /// All items were merged into one cluster.
    Complete,
    /// The run stopped on an error.
    Failed,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// One accepted merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergeStep {
    /// Zero-based merge step.
    pub step: usize,
    /// Item whose cluster was relabelled.
    pub from: usize,
    /// Item whose cluster representative was kept.
    pub to: usize,
    /// Distance at which the clusters were joined.
    pub distance: f32,
    /// Whether a snapshot was handed to the sink for this step.
    pub emitted: bool,
}

/// A snapshot the sink could not record.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionFailure {
    /// Step of the snapshot that was lost.
    pub step: usize,
    /// Error reported by the sink.
    pub error: SinkError,
}

impl fmt::Display for EmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot {} could not be written: {}", self.step, self.error)
    }
}

/// Outcome of a completed clustering run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    /// Number of items clustered.
    pub items: usize,
    /// Number of accepted merges; `items - 1` for a complete run.
    pub merges: usize,
    /// Number of snapshots the sink accepted.
    pub snapshots_emitted: usize,
    /// Snapshots the sink rejected, in step order.
    pub failed_steps: Vec<EmissionFailure>,
    /// Every merge in the order it was applied; enough to rebuild the
    /// dendrogram.
    pub history: Vec<MergeStep>,
}

impl RunReport {
    /// Returns `true` if any snapshot failed to be recorded.
    pub fn has_failures(&self) -> bool {
        !self.failed_steps.is_empty()
    }

    /// One-line human-readable summary of the run.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Done clustering {} items in {} steps ({} snapshots written",
            self.items, self.merges, self.snapshots_emitted
        );
        if self.has_failures() {
            line.push_str(&format!(", {} failed", self.failed_steps.len()));
        }
        line.push(')');
        line
    }
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Single-linkage clustering run over a distance store.
#[derive(Debug, Clone)]
pub struct Clustering<D> {
    distances: D,
    assignment: ClusterAssignment,
    config: ClusterConfig,
    state: DriverState,
}

impl<D: DistanceLookup> Clustering<D> {
    /// Validates `distances` and prepares a fresh all-singleton assignment.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::EmptyInput`] when the store covers no items.
    /// - [`ClusterError::InvalidThreshold`] when the policy threshold is not
    ///   finite.
    pub fn new(distances: D, config: ClusterConfig) -> Result<Self, ClusterError> {
        let size = distances.size();
        if size < 1 {
            return Err(ClusterError::EmptyInput);
        }
        match config.policy {
            EmissionPolicy::Threshold(threshold) if !threshold.is_finite() => {
                return Err(ClusterError::InvalidThreshold { threshold });
            }
            EmissionPolicy::Eager | EmissionPolicy::Threshold(_) => {}
        }
        Ok(Self {
            distances,
            assignment: ClusterAssignment::new(size),
            config,
            state: DriverState::Initialized,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Current cluster assignment.
    pub fn assignment(&self) -> &ClusterAssignment {
        &self.assignment
    }

    /// The distance store being clustered.
    pub fn distances(&self) -> &D {
        &self.distances
    }

    /// Runs the merge loop to completion, handing snapshots to `sink`.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::AlreadyStarted`] if this clustering was already run.
    /// - [`ClusterError::Emission`] on a sink failure when
    ///   [`ClusterConfig::strict_emission`] is set. Without it, sink failures
    ///   are collected in [`RunReport::failed_steps`] and the loop continues.
    pub fn run<S>(&mut self, sink: &mut S) -> Result<RunReport, ClusterError>
    where
        S: SnapshotSink + ?Sized,
    {
        if self.state != DriverState::Initialized {
            return Err(ClusterError::AlreadyStarted { state: self.state });
        }
        self.state = DriverState::Running;

        let mut report = RunReport {
            items: self.distances.size(),
            ..RunReport::default()
        };

        let mut step = 0usize;
        while let Some(candidate) = min_link(&self.distances, &self.assignment) {
            let emitted = self.config.policy.accepts(&candidate);
            if emitted {
                let snapshot = Snapshot {
                    step,
                    distance: candidate.distance,
                    clusters: self.assignment.to_lists(),
                };
                match sink.emit(snapshot) {
                    Ok(()) => report.snapshots_emitted += 1,
                    Err(error) => {
                        let failure = EmissionFailure { step, error };
                        if self.config.strict_emission {
                            self.state = DriverState::Failed;
                            return Err(ClusterError::Emission(failure));
                        }
                        report.failed_steps.push(failure);
                    }
                }
            }

            self.assignment.merge(candidate.i, candidate.j);
            report.history.push(MergeStep {
                step,
                from: candidate.i,
                to: candidate.j,
                distance: candidate.distance,
                emitted,
            });
            step += 1;
        }

        report.merges = step;
        self.state = DriverState::Complete;
        Ok(report)
    }
}

/// Builds a [`Clustering`] and runs it in one call.
///
/// # Errors
///
/// See [`Clustering::new`] and [`Clustering::run`].
pub fn cluster<D, S>(
    distances: D,
    config: ClusterConfig,
    sink: &mut S,
) -> Result<RunReport, ClusterError>
where
    D: DistanceLookup,
    S: SnapshotSink + ?Sized,
{
    Clustering::new(distances, config)?.run(sink)
}

#[cfg(test)]
mod tests;
