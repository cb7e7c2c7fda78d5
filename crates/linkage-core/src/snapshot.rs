//! Clustering snapshots and the sinks that receive them.
//!
//! A [`Snapshot`] is an owned copy of the partition taken before a merge is
//! applied. Sinks receive snapshots by value, so a sink may hand one off to
//! another thread or queue without holding on to the live assignment.
use std::fmt;

use serde::Serialize;

/// The non-trivial clusters of a partition at one step of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Merge step this snapshot precedes, counting from zero.
    pub step: usize,
    /// Distance of the pair about to be merged at this step.
    pub distance: f32,
    /// Clusters with two or more members, ordered by ascending size; members
    /// ascending.
    pub clusters: Vec<Vec<usize>>,
}

impl Snapshot {
    /// Serializes the cluster lists as JSON, e.g. `[[0,1],[2,3,4]]`.
    ///
    /// # Errors
    ///
    /// Propagates any [`serde_json::Error`] from the encoder.
    pub fn to_json(&self, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
        if pretty {
            serde_json::to_vec_pretty(&self.clusters)
        } else {
            serde_json::to_vec(&self.clusters)
        }
    }
}

// ---------------------------------------------------------------------------
// SinkError
// ---------------------------------------------------------------------------

/// A snapshot sink failed to record a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    /// Human-readable cause.
    pub detail: String,
}

impl SinkError {
    /// Creates a sink error with the given description.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for SinkError {}

// ---------------------------------------------------------------------------
// SnapshotSink
// ---------------------------------------------------------------------------

/// Destination for the snapshots produced by a clustering run.
///
/// An `emit` call must be all-or-nothing: on `Err` the sink must not leave a
/// partial record of the snapshot behind.
pub trait SnapshotSink {
    /// Records one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the snapshot could not be recorded.
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError>;
}

impl<F> SnapshotSink for F
where
    F: FnMut(Snapshot) -> Result<(), SinkError>,
{
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self(snapshot)
    }
}

/// Collects snapshots in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Snapshots in emission order.
    pub snapshots: Vec<Snapshot>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Step numbers of the collected snapshots.
    pub fn steps(&self) -> Vec<usize> {
        self.snapshots.iter().map(|s| s.step).collect()
    }
}

impl SnapshotSink for MemorySink {
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self.snapshots.push(snapshot);
        Ok(())
    }
}
