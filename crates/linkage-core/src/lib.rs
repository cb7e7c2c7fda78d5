#![deny(clippy::print_stdout, clippy::print_stderr)]
//! Single-linkage agglomerative clustering over a precomputed distance matrix.
//!
//! The crate never touches the filesystem. Callers load a [`TriangleMatrix`]
//! (see [`codec`]), build a [`Clustering`] and drive it with a
//! [`SnapshotSink`] that decides where the per-step partitions go.

pub mod assignment;
pub mod codec;
pub mod driver;
pub mod link;
pub mod matrix;
pub mod snapshot;

pub use assignment::{ClusterAssignment, Partition};
pub use codec::{
    CodecError, decode_triangle_matrix, encode_triangle_matrix, read_triangle_matrix,
    write_triangle_matrix,
};
pub use driver::{
    ClusterConfig, ClusterError, Clustering, DriverState, EmissionFailure, EmissionPolicy,
    MergeStep, RunReport, cluster,
};
pub use link::{Candidate, min_link};
pub use matrix::{DistanceLookup, MatrixError, MatrixStats, TriangleMatrix};
pub use snapshot::{MemorySink, SinkError, Snapshot, SnapshotSink};

/// Returns the current version of the linkage-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
