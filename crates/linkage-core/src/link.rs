//! Nearest-pair search driving each clustering step.
//!
//! [`min_link`] scans every unordered pair `(i, j)` with `j < i`, skipping
//! pairs whose items already share a cluster, and keeps the smallest distance.
//! The scan runs `i` ascending with `j` ascending inside it, and a later pair
//! replaces the current best only when it is strictly smaller, so among equal
//! distances the first pair in scan order wins. Each call is `O(N^2)`.
use serde::Serialize;

use crate::assignment::Partition;
use crate::matrix::DistanceLookup;

/// The closest pair of items that are not yet in the same cluster.
///
/// `i` is always strictly greater than `j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    /// The larger item index.
    pub i: usize,
    /// The smaller item index.
    pub j: usize,
    /// Distance between `i` and `j`.
    pub distance: f32,
}

/// Returns the closest pair of items in different clusters, or `None` once
/// every item belongs to a single cluster.
///
/// NaN distances never displace an existing best pair, and any comparable
/// distance displaces a NaN best. A NaN pair is only returned when every
/// eligible pair is NaN.
pub fn min_link<D, P>(distances: &D, partition: &P) -> Option<Candidate>
where
    D: DistanceLookup + ?Sized,
    P: Partition + ?Sized,
{
    let size = distances.size();
    let mut best: Option<Candidate> = None;

    for i in 0..size {
        for j in 0..i {
            if partition.is_same_cluster(i, j) {
                continue;
            }
            let distance = distances.distance(i, j);
            let better = match best {
                None => true,
                Some(current) if current.distance.is_nan() => !distance.is_nan(),
                Some(current) => distance < current.distance,
            };
            if better {
                best = Some(Candidate { i, j, distance });
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
