//! Post-run invariant checkers for correctness validation.

use std::collections::BTreeSet;

use linkage_core::{DistanceLookup, RunReport, Snapshot, TriangleMatrix};

/// Verifies the merge history of a completed run:
/// - exactly `items - 1` merges, numbered from 0
/// - each merge joins the pair `(from, to)` with `from > to` at the distance
///   stored for that pair
/// - merge distances never decrease
pub fn check_report_invariants(matrix: &TriangleMatrix, report: &RunReport) -> Result<(), String> {
    let expected = matrix.size() - 1;
    if report.merges != expected {
        return Err(format!(
            "merge count mismatch: got {}, expected {expected}",
            report.merges
        ));
    }
    if report.history.len() != report.merges {
        return Err(format!(
            "history has {} entries for {} merges",
            report.history.len(),
            report.merges
        ));
    }

    let mut previous = f32::NEG_INFINITY;
    for (n, step) in report.history.iter().enumerate() {
        if step.step != n {
            return Err(format!("history entry {n} is numbered {}", step.step));
        }
        if step.from <= step.to {
            return Err(format!(
                "step {n} merges ({}, {}) in the wrong order",
                step.from, step.to
            ));
        }
        let stored = matrix.value(step.from, step.to);
        if stored.to_bits() != step.distance.to_bits() {
            return Err(format!(
                "step {n} reports distance {} but ({}, {}) stores {stored}",
                step.distance, step.from, step.to
            ));
        }
        if step.distance < previous {
            return Err(format!(
                "step {n} distance {} is below the previous {previous}",
                step.distance
            ));
        }
        previous = step.distance;
    }
    Ok(())
}

/// Verifies that the merge distances sum to the weight of a minimum spanning
/// tree, computed independently with Prim's algorithm.
pub fn check_spanning_tree_weight(
    matrix: &TriangleMatrix,
    report: &RunReport,
) -> Result<(), String> {
    let n = matrix.size();
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut total = 0.0f64;
    best[0] = 0.0;

    for _ in 0..n {
        let Some(next) = (0..n)
            .filter(|&v| !in_tree[v])
            .min_by(|&a, &b| best[a].total_cmp(&best[b]))
        else {
            break;
        };
        in_tree[next] = true;
        total += best[next];
        for v in 0..n {
            if !in_tree[v] {
                let d = f64::from(matrix.distance(next, v));
                if d < best[v] {
                    best[v] = d;
                }
            }
        }
    }

    let merged: f64 = report.history.iter().map(|s| f64::from(s.distance)).sum();
    let tolerance = 1e-6 * total.abs().max(1.0);
    if (merged - total).abs() > tolerance {
        return Err(format!(
            "merge distances sum to {merged}, spanning tree weighs {total}"
        ));
    }
    Ok(())
}

/// Verifies the shape of an emitted snapshot:
/// - every listed cluster has at least two members, sorted ascending
/// - no item appears twice and every item is below `items`
/// - clusters are ordered by size, then by smallest member
pub fn check_snapshot(snapshot: &Snapshot, items: usize) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for cluster in &snapshot.clusters {
        if cluster.len() < 2 {
            return Err(format!(
                "snapshot {} lists a singleton {cluster:?}",
                snapshot.step
            ));
        }
        if !cluster.windows(2).all(|w| w[0] < w[1]) {
            return Err(format!(
                "snapshot {} cluster {cluster:?} is not sorted",
                snapshot.step
            ));
        }
        for &item in cluster {
            if item >= items {
                return Err(format!(
                    "snapshot {} mentions item {item} of {items}",
                    snapshot.step
                ));
            }
            if !seen.insert(item) {
                return Err(format!(
                    "snapshot {} lists item {item} twice",
                    snapshot.step
                ));
            }
        }
    }
    let keys: Vec<(usize, usize)> = snapshot
        .clusters
        .iter()
        .map(|c| (c.len(), c[0]))
        .collect();
    if !keys.windows(2).all(|w| w[0] < w[1]) {
        return Err(format!(
            "snapshot {} clusters are out of order: {keys:?}",
            snapshot.step
        ));
    }
    Ok(())
}

/// Verifies that every planted group was completed before any two groups
/// were joined: the first `items - groups` merges stay inside a group and the
/// rest cross groups.
pub fn check_groups_merged_first(report: &RunReport, planted: &[usize]) -> Result<(), String> {
    let distinct: BTreeSet<usize> = planted.iter().copied().collect();
    let within = planted.len() - distinct.len();
    for step in &report.history {
        let same = planted[step.from] == planted[step.to];
        if step.step < within && !same {
            return Err(format!(
                "step {} joins groups {} and {} before all groups were complete",
                step.step, planted[step.from], planted[step.to]
            ));
        }
        if step.step >= within && same {
            return Err(format!(
                "step {} merges inside group {} after groups were complete",
                step.step, planted[step.from]
            ));
        }
    }
    Ok(())
}
