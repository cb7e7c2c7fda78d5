#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use super::*;
use crate::matrix::TriangleMatrix;
use crate::snapshot::MemorySink;

// ── fixtures ─────────────────────────────────────────────────────────────────

fn four_items() -> TriangleMatrix {
    let mut m = TriangleMatrix::new(4).expect("size 4");
    m.set_value(1, 0, 1.0);
    m.set_value(2, 0, 2.0);
    m.set_value(2, 1, 2.1);
    m.set_value(3, 0, 3.0);
    m.set_value(3, 1, 3.1);
    m.set_value(3, 2, 3.2);
    m
}

fn with_exact_match() -> TriangleMatrix {
    let mut m = four_items();
    m.set_value(1, 0, 0.0);
    m
}

fn threshold() -> ClusterConfig {
    ClusterConfig {
        policy: EmissionPolicy::EXACT_MATCH,
        strict_emission: false,
    }
}

/// A sink that rejects the snapshot for one step and records the rest.
struct FailingAt {
    step: usize,
    inner: MemorySink,
}

impl SnapshotSink for FailingAt {
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        if snapshot.step == self.step {
            return Err(SinkError::new("disk full"));
        }
        self.inner.emit(snapshot)
    }
}

struct NoItems;

impl DistanceLookup for NoItems {
    fn size(&self) -> usize {
        0
    }

    fn distance(&self, _a: usize, _b: usize) -> f32 {
        0.0
    }
}

// ── eager policy ─────────────────────────────────────────────────────────────

#[test]
fn eager_emits_before_every_merge() {
    let mut sink = MemorySink::new();
    let report = cluster(four_items(), ClusterConfig::default(), &mut sink).expect("run");

    assert_eq!(report.items, 4);
    assert_eq!(report.merges, 3);
    assert_eq!(report.snapshots_emitted, 3);
    assert_eq!(sink.steps(), vec![0, 1, 2]);

    let clusters: Vec<Vec<Vec<usize>>> =
        sink.snapshots.iter().map(|s| s.clusters.clone()).collect();
    assert_eq!(
        clusters,
        vec![vec![], vec![vec![0, 1]], vec![vec![0, 1, 2]]]
    );
}

#[test]
fn snapshots_carry_candidate_distance() {
    let mut sink = MemorySink::new();
    cluster(four_items(), ClusterConfig::default(), &mut sink).expect("run");
    let distances: Vec<f32> = sink.snapshots.iter().map(|s| s.distance).collect();
    assert_eq!(distances, vec![1.0, 2.0, 3.0]);
}

#[test]
fn history_records_every_merge() {
    let mut sink = MemorySink::new();
    let report = cluster(four_items(), ClusterConfig::default(), &mut sink).expect("run");
    let pairs: Vec<(usize, usize, usize)> = report
        .history
        .iter()
        .map(|m| (m.step, m.from, m.to))
        .collect();
    assert_eq!(pairs, vec![(0, 1, 0), (1, 2, 0), (2, 3, 0)]);
    assert!(report.history.iter().all(|m| m.emitted));
}

#[test]
fn run_reaches_a_single_cluster() {
    let mut c = Clustering::new(four_items(), ClusterConfig::default()).expect("new");
    assert_eq!(c.state(), DriverState::Initialized);
    c.run(&mut MemorySink::new()).expect("run");
    assert_eq!(c.state(), DriverState::Complete);

    let a = c.assignment();
    for i in 0..4 {
        for j in 0..4 {
            assert!(a.is_same_cluster(i, j));
        }
    }
    assert_eq!(a.cluster_count(), 1);
    // Destination representatives win at every merge.
    assert_eq!(a.representatives(), &[0, 0, 0, 0]);
}

#[test]
fn single_item_completes_without_snapshots() {
    let m = TriangleMatrix::new(1).expect("size 1");
    let mut sink = MemorySink::new();
    let report = cluster(m, ClusterConfig::default(), &mut sink).expect("run");
    assert_eq!(report.merges, 0);
    assert_eq!(report.snapshots_emitted, 0);
    assert!(sink.snapshots.is_empty());
}

#[test]
fn empty_store_fails_before_running() {
    match Clustering::new(NoItems, ClusterConfig::default()) {
        Err(ClusterError::EmptyInput) => {}
        other => panic!("expected EmptyInput, got {:?}", other.map(|c| c.state())),
    }
}

#[test]
fn second_run_is_rejected() {
    let mut c = Clustering::new(four_items(), ClusterConfig::default()).expect("new");
    c.run(&mut MemorySink::new()).expect("first run");
    let err = c.run(&mut MemorySink::new()).expect_err("second run");
    assert_eq!(
        err,
        ClusterError::AlreadyStarted {
            state: DriverState::Complete
        }
    );
}

// ── threshold policy ─────────────────────────────────────────────────────────

#[test]
fn threshold_skips_exact_match_merges() {
    let mut sink = MemorySink::new();
    let report = cluster(with_exact_match(), threshold(), &mut sink).expect("run");

    assert_eq!(report.merges, 3);
    assert_eq!(report.snapshots_emitted, 2);
    assert_eq!(sink.steps(), vec![1, 2]);
    // The first recorded snapshot already contains the zero-distance merge.
    assert_eq!(sink.snapshots[0].clusters, vec![vec![0, 1]]);
    assert_eq!(sink.snapshots[0].distance, 2.0);
    assert!(!report.history[0].emitted);
}

#[test]
fn threshold_above_all_distances_emits_nothing() {
    let config = ClusterConfig {
        policy: EmissionPolicy::Threshold(10.0),
        strict_emission: false,
    };
    let mut sink = MemorySink::new();
    let report = cluster(four_items(), config, &mut sink).expect("run");
    assert_eq!(report.merges, 3);
    assert_eq!(report.snapshots_emitted, 0);
}

#[test]
fn nan_threshold_is_rejected_before_running() {
    let config = ClusterConfig {
        policy: EmissionPolicy::Threshold(f32::NAN),
        strict_emission: false,
    };
    match Clustering::new(four_items(), config) {
        Err(ClusterError::InvalidThreshold { threshold }) => assert!(threshold.is_nan()),
        other => panic!("expected InvalidThreshold, got {:?}", other.map(|c| c.state())),
    }
}

#[test]
fn infinite_thresholds_are_rejected() {
    for limit in [f32::INFINITY, f32::NEG_INFINITY] {
        let config = ClusterConfig {
            policy: EmissionPolicy::Threshold(limit),
            strict_emission: false,
        };
        let err = cluster(four_items(), config, &mut MemorySink::new()).expect_err("invalid");
        assert_eq!(err, ClusterError::InvalidThreshold { threshold: limit });
        assert!(err.to_string().contains("finite"), "{err}");
    }
}

#[test]
fn negative_threshold_emits_every_step() {
    let config = ClusterConfig {
        policy: EmissionPolicy::Threshold(-0.5),
        strict_emission: false,
    };
    let mut sink = MemorySink::new();
    let report = cluster(with_exact_match(), config, &mut sink).expect("run");
    assert_eq!(sink.steps(), vec![0, 1, 2]);
    assert_eq!(report.snapshots_emitted, 3);
}

#[test]
fn threshold_is_strict_greater_than() {
    let policy = EmissionPolicy::Threshold(1.0);
    let at = Candidate {
        i: 1,
        j: 0,
        distance: 1.0,
    };
    let above = Candidate {
        distance: 1.5,
        ..at
    };
    assert!(!policy.accepts(&at));
    assert!(policy.accepts(&above));
    assert!(EmissionPolicy::Eager.accepts(&at));
}

// ── emission failures ────────────────────────────────────────────────────────

#[test]
fn sink_failure_is_collected_and_loop_continues() {
    let mut sink = FailingAt {
        step: 1,
        inner: MemorySink::new(),
    };
    let report = cluster(four_items(), ClusterConfig::default(), &mut sink).expect("run");

    assert_eq!(report.merges, 3);
    assert_eq!(report.snapshots_emitted, 2);
    assert_eq!(sink.inner.steps(), vec![0, 2]);
    assert!(report.has_failures());
    assert_eq!(report.failed_steps.len(), 1);
    assert_eq!(report.failed_steps[0].step, 1);
    assert_eq!(report.failed_steps[0].error.detail, "disk full");
}

#[test]
fn strict_mode_stops_on_sink_failure() {
    let config = ClusterConfig {
        policy: EmissionPolicy::Eager,
        strict_emission: true,
    };
    let mut c = Clustering::new(four_items(), config).expect("new");
    let mut sink = FailingAt {
        step: 1,
        inner: MemorySink::new(),
    };
    match c.run(&mut sink) {
        Err(ClusterError::Emission(failure)) => assert_eq!(failure.step, 1),
        other => panic!("expected Emission error, got {other:?}"),
    }
    assert_eq!(c.state(), DriverState::Failed);
    assert_eq!(sink.inner.steps(), vec![0]);
}

// ── reporting ────────────────────────────────────────────────────────────────

#[test]
fn summary_mentions_counts() {
    let mut sink = FailingAt {
        step: 0,
        inner: MemorySink::new(),
    };
    let report = cluster(four_items(), ClusterConfig::default(), &mut sink).expect("run");
    let line = report.summary();
    assert!(line.contains("4 items"), "summary: {line}");
    assert!(line.contains("3 steps"), "summary: {line}");
    assert!(line.contains("1 failed"), "summary: {line}");
}

#[test]
fn emission_failure_message_names_step() {
    let failure = EmissionFailure {
        step: 7,
        error: SinkError::new("permission denied"),
    };
    let msg = ClusterError::Emission(failure).to_string();
    assert!(msg.contains('7'), "message: {msg}");
    assert!(msg.contains("permission denied"), "message: {msg}");
}
