//! Cluster membership for a fixed set of items.
//!
//! [`ClusterAssignment`] maps every item to a representative value; two items
//! share a cluster exactly when their representatives are equal. Merging is a
//! full relabel scan rather than a parent-pointer forest: every item carrying
//! the source representative is switched to the destination representative.
//! That keeps the representative of a merged cluster predictable, because the
//! destination's value always wins, and the snapshots written by the
//! clustering loop depend on it.
use std::collections::BTreeMap;

/// A partition of `{0, .., n-1}` that supports membership queries and merges.
pub trait Partition {
    /// Number of items in the partition.
    fn len(&self) -> usize;

    /// Returns `true` if the partition covers no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when `i` and `j` belong to the same cluster.
    fn is_same_cluster(&self, i: usize, j: usize) -> bool;

    /// Unifies the clusters containing `from` and `to`.
    fn merge(&mut self, from: usize, to: usize);
}

/// Item-to-representative assignment with relabel-scan merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    representatives: Vec<usize>,
}

impl ClusterAssignment {
    /// Creates `size` singleton clusters; item `i` starts as its own
    /// representative.
    pub fn new(size: usize) -> Self {
        Self {
            representatives: (0..size).collect(),
        }
    }

    /// Current representative value of item `i`.
    pub fn representative(&self, i: usize) -> usize {
        self.representatives[i]
    }

    /// The raw item-to-representative mapping.
    pub fn representatives(&self) -> &[usize] {
        &self.representatives
    }

    /// Number of distinct clusters, singletons included.
    pub fn cluster_count(&self) -> usize {
        let mut reps = self.representatives.clone();
        reps.sort_unstable();
        reps.dedup();
        reps.len()
    }

    /// Materializes the non-trivial clusters as ordered member lists.
    ///
    /// Members of each cluster are ascending. Singletons are dropped. Clusters
    /// are ordered by ascending size, and clusters of equal size by their
    /// smallest member.
    pub fn to_lists(&self) -> Vec<Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (item, &rep) in self.representatives.iter().enumerate() {
            groups.entry(rep).or_default().push(item);
        }

        let mut lists: Vec<Vec<usize>> = groups
            .into_values()
            .filter(|members| members.len() > 1)
            .collect();
        lists.sort_by_key(|members| (members.len(), members[0]));
        lists
    }
}

impl Partition for ClusterAssignment {
    fn len(&self) -> usize {
        self.representatives.len()
    }

    fn is_same_cluster(&self, i: usize, j: usize) -> bool {
        self.representatives[i] == self.representatives[j]
    }

    fn merge(&mut self, from: usize, to: usize) {
        let rep_from = self.representatives[from];
        let rep_to = self.representatives[to];
        for rep in &mut self.representatives {
            if *rep == rep_from {
                *rep = rep_to;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_singletons() {
        let a = ClusterAssignment::new(5);
        assert_eq!(a.len(), 5);
        assert_eq!(a.cluster_count(), 5);
        for i in 0..5 {
            assert_eq!(a.representative(i), i);
            for j in 0..5 {
                assert_eq!(a.is_same_cluster(i, j), i == j);
            }
        }
    }

    #[test]
    fn empty_assignment() {
        let a = ClusterAssignment::new(0);
        assert!(a.is_empty());
        assert!(a.to_lists().is_empty());
    }

    #[test]
    fn merge_unifies_and_is_symmetric() {
        let mut a = ClusterAssignment::new(4);
        a.merge(1, 3);
        assert!(a.is_same_cluster(1, 3));
        assert!(a.is_same_cluster(3, 1));
        assert!(!a.is_same_cluster(0, 1));
        assert_eq!(a.cluster_count(), 3);
    }

    #[test]
    fn destination_representative_wins() {
        let mut a = ClusterAssignment::new(5);
        a.merge(1, 0);
        assert_eq!(a.representative(1), 0);
        a.merge(2, 4);
        assert_eq!(a.representative(2), 4);
        // Merge the {0,1} cluster into {2,4}: everyone takes 4.
        a.merge(0, 2);
        assert_eq!(a.representatives(), &[4, 4, 4, 3, 4]);
    }

    #[test]
    fn merge_is_transitive() {
        let mut a = ClusterAssignment::new(4);
        a.merge(0, 1);
        a.merge(2, 3);
        a.merge(1, 2);
        for i in 0..4 {
            for j in 0..4 {
                assert!(a.is_same_cluster(i, j), "{i} and {j} should share a cluster");
            }
        }
        assert_eq!(a.cluster_count(), 1);
    }

    #[test]
    fn remerge_is_a_noop() {
        let mut a = ClusterAssignment::new(3);
        a.merge(2, 0);
        let before = a.clone();
        a.merge(2, 0);
        a.merge(0, 2);
        assert_eq!(a.to_lists(), before.to_lists());
        assert!(a.is_same_cluster(0, 2));
    }

    #[test]
    fn to_lists_drops_singletons() {
        let mut a = ClusterAssignment::new(5);
        assert!(a.to_lists().is_empty());
        a.merge(3, 1);
        assert_eq!(a.to_lists(), vec![vec![1, 3]]);
    }

    #[test]
    fn to_lists_orders_by_size_then_smallest_member() {
        let mut a = ClusterAssignment::new(9);
        // {6,7,8} size 3, {4,5} size 2, {0,2} size 2.
        a.merge(8, 7);
        a.merge(6, 7);
        a.merge(5, 4);
        a.merge(2, 0);
        assert_eq!(
            a.to_lists(),
            vec![vec![0, 2], vec![4, 5], vec![6, 7, 8]]
        );
    }

    #[test]
    fn to_lists_members_are_ascending_regardless_of_representative() {
        let mut a = ClusterAssignment::new(4);
        a.merge(0, 3);
        a.merge(1, 3);
        assert_eq!(a.representative(0), 3);
        assert_eq!(a.to_lists(), vec![vec![0, 1, 3]]);
    }
}
