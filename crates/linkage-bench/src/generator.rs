//! Distance matrix generator.
//!
//! Items are scattered over a fixed number of planted groups. Pairs inside a
//! group get small distances (some of them exact matches at `0.0`), pairs
//! across groups get distances shifted above the within-group range, so a
//! single-linkage run finishes every group before joining any two of them.

use linkage_core::{MatrixError, TriangleMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for the matrix generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of items `N`.
    pub items: usize,
    /// Number of planted groups (at least 1).
    pub groups: usize,
    /// Upper bound of within-group distances.
    pub within_spread: f32,
    /// Offset added to every cross-group distance.
    pub between_offset: f32,
    /// Width of the cross-group distance range above `between_offset`.
    pub between_spread: f32,
    /// Fraction of within-group pairs that are exact matches (0.0-1.0).
    pub exact_match_fraction: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 50 items, 1225 pairs
    Small,
    /// 250 items, ~31K pairs
    Medium,
    /// 800 items, ~320K pairs
    Large,
    /// 2500 items, ~3.1M pairs, ~12MB on disk
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let (items, groups) = match self {
            SizeTier::Small => (50, 5),
            SizeTier::Medium => (250, 20),
            SizeTier::Large => (800, 50),
            SizeTier::XLarge => (2500, 120),
        };
        GeneratorConfig {
            seed,
            items,
            groups,
            within_spread: 1.0,
            between_offset: 2.0,
            between_spread: 8.0,
            exact_match_fraction: 0.1,
        }
    }
}

/// Generates a matrix from `config`. The same config always yields the same
/// matrix.
///
/// # Errors
///
/// Returns [`MatrixError`] if `config.items` is zero or too large to store.
pub fn generate_matrix(config: &GeneratorConfig) -> Result<TriangleMatrix, MatrixError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let group_of = assign_groups(&mut rng, config.items, config.groups.max(1));

    let mut matrix = TriangleMatrix::new(config.items)?;
    for i in 1..config.items {
        for j in 0..i {
            let d = if group_of[i] == group_of[j] {
                if rng.gen_bool(config.exact_match_fraction) {
                    0.0
                } else {
                    rng.gen_range(0.0..config.within_spread)
                }
            } else {
                config.between_offset + rng.gen_range(0.0..config.between_spread)
            };
            matrix.set_value(i, j, d);
        }
    }
    Ok(matrix)
}

/// Returns the planted group of every item for `config`, as drawn by
/// [`generate_matrix`].
pub fn planted_groups(config: &GeneratorConfig) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    assign_groups(&mut rng, config.items, config.groups.max(1))
}

fn assign_groups(rng: &mut StdRng, items: usize, groups: usize) -> Vec<usize> {
    (0..items).map(|_| rng.gen_range(0..groups)).collect()
}
