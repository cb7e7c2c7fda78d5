//! Compact storage for a symmetric pairwise distance matrix.
//!
//! Only the strict lower triangle is kept: the diagonal is undefined and the
//! upper triangle mirrors the lower one. For `N` items the backing buffer holds
//! exactly `N * (N - 1) / 2` values laid out row by row, so the pair `(i, j)`
//! with `i > j` lives at offset `i * (i - 1) / 2 + j`.
//!
//! [`TriangleMatrix`] is the only production implementation of
//! [`DistanceLookup`], the read-only capability the clustering loop needs.
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// MatrixError
// ---------------------------------------------------------------------------

/// Errors produced when a [`TriangleMatrix`] cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The requested item count is below one.
    EmptyMatrix {
        /// The rejected size.
        size: i64,
    },
    /// The value buffer length is not a triangular number `N * (N - 1) / 2`.
    NotTriangular {
        /// Number of values supplied.
        len: usize,
    },
    /// The item count is so large that the triangle length overflows `usize`.
    TooLarge {
        /// The rejected size.
        size: u64,
    },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMatrix { size } => {
                write!(f, "distance matrix must hold at least one item, got size {size}")
            }
            Self::NotTriangular { len } => write!(
                f,
                "distance matrix has {len} values, which is not a triangular number N*(N-1)/2"
            ),
            Self::TooLarge { size } => {
                write!(f, "distance matrix size {size} is too large to address")
            }
        }
    }
}

impl std::error::Error for MatrixError {}

// ---------------------------------------------------------------------------
// DistanceLookup
// ---------------------------------------------------------------------------

/// Read-only distance lookup by unordered item pair.
pub trait DistanceLookup {
    /// Number of items `N` covered by the lookup.
    fn size(&self) -> usize;

    /// Distance between items `a` and `b` in either order.
    ///
    /// # Panics
    ///
    /// Panics when `a == b` or either index is out of range.
    fn distance(&self, a: usize, b: usize) -> f32;
}

// ---------------------------------------------------------------------------
// TriangleMatrix
// ---------------------------------------------------------------------------

/// Number of stored values for `size` items, or `None` on overflow.
pub fn triangle_len(size: usize) -> Option<usize> {
    size.checked_mul(size.saturating_sub(1)).map(|n| n / 2)
}

/// Inverse of [`triangle_len`]: the item count whose triangle holds exactly
/// `len` values, or `None` if `len` is not triangular.
///
/// A zero-length buffer maps to a single item.
pub fn size_for_len(len: usize) -> Option<usize> {
    #[allow(clippy::cast_precision_loss)]
    let discriminant = 1.0 + 8.0 * len as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let size = ((1.0 + discriminant.sqrt()) / 2.0).round() as usize;
    (triangle_len(size) == Some(len)).then_some(size)
}

/// Offset of the pair `(i, j)` in the row-major lower triangle.
fn offset(i: usize, j: usize) -> usize {
    assert!(
        i > j,
        "first index into TriangleMatrix must be larger than the second: ({i}, {j})"
    );
    i * (i - 1) / 2 + j
}

/// Lower-triangle distance matrix backed by a flat `f32` buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMatrix {
    values: Vec<f32>,
    size: usize,
}

impl TriangleMatrix {
    /// Creates a zero-filled matrix for `size` items.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyMatrix`] when `size` is zero and
    /// [`MatrixError::TooLarge`] when the buffer length overflows.
    pub fn new(size: usize) -> Result<Self, MatrixError> {
        if size < 1 {
            return Err(MatrixError::EmptyMatrix { size: 0 });
        }
        let len = triangle_len(size).ok_or(MatrixError::TooLarge { size: size as u64 })?;
        Ok(Self {
            values: vec![0.0; len],
            size,
        })
    }

    /// Wraps an existing row-major lower-triangle buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::NotTriangular`] when `values.len()` is not
    /// `N * (N - 1) / 2` for any `N`.
    pub fn from_values(values: Vec<f32>) -> Result<Self, MatrixError> {
        let size = size_for_len(values.len())
            .ok_or(MatrixError::NotTriangular { len: values.len() })?;
        Ok(Self { values, size })
    }

    /// Returns the distance stored for `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics unless `size() > i > j`. Callers passing a reversed or diagonal
    /// pair have a logic error.
    pub fn value(&self, i: usize, j: usize) -> f32 {
        self.check_row(i);
        self.values[offset(i, j)]
    }

    /// Stores `v` for `(i, j)`.
    ///
    /// # Panics
    ///
    /// Same contract as [`TriangleMatrix::value`].
    pub fn set_value(&mut self, i: usize, j: usize, v: f32) {
        self.check_row(i);
        let at = offset(i, j);
        self.values[at] = v;
    }

    /// Number of items `N`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The raw row-major lower-triangle buffer.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Summary statistics over every stored pair.
    pub fn stats(&self) -> MatrixStats {
        let mut stats = MatrixStats {
            items: self.size,
            pairs: self.values.len(),
            min: None,
            max: None,
            mean: None,
            zero_pairs: 0,
            non_finite_pairs: 0,
        };
        let mut sum = 0.0f64;
        let mut finite = 0usize;
        for &v in &self.values {
            if !v.is_finite() {
                stats.non_finite_pairs += 1;
                continue;
            }
            if v == 0.0 {
                stats.zero_pairs += 1;
            }
            stats.min = Some(stats.min.map_or(v, |m: f32| m.min(v)));
            stats.max = Some(stats.max.map_or(v, |m: f32| m.max(v)));
            sum += f64::from(v);
            finite += 1;
        }
        if finite > 0 {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / finite as f64;
            stats.mean = Some(mean);
        }
        stats
    }

    fn check_row(&self, i: usize) {
        assert!(
            i < self.size,
            "index {i} out of range for TriangleMatrix of size {}",
            self.size
        );
    }
}

impl DistanceLookup for TriangleMatrix {
    fn size(&self) -> usize {
        self.size
    }

    fn distance(&self, a: usize, b: usize) -> f32 {
        if a > b {
            self.value(a, b)
        } else {
            self.value(b, a)
        }
    }
}

// ---------------------------------------------------------------------------
// MatrixStats
// ---------------------------------------------------------------------------

/// Distribution summary of a [`TriangleMatrix`].
///
/// `min`, `max` and `mean` ignore NaN and infinite entries and are `None`
/// when no finite pair exists (including the single-item matrix).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixStats {
    /// Number of items.
    pub items: usize,
    /// Number of stored pairs.
    pub pairs: usize,
    /// Smallest finite distance.
    pub min: Option<f32>,
    /// Largest finite distance.
    pub max: Option<f32>,
    /// Arithmetic mean of the finite distances.
    pub mean: Option<f64>,
    /// Pairs at exactly `0.0` (exact matches).
    pub zero_pairs: usize,
    /// Pairs holding NaN or an infinity.
    pub non_finite_pairs: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
