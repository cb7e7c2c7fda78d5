//! Binary encoding of a [`TriangleMatrix`].
//!
//! The layout has no header, version tag or checksum:
//!
//! ```text
//! size: i32 LE | values: [f32 LE; size * (size - 1) / 2]
//! ```
//!
//! Values follow the row-major lower-triangle order used by
//! [`TriangleMatrix::values`]. Decoding is strict: a short body and trailing
//! bytes are both rejected.
use std::fmt;
use std::io::{Read, Write};

use crate::matrix::{MatrixError, TriangleMatrix, triangle_len};

/// Width in bytes of the leading size field.
pub const SIZE_FIELD_LEN: usize = 4;

/// Width in bytes of one encoded distance.
pub const VALUE_LEN: usize = 4;

// ---------------------------------------------------------------------------
// CodecError
// ---------------------------------------------------------------------------

/// Errors produced while reading or writing the binary matrix format.
#[derive(Debug)]
pub enum CodecError {
    /// Fewer than [`SIZE_FIELD_LEN`] bytes were available for the size field.
    TruncatedHeader {
        /// Number of bytes actually present.
        got: usize,
    },
    /// The body length disagrees with the size field.
    LengthMismatch {
        /// Item count declared by the size field.
        size: usize,
        /// Expected body length in bytes.
        expected: usize,
        /// Actual body length in bytes.
        got: usize,
    },
    /// The declared size cannot form a valid matrix.
    Matrix(MatrixError),
    /// The matrix has too many items for the 32-bit size field.
    SizeOverflow {
        /// The item count that could not be encoded.
        size: usize,
    },
    /// The underlying reader or writer failed.
    Io(std::io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader { got } => write!(
                f,
                "distance matrix header truncated: expected {SIZE_FIELD_LEN} bytes, got {got}"
            ),
            Self::LengthMismatch {
                size,
                expected,
                got,
            } => write!(
                f,
                "distance matrix of size {size} needs {expected} bytes of values, found {got}"
            ),
            Self::Matrix(e) => write!(f, "{e}"),
            Self::SizeOverflow { size } => {
                write!(f, "matrix size {size} does not fit the 32-bit size field")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Matrix(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::TruncatedHeader { .. }
            | Self::LengthMismatch { .. }
            | Self::SizeOverflow { .. } => None,
        }
    }
}

impl From<MatrixError> for CodecError {
    fn from(e: MatrixError) -> Self {
        Self::Matrix(e)
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a complete in-memory buffer.
///
/// # Errors
///
/// - [`CodecError::TruncatedHeader`] when the buffer is shorter than the size field.
/// - [`CodecError::Matrix`] when the declared size is below one.
/// - [`CodecError::LengthMismatch`] when the body is short or has trailing bytes.
pub fn decode_triangle_matrix(bytes: &[u8]) -> Result<TriangleMatrix, CodecError> {
    let Some((header, body)) = bytes.split_first_chunk::<SIZE_FIELD_LEN>() else {
        return Err(CodecError::TruncatedHeader { got: bytes.len() });
    };

    let declared = i32::from_le_bytes(*header);
    let size = usize::try_from(declared)
        .ok()
        .filter(|&n| n >= 1)
        .ok_or(MatrixError::EmptyMatrix {
            size: i64::from(declared),
        })?;

    let expected = triangle_len(size)
        .and_then(|len| len.checked_mul(VALUE_LEN))
        .ok_or(MatrixError::TooLarge { size: size as u64 })?;
    if body.len() != expected {
        return Err(CodecError::LengthMismatch {
            size,
            expected,
            got: body.len(),
        });
    }

    let values: Vec<f32> = body
        .chunks_exact(VALUE_LEN)
        .map(|chunk| {
            let mut raw = [0u8; VALUE_LEN];
            raw.copy_from_slice(chunk);
            f32::from_le_bytes(raw)
        })
        .collect();

    Ok(TriangleMatrix::from_values(values)?)
}

/// Reads a matrix from `reader` until end of stream.
///
/// # Errors
///
/// [`CodecError::Io`] if the read fails, otherwise as [`decode_triangle_matrix`].
pub fn read_triangle_matrix<R: Read>(mut reader: R) -> Result<TriangleMatrix, CodecError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_triangle_matrix(&bytes)
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes `matrix` into a fresh buffer.
///
/// # Errors
///
/// [`CodecError::SizeOverflow`] when the item count exceeds `i32::MAX`.
pub fn encode_triangle_matrix(matrix: &TriangleMatrix) -> Result<Vec<u8>, CodecError> {
    let size = i32::try_from(matrix.size()).map_err(|_| CodecError::SizeOverflow {
        size: matrix.size(),
    })?;
    let mut buf = Vec::with_capacity(SIZE_FIELD_LEN + matrix.values().len() * VALUE_LEN);
    buf.extend_from_slice(&size.to_le_bytes());
    for v in matrix.values() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    Ok(buf)
}

/// Writes `matrix` to `writer`.
///
/// # Errors
///
/// As [`encode_triangle_matrix`], plus [`CodecError::Io`] on write failure.
pub fn write_triangle_matrix<W: Write>(
    matrix: &TriangleMatrix,
    mut writer: W,
) -> Result<(), CodecError> {
    let bytes = encode_triangle_matrix(matrix)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
