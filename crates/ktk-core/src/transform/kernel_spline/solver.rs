//! Robust solution of the landmark system.
//!
//! Duplicate or collinear landmarks make L singular, so the system is
//! inverted through its singular value decomposition and small singular
//! values are dropped instead of amplified.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// Which stages of the L → L⁻¹ → W chain are current.
///
/// Each stage requires the previous one. Any change of source landmarks,
/// stiffness or kernel resets all three flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    pub l_matrix_computed: bool,
    pub l_inverse_computed: bool,
    pub w_matrix_computed: bool,
}

impl CacheState {
    /// Nothing computed.
    pub fn invalidated() -> Self {
        Self::default()
    }

    /// Every stage computed.
    pub fn complete() -> Self {
        Self {
            l_matrix_computed: true,
            l_inverse_computed: true,
            w_matrix_computed: true,
        }
    }

    /// Whether the transform can be evaluated.
    pub fn is_complete(&self) -> bool {
        self.l_matrix_computed && self.l_inverse_computed && self.w_matrix_computed
    }
}

/// Pseudo-inverse of a matrix together with its numerical rank.
#[derive(Debug, Clone)]
pub struct PseudoInverse {
    pub matrix: DMatrix<f64>,
    pub rank: usize,
    pub tolerance: f64,
}

/// Absolute cutoff below which singular values of L are treated as zero.
///
/// The cutoff does not scale with the largest singular value: kernel entries
/// grow with the landmark spread while the affine rows do not.
pub const DEFAULT_PINV_TOLERANCE: f64 = 1e-8;

/// Moore-Penrose pseudo-inverse through the SVD.
///
/// Singular values at or below `tolerance` (or [`DEFAULT_PINV_TOLERANCE`]
/// when `None`) are treated as zero. Matrices with non-finite entries are
/// rejected before the decomposition.
pub fn pseudo_inverse(matrix: &DMatrix<f64>, tolerance: Option<f64>) -> Result<PseudoInverse> {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return Ok(PseudoInverse {
            matrix: DMatrix::zeros(cols, rows),
            rank: 0,
            tolerance: 0.0,
        });
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(TransformError::decomposition(
            "landmark system contains non-finite entries",
        ));
    }

    let svd = matrix.clone().svd(true, true);
    let tolerance = tolerance.unwrap_or(DEFAULT_PINV_TOLERANCE);
    let rank = svd.singular_values.iter().filter(|s| **s > tolerance).count();

    if rank < rows.min(cols) {
        tracing::warn!(
            "Landmark system is rank deficient (rank {} of {}); using pseudo-inverse",
            rank,
            rows.min(cols)
        );
    }

    let inverse = svd
        .pseudo_inverse(tolerance)
        .map_err(TransformError::decomposition)?;

    Ok(PseudoInverse {
        matrix: inverse,
        rank,
        tolerance,
    })
}

/// Solve `L · W = Y` given a cached pseudo-inverse of L.
pub fn solve_w(l_inverse: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    if l_inverse.ncols() != y.len() {
        return Err(TransformError::stale_cache(format!(
            "L inverse has {} columns but Y has {} rows",
            l_inverse.ncols(),
            y.len()
        )));
    }
    Ok(l_inverse * y)
}
