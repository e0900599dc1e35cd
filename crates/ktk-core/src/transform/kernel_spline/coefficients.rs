//! Decomposition of the solved weights into deformable and affine parts.

use nalgebra::{DVector, SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// Solved spline weights.
///
/// `deformation[i]` weights the kernel centred on landmark `i`; `affine` and
/// `translation` form the affine part of the displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineCoefficients<const D: usize> {
    deformation: Vec<SVector<f64, D>>,
    affine: SMatrix<f64, D, D>,
    translation: SVector<f64, D>,
}

impl<const D: usize> SplineCoefficients<D> {
    /// Zero weights for `n` landmarks: the identity mapping.
    pub fn zeros(n: usize) -> Self {
        Self {
            deformation: vec![SVector::zeros(); n],
            affine: SMatrix::zeros(),
            translation: SVector::zeros(),
        }
    }

    /// Split the raw solution `W` of an `n`-landmark system.
    ///
    /// `W` is consumed: only the decomposed form is needed afterwards.
    ///
    /// # Panics
    /// Panics if `w.len() != n·D + D·(D+1)`.
    pub fn reorganize_w(w: DVector<f64>, n: usize) -> Self {
        let nd = n * D;
        assert_eq!(
            w.len(),
            nd + D * (D + 1),
            "W length does not match {} landmarks in {}D",
            n,
            D
        );

        let deformation = (0..n)
            .map(|i| SVector::from_fn(|r, _| w[i * D + r]))
            .collect();
        // Column j of the affine block comes from coordinate j of the basis.
        let affine = SMatrix::from_fn(|r, j| w[nd + j * D + r]);
        let translation = SVector::from_fn(|r, _| w[nd + D * D + r]);

        Self {
            deformation,
            affine,
            translation,
        }
    }

    /// Per-landmark deformable weights.
    pub fn deformation(&self) -> &[SVector<f64, D>] {
        &self.deformation
    }

    /// Linear part of the affine displacement.
    pub fn affine(&self) -> &SMatrix<f64, D, D> {
        &self.affine
    }

    /// Translation part of the affine displacement.
    pub fn translation(&self) -> &SVector<f64, D> {
        &self.translation
    }

    /// Whether every weight is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.deformation.iter().all(|c| c.iter().all(|v| *v == 0.0))
            && self.affine.iter().all(|v| *v == 0.0)
            && self.translation.iter().all(|v| *v == 0.0)
    }
}
