//! Assembly of the landmark linear system.
//!
//! With `N` landmarks in `D` dimensions the unknowns are the `N·D` deformable
//! weights followed by the `D·(D+1)` affine weights. The system reads
//!
//! ```text
//! L · W = Y,   L = | K   P |,   Y = | d |
//!                  | Pᵀ  0 |        | 0 |
//! ```
//!
//! Row `i·D + r` of `K`, `P` and `Y` belongs to output dimension `r` of
//! landmark `i`. Column `j·D + r` of `P` carries coordinate `j` of the landmark
//! for output dimension `r`; column `D² + r` carries the constant term.

use nalgebra::{DMatrix, DVector};

use super::landmarks::LandmarkStore;
use crate::transform::kernel::KernelFunction;

/// Builds K, P, L and Y from landmarks, stiffness and a kernel.
///
/// All matrices are pure functions of the inputs; reordering the landmarks
/// permutes rows and columns consistently and changes nothing else.
#[derive(Debug)]
pub struct SystemAssembler<'a, K, const D: usize> {
    landmarks: &'a LandmarkStore<D>,
    kernel: &'a K,
    stiffness: f64,
}

impl<'a, K: KernelFunction<D>, const D: usize> SystemAssembler<'a, K, D> {
    pub fn new(landmarks: &'a LandmarkStore<D>, kernel: &'a K, stiffness: f64) -> Self {
        Self {
            landmarks,
            kernel,
            stiffness,
        }
    }

    /// Number of rows (and columns) of L.
    pub fn system_size(&self) -> usize {
        system_size::<D>(self.landmarks.len())
    }

    /// Kernel matrix K, `(N·D) × (N·D)`.
    ///
    /// Off-diagonal blocks are `G(p_i - p_j)`; diagonal blocks are the
    /// kernel's reflexive contribution. Only the upper triangle of blocks is
    /// evaluated.
    pub fn compute_k(&self) -> DMatrix<f64> {
        let source = self.landmarks.source();
        let n = source.len();
        let mut k = DMatrix::zeros(n * D, n * D);

        for i in 0..n {
            let reflexive = self.kernel.reflexive_g(i, self.stiffness);
            k.fixed_view_mut::<D, D>(i * D, i * D).copy_from(&reflexive);

            for j in (i + 1)..n {
                let g = self.kernel.g(&(source[i] - source[j]).0);
                k.fixed_view_mut::<D, D>(i * D, j * D).copy_from(&g);
                k.fixed_view_mut::<D, D>(j * D, i * D).copy_from(&g.transpose());
            }
        }
        k
    }

    /// Affine basis P, `(N·D) × (D·(D+1))`.
    pub fn compute_p(&self) -> DMatrix<f64> {
        let source = self.landmarks.source();
        let mut p = DMatrix::zeros(source.len() * D, D * (D + 1));

        for (i, landmark) in source.iter().enumerate() {
            for r in 0..D {
                let row = i * D + r;
                for j in 0..D {
                    p[(row, j * D + r)] = landmark[j];
                }
                p[(row, D * D + r)] = 1.0;
            }
        }
        p
    }

    /// Augmented system matrix L.
    pub fn compute_l(&self) -> DMatrix<f64> {
        assemble_l(&self.compute_k(), &self.compute_p())
    }

    /// Right-hand side Y: stacked displacements padded with zeros for the
    /// affine constraint rows.
    pub fn compute_y(&self) -> DVector<f64> {
        let mut y = DVector::zeros(self.system_size());
        for (i, d) in self.landmarks.displacements().iter().enumerate() {
            for r in 0..D {
                y[i * D + r] = d[r];
            }
        }
        y
    }
}

/// Size of L for `n` landmarks.
pub fn system_size<const D: usize>(n: usize) -> usize {
    n * D + D * (D + 1)
}

/// Stack `[[K, P], [Pᵀ, 0]]`.
pub fn assemble_l(k: &DMatrix<f64>, p: &DMatrix<f64>) -> DMatrix<f64> {
    let nd = k.nrows();
    let m = p.ncols();
    let mut l = DMatrix::zeros(nd + m, nd + m);
    l.view_mut((0, 0), (nd, nd)).copy_from(k);
    l.view_mut((0, nd), (nd, m)).copy_from(p);
    l.view_mut((nd, 0), (m, nd)).copy_from(&p.transpose());
    l
}
