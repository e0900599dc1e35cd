//! Derivatives with respect to the landmark parameters.
//!
//! The derivatives are taken with respect to the target landmark
//! coordinates, i.e. the entries of
//! [`fixed_parameters`](KernelSplineTransform::fixed_parameters), not of
//! [`parameters`](KernelSplineTransform::parameters) (the source landmarks).
//! Column `j` refers to `fixed_parameters()[j]`, coordinate `j % D` of target
//! landmark `j / D`. Moving a target changes the displacement by the same
//! amount, so these are also the derivatives with respect to the
//! displacements.
//!
//! `W = L⁻¹·Y` is linear in `Y`, and target coordinate `j` feeds row `j` of
//! `Y`, so `∂W/∂θ_j` is column `j` of the cached L⁻¹. Every target influences
//! every point, hence all `N·D` indices are reported as non-zero.

use nalgebra::{DMatrix, SMatrix};

use super::KernelSplineTransform;
use crate::spatial::Point;
use crate::transform::kernel::{KernelFunction, KernelGradient, KernelHessian, KernelMatrix};
use crate::transform::trait_::{
    JacobianOfSpatialHessian, JacobianOfSpatialJacobian, NonZeroJacobianIndices, ParameterJacobian,
};

impl<K: KernelFunction<D>, const D: usize> KernelSplineTransform<K, D> {
    /// `∂T/∂θ` at `point`, a `D × N·D` matrix, with the indices of its
    /// columns into [`fixed_parameters`](Self::fixed_parameters).
    ///
    /// ```text
    /// J(o, j) = Σ_i Σ_d G(x - p_i)(d, o) · L⁻¹[iD + d, j]
    ///         + Σ_d x_d · L⁻¹[ND + dD + o, j]
    ///         + L⁻¹[ND + D² + o, j]
    /// ```
    pub fn jacobian(&self, point: &Point<D>) -> (ParameterJacobian, NonZeroJacobianIndices) {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let n = self.landmarks.len();
        let nd = n * D;
        let kernels: Vec<KernelMatrix<D>> = self
            .landmarks
            .source()
            .iter()
            .map(|landmark| self.kernel.g(&(*point - *landmark).0))
            .collect();

        let mut jacobian = DMatrix::zeros(D, nd);
        for j in 0..nd {
            let column = self.l_inverse.column(j);
            for o in 0..D {
                let mut value = column[nd + D * D + o];
                for d in 0..D {
                    value += point[d] * column[nd + d * D + o];
                }
                for (i, g) in kernels.iter().enumerate() {
                    for d in 0..D {
                        value += g[(d, o)] * column[i * D + d];
                    }
                }
                jacobian[(o, j)] = value;
            }
        }
        (jacobian, self.nonzero_jacobian_indices.clone())
    }

    /// `∂/∂θ_j` of the spatial Jacobian, one `D × D` matrix per parameter.
    pub fn jacobian_of_spatial_jacobian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialJacobian<D>, NonZeroJacobianIndices) {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let nd = self.landmarks.len() * D;
        let gradients: Vec<KernelGradient<D>> = self
            .landmarks
            .source()
            .iter()
            .map(|landmark| self.kernel.g_gradient(&(*point - *landmark).0))
            .collect();

        let result: JacobianOfSpatialJacobian<D> = (0..nd)
            .map(|j| {
                let column = self.l_inverse.column(j);
                SMatrix::<f64, D, D>::from_fn(|o, k| {
                    let mut value = column[nd + k * D + o];
                    for (i, gradient) in gradients.iter().enumerate() {
                        for d in 0..D {
                            value += gradient[k][(d, o)] * column[i * D + d];
                        }
                    }
                    value
                })
            })
            .collect();
        (result, self.nonzero_jacobian_indices.clone())
    }

    /// `∂/∂θ_j` of the spatial Hessian, one Hessian set per parameter.
    pub fn jacobian_of_spatial_hessian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialHessian<D>, NonZeroJacobianIndices) {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let nd = self.landmarks.len() * D;
        let hessians: Vec<KernelHessian<D>> = self
            .landmarks
            .source()
            .iter()
            .map(|landmark| self.kernel.g_hessian(&(*point - *landmark).0))
            .collect();

        let result: JacobianOfSpatialHessian<D> = (0..nd)
            .map(|j| {
                let column = self.l_inverse.column(j);
                std::array::from_fn(|o| {
                    SMatrix::<f64, D, D>::from_fn(|k, l| {
                        let mut value = 0.0;
                        for (i, hessian) in hessians.iter().enumerate() {
                            for d in 0..D {
                                value += hessian[k][l][(d, o)] * column[i * D + d];
                            }
                        }
                        value
                    })
                })
            })
            .collect();
        (result, self.nonzero_jacobian_indices.clone())
    }
}
