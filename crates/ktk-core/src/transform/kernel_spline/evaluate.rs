//! Point mapping and its spatial derivatives.

use nalgebra::{SMatrix, SVector};

use super::KernelSplineTransform;
use crate::spatial::{Point, Vector};
use crate::transform::kernel::KernelFunction;
use crate::transform::trait_::{SpatialHessian, SpatialJacobian};

impl<K: KernelFunction<D>, const D: usize> KernelSplineTransform<K, D> {
    /// Map a point: `x + A·x + B + Σ_i G(x - p_i)ᵀ c_i`.
    pub fn transform_point(&self, point: &Point<D>) -> Point<D> {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let x = point.coords();
        let affine = self.coefficients.affine() * x + self.coefficients.translation();
        *point + Vector(affine + self.deformation_contribution(point).0)
    }

    /// Non-affine part of the displacement at `point`: `Σ_i G(x - p_i)ᵀ c_i`.
    pub fn deformation_contribution(&self, point: &Point<D>) -> Vector<D> {
        let mut result = SVector::<f64, D>::zeros();
        for (landmark, c) in self
            .landmarks
            .source()
            .iter()
            .zip(self.coefficients.deformation())
        {
            let g = self.kernel.g(&(*point - *landmark).0);
            result += g.tr_mul(c);
        }
        Vector(result)
    }

    /// `∂T_o/∂x_k = δ_ok + A(o, k) + Σ_i Σ_d ∂_kG(d, o) c_i[d]`.
    pub fn spatial_jacobian(&self, point: &Point<D>) -> SpatialJacobian<D> {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let mut jacobian = SMatrix::<f64, D, D>::identity() + self.coefficients.affine();

        for (landmark, c) in self
            .landmarks
            .source()
            .iter()
            .zip(self.coefficients.deformation())
        {
            let gradient = self.kernel.g_gradient(&(*point - *landmark).0);
            for (k, dg) in gradient.iter().enumerate() {
                let column = dg.tr_mul(c);
                for o in 0..D {
                    jacobian[(o, k)] += column[o];
                }
            }
        }
        jacobian
    }

    /// `∂²T_o/∂x_k∂x_l = Σ_i Σ_d ∂_k∂_lG(d, o) c_i[d]`. The affine part does
    /// not contribute.
    pub fn spatial_hessian(&self, point: &Point<D>) -> SpatialHessian<D> {
        debug_assert!(self.state.is_complete(), "evaluating a stale kernel transform");
        let mut hessian = [SMatrix::<f64, D, D>::zeros(); D];

        for (landmark, c) in self
            .landmarks
            .source()
            .iter()
            .zip(self.coefficients.deformation())
        {
            let second = self.kernel.g_hessian(&(*point - *landmark).0);
            for k in 0..D {
                for l in 0..D {
                    let value = second[k][l].tr_mul(c);
                    for o in 0..D {
                        hessian[o][(k, l)] += value[o];
                    }
                }
            }
        }
        hessian
    }
}
