//! Thin-plate spline kernels.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use super::{
    radial_gradient, radial_hessian, KernelFunction, KernelGradient, KernelHessian, KernelMatrix,
    RADIUS_EPSILON,
};

/// Thin-plate kernel `G(x) = |x| · I`.
///
/// This is the fundamental solution of the biharmonic equation in 3D.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinPlateKernel;

impl<const D: usize> KernelFunction<D> for ThinPlateKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        SMatrix::identity() * x.norm()
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        radial_gradient(x, 1.0)
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        radial_hessian(x, 1.0, 0.0)
    }
}

/// Thin-plate kernel `G(x) = |x|² ln|x| · I`.
///
/// The fundamental solution of the biharmonic equation in 2D, and the kernel
/// to use for 2D registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinPlateR2LogRKernel;

impl<const D: usize> KernelFunction<D> for ThinPlateR2LogRKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return SMatrix::zeros();
        }
        SMatrix::identity() * (r * r * r.ln())
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [SMatrix::zeros(); D];
        }
        radial_gradient(x, r * (2.0 * r.ln() + 1.0))
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [[SMatrix::zeros(); D]; D];
        }
        let ln_r = r.ln();
        radial_hessian(x, r * (2.0 * ln_r + 1.0), 2.0 * ln_r + 3.0)
    }
}
