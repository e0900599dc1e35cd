//! Volume spline kernel.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use super::{
    radial_gradient, radial_hessian, KernelFunction, KernelGradient, KernelHessian, KernelMatrix,
};

/// Volume spline kernel `G(x) = |x|³ · I`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeKernel;

impl<const D: usize> KernelFunction<D> for VolumeKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        let r = x.norm();
        SMatrix::identity() * (r * r * r)
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        let r = x.norm();
        radial_gradient(x, 3.0 * r * r)
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        let r = x.norm();
        radial_hessian(x, 3.0 * r * r, 6.0 * r)
    }
}
