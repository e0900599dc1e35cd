//! Kernel functions for kernel-spline transforms.
//!
//! A kernel function `G` describes how strongly a landmark influences a point
//! at a given offset. Each spline family (thin-plate, elastic body, volume)
//! only differs in its kernel; the rest of the machinery in
//! [`kernel_spline`](super::kernel_spline) is shared.

use std::fmt::Debug;

use nalgebra::{SMatrix, SVector};

pub mod elastic_body;
pub mod thin_plate;
pub mod variant;
pub mod volume;

pub use elastic_body::{ElasticBodyKernel, ElasticBodyReciprocalKernel};
pub use thin_plate::{ThinPlateKernel, ThinPlateR2LogRKernel};
pub use variant::SplineKernel;
pub use volume::VolumeKernel;

/// Value reported by [`KernelFunction::alpha`] and
/// [`KernelFunction::poisson_ratio`] for kernels that have no such parameter.
pub const NOT_APPLICABLE: f64 = -1.0;

/// Poisson ratio used by the elastic kernels unless configured otherwise.
pub const DEFAULT_POISSON_RATIO: f64 = 0.3;

/// Radii below this are treated as the kernel origin.
pub(crate) const RADIUS_EPSILON: f64 = 1e-8;

/// A D×D kernel evaluation.
pub type KernelMatrix<const D: usize> = SMatrix<f64, D, D>;

/// First derivatives of a kernel: entry `k` is `∂G/∂x_k`.
pub type KernelGradient<const D: usize> = [SMatrix<f64, D, D>; D];

/// Second derivatives of a kernel: entry `[k][l]` is `∂²G/∂x_k∂x_l`.
pub type KernelHessian<const D: usize> = [[SMatrix<f64, D, D>; D]; D];

/// Kernel function of a spline family.
///
/// Only [`g`](KernelFunction::g) is required. The derivatives fall back to
/// central finite differences; the kernels shipped with this crate override
/// them with closed forms.
///
/// `G` must be even (`G(-x) == G(x)`) and symmetric for the assembled
/// landmark system to be symmetric.
pub trait KernelFunction<const D: usize>: Clone + Debug + Send + Sync {
    /// Evaluate the kernel on the vector between two points.
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D>;

    /// Self-contribution of a landmark, used for the diagonal blocks of K.
    ///
    /// The default is `stiffness · I`, which turns the interpolating spline
    /// into an approximating one for positive stiffness.
    fn reflexive_g(&self, _landmark: usize, stiffness: f64) -> KernelMatrix<D> {
        SMatrix::identity() * stiffness
    }

    /// Spatial derivatives of [`g`](KernelFunction::g).
    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        let h = finite_difference_step(x, 1e-6);
        std::array::from_fn(|k| {
            let e = unit::<D>(k) * h;
            (self.g(&(x + e)) - self.g(&(x - e))) / (2.0 * h)
        })
    }

    /// Second spatial derivatives of [`g`](KernelFunction::g).
    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        let h = finite_difference_step(x, 1e-4);
        let plus: [KernelGradient<D>; D] =
            std::array::from_fn(|l| self.g_gradient(&(x + unit::<D>(l) * h)));
        let minus: [KernelGradient<D>; D] =
            std::array::from_fn(|l| self.g_gradient(&(x - unit::<D>(l) * h)));
        std::array::from_fn(|k| std::array::from_fn(|l| (plus[l][k] - minus[l][k]) / (2.0 * h)))
    }

    /// Elastic material constant, or [`NOT_APPLICABLE`].
    fn alpha(&self) -> f64 {
        NOT_APPLICABLE
    }

    /// Set the elastic material constant. No-op for kernels without one.
    fn set_alpha(&mut self, _alpha: f64) {}

    /// Poisson ratio of the modelled material, or [`NOT_APPLICABLE`].
    fn poisson_ratio(&self) -> f64 {
        NOT_APPLICABLE
    }

    /// Set the Poisson ratio. No-op for kernels without one.
    fn set_poisson_ratio(&mut self, _poisson_ratio: f64) {}
}

fn unit<const D: usize>(k: usize) -> SVector<f64, D> {
    let mut e = SVector::zeros();
    e[k] = 1.0;
    e
}

fn finite_difference_step<const D: usize>(x: &SVector<f64, D>, relative: f64) -> f64 {
    relative * x.norm().max(1.0)
}

/// Gradient of a radial kernel `G = φ(r) I` given `φ'(r)`.
pub(crate) fn radial_gradient<const D: usize>(x: &SVector<f64, D>, dphi: f64) -> KernelGradient<D> {
    let r = x.norm();
    if r < RADIUS_EPSILON {
        return [SMatrix::zeros(); D];
    }
    std::array::from_fn(|k| SMatrix::identity() * (dphi * x[k] / r))
}

/// Hessian of a radial kernel `G = φ(r) I` given `φ'(r)` and `φ''(r)`.
pub(crate) fn radial_hessian<const D: usize>(
    x: &SVector<f64, D>,
    dphi: f64,
    d2phi: f64,
) -> KernelHessian<D> {
    let r = x.norm();
    if r < RADIUS_EPSILON {
        return [[SMatrix::zeros(); D]; D];
    }
    let n = x / r;
    std::array::from_fn(|k| {
        std::array::from_fn(|l| {
            let delta = if k == l { 1.0 } else { 0.0 };
            let value = d2phi * n[k] * n[l] + dphi * (delta - n[k] * n[l]) / r;
            SMatrix::identity() * value
        })
    })
}
