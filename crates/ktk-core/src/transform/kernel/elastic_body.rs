//! Elastic body spline kernels.
//!
//! Both kernels model a homogeneous isotropic elastic material whose
//! behaviour is governed by the Poisson ratio `ν` through a material
//! constant `α`. Setting `ν` recomputes `α`; `α` can also be set directly.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use super::{
    KernelFunction, KernelGradient, KernelHessian, KernelMatrix, DEFAULT_POISSON_RATIO,
    RADIUS_EPSILON,
};

fn kronecker(i: usize, j: usize) -> f64 {
    if i == j {
        1.0
    } else {
        0.0
    }
}

/// Elastic body kernel `G(x) = α r³ I − 3 r x xᵀ` with `α = 12(1 − ν) − 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticBodyKernel {
    alpha: f64,
    poisson_ratio: f64,
}

impl ElasticBodyKernel {
    /// Create a kernel for the given Poisson ratio.
    pub fn new(poisson_ratio: f64) -> Self {
        Self {
            alpha: Self::alpha_for(poisson_ratio),
            poisson_ratio,
        }
    }

    fn alpha_for(poisson_ratio: f64) -> f64 {
        12.0 * (1.0 - poisson_ratio) - 1.0
    }
}

impl Default for ElasticBodyKernel {
    fn default() -> Self {
        Self::new(DEFAULT_POISSON_RATIO)
    }
}

impl<const D: usize> KernelFunction<D> for ElasticBodyKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        let r = x.norm();
        SMatrix::identity() * (self.alpha * r * r * r) - (x * x.transpose()) * (3.0 * r)
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [SMatrix::zeros(); D];
        }
        let a = self.alpha;
        std::array::from_fn(|k| {
            SMatrix::from_fn(|i, j| {
                3.0 * a * r * x[k] * kronecker(i, j)
                    - 3.0 * x[k] / r * x[i] * x[j]
                    - 3.0 * r * (kronecker(i, k) * x[j] + kronecker(j, k) * x[i])
            })
        })
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [[SMatrix::zeros(); D]; D];
        }
        let a = self.alpha;
        let r3 = r * r * r;
        std::array::from_fn(|k| {
            std::array::from_fn(|l| {
                SMatrix::from_fn(|i, j| {
                    let dkl = kronecker(k, l);
                    let sym = kronecker(i, k) * kronecker(j, l) + kronecker(j, k) * kronecker(i, l);
                    3.0 * a * kronecker(i, j) * (x[k] * x[l] / r + r * dkl)
                        - 3.0 * x[i] * x[j] * (dkl / r - x[k] * x[l] / r3)
                        - 3.0 * x[k] / r * (kronecker(i, l) * x[j] + kronecker(j, l) * x[i])
                        - 3.0 * x[l] / r * (kronecker(i, k) * x[j] + kronecker(j, k) * x[i])
                        - 3.0 * r * sym
                })
            })
        })
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio
    }

    fn set_poisson_ratio(&mut self, poisson_ratio: f64) {
        self.poisson_ratio = poisson_ratio;
        self.alpha = Self::alpha_for(poisson_ratio);
    }
}

/// Elastic body reciprocal kernel `G(x) = α r I − x xᵀ / r` with
/// `α = 8(1 − ν) − 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticBodyReciprocalKernel {
    alpha: f64,
    poisson_ratio: f64,
}

impl ElasticBodyReciprocalKernel {
    /// Create a kernel for the given Poisson ratio.
    pub fn new(poisson_ratio: f64) -> Self {
        Self {
            alpha: Self::alpha_for(poisson_ratio),
            poisson_ratio,
        }
    }

    fn alpha_for(poisson_ratio: f64) -> f64 {
        8.0 * (1.0 - poisson_ratio) - 1.0
    }
}

impl Default for ElasticBodyReciprocalKernel {
    fn default() -> Self {
        Self::new(DEFAULT_POISSON_RATIO)
    }
}

impl<const D: usize> KernelFunction<D> for ElasticBodyReciprocalKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        let r = x.norm();
        let radial = SMatrix::identity() * (self.alpha * r);
        if r < RADIUS_EPSILON {
            return radial;
        }
        radial - (x * x.transpose()) / r
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [SMatrix::zeros(); D];
        }
        let a = self.alpha;
        let r3 = r * r * r;
        std::array::from_fn(|k| {
            SMatrix::from_fn(|i, j| {
                a * x[k] / r * kronecker(i, j)
                    - (kronecker(i, k) * x[j] + kronecker(j, k) * x[i]) / r
                    + x[i] * x[j] * x[k] / r3
            })
        })
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        let r = x.norm();
        if r < RADIUS_EPSILON {
            return [[SMatrix::zeros(); D]; D];
        }
        let a = self.alpha;
        let r3 = r * r * r;
        let r5 = r3 * r * r;
        std::array::from_fn(|k| {
            std::array::from_fn(|l| {
                SMatrix::from_fn(|i, j| {
                    let dkl = kronecker(k, l);
                    let sym = kronecker(i, k) * kronecker(j, l) + kronecker(j, k) * kronecker(i, l);
                    a * kronecker(i, j) * (dkl / r - x[k] * x[l] / r3)
                        - sym / r
                        + (kronecker(i, k) * x[j] + kronecker(j, k) * x[i]) * x[l] / r3
                        + (kronecker(i, l) * x[j] * x[k]
                            + kronecker(j, l) * x[i] * x[k]
                            + x[i] * x[j] * dkl)
                            / r3
                        - 3.0 * x[i] * x[j] * x[k] * x[l] / r5
                })
            })
        })
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn poisson_ratio(&self) -> f64 {
        self.poisson_ratio
    }

    fn set_poisson_ratio(&mut self, poisson_ratio: f64) {
        self.poisson_ratio = poisson_ratio;
        self.alpha = Self::alpha_for(poisson_ratio);
    }
}
