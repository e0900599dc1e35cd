//! Tagged kernel variant over the built-in spline families.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use super::{
    ElasticBodyKernel, ElasticBodyReciprocalKernel, KernelFunction, KernelGradient, KernelHessian,
    KernelMatrix, ThinPlateKernel, ThinPlateR2LogRKernel, VolumeKernel, DEFAULT_POISSON_RATIO,
};
use crate::config::KernelKind;

/// One of the built-in spline kernels, chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineKernel {
    ThinPlate(ThinPlateKernel),
    ThinPlateR2LogR(ThinPlateR2LogRKernel),
    ElasticBody(ElasticBodyKernel),
    ElasticBodyReciprocal(ElasticBodyReciprocalKernel),
    Volume(VolumeKernel),
}

impl SplineKernel {
    /// Build the kernel for `kind`.
    ///
    /// `poisson_ratio` only affects the elastic kernels and defaults to
    /// [`DEFAULT_POISSON_RATIO`].
    pub fn from_kind(kind: KernelKind, poisson_ratio: Option<f64>) -> Self {
        let nu = poisson_ratio.unwrap_or(DEFAULT_POISSON_RATIO);
        match kind {
            KernelKind::ThinPlate => Self::ThinPlate(ThinPlateKernel),
            KernelKind::ThinPlateR2LogR => Self::ThinPlateR2LogR(ThinPlateR2LogRKernel),
            KernelKind::ElasticBody => Self::ElasticBody(ElasticBodyKernel::new(nu)),
            KernelKind::ElasticBodyReciprocal => {
                Self::ElasticBodyReciprocal(ElasticBodyReciprocalKernel::new(nu))
            }
            KernelKind::Volume => Self::Volume(VolumeKernel),
        }
    }

    /// The family this kernel belongs to.
    pub fn kind(&self) -> KernelKind {
        match self {
            Self::ThinPlate(_) => KernelKind::ThinPlate,
            Self::ThinPlateR2LogR(_) => KernelKind::ThinPlateR2LogR,
            Self::ElasticBody(_) => KernelKind::ElasticBody,
            Self::ElasticBodyReciprocal(_) => KernelKind::ElasticBodyReciprocal,
            Self::Volume(_) => KernelKind::Volume,
        }
    }
}

impl Default for SplineKernel {
    fn default() -> Self {
        Self::ThinPlate(ThinPlateKernel)
    }
}

macro_rules! dispatch {
    ($self:expr, $kernel:ident => $body:expr) => {
        match $self {
            SplineKernel::ThinPlate($kernel) => $body,
            SplineKernel::ThinPlateR2LogR($kernel) => $body,
            SplineKernel::ElasticBody($kernel) => $body,
            SplineKernel::ElasticBodyReciprocal($kernel) => $body,
            SplineKernel::Volume($kernel) => $body,
        }
    };
}

impl<const D: usize> KernelFunction<D> for SplineKernel {
    fn g(&self, x: &SVector<f64, D>) -> KernelMatrix<D> {
        dispatch!(self, k => KernelFunction::<D>::g(k, x))
    }

    fn reflexive_g(&self, landmark: usize, stiffness: f64) -> KernelMatrix<D> {
        dispatch!(self, k => KernelFunction::<D>::reflexive_g(k, landmark, stiffness))
    }

    fn g_gradient(&self, x: &SVector<f64, D>) -> KernelGradient<D> {
        dispatch!(self, k => KernelFunction::<D>::g_gradient(k, x))
    }

    fn g_hessian(&self, x: &SVector<f64, D>) -> KernelHessian<D> {
        dispatch!(self, k => KernelFunction::<D>::g_hessian(k, x))
    }

    fn alpha(&self) -> f64 {
        dispatch!(self, k => KernelFunction::<D>::alpha(k))
    }

    fn set_alpha(&mut self, alpha: f64) {
        dispatch!(self, k => KernelFunction::<D>::set_alpha(k, alpha))
    }

    fn poisson_ratio(&self) -> f64 {
        dispatch!(self, k => KernelFunction::<D>::poisson_ratio(k))
    }

    fn set_poisson_ratio(&mut self, poisson_ratio: f64) {
        dispatch!(self, k => KernelFunction::<D>::set_poisson_ratio(k, poisson_ratio))
    }
}
