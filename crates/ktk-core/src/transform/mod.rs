//! Transform types and operations.
//!
//! This module provides the transform traits, the kernel functions that
//! define a spline family, and the landmark-based kernel-spline transform.

pub mod kernel;
pub mod kernel_spline;
pub mod trait_;

pub use kernel::{
    ElasticBodyKernel, ElasticBodyReciprocalKernel, KernelFunction, SplineKernel,
    ThinPlateKernel, ThinPlateR2LogRKernel, VolumeKernel,
};
pub use kernel_spline::{CacheState, KernelSplineTransform, SplineCoefficients};
pub use trait_::{AdvancedTransform, Transform};
