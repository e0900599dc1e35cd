//! Landmark-based kernel-spline transforms for image registration.
//!
//! A [`KernelSplineTransform`] interpolates (or, with positive stiffness,
//! approximates) a set of corresponding source/target landmarks with a
//! smooth deformation, and exposes the mapping together with the derivatives
//! a registration optimizer needs.

pub mod config;
pub mod error;
pub mod spatial;
pub mod transform;

pub use config::{KernelKind, KernelTransformConfig};
pub use error::{Result, TransformError};
pub use spatial::{Point, Vector};
pub use transform::{
    AdvancedTransform, KernelFunction, KernelSplineTransform, SplineKernel, Transform,
};
