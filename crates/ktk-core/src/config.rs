//! Configuration for kernel-spline transforms.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// Spline family of a kernel transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelKind {
    /// `G = r · I`.
    #[default]
    ThinPlate,
    /// `G = r² ln r · I`.
    #[serde(rename = "thin_plate_r2_log_r")]
    ThinPlateR2LogR,
    /// `G = α r³ I − 3 r x xᵀ`.
    ElasticBody,
    /// `G = α r I − x xᵀ / r`.
    ElasticBodyReciprocal,
    /// `G = r³ · I`.
    Volume,
}

impl KernelKind {
    /// Whether the kernel is parameterised by a Poisson ratio.
    pub fn is_elastic(&self) -> bool {
        matches!(self, Self::ElasticBody | Self::ElasticBodyReciprocal)
    }
}

/// Kernel transform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelTransformConfig {
    /// Spline family.
    pub kernel: KernelKind,
    /// Regularization strength. Zero interpolates the landmarks exactly;
    /// negative values are treated as zero and non-finite ones are rejected.
    pub stiffness: f64,
    /// Poisson ratio for the elastic kernels; ignored by the others.
    pub poisson_ratio: Option<f64>,
    /// Singular values at or below this are treated as zero when inverting
    /// the landmark system. `None` uses an absolute tolerance of `1e-8`.
    pub pinv_tolerance: Option<f64>,
}

impl Default for KernelTransformConfig {
    fn default() -> Self {
        Self {
            kernel: KernelKind::ThinPlate,
            stiffness: 0.0,
            poisson_ratio: None,
            pinv_tolerance: None,
        }
    }
}

impl KernelTransformConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spline family.
    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the stiffness.
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Set the Poisson ratio of the elastic kernels.
    pub fn with_poisson_ratio(mut self, poisson_ratio: f64) -> Self {
        self.poisson_ratio = Some(poisson_ratio);
        self
    }

    /// Set an absolute pseudo-inverse tolerance.
    pub fn with_pinv_tolerance(mut self, tolerance: f64) -> Self {
        self.pinv_tolerance = Some(tolerance);
        self
    }

    /// Check the values that cannot be clamped.
    pub fn validate(&self) -> Result<()> {
        validate_stiffness(self.stiffness)?;
        if let Some(nu) = self.poisson_ratio {
            validate_poisson_ratio(nu)?;
        }
        if let Some(tol) = self.pinv_tolerance {
            validate_pinv_tolerance(tol)?;
        }
        Ok(())
    }
}

/// Stiffness must be finite; negative values are clamped to zero.
pub(crate) fn validate_stiffness(stiffness: f64) -> Result<f64> {
    if stiffness.is_finite() {
        Ok(stiffness.max(0.0))
    } else {
        Err(TransformError::invalid_configuration(format!(
            "stiffness must be finite, got {}",
            stiffness
        )))
    }
}

/// A Poisson ratio must lie in `(-1, 0.5]`.
pub(crate) fn validate_poisson_ratio(poisson_ratio: f64) -> Result<()> {
    if poisson_ratio > -1.0 && poisson_ratio <= 0.5 {
        Ok(())
    } else {
        Err(TransformError::invalid_configuration(format!(
            "Poisson ratio must lie in (-1, 0.5], got {}",
            poisson_ratio
        )))
    }
}

pub(crate) fn validate_pinv_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(TransformError::invalid_configuration(format!(
            "pseudo-inverse tolerance must be finite and non-negative, got {}",
            tolerance
        )))
    }
}
