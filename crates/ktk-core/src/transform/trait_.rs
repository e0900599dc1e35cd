//! Transform traits for spatial coordinate transformations.
//!
//! [`Transform`] is the batched, tensor-level interface used by burn-based
//! consumers. [`AdvancedTransform`] is the point-wise interface an optimizer
//! uses: the mapping itself plus its derivatives with respect to the
//! parameters and to the input coordinates.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::{DMatrix, SMatrix};

use crate::spatial::Point;

/// Transform trait for spatial coordinate transformations.
///
/// Maps points from one physical space to another.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `D` - The spatial dimensionality
pub trait Transform<B: Backend, const D: usize> {
    /// Apply transform to a batch of points.
    ///
    /// # Arguments
    /// * `points` - Tensor of shape `[Batch, D]` containing the input points
    ///
    /// # Returns
    /// Tensor of shape `[Batch, D]` containing the transformed points
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Get the inverse transform (if available).
    fn inverse(&self) -> Option<Box<dyn Transform<B, D>>> {
        None
    }
}

/// Derivative of the mapped point with respect to the parameters: `D × P`.
pub type ParameterJacobian = DMatrix<f64>;

/// Indices of the parameters a [`ParameterJacobian`] column refers to.
pub type NonZeroJacobianIndices = Vec<usize>;

/// `∂T_o/∂x_k` at entry `(o, k)`.
pub type SpatialJacobian<const D: usize> = SMatrix<f64, D, D>;

/// One Hessian `∂²T_o/∂x_k∂x_l` per output dimension `o`.
pub type SpatialHessian<const D: usize> = [SMatrix<f64, D, D>; D];

/// One spatial Jacobian derivative per non-zero parameter.
pub type JacobianOfSpatialJacobian<const D: usize> = Vec<SpatialJacobian<D>>;

/// One spatial Hessian derivative per non-zero parameter.
pub type JacobianOfSpatialHessian<const D: usize> = Vec<SpatialHessian<D>>;

/// Point-wise transform interface consumed by gradient-based optimizers.
///
/// Every method takes `&self` and must be safe to call from several threads
/// at once while no mutation is in flight.
pub trait AdvancedTransform<const D: usize>: Send + Sync {
    /// Number of parameters that completely define the transform.
    fn number_of_parameters(&self) -> usize;

    /// Map a point.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;

    /// Derivative of the mapped point with respect to the parameters.
    ///
    /// Returns the `D × indices.len()` Jacobian and the parameter indices its
    /// columns refer to. For landmark transforms these index the target
    /// landmarks, i.e. the fixed parameters.
    fn jacobian(&self, point: &Point<D>) -> (ParameterJacobian, NonZeroJacobianIndices);

    /// Derivative of the mapped point with respect to the input point.
    fn spatial_jacobian(&self, point: &Point<D>) -> SpatialJacobian<D>;

    /// Second derivatives of the mapped point with respect to the input point.
    fn spatial_hessian(&self, point: &Point<D>) -> SpatialHessian<D>;

    /// Derivative of [`spatial_jacobian`](Self::spatial_jacobian) with respect
    /// to the parameters.
    fn jacobian_of_spatial_jacobian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialJacobian<D>, NonZeroJacobianIndices);

    /// Derivative of [`spatial_hessian`](Self::spatial_hessian) with respect
    /// to the parameters.
    fn jacobian_of_spatial_hessian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialHessian<D>, NonZeroJacobianIndices);

    /// Whether the mapping is affine.
    fn is_linear(&self) -> bool {
        false
    }

    /// Whether the spatial Hessian can be non-zero.
    fn has_nonzero_spatial_hessian(&self) -> bool {
        true
    }

    /// Whether the derivative of the spatial Hessian with respect to the
    /// parameters can be non-zero.
    fn has_nonzero_jacobian_of_spatial_hessian(&self) -> bool {
        true
    }
}
