//! Landmark-based kernel-spline transform.
//!
//! Given `N` corresponding source/target landmarks, the transform finds the
//! smooth deformation that maps each source landmark onto its target (or
//! approximates it, for positive stiffness). The family of the spline
//! (thin-plate, elastic body, volume) is set by the injected
//! [`KernelFunction`].
//!
//! The mapping is
//!
//! ```text
//! T(x) = x + A·x + B + Σ_i G(x - p_i)ᵀ c_i
//! ```
//!
//! where `A`, `B` and `c_i` come from solving the landmark system assembled
//! in [`system`].
//!
//! # Caching
//!
//! The solve runs in three stages, L → L⁻¹ → W, tracked by [`CacheState`].
//! Every successful mutator re-runs the invalidated stages before returning,
//! so evaluation only reads cached state and can run on several threads at
//! once. A mutator that fails leaves the transform as it was. Mutators are
//! not synchronised and need `&mut self`.

use nalgebra::{DMatrix, DVector};

pub mod batch;
pub mod coefficients;
pub mod evaluate;
pub mod jacobian;
pub mod landmarks;
pub mod parameters;
pub mod solver;
pub mod system;

pub use coefficients::SplineCoefficients;
pub use landmarks::LandmarkStore;
pub use solver::{CacheState, PseudoInverse};
pub use system::SystemAssembler;

use crate::config::{
    validate_pinv_tolerance, validate_poisson_ratio, validate_stiffness, KernelTransformConfig,
};
use crate::error::{Result, TransformError};
use crate::spatial::{Point, Vector};
use crate::transform::kernel::{KernelFunction, SplineKernel};
use crate::transform::trait_::{
    AdvancedTransform, JacobianOfSpatialHessian, JacobianOfSpatialJacobian,
    NonZeroJacobianIndices, ParameterJacobian, SpatialHessian, SpatialJacobian,
};

/// Kernel-spline transform over `D`-dimensional landmarks.
///
/// # Type Parameters
/// * `K` - The kernel function of the spline family
/// * `D` - The spatial dimensionality
#[derive(Debug, Clone)]
pub struct KernelSplineTransform<K, const D: usize> {
    kernel: K,
    landmarks: LandmarkStore<D>,
    stiffness: f64,
    pinv_tolerance: Option<f64>,
    l_matrix: DMatrix<f64>,
    l_inverse: DMatrix<f64>,
    l_rank: usize,
    y_vector: DVector<f64>,
    coefficients: SplineCoefficients<D>,
    nonzero_jacobian_indices: NonZeroJacobianIndices,
    state: CacheState,
}

impl<K: KernelFunction<D>, const D: usize> KernelSplineTransform<K, D> {
    /// Create a transform without landmarks, which maps every point to itself.
    pub fn new(kernel: K) -> Self {
        let size = system::system_size::<D>(0);
        Self {
            kernel,
            landmarks: LandmarkStore::new(),
            stiffness: 0.0,
            pinv_tolerance: None,
            // The empty system is all zeros and so is its pseudo-inverse.
            l_matrix: DMatrix::zeros(size, size),
            l_inverse: DMatrix::zeros(size, size),
            l_rank: 0,
            y_vector: DVector::zeros(size),
            coefficients: SplineCoefficients::zeros(0),
            nonzero_jacobian_indices: Vec::new(),
            state: CacheState::complete(),
        }
    }

    /// Create a transform from corresponding landmarks.
    pub fn with_landmarks(kernel: K, source: Vec<Point<D>>, target: Vec<Point<D>>) -> Result<Self> {
        let mut transform = Self::new(kernel);
        transform.set_landmarks(source, target)?;
        Ok(transform)
    }

    /// Kernel function.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Landmark store.
    pub fn landmarks(&self) -> &LandmarkStore<D> {
        &self.landmarks
    }

    /// Source landmarks, `p`.
    pub fn source_landmarks(&self) -> &[Point<D>] {
        self.landmarks.source()
    }

    /// Target landmarks, `q`.
    pub fn target_landmarks(&self) -> &[Point<D>] {
        self.landmarks.target()
    }

    /// Displacements `q - p`.
    pub fn displacements(&self) -> &[Vector<D>] {
        self.landmarks.displacements()
    }

    /// Number of landmark pairs.
    pub fn number_of_landmarks(&self) -> usize {
        self.landmarks.len()
    }

    /// Stiffness of the spline.
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Explicit pseudo-inverse tolerance, if any.
    pub fn pinv_tolerance(&self) -> Option<f64> {
        self.pinv_tolerance
    }

    /// Current cache state.
    pub fn cache_state(&self) -> CacheState {
        self.state
    }

    /// Assembled system matrix L.
    pub fn l_matrix(&self) -> &DMatrix<f64> {
        &self.l_matrix
    }

    /// Kernel block K of L.
    pub fn k_matrix(&self) -> DMatrix<f64> {
        let nd = self.landmarks.len() * D;
        self.l_matrix.view((0, 0), (nd, nd)).clone_owned()
    }

    /// Affine basis block P of L.
    pub fn p_matrix(&self) -> DMatrix<f64> {
        let nd = self.landmarks.len() * D;
        self.l_matrix.view((0, nd), (nd, D * (D + 1))).clone_owned()
    }

    /// Cached pseudo-inverse of L.
    pub fn l_inverse(&self) -> &DMatrix<f64> {
        &self.l_inverse
    }

    /// Numerical rank of L found by the last inversion.
    pub fn l_rank(&self) -> usize {
        self.l_rank
    }

    /// Right-hand side Y of the last solve.
    pub fn y_vector(&self) -> &DVector<f64> {
        &self.y_vector
    }

    /// Decomposed solution.
    pub fn coefficients(&self) -> &SplineCoefficients<D> {
        &self.coefficients
    }

    /// Replace both landmark lists.
    ///
    /// This is the only setter that may change the number of landmarks.
    pub fn set_landmarks(&mut self, source: Vec<Point<D>>, target: Vec<Point<D>>) -> Result<()> {
        self.transaction(|t| {
            t.landmarks.set_pairs(source, target)?;
            t.nonzero_jacobian_indices = (0..t.landmarks.len() * D).collect();
            t.invalidate_all();
            Ok(())
        })
    }

    /// Replace the source landmarks. The count must stay the same.
    pub fn set_source_landmarks(&mut self, source: Vec<Point<D>>) -> Result<()> {
        self.transaction(|t| {
            t.landmarks.set_source(source)?;
            t.invalidate_all();
            Ok(())
        })
    }

    /// Replace the target landmarks. The count must stay the same.
    ///
    /// L only depends on the source landmarks, so its cached inverse is kept
    /// and only W is solved again.
    pub fn set_target_landmarks(&mut self, target: Vec<Point<D>>) -> Result<()> {
        self.transaction(|t| {
            t.landmarks.set_target(target)?;
            t.invalidate_solution();
            Ok(())
        })
    }

    /// Set the stiffness. Negative values are clamped to zero; NaN and
    /// infinite values are rejected.
    pub fn set_stiffness(&mut self, stiffness: f64) -> Result<()> {
        let stiffness = validate_stiffness(stiffness)?;
        self.transaction(|t| {
            t.stiffness = stiffness;
            t.invalidate_all();
            Ok(())
        })
    }

    /// Set an absolute pseudo-inverse tolerance, or `None` for
    /// [`DEFAULT_PINV_TOLERANCE`](solver::DEFAULT_PINV_TOLERANCE).
    pub fn set_pinv_tolerance(&mut self, tolerance: Option<f64>) -> Result<()> {
        if let Some(tol) = tolerance {
            validate_pinv_tolerance(tol)?;
        }
        self.transaction(|t| {
            t.pinv_tolerance = tolerance;
            t.invalidate_all();
            Ok(())
        })
    }

    /// Replace the kernel function.
    pub fn set_kernel(&mut self, kernel: K) -> Result<()> {
        self.transaction(|t| {
            t.kernel = kernel;
            t.invalidate_all();
            Ok(())
        })
    }

    /// Kernel material constant, or [`NOT_APPLICABLE`](crate::transform::kernel::NOT_APPLICABLE).
    pub fn alpha(&self) -> f64 {
        self.kernel.alpha()
    }

    /// Set the kernel material constant. Has no effect on kernels without one.
    pub fn set_alpha(&mut self, alpha: f64) -> Result<()> {
        if !alpha.is_finite() {
            return Err(TransformError::invalid_configuration(format!(
                "alpha must be finite, got {}",
                alpha
            )));
        }
        self.transaction(|t| {
            t.kernel.set_alpha(alpha);
            t.invalidate_all();
            Ok(())
        })
    }

    /// Kernel Poisson ratio, or [`NOT_APPLICABLE`](crate::transform::kernel::NOT_APPLICABLE).
    pub fn poisson_ratio(&self) -> f64 {
        self.kernel.poisson_ratio()
    }

    /// Set the kernel Poisson ratio. Has no effect on kernels without one.
    pub fn set_poisson_ratio(&mut self, poisson_ratio: f64) -> Result<()> {
        validate_poisson_ratio(poisson_ratio)?;
        self.transaction(|t| {
            t.kernel.set_poisson_ratio(poisson_ratio);
            t.invalidate_all();
            Ok(())
        })
    }

    /// Reset to zero deformation.
    ///
    /// The target landmarks are moved onto the source landmarks and the
    /// weights are zeroed directly; no system is solved when L⁻¹ is current,
    /// since it does not depend on the targets.
    pub fn set_identity(&mut self) -> Result<()> {
        self.transaction(|t| {
            let source = t.landmarks.source().to_vec();
            t.landmarks.set_target(source)?;
            if t.state.l_inverse_computed {
                t.y_vector = DVector::zeros(system::system_size::<D>(t.landmarks.len()));
                t.coefficients = SplineCoefficients::zeros(t.landmarks.len());
                t.state.w_matrix_computed = true;
            } else {
                t.invalidate_solution();
            }
            Ok(())
        })
    }

    /// Apply `mutate`, then bring the caches up to date.
    ///
    /// On any error the transform is restored to its state before the call.
    fn transaction<F>(&mut self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let backup = self.clone();
        let result = mutate(self).and_then(|()| self.update());
        if result.is_err() {
            tracing::debug!("Kernel transform update failed; restoring previous state");
            *self = backup;
        }
        result
    }

    /// Reset every cache stage.
    pub fn invalidate_all(&mut self) {
        tracing::trace!("Invalidating kernel transform caches");
        self.state = CacheState::invalidated();
    }

    fn invalidate_solution(&mut self) {
        self.state.w_matrix_computed = false;
    }

    /// Run every stage of the L → L⁻¹ → W chain that is not current.
    pub fn update(&mut self) -> Result<()> {
        if !self.state.l_matrix_computed {
            self.compute_l();
        }
        if !self.state.l_inverse_computed {
            self.compute_l_inverse()?;
        }
        if !self.state.w_matrix_computed {
            self.compute_w_matrix()?;
        }
        Ok(())
    }

    /// Assemble L from the current landmarks, stiffness and kernel.
    pub fn compute_l(&mut self) {
        let assembler = SystemAssembler::new(&self.landmarks, &self.kernel, self.stiffness);
        self.l_matrix = assembler.compute_l();
        self.state.l_matrix_computed = true;
        tracing::debug!(
            "Assembled landmark system: {} landmarks, {}x{} L matrix",
            self.landmarks.len(),
            self.l_matrix.nrows(),
            self.l_matrix.ncols()
        );
    }

    /// Compute and cache the pseudo-inverse of L. Requires L.
    pub fn compute_l_inverse(&mut self) -> Result<()> {
        if !self.state.l_matrix_computed {
            return Err(TransformError::stale_cache(
                "L inverse requested before L was assembled",
            ));
        }
        let pinv = solver::pseudo_inverse(&self.l_matrix, self.pinv_tolerance)?;
        tracing::debug!(
            "Inverted landmark system: rank {} of {}, tolerance {:.3e}",
            pinv.rank,
            self.l_matrix.nrows(),
            pinv.tolerance
        );
        self.l_inverse = pinv.matrix;
        self.l_rank = pinv.rank;
        self.state.l_inverse_computed = true;
        Ok(())
    }

    /// Solve for W from the cached L⁻¹ and decompose it. Requires L⁻¹.
    pub fn compute_w_matrix(&mut self) -> Result<()> {
        if !self.state.l_inverse_computed {
            return Err(TransformError::stale_cache(
                "W requested before L inverse was computed",
            ));
        }
        let assembler = SystemAssembler::new(&self.landmarks, &self.kernel, self.stiffness);
        self.y_vector = assembler.compute_y();
        let w = solver::solve_w(&self.l_inverse, &self.y_vector)?;
        self.coefficients = SplineCoefficients::reorganize_w(w, self.landmarks.len());
        self.state.w_matrix_computed = true;
        Ok(())
    }
}

impl<const D: usize> KernelSplineTransform<SplineKernel, D> {
    /// Create a transform without landmarks from a configuration.
    pub fn from_config(config: &KernelTransformConfig) -> Result<Self> {
        config.validate()?;
        let kernel = SplineKernel::from_kind(config.kernel, config.poisson_ratio);
        let mut transform = Self::new(kernel);
        transform.stiffness = validate_stiffness(config.stiffness)?;
        transform.pinv_tolerance = config.pinv_tolerance;
        Ok(transform)
    }
}

impl<K: KernelFunction<D>, const D: usize> AdvancedTransform<D> for KernelSplineTransform<K, D> {
    fn number_of_parameters(&self) -> usize {
        KernelSplineTransform::number_of_parameters(self)
    }

    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        KernelSplineTransform::transform_point(self, point)
    }

    fn jacobian(&self, point: &Point<D>) -> (ParameterJacobian, NonZeroJacobianIndices) {
        KernelSplineTransform::jacobian(self, point)
    }

    fn spatial_jacobian(&self, point: &Point<D>) -> SpatialJacobian<D> {
        KernelSplineTransform::spatial_jacobian(self, point)
    }

    fn spatial_hessian(&self, point: &Point<D>) -> SpatialHessian<D> {
        KernelSplineTransform::spatial_hessian(self, point)
    }

    fn jacobian_of_spatial_jacobian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialJacobian<D>, NonZeroJacobianIndices) {
        KernelSplineTransform::jacobian_of_spatial_jacobian(self, point)
    }

    fn jacobian_of_spatial_hessian(
        &self,
        point: &Point<D>,
    ) -> (JacobianOfSpatialHessian<D>, NonZeroJacobianIndices) {
        KernelSplineTransform::jacobian_of_spatial_hessian(self, point)
    }
}
