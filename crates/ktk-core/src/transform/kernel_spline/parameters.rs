//! Flat parameter buffers for persistence and optimizers.
//!
//! Parameters are the source landmarks and fixed parameters the target
//! landmarks, each flattened as consecutive groups of `D` coordinates.
//!
//! The derivatives in [`jacobian`](super::jacobian) are indexed by the fixed
//! parameters: an optimizer that follows them updates the targets through
//! [`set_fixed_parameters`](KernelSplineTransform::set_fixed_parameters).

use super::KernelSplineTransform;
use crate::error::{Result, TransformError};
use crate::spatial::Point;
use crate::transform::kernel::KernelFunction;

impl<K: KernelFunction<D>, const D: usize> KernelSplineTransform<K, D> {
    /// Number of parameters, `N·D`.
    pub fn number_of_parameters(&self) -> usize {
        self.landmarks.len() * D
    }

    /// Source landmarks, flattened.
    pub fn parameters(&self) -> Vec<f64> {
        flatten(self.landmarks.source())
    }

    /// Target landmarks, flattened.
    pub fn fixed_parameters(&self) -> Vec<f64> {
        flatten(self.landmarks.target())
    }

    /// Replace the source landmarks from a flat buffer of length `N·D`.
    pub fn set_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        let source = points_from_flat(parameters, Some(self.landmarks.len()))?;
        self.set_source_landmarks(source)
    }

    /// Replace the target landmarks from a flat buffer of length `N·D`.
    pub fn set_fixed_parameters(&mut self, fixed_parameters: &[f64]) -> Result<()> {
        let target = points_from_flat(fixed_parameters, Some(self.landmarks.len()))?;
        self.set_target_landmarks(target)
    }

    /// Replace both landmark sets from flat buffers. The landmark count may
    /// change.
    pub fn set_landmark_parameters(
        &mut self,
        parameters: &[f64],
        fixed_parameters: &[f64],
    ) -> Result<()> {
        let source = points_from_flat(parameters, None)?;
        let target = points_from_flat(fixed_parameters, None)?;
        self.set_landmarks(source, target)
    }
}

fn flatten<const D: usize>(points: &[Point<D>]) -> Vec<f64> {
    points.iter().flat_map(|p| p.coords().iter().copied()).collect()
}

/// Split a flat buffer into points, optionally requiring a landmark count.
pub fn points_from_flat<const D: usize>(
    values: &[f64],
    expected_count: Option<usize>,
) -> Result<Vec<Point<D>>> {
    let expected = expected_count.map_or(values.len() - values.len() % D, |n| n * D);
    if values.len() % D != 0 || values.len() != expected {
        return Err(TransformError::InvalidParameterLength {
            expected,
            actual: values.len(),
            dimension: D,
        });
    }

    values
        .chunks_exact(D)
        .map(|chunk| {
            Point::from_slice(chunk).ok_or(TransformError::InvalidParameterLength {
                expected,
                actual: values.len(),
                dimension: D,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::kernel::ThinPlateKernel;

    fn transform() -> KernelSplineTransform<ThinPlateKernel, 2> {
        let source = vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
        ];
        let target = vec![
            Point::new([0.1, 0.0]),
            Point::new([1.0, 0.2]),
            Point::new([0.0, 1.0]),
        ];
        KernelSplineTransform::with_landmarks(ThinPlateKernel, source, target).unwrap()
    }

    #[test]
    fn test_parameter_layout() {
        let t = transform();
        assert_eq!(t.number_of_parameters(), 6);
        assert_eq!(t.parameters(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.fixed_parameters(), vec![0.1, 0.0, 1.0, 0.2, 0.0, 1.0]);
    }

    #[test]
    fn test_set_parameters_moves_source() {
        let mut t = transform();
        t.set_parameters(&[0.0, 0.0, 2.0, 0.0, 0.0, 2.0]).unwrap();
        assert_eq!(t.source_landmarks()[1], Point::new([2.0, 0.0]));
        assert!(t.cache_state().is_complete());
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        let mut t = transform();
        let before = t.parameters();

        let err = t.set_parameters(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidParameterLength {
                expected: 6,
                actual: 3,
                dimension: 2
            }
        );
        // A multiple of D, but a different landmark count
        assert!(t.set_fixed_parameters(&[0.0; 8]).is_err());
        assert_eq!(t.parameters(), before);
    }

    #[test]
    fn test_set_landmark_parameters_resizes() {
        let mut t = transform();
        t.set_landmark_parameters(&[0.0; 8], &[1.0; 8]).unwrap();
        assert_eq!(t.number_of_landmarks(), 4);
        assert_eq!(t.number_of_parameters(), 8);

        assert!(matches!(
            t.set_landmark_parameters(&[0.0; 5], &[0.0; 5]),
            Err(TransformError::InvalidParameterLength { .. })
        ));
        assert!(matches!(
            t.set_landmark_parameters(&[0.0; 4], &[0.0; 6]),
            Err(TransformError::SizeMismatch { .. })
        ));
        assert_eq!(t.number_of_landmarks(), 4);
    }

    #[test]
    fn test_points_from_flat() {
        let points = points_from_flat::<3>(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], None).unwrap();
        assert_eq!(points, vec![Point::new([1.0, 2.0, 3.0]), Point::new([4.0, 5.0, 6.0])]);
        assert!(points_from_flat::<3>(&[], Some(0)).unwrap().is_empty());
    }
}
