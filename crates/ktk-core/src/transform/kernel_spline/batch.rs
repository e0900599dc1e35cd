//! Parallel evaluation of many points.
//!
//! Evaluation only reads the cached solution, so points are mapped on the
//! rayon thread pool without any locking.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rayon::prelude::*;

use super::parameters::points_from_flat;
use super::KernelSplineTransform;
use crate::error::Result;
use crate::spatial::Point;
use crate::transform::kernel::KernelFunction;
use crate::transform::trait_::Transform;

impl<K: KernelFunction<D>, const D: usize> KernelSplineTransform<K, D> {
    /// Map a slice of points in parallel.
    pub fn transform_points_slice(&self, points: &[Point<D>]) -> Vec<Point<D>> {
        points.par_iter().map(|p| self.transform_point(p)).collect()
    }

    /// Map points stored as consecutive groups of `D` coordinates.
    pub fn transform_flat(&self, coords: &[f64]) -> Result<Vec<f64>> {
        let points = points_from_flat::<D>(coords, None)?;
        Ok(points
            .par_iter()
            .flat_map_iter(|p| self.transform_point(p).to_vec())
            .collect())
    }
}

impl<B: Backend, K: KernelFunction<D>, const D: usize> Transform<B, D>
    for KernelSplineTransform<K, D>
{
    /// # Panics
    /// Panics if the second dimension of `points` is not `D`.
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let [n, dim] = points.dims();
        assert_eq!(dim, D, "expected points of shape [Batch, {}], got [{}, {}]", D, n, dim);

        let device = points.device();
        let coords: Vec<f64> = points.into_data().iter::<f64>().collect();
        let mapped: Vec<f64> = coords
            .par_chunks(D)
            .flat_map_iter(|chunk| {
                let p = Point::<D>::new(std::array::from_fn(|i| chunk[i]));
                self.transform_point(&p).to_vec()
            })
            .collect();

        Tensor::from_data(TensorData::new(mapped, [n, D]), &device)
    }
}
