//! Point type for representing spatial coordinates.
//!
//! Points represent landmark positions and query positions in physical space.

use nalgebra::{Point as NaPoint, SVector};
use serde::{Deserialize, Serialize};
use super::Vector;

/// A point in D-dimensional space.
///
/// This is a thin wrapper around nalgebra's Point to provide
/// domain-specific functionality while maintaining all nalgebra operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<const D: usize>(pub NaPoint<f64, D>);

impl<const D: usize> Point<D> {
    /// Create a new point from coordinates.
    pub fn new(coords: [f64; D]) -> Self {
        Self(NaPoint::from(coords))
    }

    /// Create a point at the origin (all coordinates zero).
    pub fn origin() -> Self {
        Self(NaPoint::origin())
    }

    /// Create a point from the first `D` values of a slice.
    ///
    /// Returns `None` when the slice is shorter than `D`.
    pub fn from_slice(coords: &[f64]) -> Option<Self> {
        if coords.len() < D {
            return None;
        }
        Some(Self(NaPoint::from(SVector::<f64, D>::from_fn(|i, _| coords[i]))))
    }

    /// Convert point to a vector of coordinates.
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.coords.iter().copied().collect()
    }

    /// Position vector of the point (offset from the origin).
    pub fn coords(&self) -> &SVector<f64, D> {
        &self.0.coords
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.0.coords - other.0.coords).norm()
    }

    /// Get the inner nalgebra point.
    pub fn inner(&self) -> &NaPoint<f64, D> {
        &self.0
    }
}

impl<const D: usize> From<[f64; D]> for Point<D> {
    fn from(coords: [f64; D]) -> Self {
        Self::new(coords)
    }
}

impl<const D: usize> std::ops::Index<usize> for Point<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0.coords[index]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Point<D> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0.coords[index]
    }
}

impl<const D: usize> std::ops::Sub for Point<D> {
    type Output = Vector<D>;

    fn sub(self, other: Self) -> Self::Output {
        Vector(self.0.coords - other.0.coords)
    }
}

impl<const D: usize> std::ops::Add<Vector<D>> for Point<D> {
    type Output = Self;

    fn add(self, vector: Vector<D>) -> Self::Output {
        Self(self.0 + vector.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Point3 = Point<3>;
    type Vector3 = Vector<3>;

    #[test]
    fn test_point_creation() {
        let p = Point3::new([1.0, 2.0, 3.0]);
        assert_eq!(p[0], 1.0);
        assert_eq!(p[1], 2.0);
        assert_eq!(p[2], 3.0);
    }

    #[test]
    fn test_point_from_slice() {
        let p = Point3::from_slice(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(p, Point3::new([1.0, 2.0, 3.0]));
        assert!(Point3::from_slice(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_point_to_vec() {
        let p = Point3::new([1.0, 2.0, 3.0]);
        assert_eq!(p.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_point_subtraction() {
        let p1 = Point3::new([5.0, 5.0, 5.0]);
        let p2 = Point3::new([2.0, 3.0, 4.0]);
        assert_eq!(p1 - p2, Vector3::new([3.0, 2.0, 1.0]));
    }

    #[test]
    fn test_point_vector_addition() {
        let p = Point3::new([1.0, 2.0, 3.0]);
        let v = Vector3::new([4.0, 5.0, 6.0]);
        assert_eq!(p + v, Point3::new([5.0, 7.0, 9.0]));
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::<2>::new([0.0, 0.0]);
        let p2 = Point::<2>::new([3.0, 4.0]);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-12);
    }
}
