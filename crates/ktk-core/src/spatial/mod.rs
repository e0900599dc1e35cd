//! Spatial types for representing landmark positions and displacements.
//!
//! Both types are thin wrappers over nalgebra's statically sized
//! point and vector types.

pub mod point;
pub mod vector;

pub use point::Point;
pub use vector::Vector;

// Common type aliases for 2D and 3D
pub type Point2 = Point<2>;
pub type Point3 = Point<3>;
pub type Vector2 = Vector<2>;
pub type Vector3 = Vector<3>;
