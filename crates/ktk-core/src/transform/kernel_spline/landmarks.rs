//! Storage for corresponding source/target landmarks.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::spatial::{Point, Vector};

/// Index-aligned source and target landmarks and their displacements.
///
/// Both sequences always have the same length and only finite coordinates;
/// every setter checks this before touching any state. Displacements `d[i] = target[i] - source[i]`
/// are derived and refreshed by every setter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkStore<const D: usize> {
    source: Vec<Point<D>>,
    target: Vec<Point<D>>,
    displacements: Vec<Vector<D>>,
}

impl<const D: usize> LandmarkStore<D> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            source: Vec::new(),
            target: Vec::new(),
            displacements: Vec::new(),
        }
    }

    /// Create a store from corresponding landmark lists.
    pub fn from_pairs(source: Vec<Point<D>>, target: Vec<Point<D>>) -> Result<Self> {
        let mut store = Self::new();
        store.set_pairs(source, target)?;
        Ok(store)
    }

    /// Number of landmark pairs.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the store holds no landmarks.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Source landmarks, `p`.
    pub fn source(&self) -> &[Point<D>] {
        &self.source
    }

    /// Target landmarks, `q`.
    pub fn target(&self) -> &[Point<D>] {
        &self.target
    }

    /// Displacements `q - p`.
    pub fn displacements(&self) -> &[Vector<D>] {
        &self.displacements
    }

    /// Replace both landmark lists. This is the only way to change the
    /// number of landmarks.
    pub fn set_pairs(&mut self, source: Vec<Point<D>>, target: Vec<Point<D>>) -> Result<()> {
        if source.len() != target.len() {
            return Err(TransformError::size_mismatch(source.len(), target.len()));
        }
        check_finite("source", &source)?;
        check_finite("target", &target)?;
        self.source = source;
        self.target = target;
        self.compute_displacements();
        Ok(())
    }

    /// Replace the source landmarks, keeping the landmark count.
    pub fn set_source(&mut self, source: Vec<Point<D>>) -> Result<()> {
        if source.len() != self.target.len() {
            return Err(TransformError::size_mismatch(source.len(), self.target.len()));
        }
        check_finite("source", &source)?;
        self.source = source;
        self.compute_displacements();
        Ok(())
    }

    /// Replace the target landmarks, keeping the landmark count.
    pub fn set_target(&mut self, target: Vec<Point<D>>) -> Result<()> {
        if target.len() != self.source.len() {
            return Err(TransformError::size_mismatch(self.source.len(), target.len()));
        }
        check_finite("target", &target)?;
        self.target = target;
        self.compute_displacements();
        Ok(())
    }

    /// Recompute `d[i] = target[i] - source[i]`.
    pub fn compute_displacements(&mut self) {
        self.displacements = self
            .source
            .iter()
            .zip(&self.target)
            .map(|(p, q)| *q - *p)
            .collect();
    }
}

fn check_finite<const D: usize>(role: &'static str, points: &[Point<D>]) -> Result<()> {
    match points
        .iter()
        .position(|p| p.coords().iter().any(|v| !v.is_finite()))
    {
        Some(index) => Err(TransformError::non_finite_landmark(role, index)),
        None => Ok(()),
    }
}
