// internal modules
use crate::error::{Error, Result};
use crate::mesh::core::check_size;
use crate::registry::Registry;
use crate::utils::*;

/// Axis-aligned box sliced into equally sized voxels
///
/// ```rust
/// # use meshtally::{Registry, mesh::RegularMesh};
/// let registry = Registry::new();
/// let mesh = RegularMesh::new(&registry, [0.0; 3], [1.0, 1.0, 1.0], [10, 5, 4]).unwrap();
/// assert_eq!(mesh.width(), [0.1, 0.2, 0.25]);
///
/// // upper right corner must be above the lower left in every axis
/// assert!(RegularMesh::new(&registry, [0.0; 3], [1.0, 0.0, 1.0], [1, 1, 1]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RegularMesh {
    id: u32,
    name: Option<String>,
    lower_left: [f64; 3],
    upper_right: [f64; 3],
    dimension: [usize; 3],
}

impl RegularMesh {
    /// Validated mesh with the next free id
    pub fn new(
        registry: &Registry,
        lower_left: [f64; 3],
        upper_right: [f64; 3],
        dimension: [usize; 3],
    ) -> Result<Self> {
        let mut mesh = Self::unchecked(0, lower_left, upper_right, dimension);
        mesh.validate()?;
        mesh.id = registry.meshes.next_id();
        Ok(mesh)
    }

    /// Validated mesh with an explicit id
    pub fn with_id(
        registry: &Registry,
        id: u32,
        lower_left: [f64; 3],
        upper_right: [f64; 3],
        dimension: [usize; 3],
    ) -> Result<Self> {
        let mesh = Self::unchecked(id, lower_left, upper_right, dimension);
        mesh.validate()?;
        registry.meshes.reserve(id);
        Ok(mesh)
    }

    fn unchecked(id: u32, lower_left: [f64; 3], upper_right: [f64; 3], dimension: [usize; 3]) -> Self {
        Self {
            id,
            name: None,
            lower_left,
            upper_right,
            dimension,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension.iter().any(|&d| d == 0) {
            return Err(Error::Validation(f!(
                "Regular mesh dimension must be positive, found {:?}",
                self.dimension
            )));
        }

        let corners_ok = self
            .lower_left
            .iter()
            .zip(self.upper_right.iter())
            .all(|(lo, hi)| lo.is_finite() && hi.is_finite() && hi > lo);

        if !corners_ok {
            return Err(Error::Validation(f!(
                "Regular mesh upper_right {:?} must be greater than lower_left {:?}",
                self.upper_right,
                self.lower_left
            )));
        }
        check_size("Regular", self.dimension)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn lower_left(&self) -> [f64; 3] {
        self.lower_left
    }

    pub fn upper_right(&self) -> [f64; 3] {
        self.upper_right
    }

    pub fn dimension(&self) -> [usize; 3] {
        self.dimension
    }

    /// Voxel width along each axis
    pub fn width(&self) -> [f64; 3] {
        let mut width = [0.0; 3];
        for (axis, w) in width.iter_mut().enumerate() {
            *w = (self.upper_right[axis] - self.lower_left[axis]) / self.dimension[axis] as f64;
        }
        width
    }

    /// Voxel boundaries along each axis, corners included exactly
    pub fn bounds(&self) -> [Vec<f64>; 3] {
        [0, 1, 2].map(|axis| {
            linspace(
                self.lower_left[axis],
                self.upper_right[axis],
                self.dimension[axis] + 1,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_ids() {
        let registry = Registry::new();
        let a = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        let b = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        assert_eq!((a.id(), b.id()), (1, 2));
    }

    #[test]
    fn failed_construction_keeps_id() {
        let registry = Registry::new();
        assert!(RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [0, 1, 1]).is_err());
        let mesh = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [1, 1, 1]).unwrap();
        assert_eq!(mesh.id(), 1);
    }

    #[test]
    fn bounds_hit_corners() {
        let registry = Registry::new();
        let mesh = RegularMesh::new(&registry, [-10.0; 3], [10.0; 3], [5, 5, 5]).unwrap();
        let [x, _, _] = mesh.bounds();
        assert_eq!(x, vec![-10.0, -6.0, -2.0, 2.0, 6.0, 10.0]);
    }

    #[test]
    fn rejects_inverted_corners() {
        let registry = Registry::new();
        let error = RegularMesh::new(&registry, [0.0; 3], [1.0, -1.0, 1.0], [1, 1, 1]).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Validation);
    }
}
