// internal modules
use crate::error::Result;
use crate::mesh::core::{check_grid, check_size};
use crate::registry::Registry;

/// Cartesian mesh with arbitrary boundaries along each axis
#[derive(Debug, Clone, PartialEq)]
pub struct RectilinearMesh {
    id: u32,
    name: Option<String>,
    x_grid: Vec<f64>,
    y_grid: Vec<f64>,
    z_grid: Vec<f64>,
}

impl RectilinearMesh {
    /// Validated mesh with the next free id
    pub fn new(
        registry: &Registry,
        x_grid: Vec<f64>,
        y_grid: Vec<f64>,
        z_grid: Vec<f64>,
    ) -> Result<Self> {
        let mut mesh = Self {
            id: 0,
            name: None,
            x_grid,
            y_grid,
            z_grid,
        };
        mesh.validate()?;
        mesh.id = registry.meshes.next_id();
        Ok(mesh)
    }

    /// Validated mesh with an explicit id
    pub fn with_id(
        registry: &Registry,
        id: u32,
        x_grid: Vec<f64>,
        y_grid: Vec<f64>,
        z_grid: Vec<f64>,
    ) -> Result<Self> {
        let mesh = Self {
            id,
            name: None,
            x_grid,
            y_grid,
            z_grid,
        };
        mesh.validate()?;
        registry.meshes.reserve(id);
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<()> {
        check_grid("x_grid", &self.x_grid, f64::MIN, f64::MAX)?;
        check_grid("y_grid", &self.y_grid, f64::MIN, f64::MAX)?;
        check_grid("z_grid", &self.z_grid, f64::MIN, f64::MAX)?;
        check_size(
            "Rectilinear",
            [&self.x_grid, &self.y_grid, &self.z_grid].map(|g| g.len() - 1),
        )
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

    pub fn x_grid(&self) -> &[f64] {
        &self.x_grid
    }

    pub fn y_grid(&self) -> &[f64] {
        &self.y_grid
    }

    pub fn z_grid(&self) -> &[f64] {
        &self.z_grid
    }

    pub fn bounds(&self) -> [Vec<f64>; 3] {
        [self.x_grid.clone(), self.y_grid.clone(), self.z_grid.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_and_unsorted_grids() {
        let registry = Registry::new();
        let ok = vec![0.0, 1.0];
        assert!(RectilinearMesh::new(&registry, vec![0.0], ok.clone(), ok.clone()).is_err());
        assert!(RectilinearMesh::new(&registry, ok.clone(), vec![1.0, 0.0], ok.clone()).is_err());
        assert!(RectilinearMesh::new(&registry, ok.clone(), ok.clone(), vec![0.0, 0.0]).is_err());
        assert!(RectilinearMesh::new(&registry, ok.clone(), ok.clone(), ok).is_ok());
    }

    #[test]
    fn negative_coordinates_allowed() {
        let registry = Registry::new();
        let grid = vec![-5.0, -1.0, 2.0];
        let mesh = RectilinearMesh::new(&registry, grid.clone(), grid.clone(), grid).unwrap();
        assert_eq!(mesh.x_grid(), &[-5.0, -1.0, 2.0]);
    }
}
