// internal modules
use crate::error::Result;
use crate::mesh::core::{check_grid, check_size, TWO_PI};
use crate::registry::Registry;

/// Annular wedges in (r, phi, z)
///
/// The axis of the cylinder is the z axis and phi is measured in radians from
/// the x axis. Radii must be non-negative and phi has to stay within
/// `[0, 2pi]`.
///
/// ```rust
/// # use meshtally::{Registry, mesh::CylindricalMesh, utils::linspace};
/// # use std::f64::consts::PI;
/// let registry = Registry::new();
/// let mesh = CylindricalMesh::new(
///     &registry,
///     linspace(1.0, 2.0, 30),
///     linspace(0.0, PI / 2.0, 50),
///     linspace(0.0, 1.0, 30),
/// ).unwrap();
/// assert!(!mesh.is_full_revolution());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalMesh {
    id: u32,
    name: Option<String>,
    r_grid: Vec<f64>,
    phi_grid: Vec<f64>,
    z_grid: Vec<f64>,
}

impl CylindricalMesh {
    /// Validated mesh with the next free id
    pub fn new(
        registry: &Registry,
        r_grid: Vec<f64>,
        phi_grid: Vec<f64>,
        z_grid: Vec<f64>,
    ) -> Result<Self> {
        let mut mesh = Self {
            id: 0,
            name: None,
            r_grid,
            phi_grid,
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
        r_grid: Vec<f64>,
        phi_grid: Vec<f64>,
        z_grid: Vec<f64>,
    ) -> Result<Self> {
        let mesh = Self {
            id,
            name: None,
            r_grid,
            phi_grid,
            z_grid,
        };
        mesh.validate()?;
        registry.meshes.reserve(id);
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<()> {
        check_grid("r_grid", &self.r_grid, 0.0, f64::MAX)?;
        check_grid("phi_grid", &self.phi_grid, 0.0, TWO_PI)?;
        check_grid("z_grid", &self.z_grid, f64::MIN, f64::MAX)?;
        check_size(
            "Cylindrical",
            [&self.r_grid, &self.phi_grid, &self.z_grid].map(|g| g.len() - 1),
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

    pub fn r_grid(&self) -> &[f64] {
        &self.r_grid
    }

    pub fn phi_grid(&self) -> &[f64] {
        &self.phi_grid
    }

    pub fn z_grid(&self) -> &[f64] {
        &self.z_grid
    }

    pub fn bounds(&self) -> [Vec<f64>; 3] {
        [
            self.r_grid.clone(),
            self.phi_grid.clone(),
            self.z_grid.clone(),
        ]
    }

    /// Whether the phi boundaries close on themselves
    ///
    /// When true, the first and last phi boundaries describe the same plane
    /// and grid points along them coincide.
    pub fn is_full_revolution(&self) -> bool {
        let span = self.phi_grid[self.phi_grid.len() - 1] - self.phi_grid[0];
        (span - TWO_PI).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::linspace;

    #[test]
    fn rejects_negative_radius() {
        let registry = Registry::new();
        let result = CylindricalMesh::new(
            &registry,
            vec![-1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_phi_beyond_two_pi() {
        let registry = Registry::new();
        let result = CylindricalMesh::new(
            &registry,
            vec![0.0, 1.0],
            vec![0.0, 7.0],
            vec![0.0, 1.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn full_revolution() {
        let registry = Registry::new();
        let mesh = CylindricalMesh::new(
            &registry,
            vec![0.0, 1.0],
            linspace(0.0, TWO_PI, 9),
            vec![0.0, 1.0],
        )
        .unwrap();
        assert!(mesh.is_full_revolution());
    }
}
