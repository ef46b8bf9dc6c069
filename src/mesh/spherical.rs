// standard library
use std::f64::consts::PI;

// internal modules
use crate::error::Result;
use crate::mesh::core::{check_grid, check_size, TWO_PI};
use crate::registry::Registry;

/// Spherical shells in (r, theta, phi)
///
/// Theta is the polar angle from the z axis within `[0, pi]`, phi the
/// azimuthal angle within `[0, 2pi]`.
///
/// There is no structured VTK representation for these, so they can be used
/// in tallies and documents but not exported to grids.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalMesh {
    id: u32,
    name: Option<String>,
    r_grid: Vec<f64>,
    theta_grid: Vec<f64>,
    phi_grid: Vec<f64>,
}

impl SphericalMesh {
    /// Validated mesh with the next free id
    pub fn new(
        registry: &Registry,
        r_grid: Vec<f64>,
        theta_grid: Vec<f64>,
        phi_grid: Vec<f64>,
    ) -> Result<Self> {
        let mut mesh = Self {
            id: 0,
            name: None,
            r_grid,
            theta_grid,
            phi_grid,
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
        theta_grid: Vec<f64>,
        phi_grid: Vec<f64>,
    ) -> Result<Self> {
        let mesh = Self {
            id,
            name: None,
            r_grid,
            theta_grid,
            phi_grid,
        };
        mesh.validate()?;
        registry.meshes.reserve(id);
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<()> {
        check_grid("r_grid", &self.r_grid, 0.0, f64::MAX)?;
        check_grid("theta_grid", &self.theta_grid, 0.0, PI)?;
        check_grid("phi_grid", &self.phi_grid, 0.0, TWO_PI)?;
        check_size(
            "Spherical",
            [&self.r_grid, &self.theta_grid, &self.phi_grid].map(|g| g.len() - 1),
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

    pub fn theta_grid(&self) -> &[f64] {
        &self.theta_grid
    }

    pub fn phi_grid(&self) -> &[f64] {
        &self.phi_grid
    }

    pub fn bounds(&self) -> [Vec<f64>; 3] {
        [
            self.r_grid.clone(),
            self.theta_grid.clone(),
            self.phi_grid.clone(),
        ]
    }
}
