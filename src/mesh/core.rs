// standard library
use std::f64::consts::PI;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::voxel;
use crate::mesh::{CylindricalMesh, RectilinearMesh, RegularMesh, SphericalMesh};
use crate::registry::Registry;
use crate::utils::*;
use crate::xml::Element;

// external crates
use itertools::Itertools;
use serde::Serialize;

/// Mesh geometry types
///
/// The tag written to the `type` attribute of a `<mesh>` element.
///
/// | Geometry                     | Axes                | Tag           |
/// | ---------------------------- | ------------------- | ------------- |
/// | [Geometry::Regular]          | x, y, z (uniform)   | `regular`     |
/// | [Geometry::Rectilinear]      | x, y, z             | `rectilinear` |
/// | [Geometry::Cylindrical]      | r, phi, z           | `cylindrical` |
/// | [Geometry::Spherical]        | r, theta, phi       | `spherical`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    Regular,
    Rectilinear,
    Cylindrical,
    Spherical,
}

impl Geometry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Rectilinear => "rectilinear",
            Self::Cylindrical => "cylindrical",
            Self::Spherical => "spherical",
        }
    }
}

impl std::str::FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regular" => Ok(Self::Regular),
            "rectilinear" => Ok(Self::Rectilinear),
            "cylindrical" => Ok(Self::Cylindrical),
            "spherical" => Ok(Self::Spherical),
            _ => Err(Error::Parse(f!("Unknown mesh type \"{s}\""))),
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Any supported mesh geometry
///
/// A closed set of variants, so every exporter and serialiser has to handle
/// each geometry explicitly.
///
/// All variants share the same voxel ordering, with the first axis varying
/// fastest:
///
/// ```text
/// index = i + n_i * (j + n_j * k)
/// ```
///
/// This is the native cell order of VTK structured grids, so result arrays
/// line up with grid cells without any reordering.
#[derive(Debug, Clone, PartialEq)]
pub enum Mesh {
    Regular(RegularMesh),
    Rectilinear(RectilinearMesh),
    Cylindrical(CylindricalMesh),
    Spherical(SphericalMesh),
}

impl Mesh {
    /// Unique mesh identifier
    pub fn id(&self) -> u32 {
        match self {
            Self::Regular(m) => m.id(),
            Self::Rectilinear(m) => m.id(),
            Self::Cylindrical(m) => m.id(),
            Self::Spherical(m) => m.id(),
        }
    }

    /// Optional user label
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Regular(m) => m.name(),
            Self::Rectilinear(m) => m.name(),
            Self::Cylindrical(m) => m.name(),
            Self::Spherical(m) => m.name(),
        }
    }

    pub fn geometry(&self) -> Geometry {
        match self {
            Self::Regular(_) => Geometry::Regular,
            Self::Rectilinear(_) => Geometry::Rectilinear,
            Self::Cylindrical(_) => Geometry::Cylindrical,
            Self::Spherical(_) => Geometry::Spherical,
        }
    }

    /// Re-check every grid invariant
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Regular(m) => m.validate(),
            Self::Rectilinear(m) => m.validate(),
            Self::Cylindrical(m) => m.validate(),
            Self::Spherical(m) => m.validate(),
        }
    }

    /// Boundary values along each of the three axes
    ///
    /// In the mesh's own coordinate system, so (r, phi, z) for cylindrical
    /// and (r, theta, phi) for spherical meshes.
    pub fn bounds(&self) -> [Vec<f64>; 3] {
        match self {
            Self::Regular(m) => m.bounds(),
            Self::Rectilinear(m) => m.bounds(),
            Self::Cylindrical(m) => m.bounds(),
            Self::Spherical(m) => m.bounds(),
        }
    }

    /// Number of voxels along each axis
    pub fn shape(&self) -> [usize; 3] {
        match self {
            Self::Regular(m) => m.dimension(),
            _ => {
                let [a, b, c] = self.bounds();
                [a.len() - 1, b.len() - 1, c.len() - 1]
            }
        }
    }

    /// Total number of voxels
    pub fn n_voxels(&self) -> usize {
        self.shape().iter().product()
    }

    /// Global voxel index of the (i, j, k) voxel
    pub fn voxel_index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        voxel::ijk_to_index(self.shape(), [i, j, k])
    }

    /// (i, j, k) indices of a global voxel index
    pub fn voxel_ijk(&self, index: usize) -> Option<[usize; 3]> {
        voxel::index_to_ijk(self.shape(), index)
    }

    /// Volume of every voxel, in global voxel order
    pub fn volumes(&self) -> Vec<f64> {
        let [a, b, c] = self.bounds();
        let geometry = self.geometry();
        (0..self.n_voxels())
            .filter_map(|index| self.voxel_ijk(index))
            .map(|[i, j, k]| {
                let (a0, a1) = (a[i], a[i + 1]);
                let (b0, b1) = (b[j], b[j + 1]);
                let (c0, c1) = (c[k], c[k + 1]);
                match geometry {
                    Geometry::Regular | Geometry::Rectilinear => (a1 - a0) * (b1 - b0) * (c1 - c0),
                    // r, phi, z
                    Geometry::Cylindrical => 0.5 * (a1 * a1 - a0 * a0) * (b1 - b0) * (c1 - c0),
                    // r, theta, phi
                    Geometry::Spherical => {
                        (a1.powi(3) - a0.powi(3)) / 3.0 * (b0.cos() - b1.cos()) * (c1 - c0)
                    }
                }
            })
            .collect()
    }
}

/// Conversion to and from `<mesh>` elements
impl Mesh {
    /// Full definition of the mesh, referenced by id from mesh filters
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("mesh")
            .with_attribute("id", self.id())
            .with_attribute("type", self.geometry());

        if let Some(name) = self.name() {
            element = element.with_attribute("name", name);
        }

        let children = match self {
            Self::Regular(m) => vec![
                ("dimension", m.dimension().iter().join(" ")),
                ("lower_left", join_floats(&m.lower_left())),
                ("upper_right", join_floats(&m.upper_right())),
            ],
            Self::Rectilinear(m) => vec![
                ("x_grid", join_floats(m.x_grid())),
                ("y_grid", join_floats(m.y_grid())),
                ("z_grid", join_floats(m.z_grid())),
            ],
            Self::Cylindrical(m) => vec![
                ("r_grid", join_floats(m.r_grid())),
                ("phi_grid", join_floats(m.phi_grid())),
                ("z_grid", join_floats(m.z_grid())),
            ],
            Self::Spherical(m) => vec![
                ("r_grid", join_floats(m.r_grid())),
                ("theta_grid", join_floats(m.theta_grid())),
                ("phi_grid", join_floats(m.phi_grid())),
            ],
        };

        for (name, text) in children {
            element = element.with_text_child(name, text);
        }
        element
    }

    /// Rebuild a mesh from its `<mesh>` element, keeping the stored id
    pub fn from_element(element: &Element, registry: &Registry) -> Result<Self> {
        let id: u32 = element.parse_required_attribute("id")?;
        let geometry: Geometry = element.required_attribute("type")?.parse()?;
        let grid = |name: &str| element.required_child(name)?.values::<f64>();

        let mut mesh = match geometry {
            Geometry::Regular => {
                let dimension = element.required_child("dimension")?.values::<usize>()?;
                Self::Regular(RegularMesh::with_id(
                    registry,
                    id,
                    to_array(&grid("lower_left")?, "lower_left")?,
                    to_array(&grid("upper_right")?, "upper_right")?,
                    to_array(&dimension, "dimension")?,
                )?)
            }
            Geometry::Rectilinear => Self::Rectilinear(RectilinearMesh::with_id(
                registry,
                id,
                grid("x_grid")?,
                grid("y_grid")?,
                grid("z_grid")?,
            )?),
            Geometry::Cylindrical => Self::Cylindrical(CylindricalMesh::with_id(
                registry,
                id,
                grid("r_grid")?,
                grid("phi_grid")?,
                grid("z_grid")?,
            )?),
            Geometry::Spherical => Self::Spherical(SphericalMesh::with_id(
                registry,
                id,
                grid("r_grid")?,
                grid("theta_grid")?,
                grid("phi_grid")?,
            )?),
        };

        if let Some(name) = element.attribute("name") {
            mesh.set_name(name);
        }
        Ok(mesh)
    }

    fn set_name(&mut self, name: &str) {
        match self {
            Self::Regular(m) => m.set_name(name),
            Self::Rectilinear(m) => m.set_name(name),
            Self::Cylindrical(m) => m.set_name(name),
            Self::Spherical(m) => m.set_name(name),
        }
    }
}

impl From<RegularMesh> for Mesh {
    fn from(mesh: RegularMesh) -> Self {
        Self::Regular(mesh)
    }
}

impl From<RectilinearMesh> for Mesh {
    fn from(mesh: RectilinearMesh) -> Self {
        Self::Rectilinear(mesh)
    }
}

impl From<CylindricalMesh> for Mesh {
    fn from(mesh: CylindricalMesh) -> Self {
        Self::Cylindrical(mesh)
    }
}

impl From<SphericalMesh> for Mesh {
    fn from(mesh: SphericalMesh) -> Self {
        Self::Spherical(mesh)
    }
}

impl std::fmt::Display for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [a, b, c] = self.bounds();
        let [na, nb, nc] = self.shape();
        let mut s = f!("Mesh {} ({})\n", self.id(), self.geometry());
        for (label, grid, n) in [("axis 0", a, na), ("axis 1", b, nb), ("axis 2", c, nc)] {
            s += &f!(
                "  {label}: {n:>4} bins from {} to {}\n",
                grid[0].sci(5, 2),
                grid[grid.len() - 1].sci(5, 2)
            );
        }
        s += &f!("  voxels: {}", self.n_voxels());
        write!(f, "{s}")
    }
}

/// Check a boundary array for a given axis
///
/// Grids need at least two values, must be strictly increasing, and every
/// value has to sit inside `[min, max]`.
pub(crate) fn check_grid(name: &str, grid: &[f64], min: f64, max: f64) -> Result<()> {
    if grid.len() < 2 {
        return Err(Error::Validation(f!(
            "{name} must have at least 2 values, found {}",
            grid.len()
        )));
    }

    if !is_strictly_increasing(grid) {
        return Err(Error::Validation(f!(
            "{name} must be monotonically strictly increasing"
        )));
    }

    // tiny tolerance so that linspace(0, 2pi) style grids are accepted
    let tol = 1e-12;
    if grid[0] < min - tol {
        return Err(Error::Validation(f!("{name} values must not be below {min}")));
    }
    if grid[grid.len() - 1] > max + tol {
        return Err(Error::Validation(f!("{name} values must not exceed {max}")));
    }
    Ok(())
}

/// Check that voxel and point counts of a mesh fit in a `usize`
///
/// Every index and volume computation relies on `n_voxels()`, and the VTK
/// export allocates one point per voxel corner.
pub(crate) fn check_size(kind: &str, shape: [usize; 3]) -> Result<()> {
    let points = shape
        .iter()
        .try_fold(3_usize, |acc, &n| n.checked_add(1)?.checked_mul(acc));

    match points {
        Some(_) => Ok(()),
        None => Err(Error::Validation(f!(
            "{kind} mesh of {shape:?} voxels is too large to index"
        ))),
    }
}

/// Upper limit of azimuthal grids
pub(crate) const TWO_PI: f64 = 2.0 * PI;

fn to_array<T: Copy>(values: &[T], name: &str) -> Result<[T; 3]> {
    <[T; 3]>::try_from(values)
        .map_err(|_| Error::Parse(f!("<{name}> must hold 3 values, found {}", values.len())))
}
