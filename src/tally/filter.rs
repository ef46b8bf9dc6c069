//! Binning axes that restrict what contributes to a tally
//!
//! The order of filters on a tally defines the nesting of the result array
//! dimensions, so filters are always kept in insertion order.
//!
//! Only [MeshFilter] holds a reference to another object. The mesh is shared
//! rather than copied, and a document stores just the mesh id:
//!
//! ```xml
//! <filter type="mesh" bins="1"/>
//! <filter type="energy" bins="0 1000000 20000000"/>
//! ```

// standard library
use std::collections::BTreeMap;
use std::sync::Arc;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::utils::*;
use crate::xml::{split_values, Element};

// external crates
use itertools::Itertools;

/// Unified filter enum for tallies
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Mesh(MeshFilter),
    Cell(CellFilter),
    Material(MaterialFilter),
    Energy(EnergyFilter),
}

impl Filter {
    /// Type tag used in tally documents
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Cell(_) => "cell",
            Self::Material(_) => "material",
            Self::Energy(_) => "energy",
        }
    }

    /// Number of bins the filter splits the tally into
    pub fn n_bins(&self) -> usize {
        match self {
            Self::Mesh(f) => f.mesh().n_voxels(),
            Self::Cell(f) => f.bins().len(),
            Self::Material(f) => f.bins().len(),
            Self::Energy(f) => f.bins().len() - 1,
        }
    }

    /// Reference-only element, meshes are written separately
    pub fn to_element(&self) -> Element {
        let bins = match self {
            Self::Mesh(f) => f.mesh().id().to_string(),
            Self::Cell(f) => f.bins().iter().join(" "),
            Self::Material(f) => f.bins().iter().join(" "),
            Self::Energy(f) => join_floats(f.bins()),
        };

        Element::new("filter")
            .with_attribute("type", self.type_name())
            .with_attribute("bins", bins)
    }

    /// Rebuild a filter, resolving mesh references against `meshes`
    pub fn from_element(element: &Element, meshes: &BTreeMap<u32, Arc<Mesh>>) -> Result<Self> {
        let kind = element.required_attribute("type")?;
        let bins = element.required_attribute("bins")?;
        let context = f!("bins of a {kind} filter");

        match kind {
            "mesh" => {
                let id: u32 = element.parse_required_attribute("bins")?;
                let mesh = meshes.get(&id).ok_or_else(|| {
                    Error::Parse(f!("Mesh filter references mesh {id}, which is not defined"))
                })?;
                Ok(Self::Mesh(MeshFilter::shared(mesh.clone())))
            }
            "cell" => CellFilter::new(split_values(bins, &context)?).map(Self::Cell),
            "material" => MaterialFilter::new(split_values(bins, &context)?).map(Self::Material),
            "energy" => EnergyFilter::new(split_values(bins, &context)?).map(Self::Energy),
            _ => return Err(Error::Parse(f!("Unknown filter type \"{kind}\""))),
        }
        .map_err(|e| Error::Parse(f!("Invalid {kind} filter: {e}")))
    }
}

impl From<MeshFilter> for Filter {
    fn from(filter: MeshFilter) -> Self {
        Self::Mesh(filter)
    }
}

impl From<CellFilter> for Filter {
    fn from(filter: CellFilter) -> Self {
        Self::Cell(filter)
    }
}

impl From<MaterialFilter> for Filter {
    fn from(filter: MaterialFilter) -> Self {
        Self::Material(filter)
    }
}

impl From<EnergyFilter> for Filter {
    fn from(filter: EnergyFilter) -> Self {
        Self::Energy(filter)
    }
}

/// Spatial binning over the voxels of a mesh
///
/// The mesh is shared, so several filters (and tallies) can point at the same
/// definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFilter {
    mesh: Arc<Mesh>,
}

impl MeshFilter {
    /// Filter over a mesh that is not shared yet
    pub fn new(mesh: impl Into<Mesh>) -> Self {
        Self {
            mesh: Arc::new(mesh.into()),
        }
    }

    /// Filter over a mesh that other filters may also use
    pub fn shared(mesh: Arc<Mesh>) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }
}

/// Events in any of the listed cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFilter {
    bins: Vec<u32>,
}

impl CellFilter {
    pub fn new(bins: Vec<u32>) -> Result<Self> {
        check_ids("Cell", &bins)?;
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }
}

/// Events in any of the listed materials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialFilter {
    bins: Vec<u32>,
}

impl MaterialFilter {
    pub fn new(bins: Vec<u32>) -> Result<Self> {
        check_ids("Material", &bins)?;
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[u32] {
        &self.bins
    }
}

/// Incident energy bins, given as boundaries in eV
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyFilter {
    bins: Vec<f64>,
}

impl EnergyFilter {
    /// ```rust
    /// # use meshtally::tally::EnergyFilter;
    /// assert!(EnergyFilter::new(vec![0.0, 1e6, 2e7]).is_ok());
    /// assert!(EnergyFilter::new(vec![1e6]).is_err());
    /// assert!(EnergyFilter::new(vec![-1.0, 1.0]).is_err());
    /// ```
    pub fn new(bins: Vec<f64>) -> Result<Self> {
        if bins.len() < 2 || !is_strictly_increasing(&bins) || bins[0] < 0.0 {
            return Err(Error::Validation(f!(
                "Energy filter needs at least 2 increasing non-negative boundaries, found {bins:?}"
            )));
        }
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }
}

fn check_ids(kind: &str, bins: &[u32]) -> Result<()> {
    if bins.is_empty() {
        return Err(Error::Validation(f!("{kind} filter needs at least one bin")));
    }
    if !bins.iter().all_unique() {
        return Err(Error::Validation(f!("{kind} filter bins must be unique")));
    }
    Ok(())
}
