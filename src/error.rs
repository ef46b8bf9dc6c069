//! Error types for the crate
//!
//! Every fallible operation returns the crate [Result], with the failure
//! described by a single [Error] enum. Errors are raised at the point of
//! detection and never downgraded to warnings.
//!
//! Two messages are fixed text that callers are known to match on, so they
//! are kept as fieldless variants:
//!
//! ```rust
//! # use meshtally::Error;
//! assert_eq!(
//!     Error::MissingMeshFilter.to_string(),
//!     "write_to_vtk requires a MeshFilter in the tally filters"
//! );
//! ```

// internal modules
use crate::mesh::Geometry;

// external crates
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [Error]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed mesh grids, bad trigger scores, duplicate names or ids
    Validation,
    /// Inappropriate input to the VTK export
    Value,
    /// Malformed or incomplete serialised configuration
    Parse,
    /// Failures of the underlying storage layer
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("write_to_vtk requires a MeshFilter in the tally filters")]
    MissingMeshFilter,

    #[error("voxels_to_vtk only works with openmc.RegularMesh, openmc.RectilinearMesh, openmc.CylindricalMesh")]
    UnsupportedMesh(Geometry),

    #[error("{name} has {found} values but the mesh has {expected} voxels")]
    DataLength {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to write VTK: {0}")]
    Vtk(vtkio::Error),
}

impl Error {
    /// Category of the error, following the validation/value/parse/io split
    ///
    /// ```rust
    /// # use meshtally::{Error, ErrorKind};
    /// assert_eq!(Error::MissingMeshFilter.kind(), ErrorKind::Value);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::MissingMeshFilter | Self::UnsupportedMesh(_) | Self::DataLength { .. } => {
                ErrorKind::Value
            }
            Self::Parse(_) => ErrorKind::Parse,
            Self::Io(_) | Self::Vtk(_) => ErrorKind::Io,
        }
    }
}

// IO problems are surfaced as they are rather than wrapped by vtkio
impl From<vtkio::Error> for Error {
    fn from(error: vtkio::Error) -> Self {
        match error {
            vtkio::Error::IO(e) => Self::Io(e),
            other => Self::Vtk(other),
        }
    }
}
