//! # The Meshtally crate
//!
//! Tally configuration for Monte Carlo transport inputs, with mesh previews
//!
//! ## Installation
//!
//! Direct install from the repository:
//!
//! ```shell
//! cargo install --path .
//! ```
//!
//! ## Overview
//!
//! The crate models everything a tally needs before a simulation is run:
//! the spatial meshes, filters that bin the results, scores, nuclides,
//! derivatives and the triggers that decide when a result is converged.
//! Collections of tallies are written to and read back from XML documents
//! without loss, and any supported mesh can be turned into a VTK grid.
//!
//! | Command line | Description                                              |
//! | ------------ | -------------------------------------------------------- |
//! | `tally2vtk`  | Preview the meshes of a tally document as VTK grids      |
//!
//! The tool is fully documented with a detailed `--help` message, including
//! examples for common use cases.
//!
//! ### Supported mesh geometries
//!
//! | Mesh                                                 | Document tag  | VTK grid            |
//! | ---------------------------------------------------- | ------------- | ------------------- |
//! | [RegularMesh](crate::mesh::RegularMesh)             | `regular`     | structured          |
//! | [RectilinearMesh](crate::mesh::RectilinearMesh)     | `rectilinear` | rectilinear         |
//! | [CylindricalMesh](crate::mesh::CylindricalMesh)     | `cylindrical` | structured          |
//! | [SphericalMesh](crate::mesh::SphericalMesh)         | `spherical`   | not supported       |
//!
//! ## Advanced use
//!
//! Every object that carries an id takes a [Registry], which hands out the
//! next free id and remembers the ones already taken. Keeping the registry
//! explicit means independent documents never fight over ids.
//!
//! ```rust
//! use meshtally::mesh::RegularMesh;
//! use meshtally::tally::{MeshFilter, Tallies, Tally};
//! use meshtally::Registry;
//!
//! let registry = Registry::new();
//! let mesh = RegularMesh::new(&registry, [-10.0; 3], [10.0; 3], [5, 5, 5]).unwrap();
//!
//! let mut tally = Tally::new(&registry);
//! tally.add_filter(MeshFilter::new(mesh));
//! tally.set_scores(vec!["flux".into()]).unwrap();
//!
//! // write the document and read it back
//! let tallies = Tallies::from_vec(vec![tally]).unwrap();
//! let text = tallies.to_xml_string().unwrap();
//! let reloaded = Tallies::from_xml_str(&text, &Registry::new()).unwrap();
//! assert_eq!(reloaded, tallies);
//! ```
//!
//! As an overview:
//! - The [mesh] module contains the mesh variants and voxel indexing
//! - The [tally] module holds tallies, filters, triggers, derivatives and the
//! [Tallies] collection that owns document IO
//! - The [vtk] module converts meshes into VTK grids with optional cell data
//! - The [xml] module is the small element tree behind the documents
//!
//! In the background, the `nom` parser combinator library reads the
//! documents, `clap` is used for the command line interface, and `vtkio`
//! writes the various plot formats.
//!
//! All failures are reported through a single [Error] type, see [ErrorKind]
//! for the broad categories.

// Public facing modules
pub mod mesh;
pub mod registry;
pub mod tally;
pub mod utils;
pub mod vtk;
pub mod xml;

// note that docs are hidden to prevent confusing the current simple API
pub mod readers;

mod error;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::{Error, ErrorKind, Result};

#[doc(inline)]
pub use crate::registry::Registry;

#[doc(inline)]
pub use crate::tally::{Tallies, Tally};

#[doc(inline)]
pub use crate::readers::read_tallies;

#[doc(inline)]
pub use crate::vtk::{voxels_to_vtk, write_vtk};
