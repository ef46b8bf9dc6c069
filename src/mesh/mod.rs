//! Mesh geometry definitions
//!
//! # Overview
//!
//! Four mesh geometries are supported, all wrapped by the common [Mesh] enum
//! so that every method is available regardless of the geometry type.
//!
//! | Mesh              | Axes          | VTK export                    |
//! | ----------------- | ------------- | ----------------------------- |
//! | [RegularMesh]     | x, y, z       | structured grid               |
//! | [RectilinearMesh] | x, y, z       | rectilinear grid              |
//! | [CylindricalMesh] | r, phi, z     | structured/unstructured grid  |
//! | [SphericalMesh]   | r, theta, phi | not supported                 |
//!
//! Constructors validate the grids eagerly, and every mesh is given a unique
//! id from the [Registry](crate::Registry) passed in.
//!
//! ```rust
//! use meshtally::{Registry, mesh::{Mesh, RegularMesh}};
//!
//! let registry = Registry::new();
//! let mesh: Mesh = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [10, 5, 6])
//!     .unwrap()
//!     .into();
//!
//! assert_eq!(mesh.shape(), [10, 5, 6]);
//! assert_eq!(mesh.n_voxels(), 300);
//! assert_eq!(mesh.voxel_index(1, 0, 0), Some(1));
//! ```

// Split into subfiles for development, but anything important is re-exported
mod core;
mod cylindrical;
mod rectilinear;
mod regular;
mod spherical;
mod voxel;

// inline important the mesh-related modules for a nice public API
#[doc(inline)]
pub use crate::mesh::core::{Geometry, Mesh};

#[doc(inline)]
pub use crate::mesh::regular::RegularMesh;

#[doc(inline)]
pub use crate::mesh::rectilinear::RectilinearMesh;

#[doc(inline)]
pub use crate::mesh::cylindrical::CylindricalMesh;

#[doc(inline)]
pub use crate::mesh::spherical::SphericalMesh;

#[doc(inline)]
pub use crate::mesh::voxel::{ijk_to_index, index_to_ijk};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::utils::linspace;

    #[test]
    fn cylindrical_volumes_sum_to_total() {
        let registry = Registry::new();
        let mesh: Mesh = CylindricalMesh::new(
            &registry,
            vec![0.0, 1.0, 2.0],
            linspace(0.0, std::f64::consts::PI, 5),
            vec![0.0, 3.0],
        )
        .unwrap()
        .into();

        // half cylinder of radius 2 and height 3
        let total: f64 = mesh.volumes().iter().sum();
        assert!((total - 0.5 * std::f64::consts::PI * 4.0 * 3.0).abs() < 1e-9);
    }

    #[test]
    fn regular_volumes() {
        let registry = Registry::new();
        let mesh: Mesh = RegularMesh::new(&registry, [0.0; 3], [2.0, 2.0, 2.0], [2, 2, 2])
            .unwrap()
            .into();
        assert_eq!(mesh.volumes(), vec![1.0; 8]);
    }

    #[test]
    fn shape_from_grids() {
        let registry = Registry::new();
        let mesh: Mesh = SphericalMesh::new(
            &registry,
            linspace(1.0, 2.0, 50),
            linspace(1.0, 2.0, 50),
            linspace(1.0, 2.0, 50),
        )
        .unwrap()
        .into();
        assert_eq!(mesh.shape(), [49, 49, 49]);
        assert_eq!(mesh.geometry(), Geometry::Spherical);
    }

    #[test]
    fn voxel_ijk_roundtrip_through_mesh() {
        let registry = Registry::new();
        let mesh: Mesh = RectilinearMesh::new(
            &registry,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0, 2.0, 3.0],
            vec![0.0, 1.0],
        )
        .unwrap()
        .into();
        assert_eq!(mesh.voxel_ijk(4), Some([0, 2, 0]));
        assert_eq!(mesh.voxel_index(0, 2, 0), Some(4));
    }

    #[test]
    fn voxel_count_must_fit() {
        let registry = Registry::new();
        let error = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [usize::MAX, 1, 1]).unwrap_err();
        assert!(error.to_string().ends_with("voxels is too large to index"));
        assert_eq!(error.kind(), crate::ErrorKind::Validation);

        // the id is only taken by meshes that pass
        assert_eq!(RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [4, 4, 4]).unwrap().id(), 1);
    }
}
