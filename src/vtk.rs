//! Conversion of tally meshes to Visual Toolkit grids
//!
//! Every supported mesh becomes a single-piece grid with one cell per voxel.
//! Cells are numbered exactly like the voxels, first axis fastest, so result
//! arrays can be attached without any reordering.
//!
//! | Mesh        | Grid                                              |
//! | ----------- | ------------------------------------------------- |
//! | regular     | structured grid                                   |
//! | rectilinear | rectilinear grid                                  |
//! | cylindrical | structured grid, or unstructured for a full turn  |
//! | spherical   | not supported                                     |
//!
//! A cylindrical mesh covering the full `2π` would repeat the `phi = 0`
//! points at `phi = 2π`. Such meshes are written as hexahedra that share the
//! seam points instead, as long as there are at least 3 phi bins.
//!
//! ```rust
//! # use meshtally::{Registry, mesh::{Mesh, RegularMesh}};
//! # use meshtally::vtk::voxels_to_vtk;
//! let registry = Registry::new();
//! let mesh: Mesh = RegularMesh::new(&registry, [0.0; 3], [1.0; 3], [2, 2, 2])
//!     .unwrap()
//!     .into();
//!
//! // geometry only, no cell data attached
//! let vtk = voxels_to_vtk(&mesh, None, None).unwrap();
//! ```

// standard library
use std::path::Path;

// internal modules
use crate::error::{Error, Result};
use crate::mesh::{CylindricalMesh, Geometry, Mesh, RectilinearMesh, RegularMesh};
use crate::utils::f;

// external crates
use clap::ValueEnum;
use log::{debug, trace};
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, Coordinates, DataArray, DataSet,
    ElementType, Extent, IOBuffer, RectilinearGridPiece, StructuredGridPiece,
    UnstructuredGridPiece, Version, VertexNumbers, Vtk,
};

/// Supported VTK output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum VtkFormat {
    /// Modern XML formats (`.vtr`, `.vts`, `.vtu`)
    Xml,
    /// Legacy text format (`.vtk`)
    LegacyAscii,
    /// Legacy binary format (`.vtk`)
    LegacyBinary,
}

impl VtkFormat {
    /// XML for the XML grid extensions, legacy ASCII for anything else
    ///
    /// ```rust
    /// # use meshtally::vtk::VtkFormat;
    /// assert_eq!(VtkFormat::from_path("grid.vtr"), VtkFormat::Xml);
    /// assert_eq!(VtkFormat::from_path("grid.vtk"), VtkFormat::LegacyAscii);
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("vtr") | Some("vts") | Some("vtu") => Self::Xml,
            _ => Self::LegacyAscii,
        }
    }
}

/// Build a grid for `mesh` with optional cell data
///
/// `mean` and `std_dev` are attached as cell data arrays of the same name
/// when given, and must hold exactly one value per voxel. Spherical meshes
/// have no grid mapping and fail with [Error::UnsupportedMesh] before the
/// data is looked at.
pub fn voxels_to_vtk(mesh: &Mesh, mean: Option<&[f64]>, std_dev: Option<&[f64]>) -> Result<Vtk> {
    if let Mesh::Spherical(_) = mesh {
        return Err(Error::UnsupportedMesh(Geometry::Spherical));
    }

    let mut cell_data = Vec::new();
    for (name, values) in [("mean", mean), ("std_dev", std_dev)] {
        if let Some(values) = values {
            check_length(name, values, mesh.n_voxels())?;
            cell_data.push(scalars(name, values));
        }
    }
    let attributes = Attributes {
        point: Vec::new(),
        cell: cell_data,
    };

    let data = match mesh {
        Mesh::Regular(m) => regular_grid(m, attributes),
        Mesh::Rectilinear(m) => rectilinear_grid(m, attributes),
        Mesh::Cylindrical(m) if shares_seam(m) => cylinder_hexahedra(m, attributes),
        Mesh::Cylindrical(m) => cylinder_grid(m, attributes),
        Mesh::Spherical(_) => return Err(Error::UnsupportedMesh(Geometry::Spherical)),
    };

    debug!(
        "Built a VTK grid with {} cells for {} mesh {}",
        mesh.n_voxels(),
        mesh.geometry(),
        mesh.id()
    );

    Ok(Vtk {
        version: Version::new((1, 0)),
        byte_order: ByteOrder::BigEndian,
        title: f!("{} mesh {}", mesh.geometry(), mesh.id()),
        file_path: None,
        data,
    })
}

/// Write a grid to `path` in the chosen format
///
/// The XML writer picks the grid type from the file extension, so `path`
/// should end in the extension given by [extension].
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    let path = path.as_ref();
    trace!("Writing {format:?} VTK to {}", path.display());

    match format {
        VtkFormat::Xml => vtk.export(path)?,
        VtkFormat::LegacyAscii => vtk.export_ascii(path)?,
        VtkFormat::LegacyBinary => match vtk.byte_order {
            ByteOrder::BigEndian => vtk.export_be(path)?,
            _ => vtk.export_le(path)?,
        },
    }
    Ok(())
}

/// Conventional file extension for a grid written in `format`
pub fn extension(vtk: &Vtk, format: VtkFormat) -> &'static str {
    match (format, &vtk.data) {
        (VtkFormat::Xml, DataSet::RectilinearGrid { .. }) => "vtr",
        (VtkFormat::Xml, DataSet::StructuredGrid { .. }) => "vts",
        (VtkFormat::Xml, _) => "vtu",
        _ => "vtk",
    }
}

fn check_length(name: &'static str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(Error::DataLength {
            name,
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

fn scalars(name: &str, values: &[f64]) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.to_string(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::F64(values.to_vec()),
    })
}

/// Number of points along each axis
fn dims(bounds: &[Vec<f64>; 3]) -> Extent {
    Extent::Dims(bounds.each_ref().map(|b| b.len() as u32))
}

fn regular_grid(mesh: &RegularMesh, data: Attributes) -> DataSet {
    let bounds = mesh.bounds();
    let [x, y, z] = &bounds;

    let mut points = Vec::with_capacity(3 * x.len() * y.len() * z.len());
    for zk in z {
        for yj in y {
            for xi in x {
                points.extend([*xi, *yj, *zk]);
            }
        }
    }

    DataSet::inline(StructuredGridPiece {
        extent: dims(&bounds),
        points: IOBuffer::F64(points),
        data,
    })
}

fn rectilinear_grid(mesh: &RectilinearMesh, data: Attributes) -> DataSet {
    let bounds = mesh.bounds();
    let extent = dims(&bounds);
    let [x, y, z] = bounds;

    DataSet::inline(RectilinearGridPiece {
        extent,
        coords: Coordinates {
            x: IOBuffer::F64(x),
            y: IOBuffer::F64(y),
            z: IOBuffer::F64(z),
        },
        data,
    })
}

fn cylinder_grid(mesh: &CylindricalMesh, data: Attributes) -> DataSet {
    let bounds = mesh.bounds();
    let [r, phi, z] = &bounds;

    let mut points = Vec::with_capacity(3 * r.len() * phi.len() * z.len());
    for zk in z {
        for pj in phi {
            let (sin, cos) = pj.sin_cos();
            for ri in r {
                points.extend([ri * cos, ri * sin, *zk]);
            }
        }
    }

    DataSet::inline(StructuredGridPiece {
        extent: dims(&bounds),
        points: IOBuffer::F64(points),
        data,
    })
}

/// Full revolution with at least 3 phi bins
///
/// With fewer bins a shared seam would collapse the straight-edged cells onto
/// the axis, so those meshes stay structured grids.
fn shares_seam(mesh: &CylindricalMesh) -> bool {
    mesh.is_full_revolution() && mesh.phi_grid().len() > 3
}

/// Full revolution, the last phi boundary is the first one again
fn cylinder_hexahedra(mesh: &CylindricalMesh, data: Attributes) -> DataSet {
    let [r, phi, z] = mesh.bounds();
    let (n_r, n_phi, n_z) = (r.len() - 1, phi.len() - 1, z.len() - 1);

    // distinct points, phi = 2pi dropped
    let mut points = Vec::with_capacity(3 * r.len() * n_phi * z.len());
    for zk in &z {
        for pj in &phi[..n_phi] {
            let (sin, cos) = pj.sin_cos();
            for ri in &r {
                points.extend([ri * cos, ri * sin, *zk]);
            }
        }
    }

    let point = |i: usize, j: usize, k: usize| -> u64 {
        (i + r.len() * ((j % n_phi) + n_phi * k)) as u64
    };

    let n_cells = n_r * n_phi * n_z;
    let mut connectivity = Vec::with_capacity(8 * n_cells);
    for k in 0..n_z {
        for j in 0..n_phi {
            for i in 0..n_r {
                for kk in [k, k + 1] {
                    connectivity.extend([
                        point(i, j, kk),
                        point(i + 1, j, kk),
                        point(i + 1, j + 1, kk),
                        point(i, j + 1, kk),
                    ]);
                }
            }
        }
    }
    let offsets = (1..=n_cells as u64).map(|c| 8 * c).collect();

    DataSet::inline(UnstructuredGridPiece {
        points: IOBuffer::F64(points),
        cells: Cells {
            cell_verts: VertexNumbers::XML {
                connectivity,
                offsets,
            },
            types: vec![CellType::Hexahedron; n_cells],
        },
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::mesh::SphericalMesh;
    use std::f64::consts::PI;
    use vtkio::model::Piece;

    fn piece_points(vtk: &Vtk) -> usize {
        match &vtk.data {
            DataSet::StructuredGrid { pieces, .. } => match &pieces[0] {
                Piece::Inline(p) => p.points.len() / 3,
                _ => 0,
            },
            DataSet::UnstructuredGrid { pieces, .. } => match &pieces[0] {
                Piece::Inline(p) => p.points.len() / 3,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn cylinder(phi: Vec<f64>) -> Mesh {
        let registry = Registry::new();
        CylindricalMesh::new(&registry, vec![0.0, 1.0, 2.0], phi, vec![0.0, 5.0])
            .unwrap()
            .into()
    }

    #[test]
    fn regular_points_are_cartesian_product() {
        let registry = Registry::new();
        let mesh: Mesh = RegularMesh::new(&registry, [0.0; 3], [1.0, 2.0, 3.0], [1, 2, 3])
            .unwrap()
            .into();
        let vtk = voxels_to_vtk(&mesh, None, None).unwrap();
        assert_eq!(piece_points(&vtk), 2 * 3 * 4);
        assert_eq!(extension(&vtk, VtkFormat::Xml), "vts");
    }

    #[test]
    fn partial_cylinder_is_structured() {
        let vtk = voxels_to_vtk(&cylinder(vec![0.0, PI / 2.0, PI]), None, None).unwrap();
        assert!(matches!(vtk.data, DataSet::StructuredGrid { .. }));
        assert_eq!(piece_points(&vtk), 3 * 3 * 2);
    }

    #[test]
    fn full_cylinder_shares_the_seam() {
        let phi = vec![0.0, PI / 2.0, PI, 1.5 * PI, 2.0 * PI];
        let vtk = voxels_to_vtk(&cylinder(phi), None, None).unwrap();
        assert!(matches!(vtk.data, DataSet::UnstructuredGrid { .. }));

        // 4 distinct phi values instead of 5
        assert_eq!(piece_points(&vtk), 3 * 4 * 2);
        assert_eq!(extension(&vtk, VtkFormat::Xml), "vtu");
    }

    #[test]
    fn cell_data_is_attached_by_name() {
        let mesh = cylinder(vec![0.0, PI]);
        let mean = vec![1.0, 2.0];
        let vtk = voxels_to_vtk(&mesh, Some(&mean), None).unwrap();

        let DataSet::StructuredGrid { pieces, .. } = &vtk.data else {
            panic!("expected a structured grid");
        };
        let Piece::Inline(piece) = &pieces[0] else {
            panic!("expected inline data");
        };
        assert_eq!(piece.data.cell.len(), 1);
        match &piece.data.cell[0] {
            Attribute::DataArray(array) => assert_eq!(array.name, "mean"),
            _ => panic!("expected a data array"),
        }
    }

    #[test]
    fn wrong_data_length() {
        let mesh = cylinder(vec![0.0, PI]);
        let error = voxels_to_vtk(&mesh, None, Some(&[1.0])).unwrap_err();
        assert_eq!(error.to_string(), "std_dev has 1 values but the mesh has 2 voxels");
        assert_eq!(error.kind(), crate::ErrorKind::Value);
    }

    fn cell_array<'a>(piece: &'a Attributes, name: &str) -> &'a [f64] {
        let array = piece.cell.iter().find_map(|a| match a {
            Attribute::DataArray(array) if array.name == name => Some(array),
            _ => None,
        });
        match array.map(|a| &a.data) {
            Some(IOBuffer::F64(values)) => values.as_slice(),
            _ => panic!("expected f64 cell data named {name}"),
        }
    }

    #[test]
    fn regular_cells_follow_x_first() {
        let registry = Registry::new();
        let mesh: Mesh = RegularMesh::new(&registry, [0.0; 3], [2.0, 1.0, 1.0], [2, 1, 1])
            .unwrap()
            .into();
        let vtk = voxels_to_vtk(&mesh, Some(&[10.0, 20.0]), None).unwrap();

        let DataSet::StructuredGrid { pieces, .. } = &vtk.data else {
            panic!("expected a structured grid");
        };
        let Piece::Inline(piece) = &pieces[0] else {
            panic!("expected inline data");
        };
        let IOBuffer::F64(points) = &piece.points else {
            panic!("expected f64 points");
        };

        // second cell spans x = 1..2 and carries the second value
        assert_eq!(mesh.voxel_ijk(1), Some([1, 0, 0]));
        assert_eq!(points[3], 1.0);
        assert_eq!(points[6], 2.0);
        assert_eq!(cell_array(&piece.data, "mean"), &[10.0, 20.0]);
    }

    #[test]
    fn cylinder_points_are_cartesian() {
        let vtk = voxels_to_vtk(&cylinder(vec![0.0, PI / 2.0, PI]), None, None).unwrap();
        let DataSet::StructuredGrid { pieces, .. } = &vtk.data else {
            panic!("expected a structured grid");
        };
        let Piece::Inline(piece) = &pieces[0] else {
            panic!("expected inline data");
        };
        let IOBuffer::F64(points) = &piece.points else {
            panic!("expected f64 points");
        };

        // r = 2, phi = pi/2, z = 5
        let p = 2 + 3 * (1 + 3 * 1);
        let xyz = &points[3 * p..3 * p + 3];
        assert!(xyz[0].abs() < 1e-12);
        assert!((xyz[1] - 2.0).abs() < 1e-12);
        assert_eq!(xyz[2], 5.0);
    }

    #[test]
    fn full_cylinder_last_column_wraps_to_first() {
        let phi = vec![0.0, PI / 2.0, PI, 1.5 * PI, 2.0 * PI];
        let vtk = voxels_to_vtk(&cylinder(phi), None, None).unwrap();
        let DataSet::UnstructuredGrid { pieces, .. } = &vtk.data else {
            panic!("expected an unstructured grid");
        };
        let Piece::Inline(piece) = &pieces[0] else {
            panic!("expected inline data");
        };
        let VertexNumbers::XML {
            connectivity,
            offsets,
        } = &piece.cells.cell_verts
        else {
            panic!("expected xml cell connectivity");
        };
        assert_eq!(offsets.len(), 8);

        // cell (i=0, j=3, k=0), the phi+1 corners are the phi = 0 points
        let cell = &connectivity[8 * 6..8 * 7];
        assert_eq!(cell, &[9, 10, 1, 0, 21, 22, 13, 12]);
        assert!(connectivity.iter().all(|&p| p < 24));
    }

    #[rstest::rstest]
    #[case::single_bin(vec![0.0, 2.0 * PI])]
    #[case::two_bins(vec![0.0, PI, 2.0 * PI])]
    fn full_cylinder_with_few_bins_is_structured(#[case] phi: Vec<f64>) {
        let n_phi = phi.len();
        let vtk = voxels_to_vtk(&cylinder(phi), None, None).unwrap();
        assert!(matches!(vtk.data, DataSet::StructuredGrid { .. }));
        assert_eq!(piece_points(&vtk), 3 * n_phi * 2);
    }

    #[test]
    fn spherical_rejected_before_data_length() {
        let registry = Registry::new();
        let mesh: Mesh = SphericalMesh::new(
            &registry,
            vec![0.0, 1.0, 2.0],
            vec![0.0, PI],
            vec![0.0, 2.0 * PI],
        )
        .unwrap()
        .into();
        let error = voxels_to_vtk(&mesh, Some(&[1.0; 3]), None).unwrap_err();
        assert!(matches!(error, Error::UnsupportedMesh(Geometry::Spherical)));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(VtkFormat::from_path("a/b.VTU"), VtkFormat::Xml);
        assert_eq!(VtkFormat::from_path("a/b"), VtkFormat::LegacyAscii);
    }
}
