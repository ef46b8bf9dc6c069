//! Global voxel ordering shared by every mesh geometry
//!
//! Results handed over by the transport engine are flat arrays. The position
//! of a voxel in those arrays is its global index, and the same index is used
//! when attaching the arrays to VTK cells. Getting this wrong silently
//! misaligns data and geometry, so the convention lives in exactly one place.
//!
//! The first axis varies fastest:
//!
//! | index | i | j | k |
//! | ----- | - | - | - |
//! | 0     | 0 | 0 | 0 |
//! | 1     | 1 | 0 | 0 |
//! | ...   |   |   |   |
//! | n_i   | 0 | 1 | 0 |

/// Global voxel index of `[i, j, k]` for a mesh of the given shape
///
/// Returns `None` for indices outside of the mesh.
///
/// ```rust
/// # use meshtally::mesh::ijk_to_index;
/// assert_eq!(ijk_to_index([10, 5, 6], [0, 0, 0]), Some(0));
/// assert_eq!(ijk_to_index([10, 5, 6], [1, 0, 0]), Some(1));
/// assert_eq!(ijk_to_index([10, 5, 6], [0, 1, 0]), Some(10));
/// assert_eq!(ijk_to_index([10, 5, 6], [0, 0, 1]), Some(50));
/// assert_eq!(ijk_to_index([10, 5, 6], [10, 0, 0]), None);
/// ```
pub fn ijk_to_index(shape: [usize; 3], ijk: [usize; 3]) -> Option<usize> {
    if ijk.iter().zip(shape.iter()).any(|(idx, n)| idx >= n) {
        return None;
    }
    let [i, j, k] = ijk;
    Some(i + shape[0] * (j + shape[1] * k))
}

/// `[i, j, k]` indices of a global voxel index
///
/// Inverse of [ijk_to_index], returning `None` past the last voxel.
///
/// ```rust
/// # use meshtally::mesh::index_to_ijk;
/// assert_eq!(index_to_ijk([10, 5, 6], 57), Some([7, 0, 1]));
/// assert_eq!(index_to_ijk([10, 5, 6], 300), None);
/// ```
pub fn index_to_ijk(shape: [usize; 3], index: usize) -> Option<[usize; 3]> {
    if index >= shape.iter().product() {
        return None;
    }
    let i = index % shape[0];
    let j = (index / shape[0]) % shape[1];
    let k = index / (shape[0] * shape[1]);
    Some([i, j, k])
}
