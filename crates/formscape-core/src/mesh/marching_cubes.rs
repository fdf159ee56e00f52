//! Marching cubes over a sampled voxel grid
//!
//! The crossing points of a cube's active edges are taken in edge order and
//! grouped three at a time; there is no per-case triangle table. Cubes whose
//! crossings do not come in a multiple of three leave the remainder unused.

use super::TriangleSoup;
use crate::{Error, Result};
use glam::DVec3;

/// Samples of an implicit field over `[-half_extent, half_extent]^3`
///
/// Values are stored at `x + y*dim + z*dim*dim` with `dim = resolution + 1`,
/// so every cube's far corners are inside the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    resolution: u32,
    dim: usize,
    half_extent: f64,
    step: f64,
    values: Vec<f64>,
}

impl VoxelGrid {
    /// Sample `f` at every lattice point
    pub fn sample(
        resolution: u32,
        half_extent: f64,
        mut f: impl FnMut(DVec3) -> Result<f64>,
    ) -> Result<Self> {
        let (dim, step) = Self::layout(resolution, half_extent)?;
        let mut values = Vec::with_capacity(dim * dim * dim);

        for z in 0..dim {
            for y in 0..dim {
                for x in 0..dim {
                    let lattice = DVec3::new(x as f64, y as f64, z as f64);
                    values.push(f(-half_extent + lattice * step)?);
                }
            }
        }

        Ok(Self {
            resolution,
            dim,
            half_extent,
            step,
            values,
        })
    }

    /// Wrap precomputed samples in `x + y*dim + z*dim*dim` order
    pub fn from_values(resolution: u32, half_extent: f64, values: Vec<f64>) -> Result<Self> {
        let (dim, step) = Self::layout(resolution, half_extent)?;
        if values.len() != dim * dim * dim {
            return Err(Error::MeshGeneration(format!(
                "expected {} samples, got {}",
                dim * dim * dim,
                values.len()
            )));
        }
        Ok(Self {
            resolution,
            dim,
            half_extent,
            step,
            values,
        })
    }

    fn layout(resolution: u32, half_extent: f64) -> Result<(usize, f64)> {
        if resolution == 0 {
            return Err(Error::InvalidParameter("resolution must be at least 1".into()));
        }
        if !(half_extent.is_finite() && half_extent > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "half extent must be positive, got {half_extent}"
            )));
        }
        let dim = resolution as usize + 1;
        Ok((dim, 2.0 * half_extent / f64::from(resolution)))
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn half_extent(&self) -> f64 {
        self.half_extent
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.dim + z * self.dim * self.dim
    }

    pub fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[self.index(x, y, z)]
    }

    /// World position of a (possibly fractional) lattice coordinate
    pub fn world(&self, lattice: DVec3) -> DVec3 {
        -self.half_extent + lattice * self.step
    }
}

/// Active-edge mask per cube configuration
#[rustfmt::skip]
pub const EDGE_TABLE: [u16; 256] = [
    0x0, 0x109, 0x203, 0x30a, 0x406, 0x50f, 0x605, 0x70c, 0x80c, 0x905, 0xa0f, 0xb06, 0xc0a, 0xd03, 0xe09, 0xf00,
    0x190, 0x99, 0x393, 0x29a, 0x596, 0x49f, 0x795, 0x69c, 0x99c, 0x895, 0xb9f, 0xa96, 0xd9a, 0xc93, 0xf99, 0xe90,
    0x230, 0x339, 0x33, 0x13a, 0x636, 0x73f, 0x435, 0x53c, 0xa3c, 0xb35, 0x83f, 0x936, 0xe3a, 0xf33, 0xc39, 0xd30,
    0x3a0, 0x2a9, 0x1a3, 0xaa, 0x7a6, 0x6af, 0x5a5, 0x4ac, 0xbac, 0xaa5, 0x9af, 0x8a6, 0xfaa, 0xea3, 0xda9, 0xca0,
    0x460, 0x569, 0x663, 0x76a, 0x66, 0x16f, 0x265, 0x36c, 0xc6c, 0xd65, 0xe6f, 0xf66, 0x86a, 0x963, 0xa69, 0xb60,
    0x5f0, 0x4f9, 0x7f3, 0x6fa, 0x1f6, 0xff, 0x3f5, 0x2fc, 0xdfc, 0xcf5, 0xfff, 0xef6, 0x9fa, 0x8f3, 0xbf9, 0xaf0,
    0x650, 0x759, 0x453, 0x55a, 0x256, 0x35f, 0x55, 0x15c, 0xe5c, 0xf55, 0xc5f, 0xd56, 0xa5a, 0xb53, 0x859, 0x950,
    0x7c0, 0x6c9, 0x5c3, 0x4ca, 0x3c6, 0x2cf, 0x1c5, 0xcc, 0xfcc, 0xec5, 0xdcf, 0xcc6, 0xbca, 0xac3, 0x9c9, 0x8c0,
    0x8c0, 0x9c9, 0xac3, 0xbca, 0xcc6, 0xdcf, 0xec5, 0xfcc, 0xcc, 0x1c5, 0x2cf, 0x3c6, 0x4ca, 0x5c3, 0x6c9, 0x7c0,
    0x950, 0x859, 0xb53, 0xa5a, 0xd56, 0xc5f, 0xf55, 0xe5c, 0x15c, 0x55, 0x35f, 0x256, 0x55a, 0x453, 0x759, 0x650,
    0xaf0, 0xbf9, 0x8f3, 0x9fa, 0xef6, 0xfff, 0xcf5, 0xdfc, 0x2fc, 0x3f5, 0xff, 0x1f6, 0x6fa, 0x7f3, 0x4f9, 0x5f0,
    0xb60, 0xa69, 0x963, 0x86a, 0xf66, 0xe6f, 0xd65, 0xc6c, 0x36c, 0x265, 0x16f, 0x66, 0x76a, 0x663, 0x569, 0x460,
    0xca0, 0xda9, 0xea3, 0xfaa, 0x8a6, 0x9af, 0xaa5, 0xbac, 0x4ac, 0x5a5, 0x6af, 0x7a6, 0xaa, 0x1a3, 0x2a9, 0x3a0,
    0xd30, 0xc39, 0xf33, 0xe3a, 0x936, 0x83f, 0xb35, 0xa3c, 0x53c, 0x435, 0x73f, 0x636, 0x13a, 0x33, 0x339, 0x230,
    0xe90, 0xf99, 0xc93, 0xd9a, 0xa96, 0xb9f, 0x895, 0x99c, 0x69c, 0x795, 0x49f, 0x596, 0x29a, 0x393, 0x99, 0x190,
    0xf00, 0xe09, 0xd03, 0xc0a, 0xb06, 0xa0f, 0x905, 0x80c, 0x70c, 0x605, 0x50f, 0x406, 0x30a, 0x203, 0x109, 0x0,
];

/// Corner offsets in the standard 0-7 layout used by the edges
const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Corner pair of each of the 12 cube edges
const EDGE_CORNERS: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Samples closer than this are treated as equal when interpolating
const FLAT_EDGE_EPSILON: f64 = 1e-5;

/// Configuration bits for the cube at `(x, y, z)`
///
/// Bit `i` tests the corner at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`, which
/// is not the layout the edges use.
fn cube_index(grid: &VoxelGrid, x: usize, y: usize, z: usize) -> usize {
    let mut index = 0;
    for i in 0..8 {
        let value = grid.value(x + (i & 1), y + ((i >> 1) & 1), z + ((i >> 2) & 1));
        if value <= 0.0 {
            index |= 1 << i;
        }
    }
    index
}

fn edge_point(grid: &VoxelGrid, edge: usize, x: usize, y: usize, z: usize) -> DVec3 {
    let (c1, c2) = EDGE_CORNERS[edge];
    let [ax, ay, az] = CORNER_OFFSETS[c1];
    let [bx, by, bz] = CORNER_OFFSETS[c2];

    let v1 = grid.value(x + ax, y + ay, z + az);
    let v2 = grid.value(x + bx, y + by, z + bz);

    let t = if (v1 - v2).abs() > FLAT_EDGE_EPSILON {
        v1 / (v1 - v2)
    } else {
        0.5
    };

    let p1 = DVec3::new((x + ax) as f64, (y + ay) as f64, (z + az) as f64);
    let p2 = DVec3::new((x + bx) as f64, (y + by) as f64, (z + bz) as f64);
    grid.world(p1.lerp(p2, t))
}

/// Extract the zero level set of `grid` as flat-shaded triangles
pub fn extract(grid: &VoxelGrid) -> TriangleSoup {
    let mut soup = TriangleSoup::new();
    let n = grid.resolution() as usize;
    let mut crossings = Vec::with_capacity(12);

    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                let index = cube_index(grid, x, y, z);
                if index == 0 || index == 255 {
                    continue;
                }

                let edges = EDGE_TABLE[index];
                crossings.clear();
                for edge in 0..12 {
                    if edges & (1 << edge) != 0 {
                        crossings.push(edge_point(grid, edge, x, y, z));
                    }
                }

                for tri in crossings.chunks_exact(3) {
                    soup.push_triangle(tri[0], tri[1], tri[2]);
                }
            }
        }
    }

    tracing::debug!(
        resolution = grid.resolution(),
        triangles = soup.triangle_count(),
        "marching cubes"
    );
    soup
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_positive_grid_is_empty() {
        let grid = VoxelGrid::sample(8, 1.0, |_| Ok(1.0)).unwrap();
        let soup = extract(&grid);
        assert!(soup.is_empty());
    }

    #[test]
    fn test_all_negative_grid_is_empty() {
        let grid = VoxelGrid::sample(4, 1.0, |_| Ok(-1.0)).unwrap();
        assert!(extract(&grid).is_empty());
    }

    #[test]
    fn test_grid_layout() {
        let grid = VoxelGrid::sample(4, 2.0, |p| Ok(p.x + 10.0 * p.y + 100.0 * p.z)).unwrap();
        assert_eq!(grid.dim(), 5);
        assert_eq!(grid.step(), 1.0);
        assert_eq!(grid.values().len(), 125);
        // x + y*dim + z*dim*dim addressing, world = -size + lattice*step
        assert_eq!(grid.value(0, 0, 0), -2.0 - 20.0 - 200.0);
        assert_eq!(grid.value(4, 0, 0), 2.0 - 20.0 - 200.0);
        assert_eq!(grid.value(0, 4, 0), -2.0 + 20.0 - 200.0);
        assert_eq!(grid.value(0, 0, 4), -2.0 - 20.0 + 200.0);
    }

    #[test]
    fn test_plane_crossing_vertices_lie_on_plane() {
        // Plane z = 0.25 crosses between lattice layers
        let grid = VoxelGrid::sample(4, 1.0, |p| Ok(p.z - 0.25)).unwrap();
        let soup = extract(&grid);
        assert!(!soup.is_empty());
        assert_eq!(soup.vertex_count() % 3, 0);
        assert_eq!(soup.normals.len(), soup.positions.len());
        for p in &soup.positions {
            assert!((p.z - 0.25).abs() < 1e-9, "vertex {p} off the plane");
            assert!(p.abs().max_element() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_flat_edge_uses_midpoint() {
        let values = vec![0.0; 8];
        let grid = VoxelGrid::from_values(1, 1.0, values).unwrap();
        let p = edge_point(&grid, 0, 0, 0, 0);
        assert_eq!(p, DVec3::new(0.0, -1.0, -1.0));
    }

    #[test]
    fn test_from_values_checks_length() {
        assert!(VoxelGrid::from_values(2, 1.0, vec![0.0; 26]).is_err());
        assert!(VoxelGrid::from_values(0, 1.0, vec![0.0; 1]).is_err());
    }
}
