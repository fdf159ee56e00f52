//! Triangle meshes and the generators that build them
//!
//! Generators compute in `f64` and emit `f32` buffers ready for upload.
//! Marching cubes produces a [`TriangleSoup`] (three fresh vertices per
//! triangle); [`optimize::unify_vertices`] turns a soup into an indexed
//! [`Mesh`].

pub mod heightfield;
pub mod marching_cubes;
pub mod optimize;
pub mod parametric;

use crate::{Error, Result};
use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

pub use marching_cubes::{EDGE_TABLE, VoxelGrid};

/// An interleaved vertex, laid out for GPU vertex buffers
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// An indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    /// One per position
    pub normals: Vec<[f32; 3]>,
    /// One per position when present
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Counter-clockwise triangles
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check the buffer invariants
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        if self.normals.len() != count {
            return Err(Error::MeshGeneration(format!(
                "{} normals for {} positions",
                self.normals.len(),
                count
            )));
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != count {
                return Err(Error::MeshGeneration(format!(
                    "{} uvs for {} positions",
                    uvs.len(),
                    count
                )));
            }
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::MeshGeneration(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::MeshGeneration(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        Ok(())
    }

    /// Area-weighted vertex normals from the faces
    pub fn recalculate_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let p0 = Vec3::from_array(self.positions[i0]);
            let p1 = Vec3::from_array(self.positions[i1]);
            let p2 = Vec3::from_array(self.positions[i2]);

            // Unnormalized: longer for larger faces
            let face_normal = (p1 - p0).cross(p2 - p0);
            for i in [i0, i1, i2] {
                accum[i] += face_normal;
            }
        }

        self.normals = accum
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }

    /// Axis-aligned bounds, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Interleave into [`Vertex`] records; missing uvs are zero
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                normal: self.normals.get(i).copied().unwrap_or_default(),
                uv: self
                    .uvs
                    .as_ref()
                    .and_then(|uvs| uvs.get(i).copied())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Raw index buffer bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Non-indexed triangles: every three consecutive vertices form one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    pub positions: Vec<DVec3>,
    pub normals: Vec<DVec3>,
}

/// Unit normal of a counter-clockwise triangle, zero when degenerate
pub fn face_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a triangle with its flat normal on all three vertices
    pub fn push_triangle(&mut self, a: DVec3, b: DVec3, c: DVec3) {
        let n = face_normal(a, b, c);
        self.positions.extend([a, b, c]);
        self.normals.extend([n, n, n]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Replace every normal with its triangle's flat normal
    pub fn recompute_face_normals(&mut self) {
        for (tri, normals) in self
            .positions
            .chunks_exact(3)
            .zip(self.normals.chunks_exact_mut(3))
        {
            let n = face_normal(tri[0], tri[1], tri[2]);
            normals.fill(n);
        }
    }

    /// Index the soup as-is, one vertex per corner
    pub fn into_mesh(self) -> Mesh {
        let count = self.positions.len() as u32;
        Mesh {
            positions: self.positions.iter().map(|p| p.as_vec3().to_array()).collect(),
            normals: self.normals.iter().map(|n| n.as_vec3().to_array()).collect(),
            uvs: None,
            indices: (0..count).collect(),
        }
    }
}

/// Configuration for mesh generation
///
/// Every override is optional; a field's own topology supplies the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Lattice segments (φ direction), or height-field grid size
    pub segments: Option<u32>,
    /// Lattice rings (θ direction)
    pub rings: Option<u32>,
    /// Marching cubes resolution, overriding the field's parameter
    pub resolution: Option<u32>,
    /// Laplacian smoothing passes over implicit surfaces
    pub smoothing_iterations: u32,
    /// Merge coincident marching cubes vertices
    pub unify: bool,
    /// Replace generator normals with area-weighted vertex normals
    pub recompute_normals: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            segments: None,
            rings: None,
            resolution: None,
            smoothing_iterations: 0,
            unify: true,
            recompute_normals: false,
        }
    }
}

impl MeshOptions {
    pub fn with_lattice(mut self, segments: u32, rings: u32) -> Self {
        self.segments = Some(segments);
        self.rings = Some(rings);
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_smoothing(mut self, iterations: u32) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    pub fn with_unify(mut self, unify: bool) -> Self {
        self.unify = unify;
        self
    }

    pub fn with_recompute_normals(mut self, recompute: bool) -> Self {
        self.recompute_normals = recompute;
        self
    }
}
