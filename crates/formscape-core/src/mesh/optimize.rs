//! Mesh post-processing: vertex unification and smoothing

use super::{Mesh, TriangleSoup};
use glam::DVec3;
use std::collections::HashMap;

/// Vertices closer than this on every axis are merged
pub const UNIFY_TOLERANCE: f64 = 1e-5;

/// Fraction of the way each vertex moves toward its triangle's centroid
pub const SMOOTHING_FACTOR: f64 = 0.1;

type CellKey = (i64, i64, i64);

/// Position quantized to five decimals
///
/// Coordinates beyond the `i64` range saturate, so far-off vertices share
/// edge cells and are told apart by [`coincident`].
fn quantize(p: DVec3) -> CellKey {
    let q = (p / UNIFY_TOLERANCE).round();
    (q.x as i64, q.y as i64, q.z as i64)
}

fn coincident(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() < UNIFY_TOLERANCE
}

/// Merge coincident vertices of a soup into an indexed mesh
///
/// A vertex joins the first earlier entry within [`UNIFY_TOLERANCE`] on
/// every axis, keeping that entry's normal. Triangles that collapse onto a
/// repeated vertex are dropped.
pub fn unify_vertices(soup: &TriangleSoup) -> Mesh {
    let mut cells: HashMap<CellKey, Vec<u32>> = HashMap::new();
    let mut positions: Vec<DVec3> = Vec::new();
    let mut normals: Vec<DVec3> = Vec::new();
    let mut remap: Vec<u32> = Vec::with_capacity(soup.positions.len());

    for (i, &p) in soup.positions.iter().enumerate() {
        let key = quantize(p);

        // Check for existing vertex to merge into
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (
                        key.0.saturating_add(dx),
                        key.1.saturating_add(dy),
                        key.2.saturating_add(dz),
                    );
                    let Some(entries) = cells.get(&neighbor) else {
                        continue;
                    };
                    if let Some(&j) = entries
                        .iter()
                        .find(|&&j| coincident(positions[j as usize], p))
                    {
                        found = Some(j);
                        break 'search;
                    }
                }
            }
        }

        let index = match found {
            Some(j) => j,
            None => {
                let j = positions.len() as u32;
                positions.push(p);
                normals.push(soup.normals.get(i).copied().unwrap_or(DVec3::ZERO));
                cells.entry(key).or_default().push(j);
                j
            }
        };
        remap.push(index);
    }

    // Remove degenerate triangles
    let mut indices = Vec::with_capacity(remap.len());
    for tri in remap.chunks_exact(3) {
        if tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0] {
            indices.extend_from_slice(tri);
        }
    }

    tracing::debug!(
        raw = soup.positions.len(),
        unified = positions.len(),
        dropped_triangles = soup.triangle_count() - indices.len() / 3,
        "unified vertices"
    );

    Mesh {
        positions: positions.iter().map(|p| p.as_vec3().to_array()).collect(),
        normals: normals.iter().map(|n| n.as_vec3().to_array()).collect(),
        uvs: None,
        indices,
    }
}

/// Pull each triangle's corners toward its centroid, `iterations` times
///
/// Works on the soup, so shared corners move independently; the surface
/// shrinks with every pass. Normals are recomputed per face afterwards.
pub fn laplacian_smooth(soup: &mut TriangleSoup, iterations: u32) {
    if iterations == 0 {
        return;
    }

    for _ in 0..iterations {
        for tri in soup.positions.chunks_exact_mut(3) {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            for v in tri.iter_mut() {
                *v += (centroid - *v) * SMOOTHING_FACTOR;
            }
        }
    }
    soup.recompute_face_normals();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangles_sharing_an_edge() -> TriangleSoup {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::ZERO, DVec3::X, DVec3::Y);
        soup.push_triangle(DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y);
        soup
    }

    #[test]
    fn test_unify_shared_edge() {
        let soup = two_triangles_sharing_an_edge();
        let mesh = unify_vertices(&soup);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 1, 3, 2]);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_unify_within_tolerance() {
        let mut soup = TriangleSoup::new();
        let jitter = DVec3::new(4e-6, -6e-6, 9e-6);
        soup.push_triangle(DVec3::ZERO, DVec3::X, DVec3::Y);
        soup.push_triangle(DVec3::ZERO + jitter, DVec3::Y, DVec3::Z);
        let mesh = unify_vertices(&soup);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices[3], 0);
    }

    #[test]
    fn test_unify_keeps_distinct_points() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::ZERO, DVec3::X, DVec3::Y);
        soup.push_triangle(DVec3::splat(2e-5), DVec3::Y * 2.0, DVec3::Z);
        assert_eq!(unify_vertices(&soup).vertex_count(), 6);
    }

    #[test]
    fn test_unify_keeps_first_normal() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::ZERO, DVec3::X, DVec3::Y);
        // Opposite winding: same corners, flipped normal
        soup.push_triangle(DVec3::ZERO, DVec3::Y, DVec3::Z);
        let mesh = unify_vertices(&soup);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unify_drops_collapsed_triangles() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::ZERO, DVec3::splat(1e-7), DVec3::X);
        soup.push_triangle(DVec3::ZERO, DVec3::X, DVec3::Y);
        let mesh = unify_vertices(&soup);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_unify_far_away_vertices() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::new(1e15, 0.0, 0.0), DVec3::X, DVec3::Y);
        soup.push_triangle(DVec3::new(-1e15, 0.0, 0.0), DVec3::new(1e15, 1.0, 0.0), DVec3::new(1e15, 0.0, 0.0));
        assert_eq!(quantize(DVec3::new(1e15, 0.0, 0.0)).0, i64::MAX);

        let mesh = unify_vertices(&soup);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices[5], 0);
    }

    #[test]
    fn test_unify_empty() {
        let mesh = unify_vertices(&TriangleSoup::new());
        assert!(mesh.is_empty());
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_smoothing_shrinks_toward_centroid() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(DVec3::ZERO, DVec3::X * 3.0, DVec3::Y * 3.0);
        let centroid = DVec3::new(1.0, 1.0, 0.0);

        laplacian_smooth(&mut soup, 1);
        assert_relative_eq!(soup.positions[0].x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(soup.positions[0].y, 0.1, epsilon = 1e-12);

        laplacian_smooth(&mut soup, 2);
        let d = soup.positions[1].distance(centroid);
        // Three passes in total: 0.9^3 of the original distance
        assert_relative_eq!(d, 0.9_f64.powi(3) * DVec3::new(2.0, -1.0, 0.0).length(), epsilon = 1e-12);
        assert_eq!(soup.normals[0], DVec3::Z);
    }

    #[test]
    fn test_smoothing_zero_iterations_is_noop() {
        let mut soup = two_triangles_sharing_an_edge();
        let before = soup.clone();
        laplacian_smooth(&mut soup, 0);
        assert_eq!(soup, before);
    }
}
