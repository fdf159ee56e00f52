//! Parametric lattice meshes
//!
//! A lattice of `(segments + 1) * (rings + 1)` nodes is stitched into two
//! triangles per quad. Seam and pole nodes are duplicated rather than
//! shared, which keeps the uv layout continuous.

use super::Mesh;
use crate::{Error, Result};
use glam::DVec3;
use std::f64::consts::{PI, TAU};

/// Build a lattice mesh from a node function
///
/// `node(segment, ring)` returns the position and normal of one node.
/// Non-finite positions are replaced by the origin so the buffers stay
/// usable; a single warning reports how many were replaced.
pub fn lattice<F>(segments: u32, rings: u32, mut node: F) -> Result<Mesh>
where
    F: FnMut(u32, u32) -> Result<(DVec3, DVec3)>,
{
    if segments == 0 || rings == 0 {
        return Err(Error::InvalidParameter(format!(
            "lattice needs at least one segment and one ring, got {segments}x{rings}"
        )));
    }
    let count = (segments as u64 + 1) * (rings as u64 + 1);
    if count > u64::from(u32::MAX) {
        return Err(Error::InvalidParameter(format!(
            "lattice of {segments}x{rings} exceeds the index range"
        )));
    }

    let count = count as usize;
    let mut positions = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);
    let mut non_finite = 0usize;

    for ring in 0..=rings {
        for segment in 0..=segments {
            let (mut position, mut normal) = node(segment, ring)?;
            if !position.is_finite() {
                non_finite += 1;
                position = DVec3::ZERO;
            }
            if !normal.is_finite() {
                normal = DVec3::ZERO;
            }
            positions.push(position.as_vec3().to_array());
            normals.push(normal.as_vec3().to_array());
            uvs.push([
                segment as f32 / segments as f32,
                ring as f32 / rings as f32,
            ]);
        }
    }

    if non_finite > 0 {
        tracing::warn!(
            count = non_finite,
            "non-finite lattice samples replaced with the origin"
        );
    }

    let mut indices = Vec::with_capacity(segments as usize * rings as usize * 6);
    for ring in 0..rings {
        for segment in 0..segments {
            let first = ring * (segments + 1) + segment;
            let second = first + segments + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    tracing::debug!(
        segments,
        rings,
        vertices = positions.len(),
        triangles = indices.len() / 3,
        "built lattice mesh"
    );

    Ok(Mesh {
        positions,
        normals,
        uvs: Some(uvs),
        indices,
    })
}

/// Point at radius `r` along polar angle `theta` and azimuth `phi`
pub fn spherical_point(r: f64, phi: f64, theta: f64) -> DVec3 {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    DVec3::new(r * sin_t * cos_p, r * cos_t, r * sin_t * sin_p)
}

/// Radial surface `r = radius(phi, theta)`, θ over rings and φ over segments
///
/// Normals point away from the origin; a zero radius gives a zero normal.
pub fn spherical<F>(segments: u32, rings: u32, mut radius: F) -> Result<Mesh>
where
    F: FnMut(f64, f64) -> Result<f64>,
{
    lattice(segments, rings, |segment, ring| {
        let theta = f64::from(ring) / f64::from(rings) * PI;
        let phi = f64::from(segment) / f64::from(segments) * TAU;
        let position = spherical_point(radius(phi, theta)?, phi, theta);
        Ok((position, position.normalize_or_zero()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lattice_layout() {
        let mesh = lattice(2, 1, |s, r| Ok((DVec3::new(f64::from(s), f64::from(r), 0.0), DVec3::Z))).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(&mesh.indices[..6], &[0, 3, 1, 3, 4, 1]);
        assert!(mesh.validate().is_ok());

        let uvs = mesh.uvs.unwrap();
        assert_eq!(uvs[0], [0.0, 0.0]);
        assert_eq!(uvs[1], [0.5, 0.0]);
        assert_eq!(uvs[5], [1.0, 1.0]);
    }

    #[test]
    fn test_lattice_rejects_empty() {
        let err = lattice(0, 4, |_, _| Ok((DVec3::ZERO, DVec3::ZERO))).err();
        assert!(matches!(err, Some(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_lattice_propagates_node_errors() {
        let result = lattice(2, 2, |s, _| {
            if s == 1 {
                Err(Error::evaluation("boom"))
            } else {
                Ok((DVec3::ZERO, DVec3::ZERO))
            }
        });
        assert!(matches!(result, Err(Error::Evaluation(_))));
    }

    #[test]
    fn test_lattice_replaces_non_finite() {
        let mesh = lattice(1, 1, |s, _| {
            let x = if s == 0 { f64::NAN } else { 1.0 };
            Ok((DVec3::splat(x), DVec3::splat(x)))
        })
        .unwrap();
        assert_eq!(mesh.positions[0], [0.0; 3]);
        assert_eq!(mesh.normals[0], [0.0; 3]);
        assert_eq!(mesh.positions[1], [1.0; 3]);
    }

    #[test]
    fn test_unit_sphere() {
        let mesh = spherical(16, 8, |_, _| Ok(1.0)).unwrap();
        assert_eq!(mesh.vertex_count(), 17 * 9);
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert_relative_eq!(len, 1.0, epsilon = 1e-5);
            assert_relative_eq!(p[1], n[1], epsilon = 1e-5);
        }
        // Ring 0 is the north pole
        assert_relative_eq!(mesh.positions[0][1], 1.0);
    }

    #[test]
    fn test_zero_radius_gives_zero_normal() {
        let mesh = spherical(4, 4, |_, _| Ok(0.0)).unwrap();
        assert!(mesh.normals.iter().all(|n| *n == [0.0; 3]));
    }

    #[test]
    fn test_spherical_point_axes() {
        let p = spherical_point(2.0, 0.0, PI / 2.0);
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        let p = spherical_point(1.0, PI / 2.0, PI / 2.0);
        assert_relative_eq!(p.z, 1.0);
    }
}
