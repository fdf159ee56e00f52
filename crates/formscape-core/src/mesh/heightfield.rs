//! Height-field meshes for terrain-style fields

use super::Mesh;
use crate::{Error, Result};

/// Sample `y = height(x, z)` on a `grid × grid` lattice centred on the origin
///
/// Nodes sit at unit spacing, `x = i - grid/2` and `z = j - grid/2`. Normals
/// are area-weighted from the faces. Non-finite heights become zero.
pub fn height_field<F>(grid: u32, mut height: F) -> Result<Mesh>
where
    F: FnMut(f64, f64) -> Result<f64>,
{
    if grid < 2 {
        return Err(Error::InvalidParameter(format!(
            "height field grid must be at least 2, got {grid}"
        )));
    }
    if u64::from(grid) * u64::from(grid) > u64::from(u32::MAX) {
        return Err(Error::InvalidParameter(format!(
            "height field grid {grid} exceeds the index range"
        )));
    }

    let n = grid as usize;
    let half = f64::from(grid) / 2.0;
    let span = (grid - 1) as f32;
    let mut positions = Vec::with_capacity(n * n);
    let mut uvs = Vec::with_capacity(n * n);
    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    let mut non_finite = 0usize;

    for i in 0..grid {
        for j in 0..grid {
            let x = f64::from(i) - half;
            let z = f64::from(j) - half;
            let mut y = height(x, z)?;
            if !y.is_finite() {
                non_finite += 1;
                y = 0.0;
            }
            positions.push([x as f32, y as f32, z as f32]);
            uvs.push([i as f32 / span, j as f32 / span]);

            if i + 1 < grid && j + 1 < grid {
                let a = i * grid + j;
                let b = a + 1;
                let c = a + grid;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
        }
    }

    if non_finite > 0 {
        tracing::warn!(count = non_finite, "non-finite heights replaced with zero");
    }

    let mut mesh = Mesh {
        normals: vec![[0.0; 3]; positions.len()],
        positions,
        uvs: Some(uvs),
        indices,
    };
    mesh.recalculate_normals();

    tracing::debug!(
        grid,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "built height field"
    );
    Ok(mesh)
}
