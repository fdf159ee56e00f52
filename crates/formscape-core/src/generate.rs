//! Mesh generation entry point
//!
//! [`generate_mesh`] picks the generator from the field's [`Topology`]:
//! spherical and self-parameterized lattices, marching cubes for implicit
//! volumes, height grids for terrain.

use crate::field::{ScalarField, Topology};
use crate::mesh::{Mesh, MeshOptions, VoxelGrid, heightfield, marching_cubes, optimize, parametric};
use crate::params::{Bindings, Dimension, Params};
use crate::{Error, Result};

/// Upper bound on marching cubes resolution
pub const MAX_IMPLICIT_RESOLUTION: u32 = 512;

/// Generate the mesh of a field
///
/// `params` is completed with the field's defaults and never modified.
/// Implicit resolution comes from `options`, then the field's resolution
/// parameter, then the topology default.
pub fn generate_mesh(field: &ScalarField, params: &Params, options: &MeshOptions) -> Result<Mesh> {
    if !field.supports(Dimension::Three) {
        return Err(Error::UnsupportedDimension {
            name: field.name().to_string(),
            dimension: Dimension::Three.to_string(),
        });
    }

    let full = field.resolve_params(params);
    let bindings = Bindings::new(&full);
    let topology = field.topology();

    let mut mesh = match topology {
        Topology::Spherical { segments, rings } => {
            let segments = options.segments.unwrap_or(segments);
            let rings = options.rings.unwrap_or(rings);
            parametric::spherical(segments, rings, |phi, theta| {
                field.sample(&bindings.angular(phi, theta))
            })?
        }
        Topology::Surface { segments, rings } => {
            let segments = options.segments.unwrap_or(segments);
            let rings = options.rings.unwrap_or(rings);
            parametric::lattice(segments, rings, |segment, ring| {
                let u = f64::from(segment) / f64::from(segments);
                let v = f64::from(ring) / f64::from(rings);
                field.surface_node(u, v, &bindings)
            })?
        }
        Topology::Implicit {
            half_extent,
            resolution_key,
            default_resolution,
        } => {
            let resolution = options.resolution.unwrap_or_else(|| {
                resolution_from(bindings.get(resolution_key), default_resolution)
            });
            implicit_mesh(field, &bindings, half_extent, resolution, options)?
        }
        Topology::HeightField { grid } => {
            let grid = options.segments.unwrap_or(grid);
            heightfield::height_field(grid, |x, z| field.sample(&bindings.spatial(x, 0.0, z)))?
        }
    };

    if options.recompute_normals {
        mesh.recalculate_normals();
    }

    tracing::debug!(
        formula = field.name(),
        ?topology,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "generated mesh"
    );
    Ok(mesh)
}

/// Grid resolution held in a parameter, if it is usable
fn resolution_from(value: Option<f64>, default: u32) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.round().min(f64::from(u32::MAX)) as u32,
        _ => default,
    }
}

fn implicit_mesh(
    field: &ScalarField,
    bindings: &Bindings<'_>,
    half_extent: f64,
    resolution: u32,
    options: &MeshOptions,
) -> Result<Mesh> {
    if resolution > MAX_IMPLICIT_RESOLUTION {
        return Err(Error::InvalidParameter(format!(
            "resolution {resolution} exceeds the maximum of {MAX_IMPLICIT_RESOLUTION}"
        )));
    }

    // Non-finite samples count as outside the surface
    let mut non_finite = 0usize;
    let grid = VoxelGrid::sample(resolution, half_extent, |p| {
        let value = field.sample_implicit_at(p, bindings)?;
        if value.is_finite() {
            Ok(value)
        } else {
            non_finite += 1;
            Ok(f64::MAX)
        }
    })?;
    if non_finite > 0 {
        tracing::warn!(count = non_finite, "non-finite voxel samples treated as outside");
    }

    let mut soup = marching_cubes::extract(&grid);
    optimize::laplacian_smooth(&mut soup, options.smoothing_iterations);

    Ok(if options.unify {
        optimize::unify_vertices(&soup)
    } else {
        soup.into_mesh()
    })
}
