//! Wavefront OBJ export

use crate::Result;
use crate::mesh::Mesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export a mesh to an OBJ file
pub fn export_obj(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), vertices = mesh.vertex_count(), "wrote OBJ");
    Ok(())
}

/// Write a mesh as OBJ text
///
/// Texture coordinates are written only when the mesh has them; faces
/// then reference `v/vt/vn`, otherwise `v//vn`.
pub fn write_obj<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    mesh.validate()?;

    // Header
    writeln!(writer, "# Formscape OBJ Export")?;
    writeln!(writer, "# Vertices: {}", mesh.vertex_count())?;
    writeln!(writer, "# Triangles: {}", mesh.triangle_count())?;
    writeln!(writer)?;

    for p in &mesh.positions {
        writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
    }
    writeln!(writer)?;

    if let Some(uvs) = &mesh.uvs {
        for uv in uvs {
            writeln!(writer, "vt {} {}", uv[0], uv[1])?;
        }
        writeln!(writer)?;
    }

    for n in &mesh.normals {
        writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    writeln!(writer)?;

    // Faces (OBJ uses 1-based indexing)
    let textured = mesh.uvs.is_some();
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        if textured {
            writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        } else {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        }
    }

    Ok(())
}
