//! Export of meshes and polylines to interchange formats

mod csv;
mod obj;

use crate::Result;
use crate::mesh::Mesh;
use crate::plot::Polyline2D;
use std::path::Path;

pub use csv::{export_csv, write_csv};
pub use obj::{export_obj, write_obj};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Obj,
    Csv,
}

impl ExportFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Csv => "csv",
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Obj => "Wavefront OBJ",
            Self::Csv => "CSV (x,y)",
        }
    }
}

/// Extension trait for writing generated geometry to disk
pub trait Export {
    /// Format this geometry is written in
    const FORMAT: ExportFormat;

    /// Write to `path`; the extension must match [`Export::FORMAT`]
    fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match ExportFormat::from_extension(path) {
            Some(format) if format == Self::FORMAT => self.write_to(path),
            Some(format) => Err(crate::Error::Export(format!(
                "cannot write {} as {}",
                path.display(),
                format.name()
            ))),
            None => Err(crate::Error::Export(format!(
                "Unknown file extension: {}",
                path.display()
            ))),
        }
    }

    /// Write to `path` regardless of its extension
    fn write_to(&self, path: &Path) -> Result<()>;
}

impl Export for Mesh {
    const FORMAT: ExportFormat = ExportFormat::Obj;

    fn write_to(&self, path: &Path) -> Result<()> {
        export_obj(self, path)
    }
}

impl Export for Polyline2D {
    const FORMAT: ExportFormat = ExportFormat::Csv;

    fn write_to(&self, path: &Path) -> Result<()> {
        export_csv(self, path)
    }
}
