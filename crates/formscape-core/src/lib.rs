//! # Formscape Core
//!
//! Turns mathematical formulas into triangle meshes and 2D polylines.
//!
//! Formulas are [`ScalarField`]s: built-in closed forms (superformula,
//! gyroid, Möbius strip, ...), fractal noise fields, or user formulas
//! written as `=` expressions over a small function whitelist.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formscape_core::prelude::*;
//!
//! # fn main() -> formscape_core::Result<()> {
//! let registry = Registry::builtin();
//! let gyroid = registry.resolve("gyroid")?;
//!
//! let params = Params::from([("scale", 0.8)]);
//! let mesh = generate_mesh(gyroid, &params, &MeshOptions::default().with_smoothing(1))?;
//! mesh.export("gyroid.obj")?;
//!
//! let blob = UserExpression::new("Blob", "", "=1 + 0.2*sin(5*phi)*sin(3*theta)", None)?;
//! let line = generate_polyline(&blob.into(), &Params::new(), 200)?;
//! line.export("blob.csv")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Conventions
//!
//! - **Angles**: radians; `theta` is polar in `[0, π]`, `phi` azimuthal in `[0, 2π]`
//! - **Precision**: sampling in `f64`, mesh buffers in `f32`
//! - **Coordinate system**: right-handed, Y-up

pub mod export;
pub mod expr;
pub mod field;
pub mod mesh;
pub mod noise;
pub mod params;
pub mod plot;
pub mod preset;
pub mod registry;

mod error;
mod generate;

pub use error::{Error, Result};
pub use generate::{MAX_IMPLICIT_RESOLUTION, generate_mesh};

/// Prelude module for convenient imports
pub mod prelude {
    // Formulas
    pub use crate::expr::{Expression, evaluate, extract_variables, validate};
    pub use crate::field::{ClosedForm, NoiseField, PlotStrategy, ScalarField, Topology, UserExpression};
    pub use crate::registry::Registry;

    // Parameters
    pub use crate::params::{Dimension, FieldDescriptor, ParameterDescriptor, Params, randomize};
    pub use crate::preset::Preset;

    // Generation
    pub use crate::generate_mesh;
    pub use crate::mesh::{Mesh, MeshOptions, Vertex};
    pub use crate::plot::{Polyline2D, generate_polyline};

    // Export
    pub use crate::export::{Export, ExportFormat};

    // Error handling
    pub use crate::{Error, Result};
}
