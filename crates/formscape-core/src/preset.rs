//! Saved generation settings
//!
//! A preset names a formula, fixes some of its parameters and carries the
//! mesh and plot settings, stored as JSON:
//!
//! ```json
//! {
//!   "formula": "gyroid",
//!   "params": { "scale": 0.8, "threshold": 0.2 },
//!   "mesh": { "resolution": 40, "smoothing_iterations": 2 },
//!   "plot_resolution": 300
//! }
//! ```

use crate::field::ScalarField;
use crate::mesh::{Mesh, MeshOptions};
use crate::params::Params;
use crate::plot::{DEFAULT_PLOT_RESOLUTION, Polyline2D, generate_polyline};
use crate::registry::Registry;
use crate::{Error, Result, generate_mesh};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Registry name of the formula
    pub formula: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub mesh: MeshOptions,
    #[serde(default)]
    pub plot_resolution: Option<u32>,
}

impl Preset {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            params: Params::new(),
            mesh: MeshOptions::default(),
            plot_resolution: None,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshOptions) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a preset from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let preset = Self::from_json(&json)?;
        tracing::debug!(path = %path.as_ref().display(), formula = %preset.formula, "loaded preset");
        Ok(preset)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Resolve the formula and check the stored values against its ranges
    pub fn resolve<'r>(&self, registry: &'r Registry) -> Result<&'r ScalarField> {
        let field = registry.resolve(&self.formula)?;
        self.check_params(field)?;
        Ok(field)
    }

    /// Check the stored values against the ranges `field` declares
    ///
    /// Keys the field does not know are accepted.
    pub fn check_params(&self, field: &ScalarField) -> Result<()> {
        let descriptor = field.descriptor();
        for (key, value) in self.params.iter() {
            if let Some(p) = descriptor.parameter(key) {
                if !(p.min..=p.max).contains(&value) {
                    return Err(Error::InvalidParameter(format!(
                        "{key} = {value} is outside [{}, {}]",
                        p.min, p.max
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn generate_mesh(&self, registry: &Registry) -> Result<Mesh> {
        generate_mesh(self.resolve(registry)?, &self.params, &self.mesh)
    }

    pub fn generate_polyline(&self, registry: &Registry) -> Result<Polyline2D> {
        let resolution = self.plot_resolution.unwrap_or(DEFAULT_PLOT_RESOLUTION);
        generate_polyline(self.resolve(registry)?, &self.params, resolution)
    }
}
