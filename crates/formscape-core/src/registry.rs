//! Lookup of fields by formula name

use crate::field::{ClosedForm, NoiseField, ScalarField};
use crate::{Error, Result};

/// Named fields, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<(String, ScalarField)>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in formula
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("gielis", ClosedForm::superformula());
        registry.register("sineInterference", ClosedForm::sine_interference());
        registry.register("cartesianSine", ClosedForm::cartesian_sine());
        registry.register("gyroid", ClosedForm::gyroid());
        registry.register("mobius", ClosedForm::mobius());
        registry.register("terrainGen", NoiseField::terrain());
        registry.register("cellularNoise", NoiseField::cellular());
        registry.register("simplexTerrain", NoiseField::simplex_terrain());
        registry
    }

    /// Add a field, replacing any field already under `name`
    pub fn register(&mut self, name: impl Into<String>, field: impl Into<ScalarField>) {
        let name = name.into();
        let field = field.into();
        tracing::debug!(name = %name, field = field.name(), "registering formula");
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = field,
            None => self.entries.push((name, field)),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&ScalarField> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| Error::UnknownFormula {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarField)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
