//! Parameter maps, descriptors and sampling bindings
//!
//! A [`Params`] map is what the caller owns: one value per named parameter.
//! During sampling the generators never write into it; the reserved
//! coordinates (`phi`, `theta`, `x`, `y`, `z`) are layered on top through a
//! [`Bindings`] value that is cheap to copy per lattice node.

use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Keys injected by the samplers; never persisted by callers
pub const RESERVED_KEYS: [&str; 5] = ["phi", "theta", "x", "y", "z"];

/// Returns true if `key` is one of the sampler-injected coordinates
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Named parameter values for a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, f64>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Copy every entry of `other` into this map, overwriting existing keys
    pub fn extend_from(&mut self, other: &Params) {
        for (k, v) in other.iter() {
            self.0.insert(k.to_string(), v);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for Params {
    fn from(entries: [(&str, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// A parameter map with sampler coordinates layered on top
///
/// Lookups check the injected coordinates first and fall back to the
/// underlying map, so a caller-set `phi` is visible until a sampler
/// overrides it.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    params: &'a Params,
    phi: Option<f64>,
    theta: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl<'a> Bindings<'a> {
    pub fn new(params: &'a Params) -> Self {
        Self {
            params,
            phi: None,
            theta: None,
            x: None,
            y: None,
            z: None,
        }
    }

    /// Inject the angular coordinates
    pub fn angular(mut self, phi: f64, theta: f64) -> Self {
        self.phi = Some(phi);
        self.theta = Some(theta);
        self
    }

    pub fn with_phi(mut self, phi: f64) -> Self {
        self.phi = Some(phi);
        self
    }

    /// Inject the spatial coordinates
    pub fn spatial(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.z = Some(z);
        self
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    /// Look up a binding by name
    pub fn get(&self, name: &str) -> Option<f64> {
        let injected = match name {
            "phi" => self.phi,
            "theta" => self.theta,
            "x" => self.x,
            "y" => self.y,
            "z" => self.z,
            _ => None,
        };
        injected.or_else(|| self.params.get(name))
    }

    /// Look up a binding, treating a missing one as zero
    pub fn value(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn params(&self) -> &'a Params {
        self.params
    }
}

/// Output dimensionality a field can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "2d")]
    Two,
    #[serde(rename = "3d")]
    Three,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Two => write!(f, "2d"),
            Self::Three => write!(f, "3d"),
        }
    }
}

/// Legal domain and UI affordance of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Key used in the parameter map
    pub key: String,
    /// Display name
    pub name: String,
    pub description: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: Option<f64>,
    /// Locked parameters are skipped by [`randomize`]
    pub locked: bool,
}

impl ParameterDescriptor {
    pub fn new(key: impl Into<String>, name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            min,
            max,
            step,
            default: None,
            locked: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Check `min <= default <= max` (and `min <= max`)
    pub fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(Error::InvalidParameter(format!(
                "{}: min {} exceeds max {}",
                self.key, self.min, self.max
            )));
        }
        if let Some(default) = self.default {
            if default < self.min || default > self.max {
                return Err(Error::InvalidParameter(format!(
                    "{}: default {} outside [{}, {}]",
                    self.key, default, self.min, self.max
                )));
            }
        }
        Ok(())
    }

    /// The default value, or the lower bound when none is declared
    pub fn default_or_min(&self) -> f64 {
        self.default.unwrap_or(self.min)
    }
}

/// Describes a field: its parameters and supported outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub description: String,
    /// Ordered, unique by key
    pub parameters: Vec<ParameterDescriptor>,
    pub dimensions: Vec<Dimension>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            dimensions: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_dimensions(mut self, dimensions: &[Dimension]) -> Self {
        self.dimensions = dimensions.to_vec();
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.key == key)
    }

    pub fn supports(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }

    /// Check key uniqueness and every parameter's range invariant
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for p in &self.parameters {
            if !seen.insert(p.key.as_str()) {
                return Err(Error::InvalidParameter(format!(
                    "{}: duplicate parameter '{}'",
                    self.name, p.key
                )));
            }
            p.validate()?;
        }
        Ok(())
    }

    /// A parameter map holding every declared default
    pub fn default_params(&self) -> Params {
        self.parameters
            .iter()
            .map(|p| (p.key.clone(), p.default_or_min()))
            .collect()
    }

    /// `params` with declared defaults filled in for any missing key
    pub fn with_defaults(&self, params: &Params) -> Params {
        let mut full = self.default_params();
        full.extend_from(params);
        full
    }
}

/// Assign uniformly random in-range values to every unlocked parameter
///
/// A parameter is skipped when its key is in `locked` or its descriptor is
/// marked locked. Values outside the descriptor are left untouched.
pub fn randomize<R: Rng + ?Sized>(
    descriptor: &FieldDescriptor,
    params: &mut Params,
    locked: &HashSet<String>,
    rng: &mut R,
) {
    for p in &descriptor.parameters {
        if p.locked || locked.contains(&p.key) {
            continue;
        }
        let value = rng.r#gen::<f64>() * (p.max - p.min) + p.min;
        params.set(p.key.clone(), value);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn descriptor() -> FieldDescriptor {
        FieldDescriptor::new("Test", "test field")
            .with_parameter(ParameterDescriptor::new("a", "A", 0.0, 2.0, 0.1).with_default(1.0))
            .with_parameter(ParameterDescriptor::new("b", "B", -1.0, 1.0, 0.1))
    }

    #[test]
    fn test_bindings_prefer_injected_coordinates() {
        let params = Params::from([("phi", 1.0), ("a", 2.0)]);
        let b = Bindings::new(&params);
        assert_eq!(b.get("phi"), Some(1.0));

        let b = b.angular(3.0, 0.5);
        assert_eq!(b.get("phi"), Some(3.0));
        assert_eq!(b.get("theta"), Some(0.5));
        assert_eq!(b.get("a"), Some(2.0));
        assert_eq!(b.get("missing"), None);
        assert_eq!(b.value("missing"), 0.0);
        // The caller's map is untouched
        assert_eq!(params.get("phi"), Some(1.0));
        assert!(!params.contains("theta"));
    }

    #[test]
    fn test_with_defaults_keeps_caller_values() {
        let d = descriptor();
        let full = d.with_defaults(&Params::new().with("b", 0.5));
        assert_eq!(full.get("a"), Some(1.0));
        assert_eq!(full.get("b"), Some(0.5));
    }

    #[test]
    fn test_validate_rejects_default_outside_range() {
        let p = ParameterDescriptor::new("t", "T", -1.5, 1.5, 0.1).with_default(2.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let d = descriptor().with_parameter(ParameterDescriptor::new("a", "A again", 0.0, 1.0, 0.1));
        assert!(d.validate().is_err());
        assert!(descriptor().validate().is_ok());
    }

    #[test]
    fn test_randomize_respects_locks_and_ranges() {
        let d = descriptor();
        let mut params = Params::from([("a", 1.25), ("b", 0.0)]);
        let locked: HashSet<String> = ["a".to_string()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            randomize(&d, &mut params, &locked, &mut rng);
            assert_eq!(params.get("a"), Some(1.25));
            let b = params.get("b").unwrap();
            assert!((-1.0..=1.0).contains(&b));
        }
    }

    #[test]
    fn test_params_serialize_as_plain_map() {
        let params = Params::from([("m", 6.0)]);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"m":6.0}"#);
    }
}
