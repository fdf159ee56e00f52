//! Scalar fields: the formulas meshes and plots are sampled from
//!
//! A [`ScalarField`] is one of three kinds:
//!
//! - [`ClosedForm`]: a built-in formula implemented natively
//! - [`NoiseField`]: fractal noise over space
//! - [`UserExpression`]: a formula string compiled at intake
//!
//! Every field carries its [`FieldDescriptor`]; parameters missing from a
//! caller's map take the descriptor's default.

mod closed_form;
mod expression;
mod noise_field;

pub use closed_form::{ClosedForm, ClosedFormKind};
pub use expression::UserExpression;
pub use noise_field::{NoiseField, NoiseSource};

use crate::params::{Bindings, Dimension, FieldDescriptor, Params};
use crate::{Error, Result};
use glam::DVec3;

/// How a field is turned into a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Topology {
    /// Radius over θ ∈ [0, π] (rings) and φ ∈ [0, 2π] (segments)
    Spherical { segments: u32, rings: u32 },
    /// The field places each lattice node itself
    Surface { segments: u32, rings: u32 },
    /// Zero level set of a volume sampled over `[-half_extent, half_extent]^3`
    Implicit {
        half_extent: f64,
        /// Parameter holding the grid resolution
        resolution_key: &'static str,
        default_resolution: u32,
    },
    /// Height `y = f(x, 0, z)` over a square grid centred on the origin
    HeightField { grid: u32 },
}

/// How a field is sampled into a 2D polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotStrategy {
    /// `y = f(x)` over x ∈ [-5, 5]
    Cartesian,
    /// `(r cos θ, r sin θ)` over θ ∈ [0, 2π]
    Polar,
}

#[derive(Debug)]
pub enum ScalarField {
    ClosedForm(ClosedForm),
    Noise(NoiseField),
    Expression(UserExpression),
}

fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::evaluation(format!("result is not finite ({value})")))
    }
}

impl ScalarField {
    pub fn descriptor(&self) -> &FieldDescriptor {
        match self {
            Self::ClosedForm(f) => f.descriptor(),
            Self::Noise(f) => f.descriptor(),
            Self::Expression(f) => f.descriptor(),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.descriptor().name
    }

    pub fn topology(&self) -> Topology {
        match self {
            Self::ClosedForm(f) => f.topology(),
            Self::Noise(f) => f.topology(),
            Self::Expression(f) => f.topology(),
        }
    }

    /// `None` for fields without a 2D projection
    pub fn plot_strategy(&self) -> Option<PlotStrategy> {
        match self {
            Self::ClosedForm(f) => f.plot_strategy(),
            Self::Noise(_) => Some(PlotStrategy::Cartesian),
            Self::Expression(f) => Some(f.plot_strategy()),
        }
    }

    pub fn supports(&self, dimension: Dimension) -> bool {
        self.descriptor().supports(dimension)
    }

    /// `params` completed with descriptor defaults
    pub fn resolve_params(&self, params: &Params) -> Params {
        self.descriptor().with_defaults(params)
    }

    /// Main value of the field
    ///
    /// Reserved coordinates are read from `params` when present.
    pub fn evaluate(&self, params: &Params) -> Result<f64> {
        let full = self.resolve_params(params);
        finite(self.sample(&Bindings::new(&full))?)
    }

    /// Cartesian projection at `x`
    pub fn evaluate_2d(&self, x: f64, params: &Params) -> Result<f64> {
        let full = self.resolve_params(params);
        finite(self.sample_2d(x, &Bindings::new(&full))?)
    }

    /// Implicit value at a point; only volumetric fields have one
    pub fn sample_implicit(&self, x: f64, y: f64, z: f64, params: &Params) -> Result<f64> {
        let full = self.resolve_params(params);
        finite(self.sample_implicit_at(DVec3::new(x, y, z), &Bindings::new(&full))?)
    }

    /// Unchecked main value; non-finite results pass through
    pub(crate) fn sample(&self, b: &Bindings<'_>) -> Result<f64> {
        match self {
            Self::ClosedForm(f) => Ok(f.evaluate(b)),
            Self::Noise(f) => Ok(f.evaluate(b)),
            Self::Expression(f) => f.evaluate(b),
        }
    }

    pub(crate) fn sample_2d(&self, x: f64, b: &Bindings<'_>) -> Result<f64> {
        let unsupported = || Error::UnsupportedDimension {
            name: self.name().to_string(),
            dimension: Dimension::Two.to_string(),
        };
        if !self.supports(Dimension::Two) {
            return Err(unsupported());
        }
        match self {
            Self::ClosedForm(f) => f.evaluate_2d(x, b).ok_or_else(unsupported),
            Self::Noise(f) => Ok(f.evaluate_2d(x, b)),
            Self::Expression(f) => f.evaluate_2d(x, b),
        }
    }

    pub(crate) fn sample_implicit_at(&self, p: DVec3, b: &Bindings<'_>) -> Result<f64> {
        let value = match self {
            Self::ClosedForm(f) => f.implicit(p, b),
            _ => None,
        };
        value.ok_or_else(|| {
            Error::MeshGeneration(format!("'{}' is not an implicit field", self.name()))
        })
    }

    /// Node of a self-parameterized surface; `u`, `v` in [0, 1]
    pub(crate) fn surface_node(&self, u: f64, v: f64, b: &Bindings<'_>) -> Result<(DVec3, DVec3)> {
        let node = match self {
            Self::ClosedForm(f) => f.surface_node(u, v, b),
            _ => None,
        };
        node.ok_or_else(|| {
            Error::MeshGeneration(format!("'{}' has no parametric surface", self.name()))
        })
    }
}

impl From<ClosedForm> for ScalarField {
    fn from(field: ClosedForm) -> Self {
        Self::ClosedForm(field)
    }
}

impl From<NoiseField> for ScalarField {
    fn from(field: NoiseField) -> Self {
        Self::Noise(field)
    }
}

impl From<UserExpression> for ScalarField {
    fn from(field: UserExpression) -> Self {
        Self::Expression(field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_superformula_reference_value() {
        let field = ScalarField::from(ClosedForm::superformula());
        let params = Params::from([
            ("a", 1.0),
            ("b", 1.0),
            ("m", 6.0),
            ("n1", 1.0),
            ("n2", 1.0),
            ("n3", 1.0),
            ("phi", 0.0),
        ]);
        assert_eq!(field.evaluate(&params).unwrap(), 1.0);
    }

    #[test]
    fn test_gyroid_has_no_2d_projection() {
        let field = ScalarField::from(ClosedForm::gyroid());
        let err = field.evaluate_2d(0.0, &Params::new()).err();
        assert!(matches!(err, Some(Error::UnsupportedDimension { .. })));
        assert_eq!(field.plot_strategy(), None);
    }

    #[test]
    fn test_sample_implicit() {
        let gyroid = ScalarField::from(ClosedForm::gyroid());
        let v = gyroid.sample_implicit(0.0, 0.0, 0.0, &Params::from([("threshold", 1.0)]));
        assert_eq!(v.unwrap(), -1.0);

        let mobius = ScalarField::from(ClosedForm::mobius());
        assert!(mobius.sample_implicit(0.0, 0.0, 0.0, &Params::new()).is_err());
    }

    #[test]
    fn test_non_finite_is_evaluation_error() {
        let field = UserExpression::new("Inverse", "", "=1/a", None).map(ScalarField::from).unwrap();
        // a defaults to 0
        assert!(matches!(field.evaluate(&Params::new()), Err(Error::Evaluation(_))));
        assert_eq!(field.evaluate(&Params::from([("a", 4.0)])).unwrap(), 0.25);
    }

    #[test]
    fn test_caller_params_untouched() {
        let field = ScalarField::from(ClosedForm::sine_interference());
        let params = Params::from([("frequency1", 4.0)]);
        let before = params.clone();
        let _ = field.evaluate(&params);
        assert_eq!(params, before);
    }
}
