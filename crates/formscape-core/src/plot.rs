//! 2D polylines sampled from a field's projection

use crate::field::{PlotStrategy, ScalarField};
use crate::params::{Bindings, Dimension, Params};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Sample count used when the caller has no preference
pub const DEFAULT_PLOT_RESOLUTION: u32 = 300;

/// Half-width of the Cartesian plot domain
pub const CARTESIAN_EXTENT: f64 = 5.0;

/// An ordered polyline as parallel coordinate vectors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline2D {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Polyline2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Sample `resolution + 1` points of a field's 2D projection
///
/// Polar fields sweep θ over `[0, 2π]` inclusive, closing the curve;
/// Cartesian fields sweep x over `[-5, 5]`. Non-finite samples are kept
/// as gaps in the line.
pub fn generate_polyline(field: &ScalarField, params: &Params, resolution: u32) -> Result<Polyline2D> {
    if resolution == 0 {
        return Err(Error::InvalidParameter(
            "plot resolution must be at least 1".to_string(),
        ));
    }
    let strategy = field
        .plot_strategy()
        .filter(|_| field.supports(Dimension::Two))
        .ok_or_else(|| Error::UnsupportedDimension {
            name: field.name().to_string(),
            dimension: Dimension::Two.to_string(),
        })?;

    let full = field.resolve_params(params);
    let bindings = Bindings::new(&full);
    let mut line = Polyline2D::with_capacity(resolution as usize + 1);

    for i in 0..=resolution {
        let t = f64::from(i) / f64::from(resolution);
        match strategy {
            PlotStrategy::Cartesian => {
                let x = -CARTESIAN_EXTENT + t * 2.0 * CARTESIAN_EXTENT;
                line.push(x, field.sample_2d(x, &bindings)?);
            }
            PlotStrategy::Polar => {
                let angle = t * TAU;
                let r = field.sample(&bindings.with_phi(angle))?;
                line.push(r * angle.cos(), r * angle.sin());
            }
        }
    }

    let gaps = line.points().filter(|(x, y)| !(x.is_finite() && y.is_finite())).count();
    if gaps > 0 {
        tracing::warn!(count = gaps, formula = field.name(), "non-finite plot samples");
    }
    tracing::debug!(points = line.len(), ?strategy, "sampled polyline");
    Ok(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::field::{ClosedForm, UserExpression};
    use approx::assert_relative_eq;

    #[test]
    fn test_cartesian_domain() {
        let field = UserExpression::new("Line", "", "=2*x", None).map(ScalarField::from).unwrap();
        let line = generate_polyline(&field, &Params::new(), 10).unwrap();
        assert_eq!(line.len(), 11);
        assert_relative_eq!(line.x[0], -5.0);
        assert_relative_eq!(line.x[10], 5.0);
        assert_relative_eq!(line.y[5], 0.0);
        assert_relative_eq!(line.y[10], 10.0);
    }

    #[test]
    fn test_polar_curve_closes() {
        let field = ScalarField::from(ClosedForm::superformula());
        let line = generate_polyline(&field, &Params::new(), 64).unwrap();
        assert_eq!(line.len(), 65);
        assert_relative_eq!(line.x[0], line.x[64], epsilon = 1e-9);
        assert_relative_eq!(line.y[0], line.y[64], epsilon = 1e-9);
    }

    #[test]
    fn test_zero_resolution() {
        let field = ScalarField::from(ClosedForm::superformula());
        assert!(matches!(
            generate_polyline(&field, &Params::new(), 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_volume_only_field() {
        let field = ScalarField::from(ClosedForm::gyroid());
        assert!(matches!(
            generate_polyline(&field, &Params::new(), 10),
            Err(Error::UnsupportedDimension { .. })
        ));
    }
}
