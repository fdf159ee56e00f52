//! Fields authored as formula strings

use super::{PlotStrategy, Topology};
use crate::expr::{self, Expression};
use crate::params::{Bindings, Dimension, FieldDescriptor, ParameterDescriptor, is_reserved};
use crate::{Error, Result};
use std::f64::consts::FRAC_PI_2;

/// Range given to parameters detected in a formula
const DETECTED_MIN: f64 = 0.0;
const DETECTED_MAX: f64 = 100.0;
const DETECTED_STEP: f64 = 0.1;

/// A radial field defined by a user formula
///
/// The main formula gives the radius at (`phi`, `theta`). The optional 2D
/// formula is evaluated with `x` bound; without one, the main formula is
/// plotted along the equator with `phi = x`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserExpression {
    descriptor: FieldDescriptor,
    formula: Expression,
    formula_2d: Option<Expression>,
}

impl UserExpression {
    /// Validate and compile the formulas, detecting their parameters
    ///
    /// Every variable other than the sampler coordinates becomes a
    /// parameter with default 0 over `[0, 100]`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        formula: &str,
        formula_2d: Option<&str>,
    ) -> Result<Self> {
        let valid = expr::validate(formula) && formula_2d.is_none_or(expr::validate);
        if !valid {
            return Err(Error::InvalidFormula("Invalid formula".into()));
        }

        let formula = Expression::parse(formula)?;
        let formula_2d = formula_2d.map(Expression::parse).transpose()?;

        let mut descriptor = FieldDescriptor::new(name, description)
            .with_dimensions(&[Dimension::Two, Dimension::Three]);
        let detected = formula
            .variables()
            .iter()
            .chain(formula_2d.iter().flat_map(Expression::variables));
        for var in detected {
            if is_reserved(var) || descriptor.parameter(var).is_some() {
                continue;
            }
            descriptor = descriptor.with_parameter(
                ParameterDescriptor::new(var.as_str(), var.as_str(), DETECTED_MIN, DETECTED_MAX, DETECTED_STEP)
                    .with_default(0.0),
            );
        }

        Ok(Self {
            descriptor,
            formula,
            formula_2d,
        })
    }

    /// Replace a detected parameter's descriptor, or add a new one
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Result<Self> {
        parameter.validate()?;
        match self
            .descriptor
            .parameters
            .iter_mut()
            .find(|p| p.key == parameter.key)
        {
            Some(existing) => *existing = parameter,
            None => self.descriptor.parameters.push(parameter),
        }
        Ok(self)
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn formula(&self) -> &Expression {
        &self.formula
    }

    pub fn formula_2d(&self) -> Option<&Expression> {
        self.formula_2d.as_ref()
    }

    pub fn topology(&self) -> Topology {
        Topology::Spherical {
            segments: 64,
            rings: 64,
        }
    }

    pub fn plot_strategy(&self) -> PlotStrategy {
        PlotStrategy::Cartesian
    }

    pub(crate) fn evaluate(&self, b: &Bindings<'_>) -> Result<f64> {
        self.formula.evaluate_raw(b)
    }

    pub(crate) fn evaluate_2d(&self, x: f64, b: &Bindings<'_>) -> Result<f64> {
        match &self.formula_2d {
            Some(formula) => formula.evaluate_raw(&b.with_x(x)),
            None => self.formula.evaluate_raw(&b.angular(x, FRAC_PI_2)),
        }
    }
}
