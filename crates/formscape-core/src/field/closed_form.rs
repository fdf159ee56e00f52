//! Built-in formulas with native implementations

use super::{PlotStrategy, Topology};
use crate::params::{Bindings, Dimension, FieldDescriptor, ParameterDescriptor};
use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Angular steps searched when projecting the superformula onto x
const SUPERFORMULA_SEARCH_STEPS: u32 = 1000;

/// Tube radius of the wrapped sine wave
const TUBE_RADIUS: f64 = 0.1;

/// Half-extent of the gyroid sampling volume
const GYROID_HALF_EXTENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedFormKind {
    /// Gielis superformula, radial in φ
    Superformula,
    /// Two sine waves interfering over φ and θ
    SineInterference,
    /// Sine wave; a tube wrapped around the unit circle in 3D
    CartesianSine,
    /// Triply periodic minimal surface
    Gyroid,
    /// Twisted strip
    Mobius,
}

/// A formula implemented natively
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedForm {
    kind: ClosedFormKind,
    descriptor: FieldDescriptor,
}

fn param(key: &str, name: &str, description: &str, min: f64, max: f64, step: f64, default: f64) -> ParameterDescriptor {
    ParameterDescriptor::new(key, name, min, max, step)
        .with_description(description)
        .with_default(default)
}

impl ClosedForm {
    pub fn superformula() -> Self {
        let descriptor = FieldDescriptor::new(
            "Gielis Formula",
            "Generates shapes based on superformula discovered by Johan Gielis",
        )
        .with_parameter(param("a", "A", "Parameter a for the formula", 0.1, 5.0, 0.1, 1.0))
        .with_parameter(param("b", "B", "Parameter b for the formula", 0.1, 5.0, 0.1, 1.0))
        .with_parameter(param("m", "M", "Number of symmetries", 1.0, 20.0, 1.0, 6.0))
        .with_parameter(param("n1", "N1", "First exponent", 0.1, 20.0, 0.1, 1.0))
        .with_parameter(param("n2", "N2", "Second exponent", 0.1, 20.0, 0.1, 1.0))
        .with_parameter(param("n3", "N3", "Third exponent", 0.1, 20.0, 0.1, 1.0))
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            kind: ClosedFormKind::Superformula,
            descriptor,
        }
    }

    pub fn sine_interference() -> Self {
        let descriptor = FieldDescriptor::new(
            "Sine Interference",
            "Creates interference patterns using sine waves",
        )
        .with_parameter(param("frequency1", "Frequency 1", "Frequency of first wave", 0.1, 10.0, 0.1, 2.0))
        .with_parameter(param("frequency2", "Frequency 2", "Frequency of second wave", 0.1, 10.0, 0.1, 3.0))
        .with_parameter(param("amplitude1", "Amplitude 1", "Amplitude of first wave", 0.1, 2.0, 0.1, 0.5))
        .with_parameter(param("amplitude2", "Amplitude 2", "Amplitude of second wave", 0.1, 2.0, 0.1, 0.5))
        .with_parameter(param("phase", "Phase", "Phase difference", 0.0, TAU, 0.1, 0.0))
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            kind: ClosedFormKind::SineInterference,
            descriptor,
        }
    }

    pub fn cartesian_sine() -> Self {
        let descriptor = FieldDescriptor::new(
            "Cartesian Sine",
            "A formula optimized for 2D Cartesian plotting with sine waves",
        )
        .with_parameter(param("amplitude", "Amplitude", "Wave height", 0.1, 5.0, 0.1, 1.0))
        .with_parameter(param("frequency", "Frequency", "Wave frequency", 0.1, 10.0, 0.1, 1.0))
        .with_parameter(param("phase", "Phase", "Phase shift", -PI, PI, 0.1, 0.0))
        .with_parameter(param("vertical", "Vertical Shift", "Vertical position adjustment", -5.0, 5.0, 0.1, 0.0))
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            kind: ClosedFormKind::CartesianSine,
            descriptor,
        }
    }

    pub fn gyroid() -> Self {
        let descriptor = FieldDescriptor::new("Gyroid", "Triply periodic minimal surface")
            .with_parameter(param("scale", "Scale", "Structure density", 0.1, 5.0, 0.1, 0.2))
            .with_parameter(param("threshold", "Threshold", "Surface boundary", -1.5, 1.5, 0.1, 0.0))
            .with_parameter(param("resolution", "Resolution", "Grid resolution", 10.0, 100.0, 1.0, 30.0))
            .with_dimensions(&[Dimension::Three]);

        Self {
            kind: ClosedFormKind::Gyroid,
            descriptor,
        }
    }

    /// Strip swept around the y axis
    ///
    /// Lattice segments run along the strip and rings across it, so `u`
    /// follows the loop and `v` the width. Faces wind from the across
    /// direction to the along direction: at angle 0 the strip lies in the
    /// xz plane and its faces point toward -y.
    pub fn mobius() -> Self {
        let descriptor = FieldDescriptor::new(
            "Mobius Strip",
            "Creates a Mobius strip with parametric adjustments",
        )
        .with_parameter(param("radius", "Radius", "Radius of the Mobius strip", 0.5, 5.0, 0.1, 2.0))
        .with_parameter(param("width", "Width", "Width of the Mobius strip", 0.1, 2.0, 0.1, 1.0))
        .with_parameter(param("twist", "Twist", "Number of half-twists", 1.0, 10.0, 1.0, 1.0))
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            kind: ClosedFormKind::Mobius,
            descriptor,
        }
    }

    pub fn kind(&self) -> ClosedFormKind {
        self.kind
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn topology(&self) -> Topology {
        match self.kind {
            ClosedFormKind::Superformula => Topology::Spherical {
                segments: 180,
                rings: 180,
            },
            ClosedFormKind::SineInterference => Topology::Spherical {
                segments: 128,
                rings: 128,
            },
            ClosedFormKind::CartesianSine => Topology::Surface {
                segments: 128,
                rings: 64,
            },
            ClosedFormKind::Mobius => Topology::Surface {
                segments: 100,
                rings: 20,
            },
            ClosedFormKind::Gyroid => Topology::Implicit {
                half_extent: GYROID_HALF_EXTENT,
                resolution_key: "resolution",
                default_resolution: 30,
            },
        }
    }

    pub fn plot_strategy(&self) -> Option<PlotStrategy> {
        match self.kind {
            ClosedFormKind::Superformula => Some(PlotStrategy::Polar),
            ClosedFormKind::Gyroid => None,
            _ => Some(PlotStrategy::Cartesian),
        }
    }

    /// Main value at the bound coordinates
    pub(crate) fn evaluate(&self, b: &Bindings<'_>) -> f64 {
        match self.kind {
            ClosedFormKind::Superformula => superformula(b, b.value("phi")),
            ClosedFormKind::SineInterference => {
                let phi = b.value("phi");
                let theta = b.get("theta").unwrap_or(FRAC_PI_2);
                let wave1 = b.value("amplitude1") * (b.value("frequency1") * phi).sin();
                let wave2 = b.value("amplitude2") * (b.value("frequency2") * phi + b.value("phase")).sin();
                1.0 + wave1 * theta.sin() + wave2 * theta.cos()
            }
            ClosedFormKind::CartesianSine => {
                let phi = b.value("phi");
                1.0 + b.value("amplitude") * (b.value("frequency") * phi + b.value("phase")).sin()
            }
            ClosedFormKind::Gyroid => {
                gyroid(b, DVec3::new(b.value("x"), b.value("y"), b.value("z")))
            }
            ClosedFormKind::Mobius => b.value("radius") * b.value("width"),
        }
    }

    /// Cartesian projection at `x`; `None` for 3D-only forms
    pub(crate) fn evaluate_2d(&self, x: f64, b: &Bindings<'_>) -> Option<f64> {
        match self.kind {
            ClosedFormKind::Superformula => Some(superformula_project(b, x)),
            ClosedFormKind::SineInterference => {
                let wave1 = b.value("amplitude1") * (b.value("frequency1") * x).sin();
                let wave2 = b.value("amplitude2") * (b.value("frequency2") * x + b.value("phase")).sin();
                Some(wave1 + wave2)
            }
            ClosedFormKind::CartesianSine => Some(
                b.value("amplitude") * (b.value("frequency") * x + b.value("phase")).sin()
                    + b.value("vertical"),
            ),
            ClosedFormKind::Mobius => {
                let angle = (x + 5.0) * PI / 5.0;
                Some(b.value("width") * (b.value("twist") * angle / 2.0).sin())
            }
            ClosedFormKind::Gyroid => None,
        }
    }

    /// Implicit value at `p`; `None` unless the form is volumetric
    pub(crate) fn implicit(&self, p: DVec3, b: &Bindings<'_>) -> Option<f64> {
        match self.kind {
            ClosedFormKind::Gyroid => Some(gyroid(b, p)),
            _ => None,
        }
    }

    /// Position and normal of a lattice node for the self-parameterized
    /// surfaces; `u` runs along segments and `v` along rings, both in [0, 1]
    pub(crate) fn surface_node(&self, u: f64, v: f64, b: &Bindings<'_>) -> Option<(DVec3, DVec3)> {
        match self.kind {
            ClosedFormKind::CartesianSine => Some(wave_tube(b, u * TAU, v * TAU)),
            ClosedFormKind::Mobius => Some(mobius_strip(b, u, v)),
            _ => None,
        }
    }
}

fn superformula(b: &Bindings<'_>, phi: f64) -> f64 {
    let m = b.value("m");
    let part1 = ((m * phi / 4.0).cos() / b.value("a")).abs().powf(b.value("n2"));
    let part2 = ((m * phi / 4.0).sin() / b.value("b")).abs().powf(b.value("n3"));
    (part1 + part2).powf(-1.0 / b.value("n1"))
}

/// y of the curve point whose x lies nearest the query
fn superformula_project(b: &Bindings<'_>, x: f64) -> f64 {
    let mut nearest = f64::INFINITY;
    let mut y = 0.0;
    for i in 0..SUPERFORMULA_SEARCH_STEPS {
        let angle = f64::from(i) / f64::from(SUPERFORMULA_SEARCH_STEPS) * TAU;
        let r = superformula(b, angle);
        let distance = (x - r * angle.cos()).abs();
        if distance < nearest {
            nearest = distance;
            y = r * angle.sin();
        }
    }
    y
}

fn gyroid(b: &Bindings<'_>, p: DVec3) -> f64 {
    let s = p * b.value("scale");
    s.x.sin() * s.y.cos() + s.y.sin() * s.z.cos() + s.z.sin() * s.x.cos() - b.value("threshold")
}

/// Ring of the tube around the wave point at angle `phi`
fn wave_tube(b: &Bindings<'_>, phi: f64, theta: f64) -> (DVec3, DVec3) {
    let x = phi.cos();
    let z = phi.sin();
    let y = b.value("amplitude") * (b.value("frequency") * phi + b.value("phase")).sin();

    let (sin_t, cos_t) = theta.sin_cos();
    let nx = TUBE_RADIUS * cos_t * x - TUBE_RADIUS * sin_t * z;
    let nz = TUBE_RADIUS * sin_t * x + TUBE_RADIUS * cos_t * z;

    let position = DVec3::new(nx, y + TUBE_RADIUS * cos_t, nz);
    let normal = DVec3::new(nx - x, TUBE_RADIUS * cos_t, nz - z).normalize_or_zero();
    (position, normal)
}

/// Strip point at `along` in [0, 1] around the loop and `across` in [0, 1]
/// over the width; the strip lies in the xz plane
fn mobius_strip(b: &Bindings<'_>, along: f64, across: f64) -> (DVec3, DVec3) {
    let angle = along * TAU;
    let w = (across - 0.5) * b.value("width");
    let half_twist = b.value("twist") * angle / 2.0;
    let offset = b.value("radius") + w * half_twist.cos();

    let position = DVec3::new(offset * angle.cos(), w * half_twist.sin(), offset * angle.sin());
    let normal = DVec3::new(angle.cos(), 0.0, angle.sin());
    (position, normal)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::params::Params;
    use approx::assert_relative_eq;

    fn eval(form: &ClosedForm, params: &Params) -> f64 {
        let full = form.descriptor().with_defaults(params);
        form.evaluate(&Bindings::new(&full))
    }

    #[test]
    fn test_superformula_unit_circle() {
        let form = ClosedForm::superformula();
        let params = Params::from([
            ("a", 1.0),
            ("b", 1.0),
            ("m", 6.0),
            ("n1", 1.0),
            ("n2", 1.0),
            ("n3", 1.0),
            ("phi", 0.0),
        ]);
        assert_relative_eq!(eval(&form, &params), 1.0);
    }

    #[test]
    fn test_superformula_projection_finds_curve() {
        let form = ClosedForm::superformula();
        // m = 4 with unit exponents is a square-ish curve through (1, 0)
        let full = form.descriptor().with_defaults(&Params::from([("m", 4.0)]));
        let y = form.evaluate_2d(1.0, &Bindings::new(&full)).unwrap();
        assert!(y.abs() < 0.05, "y = {y}");
    }

    #[test]
    fn test_sine_interference_equator() {
        let form = ClosedForm::sine_interference();
        let phi = 0.3;
        let r = eval(&form, &Params::from([("phi", phi)]));
        // θ defaults to π/2 so only the first wave contributes
        assert_relative_eq!(r, 1.0 + 0.5 * (2.0 * phi).sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_cartesian_sine_projection() {
        let form = ClosedForm::cartesian_sine();
        let full = form
            .descriptor()
            .with_defaults(&Params::from([("amplitude", 2.0), ("vertical", 1.0)]));
        let y = form.evaluate_2d(FRAC_PI_2, &Bindings::new(&full));
        assert_relative_eq!(y.unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gyroid_origin_is_minus_threshold() {
        let form = ClosedForm::gyroid();
        let full = form.descriptor().with_defaults(&Params::from([("threshold", 0.5)]));
        let v = form.implicit(DVec3::ZERO, &Bindings::new(&full));
        assert_eq!(v, Some(-0.5));
        assert_eq!(form.evaluate_2d(0.0, &Bindings::new(&full)), None);
    }

    #[test]
    fn test_descriptors_are_valid() {
        for form in [
            ClosedForm::superformula(),
            ClosedForm::sine_interference(),
            ClosedForm::cartesian_sine(),
            ClosedForm::gyroid(),
            ClosedForm::mobius(),
        ] {
            assert!(form.descriptor().validate().is_ok(), "{}", form.descriptor().name);
        }
    }

    #[test]
    fn test_mobius_strip_closes_with_twist() {
        let form = ClosedForm::mobius();
        let full = form.descriptor().default_params();
        let b = Bindings::new(&full);
        // One half-twist: the start of one edge meets the end of the other
        let start = form.surface_node(0.0, 0.0, &b).unwrap().0;
        let end = form.surface_node(1.0, 1.0, &b).unwrap().0;
        assert!(start.distance(end) < 1e-9);
    }

    #[test]
    fn test_wave_tube_stays_near_wave() {
        let form = ClosedForm::cartesian_sine();
        let full = form.descriptor().default_params();
        let b = Bindings::new(&full);
        for i in 0..8 {
            let u = f64::from(i) / 8.0;
            let (p, n) = form.surface_node(u, 0.25, &b).unwrap();
            assert!(p.is_finite());
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-9);
        }
    }
}
