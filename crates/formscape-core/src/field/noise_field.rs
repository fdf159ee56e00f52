//! Terrain-style fields driven by the seeded noise samplers

use super::Topology;
use crate::noise::{
    FractalParams, NoiseSampler, PerlinNoise, SamplerCache, SimplexNoise, WorleyNoise, seed_from,
};
use crate::params::{Bindings, Dimension, FieldDescriptor, ParameterDescriptor};
use glam::DVec3;

/// Vertices per side of the height-field grid
const HEIGHT_FIELD_GRID: u32 = 50;

/// Sampler backing a noise field, with its own per-seed cache
#[derive(Debug)]
pub enum NoiseSource {
    /// Ridged Perlin
    Perlin(SamplerCache<PerlinNoise>),
    /// Worley, doubled
    Worley(SamplerCache<WorleyNoise>),
    /// Simplex scaled by `height`
    Simplex(SamplerCache<SimplexNoise>),
}

#[derive(Debug)]
pub struct NoiseField {
    descriptor: FieldDescriptor,
    source: NoiseSource,
}

fn fractal_parameters(
    descriptor: FieldDescriptor,
    scale: (f64, f64, f64),
    max_octaves: f64,
    max_lacunarity: f64,
    lacunarity_step: f64,
    max_seed: f64,
) -> FieldDescriptor {
    let (scale_min, scale_max, scale_default) = scale;
    descriptor
        .with_parameter(
            ParameterDescriptor::new("scale", "Scale", scale_min, scale_max, scale_min)
                .with_description("Feature size")
                .with_default(scale_default),
        )
        .with_parameter(
            ParameterDescriptor::new("octaves", "Octaves", 1.0, max_octaves, 1.0)
                .with_description("Number of noise layers")
                .with_default(4.0_f64.min(max_octaves)),
        )
        .with_parameter(
            ParameterDescriptor::new("persistence", "Persistence", 0.1, 1.0, 0.1)
                .with_description("Amplitude decay per layer")
                .with_default(0.5),
        )
        .with_parameter(
            ParameterDescriptor::new("lacunarity", "Lacunarity", 1.0, max_lacunarity, lacunarity_step)
                .with_description("Frequency gain per layer")
                .with_default(2.0),
        )
        .with_parameter(
            ParameterDescriptor::new("seed", "Seed", 0.0, max_seed, 1.0)
                .with_description("Random variation")
                .with_default(42.0),
        )
}

impl NoiseField {
    /// Ridged Perlin terrain
    pub fn terrain() -> Self {
        let descriptor = fractal_parameters(
            FieldDescriptor::new("Perlin Noise Terrain", "Generate terrain using perlin noise"),
            (1.0, 100.0, 20.0),
            10.0,
            10.0,
            1.0,
            1000.0,
        )
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            descriptor,
            source: NoiseSource::Perlin(SamplerCache::default()),
        }
    }

    /// Worley cellular pattern
    pub fn cellular() -> Self {
        let descriptor = fractal_parameters(
            FieldDescriptor::new("Cellular Pattern", "Worley noise cellular structure"),
            (0.1, 10.0, 5.0),
            8.0,
            3.0,
            0.1,
            9999.0,
        )
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            descriptor,
            source: NoiseSource::Worley(SamplerCache::default()),
        }
    }

    /// Rolling Simplex terrain
    pub fn simplex_terrain() -> Self {
        let descriptor = fractal_parameters(
            FieldDescriptor::new("Simplex Terrain", "Smooth rolling terrain using simplex noise"),
            (1.0, 100.0, 20.0),
            8.0,
            4.0,
            0.1,
            1000.0,
        )
        .with_parameter(
            ParameterDescriptor::new("height", "Height", 0.5, 20.0, 0.5)
                .with_description("Peak height")
                .with_default(8.0),
        )
        .with_dimensions(&[Dimension::Two, Dimension::Three]);

        Self {
            descriptor,
            source: NoiseSource::Simplex(SamplerCache::default()),
        }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn source(&self) -> &NoiseSource {
        &self.source
    }

    pub fn topology(&self) -> Topology {
        Topology::HeightField {
            grid: HEIGHT_FIELD_GRID,
        }
    }

    /// Noise value at the bound `x`, `y`, `z`
    pub(crate) fn evaluate(&self, b: &Bindings<'_>) -> f64 {
        let p = DVec3::new(b.value("x"), b.value("y"), b.value("z")) / b.value("scale");
        let fractal = FractalParams::new(
            FractalParams::octaves_from(b.value("octaves")),
            b.value("persistence"),
            b.value("lacunarity"),
        );
        let seed = seed_from(b.value("seed"));

        match &self.source {
            NoiseSource::Perlin(cache) => cache.get(seed).calculate(p, &fractal),
            NoiseSource::Worley(cache) => cache.get(seed).calculate(p, &fractal) * 2.0,
            NoiseSource::Simplex(cache) => {
                cache.get(seed).calculate(p, &fractal) * b.value("height")
            }
        }
    }

    /// Profile along x through the origin
    pub(crate) fn evaluate_2d(&self, x: f64, b: &Bindings<'_>) -> f64 {
        self.evaluate(&b.spatial(x, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;

    fn sample(field: &NoiseField, params: &Params, x: f64, z: f64) -> f64 {
        let full = field.descriptor().with_defaults(params);
        field.evaluate(&Bindings::new(&full).spatial(x, 0.0, z))
    }

    #[test]
    fn test_terrain_is_deterministic() {
        let a = NoiseField::terrain();
        let b = NoiseField::terrain();
        let params = Params::from([("seed", 7.0)]);
        for i in 0..10 {
            let x = f64::from(i) * 3.3 - 10.0;
            assert_eq!(sample(&a, &params, x, 1.5), sample(&b, &params, x, 1.5));
        }
    }

    #[test]
    fn test_cellular_in_doubled_range() {
        let field = NoiseField::cellular();
        for i in -10..10 {
            let v = sample(&field, &Params::new(), f64::from(i) * 1.7, f64::from(i));
            assert!((0.0..=2.0).contains(&v));
        }
    }

    #[test]
    fn test_simplex_scaled_by_height() {
        let field = NoiseField::simplex_terrain();
        let params = Params::from([("height", 4.0)]);
        for i in 0..10 {
            let v = sample(&field, &params, f64::from(i) * 2.1, 0.0);
            assert!((0.0..=4.0).contains(&v));
        }
    }

    #[test]
    fn test_seed_change_builds_new_table() {
        let field = NoiseField::terrain();
        sample(&field, &Params::from([("seed", 1.0)]), 0.5, 0.5);
        sample(&field, &Params::from([("seed", 1.0)]), 1.5, 0.5);
        sample(&field, &Params::from([("seed", 2.0)]), 0.5, 0.5);
        let NoiseSource::Perlin(cache) = field.source() else {
            unreachable!("terrain is Perlin");
        };
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_descriptors_are_valid() {
        for field in [
            NoiseField::terrain(),
            NoiseField::cellular(),
            NoiseField::simplex_terrain(),
        ] {
            assert!(field.descriptor().validate().is_ok());
        }
    }
}
