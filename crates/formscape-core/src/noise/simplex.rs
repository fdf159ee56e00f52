//! Simplex noise backed by the `noise` crate

use super::{FractalParams, NoiseSampler};
use glam::DVec3;
use noise::{NoiseFn, Simplex};

/// 3D Simplex noise; [`NoiseSampler::calculate`] returns values in `[0, 1]`
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    seed: u32,
    noise: Simplex,
}

impl SimplexNoise {
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoiseSampler for SimplexNoise {
    fn from_seed(seed: u32) -> Self {
        Self {
            seed,
            noise: Simplex::new(seed),
        }
    }

    fn noise3d(&self, p: DVec3) -> f64 {
        self.noise.get(p.to_array())
    }

    fn calculate(&self, p: DVec3, fractal: &FractalParams) -> f64 {
        // Normalize to 0..1
        ((fractal.sum(p, |q| self.noise3d(q)) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}
