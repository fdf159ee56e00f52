//! Seeded noise samplers
//!
//! Each sampler is an immutable table built from a seed. Fields hold a
//! [`SamplerCache`] so repeated generations with the same seed reuse the
//! table instead of rebuilding it.

mod cache;
mod perlin;
mod simplex;
mod worley;

pub use cache::{DEFAULT_CAPACITY, SamplerCache};
pub use perlin::PerlinNoise;
pub use simplex::SimplexNoise;
pub use worley::WorleyNoise;

use glam::DVec3;

const LCG_MODULUS: u64 = 2_147_483_647;
const LCG_MULTIPLIER: u64 = 16_807;

/// Park-Miller minimal standard generator
///
/// Every sampler draws its tables from this so a seed reproduces the same
/// field everywhere.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// State starts at `seed mod 2147483647`
    ///
    /// A zero state would stay zero forever, so seeds that reduce to zero
    /// start at 1 instead.
    pub fn new(seed: u32) -> Self {
        let state = u64::from(seed) % LCG_MODULUS;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * LCG_MULTIPLIER % LCG_MODULUS;
        (self.state - 1) as f64 / (LCG_MODULUS - 1) as f64
    }
}

/// Octave-summing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParams {
    /// At least 1
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FractalParams {
    pub fn new(octaves: u32, persistence: f64, lacunarity: f64) -> Self {
        Self {
            octaves: octaves.max(1),
            persistence,
            lacunarity,
        }
    }

    /// Octave count from a continuous parameter: `ceil(max(v, 1))`
    pub fn octaves_from(value: f64) -> u32 {
        if value.is_nan() {
            return 1;
        }
        value.max(1.0).ceil().min(f64::from(u32::MAX)) as u32
    }

    /// Amplitude-normalized octave sum of `noise` at `p`
    pub fn sum(&self, p: DVec3, mut noise: impl FnMut(DVec3) -> f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves.max(1) {
            total += noise(p * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if max_value == 0.0 { 0.0 } else { total / max_value }
    }
}

/// Seed value from a continuous parameter
///
/// Rounded, then wrapped into `u32` range so negative seeds stay distinct.
pub fn seed_from(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().rem_euclid(4_294_967_296.0) as u32
}

/// A 3D noise table built deterministically from a seed
pub trait NoiseSampler: Send + Sync + Sized {
    /// Build the tables for `seed`
    fn from_seed(seed: u32) -> Self;

    /// Single-octave sample
    fn noise3d(&self, p: DVec3) -> f64;

    /// Fractal sample, shaped into the sampler's output range
    fn calculate(&self, p: DVec3, fractal: &FractalParams) -> f64 {
        fractal.sum(p, |q| self.noise3d(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_matches_park_miller() {
        // Seed 0 starts at state 1: 16807, then 16807^2 mod m
        let mut lcg = Lcg::new(0);
        let a = lcg.next_f64();
        let b = lcg.next_f64();
        assert_eq!(a, 16806.0 / 2_147_483_646.0);
        assert_eq!(b, (282_475_249.0 - 1.0) / 2_147_483_646.0);
    }

    #[test]
    fn test_lcg_seed_is_initial_state() {
        let mut lcg = Lcg::new(42);
        assert_eq!(lcg.next_f64(), (42.0 * 16807.0 - 1.0) / 2_147_483_646.0);

        // Seeds congruent to zero fall back to state 1
        let mut zero = Lcg::new(2_147_483_647);
        let mut one = Lcg::new(1);
        for _ in 0..4 {
            assert_eq!(zero.next_f64(), one.next_f64());
        }
        assert_eq!(Lcg::new(2_147_483_648).state, 1);
    }

    #[test]
    fn test_lcg_range() {
        let mut lcg = Lcg::new(u32::MAX);
        for _ in 0..10_000 {
            let v = lcg.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_octaves_from() {
        assert_eq!(FractalParams::octaves_from(0.0), 1);
        assert_eq!(FractalParams::octaves_from(1.0), 1);
        assert_eq!(FractalParams::octaves_from(3.2), 4);
        assert_eq!(FractalParams::octaves_from(f64::NAN), 1);
    }

    #[test]
    fn test_seed_from() {
        assert_eq!(seed_from(42.4), 42);
        assert_eq!(seed_from(-1.0), u32::MAX);
        assert_eq!(seed_from(f64::INFINITY), 0);
    }

    #[test]
    fn test_fractal_sum_is_normalized() {
        let fractal = FractalParams::new(5, 0.5, 2.0);
        let v = fractal.sum(DVec3::ZERO, |_| 0.75);
        assert!((v - 0.75).abs() < 1e-12);
    }
}
