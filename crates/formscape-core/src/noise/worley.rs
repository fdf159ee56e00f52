//! Cellular noise over a single unit cell of feature points

use super::{FractalParams, Lcg, NoiseSampler};
use glam::DVec3;

/// Number of feature points drawn per seed
pub const FEATURE_POINTS: usize = 32;

/// 3D Worley noise
///
/// All feature points live in `[0, 1)^3` and the query is folded into that
/// cell with a sign-preserving remainder; neighbouring cells are not
/// searched. The result is the gap between the nearest and second-nearest
/// feature distance, capped at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WorleyNoise {
    points: Vec<DVec3>,
}

impl WorleyNoise {
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }
}

impl NoiseSampler for WorleyNoise {
    fn from_seed(seed: u32) -> Self {
        let mut rng = Lcg::new(seed);
        let points = (0..FEATURE_POINTS)
            .map(|_| {
                let x = rng.next_f64();
                let y = rng.next_f64();
                let z = rng.next_f64();
                DVec3::new(x, y, z)
            })
            .collect();
        Self { points }
    }

    fn noise3d(&self, p: DVec3) -> f64 {
        let local = DVec3::new(p.x % 1.0, p.y % 1.0, p.z % 1.0);

        let mut nearest = f64::INFINITY;
        let mut second = f64::INFINITY;
        for point in &self.points {
            let dist = point.distance(local);
            if dist < nearest {
                second = nearest;
                nearest = dist;
            } else if dist < second {
                second = dist;
            }
        }

        (second - nearest).min(1.0)
    }

    fn calculate(&self, p: DVec3, fractal: &FractalParams) -> f64 {
        fractal.sum(p, |q| self.noise3d(q)).clamp(0.0, 1.0)
    }
}
