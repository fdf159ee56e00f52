//! Gradient noise with random unit-sphere gradients

use super::{FractalParams, Lcg, NoiseSampler};
use glam::DVec3;

/// 3D Perlin noise
///
/// Gradients are uniform on the unit sphere rather than the classic twelve
/// edge vectors. [`NoiseSampler::calculate`] applies a ridged remap, which
/// gives the sharp crests used by terrain fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PerlinNoise {
    gradients: Vec<DVec3>,
    permutation: Vec<usize>,
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// `(2|v - 0.5|)^2`
pub fn ridged(value: f64) -> f64 {
    let v = 2.0 * (value - 0.5).abs();
    v * v
}

impl PerlinNoise {
    fn grad(&self, hash: usize, p: DVec3) -> f64 {
        self.gradients[hash & 255].dot(p)
    }
}

impl NoiseSampler for PerlinNoise {
    fn from_seed(seed: u32) -> Self {
        let mut rng = Lcg::new(seed);

        let gradients = (0..256)
            .map(|_| {
                let theta = (2.0 * rng.next_f64() - 1.0).acos();
                let phi = 2.0 * std::f64::consts::PI * rng.next_f64();
                DVec3::new(
                    theta.sin() * phi.cos(),
                    theta.sin() * phi.sin(),
                    theta.cos(),
                )
            })
            .collect();

        let mut table: Vec<usize> = (0..256).collect();
        for i in (1..256).rev() {
            let j = (rng.next_f64() * (i + 1) as f64).floor() as usize;
            table.swap(i, j);
        }
        let permutation = table.iter().chain(table.iter()).copied().collect();

        Self {
            gradients,
            permutation,
        }
    }

    fn noise3d(&self, p: DVec3) -> f64 {
        let cell = p.floor();
        let xi = (cell.x as i64 & 255) as usize;
        let yi = (cell.y as i64 & 255) as usize;
        let zi = (cell.z as i64 & 255) as usize;
        let f = p - cell;

        let u = fade(f.x);
        let v = fade(f.y);
        let w = fade(f.z);

        let perm = &self.permutation;
        let a = perm[xi] + yi;
        let aa = perm[a] + zi;
        let ab = perm[a + 1] + zi;
        let b = perm[xi + 1] + yi;
        let ba = perm[b] + zi;
        let bb = perm[b + 1] + zi;

        let corner = |hash: usize, dx: f64, dy: f64, dz: f64| {
            self.grad(perm[hash], f - DVec3::new(dx, dy, dz))
        };

        lerp(
            w,
            lerp(
                v,
                lerp(u, corner(aa, 0.0, 0.0, 0.0), corner(ba, 1.0, 0.0, 0.0)),
                lerp(u, corner(ab, 0.0, 1.0, 0.0), corner(bb, 1.0, 1.0, 0.0)),
            ),
            lerp(
                v,
                lerp(u, corner(aa + 1, 0.0, 0.0, 1.0), corner(ba + 1, 1.0, 0.0, 1.0)),
                lerp(u, corner(ab + 1, 0.0, 1.0, 1.0), corner(bb + 1, 1.0, 1.0, 1.0)),
            ),
        )
    }

    fn calculate(&self, p: DVec3, fractal: &FractalParams) -> f64 {
        ridged(fractal.sum(p, |q| self.noise3d(q)))
    }
}
