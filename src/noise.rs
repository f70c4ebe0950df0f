//! Gradient noise used as a smooth force field.
//!
//! [`NoiseField`] is 3D simplex noise driven by a permutation table that is
//! shuffled once when the field is built. After construction the field is
//! read-only, so a single instance can be shared by everything that samples it.
//!
//! # Example
//!
//! ```
//! use skytrail::noise::NoiseField;
//! use glam::Vec3;
//!
//! let field = NoiseField::from_seed(7);
//! let n = field.noise3(0.3, 1.2, -4.0);
//! assert!((-1.0..=1.0).contains(&n));
//!
//! // Three decorrelated channels, e.g. for a velocity perturbation
//! let force = field.sample_vec3(Vec3::new(0.3, 1.2, -4.0));
//! ```

use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Offsets applied to the sample point for the second and third channels of
/// [`NoiseField::sample_vec3`]. Large enough that the channels are unrelated.
pub const CHANNEL_OFFSETS: [Vec3; 3] = [
    Vec3::ZERO,
    Vec3::new(100.0, 0.0, 0.0),
    Vec3::new(0.0, 100.0, 0.0),
];

const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

// Output scale that maps the kernel sum into roughly [-1, 1].
const SCALE: f32 = 32.0;

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// 3D simplex noise with a fixed, randomly shuffled permutation table.
#[derive(Clone)]
pub struct NoiseField {
    /// Permutation doubled to 512 entries so lookups never wrap.
    perm: [u8; 512],
    /// `perm[i] % 12`, cached.
    perm_mod12: [u8; 512],
}

impl NoiseField {
    /// Build a field whose permutation is drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut base: Vec<u8> = (0..=255u8).collect();
        base.shuffle(rng);

        let mut perm = [0u8; 512];
        let mut perm_mod12 = [0u8; 512];
        for i in 0..512 {
            perm[i] = base[i & 255];
            perm_mod12[i] = perm[i] % 12;
        }
        Self { perm, perm_mod12 }
    }

    /// Build a reproducible field from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(&mut StdRng::seed_from_u64(seed))
    }

    /// Build a field from OS entropy. Consistent for the lifetime of the
    /// instance, different between runs.
    pub fn from_entropy() -> Self {
        Self::new(&mut StdRng::from_entropy())
    }

    /// Sample the field at `(x, y, z)`. Output is approximately in `[-1, 1]`.
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        // Skew input space to find the containing simplex cell
        let s = (x + y + z) * F3;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let k = (z + s).floor();

        let t = (i + j + k) * G3;
        let x0 = x - (i - t);
        let y0 = y - (j - t);
        let z0 = z - (k - t);

        // Rank the offsets to pick which of the six tetrahedra we are in
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f32 + G3;
        let y1 = y0 - j1 as f32 + G3;
        let z1 = z0 - k1 as f32 + G3;
        let x2 = x0 - i2 as f32 + 2.0 * G3;
        let y2 = y0 - j2 as f32 + 2.0 * G3;
        let z2 = z0 - k2 as f32 + 2.0 * G3;
        let x3 = x0 - 1.0 + 3.0 * G3;
        let y3 = y0 - 1.0 + 3.0 * G3;
        let z3 = z0 - 1.0 + 3.0 * G3;

        let ii = (i as i32 & 255) as usize;
        let jj = (j as i32 & 255) as usize;
        let kk = (k as i32 & 255) as usize;

        let gi0 = self.gradient_index(ii, jj, kk);
        let gi1 = self.gradient_index(ii + i1, jj + j1, kk + k1);
        let gi2 = self.gradient_index(ii + i2, jj + j2, kk + k2);
        let gi3 = self.gradient_index(ii + 1, jj + 1, kk + 1);

        let n0 = corner(gi0, x0, y0, z0);
        let n1 = corner(gi1, x1, y1, z1);
        let n2 = corner(gi2, x2, y2, z2);
        let n3 = corner(gi3, x3, y3, z3);

        SCALE * (n0 + n1 + n2 + n3)
    }

    /// Sample the field at a point.
    #[inline]
    pub fn sample(&self, p: Vec3) -> f32 {
        self.noise3(p.x, p.y, p.z)
    }

    /// Sample three channels at `p` (shifted by [`CHANNEL_OFFSETS`]) and
    /// return them as a vector.
    pub fn sample_vec3(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.sample(p + CHANNEL_OFFSETS[0]),
            self.sample(p + CHANNEL_OFFSETS[1]),
            self.sample(p + CHANNEL_OFFSETS[2]),
        )
    }

    /// Fractal sum of `octaves` layers, each at double frequency and half
    /// amplitude. Normalized back into roughly `[-1, 1]`.
    pub fn fbm3(&self, p: Vec3, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut total = 0.0;
        let mut pos = p;
        for _ in 0..octaves {
            value += amplitude * self.sample(pos);
            total += amplitude;
            pos *= 2.0;
            amplitude *= 0.5;
        }
        if total > 0.0 {
            value / total
        } else {
            0.0
        }
    }

    #[inline]
    fn gradient_index(&self, i: usize, j: usize, k: usize) -> usize {
        let kj = self.perm[k] as usize;
        let jk = self.perm[j + kj] as usize;
        self.perm_mod12[i + jk] as usize
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("perm", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

#[inline]
fn corner(gi: usize, x: f32, y: f32, z: f32) -> f32 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let g = GRAD3[gi];
        let t2 = t * t;
        t2 * t2 * (g[0] * x + g[1] * y + g[2] * z)
    }
}
