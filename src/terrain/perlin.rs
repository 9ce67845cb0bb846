//! 3D Perlin noise
//!
//! Gradient noise over a seeded permutation lattice, layered into fractal
//! Brownian motion. The island shape samples it on a plane of constant z,
//! so the z coordinate acts as a per-map offset into the noise volume.

use glam::DVec3;

/// Configuration for fractal Perlin noise
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlinConfig {
    /// Frequency of the first octave
    pub base_frequency: f64,
    /// Number of octaves summed
    pub octaves: usize,
    /// Amplitude decay per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for PerlinConfig {
    fn default() -> Self {
        Self {
            base_frequency: 1.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

// Ken Perlin's reference permutation. Seeds are mixed into the lattice
// coordinates before lookup, so the table itself never changes.
const PERM: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

#[inline]
fn perm(i: i64) -> i64 {
    PERM[(i & 255) as usize] as i64
}

/// Lattice hash with the seed folded into each axis
#[inline]
fn hash(x: i64, y: i64, z: i64, seed: u32) -> u8 {
    let mix = seed.wrapping_mul(1103515245).wrapping_add(12345) as i64;
    let a = perm(x ^ mix);
    let b = perm(a + (y ^ (mix >> 8)));
    perm(b + (z ^ (mix >> 16))) as u8
}

/// Dot product with one of the 12 cube-edge gradients
#[inline]
fn gradient(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = match h {
        0..=3 => y,
        12 | 14 => x,
        _ => z,
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}

/// 6t^5 - 15t^4 + 10t^3
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Single octave of Perlin noise, in [-1, 1]
pub fn perlin_3d(pos: DVec3, seed: u32) -> f64 {
    let cell = pos.floor();
    let (x0, y0, z0) = (cell.x as i64, cell.y as i64, cell.z as i64);
    let f = pos - cell;
    let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

    let corner = |dx: i64, dy: i64, dz: i64| {
        let h = hash(x0 + dx, y0 + dy, z0 + dz, seed);
        gradient(h, f.x - dx as f64, f.y - dy as f64, f.z - dz as f64)
    };

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);

    lerp(lerp(x00, x10, v), lerp(x01, x11, v), w).clamp(-1.0, 1.0)
}

/// Seeded fractal Perlin noise field
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlinNoise {
    pub seed: u32,
    pub config: PerlinConfig,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            config: PerlinConfig::default(),
        }
    }

    pub fn with_config(seed: u32, config: PerlinConfig) -> Self {
        Self { seed, config }
    }

    /// Sum of octaves, normalized to [-1, 1]
    pub fn sample(&self, position: DVec3) -> f64 {
        let (total, max_value) = self.octaves(position);
        if max_value > 0.0 {
            total / max_value
        } else {
            0.0
        }
    }

    /// Raw sum of octaves, bounded by the sum of octave amplitudes
    pub fn sample_sum(&self, position: DVec3) -> f64 {
        self.octaves(position).0
    }

    /// Octave sum and total amplitude
    ///
    /// Each octave uses its own seed so that octaves do not correlate at
    /// integer lattice points.
    fn octaves(&self, position: DVec3) -> (f64, f64) {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.base_frequency;
        let mut max_value = 0.0;

        for octave in 0..self.config.octaves {
            let seed = self.seed.wrapping_add(octave as u32);
            total += perlin_3d(position * frequency, seed) * amplitude;
            max_value += amplitude;
            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        (total, max_value)
    }
}
