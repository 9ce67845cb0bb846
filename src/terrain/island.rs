//! Island membership functions
//!
//! Decide, for a point of the map rectangle, whether it is land.

use glam::{DVec2, DVec3};
use rand::Rng;

use super::perlin::{PerlinConfig, PerlinNoise};

/// Trait for land/water classification of map positions
pub trait IslandShape {
    /// Returns true if the position is land
    fn is_land(&self, position: DVec2) -> bool;
}

impl<F: Fn(DVec2) -> bool> IslandShape for F {
    fn is_land(&self, position: DVec2) -> bool {
        self(position)
    }
}

/// Fraction of each side that is always water
pub const BORDER_MARGIN: f64 = 0.075;

/// Noise frequency in units of the map size
const NOISE_SCALE: f64 = 4.0;

/// Upper bound of the random z offset into the noise volume
const Z_RANGE: f64 = 256.0;

/// Perlin noise thresholded against a radial falloff
///
/// A point at normalized distance `r` from the map center is land when
/// `noise >= 0.3 r + (r - 0.5)`, so the center is almost always land and
/// the outer ring almost always water. `noise` is the raw octave sum, whose
/// amplitude reaches past 1 and gives the coastline its irregular shape.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlinIsland {
    width: f64,
    height: f64,
    z: f64,
    noise: PerlinNoise,
}

impl PerlinIsland {
    pub fn new(width: f64, height: f64, z: f64, seed: u32) -> Self {
        Self {
            width,
            height,
            z,
            noise: PerlinNoise::with_config(seed, PerlinConfig::default()),
        }
    }

    /// Shape with a random z offset drawn from `rng`
    pub fn from_rng<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> Self {
        let z = rng.gen_range(0.0..Z_RANGE);
        let seed = rng.gen();
        Self::new(width, height, z, seed)
    }

    /// Noise z coordinate of this island
    pub fn z(&self) -> f64 {
        self.z
    }
}

impl IslandShape for PerlinIsland {
    fn is_land(&self, position: DVec2) -> bool {
        let margin = DVec2::new(self.width, self.height) * BORDER_MARGIN;
        if position.x < margin.x
            || position.y < margin.y
            || position.x > self.width - margin.x
            || position.y > self.height - margin.y
        {
            return false;
        }

        let offset = position - DVec2::new(self.width, self.height) * 0.5;
        let sample = DVec3::new(
            offset.x / self.width * NOISE_SCALE,
            offset.y / self.height * NOISE_SCALE,
            self.z,
        );
        let noise = self.noise.sample_sum(sample);

        let radius = (offset / self.width.min(self.height)).length();
        noise >= 0.3 * radius + (radius - 0.5)
    }
}

/// Everything inside the margin is land
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareIsland {
    pub width: f64,
    pub height: f64,
}

impl IslandShape for SquareIsland {
    fn is_land(&self, position: DVec2) -> bool {
        let margin = DVec2::new(self.width, self.height) * BORDER_MARGIN;
        position.x >= margin.x
            && position.y >= margin.y
            && position.x <= self.width - margin.x
            && position.y <= self.height - margin.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_margin_is_water() {
        let island = PerlinIsland::new(100.0, 100.0, 3.5, 1);
        assert!(!island.is_land(DVec2::new(2.0, 50.0)));
        assert!(!island.is_land(DVec2::new(50.0, 98.0)));
        assert!(!island.is_land(DVec2::new(-10.0, -10.0)));
    }

    #[test]
    fn test_center_is_land() {
        // radius 0 needs noise >= -0.5, which the octave sum nearly always meets
        let mut land = 0;
        for seed in 0..20 {
            let island = PerlinIsland::new(200.0, 200.0, seed as f64 * 1.37, seed);
            if island.is_land(DVec2::new(100.0, 100.0)) {
                land += 1;
            }
        }
        assert!(land >= 12);
    }

    #[test]
    fn test_threshold_uses_octave_sum() {
        let island = PerlinIsland::new(100.0, 100.0, 7.25, 3);
        for i in 0..20 {
            for j in 0..20 {
                let p = DVec2::new(10.0 + i as f64 * 4.0, 10.0 + j as f64 * 4.0);
                let offset = p - DVec2::splat(50.0);
                let noise = island
                    .noise
                    .sample_sum(DVec3::new(offset.x / 100.0 * NOISE_SCALE, offset.y / 100.0 * NOISE_SCALE, 7.25));
                let r = (offset / 100.0).length();
                assert_eq!(island.is_land(p), noise >= 0.3 * r + (r - 0.5), "at {:?}", p);
            }
        }
    }

    #[test]
    fn test_far_from_center_is_water() {
        // Radius is measured in units of the short side: r = 1.65 needs noise >= 1.645
        for seed in 0..10 {
            let island = PerlinIsland::new(400.0, 100.0, 0.25 + seed as f64, seed);
            assert!(!island.is_land(DVec2::new(365.0, 50.0)));
            assert!(!island.is_land(DVec2::new(35.0, 50.0)));
        }
    }

    #[test]
    fn test_from_rng_deterministic() {
        let a = PerlinIsland::from_rng(50.0, 50.0, &mut ChaCha8Rng::seed_from_u64(5));
        let b = PerlinIsland::from_rng(50.0, 50.0, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
        assert!((0.0..Z_RANGE).contains(&a.z()));
    }

    #[test]
    fn test_closure_shape() {
        let left_half = |p: DVec2| p.x < 10.0;
        assert!(left_half.is_land(DVec2::new(3.0, 0.0)));
        assert!(!left_half.is_land(DVec2::new(12.0, 0.0)));
    }

    #[test]
    fn test_square_island() {
        let square = SquareIsland {
            width: 100.0,
            height: 100.0,
        };
        assert!(square.is_land(DVec2::new(50.0, 50.0)));
        assert!(!square.is_land(DVec2::new(5.0, 50.0)));
    }
}
