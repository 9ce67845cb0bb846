//! Island Map Configuration and Builder
//!
//! This module provides configuration types for deterministic island map generation.

use std::hash::Hasher;

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Length of seeds generated when the caller does not provide one
pub const GENERATED_SEED_LENGTH: usize = 20;

/// Upper bound on Lloyd iterations accepted by the builder
pub const MAX_LLOYD_ITERATIONS: usize = 20;

/// Configuration for deterministic island map generation
///
/// The same configuration (including the seed string) always produces the
/// identical map: same cell positions, flags, elevations and biomes.
///
/// # Example
///
/// ```rust
/// use voronoi_island::*;
///
/// let config = MapConfigBuilder::new()
///     .seed("TEST")
///     .dimensions(100.0, 100.0)
///     .unwrap()
///     .point_spacing(10.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, "TEST");
/// assert_eq!(config.seed_hash(), voronoi_island::config::hash_seed("TEST"));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Map width in world units
    pub width: f64,

    /// Map height in world units
    pub height: f64,

    /// Minimum distance between sampled points (controls cell density)
    pub point_spacing: f64,

    /// Candidate attempts per active point in the blue-noise sampler
    pub sample_attempts: usize,

    /// Seed string, hashed to seed the generator and the noise field
    ///
    /// Never empty after `MapConfigBuilder::build`: a random alphanumeric
    /// seed is generated in that case.
    pub seed: String,

    /// Number of Lloyd relaxation iterations applied after the first build
    ///
    /// - 0: Poisson-disk cells as sampled (default)
    /// - 1-2: Noticeably more regular polygons
    pub lloyd_iterations: usize,

    /// Convergence threshold for Lloyd's relaxation (fraction of point spacing)
    ///
    /// Relaxation stops early once no center moves further than
    /// `lloyd_convergence * point_spacing`. 0.0 disables early termination.
    pub lloyd_convergence: f64,
}

impl MapConfig {
    /// Deterministic 64-bit hash of the seed string
    #[inline]
    pub fn seed_hash(&self) -> u64 {
        hash_seed(&self.seed)
    }

    /// Create the pseudorandom generator for this configuration
    ///
    /// Every randomized stage draws from the returned generator, so two
    /// runs with the same configuration see the same sequence.
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed_hash())
    }

    /// Approximate number of centers the sampler will produce
    ///
    /// Used to size the spatial index.
    pub fn expected_center_count(&self) -> f64 {
        (2.0 * self.width * self.height)
            / (std::f64::consts::PI * self.point_spacing * self.point_spacing)
    }

    /// Check every field, returning `InvalidParameters` on the first failure
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)?;
        validate_spacing(self.point_spacing)?;
        validate_attempts(self.sample_attempts)?;
        validate_seed(&self.seed)?;
        if self.seed.is_empty() {
            return Err(MapError::InvalidParameters(
                "seed must not be empty once the configuration is built".into(),
            ));
        }
        if self.lloyd_iterations > MAX_LLOYD_ITERATIONS {
            return Err(MapError::InvalidParameters(format!(
                "Lloyd iterations must be <= {} (got {})",
                MAX_LLOYD_ITERATIONS, self.lloyd_iterations
            )));
        }
        if !(self.lloyd_convergence >= 0.0) {
            return Err(MapError::InvalidParameters(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                self.lloyd_convergence
            )));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            point_spacing: 10.0,
            sample_attempts: 10,
            seed: random_seed(GENERATED_SEED_LENGTH),
            lloyd_iterations: 0,
            lloyd_convergence: 0.01,
        }
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_island::*;
///
/// // Use defaults (random seed)
/// let config = MapConfigBuilder::new().build().unwrap();
/// assert_eq!(config.seed.len(), 20);
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .seed("archipelago")
///     .dimensions(400.0, 300.0)
///     .unwrap()
///     .lloyd_iterations(2)
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    width: f64,
    height: f64,
    point_spacing: f64,
    sample_attempts: usize,
    seed: String,
    lloyd_iterations: usize,
    lloyd_convergence: f64,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - dimensions: 800 x 600
    /// - point_spacing: 10.0
    /// - sample_attempts: 10
    /// - seed: empty (a random one is generated on build)
    /// - lloyd_iterations: 0
    /// - lloyd_convergence: 0.01
    pub fn new() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            point_spacing: 10.0,
            sample_attempts: 10,
            seed: String::new(),
            lloyd_iterations: 0,
            lloyd_convergence: 0.01,
        }
    }

    /// Set the seed string
    ///
    /// An empty string requests a freshly generated random seed.
    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Set the map rectangle
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if either dimension is not a positive finite number
    pub fn dimensions(mut self, width: f64, height: f64) -> Result<Self> {
        validate_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the minimum distance between sampled points
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if spacing is not a positive finite number
    pub fn point_spacing(mut self, spacing: f64) -> Result<Self> {
        validate_spacing(spacing)?;
        self.point_spacing = spacing;
        Ok(self)
    }

    /// Set the number of candidate attempts per active sample point
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if attempts is zero
    pub fn sample_attempts(mut self, attempts: usize) -> Result<Self> {
        validate_attempts(attempts)?;
        self.sample_attempts = attempts;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation iterations
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if iterations > 20
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > MAX_LLOYD_ITERATIONS {
            return Err(MapError::InvalidParameters(format!(
                "Lloyd iterations must be <= {} (got {})",
                MAX_LLOYD_ITERATIONS, iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Set the convergence threshold for Lloyd's relaxation
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` if threshold is negative
    pub fn lloyd_convergence(mut self, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) {
            return Err(MapError::InvalidParameters(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random alphanumeric seed and logs it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for a blank or control-character seed
    pub fn build(self) -> Result<MapConfig> {
        validate_seed(&self.seed)?;

        let seed = if self.seed.is_empty() {
            let generated = random_seed(GENERATED_SEED_LENGTH);
            info!(seed = %generated, hash = hash_seed(&generated), "generated random map seed");
            generated
        } else {
            self.seed
        };

        let config = MapConfig {
            width: self.width,
            height: self.height,
            point_spacing: self.point_spacing,
            sample_attempts: self.sample_attempts,
            seed,
            lloyd_iterations: self.lloyd_iterations,
            lloyd_convergence: self.lloyd_convergence,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a seed string into the 64-bit value used to seed generation
///
/// Stable across runs for a given crate version on targets of the same
/// pointer width. `FxHasher` mixes in `usize` words, so 32-bit and 64-bit
/// builds map the same seed to different maps.
pub fn hash_seed(seed: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(seed.as_bytes());
    hasher.finish()
}

/// Generate a random alphanumeric seed of the given length
pub fn random_seed(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn validate_dimensions(width: f64, height: f64) -> Result<()> {
    if !(width > 0.0 && width.is_finite()) || !(height > 0.0 && height.is_finite()) {
        return Err(MapError::InvalidParameters(format!(
            "map dimensions must be positive (got {} x {})",
            width, height
        )));
    }
    Ok(())
}

fn validate_spacing(spacing: f64) -> Result<()> {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Err(MapError::InvalidParameters(format!(
            "point spacing must be positive (got {})",
            spacing
        )));
    }
    Ok(())
}

fn validate_attempts(attempts: usize) -> Result<()> {
    if attempts == 0 {
        return Err(MapError::InvalidParameters(
            "sample attempts must be at least 1".into(),
        ));
    }
    Ok(())
}

fn validate_seed(seed: &str) -> Result<()> {
    if !seed.is_empty() && seed.trim().is_empty() {
        return Err(MapError::InvalidParameters("seed must not be blank".into()));
    }
    if seed.chars().any(char::is_control) {
        return Err(MapError::InvalidParameters(
            "seed must not contain control characters".into(),
        ));
    }
    Ok(())
}
