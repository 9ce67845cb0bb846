//! Terrain simulation
//!
//! Runs the ordered terrain passes over a freshly built graph: land mask,
//! ocean and coast, elevation, rivers, moisture and finally biomes. Each
//! pass owns the fields it writes and only reads fields of earlier passes.

pub mod biome;
pub mod elevation;
pub mod hydrology;
pub mod island;
pub mod perlin;
pub mod propagate;

pub use biome::{classify, Biome, BIOME_TABLE};
pub use island::{IslandShape, PerlinIsland, SquareIsland};
pub use perlin::{PerlinConfig, PerlinNoise};
pub use propagate::{propagate, Direction};

use std::time::Instant;

use rand::Rng;
use tracing::debug;

use crate::error::Result;
use crate::graph::{Graph, Rect};

/// Run `pass` and log how long it took
fn timed<T>(name: &'static str, pass: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = pass();
    debug!(pass = name, elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "terrain pass");
    out
}

/// Ordered terrain pipeline over one map rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSimulator {
    bounds: Rect,
}

impl TerrainSimulator {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Run every pass in order
    ///
    /// `rng` only drives the choice of river sources. A graph without any
    /// entities passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentGraph` if river tracing meets a broken downslope
    /// link.
    pub fn run<S, R>(&self, graph: &mut Graph, shape: &S, rng: &mut R) -> Result<()>
    where
        S: IslandShape + ?Sized,
        R: Rng + ?Sized,
    {
        let start = Instant::now();

        timed("land mask", || elevation::assign_land_mask(graph, &self.bounds, shape));
        timed("ocean and coast", || elevation::assign_ocean_coast(graph));
        timed("corner elevation", || elevation::assign_corner_elevation(graph));
        timed("elevation redistribution", || elevation::redistribute_elevation(graph));
        timed("polygon elevation", || elevation::assign_polygon_elevation(graph));
        timed("downslopes", || hydrology::assign_downslopes(graph));
        let sources = timed("rivers", || hydrology::trace_rivers(graph, rng))?;
        timed("corner moisture", || hydrology::assign_corner_moisture(graph));
        timed("moisture redistribution", || hydrology::redistribute_moisture(graph));
        timed("polygon moisture", || hydrology::assign_polygon_moisture(graph));
        timed("biomes", || biome::assign_biomes(graph));

        debug!(
            river_sources = sources,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "terrain simulated"
        );
        Ok(())
    }
}
