//! Core polygon graph generation
//!
//! Samples blue-noise sites, triangulates them and converts the
//! triangulation into the Center/Corner/Edge dual graph, optionally
//! smoothed with Lloyd's relaxation.

pub mod delaunay;
pub mod dual;
pub mod lloyd;
pub mod poisson;

pub use delaunay::{triangulate, Triangle, Triangulation};
pub use dual::build_graph;
pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions};
pub use poisson::PoissonDiskSampler;

use glam::DVec2;
use rand::Rng;
use tracing::debug;

use crate::config::MapConfig;
use crate::error::Result;
use crate::graph::{Graph, Rect};

/// Points far outside the map rectangle that close every in-map polygon
pub fn bounding_points(width: f64, height: f64) -> [DVec2; 4] {
    [
        DVec2::new(-width, -height),
        DVec2::new(2.0 * width, -height),
        DVec2::new(2.0 * width, 2.0 * height),
        DVec2::new(-width, 2.0 * height),
    ]
}

/// Generate the polygon graph from configuration (without terrain)
///
/// Returns centers, corners and edges with geometry and adjacency only.
/// Terrain must be simulated separately.
pub fn generate_graph<R: Rng + ?Sized>(config: &MapConfig, rng: &mut R) -> Result<Graph> {
    let bounds = Rect::from_size(config.width, config.height);

    // Step 1: Blue-noise sites plus the bounding points
    let sampler = PoissonDiskSampler::new(
        config.width,
        config.height,
        config.point_spacing,
        config.sample_attempts,
    )?;
    let mut points = sampler.sample(rng);
    debug!(points = points.len(), "sampled sites");
    points.extend(bounding_points(config.width, config.height));

    // Step 2-3: Triangulate and build the dual
    let graph = build_graph(&triangulate(&points))?;

    // Step 4: Lloyd's relaxation with convergence detection
    if config.lloyd_iterations > 0 {
        let options = LloydOptions {
            max_iterations: config.lloyd_iterations,
            convergence_threshold: config.lloyd_convergence,
        };
        lloyd_relaxation_with_options(graph, &bounds, config.point_spacing, options)
    } else {
        Ok(graph)
    }
}
