//! Lloyd's Relaxation for uniform cell size
//!
//! Lloyd's Relaxation iteratively improves the regularity of the polygon
//! cells by moving each site to the centroid of its Voronoi polygon and
//! rebuilding the graph from the moved sites.

use std::time::Instant;

use glam::DVec2;
use tracing::{debug, trace};

use crate::error::Result;
use crate::graph::{Graph, Rect};

use super::delaunay::triangulate;
use super::dual::build_graph;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Maximum number of iterations to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value
    /// (as a fraction of the point spacing). Set to 0.0 to disable early
    /// termination.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            convergence_threshold: 0.01,
        }
    }
}

/// Apply Lloyd's Relaxation with a fixed iteration count
pub fn lloyd_relaxation(graph: Graph, bounds: &Rect, spacing: f64, iterations: usize) -> Result<Graph> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(graph, bounds, spacing, options)
}

/// Apply Lloyd's Relaxation with custom options
///
/// Sites outside `bounds` (the synthetic bounding-box points) stay where
/// they are. Every iteration discards the whole graph and rebuilds it.
///
/// # Arguments
///
/// * `graph` - Graph built from the current sites
/// * `bounds` - Map rectangle; polygon corners are clamped onto it
/// * `spacing` - Point spacing, the unit of the convergence threshold
/// * `options` - Relaxation options (max iterations, convergence threshold)
pub fn lloyd_relaxation_with_options(
    mut graph: Graph,
    bounds: &Rect,
    spacing: f64,
    options: LloydOptions,
) -> Result<Graph> {
    let convergence_threshold = options.convergence_threshold * spacing;
    let total_start = Instant::now();

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();

        let (points, max_displacement) = relaxed_sites(&graph, bounds);
        graph = build_graph(&triangulate(&points))?;
        iterations_run = iteration + 1;

        trace!(
            iteration = iteration + 1,
            max_displacement,
            elapsed_ms = iter_start.elapsed().as_secs_f64() * 1000.0,
            "lloyd iteration"
        );

        if convergence_threshold > 0.0 && max_displacement < convergence_threshold {
            converged = true;
            break;
        }
    }

    debug!(
        iterations = iterations_run,
        max_iterations = options.max_iterations,
        converged,
        elapsed_ms = total_start.elapsed().as_secs_f64() * 1000.0,
        "lloyd relaxation finished"
    );

    Ok(graph)
}

/// New site positions and the largest distance any site moved
fn relaxed_sites(graph: &Graph, bounds: &Rect) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;

    let points = graph
        .centers()
        .iter()
        .map(|center| {
            if !center.is_inside(bounds) || center.corners.is_empty() {
                return center.position;
            }

            let sum: DVec2 = graph.polygon(center.id).map(|p| bounds.clamp(p)).sum();
            let centroid = sum / center.corners.len() as f64;

            max_displacement = max_displacement.max(centroid.distance(center.position));
            centroid
        })
        .collect();

    (points, max_displacement)
}
