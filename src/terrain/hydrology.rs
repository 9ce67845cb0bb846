//! Downslopes, rivers and moisture

use rand::Rng;

use crate::error::{MapError, Result};
use crate::graph::{CenterId, CornerId, Graph};

use super::elevation::rank_fraction;
use super::propagate::{propagate, Direction};

/// River sources must lie within this elevation range (inclusive)
pub const RIVER_SOURCE_ELEVATION: (f64, f64) = (0.3, 0.9);

/// Moisture kept per hop away from fresh water
pub const FRESH_WATER_DECAY: f64 = 0.9;

/// Moisture kept per hop away from the ocean
pub const SALT_WATER_DECAY: f64 = 0.3;

/// Cap on the moisture a river corner starts with
pub const MAX_RIVER_MOISTURE: f64 = 3.0;

/// Point every corner at its lowest neighbor, or itself if none is lower
pub fn assign_downslopes(graph: &mut Graph) {
    for idx in 0..graph.corners().len() {
        let id = CornerId(idx);
        let mut lowest = id;
        for &r in &graph[id].neighbors {
            if graph[r].elevation < graph[lowest].elevation {
                lowest = r;
            }
        }
        graph[id].downslope = Some(lowest);
    }
}

/// Trace rivers from random sources down to the coast
///
/// Runs one trial per three centers and returns the number of trials that
/// found a valid source.
///
/// # Errors
///
/// Returns `InconsistentGraph` if a downslope link is missing or is not
/// joined to its corner by an edge.
pub fn trace_rivers<R: Rng + ?Sized>(graph: &mut Graph, rng: &mut R) -> Result<usize> {
    let corner_count = graph.corners().len();
    if corner_count == 0 {
        return Ok(0);
    }

    let (low, high) = RIVER_SOURCE_ELEVATION;
    let trials = graph.centers().len() / 3;
    let mut sources = 0;

    for _ in 0..trials {
        let mut q = CornerId(rng.gen_range(0..corner_count));
        if graph[q].ocean || graph[q].elevation < low || graph[q].elevation > high {
            continue;
        }
        sources += 1;

        while !graph[q].coast {
            let down = graph[q].downslope.ok_or_else(|| {
                MapError::InconsistentGraph(format!("corner {} has no downslope", q.index()))
            })?;
            if down == q {
                break;
            }
            let edge = graph.edge_between_corners(q, down).ok_or_else(|| {
                MapError::InconsistentGraph(format!(
                    "no edge between corner {} and its downslope {}",
                    q.index(),
                    down.index()
                ))
            })?;

            graph[edge].river_volume += 1.0;
            graph[q].river_volume += 1.0;
            graph[down].river_volume += 1.0;
            q = down;
        }
    }

    Ok(sources)
}

/// Diffuse moisture from fresh water (lakes, rivers) and then the ocean
pub fn assign_corner_moisture(graph: &mut Graph) {
    let mut values = Vec::with_capacity(graph.corners().len());
    let mut fresh = Vec::new();

    for corner in graph.corners() {
        let source = (corner.water || corner.river_volume > 0.0) && !corner.ocean;
        if source {
            fresh.push(corner.id);
            values.push(if corner.river_volume > 0.0 {
                (0.2 * corner.river_volume).min(MAX_RIVER_MOISTURE)
            } else {
                1.0
            });
        } else {
            values.push(0.0);
        }
    }
    propagate(graph, &mut values, fresh, Direction::Maximize, |_, _, v| v * FRESH_WATER_DECAY);

    let mut salt = Vec::new();
    for corner in graph.corners().iter().filter(|q| q.ocean) {
        values[corner.id.index()] = 1.0;
        salt.push(corner.id);
    }
    propagate(graph, &mut values, salt, Direction::Maximize, |_, _, v| v * SALT_WATER_DECAY);

    for (corner, value) in graph.corners_mut().iter_mut().zip(values) {
        corner.moisture = value;
    }
}

/// Remap land corner moisture linearly by rank
pub fn redistribute_moisture(graph: &mut Graph) {
    let mut land = graph.land_corners();
    land.sort_by(|&a, &b| graph[a].moisture.total_cmp(&graph[b].moisture));

    let n = land.len();
    for (rank, q) in land.into_iter().enumerate() {
        graph[q].moisture = rank_fraction(rank, n);
    }
}

/// Cap corner moisture at 1, then set each center to the mean of its corners
pub fn assign_polygon_moisture(graph: &mut Graph) {
    for corner in graph.corners_mut() {
        corner.moisture = corner.moisture.min(1.0);
    }

    for idx in 0..graph.centers().len() {
        let id = CenterId(idx);
        let corners = &graph[id].corners;
        let moisture = if corners.is_empty() {
            0.0
        } else {
            corners.iter().map(|&q| graph[q].moisture).sum::<f64>() / corners.len() as f64
        };
        graph[id].moisture = moisture;
    }
}
