//! Land mask, ocean/coast flags and elevation
//!
//! Elevation starts as a weighted hop distance from the map border and is
//! then remapped by rank so that lowlands dominate the histogram.

use std::collections::VecDeque;

use crate::graph::{CenterId, CornerId, Graph, Rect};

use super::island::IslandShape;
use super::propagate::{propagate, Direction};

/// Cost of any step away from the border
pub const STEP_COST: f64 = 0.01;

/// Extra cost of a step between two land corners
pub const LAND_STEP_COST: f64 = 1.0;

/// Scale of the rank remap; larger values flatten the curve
pub const REDISTRIBUTION_SCALE: f64 = 1.05;

/// Flag border corners and classify the rest with `shape`
pub fn assign_land_mask(graph: &mut Graph, bounds: &Rect, shape: &(impl IslandShape + ?Sized)) {
    for corner in graph.corners_mut() {
        corner.border = !corner.is_inside(bounds);
        if corner.border {
            corner.water = true;
            corner.ocean = true;
        } else {
            corner.water = !shape.is_land(corner.position);
        }
    }
}

/// Ocean flood fill from the border, then coast and corner flags
pub fn assign_ocean_coast(graph: &mut Graph) {
    let mut queue = VecDeque::new();

    for idx in 0..graph.centers().len() {
        let id = CenterId(idx);
        let corners = graph[id].corners.clone();

        let mut water_corners = 0;
        for &q in &corners {
            if graph[q].border {
                graph[q].water = true;
                if !graph[id].border {
                    graph[id].border = true;
                    graph[id].ocean = true;
                    queue.push_back(id);
                }
            }
            if graph[q].water {
                water_corners += 1;
            }
        }

        let center = &mut graph[id];
        center.water = center.ocean || water_corners as f64 >= corners.len() as f64 * 0.5;
    }

    while let Some(p) = queue.pop_front() {
        for r in graph[p].neighbors.clone() {
            if graph[r].water && !graph[r].ocean {
                graph[r].ocean = true;
                queue.push_back(r);
            }
        }
    }

    for idx in 0..graph.centers().len() {
        let id = CenterId(idx);
        let (ocean, land) = graph[id]
            .neighbors
            .iter()
            .fold((false, false), |(ocean, land), &r| {
                (ocean || graph[r].ocean, land || !graph[r].water)
            });
        graph[id].coast = ocean && land;
    }

    for idx in 0..graph.corners().len() {
        let id = CornerId(idx);
        let total = graph[id].centers.len();
        let ocean = graph[id].centers.iter().filter(|&&p| graph[p].ocean).count();
        let land = graph[id].centers.iter().filter(|&&p| !graph[p].water).count();

        let corner = &mut graph[id];
        corner.ocean = ocean == total;
        corner.coast = ocean > 0 && land > 0;
        corner.water = corner.border || (land != total && !corner.coast);
    }
}

/// Weighted distance from the border; water corners end at 0
pub fn assign_corner_elevation(graph: &mut Graph) {
    let mut values: Vec<f64> = graph
        .corners()
        .iter()
        .map(|q| if q.border { 0.0 } else { f64::INFINITY })
        .collect();
    let seeds: Vec<CornerId> = graph.corners().iter().filter(|q| q.border).map(|q| q.id).collect();

    let land: Vec<bool> = graph.corners().iter().map(|q| !q.water).collect();
    propagate(graph, &mut values, seeds, Direction::Minimize, |from, to, value| {
        let mut next = value + STEP_COST;
        if land[from.index()] && land[to.index()] {
            next += LAND_STEP_COST;
        }
        next
    });

    for (corner, value) in graph.corners_mut().iter_mut().zip(values) {
        corner.elevation = if corner.water || !value.is_finite() { 0.0 } else { value };
    }
}

/// Normalized rank of each of `n` sorted items, 0 for a single item
pub(crate) fn rank_fraction(rank: usize, n: usize) -> f64 {
    if n > 1 {
        rank as f64 / (n - 1) as f64
    } else {
        0.0
    }
}

/// Remap land corner elevations by rank to `sqrt(s) - sqrt(s (1 - y))`
pub fn redistribute_elevation(graph: &mut Graph) {
    let mut land = graph.land_corners();
    land.sort_by(|&a, &b| graph[a].elevation.total_cmp(&graph[b].elevation));

    let n = land.len();
    for (rank, q) in land.into_iter().enumerate() {
        let y = rank_fraction(rank, n);
        let x = REDISTRIBUTION_SCALE.sqrt() - (REDISTRIBUTION_SCALE * (1.0 - y)).sqrt();
        graph[q].elevation = x.min(1.0);
    }
}

/// Center elevation is the mean of its corners
pub fn assign_polygon_elevation(graph: &mut Graph) {
    for idx in 0..graph.centers().len() {
        let id = CenterId(idx);
        let corners = &graph[id].corners;
        let elevation = if corners.is_empty() {
            0.0
        } else {
            corners.iter().map(|&q| graph[q].elevation).sum::<f64>() / corners.len() as f64
        };
        graph[id].elevation = elevation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{bounding_points, build_graph, triangulate, PoissonDiskSampler};
    use crate::terrain::island::SquareIsland;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square_map(seed: u64) -> (Graph, Rect) {
        let sampler = PoissonDiskSampler::new(100.0, 100.0, 8.0, 10).unwrap();
        let mut points = sampler.sample(&mut ChaCha8Rng::seed_from_u64(seed));
        points.extend(bounding_points(100.0, 100.0));
        let mut graph = build_graph(&triangulate(&points)).unwrap();
        let bounds = Rect::from_size(100.0, 100.0);
        let shape = SquareIsland {
            width: 100.0,
            height: 100.0,
        };
        assign_land_mask(&mut graph, &bounds, &shape);
        (graph, bounds)
    }

    #[test]
    fn test_land_mask() {
        let (graph, bounds) = square_map(1);
        for corner in graph.corners() {
            if !corner.is_inside(&bounds) {
                assert!(corner.border && corner.water && corner.ocean);
            }
        }
        assert!(graph.corners().iter().any(|q| !q.water));
    }

    #[test]
    fn test_border_centers_are_ocean() {
        let (mut graph, _) = square_map(2);
        assign_ocean_coast(&mut graph);

        for center in graph.centers() {
            if center.corners.iter().any(|&q| graph[q].border) {
                assert!(center.border && center.ocean && center.water);
            }
            if center.ocean {
                assert!(center.water);
            }
        }
        assert!(graph.centers().iter().any(|c| c.coast));
    }

    #[test]
    fn test_coast_flags() {
        let (mut graph, _) = square_map(3);
        assign_ocean_coast(&mut graph);

        for center in graph.centers().iter().filter(|c| c.coast) {
            assert!(center.neighbors.iter().any(|&r| graph[r].ocean));
            assert!(center.neighbors.iter().any(|&r| !graph[r].water));
        }
        for corner in graph.corners() {
            if corner.ocean {
                assert!(corner.centers.iter().all(|&p| graph[p].ocean));
            }
            if corner.coast {
                assert!(!corner.water || corner.border);
            }
        }
    }

    #[test]
    fn test_elevation_rises_inland() {
        let (mut graph, _) = square_map(4);
        assign_ocean_coast(&mut graph);
        assign_corner_elevation(&mut graph);

        for corner in graph.corners() {
            if corner.water {
                assert_eq!(corner.elevation, 0.0);
            } else {
                assert!(corner.elevation > 0.0);
                assert!(corner.elevation.is_finite());
            }
        }
    }

    #[test]
    fn test_redistribution_preserves_order() {
        let (mut graph, _) = square_map(5);
        assign_ocean_coast(&mut graph);
        assign_corner_elevation(&mut graph);

        let land = graph.land_corners();
        let before: Vec<f64> = land.iter().map(|&q| graph[q].elevation).collect();
        redistribute_elevation(&mut graph);
        let after: Vec<f64> = land.iter().map(|&q| graph[q].elevation).collect();

        for i in 0..land.len() {
            assert!((0.0..=1.0).contains(&after[i]));
            for j in 0..land.len() {
                if before[i] < before[j] {
                    assert!(after[i] <= after[j]);
                }
            }
        }
        let max = after.iter().copied().fold(0.0, f64::max);
        assert_eq!(max, 1.0);
        let min = after.iter().copied().fold(1.0, f64::min);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn test_single_land_corner_rank() {
        let mut graph = Graph::new();
        let q = graph.add_corner(DVec2::ZERO);
        graph[q].elevation = 7.0;
        redistribute_elevation(&mut graph);
        assert_eq!(graph[q].elevation, 0.0);
    }

    #[test]
    fn test_rank_fraction() {
        assert_eq!(rank_fraction(0, 0), 0.0);
        assert_eq!(rank_fraction(0, 1), 0.0);
        assert_eq!(rank_fraction(2, 5), 0.5);
        assert_eq!(rank_fraction(4, 5), 1.0);
    }

    #[test]
    fn test_polygon_elevation_is_mean() {
        let (mut graph, _) = square_map(6);
        assign_ocean_coast(&mut graph);
        assign_corner_elevation(&mut graph);
        redistribute_elevation(&mut graph);
        assign_polygon_elevation(&mut graph);

        for center in graph.centers() {
            let mean = center.corners.iter().map(|&q| graph[q].elevation).sum::<f64>()
                / center.corners.len() as f64;
            assert!((center.elevation - mean).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_graph_is_noop() {
        let mut graph = Graph::new();
        assign_ocean_coast(&mut graph);
        assign_corner_elevation(&mut graph);
        redistribute_elevation(&mut graph);
        assign_polygon_elevation(&mut graph);
        assert!(graph.is_empty());
    }
}
