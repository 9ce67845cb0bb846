//! Dual graph construction from a Delaunay triangulation
//!
//! Every triangle vertex becomes a [`Center`](crate::graph::Center), every
//! triangle becomes a [`Corner`](crate::graph::Corner) at its circumcenter,
//! and every Delaunay edge becomes an [`Edge`](crate::graph::Edge) whose
//! Voronoi endpoints are filled in by the (at most two) triangles sharing it.

use std::collections::BTreeMap;

use glam::DVec2;
use ordered_float::OrderedFloat;

use crate::error::{MapError, Result};
use crate::graph::{CenterId, CornerId, Graph};

use super::delaunay::Triangulation;

/// Exact position lookup: x -> y -> center
type CenterLookup = BTreeMap<OrderedFloat<f64>, BTreeMap<OrderedFloat<f64>, CenterId>>;

/// Build the Center/Corner/Edge graph from a triangulation
///
/// An empty triangulation yields an empty graph.
///
/// # Errors
///
/// Returns `InconsistentGraph` if the result has a Center without Corners or
/// an Edge without any Corner endpoint.
pub fn build_graph(triangulation: &Triangulation) -> Result<Graph> {
    let mut graph = Graph::new();
    let mut lookup = CenterLookup::new();

    for triangle in &triangulation.triangles {
        let sites = triangulation
            .positions(triangle)
            .map(|p| center_at_position(&mut graph, &mut lookup, p));

        let corner = graph.add_corner(triangle.center);
        for &site in &sites {
            graph[corner].centers.push(site);
            graph[site].corners.push(corner);
        }

        for (a, b) in [(sites[0], sites[1]), (sites[1], sites[2]), (sites[2], sites[0])] {
            let edge = match graph.edge_between_centers(a, b) {
                Some(edge) => {
                    graph[edge].v1 = Some(corner);
                    edge
                }
                None => {
                    let edge = graph.add_edge(a, b);
                    graph[edge].v0 = Some(corner);
                    graph[a].edges.push(edge);
                    graph[b].edges.push(edge);
                    edge
                }
            };
            graph[corner].edges.push(edge);
        }
    }

    finish(&mut graph);
    validate(&graph)?;
    Ok(graph)
}

fn center_at_position(graph: &mut Graph, lookup: &mut CenterLookup, p: DVec2) -> CenterId {
    *lookup
        .entry(OrderedFloat(p.x))
        .or_default()
        .entry(OrderedFloat(p.y))
        .or_insert_with(|| graph.add_center(p))
}

/// Sort polygon corners and derive neighbor lists
fn finish(graph: &mut Graph) {
    for idx in 0..graph.centers().len() {
        let id = CenterId(idx);
        let origin = graph[id].position;

        let mut corners = std::mem::take(&mut graph[id].corners);
        corners.sort_by(|&a, &b| {
            angle_around(origin, graph[a].position).total_cmp(&angle_around(origin, graph[b].position))
        });

        let neighbors = graph[id]
            .edges
            .iter()
            .filter_map(|&e| graph[e].opposite_center(id))
            .collect();

        let center = &mut graph[id];
        center.corners = corners;
        center.neighbors = neighbors;
    }

    for idx in 0..graph.corners().len() {
        let id = CornerId(idx);
        let neighbors = graph[id]
            .edges
            .iter()
            .filter_map(|&e| graph[e].opposite_corner(id))
            .collect();
        graph[id].neighbors = neighbors;
    }
}

#[inline]
fn angle_around(origin: DVec2, p: DVec2) -> f64 {
    let d = p - origin;
    d.y.atan2(d.x)
}

fn validate(graph: &Graph) -> Result<()> {
    if let Some(center) = graph.centers().iter().find(|c| c.corners.is_empty()) {
        return Err(MapError::InconsistentGraph(format!(
            "center {} has no corners",
            center.id.index()
        )));
    }
    if let Some(edge) = graph.edges().iter().find(|e| e.v0.is_none() && e.v1.is_none()) {
        return Err(MapError::InconsistentGraph(format!(
            "edge {} has no corner endpoints",
            edge.id.index()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::delaunay::triangulate;
    use crate::graph::point_in_polygon;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_graph(count: usize, seed: u64) -> Graph {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points: Vec<DVec2> = (0..count)
            .map(|_| DVec2::new(rng.gen_range(0.0..50.0), rng.gen_range(0.0..50.0)))
            .collect();
        build_graph(&triangulate(&points)).unwrap()
    }

    /// Segments (a, b) and (c, d) cross at an interior point
    fn segments_cross(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
        let d1 = (b - a).perp_dot(c - a);
        let d2 = (b - a).perp_dot(d - a);
        let d3 = (d - c).perp_dot(a - c);
        let d4 = (d - c).perp_dot(b - c);
        d1 * d2 < 0.0 && d3 * d4 < 0.0
    }

    #[test]
    fn test_single_triangle_graph() {
        let points = [DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(0.0, 4.0)];
        let graph = build_graph(&triangulate(&points)).unwrap();

        assert_eq!(graph.centers().len(), 3);
        assert_eq!(graph.corners().len(), 1);
        assert_eq!(graph.edges().len(), 3);

        let corner = &graph.corners()[0];
        assert!((corner.position - DVec2::new(2.0, 2.0)).length() < 1e-9);
        assert!(corner.neighbors.is_empty());
        for edge in graph.edges() {
            assert_eq!(edge.v0, Some(corner.id));
            assert_eq!(edge.v1, None);
        }
        for center in graph.centers() {
            assert_eq!(center.neighbors.len(), 2);
        }
    }

    #[test]
    fn test_empty_triangulation() {
        let graph = build_graph(&Triangulation::default()).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_edge_endpoints_list_edge() {
        let graph = random_graph(80, 5);
        for edge in graph.edges() {
            for corner in [edge.v0, edge.v1].into_iter().flatten() {
                assert!(graph[corner].edges.contains(&edge.id));
            }
            assert!(graph[edge.d0].edges.contains(&edge.id));
            assert!(graph[edge.d1].edges.contains(&edge.id));
        }
    }

    #[test]
    fn test_one_edge_per_center_pair() {
        let graph = random_graph(60, 11);
        let mut pairs: Vec<_> = graph
            .edges()
            .iter()
            .map(|e| (e.d0.min(e.d1), e.d0.max(e.d1)))
            .collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
    }

    #[test]
    fn test_corner_has_three_centers() {
        let graph = random_graph(50, 2);
        for corner in graph.corners() {
            assert_eq!(corner.centers.len(), 3);
            assert_eq!(corner.edges.len(), 3);
        }
    }

    #[test]
    fn test_neighbor_symmetry() {
        let graph = random_graph(70, 8);
        for center in graph.centers() {
            for &n in &center.neighbors {
                assert!(graph[n].is_neighbor_of(center.id));
            }
        }
        for corner in graph.corners() {
            for &n in &corner.neighbors {
                assert!(graph[n].neighbors.contains(&corner.id));
            }
        }
    }

    #[test]
    fn test_interior_polygons_are_simple() {
        let graph = random_graph(100, 21);
        for center in graph.centers() {
            // Hull sites have open cells; only closed ones are checked
            let closed = center
                .edges
                .iter()
                .all(|&e| graph[e].v0.is_some() && graph[e].v1.is_some());
            if !closed {
                continue;
            }

            let polygon: Vec<DVec2> = graph.polygon(center.id).collect();
            let n = polygon.len();
            assert!(n >= 3);
            for i in 0..n {
                for j in i + 2..n {
                    if i == 0 && j == n - 1 {
                        continue;
                    }
                    assert!(!segments_cross(
                        polygon[i],
                        polygon[(i + 1) % n],
                        polygon[j],
                        polygon[(j + 1) % n]
                    ));
                }
            }
            assert!(point_in_polygon(&polygon, center.position));
        }
    }

    #[test]
    fn test_centers_deduplicated() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(5.0, 4.0),
        ];
        let graph = build_graph(&triangulate(&points)).unwrap();
        assert_eq!(graph.centers().len(), 5);
        assert_eq!(graph.corners().len(), 4);
    }
}
