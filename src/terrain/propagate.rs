//! Monotone relaxation over corner adjacency
//!
//! Elevation and both moisture passes share one shape: seed a FIFO queue,
//! pop a corner, offer each neighbor a value derived from the popped one,
//! and requeue the neighbor whenever the offer improves it. Improvements
//! only ever go one way, so the queue drains.

use std::collections::VecDeque;

use crate::graph::{CornerId, Graph};

/// Which way a value is allowed to move during relaxation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Keep the smallest offer (distances)
    Minimize,
    /// Keep the largest offer (diffusion)
    Maximize,
}

impl Direction {
    /// Returns true if `candidate` should replace `current`
    #[inline]
    pub fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::Minimize => candidate < current,
            Direction::Maximize => candidate > current,
        }
    }
}

/// Relax `values` (indexed by corner) until no neighbor improves
///
/// `step(from, to, value)` is the value offered to `to` when `from` holds
/// `value`. Returns the number of accepted improvements.
pub fn propagate<F>(
    graph: &Graph,
    values: &mut [f64],
    seeds: impl IntoIterator<Item = CornerId>,
    direction: Direction,
    mut step: F,
) -> usize
where
    F: FnMut(CornerId, CornerId, f64) -> f64,
{
    let mut queue: VecDeque<CornerId> = seeds.into_iter().collect();
    let mut updates = 0;

    while let Some(q) = queue.pop_front() {
        let value = values[q.index()];
        for &r in &graph[q].neighbors {
            let offer = step(q, r, value);
            if direction.improves(offer, values[r.index()]) {
                values[r.index()] = offer;
                queue.push_back(r);
                updates += 1;
            }
        }
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    /// Corners 0-1-2-3 in a line
    fn chain() -> Graph {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..4).map(|i| graph.add_corner(DVec2::new(i as f64, 0.0))).collect();
        for pair in ids.windows(2) {
            graph[pair[0]].neighbors.push(pair[1]);
            graph[pair[1]].neighbors.push(pair[0]);
        }
        graph
    }

    #[test]
    fn test_minimize_distance() {
        let graph = chain();
        let mut values = vec![0.0, f64::INFINITY, f64::INFINITY, f64::INFINITY];
        propagate(&graph, &mut values, [CornerId(0)], Direction::Minimize, |_, _, v| v + 1.0);
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_maximize_decay() {
        let graph = chain();
        let mut values = vec![1.0, 0.0, 0.0, 0.0];
        propagate(&graph, &mut values, [CornerId(0)], Direction::Maximize, |_, _, v| v * 0.5);
        assert_eq!(values, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_values_never_decrease_when_maximizing() {
        let graph = chain();
        let initial = vec![1.0, 0.0, 0.9, 0.0];
        let mut values = initial.clone();
        propagate(
            &graph,
            &mut values,
            [CornerId(0), CornerId(2)],
            Direction::Maximize,
            |_, _, v| v * 0.9,
        );
        for (before, after) in initial.iter().zip(&values) {
            assert!(after >= before);
        }
        assert!((values[3] - 0.81).abs() < 1e-12);
        assert!((values[1] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_requeue_on_improvement() {
        // A cheaper path found later must overwrite an earlier estimate
        let graph = chain();
        let mut values = vec![0.0, f64::INFINITY, f64::INFINITY, 0.0];
        let updates = propagate(
            &graph,
            &mut values,
            [CornerId(0), CornerId(3)],
            Direction::Minimize,
            |from, _, v| if from == CornerId(0) { v + 10.0 } else { v + 1.0 },
        );
        assert_eq!(values, vec![0.0, 2.0, 1.0, 0.0]);
        assert!(updates >= 3);
    }

    #[test]
    fn test_no_seeds() {
        let graph = chain();
        let mut values = vec![5.0; 4];
        let updates = propagate(&graph, &mut values, [], Direction::Maximize, |_, _, v| v);
        assert_eq!(updates, 0);
        assert_eq!(values, vec![5.0; 4]);
    }
}
