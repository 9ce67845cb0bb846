//! Blue-noise point sampling
//!
//! Dart throwing around active points (Bridson's algorithm), accelerated by
//! a background grid whose cells are small enough to hold at most one point.

use std::f64::consts::{SQRT_2, TAU};

use glam::DVec2;
use rand::Rng;

use crate::error::{MapError, Result};

/// Poisson-disk sampler over a `width x height` rectangle anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonDiskSampler {
    width: f64,
    height: f64,
    min_dist: f64,
    attempts: usize,
}

impl PoissonDiskSampler {
    /// Create a sampler
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameters` for non-positive dimensions or distance,
    /// or zero attempts.
    pub fn new(width: f64, height: f64, min_dist: f64, attempts: usize) -> Result<Self> {
        if !(width > 0.0 && width.is_finite()) || !(height > 0.0 && height.is_finite()) {
            return Err(MapError::InvalidParameters(format!(
                "sampling rectangle must be positive (got {} x {})",
                width, height
            )));
        }
        if !(min_dist > 0.0 && min_dist.is_finite()) {
            return Err(MapError::InvalidParameters(format!(
                "minimum distance must be positive (got {})",
                min_dist
            )));
        }
        if attempts == 0 {
            return Err(MapError::InvalidParameters(
                "candidate attempts must be at least 1".into(),
            ));
        }

        Ok(Self {
            width,
            height,
            min_dist,
            attempts,
        })
    }

    /// Generate a point set in which no two points are closer than `min_dist`
    ///
    /// Always returns at least one point. Each call is an independent run.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<DVec2> {
        let mut grid = Grid::new(self.width, self.height, self.min_dist / SQRT_2);
        let mut points = Vec::new();
        let mut active = Vec::new();

        let first = DVec2::new(rng.gen::<f64>() * self.width, rng.gen::<f64>() * self.height);
        grid.insert(first, points.len());
        active.push(points.len());
        points.push(first);

        while !active.is_empty() {
            let slot = rng.gen_range(0..active.len());
            let origin = points[active[slot]];

            let mut accepted = false;
            for _ in 0..self.attempts {
                let candidate = self.point_around(origin, rng);
                if self.in_rectangle(candidate) && !self.has_neighbor_within(&grid, &points, candidate) {
                    grid.insert(candidate, points.len());
                    active.push(points.len());
                    points.push(candidate);
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                active.swap_remove(slot);
            }
        }

        points
    }

    /// Uniform angle, radius in [min_dist, 2 * min_dist)
    fn point_around<R: Rng + ?Sized>(&self, origin: DVec2, rng: &mut R) -> DVec2 {
        let radius = self.min_dist * (1.0 + rng.gen::<f64>());
        let angle = TAU * rng.gen::<f64>();
        origin + DVec2::from_angle(angle) * radius
    }

    #[inline]
    fn in_rectangle(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }

    fn has_neighbor_within(&self, grid: &Grid, points: &[DVec2], candidate: DVec2) -> bool {
        let min_dist2 = self.min_dist * self.min_dist;
        grid.around(candidate)
            .any(|idx| points[idx].distance_squared(candidate) < min_dist2)
    }
}

/// Uniform grid mapping each cell to the points stored in it
struct Grid {
    cell_size: f64,
    columns: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

/// A point within `min_dist` can be up to two cells of side `min_dist / sqrt(2)` away
const SEARCH_RADIUS: isize = 2;

impl Grid {
    fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let columns = (width / cell_size).ceil().max(1.0) as usize;
        let rows = (height / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            columns,
            rows,
            cells: vec![Vec::new(); columns * rows],
        }
    }

    fn cell_of(&self, p: DVec2) -> (usize, usize) {
        let col = ((p.x / self.cell_size) as usize).min(self.columns - 1);
        let row = ((p.y / self.cell_size) as usize).min(self.rows - 1);
        (col, row)
    }

    fn insert(&mut self, p: DVec2, idx: usize) {
        let (col, row) = self.cell_of(p);
        self.cells[row * self.columns + col].push(idx);
    }

    /// Indices of points stored in the cells surrounding `p`
    fn around(&self, p: DVec2) -> impl Iterator<Item = usize> + '_ {
        let (col, row) = self.cell_of(p);
        let (col, row) = (col as isize, row as isize);
        (-SEARCH_RADIUS..=SEARCH_RADIUS)
            .flat_map(move |dy| (-SEARCH_RADIUS..=SEARCH_RADIUS).map(move |dx| (col + dx, row + dy)))
            .filter(|&(c, r)| c >= 0 && r >= 0 && (c as usize) < self.columns && (r as usize) < self.rows)
            .flat_map(move |(c, r)| self.cells[r as usize * self.columns + c as usize].iter().copied())
    }
}
