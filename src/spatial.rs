//! Spatial indexing for fast position-to-center lookups
//!
//! A region quadtree over the map rectangle. Each object is stored under its
//! bounding box in the deepest node that fully contains it, so a point query
//! returns every object whose box contains the point: a small superset of
//! the exact answer that callers refine with a precise test.

use glam::DVec2;

use crate::graph::Rect;

/// Statistics about a quadtree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadTreeStats {
    /// Total number of nodes in the tree
    pub node_count: usize,
    /// Total number of objects stored
    pub object_count: usize,
    /// Maximum depth of the tree
    pub max_depth: usize,
    /// Number of leaf nodes
    pub leaf_count: usize,
}

/// Depth at which a quadtree holding `expected` evenly spread objects has
/// about one object per leaf
pub fn depth_for(expected: f64) -> usize {
    if expected <= 1.0 {
        return 0;
    }
    (expected.ln() / 4.0_f64.ln()).round() as usize
}

/// Quadtree node for spatial partitioning
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    bounds: Rect,
    /// Objects kept before subdividing
    bucket_size: usize,
    max_depth: usize,
    /// 0 for the root
    level: usize,
    objects: Vec<(Rect, T)>,
    /// Quadrants in (min, min), (max, min), (min, max), (max, max) order
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T> QuadTree<T> {
    /// Creates an empty quadtree over `bounds`
    pub fn new(bounds: Rect, bucket_size: usize, max_depth: usize) -> Self {
        Self::node(bounds, bucket_size.max(1), max_depth, 0)
    }

    fn node(bounds: Rect, bucket_size: usize, max_depth: usize, level: usize) -> Self {
        Self {
            bounds,
            bucket_size,
            max_depth,
            level,
            objects: Vec::new(),
            children: None,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Inserts an object with its bounding box
    ///
    /// Returns `false` (dropping the object) if the box misses the tree.
    pub fn insert(&mut self, rect: Rect, object: T) -> bool {
        if !self.bounds.intersects(&rect) {
            return false;
        }

        if let Some(children) = &mut self.children {
            if let Some(child) = children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                return child.insert(rect, object);
            }
            self.objects.push((rect, object));
            return true;
        }

        self.objects.push((rect, object));
        if self.objects.len() > self.bucket_size && self.level < self.max_depth {
            self.subdivide();
        }
        true
    }

    /// Split into four quadrants and push down every object that fits one
    fn subdivide(&mut self) {
        let Rect { min, max } = self.bounds;
        let mid = self.bounds.center();
        let level = self.level + 1;
        let quadrant = |lo: DVec2, hi: DVec2| Self::node(Rect::new(lo, hi), self.bucket_size, self.max_depth, level);

        let mut children = Box::new([
            quadrant(min, mid),
            quadrant(DVec2::new(mid.x, min.y), DVec2::new(max.x, mid.y)),
            quadrant(DVec2::new(min.x, mid.y), DVec2::new(mid.x, max.y)),
            quadrant(mid, max),
        ]);

        let mut kept = Vec::new();
        for (rect, object) in self.objects.drain(..) {
            match children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                Some(child) => {
                    child.insert(rect, object);
                }
                None => kept.push((rect, object)),
            }
        }
        self.objects = kept;
        self.children = Some(children);
    }

    /// All objects whose box contains `point` (edges included)
    pub fn query_point(&self, point: DVec2) -> Vec<&T> {
        let mut result = Vec::new();
        self.query_point_internal(point, &mut result);
        result
    }

    fn query_point_internal<'a>(&'a self, point: DVec2, result: &mut Vec<&'a T>) {
        if !self.bounds.contains_point(point) {
            return;
        }

        result.extend(
            self.objects
                .iter()
                .filter(|(rect, _)| rect.contains_point(point))
                .map(|(_, object)| object),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_point_internal(point, result);
            }
        }
    }

    /// Removes every object and child node
    pub fn clear(&mut self) {
        self.objects.clear();
        self.children = None;
    }

    /// Returns statistics about the tree
    pub fn stats(&self) -> QuadTreeStats {
        let mut stats = QuadTreeStats::default();
        self.collect_stats(&mut stats, 0);
        stats
    }

    fn collect_stats(&self, stats: &mut QuadTreeStats, depth: usize) {
        stats.node_count += 1;
        stats.object_count += self.objects.len();
        stats.max_depth = stats.max_depth.max(depth);

        match &self.children {
            Some(children) => {
                for child in children.iter() {
                    child.collect_stats(stats, depth + 1);
                }
            }
            None => stats.leaf_count += 1,
        }
    }

    /// Total number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
            + self
                .children
                .as_ref()
                .map_or(0, |children| children.iter().map(QuadTree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
