//! Dual Graph Structure
//!
//! Centers (Delaunay sites / map cells), Corners (Voronoi vertices) and Edges
//! live in three flat arenas owned by [`Graph`]. Every cross-reference is a
//! typed index into one of those arenas, so the graph can be freely shared
//! read-only once generation has finished.

use std::ops::{Index, IndexMut};

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::terrain::Biome;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            /// Position of the entity in its arena
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Index of a [`Center`] in [`Graph::centers`]
    CenterId
);
arena_id!(
    /// Index of a [`Corner`] in [`Graph::corners`]
    CornerId
);
arena_id!(
    /// Index of an [`Edge`] in [`Graph::edges`]
    EdgeId
);

/// Axis-aligned rectangle with inclusive bounds
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner
    pub min: DVec2,
    /// Upper-right corner
    pub max: DVec2,
}

impl Rect {
    /// Create a rectangle from its two extreme corners
    pub const fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Rectangle anchored at the origin with the given size
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::ZERO, DVec2::new(width, height))
    }

    /// Smallest rectangle enclosing all points, `None` for an empty iterator
    pub fn enclosing(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |rect, p| {
            Self::new(rect.min.min(p), rect.max.max(p))
        }))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Checks if the rectangle contains a point (edges included)
    #[inline]
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Checks if this rectangle overlaps another (touching counts)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Checks if this rectangle fully contains another
    #[inline]
    pub fn contains(&self, other: &Rect) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Clamp a point onto the rectangle
    #[inline]
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        p.clamp(self.min, self.max)
    }
}

/// A map cell: one Delaunay site and the Voronoi polygon around it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Center {
    /// Unique identifier (index into the centers arena)
    pub id: CenterId,
    /// Site position
    pub position: DVec2,

    pub water: bool,
    pub ocean: bool,
    pub coast: bool,
    /// Touches a corner outside the map rectangle
    pub border: bool,

    /// Biome, `None` until classification has run
    pub biome: Option<Biome>,
    /// Mean of the corner elevations, in [0, 1]
    pub elevation: f64,
    /// Mean of the corner moistures, in [0, 1]
    pub moisture: f64,

    /// Delaunay edges incident to this site
    pub edges: Vec<EdgeId>,
    /// Polygon vertices, angularly sorted around `position`
    pub corners: Vec<CornerId>,
    /// Centers sharing an edge with this one
    pub neighbors: Vec<CenterId>,
}

impl Center {
    /// Create a center with no adjacency and default terrain fields
    pub fn new(id: CenterId, position: DVec2) -> Self {
        Self {
            id,
            position,
            water: false,
            ocean: false,
            coast: false,
            border: false,
            biome: None,
            elevation: 0.0,
            moisture: 0.0,
            edges: Vec::new(),
            corners: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    /// Check whether the site lies inside the map rectangle
    #[inline]
    pub fn is_inside(&self, bounds: &Rect) -> bool {
        bounds.contains_point(self.position)
    }

    #[inline]
    pub fn is_neighbor_of(&self, other: CenterId) -> bool {
        self.neighbors.contains(&other)
    }
}

/// A polygon vertex: the circumcenter of one Delaunay triangle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Corner {
    pub id: CornerId,
    pub position: DVec2,

    pub water: bool,
    pub ocean: bool,
    pub coast: bool,
    /// Lies outside the map rectangle
    pub border: bool,

    pub elevation: f64,
    pub moisture: f64,
    /// Number of river steps that passed through this corner
    pub river_volume: f64,
    /// Lowest neighboring corner; may be this corner itself at a local minimum
    pub downslope: Option<CornerId>,

    /// The three sites of the triangle this corner was built from
    pub centers: Vec<CenterId>,
    /// Voronoi edges ending at this corner
    pub edges: Vec<EdgeId>,
    /// Corners joined to this one by an edge
    pub neighbors: Vec<CornerId>,
}

impl Corner {
    pub fn new(id: CornerId, position: DVec2) -> Self {
        Self {
            id,
            position,
            water: false,
            ocean: false,
            coast: false,
            border: false,
            elevation: 0.0,
            moisture: 0.0,
            river_volume: 0.0,
            downslope: None,
            centers: Vec::new(),
            edges: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    #[inline]
    pub fn is_inside(&self, bounds: &Rect) -> bool {
        bounds.contains_point(self.position)
    }
}

/// The boundary shared by two centers
///
/// `d0`/`d1` are the Delaunay edge endpoints, `v0`/`v1` the Voronoi edge
/// endpoints. A hull edge belongs to a single triangle and keeps `v1` unset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub d0: CenterId,
    pub d1: CenterId,
    pub v0: Option<CornerId>,
    pub v1: Option<CornerId>,
    /// Number of river steps that flowed along this edge
    pub river_volume: f64,
}

impl Edge {
    pub fn new(id: EdgeId, d0: CenterId, d1: CenterId) -> Self {
        Self {
            id,
            d0,
            d1,
            v0: None,
            v1: None,
            river_volume: 0.0,
        }
    }

    /// The center on the other side of this edge from `center`
    pub fn opposite_center(&self, center: CenterId) -> Option<CenterId> {
        if self.d0 == center {
            Some(self.d1)
        } else if self.d1 == center {
            Some(self.d0)
        } else {
            None
        }
    }

    /// The corner at the other end of this edge from `corner`
    ///
    /// `None` if `corner` is not an endpoint or the other endpoint is unset.
    pub fn opposite_corner(&self, corner: CornerId) -> Option<CornerId> {
        if self.v0 == Some(corner) {
            self.v1
        } else if self.v1 == Some(corner) {
            self.v0
        } else {
            None
        }
    }

    #[inline]
    pub fn joins_centers(&self, a: CenterId, b: CenterId) -> bool {
        (self.d0 == a && self.d1 == b) || (self.d0 == b && self.d1 == a)
    }

    #[inline]
    pub fn joins_corners(&self, a: CornerId, b: CornerId) -> bool {
        (self.v0 == Some(a) && self.v1 == Some(b)) || (self.v0 == Some(b) && self.v1 == Some(a))
    }
}

/// The center/corner/edge arenas
///
/// Built once by the dual graph builder, mutated in place by the terrain
/// passes, then read-only.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Graph {
    centers: Vec<Center>,
    corners: Vec<Corner>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    #[inline]
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn centers_mut(&mut self) -> &mut [Center] {
        &mut self.centers
    }

    pub(crate) fn corners_mut(&mut self) -> &mut [Corner] {
        &mut self.corners
    }

    #[inline]
    pub fn center(&self, id: CenterId) -> Option<&Center> {
        self.centers.get(id.0)
    }

    #[inline]
    pub fn corner(&self, id: CornerId) -> Option<&Corner> {
        self.corners.get(id.0)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty() && self.corners.is_empty() && self.edges.is_empty()
    }

    /// Drop every entity; nothing survives a rebuild
    pub fn clear(&mut self) {
        self.centers.clear();
        self.corners.clear();
        self.edges.clear();
    }

    pub(crate) fn add_center(&mut self, position: DVec2) -> CenterId {
        let id = CenterId(self.centers.len());
        self.centers.push(Center::new(id, position));
        id
    }

    pub(crate) fn add_corner(&mut self, position: DVec2) -> CornerId {
        let id = CornerId(self.corners.len());
        self.corners.push(Corner::new(id, position));
        id
    }

    pub(crate) fn add_edge(&mut self, d0: CenterId, d1: CenterId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(id, d0, d1));
        id
    }

    /// The edge separating two centers, scanning the first center's edges
    pub fn edge_between_centers(&self, a: CenterId, b: CenterId) -> Option<EdgeId> {
        self[a]
            .edges
            .iter()
            .copied()
            .find(|&e| self[e].joins_centers(a, b))
    }

    /// The edge joining two corners, scanning the first corner's edges
    pub fn edge_between_corners(&self, a: CornerId, b: CornerId) -> Option<EdgeId> {
        self[a]
            .edges
            .iter()
            .copied()
            .find(|&e| self[e].joins_corners(a, b))
    }

    /// Polygon vertex positions of a center, in winding order
    pub fn polygon(&self, id: CenterId) -> impl Iterator<Item = DVec2> + '_ {
        self[id].corners.iter().map(move |&q| self[q].position)
    }

    /// Bounding box of a center's polygon (its site if it has no corners)
    pub fn center_bounds(&self, id: CenterId) -> Rect {
        let site = self[id].position;
        Rect::enclosing(self.polygon(id)).unwrap_or(Rect::new(site, site))
    }

    /// Exact point-in-polygon test against a center's corner polygon
    pub fn center_contains(&self, id: CenterId, p: DVec2) -> bool {
        let polygon: Vec<DVec2> = self.polygon(id).collect();
        point_in_polygon(&polygon, p)
    }

    /// Corners that are not water
    pub fn land_corners(&self) -> Vec<CornerId> {
        self.corners
            .iter()
            .filter(|q| !q.water)
            .map(|q| q.id)
            .collect()
    }

    /// Water corners that are not ocean
    pub fn lake_corners(&self) -> Vec<CornerId> {
        self.corners
            .iter()
            .filter(|q| q.water && !q.ocean)
            .map(|q| q.id)
            .collect()
    }
}

impl Index<CenterId> for Graph {
    type Output = Center;

    #[inline]
    fn index(&self, id: CenterId) -> &Center {
        &self.centers[id.0]
    }
}

impl IndexMut<CenterId> for Graph {
    #[inline]
    fn index_mut(&mut self, id: CenterId) -> &mut Center {
        &mut self.centers[id.0]
    }
}

impl Index<CornerId> for Graph {
    type Output = Corner;

    #[inline]
    fn index(&self, id: CornerId) -> &Corner {
        &self.corners[id.0]
    }
}

impl IndexMut<CornerId> for Graph {
    #[inline]
    fn index_mut(&mut self, id: CornerId) -> &mut Corner {
        &mut self.corners[id.0]
    }
}

impl Index<EdgeId> for Graph {
    type Output = Edge;

    #[inline]
    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }
}

impl IndexMut<EdgeId> for Graph {
    #[inline]
    fn index_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }
}

/// Even-odd ray casting test
///
/// Points exactly on the boundary may fall on either side.
pub fn point_in_polygon(polygon: &[DVec2], p: DVec2) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
