//! Delaunay triangulation (Bowyer-Watson)
//!
//! Vertices are inserted in ascending (x, y) order inside a synthetic
//! super-triangle. Sorting lets triangles whose circumcircle lies entirely
//! to the left of the next vertex leave the working set early, which keeps
//! the per-insertion scan short.

use std::collections::BTreeSet;

use glam::DVec2;
use tracing::warn;

use crate::error::MapError;

/// Squared circumradius inflation so near-co-circular points are caught
const RADIUS_INFLATION: f64 = 1.000001;

/// Relative tolerance for collinearity tests
const EPSILON: f64 = 1e-10;

/// Super triangle clearance around the input, as a multiple of its extent
const SUPER_TRIANGLE_MARGIN: f64 = 10.0;

/// A Delaunay triangle with its precomputed circumcircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex indices into [`Triangulation::vertices`]
    pub vertices: [usize; 3],
    /// Circumcenter
    pub center: DVec2,
    /// Squared circumradius (inflated)
    pub radius_squared: f64,
    radius: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[DVec2]) -> Self {
        let (center, radius_squared) =
            circumcircle(points[vertices[0]], points[vertices[1]], points[vertices[2]]);
        let radius_squared = radius_squared * RADIUS_INFLATION;
        Self {
            vertices,
            center,
            radius_squared,
            radius: radius_squared.sqrt(),
        }
    }

    /// Circumcircle contains `p` (boundary included)
    #[inline]
    pub fn encompasses(&self, p: DVec2) -> bool {
        self.center.distance_squared(p) <= self.radius_squared
    }

    /// Circumcircle lies entirely to the left of `p`
    #[inline]
    fn is_left_of(&self, p: DVec2) -> bool {
        p.x > self.center.x + self.radius
    }

    #[inline]
    fn touches_any(&self, first: usize) -> bool {
        self.vertices.iter().any(|&v| v >= first)
    }

    /// Vertex indices in ascending order, the triangle's identity
    pub fn key(&self) -> [usize; 3] {
        let mut key = self.vertices;
        key.sort_unstable();
        key
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [ordered(a, b), ordered(b, c), ordered(c, a)]
    }
}

/// Output of [`triangulate`]
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    /// Input points, deduplicated and sorted by (x, y)
    pub vertices: Vec<DVec2>,
    /// Triangles sorted by their vertex key
    pub triangles: Vec<Triangle>,
}

impl Triangulation {
    /// Positions of a triangle's corners
    pub fn positions(&self, triangle: &Triangle) -> [DVec2; 3] {
        triangle.vertices.map(|v| self.vertices[v])
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Compute the Delaunay triangulation of a point set
///
/// Fewer than three distinct points yield an empty triangulation. Collinear
/// input yields no triangles.
pub fn triangulate(points: &[DVec2]) -> Triangulation {
    let mut vertices: Vec<DVec2> = points.to_vec();
    vertices.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    vertices.dedup();

    if vertices.len() < 3 {
        warn!(error = %MapError::InsufficientPoints { found: vertices.len() }, "empty triangulation");
        return Triangulation {
            vertices,
            triangles: Vec::new(),
        };
    }

    let n = vertices.len();
    let mut points = vertices.clone();
    points.extend(super_triangle(&vertices));

    let mut workset = vec![Triangle::new([n, n + 1, n + 2], &points)];
    let mut output = Vec::new();

    for (idx, &vertex) in vertices.iter().enumerate() {
        workset.retain(|tri| {
            let completed = tri.is_left_of(vertex);
            if completed && !tri.touches_any(n) {
                output.push(*tri);
            }
            !completed
        });

        // Boundary of the cavity: edges owned by exactly one hot triangle
        let mut boundary = BTreeSet::new();
        workset.retain(|tri| {
            let hot = tri.encompasses(vertex);
            if hot {
                for edge in tri.edges() {
                    if !boundary.remove(&edge) {
                        boundary.insert(edge);
                    }
                }
            }
            !hot
        });

        workset.extend(
            boundary
                .into_iter()
                .map(|(a, b)| Triangle::new([a, b, idx], &points)),
        );
    }

    output.extend(workset.into_iter().filter(|tri| !tri.touches_any(n)));

    let before = output.len();
    output.retain(|tri| !is_degenerate(&points, tri));
    if output.len() < before {
        warn!(
            error = %MapError::DegenerateGeometry(format!("{} sliver triangles", before - output.len())),
            "dropped zero-area triangles"
        );
    }

    output.sort_by_key(Triangle::key);
    Triangulation {
        vertices,
        triangles: output,
    }
}

/// Equilateral triangle with horizontal base enclosing the bounding box
/// grown by ten times its size on every side
///
/// Its vertices must stay outside the circumcircles of the hull triangles,
/// otherwise those triangles are discarded with the super triangle.
fn super_triangle(vertices: &[DVec2]) -> [DVec2; 3] {
    let (mut min, mut max) = (vertices[0], vertices[0]);
    for v in vertices {
        min = min.min(*v);
        max = max.max(*v);
    }

    let size = max - min;
    let mut margin = size * SUPER_TRIANGLE_MARGIN;
    if margin.x == 0.0 {
        margin.x = margin.y;
    }
    if margin.y == 0.0 {
        margin.y = margin.x;
    }
    if margin == DVec2::ZERO {
        margin = DVec2::ONE;
    }
    let min = min - margin;
    let max = max + margin;
    let size = max - min;

    let sqrt3 = 3.0_f64.sqrt();
    [
        DVec2::new(min.x - size.y * sqrt3 / 3.0, min.y),
        DVec2::new(max.x + size.y * sqrt3 / 3.0, min.y),
        DVec2::new((min.x + max.x) * 0.5, max.y + size.x * sqrt3 * 0.5),
    ]
}

/// Circumcenter and squared circumradius
///
/// Collinear triples fall back to the circle spanning the two farthest points.
pub fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> (DVec2, f64) {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    let scale = ab.length_squared().max(ac.length_squared());

    if d.abs() <= EPSILON * scale {
        let (p, q) = [(a, b), (b, c), (a, c)]
            .into_iter()
            .max_by(|x, y| x.0.distance_squared(x.1).total_cmp(&y.0.distance_squared(y.1)))
            .unwrap_or((a, b));
        let center = (p + q) * 0.5;
        return (center, center.distance_squared(p));
    }

    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let offset = DVec2::new(ac.y * ab2 - ab.y * ac2, ab.x * ac2 - ac.x * ab2) / d;
    (a + offset, offset.length_squared())
}

fn is_degenerate(points: &[DVec2], tri: &Triangle) -> bool {
    let [a, b, c] = tri.vertices.map(|v| points[v]);
    let ab = b - a;
    let ac = c - a;
    let scale = ab.length_squared().max(ac.length_squared());
    ab.perp_dot(ac).abs() <= EPSILON * scale
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
