//! `EpaTriangle`, `EpaEdge` and `EpaSupportPoints` (spec §3 "EPA Triangle" /
//! "EpaSupportPoints", component C6).
//!
//! Grounded on the teacher's 2-D `Face` (`examples/Johannes0021-parry/src/
//! query/epa/epa2.rs`): a polytope face storing its vertex indices, an
//! outward normal and the closest-point barycentric coordinates needed to
//! reconstruct contact points later. Generalised here to a 3-D triangle
//! with three edges and neighbour back-links, since a 3-D hull (unlike the
//! 2-D polygon) needs a full adjacency graph to drive the silhouette walk
//! in [`super::hull::EpaHull::add_point`].

use crate::math::{Point, Real, Vector};

/// Hard caps on EPA's scratch state (spec §3, §6).
pub const EPA_MAX_POINTS: usize = 128;
pub const EPA_MAX_POINTS_TO_INCLUDE_ORIGIN_IN_HULL: usize = 32;
pub const EPA_MAX_TRIANGLES: usize = 256;
pub const EPA_MAX_EDGE_LENGTH: usize = 128;
pub const EPA_MIN_TRIANGLE_AREA: Real = 1e-10;
pub const EPA_BARYCENTRIC_EPSILON: Real = 1e-3;

/// Three parallel growable arrays `y[]`, `p[]`, `q[]` (spec §3
/// "EpaSupportPoints"), indexed by a common integer: `y[i] = p[i] - q[i]` is
/// the Minkowski-difference point, `p[i]`/`q[i]` are the raw supports on A
/// and B it came from (both expressed in A's local space).
#[derive(Clone, Debug, Default)]
pub struct EpaSupportPoints {
    pub y: Vec<Point>,
    pub p: Vec<Point>,
    pub q: Vec<Point>,
}

impl EpaSupportPoints {
    pub fn new() -> Self {
        EpaSupportPoints {
            y: Vec::with_capacity(EPA_MAX_POINTS),
            p: Vec::with_capacity(EPA_MAX_POINTS),
            q: Vec::with_capacity(EPA_MAX_POINTS),
        }
    }

    pub fn clear(&mut self) {
        self.y.clear();
        self.p.clear();
        self.q.clear();
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Appends a support pair, returning its index. Returns `None` once
    /// `EPA_MAX_POINTS` is reached (spec §3: "hard cap during expansion").
    pub fn push(&mut self, p: Point, q: Point) -> Option<usize> {
        if self.y.len() >= EPA_MAX_POINTS {
            return None;
        }
        let idx = self.y.len();
        self.y.push(p - q.coords);
        self.p.push(p);
        self.q.push(q);
        Some(idx)
    }
}

/// One directed edge of an [`EpaTriangle`]: `startIndex` is the support
/// point this edge originates from (the edge runs to the triangle's next
/// vertex in winding order); `neighbour_triangle`/`neighbour_edge` are the
/// back-link to whichever triangle shares this edge on its other side.
#[derive(Copy, Clone, Debug)]
pub struct EpaEdge {
    pub start_index: usize,
    pub neighbour_triangle: usize,
    pub neighbour_edge: u8,
}

/// Which vertex an [`EpaTriangle`]'s stored barycentric `lambda` is anchored
/// to (spec §4.8 Phase 5: "referenced either to vertex 0 ... or vertex 1").
/// Kept as an explicit enum (rather than a `lambdaRelativeTo0` bool) so the
/// two branches of [`EpaTriangle::contact_barycentric`] read as named cases.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LambdaAnchor {
    Vertex0,
    Vertex1,
}

/// A face of the current Minkowski-difference polytope (spec §3 "EPA
/// Triangle"). Lives in an [`super::hull::EpaHull`]'s pool and is addressed
/// by index rather than by owning pointer, matching the teacher's
/// pool-by-`Vec` convention for faces/triangles (also see `utils::SortedPair`
/// style index-based adjacency elsewhere in the teacher crate).
#[derive(Copy, Clone, Debug)]
pub struct EpaTriangle {
    pub edges: [EpaEdge; 3],
    /// Outward-from-origin normal, left unnormalised (spec §3).
    pub normal: Vector,
    pub centroid: Point,
    /// Signed squared distance from the origin to this triangle's plane,
    /// with `sign(centroid . normal)` preserved: negative when the
    /// triangle faces the origin.
    pub closest_length_sq: Real,
    pub lambda: [Real; 2],
    pub lambda_anchor: LambdaAnchor,
    pub closest_point_interior: bool,
    pub removed: bool,
    pub in_queue: bool,
    pub index: usize,
}

impl EpaTriangle {
    /// Builds a triangle over support points `i, j, k` (in that winding
    /// order) and fills every derived field (spec §4.7 `createTriangle`).
    pub fn new(index: usize, i: usize, j: usize, k: usize, points: &EpaSupportPoints) -> Self {
        let y0 = points.y[i];
        let y1 = points.y[j];
        let y2 = points.y[k];

        let centroid = Point::from((y0.coords + y1.coords + y2.coords) / 3.0);
        let normal = stable_triangle_normal(&y0, &y1, &y2);

        let n_sq = normal.norm_squared();
        let c_dot_n = centroid.coords.dot(&normal);
        let closest_length_sq = if n_sq > 0.0 {
            c_dot_n.signum() * (c_dot_n * c_dot_n) / n_sq
        } else {
            0.0
        };

        let (lambda, lambda_anchor, closest_point_interior) = contact_barycentric(&y0, &y1, &y2);

        EpaTriangle {
            edges: [
                EpaEdge { start_index: i, neighbour_triangle: usize::MAX, neighbour_edge: 0 },
                EpaEdge { start_index: j, neighbour_triangle: usize::MAX, neighbour_edge: 0 },
                EpaEdge { start_index: k, neighbour_triangle: usize::MAX, neighbour_edge: 0 },
            ],
            normal,
            centroid,
            closest_length_sq,
            lambda,
            lambda_anchor,
            closest_point_interior,
            removed: false,
            in_queue: false,
            index,
        }
    }

    pub fn vertex(&self, local: usize) -> usize {
        self.edges[local].start_index
    }

    /// Reconstructs the contact points on A and B at this triangle's closest
    /// point, from the stored per-vertex supports and `lambda` (spec §4.8
    /// Phase 5).
    pub fn contact_points(&self, points: &EpaSupportPoints) -> (Point, Point) {
        let i0 = self.vertex(0);
        let i1 = self.vertex(1);
        let i2 = self.vertex(2);

        let blend = |a: &Point, b: &Point, c: &Point| -> Point {
            match self.lambda_anchor {
                LambdaAnchor::Vertex0 => {
                    Point::from(a.coords + (b.coords - a.coords) * self.lambda[0] + (c.coords - a.coords) * self.lambda[1])
                }
                LambdaAnchor::Vertex1 => {
                    Point::from(b.coords + (a.coords - b.coords) * self.lambda[0] + (c.coords - b.coords) * self.lambda[1])
                }
            }
        };

        let contact_a = blend(&points.p[i0], &points.p[i1], &points.p[i2]);
        let contact_b = blend(&points.q[i0], &points.q[i1], &points.q[i2]);
        (contact_a, contact_b)
    }
}

/// Normal of triangle `(y0, y1, y2)`, computed from whichever two of the
/// three edges `y1-y0`, `y2-y0`, `y2-y1` are shortest (spec §4.7
/// `createTriangle`: "whichever branch gives the most stable normal").
/// All three valid pairings are algebraically equal (the triangle's edge
/// vectors sum to zero), so picking the numerically best-conditioned pair
/// never changes the result's sign, only its precision.
fn stable_triangle_normal(y0: &Point, y1: &Point, y2: &Point) -> Vector {
    let y10 = y1 - y0;
    let y20 = y2 - y0;
    let y21 = y2 - y1;

    let d10 = y10.norm_squared();
    let d20 = y20.norm_squared();
    let d21 = y21.norm_squared();

    if d21 >= d10 && d21 >= d20 {
        y10.cross(&y20)
    } else if d20 >= d10 && d20 >= d21 {
        y10.cross(&y21)
    } else {
        y20.cross(&y21)
    }
}

/// Barycentric coordinates of the origin's projection onto triangle
/// `(y0, y1, y2)`'s plane, anchored to whichever of vertex 0 or vertex 1
/// gives the better-conditioned 2x2 solve (spec §4.8 Phase 5). Returns
/// `(lambda, anchor, closest_point_interior)`.
fn contact_barycentric(y0: &Point, y1: &Point, y2: &Point) -> ([Real; 2], LambdaAnchor, bool) {
    let e10 = y1 - y0;
    let e20 = y2 - y0;
    let e21 = y2 - y1;

    let d10 = e10.norm_squared();
    let d21 = e21.norm_squared();

    if d10 >= d21 {
        let d00 = d10;
        let d11 = e20.norm_squared();
        let d01 = e10.dot(&e20);
        let det = d00 * d11 - d01 * d01;

        if det.abs() < 1e-12 {
            return ([0.0, 0.0], LambdaAnchor::Vertex0, false);
        }

        let r0 = -y0.coords.dot(&e10);
        let r1 = -y0.coords.dot(&e20);
        let s = (d11 * r0 - d01 * r1) / det;
        let t = (d00 * r1 - d01 * r0) / det;
        let interior = s >= -EPA_BARYCENTRIC_EPSILON && t >= -EPA_BARYCENTRIC_EPSILON && s + t <= 1.0 + EPA_BARYCENTRIC_EPSILON;
        ([s, t], LambdaAnchor::Vertex0, interior)
    } else {
        let e01 = y0 - y1;
        let d00 = d21;
        let d11 = e01.norm_squared();
        let d01 = e21.dot(&e01);
        let det = d00 * d11 - d01 * d01;

        if det.abs() < 1e-12 {
            return ([0.0, 0.0], LambdaAnchor::Vertex1, false);
        }

        let r0 = -y1.coords.dot(&e21);
        let r1 = -y1.coords.dot(&e01);
        let s = (d11 * r0 - d01 * r1) / det;
        let t = (d00 * r1 - d01 * r0) / det;
        let interior = s >= -EPA_BARYCENTRIC_EPSILON && t >= -EPA_BARYCENTRIC_EPSILON && s + t <= 1.0 + EPA_BARYCENTRIC_EPSILON;
        ([s, t], LambdaAnchor::Vertex1, interior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_facing_origin_has_negative_closest_length_sq() {
        let mut points = EpaSupportPoints::new();
        points.push(Point::new(0.0, 0.0, -1.0), Point::origin()).unwrap();
        points.push(Point::new(1.0, 0.0, 1.0), Point::origin()).unwrap();
        points.push(Point::new(-1.0, 1.0, 1.0), Point::origin()).unwrap();

        let tri = EpaTriangle::new(0, 0, 1, 2, &points);
        assert!(tri.closest_length_sq < 0.0);
    }

    #[test]
    fn contact_points_reproduce_vertex_when_lambda_is_zero() {
        let mut points = EpaSupportPoints::new();
        points.push(Point::new(1.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0)).unwrap();
        points.push(Point::new(0.0, 1.0, 0.0), Point::new(0.0, 2.0, 0.0)).unwrap();
        points.push(Point::new(0.0, 0.0, 1.0), Point::new(0.0, 0.0, 2.0)).unwrap();

        let mut tri = EpaTriangle::new(0, 0, 1, 2, &points);
        tri.lambda = [0.0, 0.0];
        tri.lambda_anchor = LambdaAnchor::Vertex0;
        let (a, b) = tri.contact_points(&points);
        assert_eq!(a, points.p[0]);
        assert_eq!(b, points.q[0]);
    }
}
