//! Closest point on a 1/2/3/4-simplex to the origin (spec §4.2, component
//! C3). These operate purely on positions; [`super::simplex::Simplex`]
//! wires them up to `CSOPoint`s.

use crate::math::{Point, Real};

use super::barycentric::bary2;

/// Closest point on a simplex, together with the subset of input vertices
/// whose Voronoi region contains it. Bit `i` of `point_set` is set iff
/// input vertex `i` contributes to `point`.
#[derive(Copy, Clone, Debug)]
pub struct ClosestPointResult {
    pub point: Point,
    pub point_set: u8,
}

/// Closest point on segment `ab` to the origin (spec §4.2).
pub fn closest_on_line(a: &Point, b: &Point, tau_sq: Real) -> ClosestPointResult {
    let bary = bary2(a, b, tau_sq);
    if bary.v <= 0.0 {
        ClosestPointResult { point: *a, point_set: 0b01 }
    } else if bary.u <= 0.0 {
        ClosestPointResult { point: *b, point_set: 0b10 }
    } else {
        ClosestPointResult {
            point: Point::from(a.coords * bary.u + b.coords * bary.v),
            point_set: 0b11,
        }
    }
}

/// Closest point on triangle `abc` to the origin, using Ericson's
/// Voronoi-region test (spec §4.2).
///
/// `must_include_c` is honoured only along the degenerate-triangle
/// fallback path: when the triangle's normal is numerically zero, vertex
/// A, vertex B and edge AB are excluded from the candidate set, forcing
/// the result to involve `c` (the vertex the caller just added to the
/// simplex).
pub fn closest_on_triangle(
    a: &Point,
    b: &Point,
    c: &Point,
    must_include_c: bool,
    tau_sq: Real,
) -> ClosestPointResult {
    // Stable plane normal: pick the two shortest edges for the cross
    // product, independent of Ericson's own vertex/edge tests below (the
    // magnitude of the normal, which is all that matters here, does not
    // depend on vertex order).
    let ac2 = (c - a).norm_squared();
    let bc2 = (c - b).norm_squared();
    let (pa, pb, pc) = if bc2 < ac2 { (c, b, a) } else { (a, b, c) };
    let n = (pb - pa).cross(&(pc - pa));

    if n.norm_squared() < 1e-10 {
        return degenerate_triangle(a, b, c, must_include_c, tau_sq);
    }

    // Ericson, "Real-Time Collision Detection", closest point on triangle
    // to a point (here, the origin).
    let ab = b - a;
    let ac = c - a;
    let ap = -a.coords;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return ClosestPointResult { point: *a, point_set: 0b001 };
    }

    let bp = -b.coords;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return ClosestPointResult { point: *b, point_set: 0b010 };
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return ClosestPointResult {
            point: a + ab * v,
            point_set: 0b011,
        };
    }

    let cp = -c.coords;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return ClosestPointResult { point: *c, point_set: 0b100 };
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return ClosestPointResult {
            point: a + ac * w,
            point_set: 0b101,
        };
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return ClosestPointResult {
            point: b + (c - b) * w,
            point_set: 0b110,
        };
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    ClosestPointResult {
        point: a + ab * v + ac * w,
        point_set: 0b111,
    }
}

fn degenerate_triangle(
    a: &Point,
    b: &Point,
    c: &Point,
    must_include_c: bool,
    tau_sq: Real,
) -> ClosestPointResult {
    let mut best: Option<ClosestPointResult> = None;
    let mut consider = |candidate: ClosestPointResult| {
        let d2 = candidate.point.coords.norm_squared();
        if best.map_or(true, |b: ClosestPointResult| {
            d2 < b.point.coords.norm_squared()
        }) {
            best = Some(candidate);
        }
    };

    if !must_include_c {
        consider(ClosestPointResult { point: *a, point_set: 0b001 });
        consider(ClosestPointResult { point: *b, point_set: 0b010 });
        let ab = closest_on_line(a, b, tau_sq);
        consider(ClosestPointResult {
            point: ab.point,
            point_set: remap_edge_mask(ab.point_set, 0, 1),
        });
    }

    consider(ClosestPointResult { point: *c, point_set: 0b100 });
    let ac = closest_on_line(a, c, tau_sq);
    consider(ClosestPointResult {
        point: ac.point,
        point_set: remap_edge_mask(ac.point_set, 0, 2),
    });
    let bc = closest_on_line(b, c, tau_sq);
    consider(ClosestPointResult {
        point: bc.point,
        point_set: remap_edge_mask(bc.point_set, 1, 2),
    });

    best.expect("degenerate_triangle always has at least the C candidate")
}

fn remap_edge_mask(local_mask: u8, idx0: u8, idx1: u8) -> u8 {
    let mut out = 0u8;
    if local_mask & 0b01 != 0 {
        out |= 1 << idx0;
    }
    if local_mask & 0b10 != 0 {
        out |= 1 << idx1;
    }
    out
}

/// Which of the tetrahedron's four faces are flagged as facing away from
/// the origin (spec §4.2's `isOriginOutsideOfTrianglePlanes`). Index `i`
/// corresponds to the face opposite vertex `i` of `(a, b, c, d)`.
fn is_origin_outside_of_triangle_planes(a: &Point, b: &Point, c: &Point, d: &Point, tau: Real) -> [bool; 4] {
    // Face i is the triangle on the three vertices other than i; `opp` is
    // vertex i itself.
    let faces: [(&Point, &Point, &Point, &Point); 4] = [
        (b, c, d, a), // face opposite A
        (a, c, d, b), // face opposite B
        (a, b, d, c), // face opposite C
        (a, b, c, d), // face opposite D
    ];

    let mut d_origin = [0.0 as Real; 4];
    let mut d_opp = [0.0 as Real; 4];

    for (i, (p0, p1, p2, opp)) in faces.iter().enumerate() {
        let n = (**p1 - **p0).cross(&(**p2 - **p0));
        d_origin[i] = n.dot(&(-p0.coords));
        d_opp[i] = n.dot(&(**opp - **p0));
    }

    let all_negative = d_opp.iter().all(|v| *v <= 0.0);
    let all_positive = d_opp.iter().all(|v| *v >= 0.0);

    let mut outside = [false; 4];
    if all_negative || all_positive {
        // Consistent winding: the opposite vertex lies strictly on one
        // side of every face. The origin is "outside" face i when it
        // lies on the other side.
        let sign = if all_negative { 1.0 } else { -1.0 };
        for i in 0..4 {
            outside[i] = d_origin[i] * sign > tau;
        }
    } else {
        // Mixed signs: degenerate tetrahedron. Conservatively treat every
        // face as a candidate (spec §4.2 / §9).
        outside = [true; 4];
    }

    outside
}

/// Closest point on tetrahedron `abcd` to the origin (spec §4.2).
///
/// `must_include_d` forces the three faces containing `d` to treat `d` as
/// the vertex that must not be excluded by their degenerate-triangle
/// fallback (mirroring `closest_on_triangle`'s `must_include_c`); the face
/// `abc` (opposite `d`) never includes `d` and always passes
/// `must_include_c = false`.
pub fn closest_on_tetrahedron(
    a: &Point,
    b: &Point,
    c: &Point,
    d: &Point,
    must_include_d: bool,
    tau: Real,
) -> ClosestPointResult {
    let outside = is_origin_outside_of_triangle_planes(a, b, c, d, tau);
    let tau_sq = tau * tau;

    // Each face is reordered so that `d` (when present) is always the
    // local third vertex, letting `must_include_c` double as
    // `must_include_d` uniformly across the three faces that contain it.
    let candidates: [(bool, &Point, &Point, &Point, bool, [u8; 3]); 4] = [
        (outside[3], a, b, c, false, [0, 1, 2]),       // face ABC, opposite D
        (outside[1], a, c, d, must_include_d, [0, 2, 3]), // face ACD, opposite B
        (outside[2], a, b, d, must_include_d, [0, 1, 3]), // face ABD, opposite C
        (outside[0], b, c, d, must_include_d, [1, 2, 3]), // face BCD, opposite A
    ];

    let mut best: Option<ClosestPointResult> = None;

    for (is_outside, p0, p1, p2, must_c, remap) in candidates {
        if !is_outside {
            continue;
        }
        let local = closest_on_triangle(p0, p1, p2, must_c, tau_sq);
        let global_mask = remap_triangle_mask(local.point_set, remap);
        let d2 = local.point.coords.norm_squared();
        if best.map_or(true, |b: ClosestPointResult| {
            d2 < b.point.coords.norm_squared()
        }) {
            best = Some(ClosestPointResult {
                point: local.point,
                point_set: global_mask,
            });
        }
    }

    best.unwrap_or(ClosestPointResult { point: *a, point_set: 0b0001 })
}

fn remap_triangle_mask(local_mask: u8, remap: [u8; 3]) -> u8 {
    let mut out = 0u8;
    for i in 0..3 {
        if local_mask & (1 << i) != 0 {
            out |= 1 << remap[i];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_on_line_interior() {
        let a = Point::new(-1.0, 1.0, 0.0);
        let b = Point::new(1.0, 1.0, 0.0);
        let r = closest_on_line(&a, &b, 1e-10);
        assert_eq!(r.point_set, 0b11);
        assert!((r.point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn closest_on_line_endpoint() {
        let a = Point::new(1.0, 1.0, 0.0);
        let b = Point::new(2.0, 3.0, 0.0);
        let r = closest_on_line(&a, &b, 1e-10);
        assert_eq!(r.point_set, 0b01);
        assert_eq!(r.point, a);
    }

    #[test]
    fn closest_on_triangle_interior() {
        let a = Point::new(-1.0, -1.0, 1.0);
        let b = Point::new(1.0, -1.0, 1.0);
        let c = Point::new(0.0, 1.0, 1.0);
        let r = closest_on_triangle(&a, &b, &c, false, 1e-10);
        assert_eq!(r.point_set, 0b111);
        assert!((r.point.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn closest_on_triangle_vertex() {
        let a = Point::new(1.0, 1.0, 1.0);
        let b = Point::new(2.0, 2.0, 1.0);
        let c = Point::new(3.0, 1.0, 1.0);
        let r = closest_on_triangle(&a, &b, &c, false, 1e-10);
        assert_eq!(r.point_set, 0b001);
        assert_eq!(r.point, a);
    }

    #[test]
    fn closest_on_tetrahedron_contains_origin() {
        let a = Point::new(1.0, 1.0, 1.0);
        let b = Point::new(-1.0, 1.0, -1.0);
        let c = Point::new(-1.0, -1.0, 1.0);
        let d = Point::new(1.0, -1.0, -1.0);
        let outside = is_origin_outside_of_triangle_planes(&a, &b, &c, &d, 1e-5);
        assert!(outside.iter().all(|o| !o));
    }
}
