//! Barycentric coordinate solves (spec §4.1, component C2).
//!
//! These compute the *unclamped* barycentric coordinates of the origin's
//! projection onto a line or a triangle's plane; clamping to the simplex
//! itself is the job of [`super::closest`] (spec §4.2).

use crate::math::{Point, Real};

/// Result of [`bary2`]: `u * a + v * b` is the foot of the perpendicular
/// from the origin onto line `ab`, with `u + v = 1`.
#[derive(Copy, Clone, Debug)]
pub struct Bary2 {
    pub u: Real,
    pub v: Real,
    /// `false` when edge `ab` was degenerate (shorter than `tau`) and the
    /// result fell back to picking whichever endpoint is closer to the
    /// origin.
    pub is_valid: bool,
}

/// Solves for `(u, v)` with `u + v = 1` such that `u*a + v*b` projects the
/// origin onto line `ab`.
pub fn bary2(a: &Point, b: &Point, tau_sq: Real) -> Bary2 {
    let ab = b - a;
    let d = ab.norm_squared();

    if d < tau_sq {
        // Degenerate segment: fall back to whichever endpoint is closer.
        if a.coords.norm_squared() < b.coords.norm_squared() {
            Bary2 { u: 1.0, v: 0.0, is_valid: false }
        } else {
            Bary2 { u: 0.0, v: 1.0, is_valid: false }
        }
    } else {
        let v = -a.coords.dot(&ab) / d;
        let u = 1.0 - v;
        Bary2 { u, v, is_valid: true }
    }
}

/// Result of [`bary3`]: `u*a + v*b + w*c` projects the origin onto the
/// plane of triangle `abc`, with `u + v + w = 1`.
#[derive(Copy, Clone, Debug)]
pub struct Bary3 {
    pub u: Real,
    pub v: Real,
    pub w: Real,
    /// `false` when the triangle was degenerate and the result fell back
    /// to a 2-point solve on its longest edge.
    pub is_valid: bool,
}

/// Solves for `(u, v, w)` with `u + v + w = 1` that project the origin
/// onto the plane of triangle `abc`, using whichever of the two edge pairs
/// emanating from a shared vertex gives the better-conditioned 2x2 Gram
/// matrix (spec §4.1: "choose the longer of edges `ab` and `bc` as the
/// second basis vector").
pub fn bary3(a: &Point, b: &Point, c: &Point, tau_sq: Real) -> Bary3 {
    let ab = b - a;
    let ac = c - a;
    let bc = c - b;

    let d00 = ab.norm_squared();
    let d11 = ac.norm_squared();
    let d22 = bc.norm_squared();

    if d00 <= d22 {
        // Basis (ab, ac) anchored at a: P = a + s*ab + t*ac.
        let d01 = ab.dot(&ac);
        let a_to_origin = -a.coords;
        let d20 = a_to_origin.dot(&ab);
        let d21 = a_to_origin.dot(&ac);
        let det = d00 * d11 - d01 * d01;

        if det.abs() < 1e-12 {
            return degenerate_bary3(a, b, c, d00, d11, d22, tau_sq);
        }

        let s = (d11 * d20 - d01 * d21) / det;
        let t = (d00 * d21 - d01 * d20) / det;
        Bary3 { u: 1.0 - s - t, v: s, w: t, is_valid: true }
    } else {
        // Basis (ca, cb) anchored at c: P = c + s*ca + t*cb.
        let ca = a - c;
        let cb = b - c;
        let d00c = ca.norm_squared();
        let d11c = cb.norm_squared();
        let d01c = ca.dot(&cb);
        let c_to_origin = -c.coords;
        let d20 = c_to_origin.dot(&ca);
        let d21 = c_to_origin.dot(&cb);
        let det = d00c * d11c - d01c * d01c;

        if det.abs() < 1e-12 {
            return degenerate_bary3(a, b, c, d00, d11, d22, tau_sq);
        }

        let s = (d11c * d20 - d01c * d21) / det;
        let t = (d00c * d21 - d01c * d20) / det;
        // P = c + s*ca + t*cb = (s)*a + (t)*b + (1-s-t)*c
        Bary3 { u: s, v: t, w: 1.0 - s - t, is_valid: true }
    }
}

fn degenerate_bary3(
    a: &Point,
    b: &Point,
    c: &Point,
    d00: Real,
    d11: Real,
    d22: Real,
    tau_sq: Real,
) -> Bary3 {
    // Delegate to bary2 on the longest edge, zero-filling the unused
    // coordinate.
    if d00 >= d11 && d00 >= d22 {
        let r = bary2(a, b, tau_sq);
        Bary3 { u: r.u, v: r.v, w: 0.0, is_valid: false }
    } else if d22 >= d00 && d22 >= d11 {
        let r = bary2(b, c, tau_sq);
        Bary3 { u: 0.0, v: r.u, w: r.v, is_valid: false }
    } else {
        let r = bary2(a, c, tau_sq);
        Bary3 { u: r.u, v: 0.0, w: r.v, is_valid: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bary2_midpoint() {
        let a = Point::new(-1.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let r = bary2(&a, &b, 1e-10);
        assert!(r.is_valid);
        assert!((r.u - 0.5).abs() < 1e-6);
        assert!((r.v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn bary2_degenerate() {
        let a = Point::new(1.0, 0.0, 0.0);
        let b = Point::new(1.0 + 1e-8, 0.0, 0.0);
        let r = bary2(&a, &b, 1e-6);
        assert!(!r.is_valid);
    }

    #[test]
    fn bary3_centroid_projects_to_origin() {
        let a = Point::new(-1.0, -1.0, 1.0);
        let b = Point::new(1.0, -1.0, 1.0);
        let c = Point::new(0.0, 1.0, 1.0);
        let r = bary3(&a, &b, &c, 1e-10);
        assert!(r.is_valid);
        let p = a.coords * r.u + b.coords * r.v + c.coords * r.w;
        // The projection of the origin onto the plane z=1 is (0,0,1).
        assert!((p.z - 1.0).abs() < 1e-5);
        assert!(p.x.abs() < 1e-5);
    }
}
