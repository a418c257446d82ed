//! `SimplexPoint`, the `(y, p, q)` triple spec §3 describes: `p` a support
//! on shape A (in A's space), `q` a support on shape B (in A's space), and
//! `y = p - q` the associated Minkowski-difference point.
//!
//! Named `CSOPoint` (Configuration-Space-Obstacle point) to match the
//! teacher's naming (`examples/Johannes0021-parry/src/query/gjk/gjk.rs`
//! imports `crate::query::gjk::CSOPoint` and calls
//! `CSOPoint::from_shapes(pos12, g1, g2, &dir)`).

use std::ops::{Add, Sub};

use crate::math::{Isometry, Point, Vector};
use crate::shape::SupportMap;

/// One vertex of a GJK/EPA simplex: the Minkowski-difference point `point`
/// together with the two shape-local supports it came from.
///
/// Invariant (spec §3): whenever this point was produced by
/// [`CSOPoint::from_shapes`], `point = orig1 - orig2` exactly. Ray-cast and
/// shape-cast variants instead recompute `point` from a moving virtual
/// origin each iteration while keeping `orig1`/`orig2` as the raw supports
/// — see [`CSOPoint::translate`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CSOPoint {
    /// The Minkowski-difference point, in A's local space.
    pub point: Point,
    /// The support on shape A that produced `point` (A's local space).
    pub orig1: Point,
    /// The support on shape B that produced `point` (A's local space).
    pub orig2: Point,
}

impl CSOPoint {
    /// A CSO point at the local origin, used only to give `Simplex`/
    /// `VoronoiSimplex`-style containers a cheap `Default`.
    pub fn origin() -> Self {
        CSOPoint {
            point: Point::origin(),
            orig1: Point::origin(),
            orig2: Point::origin(),
        }
    }

    /// A CSO point that does not correspond to any real support pair
    /// (used by ray-cast's "last chance" fallback, where the projected
    /// point itself is treated as a valid witness).
    pub fn single_point(point: Point) -> Self {
        CSOPoint {
            point,
            orig1: point,
            orig2: Point::origin(),
        }
    }

    /// Builds the CSO point `support_a(dir) - support_b(pos12 * -dir)`,
    /// both expressed in A's local space.
    pub fn from_shapes<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dir: &Vector) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let orig1 = g1.local_support_point(dir);
        let orig2 = g2.support_point(pos12, &-dir);
        CSOPoint {
            point: orig1 - orig2.coords,
            orig1,
            orig2,
        }
    }

    /// Builds the CSO point `g1.local_support_point(dir) -
    /// g2.local_support_point(-dir)`, with both supports already in a
    /// shared frame (no relative pose applied). Used by the ray-cast and
    /// shape-cast variants of GJK, which thread the relative pose through
    /// a moving virtual origin instead of through the supports themselves.
    pub fn from_support_pair<G1, G2>(g1: &G1, g2: &G2, dir: &Vector) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let orig1 = g1.local_support_point(dir);
        let orig2 = g2.local_support_point(&-dir);
        CSOPoint {
            point: orig1 - orig2.coords,
            orig1,
            orig2,
        }
    }

    /// Returns a copy of this point translated by `shift` (used when the
    /// ray-cast origin advances, spec §4.5: "reset `x`").
    pub fn translate(&self, shift: &Vector) -> Self {
        CSOPoint {
            point: self.point + *shift,
            orig1: self.orig1,
            orig2: self.orig2,
        }
    }

    /// In-place version of [`CSOPoint::translate`].
    pub fn translate_mut(&mut self, shift: &Vector) {
        self.point += *shift;
    }
}

impl Sub for CSOPoint {
    type Output = Vector;

    fn sub(self, rhs: CSOPoint) -> Vector {
        self.point - rhs.point
    }
}

impl Add<Vector> for CSOPoint {
    type Output = CSOPoint;

    fn add(self, rhs: Vector) -> CSOPoint {
        self.translate(&rhs)
    }
}
