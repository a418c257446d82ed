//! The non-raw support-function variants of spec §4.3: transformed,
//! convex-radius-inflated and point supports. Raw shape supports are
//! provided by shape adapters outside this crate.

use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::SupportMap;

/// Wraps a support function so that its direction/result pass through a
/// rigid transform: `getSupport(d) = pose * inner.getSupport(inverse(pose) * d)`.
///
/// Grounded on the `pos12`-threading convention used throughout the
/// teacher's GJK code (`CSOPoint::from_shapes(pos12, g1, g2, &dir)`); this
/// type makes that transform explicit and reusable outside of GJK itself
/// (the EPA penetration step needs to re-wrap shape A with its world pose
/// before calling into EPA, spec §4.9 step 4).
#[derive(Clone, Copy, Debug)]
pub struct TransformedSupport<S> {
    pose: Isometry,
    inner: S,
}

impl<S> TransformedSupport<S> {
    pub fn new(pose: Isometry, inner: S) -> Self {
        Self { pose, inner }
    }

    /// Rebinds the wrapped pose without reallocating, matching spec §4.3's
    /// "these wrappers never allocate after construction; `set...`
    /// functions rebind them".
    pub fn set_pose(&mut self, pose: Isometry) {
        self.pose = pose;
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SupportMap> SupportMap for TransformedSupport<S> {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let local_dir = self.pose.inverse_transform_vector(dir);
        self.pose * self.inner.local_support_point(&local_dir)
    }

    fn convex_radius(&self) -> Real {
        self.inner.convex_radius()
    }
}

/// `getSupport(d) = inner.getSupport(d) + r * d / |d|`.
///
/// Used to switch a support from `EXCLUDE_CONVEX_RADIUS` to
/// `INCLUDE_CONVEX_RADIUS` mode just before handing it to EPA (spec §4.8:
/// "the supports must already include the convex radius").
#[derive(Clone, Copy, Debug)]
pub struct AddConvexRadiusSupport<S> {
    inner: S,
    radius: Real,
}

impl<S> AddConvexRadiusSupport<S> {
    pub fn new(inner: S, radius: Real) -> Self {
        Self { inner, radius }
    }

    pub fn set_radius(&mut self, radius: Real) {
        self.radius = radius;
    }
}

impl<S: SupportMap> SupportMap for AddConvexRadiusSupport<S> {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let base = self.inner.local_support_point(dir);
        let len = dir.norm();
        if len > crate::math::DEFAULT_EPSILON {
            base + dir * (self.radius / len)
        } else {
            base
        }
    }

    fn convex_radius(&self) -> Real {
        self.inner.convex_radius() + self.radius
    }
}

/// A fixed point, independent of direction. Used by `collidePointVsShape`'s
/// point-in-shape query (spec §4.3 variant 4) — GJK/EPA see it as a
/// zero-radius convex set with a single support point.
#[derive(Clone, Copy, Debug)]
pub struct PointSupport {
    point: Point,
}

impl PointSupport {
    pub fn new(point: Point) -> Self {
        Self { point }
    }

    pub fn set_point(&mut self, point: Point) {
        self.point = point;
    }
}

impl SupportMap for PointSupport {
    fn local_support_point(&self, _dir: &Vector) -> Point {
        self.point
    }

    fn convex_radius(&self) -> Real {
        0.0
    }
}
