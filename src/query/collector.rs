//! Collectors and the early-out protocol (spec §4.11, component C9).
//!
//! Grounded on the teacher's visitor/collector convention
//! (`examples/Johannes0021-parry/src/query/visitors/ray_intersections_visitor.rs`
//! drives a callback per candidate and lets it decide whether to keep
//! going); generalised here into the three named flavours spec §4.11
//! tabulates (All / Any / Closest) plus the bidirectional-dispatch
//! inverter.

use crate::math::Real;
use crate::query::results::{BodyId, CastShapeHit, CollidePointHit, CollideShapeHit};

/// Upper bound on the fraction/negative-penetration a hit must beat to be
/// worth reporting (spec §3 `Collectors`, §4.11).
pub const INITIAL_EARLY_OUT_FRACTION: Real = 1.0 + 1e-4;
pub const SHOULD_EARLY_OUT_FRACTION: Real = 0.0;

/// Common collector capability (spec §4.11): `earlyOutFraction` bounds
/// which further hits are worth computing at all; `add_hit` decides
/// retention per the query-type convention in spec §4.11's table.
pub trait Collector<H> {
    fn early_out_fraction(&self) -> Real;
    fn add_hit(&mut self, hit: H);
    fn should_early_out(&self) -> bool {
        self.early_out_fraction() <= SHOULD_EARLY_OUT_FRACTION
    }
}

/// Collects every cast hit into a pooled list; never narrows
/// `earlyOutFraction` (spec §4.11 "Cast ray/shape, All").
#[derive(Default)]
pub struct CastAllCollector {
    pub hits: Vec<CastShapeHit>,
}

impl Collector<CastShapeHit> for CastAllCollector {
    fn early_out_fraction(&self) -> Real {
        INITIAL_EARLY_OUT_FRACTION
    }

    fn add_hit(&mut self, hit: CastShapeHit) {
        self.hits.push(hit);
    }
}

/// Captures the first cast hit, then signals early-out (spec §4.11 "Cast
/// ray/shape, Any").
pub struct CastAnyCollector {
    pub hit: Option<CastShapeHit>,
    early_out: Real,
}

impl Default for CastAnyCollector {
    fn default() -> Self {
        CastAnyCollector { hit: None, early_out: INITIAL_EARLY_OUT_FRACTION }
    }
}

impl Collector<CastShapeHit> for CastAnyCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CastShapeHit) {
        self.hit = Some(hit);
        self.early_out = SHOULD_EARLY_OUT_FRACTION;
    }
}

/// Retains the hit with the smallest `fraction` (spec §4.11 "Cast
/// ray/shape, Closest").
pub struct CastClosestCollector {
    pub hit: Option<CastShapeHit>,
    early_out: Real,
}

impl Default for CastClosestCollector {
    fn default() -> Self {
        CastClosestCollector { hit: None, early_out: INITIAL_EARLY_OUT_FRACTION }
    }
}

impl Collector<CastShapeHit> for CastClosestCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CastShapeHit) {
        if hit.fraction < self.early_out {
            self.early_out = hit.fraction;
            self.hit = Some(hit);
        }
    }
}

/// Collects every overlap hit into a pooled list (spec §4.11 "Collide
/// shape, All").
#[derive(Default)]
pub struct CollideAllCollector {
    pub hits: Vec<CollideShapeHit>,
}

impl Collector<CollideShapeHit> for CollideAllCollector {
    fn early_out_fraction(&self) -> Real {
        Real::MAX
    }

    fn add_hit(&mut self, hit: CollideShapeHit) {
        self.hits.push(hit);
    }
}

/// Captures the first overlap hit, then signals early-out (spec §4.11
/// "Collide shape, Any").
pub struct CollideAnyCollector {
    pub hit: Option<CollideShapeHit>,
    early_out: Real,
}

impl Default for CollideAnyCollector {
    fn default() -> Self {
        CollideAnyCollector { hit: None, early_out: Real::MAX }
    }
}

impl Collector<CollideShapeHit> for CollideAnyCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CollideShapeHit) {
        self.hit = Some(hit);
        self.early_out = SHOULD_EARLY_OUT_FRACTION;
    }
}

/// Retains the hit with the largest penetration (spec §4.11 "Collide
/// shape, Closest"). `earlyOutFraction` here tracks `-penetration`, so a
/// deeper hit (larger `penetration`) always beats a shallower one.
pub struct CollideClosestCollector {
    pub hit: Option<CollideShapeHit>,
    early_out: Real,
}

impl Default for CollideClosestCollector {
    fn default() -> Self {
        CollideClosestCollector { hit: None, early_out: Real::MAX }
    }
}

impl Collector<CollideShapeHit> for CollideClosestCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CollideShapeHit) {
        if hit.penetration > -self.early_out {
            self.early_out = -hit.penetration;
            self.hit = Some(hit);
        }
    }
}

/// Collects every point-containment hit into a pooled list (spec §4.11
/// "Collide point", "same as collide shape"): mirrors [`CollideAllCollector`].
#[derive(Default)]
pub struct CollidePointAllCollector {
    pub hits: Vec<CollidePointHit>,
}

impl Collector<CollidePointHit> for CollidePointAllCollector {
    fn early_out_fraction(&self) -> Real {
        Real::MAX
    }

    fn add_hit(&mut self, hit: CollidePointHit) {
        self.hits.push(hit);
    }
}

/// Captures the first point-containment hit, then signals early-out (spec
/// §4.11 "Collide point", "same as collide shape").
pub struct CollidePointAnyCollector {
    pub hit: Option<CollidePointHit>,
    early_out: Real,
}

impl Default for CollidePointAnyCollector {
    fn default() -> Self {
        CollidePointAnyCollector { hit: None, early_out: Real::MAX }
    }
}

impl Collector<CollidePointHit> for CollidePointAnyCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CollidePointHit) {
        self.hit = Some(hit);
        self.early_out = SHOULD_EARLY_OUT_FRACTION;
    }
}

/// Retains a single point-containment hit (spec §4.11 "Collide point",
/// "same as collide shape"). Unlike [`CollideClosestCollector`],
/// [`CollidePointHit`] carries no penetration-like field to rank hits by —
/// a point is either inside a given sub-shape or it isn't, there is no
/// "closer" containment to prefer — so this keeps the first hit found and,
/// like [`CollidePointAnyCollector`], signals early-out once one is found.
pub struct CollidePointClosestCollector {
    pub hit: Option<CollidePointHit>,
    early_out: Real,
}

impl Default for CollidePointClosestCollector {
    fn default() -> Self {
        CollidePointClosestCollector { hit: None, early_out: Real::MAX }
    }
}

impl Collector<CollidePointHit> for CollidePointClosestCollector {
    fn early_out_fraction(&self) -> Real {
        self.early_out
    }

    fn add_hit(&mut self, hit: CollidePointHit) {
        if self.hit.is_none() {
            self.hit = Some(hit);
            self.early_out = SHOULD_EARLY_OUT_FRACTION;
        }
    }
}

/// Decorates an underlying collector for bidirectional dispatch (spec
/// §4.10 "Result inversion"): swaps `pointA`/`pointB`, negates
/// `penetrationAxis`/`normal`, swaps sub-shape IDs/material IDs/faces,
/// then forwards. `bodyIdB` is not swapped — per spec §4.11 it is a
/// property the collector's owner set up front for this query, not a
/// per-hit value derived from whichever shape happened to play the
/// dispatch table's "B" role internally, so it is supplied directly at
/// construction time and passed through unchanged.
pub struct InvertedCastCollector<'a, C: ?Sized> {
    inner: &'a mut C,
    body_id_b: BodyId,
}

impl<'a, C: ?Sized> InvertedCastCollector<'a, C> {
    pub fn new(inner: &'a mut C, body_id_b: BodyId) -> Self {
        InvertedCastCollector { inner, body_id_b }
    }
}

impl<'a, C: ?Sized + Collector<CastShapeHit>> Collector<CastShapeHit> for InvertedCastCollector<'a, C> {
    fn early_out_fraction(&self) -> Real {
        self.inner.early_out_fraction()
    }

    fn add_hit(&mut self, hit: CastShapeHit) {
        self.inner.add_hit(CastShapeHit {
            fraction: hit.fraction,
            point_a: hit.point_b,
            point_b: hit.point_a,
            penetration_depth: hit.penetration_depth,
            penetration_axis: -hit.penetration_axis,
            normal: -hit.normal,
            sub_shape_id_a: hit.sub_shape_id_b,
            sub_shape_id_b: hit.sub_shape_id_a,
            material_id_a: hit.material_id_b,
            material_id_b: hit.material_id_a,
            face_a: hit.face_b,
            face_b: hit.face_a,
            body_id_b: self.body_id_b,
        });
    }
}

pub struct InvertedCollideCollector<'a, C: ?Sized> {
    inner: &'a mut C,
    body_id_b: BodyId,
}

impl<'a, C: ?Sized> InvertedCollideCollector<'a, C> {
    pub fn new(inner: &'a mut C, body_id_b: BodyId) -> Self {
        InvertedCollideCollector { inner, body_id_b }
    }
}

impl<'a, C: ?Sized + Collector<CollideShapeHit>> Collector<CollideShapeHit> for InvertedCollideCollector<'a, C> {
    fn early_out_fraction(&self) -> Real {
        self.inner.early_out_fraction()
    }

    fn add_hit(&mut self, hit: CollideShapeHit) {
        self.inner.add_hit(CollideShapeHit {
            point_a: hit.point_b,
            point_b: hit.point_a,
            penetration_axis: -hit.penetration_axis,
            penetration: hit.penetration,
            sub_shape_id_a: hit.sub_shape_id_b,
            sub_shape_id_b: hit.sub_shape_id_a,
            material_id_a: hit.material_id_b,
            material_id_b: hit.material_id_a,
            face_a: hit.face_b,
            face_b: hit.face_a,
            body_id_b: self.body_id_b,
        });
    }
}
