//! Narrowphase dispatch (spec §4.10/§4.11/§6, component C11): the
//! per-shape-pair function table, result inversion for bidirectional
//! dispatch, and the four top-level query entry points.
//!
//! No direct teacher file grounds this (parry's `QueryDispatcher` trait
//! lives outside the retrieved fragment); `examples/Johannes0021-parry/src/
//! query/distance/distance_composite_shape_shape.rs`'s
//! `distance_shape_composite_shape` mirror-by-argument-swap function is the
//! grounding for this module's `reversed_*` wrapper convention (swap
//! arguments, wrap the collector, delegate).

use std::collections::HashMap;

use crate::math::{Isometry, Point, Real, Vector};
use crate::query::collector::{Collector, InvertedCastCollector, InvertedCollideCollector};
use crate::query::convex_vs_convex::{aabb_obb_overlap, relative_pose, NarrowphaseContext};
use crate::query::epa::{penetration_depth_step_epa, EpaStatus};
use crate::query::gjk::gjk_cast_ray;
use crate::query::penetration::{penetration_cast_shape, penetration_depth_step_gjk, PenetrationStatus};
use crate::query::results::{CastRayHit, CastShapeHit, CollidePointHit, CollideShapeHit};
use crate::query::settings::{CastRaySettings, CastShapeSettings, CollideShapeSettings};
use crate::shape::{
    AddConvexRadiusSupport, DynShapeAdapter, PointSupport, ShapeType, SupportFunctionMode, SupportMap,
    SupportingFace, TransformedSupport,
};

/// A shape paired with its world pose and scale, the unit the dispatch
/// table and all four top-level query functions operate on (spec §6's
/// unpacked `posX,posY,posZ, qX,qY,qZ,qW, sX,sY,sZ` flattened into the
/// crate's `Isometry`/`Vector` value types).
pub struct PosedShape<'a> {
    pub shape: &'a dyn DynShapeAdapter,
    pub pose: Isometry,
    pub scale: Vector,
    pub sub_shape_id: crate::query::SubShapeId,
    pub body_id: crate::query::BodyId,
}

fn collide_convex_vs_convex_dyn(
    ctx: &mut NarrowphaseContext,
    settings: &CollideShapeSettings,
    a: &PosedShape,
    b: &PosedShape,
    collector: &mut dyn Collector<CollideShapeHit>,
) {
    let pos_b_in_a = relative_pose(&a.pose, &b.pose);

    let half_a = a.shape.local_half_extents(a.scale);
    let half_b = b.shape.local_half_extents(b.scale);
    let center_a = a.shape.local_center_of_mass(a.scale);
    let center_b_in_a = pos_b_in_a * b.shape.local_center_of_mass(b.scale);
    if !aabb_obb_overlap(
        center_a,
        half_a,
        center_b_in_a,
        half_b,
        &pos_b_in_a.rotation,
        settings.max_separation_distance,
    ) {
        return;
    }

    let support_a = a.shape.dyn_support_function(SupportFunctionMode::ExcludeConvexRadius, a.scale);
    let support_b = b.shape.dyn_support_function(SupportFunctionMode::ExcludeConvexRadius, b.scale);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    let translation = pos_b_in_a.translation.vector;
    let direction0 = if translation.norm_squared() > crate::math::DEFAULT_EPSILON {
        translation
    } else {
        Vector::x()
    };

    let r_a = support_a.convex_radius() + settings.max_separation_distance;
    let r_b = support_b_in_a.convex_radius();
    let gjk = penetration_depth_step_gjk(
        &support_a,
        &support_b_in_a,
        r_a,
        r_b,
        direction0,
        settings.collision_tolerance,
        &mut ctx.simplex,
    );

    let (mut point_a, mut point_b, axis) = match gjk.status {
        PenetrationStatus::NotColliding => return,
        PenetrationStatus::Colliding => (gjk.point_a, gjk.point_b, gjk.axis),
        PenetrationStatus::Indeterminate => {
            let support_a_incl = a.shape.dyn_support_function(SupportFunctionMode::IncludeConvexRadius, a.scale);
            let support_b_incl = b.shape.dyn_support_function(SupportFunctionMode::IncludeConvexRadius, b.scale);
            let support_b_incl_in_a = TransformedSupport::new(pos_b_in_a, support_b_incl);
            let margin = settings.max_separation_distance.clamp(0.0, 1.0);
            let inflated_a = AddConvexRadiusSupport::new(support_a_incl, margin);

            let epa = penetration_depth_step_epa(&inflated_a, &support_b_incl_in_a, settings.penetration_tolerance, &ctx.simplex);
            match epa.status {
                EpaStatus::NotColliding => return,
                EpaStatus::Colliding => (epa.point_a, epa.point_b, epa.axis),
            }
        }
    };

    let penetration = (point_b - point_a).norm() - settings.max_separation_distance;
    if -penetration > collector.early_out_fraction() {
        return;
    }

    let axis_len = axis.norm();
    if axis_len > crate::math::DEFAULT_EPSILON {
        point_a -= axis * (settings.max_separation_distance / axis_len);
    }

    let world_point_a = a.pose * point_a;
    let world_point_b = a.pose * point_b;
    let world_axis = a.pose.rotation * axis;

    if !settings.collide_with_backfaces {
        let local_point_b = b.pose.inverse_transform_point(&world_point_b);
        let normal_b = b.pose.rotation * b.shape.surface_normal(&local_point_b);
        if world_axis.dot(&normal_b) > 0.0 {
            return;
        }
    }

    let (face_a, face_b) = if settings.collect_faces && world_axis.norm_squared() > crate::math::DEFAULT_EPSILON {
        let dir = world_axis.normalize();
        (
            a.shape.supporting_face(&dir, &a.pose, a.scale),
            b.shape.supporting_face(&(-dir), &b.pose, b.scale),
        )
    } else {
        (SupportingFace::default(), SupportingFace::default())
    };

    collector.add_hit(CollideShapeHit {
        point_a: world_point_a,
        point_b: world_point_b,
        penetration_axis: world_axis,
        penetration,
        sub_shape_id_a: a.sub_shape_id,
        sub_shape_id_b: b.sub_shape_id,
        material_id_a: a.shape.material_id(),
        material_id_b: b.shape.material_id(),
        face_a,
        face_b,
        body_id_b: b.body_id,
    });
}

fn cast_convex_vs_convex_dyn(
    ctx: &mut NarrowphaseContext,
    settings: &CastShapeSettings,
    a: &PosedShape,
    displacement_world: Vector,
    b: &PosedShape,
    collector: &mut dyn Collector<CastShapeHit>,
) {
    let pos_a_in_b = relative_pose(&b.pose, &a.pose);
    let displacement_in_b = b.pose.rotation.inverse() * displacement_world;
    let max_lambda = collector.early_out_fraction();

    let support_a = a.shape.dyn_support_function(SupportFunctionMode::ExcludeConvexRadius, a.scale);
    let support_b = b.shape.dyn_support_function(SupportFunctionMode::ExcludeConvexRadius, b.scale);
    let r_a = support_a.convex_radius();
    let r_b = support_b.convex_radius();

    let cast = penetration_cast_shape(
        Point::from(pos_a_in_b.translation.vector),
        pos_a_in_b.rotation,
        &support_a,
        &support_b,
        displacement_in_b,
        settings.collision_tolerance,
        settings.penetration_tolerance,
        r_a,
        r_b,
        max_lambda,
        settings.return_deepest_point,
        &mut ctx.simplex,
    );

    if !cast.hit || cast.lambda > 1.0 {
        return;
    }
    if !settings.collide_with_backfaces && cast.separating_axis.dot(&displacement_in_b) <= 0.0 {
        return;
    }
    if cast.lambda >= collector.early_out_fraction() {
        return;
    }

    let world_point_a = b.pose * cast.point_a;
    let world_point_b = b.pose * cast.point_b;
    let world_axis = b.pose.rotation * cast.separating_axis;
    let normal = world_axis
        .try_normalize(crate::math::DEFAULT_EPSILON)
        .map(|n| -n)
        .unwrap_or_else(Vector::zeros);

    let (face_a, face_b) = if settings.collect_faces {
        let local_normal_a = pos_a_in_b.rotation.inverse() * (-cast.separating_axis);
        let pose_a_at_lambda = b.pose
            * Isometry::from_parts(
                (pos_a_in_b.translation.vector + displacement_in_b * cast.lambda).into(),
                pos_a_in_b.rotation,
            );
        (
            a.shape.supporting_face(&local_normal_a, &pose_a_at_lambda, a.scale),
            b.shape.supporting_face(&(-world_axis), &b.pose, b.scale),
        )
    } else {
        (SupportingFace::default(), SupportingFace::default())
    };

    collector.add_hit(CastShapeHit {
        fraction: cast.lambda,
        point_a: world_point_a,
        point_b: world_point_b,
        penetration_depth: (world_point_b - world_point_a).norm(),
        penetration_axis: world_axis,
        normal,
        sub_shape_id_a: a.sub_shape_id,
        sub_shape_id_b: b.sub_shape_id,
        material_id_a: a.shape.material_id(),
        material_id_b: b.shape.material_id(),
        face_a,
        face_b,
        body_id_b: b.body_id,
    });
}

type CollideFn = for<'a> fn(&mut NarrowphaseContext, &CollideShapeSettings, &PosedShape<'a>, &PosedShape<'a>, &mut dyn Collector<CollideShapeHit>);
type CastFn = for<'a> fn(&mut NarrowphaseContext, &CastShapeSettings, &PosedShape<'a>, Vector, &PosedShape<'a>, &mut dyn Collector<CastShapeHit>);

/// Reverses arguments into a function authored for `(B, A)` and wraps the
/// collector in the appropriate inverter (spec §4.10 "Result inversion").
/// `b.body_id` is threaded straight into the inverter rather than left to
/// fall out of the swapped call, since the callee's own "B" role is about
/// to be played by the original `a` (see [`InvertedCollideCollector`]).
fn reversed_collide(
    ctx: &mut NarrowphaseContext,
    settings: &CollideShapeSettings,
    a: &PosedShape,
    b: &PosedShape,
    collector: &mut dyn Collector<CollideShapeHit>,
) {
    let mut inverted = InvertedCollideCollector::new(collector, b.body_id);
    collide_convex_vs_convex_dyn(ctx, settings, b, a, &mut inverted);
}

fn reversed_cast(
    ctx: &mut NarrowphaseContext,
    settings: &CastShapeSettings,
    a: &PosedShape,
    displacement: Vector,
    b: &PosedShape,
    collector: &mut dyn Collector<CastShapeHit>,
) {
    // A sweeps along `displacement` relative to B; from B's point of view
    // (now playing the "A" role) the opposite shape sweeps by `-displacement`.
    let mut inverted = InvertedCastCollector::new(collector, b.body_id);
    cast_convex_vs_convex_dyn(ctx, settings, b, -displacement, a, &mut inverted);
}

/// Per-shape-pair function table for overlap and cast queries (spec §4.11
/// C11). Every `Convex`-category pair registered here resolves to the
/// shared [`collide_convex_vs_convex_dyn`]/[`cast_convex_vs_convex_dyn`]
/// driver; an absent entry means "no collision" (spec §6: "Absent entries
/// mean 'no collision', silent miss").
pub struct NarrowphaseDispatcher {
    collide_fns: HashMap<(ShapeType, ShapeType), CollideFn>,
    cast_fns: HashMap<(ShapeType, ShapeType), CastFn>,
}

impl Default for NarrowphaseDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrowphaseDispatcher {
    pub fn new() -> Self {
        NarrowphaseDispatcher {
            collide_fns: HashMap::new(),
            cast_fns: HashMap::new(),
        }
    }

    /// Registers `(a, b)` as a convex-vs-convex pair, and mirrors the
    /// entry at `(b, a)` as a `reversed_*` wrapper unless `a == b` (spec
    /// §4.10: "Bidirectional handlers are registered once and the mirrored
    /// entry is a `reversed*` wrapper").
    pub fn register_convex_pair(&mut self, a: ShapeType, b: ShapeType) {
        self.collide_fns.insert((a, b), collide_convex_vs_convex_dyn);
        self.cast_fns.insert((a, b), cast_convex_vs_convex_dyn);
        if a != b {
            self.collide_fns.insert((b, a), reversed_collide);
            self.cast_fns.insert((b, a), reversed_cast);
        }
    }

    /// A convenience that registers every pair of a known shape-type set as
    /// convex-vs-convex (spec §4.12's `test_shapes` module uses this to
    /// populate a fully-connected table).
    pub fn register_all_convex_pairs(&mut self, types: &[ShapeType]) {
        for &a in types {
            for &b in types {
                self.register_convex_pair(a, b);
            }
        }
    }

    fn collide_fn(&self, a: ShapeType, b: ShapeType) -> Option<CollideFn> {
        self.collide_fns.get(&(a, b)).copied()
    }

    fn cast_fn(&self, a: ShapeType, b: ShapeType) -> Option<CastFn> {
        self.cast_fns.get(&(a, b)).copied()
    }

    /// `collideShapeVsShape` (spec §6): looks up `(shapeA.type, shapeB.type)`
    /// and delegates, or logs a trace-level miss if the pair is unregistered.
    pub fn collide_shape_vs_shape(
        &self,
        ctx: &mut NarrowphaseContext,
        settings: &CollideShapeSettings,
        shape_a: &PosedShape,
        shape_b: &PosedShape,
        collector: &mut dyn Collector<CollideShapeHit>,
    ) {
        match self.collide_fn(shape_a.shape.shape_type(), shape_b.shape.shape_type()) {
            Some(f) => f(ctx, settings, shape_a, shape_b, collector),
            None => log::trace!(
                "collideShapeVsShape: no dispatch entry for {:?} vs {:?}",
                shape_a.shape.shape_type(),
                shape_b.shape.shape_type()
            ),
        }
    }

    /// `castShapeVsShape` (spec §6).
    pub fn cast_shape_vs_shape(
        &self,
        ctx: &mut NarrowphaseContext,
        settings: &CastShapeSettings,
        shape_a: &PosedShape,
        displacement: Vector,
        shape_b: &PosedShape,
        collector: &mut dyn Collector<CastShapeHit>,
    ) {
        match self.cast_fn(shape_a.shape.shape_type(), shape_b.shape.shape_type()) {
            Some(f) => f(ctx, settings, shape_a, displacement, shape_b, collector),
            None => log::trace!(
                "castShapeVsShape: no dispatch entry for {:?} vs {:?}",
                shape_a.shape.shape_type(),
                shape_b.shape.shape_type()
            ),
        }
    }
}

/// `castRayVsShape` (spec §6): unary, so it needs no dispatch table —
/// every convex shape answers via the same GJK ray-cast (spec §4.5).
pub fn cast_ray_vs_shape(
    ctx: &mut NarrowphaseContext,
    settings: &CastRaySettings,
    ray_origin: Point,
    ray_direction: Vector,
    tau: Real,
    shape: &PosedShape,
    collector: &mut dyn Collector<CastShapeHit>,
) -> Option<CastRayHit> {
    let support = shape.shape.dyn_support_function(SupportFunctionMode::IncludeConvexRadius, shape.scale);
    let local_origin = shape.pose.inverse_transform_point(&ray_origin);
    let local_dir = shape.pose.inverse_transform_vector(&ray_direction);

    let fraction = match gjk_cast_ray(local_origin, local_dir, tau, &support, 1.0, &mut ctx.simplex) {
        Some(f) => {
            // Back-face culling (spec §6 `CastRaySettings.collideWithBackfaces`):
            // a hit whose surface normal points the same way as the ray
            // (`local_dir . normal > 0`) was struck from behind the shape's
            // outward-facing side, mirroring the `axis . normal_b > 0` test
            // `collide_convex_vs_convex_dyn` runs against `surface_normal`.
            if !settings.collide_with_backfaces {
                let local_hit_point = Point::from(local_origin.coords + local_dir * f);
                let normal = shape.shape.surface_normal(&local_hit_point);
                if local_dir.dot(&normal) > 0.0 {
                    return None;
                }
            }
            f
        }
        None if settings.treat_convex_as_solid => {
            if collide_point_vs_shape(ctx, &Default::default(), ray_origin, shape, &mut crate::query::collector::CollidePointAnyCollector::default()) {
                0.0
            } else {
                return None;
            }
        }
        None => return None,
    };

    if fraction > collector.early_out_fraction() {
        return None;
    }

    Some(CastRayHit {
        fraction,
        sub_shape_id: shape.sub_shape_id,
        body_id_b: shape.body_id,
        material_id: shape.shape.material_id(),
    })
}

/// `collidePointVsShape` (spec §6): also unary; expressed as a degenerate
/// penetration query against a zero-radius [`PointSupport`] (spec §4.3
/// variant 4). Per spec §4.11's "Collide point | same as collide shape"
/// row this reports through a dedicated `Collector<CollidePointHit>`
/// (spec §6's `CollidePointHit{subShapeIdB, bodyIdB, materialId}` record),
/// not a `CollideShapeHit` padded out with fields this query has no
/// contact pair to fill in.
pub fn collide_point_vs_shape(
    ctx: &mut NarrowphaseContext,
    settings: &crate::query::settings::CollidePointSettings,
    point_world: Point,
    shape: &PosedShape,
    collector: &mut dyn Collector<CollidePointHit>,
) -> bool {
    let local_point = shape.pose.inverse_transform_point(&point_world);
    let support = shape.shape.dyn_support_function(SupportFunctionMode::IncludeConvexRadius, shape.scale);
    let point_support = PointSupport::new(local_point);

    let direction0 = if local_point.coords.norm_squared() > crate::math::DEFAULT_EPSILON {
        -local_point.coords
    } else {
        Vector::x()
    };

    let gjk = penetration_depth_step_gjk(&support, &point_support, 0.0, 0.0, direction0, settings.collision_tolerance, &mut ctx.simplex);

    let hit = match gjk.status {
        PenetrationStatus::NotColliding => false,
        PenetrationStatus::Colliding => true,
        PenetrationStatus::Indeterminate => {
            let epa = penetration_depth_step_epa(&support, &point_support, settings.collision_tolerance, &ctx.simplex);
            epa.status == EpaStatus::Colliding
        }
    };

    if hit {
        collector.add_hit(CollidePointHit {
            sub_shape_id_b: shape.sub_shape_id,
            body_id_b: shape.body_id,
            material_id: shape.shape.material_id(),
        });
    }
    hit
}

/// `collidePointVsShape`'s single-result convenience wrapper: a thin shim
/// over [`collide_point_vs_shape`] for callers that only want `Option`
/// ergonomics instead of driving a collector themselves.
pub fn collide_point_vs_shape_hit(
    ctx: &mut NarrowphaseContext,
    settings: &crate::query::settings::CollidePointSettings,
    point_world: Point,
    shape: &PosedShape,
) -> Option<CollidePointHit> {
    let mut collector = crate::query::collector::CollidePointAnyCollector::default();
    if collide_point_vs_shape(ctx, settings, point_world, shape, &mut collector) {
        collector.hit
    } else {
        None
    }
}
