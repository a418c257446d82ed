//! Convex-vs-convex driver (spec §4.10, component C10).
//!
//! Grounded on the `Isometry<Real>`-as-relative-pose convention used
//! pervasively in the teacher (`examples/Johannes0021-parry/src/query/gjk/
//! gjk.rs`'s `pos12: &Isometry<Real>` parameter appears in every teacher
//! function signature): this driver computes that same "B relative to A"
//! pose once at the top of [`collide_convex_vs_convex`]/
//! [`cast_convex_vs_convex`] and threads it down exactly as the teacher's
//! functions expect it.

use crate::math::{Isometry, Point, Quat, Real, Vector};
use crate::query::collector::Collector;
use crate::query::epa::penetration_depth_step_epa;
use crate::query::gjk::{gjk_cast_ray, Simplex};
use crate::query::penetration::{penetration_cast_shape, penetration_depth_step_gjk, PenetrationStatus};
use crate::query::results::{BodyId, CastShapeHit, CollideShapeHit, SubShapeId};
use crate::query::settings::{CastShapeSettings, CollideShapeSettings};
use crate::shape::{
    AddConvexRadiusSupport, PointSupport, ShapeAdapter, SupportFunctionMode, SupportMap,
    SupportingFace, TransformedSupport,
};

/// Scratch owned by one worker/thread and threaded through every call that
/// needs it (spec §5/§9 `NarrowphaseContext`): no globals, no per-call
/// allocation once warmed up.
#[derive(Default)]
pub struct NarrowphaseContext {
    pub simplex: Simplex,
}

impl NarrowphaseContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Standard 15-axis SAT test between an axis-aligned box centred at
/// `center_a` with half-extents `half_a`, and an oriented box centred at
/// `center_b` with half-extents `half_b` and orientation `rot_b_in_a` (both
/// expressed in A's frame) — the "AABB-vs-OBB early-out" of spec §4.10 step
/// 2, expanded by `margin` on every axis of A.
///
/// Classic Gottschalk/Lin/Manocha box-box overlap test, specialised to the
/// case where one box is axis-aligned.
pub(crate) fn aabb_obb_overlap(
    center_a: Point,
    half_a: Vector,
    center_b: Point,
    half_b: Vector,
    rot_b_in_a: &Quat,
    margin: Real,
) -> bool {
    let half_a = half_a + Vector::repeat(margin.max(0.0));
    let r = *rot_b_in_a.to_rotation_matrix().matrix();
    let abs_r = r.abs().add_scalar(1e-6);

    let t = center_b - center_a;

    // A's own axes (identity basis).
    for i in 0..3 {
        let ra = half_a[i];
        let rb = half_b[0] * abs_r[(i, 0)] + half_b[1] * abs_r[(i, 1)] + half_b[2] * abs_r[(i, 2)];
        if t[i].abs() > ra + rb {
            return false;
        }
    }

    // B's axes.
    for j in 0..3 {
        let ra = half_a[0] * abs_r[(0, j)] + half_a[1] * abs_r[(1, j)] + half_a[2] * abs_r[(2, j)];
        let rb = half_b[j];
        let t_proj = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
        if t_proj.abs() > ra + rb {
            return false;
        }
    }

    // Cross products of each pair of axes.
    for i in 0..3 {
        for j in 0..3 {
            let i1 = (i + 1) % 3;
            let i2 = (i + 2) % 3;
            let j1 = (j + 1) % 3;
            let j2 = (j + 2) % 3;

            let ra = half_a[i1] * abs_r[(i2, j)] + half_a[i2] * abs_r[(i1, j)];
            let rb = half_b[j1] * abs_r[(i, j2)] + half_b[j2] * abs_r[(i, j1)];
            let t_proj = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
            if t_proj.abs() > ra + rb {
                return false;
            }
        }
    }

    true
}

/// Relative pose of B expressed in A's local frame, and vice versa (spec
/// §4.10 step 1 / §4.10 "castConvexVsConvex" step 1).
pub(crate) fn relative_pose(pos_a: &Isometry, pos_b: &Isometry) -> Isometry {
    pos_a.inverse() * pos_b
}

/// Shape-vs-shape overlap with contact manifold (spec §4.10
/// `collideConvexVsConvex`).
#[allow(clippy::too_many_arguments)]
pub fn collide_convex_vs_convex<A, B, C>(
    ctx: &mut NarrowphaseContext,
    settings: &CollideShapeSettings,
    shape_a: &A,
    pos_a: &Isometry,
    scale_a: Vector,
    sub_shape_id_a: SubShapeId,
    shape_b: &B,
    pos_b: &Isometry,
    scale_b: Vector,
    sub_shape_id_b: SubShapeId,
    body_id_b: BodyId,
    collector: &mut C,
) where
    A: ShapeAdapter,
    B: ShapeAdapter,
    C: Collector<CollideShapeHit>,
{
    // Step 1: transform B into A's local frame.
    let pos_b_in_a = relative_pose(pos_a, pos_b);

    // Step 2: AABB-vs-OBB early-out.
    let half_a = shape_a.local_half_extents(scale_a);
    let half_b = shape_b.local_half_extents(scale_b);
    let center_a = shape_a.local_center_of_mass(scale_a);
    let center_b_in_a = pos_b_in_a * shape_b.local_center_of_mass(scale_b);
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

    // Step 3: EXCLUDE_CONVEX_RADIUS supports.
    let support_a = shape_a.support_function(SupportFunctionMode::ExcludeConvexRadius, scale_a);
    let support_b = shape_b.support_function(SupportFunctionMode::ExcludeConvexRadius, scale_b);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    // Step 4: initial penetration axis.
    let translation = pos_b_in_a.translation.vector;
    let direction0 = if translation.norm_squared() > crate::math::DEFAULT_EPSILON {
        translation
    } else {
        Vector::x()
    };

    // Step 5: GJK, falling back to EPA on INDETERMINATE.
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
            let support_a_incl =
                shape_a.support_function(SupportFunctionMode::IncludeConvexRadius, scale_a);
            let support_b_incl =
                shape_b.support_function(SupportFunctionMode::IncludeConvexRadius, scale_b);
            let support_b_incl_in_a = TransformedSupport::new(pos_b_in_a, support_b_incl);
            let margin = settings.max_separation_distance.clamp(0.0, 1.0);
            let inflated_a = AddConvexRadiusSupport::new(support_a_incl, margin);

            let epa = penetration_depth_step_epa(
                &inflated_a,
                &support_b_incl_in_a,
                settings.penetration_tolerance,
                &ctx.simplex,
            );
            match epa.status {
                crate::query::epa::EpaStatus::NotColliding => return,
                crate::query::epa::EpaStatus::Colliding => (epa.point_a, epa.point_b, epa.axis),
            }
        }
    };

    // Step 6: reject hits that don't beat the collector's current bound.
    let penetration = (point_b - point_a).norm() - settings.max_separation_distance;
    if -penetration > collector.early_out_fraction() {
        return;
    }

    // Step 7: undo A's `max_separation_distance` inflation.
    let axis_len = axis.norm();
    if axis_len > crate::math::DEFAULT_EPSILON {
        point_a -= axis * (settings.max_separation_distance / axis_len);
    }

    // Step 8: transform back to world space.
    let world_point_a = pos_a * point_a;
    let world_point_b = pos_a * point_b;
    let world_axis = pos_a.rotation * axis;

    // Step 8b: back-face culling. `axis` points from A toward B; a contact
    // approached from B's front side pushes A out against B's own outward
    // normal there (`axis . normal_b < 0`), so a positive dot means A
    // intruded from behind B's surface.
    if !settings.collide_with_backfaces {
        let local_point_b = pos_b.inverse_transform_point(&world_point_b);
        let normal_b = pos_b.rotation * shape_b.surface_normal(&local_point_b);
        if world_axis.dot(&normal_b) > 0.0 {
            return;
        }
    }

    // Step 9: optionally collect supporting faces.
    let (face_a, face_b) = if settings.collect_faces && world_axis.norm_squared() > crate::math::DEFAULT_EPSILON {
        let dir = world_axis.normalize();
        (
            shape_a.supporting_face(&dir, pos_a, scale_a),
            shape_b.supporting_face(&(-dir), pos_b, scale_b),
        )
    } else {
        (SupportingFace::default(), SupportingFace::default())
    };

    // Step 10: submit.
    collector.add_hit(CollideShapeHit {
        point_a: world_point_a,
        point_b: world_point_b,
        penetration_axis: world_axis,
        penetration,
        sub_shape_id_a,
        sub_shape_id_b,
        material_id_a: shape_a.material_id(),
        material_id_b: shape_b.material_id(),
        face_a,
        face_b,
        body_id_b,
    });
}

/// Swept shape cast (spec §4.10 `castConvexVsConvex`).
#[allow(clippy::too_many_arguments)]
pub fn cast_convex_vs_convex<A, B, C>(
    ctx: &mut NarrowphaseContext,
    settings: &CastShapeSettings,
    shape_a: &A,
    pos_a: &Isometry,
    scale_a: Vector,
    sub_shape_id_a: SubShapeId,
    displacement_world: Vector,
    shape_b: &B,
    pos_b: &Isometry,
    scale_b: Vector,
    sub_shape_id_b: SubShapeId,
    body_id_b: BodyId,
    collector: &mut C,
) where
    A: ShapeAdapter,
    B: ShapeAdapter,
    C: Collector<CastShapeHit>,
{
    // Step 1: transform A into B's local frame; rotate displacement likewise.
    let pos_a_in_b = relative_pose(pos_b, pos_a);
    let displacement_in_b = pos_b.rotation.inverse() * displacement_world;

    // Step 2: seed lambda with the collector's early-out bound.
    let max_lambda = collector.early_out_fraction();

    let support_a = shape_a.support_function(SupportFunctionMode::ExcludeConvexRadius, scale_a);
    let support_b = shape_b.support_function(SupportFunctionMode::ExcludeConvexRadius, scale_b);
    let r_a = support_a.convex_radius();
    let r_b = support_b.convex_radius();

    // Step 3: penetrationCastShape (EXCLUDE_CONVEX_RADIUS supports).
    let cast = penetration_cast_shape(
        pos_a_in_b.translation.vector.into(),
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

    // Step 4: reject no-hit / out-of-range / back-face / beyond-early-out.
    if !cast.hit || cast.lambda > 1.0 {
        return;
    }
    if !settings.collide_with_backfaces && cast.separating_axis.dot(&displacement_in_b) <= 0.0 {
        return;
    }
    if cast.lambda >= collector.early_out_fraction() {
        return;
    }

    // Step 5: transform back to world space.
    let world_point_a = pos_b * cast.point_a;
    let world_point_b = pos_b * cast.point_b;
    let world_axis = pos_b.rotation * cast.separating_axis;
    let normal = world_axis
        .try_normalize(crate::math::DEFAULT_EPSILON)
        .map(|n| -n)
        .unwrap_or_else(Vector::zeros);

    // Step 6: optionally collect supporting faces at the contact pose.
    let (face_a, face_b) = if settings.collect_faces {
        let pose_a_at_lambda = pos_b
            * Isometry::from_parts(
                (pos_a_in_b.translation.vector + displacement_in_b * cast.lambda).into(),
                pos_a_in_b.rotation,
            );
        let local_normal_a = pos_a_in_b.rotation.inverse() * (-cast.separating_axis);
        (
            shape_a.supporting_face(&local_normal_a, &pose_a_at_lambda, scale_a),
            shape_b.supporting_face(&(-world_axis), pos_b, scale_b),
        )
    } else {
        (SupportingFace::default(), SupportingFace::default())
    };

    // Step 7: submit.
    collector.add_hit(CastShapeHit {
        fraction: cast.lambda,
        point_a: world_point_a,
        point_b: world_point_b,
        penetration_depth: (world_point_b - world_point_a).norm(),
        penetration_axis: world_axis,
        normal,
        sub_shape_id_a,
        sub_shape_id_b,
        material_id_a: shape_a.material_id(),
        material_id_b: shape_b.material_id(),
        face_a,
        face_b,
        body_id_b,
    });
}

/// `castRayVsShape` restricted to a single convex shape (spec §6's "usually
/// delegated to a generic convex implementation"): runs [`gjk_cast_ray`]
/// against the shape's `INCLUDE_CONVEX_RADIUS` support.
pub fn cast_ray_vs_convex<S: ShapeAdapter>(
    ctx: &mut NarrowphaseContext,
    ray_origin: Point,
    ray_direction: Vector,
    tau: Real,
    shape: &S,
    pos: &Isometry,
    scale: Vector,
    treat_convex_as_solid: bool,
) -> Option<Real> {
    let support = shape.support_function(SupportFunctionMode::IncludeConvexRadius, scale);
    let local_origin = pos.inverse_transform_point(&ray_origin);
    let local_dir = pos.inverse_transform_vector(&ray_direction);

    match gjk_cast_ray(local_origin, local_dir, tau, &support, 1.0, &mut ctx.simplex) {
        Some(lambda) => Some(lambda),
        None if treat_convex_as_solid => {
            if collide_point_vs_convex(ctx, ray_origin, tau, shape, pos, scale) {
                Some(0.0)
            } else {
                None
            }
        }
        None => None,
    }
}

/// `collidePointVsShape` restricted to a single convex shape (spec §6):
/// point-in-shape containment, expressed as a degenerate GJK/EPA query
/// against a zero-radius [`PointSupport`].
pub fn collide_point_vs_convex<S: ShapeAdapter>(
    ctx: &mut NarrowphaseContext,
    point_world: Point,
    tau: Real,
    shape: &S,
    pos: &Isometry,
    scale: Vector,
) -> bool {
    let local_point = pos.inverse_transform_point(&point_world);
    let support = shape.support_function(SupportFunctionMode::IncludeConvexRadius, scale);
    let point_support = PointSupport::new(local_point);

    let direction0 = if local_point.coords.norm_squared() > crate::math::DEFAULT_EPSILON {
        -local_point.coords
    } else {
        Vector::x()
    };

    let gjk = penetration_depth_step_gjk(
        &support,
        &point_support,
        0.0,
        0.0,
        direction0,
        tau,
        &mut ctx.simplex,
    );

    match gjk.status {
        PenetrationStatus::NotColliding => false,
        PenetrationStatus::Colliding => true,
        PenetrationStatus::Indeterminate => {
            let epa = penetration_depth_step_epa(&support, &point_support, tau, &ctx.simplex);
            epa.status == crate::query::epa::EpaStatus::Colliding
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_obb_overlap_identity_touching() {
        let a = Point::origin();
        let b = Point::new(2.0, 0.0, 0.0);
        assert!(aabb_obb_overlap(a, Vector::new(1.0, 1.0, 1.0), b, Vector::new(1.0, 1.0, 1.0), &Quat::identity(), 0.0));
    }

    #[test]
    fn aabb_obb_overlap_separated() {
        let a = Point::origin();
        let b = Point::new(3.0, 0.0, 0.0);
        assert!(!aabb_obb_overlap(a, Vector::new(1.0, 1.0, 1.0), b, Vector::new(1.0, 1.0, 1.0), &Quat::identity(), 0.0));
    }

    #[test]
    fn aabb_obb_overlap_margin_bridges_gap() {
        let a = Point::origin();
        let b = Point::new(3.0, 0.0, 0.0);
        assert!(aabb_obb_overlap(a, Vector::new(1.0, 1.0, 1.0), b, Vector::new(1.0, 1.0, 1.0), &Quat::identity(), 1.0));
    }
}
