//! `penetrationDepthStepGJK` and `penetrationCastShape` (spec §4.9,
//! component C8): the GJK -> EPA handoff and its shape-cast composition.

use crate::math::{Point, Real, Vector};
use crate::query::epa::{penetration_depth_step_epa, EpaStatus};
use crate::query::gjk::{gjk_cast_shape, gjk_closest_points, Simplex};
use crate::shape::{AddConvexRadiusSupport, SupportMap, TransformedSupport};

/// Tri-state outcome of a penetration query (spec §3 `PenetrationDepth`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PenetrationStatus {
    NotColliding,
    Colliding,
    /// GJK found the shapes touching/overlapping but could not resolve a
    /// witness pair on its own; the caller must fall back to EPA.
    Indeterminate,
}

/// Result of [`penetration_depth_step_gjk`]. `axis` points from A toward B;
/// its magnitude is the penetration depth when `status ==
/// PenetrationStatus::Colliding`.
#[derive(Copy, Clone, Debug)]
pub struct PenetrationResult {
    pub status: PenetrationStatus,
    pub axis: Vector,
    pub point_a: Point,
    pub point_b: Point,
}

impl PenetrationResult {
    fn not_colliding() -> Self {
        PenetrationResult {
            status: PenetrationStatus::NotColliding,
            axis: Vector::zeros(),
            point_a: Point::origin(),
            point_b: Point::origin(),
        }
    }

    fn indeterminate() -> Self {
        PenetrationResult {
            status: PenetrationStatus::Indeterminate,
            axis: Vector::zeros(),
            point_a: Point::origin(),
            point_b: Point::origin(),
        }
    }
}

/// Runs GJK with `maxDistSq = (rA+rB)^2` and classifies the result (spec
/// §4.9). `support_a`/`support_b` must already share a common frame and
/// exclude their convex radius; `simplex` is caller-owned scratch.
#[allow(clippy::too_many_arguments)]
pub fn penetration_depth_step_gjk<A, B>(
    support_a: &A,
    support_b: &B,
    r_a: Real,
    r_b: Real,
    direction0: Vector,
    tau: Real,
    simplex: &mut Simplex,
) -> PenetrationResult
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let radius = r_a + r_b;
    let max_dist_sq = radius * radius;

    let gjk = gjk_closest_points(support_a, support_b, tau, direction0, max_dist_sq, simplex);

    if gjk.squared_distance > max_dist_sq {
        return PenetrationResult::not_colliding();
    }

    if gjk.squared_distance > 0.0 {
        let v_len = gjk.squared_distance.sqrt();
        let axis_unit = gjk.axis / v_len;
        return PenetrationResult {
            status: PenetrationStatus::Colliding,
            axis: gjk.axis,
            point_a: gjk.point_a + axis_unit * r_a,
            point_b: gjk.point_b - axis_unit * r_b,
        };
    }

    PenetrationResult::indeterminate()
}

/// Result of [`penetration_cast_shape`] (spec §4.9).
#[derive(Copy, Clone, Debug)]
pub struct PenetrationCastResult {
    pub hit: bool,
    pub lambda: Real,
    pub point_a: Point,
    pub point_b: Point,
    pub separating_axis: Vector,
}

/// Sweeps shape A (pose `pos_a_in_b`, `rot_a_in_b`, in B's frame) along
/// `displacement` against stationary B, falling back to EPA at `lambda = 0`
/// when `return_deepest` is set and the shapes start in contact (spec
/// §4.9).
#[allow(clippy::too_many_arguments)]
pub fn penetration_cast_shape<A, B>(
    pos_a_in_b: Point,
    rot_a_in_b: crate::math::Quat,
    support_a: &A,
    support_b: &B,
    displacement: Vector,
    tau_coll: Real,
    tau_pen: Real,
    r_a: Real,
    r_b: Real,
    max_lambda: Real,
    return_deepest: bool,
    simplex: &mut Simplex,
) -> PenetrationCastResult
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let cast = match gjk_cast_shape(
        pos_a_in_b, rot_a_in_b, support_a, support_b, displacement, tau_coll, r_a, r_b, max_lambda, simplex,
    ) {
        Some(c) => c,
        None => {
            return PenetrationCastResult {
                hit: false,
                lambda: 0.0,
                point_a: Point::origin(),
                point_b: Point::origin(),
                separating_axis: Vector::zeros(),
            }
        }
    };

    let contact_normal_invalid = cast.separating_axis.norm_squared() < tau_coll * tau_coll;
    let fall_back_to_epa = return_deepest && cast.lambda == 0.0 && (r_a + r_b == 0.0 || contact_normal_invalid);

    if fall_back_to_epa {
        let transformed_a = TransformedSupport::new(
            crate::math::Isometry::from_parts(pos_a_in_b.coords.into(), rot_a_in_b),
            SupportRef(support_a),
        );
        let inflated_a = AddConvexRadiusSupport::new(transformed_a, r_a);
        let inflated_b = AddConvexRadiusSupport::new(SupportRef(support_b), r_b);

        let epa = penetration_depth_step_epa(&inflated_a, &inflated_b, tau_pen, simplex);
        return match epa.status {
            EpaStatus::NotColliding => PenetrationCastResult {
                hit: false,
                lambda: 0.0,
                point_a: Point::origin(),
                point_b: Point::origin(),
                separating_axis: Vector::zeros(),
            },
            EpaStatus::Colliding => PenetrationCastResult {
                hit: true,
                lambda: cast.lambda,
                point_a: epa.point_a,
                point_b: epa.point_b,
                separating_axis: epa.axis,
            },
        };
    }

    let separating_axis = if contact_normal_invalid { displacement } else { cast.separating_axis };

    PenetrationCastResult {
        hit: true,
        lambda: cast.lambda,
        point_a: cast.point_a,
        point_b: cast.point_b,
        separating_axis,
    }
}

/// Zero-cost adapter so a `&S` can be threaded through [`TransformedSupport`]
/// / [`AddConvexRadiusSupport`] without an intermediate owned copy.
struct SupportRef<'a, S: ?Sized>(&'a S);

impl<'a, S: ?Sized + SupportMap> SupportMap for SupportRef<'a, S> {
    fn local_support_point(&self, dir: &Vector) -> Point {
        self.0.local_support_point(dir)
    }

    fn convex_radius(&self) -> Real {
        self.0.convex_radius()
    }
}
