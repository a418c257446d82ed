//! GJK closest-points, ray-cast and shape-cast (spec §4.4–§4.6, component C5).
//!
//! Structurally grounded on
//! `examples/Johannes0021-parry/src/query/gjk/gjk.rs`'s `closest_points`
//! and `minkowski_ray_cast` (same separating-axis bracketing, same
//! `GJK_MAX_ITERATIONS` cap, same "shift the ray origin and restart the
//! simplex once" ray-cast trick); the simplex-reduction step is rewired to
//! this crate's own `closest_on_*` routines (spec §4.2) since the
//! teacher's fragment delegates that to shape-specific point-location code
//! that is out of scope here.

use crate::math::{Point, Quat, Real, Vector};
use crate::shape::SupportMap;

use super::cso_point::CSOPoint;
use super::simplex::Simplex;
use super::{GJK_MAX_ITERATIONS, GJK_TOLERANCE};

/// A convex set containing only the origin; used to specialise the
/// two-shape Minkowski-difference machinery down to a single-shape
/// ray-cast (spec §4.5: "Uses the signed set `{x} − P`").
pub(crate) struct ConstantOrigin;

impl SupportMap for ConstantOrigin {
    fn local_support_point(&self, _dir: &Vector) -> Point {
        Point::origin()
    }
}

/// Outcome of [`gjk_closest_points`].
#[derive(Copy, Clone, Debug)]
pub struct GJKResult {
    /// Closest point on shape A, in A's local space. Collapses to the
    /// origin when `squared_distance == 0.0` and the shapes are
    /// overlapping deeply enough that GJK could not resolve a witness pair
    /// (spec §4.4: "tetrahedron implies zero distance and both contact
    /// points collapse to 0").
    pub point_a: Point,
    /// Closest point on shape B, in A's local space.
    pub point_b: Point,
    /// Squared distance between the shapes. `0.0` means touching/
    /// overlapping; `Real::MAX` means farther apart than `sqrt(max_dist_sq)`
    /// (early termination, spec §4.4).
    pub squared_distance: Real,
    /// Separating axis (from B toward A) when `squared_distance > 0.0`;
    /// the zero vector otherwise.
    pub axis: Vector,
}

impl GJKResult {
    fn too_far() -> Self {
        GJKResult {
            point_a: Point::origin(),
            point_b: Point::origin(),
            squared_distance: Real::MAX,
            axis: Vector::zeros(),
        }
    }

    fn intersection() -> Self {
        GJKResult {
            point_a: Point::origin(),
            point_b: Point::origin(),
            squared_distance: 0.0,
            axis: Vector::zeros(),
        }
    }
}

/// Reconstructs `(point_a, point_b)` from the simplex's `orig1`/`orig2`
/// supports, weighted by the barycentric coordinates of `point` within the
/// `mask` subset of `simplex`'s current vertices.
fn reconstruct(simplex: &Simplex, mask: u8, tau: Real) -> (Point, Point) {
    let indices: Vec<usize> = (0..simplex.size())
        .filter(|i| mask & (1 << i) != 0)
        .collect();

    match indices.len() {
        0 => (Point::origin(), Point::origin()),
        1 => {
            let p = simplex.point(indices[0]);
            (p.orig1, p.orig2)
        }
        2 => {
            let p0 = simplex.point(indices[0]);
            let p1 = simplex.point(indices[1]);
            let bary = super::barycentric::bary2(&p0.point, &p1.point, tau * tau);
            (
                Point::from(p0.orig1.coords * bary.u + p1.orig1.coords * bary.v),
                Point::from(p0.orig2.coords * bary.u + p1.orig2.coords * bary.v),
            )
        }
        3 => {
            let p0 = simplex.point(indices[0]);
            let p1 = simplex.point(indices[1]);
            let p2 = simplex.point(indices[2]);
            let bary = super::barycentric::bary3(&p0.point, &p1.point, &p2.point, tau * tau);
            (
                Point::from(
                    p0.orig1.coords * bary.u + p1.orig1.coords * bary.v + p2.orig1.coords * bary.w,
                ),
                Point::from(
                    p0.orig2.coords * bary.u + p1.orig2.coords * bary.v + p2.orig2.coords * bary.w,
                ),
            )
        }
        _ => (Point::origin(), Point::origin()),
    }
}

fn finish_separated(simplex: &mut Simplex, v: Vector, tau: Real) -> GJKResult {
    let full_mask = if simplex.size() == 0 {
        0
    } else {
        (1u8 << simplex.size()) - 1
    };
    let (point_a, point_b) = reconstruct(simplex, full_mask, tau);
    GJKResult {
        point_a,
        point_b,
        squared_distance: v.norm_squared(),
        axis: v,
    }
}

/// Closest points between two convex shapes via the GJK distance algorithm
/// (spec §4.4).
///
/// `support_a`/`support_b` must already be expressed in a common frame
/// (the caller is responsible for wrapping one of them in a
/// [`crate::shape::TransformedSupport`] beforehand, as the narrowphase
/// driver does). `direction0` seeds the first support query; any nonzero
/// vector works, but a good initial guess (e.g. the vector between the two
/// shapes' centres) speeds convergence.
pub fn gjk_closest_points<A, B>(
    support_a: &A,
    support_b: &B,
    tau: Real,
    direction0: Vector,
    max_dist_sq: Real,
    simplex: &mut Simplex,
) -> GJKResult
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    simplex.clear();
    let mut v = if direction0.norm_squared() > 0.0 {
        direction0
    } else {
        Vector::x()
    };

    for _ in 0..GJK_MAX_ITERATIONS {
        let p = support_a.local_support_point(&v);
        let q = support_b.local_support_point(&(-v));
        let w = p.coords - q.coords;

        let v_dot_w = v.dot(&w);
        if v_dot_w < 0.0 && v_dot_w * v_dot_w > v.norm_squared() * max_dist_sq {
            return GJKResult::too_far();
        }

        let prev_dist_sq = v.norm_squared();
        simplex.push(CSOPoint { point: Point::from(w), orig1: p, orig2: q });

        let closest = simplex.closest_to_origin(true, tau);
        let new_dist_sq = closest.point.coords.norm_squared();

        if new_dist_sq >= prev_dist_sq {
            simplex.pop();
            return finish_separated(simplex, v, tau);
        }

        if simplex.size() == 4 && closest.point_set == 0b1111 {
            return GJKResult::intersection();
        }

        let (point_a, point_b) = reconstruct(simplex, closest.point_set, tau);
        simplex.reduce(closest.point_set);

        let new_v = -closest.point.coords;
        let new_v_sq = new_v.norm_squared();

        if new_v_sq <= tau * tau {
            return GJKResult {
                point_a,
                point_b,
                squared_distance: 0.0,
                axis: Vector::zeros(),
            };
        }

        let max_y_sq = simplex
            .points()
            .iter()
            .map(|pt| pt.point.coords.norm_squared())
            .fold(0.0 as Real, Real::max);

        if new_v_sq <= GJK_TOLERANCE * max_y_sq {
            return GJKResult {
                point_a,
                point_b,
                squared_distance: 0.0,
                axis: Vector::zeros(),
            };
        }

        if prev_dist_sq - new_v_sq <= GJK_TOLERANCE * prev_dist_sq {
            return GJKResult {
                point_a,
                point_b,
                squared_distance: new_v_sq,
                axis: new_v,
            };
        }

        v = new_v;
    }

    finish_separated(simplex, v, tau)
}

/// Plane/ray intersection parameter, used by the ray-cast and shape-cast
/// clipping step (spec §4.5).
fn ray_plane_t(point_on_plane: &Point, normal: &Vector, ray_origin: &Point, ray_dir: &Vector) -> Option<Real> {
    let denom = normal.dot(ray_dir);
    if denom.abs() < crate::math::DEFAULT_EPSILON {
        return None;
    }
    Some(normal.dot(&(point_on_plane - ray_origin)) / denom)
}

/// Casts a ray against a single convex support function (spec §4.5).
///
/// Returns `Some(lambda)` with `lambda` the (normalised, in `[0, 1)`)
/// fraction along the ray at which the shape is first hit, or `None` for a
/// miss. `max_lambda` is specified in the caller's normalised units
/// (default `1.0`); `ray_direction`'s length sets the ray's real-world
/// length.
pub fn gjk_cast_ray<S>(
    ray_origin: Point,
    ray_direction: Vector,
    tau: Real,
    support: &S,
    max_lambda: Real,
    simplex: &mut Simplex,
) -> Option<Real>
where
    S: ?Sized + SupportMap,
{
    minkowski_ray_cast(ray_origin, ray_direction, tau, support, &ConstantOrigin, max_lambda, simplex)
}

/// Ray-cast against the Minkowski difference `g1 - (x - g2)`, i.e. the
/// moving point `ray_origin + lambda * ray_direction` versus the
/// (possibly two-shape) convex set `g1 (-) g2`. [`gjk_cast_ray`] is the
/// `g2 = ConstantOrigin` specialisation of this.
pub(crate) fn minkowski_ray_cast<G1, G2>(
    ray_origin: Point,
    ray_direction: Vector,
    tau: Real,
    g1: &G1,
    g2: &G2,
    max_lambda: Real,
    simplex: &mut Simplex,
) -> Option<Real>
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    let ray_length = ray_direction.norm();
    if ray_length < crate::math::DEFAULT_EPSILON {
        return None;
    }

    let unit_dir = ray_direction / ray_length;
    let mut lambda = 0.0;
    let mut curr_origin = ray_origin;
    let mut dir = -unit_dir;
    let mut last_hit_dir = dir;

    simplex.clear();
    let support_point = CSOPoint::from_support_pair(g1, g2, &dir);
    simplex.push(support_point.translate(&-curr_origin.coords));

    let mut closest = simplex.closest_to_origin(true, tau);
    let mut max_bound = Real::MAX;
    let mut last_chance = false;

    for _ in 0..GJK_MAX_ITERATIONS {
        let old_max_bound = max_bound;

        let neg_proj = -closest.point.coords;
        let proj_len = neg_proj.norm();
        if proj_len <= tau {
            return Some(lambda / ray_length);
        }
        dir = neg_proj / proj_len;
        max_bound = proj_len;

        let support_point = if max_bound >= old_max_bound {
            last_chance = true;
            CSOPoint::single_point(Point::from(closest.point.coords + curr_origin.coords))
        } else {
            CSOPoint::from_support_pair(g1, g2, &dir)
        };

        if last_chance && lambda > 0.0 {
            return Some(lambda / ray_length);
        }

        match ray_plane_t(&support_point.point, &dir, &curr_origin, &unit_dir) {
            Some(t) => {
                if dir.dot(&unit_dir) < 0.0 && t > 0.0 {
                    last_hit_dir = dir;
                    lambda += t;

                    if lambda / ray_length > max_lambda {
                        return None;
                    }

                    let shift = unit_dir * t;
                    curr_origin += shift;
                    max_bound = Real::MAX;
                    simplex.modify_points(|pt| pt.translate_mut(&-shift));
                    last_chance = false;
                }
            }
            None => {
                if dir.dot(&unit_dir) > tau {
                    return None;
                }
            }
        }

        if last_chance {
            return None;
        }

        let min_bound = -dir.dot(&(support_point.point.coords - curr_origin.coords));
        if max_bound - min_bound <= GJK_TOLERANCE.sqrt() * max_bound {
            return None;
        }

        simplex.push(support_point.translate(&-curr_origin.coords));
        closest = simplex.closest_to_origin(true, tau);

        if simplex.size() == 4 && closest.point_set == 0b1111 {
            // The origin projects strictly inside the tetrahedron: `x` has
            // entered the Minkowski difference and nothing closer remains
            // to find.
            return if min_bound >= tau {
                None
            } else {
                Some(lambda / ray_length)
            };
        }

        simplex.reduce(closest.point_set);
        let _ = last_hit_dir;
    }

    None
}

/// Result of [`gjk_cast_shape`] (spec §4.6).
#[derive(Copy, Clone, Debug)]
pub struct GJKCastShapeResult {
    pub lambda: Real,
    /// Contact point on shape A at time `lambda`, in B's frame, including
    /// the convex-radius offset.
    pub point_a: Point,
    /// Contact point on shape B at time `lambda`, in B's frame, including
    /// the convex-radius offset.
    pub point_b: Point,
    /// Separating axis at `lambda` (`-v` at convergence; see spec §4.6).
    pub separating_axis: Vector,
}

/// Sweeps shape A (posed at `pos_a_in_b`/`quat_a_in_b` in B's frame) along
/// `displacement` (also in B's frame) against stationary shape B, via GJK
/// (spec §4.6). `quat_a_in_b` is A's fixed orientation relative to B for the
/// whole sweep (a shape cast translates, it does not tumble); every query
/// against `support_a` rotates the direction into A's local frame and
/// rotates the resulting support point back out, so `support_a` itself never
/// needs to know about B's frame at all.
#[allow(clippy::too_many_arguments)]
pub fn gjk_cast_shape<A, B>(
    pos_a_in_b: Point,
    quat_a_in_b: Quat,
    support_a: &A,
    support_b: &B,
    displacement: Vector,
    tau: Real,
    r_a: Real,
    r_b: Real,
    max_lambda: Real,
    simplex: &mut Simplex,
) -> Option<GJKCastShapeResult>
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let radius = r_a + r_b;
    let disp_len = displacement.norm();

    // `x` is the moving origin of the `supportA - supportB` Minkowski
    // difference, starting at A's initial position in B's frame.
    let mut lambda: Real = 0.0;
    let mut x = pos_a_in_b.coords;
    let tau_r_sq = (tau + radius) * (tau + radius);

    simplex.clear();
    let mut v = if x.norm_squared() > 0.0 { -x } else { Vector::x() };

    let mut prev_v = v;

    for _ in 0..GJK_MAX_ITERATIONS {
        let local_dir_a = quat_a_in_b.inverse_transform_vector(&-v);
        let p = quat_a_in_b * support_a.local_support_point(&local_dir_a);
        let q = support_b.local_support_point(&v);
        // w = x - (q - p), the current Minkowski-difference point shifted
        // by the moving origin (spec §4.6).
        let w = x - (q.coords - p.coords);

        let v_dot_w = v.dot(&w);
        let v_len = v.norm();
        if v_len > crate::math::DEFAULT_EPSILON && v_dot_w - radius * v_len > 0.0 {
            if disp_len < crate::math::DEFAULT_EPSILON {
                return None;
            }
            let v_dot_disp = v.dot(&displacement);
            if v_dot_disp >= -1e-18 {
                return None;
            }
            // Clamped to not decrease (spec §4.5/§4.6): a numerically
            // non-advancing step keeps the current lambda and retries with a
            // freshly reset simplex rather than aborting the whole cast.
            let new_lambda = (lambda - (v_dot_w - radius * v_len) / v_dot_disp).max(lambda);
            if new_lambda >= max_lambda {
                return None;
            }
            lambda = new_lambda;
            x = pos_a_in_b.coords + displacement * lambda;
            simplex.clear();
            prev_v = v;
            continue;
        }

        prev_v = v;
        simplex.push(CSOPoint {
            point: Point::from(w),
            orig1: p,
            orig2: q,
        });

        let closest = simplex.closest_to_origin(true, tau);
        let new_v = -closest.point.coords;

        if simplex.size() == 4 && closest.point_set == 0b1111 {
            // Initially overlapping at this lambda; caller falls back to
            // EPA/deepest-point handling (spec §4.9).
            return Some(GJKCastShapeResult {
                lambda,
                point_a: Point::from(x),
                point_b: Point::from(x),
                separating_axis: Vector::zeros(),
            });
        }

        simplex.reduce(closest.point_set);

        if new_v.norm_squared() <= tau_r_sq {
            // Spec §4.6: "-v at convergence, or -prevV when no convex
            // radius is present, because the final v may be numerically
            // polluted." With a convex radius, the freshly computed `new_v`
            // is the one that actually saw the radius-adjusted test above,
            // so it is used instead of the now-stale `prev_v`.
            let fallback = || displacement.try_normalize(crate::math::DEFAULT_EPSILON).unwrap_or_else(Vector::x);
            let axis = if radius > 0.0 {
                new_v.try_normalize(crate::math::DEFAULT_EPSILON).unwrap_or_else(fallback)
            } else {
                prev_v.try_normalize(crate::math::DEFAULT_EPSILON).unwrap_or_else(fallback)
            };
            let point_a = Point::from(x) - axis * r_a;
            let point_b = Point::from(x) - axis * (-r_b);
            return Some(GJKCastShapeResult {
                lambda,
                point_a,
                point_b,
                separating_axis: -axis,
            });
        }

        v = new_v;
    }

    None
}
