//! `penetrationDepthStepEPA` (spec §4.8, component C7).
//!
//! Structurally grounded on the teacher's `EPA::closest_points`
//! (`examples/Johannes0021-parry/src/query/epa/epa2.rs`): reset scratch,
//! seed vertices from the GJK simplex, build an initial hull, expand by
//! repeatedly popping the closest face and adding its supporting point
//! until convergence, then read contact points off the winning face. The
//! 3-D version adds an explicit "enclose the origin" phase (absent in 2-D,
//! where the initial triangle fan already surrounds the origin whenever
//! GJK found a 2-simplex or better) and the defect/sign-flip probe from
//! spec §4.8 Phase 4 step 7, neither of which has a teacher counterpart.

use crate::math::{Point, Real, Vector};
use crate::query::gjk::Simplex;
use crate::shape::SupportMap;

use super::hull::EpaHull;
use super::triangle::{EpaSupportPoints, EPA_MAX_POINTS, EPA_MAX_POINTS_TO_INCLUDE_ORIGIN_IN_HULL};

/// Outcome of [`penetration_depth_step_epa`] (spec §3 `PenetrationDepth`,
/// restricted to the two statuses EPA itself can report — `INDETERMINATE`
/// only ever arises one level up, in `penetrationDepthStepGJK`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EpaStatus {
    NotColliding,
    Colliding,
}

/// Result of [`penetration_depth_step_epa`]. `axis` points from A toward B
/// with magnitude equal to the penetration depth when `status ==
/// EpaStatus::Colliding`; zero otherwise.
#[derive(Copy, Clone, Debug)]
pub struct EpaResult {
    pub status: EpaStatus,
    pub axis: Vector,
    pub point_a: Point,
    pub point_b: Point,
}

impl EpaResult {
    fn not_colliding() -> Self {
        EpaResult {
            status: EpaStatus::NotColliding,
            axis: Vector::zeros(),
            point_a: Point::origin(),
            point_b: Point::origin(),
        }
    }
}

/// Fixed seed directions used when the GJK simplex handed to EPA contains
/// only a single point (spec §4.8 Phase 1).
fn seed_directions() -> [Vector; 4] {
    [
        Vector::new(0.0, 1.0, 0.0),
        Vector::new(-1.0, -1.0, -1.0),
        Vector::new(1.0, -1.0, -1.0),
        Vector::new(0.0, -1.0, 1.0),
    ]
}

/// Expands a polytope over the Minkowski difference of `support_a` and
/// `support_b` until it encloses the origin, then extracts the penetration
/// axis and contact points (spec §4.8). `support_a`/`support_b` **must**
/// already include their convex radius (the caller wraps base supports
/// with [`crate::shape::AddConvexRadiusSupport`] beforehand); `seed_simplex`
/// is the (possibly degenerate) simplex GJK terminated with.
pub fn penetration_depth_step_epa<A, B>(
    support_a: &A,
    support_b: &B,
    tau: Real,
    seed_simplex: &Simplex,
) -> EpaResult
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let mut points = EpaSupportPoints::new();
    let mut hull = EpaHull::new();

    if !seed_points(seed_simplex, support_a, support_b, &mut points) {
        log::debug!("EPA: failed to seed a non-degenerate initial simplex");
        return EpaResult::not_colliding();
    }

    if !build_initial_hull(&mut hull, &points) {
        log::debug!("EPA: failed to build the initial hull from the seed simplex");
        return EpaResult::not_colliding();
    }

    if !enclose_origin(&mut hull, support_a, support_b, &mut points) {
        log::debug!("EPA: failed to enclose the origin within the point cap");
        return EpaResult::not_colliding();
    }

    let (last, flip_v_sign) = match expand(&mut hull, support_a, support_b, &mut points, tau) {
        Some(r) => r,
        None => {
            log::debug!("EPA: shapes are not penetrating");
            return EpaResult::not_colliding();
        }
    };

    extract_result(&hull, last, flip_v_sign, &points)
}

/// Phase 1: copies the GJK seed simplex into the shared support-point
/// arrays, padding degenerate (0/1/2-point) simplices out to a proper
/// tetrahedron or triangle fan.
fn seed_points<A, B>(seed_simplex: &Simplex, support_a: &A, support_b: &B, points: &mut EpaSupportPoints) -> bool
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    points.clear();

    for p in seed_simplex.points() {
        if points.push(p.orig1, p.orig2).is_none() {
            return false;
        }
    }

    if points.len() == 1 {
        points.y.truncate(0);
        points.p.truncate(0);
        points.q.truncate(0);
        for dir in seed_directions() {
            let p = support_a.local_support_point(&dir);
            let q = support_b.local_support_point(&(-dir));
            if points.push(p, q).is_none() {
                return false;
            }
        }
    } else if points.len() == 2 {
        let axis = points.y[1] - points.y[0];
        let unit = match axis.try_normalize(crate::math::DEFAULT_EPSILON) {
            Some(u) => u,
            None => return false,
        };
        let perp = if unit.x.abs() < 0.9 {
            unit.cross(&Vector::x())
        } else {
            unit.cross(&Vector::y())
        };
        let perp = match perp.try_normalize(crate::math::DEFAULT_EPSILON) {
            Some(u) => u,
            None => return false,
        };

        let rot120 = nalgebra::UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_unchecked(unit),
            2.0 * std::f32::consts::PI as Real / 3.0,
        );
        let mut dir = perp;
        for _ in 0..3 {
            let p = support_a.local_support_point(&dir);
            let q = support_b.local_support_point(&(-dir));
            if points.push(p, q).is_none() {
                return false;
            }
            dir = rot120 * dir;
        }
    }

    points.len() >= 3
}

/// Phase 2: builds the initial triangle fan on points `(0, 1, 2)`, then
/// adds every remaining seed point via `findFacingTriangle` + `addPoint`.
fn build_initial_hull(hull: &mut EpaHull, points: &EpaSupportPoints) -> bool {
    hull.reset();
    if hull.initialize(0, 1, 2, points).is_err() {
        return false;
    }

    let mut new_triangles = Vec::new();
    for idx in 3..points.len() {
        let facing = match hull.find_facing_triangle(&points.y[idx]) {
            Some((tri, _)) => tri,
            None => continue,
        };
        match hull.add_point(facing, idx, points, Real::MAX, &mut new_triangles) {
            Ok(true) => {}
            _ => return false,
        }
    }
    true
}

/// Phase 3: expands the hull, one support point at a time, until every
/// remaining queued triangle's plane passes through or beyond the origin.
fn enclose_origin<A, B>(hull: &mut EpaHull, support_a: &A, support_b: &B, points: &mut EpaSupportPoints) -> bool
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let mut new_triangles = Vec::new();

    loop {
        let closest = match hull.peek_closest() {
            Some(t) => t,
            None => return true,
        };

        if hull.triangle(closest).closest_length_sq >= 0.0 {
            return true;
        }

        if points.len() >= EPA_MAX_POINTS_TO_INCLUDE_ORIGIN_IN_HULL {
            return false;
        }

        let tri_idx = hull.pop_closest().unwrap();
        let normal = hull.triangle(tri_idx).normal;
        let centroid = hull.triangle(tri_idx).centroid;

        let p = support_a.local_support_point(&normal);
        let q = support_b.local_support_point(&(-normal));
        let w = Point::from(p.coords - q.coords);

        if (w.coords - centroid.coords).dot(&normal) <= 0.0 {
            return false;
        }

        let new_idx = match points.push(p, q) {
            Some(i) => i,
            None => return false,
        };

        match hull.add_point(tri_idx, new_idx, points, Real::MAX, &mut new_triangles) {
            Ok(true) => {}
            _ => return false,
        }
    }
}

/// Phase 4: the main expansion loop. Returns the winning triangle's index
/// plus whether the sign-flip probe fired, or `None` if the shapes turned
/// out not to be penetrating.
fn expand<A, B>(
    hull: &mut EpaHull,
    support_a: &A,
    support_b: &B,
    points: &mut EpaSupportPoints,
    tau: Real,
) -> Option<(usize, bool)>
where
    A: ?Sized + SupportMap,
    B: ?Sized + SupportMap,
{
    let mut closest_dist_sq = Real::MAX;
    let mut last: Option<usize> = None;
    let mut flip_v_sign = false;
    let mut new_triangles = Vec::new();

    loop {
        let tri_idx = match hull.pop_closest() {
            Some(t) => t,
            None => break,
        };

        let t_closest_length_sq = hull.triangle(tri_idx).closest_length_sq;
        if t_closest_length_sq >= closest_dist_sq {
            hull.free_triangle(tri_idx);
            break;
        }
        if let Some(prev) = last {
            hull.free_triangle(prev);
        }
        last = Some(tri_idx);

        let normal = hull.triangle(tri_idx).normal;
        let centroid = hull.triangle(tri_idx).centroid;

        let p = support_a.local_support_point(&normal);
        let q = support_b.local_support_point(&(-normal));
        let w = Point::from(p.coords - q.coords);

        let dot = normal.dot(&w.coords);
        if dot < 0.0 {
            return None;
        }

        let n_sq = normal.norm_squared();
        let dist_sq = if n_sq > 0.0 { dot * dot / n_sq } else { 0.0 };

        if dist_sq - t_closest_length_sq < t_closest_length_sq * tau {
            break;
        }

        closest_dist_sq = closest_dist_sq.min(dist_sq);

        if (w.coords - centroid.coords).dot(&normal) <= 0.0 {
            break;
        }

        let new_idx = match points.push(p, q) {
            Some(i) => i,
            None => break,
        };

        match hull.add_point(tri_idx, new_idx, points, closest_dist_sq, &mut new_triangles) {
            Ok(true) => {}
            _ => break,
        }

        let mut defect = false;
        for &nt in &new_triangles {
            let n = hull.triangle(nt);
            if n.centroid.coords.dot(&n.normal) < 0.0 {
                defect = true;
                break;
            }
        }

        if defect {
            let probe_dir = -normal;
            let p2 = support_a.local_support_point(&probe_dir);
            let q2 = support_b.local_support_point(&(-probe_dir));
            let w2 = p2.coords - q2.coords;
            if probe_dir.dot(&w2) < dot {
                flip_v_sign = true;
            }
        }

        if points.len() >= EPA_MAX_POINTS {
            break;
        }
    }

    last.map(|idx| (idx, flip_v_sign))
}

/// Phase 5: reads the penetration axis and contact points off the winning
/// triangle.
fn extract_result(hull: &EpaHull, last: usize, flip_v_sign: bool, points: &EpaSupportPoints) -> EpaResult {
    let t = hull.triangle(last);
    let n_sq = t.normal.norm_squared();
    if n_sq <= 0.0 {
        return EpaResult::not_colliding();
    }

    let scale = t.centroid.coords.dot(&t.normal) / n_sq;
    let mut projection = t.normal * scale;

    if projection.norm_squared() < 1e-10 {
        return EpaResult::not_colliding();
    }

    if flip_v_sign {
        projection = -projection;
    }

    let (point_a, point_b) = t.contact_points(points);

    EpaResult {
        status: EpaStatus::Colliding,
        axis: projection,
        point_a,
        point_b,
    }
}
