//! The Gilbert–Johnson–Keerthi distance algorithm (spec §4.4–§4.6,
//! component C5), and the simplex machinery it runs on (C1–C3).

mod barycentric;
mod closest;
mod cso_point;
mod gjk_impl;
mod simplex;

pub use closest::ClosestPointResult;
pub use cso_point::CSOPoint;
pub use gjk_impl::{gjk_cast_ray, gjk_cast_shape, gjk_closest_points, GJKCastShapeResult, GJKResult};
pub use simplex::Simplex;

use crate::math::Real;

/// `GJK_TOLERANCE` (spec §6): relative convergence tolerance for the
/// separating-axis bracketing in [`gjk_closest_points`].
pub const GJK_TOLERANCE: Real = 1e-5;

/// `GJK_MAX_ITERATIONS` (spec §5/§6): hard cap on GJK's main loop, giving a
/// deterministic worst-case runtime.
pub const GJK_MAX_ITERATIONS: usize = 100;
