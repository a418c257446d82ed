//! Settings records (spec §6): per-call knobs for the four top-level query
//! kinds. Plain data, defaulted the way the teacher defaults its own
//! per-query option structs.

use crate::math::{Real, Vector};

/// Settings for `castRayVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CastRaySettings {
    /// Include back-face triangles as hits.
    pub collide_with_backfaces: bool,
    /// If the ray starts inside a convex shape, report a hit at fraction 0
    /// instead of a silent miss.
    pub treat_convex_as_solid: bool,
}

impl Default for CastRaySettings {
    fn default() -> Self {
        CastRaySettings {
            collide_with_backfaces: false,
            treat_convex_as_solid: true,
        }
    }
}

/// Settings for `castShapeVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CastShapeSettings {
    pub collide_with_backfaces: bool,
    pub collect_faces: bool,
    /// GJK convergence tolerance, in metres.
    pub collision_tolerance: Real,
    /// EPA convergence tolerance, dimensionless.
    pub penetration_tolerance: Real,
    /// Enable the EPA fallback at `lambda = 0` (spec §4.9).
    pub return_deepest_point: bool,
    pub use_shrunken_shape_and_convex_radius: bool,
    pub collide_only_with_active_edges: bool,
    pub active_edge_movement_direction: Vector,
}

impl Default for CastShapeSettings {
    fn default() -> Self {
        CastShapeSettings {
            collide_with_backfaces: false,
            collect_faces: false,
            collision_tolerance: 0.01,
            penetration_tolerance: 0.01,
            return_deepest_point: true,
            use_shrunken_shape_and_convex_radius: false,
            collide_only_with_active_edges: false,
            active_edge_movement_direction: Vector::zeros(),
        }
    }
}

/// Settings for `collideShapeVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CollideShapeSettings {
    /// Report contacts within this distance of actually touching, `[0, 1]`.
    pub max_separation_distance: Real,
    pub collision_tolerance: Real,
    pub penetration_tolerance: Real,
    pub return_deepest_point: bool,
    pub collide_with_backfaces: bool,
    pub collide_only_with_active_edges: bool,
    pub active_edge_movement_direction: Vector,
    pub collect_faces: bool,
}

impl Default for CollideShapeSettings {
    fn default() -> Self {
        CollideShapeSettings {
            max_separation_distance: 0.0,
            collision_tolerance: 1e-4,
            penetration_tolerance: 1e-4,
            return_deepest_point: true,
            collide_with_backfaces: false,
            collide_only_with_active_edges: false,
            active_edge_movement_direction: Vector::zeros(),
            collect_faces: false,
        }
    }
}

/// Settings for `collidePointVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CollidePointSettings {
    pub collision_tolerance: Real,
}

impl Default for CollidePointSettings {
    fn default() -> Self {
        CollidePointSettings { collision_tolerance: 1e-4 }
    }
}
