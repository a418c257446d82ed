//! Result records (spec §6). Plain output buffers the caller owns and the
//! core mutates in place, mirrored here as caller-constructed values
//! returned from each top-level query function.

use crate::math::{Point, Real, Vector};
use crate::shape::SupportingFace;

/// Identifies a sub-shape within a (possibly compound) shape. The core
/// treats this opaquely; compounds/meshes are out of scope (spec §1).
pub type SubShapeId = u32;
pub type BodyId = u64;
pub type MaterialId = u32;

/// Result of `castRayVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CastRayHit {
    pub fraction: Real,
    pub sub_shape_id: SubShapeId,
    pub body_id_b: BodyId,
    pub material_id: MaterialId,
}

/// Result of `castShapeVsShape` (spec §6).
#[derive(Clone, Debug)]
pub struct CastShapeHit {
    pub fraction: Real,
    pub point_a: Point,
    pub point_b: Point,
    pub penetration_depth: Real,
    pub penetration_axis: Vector,
    pub normal: Vector,
    pub sub_shape_id_a: SubShapeId,
    pub sub_shape_id_b: SubShapeId,
    pub material_id_a: MaterialId,
    pub material_id_b: MaterialId,
    pub face_a: SupportingFace,
    pub face_b: SupportingFace,
    pub body_id_b: BodyId,
}

/// Result of `collideShapeVsShape` (spec §6).
#[derive(Clone, Debug)]
pub struct CollideShapeHit {
    pub point_a: Point,
    pub point_b: Point,
    pub penetration_axis: Vector,
    pub penetration: Real,
    pub sub_shape_id_a: SubShapeId,
    pub sub_shape_id_b: SubShapeId,
    pub material_id_a: MaterialId,
    pub material_id_b: MaterialId,
    pub face_a: SupportingFace,
    pub face_b: SupportingFace,
    pub body_id_b: BodyId,
}

/// Result of `collidePointVsShape` (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct CollidePointHit {
    pub sub_shape_id_b: SubShapeId,
    pub body_id_b: BodyId,
    pub material_id: MaterialId,
}
