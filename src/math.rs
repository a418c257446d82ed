//! Value types shared by the narrowphase core.
//!
//! These are thin aliases over `nalgebra`; the core never re-derives vector
//! math of its own (dot/cross/normalize all come straight from `na`).

/// The scalar type used throughout the core.
pub type Real = f32;

/// A point in 3-D space.
pub type Point = nalgebra::Point3<Real>;

/// A free vector in 3-D space.
pub type Vector = nalgebra::Vector3<Real>;

/// A unit-length vector, kept normalized by construction.
pub type UnitVector = nalgebra::Unit<Vector>;

/// A rigid rotation.
pub type Quat = nalgebra::UnitQuaternion<Real>;

/// A rigid transform (rotation + translation), used for the relative pose
/// between two shapes (`pos12`, `quatAInB`, ...).
pub type Isometry = nalgebra::Isometry3<Real>;

/// Dimensionality of the ambient space. GJK/EPA terminate once a simplex of
/// this dimension (a tetrahedron) is reached.
pub const DIM: usize = 3;

/// Absolute floating point epsilon, matching `f32::EPSILON` but named so
/// call sites read as "the tolerance", not a magic re-derivation.
pub const DEFAULT_EPSILON: Real = Real::EPSILON;
