//! A narrowphase collision core: GJK closest-points/ray-cast/shape-cast,
//! EPA penetration depth, and the convex-vs-convex driver and dispatch
//! table built on top of them.
//!
//! Concrete shapes (sphere, box, mesh, ...) are deliberately out of scope
//! (see [`shape`]); callers implement [`shape::ShapeAdapter`] for whatever
//! shape representation they already have and register it with a
//! [`query::NarrowphaseDispatcher`]. The `test-shapes` feature ships a
//! handful of such shapes for this crate's own tests and benchmarks.
//!
//! No broadphase, no constraint solver, no body/world bookkeeping: this
//! crate answers exactly one question per call, "do these two convex
//! supports touch, and if so where and how deep".

pub mod error;
pub mod math;
pub mod query;
pub mod shape;

#[cfg(any(test, feature = "test-shapes"))]
pub mod test_shapes;

pub use error::{NarrowphaseError, NarrowphaseResult};
pub use math::{Isometry, Point, Quat, Real, UnitVector, Vector, DIM};
