//! Query layer: the GJK/EPA machinery (C1-C9), the convex-vs-convex driver
//! (C10), and the narrowphase dispatch table (C11).

pub mod collector;
pub mod convex_vs_convex;
pub mod dispatch;
pub mod epa;
pub mod gjk;
pub mod penetration;
pub mod results;
pub mod settings;

pub use collector::{
    CastAllCollector, CastAnyCollector, CastClosestCollector, CollideAllCollector,
    CollideAnyCollector, CollideClosestCollector, CollidePointAllCollector,
    CollidePointAnyCollector, CollidePointClosestCollector, Collector, InvertedCastCollector,
    InvertedCollideCollector,
};
pub use convex_vs_convex::{
    cast_convex_vs_convex, cast_ray_vs_convex, collide_convex_vs_convex, collide_point_vs_convex,
    NarrowphaseContext,
};
pub use dispatch::{
    cast_ray_vs_shape, collide_point_vs_shape, collide_point_vs_shape_hit, NarrowphaseDispatcher,
    PosedShape,
};
pub use results::{
    BodyId, CastRayHit, CollidePointHit, CollideShapeHit, CastShapeHit, MaterialId, SubShapeId,
};
pub use settings::{CastRaySettings, CastShapeSettings, CollidePointSettings, CollideShapeSettings};
