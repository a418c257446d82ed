//! The Expanding Polytope Algorithm (spec §4.7-§4.8, components C6-C7).

mod epa;
mod hull;
mod triangle;

pub use epa::{penetration_depth_step_epa, EpaResult, EpaStatus};
pub use hull::EpaHull;
pub use triangle::{
    EpaEdge, EpaSupportPoints, EpaTriangle, LambdaAnchor, EPA_BARYCENTRIC_EPSILON, EPA_MAX_EDGE_LENGTH,
    EPA_MAX_POINTS, EPA_MAX_POINTS_TO_INCLUDE_ORIGIN_IN_HULL, EPA_MAX_TRIANGLES, EPA_MIN_TRIANGLE_AREA,
};
