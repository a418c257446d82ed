//! Hard-error surface of the narrowphase core.
//!
//! Per spec: "no collision" and "collision" are never errors — they are
//! ordinary return values or collector callbacks. The one programmer-error
//! path actually wired to [`NarrowphaseError`] in this crate is
//! [`crate::query::epa::EpaHull`]'s triangle pool running out during hull
//! construction; an unregistered dispatch-table pair is a silent
//! `log::trace!` miss (spec §6: "Absent entries mean 'no collision'"), and a
//! corrupted simplex size is a debug-only `unreachable!` inside
//! [`crate::query::gjk::Simplex`], since both are invariants this crate
//! enforces by construction rather than by validating at the call boundary.

use thiserror::Error;

/// A hard programmer error raised by the narrowphase core.
///
/// Currently raised only by the EPA hull builder when its fixed triangle
/// pool (`EPA_MAX_TRIANGLES`) is exhausted — a state well-formed convex
/// inputs should never reach. Deliberately distinct from the
/// `NOT_COLLIDING` / `COLLIDING` outcomes that flow through collectors.
#[derive(Debug, Error)]
pub enum NarrowphaseError {
    /// A caller passed an argument outside the documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The core reached an internal state it should never reach from valid
    /// inputs (e.g. a simplex with `size` outside `0..=4`).
    #[error("invalid internal state: {0}")]
    InvalidState(String),
}

/// Convenience alias for fallible entry points of the core.
pub type NarrowphaseResult<T> = Result<T, NarrowphaseError>;
