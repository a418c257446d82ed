//! The support-function abstraction (spec §4.3, component C4).
//!
//! Concrete shapes (sphere, box, capsule, convex hull, ...) are out of
//! scope for this crate; they are external collaborators that produce
//! [`SupportMap`] implementations. This module only defines the capability
//! the core consumes, plus the wrapper types (transform / convex-radius /
//! point) every driver needs to compose around a raw shape support.

mod support;

pub use support::{AddConvexRadiusSupport, PointSupport, TransformedSupport};

use crate::math::{Isometry, Point, Real, Vector};

/// Whether a support function's advertised surface already includes the
/// shape's convex radius, or excludes it (leaving the radius to be handled
/// separately by the caller, typically by inflating distances rather than
/// the support points themselves).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SupportFunctionMode {
    /// The returned support points lie on the core (shrunken) shape; the
    /// convex radius must be added back in by the caller.
    ExcludeConvexRadius,
    /// The returned support points already lie on the radius-inflated
    /// surface; `convex_radius()` on such a support should read `0.0`.
    IncludeConvexRadius,
}

/// `s_X(d) = argmax_{x in X} d . x`, the farthest point of a convex set `X`
/// along a direction `d`.
///
/// Implementors never allocate; `getSupport` is called up to
/// `GJK_MAX_ITERATIONS` times per query and must be cheap.
pub trait SupportMap {
    /// Farthest point of this shape, in its own local space, along `dir`.
    /// `dir` need not be normalized.
    fn local_support_point(&self, dir: &Vector) -> Point;

    /// Farthest point of this shape along `dir`, where `dir` is expressed
    /// in some other frame and `pos12` maps that frame into this shape's
    /// local frame (`pos12` is "other shape's pose expressed relative to
    /// this one", matching the `pos12` convention used throughout GJK/EPA).
    fn support_point(&self, pos12: &Isometry, dir: &Vector) -> Point {
        let local_dir = pos12.inverse_transform_vector(dir);
        pos12 * self.local_support_point(&local_dir)
    }

    /// Radius of the virtual sphere Minkowski-summed with this shape's core
    /// geometry. Zero for shapes with no rounding (boxes, triangles, ...).
    fn convex_radius(&self) -> Real {
        0.0
    }
}

/// Category a shape adapter advertises; narrowphase dispatch only ever
/// pairs up `Convex` shapes directly — `NonConvex` shapes (meshes,
/// compounds) are handled by a broadphase/BVH layer that feeds this core
/// one convex sub-part at a time (out of scope here, spec §1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeCategory {
    Convex,
    NonConvex,
}

/// A world-space convex polygon returned by [`ShapeAdapter::supporting_face`],
/// used to build a multi-point contact manifold on top of a single GJK/EPA
/// contact pair.
#[derive(Clone, Debug, Default)]
pub struct SupportingFace {
    pub vertices: Vec<Point>,
}

/// Discriminator a shape adapter advertises (spec §6: "`type`
/// (discriminator)"), used as the dispatch-table key (component C11). New
/// concrete shape crates add a variant here and register their function
/// pointers under it; this crate's own entries are `TestSphere`..`TestHalfSpace`
/// ([`crate::test_shapes`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ShapeType {
    TestSphere,
    TestBox,
    TestCapsule,
    TestHalfSpace,
    TestTriangle,
}

/// The capability set spec §6 asks every concrete shape type to expose to
/// the core. Concrete implementations live outside this crate; a small
/// subset (`src/test_shapes.rs`) is provided so the test suite has
/// something convex to collide.
pub trait ShapeAdapter {
    /// The support-map type this adapter hands back. Kept as an associated
    /// type (rather than `Box<dyn SupportMap>`) so GJK/EPA can be
    /// monomorphised over it in hot loops (spec §9).
    type Support: SupportMap;

    /// Dispatch-table discriminator for this shape (spec §6).
    fn shape_type(&self) -> ShapeType;

    fn category(&self) -> ShapeCategory;

    /// Local-space half-extents of this shape's scaled AABB.
    fn local_half_extents(&self, scale: Vector) -> Vector;

    /// Local-space centre of mass.
    fn local_center_of_mass(&self, scale: Vector) -> Point;

    /// Largest sphere, centred at the local origin, entirely contained in
    /// this shape. Used by broadphase/CCD heuristics outside this crate;
    /// exposed here because it is a per-shape static attribute like AABB.
    fn inner_radius(&self, scale: Vector) -> Real;

    /// Builds a support function for this shape under the given scale and
    /// convex-radius mode.
    fn support_function(&self, mode: SupportFunctionMode, scale: Vector) -> Self::Support;

    /// The supporting face (in world space) of this shape along `direction`
    /// (expressed in world space), used to extend a single contact point
    /// into a manifold.
    fn supporting_face(
        &self,
        direction: &Vector,
        world_pose: &Isometry,
        scale: Vector,
    ) -> SupportingFace;

    /// Outward surface normal at a feature of this shape (used as a
    /// fallback when a supporting face degenerates to a single vertex).
    fn surface_normal(&self, local_point: &Point) -> Vector;

    /// Opaque per-shape material identifier (spec §6 result records carry
    /// `materialId`); shapes with no material concept return `0`.
    fn material_id(&self) -> crate::query::MaterialId {
        0
    }
}

/// Dyn-compatible facade over [`ShapeAdapter`], erasing the associated
/// `Support` type so the narrowphase dispatch table (C11) can hold
/// heterogeneous shape references keyed only by [`ShapeType`]. GJK/EPA
/// themselves never see this trait — only the outer dispatch boundary pays
/// the one virtual-call indirection spec §9 allows ("avoid virtual-call
/// overhead in inner loops", not at the dispatch boundary itself).
pub trait DynShapeAdapter {
    fn shape_type(&self) -> ShapeType;
    fn category(&self) -> ShapeCategory;
    fn local_half_extents(&self, scale: Vector) -> Vector;
    fn local_center_of_mass(&self, scale: Vector) -> Point;
    fn inner_radius(&self, scale: Vector) -> Real;
    fn dyn_support_function(&self, mode: SupportFunctionMode, scale: Vector) -> Box<dyn SupportMap>;
    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace;
    fn surface_normal(&self, local_point: &Point) -> Vector;
    fn material_id(&self) -> crate::query::MaterialId;
}

impl<T> DynShapeAdapter for T
where
    T: ShapeAdapter,
    T::Support: 'static,
{
    fn shape_type(&self) -> ShapeType {
        ShapeAdapter::shape_type(self)
    }

    fn category(&self) -> ShapeCategory {
        ShapeAdapter::category(self)
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        ShapeAdapter::local_half_extents(self, scale)
    }

    fn local_center_of_mass(&self, scale: Vector) -> Point {
        ShapeAdapter::local_center_of_mass(self, scale)
    }

    fn inner_radius(&self, scale: Vector) -> Real {
        ShapeAdapter::inner_radius(self, scale)
    }

    fn dyn_support_function(&self, mode: SupportFunctionMode, scale: Vector) -> Box<dyn SupportMap> {
        Box::new(ShapeAdapter::support_function(self, mode, scale))
    }

    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        ShapeAdapter::supporting_face(self, direction, world_pose, scale)
    }

    fn surface_normal(&self, local_point: &Point) -> Vector {
        ShapeAdapter::surface_normal(self, local_point)
    }

    fn material_id(&self) -> crate::query::MaterialId {
        ShapeAdapter::material_id(self)
    }
}

impl SupportMap for Box<dyn SupportMap> {
    fn local_support_point(&self, dir: &Vector) -> Point {
        self.as_ref().local_support_point(dir)
    }

    fn convex_radius(&self) -> Real {
        self.as_ref().convex_radius()
    }
}
