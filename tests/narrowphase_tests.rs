//! End-to-end narrowphase scenarios driven through
//! [`narrowphase_core::query::NarrowphaseDispatcher`], the top-level entry
//! point every concrete query in this crate ultimately goes through.

use approx::assert_relative_eq;

use narrowphase_core::query::collector::{CastAllCollector, CollideAllCollector};
use narrowphase_core::query::{
    cast_ray_vs_shape, CastRaySettings, CastShapeSettings, CollideShapeSettings, NarrowphaseContext,
    NarrowphaseDispatcher, PosedShape,
};
use narrowphase_core::shape::{DynShapeAdapter, ShapeType};
use narrowphase_core::test_shapes::{Box3, HalfSpace, Sphere, Triangle};
use narrowphase_core::{Isometry, Point, Vector};

fn posed<'a>(shape: &'a dyn DynShapeAdapter, pose: Isometry, sub_shape_id: u32, body_id: u64) -> PosedShape<'a> {
    PosedShape { shape, pose, scale: Vector::repeat(1.0), sub_shape_id, body_id }
}

fn dispatcher_for(types: &[ShapeType]) -> NarrowphaseDispatcher {
    let mut dispatcher = NarrowphaseDispatcher::new();
    dispatcher.register_all_convex_pairs(types);
    dispatcher
}

#[test]
fn sphere_vs_sphere_shallow_overlap() {
    let dispatcher = dispatcher_for(&[ShapeType::TestSphere]);
    let mut ctx = NarrowphaseContext::new();

    let sphere_a = Sphere { radius: 1.0 };
    let sphere_b = Sphere { radius: 1.0 };
    let a = posed(&sphere_a, Isometry::identity(), 0, 1);
    let b = posed(&sphere_b, Isometry::translation(1.99, 0.0, 0.0), 0, 2);

    let mut collector = CollideAllCollector::default();
    dispatcher.collide_shape_vs_shape(&mut ctx, &CollideShapeSettings::default(), &a, &b, &mut collector);

    assert_eq!(collector.hits.len(), 1);
    let hit = &collector.hits[0];
    assert!(hit.penetration > 0.0 && hit.penetration < 0.1, "penetration = {}", hit.penetration);
    let axis = hit.penetration_axis.try_normalize(1e-6).expect("nonzero axis");
    assert_relative_eq!(axis.x.abs(), 1.0, epsilon = 1e-2);
    assert_eq!(hit.body_id_b, 2);
}

#[test]
fn sphere_deeply_inside_sphere() {
    let dispatcher = dispatcher_for(&[ShapeType::TestSphere]);
    let mut ctx = NarrowphaseContext::new();

    let sphere_a = Sphere { radius: 2.0 };
    let sphere_b = Sphere { radius: 2.0 };
    let pose = Isometry::translation(1.0, 2.0, 3.0);
    let a = posed(&sphere_a, pose, 0, 1);
    let b = posed(&sphere_b, pose, 0, 2);

    let mut collector = CollideAllCollector::default();
    dispatcher.collide_shape_vs_shape(&mut ctx, &CollideShapeSettings::default(), &a, &b, &mut collector);

    assert_eq!(collector.hits.len(), 1);
    assert_relative_eq!(collector.hits[0].penetration, 4.0, epsilon = 0.5);
}

#[test]
fn rotated_boxes_overlap_along_a_nontrivial_axis() {
    let dispatcher = dispatcher_for(&[ShapeType::TestBox]);
    let mut ctx = NarrowphaseContext::new();

    let box_a = Box3 { half_extents: Vector::repeat(1.0) };
    let box_b = Box3 { half_extents: Vector::repeat(1.0) };
    let a = posed(&box_a, Isometry::identity(), 0, 1);
    let pose_b = Isometry::from_parts(
        Vector::new(0.8, 0.0, 0.0).into(),
        nalgebra::UnitQuaternion::from_axis_angle(&Vector::z_axis(), std::f32::consts::FRAC_PI_4),
    );
    let b = posed(&box_b, pose_b, 0, 2);

    let mut collector = CollideAllCollector::default();
    dispatcher.collide_shape_vs_shape(&mut ctx, &CollideShapeSettings::default(), &a, &b, &mut collector);

    assert_eq!(collector.hits.len(), 1);
    let hit = &collector.hits[0];
    assert!(hit.penetration > 0.0);
    assert!(hit.penetration_axis.norm() > 1e-4);
}

#[test]
fn ray_hits_sphere_at_expected_fraction() {
    let mut ctx = NarrowphaseContext::new();
    let sphere = Sphere { radius: 1.0 };
    let shape = posed(&sphere, Isometry::identity(), 0, 7);

    let mut collector = CastAllCollector::default();
    let hit = cast_ray_vs_shape(
        &mut ctx,
        &CastRaySettings::default(),
        Point::new(3.0, 0.0, 0.0),
        Vector::new(-1.0, 0.0, 0.0),
        1e-5,
        &shape,
        &mut collector,
    )
    .expect("ray must hit the sphere");

    assert_relative_eq!(hit.fraction, 0.2, epsilon = 1e-2);
    assert_eq!(hit.body_id_b, 7);
}

#[test]
fn box_shape_cast_lands_on_half_space_plane() {
    let dispatcher = dispatcher_for(&[ShapeType::TestBox, ShapeType::TestHalfSpace]);
    let mut ctx = NarrowphaseContext::new();

    // HalfSpace's local solid region is `{p.z <= 0}` with surface normal
    // `+z`; keep both shapes unrotated so the plane's own native axis lines
    // up with the sweep direction directly.
    let moving_box = Box3 { half_extents: Vector::repeat(0.5) };
    let plane = HalfSpace;
    let a = posed(&moving_box, Isometry::translation(0.0, 0.0, 2.0), 0, 1);
    let b = posed(&plane, Isometry::identity(), 0, 3);

    let mut collector = CastAllCollector::default();
    dispatcher.cast_shape_vs_shape(
        &mut ctx,
        &CastShapeSettings::default(),
        &a,
        Vector::new(0.0, 0.0, -2.0),
        &b,
        &mut collector,
    );

    assert_eq!(collector.hits.len(), 1);
    let hit = &collector.hits[0];
    // The box's bottom face starts 1.5 units above the plane (centre at
    // z=2, half-extent 0.5) and the sweep covers 2 units total, so contact
    // lands at fraction 1.5/2 = 0.75.
    assert_relative_eq!(hit.fraction, 0.75, epsilon = 0.05);
    assert_relative_eq!(hit.normal.z, 1.0, epsilon = 0.1);
}

#[test]
fn sphere_vs_triangle_respects_backface_culling_setting() {
    let dispatcher = dispatcher_for(&[ShapeType::TestSphere, ShapeType::TestTriangle]);
    let mut ctx = NarrowphaseContext::new();

    // Counter-clockwise winding viewed from +z gives an outward normal of
    // +z; the sphere pokes through from the -z (back) side.
    let triangle = Triangle {
        vertices: [Point::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), Point::new(0.0, 2.0, 0.0)],
    };
    let sphere = Sphere { radius: 0.5 };
    let a = posed(&sphere, Isometry::translation(0.5, 0.5, -0.2), 0, 1);
    let b = posed(&triangle, Isometry::identity(), 0, 9);

    let mut cull_settings = CollideShapeSettings::default();
    cull_settings.collide_with_backfaces = false;
    let mut collector = CollideAllCollector::default();
    dispatcher.collide_shape_vs_shape(&mut ctx, &cull_settings, &a, &b, &mut collector);
    assert!(collector.hits.is_empty(), "back-face hit should be culled by default");

    let mut permissive_settings = CollideShapeSettings::default();
    permissive_settings.collide_with_backfaces = true;
    let mut collector = CollideAllCollector::default();
    dispatcher.collide_shape_vs_shape(&mut ctx, &permissive_settings, &a, &b, &mut collector);
    assert_eq!(collector.hits.len(), 1);
    assert!(collector.hits[0].penetration > 0.0);
}

#[test]
fn ray_vs_triangle_respects_backface_culling_setting() {
    let mut ctx = NarrowphaseContext::new();

    // Same winding as `sphere_vs_triangle_respects_backface_culling_setting`:
    // outward normal is +z. A ray travelling in +z, starting below the
    // triangle, strikes its back side.
    let triangle = Triangle {
        vertices: [Point::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), Point::new(0.0, 2.0, 0.0)],
    };
    let shape = posed(&triangle, Isometry::identity(), 0, 4);

    let mut cull_settings = CastRaySettings::default();
    cull_settings.collide_with_backfaces = false;
    let mut collector = CastAllCollector::default();
    let hit = cast_ray_vs_shape(
        &mut ctx,
        &cull_settings,
        Point::new(0.5, 0.5, -1.0),
        Vector::new(0.0, 0.0, 1.0),
        1e-5,
        &shape,
        &mut collector,
    );
    assert!(hit.is_none(), "back-face ray hit should be culled by default");

    let mut permissive_settings = CastRaySettings::default();
    permissive_settings.collide_with_backfaces = true;
    let mut collector = CastAllCollector::default();
    let hit = cast_ray_vs_shape(
        &mut ctx,
        &permissive_settings,
        Point::new(0.5, 0.5, -1.0),
        Vector::new(0.0, 0.0, 1.0),
        1e-5,
        &shape,
        &mut collector,
    )
    .expect("back-face ray hit must be reported when collide_with_backfaces is set");
    assert_relative_eq!(hit.fraction, 0.5, epsilon = 1e-2);
}
