//! GJK closest-points / ray-cast / shape-cast, exercised directly against
//! [`narrowphase_core::test_shapes`] support functions rather than through
//! the full narrowphase driver (see `narrowphase_tests.rs` for that).

use approx::assert_relative_eq;

use narrowphase_core::query::gjk::{gjk_cast_ray, gjk_cast_shape, gjk_closest_points, Simplex};
use narrowphase_core::shape::{ShapeAdapter, SupportFunctionMode, TransformedSupport};
use narrowphase_core::test_shapes::{Box3, Sphere};
use narrowphase_core::{Isometry, Point, Real, Vector};

fn identity_quat() -> nalgebra::UnitQuaternion<Real> {
    nalgebra::UnitQuaternion::identity()
}

const TAU: f32 = 1e-5;

#[test]
fn closest_points_between_separated_spheres() {
    let a = Sphere { radius: 1.0 };
    let b = Sphere { radius: 1.0 };
    let support_a = a.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let support_b = b.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let pos_b_in_a = Isometry::translation(5.0, 0.0, 0.0);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    let mut simplex = Simplex::new();
    let result = gjk_closest_points(&support_a, &support_b_in_a, TAU, Vector::x(), Real::MAX, &mut simplex);

    assert_relative_eq!(result.squared_distance, 9.0, epsilon = 1e-2);
    assert_relative_eq!(result.point_a, Point::new(1.0, 0.0, 0.0), epsilon = 1e-2);
    assert_relative_eq!(result.point_b, Point::new(4.0, 0.0, 0.0), epsilon = 1e-2);
}

#[test]
fn closest_points_collapse_when_spheres_touch() {
    let a = Sphere { radius: 1.0 };
    let b = Sphere { radius: 1.0 };
    let support_a = a.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let support_b = b.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let pos_b_in_a = Isometry::translation(2.0, 0.0, 0.0);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    let mut simplex = Simplex::new();
    let result = gjk_closest_points(&support_a, &support_b_in_a, TAU, Vector::x(), Real::MAX, &mut simplex);

    assert!(result.squared_distance < 1e-2);
}

#[test]
fn cast_ray_hits_sphere_at_expected_fraction() {
    let sphere = Sphere { radius: 1.0 };
    let support = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let mut simplex = Simplex::new();

    let origin = Point::new(5.0, 0.0, 0.0);
    let direction = Vector::new(-10.0, 0.0, 0.0);
    let fraction = gjk_cast_ray(origin, direction, TAU, &support, 1.0, &mut simplex).expect("ray must hit the sphere");

    assert_relative_eq!(fraction, 0.4, epsilon = 1e-3);
}

#[test]
fn cast_ray_misses_sphere_off_axis() {
    let sphere = Sphere { radius: 1.0 };
    let support = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let mut simplex = Simplex::new();

    let origin = Point::new(5.0, 5.0, 0.0);
    let direction = Vector::new(-10.0, 0.0, 0.0);
    assert!(gjk_cast_ray(origin, direction, TAU, &support, 1.0, &mut simplex).is_none());
}

#[test]
fn cast_shape_sweeps_box_into_stationary_box() {
    let moving = Box3 { half_extents: Vector::repeat(0.5) };
    let stationary = Box3 { half_extents: Vector::repeat(0.5) };
    let support_a = moving.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let support_b = stationary.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let mut simplex = Simplex::new();

    // Moving box starts 4 units to the left of a stationary box, both with
    // half-extent 0.5; sweeping it 4 units to the right should make contact
    // once the boxes' faces are 1 unit apart from each other's centres.
    let pos_a_in_b = Point::new(-4.0, 0.0, 0.0);
    let displacement = Vector::new(4.0, 0.0, 0.0);

    let hit = gjk_cast_shape(
        pos_a_in_b,
        identity_quat(),
        &support_a,
        &support_b,
        displacement,
        TAU,
        0.0,
        0.0,
        1.0,
        &mut simplex,
    )
    .expect("sweeping box must hit the stationary box");

    assert_relative_eq!(hit.lambda, 0.75, epsilon = 1e-2);
    assert!(hit.separating_axis.x < 0.0);
}

#[test]
fn cast_shape_misses_when_displacement_falls_short() {
    let moving = Box3 { half_extents: Vector::repeat(0.5) };
    let stationary = Box3 { half_extents: Vector::repeat(0.5) };
    let support_a = moving.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let support_b = stationary.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let mut simplex = Simplex::new();

    let pos_a_in_b = Point::new(-4.0, 0.0, 0.0);
    let displacement = Vector::new(1.0, 0.0, 0.0);

    assert!(gjk_cast_shape(
        pos_a_in_b,
        identity_quat(),
        &support_a,
        &support_b,
        displacement,
        TAU,
        0.0,
        0.0,
        1.0,
        &mut simplex
    )
    .is_none());
}
