//! Penetration-depth orchestration: the GJK `Indeterminate` handoff into
//! EPA, and EPA's own witness-point invariants, against
//! [`narrowphase_core::test_shapes`] shapes.

use approx::assert_relative_eq;

use narrowphase_core::query::epa::{penetration_depth_step_epa, EpaStatus};
use narrowphase_core::query::gjk::Simplex;
use narrowphase_core::query::penetration::{penetration_depth_step_gjk, PenetrationStatus};
use narrowphase_core::shape::{ShapeAdapter, SupportFunctionMode, TransformedSupport};
use narrowphase_core::test_shapes::{Box3, Sphere};
use narrowphase_core::{Isometry, Vector};

const TAU: f32 = 1e-5;

#[test]
fn gjk_step_resolves_shallow_overlap_without_epa() {
    // Two unit spheres whose centres are 1 unit apart overlap (radii sum to
    // 2), but GJK's core (radius-excluded) supports both collapse to the
    // local origin, so squared_distance stays strictly between 0 and
    // (rA+rB)^2: the GJK step alone classifies this as Colliding.
    let sphere = Sphere { radius: 1.0 };
    let support_a = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let support_b = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let pos_b_in_a = Isometry::translation(1.0, 0.0, 0.0);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    let mut simplex = Simplex::new();
    let result = penetration_depth_step_gjk(&support_a, &support_b_in_a, 1.0, 1.0, Vector::x(), TAU, &mut simplex);

    assert_eq!(result.status, PenetrationStatus::Colliding);
    assert_relative_eq!(result.axis.norm(), 1.0, epsilon = 1e-2);
}

#[test]
fn epa_recovers_deep_penetration_between_concentric_spheres() {
    // Two radius-2 spheres sharing a centre: GJK's core supports both
    // collapse to the same point (zero separation, Indeterminate), handing
    // off to EPA on the full (radius-included) Minkowski difference, which
    // is itself a sphere of radius rA+rB.
    let sphere = Sphere { radius: 2.0 };
    let core_a = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let core_b = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));

    let mut simplex = Simplex::new();
    let gjk_step = penetration_depth_step_gjk(&core_a, &core_b, 2.0, 2.0, Vector::x(), TAU, &mut simplex);
    assert_eq!(gjk_step.status, PenetrationStatus::Indeterminate);

    let full_a = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let full_b = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let epa = penetration_depth_step_epa(&full_a, &full_b, TAU, &simplex);

    assert_eq!(epa.status, EpaStatus::Colliding);
    assert_relative_eq!(epa.axis.norm(), 4.0, epsilon = 0.5);

    let separation = epa.point_b - epa.point_a;
    assert!(separation.dot(&epa.axis) >= -1e-3);
    assert_relative_eq!(epa.axis.norm(), separation.norm(), epsilon = 0.05);
}

#[test]
fn epa_recovers_penetration_between_rotated_overlapping_boxes() {
    let box_a = Box3 { half_extents: Vector::repeat(1.0) };
    let box_b = Box3 { half_extents: Vector::repeat(1.0) };
    let core_a = box_a.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let core_b = box_b.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));

    let pos_b_in_a = Isometry::from_parts(
        Vector::new(0.8, 0.0, 0.0).into(),
        nalgebra::UnitQuaternion::from_axis_angle(&Vector::z_axis(), std::f32::consts::FRAC_PI_4),
    );
    let core_b_in_a = TransformedSupport::new(pos_b_in_a, core_b);

    let mut simplex = Simplex::new();
    let gjk_step = penetration_depth_step_gjk(&core_a, &core_b_in_a, 0.0, 0.0, Vector::x(), TAU, &mut simplex);
    assert_eq!(gjk_step.status, PenetrationStatus::Indeterminate);

    let epa = penetration_depth_step_epa(&core_a, &core_b_in_a, TAU, &simplex);

    assert_eq!(epa.status, EpaStatus::Colliding);
    assert!(epa.axis.norm() > 0.0);

    let separation = epa.point_b - epa.point_a;
    assert!(separation.dot(&epa.axis) >= -1e-3);
    assert_relative_eq!(epa.axis.norm(), separation.norm(), epsilon = 0.05);
}
