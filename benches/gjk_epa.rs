use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use narrowphase_core::query::epa::penetration_depth_step_epa;
use narrowphase_core::query::gjk::{gjk_closest_points, Simplex};
use narrowphase_core::query::penetration::penetration_depth_step_gjk;
use narrowphase_core::shape::{ShapeAdapter, SupportFunctionMode, TransformedSupport};
use narrowphase_core::test_shapes::{Box3, Sphere};
use narrowphase_core::{Isometry, Real, Vector};

fn bench_gjk_closest_points_separated_spheres(c: &mut Criterion) {
    let sphere_a = Sphere { radius: 1.0 };
    let sphere_b = Sphere { radius: 1.0 };
    let support_a = sphere_a.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let support_b = sphere_b.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let pos_b_in_a = Isometry::translation(3.0, 0.0, 0.0);
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    c.bench_function("gjk/closest_points_separated_spheres", |b| {
        b.iter(|| {
            let mut simplex = Simplex::new();
            let result = gjk_closest_points(
                &support_a,
                &support_b_in_a,
                1e-5,
                Vector::x(),
                Real::MAX,
                &mut simplex,
            );
            black_box(result.squared_distance);
        })
    });
}

fn bench_gjk_closest_points_rotated_boxes(c: &mut Criterion) {
    let box_a = Box3 { half_extents: Vector::repeat(1.0) };
    let box_b = Box3 { half_extents: Vector::repeat(1.0) };
    let support_a = box_a.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let support_b = box_b.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let pos_b_in_a = Isometry::from_parts(
        Vector::new(3.0, 0.5, 0.0).into(),
        nalgebra::UnitQuaternion::from_axis_angle(&Vector::z_axis(), std::f32::consts::FRAC_PI_4),
    );
    let support_b_in_a = TransformedSupport::new(pos_b_in_a, support_b);

    c.bench_function("gjk/closest_points_rotated_boxes", |b| {
        b.iter(|| {
            let mut simplex = Simplex::new();
            let result = gjk_closest_points(
                &support_a,
                &support_b_in_a,
                1e-5,
                Vector::x(),
                Real::MAX,
                &mut simplex,
            );
            black_box(result.squared_distance);
        })
    });
}

fn bench_epa_deep_penetration(c: &mut Criterion) {
    let sphere = Sphere { radius: 2.0 };
    let core_a = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let core_b = sphere.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
    let full_a = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
    let full_b = sphere.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));

    c.bench_function("epa/deep_penetration_concentric_spheres", |b| {
        b.iter(|| {
            let mut simplex = Simplex::new();
            let gjk_step = penetration_depth_step_gjk(&core_a, &core_b, 2.0, 2.0, Vector::x(), 1e-5, &mut simplex);
            black_box(gjk_step.status);
            let epa = penetration_depth_step_epa(&full_a, &full_b, 1e-5, &simplex);
            black_box(epa.axis);
        })
    });
}

criterion_group!(
    benches,
    bench_gjk_closest_points_separated_spheres,
    bench_gjk_closest_points_rotated_boxes,
    bench_epa_deep_penetration
);
criterion_main!(benches);
