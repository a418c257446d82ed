//! A minimal set of convex shapes implementing [`ShapeAdapter`], used by
//! this crate's own test suite and benchmarks. Concrete shapes are out of
//! scope for the core itself (spec §1); this module exists purely so the
//! integration tests have something convex to collide, and is gated behind
//! the `test-shapes` feature so it never ships as part of a consumer's
//! default build.

use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::{ShapeAdapter, ShapeCategory, ShapeType, SupportFunctionMode, SupportMap, SupportingFace};

fn axis_sign(component: Real) -> Real {
    if component >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// A ball of a given radius, centred at the local origin.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub radius: Real,
}

#[derive(Clone, Copy, Debug)]
pub struct SphereSupport {
    radius: Real,
    include_radius: bool,
}

impl SupportMap for SphereSupport {
    fn local_support_point(&self, dir: &Vector) -> Point {
        if !self.include_radius {
            return Point::origin();
        }
        let len = dir.norm();
        if len > DEFAULT_EPSILON {
            Point::origin() + dir * (self.radius / len)
        } else {
            Point::origin()
        }
    }

    fn convex_radius(&self) -> Real {
        if self.include_radius {
            0.0
        } else {
            self.radius
        }
    }
}

impl ShapeAdapter for Sphere {
    type Support = SphereSupport;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TestSphere
    }

    fn category(&self) -> ShapeCategory {
        ShapeCategory::Convex
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        Vector::repeat(self.radius * scale.x)
    }

    fn local_center_of_mass(&self, _scale: Vector) -> Point {
        Point::origin()
    }

    fn inner_radius(&self, scale: Vector) -> Real {
        self.radius * scale.x
    }

    fn support_function(&self, mode: SupportFunctionMode, scale: Vector) -> Self::Support {
        SphereSupport {
            radius: self.radius * scale.x,
            include_radius: mode == SupportFunctionMode::IncludeConvexRadius,
        }
    }

    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        let radius = self.radius * scale.x;
        let point = match direction.try_normalize(DEFAULT_EPSILON) {
            Some(n) => Point::origin() + n * radius,
            None => Point::origin(),
        };
        SupportingFace { vertices: vec![world_pose * point] }
    }

    fn surface_normal(&self, local_point: &Point) -> Vector {
        local_point.coords.try_normalize(DEFAULT_EPSILON).unwrap_or_else(Vector::z)
    }
}

/// An axis-aligned box, centred at the local origin, given by half-extents.
#[derive(Clone, Copy, Debug)]
pub struct Box3 {
    pub half_extents: Vector,
}

#[derive(Clone, Copy, Debug)]
pub struct Box3Support {
    half_extents: Vector,
}

impl SupportMap for Box3Support {
    fn local_support_point(&self, dir: &Vector) -> Point {
        Point::new(
            axis_sign(dir.x) * self.half_extents.x,
            axis_sign(dir.y) * self.half_extents.y,
            axis_sign(dir.z) * self.half_extents.z,
        )
    }
}

impl ShapeAdapter for Box3 {
    type Support = Box3Support;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TestBox
    }

    fn category(&self) -> ShapeCategory {
        ShapeCategory::Convex
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        self.half_extents.component_mul(&scale)
    }

    fn local_center_of_mass(&self, _scale: Vector) -> Point {
        Point::origin()
    }

    fn inner_radius(&self, scale: Vector) -> Real {
        let he = self.local_half_extents(scale);
        he.x.min(he.y).min(he.z)
    }

    fn support_function(&self, _mode: SupportFunctionMode, scale: Vector) -> Self::Support {
        Box3Support { half_extents: self.local_half_extents(scale) }
    }

    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        let he = self.local_half_extents(scale);
        let axis = if direction.x.abs() >= direction.y.abs() && direction.x.abs() >= direction.z.abs() {
            0usize
        } else if direction.y.abs() >= direction.z.abs() {
            1
        } else {
            2
        };
        let sign = axis_sign(direction[axis]);

        let mut corners = Vec::with_capacity(4);
        for &s1 in &[-1.0, 1.0] {
            for &s2 in &[-1.0, 1.0] {
                let mut local = Vector::zeros();
                local[axis] = sign * he[axis];
                let (a1, a2) = ((axis + 1) % 3, (axis + 2) % 3);
                local[a1] = s1 * he[a1];
                local[a2] = s2 * he[a2];
                corners.push(world_pose * Point::from(local));
            }
        }
        SupportingFace { vertices: corners }
    }

    fn surface_normal(&self, local_point: &Point) -> Vector {
        let he = self.half_extents;
        let ratios = [
            (local_point.x / he.x.max(DEFAULT_EPSILON)).abs(),
            (local_point.y / he.y.max(DEFAULT_EPSILON)).abs(),
            (local_point.z / he.z.max(DEFAULT_EPSILON)).abs(),
        ];
        let axis = if ratios[0] >= ratios[1] && ratios[0] >= ratios[2] {
            0
        } else if ratios[1] >= ratios[2] {
            1
        } else {
            2
        };
        let mut normal = Vector::zeros();
        normal[axis] = axis_sign(local_point[axis]);
        normal
    }
}

/// A capsule: a line segment of half-length `half_height` along the local
/// Y axis, Minkowski-summed with a ball of `radius`.
#[derive(Clone, Copy, Debug)]
pub struct Capsule {
    pub half_height: Real,
    pub radius: Real,
}

#[derive(Clone, Copy, Debug)]
pub struct CapsuleSupport {
    half_height: Real,
    radius: Real,
    include_radius: bool,
}

impl SupportMap for CapsuleSupport {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let y = axis_sign(dir.y) * self.half_height;
        let core = Point::new(0.0, y, 0.0);
        if !self.include_radius {
            return core;
        }
        let len = dir.norm();
        if len > DEFAULT_EPSILON {
            core + dir * (self.radius / len)
        } else {
            core
        }
    }

    fn convex_radius(&self) -> Real {
        if self.include_radius {
            0.0
        } else {
            self.radius
        }
    }
}

impl ShapeAdapter for Capsule {
    type Support = CapsuleSupport;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TestCapsule
    }

    fn category(&self) -> ShapeCategory {
        ShapeCategory::Convex
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        let radius = self.radius * scale.x.max(scale.z);
        Vector::new(radius, self.half_height * scale.y + radius, radius)
    }

    fn local_center_of_mass(&self, _scale: Vector) -> Point {
        Point::origin()
    }

    fn inner_radius(&self, scale: Vector) -> Real {
        self.radius * scale.x.min(scale.z)
    }

    fn support_function(&self, mode: SupportFunctionMode, scale: Vector) -> Self::Support {
        CapsuleSupport {
            half_height: self.half_height * scale.y,
            radius: self.radius * scale.x,
            include_radius: mode == SupportFunctionMode::IncludeConvexRadius,
        }
    }

    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        let support = self.support_function(SupportFunctionMode::IncludeConvexRadius, scale);
        SupportingFace { vertices: vec![world_pose * support.local_support_point(direction)] }
    }

    fn surface_normal(&self, local_point: &Point) -> Vector {
        let y = local_point.y.clamp(-self.half_height, self.half_height);
        let closest = Point::new(0.0, y, 0.0);
        (local_point - closest).try_normalize(DEFAULT_EPSILON).unwrap_or_else(Vector::y)
    }
}

const HALF_SPACE_EXTENT: Real = 1.0e4;
const HALF_SPACE_THICKNESS: Real = 1.0e3;

/// An infinite solid half-space `{ p : p.z <= 0 }` in local space, modelled
/// as a very large finite slab so it remains a well-formed (bounded)
/// support function for GJK/EPA.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalfSpace;

#[derive(Clone, Copy, Debug)]
pub struct HalfSpaceSupport {
    extent_x: Real,
    extent_y: Real,
    thickness: Real,
}

impl SupportMap for HalfSpaceSupport {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let z = if dir.z >= 0.0 { 0.0 } else { -self.thickness };
        Point::new(axis_sign(dir.x) * self.extent_x, axis_sign(dir.y) * self.extent_y, z)
    }
}

impl ShapeAdapter for HalfSpace {
    type Support = HalfSpaceSupport;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TestHalfSpace
    }

    fn category(&self) -> ShapeCategory {
        ShapeCategory::Convex
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        Vector::new(HALF_SPACE_EXTENT * scale.x, HALF_SPACE_EXTENT * scale.y, HALF_SPACE_THICKNESS * scale.z)
    }

    fn local_center_of_mass(&self, scale: Vector) -> Point {
        Point::new(0.0, 0.0, -HALF_SPACE_THICKNESS * scale.z * 0.5)
    }

    fn inner_radius(&self, _scale: Vector) -> Real {
        0.0
    }

    fn support_function(&self, _mode: SupportFunctionMode, scale: Vector) -> Self::Support {
        HalfSpaceSupport {
            extent_x: HALF_SPACE_EXTENT * scale.x,
            extent_y: HALF_SPACE_EXTENT * scale.y,
            thickness: HALF_SPACE_THICKNESS * scale.z,
        }
    }

    fn supporting_face(&self, _direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        let ex = HALF_SPACE_EXTENT * scale.x;
        let ey = HALF_SPACE_EXTENT * scale.y;
        let corners = [
            Point::new(-ex, -ey, 0.0),
            Point::new(ex, -ey, 0.0),
            Point::new(ex, ey, 0.0),
            Point::new(-ex, ey, 0.0),
        ];
        SupportingFace { vertices: corners.iter().map(|p| world_pose * p).collect() }
    }

    fn surface_normal(&self, _local_point: &Point) -> Vector {
        Vector::z()
    }
}

/// A flat triangle given by three local-space vertices. Degenerate as a
/// volumetric shape (zero thickness) but fine as a [`SupportMap`]: GJK/EPA
/// only ever query its support points.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub vertices: [Point; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct TriangleSupport {
    vertices: [Point; 3],
}

impl SupportMap for TriangleSupport {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let mut best = self.vertices[0];
        let mut best_dot = best.coords.dot(dir);
        for &v in &self.vertices[1..] {
            let d = v.coords.dot(dir);
            if d > best_dot {
                best_dot = d;
                best = v;
            }
        }
        best
    }
}

impl Triangle {
    fn scaled_vertices(&self, scale: Vector) -> [Point; 3] {
        [
            Point::from(self.vertices[0].coords.component_mul(&scale)),
            Point::from(self.vertices[1].coords.component_mul(&scale)),
            Point::from(self.vertices[2].coords.component_mul(&scale)),
        ]
    }

    fn normal(&self, scale: Vector) -> Vector {
        let v = self.scaled_vertices(scale);
        (v[1] - v[0]).cross(&(v[2] - v[0])).try_normalize(DEFAULT_EPSILON).unwrap_or_else(Vector::z)
    }
}

impl ShapeAdapter for Triangle {
    type Support = TriangleSupport;

    fn shape_type(&self) -> ShapeType {
        ShapeType::TestTriangle
    }

    fn category(&self) -> ShapeCategory {
        ShapeCategory::Convex
    }

    fn local_half_extents(&self, scale: Vector) -> Vector {
        let v = self.scaled_vertices(scale);
        let min = Vector::new(
            v[0].x.min(v[1].x).min(v[2].x),
            v[0].y.min(v[1].y).min(v[2].y),
            v[0].z.min(v[1].z).min(v[2].z),
        );
        let max = Vector::new(
            v[0].x.max(v[1].x).max(v[2].x),
            v[0].y.max(v[1].y).max(v[2].y),
            v[0].z.max(v[1].z).max(v[2].z),
        );
        (max - min) * 0.5
    }

    fn local_center_of_mass(&self, scale: Vector) -> Point {
        let v = self.scaled_vertices(scale);
        nalgebra::center(&nalgebra::center(&v[0], &v[1]), &v[2])
    }

    fn inner_radius(&self, _scale: Vector) -> Real {
        0.0
    }

    fn support_function(&self, _mode: SupportFunctionMode, scale: Vector) -> Self::Support {
        TriangleSupport { vertices: self.scaled_vertices(scale) }
    }

    fn supporting_face(&self, direction: &Vector, world_pose: &Isometry, scale: Vector) -> SupportingFace {
        let n = self.normal(scale);
        if direction.dot(&n).abs() < 1e-3 {
            return SupportingFace::default();
        }
        let v = self.scaled_vertices(scale);
        SupportingFace { vertices: v.iter().map(|p| world_pose * p).collect() }
    }

    fn surface_normal(&self, _local_point: &Point) -> Vector {
        self.normal(Vector::repeat(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_support_excludes_radius_at_origin() {
        let support = Sphere { radius: 2.0 }.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
        assert_eq!(support.local_support_point(&Vector::x()), Point::origin());
        assert_relative_eq!(support.convex_radius(), 2.0);
    }

    #[test]
    fn sphere_support_includes_radius_on_surface() {
        let support = Sphere { radius: 2.0 }.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
        let p = support.local_support_point(&Vector::x());
        assert_relative_eq!(p, Point::new(2.0, 0.0, 0.0));
        assert_relative_eq!(support.convex_radius(), 0.0);
    }

    #[test]
    fn box_support_picks_extreme_corner() {
        let b = Box3 { half_extents: Vector::new(1.0, 2.0, 3.0) };
        let support = b.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
        let p = support.local_support_point(&Vector::new(-1.0, 1.0, -1.0));
        assert_relative_eq!(p, Point::new(-1.0, 2.0, -3.0));
    }

    #[test]
    fn capsule_support_picks_cap_plus_radius() {
        let c = Capsule { half_height: 1.0, radius: 0.5 };
        let support = c.support_function(SupportFunctionMode::IncludeConvexRadius, Vector::repeat(1.0));
        let p = support.local_support_point(&Vector::y());
        assert_relative_eq!(p, Point::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn half_space_support_stays_on_surface_for_up_direction() {
        let support = HalfSpace.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
        let p = support.local_support_point(&Vector::z());
        assert_relative_eq!(p.z, 0.0);
    }

    #[test]
    fn triangle_support_picks_nearest_vertex() {
        let t = Triangle {
            vertices: [Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0)],
        };
        let support = t.support_function(SupportFunctionMode::ExcludeConvexRadius, Vector::repeat(1.0));
        assert_relative_eq!(support.local_support_point(&Vector::x()), Point::new(1.0, 0.0, 0.0));
        assert_relative_eq!(support.local_support_point(&Vector::y()), Point::new(0.0, 1.0, 0.0));
    }
}
