// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use glam::DVec3;

/// Below this determinant a ray is treated as parallel to a triangle.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Barycentric slack so rays through a shared vertex or edge are not lost to rounding.
const EDGE_EPSILON: f64 = 1e-9;

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb3 {
    /// An inverted box that any point expands into.
    pub const EMPTY: Self = Self {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    /// Create a new AABB from min/max corners.
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all `points`. Empty input yields [`Aabb3::EMPTY`].
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Self {
        points.into_iter().fold(Self::EMPTY, Self::expanded)
    }

    /// The box grown to include `p`.
    #[must_use]
    pub fn expanded(self, p: DVec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Union of two boxes.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Return true if the box is inverted (no volume and no point).
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Box centre.
    pub fn center(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    /// Surface area, used as the SAH cost metric. Zero for empty boxes.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Slab test. Returns the entry distance along `ray` when it overlaps the box.
    ///
    /// Rays parallel to an axis are tested against that slab directly, so origins lying
    /// exactly on a face still count as inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let mut near = 0.0_f64;
        let mut far = f64::INFINITY;
        for axis in 0..3 {
            let (o, d) = (ray.origin[axis], ray.direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t0, t1) = ((lo - o) / d, (hi - o) / d);
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
            if near > far {
                return None;
            }
        }
        Some(near)
    }
}

/// Bounding sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    /// Sphere centre.
    pub center: DVec3,
    /// Sphere radius.
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere from centre and radius.
    pub const fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Sphere around the centre of the points' bounding box, reaching the farthest point.
    pub fn from_points(points: &[DVec3]) -> Self {
        let center = Aabb3::from_points(points.iter().copied()).center();
        let radius = points
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0_f64, f64::max)
            .sqrt();
        Self { center, radius }
    }

    /// Distance between the two centres after removing the component along `axis`.
    ///
    /// `axis` must be unit length.
    pub fn lateral_distance(&self, other: &Self, axis: DVec3) -> f64 {
        let delta = other.center - self.center;
        (delta - axis * axis.dot(delta)).length()
    }

    /// Whether the two spheres could overlap when swept infinitely along `axis`.
    pub fn overlaps_along(&self, other: &Self, axis: DVec3) -> bool {
        self.lateral_distance(other, axis) <= self.radius + other.radius
    }
}

/// A half-line with a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

impl Ray {
    /// Create a ray. `direction` is normalized; a zero direction stays zero and never hits.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// The nearest intersection of a ray with a mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin.
    pub distance: f64,
    /// Hit position.
    pub point: DVec3,
    /// Unit face normal of the hit triangle (winding order, not facing).
    pub normal: DVec3,
    /// Index of the hit triangle in the mesh.
    pub triangle: usize,
}

/// A triangle by value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// First corner.
    pub a: DVec3,
    /// Second corner.
    pub b: DVec3,
    /// Third corner.
    pub c: DVec3,
}

impl Triangle {
    /// Create a triangle from its corners.
    pub const fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self { a, b, c }
    }

    /// Unit normal following the winding order; zero for degenerate triangles.
    pub fn normal(&self) -> DVec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Mean of the three corners.
    pub fn centroid(&self) -> DVec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Bounding box of the corners.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points([self.a, self.b, self.c])
    }

    /// Double-sided Möller–Trumbore test. Returns the hit distance along `ray`.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = ray.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let s = ray.origin - self.a;
        let u = s.dot(p) * inv;
        if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = ray.direction.dot(q) * inv;
        if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
            return None;
        }
        let t = e2.dot(q) * inv;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat() -> Triangle {
        Triangle::new(
            DVec3::new(-1.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, -1.0),
            DVec3::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn triangle_hit_is_double_sided() {
        let tri = flat();
        let down = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::NEG_Y);
        let up = Ray::new(DVec3::new(0.0, -5.0, 0.0), DVec3::Y);
        assert_eq!(tri.intersect_ray(&down), Some(5.0));
        assert_eq!(tri.intersect_ray(&up), Some(5.0));
    }

    #[test]
    fn triangle_miss_outside_and_behind() {
        let tri = flat();
        let outside = Ray::new(DVec3::new(5.0, 5.0, 0.0), DVec3::NEG_Y);
        let behind = Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::Y);
        let parallel = Ray::new(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);
        assert_eq!(tri.intersect_ray(&outside), None);
        assert_eq!(tri.intersect_ray(&behind), None);
        assert_eq!(tri.intersect_ray(&parallel), None);
    }

    #[test]
    fn vertex_hit_is_not_lost() {
        let tri = flat();
        let ray = Ray::new(DVec3::new(0.0, -5.0, 1.0), DVec3::Y);
        assert_eq!(tri.intersect_ray(&ray), Some(5.0));
    }

    #[test]
    fn degenerate_normal_is_zero() {
        let tri = Triangle::new(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert_eq!(tri.normal(), DVec3::ZERO);
    }

    #[test]
    fn aabb_slab_test() {
        let b = Aabb3::new(DVec3::splat(-1.0), DVec3::splat(1.0));
        let hit = Ray::new(DVec3::new(0.0, 10.0, 0.0), DVec3::NEG_Y);
        let miss = Ray::new(DVec3::new(3.0, 10.0, 0.0), DVec3::NEG_Y);
        let inside = Ray::new(DVec3::ZERO, DVec3::X);
        assert_eq!(b.intersect_ray(&hit), Some(9.0));
        assert_eq!(b.intersect_ray(&miss), None);
        assert_eq!(b.intersect_ray(&inside), Some(0.0));
        let on_face = Ray::new(DVec3::new(-1.0, 10.0, 1.0), DVec3::NEG_Y);
        assert_eq!(b.intersect_ray(&on_face), Some(9.0));
        assert_eq!(Aabb3::EMPTY.intersect_ray(&hit), None);
    }

    #[test]
    fn sphere_from_points_reaches_farthest() {
        let s = Sphere::from_points(&[DVec3::new(-2.0, 0.0, 0.0), DVec3::new(2.0, 0.0, 0.0)]);
        assert_eq!(s.center, DVec3::ZERO);
        assert_eq!(s.radius, 2.0);
    }

    #[test]
    fn swept_overlap_ignores_axis_separation() {
        let a = Sphere::new(DVec3::ZERO, 1.0);
        let high = Sphere::new(DVec3::new(0.5, 1000.0, 0.0), 1.0);
        let aside = Sphere::new(DVec3::new(3.0, 0.0, 0.0), 1.0);
        assert!(a.overlaps_along(&high, DVec3::NEG_Y));
        assert!(!a.overlaps_along(&aside, DVec3::NEG_Y));
    }
}
