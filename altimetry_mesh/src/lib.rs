// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Altimetry Mesh: double-precision triangle meshes with raycast backends.
//!
//! Altimetry Mesh is the geometry layer underneath the altitude detection engine.
//!
//! - [`Mesh`]: owned, validated positions + triangle connectivity + vertex normals.
//!   Malformed input (missing connectivity, stray indices, mismatched normals, NaNs)
//!   is rejected at construction with a [`MeshError`], never discovered mid-query.
//! - [`Triangle`], [`Ray`], [`RayHit`], [`Sphere`], [`Aabb3`]: small value types.
//! - [`Backend`]: pluggable nearest-hit raycasting. [`FlatScan`] tests every triangle;
//!   [`Bvh`] builds a bounding hierarchy once and answers rays in roughly logarithmic time.
//! - [`IndexedMesh`]: a mesh paired with its bounding sphere and built backend.
//!
//! All raycasts are double-sided: winding decides the reported normal, never whether
//! a triangle is hit.
//!
//! # Example
//!
//! ```rust
//! use altimetry_mesh::{Bvh, IndexedMesh, Mesh, Ray};
//! use glam::DVec3;
//!
//! // A unit square at height 2, as two triangles.
//! let mesh = Mesh::from_triangles(
//!     vec![
//!         DVec3::new(0.0, 2.0, 0.0),
//!         DVec3::new(1.0, 2.0, 0.0),
//!         DVec3::new(1.0, 2.0, 1.0),
//!         DVec3::new(0.0, 2.0, 1.0),
//!     ],
//!     vec![[0, 2, 1], [0, 3, 2]],
//! )
//! .unwrap();
//! let indexed: IndexedMesh<Bvh> = IndexedMesh::new(mesh);
//!
//! // Cast upward from below; double-sided, so the back face still counts.
//! let hit = indexed
//!     .raycast(&Ray::new(DVec3::new(0.25, -8.0, 0.75), DVec3::Y))
//!     .unwrap();
//! assert!((hit.distance - 10.0).abs() < 1e-12);
//! ```
//!
//! ### Float semantics
//!
//! Coordinates are `f64`. Inputs must be finite; [`Mesh::new`] enforces this.

pub mod backend;
pub mod backends;
pub mod error;
pub mod mesh;
pub mod types;

pub use backend::{Backend, IndexedMesh};
pub use backends::bvh::Bvh;
pub use backends::flatscan::FlatScan;
pub use error::MeshError;
pub use mesh::Mesh;
pub use types::{Aabb3, Ray, RayHit, Sphere, Triangle};

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DAffine3, DVec3};

    fn tilted_patch() -> Mesh {
        Mesh::from_soup(vec![
            DVec3::new(-5.0, 0.0, -5.0),
            DVec3::new(-5.0, 1.0, 5.0),
            DVec3::new(5.0, 0.0, -5.0),
            DVec3::new(5.0, 0.0, -5.0),
            DVec3::new(-5.0, 1.0, 5.0),
            DVec3::new(5.0, 1.0, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn backends_agree_through_indexed_mesh() {
        let flat: IndexedMesh<FlatScan> = IndexedMesh::new(tilted_patch());
        let bvh: IndexedMesh<Bvh> = IndexedMesh::new(tilted_patch());
        let ray = Ray::new(DVec3::new(1.0, 10.0, 2.0), DVec3::NEG_Y);
        let a = flat.raycast(&ray).unwrap();
        let b = bvh.raycast(&ray).unwrap();
        assert_eq!(a, b);
        assert!(a.normal.dot(DVec3::Y) > 0.9);
    }

    #[test]
    fn sphere_tracks_transformed_mesh() {
        let mesh =
            tilted_patch().transformed(&DAffine3::from_translation(DVec3::new(100.0, 0.0, 0.0)));
        let indexed: IndexedMesh<FlatScan> = IndexedMesh::new(mesh);
        let s = indexed.sphere();
        assert!((s.center.x - 100.0).abs() < 1e-9);
        assert!(s.radius >= 5.0_f64.hypot(5.0));
    }
}
