// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validated, owned triangle meshes.

use glam::{DAffine3, DVec3};

use crate::error::MeshError;
use crate::types::{Aabb3, Sphere, Triangle};

/// An owned, validated triangle mesh: positions, indexed triangles, and one normal per vertex.
///
/// Construction validates connectivity and finiteness, so every accessor may index freely.
/// Meshes are plain values: cloning one yields a fully independent copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    positions: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    normals: Vec<DVec3>,
}

impl Mesh {
    /// Create a mesh from positions, triangle connectivity, and per-vertex normals.
    pub fn new(
        positions: Vec<DVec3>,
        triangles: Vec<[u32; 3]>,
        normals: Vec<DVec3>,
    ) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }
        if u32::try_from(positions.len()).is_err() {
            return Err(MeshError::TooManyVertices {
                len: positions.len(),
            });
        }
        if triangles.is_empty() {
            return Err(MeshError::NoTriangles);
        }
        if normals.len() != positions.len() {
            return Err(MeshError::NormalCountMismatch {
                normals: normals.len(),
                vertices: positions.len(),
            });
        }
        let vertex_count = positions.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        if let Some(vertex) = positions
            .iter()
            .zip(&normals)
            .position(|(p, n)| !p.is_finite() || !n.is_finite())
        {
            return Err(MeshError::NonFinite { vertex });
        }
        Ok(Self {
            positions,
            triangles,
            normals,
        })
    }

    /// Create a mesh from positions and connectivity, computing area-weighted vertex normals.
    pub fn from_triangles(
        positions: Vec<DVec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        let mut normals = vec![DVec3::ZERO; positions.len()];
        for tri in &triangles {
            let [Some(a), Some(b), Some(c)] = tri.map(|i| positions.get(i as usize)) else {
                // Left for `new` to report.
                continue;
            };
            let n = (*b - *a).cross(*c - *a);
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        Self::new(positions, triangles, normals)
    }

    /// Create a mesh from non-indexed geometry: every three consecutive positions form a triangle.
    pub fn from_soup(positions: Vec<DVec3>) -> Result<Self, MeshError> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::SoupNotTriangles {
                len: positions.len(),
            });
        }
        let len = u32::try_from(positions.len()).map_err(|_| MeshError::TooManyVertices {
            len: positions.len(),
        })?;
        let triangles = (0..len / 3)
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect();
        Self::from_triangles(positions, triangles)
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Triangle connectivity.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Per-vertex normals.
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Position of vertex `i`.
    ///
    /// Panics if `i` is out of range.
    pub fn vertex(&self, i: u32) -> DVec3 {
        self.positions[i as usize]
    }

    /// Triangle `i` by value.
    ///
    /// Panics if `i` is out of range.
    pub fn triangle(&self, i: usize) -> Triangle {
        let [a, b, c] = self.triangles[i];
        Triangle::new(self.vertex(a), self.vertex(b), self.vertex(c))
    }

    /// Iterate all triangles by value, in index order.
    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangles.len()).map(|i| self.triangle(i))
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(self.positions.iter().copied())
    }

    /// Bounding sphere of all vertices.
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::from_points(&self.positions)
    }

    /// A deep copy mapped through `affine`.
    ///
    /// Normals go through the inverse-transpose so they stay perpendicular under
    /// non-uniform scale.
    #[must_use]
    pub fn transformed(&self, affine: &DAffine3) -> Self {
        let normal_matrix = affine.matrix3.inverse().transpose();
        Self {
            positions: self
                .positions
                .iter()
                .map(|&p| affine.transform_point3(p))
                .collect(),
            triangles: self.triangles.clone(),
            normals: self
                .normals
                .iter()
                .map(|&n| (normal_matrix * n).normalize_or_zero())
                .collect(),
        }
    }

    /// Like [`Mesh::transformed`], but fails if the result is not finite
    /// (a non-finite or overflowing transform).
    pub fn try_transformed(&self, affine: &DAffine3) -> Result<Self, MeshError> {
        let out = self.transformed(affine);
        if let Some(vertex) = out.positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinite { vertex });
        }
        Ok(out)
    }

    /// Mutable access to the vertex positions.
    ///
    /// This exists for collaborators that deform geometry in place (flattening, for example);
    /// connectivity stays fixed so the mesh remains valid. Normals are not recomputed.
    pub fn positions_mut(&mut self) -> &mut [DVec3] {
        &mut self.positions
    }
}
