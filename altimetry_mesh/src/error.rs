// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh validation errors.

use thiserror::Error;

/// Reasons a mesh is rejected at construction time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The mesh has no vertex positions.
    #[error("mesh has no vertices")]
    Empty,
    /// The mesh has vertices but no triangle connectivity.
    #[error("mesh has no triangles")]
    NoTriangles,
    /// A triangle references a vertex past the end of the position buffer.
    #[error("triangle {triangle} references vertex {index} but the mesh has {vertex_count}")]
    IndexOutOfBounds {
        /// Offending triangle.
        triangle: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// Vertex normals do not line up one-to-one with positions.
    #[error("{normals} normals supplied for {vertices} vertices")]
    NormalCountMismatch {
        /// Number of normals supplied.
        normals: usize,
        /// Number of vertex positions.
        vertices: usize,
    },
    /// A position or normal contains NaN or an infinity.
    #[error("vertex {vertex} is not finite")]
    NonFinite {
        /// Offending vertex.
        vertex: usize,
    },
    /// Non-indexed geometry whose length is not a multiple of three.
    #[error("triangle soup of {len} positions is not a whole number of triangles")]
    SoupNotTriangles {
        /// Number of positions supplied.
        len: usize,
    },
    /// More vertices than a 32-bit index can address.
    #[error("mesh has {len} vertices, more than 32-bit indices can address")]
    TooManyVertices {
        /// Number of positions supplied.
        len: usize,
    },
}
