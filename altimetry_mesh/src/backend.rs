// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for raycast acceleration, and the mesh/backend pairing used by callers.

use core::fmt::Debug;

use crate::mesh::Mesh;
use crate::types::{Ray, RayHit, Sphere};

/// Raycast acceleration strategy for a fixed mesh.
pub trait Backend: Debug {
    /// Build acceleration state for `mesh`.
    fn build(mesh: &Mesh) -> Self
    where
        Self: Sized;

    /// Nearest double-sided hit of `ray` against `mesh`.
    ///
    /// `mesh` must be the mesh this backend was built from.
    fn raycast(&self, mesh: &Mesh, ray: &Ray) -> Option<RayHit>;
}

/// A mesh bundled with its bounding sphere and a built raycast backend.
///
/// The mesh is owned and immutable for the lifetime of the pairing, which keeps the
/// backend's acceleration state consistent with the geometry it indexes.
#[derive(Clone, Debug)]
pub struct IndexedMesh<B: Backend> {
    mesh: Mesh,
    sphere: Sphere,
    backend: B,
}

impl<B: Backend> IndexedMesh<B> {
    /// Take ownership of `mesh` and build its backend.
    pub fn new(mesh: Mesh) -> Self {
        let backend = B::build(&mesh);
        let sphere = mesh.bounding_sphere();
        Self {
            mesh,
            sphere,
            backend,
        }
    }

    /// The indexed mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Bounding sphere of the mesh.
    pub fn sphere(&self) -> Sphere {
        self.sphere
    }

    /// Nearest hit of `ray` against the mesh.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        self.backend.raycast(&self.mesh, ray)
    }

    /// Give the mesh back, dropping the acceleration state.
    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}
