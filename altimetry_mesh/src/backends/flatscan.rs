// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat scan backend: tests every triangle. Small and simple; good for tiny meshes.

use crate::backend::Backend;
use crate::mesh::Mesh;
use crate::types::{Ray, RayHit};

/// Linear-scan backend with no acceleration state.
#[derive(Copy, Clone, Debug, Default)]
pub struct FlatScan;

impl Backend for FlatScan {
    fn build(_mesh: &Mesh) -> Self {
        Self
    }

    fn raycast(&self, mesh: &Mesh, ray: &Ray) -> Option<RayHit> {
        let mut best: Option<(f64, usize)> = None;
        for (i, tri) in mesh.iter_triangles().enumerate() {
            if let Some(t) = tri.intersect_ray(ray)
                && best.is_none_or(|(bt, _)| t < bt)
            {
                best = Some((t, i));
            }
        }
        best.map(|(distance, triangle)| RayHit {
            distance,
            point: ray.at(distance),
            normal: mesh.triangle(triangle).normal(),
            triangle,
        })
    }
}
