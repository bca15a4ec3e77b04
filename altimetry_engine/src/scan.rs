// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extremum scan of one tile snapshot against one shape.
//!
//! Both sides are in the tile set's root frame, so samples and the rays cast through
//! them stay at the magnitude of the root frame rather than of world space.

use altimetry_mesh::{Backend, IndexedMesh, Ray, Triangle};
use glam::DVec3;
use log::trace;

use crate::config::{SampleMode, ScanConfig};
use crate::registry::ShapeRecord;
use crate::types::{PassStats, ResultState, altitude_of};

/// Per-pair constants shared by every sample.
struct Probe<'a, B: Backend> {
    tile: &'a IndexedMesh<B>,
    shape: &'a IndexedMesh<B>,
    direction: DVec3,
    raycast_distance: f64,
    /// Cosine of the refinement angle limit, when refinement is on.
    min_facing: Option<f64>,
}

impl<B: Backend> Probe<'_, B> {
    /// Test one root-frame sample and fold it into `result`. Returns true if an extreme moved.
    fn sample(&self, point: DVec3, result: &mut ResultState, stats: &mut PassStats) -> bool {
        stats.samples += 1;
        let altitude = altitude_of(point, self.direction);
        if result.is_interior(altitude) {
            return false;
        }

        // Start far past the sample along the axis and look back through it.
        let ray = Ray::new(
            point + self.direction * self.raycast_distance,
            -self.direction,
        );
        stats.rays_cast += 1;
        if self.shape.raycast(&ray).is_none() {
            return false;
        }

        let Some(min_facing) = self.min_facing else {
            return result.offer(altitude, point);
        };
        stats.rays_cast += 1;
        // A miss here discards the sample.
        let Some(hit) = self.tile.raycast(&ray) else {
            return false;
        };
        if hit.normal.dot(ray.direction).abs() < min_facing {
            return false;
        }
        result.offer(altitude_of(hit.point, self.direction), hit.point)
    }
}

/// Scan `tile` under `shape`, updating the shape's extremes.
///
/// `visited` is scratch space for vertex dedup; its contents on entry do not matter.
/// Returns true if either extreme moved.
pub(crate) fn scan_pair<B: Backend>(
    tile: &IndexedMesh<B>,
    shape: &mut ShapeRecord<B>,
    config: &ScanConfig,
    visited: &mut Vec<bool>,
    stats: &mut PassStats,
) -> bool {
    let ShapeRecord {
        direction,
        geometry,
        result,
    } = shape;
    let direction = *direction;

    let tile_sphere = tile.sphere();
    if !tile_sphere.overlaps_along(&geometry.sphere(), direction) {
        stats.pairs_culled += 1;
        trace!(
            "culled pair: lateral distance {:.3}",
            tile_sphere.lateral_distance(&geometry.sphere(), direction)
        );
        return false;
    }
    stats.pairs_scanned += 1;

    let probe = Probe {
        tile,
        shape: geometry,
        direction,
        raycast_distance: config.raycast_distance,
        min_facing: config.surface_refinement.map(|r| r.max_angle.cos()),
    };
    let mesh = tile.mesh();
    visited.clear();
    visited.resize(mesh.vertex_count(), false);

    let mut changed = false;
    for &corners in mesh.triangles() {
        let [a, b, c] = corners.map(|v| mesh.vertex(v));
        let tri = Triangle::new(a, b, c);
        if tri.normal().dot(direction).abs() < config.skirt_threshold {
            continue;
        }
        match config.sample_mode {
            SampleMode::Vertices => {
                for (&v, point) in corners.iter().zip([a, b, c]) {
                    let seen = &mut visited[v as usize];
                    if *seen {
                        continue;
                    }
                    *seen = true;
                    changed |= probe.sample(point, result, stats);
                }
            }
            SampleMode::Centroids => {
                changed |= probe.sample(tri.centroid(), result, stats);
            }
        }
    }
    changed
}
