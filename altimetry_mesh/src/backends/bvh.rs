// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary bounding hierarchy over triangles, bulk-built with SAH-like splits.

use core::fmt::Debug;

use crate::backend::Backend;
use crate::mesh::Mesh;
use crate::types::{Aabb3, Ray, RayHit};

const DEFAULT_MAX_LEAF: usize = 8;

/// A static BVH backend. Built once per mesh; meshes never change under it.
pub struct Bvh {
    max_leaf: usize,
    root: Option<NodeIdx>,
    arena: Vec<Node>,
}

enum Kind {
    Leaf(Vec<u32>),
    Internal { left: NodeIdx, right: NodeIdx },
}

struct Node {
    bbox: Aabb3,
    kind: Kind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

impl Debug for Bvh {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let leaves = self
            .arena
            .iter()
            .filter(|n| matches!(n.kind, Kind::Leaf(_)))
            .count();
        f.debug_struct("Bvh")
            .field("max_leaf", &self.max_leaf)
            .field("nodes", &self.arena.len())
            .field("leaves", &leaves)
            .finish_non_exhaustive()
    }
}

type BvhItem = (u32, Aabb3);
type BvhItems = Vec<BvhItem>;

impl Bvh {
    /// Build with an explicit leaf capacity (clamped to at least 1).
    pub fn with_max_leaf(mesh: &Mesh, max_leaf: usize) -> Self {
        let max_leaf = max_leaf.max(1);
        let items: BvhItems = (0..mesh.triangle_count())
            .map(|i| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "Triangle indices stay 32-bit, matching the mesh's vertex indices."
                )]
                let tri = i as u32;
                (tri, mesh.triangle(i).bounds())
            })
            .collect();
        let mut arena = Vec::new();
        let root = (!items.is_empty()).then(|| Self::build_node(&mut arena, items, max_leaf));
        Self {
            max_leaf,
            root,
            arena,
        }
    }

    /// Number of nodes in the hierarchy.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    fn bbox_items(items: &[BvhItem]) -> Aabb3 {
        items
            .iter()
            .fold(Aabb3::EMPTY, |acc, (_, bb)| acc.union(*bb))
    }

    fn build_node(arena: &mut Vec<Node>, items: BvhItems, max_leaf: usize) -> NodeIdx {
        let bbox = Self::bbox_items(&items);
        let idx = NodeIdx::new(arena.len());
        if items.len() <= max_leaf {
            arena.push(Node {
                bbox,
                kind: Kind::Leaf(items.into_iter().map(|(t, _)| t).collect()),
            });
            return idx;
        }
        // Reserve the parent slot so children land after it.
        arena.push(Node {
            bbox,
            kind: Kind::Leaf(Vec::new()),
        });
        let (l, r) = Self::split_sah(items, max_leaf);
        let left = Self::build_node(arena, l, max_leaf);
        let right = Self::build_node(arena, r, max_leaf);
        arena[idx.get()].kind = Kind::Internal { left, right };
        idx
    }

    fn sort_by_centroid(items: &mut [BvhItem], axis: usize) {
        items.sort_by(|a, b| a.1.center()[axis].total_cmp(&b.1.center()[axis]));
    }

    /// SAH-like split: sort along each axis, precompute prefix/suffix boxes, and
    /// choose `k` that minimizes `area(LB_k) * k + area(RB_k) * (n - k)`.
    ///
    /// Requires at least two items; both halves come back non-empty.
    fn split_sah(mut items: BvhItems, max_leaf: usize) -> (BvhItems, BvhItems) {
        let n = items.len();
        let min_children = (max_leaf / 2).max(1).min(n / 2);
        let mut best: Option<(f64, usize, usize)> = None;
        for axis in 0..3 {
            Self::sort_by_centroid(&mut items, axis);

            // Precompute prefix/suffix bboxes for O(1) split evaluation
            let prefix: Vec<Aabb3> = items
                .iter()
                .scan(Aabb3::EMPTY, |acc, (_, bb)| {
                    *acc = acc.union(*bb);
                    Some(*acc)
                })
                .collect();
            let mut suffix: Vec<Aabb3> = items
                .iter()
                .rev()
                .scan(Aabb3::EMPTY, |acc, (_, bb)| {
                    *acc = acc.union(*bb);
                    Some(*acc)
                })
                .collect();
            suffix.reverse();

            for k in min_children..=(n - min_children) {
                let cost = prefix[k - 1].surface_area() * k as f64
                    + suffix[k].surface_area() * (n - k) as f64;
                if best.is_none_or(|(bc, _, _)| cost < bc) {
                    best = Some((cost, axis, k));
                }
            }
        }
        let (_, axis, k) = best.unwrap_or((0.0, 0, n / 2));
        Self::sort_by_centroid(&mut items, axis);
        let right = items.split_off(k);
        (items, right)
    }
}

impl Backend for Bvh {
    fn build(mesh: &Mesh) -> Self {
        Self::with_max_leaf(mesh, DEFAULT_MAX_LEAF)
    }

    fn raycast(&self, mesh: &Mesh, ray: &Ray) -> Option<RayHit> {
        let root = self.root?;
        let mut best: Option<(f64, usize)> = None;
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.get()];
            let Some(enter) = n.bbox.intersect_ray(ray) else {
                continue;
            };
            if best.is_some_and(|(bt, _)| enter > bt) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(tris) => {
                    for &t in tris {
                        let t = t as usize;
                        if let Some(d) = mesh.triangle(t).intersect_ray(ray)
                            && best.is_none_or(|(bt, bi)| d < bt || (d == bt && t < bi))
                        {
                            best = Some((d, t));
                        }
                    }
                }
                Kind::Internal { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::flatscan::FlatScan;
    use glam::DVec3;

    /// A bumpy `n`×`n` height grid in the xz plane.
    fn grid(n: u32) -> Mesh {
        let mut positions = Vec::new();
        for z in 0..=n {
            for x in 0..=n {
                let (xf, zf) = (f64::from(x), f64::from(z));
                positions.push(DVec3::new(xf, (xf * 0.7).sin() + (zf * 0.3).cos(), zf));
            }
        }
        let row = n + 1;
        let mut triangles = Vec::new();
        for z in 0..n {
            for x in 0..n {
                let i = z * row + x;
                triangles.push([i, i + row, i + 1]);
                triangles.push([i + 1, i + row, i + row + 1]);
            }
        }
        Mesh::from_triangles(positions, triangles).unwrap()
    }

    #[test]
    fn matches_flat_scan() {
        let mesh = grid(24);
        let bvh = Bvh::build(&mesh);
        assert!(bvh.node_count() > 1);
        for i in 0..40 {
            let f = f64::from(i);
            let origin = DVec3::new(0.37 + f * 0.61, 50.0, 23.9 - f * 0.55);
            for dir in [DVec3::NEG_Y, DVec3::new(0.2, -1.0, 0.1)] {
                let ray = Ray::new(origin, dir);
                assert_eq!(bvh.raycast(&mesh, &ray), FlatScan.raycast(&mesh, &ray));
            }
        }
    }

    #[test]
    fn miss_outside_bounds() {
        let mesh = grid(4);
        let bvh = Bvh::with_max_leaf(&mesh, 2);
        let ray = Ray::new(DVec3::new(-10.0, 50.0, -10.0), DVec3::NEG_Y);
        assert_eq!(bvh.raycast(&mesh, &ray), None);
    }

    #[test]
    fn single_triangle_is_a_leaf() {
        let mesh = Mesh::from_soup(vec![DVec3::ZERO, DVec3::Z, DVec3::X]).unwrap();
        let bvh = Bvh::build(&mesh);
        assert_eq!(bvh.node_count(), 1);
        let hit = bvh
            .raycast(&mesh, &Ray::new(DVec3::new(0.25, 1.0, 0.25), DVec3::NEG_Y))
            .unwrap();
        assert_eq!(hit.triangle, 0);
        assert!((hit.point - DVec3::new(0.25, 0.0, 0.25)).length() < 1e-12);
    }
}
