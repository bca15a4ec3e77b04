// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry snapshot store: private copies of streamed tile meshes.
//!
//! Tiles arrive in world space, which for geospatial tile sets means coordinates in the
//! millions. Each snapshot keeps that world copy and a second copy in the tile set's
//! root frame, and the scan only ever touches the root copy. Changing the root frame
//! reprojects every snapshot from its world copy.

use core::fmt::Debug;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use altimetry_mesh::{Backend, IndexedMesh, Mesh, MeshError};
use glam::DAffine3;
use log::warn;

/// The tile set's root frame and its inverse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Frame {
    pub(crate) world_from_root: DAffine3,
    pub(crate) root_from_world: DAffine3,
}

impl Frame {
    pub(crate) const IDENTITY: Self = Self {
        world_from_root: DAffine3::IDENTITY,
        root_from_world: DAffine3::IDENTITY,
    };

    /// `None` when `world_from_root` cannot be inverted.
    pub(crate) fn new(world_from_root: DAffine3) -> Option<Self> {
        let det = world_from_root.matrix3.determinant();
        if det == 0.0 || !det.is_finite() || !world_from_root.translation.is_finite() {
            return None;
        }
        Some(Self {
            world_from_root,
            root_from_world: world_from_root.inverse(),
        })
    }
}

/// A tile's surface as it was when captured.
///
/// The copy is independent of the caller's mesh, so in-place edits made to the live
/// tile afterwards do not reach the scan.
#[derive(Debug)]
pub struct TileSnapshot<B: Backend> {
    world: Mesh,
    geometry: IndexedMesh<B>,
}

impl<B: Backend> TileSnapshot<B> {
    fn project(world: Mesh, frame: &Frame) -> Result<Self, MeshError> {
        let root = world.try_transformed(&frame.root_from_world)?;
        Ok(Self {
            world,
            geometry: IndexedMesh::new(root),
        })
    }

    /// World-space copy of the tile surface.
    pub fn mesh(&self) -> &Mesh {
        &self.world
    }

    /// Root-frame copy of the tile surface, as scanned.
    pub fn root_mesh(&self) -> &Mesh {
        self.geometry.mesh()
    }

    pub(crate) fn geometry(&self) -> &IndexedMesh<B> {
        &self.geometry
    }
}

/// Snapshots keyed by caller-chosen tile identity.
#[derive(Debug)]
pub(crate) struct SnapshotStore<K, B: Backend> {
    tiles: BTreeMap<K, TileSnapshot<B>>,
}

impl<K, B: Backend> Default for SnapshotStore<K, B> {
    fn default() -> Self {
        Self {
            tiles: BTreeMap::new(),
        }
    }
}

impl<K, B: Backend> SnapshotStore<K, B> {
    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }
}

impl<K: Ord + Debug, B: Backend> SnapshotStore<K, B> {
    /// Copy `mesh` under `tile`, replacing any earlier snapshot.
    ///
    /// On failure the tile has no snapshot at all, earlier ones included.
    pub(crate) fn capture(
        &mut self,
        tile: K,
        mesh: &Mesh,
        world_from_tile: &DAffine3,
        frame: &Frame,
    ) -> Result<&TileSnapshot<B>, MeshError> {
        let snapshot = match mesh
            .try_transformed(world_from_tile)
            .and_then(|world| TileSnapshot::project(world, frame))
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("tile {tile:?} not captured: {err}");
                self.tiles.remove(&tile);
                return Err(err);
            }
        };
        Ok(match self.tiles.entry(tile) {
            Entry::Vacant(e) => e.insert(snapshot),
            Entry::Occupied(mut e) => {
                e.insert(snapshot);
                e.into_mut()
            }
        })
    }

    /// Rebuild every root-frame copy for a new `frame`.
    ///
    /// A tile that does not fit the new frame is dropped. Returns how many were dropped.
    pub(crate) fn reproject(&mut self, frame: &Frame) -> usize {
        let before = self.tiles.len();
        let tiles = core::mem::take(&mut self.tiles);
        for (tile, snapshot) in tiles {
            match TileSnapshot::project(snapshot.world, frame) {
                Ok(snapshot) => {
                    self.tiles.insert(tile, snapshot);
                }
                Err(err) => warn!("tile {tile:?} dropped on reprojection: {err}"),
            }
        }
        before - self.tiles.len()
    }

    /// Drop the snapshot for `tile`. Returns whether there was one.
    pub(crate) fn release(&mut self, tile: &K) -> bool {
        self.tiles.remove(tile).is_some()
    }

    pub(crate) fn get(&self, tile: &K) -> Option<&TileSnapshot<B>> {
        self.tiles.get(tile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &TileSnapshot<B>)> + '_ {
        self.tiles.iter()
    }
}
