// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine: shapes, tile snapshots, the dirty flag, and the recompute pass.

use core::fmt::Debug;

use altimetry_mesh::{Backend, Bvh, Mesh};
use glam::{DAffine3, DVec3};
use log::{debug, trace};

use crate::config::ScanConfig;
use crate::dispatch::{AltitudeObserver, DispatchQueue};
use crate::error::EngineError;
use crate::registry::{ShapeRecord, ShapeRegistry};
use crate::scan::scan_pair;
use crate::snapshot::{Frame, SnapshotStore, TileSnapshot};
use crate::types::{Extremes, PassStats, ShapeId};

/// The altitude extremum detection engine, generic over its raycast backend.
///
/// Tiles are keyed by any `K: Ord` the host already uses to identify them. Results are
/// delivered to `O` at the end of each pass, and whenever a newly available tile changes
/// an extreme.
pub struct EngineGeneric<K, O, B: Backend> {
    config: ScanConfig,
    observer: O,
    shapes: ShapeRegistry<B>,
    snapshots: SnapshotStore<K, B>,
    queue: DispatchQueue,
    frame: Frame,
    dirty: bool,
    visited: Vec<bool>,
}

/// Engine using the [`Bvh`] backend.
pub type Engine<K, O = ()> = EngineGeneric<K, O, Bvh>;

impl<K: Ord + Debug, O: AltitudeObserver, B: Backend> EngineGeneric<K, O, B> {
    /// Create an empty engine. The first [`update`](Self::update) always runs.
    pub fn new(config: ScanConfig, observer: O) -> Self {
        Self {
            config,
            observer,
            shapes: ShapeRegistry::default(),
            snapshots: SnapshotStore::default(),
            queue: DispatchQueue::default(),
            frame: Frame::IDENTITY,
            dirty: true,
            visited: Vec::new(),
        }
    }

    /// The configuration fixed at construction.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the engine, returning the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Place the tile set's root frame in world space.
    ///
    /// Shapes and reported points are in the root frame; tiles arrive in world space.
    /// Captured tiles are reprojected into the new frame. A transform that cannot be
    /// inverted is rejected and the current frame kept.
    pub fn set_root_transform(&mut self, world_from_root: DAffine3) -> Result<(), EngineError> {
        let frame = Frame::new(world_from_root).ok_or(EngineError::SingularTransform)?;
        if frame == self.frame {
            return Ok(());
        }
        self.frame = frame;
        let dropped = self.snapshots.reproject(&self.frame);
        if dropped > 0 {
            debug!("root frame change dropped {dropped} tiles");
        }
        self.dirty = true;
        Ok(())
    }

    /// The current root frame placement.
    pub fn root_transform(&self) -> DAffine3 {
        self.frame.world_from_root
    }

    /// Register a query region.
    ///
    /// `geometry` is copied; it is in the root frame. `direction` defaults to `-Z` and is
    /// normalized.
    pub fn add_shape(
        &mut self,
        geometry: &Mesh,
        direction: Option<DVec3>,
    ) -> Result<ShapeId, EngineError> {
        let direction = direction.unwrap_or(DVec3::NEG_Z).normalize_or_zero();
        if direction == DVec3::ZERO {
            return Err(EngineError::InvalidDirection);
        }
        let id = self.shapes.insert(ShapeRecord::new(geometry, direction));
        self.dirty = true;
        trace!("added shape {id:?}");
        Ok(id)
    }

    /// Replace a shape's geometry, keeping its direction and handle.
    ///
    /// Derived state (bounds, raycast structure, extremes) is rebuilt from scratch.
    pub fn update_shape(&mut self, id: ShapeId, geometry: &Mesh) -> Result<(), EngineError> {
        let direction = self
            .shapes
            .get(id)
            .ok_or(EngineError::UnknownShape(id))?
            .direction;
        self.shapes.replace(id, ShapeRecord::new(geometry, direction));
        self.dirty = true;
        Ok(())
    }

    /// Remove a shape. Returns whether it was registered.
    pub fn delete_shape(&mut self, id: ShapeId) -> bool {
        self.dirty = true;
        self.shapes.remove(id).is_some()
    }

    /// Whether `id` is a live handle.
    pub fn has_shape(&self, id: ShapeId) -> bool {
        self.shapes.contains(id)
    }

    /// Remove every shape. Does nothing, and does not dirty the engine, when already empty.
    pub fn clear_shapes(&mut self) {
        if self.shapes.is_empty() {
            return;
        }
        self.shapes.clear();
        self.dirty = true;
    }

    /// Number of registered shapes.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Live shape handles, in slot order.
    pub fn shapes(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.iter().map(|(id, _)| id)
    }

    /// A shape's record.
    pub fn shape(&self, id: ShapeId) -> Option<&ShapeRecord<B>> {
        self.shapes.get(id)
    }

    /// A shape's unit query direction.
    pub fn direction(&self, id: ShapeId) -> Option<DVec3> {
        self.shapes.get(id).map(ShapeRecord::direction)
    }

    /// A shape's current extremes.
    pub fn extremes(&self, id: ShapeId) -> Option<Extremes> {
        self.shapes.get(id).map(|s| s.result().extremes())
    }

    /// A tile's geometry became available: snapshot it and scan it right away.
    ///
    /// The new tile is scanned against every shape ahead of the next pass, and any
    /// resulting changes are dispatched before this returns. If the geometry cannot be
    /// captured the tile is treated as unavailable: any earlier snapshot is dropped.
    pub fn tile_available(
        &mut self,
        tile: K,
        mesh: &Mesh,
        world_from_tile: &DAffine3,
    ) -> Result<(), EngineError> {
        self.dirty = true;
        let snapshot = self
            .snapshots
            .capture(tile, mesh, world_from_tile, &self.frame)?;

        let mut stats = PassStats::default();
        for (id, record) in self.shapes.iter_mut() {
            if scan_pair(
                snapshot.geometry(),
                record,
                &self.config,
                &mut self.visited,
                &mut stats,
            ) {
                self.queue.schedule(id, &mut record.result);
            }
        }
        let notifications = self.queue.drain(&mut self.shapes, &mut self.observer);
        trace!(
            "tile scan: {} pairs, {} rays, {notifications} notifications",
            stats.pairs_scanned, stats.rays_cast
        );
        Ok(())
    }

    /// A tile is about to be discarded. Returns whether it had a snapshot.
    pub fn tile_disposed(&mut self, tile: &K) -> bool {
        let existed = self.snapshots.release(tile);
        if existed {
            self.dirty = true;
        }
        existed
    }

    /// Whether `tile` has a snapshot.
    pub fn has_tile(&self, tile: &K) -> bool {
        self.snapshots.get(tile).is_some()
    }

    /// A tile's snapshot.
    pub fn tile(&self, tile: &K) -> Option<&TileSnapshot<B>> {
        self.snapshots.get(tile)
    }

    /// Number of captured tiles.
    pub fn tile_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Force the next [`update`](Self::update) to run.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the next [`update`](Self::update) will run.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// End-of-cycle pass.
    ///
    /// When dirty, every shape's extremes are reset and rebuilt from every tile snapshot,
    /// then each shape whose extremes moved is notified once per extreme with its final
    /// value. When clean this does nothing.
    pub fn update(&mut self) -> PassStats {
        let mut stats = PassStats::default();
        if !self.dirty {
            return stats;
        }
        stats.ran = true;
        stats.tiles = self.snapshots.len();

        for (_, record) in self.shapes.iter_mut() {
            record.result.reset();
        }
        for (_, snapshot) in self.snapshots.iter() {
            for (id, record) in self.shapes.iter_mut() {
                if scan_pair(
                    snapshot.geometry(),
                    record,
                    &self.config,
                    &mut self.visited,
                    &mut stats,
                ) {
                    self.queue.schedule(id, &mut record.result);
                }
            }
        }
        self.dirty = false;
        stats.notifications = self.queue.drain(&mut self.shapes, &mut self.observer);

        debug!(
            "pass: {} tiles, {} shapes, {} pairs scanned, {} culled, {} samples, {} rays, {} notifications",
            stats.tiles,
            self.shapes.len(),
            stats.pairs_scanned,
            stats.pairs_culled,
            stats.samples,
            stats.rays_cast,
            stats.notifications
        );
        stats
    }
}

impl<K, O, B: Backend> Debug for EngineGeneric<K, O, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineGeneric")
            .field("config", &self.config)
            .field("shapes", &self.shapes.len())
            .field("tiles", &self.snapshots.len())
            .field("queued", &self.queue.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
