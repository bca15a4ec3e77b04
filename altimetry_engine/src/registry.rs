// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shape registry: generational slots holding query shapes and their results.

use altimetry_mesh::{Backend, IndexedMesh, Mesh, Sphere};
use glam::DVec3;

use crate::types::{ResultState, ShapeId};

/// One registered query region.
///
/// The geometry is an owned copy, already in the tile set's root frame. Raycasts against it
/// are double-sided, so footprint winding does not matter.
#[derive(Clone, Debug)]
pub struct ShapeRecord<B: Backend> {
    pub(crate) direction: DVec3,
    pub(crate) geometry: IndexedMesh<B>,
    pub(crate) result: ResultState,
}

impl<B: Backend> ShapeRecord<B> {
    /// Build a record from a copy of `geometry`. `direction` must already be unit length.
    pub(crate) fn new(geometry: &Mesh, direction: DVec3) -> Self {
        Self {
            direction,
            geometry: IndexedMesh::new(geometry.clone()),
            result: ResultState::default(),
        }
    }

    /// Unit query axis.
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Bounding sphere of the footprint, used for pair culling.
    pub fn sphere(&self) -> Sphere {
        self.geometry.sphere()
    }

    /// The owned footprint copy.
    pub fn geometry(&self) -> &Mesh {
        self.geometry.mesh()
    }

    /// Accumulated extremes.
    pub fn result(&self) -> &ResultState {
        &self.result
    }
}

/// Generational slot storage for shapes.
#[derive(Debug)]
pub(crate) struct ShapeRegistry<B: Backend> {
    slots: Vec<Option<ShapeRecord<B>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    live: usize,
}

impl<B: Backend> Default for ShapeRegistry<B> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }
}

impl<B: Backend> ShapeRegistry<B> {
    pub(crate) fn insert(&mut self, record: ShapeRecord<B>) -> ShapeId {
        self.live += 1;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            // Retired slots never reach the free list, so this cannot overflow.
            let generation = self.generations[idx] + 1;
            self.generations[idx] = generation;
            self.slots[idx] = Some(record);
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(record));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        slot_id(idx, generation)
    }

    /// Swap in a freshly built record, keeping the handle. Returns false for stale handles.
    pub(crate) fn replace(&mut self, id: ShapeId, record: ShapeRecord<B>) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: ShapeId) -> Option<ShapeRecord<B>> {
        if !self.contains(id) {
            return None;
        }
        self.release_slot(id.idx());
        self.live -= 1;
        self.slots[id.idx()].take()
    }

    /// Drop every shape. Generations persist so old handles stay stale.
    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.free_list.clear();
        self.free_list.extend(
            (0..)
                .zip(&self.generations)
                .filter(|&(_, &generation)| generation < u32::MAX)
                .map(|(i, _)| i),
        );
        self.live = 0;
    }

    /// Make a slot reusable, unless its generation is exhausted; then it stays empty.
    fn release_slot(&mut self, idx: usize) {
        if self.generations[idx] < u32::MAX {
            self.free_list.push(idx);
        }
    }

    pub(crate) fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: ShapeId) -> Option<&ShapeRecord<B>> {
        if self.generations.get(id.idx()) != Some(&id.generation()) {
            return None;
        }
        self.slots.get(id.idx())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ShapeId) -> Option<&mut ShapeRecord<B>> {
        if self.generations.get(id.idx()) != Some(&id.generation()) {
            return None;
        }
        self.slots.get_mut(id.idx())?.as_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ShapeId, &ShapeRecord<B>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            let record = s.as_ref()?;
            Some((slot_id(i, self.generations[i]), record))
        })
    }

    pub(crate) fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (ShapeId, &mut ShapeRecord<B>)> + '_ {
        let generations = &self.generations;
        self.slots.iter_mut().enumerate().filter_map(move |(i, s)| {
            let record = s.as_mut()?;
            Some((slot_id(i, generations[i]), record))
        })
    }
}

fn slot_id(idx: usize, generation: u32) -> ShapeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "ShapeId uses 32-bit indices by design."
    )]
    let idx = idx as u32;
    ShapeId::new(idx, generation)
}
