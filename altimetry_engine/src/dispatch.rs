// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification: the observer seam and the deferred dispatch queue.

use core::fmt::Debug;

use altimetry_mesh::Backend;
use glam::DVec3;
use log::trace;

use crate::registry::ShapeRegistry;
use crate::types::{Pending, ResultState, ShapeId};

/// Receives extremum changes, at most once per extreme per shape per pass.
///
/// Each call carries the final value the pass settled on, not the intermediate ones.
pub trait AltitudeObserver {
    /// The shape's minimum altitude moved.
    fn min_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId);
    /// The shape's maximum altitude moved.
    fn max_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId);
}

impl AltitudeObserver for () {
    fn min_changed(&mut self, _: f64, _: DVec3, _: ShapeId) {}
    fn max_changed(&mut self, _: f64, _: DVec3, _: ShapeId) {}
}

impl<T: AltitudeObserver + ?Sized> AltitudeObserver for &mut T {
    fn min_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        (**self).min_changed(altitude, point, shape);
    }

    fn max_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        (**self).max_changed(altitude, point, shape);
    }
}

/// An [`AltitudeObserver`] built from two closures, one per extreme.
pub struct Callbacks<Min, Max> {
    min: Min,
    max: Max,
}

impl<Min, Max> Callbacks<Min, Max>
where
    Min: FnMut(f64, DVec3, ShapeId),
    Max: FnMut(f64, DVec3, ShapeId),
{
    /// Wrap the min-changed and max-changed closures.
    pub fn new(min: Min, max: Max) -> Self {
        Self { min, max }
    }
}

impl<Min, Max> AltitudeObserver for Callbacks<Min, Max>
where
    Min: FnMut(f64, DVec3, ShapeId),
    Max: FnMut(f64, DVec3, ShapeId),
{
    fn min_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        (self.min)(altitude, point, shape);
    }

    fn max_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        (self.max)(altitude, point, shape);
    }
}

impl<Min, Max> Debug for Callbacks<Min, Max> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks").finish_non_exhaustive()
    }
}

/// Shapes with undelivered changes, in the order they first changed.
#[derive(Debug, Default)]
pub(crate) struct DispatchQueue {
    queue: Vec<ShapeId>,
}

impl DispatchQueue {
    /// Queue `id` unless it is already waiting.
    pub(crate) fn schedule(&mut self, id: ShapeId, result: &mut ResultState) {
        if result.scheduled {
            return;
        }
        result.scheduled = true;
        self.queue.push(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Deliver every queued change. Shapes removed since scheduling are skipped.
    ///
    /// Returns the number of observer calls made.
    pub(crate) fn drain<B: Backend, O: AltitudeObserver>(
        &mut self,
        shapes: &mut ShapeRegistry<B>,
        observer: &mut O,
    ) -> usize {
        let mut calls = 0;
        for id in self.queue.drain(..) {
            let Some(record) = shapes.get_mut(id) else {
                trace!("skipping dispatch for removed shape {id:?}");
                continue;
            };
            let result = &mut record.result;
            let pending = core::mem::take(&mut result.pending);
            result.scheduled = false;
            if pending.contains(Pending::MIN)
                && let Some(min) = result.min()
            {
                trace!("min changed for {id:?}: {}", min.altitude);
                observer.min_changed(min.altitude, min.point, id);
                calls += 1;
            }
            if pending.contains(Pending::MAX)
                && let Some(max) = result.max()
            {
                trace!("max changed for {id:?}: {}", max.altitude);
                observer.max_changed(max.altitude, max.point, id);
                calls += 1;
            }
        }
        calls
    }
}
