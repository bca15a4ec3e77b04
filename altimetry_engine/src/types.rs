// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the engine: shape handles, pending flags, and extremum results.

use glam::DVec3;

/// Identifier for a registered query shape.
///
/// This is a small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On [`add_shape`](crate::EngineGeneric::add_shape), a fresh slot is allocated with generation `1`.
/// - [`update_shape`](crate::EngineGeneric::update_shape) rebuilds the record in place; the handle stays valid.
/// - On delete, the slot is freed; any existing `ShapeId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ShapeId`.
///
/// Stale handles never alias a different live shape because the generation must match.
/// A slot whose generation reaches `u32::MAX` is retired instead of being reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShapeId(pub(crate) u32, pub(crate) u32);

impl ShapeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Which extremes of a shape changed since its last notification.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Pending: u8 {
        /// The minimum altitude moved lower.
        const MIN = 0b0000_0001;
        /// The maximum altitude moved higher.
        const MAX = 0b0000_0010;
    }
}

/// One extreme: an altitude and the root-frame point it was measured at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extremum {
    /// Altitude along the shape's direction axis (`-point · direction`).
    pub altitude: f64,
    /// Surface point in the tile set's root frame.
    pub point: DVec3,
}

/// Current extremes of a shape. Either side is `None` while no surface point has
/// been found under the shape in the current pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Extremes {
    /// Lowest altitude found.
    pub min: Option<Extremum>,
    /// Highest altitude found.
    pub max: Option<Extremum>,
}

/// Altitude of `point` measured along `direction`.
///
/// `direction` points "down", so higher ground gives a larger altitude.
pub fn altitude_of(point: DVec3, direction: DVec3) -> f64 {
    -point.dot(direction)
}

/// Counters for one recompute pass, returned by [`update`](crate::EngineGeneric::update).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// False when the engine was clean and the pass did nothing.
    pub ran: bool,
    /// Tile snapshots visited.
    pub tiles: usize,
    /// Tile/shape pairs that survived sphere culling.
    pub pairs_scanned: usize,
    /// Tile/shape pairs rejected by sphere culling.
    pub pairs_culled: usize,
    /// Sample points considered (after skirt rejection and dedup).
    pub samples: usize,
    /// Containment and refinement rays cast.
    pub rays_cast: usize,
    /// Observer calls made at the end of the pass.
    pub notifications: usize,
}

/// Accumulated extremes for one shape, reset at the start of every pass.
#[derive(Clone, Debug)]
pub struct ResultState {
    pub(crate) min_altitude: f64,
    pub(crate) min_point: DVec3,
    pub(crate) max_altitude: f64,
    pub(crate) max_point: DVec3,
    pub(crate) pending: Pending,
    pub(crate) scheduled: bool,
}

impl Default for ResultState {
    fn default() -> Self {
        Self {
            min_altitude: f64::INFINITY,
            min_point: DVec3::ZERO,
            max_altitude: f64::NEG_INFINITY,
            max_point: DVec3::ZERO,
            pending: Pending::empty(),
            scheduled: false,
        }
    }
}

impl ResultState {
    /// Return to the sentinel infinities and forget pending changes.
    ///
    /// The scheduled guard is left alone: it tracks an entry already in the dispatch queue.
    pub(crate) fn reset(&mut self) {
        self.min_altitude = f64::INFINITY;
        self.max_altitude = f64::NEG_INFINITY;
        self.pending = Pending::empty();
    }

    /// Whether `altitude` lies strictly between the current extremes and so cannot improve either.
    pub(crate) fn is_interior(&self, altitude: f64) -> bool {
        self.min_altitude < altitude && altitude < self.max_altitude
    }

    /// Fold a candidate into the extremes. Returns true if either side moved.
    pub(crate) fn offer(&mut self, altitude: f64, point: DVec3) -> bool {
        let mut changed = Pending::empty();
        if altitude < self.min_altitude {
            self.min_altitude = altitude;
            self.min_point = point;
            changed |= Pending::MIN;
        }
        if altitude > self.max_altitude {
            self.max_altitude = altitude;
            self.max_point = point;
            changed |= Pending::MAX;
        }
        self.pending |= changed;
        !changed.is_empty()
    }

    /// Changes not yet delivered.
    pub fn pending(&self) -> Pending {
        self.pending
    }

    /// Lowest altitude so far, or `None` at the sentinel.
    pub fn min(&self) -> Option<Extremum> {
        self.min_altitude.is_finite().then_some(Extremum {
            altitude: self.min_altitude,
            point: self.min_point,
        })
    }

    /// Highest altitude so far, or `None` at the sentinel.
    pub fn max(&self) -> Option<Extremum> {
        self.max_altitude.is_finite().then_some(Extremum {
            altitude: self.max_altitude,
            point: self.max_point,
        })
    }

    /// Both extremes.
    pub fn extremes(&self) -> Extremes {
        Extremes {
            min: self.min(),
            max: self.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_offer_sets_both_sides() {
        let mut r = ResultState::default();
        assert_eq!(r.extremes(), Extremes::default());
        assert!(r.offer(3.0, DVec3::X));
        assert_eq!(r.pending(), Pending::MIN | Pending::MAX);
        assert_eq!(r.min().unwrap().altitude, 3.0);
        assert_eq!(r.max().unwrap().point, DVec3::X);
    }

    #[test]
    fn equal_and_interior_offers_change_nothing() {
        let mut r = ResultState::default();
        r.offer(1.0, DVec3::ZERO);
        r.offer(5.0, DVec3::ZERO);
        r.pending = Pending::empty();
        assert!(r.is_interior(3.0));
        assert!(!r.is_interior(5.0));
        assert!(!r.offer(5.0, DVec3::Y));
        assert!(!r.offer(3.0, DVec3::Y));
        assert!(r.pending().is_empty());
    }

    #[test]
    fn reset_returns_to_sentinels() {
        let mut r = ResultState::default();
        r.offer(2.0, DVec3::ZERO);
        r.scheduled = true;
        r.reset();
        assert_eq!(r.extremes(), Extremes::default());
        assert!(r.pending().is_empty());
        assert!(r.scheduled);
    }

    #[test]
    fn altitude_points_against_direction() {
        let down = DVec3::NEG_Y;
        assert_eq!(altitude_of(DVec3::new(4.0, 10.0, -2.0), down), 10.0);
        assert_eq!(altitude_of(DVec3::new(0.0, 0.0, 7.0), DVec3::NEG_Z), 7.0);
    }
}
