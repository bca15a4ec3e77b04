// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Altimetry Engine: minimum and maximum terrain altitude under user-defined footprints.
//!
//! The engine tracks the real extremes of a streamed, level-of-detail tile surface beneath
//! a set of query shapes, and keeps them current as tiles stream in and out and as
//! shapes change. It is meant to sit between a tile streaming system and consumers that
//! reshape or place content based on those extremes (terrain flattening, for example).
//!
//! - Tiles are snapshotted when they become available. The engine keeps its own
//!   world-space copy, so collaborators are free to deform the live mesh afterwards.
//! - Shapes are footprint meshes with a query direction ("down"). Altitude is measured
//!   against that direction: `altitude = -point · direction`.
//! - One dirty flag gates the recompute pass; a clean [`EngineGeneric::update`] does nothing.
//! - Changes are delivered through an [`AltitudeObserver`], at most once per extreme per
//!   shape per pass, carrying the final value for the pass.
//!
//! ## The scan
//!
//! For every tile snapshot and shape, a pass:
//!
//! 1. Culls the pair if their bounding spheres cannot overlap along the query axis.
//! 2. Skips skirt triangles, whose normals are nearly perpendicular to the axis.
//! 3. Samples each distinct vertex once (or each triangle centroid, see [`SampleMode`]).
//! 4. Skips samples strictly between the current extremes without casting anything.
//! 5. Casts along the axis against the footprint to check the sample lies under the shape.
//! 6. Optionally re-casts against the tile itself and rejects steep hits
//!    (see [`SurfaceRefinement`]).
//!
//! All comparisons happen in the tile set's root frame
//! (see [`EngineGeneric::set_root_transform`]).
//!
//! ## Backends
//!
//! [`Engine`] uses the [`Bvh`](altimetry_mesh::Bvh) backend for both footprints and
//! tiles. [`EngineGeneric`] accepts any [`Backend`](altimetry_mesh::Backend), such as
//! [`FlatScan`](altimetry_mesh::FlatScan) for very small meshes.
//!
//! ## Example
//!
//! ```rust
//! use altimetry_engine::{Callbacks, Engine, ScanConfig};
//! use altimetry_mesh::Mesh;
//! use glam::{DAffine3, DVec3};
//!
//! let mut lowest = Vec::new();
//! let mut engine: Engine<u64, _> = Engine::new(
//!     ScanConfig::default(),
//!     Callbacks::new(|alt, _, _| lowest.push(alt), |_, _, _| {}),
//! );
//!
//! // A footprint high above the ground, looking down -Y.
//! let footprint = Mesh::from_soup(vec![
//!     DVec3::new(0.0, 100.0, 40.0),
//!     DVec3::new(-35.0, 100.0, -20.0),
//!     DVec3::new(35.0, 100.0, -20.0),
//! ])
//! .unwrap();
//! let shape = engine.add_shape(&footprint, Some(DVec3::NEG_Y)).unwrap();
//!
//! // A tile streams in at height 12.
//! let tile = Mesh::from_soup(vec![
//!     DVec3::new(-4.0, 12.0, -4.0),
//!     DVec3::new(0.0, 12.0, 4.0),
//!     DVec3::new(4.0, 12.0, -4.0),
//! ])
//! .unwrap();
//! engine.tile_available(1, &tile, &DAffine3::IDENTITY).unwrap();
//!
//! let stats = engine.update();
//! assert!(stats.ran);
//! assert_eq!(engine.extremes(shape).unwrap().min.unwrap().altitude, 12.0);
//!
//! // Nothing changed since, so the next pass is skipped.
//! assert!(!engine.update().ran);
//! drop(engine);
//! assert_eq!(lowest, vec![12.0, 12.0]);
//! ```
//!
//! The tile triggers one notification when it arrives and another when the pass
//! rebuilds the extremes from scratch.

mod config;
mod dispatch;
mod engine;
mod error;
mod registry;
mod scan;
mod snapshot;
mod types;

pub use config::{SampleMode, ScanConfig, SurfaceRefinement};
pub use dispatch::{AltitudeObserver, Callbacks};
pub use engine::{Engine, EngineGeneric};
pub use error::EngineError;
pub use registry::ShapeRecord;
pub use snapshot::TileSnapshot;
pub use types::{Extremes, Extremum, PassStats, Pending, ResultState, ShapeId, altitude_of};
