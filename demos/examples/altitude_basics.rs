// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Altitude basics.
//!
//! Register a footprint, stream two tiles in, run passes, drop a tile, and watch the
//! min/max notifications.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p altimetry_demos --example altitude_basics`

use altimetry_engine::{Callbacks, Engine, ScanConfig};
use altimetry_mesh::Mesh;
use glam::{DAffine3, DVec3};

/// Flat square tile of half-width `h` at height `y`, centred on (`x`, `z`).
fn flat_tile(x: f64, y: f64, z: f64, h: f64) -> Mesh {
    Mesh::from_triangles(
        vec![
            DVec3::new(x - h, y, z - h),
            DVec3::new(x + h, y, z - h),
            DVec3::new(x + h, y, z + h),
            DVec3::new(x - h, y, z + h),
        ],
        vec![[0, 2, 1], [0, 3, 2]],
    )
    .unwrap()
}

fn main() {
    env_logger::init();

    let mut engine: Engine<&str, _> = Engine::new(
        ScanConfig::default(),
        Callbacks::new(
            |alt, p, shape| println!("min  {alt:7.2} at {p:?} for {shape:?}"),
            |alt, p, shape| println!("max  {alt:7.2} at {p:?} for {shape:?}"),
        ),
    );

    // A triangular footprint well above the ground, looking straight down.
    let footprint = Mesh::from_soup(vec![
        DVec3::new(0.0, 500.0, 100.0),
        DVec3::new(-86.6, 500.0, -50.0),
        DVec3::new(86.6, 500.0, -50.0),
    ])
    .unwrap();
    let shape = engine.add_shape(&footprint, Some(DVec3::NEG_Y)).unwrap();

    println!("-- tiles stream in");
    engine
        .tile_available("low", &flat_tile(-10.0, 5.0, 0.0, 8.0), &DAffine3::IDENTITY)
        .unwrap();
    engine
        .tile_available("high", &flat_tile(10.0, 20.0, 0.0, 8.0), &DAffine3::IDENTITY)
        .unwrap();

    println!("-- end of cycle");
    let stats = engine.update();
    println!("{stats:?}");
    let ex = engine.extremes(shape).unwrap();
    assert_eq!(ex.min.unwrap().altitude, 5.0);
    assert_eq!(ex.max.unwrap().altitude, 20.0);

    println!("-- nothing changed");
    assert!(!engine.update().ran);

    println!("-- the high tile is discarded");
    engine.tile_disposed(&"high");
    engine.update();
    let ex = engine.extremes(shape).unwrap();
    assert_eq!(ex.max.unwrap().altitude, 5.0);
}
