// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Level-of-detail streaming.
//!
//! A tile set placed far from the world origin streams a coarse tile, then replaces it
//! with four finer children. A collaborator flattens the live meshes in place after each
//! capture; the engine keeps measuring the terrain as it arrived.
//!
//! Run:
//! - `RUST_LOG=altimetry_engine=trace cargo run -p altimetry_demos --example lod_stream`

use altimetry_engine::{AltitudeObserver, Engine, ScanConfig, ShapeId, SurfaceRefinement};
use altimetry_mesh::Mesh;
use glam::{DAffine3, DVec3};
use log::info;

/// Prints every change, and remembers the latest minimum.
#[derive(Debug, Default)]
struct Report {
    floor: Option<f64>,
}

impl AltitudeObserver for Report {
    fn min_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        info!("{shape:?}: min {altitude:.3} at {point:.2?}");
        self.floor = Some(altitude);
    }

    fn max_changed(&mut self, altitude: f64, point: DVec3, shape: ShapeId) {
        info!("{shape:?}: max {altitude:.3} at {point:.2?}");
    }
}

/// Rolling terrain height at a root-frame position.
fn terrain(x: f64, z: f64) -> f64 {
    12.0 + 6.0 * (x * 0.02).sin() + 4.0 * (z * 0.03).cos()
}

/// Height-field tile covering `[x0, x0 + size] × [z0, z0 + size]` with `quads` cells per side.
fn tile(x0: f64, z0: f64, size: f64, quads: u32) -> Mesh {
    let step = size / f64::from(quads);
    let mut positions = Vec::new();
    for j in 0..=quads {
        for i in 0..=quads {
            let x = x0 + f64::from(i) * step;
            let z = z0 + f64::from(j) * step;
            positions.push(DVec3::new(x, terrain(x, z), z));
        }
    }
    let row = quads + 1;
    let mut triangles = Vec::new();
    for j in 0..quads {
        for i in 0..quads {
            let k = j * row + i;
            triangles.push([k, k + row, k + 1]);
            triangles.push([k + 1, k + row, k + row + 1]);
        }
    }
    Mesh::from_triangles(positions, triangles).unwrap()
}

/// Stand-in for a flattening consumer editing the live mesh.
fn flatten(mesh: &mut Mesh, height: f64) {
    for p in mesh.positions_mut() {
        p.y = height;
    }
}

fn main() {
    env_logger::init();

    let config = ScanConfig::default().with_surface_refinement(Some(SurfaceRefinement::default()));
    let mut engine: Engine<(u8, u8), Report> = Engine::new(config, Report::default());

    // The tile set sits far from the world origin; tiles arrive in world space.
    let world_from_root = DAffine3::from_translation(DVec3::new(4.0e6, 120.0, -2.5e6));
    engine.set_root_transform(world_from_root).unwrap();

    let footprint = Mesh::from_soup(vec![
        DVec3::new(128.0, 200.0, 188.0),
        DVec3::new(76.0, 200.0, 98.0),
        DVec3::new(180.0, 200.0, 98.0),
    ])
    .unwrap();
    let site = engine.add_shape(&footprint, Some(DVec3::NEG_Y)).unwrap();

    // Coarse root tile.
    let mut coarse = tile(0.0, 0.0, 256.0, 4);
    engine.tile_available((0, 0), &coarse, &world_from_root).unwrap();
    flatten(&mut coarse, 0.0);
    let stats = engine.update();
    info!("coarse pass: {stats:?}");
    let coarse_ex = engine.extremes(site).unwrap();

    // Refine: four children replace the parent.
    engine.tile_disposed(&(0, 0));
    for (cx, cz) in [(0_u8, 0_u8), (1, 0), (0, 1), (1, 1)] {
        let mut child = tile(f64::from(cx) * 128.0, f64::from(cz) * 128.0, 128.0, 16);
        engine
            .tile_available((1, cx * 2 + cz), &child, &world_from_root)
            .unwrap();
        flatten(&mut child, 0.0);
    }
    let stats = engine.update();
    info!("fine pass: {stats:?}");
    let fine_ex = engine.extremes(site).unwrap();

    for (label, ex) in [("coarse", coarse_ex), ("fine", fine_ex)] {
        if let (Some(min), Some(max)) = (ex.min, ex.max) {
            println!(
                "{label:>6}: min {:.3}  max {:.3}  span {:.3}",
                min.altitude,
                max.altitude,
                max.altitude - min.altitude
            );
        }
    }
    println!("last reported floor: {:?}", engine.observer().floor);
}
