// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use altimetry_engine::{EngineGeneric, PassStats, SampleMode, ScanConfig, SurfaceRefinement};
use altimetry_mesh::{Backend, Bvh, FlatScan, Mesh};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{DAffine3, DVec3};

/// One `quads`×`quads` height-field tile of side `size`, origin at its corner.
fn gen_tile(quads: u32, size: f64, rng: &mut Rng) -> Mesh {
    let step = size / f64::from(quads);
    let mut positions = Vec::new();
    for z in 0..=quads {
        for x in 0..=quads {
            let (xf, zf) = (f64::from(x) * step, f64::from(z) * step);
            let y = 8.0 * (xf * 0.05).sin() * (zf * 0.04).cos() + rng.next_f64();
            positions.push(DVec3::new(xf, y, zf));
        }
    }
    let row = quads + 1;
    let mut triangles = Vec::new();
    for z in 0..quads {
        for x in 0..quads {
            let i = z * row + x;
            triangles.push([i, i + row, i + 1]);
            triangles.push([i + 1, i + row, i + row + 1]);
        }
    }
    Mesh::from_triangles(positions, triangles).unwrap()
}

/// Triangle footprint at `y = 200` circumscribing a circle of radius `r` around (`x`, `z`).
fn gen_footprint(x: f64, z: f64, r: f64) -> Mesh {
    let corner = |deg: f64| {
        let a = deg.to_radians();
        DVec3::new(x + 2.0 * r * a.cos(), 200.0, z + 2.0 * r * a.sin())
    };
    Mesh::from_soup(vec![corner(90.0), corner(210.0), corner(330.0)]).unwrap()
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// A `tiles`×`tiles` field of 64-unit tiles and a handful of footprints over it.
fn build<B: Backend>(config: ScanConfig, tiles: u32) -> EngineGeneric<u32, (), B> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let mut engine = EngineGeneric::new(config, ());
    for tz in 0..tiles {
        for tx in 0..tiles {
            let mesh = gen_tile(16, 64.0, &mut rng);
            let at = DAffine3::from_translation(DVec3::new(
                f64::from(tx) * 64.0,
                0.0,
                f64::from(tz) * 64.0,
            ));
            engine.tile_available(tz * tiles + tx, &mesh, &at).unwrap();
        }
    }
    let extent = f64::from(tiles) * 64.0;
    for _ in 0..8 {
        let x = rng.next_f64() * extent;
        let z = rng.next_f64() * extent;
        engine
            .add_shape(&gen_footprint(x, z, 20.0), Some(DVec3::NEG_Y))
            .unwrap();
    }
    engine
}

fn run_pass<B: Backend>(engine: &mut EngineGeneric<u32, (), B>) -> PassStats {
    engine.mark_dirty();
    engine.update()
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");
    for &tiles in &[4_u32, 8] {
        let config = ScanConfig::default();
        group.throughput(Throughput::Elements(u64::from(tiles * tiles)));
        let mut flat = build::<FlatScan>(config, tiles);
        group.bench_function(format!("flatscan_tiles{}", tiles * tiles), |b| {
            b.iter(|| black_box(run_pass(&mut flat)));
        });
        let mut bvh = build::<Bvh>(config, tiles);
        group.bench_function(format!("bvh_tiles{}", tiles * tiles), |b| {
            b.iter(|| black_box(run_pass(&mut bvh)));
        });
    }
    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");
    let modes = [
        ("vertices", ScanConfig::default()),
        (
            "centroids",
            ScanConfig::default().with_sample_mode(SampleMode::Centroids),
        ),
        (
            "vertices_refined",
            ScanConfig::default().with_surface_refinement(Some(SurfaceRefinement::default())),
        ),
    ];
    for (name, config) in modes {
        let mut engine = build::<Bvh>(config, 6);
        group.bench_function(name, |b| {
            b.iter(|| black_box(run_pass(&mut engine)));
        });
    }
    group.finish();
}

fn bench_tile_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_stream");
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let incoming: Vec<Mesh> = (0..16).map(|_| gen_tile(16, 64.0, &mut rng)).collect();
    group.throughput(Throughput::Elements(incoming.len() as u64));
    group.bench_function("capture_and_partial_scan", |b| {
        b.iter_batched(
            || build::<Bvh>(ScanConfig::default(), 4),
            |mut engine| {
                for (k, mesh) in (100_u32..).zip(&incoming) {
                    let at = DAffine3::from_translation(DVec3::new(
                        f64::from(k % 4) * 64.0,
                        1.0,
                        f64::from(k / 4 % 4) * 64.0,
                    ));
                    engine.tile_available(k, mesh, &at).unwrap();
                }
                black_box(engine.update());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_full_pass, bench_sampling, bench_tile_stream);
criterion_main!(benches);
