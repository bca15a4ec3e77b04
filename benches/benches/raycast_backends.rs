// Copyright 2025 the Altimetry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use altimetry_mesh::{Backend, Bvh, FlatScan, IndexedMesh, Mesh, Ray};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;

fn gen_grid(n: u32) -> Mesh {
    let mut positions = Vec::new();
    for z in 0..=n {
        for x in 0..=n {
            let (xf, zf) = (f64::from(x), f64::from(z));
            positions.push(DVec3::new(xf, (xf * 0.3).sin() * (zf * 0.2).cos(), zf));
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

fn gen_rays(n: u32, count: u32) -> Vec<Ray> {
    let extent = f64::from(n);
    (0..count)
        .map(|i| {
            let t = f64::from(i) / f64::from(count);
            let origin = DVec3::new(t * extent, 50.0, (t * 7.3).fract() * extent);
            Ray::new(origin, DVec3::NEG_Y)
        })
        .collect()
}

fn bench_backend<B: Backend>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(name);
    for &n in &[16_u32, 64, 128] {
        let mesh = gen_grid(n);
        let rays = gen_rays(n, 256);
        group.throughput(Throughput::Elements(rays.len() as u64));
        group.bench_function(format!("build_n{n}"), |b| {
            b.iter_batched(
                || mesh.clone(),
                |m| black_box(IndexedMesh::<B>::new(m)),
                BatchSize::SmallInput,
            );
        });
        let indexed = IndexedMesh::<B>::new(mesh);
        group.bench_function(format!("raycast_n{n}"), |b| {
            b.iter(|| {
                let hits = rays.iter().filter_map(|r| indexed.raycast(r)).count();
                black_box(hits)
            });
        });
    }
    group.finish();
}

fn bench_flatscan(c: &mut Criterion) {
    bench_backend::<FlatScan>(c, "flatscan");
}

fn bench_bvh(c: &mut Criterion) {
    bench_backend::<Bvh>(c, "bvh");
}

criterion_group!(benches, bench_flatscan, bench_bvh);
criterion_main!(benches);
