use criterion::{black_box, criterion_group, criterion_main, Criterion};

use voxmesh::surface::cubic::extract_cubic_mesh;
use voxmesh::surface::decimate::MeshDecimator;
use voxmesh::voxel::volume::solid_sphere;
use voxmesh::voxel::voxel::{occludes, solid_quad_needed};

fn bench_extract_sphere_32(c: &mut Criterion) {
    let volume = solid_sphere(32, 14.0);
    let region = volume.region();

    c.bench_function("extract_sphere_32", |b| {
        b.iter(|| {
            extract_cubic_mesh(
                black_box(&volume),
                black_box(region),
                solid_quad_needed,
                occludes,
                false,
            )
            .unwrap()
        });
    });
}

fn bench_extract_sphere_32_merged(c: &mut Criterion) {
    let volume = solid_sphere(32, 14.0);
    let region = volume.region();

    c.bench_function("extract_sphere_32_merged", |b| {
        b.iter(|| {
            extract_cubic_mesh(
                black_box(&volume),
                black_box(region),
                solid_quad_needed,
                occludes,
                true,
            )
            .unwrap()
        });
    });
}

fn bench_extract_sphere_64(c: &mut Criterion) {
    let volume = solid_sphere(64, 28.0);
    let region = volume.region();

    c.bench_function("extract_sphere_64", |b| {
        b.iter(|| {
            extract_cubic_mesh(
                black_box(&volume),
                black_box(region),
                solid_quad_needed,
                occludes,
                false,
            )
            .unwrap()
        });
    });
}

fn bench_decimate_sphere_32(c: &mut Criterion) {
    let volume = solid_sphere(32, 14.0);
    let mesh = extract_cubic_mesh(
        &volume,
        volume.region(),
        solid_quad_needed,
        occludes,
        true,
    )
    .unwrap();

    c.bench_function("decimate_sphere_32", |b| {
        b.iter(|| {
            let mut copy = black_box(mesh.clone());
            MeshDecimator::new(&mut copy).with_region(volume.region()).execute()
        });
    });
}

criterion_group!(
    benches,
    bench_extract_sphere_32,
    bench_extract_sphere_32_merged,
    bench_extract_sphere_64,
    bench_decimate_sphere_32
);
criterion_main!(benches);
