//! Benchmarks for field generation and shader assembly.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use heartfield::{FieldConfig, ParticleField};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_generate");

    for count in [1_000u32, 15_000, 100_000] {
        let cfg = FieldConfig {
            count,
            ..FieldConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(count), &cfg, |b, cfg| {
            b.iter(|| {
                let mut rng = SmallRng::seed_from_u64(42);
                black_box(ParticleField::generate(cfg, &mut rng))
            })
        });
    }

    group.finish();
}

fn bench_vertices(c: &mut Criterion) {
    let cfg = FieldConfig::default();
    let mut rng = SmallRng::seed_from_u64(42);
    let field = ParticleField::generate(&cfg, &mut rng).unwrap();

    c.bench_function("field_vertices", |b| {
        b.iter(|| black_box(field.vertices()))
    });
}

fn bench_render_shader(c: &mut Criterion) {
    let cfg = FieldConfig::default();
    c.bench_function("render_shader", |b| {
        b.iter(|| black_box(heartfield::shading::render_shader(&cfg)))
    });
}

criterion_group!(benches, bench_generate, bench_vertices, bench_render_shader);
criterion_main!(benches);
