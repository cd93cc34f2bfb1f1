//! Sparse-set insert/remove/lookup benchmarks.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sparse_ecs::{Ecs, Entity, SparseSet};

#[derive(Clone, Copy, Default)]
struct Transform {
    position: [f32; 3],
    rotation: [f32; 4],
    scale: [f32; 3],
}

#[derive(Clone, Copy)]
struct Velocity([f32; 3]);

fn populated(count: usize) -> (Ecs, Vec<Entity>) {
    let mut ecs = Ecs::new();
    let entities: Vec<_> = (0..count).map(|_| ecs.create_entity()).collect();
    for (i, e) in entities.iter().enumerate() {
        ecs.emplace_component(*e, Transform::default());
        if i % 2 == 0 {
            ecs.emplace_component(*e, Velocity([1.0, 0.5, 0.25]));
        }
    }
    (ecs, entities)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_insert");

    for count in [1_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut set = SparseSet::new();
                for i in 0..count as u32 {
                    set.insert(Entity::new(i, 0), Transform::default());
                }
                black_box(set.len())
            });
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("ecs_destroy_create_10k", |b| {
        let (mut ecs, mut entities) = populated(10_000);
        b.iter(|| {
            for e in entities.iter_mut().step_by(3) {
                ecs.destroy_entity(*e);
                *e = ecs.create_entity();
                ecs.emplace_component(*e, Transform::default());
            }
            black_box(ecs.entity_count())
        });
    });
}

fn bench_lookup(c: &mut Criterion) {
    let (ecs, entities) = populated(100_000);

    c.bench_function("ecs_try_get_100k", |b| {
        b.iter(|| {
            let mut speed = 0.0f32;
            for e in &entities {
                if let Some(Velocity(v)) = ecs.try_get_component::<Velocity>(*e) {
                    speed += v[0];
                }
            }
            black_box(speed)
        });
    });
}

fn bench_iterate(c: &mut Criterion) {
    let (mut ecs, _) = populated(100_000);

    c.bench_function("ecs_iterate_transforms_100k", |b| {
        b.iter(|| {
            let mut transforms = ecs.get_storage_mut::<Transform>().unwrap();
            for t in transforms.components_mut() {
                t.position[0] += 0.001;
                t.rotation[3] = 1.0;
                t.scale = [1.0; 3];
            }
            black_box(transforms.len())
        });
    });
}

criterion_group!(benches, bench_insert, bench_churn, bench_lookup, bench_iterate);
criterion_main!(benches);
