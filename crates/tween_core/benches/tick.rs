//! Scheduler tick benchmarks
//!
//! Measures one frame of updates across many running tweens, plus raw
//! easing evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tween_core::{Ease, Scheduler, Shape, Vec3};

fn populate(scheduler: &Scheduler, count: usize) {
    for i in 0..count {
        let tween = scheduler.create_tween().looped(-1);
        tween
            .new_property(Vec3::ZERO, Vec3::new(i as f32, 1.0, 2.0), 1.0)
            .shape(Shape::Cubic)
            .ease(Ease::InOut);
        tween
            .new_property(0.0f32, 1.0, 0.5)
            .shape(Shape::Elastic)
            .ease(Ease::Out);
        tween.play();
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for count in [10, 100, 1000] {
        let scheduler = Scheduler::new();
        populate(&scheduler, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| scheduler.tick(black_box(1.0 / 60.0)))
        });
    }
    group.finish();
}

fn bench_easing(c: &mut Criterion) {
    let mut group = c.benchmark_group("easing");
    for shape in [Shape::Quad, Shape::Elastic, Shape::Bounce] {
        group.bench_function(format!("{:?}", shape), |b| {
            b.iter(|| {
                let mut acc = 0.0;
                for i in 0..=100 {
                    acc += Ease::InOut.apply(black_box(i as f32 / 100.0), &shape);
                }
                acc
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_easing);
criterion_main!(benches);
