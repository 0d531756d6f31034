use criterion::{criterion_group, criterion_main, Criterion};
use smallvec::smallvec;
use std::hint::black_box;
use tinta::{compile, Color, GradientMetadata, GradientShape, GradientStop, Pattern, Vec2};

fn metadata(stop_count: usize, pattern: Option<Pattern>) -> GradientMetadata {
    let stops = (0..stop_count)
        .map(|i| GradientStop {
            color: Color::rgb((i * 40) as u8, 128, 255 - (i * 40) as u8),
            alpha: 1.0,
            left: i as f32 / (stop_count - 1) as f32,
        })
        .collect();
    GradientMetadata {
        shape: GradientShape::Linear,
        pattern,
        control_point_offsets: smallvec![Vec2::new(0.0, -100.0), Vec2::new(0.0, 100.0)],
        stops,
        ..GradientMetadata::default()
    }
}

fn bench_compile(c: &mut Criterion) {
    let two_stop = metadata(2, None);
    c.bench_function("compile_two_stop_gradient", |b| {
        b.iter(|| compile(black_box(&two_stop)))
    });

    let six_stop = metadata(6, None);
    c.bench_function("compile_six_stop_gradient", |b| {
        b.iter(|| compile(black_box(&six_stop)))
    });

    let patterned = metadata(2, Some(Pattern::Checker));
    c.bench_function("compile_checker_pattern", |b| {
        b.iter(|| compile(black_box(&patterned)))
    });
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
