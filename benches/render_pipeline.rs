use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use fractal_stream::core::actions::render_rows::render_rows::{render_image, render_line};
use fractal_stream::core::fractals::escape_time::algorithm::EscapeTimeAlgorithm;
use fractal_stream::{RenderMode, RenderRequest, Viewport, dispatch};

const SIZES: [(u32, u32); 2] = [(320, 240), (800, 600)];
const ITERATION_BOUND: u32 = 256;

fn viewport() -> Viewport {
    Viewport::new(-0.745, 0.113, 40.0)
}

fn bench_whole_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_image");

    for (width, height) in SIZES {
        let algorithm = EscapeTimeAlgorithm::new(viewport(), width, height, ITERATION_BOUND)
            .expect("benchmark parameters are valid");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &algorithm,
            |b, algorithm| b.iter(|| render_image(black_box(algorithm))),
        );
    }

    group.finish();
}

fn bench_line_by_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_line_by_line");

    for (width, height) in SIZES {
        let algorithm = EscapeTimeAlgorithm::new(viewport(), width, height, ITERATION_BOUND)
            .expect("benchmark parameters are valid");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &algorithm,
            |b, algorithm| {
                b.iter(|| {
                    (0..algorithm.height())
                        .map(|y| render_line(black_box(algorithm), y))
                        .count()
                })
            },
        );
    }

    group.finish();
}

fn bench_dispatch_line_stream(c: &mut Criterion) {
    let request = RenderRequest::image(viewport(), 320, 240, ITERATION_BOUND)
        .with_mode(RenderMode::Line);

    c.bench_function("dispatch_line_stream_320x240", |b| {
        b.iter(|| {
            dispatch(black_box(&request))
                .expect("benchmark request is valid")
                .map(|rows| rows.data.len())
                .sum::<usize>()
        })
    });
}

criterion_group!(
    benches,
    bench_whole_image,
    bench_line_by_line,
    bench_dispatch_line_stream
);
criterion_main!(benches);
