use cadence_animation_core::{InterpMode, Keyframe, Timecourse, Timepoint};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn mk_vector_tc(samples: usize) -> Timecourse {
    Timecourse::from_points((0..samples).map(|i| {
        let t = i as f64;
        Timepoint::new(t, Keyframe::vector(t.sin(), t.cos(), 0.5 * t))
    }))
    .expect("finite sample times")
}

fn evaluate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("timecourse_evaluate");
    for samples in [4, 64, 1024] {
        let tc = mk_vector_tc(samples);
        let mid = samples as f64 * 0.5 + 0.25;
        for mode in [
            InterpMode::Linear,
            InterpMode::Interpolating,
            InterpMode::Approximating,
        ] {
            group.bench_function(format!("{mode:?}_{samples}"), |b| {
                b.iter(|| black_box(tc.evaluate(black_box(mid), mode)))
            });
        }
    }
    group.finish();
}

fn subdivide_benchmark(c: &mut Criterion) {
    let tc = mk_vector_tc(256);
    c.bench_function("subdivide_256", |b| {
        b.iter(|| black_box(tc.subdivide(InterpMode::Interpolating)))
    });
}

criterion_group!(benches, evaluate_benchmark, subdivide_benchmark);
criterion_main!(benches);
