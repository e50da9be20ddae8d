use cadence_animation_core::track::TrackMode;
use cadence_animation_core::{
    InterpMode, Keyframe, ObjectId, ObjectRef, ObjectState, Placement, PositionTrack,
};
use cadence_orchestrator::Scene;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// `len` objects where each one reads the next, so the scheduler sees one long chain.
fn mk_chain(len: usize) -> Scene {
    let mut scene = Scene::default();
    let ids: Vec<ObjectId> = (0..len)
        .map(|i| {
            scene
                .add_object(ObjectState::new(format!("link{i}")))
                .expect("object")
        })
        .collect();
    for (i, &id) in ids.iter().enumerate() {
        let placement = match ids.get(i + 1) {
            Some(&next) => Placement::relative_to(TrackMode::Absolute, ObjectRef::object(next)),
            None => Placement::absolute(),
        };
        let mut track = PositionTrack::new("Link")
            .with_placement(placement)
            .with_smoothing(InterpMode::Interpolating);
        for k in 0..8 {
            let t = k as f64;
            track
                .tc
                .add_timepoint(t, Keyframe::vector(t.sin(), 0.1 * t, 1.0))
                .expect("finite time");
        }
        scene.add_track(id, track).expect("object exists");
    }
    scene
}

fn set_time_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_set_time");
    for len in [16, 256] {
        let mut scene = mk_chain(len);
        let mut t = 0.0;
        group.bench_function(format!("chain_{len}"), |b| {
            b.iter(|| {
                t = (t + 0.01) % 7.0;
                black_box(scene.set_time(black_box(t)))
            })
        });
    }
    group.finish();
}

fn schedule_benchmark(c: &mut Criterion) {
    let scene = mk_chain(1024);
    c.bench_function("schedule_chain_1024", |b| b.iter(|| black_box(scene.schedule())));
}

criterion_group!(benches, set_time_benchmark, schedule_benchmark);
criterion_main!(benches);
