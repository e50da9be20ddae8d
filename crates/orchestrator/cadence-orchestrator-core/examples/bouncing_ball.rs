use cadence_animation_core::track::{AxisConstraint, TrackMode};
use cadence_animation_core::{
    ConstraintTrack, InterpMode, Keyframe, ObjectRef, ObjectState, Placement, PositionTrack,
};
use cadence_orchestrator::{Scene, SceneConfig};
use nalgebra::Vector3;
use serde_json::to_string_pretty;

fn main() -> anyhow::Result<()> {
    let mut scene = Scene::new(SceneConfig::default());

    // Ball bounces along x
    let ball = scene.add_object(ObjectState::new("ball"))?;
    let mut hops = PositionTrack::new("Hops").with_smoothing(InterpMode::Interpolating);
    for (t, x, y) in [(0.0, 0.0, 0.0), (0.5, 1.0, 2.0), (1.0, 2.0, 0.0), (1.5, 3.0, 1.0), (2.0, 4.0, 0.0)] {
        hops.tc.add_timepoint(t, Keyframe::vector(x, y, 0.0))?;
    }
    scene.add_track(ball, hops)?;

    // Shadow follows the ball but stays on the floor. The constraint is listed first so it
    // has the final word.
    let shadow = scene.add_object(ObjectState::new("shadow"))?;
    let mut floor = ConstraintTrack::new("Floor");
    floor.axes[1] = AxisConstraint::EqualTo;
    scene.add_track(shadow, floor)?;
    let mut follow = PositionTrack::new("Follow").with_placement(Placement::relative_to(
        TrackMode::Absolute,
        ObjectRef::object(ball),
    ));
    follow.tc.add_timepoint(0.0, Keyframe::vector(0.0, 0.0, 0.0))?;
    scene.add_track(shadow, follow)?;

    for frame in 0..=8 {
        let diag = scene.set_time(frame as f64 * 0.25);
        let b = scene.state(ball).map(|s| s.coords.origin).unwrap_or_else(Vector3::zeros);
        let s = scene.state(shadow).map(|s| s.coords.origin).unwrap_or_else(Vector3::zeros);
        println!(
            "t={:.2} ball=({:.2}, {:.2}) shadow=({:.2}, {:.2})",
            diag.time, b.x, b.y, s.x, s.y
        );
    }

    let records = scene.save_tracks(shadow)?;
    println!("Shadow tracks:\n{}", to_string_pretty(&records)?);
    Ok(())
}
