use cadence_animation_core::track::{AxisConstraint, IkConstraint};
use cadence_animation_core::{
    Actor, ActorKeyframe, AnimationTrack, BendTrack, ConstraintTrack, Gesture, GestureId,
    IkTrack, InterpMode, JointId, Keyframe, ObjectId, ObjectRef, ObjectState, ParamId,
    PoseTrack, PositionTrack, ProceduralPositionTrack, RotationKeyframe, RotationTrack,
    ScaleTrack, Skeleton, SkeletonShapeTrack, TextureParameter, TextureTrack, Track, TwistTrack,
    VisibilityTrack, WeightTrack,
};
use cadence_graph_core::Procedure;
use cadence_test_fixtures::procedures;
use hashbrown::HashMap;
use nalgebra::Vector3;

fn no_scene() -> HashMap<ObjectId, ObjectState> {
    HashMap::new()
}

fn mk_actor() -> Actor {
    let mut s = Skeleton::new();
    s.add_joint("root", None, Vector3::zeros(), 1.0).expect("joint");
    let rest = Gesture::new(s.clone(), vec![Vector3::new(1.0, 0.0, 0.0)]);
    let mut actor = Actor::new(rest);
    if let Some(j) = s.joints_mut().first_mut() {
        j.angle1 = 40.0;
    }
    actor
        .add_gesture("lift", Gesture::new(s, vec![Vector3::new(3.0, 0.0, 0.0)]))
        .expect("gesture");
    actor
}

fn mk_object() -> ObjectState {
    let mut obj = ObjectState::with_actor("puppet", mk_actor());
    obj.coords.origin = Vector3::new(1.0, 2.0, 3.0);
    obj.add_param(TextureParameter::new(ParamId(0), "gloss", 0.0, 1.0, 0.5));
    obj
}

fn every_track() -> Vec<Track> {
    let mut position = PositionTrack::new("Position");
    position
        .tc
        .add_timepoint(0.0, Keyframe::vector(9.0, 9.0, 9.0))
        .expect("add");

    let mut rotation = RotationTrack::new("Rotation");
    rotation
        .tc
        .add_timepoint(0.0, Keyframe::Rotation(RotationKeyframe::new(0.0, 90.0, 0.0)))
        .expect("add");

    let mut pose = PoseTrack::new("Pose");
    pose.tc
        .add_timepoint(0.0, Keyframe::Actor(ActorKeyframe::single(GestureId(1), 1.0)))
        .expect("add");

    let mut texture = TextureTrack::new("Texture", vec![ParamId(0)]);
    texture
        .tc
        .add_timepoint(0.0, Keyframe::Array(vec![0.9]))
        .expect("add");

    let mut visibility = VisibilityTrack::new("Visibility");
    visibility
        .tc
        .add_timepoint(0.0, Keyframe::Bool(false))
        .expect("add");

    let mut constraint = ConstraintTrack::new("Floor");
    constraint.axes[1] = AxisConstraint::GreaterThan;
    constraint.pos.y = 10.0;

    let mut ik = IkTrack::new("Reach");
    ik.constraints = vec![IkConstraint::following(
        JointId(0),
        ObjectRef::object(ObjectId(5)),
    )];

    let drift: Procedure = procedures::load("drift").expect("drift fixture");

    let mut scale = ScaleTrack::new("Scale");
    scale
        .tc
        .add_timepoint(0.0, Keyframe::vector(2.0, 1.0, 1.0))
        .expect("add");

    let mut bend = BendTrack::new("Bend");
    bend.tc.add_timepoint(0.0, Keyframe::Scalar(45.0)).expect("add");

    let mut twist = TwistTrack::new("Twist");
    twist.tc.add_timepoint(0.0, Keyframe::Scalar(30.0)).expect("add");

    let mut shape = SkeletonShapeTrack::new("Skeleton Shape");
    let lifted = mk_actor().gesture(1).cloned().expect("lift gesture");
    shape
        .tc
        .add_timepoint(0.0, Keyframe::Gesture(lifted))
        .expect("add");

    vec![
        position.into(),
        rotation.into(),
        pose.into(),
        texture.into(),
        visibility.into(),
        constraint.into(),
        ik.into(),
        ProceduralPositionTrack::new("Drift", drift).into(),
        scale.into(),
        bend.into(),
        twist.into(),
        shape.into(),
    ]
}

#[test]
fn disabled_tracks_leave_the_object_untouched() {
    let scene = no_scene();
    for mut track in every_track() {
        track.set_enabled(false);
        let mut obj = mk_object();
        let before = obj.clone();
        track.apply(1.0, &mut obj, &scene);
        assert_eq!(obj, before, "{} changed a disabled object", track.tag());
    }
}

#[test]
fn enabled_tracks_all_leave_a_mark() {
    let scene = no_scene();
    for track in every_track() {
        let mut obj = mk_object();
        let before = obj.clone();
        track.apply(1.0, &mut obj, &scene);
        assert_ne!(obj, before, "{} had no effect", track.tag());
    }
}

#[test]
fn linear_position_track_moves_halfway() {
    let mut track = PositionTrack::new("Slide").with_smoothing(InterpMode::Linear);
    track
        .tc
        .add_timepoint(0.0, Keyframe::vector(0.0, 0.0, 0.0))
        .expect("add");
    track
        .tc
        .add_timepoint(1.0, Keyframe::vector(10.0, 0.0, 0.0))
        .expect("add");
    let mut obj = ObjectState::new("cube");
    track.apply(0.5, &mut obj, &no_scene());
    assert_eq!(obj.coords.origin, Vector3::new(5.0, 0.0, 0.0));
}

#[test]
fn pose_track_blends_into_the_pending_pose() {
    let mut full = PoseTrack::new("Lift");
    full.tc
        .add_timepoint(0.0, Keyframe::Actor(ActorKeyframe::single(GestureId(1), 1.0)))
        .expect("add");
    let mut half = full.clone();
    half.tc.remove_all_timepoints();
    half.tc
        .add_timepoint(0.0, Keyframe::Actor(ActorKeyframe::single(GestureId(0), 1.0)))
        .expect("add");
    half.weight = WeightTrack::constant(0.5);

    let mut obj = mk_object();
    full.apply(0.0, &mut obj, &no_scene());
    half.apply(0.0, &mut obj, &no_scene());
    obj.commit_pose();

    let shape = obj.shape.as_ref().expect("shape");
    assert!((shape.skeleton.joints()[0].angle1 - 20.0).abs() < 1e-12);
    assert!((shape.vertices[0].x - 2.0).abs() < 1e-12);
    assert!(obj.pose.is_none());
}

#[test]
fn keyframe_capture_skips_unchanged_values() {
    let mut track = TextureTrack::new("Texture", vec![ParamId(0)]);
    let obj = mk_object();
    let scene = no_scene();
    assert_eq!(track.set_keyframe_if_modified(0.0, &obj, &scene, 1e-10), Some(0));
    assert_eq!(track.set_keyframe_if_modified(0.0, &obj, &scene, 1e-10), None);
    assert_eq!(track.tc.value(0), Some(&Keyframe::Array(vec![0.5])));
}
