use cadence_animation_core::{
    ActorKeyframe, Gesture, GestureId, Keyframe, RotationKeyframe, Skeleton,
};
use nalgebra::Vector3;

fn mk_gesture(angle: f64, tip: f64) -> Gesture {
    let mut s = Skeleton::new();
    let root = s.add_joint("root", None, Vector3::zeros(), 1.0).expect("joint");
    if let Some(j) = s.joint_mut(root) {
        j.angle1 = angle;
    }
    Gesture::new(s, vec![Vector3::new(tip, 0.0, 0.0)])
}

fn samples() -> Vec<Keyframe> {
    vec![
        Keyframe::Null,
        Keyframe::Scalar(3.25),
        Keyframe::vector(1.0, -2.0, 0.5),
        Keyframe::Rotation(RotationKeyframe::new(30.0, 20.0, 10.0)),
        Keyframe::Rotation(RotationKeyframe {
            use_quaternion: true,
            ..RotationKeyframe::new(15.0, -10.0, 5.0)
        }),
        Keyframe::Bool(true),
        Keyframe::Array(vec![0.25, 4.0, -1.0]),
        Keyframe::Gesture(mk_gesture(12.0, 2.0)),
        Keyframe::Actor(ActorKeyframe {
            entries: vec![(GestureId(0), 1.0), (GestureId(3), 0.4)],
        }),
    ]
}

#[test]
fn blending_a_value_with_itself_is_identity() {
    for k in samples() {
        for w in [0.0, 0.3, 0.5, 1.0] {
            let out = k.blend(&k, w, 1.0 - w);
            assert!(out.approx_eq(&k, 1e-9), "{k:?} at w={w} gave {out:?}");
        }
    }
}

#[test]
fn mixed_kinds_keep_the_first_operand() {
    let a = Keyframe::Scalar(1.0);
    let b = Keyframe::vector(1.0, 1.0, 1.0);
    assert_eq!(a.blend(&b, 0.5, 0.5), a);
    assert_eq!(b.blend3(&a, &b, 0.2, 0.3, 0.5), b);

    let short = Keyframe::Array(vec![1.0]);
    let long = Keyframe::Array(vec![1.0, 2.0]);
    assert_eq!(short.blend(&long, 0.5, 0.5), short);
}

#[test]
fn weights_are_not_normalized() {
    let a = Keyframe::Scalar(2.0);
    let b = Keyframe::Scalar(4.0);
    assert_eq!(a.blend(&b, 1.0, 1.0), Keyframe::Scalar(6.0));
    assert_eq!(
        a.blend4(&b, &a, &b, 0.5, 0.5, 0.5, 0.5),
        Keyframe::Scalar(6.0)
    );
}

#[test]
fn actor_poses_merge_by_gesture() {
    let a = Keyframe::Actor(ActorKeyframe::single(GestureId(1), 1.0));
    let b = Keyframe::Actor(ActorKeyframe::single(GestureId(2), 1.0));
    let Keyframe::Actor(mixed) = a.blend(&b, 0.25, 0.75) else {
        panic!("expected an actor keyframe");
    };
    assert_eq!(mixed.weight_of(GestureId(1)), 0.25);
    assert_eq!(mixed.weight_of(GestureId(2)), 0.75);

    let Keyframe::Actor(cancelled) = a.blend(&a, 1.0, -1.0) else {
        panic!("expected an actor keyframe");
    };
    assert!(cancelled.entries.is_empty());
}

#[test]
fn gestures_with_different_skeletons_do_not_blend() {
    let one = Keyframe::Gesture(mk_gesture(0.0, 1.0));
    let mut bigger = mk_gesture(0.0, 1.0);
    bigger.skeleton.add_joint("extra", None, Vector3::zeros(), 1.0).expect("joint");
    let two = Keyframe::Gesture(bigger);
    assert_eq!(one.blend(&two, 0.5, 0.5), one);
}
