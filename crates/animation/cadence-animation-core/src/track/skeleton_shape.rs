//! Skeleton shape tracks.
//!
//! Keyframes are whole gestures, but only their skeletons are used: the evaluated skeleton
//! is queued as a distortion that pulls the object's skeleton toward it. With
//! `use_gestures` on, the surface of an actor is then refit from its gesture library.
//! Objects without an actor keep their surface.

use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{Distortion, ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "skeleton_shape";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletonShapeTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub use_gestures: bool,
    pub weight: WeightTrack,
}

impl Default for SkeletonShapeTrack {
    fn default() -> Self {
        Self {
            name: "Skeleton Shape".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            use_gestures: true,
            weight: WeightTrack::default(),
        }
    }
}

impl SkeletonShapeTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl AnimationTrack for SkeletonShapeTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, _view: &dyn SceneView) {
        let Some(Keyframe::Gesture(shape)) = self.tc.evaluate(time, self.smoothing) else {
            log::debug!("{}: timecourse does not hold gestures", self.name);
            return;
        };
        let weight = self.weight.weight(time);
        if weight > 0.0 {
            obj.add_distortion(Distortion::SkeletonShape {
                skeleton: shape.skeleton,
                weight,
                use_gestures: self.use_gestures,
            });
        }
    }

    fn weight_track(&self) -> Option<&WeightTrack> {
        Some(&self.weight)
    }

    fn weight_track_mut(&mut self) -> Option<&mut WeightTrack> {
        Some(&mut self.weight)
    }

    fn timecourse(&self) -> Option<&Timecourse> {
        Some(&self.tc)
    }

    fn timecourse_mut(&mut self) -> Option<&mut Timecourse> {
        Some(&mut self.tc)
    }

    fn smoothing_method(&self) -> InterpMode {
        self.smoothing
    }

    fn capture_keyframe(&self, obj: &ObjectState, _view: &dyn SceneView) -> Option<Keyframe> {
        obj.shape.clone().map(Keyframe::Gesture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::gesture::Gesture;
    use crate::ids::ObjectId;
    use crate::object::{IkRequest, IkSolver};
    use crate::skeleton::Skeleton;
    use hashbrown::HashMap;
    use nalgebra::Vector3;

    struct NoSolver;

    impl IkSolver for NoSolver {
        fn solve(&self, _: &mut Skeleton, _: &IkRequest) {}
    }

    fn mk_gesture(angle: f64, tip: f64) -> Gesture {
        let mut s = Skeleton::new();
        let root = s.add_joint("root", None, Vector3::zeros(), 1.0).expect("joint");
        if let Some(j) = s.joint_mut(root) {
            j.angle1 = angle;
        }
        Gesture::new(s, vec![Vector3::new(tip, 0.0, 0.0)])
    }

    #[test]
    fn actor_surface_follows_the_keyed_skeleton() {
        let mut actor = Actor::new(mk_gesture(0.0, 1.0));
        actor.add_gesture("raise", mk_gesture(40.0, 5.0)).expect("gesture");
        let mut obj = ObjectState::with_actor("arm", actor);
        let scene: HashMap<ObjectId, ObjectState> = HashMap::new();

        let mut track = SkeletonShapeTrack::new("Shape");
        track
            .tc
            .add_timepoint(0.0, Keyframe::Gesture(mk_gesture(40.0, 0.0)))
            .expect("add");
        track.weight = WeightTrack::constant(0.5);
        track.apply(0.0, &mut obj, &scene);
        assert_eq!(obj.distortions.len(), 1);

        let fits = obj.apply_distortions(&NoSolver);
        assert_eq!(fits.len(), 1);
        let shape = obj.shape.as_ref().expect("shape");
        assert!((shape.skeleton.joints()[0].angle1 - 20.0).abs() < 1e-12);
        assert!((shape.vertices[0].x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn capture_keys_the_current_shape() {
        let mut obj = ObjectState::new("arm");
        obj.shape = Some(mk_gesture(15.0, 2.0));
        let scene: HashMap<ObjectId, ObjectState> = HashMap::new();
        let mut track = SkeletonShapeTrack::new("Shape");
        assert_eq!(track.set_keyframe(1.0, &obj, &scene), Some(0));
        assert_eq!(
            track.tc.value(0),
            Some(&Keyframe::Gesture(mk_gesture(15.0, 2.0)))
        );
        assert_eq!(
            track.capture_keyframe(&ObjectState::new("empty"), &scene),
            None
        );
    }
}
