//! Position tracks.

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::frame::{CoordinateFrame, Placement};
use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::{JointId, ObjectId};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "position";

/// Keyframed origin of an object, or of one of its joints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub placement: Placement,
    /// When set in absolute mode, the keyframes place this joint instead of the origin.
    #[serde(default)]
    pub joint: Option<JointId>,
    pub weight: WeightTrack,
}

impl Default for PositionTrack {
    fn default() -> Self {
        Self {
            name: "Position".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            placement: Placement::default(),
            joint: None,
            weight: WeightTrack::default(),
        }
    }
}

impl PositionTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_smoothing(mut self, smoothing: InterpMode) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// World position this track keys: the joint's when configured, otherwise the origin.
    fn keyed_point(&self, obj: &ObjectState) -> Vector3<f64> {
        match self.joint {
            Some(j) if self.placement.is_absolute() => obj
                .joint_world_origin(j)
                .unwrap_or(obj.coords.origin),
            _ => obj.coords.origin,
        }
    }
}

impl AnimationTrack for PositionTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        let Some(Keyframe::Vector(value)) = self.tc.evaluate(time, self.smoothing) else {
            log::debug!("{}: timecourse does not hold vectors", self.name);
            return;
        };
        let weight = self.weight.weight(time);
        let mut pos = self.placement.to_world(value, obj, view);

        if let (Some(j), true) = (self.joint, self.placement.is_absolute()) {
            obj.flush_pose();
            if let Some(joint_world) = obj.joint_world_origin(j) {
                pos += obj.coords.origin - joint_world;
            }
        }

        let axes = self.placement.axes;
        let origin = &mut obj.coords.origin;
        for axis in 0..3 {
            if !axes.enabled(axis) {
                continue;
            }
            if self.placement.is_absolute() {
                origin[axis] *= 1.0 - weight;
            }
            origin[axis] += pos[axis] * weight;
        }
    }

    fn dependencies(&self, owner: &ObjectState) -> Vec<ObjectId> {
        self.placement.dependency(owner).into_iter().collect()
    }

    fn delete_dependencies(&mut self, obj: ObjectId) {
        self.placement.delete_dependencies(obj);
    }

    fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        self.placement.update_object_references(map);
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

    fn capture_keyframe(&self, obj: &ObjectState, view: &dyn SceneView) -> Option<Keyframe> {
        let p = self.keyed_point(obj);
        let local = match (self.placement.frame, self.placement.reference(obj, view)) {
            (CoordinateFrame::Parent | CoordinateFrame::Object, Some(r)) => r.to_local_point(&p),
            _ => p,
        };
        Some(Keyframe::Vector(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Gesture;
    use crate::math::CoordinateSystem;
    use crate::skeleton::Skeleton;
    use crate::track::frame::{AxisMask, TrackMode};
    use approx::assert_relative_eq;

    fn mk_track(samples: &[(f64, [f64; 3])]) -> PositionTrack {
        let mut t = PositionTrack::new("Position").with_smoothing(InterpMode::Linear);
        for &(time, [x, y, z]) in samples {
            t.tc.add_timepoint(time, Keyframe::vector(x, y, z)).expect("add");
        }
        t
    }

    fn no_scene() -> HashMap<ObjectId, ObjectState> {
        HashMap::new()
    }

    #[test]
    fn absolute_world_halfway() {
        let track = mk_track(&[(0.0, [0.0, 0.0, 0.0]), (1.0, [10.0, 0.0, 0.0])]);
        let mut obj = ObjectState::new("cube");
        track.apply(0.5, &mut obj, &no_scene());
        assert_relative_eq!(obj.coords.origin, Vector3::new(5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn half_weight_blends_with_current_origin() {
        let mut track = mk_track(&[(0.0, [10.0, 10.0, 10.0])]);
        track.weight = WeightTrack::constant(0.5);
        track.placement.axes = AxisMask {
            x: true,
            y: false,
            z: true,
        };
        let mut obj = ObjectState::new("cube");
        obj.coords = CoordinateSystem::at(Vector3::new(2.0, 2.0, 2.0));
        track.apply(0.0, &mut obj, &no_scene());
        assert_relative_eq!(obj.coords.origin, Vector3::new(6.0, 2.0, 6.0), epsilon = 1e-12);
    }

    #[test]
    fn relative_adds_offset() {
        let mut track = mk_track(&[(0.0, [1.0, 0.0, 0.0])]);
        track.placement.mode = TrackMode::Relative;
        let mut obj = ObjectState::new("cube");
        obj.coords = CoordinateSystem::at(Vector3::new(2.0, 2.0, 2.0));
        track.apply(0.0, &mut obj, &no_scene());
        assert_relative_eq!(obj.coords.origin, Vector3::new(3.0, 2.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn joint_lands_on_target() {
        let mut track = mk_track(&[(0.0, [5.0, 5.0, 0.0])]);
        let mut skeleton = Skeleton::new();
        let j = skeleton.add_joint("hand", None, Vector3::new(0.0, 1.0, 0.0), 1.0).expect("joint");
        track.joint = Some(j);
        let mut obj = ObjectState::new("arm");
        obj.shape = Some(Gesture::new(skeleton, vec![]));
        track.apply(0.0, &mut obj, &no_scene());
        assert_relative_eq!(obj.coords.origin, Vector3::new(5.0, 4.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(
            obj.joint_world_origin(j).expect("joint"),
            Vector3::new(5.0, 5.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn capture_round_trips_through_parent_frame() {
        let mut parent = ObjectState::new("parent");
        parent.coords = CoordinateSystem::at(Vector3::new(1.0, 1.0, 1.0));
        let mut scene = HashMap::new();
        scene.insert(ObjectId(0), parent);

        let mut track = PositionTrack::new("Position");
        track.placement.frame = CoordinateFrame::Parent;
        let mut obj = ObjectState::new("child");
        obj.parent = Some(ObjectId(0));
        obj.coords.origin = Vector3::new(3.0, 1.0, 1.0);

        assert_eq!(track.set_keyframe(0.0, &obj, &scene), Some(0));
        assert_eq!(track.tc.value(0), Some(&Keyframe::vector(2.0, 0.0, 0.0)));
        assert_eq!(track.dependencies(&obj), vec![ObjectId(0)]);
        assert_eq!(track.set_keyframe_if_modified(0.0, &obj, &scene, 1e-10), None);
    }
}
