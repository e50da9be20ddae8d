//! Rotation tracks.
//!
//! Keyframes are XYZ Euler angles in degrees. Disabled axes are zeroed before the angles
//! become a quaternion, and blending uses partial rotations along the shortest arc.

use hashbrown::HashMap;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use super::frame::{CoordinateFrame, Placement, TrackMode};
use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::ObjectId;
use crate::interp::InterpMode;
use crate::keyframe::{Keyframe, RotationKeyframe};
use crate::math::{euler_degrees, partial_rotation};
use crate::object::{ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "rotation";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub placement: Placement,
    /// Captured keyframes blend through quaternions.
    #[serde(default)]
    pub use_quaternion: bool,
    pub weight: WeightTrack,
}

impl Default for RotationTrack {
    fn default() -> Self {
        Self {
            name: "Rotation".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            placement: Placement::default(),
            use_quaternion: false,
            weight: WeightTrack::default(),
        }
    }
}

impl RotationTrack {
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

    fn masked_quaternion(&self, key: &RotationKeyframe) -> UnitQuaternion<f64> {
        let axes = self.placement.axes;
        euler_degrees([
            if axes.x { key.x } else { 0.0 },
            if axes.y { key.y } else { 0.0 },
            if axes.z { key.z } else { 0.0 },
        ])
    }
}

impl AnimationTrack for RotationTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        let Some(Keyframe::Rotation(key)) = self.tc.evaluate(time, self.smoothing) else {
            log::debug!("{}: timecourse does not hold rotations", self.name);
            return;
        };
        let weight = self.weight.weight(time);
        let q_key = self.masked_quaternion(&key);
        let reference = self.placement.reference(obj, view);
        let current = obj.coords.orientation;
        let in_other_frame = matches!(
            self.placement.frame,
            CoordinateFrame::Parent | CoordinateFrame::Object
        );

        obj.coords.orientation = match self.placement.mode {
            TrackMode::Absolute => {
                let target = match reference {
                    Some(r) if in_other_frame => r.orientation * q_key,
                    _ => q_key,
                };
                partial_rotation(&target, weight) * partial_rotation(&current, 1.0 - weight)
            }
            TrackMode::Relative => match (self.placement.frame, reference) {
                (CoordinateFrame::Local, _) => current * partial_rotation(&q_key, weight),
                (_, Some(r)) if in_other_frame => {
                    let delta = r.orientation * q_key * r.orientation.inverse();
                    partial_rotation(&delta, weight) * current
                }
                _ => partial_rotation(&q_key, weight) * current,
            },
        };
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
        let q = match self.placement.reference(obj, view) {
            Some(r)
                if matches!(
                    self.placement.frame,
                    CoordinateFrame::Parent | CoordinateFrame::Object
                ) =>
            {
                r.orientation.inverse() * obj.coords.orientation
            }
            _ => obj.coords.orientation,
        };
        Some(Keyframe::Rotation(RotationKeyframe::from_quaternion(
            &q,
            self.use_quaternion,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::CoordinateSystem;
    use crate::object::ObjectRef;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn no_scene() -> HashMap<ObjectId, ObjectState> {
        HashMap::new()
    }

    fn mk_track(z_degrees: f64) -> RotationTrack {
        let mut t = RotationTrack::new("Rotation");
        t.tc
            .add_timepoint(0.0, Keyframe::Rotation(RotationKeyframe::new(0.0, 0.0, z_degrees)))
            .expect("add");
        t
    }

    #[test]
    fn absolute_half_weight_meets_halfway() {
        let mut track = mk_track(90.0);
        track.weight = WeightTrack::constant(0.5);
        let mut obj = ObjectState::new("cube");
        track.apply(0.0, &mut obj, &no_scene());
        approx(obj.coords.rotation_angles()[2], 45.0, 1e-9);
    }

    #[test]
    fn relative_accumulates() {
        let mut track = mk_track(30.0);
        track.placement.mode = TrackMode::Relative;
        let mut obj = ObjectState::new("cube");
        obj.coords.set_rotation_angles([0.0, 0.0, 30.0]);
        track.apply(0.0, &mut obj, &no_scene());
        approx(obj.coords.rotation_angles()[2], 60.0, 1e-9);
    }

    #[test]
    fn masked_axes_are_ignored() {
        let mut track = RotationTrack::new("Rotation");
        track
            .tc
            .add_timepoint(0.0, Keyframe::Rotation(RotationKeyframe::new(40.0, 0.0, 20.0)))
            .expect("add");
        track.placement.axes.x = false;
        let mut obj = ObjectState::new("cube");
        track.apply(0.0, &mut obj, &no_scene());
        let [x, _, z] = obj.coords.rotation_angles();
        approx(x, 0.0, 1e-9);
        approx(z, 20.0, 1e-9);
    }

    #[test]
    fn absolute_object_frame_composes_with_reference() {
        let mut reference = ObjectState::new("ref");
        reference.coords = CoordinateSystem::default();
        reference.coords.set_rotation_angles([0.0, 0.0, 10.0]);
        let mut scene = HashMap::new();
        scene.insert(ObjectId(3), reference);

        let track = mk_track(20.0).with_placement(Placement::relative_to(
            TrackMode::Absolute,
            ObjectRef::object(ObjectId(3)),
        ));
        let mut obj = ObjectState::new("cube");
        track.apply(0.0, &mut obj, &scene);
        approx(obj.coords.rotation_angles()[2], 30.0, 1e-9);

        let Some(Keyframe::Rotation(k)) = track.capture_keyframe(&obj, &scene) else {
            panic!("expected rotation keyframe");
        };
        approx(k.z, 20.0, 1e-9);
    }
}
