//! Pose tracks.
//!
//! A pose track does not touch the shape directly. It blends into the object's pending
//! pose, which the scene applies once every track has run, or queues a pose distortion
//! when the object already carries non-destructive shape edits.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{track_header, AnimationTrack, Track};
use crate::ids::ObjectId;
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{Distortion, ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "pose";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    /// Additive blending instead of replacing the pending pose.
    pub relative: bool,
    pub weight: WeightTrack,
    /// Extra tracks applied after the pose itself.
    #[serde(default)]
    pub subtracks: Vec<Track>,
}

impl Default for PoseTrack {
    fn default() -> Self {
        Self {
            name: "Pose".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            relative: false,
            weight: WeightTrack::default(),
            subtracks: Vec::new(),
        }
    }
}

impl PoseTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_subtrack(&mut self, track: impl Into<Track>) {
        self.subtracks.push(track.into());
    }
}

impl AnimationTrack for PoseTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty() && self.subtracks.iter().all(|t| t.is_null())
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        if let Some(pose) = self.tc.evaluate(time, self.smoothing) {
            let weight = self.weight.weight(time);
            if obj.is_distorted() {
                obj.add_distortion(Distortion::Pose {
                    weight,
                    pose,
                    relative: self.relative,
                });
            } else {
                obj.pose = Some(match obj.pose.take() {
                    None => pose,
                    Some(current) if self.relative => current.blend(&pose, 1.0, weight),
                    Some(current) => current.blend(&pose, 1.0 - weight, weight),
                });
            }
        }
        for track in &self.subtracks {
            track.apply(time, obj, view);
        }
    }

    fn dependencies(&self, owner: &ObjectState) -> Vec<ObjectId> {
        self.subtracks
            .iter()
            .filter(|t| t.is_enabled() && !t.is_null())
            .flat_map(|t| t.dependencies(owner))
            .collect()
    }

    fn delete_dependencies(&mut self, obj: ObjectId) {
        for t in &mut self.subtracks {
            t.delete_dependencies(obj);
        }
    }

    fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        for t in &mut self.subtracks {
            t.update_object_references(map);
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
        obj.pose_keyframe()
    }
}
