//! Procedural-position tracks: a procedure graph computes the position each frame.

use cadence_graph_core::{Procedure, ProcedureInputs};
use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::frame::Placement;
use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::{JointId, ObjectId};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "procedural_position";

/// Position produced by a procedure of the current origin, the time and keyframed
/// scalar parameters. Keyframes are arrays with one value per procedure parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProceduralPositionTrack {
    pub name: String,
    pub enabled: bool,
    pub procedure: Procedure,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub placement: Placement,
    #[serde(default)]
    pub joint: Option<JointId>,
    pub weight: WeightTrack,
}

impl Default for ProceduralPositionTrack {
    fn default() -> Self {
        Self {
            name: "Procedural Position".to_string(),
            enabled: true,
            procedure: Procedure::default(),
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            placement: Placement::default(),
            joint: None,
            weight: WeightTrack::default(),
        }
    }
}

impl ProceduralPositionTrack {
    pub fn new(name: impl Into<String>, procedure: Procedure) -> Self {
        Self {
            name: name.into(),
            procedure,
            ..Default::default()
        }
    }

    /// Parameter values at `time`: keyframed when available, declared defaults otherwise.
    pub fn params_at(&self, time: f64) -> Vec<f64> {
        match self.tc.evaluate(time, self.smoothing) {
            Some(Keyframe::Array(values)) => values,
            _ => self.procedure.default_params(),
        }
    }
}

impl AnimationTrack for ProceduralPositionTrack {
    track_header!();

    /// Always contributes, even without keyframes.
    fn is_null(&self) -> bool {
        false
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        let mut joint_delta = Vector3::zeros();
        if let (Some(j), true) = (self.joint, self.placement.is_absolute()) {
            obj.flush_pose();
            if let Some(joint_world) = obj.joint_world_origin(j) {
                joint_delta = joint_world - obj.coords.origin;
            }
        }

        let input = obj.coords.origin + joint_delta;
        let params = self.params_at(time);
        let out = match self.procedure.evaluate(&ProcedureInputs {
            position: [input.x, input.y, input.z],
            time,
            params: &params,
        }) {
            Ok(out) => out,
            Err(err) => {
                log::warn!("{}: procedure failed: {}", self.name, err);
                return;
            }
        };

        let weight = self.weight.weight(time);
        let pos = self
            .placement
            .to_world(Vector3::new(out[0], out[1], out[2]), obj, view)
            - joint_delta;
        let origin = &mut obj.coords.origin;
        if self.placement.is_absolute() {
            *origin *= 1.0 - weight;
        }
        *origin += pos * weight;
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

    fn capture_keyframe(&self, _obj: &ObjectState, _view: &dyn SceneView) -> Option<Keyframe> {
        Some(Keyframe::Array(self.procedure.default_params()))
    }
}
