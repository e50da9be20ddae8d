//! Visibility tracks.

use serde::{Deserialize, Serialize};

use super::{track_header, AnimationTrack};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "visibility";

/// Boolean keyframes, always evaluated linearly (the nearer sample wins). No weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibilityTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
}

impl Default for VisibilityTrack {
    fn default() -> Self {
        Self {
            name: "Visibility".to_string(),
            enabled: true,
            tc: Timecourse::new(),
        }
    }
}

impl VisibilityTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl AnimationTrack for VisibilityTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, _view: &dyn SceneView) {
        if let Some(Keyframe::Bool(visible)) = self.tc.evaluate(time, InterpMode::Linear) {
            obj.visible = visible;
        }
    }

    fn timecourse(&self) -> Option<&Timecourse> {
        Some(&self.tc)
    }

    fn timecourse_mut(&mut self) -> Option<&mut Timecourse> {
        Some(&mut self.tc)
    }

    fn smoothing_method(&self) -> InterpMode {
        InterpMode::Linear
    }

    fn capture_keyframe(&self, obj: &ObjectState, _view: &dyn SceneView) -> Option<Keyframe> {
        Some(Keyframe::Bool(obj.visible))
    }
}
