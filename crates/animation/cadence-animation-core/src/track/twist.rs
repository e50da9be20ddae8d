//! Twist tracks.

use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{key_current_value, track_header, AnimationTrack};
use crate::deform::{Axis, Deformation};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{Distortion, ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "twist";

/// Keyframed twist rate in degrees per unit of length along `axis`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwistTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub axis: Axis,
    pub forward: bool,
    #[serde(default)]
    pub world_space: bool,
    pub weight: WeightTrack,
}

impl Default for TwistTrack {
    fn default() -> Self {
        Self {
            name: "Twist".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            axis: Axis::Y,
            forward: true,
            world_space: false,
            weight: WeightTrack::default(),
        }
    }
}

impl TwistTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl AnimationTrack for TwistTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, _view: &dyn SceneView) {
        let angle = self.tc.evaluate(time, self.smoothing);
        let Some(angle) = angle.and_then(|k| k.as_scalar()) else {
            log::debug!("{}: timecourse does not hold scalars", self.name);
            return;
        };
        let w = self.weight.weight(time);
        if angle == 0.0 || w == 0.0 {
            return;
        }
        let frame = self.world_space.then(|| obj.coords.clone());
        obj.add_distortion(Distortion::Deform {
            deformation: Deformation::Twist {
                axis: self.axis,
                angle: angle * w,
                forward: self.forward,
            },
            frame,
        });
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

    fn set_keyframe(
        &mut self,
        time: f64,
        _obj: &ObjectState,
        _view: &dyn SceneView,
    ) -> Option<usize> {
        key_current_value(&self.name, &mut self.tc, self.smoothing, time, Keyframe::Scalar(0.0))
    }
}
