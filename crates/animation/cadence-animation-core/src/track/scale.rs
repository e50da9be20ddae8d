//! Scale tracks.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{key_current_value, track_header, AnimationTrack};
use crate::deform::Deformation;
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{Distortion, ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "scale";

/// Keyframed per-axis scale factors, queued as a surface deformation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    /// Scale about the world origin and axes instead of the object's own.
    #[serde(default)]
    pub world_space: bool,
    pub weight: WeightTrack,
}

impl Default for ScaleTrack {
    fn default() -> Self {
        Self {
            name: "Scale".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            world_space: false,
            weight: WeightTrack::default(),
        }
    }
}

impl ScaleTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl AnimationTrack for ScaleTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, _view: &dyn SceneView) {
        let Some(Keyframe::Vector(scale)) = self.tc.evaluate(time, self.smoothing) else {
            log::debug!("{}: timecourse does not hold vectors", self.name);
            return;
        };
        if scale == Vector3::repeat(1.0) {
            return;
        }
        let w = self.weight.weight(time);
        let factors = scale.map(|s| s * w + (1.0 - w));
        let frame = self.world_space.then(|| obj.coords.clone());
        obj.add_distortion(Distortion::Deform {
            deformation: Deformation::Scale { factors },
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

    /// Key the value the track already produces at `time`; unit scale on an empty track.
    fn set_keyframe(
        &mut self,
        time: f64,
        _obj: &ObjectState,
        _view: &dyn SceneView,
    ) -> Option<usize> {
        let unit = Keyframe::vector(1.0, 1.0, 1.0);
        key_current_value(&self.name, &mut self.tc, self.smoothing, time, unit)
    }
}
