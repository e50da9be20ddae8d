//! Bend tracks.

use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{key_current_value, track_header, AnimationTrack};
use crate::deform::{Axis, Deformation};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{Distortion, ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub const TAG: &str = "bend";

/// Keyframed bend angle in degrees. The surface curves along `axis` toward `direction`,
/// pinned at its low end (or its high end when `forward` is off).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BendTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub axis: Axis,
    pub direction: Axis,
    pub forward: bool,
    #[serde(default)]
    pub world_space: bool,
    pub weight: WeightTrack,
}

impl Default for BendTrack {
    fn default() -> Self {
        Self {
            name: "Bend".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            axis: Axis::X,
            direction: Axis::Y,
            forward: true,
            world_space: false,
            weight: WeightTrack::default(),
        }
    }
}

impl BendTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_axes(mut self, axis: Axis, direction: Axis) -> Self {
        self.axis = axis;
        self.direction = direction;
        self
    }
}

impl AnimationTrack for BendTrack {
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
            deformation: Deformation::Bend {
                axis: self.axis,
                direction: self.direction,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Gesture;
    use crate::ids::ObjectId;
    use crate::skeleton::Skeleton;
    use hashbrown::HashMap;
    use nalgebra::Vector3;

    #[test]
    fn weighted_bend_scales_the_angle() {
        let mut track = BendTrack::new("Bend").with_axes(Axis::Y, Axis::Z);
        track.tc.add_timepoint(0.0, Keyframe::Scalar(80.0)).expect("add");
        track.weight = WeightTrack::constant(0.25);
        let scene: HashMap<ObjectId, ObjectState> = HashMap::new();
        let mut obj = ObjectState::new("stalk");
        obj.shape = Some(Gesture::new(
            Skeleton::new(),
            vec![Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0)],
        ));

        track.apply(0.0, &mut obj, &scene);
        assert_eq!(
            obj.distortions,
            vec![Distortion::Deform {
                deformation: Deformation::Bend {
                    axis: Axis::Y,
                    direction: Axis::Z,
                    angle: 20.0,
                    forward: true,
                },
                frame: None,
            }]
        );

        track.weight = WeightTrack::constant(0.0);
        obj.clear_distortions();
        track.apply(0.0, &mut obj, &scene);
        assert!(!obj.is_distorted());
    }
}
