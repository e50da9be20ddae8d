//! Texture-parameter tracks.

use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::ParamId;
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{ObjectState, ParamValue, SceneView, TextureParameter};
use crate::timecourse::Timecourse;

pub const TAG: &str = "texture";

/// Keyframed values for a chosen subset of an object's texture parameters.
///
/// Keyframes are arrays with one entry per tracked parameter, in `params` order.
/// Parameters are tracked by id so they survive reordering on the object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
    pub params: Vec<ParamId>,
    pub weight: WeightTrack,
}

impl Default for TextureTrack {
    fn default() -> Self {
        Self {
            name: "Texture".to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
            params: Vec::new(),
            weight: WeightTrack::default(),
        }
    }
}

impl TextureTrack {
    pub fn new(name: impl Into<String>, params: Vec<ParamId>) -> Self {
        Self {
            name: name.into(),
            params,
            ..Default::default()
        }
    }

    /// The object's parameter list changed: stop tracking parameters that are gone and
    /// drop their column from every keyframe.
    pub fn parameters_changed(&mut self, current: &[TextureParameter]) {
        let keep: Vec<usize> = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, id)| current.iter().any(|p| p.id == **id))
            .map(|(k, _)| k)
            .collect();
        if keep.len() == self.params.len() {
            return;
        }
        self.params = keep.iter().map(|&k| self.params[k]).collect();
        for value in self.tc.values_mut() {
            if let Keyframe::Array(vals) = value {
                *vals = keep
                    .iter()
                    .map(|&k| vals.get(k).copied().unwrap_or(0.0))
                    .collect();
            }
        }
    }
}

impl AnimationTrack for TextureTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.tc.is_empty()
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, _view: &dyn SceneView) {
        let Some(Keyframe::Array(values)) = self.tc.evaluate(time, self.smoothing) else {
            log::debug!("{}: timecourse does not hold arrays", self.name);
            return;
        };
        let weight = self.weight.weight(time);
        for (id, v) in self.params.iter().zip(values) {
            let Some(idx) = obj.param_index(*id) else {
                continue;
            };
            let blended = if weight == 1.0 {
                v
            } else {
                let current = obj.param_values.get(idx).map_or(0.0, ParamValue::average);
                (1.0 - weight) * current + weight * v
            };
            let clamped = obj.params[idx].clamp(blended);
            if let Some(slot) = obj.param_values.get_mut(idx) {
                *slot = ParamValue::Uniform(clamped);
            }
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
        let values = self
            .params
            .iter()
            .map(|id| {
                obj.param_index(*id)
                    .and_then(|i| obj.param_values.get(i))
                    .map_or(0.0, ParamValue::average)
            })
            .collect();
        Some(Keyframe::Array(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ObjectId;
    use hashbrown::HashMap;

    fn mk_object() -> ObjectState {
        let mut obj = ObjectState::new("sphere");
        obj.add_param(TextureParameter::new(ParamId(0), "roughness", 0.0, 1.0, 0.5));
        obj.add_param(TextureParameter::new(ParamId(1), "bump", -1.0, 1.0, 0.0));
        obj
    }

    fn mk_track() -> TextureTrack {
        let mut track = TextureTrack::new("Texture", vec![ParamId(0), ParamId(1)]);
        track
            .tc
            .add_timepoint(0.0, Keyframe::Array(vec![2.0, 0.5]))
            .expect("add");
        track
    }

    #[test]
    fn values_are_clamped() {
        let mut obj = mk_object();
        mk_track().apply(0.0, &mut obj, &HashMap::<ObjectId, ObjectState>::new());
        assert_eq!(obj.param_values[0], ParamValue::Uniform(1.0));
        assert_eq!(obj.param_values[1], ParamValue::Uniform(0.5));
    }

    #[test]
    fn partial_weight_blends_with_average() {
        let mut obj = mk_object();
        obj.param_values[1] = ParamValue::PerVertex(vec![0.0, 1.0]);
        let mut track = mk_track();
        track.weight = WeightTrack::constant(0.5);
        track.apply(0.0, &mut obj, &HashMap::<ObjectId, ObjectState>::new());
        assert_eq!(obj.param_values[1], ParamValue::Uniform(0.5));
    }

    #[test]
    fn removed_parameters_are_compacted() {
        let mut track = mk_track();
        let remaining = vec![TextureParameter::new(ParamId(1), "bump", -1.0, 1.0, 0.0)];
        track.parameters_changed(&remaining);
        assert_eq!(track.params, vec![ParamId(1)]);
        assert_eq!(track.tc.value(0), Some(&Keyframe::Array(vec![0.5])));
    }
}
