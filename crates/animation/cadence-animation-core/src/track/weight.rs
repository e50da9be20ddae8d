//! Weight sub-tracks.

use serde::{Deserialize, Serialize};

use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::smoothness::Smoothness;
use crate::timecourse::Timecourse;

pub const WEIGHT_TRACK_NAME: &str = "Weight";

/// Scalar child of a weighted track scaling how strongly its parent is blended in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightTrack {
    pub name: String,
    pub enabled: bool,
    pub tc: Timecourse,
    pub smoothing: InterpMode,
}

impl Default for WeightTrack {
    fn default() -> Self {
        Self {
            name: WEIGHT_TRACK_NAME.to_string(),
            enabled: true,
            tc: Timecourse::new(),
            smoothing: InterpMode::Interpolating,
        }
    }
}

impl WeightTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A weight track holding `w` at all times.
    pub fn constant(w: f64) -> Self {
        let mut track = Self::default();
        // Time 0 is finite; insertion cannot fail.
        let _ = track
            .tc
            .add_timepoint_with(0.0, Keyframe::Scalar(w), Smoothness::default());
        track
    }

    /// Weight at `time`, in `[0, 1]`. Disabled or empty tracks weigh 1.
    pub fn weight(&self, time: f64) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        match self.tc.evaluate(time, self.smoothing) {
            Some(Keyframe::Scalar(w)) => w.clamp(0.0, 1.0),
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_or_disabled_weighs_one() {
        let mut w = WeightTrack::constant(0.25);
        assert_eq!(w.weight(3.0), 0.25);
        w.enabled = false;
        assert_eq!(w.weight(3.0), 1.0);
        assert_eq!(WeightTrack::new().weight(0.0), 1.0);
    }

    #[test]
    fn weight_is_clamped() {
        let mut w = WeightTrack::new();
        w.tc.add_timepoint(0.0, Keyframe::Scalar(-1.0)).expect("add");
        w.tc.add_timepoint(1.0, Keyframe::Scalar(3.0)).expect("add");
        assert_eq!(w.weight(0.0), 0.0);
        assert_eq!(w.weight(1.0), 1.0);
        assert_eq!(w.name, "Weight");
    }
}
