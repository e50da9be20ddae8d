//! Tracks: time-varying control channels attached to one scene object.
//!
//! Every variant implements [`AnimationTrack`]. The closed [`Track`] enum is what objects
//! own and what persistence stores; it delegates each call to its variant.
//!
//! Tracks write into the owner's current state rather than resetting it, so several tracks
//! on one object compose. A disabled or null track is never asked to contribute.

pub mod bend;
pub mod constraint;
pub mod frame;
pub mod ik;
pub mod pose;
pub mod position;
pub mod procedural;
pub mod rotation;
pub mod scale;
pub mod skeleton_shape;
pub mod texture;
pub mod twist;
pub mod visibility;
pub mod weight;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::object::{ObjectState, SceneView};
use crate::timecourse::Timecourse;

pub use bend::BendTrack;
pub use constraint::{AxisConstraint, ConstraintTrack, OrientationAxis, OrientationMode};
pub use frame::{AxisMask, CoordinateFrame, Placement, TrackMode};
pub use ik::{IkConstraint, IkTrack};
pub use pose::PoseTrack;
pub use position::PositionTrack;
pub use procedural::ProceduralPositionTrack;
pub use rotation::RotationTrack;
pub use scale::ScaleTrack;
pub use skeleton_shape::SkeletonShapeTrack;
pub use texture::TextureTrack;
pub use twist::TwistTrack;
pub use visibility::VisibilityTrack;
pub use weight::WeightTrack;

/// Behaviour shared by every track variant.
pub trait AnimationTrack {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the track has nothing to contribute (no samples, no active constraints).
    fn is_null(&self) -> bool;

    /// Write this track's effect at `time` into `obj`. Only called on enabled, non-null tracks.
    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView);

    /// Apply at `time`. Disabled and null tracks leave `obj` untouched.
    fn apply(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        if self.is_enabled() && !self.is_null() {
            self.contribute(time, obj, view);
        }
    }

    /// Objects that must be fully evaluated before this track applies to `owner`.
    fn dependencies(&self, _owner: &ObjectState) -> Vec<ObjectId> {
        Vec::new()
    }

    /// Forget every reference to `obj`, which is being removed from the scene.
    fn delete_dependencies(&mut self, _obj: ObjectId) {}

    /// Re-point references at duplicated objects. Joint ids are kept.
    fn update_object_references(&mut self, _map: &HashMap<ObjectId, ObjectId>) {}

    fn weight_track(&self) -> Option<&WeightTrack> {
        None
    }

    fn weight_track_mut(&mut self) -> Option<&mut WeightTrack> {
        None
    }

    fn timecourse(&self) -> Option<&Timecourse> {
        None
    }

    fn timecourse_mut(&mut self) -> Option<&mut Timecourse> {
        None
    }

    fn smoothing_method(&self) -> InterpMode {
        InterpMode::Interpolating
    }

    /// The keyframe describing `obj` as this track would reproduce it.
    fn capture_keyframe(&self, _obj: &ObjectState, _view: &dyn SceneView) -> Option<Keyframe> {
        None
    }

    /// Capture `obj` into the timecourse at `time`. Returns the sample index.
    fn set_keyframe(&mut self, time: f64, obj: &ObjectState, view: &dyn SceneView) -> Option<usize> {
        let value = self.capture_keyframe(obj, view)?;
        let added = self.timecourse_mut()?.add_timepoint(time, value);
        match added {
            Ok(idx) => Some(idx),
            Err(err) => {
                log::warn!("{}: cannot set keyframe: {}", self.name(), err);
                None
            }
        }
    }

    /// Like [`set_keyframe`](Self::set_keyframe), but only when the captured value differs
    /// from what the track already produces at `time` by more than `tolerance`.
    fn set_keyframe_if_modified(
        &mut self,
        time: f64,
        obj: &ObjectState,
        view: &dyn SceneView,
        tolerance: f64,
    ) -> Option<usize> {
        let captured = self.capture_keyframe(obj, view)?;
        let current = self
            .timecourse()?
            .evaluate(time, self.smoothing_method());
        if current.is_some_and(|c| c.approx_eq(&captured, tolerance)) {
            return None;
        }
        self.set_keyframe(time, obj, view)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Track {
    Position(PositionTrack),
    Rotation(RotationTrack),
    Pose(PoseTrack),
    Texture(TextureTrack),
    Visibility(VisibilityTrack),
    Constraint(ConstraintTrack),
    Ik(IkTrack),
    ProceduralPosition(ProceduralPositionTrack),
    Scale(ScaleTrack),
    Bend(BendTrack),
    Twist(TwistTrack),
    SkeletonShape(SkeletonShapeTrack),
}

macro_rules! each_track {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            Track::Position($t) => $body,
            Track::Rotation($t) => $body,
            Track::Pose($t) => $body,
            Track::Texture($t) => $body,
            Track::Visibility($t) => $body,
            Track::Constraint($t) => $body,
            Track::Ik($t) => $body,
            Track::ProceduralPosition($t) => $body,
            Track::Scale($t) => $body,
            Track::Bend($t) => $body,
            Track::Twist($t) => $body,
            Track::SkeletonShape($t) => $body,
        }
    };
}

impl Track {
    /// Stable tag used by persistence records.
    pub fn tag(&self) -> &'static str {
        match self {
            Track::Position(_) => position::TAG,
            Track::Rotation(_) => rotation::TAG,
            Track::Pose(_) => pose::TAG,
            Track::Texture(_) => texture::TAG,
            Track::Visibility(_) => visibility::TAG,
            Track::Constraint(_) => constraint::TAG,
            Track::Ik(_) => ik::TAG,
            Track::ProceduralPosition(_) => procedural::TAG,
            Track::Scale(_) => scale::TAG,
            Track::Bend(_) => bend::TAG,
            Track::Twist(_) => twist::TAG,
            Track::SkeletonShape(_) => skeleton_shape::TAG,
        }
    }

    /// Whether applying this track moves the object's origin.
    pub fn writes_origin(&self) -> bool {
        matches!(self, Track::Position(_) | Track::ProceduralPosition(_))
    }

    pub fn writes_orientation(&self) -> bool {
        matches!(self, Track::Rotation(_))
    }

    /// Tracks that settle an object after an interactive edit rather than animate it.
    pub fn is_settling(&self) -> bool {
        matches!(self, Track::Constraint(_) | Track::Ik(_))
    }

    /// Deep copy for a new owner.
    pub fn duplicate(&self) -> Track {
        self.clone()
    }
}

impl AnimationTrack for Track {
    fn name(&self) -> &str {
        each_track!(self, t => t.name())
    }

    fn set_name(&mut self, name: String) {
        each_track!(self, t => t.set_name(name))
    }

    fn is_enabled(&self) -> bool {
        each_track!(self, t => t.is_enabled())
    }

    fn set_enabled(&mut self, enabled: bool) {
        each_track!(self, t => t.set_enabled(enabled))
    }

    fn is_null(&self) -> bool {
        each_track!(self, t => t.is_null())
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        each_track!(self, t => t.contribute(time, obj, view))
    }

    fn dependencies(&self, owner: &ObjectState) -> Vec<ObjectId> {
        each_track!(self, t => t.dependencies(owner))
    }

    fn delete_dependencies(&mut self, obj: ObjectId) {
        each_track!(self, t => t.delete_dependencies(obj))
    }

    fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        each_track!(self, t => t.update_object_references(map))
    }

    fn weight_track(&self) -> Option<&WeightTrack> {
        each_track!(self, t => t.weight_track())
    }

    fn weight_track_mut(&mut self) -> Option<&mut WeightTrack> {
        each_track!(self, t => t.weight_track_mut())
    }

    fn timecourse(&self) -> Option<&Timecourse> {
        each_track!(self, t => t.timecourse())
    }

    fn timecourse_mut(&mut self) -> Option<&mut Timecourse> {
        each_track!(self, t => t.timecourse_mut())
    }

    fn smoothing_method(&self) -> InterpMode {
        each_track!(self, t => t.smoothing_method())
    }

    fn capture_keyframe(&self, obj: &ObjectState, view: &dyn SceneView) -> Option<Keyframe> {
        each_track!(self, t => t.capture_keyframe(obj, view))
    }

    fn set_keyframe(&mut self, time: f64, obj: &ObjectState, view: &dyn SceneView) -> Option<usize> {
        each_track!(self, t => t.set_keyframe(time, obj, view))
    }
}

macro_rules! impl_from_track {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Track {
                fn from(t: $ty) -> Self {
                    Track::$variant(t)
                }
            }
        )*
    };
}

impl_from_track!(
    Position(PositionTrack),
    Rotation(RotationTrack),
    Pose(PoseTrack),
    Texture(TextureTrack),
    Visibility(VisibilityTrack),
    Constraint(ConstraintTrack),
    Ik(IkTrack),
    ProceduralPosition(ProceduralPositionTrack),
    Scale(ScaleTrack),
    Bend(BendTrack),
    Twist(TwistTrack),
    SkeletonShape(SkeletonShapeTrack),
);

/// Key whatever `tc` already produces at `time`, or `fallback` when it is empty.
pub(crate) fn key_current_value(
    name: &str,
    tc: &mut Timecourse,
    smoothing: InterpMode,
    time: f64,
    fallback: Keyframe,
) -> Option<usize> {
    let value = tc.evaluate(time, smoothing).unwrap_or(fallback);
    match tc.add_timepoint(time, value) {
        Ok(idx) => Some(idx),
        Err(err) => {
            log::warn!("{}: cannot set keyframe: {}", name, err);
            None
        }
    }
}

/// Common name/enabled/weight fields for keyframed, weighted tracks.
macro_rules! track_header {
    () => {
        fn name(&self) -> &str {
            &self.name
        }

        fn set_name(&mut self, name: String) {
            self.name = name;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    };
}

pub(crate) use track_header;
