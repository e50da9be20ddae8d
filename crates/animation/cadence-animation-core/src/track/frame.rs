//! Reference frames shared by the transform tracks.

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::math::CoordinateSystem;
use crate::object::{ObjectRef, ObjectState, SceneView};

/// Absolute tracks replace the current value in proportion to their weight;
/// relative tracks add to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackMode {
    #[default]
    Absolute,
    Relative,
}

/// The space a keyframed vector or rotation is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateFrame {
    #[default]
    World,
    Parent,
    Object,
    /// The owner's own axes; only meaningful for relative tracks.
    Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisMask {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl AxisMask {
    pub const ALL: AxisMask = AxisMask {
        x: true,
        y: true,
        z: true,
    };

    pub fn enabled(&self, axis: usize) -> bool {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => false,
        }
    }

    /// Zero the disabled components.
    pub fn mask(&self, v: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            if self.x { v.x } else { 0.0 },
            if self.y { v.y } else { 0.0 },
            if self.z { v.z } else { 0.0 },
        )
    }
}

/// Mode, frame and axis selection of a Position, Rotation or Procedural-Position track.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub mode: TrackMode,
    pub frame: CoordinateFrame,
    /// The reference object for `CoordinateFrame::Object`.
    #[serde(default)]
    pub rel_object: Option<ObjectRef>,
    #[serde(default)]
    pub axes: AxisMask,
}

impl Placement {
    pub fn absolute() -> Self {
        Self::default()
    }

    pub fn relative(frame: CoordinateFrame) -> Self {
        Self {
            mode: TrackMode::Relative,
            frame,
            ..Default::default()
        }
    }

    pub fn relative_to(mode: TrackMode, object: ObjectRef) -> Self {
        Self {
            mode,
            frame: CoordinateFrame::Object,
            rel_object: Some(object),
            ..Default::default()
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.mode == TrackMode::Absolute
    }

    /// The coordinate system of the configured frame, if it resolves.
    pub fn reference(&self, obj: &ObjectState, view: &dyn SceneView) -> Option<CoordinateSystem> {
        match self.frame {
            CoordinateFrame::World => None,
            CoordinateFrame::Parent => {
                let parent = view.object(obj.parent?)?;
                Some(parent.coords.clone())
            }
            CoordinateFrame::Object => self.rel_object?.coords(view),
            CoordinateFrame::Local => Some(obj.coords.clone()),
        }
    }

    /// Map a keyframed position into world space. Absolute tracks treat it as a point of
    /// the parent or reference object; relative tracks treat it as a direction. A frame
    /// that does not resolve leaves the vector as it is.
    pub fn to_world(&self, v: Vector3<f64>, obj: &ObjectState, view: &dyn SceneView) -> Vector3<f64> {
        let Some(reference) = self.reference(obj, view) else {
            return v;
        };
        match (self.mode, self.frame) {
            (TrackMode::Absolute, CoordinateFrame::Parent | CoordinateFrame::Object) => {
                reference.transform_point(&v)
            }
            (TrackMode::Relative, CoordinateFrame::Parent | CoordinateFrame::Object | CoordinateFrame::Local) => {
                reference.transform_direction(&v)
            }
            _ => v,
        }
    }

    /// Inverse of [`to_world`](Self::to_world), used when capturing keyframes.
    pub fn from_world(&self, p: Vector3<f64>, obj: &ObjectState, view: &dyn SceneView) -> Vector3<f64> {
        let Some(reference) = self.reference(obj, view) else {
            return p;
        };
        match (self.mode, self.frame) {
            (TrackMode::Absolute, CoordinateFrame::Parent | CoordinateFrame::Object) => {
                reference.to_local_point(&p)
            }
            (TrackMode::Relative, CoordinateFrame::Parent | CoordinateFrame::Object | CoordinateFrame::Local) => {
                reference.orientation.inverse() * p
            }
            _ => p,
        }
    }

    pub fn dependency(&self, owner: &ObjectState) -> Option<ObjectId> {
        match self.frame {
            CoordinateFrame::Parent => owner.parent,
            CoordinateFrame::Object => self.rel_object.map(|r| r.object),
            _ => None,
        }
    }

    pub fn delete_dependencies(&mut self, obj: ObjectId) {
        if self.rel_object.is_some_and(|r| r.object == obj) {
            self.rel_object = None;
        }
    }

    pub fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        if let Some(r) = self.rel_object.as_mut() {
            r.remap(map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mk_view() -> HashMap<ObjectId, ObjectState> {
        let mut reference = ObjectState::new("ref");
        reference.coords = CoordinateSystem::at(Vector3::new(1.0, 0.0, 0.0));
        reference.coords.set_rotation_angles([0.0, 0.0, 90.0]);
        let mut view = HashMap::new();
        view.insert(ObjectId(1), reference);
        view
    }

    #[test]
    fn absolute_object_frame_is_a_point_transform() {
        let view = mk_view();
        let placement = Placement::relative_to(TrackMode::Absolute, ObjectRef::object(ObjectId(1)));
        let owner = ObjectState::new("owner");
        let w = placement.to_world(Vector3::x(), &owner, &view);
        assert_relative_eq!(w, Vector3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(placement.from_world(w, &owner, &view), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn relative_object_frame_is_a_direction_transform() {
        let view = mk_view();
        let placement = Placement::relative_to(TrackMode::Relative, ObjectRef::object(ObjectId(1)));
        let owner = ObjectState::new("owner");
        let w = placement.to_world(Vector3::x(), &owner, &view);
        assert_relative_eq!(w, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn deleted_reference_degrades_to_world() {
        let view = mk_view();
        let mut placement =
            Placement::relative_to(TrackMode::Absolute, ObjectRef::object(ObjectId(1)));
        placement.delete_dependencies(ObjectId(1));
        let owner = ObjectState::new("owner");
        assert_eq!(placement.to_world(Vector3::x(), &owner, &view), Vector3::x());
        assert_eq!(placement.dependency(&owner), None);
    }
}
