//! Constraint tracks: per-axis position limits and a forced orientation axis.

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::ObjectId;
use crate::object::{ObjectRef, ObjectState, SceneView};

pub const TAG: &str = "constraint";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConstraint {
    #[default]
    None,
    LessThan,
    EqualTo,
    GreaterThan,
}

impl AxisConstraint {
    /// Constrained value of `current` against `limit`, blended in by `weight`.
    fn resolve(self, current: f64, limit: f64, weight: f64) -> f64 {
        let target = match self {
            AxisConstraint::None => return current,
            AxisConstraint::LessThan => current.min(limit),
            AxisConstraint::EqualTo => limit,
            AxisConstraint::GreaterThan => current.max(limit),
        };
        (1.0 - weight) * current + weight * target
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationAxis {
    #[default]
    None,
    X,
    Y,
    Z,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMode {
    #[default]
    Parallel,
    Perpendicular,
    FacesObject,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTrack {
    pub name: String,
    pub enabled: bool,
    /// Constraint kind for x, y and z.
    pub axes: [AxisConstraint; 3],
    pub pos: Vector3<f64>,
    pub orient_axis: OrientationAxis,
    pub orient_mode: OrientationMode,
    /// Fixed direction for the parallel and perpendicular modes.
    pub orient: Vector3<f64>,
    #[serde(default)]
    pub face_toward: Option<ObjectRef>,
    pub weight: WeightTrack,
}

impl Default for ConstraintTrack {
    fn default() -> Self {
        Self {
            name: "Constraint".to_string(),
            enabled: true,
            axes: [AxisConstraint::None; 3],
            pos: Vector3::zeros(),
            orient_axis: OrientationAxis::None,
            orient_mode: OrientationMode::Parallel,
            orient: Vector3::z(),
            face_toward: None,
            weight: WeightTrack::default(),
        }
    }
}

impl ConstraintTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Make `a` satisfy the orientation constraint, then rebuild `b` and `c` so that
    /// `(a, b, c)` stays a right-handed orthonormal basis.
    fn adjust_axes(
        &self,
        a: &mut Vector3<f64>,
        b: &mut Vector3<f64>,
        c: &mut Vector3<f64>,
        origin: &Vector3<f64>,
        view: &dyn SceneView,
    ) {
        let v = match self.orient_mode {
            OrientationMode::FacesObject => {
                let Some(target) = self.face_toward.and_then(|r| r.origin(view)) else {
                    return;
                };
                target - origin
            }
            _ => self.orient,
        };
        let Some(v) = v.try_normalize(0.0) else {
            return;
        };
        if self.orient_mode == OrientationMode::Perpendicular {
            let projected = *a - v * a.dot(&v);
            match projected.try_normalize(0.0) {
                Some(p) => *a = p,
                None => return,
            }
        } else {
            *a = v;
        }
        *b = c.cross(a);
        *c = a.cross(b);
        if let (Some(nb), Some(nc)) = (b.try_normalize(0.0), c.try_normalize(0.0)) {
            *b = nb;
            *c = nc;
        }
    }
}

impl AnimationTrack for ConstraintTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.orient_axis == OrientationAxis::None
            && self.axes.iter().all(|a| *a == AxisConstraint::None)
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        let weight = self.weight.weight(time);
        let origin = obj.coords.origin;
        let constrained = Vector3::from_fn(|i, _| self.axes[i].resolve(origin[i], self.pos[i], weight));

        if self.orient_axis != OrientationAxis::None {
            let mut z = obj.coords.z_dir();
            let mut y = obj.coords.up_dir();
            let mut x = y.cross(&z);
            let (old_y, old_z) = (y, z);
            match self.orient_axis {
                OrientationAxis::X => self.adjust_axes(&mut x, &mut y, &mut z, &origin, view),
                OrientationAxis::Y => self.adjust_axes(&mut y, &mut z, &mut x, &origin, view),
                _ => self.adjust_axes(&mut z, &mut x, &mut y, &origin, view),
            }
            if weight < 1.0 {
                y = y * weight + old_y * (1.0 - weight);
                z = z * weight + old_z * (1.0 - weight);
            }
            obj.coords.set_orientation_axes(z, y);
        }
        obj.coords.origin = constrained;
    }

    fn dependencies(&self, _owner: &ObjectState) -> Vec<ObjectId> {
        match (self.orient_axis, self.orient_mode, self.face_toward) {
            (OrientationAxis::None, _, _) => Vec::new(),
            (_, OrientationMode::FacesObject, Some(r)) => vec![r.object],
            _ => Vec::new(),
        }
    }

    fn delete_dependencies(&mut self, obj: ObjectId) {
        if self.face_toward.is_some_and(|r| r.object == obj) {
            self.face_toward = None;
        }
    }

    fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        if let Some(r) = self.face_toward.as_mut() {
            r.remap(map);
        }
    }

    fn weight_track(&self) -> Option<&WeightTrack> {
        Some(&self.weight)
    }

    fn weight_track_mut(&mut self) -> Option<&mut WeightTrack> {
        Some(&mut self.weight)
    }
}
