//! Scene object state as seen by tracks.
//!
//! Tracks write into one `ObjectState` and read other objects through a `SceneView`.
//! Cross-object links are plain ids resolved at apply time; a link to something that
//! no longer exists resolves to `None` and the reading track does nothing.

use hashbrown::HashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::deform::Deformation;
use crate::fit::FitResult;
use crate::gesture::Gesture;
use crate::ids::{JointId, ObjectId, ParamId};
use crate::keyframe::Keyframe;
use crate::math::CoordinateSystem;
use crate::skeleton::Skeleton;

/// Read access to the other objects of a scene during evaluation.
pub trait SceneView {
    fn object(&self, id: ObjectId) -> Option<&ObjectState>;
}

impl SceneView for HashMap<ObjectId, ObjectState> {
    fn object(&self, id: ObjectId) -> Option<&ObjectState> {
        self.get(&id)
    }
}

/// Weak handle to an object, or to one joint of its skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object: ObjectId,
    #[serde(default)]
    pub joint: Option<JointId>,
}

impl ObjectRef {
    pub fn object(object: ObjectId) -> Self {
        Self {
            object,
            joint: None,
        }
    }

    pub fn joint(object: ObjectId, joint: JointId) -> Self {
        Self {
            object,
            joint: Some(joint),
        }
    }

    /// World coordinate system of the referent. For a joint, the object's orientation
    /// placed at the joint's world origin.
    pub fn coords(&self, view: &dyn SceneView) -> Option<CoordinateSystem> {
        let obj = view.object(self.object)?;
        match self.joint {
            None => Some(obj.coords.clone()),
            Some(j) => Some(CoordinateSystem::new(
                obj.joint_world_origin(j)?,
                obj.coords.orientation,
            )),
        }
    }

    pub fn origin(&self, view: &dyn SceneView) -> Option<Vector3<f64>> {
        self.coords(view).map(|c| c.origin)
    }

    /// Re-point at a duplicated object, keeping the joint.
    pub fn remap(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        if let Some(&to) = map.get(&self.object) {
            self.object = to;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureParameter {
    pub id: ParamId,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl TextureParameter {
    pub fn new(id: ParamId, name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            id,
            name: name.into(),
            min,
            max,
            default,
        }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min).min(self.max)
    }
}

/// Current value of one texture parameter: one number, or one per surface vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Uniform(f64),
    PerVertex(Vec<f64>),
}

impl ParamValue {
    pub fn average(&self) -> f64 {
        match self {
            ParamValue::Uniform(v) => *v,
            ParamValue::PerVertex(vs) if vs.is_empty() => 0.0,
            ParamValue::PerVertex(vs) => vs.iter().sum::<f64>() / vs.len() as f64,
        }
    }
}

/// Inverse-kinematics goals for one object, in its local space.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IkRequest {
    /// Joints that must keep their current position.
    pub locked: Vec<JointId>,
    pub targets: Vec<(JointId, Vector3<f64>)>,
    pub weight: f64,
    pub use_gestures: bool,
}

/// Deferred edits queued while an object is being distorted, resolved in queue order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Distortion {
    Pose {
        weight: f64,
        pose: Keyframe,
        relative: bool,
    },
    Ik(IkRequest),
    /// Surface deformation. `frame` is the object's placement when the edit works in world
    /// space, `None` for local space.
    Deform {
        deformation: Deformation,
        frame: Option<CoordinateSystem>,
    },
    /// Move the skeleton `weight` of the way toward `skeleton`, then optionally refit the
    /// surface from the actor's gestures.
    SkeletonShape {
        skeleton: Skeleton,
        weight: f64,
        use_gestures: bool,
    },
}

/// Host-provided skeleton solver.
pub trait IkSolver {
    fn solve(&self, skeleton: &mut Skeleton, request: &IkRequest);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub name: String,
    pub coords: CoordinateSystem,
    pub parent: Option<ObjectId>,
    pub visible: bool,
    pub shape: Option<Gesture>,
    pub actor: Option<Actor>,
    /// Pose set by tracks this frame and not yet applied to `shape`.
    pub pose: Option<Keyframe>,
    pub params: Vec<TextureParameter>,
    pub param_values: Vec<ParamValue>,
    pub distortions: Vec<Distortion>,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            name: String::new(),
            coords: CoordinateSystem::default(),
            parent: None,
            visible: true,
            shape: None,
            actor: None,
            pose: None,
            params: Vec::new(),
            param_values: Vec::new(),
            distortions: Vec::new(),
        }
    }
}

impl ObjectState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A posable object driven by `actor`, starting at its rest shape.
    pub fn with_actor(name: impl Into<String>, actor: Actor) -> Self {
        Self {
            name: name.into(),
            shape: Some(actor.rest().clone()),
            actor: Some(actor),
            ..Default::default()
        }
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.shape.as_ref().map(|s| &s.skeleton)
    }

    pub fn is_distorted(&self) -> bool {
        !self.distortions.is_empty()
    }

    pub fn add_distortion(&mut self, d: Distortion) {
        self.distortions.push(d);
    }

    pub fn clear_distortions(&mut self) {
        self.distortions.clear();
    }

    /// Current pose as a keyframe: actor weights for actors, the raw gesture otherwise.
    pub fn pose_keyframe(&self) -> Option<Keyframe> {
        if let Some(actor) = &self.actor {
            return Some(Keyframe::Actor(actor.pose_keyframe().clone()));
        }
        self.shape.clone().map(Keyframe::Gesture)
    }

    /// Apply a pose keyframe to the shape. Returns false when the keyframe does not fit.
    pub fn apply_pose_keyframe(&mut self, pose: &Keyframe) -> bool {
        match pose {
            Keyframe::Actor(kf) => match self.actor.as_mut() {
                Some(actor) => {
                    self.shape = Some(actor.apply_pose_keyframe(kf));
                    true
                }
                None => {
                    log::warn!("object {:?}: actor pose on an object without an actor", self.name);
                    false
                }
            },
            Keyframe::Gesture(g) => {
                let fits = match &self.shape {
                    Some(shape) => shape.is_compatible(g),
                    None => self.actor.is_none(),
                };
                if fits {
                    self.shape = Some(g.clone());
                } else {
                    log::warn!("object {:?}: gesture does not match its skeleton", self.name);
                }
                fits
            }
            other => {
                log::warn!(
                    "object {:?}: cannot pose with a {} keyframe",
                    self.name,
                    other.kind().as_str()
                );
                false
            }
        }
    }

    /// Bring the shape up to date with the pending pose. The pose stays pending so later
    /// tracks can keep blending into it.
    pub fn flush_pose(&mut self) {
        let Some(pose) = self.pose.clone() else {
            return;
        };
        if self.pose_keyframe().as_ref() != Some(&pose) {
            self.apply_pose_keyframe(&pose);
        }
    }

    /// Apply the pending pose and clear it.
    pub fn commit_pose(&mut self) {
        if let Some(pose) = self.pose.take() {
            self.apply_pose_keyframe(&pose);
        }
    }

    pub fn joint_world_origin(&self, joint: JointId) -> Option<Vector3<f64>> {
        let j = self.skeleton()?.joint(joint)?;
        Some(self.coords.transform_point(&j.origin))
    }

    pub fn param_index(&self, id: ParamId) -> Option<usize> {
        self.params.iter().position(|p| p.id == id)
    }

    pub fn add_param(&mut self, param: TextureParameter) {
        self.param_values.push(ParamValue::Uniform(param.default));
        self.params.push(param);
    }

    /// Resolve every queued distortion in order. Returns the gesture fits that ran.
    pub fn apply_distortions(&mut self, solver: &dyn IkSolver) -> Vec<FitResult> {
        let mut fits = Vec::new();
        for d in std::mem::take(&mut self.distortions) {
            match d {
                Distortion::Pose {
                    weight,
                    pose,
                    relative,
                } => {
                    let Some(current) = self.pose_keyframe() else {
                        continue;
                    };
                    let blended = if relative {
                        current.blend(&pose, 1.0, weight)
                    } else {
                        current.blend(&pose, 1.0 - weight, weight)
                    };
                    self.apply_pose_keyframe(&blended);
                }
                Distortion::Ik(request) => {
                    let Some(shape) = self.shape.as_mut() else {
                        continue;
                    };
                    solver.solve(&mut shape.skeleton, &request);
                    if request.use_gestures {
                        if let Some(actor) = &self.actor {
                            fits.push(actor.shape_mesh_from_gestures(shape));
                        }
                    }
                }
                Distortion::Deform { deformation, frame } => {
                    if let Some(shape) = self.shape.as_mut() {
                        deformation.apply(&mut shape.vertices, frame.as_ref());
                    }
                }
                Distortion::SkeletonShape {
                    skeleton,
                    weight,
                    use_gestures,
                } => {
                    let Some(shape) = self.shape.as_mut() else {
                        continue;
                    };
                    if !shape.skeleton.blend_toward(&skeleton, weight) {
                        log::warn!(
                            "object {:?}: skeleton shape does not match its skeleton",
                            self.name
                        );
                        continue;
                    }
                    if use_gestures {
                        if let Some(actor) = &self.actor {
                            fits.push(actor.shape_mesh_from_gestures(shape));
                        }
                    }
                }
            }
        }
        fits
    }

    /// The shape as it would look with every queued distortion resolved, leaving this
    /// state untouched. `None` for objects without a shape.
    pub fn distorted_shape(&self, solver: &dyn IkSolver) -> Option<(Gesture, Vec<FitResult>)> {
        let mut copy = self.clone();
        let fits = copy.apply_distortions(solver);
        copy.shape.map(|shape| (shape, fits))
    }
}
