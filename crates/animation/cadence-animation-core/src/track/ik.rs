//! Inverse-kinematics tracks.
//!
//! The track only gathers goals. Each frame it queues an IK distortion on its object,
//! and the host's `IkSolver` moves the skeleton when distortions are resolved.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::weight::WeightTrack;
use super::{track_header, AnimationTrack};
use crate::ids::{JointId, ObjectId};
use crate::object::{Distortion, IkRequest, ObjectRef, ObjectState, SceneView};

pub const TAG: &str = "ik";

/// A joint that either stays put (`target == None`) or follows an object or joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkConstraint {
    pub joint: JointId,
    #[serde(default)]
    pub target: Option<ObjectRef>,
}

impl IkConstraint {
    pub fn locked(joint: JointId) -> Self {
        Self {
            joint,
            target: None,
        }
    }

    pub fn following(joint: JointId, target: ObjectRef) -> Self {
        Self {
            joint,
            target: Some(target),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IkTrack {
    pub name: String,
    pub enabled: bool,
    pub constraints: Vec<IkConstraint>,
    /// Reshape actor meshes from their gestures after solving.
    pub use_gestures: bool,
    pub weight: WeightTrack,
}

impl Default for IkTrack {
    fn default() -> Self {
        Self {
            name: "Inverse Kinematics".to_string(),
            enabled: true,
            constraints: Vec::new(),
            use_gestures: true,
            weight: WeightTrack::default(),
        }
    }
}

impl IkTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Goals for the current frame, in the owner's local space. Unknown joints are
    /// skipped; targets that no longer resolve lock their joint.
    pub fn request(&self, time: f64, obj: &ObjectState, view: &dyn SceneView) -> Option<IkRequest> {
        let skeleton = obj.skeleton()?;
        if skeleton.is_empty() {
            return None;
        }
        let mut request = IkRequest {
            weight: self.weight.weight(time),
            use_gestures: self.use_gestures,
            ..Default::default()
        };
        for c in &self.constraints {
            if skeleton.joint(c.joint).is_none() {
                continue;
            }
            match c.target.and_then(|r| r.origin(view)) {
                Some(world) => request
                    .targets
                    .push((c.joint, obj.coords.to_local_point(&world))),
                None => request.locked.push(c.joint),
            }
        }
        Some(request)
    }
}

impl AnimationTrack for IkTrack {
    track_header!();

    fn is_null(&self) -> bool {
        self.constraints.iter().all(|c| c.target.is_none())
    }

    fn contribute(&self, time: f64, obj: &mut ObjectState, view: &dyn SceneView) {
        if let Some(request) = self.request(time, obj, view) {
            obj.add_distortion(Distortion::Ik(request));
        }
    }

    fn dependencies(&self, _owner: &ObjectState) -> Vec<ObjectId> {
        self.constraints
            .iter()
            .filter_map(|c| c.target.map(|r| r.object))
            .collect()
    }

    /// Constraints targeting `obj` are removed outright.
    fn delete_dependencies(&mut self, obj: ObjectId) {
        self.constraints
            .retain(|c| !c.target.is_some_and(|r| r.object == obj));
    }

    fn update_object_references(&mut self, map: &HashMap<ObjectId, ObjectId>) {
        for c in &mut self.constraints {
            if let Some(r) = c.target.as_mut() {
                r.remap(map);
            }
        }
    }

    fn weight_track(&self) -> Option<&WeightTrack> {
        Some(&self.weight)
    }

    fn weight_track_mut(&mut self) -> Option<&mut WeightTrack> {
        Some(&mut self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Gesture;
    use crate::math::CoordinateSystem;
    use crate::skeleton::Skeleton;
    use nalgebra::Vector3;

    fn mk_scene() -> HashMap<ObjectId, ObjectState> {
        let mut scene = HashMap::new();
        scene.insert(
            ObjectId(1),
            ObjectState {
                coords: CoordinateSystem::at(Vector3::new(0.0, 3.0, 0.0)),
                ..ObjectState::new("goal")
            },
        );
        scene
    }

    fn mk_arm() -> ObjectState {
        let mut s = Skeleton::new();
        let shoulder = s.add_joint("shoulder", None, Vector3::zeros(), 1.0).expect("joint");
        s.add_joint("hand", Some(shoulder), Vector3::new(0.0, 1.0, 0.0), 1.0).expect("joint");
        let mut obj = ObjectState::new("arm");
        obj.coords = CoordinateSystem::at(Vector3::new(0.0, 1.0, 0.0));
        obj.shape = Some(Gesture::new(s, vec![]));
        obj
    }

    #[test]
    fn queues_local_goals_and_locks() {
        let mut track = IkTrack::new("IK");
        track.constraints = vec![
            IkConstraint::locked(JointId(0)),
            IkConstraint::following(JointId(1), ObjectRef::object(ObjectId(1))),
            IkConstraint::following(JointId(7), ObjectRef::object(ObjectId(1))),
        ];
        let mut obj = mk_arm();
        track.apply(0.0, &mut obj, &mk_scene());

        let [Distortion::Ik(req)] = obj.distortions.as_slice() else {
            panic!("expected one IK distortion");
        };
        assert_eq!(req.locked, vec![JointId(0)]);
        assert_eq!(req.targets, vec![(JointId(1), Vector3::new(0.0, 2.0, 0.0))]);
        assert_eq!(req.weight, 1.0);
    }

    #[test]
    fn deleting_the_target_drops_the_constraint() {
        let mut track = IkTrack::new("IK");
        track.constraints = vec![
            IkConstraint::locked(JointId(0)),
            IkConstraint::following(JointId(1), ObjectRef::object(ObjectId(1))),
        ];
        assert!(!track.is_null());
        track.delete_dependencies(ObjectId(1));
        assert_eq!(track.constraints.len(), 1);
        assert!(track.is_null());
        assert!(track.dependencies(&mk_arm()).is_empty());
    }

    #[test]
    fn missing_target_object_locks_the_joint() {
        let mut track = IkTrack::new("IK");
        track.constraints = vec![IkConstraint::following(
            JointId(1),
            ObjectRef::object(ObjectId(9)),
        )];
        let req = track
            .request(0.0, &mk_arm(), &mk_scene())
            .expect("arm has a skeleton");
        assert_eq!(req.locked, vec![JointId(1)]);
        assert!(req.targets.is_empty());
    }
}
