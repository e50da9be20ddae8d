//! Actors: a library of named gestures over one rest pose.
//!
//! Gesture 0 is the rest pose ("Default Pose") and is never deleted. Ids are handed out
//! monotonically and never reused, so `ActorKeyframe`s stay meaningful after edits.

use serde::{Deserialize, Serialize};

use crate::config::FitterConfig;
use crate::error::Result;
use crate::fit::{solve_gesture_weights, FitResult};
use crate::gesture::Gesture;
use crate::ids::{next_id, GestureId};
use crate::keyframe::ActorKeyframe;
use crate::skeleton::Skeleton;

pub const REST_GESTURE_NAME: &str = "Default Pose";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureEntry {
    pub id: GestureId,
    pub name: String,
    pub gesture: Gesture,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    gestures: Vec<GestureEntry>,
    next_id: u32,
    current_pose: ActorKeyframe,
}

impl Actor {
    /// New actor whose only gesture is `rest`, posed fully at rest.
    pub fn new(rest: Gesture) -> Self {
        let rest_id = GestureId(0);
        Self {
            gestures: vec![GestureEntry {
                id: rest_id,
                name: REST_GESTURE_NAME.to_string(),
                gesture: rest,
            }],
            next_id: 1,
            current_pose: ActorKeyframe::single(rest_id, 1.0),
        }
    }

    pub fn rest(&self) -> &Gesture {
        &self.gestures[0].gesture
    }

    pub fn rest_id(&self) -> GestureId {
        self.gestures[0].id
    }

    pub fn num_gestures(&self) -> usize {
        self.gestures.len()
    }

    pub fn gestures(&self) -> &[GestureEntry] {
        &self.gestures
    }

    pub fn gesture(&self, index: usize) -> Option<&Gesture> {
        self.gestures.get(index).map(|e| &e.gesture)
    }

    pub fn gesture_id(&self, index: usize) -> Option<GestureId> {
        self.gestures.get(index).map(|e| e.id)
    }

    pub fn gesture_index(&self, id: GestureId) -> Option<usize> {
        self.gestures.iter().position(|e| e.id == id)
    }

    pub fn gesture_with_id(&self, id: GestureId) -> Option<&Gesture> {
        self.gestures.iter().find(|e| e.id == id).map(|e| &e.gesture)
    }

    pub fn gesture_name(&self, id: GestureId) -> Option<&str> {
        self.gestures
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    pub fn set_gesture_name(&mut self, id: GestureId, name: impl Into<String>) -> bool {
        match self.gestures.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Store a new gesture under a fresh id. Fails once the id space is used up.
    pub fn add_gesture(&mut self, name: impl Into<String>, gesture: Gesture) -> Result<GestureId> {
        let id = GestureId(next_id(&mut self.next_id, "gesture")?);
        if !self.rest().is_compatible(&gesture) {
            log::warn!("gesture {:?} does not match the rest pose; it will not blend", id);
        }
        self.gestures.push(GestureEntry {
            id,
            name: name.into(),
            gesture,
        });
        Ok(id)
    }

    /// Remove a gesture. The rest pose cannot be removed; returns whether anything changed.
    pub fn delete_gesture_with_id(&mut self, id: GestureId) -> bool {
        if id == self.rest_id() {
            log::warn!("refusing to delete the rest gesture");
            return false;
        }
        let Some(index) = self.gesture_index(id) else {
            return false;
        };
        self.gestures.remove(index);
        self.current_pose.entries.retain(|(g, _)| *g != id);
        true
    }

    pub fn pose_keyframe(&self) -> &ActorKeyframe {
        &self.current_pose
    }

    /// The gesture a pose keyframe describes: rest plus weighted offsets of every known gesture.
    pub fn object_keyframe(&self, pose: &ActorKeyframe) -> Gesture {
        let parts: Vec<(&Gesture, f64)> = pose
            .entries
            .iter()
            .filter_map(|(id, w)| self.gesture_with_id(*id).map(|g| (g, *w)))
            .collect();
        self.rest().blend_from_rest(&parts)
    }

    /// Adopt `pose` as the current pose, dropping ids that no longer exist.
    pub fn apply_pose_keyframe(&mut self, pose: &ActorKeyframe) -> Gesture {
        let entries = pose
            .entries
            .iter()
            .filter(|(id, _)| self.gesture_index(*id).is_some())
            .copied()
            .collect();
        self.current_pose = ActorKeyframe { entries };
        self.object_keyframe(&self.current_pose)
    }

    pub fn shape_mesh_from_gestures(&self, shape: &mut Gesture) -> FitResult {
        self.shape_mesh_from_gestures_with(shape, &FitterConfig::default())
    }

    /// Reshape the surface of `shape` from the gesture combination that best reproduces its
    /// skeleton. The skeleton itself is left as given.
    pub fn shape_mesh_from_gestures_with(&self, shape: &mut Gesture, cfg: &FitterConfig) -> FitResult {
        let candidates: Vec<&Skeleton> = self.gestures[1..]
            .iter()
            .map(|e| &e.gesture.skeleton)
            .collect();
        let mut fit = solve_gesture_weights(&shape.skeleton, &self.rest().skeleton, &candidates, cfg);
        // Report indices into the full gesture list.
        for (k, _) in fit.weights.iter_mut() {
            *k += 1;
        }
        for k in fit.excluded.iter_mut() {
            *k += 1;
        }
        let parts: Vec<(&Gesture, f64)> = fit
            .weights
            .iter()
            .map(|&(k, w)| (&self.gestures[k].gesture, w))
            .collect();
        self.rest().blend_surface(shape, &parts);
        fit
    }

    /// Estimated pose keyframe for a target skeleton.
    pub fn fit_pose_keyframe(&self, target: &Skeleton) -> ActorKeyframe {
        let mut shape = self.rest().clone();
        shape.skeleton = target.clone();
        let fit = self.shape_mesh_from_gestures(&mut shape);
        let mut kf = ActorKeyframe::single(self.rest_id(), 1.0);
        for (k, w) in fit.weights {
            kf.add_gesture(self.gestures[k].id, w);
        }
        kf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn mk_gesture(a1: f64, a2: f64, tip: f64) -> Gesture {
        let mut s = Skeleton::new();
        let root = s.add_joint("root", None, Vector3::zeros(), 1.0).expect("joint");
        let elbow = s
            .add_joint("elbow", Some(root), Vector3::new(0.0, 1.0, 0.0), 1.0)
            .expect("joint");
        if let Some(j) = s.joint_mut(root) {
            j.angle1 = a1;
        }
        if let Some(j) = s.joint_mut(elbow) {
            j.angle2 = a2;
        }
        Gesture::new(s, vec![Vector3::zeros(), Vector3::new(tip, 0.0, 0.0)])
    }

    fn mk_actor() -> Actor {
        let mut actor = Actor::new(mk_gesture(0.0, 0.0, 1.0));
        actor
            .add_gesture("raise", mk_gesture(30.0, 0.0, 2.0))
            .expect("gesture");
        actor
            .add_gesture("bend", mk_gesture(0.0, 45.0, 4.0))
            .expect("gesture");
        actor
    }

    #[test]
    fn rest_gesture_cannot_be_deleted() {
        let mut actor = mk_actor();
        assert!(!actor.delete_gesture_with_id(GestureId(0)));
        assert_eq!(actor.num_gestures(), 3);
        assert!(actor.delete_gesture_with_id(GestureId(1)));
        assert!(actor.gesture_with_id(GestureId(1)).is_none());
        // Ids are not reused.
        let id = actor
            .add_gesture("again", mk_gesture(1.0, 0.0, 1.0))
            .expect("gesture");
        assert_eq!(id, GestureId(3));
        assert_eq!(actor.gesture_name(GestureId(0)), Some(REST_GESTURE_NAME));
    }

    #[test]
    fn gesture_ids_refuse_to_wrap() {
        let mut actor = mk_actor();
        actor.next_id = u32::MAX - 1;
        let last = actor
            .add_gesture("last", mk_gesture(5.0, 0.0, 1.0))
            .expect("gesture");
        assert_eq!(last, GestureId(u32::MAX - 1));
        let err = actor
            .add_gesture("overflow", mk_gesture(6.0, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, crate::error::AnimationError::IdsExhausted { .. }));
        assert_eq!(actor.num_gestures(), 4);
        assert_eq!(actor.rest_id(), GestureId(0));
    }

    #[test]
    fn fitting_a_stored_gesture_selects_it() {
        let actor = mk_actor();
        let mut shape = mk_gesture(30.0, 0.0, 0.0);
        let fit = actor.shape_mesh_from_gestures(&mut shape);
        assert!((fit.weight_of(1) - 1.0).abs() < 1e-9);
        assert_eq!(fit.weight_of(2), 0.0);
        assert!(fit.iterations <= actor.num_gestures());
        assert!((shape.vertices[1].x - 2.0).abs() < 1e-9);
        assert_eq!(shape.skeleton.joints()[0].angle1, 30.0);
    }

    #[test]
    fn fitting_rest_restores_rest_surface() {
        let actor = mk_actor();
        let mut shape = mk_gesture(0.0, 0.0, 9.0);
        let fit = actor.shape_mesh_from_gestures(&mut shape);
        assert!(fit.is_empty());
        assert_eq!(shape.vertices, actor.rest().vertices);
    }

    #[test]
    fn apply_pose_keyframe_prunes_missing_ids() {
        let mut actor = mk_actor();
        let pose = ActorKeyframe {
            entries: vec![(GestureId(0), 1.0), (GestureId(2), 0.5), (GestureId(7), 1.0)],
        };
        let g = actor.apply_pose_keyframe(&pose);
        assert_eq!(actor.pose_keyframe().entries.len(), 2);
        assert!((g.skeleton.joints()[1].angle2 - 22.5).abs() < 1e-12);
        assert!((g.vertices[1].x - 2.5).abs() < 1e-12);
    }
}
