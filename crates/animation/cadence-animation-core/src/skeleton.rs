//! Skeletons: joints with bend/twist/length degrees of freedom.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{next_id, JointId};

/// One joint. `origin` is in the owning object's local space; angles are degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: JointId,
    pub name: String,
    pub parent: Option<JointId>,
    pub origin: Vector3<f64>,
    pub angle1: f64,
    pub angle2: f64,
    pub twist: f64,
    pub length: f64,
}

impl Joint {
    /// The four fitted degrees of freedom: angles in radians, then length.
    pub fn dofs(&self) -> [f64; 4] {
        [
            self.angle1.to_radians(),
            self.angle2.to_radians(),
            self.twist.to_radians(),
            self.length,
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    joints: Vec<Joint>,
    next_id: u32,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint and return its freshly assigned id. Fails once the id space is used up.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointId>,
        origin: Vector3<f64>,
        length: f64,
    ) -> Result<JointId> {
        let id = JointId(next_id(&mut self.next_id, "joint")?);
        self.joints.push(Joint {
            id,
            name: name.into(),
            parent,
            origin,
            angle1: 0.0,
            angle2: 0.0,
            twist: 0.0,
            length,
        });
        Ok(id)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joint_index(&self, id: JointId) -> Option<usize> {
        self.joints.iter().position(|j| j.id == id)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id == id)
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.iter_mut().find(|j| j.id == id)
    }

    /// Same joint ids in the same order.
    pub fn is_compatible(&self, other: &Skeleton) -> bool {
        self.joints.len() == other.joints.len()
            && self
                .joints
                .iter()
                .zip(&other.joints)
                .all(|(a, b)| a.id == b.id)
    }

    /// Move every joint `weight` of the way toward the matching joint of `target`.
    /// Returns false, changing nothing, when the skeletons do not match.
    pub fn blend_toward(&mut self, target: &Skeleton, weight: f64) -> bool {
        if !self.is_compatible(target) {
            return false;
        }
        for (j, t) in self.joints.iter_mut().zip(&target.joints) {
            j.origin += (t.origin - j.origin) * weight;
            j.angle1 += (t.angle1 - j.angle1) * weight;
            j.angle2 += (t.angle2 - j.angle2) * weight;
            j.twist += (t.twist - j.twist) * weight;
            j.length += (t.length - j.length) * weight;
        }
        true
    }
}
