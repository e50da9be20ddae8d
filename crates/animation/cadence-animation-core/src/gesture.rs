//! Gestures: a complete skeleton configuration plus the surface it deforms.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub skeleton: Skeleton,
    pub vertices: Vec<Vector3<f64>>,
}

impl Gesture {
    pub fn new(skeleton: Skeleton, vertices: Vec<Vector3<f64>>) -> Self {
        Self { skeleton, vertices }
    }

    /// Same joints and vertex count, so the two can be combined component-wise.
    pub fn is_compatible(&self, other: &Gesture) -> bool {
        self.vertices.len() == other.vertices.len() && self.skeleton.is_compatible(&other.skeleton)
    }

    /// Plain weighted sum of every degree of freedom and vertex. `None` on a shape mismatch.
    pub fn weighted_sum(entries: &[(&Gesture, f64)]) -> Option<Gesture> {
        let (first, _) = *entries.first()?;
        if entries.iter().any(|(g, _)| !first.is_compatible(g)) {
            return None;
        }
        let mut out = first.clone();
        for (i, joint) in out.skeleton.joints_mut().iter_mut().enumerate() {
            joint.origin = Vector3::zeros();
            joint.angle1 = 0.0;
            joint.angle2 = 0.0;
            joint.twist = 0.0;
            joint.length = 0.0;
            for (g, w) in entries {
                let src = &g.skeleton.joints()[i];
                joint.origin += src.origin * *w;
                joint.angle1 += src.angle1 * w;
                joint.angle2 += src.angle2 * w;
                joint.twist += src.twist * w;
                joint.length += src.length * w;
            }
        }
        for (i, v) in out.vertices.iter_mut().enumerate() {
            *v = entries
                .iter()
                .fold(Vector3::zeros(), |acc, (g, w)| acc + g.vertices[i] * *w);
        }
        Some(out)
    }

    /// `self + Σ wᵢ (gᵢ − self)` over skeleton and surface, treating `self` as the rest pose.
    /// Incompatible gestures are skipped.
    pub fn blend_from_rest(&self, gestures: &[(&Gesture, f64)]) -> Gesture {
        let mut out = self.clone();
        for (g, w) in gestures {
            if !self.is_compatible(g) {
                log::warn!("skipping gesture with mismatched skeleton or surface");
                continue;
            }
            for ((dst, rest), src) in out
                .skeleton
                .joints_mut()
                .iter_mut()
                .zip(self.skeleton.joints())
                .zip(g.skeleton.joints())
            {
                dst.origin += (src.origin - rest.origin) * *w;
                dst.angle1 += (src.angle1 - rest.angle1) * w;
                dst.angle2 += (src.angle2 - rest.angle2) * w;
                dst.twist += (src.twist - rest.twist) * w;
                dst.length += (src.length - rest.length) * w;
            }
            for ((dst, rest), src) in out.vertices.iter_mut().zip(&self.vertices).zip(&g.vertices) {
                *dst += (src - rest) * *w;
            }
        }
        out
    }

    /// Rewrite only the surface of `target` as `self + Σ wᵢ (gᵢ − self)`; its skeleton is kept.
    pub fn blend_surface(&self, target: &mut Gesture, gestures: &[(&Gesture, f64)]) {
        if target.vertices.len() != self.vertices.len() {
            log::warn!(
                "cannot reshape surface: {} vertices against a rest pose of {}",
                target.vertices.len(),
                self.vertices.len()
            );
            return;
        }
        target.vertices.clone_from(&self.vertices);
        for (g, w) in gestures {
            if g.vertices.len() != self.vertices.len() {
                continue;
            }
            for ((dst, rest), src) in target.vertices.iter_mut().zip(&self.vertices).zip(&g.vertices) {
                *dst += (src - rest) * *w;
            }
        }
    }
}
