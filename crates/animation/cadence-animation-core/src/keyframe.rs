//! Keyframe value algebra.
//!
//! A keyframe is one sampled value of whatever a track controls. Keyframes combine by
//! weighted blends of two, three or four operands of the same concrete type. Weights are
//! never normalized: callers decide what a weight sum means (gesture contributions are
//! deliberately additive). Mixed types fail soft to a copy of the first operand.

use indexmap::IndexMap;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;
use crate::ids::GestureId;
use crate::interp::functions::weighted_quat;
use crate::math::euler_degrees;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Keyframe {
    Null,
    Scalar(f64),
    Vector(Vector3<f64>),
    Rotation(RotationKeyframe),
    Bool(bool),
    Array(Vec<f64>),
    Gesture(Gesture),
    Actor(ActorKeyframe),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyframeKind {
    Null,
    Scalar,
    Vector,
    Rotation,
    Bool,
    Array,
    Gesture,
    Actor,
}

impl KeyframeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyframeKind::Null => "null",
            KeyframeKind::Scalar => "scalar",
            KeyframeKind::Vector => "vector",
            KeyframeKind::Rotation => "rotation",
            KeyframeKind::Bool => "bool",
            KeyframeKind::Array => "array",
            KeyframeKind::Gesture => "gesture",
            KeyframeKind::Actor => "actor",
        }
    }
}

impl Keyframe {
    pub fn kind(&self) -> KeyframeKind {
        match self {
            Keyframe::Null => KeyframeKind::Null,
            Keyframe::Scalar(_) => KeyframeKind::Scalar,
            Keyframe::Vector(_) => KeyframeKind::Vector,
            Keyframe::Rotation(_) => KeyframeKind::Rotation,
            Keyframe::Bool(_) => KeyframeKind::Bool,
            Keyframe::Array(_) => KeyframeKind::Array,
            Keyframe::Gesture(_) => KeyframeKind::Gesture,
            Keyframe::Actor(_) => KeyframeKind::Actor,
        }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Self {
        Keyframe::Vector(Vector3::new(x, y, z))
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Keyframe::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3<f64>> {
        match self {
            Keyframe::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Copy for a new owner. Keyframes own all their data, so this never aliases.
    #[inline]
    pub fn duplicate(&self) -> Keyframe {
        self.clone()
    }

    pub fn blend(&self, o2: &Keyframe, w1: f64, w2: f64) -> Keyframe {
        Keyframe::blend_all(&[(self, w1), (o2, w2)])
    }

    pub fn blend3(&self, o2: &Keyframe, o3: &Keyframe, w1: f64, w2: f64, w3: f64) -> Keyframe {
        Keyframe::blend_all(&[(self, w1), (o2, w2), (o3, w3)])
    }

    #[allow(clippy::too_many_arguments)]
    pub fn blend4(
        &self,
        o2: &Keyframe,
        o3: &Keyframe,
        o4: &Keyframe,
        w1: f64,
        w2: f64,
        w3: f64,
        w4: f64,
    ) -> Keyframe {
        Keyframe::blend_all(&[(self, w1), (o2, w2), (o3, w3), (o4, w4)])
    }

    /// Weighted combination of any number of keyframes of one concrete type.
    pub fn blend_all(entries: &[(&Keyframe, f64)]) -> Keyframe {
        let Some(&(first, _)) = entries.first() else {
            return Keyframe::Null;
        };
        let kind = first.kind();
        if let Some((other, _)) = entries.iter().find(|(k, _)| k.kind() != kind) {
            log::debug!(
                "cannot blend {} with {}; keeping first operand",
                kind.as_str(),
                other.kind().as_str()
            );
            return first.clone();
        }

        match first {
            Keyframe::Null => Keyframe::Null,
            Keyframe::Scalar(_) => Keyframe::Scalar(
                entries
                    .iter()
                    .map(|(k, w)| k.as_scalar().unwrap_or(0.0) * w)
                    .sum(),
            ),
            Keyframe::Vector(_) => Keyframe::Vector(entries.iter().fold(
                Vector3::zeros(),
                |acc, (k, w)| acc + k.as_vector().unwrap_or_else(Vector3::zeros) * *w,
            )),
            Keyframe::Rotation(_) => {
                let rots: Vec<(&RotationKeyframe, f64)> = entries
                    .iter()
                    .filter_map(|(k, w)| match k {
                        Keyframe::Rotation(r) => Some((r, *w)),
                        _ => None,
                    })
                    .collect();
                Keyframe::Rotation(RotationKeyframe::blend_all(&rots))
            }
            Keyframe::Bool(_) => {
                // Largest weight wins; ties keep the earliest operand.
                let mut best = entries[0];
                for e in &entries[1..] {
                    if e.1 > best.1 {
                        best = *e;
                    }
                }
                best.0.clone()
            }
            Keyframe::Array(a) => {
                let len = a.len();
                let mut out = vec![0.0; len];
                for (k, w) in entries {
                    let Keyframe::Array(vals) = k else { continue };
                    if vals.len() != len {
                        log::debug!("cannot blend arrays of length {} and {}", len, vals.len());
                        return first.clone();
                    }
                    for (o, v) in out.iter_mut().zip(vals) {
                        *o += v * w;
                    }
                }
                Keyframe::Array(out)
            }
            Keyframe::Gesture(_) => {
                let gestures: Vec<(&Gesture, f64)> = entries
                    .iter()
                    .filter_map(|(k, w)| match k {
                        Keyframe::Gesture(g) => Some((g, *w)),
                        _ => None,
                    })
                    .collect();
                match Gesture::weighted_sum(&gestures) {
                    Some(g) => Keyframe::Gesture(g),
                    None => {
                        log::debug!("cannot blend gestures with different skeletons");
                        first.clone()
                    }
                }
            }
            Keyframe::Actor(_) => {
                let poses: Vec<(&ActorKeyframe, f64)> = entries
                    .iter()
                    .filter_map(|(k, w)| match k {
                        Keyframe::Actor(a) => Some((a, *w)),
                        _ => None,
                    })
                    .collect();
                Keyframe::Actor(ActorKeyframe::blend_all(&poses))
            }
        }
    }

    /// Tolerant comparison for "has this changed" checks.
    pub fn approx_eq(&self, other: &Keyframe, eps: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= eps;
        match (self, other) {
            (Keyframe::Null, Keyframe::Null) => true,
            (Keyframe::Scalar(a), Keyframe::Scalar(b)) => close(*a, *b),
            (Keyframe::Vector(a), Keyframe::Vector(b)) => (a - b).amax() <= eps,
            (Keyframe::Rotation(a), Keyframe::Rotation(b)) => {
                close(a.x, b.x) && close(a.y, b.y) && close(a.z, b.z)
            }
            (Keyframe::Bool(a), Keyframe::Bool(b)) => a == b,
            (Keyframe::Array(a), Keyframe::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| close(*x, *y))
            }
            (Keyframe::Gesture(a), Keyframe::Gesture(b)) => {
                a.is_compatible(b)
                    && a.vertices
                        .iter()
                        .zip(&b.vertices)
                        .all(|(x, y)| (x - y).amax() <= eps)
                    && a.skeleton
                        .joints()
                        .iter()
                        .zip(b.skeleton.joints())
                        .all(|(x, y)| {
                            close(x.angle1, y.angle1)
                                && close(x.angle2, y.angle2)
                                && close(x.twist, y.twist)
                                && close(x.length, y.length)
                        })
            }
            (Keyframe::Actor(a), Keyframe::Actor(b)) => {
                a.entries.len() == b.entries.len()
                    && a
                        .entries
                        .iter()
                        .zip(&b.entries)
                        .all(|(x, y)| x.0 == y.0 && close(x.1, y.1))
            }
            _ => false,
        }
    }
}

/// XYZ Euler angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationKeyframe {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Blend through quaternions instead of per-angle sums.
    #[serde(default)]
    pub use_quaternion: bool,
}

impl RotationKeyframe {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            use_quaternion: false,
        }
    }

    pub fn from_quaternion(q: &UnitQuaternion<f64>, use_quaternion: bool) -> Self {
        let (x, y, z) = q.euler_angles();
        Self {
            x: x.to_degrees(),
            y: y.to_degrees(),
            z: z.to_degrees(),
            use_quaternion,
        }
    }

    pub fn angles(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        euler_degrees(self.angles())
    }

    fn blend_all(entries: &[(&RotationKeyframe, f64)]) -> RotationKeyframe {
        let Some(&(first, _)) = entries.first() else {
            return RotationKeyframe::default();
        };
        if first.use_quaternion {
            let quats: Vec<(UnitQuaternion<f64>, f64)> =
                entries.iter().map(|(r, w)| (r.to_quaternion(), *w)).collect();
            if let Some(q) = weighted_quat(&quats) {
                return RotationKeyframe::from_quaternion(&q, true);
            }
            return *first;
        }
        let mut out = RotationKeyframe::default();
        for (r, w) in entries {
            out.x += r.x * w;
            out.y += r.y * w;
            out.z += r.z * w;
        }
        out
    }
}

/// An actor's pose as weights on its gestures, in first-appearance order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorKeyframe {
    pub entries: Vec<(GestureId, f64)>,
}

impl ActorKeyframe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: GestureId, weight: f64) -> Self {
        Self {
            entries: vec![(id, weight)],
        }
    }

    pub fn add_gesture(&mut self, id: GestureId, weight: f64) {
        self.entries.push((id, weight));
    }

    pub fn delete_gesture(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    pub fn weight_of(&self, id: GestureId) -> f64 {
        self.entries
            .iter()
            .filter(|(g, _)| *g == id)
            .map(|(_, w)| w)
            .sum()
    }

    /// Per-gesture weights scaled and summed; gestures whose total is exactly zero are dropped.
    fn blend_all(entries: &[(&ActorKeyframe, f64)]) -> ActorKeyframe {
        let mut table: IndexMap<GestureId, f64> = IndexMap::new();
        for (k, scale) in entries {
            for (id, w) in &k.entries {
                *table.entry(*id).or_insert(0.0) += w * scale;
            }
        }
        ActorKeyframe {
            entries: table.into_iter().filter(|(_, w)| *w != 0.0).collect(),
        }
    }
}
