//! Timecourses: ordered keyframe samples and their interpolation.
//!
//! Model:
//! - Samples are `(time, value, smoothness)` with strictly increasing times.
//! - Queries outside `[first, last]` clamp to the endpoint sample.
//! - Curved modes evaluate one Hermite segment as a four-keyframe blend of the
//!   neighbouring samples, so every keyframe type interpolates through the same
//!   `Keyframe::blend4` algebra.

use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};
use crate::interp::functions::{hermite_weights, TangentScale};
use crate::interp::InterpMode;
use crate::keyframe::Keyframe;
use crate::smoothness::Smoothness;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timepoint {
    pub time: f64,
    pub value: Keyframe,
    #[serde(default)]
    pub smoothness: Smoothness,
}

impl Timepoint {
    pub fn new(time: f64, value: Keyframe) -> Self {
        Self {
            time,
            value,
            smoothness: Smoothness::default(),
        }
    }
}

/// Segment `[i, i+1]` located for a query time, with its Hermite neighbourhood.
struct Segment {
    idx: [usize; 4],
    u: f64,
    start: TangentScale,
    end: TangentScale,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timecourse {
    points: Vec<Timepoint>,
}

impl Timecourse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from samples in any order. Later samples replace earlier ones at equal times.
    pub fn from_points(points: impl IntoIterator<Item = Timepoint>) -> Result<Self> {
        let mut tc = Self::new();
        for p in points {
            tc.add_timepoint_with(p.time, p.value, p.smoothness)?;
        }
        Ok(tc)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Timepoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&Timepoint> {
        self.points.get(index)
    }

    pub fn time(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.time)
    }

    pub fn value(&self, index: usize) -> Option<&Keyframe> {
        self.points.get(index).map(|p| &p.value)
    }

    /// Mutable access to every sample value, in time order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Keyframe> {
        self.points.iter_mut().map(|p| &mut p.value)
    }

    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.time, self.points.last()?.time))
    }

    /// Copy for a new owner.
    pub fn duplicate(&self) -> Timecourse {
        self.clone()
    }

    /// Insert a sample with default smoothness and return its index.
    pub fn add_timepoint(&mut self, time: f64, value: Keyframe) -> Result<usize> {
        self.add_timepoint_with(time, value, Smoothness::default())
    }

    /// Insert a sample and return its index. A sample already at `time` is replaced.
    pub fn add_timepoint_with(
        &mut self,
        time: f64,
        value: Keyframe,
        smoothness: Smoothness,
    ) -> Result<usize> {
        check_time(time)?;
        Ok(self.insert_point(Timepoint {
            time,
            value,
            smoothness,
        }))
    }

    pub fn set_timepoint(&mut self, index: usize, value: Keyframe) -> Result<()> {
        self.point_mut(index)?.value = value;
        Ok(())
    }

    pub fn set_smoothness(&mut self, index: usize, smoothness: Smoothness) -> Result<()> {
        self.point_mut(index)?.smoothness = smoothness;
        Ok(())
    }

    /// Move sample `index` to `time`, keeping times sorted. Returns the new index.
    /// Moving onto another sample's time replaces that sample.
    pub fn move_timepoint(&mut self, index: usize, time: f64) -> Result<usize> {
        check_time(time)?;
        self.check_index(index)?;
        let mut point = self.points.remove(index);
        point.time = time;
        Ok(self.insert_point(point))
    }

    pub fn remove_timepoint(&mut self, index: usize) -> Result<Timepoint> {
        self.check_index(index)?;
        Ok(self.points.remove(index))
    }

    pub fn remove_all_timepoints(&mut self) {
        self.points.clear();
    }

    /// Index of the sample at exactly `time`, if any.
    pub fn index_at(&self, time: f64) -> Option<usize> {
        let idx = self.points.partition_point(|p| p.time < time);
        (self.points.get(idx)?.time == time).then_some(idx)
    }

    /// Interpolated value at `t`. `None` only when there are no samples.
    pub fn evaluate(&self, t: f64, mode: InterpMode) -> Option<Keyframe> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if self.points.len() == 1 || t <= first.time {
            return Some(first.value.clone());
        }
        if t >= last.time {
            return Some(last.value.clone());
        }

        // first.time < t < last.time, so 1 <= i + 1 < len.
        let i = self.points.partition_point(|p| p.time <= t) - 1;
        let left = &self.points[i];
        let right = &self.points[i + 1];

        let value = match mode {
            InterpMode::Discontinuous => left.value.clone(),
            InterpMode::Linear => {
                if left.time == t {
                    return Some(left.value.clone());
                }
                let u = (t - left.time) / (right.time - left.time);
                left.value.blend(&right.value, 1.0 - u, u)
            }
            InterpMode::Interpolating => {
                if left.time == t {
                    return Some(left.value.clone());
                }
                let seg = self.segment(i, t);
                let [a, b, c, d] = seg.idx.map(|j| &self.points[j].value);
                blend_segment(&seg, [a, b, c, d])
            }
            InterpMode::Approximating => {
                let seg = self.segment(i, t);
                let controls = seg.idx.map(|j| self.control_value(j));
                let [a, b, c, d] = &controls;
                blend_segment(&seg, [a, b, c, d])
            }
        };
        Some(value)
    }

    /// Denser copy of this timecourse that evaluates to (almost) the same curve.
    ///
    /// Curved modes only: every original sample is re-evaluated at its own time with a
    /// smoother tangent, and a midpoint sample is inserted in each segment.
    pub fn subdivide(&self, mode: InterpMode) -> Timecourse {
        if !mode.is_curved() || self.points.len() < 2 {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.points.len() * 2 - 1);
        for (i, p) in self.points.iter().enumerate() {
            out.push(Timepoint {
                time: p.time,
                value: self.evaluate(p.time, mode).unwrap_or_else(|| p.value.clone()),
                smoothness: p.smoothness.smoother(),
            });
            if let Some(next) = self.points.get(i + 1) {
                let mid = 0.5 * (p.time + next.time);
                if let Some(value) = self.evaluate(mid, mode) {
                    out.push(Timepoint::new(mid, value));
                }
            }
        }
        Timecourse { points: out }
    }

    fn insert_point(&mut self, point: Timepoint) -> usize {
        let idx = self.points.partition_point(|p| p.time < point.time);
        match self.points.get_mut(idx) {
            Some(existing) if existing.time == point.time => *existing = point,
            _ => self.points.insert(idx, point),
        }
        idx
    }

    fn point_mut(&mut self, index: usize) -> Result<&mut Timepoint> {
        let len = self.points.len();
        self.points
            .get_mut(index)
            .ok_or(AnimationError::InvalidTimepoint { index, len })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(AnimationError::InvalidTimepoint {
                index,
                len: self.points.len(),
            })
        }
    }

    fn segment(&self, i: usize, t: f64) -> Segment {
        let p = &self.points;
        let (t1, t2) = (p[i].time, p[i + 1].time);
        let h = t2 - t1;
        let u = ((t - t1) / h).clamp(0.0, 1.0);

        let (i0, start) = if i > 0 {
            (
                i - 1,
                TangentScale {
                    smoothness: p[i].smoothness.right(),
                    span_ratio: h / (t2 - p[i - 1].time),
                },
            )
        } else {
            (i, TangentScale::CHORD)
        };
        let (i3, end) = if i + 2 < p.len() {
            (
                i + 2,
                TangentScale {
                    smoothness: p[i + 1].smoothness.left(),
                    span_ratio: h / (p[i + 2].time - t1),
                },
            )
        } else {
            (i + 1, TangentScale::CHORD)
        };

        Segment {
            idx: [i0, i, i + 1, i3],
            u,
            start,
            end,
        }
    }

    /// Approximating control value: interior samples are pulled toward their neighbours.
    fn control_value(&self, j: usize) -> Keyframe {
        let p = &self.points;
        if j == 0 || j + 1 >= p.len() {
            return p[j].value.clone();
        }
        let s = p[j].smoothness.average();
        p[j - 1]
            .value
            .blend3(&p[j].value, &p[j + 1].value, s / 6.0, 1.0 - s / 3.0, s / 6.0)
    }
}

fn blend_segment(seg: &Segment, values: [&Keyframe; 4]) -> Keyframe {
    let [w0, w1, w2, w3] = hermite_weights(seg.u, seg.start, seg.end);
    values[0].blend4(values[1], values[2], values[3], w0, w1, w2, w3)
}

fn check_time(time: f64) -> Result<()> {
    if time.is_finite() {
        Ok(())
    } else {
        Err(AnimationError::InvalidTime { time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn scalar(tc: &Timecourse, t: f64, mode: InterpMode) -> f64 {
        tc.evaluate(t, mode)
            .and_then(|k| k.as_scalar())
            .expect("scalar value")
    }

    fn mk_scalar_tc(samples: &[(f64, f64)]) -> Timecourse {
        Timecourse::from_points(
            samples
                .iter()
                .map(|&(t, v)| Timepoint::new(t, Keyframe::Scalar(v))),
        )
        .expect("valid samples")
    }

    #[test]
    fn empty_timecourse_has_no_value() {
        assert!(Timecourse::new().evaluate(0.0, InterpMode::Linear).is_none());
    }

    #[test]
    fn adding_at_existing_time_replaces() {
        let mut tc = mk_scalar_tc(&[(0.0, 1.0), (1.0, 2.0)]);
        let idx = tc.add_timepoint(1.0, Keyframe::Scalar(5.0)).expect("add");
        assert_eq!(idx, 1);
        assert_eq!(tc.len(), 2);
        assert_eq!(tc.value(1), Some(&Keyframe::Scalar(5.0)));
    }

    #[test]
    fn discontinuous_holds_left_sample() {
        let tc = mk_scalar_tc(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        assert_eq!(scalar(&tc, 0.99, InterpMode::Discontinuous), 1.0);
        assert_eq!(scalar(&tc, 1.0, InterpMode::Discontinuous), 2.0);
        assert_eq!(scalar(&tc, -5.0, InterpMode::Discontinuous), 1.0);
    }

    #[test]
    fn zero_smoothness_interpolates_along_chord() {
        let mut tc = mk_scalar_tc(&[(0.0, 0.0), (1.0, 1.0), (2.0, 5.0), (3.0, 0.0)]);
        for i in 0..tc.len() {
            tc.set_smoothness(i, Smoothness::new(0.0)).expect("index");
        }
        approx(scalar(&tc, 1.5, InterpMode::Interpolating), 3.0, 1e-12);
    }

    #[test]
    fn approximating_keeps_endpoints_and_smooths_interior() {
        let tc = mk_scalar_tc(&[(0.0, 0.0), (1.0, 6.0), (2.0, 0.0)]);
        approx(scalar(&tc, 0.0, InterpMode::Approximating), 0.0, 1e-12);
        approx(scalar(&tc, 2.0, InterpMode::Approximating), 0.0, 1e-12);
        // s = 1: (1/6)·0 + (2/3)·6 + (1/6)·0
        approx(scalar(&tc, 1.0, InterpMode::Approximating), 4.0, 1e-12);
    }

    #[test]
    fn subdivide_linear_is_a_copy() {
        let tc = mk_scalar_tc(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(tc.subdivide(InterpMode::Linear), tc);
    }

    #[test]
    fn subdivide_inserts_midpoints() {
        let tc = mk_scalar_tc(&[(0.0, 0.0), (1.0, 2.0), (2.0, 0.0)]);
        let sub = tc.subdivide(InterpMode::Interpolating);
        assert_eq!(sub.len(), 5);
        assert_eq!(sub.time(1), Some(0.5));
        assert_eq!(sub.value(2), Some(&Keyframe::Scalar(2.0)));
        assert_eq!(sub.point(1).map(|p| p.smoothness), Some(Smoothness::default()));
    }

    #[test]
    fn invalid_indices_and_times_are_rejected() {
        let mut tc = mk_scalar_tc(&[(0.0, 0.0)]);
        assert_eq!(
            tc.remove_timepoint(3),
            Err(AnimationError::InvalidTimepoint { index: 3, len: 1 })
        );
        assert!(tc.add_timepoint(f64::NAN, Keyframe::Null).is_err());
    }
}
