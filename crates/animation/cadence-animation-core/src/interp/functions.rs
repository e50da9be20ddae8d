//! Interpolation helpers:
//! - hermite_basis (cubic Hermite basis at a segment parameter)
//! - hermite_weights (four-sample keyframe weights for a smoothness-scaled spline)
//! - weighted quaternion average with shortest-arc sign correction

use nalgebra::{Quaternion, UnitQuaternion};

/// Cubic Hermite basis `(h00, h10, h01, h11)` at `u ∈ [0, 1]`.
#[inline]
pub fn hermite_basis(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let u3 = u2 * u;
    [
        2.0 * u3 - 3.0 * u2 + 1.0,
        u3 - 2.0 * u2 + u,
        -2.0 * u3 + 3.0 * u2,
        u3 - u2,
    ]
}

/// Tangent scales for one end of a Hermite segment.
///
/// `smoothness` blends between the chord (0) and the neighbour-difference tangent (1).
/// `span_ratio` is the segment length divided by the neighbour span; a missing
/// neighbour is expressed as `smoothness = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangentScale {
    pub smoothness: f64,
    pub span_ratio: f64,
}

impl TangentScale {
    pub const CHORD: TangentScale = TangentScale {
        smoothness: 0.0,
        span_ratio: 0.0,
    };
}

/// Weights on `(p0, p1, p2, p3)` for the segment `p1 -> p2` at parameter `u`.
///
/// Tangents are `m1 = s·a·(p2 − p0) + (1 − s)(p2 − p1)` and
/// `m2 = s'·b·(p3 − p1) + (1 − s')(p2 − p1)`. The weights always sum to 1, `u = 0`
/// returns `p1`, `u = 1` returns `p2`, and zero smoothness on both ends is the chord.
pub fn hermite_weights(u: f64, start: TangentScale, end: TangentScale) -> [f64; 4] {
    let [h00, h10, h01, h11] = hermite_basis(u);
    let (sa, a) = (start.smoothness, start.span_ratio);
    let (sb, b) = (end.smoothness, end.span_ratio);
    [
        -h10 * sa * a,
        h00 - h10 * (1.0 - sa) - h11 * (sb * b + (1.0 - sb)),
        h01 + h10 * (sa * a + (1.0 - sa)) + h11 * (1.0 - sb),
        h11 * sb * b,
    ]
}

/// Weighted average of unit quaternions. Each operand is sign-aligned with the first
/// so the sum follows the shortest arc. Returns `None` when the sum vanishes.
pub fn weighted_quat(entries: &[(UnitQuaternion<f64>, f64)]) -> Option<UnitQuaternion<f64>> {
    let first = entries.first()?.0;
    let mut acc = Quaternion::new(0.0, 0.0, 0.0, 0.0);
    for (q, w) in entries {
        let sign = if first.coords.dot(&q.coords) < 0.0 {
            -1.0
        } else {
            1.0
        };
        acc += q.quaternion() * (sign * w);
    }
    UnitQuaternion::try_new(acc, 1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn weights_sum_to_one() {
        let start = TangentScale {
            smoothness: 0.7,
            span_ratio: 0.4,
        };
        let end = TangentScale {
            smoothness: 0.3,
            span_ratio: 0.6,
        };
        for i in 0..=10 {
            let w = hermite_weights(i as f64 / 10.0, start, end);
            approx(w.iter().sum::<f64>(), 1.0, 1e-12);
        }
    }

    #[test]
    fn chord_tangents_are_linear() {
        let w = hermite_weights(0.25, TangentScale::CHORD, TangentScale::CHORD);
        approx(w[0], 0.0, 1e-12);
        approx(w[1], 0.75, 1e-12);
        approx(w[2], 0.25, 1e-12);
        approx(w[3], 0.0, 1e-12);
    }

    #[test]
    fn endpoints_hit_samples() {
        let s = TangentScale {
            smoothness: 1.0,
            span_ratio: 0.5,
        };
        assert_eq!(hermite_weights(0.0, s, s), [0.0, 1.0, 0.0, 0.0]);
        let w = hermite_weights(1.0, s, s);
        approx(w[2], 1.0, 1e-12);
        approx(w[0].abs() + w[1].abs() + w[3].abs(), 0.0, 1e-12);
    }

    #[test]
    fn opposite_signs_average_on_shortest_arc() {
        let q = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3);
        let neg = UnitQuaternion::new_unchecked(-q.into_inner());
        let avg = weighted_quat(&[(q, 0.5), (neg, 0.5)]).expect("non-degenerate");
        approx(avg.angle_to(&q), 0.0, 1e-9);
    }
}
