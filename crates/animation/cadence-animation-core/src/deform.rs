//! Whole-surface deformations queued by the scale, bend and twist tracks.
//!
//! Each deformation works on the extent of the surface along one local axis, so it only
//! needs the vertex list. Angles are degrees.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::CoordinateSystem;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Deformation {
    /// Per-axis factors about the frame origin.
    Scale { factors: Vector3<f64> },
    /// Curve the surface along `axis` so it arcs toward `direction`. `angle` is the total
    /// turn from one end of the surface to the other.
    Bend {
        axis: Axis,
        direction: Axis,
        angle: f64,
        forward: bool,
    },
    /// Rotate about `axis` by `angle` degrees per unit of distance along it, measured from
    /// the low end (or the high end when not `forward`).
    Twist {
        axis: Axis,
        angle: f64,
        forward: bool,
    },
}

impl Deformation {
    /// Deform `vertices` in place. With a `frame`, vertices are taken into that frame's
    /// parent space first and brought back afterwards.
    pub fn apply(&self, vertices: &mut [Vector3<f64>], frame: Option<&CoordinateSystem>) {
        if let Some(c) = frame {
            for v in vertices.iter_mut() {
                *v = c.transform_point(v);
            }
        }
        match *self {
            Deformation::Scale { factors } => {
                for v in vertices.iter_mut() {
                    *v = v.component_mul(&factors);
                }
            }
            Deformation::Bend {
                axis,
                direction,
                angle,
                forward,
            } => bend(vertices, axis, direction, angle, forward),
            Deformation::Twist {
                axis,
                angle,
                forward,
            } => twist(vertices, axis, angle, forward),
        }
        if let Some(c) = frame {
            for v in vertices.iter_mut() {
                *v = c.to_local_point(v);
            }
        }
    }
}

/// Smallest and largest coordinate along `axis`, or `None` for a flat or empty surface.
fn extent(vertices: &[Vector3<f64>], axis: usize) -> Option<(f64, f64)> {
    let (min, max) = vertices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v[axis]), hi.max(v[axis]))
        });
    (min < max).then_some((min, max))
}

fn bend(vertices: &mut [Vector3<f64>], axis: Axis, direction: Axis, angle: f64, forward: bool) {
    let (a, d) = (axis.index(), direction.index());
    if a == d {
        log::warn!("bend direction {:?} is the bend axis; nothing to do", direction);
        return;
    }
    if angle == 0.0 {
        return;
    }
    let Some((min, max)) = extent(vertices, a) else {
        return;
    };
    let (base, sign) = if forward { (min, 1.0) } else { (max, -1.0) };
    let theta = angle.to_radians();
    let length = max - min;
    let radius = length / theta;
    for v in vertices.iter_mut() {
        let phi = theta * sign * (v[a] - base) / length;
        let r = radius - v[d];
        v[a] = base + sign * r * phi.sin();
        v[d] = radius - r * phi.cos();
    }
}

fn twist(vertices: &mut [Vector3<f64>], axis: Axis, angle: f64, forward: bool) {
    let Some((min, max)) = extent(vertices, axis.index()) else {
        return;
    };
    let base = if forward { min } else { max };
    let rate = angle.to_radians();
    // The two coordinates turned by a twist about each axis.
    let (p, q) = match axis {
        Axis::X => (1, 2),
        Axis::Y => (0, 2),
        Axis::Z => (0, 1),
    };
    for v in vertices.iter_mut() {
        let (s, c) = (rate * (v[axis.index()] - base)).sin_cos();
        let (vp, vq) = (v[p], v[q]);
        v[p] = vp * c - vq * s;
        v[q] = vp * s + vq * c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn rod() -> Vec<Vector3<f64>> {
        (0..=4).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn scale_in_a_world_frame_scales_about_the_world_origin() {
        let mut verts = vec![Vector3::new(1.0, 0.0, 0.0)];
        let frame = CoordinateSystem::at(Vector3::new(1.0, 0.0, 0.0));
        let scale = Deformation::Scale {
            factors: Vector3::new(2.0, 1.0, 1.0),
        };
        scale.apply(&mut verts, Some(&frame));
        // World x 2 becomes 4, which is local 3.
        assert_relative_eq!(verts[0], Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-12);

        let mut local = vec![Vector3::new(1.0, 0.0, 0.0)];
        scale.apply(&mut local, None);
        assert_relative_eq!(local[0], Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn half_turn_bend_makes_a_semicircle() {
        let mut verts = rod();
        let bend = Deformation::Bend {
            axis: Axis::X,
            direction: Axis::Y,
            angle: 180.0,
            forward: true,
        };
        bend.apply(&mut verts, None);
        let radius = 4.0 / PI;
        assert_relative_eq!(verts[0], Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(verts[2], Vector3::new(radius, radius, 0.0), epsilon = 1e-12);
        assert_relative_eq!(verts[4], Vector3::new(0.0, 2.0 * radius, 0.0), epsilon = 1e-12);
        // Arc length along the neutral line is preserved.
        let centre = Vector3::new(0.0, radius, 0.0);
        for v in &verts {
            assert_relative_eq!((v - centre).norm(), radius, epsilon = 1e-12);
        }
    }

    #[test]
    fn reversed_bend_pins_the_far_end() {
        let mut verts = rod();
        Deformation::Bend {
            axis: Axis::X,
            direction: Axis::Z,
            angle: 90.0,
            forward: false,
        }
        .apply(&mut verts, None);
        assert_relative_eq!(verts[4], Vector3::new(4.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(verts[0].z > 0.0);
    }

    #[test]
    fn degenerate_bends_do_nothing() {
        let mut verts = rod();
        for bend in [
            Deformation::Bend {
                axis: Axis::X,
                direction: Axis::X,
                angle: 90.0,
                forward: true,
            },
            Deformation::Bend {
                axis: Axis::Y,
                direction: Axis::X,
                angle: 90.0,
                forward: true,
            },
        ] {
            bend.apply(&mut verts, None);
            assert_eq!(verts, rod());
        }
    }

    #[test]
    fn twist_turns_in_proportion_to_distance() {
        let mut verts = vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 2.0),
        ];
        Deformation::Twist {
            axis: Axis::Z,
            angle: 90.0,
            forward: true,
        }
        .apply(&mut verts, None);
        assert_relative_eq!(verts[0], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(verts[1], Vector3::new(0.0, 1.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(verts[2], Vector3::new(-1.0, 0.0, 2.0), epsilon = 1e-12);
    }
}
