//! Coordinate systems and rotation helpers.

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position and orientation of an object in world space.
///
/// Local +Z is the "z direction" and local +Y the "up direction"; Euler angles are
/// XYZ in degrees (roll about X, then pitch about Y, then yaw about Z).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    pub origin: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

impl CoordinateSystem {
    pub fn new(origin: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            origin,
            orientation,
        }
    }

    pub fn at(origin: Vector3<f64>) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    /// Build from explicit z and up directions. Degenerate axes give the identity orientation.
    pub fn from_axes(origin: Vector3<f64>, z_dir: Vector3<f64>, up_dir: Vector3<f64>) -> Self {
        let mut cs = Self::at(origin);
        cs.set_orientation_axes(z_dir, up_dir);
        cs
    }

    pub fn x_dir(&self) -> Vector3<f64> {
        self.orientation * Vector3::x()
    }

    pub fn up_dir(&self) -> Vector3<f64> {
        self.orientation * Vector3::y()
    }

    pub fn z_dir(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    /// Orient so local Z follows `z_dir` and local Y lies in the plane of `z_dir` and
    /// `up_dir`. Leaves the orientation unchanged when the axes are degenerate.
    pub fn set_orientation_axes(&mut self, z_dir: Vector3<f64>, up_dir: Vector3<f64>) {
        let Some(z) = z_dir.try_normalize(1e-12) else {
            return;
        };
        let Some(x) = up_dir.cross(&z).try_normalize(1e-12) else {
            return;
        };
        let y = z.cross(&x);
        let rot = Rotation3::from_basis_unchecked(&[x, y, z]);
        self.orientation = UnitQuaternion::from_rotation_matrix(&rot);
    }

    /// XYZ Euler angles in degrees.
    pub fn rotation_angles(&self) -> [f64; 3] {
        let (x, y, z) = self.orientation.euler_angles();
        [x.to_degrees(), y.to_degrees(), z.to_degrees()]
    }

    pub fn set_rotation_angles(&mut self, angles: [f64; 3]) {
        self.orientation = euler_degrees(angles);
    }

    pub fn from_local(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.origin), self.orientation)
    }

    pub fn to_local(&self) -> Isometry3<f64> {
        self.from_local().inverse()
    }

    /// Map a point from this system's local space into world space.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * p + self.origin
    }

    /// Map a direction from local space into world space (no translation).
    pub fn transform_direction(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * v
    }

    pub fn to_local_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * (p - self.origin)
    }
}

/// Quaternion for XYZ Euler angles in degrees.
pub fn euler_degrees(angles: [f64; 3]) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(
        angles[0].to_radians(),
        angles[1].to_radians(),
        angles[2].to_radians(),
    )
}

/// The fraction `w` of a rotation, measured along its shortest arc from the identity.
/// Never panics for half turns, unlike slerp against the identity.
pub fn partial_rotation(q: &UnitQuaternion<f64>, w: f64) -> UnitQuaternion<f64> {
    if w == 1.0 {
        return *q;
    }
    UnitQuaternion::from_scaled_axis(q.scaled_axis() * w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn axes_round_trip() {
        let cs = CoordinateSystem::from_axes(Vector3::zeros(), Vector3::x(), Vector3::y());
        assert_relative_eq!(cs.z_dir(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(cs.up_dir(), Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_axes_keep_orientation() {
        let mut cs = CoordinateSystem::default();
        cs.set_orientation_axes(Vector3::y(), Vector3::y());
        assert_eq!(cs.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn point_and_direction_transforms_differ_by_origin() {
        let mut cs = CoordinateSystem::at(Vector3::new(1.0, 2.0, 3.0));
        cs.set_rotation_angles([0.0, 0.0, 90.0]);
        let p = cs.transform_point(&Vector3::x());
        let d = cs.transform_direction(&Vector3::x());
        assert_relative_eq!(p, Vector3::new(1.0, 3.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(d, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(cs.to_local_point(&p), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn partial_rotation_scales_angle() {
        let q = euler_degrees([0.0, 0.0, 90.0]);
        let half = partial_rotation(&q, 0.5);
        assert_relative_eq!(half.angle(), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    }
}
