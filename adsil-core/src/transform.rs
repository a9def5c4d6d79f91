//! A local rigid transform: a position plus an Euler (roll, pitch, yaw)
//! orientation. Composition uses the full rotation-matrix product so that
//! chains of non-trivial orientations compose correctly, not just position
//! offsets.

use crate::math::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Point,
    /// Euler angles (roll X, pitch Y, yaw Z), radians.
    pub orientation: Vector,
}

impl Transform {
    pub fn new(position: Point, orientation: Vector) -> Self {
        Self { position, orientation }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// World-space forward direction implied by this transform's
    /// orientation (rotation of local `+Z`).
    pub fn forward(&self) -> Vector {
        crate::math::direction_from_euler(self.orientation)
    }

    /// Rotate `v` by this transform's orientation (no translation).
    pub fn rotate_vector(&self, v: Vector) -> Vector {
        mat_vec_mul(&mat_from_euler(self.orientation), v)
    }

    /// `self ∘ other`: applying `other` (expressed in `self`'s local frame)
    /// then `self`. Matches §3: `parent.position + rotate(parent.orientation,
    /// child.position)` for the position, and a matrix product for the
    /// orientation.
    pub fn compose(&self, other: &Transform) -> Transform {
        let self_mat = mat_from_euler(self.orientation);
        let new_position = self.position + mat_vec_mul(&self_mat, other.position.to_vector());
        let other_mat = mat_from_euler(other.orientation);
        let composed_mat = mat_mul(&self_mat, &other_mat);
        Transform {
            position: new_position.to_point(),
            orientation: euler_from_mat(&composed_mat),
        }
    }
}

trait PointVectorConv {
    fn to_vector(&self) -> Vector;
}
impl PointVectorConv for Point {
    fn to_vector(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }
}
trait VectorPointConv {
    fn to_point(&self) -> Point;
}
impl VectorPointConv for Vector {
    fn to_point(&self) -> Point {
        Point::new(self.x, self.y, self.z)
    }
}

type Mat3 = [[f32; 3]; 3];

/// `Rz(yaw) * Ry(pitch) * Rx(roll)`, row-major.
fn mat_from_euler(rpy: Vector) -> Mat3 {
    let (sr, cr) = rpy.x.sin_cos();
    let (sp, cp) = rpy.y.sin_cos();
    let (sy, cy) = rpy.z.sin_cos();
    [
        [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
        [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
        [-sp, cp * sr, cp * cr],
    ]
}

fn mat_vec_mul(m: &Mat3, v: Vector) -> Vector {
    Vector::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Recover `(roll, pitch, yaw)` from a `Rz(yaw) * Ry(pitch) * Rx(roll)`
/// matrix (standard ZYX Euler extraction).
fn euler_from_mat(m: &Mat3) -> Vector {
    let pitch = (-m[2][0]).clamp(-1.0, 1.0).asin();
    let roll = m[2][1].atan2(m[2][2]);
    let yaw = m[1][0].atan2(m[0][0]);
    Vector::new(roll, pitch, yaw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_compose_is_identity() {
        let a = Transform::identity();
        let b = Transform::new(Point::new(1.0, 2.0, 3.0), Vector::new(0.0, 0.0, 0.0));
        let c = a.compose(&b);
        assert_eq!(c.position, b.position);
    }

    #[test]
    fn compose_translates_through_parent_rotation() {
        // Parent yawed 90 degrees, child offset along local +x.
        let parent = Transform::new(
            Point::new(10.0, 0.0, 0.0),
            Vector::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
        );
        let child = Transform::new(Point::new(1.0, 0.0, 0.0), Vector::default());
        let global = parent.compose(&child);
        // Rz(90deg) * (1,0,0) = (0,1,0)
        assert!((global.position.x - 10.0).abs() < 1e-4);
        assert!((global.position.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn forward_matches_local_z_rotation() {
        let t = Transform::new(Point::ORIGIN, Vector::new(0.0, 0.0, std::f32::consts::FRAC_PI_2));
        let f = t.forward();
        assert!((f.x - 1.0).abs() < 1e-4);
        assert!(f.z.abs() < 1e-4);
    }
}
