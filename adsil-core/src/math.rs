//! Point/vector primitives and the geometric helpers the FOV filter and
//! shape sampler build on.

use std::ops::{Add, Mul, Sub};

/// Numerical tolerance used throughout the core for "close enough to zero"
/// comparisons (parallel rays, collinear receivers, boundary acceptance).
pub const EPSILON: f32 = 1e-6;

/// A point in 3-D space. Distinct from [`Vector`] even though the
/// representation matches — a point has no direction, only a location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        (*self - *other).magnitude()
    }

    /// Vector from `other` to `self`.
    pub fn vector_from(&self, other: &Point) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A displacement/direction in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(&self) -> Vector {
        let m = self.magnitude();
        if m < EPSILON {
            return Vector::default();
        }
        *self * (1.0 / m)
    }

    pub fn dot(&self, other: &Vector) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector) -> Vector {
        Vector::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Rotate this vector around `axis` by `angle_rad` radians (Rodrigues'
    /// rotation formula). `axis` need not be normalized.
    pub fn rotate_around_axis(&self, axis: &Vector, angle_rad: f32) -> Vector {
        let k = axis.normalized();
        let cos_a = angle_rad.cos();
        let sin_a = angle_rad.sin();
        (*self * cos_a) + (k.cross(self) * sin_a) + (k * (k.dot(self) * (1.0 - cos_a)))
    }

    /// Rotate this vector as a point by Euler roll/pitch/yaw (radians),
    /// applying `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn rotate_by_euler(&self, rpy: &Vector) -> Vector {
        rotate_point_by_euler(*self, *rpy)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// `Rz(yaw) * Ry(pitch) * Rx(roll) * v`, matching the original's
/// `RotationUtils::eulerToRotationMatrix` rotation order (z, then y, then x).
pub fn rotate_point_by_euler(v: Vector, rpy: Vector) -> Vector {
    let (roll, pitch, yaw) = (rpy.x, rpy.y, rpy.z);

    // Rotate around X (roll)
    let (cr, sr) = (roll.cos(), roll.sin());
    let v = Vector::new(v.x, v.y * cr - v.z * sr, v.y * sr + v.z * cr);

    // Rotate around Y (pitch)
    let (cp, sp) = (pitch.cos(), pitch.sin());
    let v = Vector::new(v.x * cp + v.z * sp, v.y, -v.x * sp + v.z * cp);

    // Rotate around Z (yaw)
    let (cy, sy) = (yaw.cos(), yaw.sin());
    Vector::new(v.x * cy - v.y * sy, v.x * sy + v.y * cy, v.z)
}

/// Euler `(0, pitch, yaw)` that would make local `+Z` point along `dir`.
/// Roll cannot be recovered from a direction alone and is fixed at 0.
pub fn euler_from_direction(dir: Vector) -> Vector {
    let d = dir.normalized();
    let yaw = d.x.atan2(d.z);
    let pitch = (-d.y).atan2((d.x * d.x + d.z * d.z).sqrt());
    Vector::new(0.0, pitch, yaw)
}

/// Forward direction implied by orientation `(roll, pitch, yaw)`: the
/// inverse of [`euler_from_direction`]'s `(yaw, pitch)` convention. Roll has
/// no effect on a forward direction (it spins around the axis itself).
pub fn direction_from_euler(rpy: Vector) -> Vector {
    let (pitch, yaw) = (rpy.y, rpy.z);
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    Vector::new(sy * cp, -sp, cy * cp)
}

pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}

pub fn rad_to_deg(rad: f32) -> f32 {
    rad * 180.0 / std::f32::consts::PI
}

/// Intersect the line `origin + t * direction` with the plane through
/// `plane_point` with normal `plane_normal`. Returns `None` if the line is
/// parallel to the plane (`|dot(n, d)| < EPSILON`). No near-clip: negative
/// `t` is a valid hit.
pub fn line_hits_plane(
    plane_point: Point,
    plane_normal: Vector,
    line_origin: Point,
    line_direction: Vector,
) -> Option<Point> {
    let denom = plane_normal.dot(&line_direction);
    if denom.abs() < EPSILON {
        return None;
    }
    let t = plane_normal.dot(&(plane_point - line_origin)) / denom;
    Some(line_origin + line_direction * t)
}

/// Whether `p` lies inside the planar convex quadrilateral `a -> b -> c -> d`
/// (vertices in winding order). Boundary points (dot within `EPSILON` of
/// zero) count as inside.
pub fn point_in_convex_quad(p: Point, a: Point, b: Point, c: Point, d: Point) -> bool {
    let normal = (b - a).cross(&(c - a));
    let edges = [(a, b), (b, c), (c, d), (d, a)];
    edges.iter().all(|&(x, y)| {
        let edge_normal = (y - x).cross(&(p - x));
        edge_normal.dot(&normal) >= -EPSILON
    })
}
