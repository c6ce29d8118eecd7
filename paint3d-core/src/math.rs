//! Vector and matrix algebra shared by every stage of the pipeline.
//!
//! Matrices are indexed `(row, column)` and act on column vectors, so
//! `a * b` applies `b` first. Composition order is therefore load-bearing:
//! the model matrix in [`crate::transform`] depends on it.

use nalgebra::{Matrix4, Point2 as NPoint2, Vector3, Vector4};

pub type Vec3 = Vector3<f32>;
pub type Mat4 = Matrix4<f32>;
pub type Point2 = NPoint2<f32>;

/// Magnitudes below this are treated as zero
pub const EPSILON: f32 = 1e-6;

/// Normalize `v`, or `None` when its length is below [`EPSILON`].
///
/// Callers must check the result before using it as a face normal for
/// culling or lighting.
pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
    v.try_normalize(EPSILON)
}

pub fn translation(offset: &Vec3) -> Mat4 {
    Matrix4::new_translation(offset)
}

/// Rotation about the X axis, angle in degrees
pub fn rotation_x(degrees: f32) -> Mat4 {
    Matrix4::new_rotation(Vector3::new(degrees.to_radians(), 0.0, 0.0))
}

/// Rotation about the Y axis, angle in degrees
pub fn rotation_y(degrees: f32) -> Mat4 {
    Matrix4::new_rotation(Vector3::new(0.0, degrees.to_radians(), 0.0))
}

/// Rotation about the Z axis, angle in degrees
pub fn rotation_z(degrees: f32) -> Mat4 {
    Matrix4::new_rotation(Vector3::new(0.0, 0.0, degrees.to_radians()))
}

pub fn scaling(factors: &Vec3) -> Mat4 {
    Matrix4::new_nonuniform_scaling(factors)
}

/// Apply an affine matrix to a point (implicit w = 1, no divide).
pub fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    (m * Vector4::new(p.x, p.y, p.z, 1.0)).xyz()
}

/// Apply a projective matrix to a point and divide by the resulting w.
///
/// Returns `None` when w vanishes.
pub fn transform_homogeneous(m: &Mat4, p: &Vec3) -> Option<Vec3> {
    let h = m * Vector4::new(p.x, p.y, p.z, 1.0);
    if h.w.abs() < EPSILON {
        return None;
    }
    Some(h.xyz() / h.w)
}

/// Z component of `(a - o) x (b - o)`.
///
/// Positive when `o -> a -> b` turns left (counter-clockwise in a y-up frame).
/// Evaluated in f64: the differences and products of f32 coordinates are
/// exact there, so the sign is reliable even for nearly collinear points.
pub fn cross2(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    let (ox, oy) = (o.x as f64, o.y as f64);
    (a.x as f64 - ox) * (b.y as f64 - oy) - (a.y as f64 - oy) * (b.x as f64 - ox)
}
