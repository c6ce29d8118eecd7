//! Per-object transform state and its composed model matrix

use crate::math::{rotation_x, rotation_y, rotation_z, scaling, translation, Mat4, Vec3};

/// Position, rotation (degrees), scale and pivot of one mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub position: Vec3,
    /// Euler angles in degrees, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Point (in model space) the rotation is applied about
    pub pivot: Vec3,
}

impl TransformState {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            pivot: Vec3::zeros(),
        }
    }

    pub fn with_pivot(mut self, pivot: Vec3) -> Self {
        self.pivot = pivot;
        self
    }

    /// Move by a world-space offset
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vec3::new(dx, dy, dz);
    }

    /// Multiply every scale factor by `factor`
    pub fn scale_by(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Rotation part only: `RotZ · RotY · RotX`
    pub fn rotation_matrix(&self) -> Mat4 {
        rotation_z(self.rotation.z) * rotation_y(self.rotation.y) * rotation_x(self.rotation.x)
    }

    /// Compose the model matrix.
    ///
    /// `Translate(position) · Translate(pivot) · RotZ · RotY · RotX · Translate(-pivot) · Scale`,
    /// applied right to left: a vertex is scaled, rotated about the pivot in
    /// X, Y, Z order, then moved to its world position. Cheap enough to
    /// rebuild every frame, so nothing is cached.
    pub fn model_matrix(&self) -> Mat4 {
        translation(&self.position)
            * translation(&self.pivot)
            * self.rotation_matrix()
            * translation(&-self.pivot)
            * scaling(&self.scale)
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}
