//! Axis gizmo drawn through the overlay camera.

use crate::geometry::{CameraSlot, Mesh};
use crate::math::Vec3;
use crate::surface::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn direction(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }

    pub fn color(self) -> Color {
        match self {
            Axis::X => Color::RED,
            Axis::Y => Color::GREEN,
            Axis::Z => Color::BLUE,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Axis> {
        Self::ALL.get(index).copied()
    }
}

/// Three arrows along +X, +Y and +Z from the origin, one mesh per axis in
/// [`Axis::ALL`] order
#[derive(Debug, Clone)]
pub struct Gizmo {
    meshes: Vec<Mesh>,
}

impl Gizmo {
    pub fn new(length: f32, thickness: f32) -> Self {
        let t = thickness / 2.0;
        let meshes = Axis::ALL
            .iter()
            .map(|&axis| {
                let tip = axis.direction() * length;
                let min = Vec3::new(-t, -t, -t);
                let max = Vec3::new(tip.x.max(t), tip.y.max(t), tip.z.max(t));
                Mesh::box_mesh(format!("gizmo-{axis:?}"), min, max)
                    .with_color(axis.color())
                    .with_slot(CameraSlot::Overlay)
            })
            .collect();
        Self { meshes }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }
}

impl Default for Gizmo {
    fn default() -> Self {
        Self::new(1.0, 0.15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_index_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn test_gizmo_arrows_follow_axes() {
        let gizmo = Gizmo::default();
        assert_eq!(gizmo.meshes().len(), 3);
        for (mesh, axis) in gizmo.meshes().iter().zip(Axis::ALL) {
            assert_eq!(mesh.slot, CameraSlot::Overlay);
            assert_eq!(mesh.color, axis.color());
            let reach = mesh
                .triangles()
                .iter()
                .flat_map(|t| t.vertices.iter())
                .map(|v| v.dot(&axis.direction()))
                .fold(f32::MIN, f32::max);
            assert!((reach - 1.0).abs() < 1e-6);
        }
    }
}
