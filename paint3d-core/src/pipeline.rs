//! Per-frame mesh pipeline: model → view → cull → project → shade → sort.
//!
//! Output is a list of [`ShadedTriangle`]s ordered farthest first, so a
//! surface that paints them in order gets correct occlusion without a
//! depth buffer (painter's algorithm). Results are transient and must be
//! rebuilt every frame.

use crate::geometry::Mesh;
use crate::math::{transform_point, try_normalize, Point2, Vec3};
use crate::projection::{Camera, ProjectedVertex};
use crate::surface::Color;

/// Fixed light, in camera space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Unit vector from the surface toward the light
    pub direction: Vec3,
    /// Floor intensity for faces turned away from the light
    pub ambient: f32,
}

impl Lighting {
    pub fn new(direction: Vec3, ambient: f32) -> Self {
        Self {
            direction: try_normalize(&direction).unwrap_or_else(|| -Vec3::z()),
            ambient: ambient.clamp(0.0, 1.0),
        }
    }

    /// Flat intensity for a unit face normal, always in [0, 1]
    pub fn intensity(&self, normal: &Vec3) -> f32 {
        let diffuse = normal.dot(&self.direction).clamp(0.0, 1.0);
        (self.ambient + (1.0 - self.ambient) * diffuse).clamp(0.0, 1.0)
    }
}

impl Default for Lighting {
    /// Headlight raised slightly up and to the left of the viewer (camera
    /// y grows down the screen)
    fn default() -> Self {
        Self::new(Vec3::new(-0.3, -0.4, -1.0), 0.1)
    }
}

/// Identifies the mesh triangle a shaded triangle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    pub mesh: usize,
    pub triangle: usize,
}

/// One visible, projected, shaded triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedTriangle {
    pub vertices: [ProjectedVertex; 3],
    /// Mean camera-space depth of the three vertices
    pub depth: f32,
    pub intensity: f32,
    pub color: Color,
    pub source: FaceRef,
}

impl ShadedTriangle {
    pub fn screen_points(&self) -> [Point2; 3] {
        self.vertices.map(|v| Point2::new(v.x, v.y))
    }

    /// Base color scaled by the shading intensity
    pub fn shaded_color(&self) -> Color {
        self.color.shade(self.intensity)
    }
}

/// Per-frame triangle accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub submitted: usize,
    /// Zero-area faces
    pub degenerate: usize,
    pub backfacing: usize,
    /// Dropped because a vertex was at or behind the near plane
    pub clipped: usize,
    pub drawn: usize,
}

impl FrameStats {
    pub fn merge(&mut self, other: &FrameStats) {
        self.submitted += other.submitted;
        self.degenerate += other.degenerate;
        self.backfacing += other.backfacing;
        self.clipped += other.clipped;
        self.drawn += other.drawn;
    }
}

/// Pipeline output for one mesh
#[derive(Debug, Clone, Default)]
pub struct MeshFrame {
    pub triangles: Vec<ShadedTriangle>,
    pub stats: FrameStats,
}

/// Run one mesh through the pipeline against `camera`.
///
/// `mesh_index` is recorded in each output triangle's [`FaceRef`].
pub fn render_mesh(mesh: &Mesh, mesh_index: usize, camera: &Camera, lighting: &Lighting) -> MeshFrame {
    let model_view = camera.view_matrix() * mesh.transform.model_matrix();
    let mut frame = MeshFrame::default();

    for (index, triangle) in mesh.triangles().iter().enumerate() {
        frame.stats.submitted += 1;

        let [v0, v1, v2] = triangle.vertices.map(|v| transform_point(&model_view, &v));

        let Some(normal) = try_normalize(&(v1 - v0).cross(&(v2 - v0))) else {
            frame.stats.degenerate += 1;
            continue;
        };

        // The camera sits at the origin of camera space, so v0 is the view
        // direction toward the face
        if normal.dot(&v0) >= 0.0 {
            frame.stats.backfacing += 1;
            continue;
        }

        let (Some(p0), Some(p1), Some(p2)) =
            (camera.project(&v0), camera.project(&v1), camera.project(&v2))
        else {
            frame.stats.clipped += 1;
            continue;
        };

        frame.triangles.push(ShadedTriangle {
            vertices: [p0, p1, p2],
            depth: (v0.z + v1.z + v2.z) / 3.0,
            intensity: lighting.intensity(&normal),
            color: mesh.color,
            source: FaceRef {
                mesh: mesh_index,
                triangle: index,
            },
        });
    }

    sort_back_to_front(&mut frame.triangles);
    frame.stats.drawn = frame.triangles.len();
    tracing::trace!(mesh = mesh.name(), stats = ?frame.stats, "mesh pipeline");
    frame
}

/// Stable sort by descending depth (farthest first); ties keep their order
pub fn sort_back_to_front(triangles: &mut [ShadedTriangle]) {
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}
