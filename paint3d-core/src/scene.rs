//! Scene state and the per-frame driver.
//!
//! A frame is a pure function of the scene, the camera pair and the
//! lighting: nothing computed here survives into the next frame.

use crate::error::{Error, Result};
use crate::geometry::{CameraSlot, Mesh};
use crate::gizmo::{Axis, Gizmo};
use crate::hit::{point_in_polygon, point_in_triangle};
use crate::hull::convex_hull;
use crate::math::{Point2, Vec3};
use crate::pipeline::{render_mesh, sort_back_to_front, FrameStats, Lighting, ShadedTriangle};
use crate::projection::{Camera, CameraConfig};

/// Distance the overlay camera keeps from the gizmo
const OVERLAY_DISTANCE: f32 = 6.0;

/// Ordered meshes plus the current selection
#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    selected: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh, returning its index
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        tracing::info!(name = mesh.name(), triangles = mesh.triangles().len(), "adding mesh");
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Remove a mesh. Later meshes shift down by one and the selection
    /// follows them; removing the selected mesh clears the selection.
    pub fn remove_mesh(&mut self, index: usize) -> Result<Mesh> {
        self.check_index(index)?;
        let mesh = self.meshes.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        tracing::info!(name = mesh.name(), index, "removed mesh");
        Ok(mesh)
    }

    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            self.check_index(i)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Cycle the selection through the meshes in order
    pub fn select_next(&mut self) {
        self.selected = match (self.selected, self.meshes.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some((i + 1) % len),
        };
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_mesh(&self) -> Option<&Mesh> {
        self.selected.and_then(|i| self.meshes.get(i))
    }

    pub fn selected_mesh_mut(&mut self) -> Option<&mut Mesh> {
        self.selected.and_then(|i| self.meshes.get_mut(i))
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Apply a pick to the selection: a mesh hit selects it, a miss clears
    /// the selection, a gizmo hit leaves it alone.
    pub fn apply_pick(&mut self, pick: &Pick) -> Result<()> {
        match *pick {
            Pick::Mesh { mesh, .. } => self.select(Some(mesh)),
            Pick::Nothing => self.select(None),
            Pick::Gizmo(_) => Ok(()),
        }
    }

    /// Move the selected mesh along a world axis by the cursor motion
    /// `from -> to` projected onto that axis's on-screen direction.
    ///
    /// The axis is projected with the camera the mesh is drawn by. Returns
    /// false when nothing moved: no selection, the mesh origin is behind the
    /// camera, or the axis points straight at the viewer.
    pub fn drag_selected(&mut self, axis: Axis, cameras: &Cameras, from: Point2, to: Point2) -> bool {
        let Some(mesh) = self.selected_mesh_mut() else {
            return false;
        };
        let camera = cameras.for_slot(mesh.slot);
        let origin = mesh.transform.position;
        let (Some(a), Some(b)) = (
            camera.project_world(&origin),
            camera.project_world(&(origin + axis.direction())),
        ) else {
            return false;
        };
        let screen_axis = Point2::new(b.x, b.y) - Point2::new(a.x, a.y);
        let length_sq = screen_axis.norm_squared();
        if length_sq < crate::math::EPSILON {
            return false;
        }
        let amount = (to - from).dot(&screen_axis) / length_sq;
        mesh.transform.translate(axis.direction() * amount);
        true
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.meshes.len() {
            Ok(())
        } else {
            Err(Error::MeshIndexOutOfRange {
                index,
                len: self.meshes.len(),
            })
        }
    }
}

/// The two runtime cameras: one for scene content, one for overlay
/// geometry, with independent state
#[derive(Debug, Clone, PartialEq)]
pub struct Cameras {
    pub world: Camera,
    pub overlay: Camera,
}

impl Cameras {
    pub fn new(world: Camera, overlay: Camera) -> Self {
        Self { world, overlay }
    }

    /// World camera ten units down -Z filling the viewport, overlay camera
    /// in a square in the top-right corner.
    pub fn for_viewport(config: CameraConfig) -> Result<Self> {
        let world = Camera::new(Vec3::new(0.0, 0.0, -10.0), Vec3::zeros(), Vec3::y(), config)?;
        let side = (config.viewport_width.min(config.viewport_height) / 4).max(1);
        let overlay_config = CameraConfig {
            focal_length: side as f32 * 2.5,
            viewport_width: side,
            viewport_height: side,
            viewport_x: config.viewport_x + (config.viewport_width - side) as f32,
            viewport_y: config.viewport_y,
            near: config.near,
        };
        let overlay = Camera::new(
            Vec3::new(0.0, 0.0, -OVERLAY_DISTANCE),
            Vec3::zeros(),
            Vec3::y(),
            overlay_config,
        )?;
        let mut cameras = Self { world, overlay };
        cameras.sync_overlay()?;
        Ok(cameras)
    }

    /// Point the overlay camera the same way as the world camera, at its own
    /// fixed distance, so the gizmo shows the world axes at a constant size.
    pub fn sync_overlay(&mut self) -> Result<()> {
        self.overlay.follow_orientation(&self.world, OVERLAY_DISTANCE)
    }

    pub fn for_slot(&self, slot: CameraSlot) -> &Camera {
        match slot {
            CameraSlot::World => &self.world,
            CameraSlot::Overlay => &self.overlay,
        }
    }
}

/// Tagged result of a picking query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Gizmo(Axis),
    Mesh { mesh: usize, triangle: usize },
    Nothing,
}

impl Pick {
    /// Triangles of the picked face (triangles sharing the picked normal)
    pub fn face<'a>(&self, scene: &'a Scene) -> Option<&'a [usize]> {
        match *self {
            Pick::Mesh { mesh, triangle } => scene.mesh(mesh)?.face_of(triangle),
            _ => None,
        }
    }
}

/// One frame's draw list, each layer ordered farthest first
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Scene meshes projected by the world camera
    pub world: Vec<ShadedTriangle>,
    /// Scene meshes projected by the overlay camera
    pub overlay: Vec<ShadedTriangle>,
    /// Gizmo arrows; `source.mesh` is the [`Axis`] index
    pub gizmo: Vec<ShadedTriangle>,
    pub stats: FrameStats,
}

impl Frame {
    /// Convex outline of a scene mesh's visible triangles
    pub fn outline(&self, mesh: usize) -> Vec<Point2> {
        let points: Vec<Point2> = self
            .world
            .iter()
            .chain(&self.overlay)
            .filter(|t| t.source.mesh == mesh)
            .flat_map(|t| t.screen_points())
            .collect();
        convex_hull(&points)
    }

    /// Whether `point` falls inside a mesh's convex outline
    pub fn hit_outline(&self, mesh: usize, point: &Point2) -> bool {
        point_in_polygon(point, &self.outline(mesh))
    }

    /// Topmost thing under `point`: gizmo first, then overlay meshes, then
    /// world meshes, each searched nearest first.
    pub fn pick(&self, point: &Point2) -> Pick {
        if let Some(axis) = topmost(&self.gizmo, point).and_then(|t| Axis::from_index(t.source.mesh)) {
            return Pick::Gizmo(axis);
        }
        match topmost(&self.overlay, point).or_else(|| topmost(&self.world, point)) {
            Some(t) => Pick::Mesh {
                mesh: t.source.mesh,
                triangle: t.source.triangle,
            },
            None => Pick::Nothing,
        }
    }
}

fn topmost<'a>(layer: &'a [ShadedTriangle], point: &Point2) -> Option<&'a ShadedTriangle> {
    layer.iter().rev().find(|t| point_in_triangle(point, t))
}

/// Run every mesh through the pipeline against its camera.
///
/// Meshes are processed in scene order. Each layer is then stably sorted
/// back to front, so triangles at equal depth keep scene order.
pub fn render_frame(scene: &Scene, gizmo: Option<&Gizmo>, cameras: &Cameras, lighting: &Lighting) -> Frame {
    let mut frame = Frame::default();

    for (index, mesh) in scene.meshes().iter().enumerate() {
        let rendered = render_mesh(mesh, index, cameras.for_slot(mesh.slot), lighting);
        frame.stats.merge(&rendered.stats);
        match mesh.slot {
            CameraSlot::World => frame.world.extend(rendered.triangles),
            CameraSlot::Overlay => frame.overlay.extend(rendered.triangles),
        }
    }

    if let Some(gizmo) = gizmo {
        for (index, mesh) in gizmo.meshes().iter().enumerate() {
            let rendered = render_mesh(mesh, index, &cameras.overlay, lighting);
            frame.stats.merge(&rendered.stats);
            frame.gizmo.extend(rendered.triangles);
        }
    }

    sort_back_to_front(&mut frame.world);
    sort_back_to_front(&mut frame.overlay);
    sort_back_to_front(&mut frame.gizmo);

    tracing::debug!(
        drawn = frame.stats.drawn,
        submitted = frame.stats.submitted,
        backfacing = frame.stats.backfacing,
        clipped = frame.stats.clipped,
        "frame rendered"
    );
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn cube_at(x: f32) -> Mesh {
        let mut mesh = Mesh::cube(1.0);
        mesh.transform.position = Vec3::new(x, 0.0, 0.0);
        mesh
    }

    fn cameras() -> Cameras {
        Cameras::for_viewport(CameraConfig::default()).unwrap()
    }

    #[test]
    fn test_add_remove_select() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());
        let a = scene.add_mesh(cube_at(-2.0));
        let b = scene.add_mesh(cube_at(0.0));
        let c = scene.add_mesh(cube_at(2.0));
        assert_eq!((a, b, c), (0, 1, 2));

        scene.select(Some(2)).unwrap();
        scene.remove_mesh(0).unwrap();
        assert_eq!(scene.selected(), Some(1));
        assert_eq!(scene.len(), 2);

        scene.remove_mesh(1).unwrap();
        assert_eq!(scene.selected(), None);

        assert_eq!(
            scene.select(Some(5)),
            Err(Error::MeshIndexOutOfRange { index: 5, len: 1 })
        );
        assert!(scene.remove_mesh(9).is_err());
    }

    #[test]
    fn test_select_next_cycles() {
        let mut scene = Scene::new();
        scene.select_next();
        assert_eq!(scene.selected(), None);
        scene.add_mesh(cube_at(0.0));
        scene.add_mesh(cube_at(1.0));
        scene.select_next();
        assert_eq!(scene.selected(), Some(0));
        scene.select_next();
        scene.select_next();
        assert_eq!(scene.selected(), Some(0));
    }

    #[test]
    fn test_selected_mesh_mut_edits_transform() {
        let mut scene = Scene::new();
        scene.add_mesh(cube_at(0.0));
        scene.select(Some(0)).unwrap();
        scene.selected_mesh_mut().unwrap().transform.rotate(0.0, 45.0, 0.0);
        assert_eq!(scene.mesh(0).unwrap().transform.rotation.y, 45.0);
    }

    #[test]
    fn test_drag_follows_projected_axis() {
        let mut scene = Scene::new();
        scene.add_mesh(cube_at(0.0));
        let cams = cameras();
        let (from, to) = (Point2::new(400.0, 300.0), Point2::new(450.0, 340.0));
        assert!(!scene.drag_selected(Axis::X, &cams, from, to));

        scene.select(Some(0)).unwrap();
        // Z runs straight into the screen from the center
        assert!(!scene.drag_selected(Axis::Z, &cams, from, to));

        // One world unit along X spans 50 pixels; vertical motion is ignored
        assert!(scene.drag_selected(Axis::X, &cams, from, to));
        let position = scene.mesh(0).unwrap().transform.position;
        assert!((position - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_drag_overlay_mesh_uses_overlay_projection() {
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::cube(1.0).with_slot(CameraSlot::Overlay));
        scene.select(Some(0)).unwrap();
        let cams = cameras();

        // Overlay: focal 375 at distance 6, so one unit spans 62.5 pixels
        let center = cams.overlay.project_world(&Vec3::zeros()).unwrap();
        let from = Point2::new(center.x, center.y);
        let to = Point2::new(center.x + 62.5, center.y);
        assert!(scene.drag_selected(Axis::X, &cams, from, to));
        let position = scene.mesh(0).unwrap().transform.position;
        assert!((position.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_pick_selects_mesh_under_cursor() {
        let mut scene = Scene::new();
        scene.add_mesh(cube_at(-3.0));
        scene.add_mesh(cube_at(3.0));
        let cams = cameras();
        let frame = render_frame(&scene, None, &cams, &Lighting::default());

        let center = cams.world.project_world(&Vec3::new(3.0, 0.0, 0.0)).unwrap();
        let pick = frame.pick(&Point2::new(center.x, center.y));
        assert!(matches!(pick, Pick::Mesh { mesh: 1, .. }));
        scene.apply_pick(&pick).unwrap();
        assert_eq!(scene.selected(), Some(1));

        // Front face of the cube faces the camera: both of its triangles
        assert_eq!(pick.face(&scene).map(<[usize]>::len), Some(2));

        let miss = frame.pick(&Point2::new(400.0, 10.0));
        assert_eq!(miss, Pick::Nothing);
        scene.apply_pick(&miss).unwrap();
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_nearer_mesh_wins_pick() {
        let mut scene = Scene::new();
        let mut far = cube_at(0.0);
        far.transform.position.z = 4.0;
        scene.add_mesh(far);
        scene.add_mesh(cube_at(0.0));
        let cams = cameras();
        let frame = render_frame(&scene, None, &cams, &Lighting::default());
        assert_eq!(frame.world.last().unwrap().source.mesh, 1);
        assert!(matches!(
            frame.pick(&Point2::new(405.0, 295.0)),
            Pick::Mesh { mesh: 1, .. }
        ));
    }

    #[test]
    fn test_gizmo_drawn_on_top_and_picked_first() {
        let scene = Scene::new();
        let cams = cameras();
        let gizmo = Gizmo::default();
        let frame = render_frame(&scene, Some(&gizmo), &cams, &Lighting::default());
        assert!(frame.world.is_empty());
        assert!(!frame.gizmo.is_empty());

        // The X arrow points to the right of the overlay viewport center
        let tip = cams.overlay.project_world(&Vec3::new(0.8, 0.0, 0.0)).unwrap();
        assert_eq!(frame.pick(&Point2::new(tip.x, tip.y)), Pick::Gizmo(Axis::X));
    }

    #[test]
    fn test_overlay_independent_of_world_zoom() {
        let scene = Scene::new();
        let gizmo = Gizmo::default();
        let mut cams = cameras();
        let before = render_frame(&scene, Some(&gizmo), &cams, &Lighting::default());
        cams.world.dolly(5.0).unwrap();
        cams.sync_overlay().unwrap();
        let after = render_frame(&scene, Some(&gizmo), &cams, &Lighting::default());
        assert_eq!(before.gizmo, after.gizmo);
    }

    #[test]
    fn test_outline_is_hull_of_visible_triangles() {
        let mut scene = Scene::new();
        scene.add_mesh(Mesh::cube(2.0));
        let cams = cameras();
        let frame = render_frame(&scene, None, &cams, &Lighting::default());
        // Only the front square is visible head on
        let outline = frame.outline(0);
        assert_eq!(outline.len(), 4);
        assert!(frame.hit_outline(0, &Point2::new(400.0, 300.0)));
        assert!(!frame.hit_outline(0, &Point2::new(10.0, 10.0)));
        assert!(frame.outline(7).is_empty());
    }
}
