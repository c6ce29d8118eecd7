//! paint3d Web - WASM front end drawing onto a 2D canvas
//!
//! The pipeline runs in Rust; the browser only fills polygons through
//! `CanvasRenderingContext2d`.

use paint3d_core::{
    draw_frame, render_frame, Axis, CameraConfig, Cameras, Color, DrawOptions, DrawSurface, Frame, Gizmo,
    Lighting, Mesh, Pick, Point2, Result as CoreResult, Scene,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "#101018";

fn css(color: Color) -> String {
    format!("rgb({}, {}, {})", color.r, color.g, color.b)
}

fn js_error(e: paint3d_core::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Canvas-backed drawing surface
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self { context }
    }

    pub fn clear(&self, width: f64, height: f64) {
        self.context.set_fill_style_str(BACKGROUND);
        self.context.fill_rect(0.0, 0.0, width, height);
    }

    fn trace_path(&self, points: &[Point2]) {
        self.context.begin_path();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                self.context.move_to(p.x as f64, p.y as f64);
            } else {
                self.context.line_to(p.x as f64, p.y as f64);
            }
        }
        self.context.close_path();
    }
}

impl DrawSurface for CanvasSurface {
    fn fill_polygon(&mut self, points: &[Point2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let style = css(color);
        self.trace_path(points);
        self.context.set_fill_style_str(&style);
        self.context.fill();
        // Stroke in the same color so neighboring triangles leave no seams
        self.context.set_stroke_style_str(&style);
        self.context.stroke();
    }

    fn line(&mut self, from: Point2, to: Point2, color: Color) {
        self.context.begin_path();
        self.context.move_to(from.x as f64, from.y as f64);
        self.context.line_to(to.x as f64, to.y as f64);
        self.context.set_stroke_style_str(&css(color));
        self.context.stroke();
    }

    fn text(&mut self, at: Point2, text: &str, color: Color) {
        self.context.set_fill_style_str(&css(color));
        self.context.set_text_baseline("top");
        if let Err(e) = self.context.fill_text(text, at.x as f64, at.y as f64) {
            tracing::warn!(?e, "fill_text failed");
        }
    }
}

/// Scene, cameras and the last frame, independent of the browser
pub struct Viewer {
    scene: Scene,
    gizmo: Gizmo,
    cameras: Cameras,
    lighting: Lighting,
    frame: Frame,
    drag: Option<(Axis, Point2)>,
}

impl Viewer {
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        let focal = height.max(1) as f32 * 1.2;
        let cameras = Cameras::for_viewport(CameraConfig::new(focal, width.max(1), height.max(1)))?;
        let mut viewer = Self {
            scene: Scene::new(),
            gizmo: Gizmo::default(),
            cameras,
            lighting: Lighting::default(),
            frame: Frame::default(),
            drag: None,
        };
        viewer.update();
        Ok(viewer)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn update(&mut self) {
        self.frame = render_frame(&self.scene, Some(&self.gizmo), &self.cameras, &self.lighting);
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        let index = self.scene.add_mesh(mesh);
        if let Err(e) = self.scene.select(Some(index)) {
            tracing::warn!(error = %e, "could not select new mesh");
        }
        index
    }

    pub fn rotate_selected(&mut self, dx: f32, dy: f32, dz: f32) {
        if let Some(mesh) = self.scene.selected_mesh_mut() {
            mesh.transform.rotate(dx, dy, dz);
        }
    }

    pub fn orbit(&mut self, yaw: f32, pitch: f32) -> CoreResult<()> {
        self.cameras.world.orbit(yaw, pitch)?;
        self.cameras.sync_overlay()
    }

    /// Pick at a canvas point and update the selection; a gizmo hit starts a drag
    pub fn pointer_down(&mut self, point: Point2) -> CoreResult<Pick> {
        let pick = self.frame.pick(&point);
        self.drag = match pick {
            Pick::Gizmo(axis) => Some((axis, point)),
            _ => None,
        };
        self.scene.apply_pick(&pick)?;
        Ok(pick)
    }

    pub fn pointer_move(&mut self, point: Point2) {
        if let Some((axis, last)) = self.drag {
            self.scene.drag_selected(axis, &self.cameras, last, point);
            self.drag = Some((axis, point));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }
}

#[wasm_bindgen]
pub struct WebRenderer {
    viewer: Viewer,
    surface: CanvasSurface,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Attach to the canvas with the given element id
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebRenderer, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id}")))?
            .dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let (width, height) = (canvas.width(), canvas.height());
        let mut viewer = Viewer::new(width, height).map_err(js_error)?;
        viewer.add_mesh(Mesh::cube(2.0));
        tracing::info!(canvas_id, width, height, "web renderer attached");

        Ok(WebRenderer {
            viewer,
            surface: CanvasSurface::new(context),
            width,
            height,
        })
    }

    /// Render a frame
    pub fn render(&mut self) {
        self.viewer.update();
        self.surface.clear(self.width as f64, self.height as f64);
        draw_frame(
            self.viewer.frame(),
            self.viewer.scene(),
            &mut self.surface,
            &DrawOptions::default(),
        );
    }

    /// Rotate the selected mesh, in degrees
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.viewer.rotate_selected(dx, dy, dz);
    }

    pub fn orbit(&mut self, yaw: f32, pitch: f32) -> Result<(), JsValue> {
        self.viewer.orbit(yaw, pitch).map_err(js_error)
    }

    /// Select whatever is under the canvas point. Returns true if a mesh or
    /// gizmo arrow was hit.
    pub fn click(&mut self, x: f32, y: f32) -> Result<bool, JsValue> {
        let pick = self.viewer.pointer_down(Point2::new(x, y)).map_err(js_error)?;
        Ok(pick != Pick::Nothing)
    }

    pub fn drag(&mut self, x: f32, y: f32) {
        self.viewer.pointer_move(Point2::new(x, y));
    }

    pub fn release(&mut self) {
        self.viewer.pointer_up();
    }

    pub fn add_cube(&mut self) {
        self.viewer.add_mesh(Mesh::cube(2.0));
    }

    pub fn add_pyramid(&mut self) {
        self.viewer.add_mesh(Mesh::pyramid(2.0));
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paint3d_core::Vec3;

    #[test]
    fn test_css_color() {
        assert_eq!(css(Color::rgb(1, 2, 3)), "rgb(1, 2, 3)");
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut viewer = Viewer::new(800, 600).unwrap();
        viewer.add_mesh(Mesh::cube(2.0));
        viewer.update();

        assert_eq!(viewer.pointer_down(Point2::new(5.0, 590.0)).unwrap(), Pick::Nothing);
        assert_eq!(viewer.scene().selected(), None);

        let pick = viewer.pointer_down(Point2::new(400.0, 300.0)).unwrap();
        assert!(matches!(pick, Pick::Mesh { mesh: 0, .. }));
        assert_eq!(viewer.scene().selected(), Some(0));

        // The Y arrow points down the canvas from the overlay center
        let tip = viewer
            .cameras
            .overlay
            .project_world(&Vec3::new(0.0, 0.8, 0.0))
            .unwrap();
        let start = Point2::new(tip.x, tip.y);
        assert_eq!(viewer.pointer_down(start).unwrap(), Pick::Gizmo(Axis::Y));
        viewer.pointer_move(Point2::new(tip.x, tip.y + 30.0));
        viewer.pointer_up();
        let position = viewer.scene().mesh(0).unwrap().transform.position;
        assert!(position.y > 0.0);
        assert_eq!(position.x, 0.0);

        // No drag in progress after release
        viewer.pointer_move(Point2::new(0.0, 0.0));
        assert_eq!(viewer.scene().mesh(0).unwrap().transform.position, position);
    }

    #[test]
    fn test_rotate_and_orbit() {
        let mut viewer = Viewer::new(640, 480).unwrap();
        viewer.rotate_selected(10.0, 0.0, 0.0);
        viewer.add_mesh(Mesh::pyramid(2.0));
        viewer.rotate_selected(0.0, 15.0, 0.0);
        assert_eq!(viewer.scene().mesh(0).unwrap().transform.rotation.y, 15.0);
        viewer.orbit(30.0, 10.0).unwrap();
        viewer.update();
        assert!(viewer.frame().stats.submitted > 0);
    }
}
