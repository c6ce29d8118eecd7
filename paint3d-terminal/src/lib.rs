//! Terminal front end: drives the paint3d pipeline into an ASCII surface

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue, terminal,
};
use paint3d_core::{
    draw_frame, render_frame, Axis, CameraConfig, Cameras, Color, DrawOptions, DrawSurface, Frame, Gizmo,
    Lighting, Mesh, Pick, Point2, Result as CoreResult, Scene, Vec3,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiSurface;

const ROTATE_STEP: f32 = 5.0;
const MOVE_STEP: f32 = 0.25;
const SCALE_STEP: f32 = 1.1;
const ORBIT_STEP: f32 = 5.0;
const DOLLY_STEP: f32 = 1.0;
/// Arrows thick enough to cover whole cells in the small overlay square
const GIZMO_THICKNESS: f32 = 0.5;

/// Camera settings chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Focal length in cell widths; derived from the terminal height when unset
    pub focal_length: Option<f32>,
    pub near: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            focal_length: None,
            near: 0.1,
        }
    }
}

impl ViewSettings {
    fn config(&self, width: u32, height: u32) -> CameraConfig {
        let (width, height) = (width.max(1), height.max(1));
        let focal = self.focal_length.unwrap_or(height as f32 * 1.5);
        CameraConfig::new(focal, width, height).with_near(self.near)
    }
}

/// Gizmo axis being dragged and the last cursor position
#[derive(Debug, Clone, Copy)]
struct Drag {
    axis: Axis,
    last: Point2,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    gizmo: Gizmo,
    cameras: Cameras,
    lighting: Lighting,
    settings: ViewSettings,
    surface: AsciiSurface,
    frame: Frame,
    drag: Option<Drag>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    target_fps: u32,
}

impl TerminalApp {
    pub fn new(scene: Scene, settings: ViewSettings, target_fps: u32) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(scene, settings, target_fps, width as usize, height as usize)
    }

    /// Build the app for a terminal of `width` by `height` cells
    pub fn with_size(
        scene: Scene,
        settings: ViewSettings,
        target_fps: u32,
        width: usize,
        height: usize,
    ) -> anyhow::Result<Self> {
        let surface = AsciiSurface::new(width, height);
        let (w, h) = surface.viewport();
        let cameras = Cameras::for_viewport(settings.config(w, h))?;

        let mut app = Self {
            scene,
            gizmo: Gizmo::new(1.0, GIZMO_THICKNESS),
            cameras,
            lighting: Lighting::default(),
            settings,
            surface,
            frame: Frame::default(),
            drag: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            target_fps: target_fps.max(1),
        };
        app.update();
        Ok(app)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn cameras(&self) -> &Cameras {
        &self.cameras
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.target_fps as u64);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                if let Err(e) = self.handle_event(event) {
                    tracing::warn!(error = %e, "input ignored");
                }
            }

            self.update();
            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) -> CoreResult<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => self.handle_key(code),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Ok(())
            }
            Event::Resize(width, height) => self.resize(width as usize, height as usize),
            _ => Ok(()),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> CoreResult<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => self.scene.select_next(),
            KeyCode::Char('c') => self.add_mesh(Mesh::cube(2.0)),
            KeyCode::Char('p') => self.add_mesh(Mesh::pyramid(2.0)),
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(index) = self.scene.selected() {
                    self.scene.remove_mesh(index)?;
                }
            }
            KeyCode::Left => self.orbit(-ORBIT_STEP, 0.0)?,
            KeyCode::Right => self.orbit(ORBIT_STEP, 0.0)?,
            KeyCode::Up => self.orbit(0.0, ORBIT_STEP)?,
            KeyCode::Down => self.orbit(0.0, -ORBIT_STEP)?,
            KeyCode::Char('z') => self.cameras.world.dolly(-DOLLY_STEP)?,
            KeyCode::Char('Z') => self.cameras.world.dolly(DOLLY_STEP)?,
            KeyCode::Char(c) => self.edit_selected(c),
            _ => {}
        }
        Ok(())
    }

    /// Transform edits on the selected mesh
    fn edit_selected(&mut self, key: char) {
        let Some(mesh) = self.scene.selected_mesh_mut() else {
            return;
        };
        let transform = &mut mesh.transform;
        match key {
            'w' => transform.rotate(ROTATE_STEP, 0.0, 0.0),
            's' => transform.rotate(-ROTATE_STEP, 0.0, 0.0),
            'a' => transform.rotate(0.0, -ROTATE_STEP, 0.0),
            'd' => transform.rotate(0.0, ROTATE_STEP, 0.0),
            'e' => transform.rotate(0.0, 0.0, ROTATE_STEP),
            'r' => transform.rotate(0.0, 0.0, -ROTATE_STEP),
            'j' => transform.translate(Vec3::new(-MOVE_STEP, 0.0, 0.0)),
            'l' => transform.translate(Vec3::new(MOVE_STEP, 0.0, 0.0)),
            'i' => transform.translate(Vec3::new(0.0, -MOVE_STEP, 0.0)),
            'k' => transform.translate(Vec3::new(0.0, MOVE_STEP, 0.0)),
            'u' => transform.translate(Vec3::new(0.0, 0.0, -MOVE_STEP)),
            'o' => transform.translate(Vec3::new(0.0, 0.0, MOVE_STEP)),
            '+' | '=' => transform.scale_by(SCALE_STEP),
            '-' => transform.scale_by(1.0 / SCALE_STEP),
            _ => {}
        }
    }

    fn add_mesh(&mut self, mesh: Mesh) {
        let index = self.scene.add_mesh(mesh);
        if let Err(e) = self.scene.select(Some(index)) {
            tracing::warn!(error = %e, "could not select new mesh");
        }
    }

    fn orbit(&mut self, yaw: f32, pitch: f32) -> CoreResult<()> {
        self.cameras.world.orbit(yaw, pitch)?;
        self.cameras.sync_overlay()
    }

    fn dolly(&mut self, distance: f32) {
        if let Err(e) = self.cameras.world.dolly(distance) {
            tracing::warn!(error = %e, "dolly failed");
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = AsciiSurface::cell_center(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let pick = self.frame.pick(&point);
                tracing::debug!(?pick, x = point.x, y = point.y, "click");
                self.drag = match pick {
                    Pick::Gizmo(axis) => Some(Drag { axis, last: point }),
                    _ => None,
                };
                if let Err(e) = self.scene.apply_pick(&pick) {
                    tracing::warn!(error = %e, "stale pick");
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(drag) = self.drag {
                    self.scene.drag_selected(drag.axis, &self.cameras, drag.last, point);
                    self.drag = Some(Drag { last: point, ..drag });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag = None,
            MouseEventKind::ScrollUp => self.dolly(DOLLY_STEP),
            MouseEventKind::ScrollDown => self.dolly(-DOLLY_STEP),
            _ => {}
        }
    }

    fn resize(&mut self, width: usize, height: usize) -> CoreResult<()> {
        self.surface.resize(width, height);
        let (w, h) = self.surface.viewport();
        let world = &self.cameras.world;
        let (position, target, up) = (world.position(), world.target(), world.up());
        let mut cameras = Cameras::for_viewport(self.settings.config(w, h))?;
        cameras.world.look_at(position, target, up)?;
        cameras.sync_overlay()?;
        self.cameras = cameras;
        tracing::debug!(width, height, "terminal resized");
        Ok(())
    }

    fn update(&mut self) {
        self.frame = render_frame(&self.scene, Some(&self.gizmo), &self.cameras, &self.lighting);
    }

    fn status_line(&self) -> String {
        let selected = self
            .scene
            .selected_mesh()
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "paint3d | FPS: {:.1} | {} meshes, selected: {} | {}/{} tris | WASDER rotate IJKLUO move +/- scale Tab select c/p add x del arrows orbit z/Z zoom Q quit",
            self.fps,
            self.scene.len(),
            selected,
            self.frame.stats.drawn,
            self.frame.stats.submitted,
        )
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        self.render_into(&mut stdout)?;
        stdout.flush()
    }

    fn render_into<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.surface.clear();
        draw_frame(&self.frame, &self.scene, &mut self.surface, &DrawOptions::default());

        let status = self.status_line();
        let bottom = self.surface.height().saturating_sub(1) as f32 * renderer::CELL_ASPECT;
        self.surface.text(Point2::new(0.0, bottom), &status, Color::YELLOW);

        queue!(out, cursor::MoveTo(0, 0))?;
        self.surface.draw(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn app_with(meshes: Vec<Mesh>) -> TerminalApp {
        let mut scene = Scene::new();
        for mesh in meshes {
            scene.add_mesh(mesh);
        }
        TerminalApp::with_size(scene, ViewSettings::default(), 30, 80, 24).unwrap()
    }

    fn click(app: &mut TerminalApp, kind: MouseEventKind, column: u16, row: u16) {
        app.handle_event(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
        .unwrap();
    }

    #[test]
    fn test_keys_edit_selected_mesh() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        app.handle_key(KeyCode::Char('d')).unwrap();
        // Nothing selected yet
        assert_eq!(app.scene().mesh(0).unwrap().transform.rotation.y, 0.0);

        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('d')).unwrap();
        app.handle_key(KeyCode::Char('l')).unwrap();
        let transform = &app.scene().mesh(0).unwrap().transform;
        assert_eq!(transform.rotation.y, ROTATE_STEP);
        assert_eq!(transform.position.x, MOVE_STEP);
    }

    #[test]
    fn test_add_and_remove_meshes() {
        let mut app = app_with(vec![]);
        app.handle_key(KeyCode::Char('c')).unwrap();
        app.handle_key(KeyCode::Char('p')).unwrap();
        assert_eq!(app.scene().len(), 2);
        assert_eq!(app.scene().selected(), Some(1));
        app.handle_key(KeyCode::Char('x')).unwrap();
        assert_eq!(app.scene().len(), 1);
        assert_eq!(app.scene().selected(), None);
        app.handle_key(KeyCode::Char('q')).unwrap();
        assert!(!app.is_running());
    }

    #[test]
    fn test_click_selects_and_clears() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        let center = app.cameras().world.project_world(&Vec3::zeros()).unwrap();
        let (col, row) = (center.x as u16, (center.y / renderer::CELL_ASPECT) as u16);
        click(&mut app, MouseEventKind::Down(MouseButton::Left), col, row);
        assert_eq!(app.scene().selected(), Some(0));

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 12);
        assert_eq!(app.scene().selected(), None);
    }

    #[test]
    fn test_orbit_keeps_overlay_in_step() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        app.handle_key(KeyCode::Left).unwrap();
        let world = &app.cameras().world;
        let overlay = &app.cameras().overlay;
        let world_dir = (world.target() - world.position()).normalize();
        let overlay_dir = (overlay.target() - overlay.position()).normalize();
        assert!((world_dir - overlay_dir).norm() < 1e-4);
    }

    #[test]
    fn test_resize_keeps_camera_pose() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        app.handle_key(KeyCode::Char('z')).unwrap();
        let position = app.cameras().world.position();
        app.handle_event(Event::Resize(120, 40)).unwrap();
        assert_eq!(app.cameras().world.position(), position);
        assert_eq!(app.cameras().world.config().viewport_width, 120);
        assert_eq!(app.cameras().world.config().viewport_height, 80);
    }

    #[test]
    fn test_zero_row_resize_keeps_running() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        app.handle_event(Event::Resize(80, 0)).unwrap();
        assert_eq!(app.cameras().world.config().viewport_height, 1);
        assert!(app.cameras().world.config().focal_length > 0.0);
        app.update();
        app.render_into(&mut Vec::new()).unwrap();

        app.handle_event(Event::Resize(80, 24)).unwrap();
        assert_eq!(app.cameras().world.config().viewport_height, 48);
    }

    #[test]
    fn test_scroll_zooms_world_camera() {
        let mut app = app_with(vec![]);
        let before = app.cameras().world.position().z;
        click(&mut app, MouseEventKind::ScrollUp, 0, 0);
        assert_eq!(app.cameras().world.position().z, before + DOLLY_STEP);
    }

    #[test]
    fn test_drag_gizmo_moves_selection_along_axis() {
        let mut app = app_with(vec![Mesh::cube(2.0)]);
        app.handle_key(KeyCode::Tab).unwrap();
        app.update();

        // Grab the X arrow near its tip
        let tip = app.cameras().overlay.project_world(&Vec3::new(0.8, 0.0, 0.0)).unwrap();
        let (col, row) = (tip.x as u16, (tip.y / renderer::CELL_ASPECT) as u16);
        click(&mut app, MouseEventKind::Down(MouseButton::Left), col, row);
        assert!(app.drag.is_some());
        assert_eq!(app.scene().selected(), Some(0));

        click(&mut app, MouseEventKind::Drag(MouseButton::Left), col + 4, row);
        click(&mut app, MouseEventKind::Up(MouseButton::Left), col + 4, row);
        let position = app.scene().mesh(0).unwrap().transform.position;
        assert!(position.x > 0.0);
        assert_eq!(position.y, 0.0);
        assert_eq!(position.z, 0.0);
        assert!(app.drag.is_none());
    }
}
