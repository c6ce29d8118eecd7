//! The 2D drawing surface the pipeline hands its output to.
//!
//! A surface knows nothing about 3D: it fills polygons, strokes lines and
//! prints text at screen coordinates. [`draw_frame`] turns a [`Frame`] into
//! those calls in painter's order.

use crate::math::Point2;
use crate::scene::{Frame, Scene};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(230, 60, 60);
    pub const GREEN: Color = Color::rgb(60, 200, 80);
    pub const BLUE: Color = Color::rgb(70, 110, 240);
    pub const YELLOW: Color = Color::rgb(250, 210, 60);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `intensity` (clamped to [0, 1])
    pub fn shade(&self, intensity: f32) -> Color {
        let k = intensity.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * k).round() as u8;
        Color::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Perceived brightness in [0, 1]
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

/// A primitive 2D canvas
pub trait DrawSurface {
    fn fill_polygon(&mut self, points: &[Point2], color: Color);
    fn line(&mut self, from: Point2, to: Point2, color: Color);
    fn text(&mut self, at: Point2, text: &str, color: Color);
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polygon { points: Vec<Point2>, color: Color },
    Line { from: Point2, to: Point2, color: Color },
    Text { at: Point2, text: String, color: Color },
}

/// Recording surface, replayable onto another surface
impl DrawSurface for Vec<DrawCommand> {
    fn fill_polygon(&mut self, points: &[Point2], color: Color) {
        self.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn line(&mut self, from: Point2, to: Point2, color: Color) {
        self.push(DrawCommand::Line { from, to, color });
    }

    fn text(&mut self, at: Point2, text: &str, color: Color) {
        self.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            color,
        });
    }
}

pub fn replay<S: DrawSurface + ?Sized>(commands: &[DrawCommand], surface: &mut S) {
    for command in commands {
        match command {
            DrawCommand::Polygon { points, color } => surface.fill_polygon(points, *color),
            DrawCommand::Line { from, to, color } => surface.line(*from, *to, *color),
            DrawCommand::Text { at, text, color } => surface.text(*at, text, *color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Stroke the convex outline of the selected mesh
    pub outline_selected: bool,
    pub outline_color: Color,
    /// Print triangle counts in the top-left corner
    pub show_stats: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            outline_selected: true,
            outline_color: Color::YELLOW,
            show_stats: false,
        }
    }
}

/// Paint a frame: world triangles farthest first, the selected mesh's
/// outline, then overlay triangles and the gizmo on top of everything.
pub fn draw_frame<S: DrawSurface + ?Sized>(frame: &Frame, scene: &Scene, surface: &mut S, options: &DrawOptions) {
    for triangle in &frame.world {
        surface.fill_polygon(&triangle.screen_points(), triangle.shaded_color());
    }

    if options.outline_selected {
        if let Some(selected) = scene.selected() {
            let outline = frame.outline(selected);
            if outline.len() >= 2 {
                for (i, from) in outline.iter().enumerate() {
                    let to = outline[(i + 1) % outline.len()];
                    surface.line(*from, to, options.outline_color);
                }
            }
        }
    }

    for triangle in frame.overlay.iter().chain(&frame.gizmo) {
        surface.fill_polygon(&triangle.screen_points(), triangle.shaded_color());
    }

    if options.show_stats {
        let stats = &frame.stats;
        let text = format!(
            "drawn {} / {}  backface {}  clipped {}  degenerate {}",
            stats.drawn, stats.submitted, stats.backfacing, stats.clipped, stats.degenerate
        );
        surface.text(Point2::new(0.0, 0.0), &text, Color::WHITE);
    }
}
