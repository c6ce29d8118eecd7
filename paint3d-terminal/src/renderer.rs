//! ASCII surface for terminal rendering
//!
//! Screen space is measured in cell widths. Terminal cells are roughly twice
//! as tall as they are wide, so one row spans `CELL_ASPECT` units of y.

use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use paint3d_core::hit::point_in_polygon;
use paint3d_core::{Color, DrawSurface, Point2};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Height of one terminal cell in screen units
pub const CELL_ASPECT: f32 = 2.0;

const LINE_CHAR: char = '+';

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: Color::BLACK,
};

/// Character and color buffers the size of the terminal
pub struct AsciiSurface {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AsciiSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Viewport size in screen units for a camera drawing onto this surface
    pub fn viewport(&self) -> (u32, u32) {
        (self.width as u32, (self.height as f32 * CELL_ASPECT) as u32)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Character and color at a cell, if it is on the surface
    pub fn cell(&self, column: usize, row: usize) -> Option<(char, Color)> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let cell = self.cells[row * self.width + column];
        Some((cell.character, cell.color))
    }

    /// Screen point at the center of a cell
    pub fn cell_center(column: u16, row: u16) -> Point2 {
        Point2::new(column as f32 + 0.5, (row as f32 + 0.5) * CELL_ASPECT)
    }

    fn put(&mut self, column: i64, row: i64, character: char, color: Color) {
        if column < 0 || row < 0 || column as usize >= self.width || row as usize >= self.height {
            return;
        }
        self.cells[row as usize * self.width + column as usize] = Cell { character, color };
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(TermColor::Rgb {
                        r: cell.color.r,
                        g: cell.color.g,
                        b: cell.color.b,
                    }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn ramp_char(color: Color) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    // Skip the blank so every filled cell stays visible
    let index = 1 + (color.luminance() * (last - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

impl DrawSurface for AsciiSurface {
    fn fill_polygon(&mut self, points: &[Point2], color: Color) {
        if points.len() < 3 {
            return;
        }

        // Bounding box in cells
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        let first_col = (min_x.floor() as i64).max(0);
        let last_col = (max_x.ceil() as i64).min(self.width as i64 - 1);
        let first_row = ((min_y / CELL_ASPECT).floor() as i64).max(0);
        let last_row = ((max_y / CELL_ASPECT).ceil() as i64).min(self.height as i64 - 1);

        let character = ramp_char(color);
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let center = Self::cell_center(col as u16, row as u16);
                if point_in_polygon(&center, points) {
                    self.put(col, row, character, color);
                }
            }
        }
    }

    fn line(&mut self, from: Point2, to: Point2, color: Color) {
        let (x0, y0) = (from.x, from.y / CELL_ASPECT);
        let (x1, y1) = (to.x, to.y / CELL_ASPECT);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.put(x.floor() as i64, y.floor() as i64, LINE_CHAR, color);
        }
    }

    fn text(&mut self, at: Point2, text: &str, color: Color) {
        let row = (at.y / CELL_ASPECT).floor() as i64;
        let col = at.x.floor() as i64;
        for (i, character) in text.chars().enumerate() {
            self.put(col + i as i64, row, character, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> [Point2; 4] {
        [
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn test_fill_covers_cell_centers() {
        let mut surface = AsciiSurface::new(10, 5);
        // Columns 2..5 and rows 1..3 have centers inside
        surface.fill_polygon(&square(2.0, 2.0, 5.0, 6.0), Color::WHITE);
        for row in 0..5 {
            for col in 0..10 {
                let (c, _) = surface.cell(col, row).unwrap();
                let inside = (2..5).contains(&col) && (1..3).contains(&row);
                assert_eq!(c != ' ', inside, "cell ({col}, {row})");
            }
        }
        assert_eq!(surface.cell(2, 1), Some(('@', Color::WHITE)));
    }

    #[test]
    fn test_later_polygon_paints_over() {
        let mut surface = AsciiSurface::new(4, 2);
        surface.fill_polygon(&square(0.0, 0.0, 4.0, 4.0), Color::WHITE);
        surface.fill_polygon(&square(0.0, 0.0, 2.0, 4.0), Color::RED);
        assert_eq!(surface.cell(0, 0).unwrap().1, Color::RED);
        assert_eq!(surface.cell(3, 1).unwrap().1, Color::WHITE);
    }

    #[test]
    fn test_dark_color_still_visible() {
        let mut surface = AsciiSurface::new(4, 2);
        surface.fill_polygon(&square(0.0, 0.0, 4.0, 4.0), Color::BLACK);
        assert_eq!(surface.cell(1, 1).unwrap().0, '.');
    }

    #[test]
    fn test_line_and_text_clip() {
        let mut surface = AsciiSurface::new(6, 3);
        surface.line(Point2::new(0.5, 1.0), Point2::new(5.5, 1.0), Color::YELLOW);
        for col in 0..6 {
            assert_eq!(surface.cell(col, 0), Some((LINE_CHAR, Color::YELLOW)));
        }
        surface.text(Point2::new(4.0, 4.0), "abc", Color::GREEN);
        assert_eq!(surface.cell(4, 2).unwrap().0, 'a');
        assert_eq!(surface.cell(5, 2).unwrap().0, 'b');
        assert_eq!(surface.cell(6, 2), None);

        surface.clear();
        assert_eq!(surface.cell(4, 2).unwrap().0, ' ');
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let mut surface = AsciiSurface::new(3, 2);
        surface.text(Point2::new(0.0, 2.0), "hey", Color::WHITE);
        let mut out = Vec::new();
        surface.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("hey"));
    }

    #[test]
    fn test_viewport_accounts_for_cell_shape() {
        let mut surface = AsciiSurface::new(80, 24);
        assert_eq!(surface.viewport(), (80, 48));
        surface.resize(40, 10);
        assert_eq!(surface.viewport(), (40, 20));
        assert_eq!(surface.cell(39, 9), Some((' ', Color::BLACK)));
    }
}
