//! Text renderings of the canvas used in prompts and observation directives.

use crate::draw::canvas::CanvasModel;
use crate::draw::model::{ColorId, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const LOCAL_VIEW_SIZE: u32 = 50;
pub const ZOOMED_VIEW_SIZE: u32 = 75;
pub const COMPRESSED_VIEW_SIZE: u32 = 60;
const DENSITY_RADIUS: i32 = 3;
const EDGE_MARGIN: i32 = 50;

const WALL: char = '█';
const EMPTY: char = '·';
const UNKNOWN: char = '?';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Normal,
    Density,
    Shape,
}

impl ViewMode {
    pub fn name(self) -> &'static str {
        match self {
            ViewMode::Normal => "normal",
            ViewMode::Density => "density",
            ViewMode::Shape => "shape",
        }
    }
}

fn cursor_glyph(pen_down: bool) -> char {
    if pen_down {
        '◉'
    } else {
        '○'
    }
}

pub fn color_glyph(rgb: Rgb) -> char {
    ColorId::classify(rgb).map(ColorId::glyph).unwrap_or(UNKNOWN)
}

/// Filled means neither background nor white.
fn is_filled(canvas: &CanvasModel, x: i32, y: i32) -> bool {
    canvas
        .raster()
        .get(x, y)
        .map(|px| !px.is_black() && px != ColorId::White.rgb())
        .unwrap_or(false)
}

pub fn density(canvas: &CanvasModel, cx: i32, cy: i32, radius: i32) -> f64 {
    let mut total = 0usize;
    let mut filled = 0usize;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (cx + dx, cy + dy);
            if canvas.raster().get(x, y).is_some() {
                total += 1;
                if is_filled(canvas, x, y) {
                    filled += 1;
                }
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        filled as f64 / total as f64
    }
}

fn density_glyph(value: f64) -> char {
    match value {
        v if v <= 0.0 => EMPTY,
        v if v < 0.2 => '░',
        v if v < 0.4 => '▒',
        v if v < 0.7 => '▓',
        _ => '█',
    }
}

pub fn edge_glyph(canvas: &CanvasModel, x: i32, y: i32) -> char {
    let at = |dx: i32, dy: i32| is_filled(canvas, x + dx, y + dy);
    if !at(0, 0) {
        return EMPTY;
    }
    let filled = (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| (dx, dy) != (0, 0) && at(dx, dy))
        .count();
    let (top, bottom, left, right) = (at(0, -1), at(0, 1), at(-1, 0), at(1, 0));
    match (top, bottom, left, right) {
        _ if filled >= 7 => '█',
        (true, false, false, true) => '┐',
        (true, false, true, false) => '┌',
        (false, true, false, true) => '┘',
        (false, true, true, false) => '└',
        (true, true, false, false) => '│',
        (false, false, true, true) => '─',
        (true, true, _, true) => '├',
        (true, true, true, _) => '┤',
        (_, true, true, true) => '┬',
        (true, _, true, true) => '┴',
        _ if at(-1, -1) && at(1, 1) => '╲',
        _ if at(1, -1) && at(-1, 1) => '╱',
        _ => '●',
    }
}

/// Square window around the cursor. Cells outside the canvas render as walls.
pub fn local_view(canvas: &CanvasModel, mode: ViewMode, zoomed_out: bool) -> String {
    let limit = if zoomed_out {
        ZOOMED_VIEW_SIZE
    } else {
        LOCAL_VIEW_SIZE
    };
    let size = limit.min((canvas.width().min(canvas.height()) / 2).max(1)) as i32;
    let half = size / 2;
    let cursor = canvas.cursor();
    let mut out = String::new();

    let near_edge = cursor.x < EDGE_MARGIN
        || cursor.y < EDGE_MARGIN
        || cursor.x > canvas.width() as i32 - EDGE_MARGIN
        || cursor.y > canvas.height() as i32 - EDGE_MARGIN;
    if near_edge || zoomed_out {
        let label = if zoomed_out { "ZOOMED OUT" } else { "Near edge!" };
        let _ = write!(
            out,
            "[{label} Canvas: {}×{}, Scale: {:.1}]",
            canvas.width(),
            canvas.height(),
            canvas.scale()
        );
        if mode != ViewMode::Normal {
            let _ = write!(out, " [{} MODE]", mode.name().to_uppercase());
        }
        out.push('\n');
    }

    for dy in -half..=half {
        for dx in -half..=half {
            let (x, y) = (cursor.x + dx, cursor.y + dy);
            let glyph = match canvas.raster().get(x, y) {
                None => WALL,
                Some(_) if dx == 0 && dy == 0 => cursor_glyph(cursor.pen_down),
                Some(px) => match mode {
                    ViewMode::Normal => color_glyph(px),
                    ViewMode::Density => density_glyph(density(canvas, x, y, DENSITY_RADIUS)),
                    ViewMode::Shape => edge_glyph(canvas, x, y),
                },
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// Whole canvas sampled down to at most 60×60 cells.
pub fn compressed_view(canvas: &CanvasModel) -> String {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    let step = (w.max(h) / COMPRESSED_VIEW_SIZE as i32).max(1);
    let cursor = canvas.cursor();
    let mut out = format!(
        "[FULL CANVAS COMPRESSED VIEW - {w}×{h} → {}×{}]",
        (w + step - 1) / step,
        (h + step - 1) / step
    );
    for y in (0..h).step_by(step as usize) {
        out.push('\n');
        for x in (0..w).step_by(step as usize) {
            let glyph = if (x - cursor.x).abs() < step && (y - cursor.y).abs() < step {
                cursor_glyph(cursor.pen_down)
            } else {
                canvas.raster().get(x, y).map(color_glyph).unwrap_or(WALL)
            };
            out.push(glyph);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overview {
    pub filled: usize,
    pub total: usize,
    pub counts: BTreeMap<ColorId, usize>,
    pub unknown: usize,
}

impl Overview {
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.filled as f64 * 100.0 / self.total as f64
        }
    }
}

impl std::fmt::Display for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Canvas Overview: {} pixels drawn ({:.1}% coverage)",
            self.filled,
            self.coverage()
        )?;
        if !self.counts.is_empty() || self.unknown > 0 {
            let mut parts: Vec<String> = self
                .counts
                .iter()
                .map(|(color, count)| format!("{color}:{count}"))
                .collect();
            if self.unknown > 0 {
                parts.push(format!("unknown:{}", self.unknown));
            }
            write!(f, "\nColors used: {}", parts.join(", "))?;
        }
        Ok(())
    }
}

pub fn overview(canvas: &CanvasModel) -> Overview {
    let mut result = Overview {
        total: canvas.raster().pixels().len(),
        ..Overview::default()
    };
    for px in canvas.raster().pixels().iter().filter(|px| !px.is_black()) {
        result.filled += 1;
        match ColorId::classify(*px) {
            Some(color) => *result.counts.entry(color).or_insert(0) += 1,
            None => result.unknown += 1,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Direction;

    #[test]
    fn local_view_marks_cursor_and_walls() {
        let mut canvas = CanvasModel::with_size(20, 20);
        canvas.set_pen_down(false);
        for _ in 0..5 {
            canvas.move_cursor(Direction::Left);
        }
        let view = local_view(&canvas, ViewMode::Normal, false);
        let mut lines = view.lines();
        assert!(lines.next().is_some_and(|l| l.starts_with("[Near edge!")));
        let grid: Vec<&str> = lines.collect();
        assert_eq!(grid.len(), 11);
        let middle: Vec<char> = grid[5].chars().collect();
        assert_eq!(middle[5], '○');
        assert_eq!(middle[0], WALL);
    }

    #[test]
    fn overview_counts_by_exact_color() {
        let mut canvas = CanvasModel::with_size(10, 10);
        canvas.set_tool(crate::draw::model::ToolId::Pen);
        canvas.set_color(ColorId::Red);
        canvas.apply_stroke();
        let summary = overview(&canvas);
        assert_eq!(summary.filled, 9);
        assert_eq!(summary.counts.get(&ColorId::Red), Some(&9));
        assert_eq!(summary.unknown, 0);
        assert!(summary.to_string().contains("red:9"));
    }

    #[test]
    fn density_ignores_white() {
        let mut canvas = CanvasModel::with_size(10, 10);
        canvas.fill();
        assert_eq!(density(&canvas, 5, 5, 1), 0.0);
        canvas.set_color(ColorId::Blue);
        canvas.fill();
        assert_eq!(density(&canvas, 5, 5, 1), 1.0);
        assert_eq!(edge_glyph(&canvas, 5, 5), '█');
    }

    #[test]
    fn compressed_view_fits_in_sixty_columns() {
        let canvas = CanvasModel::with_size(300, 120);
        let view = compressed_view(&canvas);
        let rows: Vec<&str> = view.lines().skip(1).collect();
        assert_eq!(rows.len(), 24);
        assert!(rows.iter().all(|r| r.chars().count() == 60));
    }
}
