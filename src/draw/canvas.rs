use crate::draw::footprint::{footprint, spray_cells, Footprint, SprayRng};
use crate::draw::model::{ColorId, Direction, Rgb, ToolId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Cursor displacement for one movement token.
pub const STEP: i32 = 7;
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 8.0;
pub const SCALE_STEP: f64 = 1.25;
/// Border subtracted from each screen dimension when sizing the canvas.
pub const CANVAS_MARGIN: u32 = 40;
pub const COLOR_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    pub fn filled(width: u32, height: u32, rgb: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgb; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Writes one cell. Out-of-range coordinates are ignored and return `false`.
    pub fn set(&mut self, x: i32, y: i32, rgb: Rgb) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.pixels[idx] = rgb;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, rgb: Rgb) {
        self.pixels.iter_mut().for_each(|px| *px = rgb);
    }

    pub fn painted_count(&self) -> usize {
        self.pixels.iter().filter(|px| !px.is_black()).count()
    }

    /// Recenters the raster into a new size: grown axes are padded with black,
    /// shrunk axes are cropped symmetrically. Returns the new raster and the
    /// offset applied to old coordinates.
    pub fn migrate(&self, width: u32, height: u32) -> (Raster, (i32, i32)) {
        let dx = (width as i32 - self.width as i32) / 2;
        let dy = (height as i32 - self.height as i32) / 2;
        let mut out = Raster::new(width, height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let idx = y as usize * self.width as usize + x as usize;
                out.set(x + dx, y + dy, self.pixels[idx]);
            }
        }
        (out, (dx, dy))
    }

    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[y as usize * self.width as usize + x as usize];
            image::Rgb(px.to_array())
        })
    }

    pub fn from_image(img: &image::RgbImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
    pub pen_down: bool,
    pub color: ColorId,
    pub tool: ToolId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSize {
    /// `zoom_out`: the scale grows, so the canvas shrinks around its center.
    Smaller,
    /// `zoom_in`: the scale shrinks back toward 1.0.
    Larger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub moved: bool,
    pub painted: usize,
}

/// Side lengths of the canvas for a screen size and pixel scale.
pub fn canvas_dims(screen: (u32, u32), scale: f64) -> (u32, u32) {
    let side = |dim: u32| ((dim as f64 / scale) as i64 - CANVAS_MARGIN as i64).max(1) as u32;
    (side(screen.0), side(screen.1))
}

pub struct CanvasModel {
    raster: Raster,
    cursor: Cursor,
    scale: f64,
    screen: (u32, u32),
    color_history: VecDeque<ColorId>,
    rng: Box<dyn SprayRng>,
}

impl std::fmt::Debug for CanvasModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasModel")
            .field("width", &self.raster.width)
            .field("height", &self.raster.height)
            .field("cursor", &self.cursor)
            .field("scale", &self.scale)
            .finish()
    }
}

impl CanvasModel {
    /// Canvas sized for `screen` at `scale`, cursor centered, pen down, white brush.
    pub fn for_screen(screen: (u32, u32), scale: f64) -> Self {
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let (width, height) = canvas_dims(screen, scale);
        let mut model = Self::with_size(width, height);
        model.scale = scale;
        model.screen = screen;
        model
    }

    /// Fixed-size canvas; the screen is derived so that scale 1.0 reproduces it.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width.max(1), height.max(1)),
            cursor: Cursor {
                x: width as i32 / 2,
                y: height as i32 / 2,
                pen_down: true,
                color: ColorId::White,
                tool: ToolId::Brush,
            },
            scale: MIN_SCALE,
            screen: (width + CANVAS_MARGIN, height + CANVAS_MARGIN),
            color_history: VecDeque::new(),
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    pub fn with_spray_rng(mut self, rng: Box<dyn SprayRng>) -> Self {
        self.rng = rng;
        self
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn width(&self) -> u32 {
        self.raster.width
    }

    pub fn height(&self) -> u32 {
        self.raster.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn screen(&self) -> (u32, u32) {
        self.screen
    }

    pub fn color_history(&self) -> impl Iterator<Item = ColorId> + '_ {
        self.color_history.iter().copied()
    }

    pub fn move_cursor(&mut self, dir: Direction) -> MoveOutcome {
        let (dx, dy) = dir.delta();
        let nx = (self.cursor.x + dx * STEP).clamp(0, self.width() as i32 - 1);
        let ny = (self.cursor.y + dy * STEP).clamp(0, self.height() as i32 - 1);
        let moved = (nx, ny) != (self.cursor.x, self.cursor.y);
        self.cursor.x = nx;
        self.cursor.y = ny;
        let painted = if moved && self.cursor.pen_down {
            self.apply_stroke()
        } else {
            0
        };
        MoveOutcome { moved, painted }
    }

    pub fn set_pen_down(&mut self, down: bool) {
        self.cursor.pen_down = down;
    }

    pub fn set_color(&mut self, color: ColorId) {
        if self.cursor.color == color {
            return;
        }
        self.cursor.color = color;
        self.color_history.push_back(color);
        while self.color_history.len() > COLOR_HISTORY_LIMIT {
            self.color_history.pop_front();
        }
    }

    pub fn set_tool(&mut self, tool: ToolId) {
        self.cursor.tool = tool;
    }

    pub fn center_cursor(&mut self) {
        self.cursor.x = self.width() as i32 / 2;
        self.cursor.y = self.height() as i32 / 2;
    }

    pub fn clear(&mut self) {
        self.raster.fill(Rgb::BLACK);
    }

    pub fn fill(&mut self) {
        self.raster.fill(self.cursor.color.rgb());
    }

    /// Paints the active tool's footprint at the cursor. Returns the number of
    /// cells that landed on the canvas.
    pub fn apply_stroke(&mut self) -> usize {
        let rgb = self.cursor.color.rgb();
        let (cx, cy) = (self.cursor.x, self.cursor.y);
        match footprint(self.cursor.tool) {
            Footprint::Fixed(cells) => self.paint(cx, cy, cells.iter().copied(), rgb),
            Footprint::Spray => {
                let cells = spray_cells(self.rng.as_mut());
                self.paint(cx, cy, cells.into_iter(), rgb)
            }
        }
    }

    fn paint(
        &mut self,
        cx: i32,
        cy: i32,
        cells: impl Iterator<Item = (i32, i32)>,
        rgb: Rgb,
    ) -> usize {
        cells
            .filter(|&(dx, dy)| self.raster.set(cx + dx, cy + dy, rgb))
            .count()
    }

    /// Changes the pixel scale one step and migrates the raster to the new
    /// canvas size. Returns `false` when the scale was already at its limit.
    pub fn adjust_pixel_size(&mut self, size: PixelSize) -> bool {
        let next = match size {
            PixelSize::Smaller => self.scale * SCALE_STEP,
            PixelSize::Larger => self.scale / SCALE_STEP,
        }
        .clamp(MIN_SCALE, MAX_SCALE);
        if (next - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = next;
        let (width, height) = canvas_dims(self.screen, next);
        self.resize(width, height);
        true
    }

    /// Recenters the raster into `width`×`height`, shifting the cursor along.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width(), self.height()) {
            return;
        }
        let (raster, (dx, dy)) = self.raster.migrate(width, height);
        tracing::debug!(
            from = ?(self.raster.width, self.raster.height),
            to = ?(width, height),
            "canvas migrated"
        );
        self.raster = raster;
        self.cursor.x = (self.cursor.x + dx).clamp(0, width as i32 - 1);
        self.cursor.y = (self.cursor.y + dy).clamp(0, height as i32 - 1);
    }

    /// Restores persisted state; the raster is recentered to the current size.
    pub fn restore(&mut self, raster: Option<&Raster>, cursor: Cursor, history: &[ColorId]) {
        if let Some(stored) = raster {
            let (migrated, (dx, dy)) = stored.migrate(self.width(), self.height());
            self.raster = migrated;
            self.cursor = Cursor {
                x: cursor.x + dx,
                y: cursor.y + dy,
                ..cursor
            };
        } else {
            self.cursor = cursor;
        }
        self.cursor.x = self.cursor.x.clamp(0, self.width() as i32 - 1);
        self.cursor.y = self.cursor.y.clamp(0, self.height() as i32 - 1);
        self.color_history = history
            .iter()
            .rev()
            .take(COLOR_HISTORY_LIMIT)
            .rev()
            .copied()
            .collect();
    }

    /// Sets the scale and screen without touching the raster (used when restoring).
    pub fn rescale(&mut self, screen: (u32, u32), scale: f64) {
        self.screen = screen;
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let (width, height) = canvas_dims(screen, self.scale);
        self.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush_canvas() -> CanvasModel {
        let mut canvas = CanvasModel::with_size(100, 100);
        canvas.set_tool(ToolId::Brush);
        canvas.set_pen_down(true);
        canvas
    }

    #[test]
    fn moves_clamp_at_the_left_edge() {
        let mut canvas = brush_canvas();
        canvas.set_pen_down(false);
        for _ in 0..20 {
            canvas.move_cursor(Direction::Left);
        }
        assert_eq!(canvas.cursor().x, 0);
        canvas.set_pen_down(true);
        let outcome = canvas.move_cursor(Direction::Left);
        assert_eq!(outcome, MoveOutcome { moved: false, painted: 0 });
        assert_eq!(canvas.raster().painted_count(), 0);
    }

    #[test]
    fn stroke_is_clipped_at_the_corner() {
        let mut canvas = brush_canvas();
        canvas.set_pen_down(false);
        for _ in 0..20 {
            canvas.move_cursor(Direction::Up);
            canvas.move_cursor(Direction::Left);
        }
        // 6×6 of the 12×12 brush remains inside at (0, 0).
        assert_eq!(canvas.apply_stroke(), 36);
    }

    #[test]
    fn every_tool_stays_inside_the_canvas() {
        for tool in ToolId::ALL {
            let mut canvas = CanvasModel::with_size(30, 20)
                .with_spray_rng(Box::new(StdRng::seed_from_u64(3)));
            canvas.set_tool(tool);
            for dir in [Direction::Up, Direction::Right, Direction::Down, Direction::Left] {
                for _ in 0..5 {
                    canvas.move_cursor(dir);
                }
            }
            assert_eq!(canvas.raster().pixels().len(), 600);
            assert!(canvas.cursor().x >= 0 && canvas.cursor().x < 30);
            assert!(canvas.cursor().y >= 0 && canvas.cursor().y < 20);
        }
    }

    #[test]
    fn color_history_appends_only_on_change() {
        let mut canvas = brush_canvas();
        canvas.set_color(ColorId::White);
        canvas.set_color(ColorId::Red);
        canvas.set_color(ColorId::Red);
        canvas.set_color(ColorId::Blue);
        let history: Vec<_> = canvas.color_history().collect();
        assert_eq!(history, vec![ColorId::Red, ColorId::Blue]);
    }

    #[test]
    fn color_history_is_bounded() {
        let mut canvas = brush_canvas();
        for i in 0..50 {
            let color = if i % 2 == 0 { ColorId::Red } else { ColorId::Green };
            canvas.set_color(color);
        }
        assert_eq!(canvas.color_history().count(), COLOR_HISTORY_LIMIT);
    }

    #[test]
    fn migrate_pads_and_crops_around_the_center() {
        let mut raster = Raster::new(4, 4);
        raster.set(1, 1, Rgb::new(1, 2, 3));
        let (grown, offset) = raster.migrate(8, 6);
        assert_eq!(offset, (2, 1));
        assert_eq!(grown.get(3, 2), Some(Rgb::new(1, 2, 3)));

        let (shrunk, offset) = grown.migrate(4, 4);
        assert_eq!(offset, (-2, -1));
        assert_eq!(shrunk.get(1, 1), Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn zooming_changes_size_and_keeps_cursor_inside() {
        let mut canvas = CanvasModel::for_screen((1920, 1080), 2.0);
        assert_eq!((canvas.width(), canvas.height()), (920, 500));
        assert!(canvas.adjust_pixel_size(PixelSize::Smaller));
        assert!((canvas.scale() - 2.5).abs() < 1e-9);
        assert_eq!((canvas.width(), canvas.height()), (728, 392));
        assert_eq!(canvas.cursor(), Cursor { x: 364, y: 196, ..canvas.cursor() });
    }

    #[test]
    fn zoom_out_from_the_default_scale_resizes_the_canvas() {
        let mut canvas = CanvasModel::for_screen((1920, 1080), MIN_SCALE);
        assert_eq!((canvas.width(), canvas.height()), (1880, 1040));
        assert_eq!((canvas.cursor().x, canvas.cursor().y), (940, 520));
        assert!(canvas.adjust_pixel_size(PixelSize::Smaller));
        assert!((canvas.scale() - SCALE_STEP).abs() < 1e-9);
        // 1920 / 1.25 - 40 and 1080 / 1.25 - 40.
        assert_eq!((canvas.width(), canvas.height()), (1496, 824));
        assert_eq!((canvas.cursor().x, canvas.cursor().y), (748, 412));

        assert!(canvas.adjust_pixel_size(PixelSize::Larger));
        assert_eq!((canvas.width(), canvas.height()), (1880, 1040));
        assert_eq!((canvas.cursor().x, canvas.cursor().y), (940, 520));
    }

    #[test]
    fn scale_is_clamped() {
        let mut canvas = CanvasModel::for_screen((400, 300), MIN_SCALE);
        assert!(!canvas.adjust_pixel_size(PixelSize::Larger));
        for _ in 0..20 {
            canvas.adjust_pixel_size(PixelSize::Smaller);
        }
        assert!((canvas.scale() - MAX_SCALE).abs() < 1e-9);
        assert_eq!(canvas.width(), 10);
    }
}
