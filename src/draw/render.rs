use crate::draw::canvas::CanvasModel;
use image::{Rgba, RgbaImage};

const OUTSIDE: Rgba<u8> = Rgba([24, 24, 24, 255]);
const CURSOR_PEN_DOWN: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CURSOR_PEN_UP: Rgba<u8> = Rgba([128, 128, 128, 255]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    /// The whole canvas at display scale.
    Full,
    /// A fixed-size window centered on the cursor.
    Centered { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub display_scale: f64,
    pub viewport: Viewport,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            display_scale: 1.0,
            viewport: Viewport::Full,
        }
    }
}

pub fn cursor_radius(display_scale: f64) -> i32 {
    ((7.0 * display_scale) as i32).max(5)
}

/// Produces the displayed frame: the canvas scaled by nearest-neighbour
/// sampling plus the cursor marker.
pub fn frame(canvas: &CanvasModel, settings: RenderSettings) -> RgbaImage {
    let scale = settings.display_scale.max(0.1);
    let full_w = ((canvas.width() as f64 * scale).round() as u32).max(1);
    let full_h = ((canvas.height() as f64 * scale).round() as u32).max(1);
    let cursor = canvas.cursor();
    let cursor_px = (
        ((cursor.x as f64 + 0.5) * scale) as i64,
        ((cursor.y as f64 + 0.5) * scale) as i64,
    );

    let (out_w, out_h, origin) = match settings.viewport {
        Viewport::Full => (full_w, full_h, (0i64, 0i64)),
        Viewport::Centered { width, height } => {
            let (w, h) = (width.max(1), height.max(1));
            (w, h, (cursor_px.0 - w as i64 / 2, cursor_px.1 - h as i64 / 2))
        }
    };

    let raster = canvas.raster();
    let mut img = RgbaImage::from_pixel(out_w, out_h, OUTSIDE);
    for (ox, oy, px) in img.enumerate_pixels_mut() {
        let sx = ox as i64 + origin.0;
        let sy = oy as i64 + origin.1;
        if sx < 0 || sy < 0 || sx >= full_w as i64 || sy >= full_h as i64 {
            continue;
        }
        let cx = (sx as f64 / scale) as i32;
        let cy = (sy as f64 / scale) as i32;
        if let Some(rgb) = raster.get(cx, cy) {
            *px = Rgba([rgb.r, rgb.g, rgb.b, 255]);
        }
    }

    let marker = if cursor.pen_down {
        CURSOR_PEN_DOWN
    } else {
        CURSOR_PEN_UP
    };
    let radius = cursor_radius(scale) as i64;
    let center = (cursor_px.0 - origin.0, cursor_px.1 - origin.1);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (center.0 + dx, center.1 + dy);
            if x >= 0 && y >= 0 && x < out_w as i64 && y < out_h as i64 {
                img.put_pixel(x as u32, y as u32, marker);
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::ColorId;

    #[test]
    fn full_frame_scales_canvas_and_draws_cursor() {
        let mut canvas = CanvasModel::with_size(40, 30);
        canvas.set_color(ColorId::Red);
        canvas.fill();
        let img = frame(
            &canvas,
            RenderSettings {
                display_scale: 2.0,
                viewport: Viewport::Full,
            },
        );
        assert_eq!(img.dimensions(), (80, 60));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(41, 31), &CURSOR_PEN_DOWN);
    }

    #[test]
    fn pen_up_cursor_is_gray() {
        let mut canvas = CanvasModel::with_size(40, 30);
        canvas.set_pen_down(false);
        let img = frame(&canvas, RenderSettings::default());
        assert_eq!(img.get_pixel(20, 15), &CURSOR_PEN_UP);
        assert_eq!(cursor_radius(1.0), 7);
        assert_eq!(cursor_radius(0.5), 5);
    }

    #[test]
    fn centered_view_puts_cursor_in_the_middle() {
        let canvas = CanvasModel::with_size(200, 200);
        let img = frame(
            &canvas,
            RenderSettings {
                display_scale: 1.0,
                viewport: Viewport::Centered {
                    width: 500,
                    height: 400,
                },
            },
        );
        assert_eq!(img.dimensions(), (500, 400));
        assert_eq!(img.get_pixel(250, 200), &CURSOR_PEN_DOWN);
        assert_eq!(img.get_pixel(0, 0), &OUTSIDE);
    }
}
