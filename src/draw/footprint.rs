//! Relative cell offsets written by each tool around the cursor.

use crate::draw::model::ToolId;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::BTreeSet;

pub const SPRAY_RADIUS: i32 = 20;
const SPRAY_INNER_CHANCE: f64 = 0.45;
const SPRAY_OUTER_CHANCE: f64 = 0.30;

/// Source of randomness for the spray tool.
pub trait SprayRng {
    /// Returns `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl SprayRng for StdRng {
    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p.clamp(0.0, 1.0))
    }
}

pub enum Footprint {
    Fixed(&'static [(i32, i32)]),
    Spray,
}

static PEN: Lazy<Vec<(i32, i32)>> = Lazy::new(|| square(3));
static BRUSH: Lazy<Vec<(i32, i32)>> = Lazy::new(|| square(12));
static LARGE_BRUSH: Lazy<Vec<(i32, i32)>> = Lazy::new(|| square(20));
static LARGER_BRUSH: Lazy<Vec<(i32, i32)>> = Lazy::new(|| square(28));
static STAR: Lazy<Vec<(i32, i32)>> = Lazy::new(|| star(15.0, 7.0));
static CROSS: Lazy<Vec<(i32, i32)>> = Lazy::new(|| cross(20, 3));
static CIRCLE: Lazy<Vec<(i32, i32)>> = Lazy::new(|| disk(12));
static DIAMOND: Lazy<Vec<(i32, i32)>> = Lazy::new(|| diamond(16));
static FLOWER: Lazy<Vec<(i32, i32)>> = Lazy::new(flower);

pub fn footprint(tool: ToolId) -> Footprint {
    match tool {
        ToolId::Pen => Footprint::Fixed(&PEN),
        ToolId::Brush => Footprint::Fixed(&BRUSH),
        ToolId::LargeBrush => Footprint::Fixed(&LARGE_BRUSH),
        ToolId::LargerBrush => Footprint::Fixed(&LARGER_BRUSH),
        ToolId::Spray => Footprint::Spray,
        ToolId::Star => Footprint::Fixed(&STAR),
        ToolId::Cross => Footprint::Fixed(&CROSS),
        ToolId::Circle => Footprint::Fixed(&CIRCLE),
        ToolId::Diamond => Footprint::Fixed(&DIAMOND),
        ToolId::Flower => Footprint::Fixed(&FLOWER),
    }
}

/// One spray application: every cell of the radius-20 disk is tried once.
pub fn spray_cells(rng: &mut dyn SprayRng) -> Vec<(i32, i32)> {
    let inner = (SPRAY_RADIUS / 2) * (SPRAY_RADIUS / 2);
    disk(SPRAY_RADIUS)
        .into_iter()
        .filter(|&(dx, dy)| {
            let chance = if dx * dx + dy * dy <= inner {
                SPRAY_INNER_CHANCE
            } else {
                SPRAY_OUTER_CHANCE
            };
            rng.chance(chance)
        })
        .collect()
}

/// Side `n` square, offsets `-n/2 ..= n - n/2 - 1`.
pub fn square(side: i32) -> Vec<(i32, i32)> {
    let lo = -(side / 2);
    let hi = lo + side - 1;
    let mut cells = Vec::with_capacity((side * side) as usize);
    for dy in lo..=hi {
        for dx in lo..=hi {
            cells.push((dx, dy));
        }
    }
    cells
}

pub fn disk(radius: i32) -> Vec<(i32, i32)> {
    let r2 = radius * radius;
    let mut cells = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                cells.push((dx, dy));
            }
        }
    }
    cells
}

fn diamond(size: i32) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    for dy in -size..=size {
        for dx in -size..=size {
            if dx.abs() + dy.abs() <= size {
                cells.push((dx, dy));
            }
        }
    }
    cells
}

fn cross(arm: i32, half_thickness: i32) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    for dy in -arm..=arm {
        for dx in -arm..=arm {
            let vertical = dx.abs() <= half_thickness;
            let horizontal = dy.abs() <= half_thickness;
            if vertical || horizontal {
                cells.push((dx, dy));
            }
        }
    }
    cells
}

fn star(outer: f64, inner: f64) -> Vec<(i32, i32)> {
    let vertices: Vec<(f64, f64)> = (0..10)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::PI / 5.0 - std::f64::consts::FRAC_PI_2;
            let r = if i % 2 == 0 { outer } else { inner };
            (r * angle.cos(), r * angle.sin())
        })
        .collect();
    let bound = outer.ceil() as i32;
    let mut cells = Vec::new();
    for dy in -bound..=bound {
        for dx in -bound..=bound {
            if point_in_polygon((dx as f64, dy as f64), &vertices) {
                cells.push((dx, dy));
            }
        }
    }
    cells
}

fn point_in_polygon(point: (f64, f64), vertices: &[(f64, f64)]) -> bool {
    let (px, py) = point;
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn flower() -> Vec<(i32, i32)> {
    let mut cells: BTreeSet<(i32, i32)> = disk(6).into_iter().collect();
    for k in 0..8 {
        let angle = (k as f64) * std::f64::consts::FRAC_PI_4;
        let cx = (11.0 * angle.cos()).round() as i32;
        let cy = (11.0 * angle.sin()).round() as i32;
        cells.extend(disk(5).into_iter().map(|(dx, dy)| (cx + dx, cy + dy)));
    }
    cells.into_iter().collect()
}
