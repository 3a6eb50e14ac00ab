pub mod canvas;
pub mod footprint;
pub mod model;
pub mod render;
pub mod save;
pub mod views;

pub use canvas::{CanvasModel, Cursor, PixelSize, Raster};
pub use model::{ColorId, Direction, Rgb, ToolId};
