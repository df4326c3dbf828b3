//! Turning layers into draw instructions and executing them.

use std::path::Path;

use macroquad::math::{uvec2, UVec2};

use crate::geom::TileColor;

pub mod compose;
pub mod raster;
pub mod screen;

pub use compose::{CompositionMode, Compositor, FadeMode};
pub use raster::{Raster, RasterRenderer};
pub use screen::{ScreenRenderer, TextureCache};

/// Drawing surface the compositor's output is executed against.
pub trait Renderer {
    /// Fill a `w × h` rectangle whose top-left corner is `pos`.
    fn fill_rect(&mut self, pos: UVec2, w: u32, h: u32, color: TileColor);

    /// One-pixel line between two inclusive endpoints.
    fn draw_line(&mut self, from: UVec2, to: UVec2, color: TileColor);

    /// Draw tile art at `pos`. Returns false if the image is unavailable.
    fn blit_image(&mut self, asset: &Path, pos: UVec2, alpha: u8) -> bool;

    /// Make everything drawn so far visible.
    fn present(&mut self);

    /// Rectangle border built from four lines.
    fn stroke_rect(&mut self, pos: UVec2, w: u32, h: u32, color: TileColor) {
        if w == 0 || h == 0 {
            return;
        }
        let (x0, y0) = (pos.x, pos.y);
        let (x1, y1) = (pos.x + w - 1, pos.y + h - 1);
        self.draw_line(uvec2(x0, y0), uvec2(x1, y0), color);
        self.draw_line(uvec2(x0, y1), uvec2(x1, y1), color);
        self.draw_line(uvec2(x0, y0), uvec2(x0, y1), color);
        self.draw_line(uvec2(x1, y0), uvec2(x1, y1), color);
    }
}
