//! Software rasterization for exports.

use std::path::Path;

use macroquad::math::UVec2;

use crate::geom::TileColor;
use crate::render::Renderer;

/// CPU-side RGBA8 image, row-major, top-left origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// A fresh white raster, the background of every export.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileColor::WHITE)
    }

    /// Raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: TileColor) -> Self {
        let rgba = color.to_array();
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Raster {
            width,
            height,
            pixels,
        }
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel at `(x, y)`, `None` outside the raster.
    pub fn get(&self, x: u32, y: u32) -> Option<TileColor> {
        let i = self.offset(x, y)?;
        let p = &self.pixels[i..i + 4];
        Some(TileColor::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Source-over write; out-of-bounds pixels are dropped.
    pub fn put(&mut self, x: u32, y: u32, color: TileColor) {
        let Some(i) = self.offset(x, y) else {
            return;
        };
        let dst = &mut self.pixels[i..i + 4];
        match color.a {
            0 => {}
            255 => dst.copy_from_slice(&color.to_array()),
            a => {
                let a = u32::from(a);
                let blend = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * (255 - a) + 127) / 255) as u8;
                dst[0] = blend(color.r, dst[0]);
                dst[1] = blend(color.g, dst[1]);
                dst[2] = blend(color.b, dst[2]);
                dst[3] = (a + u32::from(dst[3]) * (255 - a) / 255) as u8;
            }
        }
    }

    /// Cells that differ from `background`, in row-major order.
    pub fn non_background(&self, background: TileColor) -> Vec<(u32, u32, TileColor)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(c) = self.get(x, y).filter(|c| *c != background) {
                    out.push((x, y, c));
                }
            }
        }
        out
    }
}

/// Executes draw instructions into a [`Raster`].
pub struct RasterRenderer<'a> {
    raster: &'a mut Raster,
}

impl<'a> RasterRenderer<'a> {
    /// Renderer drawing into `raster`.
    pub fn new(raster: &'a mut Raster) -> Self {
        RasterRenderer { raster }
    }
}

impl Renderer for RasterRenderer<'_> {
    fn fill_rect(&mut self, pos: UVec2, w: u32, h: u32, color: TileColor) {
        let x_end = pos.x.saturating_add(w).min(self.raster.width);
        let y_end = pos.y.saturating_add(h).min(self.raster.height);
        for y in pos.y..y_end {
            for x in pos.x..x_end {
                self.raster.put(x, y, color);
            }
        }
    }

    fn draw_line(&mut self, from: UVec2, to: UVec2, color: TileColor) {
        let (mut x, mut y) = (i64::from(from.x), i64::from(from.y));
        let (x1, y1) = (i64::from(to.x), i64::from(to.y));
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            // both stay within u32 range since endpoints are u32
            self.raster.put(x as u32, y as u32, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn blit_image(&mut self, _asset: &Path, _pos: UVec2, _alpha: u8) -> bool {
        false
    }

    fn present(&mut self) {}
}
