use macroquad::math::{uvec2, UVec2};

use crate::error::PainterError;

/// Map dimensions in cells and the on-screen size of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Columns on the canvas.
    pub width_cells: u32,
    /// Rows on the canvas.
    pub height_cells: u32,
    /// Pixel size of one cell on screen.
    pub scale: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width_cells: 30,
            height_cells: 15,
            scale: 32,
        }
    }
}

impl CanvasConfig {
    /// Validated configuration.
    pub fn new(width_cells: u32, height_cells: u32, scale: u32) -> Result<Self, PainterError> {
        let cfg = CanvasConfig {
            width_cells,
            height_cells,
            scale,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects empty maps, a zero scale and canvases too large to address.
    pub fn validate(&self) -> Result<(), PainterError> {
        if self.width_cells == 0 || self.height_cells == 0 {
            return Err(PainterError::InvalidConfig(format!(
                "map must be at least 1x1 cells, got {}x{}",
                self.width_cells, self.height_cells
            )));
        }
        if self.scale == 0 {
            return Err(PainterError::InvalidConfig("scale must be positive".into()));
        }
        let fits = |cells: u32| cells.checked_mul(self.scale).is_some_and(|px| px <= i32::MAX as u32);
        if !fits(self.width_cells) || !fits(self.height_cells) {
            return Err(PainterError::InvalidConfig(format!(
                "{}x{} cells at scale {} overflows the pixel range",
                self.width_cells, self.height_cells, self.scale
            )));
        }
        Ok(())
    }

    /// Interactive canvas size in pixels.
    pub fn canvas_size(&self) -> UVec2 {
        uvec2(self.width_cells * self.scale, self.height_cells * self.scale)
    }

    /// Exported raster size, one pixel per cell.
    pub fn export_size(&self) -> UVec2 {
        uvec2(self.width_cells, self.height_cells)
    }
}
