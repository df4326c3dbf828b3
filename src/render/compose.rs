//! Layer stacks to draw instructions.

use std::path::Path;

use macroquad::math::{uvec2, IVec2, UVec2};
use tracing::trace;

use crate::command::DrawCommand;
use crate::geom::{grid_to_screen, snap_to_cell, GridCoord, Region, TileColor, TILE_ART_SIZE};
use crate::layer::Layer;
use crate::palette::{Palette, PaletteEntry};
use crate::stack::LayerStack;

/// Colour of the cell grid drawn over the canvas.
pub const GRID_COLOR: TileColor = TileColor::GRAY;
/// Canvas background.
pub const CANVAS_COLOR: TileColor = TileColor::WHITE;
/// Outline around the cell under the pointer.
pub const OUTLINE_COLOR: TileColor = TileColor::YELLOW;
/// Used instead of [`OUTLINE_COLOR`] when the selection is itself yellow.
pub const OUTLINE_ALT_COLOR: TileColor = TileColor::CYAN;

const OPAQUE: u8 = 255;

/// Opacity applied to lower layers in cumulative mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeMode {
    /// Every layer fully opaque.
    #[default]
    Opaque,
    /// Layer `i` under cursor `c` gets alpha `255 * (i + 1) / (c + 1)`.
    Linear,
}

impl FadeMode {
    fn alpha(self, index: usize, top: usize) -> u8 {
        match self {
            FadeMode::Opaque => OPAQUE,
            FadeMode::Linear => {
                let (i, c) = (index.min(top) as u64, top as u64);
                ((i + 1) * 255 / (c + 1)) as u8
            }
        }
    }
}

/// Which layers a frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    /// Only the layer under the cursor.
    Single,
    /// Every layer from the base through the cursor.
    Cumulative,
}

impl CompositionMode {
    /// Cumulative only with transparency on, the cursor above the base and
    /// more than one layer.
    pub fn for_stack(stack: &LayerStack) -> Self {
        if stack.is_transparent() && stack.cursor() > 0 && stack.len() > 1 {
            CompositionMode::Cumulative
        } else {
            CompositionMode::Single
        }
    }
}

/// Produces draw instructions for a layer stack at a given scale.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'p> {
    palette: &'p Palette,
    scale: u32,
    fade: FadeMode,
}

impl<'p> Compositor<'p> {
    /// Compositor drawing cells `scale` pixels wide, opaque.
    pub fn new(palette: &'p Palette, scale: u32) -> Self {
        debug_assert!(scale > 0, "scale must be positive");
        Compositor {
            palette,
            scale,
            fade: FadeMode::Opaque,
        }
    }

    /// Fade applied to lower layers in cumulative mode.
    pub fn with_fade(mut self, fade: FadeMode) -> Self {
        self.fade = fade;
        self
    }

    /// Pixel size of one cell.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Layer content for the stack's current cursor and transparency flag.
    pub fn compose(&self, stack: &LayerStack) -> Vec<DrawCommand> {
        match CompositionMode::for_stack(stack) {
            CompositionMode::Single => {
                let mut out = Vec::with_capacity(stack.current().len());
                self.compose_layer(stack.current(), OPAQUE, &mut out);
                out
            }
            CompositionMode::Cumulative => self.compose_through(stack, stack.cursor()),
        }
    }

    /// Layers `0..=through` bottom to top. Indices past the top are ignored.
    pub fn compose_through(&self, stack: &LayerStack, through: usize) -> Vec<DrawCommand> {
        let top = through.min(stack.len().saturating_sub(1));
        let mut out = Vec::new();
        for (i, layer) in stack.layers().iter().enumerate().take(top.saturating_add(1)) {
            self.compose_layer(layer, self.fade.alpha(i, top), &mut out);
        }
        out
    }

    /// Append one instruction per cell of `layer` to `out`.
    ///
    /// Cells whose pixel position does not fit the screen coordinate range
    /// are skipped.
    pub fn compose_layer(&self, layer: &Layer, alpha: u8, out: &mut Vec<DrawCommand>) {
        out.extend(layer.cells().filter_map(|(coord, color)| {
            self.cell_command(coord, color, self.palette.asset_for(color), alpha)
        }));
    }

    fn cell_command(
        &self,
        coord: GridCoord,
        color: TileColor,
        asset: Option<&Path>,
        alpha: u8,
    ) -> Option<DrawCommand> {
        let Some(pos) = grid_to_screen(coord, self.scale) else {
            trace!(col = coord.col, row = coord.row, "cell outside pixel range, skipped");
            return None;
        };
        Some(self.tile_at(pos, color, asset, alpha))
    }

    fn tile_at(
        &self,
        pos: UVec2,
        color: TileColor,
        asset: Option<&Path>,
        alpha: u8,
    ) -> DrawCommand {
        match asset {
            Some(asset) if self.scale == TILE_ART_SIZE => DrawCommand::Blit {
                asset: asset.to_path_buf(),
                pos,
                size: self.scale,
                color,
                alpha,
            },
            // scale 1 degenerates to a single pixel write
            _ => DrawCommand::FillRect {
                pos,
                w: self.scale,
                h: self.scale,
                color: color.with_alpha(alpha),
            },
        }
    }

    /// Vertical then horizontal grid lines over a `width × height` cell canvas.
    pub fn grid(&self, width_cells: u32, height_cells: u32) -> Vec<DrawCommand> {
        let w_px = width_cells.saturating_mul(self.scale);
        let h_px = height_cells.saturating_mul(self.scale);
        let verticals = (0..width_cells).map(|j| DrawCommand::Line {
            from: uvec2(j.saturating_mul(self.scale), 0),
            to: uvec2(j.saturating_mul(self.scale), h_px),
            color: GRID_COLOR,
        });
        let horizontals = (0..height_cells).map(|i| DrawCommand::Line {
            from: uvec2(0, i.saturating_mul(self.scale)),
            to: uvec2(w_px, i.saturating_mul(self.scale)),
            color: GRID_COLOR,
        });
        verticals.chain(horizontals).collect()
    }

    /// The interactive canvas: background, layer content, grid on top.
    pub fn frame(&self, stack: &LayerStack, width_cells: u32, height_cells: u32) -> Vec<DrawCommand> {
        let mut out = vec![DrawCommand::FillRect {
            pos: UVec2::ZERO,
            w: width_cells.saturating_mul(self.scale),
            h: height_cells.saturating_mul(self.scale),
            color: CANVAS_COLOR,
        }];
        out.extend(self.compose(stack));
        out.extend(self.grid(width_cells, height_cells));
        out
    }

    /// Preview of `selected` at the cell under the pointer, with an outline.
    ///
    /// Nothing is produced while the pointer is off the canvas.
    pub fn ghost(&self, pointer: IVec2, canvas: Region, selected: &PaletteEntry) -> Vec<DrawCommand> {
        let Some(local) = canvas.local(pointer) else {
            return Vec::new();
        };
        let pos = canvas.origin + snap_to_cell(local, self.scale);
        let outline = if selected.color == OUTLINE_COLOR {
            OUTLINE_ALT_COLOR
        } else {
            OUTLINE_COLOR
        };
        vec![
            self.tile_at(pos, selected.color, selected.asset.as_deref(), OPAQUE),
            DrawCommand::OutlineRect {
                pos,
                w: self.scale,
                h: self.scale,
                color: outline,
            },
        ]
    }
}
