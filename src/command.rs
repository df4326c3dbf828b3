use std::path::PathBuf;

use macroquad::math::UVec2;

use crate::geom::TileColor;
use crate::render::Renderer;

/// One rasterization step produced by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DrawCommand {
    /// Solid `w × h` rectangle with its top-left corner at `pos`.
    FillRect {
        pos: UVec2,
        w: u32,
        h: u32,
        color: TileColor,
    },
    /// One-pixel line, both endpoints inclusive.
    Line {
        from: UVec2,
        to: UVec2,
        color: TileColor,
    },
    /// Tile art; `color` is filled instead when the renderer has no image.
    Blit {
        asset: PathBuf,
        pos: UVec2,
        size: u32,
        color: TileColor,
        alpha: u8,
    },
    /// Rectangle border only.
    OutlineRect {
        pos: UVec2,
        w: u32,
        h: u32,
        color: TileColor,
    },
}

impl DrawCommand {
    /// Run this step against `renderer`.
    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match self {
            DrawCommand::FillRect { pos, w, h, color } => renderer.fill_rect(*pos, *w, *h, *color),
            DrawCommand::Line { from, to, color } => renderer.draw_line(*from, *to, *color),
            DrawCommand::Blit {
                asset,
                pos,
                size,
                color,
                alpha,
            } => {
                if !renderer.blit_image(asset, *pos, *alpha) {
                    renderer.fill_rect(*pos, *size, *size, color.with_alpha(*alpha));
                }
            }
            DrawCommand::OutlineRect { pos, w, h, color } => {
                renderer.stroke_rect(*pos, *w, *h, *color)
            }
        }
    }
}

/// Run every command in order, then present.
pub fn execute<'a, R, I>(commands: I, renderer: &mut R)
where
    R: Renderer + ?Sized,
    I: IntoIterator<Item = &'a DrawCommand>,
{
    for cmd in commands {
        cmd.apply(renderer);
    }
    renderer.present();
}
