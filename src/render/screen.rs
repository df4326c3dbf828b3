//! Drawing on the live window.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use macroquad::color::Color;
use macroquad::math::UVec2;
use macroquad::shapes::{draw_line, draw_rectangle, draw_rectangle_lines};
use macroquad::texture::{draw_texture, load_texture, FilterMode, Texture2D};
use tracing::{debug, warn};

use crate::geom::TileColor;
use crate::palette::Palette;
use crate::render::Renderer;

/// Tile art textures keyed by asset path.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Texture2D>,
}

impl TextureCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every palette asset. Art that fails to load is skipped and the
    /// tile is drawn as flat colour instead.
    pub async fn load(palette: &Palette) -> Self {
        let mut cache = Self::new();
        for entry in palette.entries() {
            let Some(path) = &entry.asset else { continue };
            if cache.textures.contains_key(path) {
                continue;
            }
            match load_texture(&path.to_string_lossy()).await {
                Ok(tex) => {
                    tex.set_filter(FilterMode::Nearest);
                    cache.textures.insert(path.clone(), tex);
                }
                Err(err) => warn!(asset = %path.display(), "failed to load tile art: {err}"),
            }
        }
        debug!(count = cache.textures.len(), "tile art loaded");
        cache
    }

    /// Texture loaded from `path`.
    pub fn get(&self, path: &Path) -> Option<&Texture2D> {
        self.textures.get(path)
    }

    /// Number of loaded textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Draws straight to the macroquad window.
pub struct ScreenRenderer<'t> {
    textures: &'t TextureCache,
}

impl<'t> ScreenRenderer<'t> {
    /// Renderer blitting from `textures`.
    pub fn new(textures: &'t TextureCache) -> Self {
        ScreenRenderer { textures }
    }
}

impl Renderer for ScreenRenderer<'_> {
    fn fill_rect(&mut self, pos: UVec2, w: u32, h: u32, color: TileColor) {
        draw_rectangle(pos.x as f32, pos.y as f32, w as f32, h as f32, color.into());
    }

    fn draw_line(&mut self, from: UVec2, to: UVec2, color: TileColor) {
        draw_line(
            from.x as f32,
            from.y as f32,
            to.x as f32,
            to.y as f32,
            1.0,
            color.into(),
        );
    }

    fn blit_image(&mut self, asset: &Path, pos: UVec2, alpha: u8) -> bool {
        let Some(tex) = self.textures.get(asset) else {
            return false;
        };
        let tint = Color::new(1.0, 1.0, 1.0, f32::from(alpha) / 255.0);
        draw_texture(tex, pos.x as f32, pos.y as f32, tint);
        true
    }

    // frames are flipped by `next_frame().await` in the event loop
    fn present(&mut self) {}

    fn stroke_rect(&mut self, pos: UVec2, w: u32, h: u32, color: TileColor) {
        draw_rectangle_lines(pos.x as f32, pos.y as f32, w as f32, h as f32, 2.0, color.into());
    }
}
