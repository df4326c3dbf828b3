#![warn(missing_docs)]

//! Layered tile-map painter for Macroquad.
//!
//! Paint cells onto a stack of layers, preview them scaled up with a grid,
//! and export layers as one-pixel-per-cell PNG files.

mod command;
mod config;
mod error;
pub mod export;
mod geom;
mod input;
mod layer;
mod palette;
pub mod render;
pub mod session;
mod stack;

pub use command::{execute, DrawCommand};
pub use config::CanvasConfig;
pub use error::PainterError;
pub use export::{Exporter, ImageSink, PngSink};
pub use geom::{grid_to_screen, screen_to_grid, snap_to_cell, GridCoord, Region, TileColor, TILE_ART_SIZE};
pub use input::{InputSource, MacroquadInput, PointerButtons};
pub use layer::Layer;
pub use palette::{Palette, PaletteEntry};
pub use render::{CompositionMode, Compositor, FadeMode, Raster, RasterRenderer, Renderer};
pub use session::{Action, CumulativeExport, EditorSession, Flow, Layout, SaveStatus};
pub use stack::LayerStack;
