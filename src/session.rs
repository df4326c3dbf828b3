//! Editing session: the state one window owns and the actions that mutate it.

use std::path::PathBuf;

use macroquad::input::KeyCode;
use macroquad::math::{uvec2, IVec2, UVec2};
use tracing::{info, warn};

use crate::command::DrawCommand;
use crate::config::CanvasConfig;
use crate::error::PainterError;
use crate::export::{Exporter, ImageSink, PngSink};
use crate::geom::{screen_to_grid, GridCoord, Region, TileColor};
use crate::input::{InputSource, PointerButtons};
use crate::palette::{Palette, PaletteEntry};
use crate::render::compose::OUTLINE_COLOR;
use crate::render::{Compositor, FadeMode};
use crate::stack::LayerStack;

/// Width of the palette and layer menu right of the canvas.
pub const SIDE_MENU_WIDTH: u32 = 128;
/// Height of the save/quit bar below the canvas.
pub const BOTTOM_MENU_HEIGHT: u32 = 90;
/// Side length of one palette swatch.
pub const SWATCH_SIZE: u32 = 32;
const SWATCH_ORIGIN: UVec2 = UVec2::new(32, 30);
const SWATCH_COLUMNS: u32 = 2;

/// Menu background.
pub const MENU_COLOR: TileColor = TileColor::GRAY;
#[allow(missing_docs)]
pub const SAVE_COLOR: TileColor = TileColor::rgb(0x7d, 0xff, 0x00);
#[allow(missing_docs)]
pub const QUIT_COLOR: TileColor = TileColor::rgb(0xff, 0x00, 0x51);
/// Layer indicator fill while transparency is on.
pub const TRANSPARENT_ON_COLOR: TileColor = TileColor::rgb(0x00, 0xbc, 0xff);

/// How long the "Saved!" notice stays up, in seconds.
pub const SAVED_NOTICE_SECS: f64 = 2.0;

/// Something the user asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Paint the selected colour into a cell of the current layer.
    Paint(GridCoord),
    /// Clear a cell of the current layer.
    Erase(GridCoord),
    /// Move up a layer, creating it if needed.
    Ascend,
    /// Move down a layer, stopping at the base.
    Descend,
    /// Back to the base layer.
    ResetLayer,
    #[allow(missing_docs)]
    ToggleTransparency,
    /// Select the palette entry at this index.
    SelectColor(usize),
    /// Export what is currently shown.
    Save,
    #[allow(missing_docs)]
    Quit,
}

/// Whether the event loop keeps running after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Flow {
    Continue,
    Quit,
}

/// Which file(s) a save writes while transparency is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CumulativeExport {
    /// One `layers_squashed.png`.
    #[default]
    Squashed,
    /// One `layers_<depth>.png` per non-empty depth.
    PerDepth,
}

/// Screen regions of the canvas, palette swatches and menu buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Painting area, anchored at the window origin.
    pub canvas: Region,
    /// One swatch per palette entry, in palette order.
    pub swatches: Vec<Region>,
    /// Ascend button.
    pub layer_up: Region,
    /// Shows the cursor; clicking it toggles transparency.
    pub layer_indicator: Region,
    /// Descend button.
    pub layer_down: Region,
    #[allow(missing_docs)]
    pub save: Region,
    #[allow(missing_docs)]
    pub quit: Region,
    /// Whole window size.
    pub window: UVec2,
}

impl Layout {
    /// Regions for a canvas of `config` and one swatch per palette entry.
    pub fn new(config: &CanvasConfig, palette: &Palette) -> Self {
        let canvas_px = config.canvas_size();
        let (w, h) = (canvas_px.x, canvas_px.y);
        let menu_y = h + BOTTOM_MENU_HEIGHT / 3;
        let layer_x = w + 48;
        let layer_y = (h + BOTTOM_MENU_HEIGHT) / 2;

        let swatches = palette
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let i = i as u32;
                let (col, row) = entry.slot.unwrap_or((i % SWATCH_COLUMNS, i / SWATCH_COLUMNS));
                Region::new(
                    w + SWATCH_ORIGIN.x + col * SWATCH_SIZE,
                    SWATCH_ORIGIN.y + row * SWATCH_SIZE,
                    SWATCH_SIZE,
                    SWATCH_SIZE,
                )
            })
            .collect();

        Layout {
            canvas: Region::new(0, 0, w, h),
            swatches,
            layer_up: Region::new(layer_x, layer_y, 32, 32),
            layer_indicator: Region::new(layer_x, layer_y + 32, 32, 32),
            layer_down: Region::new(layer_x, layer_y + 64, 32, 32),
            save: Region::new(w.saturating_sub(210), menu_y, 100, BOTTOM_MENU_HEIGHT / 3),
            quit: Region::new(w + 10, menu_y, 100, BOTTOM_MENU_HEIGHT / 3),
            window: uvec2(w + SIDE_MENU_WIDTH, h + BOTTOM_MENU_HEIGHT),
        }
    }

    /// Grid cell under a pointer, or an error when it is off the canvas.
    pub fn cell_at(&self, pointer: IVec2, scale: u32) -> Result<GridCoord, PainterError> {
        self.canvas
            .local(pointer)
            .map(|local| screen_to_grid(local, scale))
            .ok_or(PainterError::InvalidCoordinate {
                x: pointer.x,
                y: pointer.y,
            })
    }

    /// Map a click to an action. Left click paints, right click erases;
    /// menu buttons react to the left button only.
    pub fn action_at(&self, pointer: IVec2, buttons: PointerButtons, scale: u32) -> Option<Action> {
        if buttons.is_empty() {
            return None;
        }
        let left = buttons.contains(PointerButtons::LEFT);

        if left && self.quit.contains(pointer) {
            return Some(Action::Quit);
        }
        if let Ok(cell) = self.cell_at(pointer, scale) {
            return if left {
                Some(Action::Paint(cell))
            } else if buttons.contains(PointerButtons::RIGHT) {
                Some(Action::Erase(cell))
            } else {
                None
            };
        }
        if !left {
            return None;
        }
        if self.layer_up.contains(pointer) {
            Some(Action::Ascend)
        } else if self.layer_down.contains(pointer) {
            Some(Action::Descend)
        } else if self.layer_indicator.contains(pointer) {
            Some(Action::ToggleTransparency)
        } else if self.save.contains(pointer) {
            Some(Action::Save)
        } else {
            self.swatches
                .iter()
                .position(|r| r.contains(pointer))
                .map(Action::SelectColor)
        }
    }

    /// Menu backgrounds, swatches and buttons. Labels are drawn by the caller.
    pub fn chrome(&self, palette: &Palette, selected: usize, transparent: bool) -> Vec<DrawCommand> {
        let canvas = self.canvas.size;
        let fill = |r: Region, color: TileColor| DrawCommand::FillRect {
            pos: r.origin,
            w: r.size.x,
            h: r.size.y,
            color,
        };

        let mut out = vec![
            fill(
                Region::new(canvas.x, 0, SIDE_MENU_WIDTH, canvas.y + BOTTOM_MENU_HEIGHT),
                MENU_COLOR,
            ),
            fill(
                Region::new(0, canvas.y, canvas.x + SIDE_MENU_WIDTH, BOTTOM_MENU_HEIGHT),
                MENU_COLOR,
            ),
        ];

        for (region, entry) in self.swatches.iter().zip(palette.entries()) {
            out.push(match &entry.asset {
                Some(asset) => DrawCommand::Blit {
                    asset: asset.clone(),
                    pos: region.origin,
                    size: SWATCH_SIZE,
                    color: entry.color,
                    alpha: 255,
                },
                None => fill(*region, entry.color),
            });
        }
        if let Some(sel) = self.swatches.get(selected) {
            out.push(DrawCommand::OutlineRect {
                pos: sel.origin,
                w: sel.size.x,
                h: sel.size.y,
                color: OUTLINE_COLOR,
            });
        }

        let indicator = if transparent {
            TRANSPARENT_ON_COLOR
        } else {
            TileColor::WHITE
        };
        out.extend([
            fill(self.layer_up, TileColor::SOFT_BLACK),
            fill(self.layer_indicator, indicator),
            fill(self.layer_down, TileColor::SOFT_BLACK),
            fill(self.save, SAVE_COLOR),
            fill(self.quit, QUIT_COLOR),
        ]);
        out
    }
}

/// Keyboard shortcuts.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::Up | KeyCode::PageUp => Action::Ascend,
        KeyCode::Down | KeyCode::PageDown => Action::Descend,
        KeyCode::Home => Action::ResetLayer,
        KeyCode::T => Action::ToggleTransparency,
        KeyCode::S => Action::Save,
        KeyCode::Escape => Action::Quit,
        KeyCode::Key1 => Action::SelectColor(0),
        KeyCode::Key2 => Action::SelectColor(1),
        KeyCode::Key3 => Action::SelectColor(2),
        KeyCode::Key4 => Action::SelectColor(3),
        KeyCode::Key5 => Action::SelectColor(4),
        KeyCode::Key6 => Action::SelectColor(5),
        KeyCode::Key7 => Action::SelectColor(6),
        KeyCode::Key8 => Action::SelectColor(7),
        KeyCode::Key9 => Action::SelectColor(8),
        _ => return None,
    };
    Some(action)
}

/// Transient "Saved!" notice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaveStatus {
    saved_at: Option<f64>,
}

impl SaveStatus {
    /// Show the notice from `now` on.
    pub fn arm(&mut self, now: f64) {
        self.saved_at = Some(now);
    }

    /// Whether the notice is up at `now`.
    pub fn is_visible(&self, now: f64) -> bool {
        self.saved_at
            .is_some_and(|t| now >= t && now - t < SAVED_NOTICE_SECS)
    }
}

/// Everything one editing window owns.
pub struct EditorSession<S = PngSink> {
    config: CanvasConfig,
    stack: LayerStack,
    palette: Palette,
    selected: usize,
    fade: FadeMode,
    cumulative_export: CumulativeExport,
    exporter: Exporter<S>,
    status: SaveStatus,
    layout: Layout,
}

impl<S: ImageSink> EditorSession<S> {
    /// Session with one empty layer and the first palette entry selected.
    pub fn new(config: CanvasConfig, palette: Palette, exporter: Exporter<S>) -> Self {
        let layout = Layout::new(&config, &palette);
        EditorSession {
            config,
            stack: LayerStack::new(),
            palette,
            selected: 0,
            fade: FadeMode::Opaque,
            cumulative_export: CumulativeExport::Squashed,
            exporter,
            status: SaveStatus::default(),
            layout,
        }
    }

    /// Fade used for the on-screen cumulative view.
    pub fn with_fade(mut self, fade: FadeMode) -> Self {
        self.fade = fade;
        self
    }

    /// File layout used when saving with transparency on.
    pub fn with_cumulative_export(mut self, mode: CumulativeExport) -> Self {
        self.cumulative_export = mode;
        self
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Layers painted so far.
    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    #[allow(missing_docs)]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[allow(missing_docs)]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[allow(missing_docs)]
    pub fn exporter(&self) -> &Exporter<S> {
        &self.exporter
    }

    /// The saved-notice state.
    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Index of the selected palette entry.
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[allow(missing_docs)]
    pub fn selected_entry(&self) -> Result<&PaletteEntry, PainterError> {
        self.palette.resolve(self.selected)
    }

    /// Actions arriving this frame: the pointer action first, then the key
    /// shortcut.
    pub fn poll<I: InputSource + ?Sized>(&self, input: &mut I) -> impl Iterator<Item = Action> {
        let pointer_action = self.layout.action_at(
            input.pointer_position(),
            input.pressed_buttons(),
            self.config.scale,
        );
        let key_action = input.key_event().and_then(action_for_key);
        pointer_action.into_iter().chain(key_action)
    }

    /// Apply one action. Only `SelectColor` with a bad index and `Save` can
    /// fail; the session stays usable either way.
    pub fn apply(&mut self, action: Action, now: f64) -> Result<Flow, PainterError> {
        match action {
            Action::Paint(cell) => {
                let color = self.palette.resolve(self.selected)?.color;
                self.stack.current_mut().paint(cell, color);
            }
            Action::Erase(cell) => {
                self.stack.current_mut().erase(cell);
            }
            Action::Ascend => {
                self.stack.ascend();
            }
            Action::Descend => {
                self.stack.descend();
            }
            Action::ResetLayer => {
                self.stack.reset();
            }
            Action::ToggleTransparency => {
                self.stack.toggle_transparency();
            }
            Action::SelectColor(index) => {
                self.palette.resolve(index)?;
                self.selected = index;
            }
            Action::Save => {
                self.save(now)?;
            }
            Action::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Export the current layer, or everything through the cursor when
    /// transparency is on.
    pub fn save(&mut self, now: f64) -> Result<Vec<PathBuf>, PainterError> {
        let size = self.config.export_size();
        let cursor = self.stack.cursor();

        let result = if !self.stack.is_transparent() {
            self.exporter
                .export_layer(&self.stack, &self.palette, cursor, size)
                .map(|p| vec![p])
        } else {
            match self.cumulative_export {
                CumulativeExport::Squashed => self
                    .exporter
                    .export_squashed(&self.stack, &self.palette, cursor, size)
                    .map(|p| vec![p]),
                CumulativeExport::PerDepth => {
                    self.exporter
                        .export_per_depth(&self.stack, &self.palette, cursor, size)
                }
            }
        };

        match &result {
            Ok(paths) => {
                info!(files = paths.len(), "saved");
                self.status.arm(now);
            }
            Err(err) => warn!("save failed: {err}"),
        }
        result
    }

    /// Canvas plus the ghost preview under the pointer.
    pub fn canvas_frame(&self, pointer: IVec2) -> Vec<DrawCommand> {
        let compositor = Compositor::new(&self.palette, self.config.scale).with_fade(self.fade);
        let mut out = compositor.frame(&self.stack, self.config.width_cells, self.config.height_cells);
        if let Ok(entry) = self.selected_entry() {
            out.extend(compositor.ghost(pointer, self.layout.canvas, entry));
        }
        out
    }

    /// Whole window: canvas, ghost, menus.
    pub fn window_frame(&self, pointer: IVec2) -> Vec<DrawCommand> {
        let mut out = self.canvas_frame(pointer);
        out.extend(
            self.layout
                .chrome(&self.palette, self.selected, self.stack.is_transparent()),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::math::ivec2;

    fn session() -> EditorSession {
        EditorSession::new(CanvasConfig::default(), Palette::builtin(), Exporter::new("unused"))
    }

    struct Scripted {
        pointer: IVec2,
        buttons: PointerButtons,
        keys: Vec<KeyCode>,
    }

    impl InputSource for Scripted {
        fn pointer_position(&self) -> IVec2 {
            self.pointer
        }

        fn pressed_buttons(&self) -> PointerButtons {
            self.buttons
        }

        fn key_event(&mut self) -> Option<KeyCode> {
            self.keys.pop()
        }
    }

    #[test]
    fn canvas_clicks_paint_and_erase() {
        let s = session();
        let layout = s.layout();
        assert_eq!(
            layout.action_at(ivec2(40, 70), PointerButtons::LEFT, 32),
            Some(Action::Paint(GridCoord::new(1, 2)))
        );
        assert_eq!(
            layout.action_at(ivec2(40, 70), PointerButtons::RIGHT, 32),
            Some(Action::Erase(GridCoord::new(1, 2)))
        );
        assert_eq!(layout.action_at(ivec2(40, 70), PointerButtons::empty(), 32), None);
    }

    #[test]
    fn canvas_edge_pixel_is_outside() {
        let s = session();
        assert!(matches!(
            s.layout().cell_at(ivec2(960, 5), 32),
            Err(PainterError::InvalidCoordinate { x: 960, y: 5 })
        ));
        assert_eq!(s.layout().cell_at(ivec2(959, 479), 32).unwrap(), GridCoord::new(29, 14));
    }

    #[test]
    fn menu_buttons_map_to_actions() {
        let s = session();
        let l = s.layout().clone();
        let centre = |r: Region| ivec2((r.origin.x + r.size.x / 2) as i32, (r.origin.y + r.size.y / 2) as i32);
        let click = |r| l.action_at(centre(r), PointerButtons::LEFT, 32);
        assert_eq!(click(l.layer_up), Some(Action::Ascend));
        assert_eq!(click(l.layer_down), Some(Action::Descend));
        assert_eq!(click(l.layer_indicator), Some(Action::ToggleTransparency));
        assert_eq!(click(l.quit), Some(Action::Quit));
        assert_eq!(click(l.swatches[3]), Some(Action::SelectColor(3)));
    }

    #[test]
    fn swatches_fill_two_columns() {
        let s = session();
        let sw = &s.layout().swatches;
        assert_eq!(sw[0].origin, uvec2(960 + 32, 30));
        assert_eq!(sw[1].origin, uvec2(960 + 64, 30));
        assert_eq!(sw[2].origin, uvec2(960 + 32, 62));
        assert_eq!(s.layout().window, uvec2(960 + 128, 480 + 90));
    }

    #[test]
    fn paint_stores_colour_resolved_at_paint_time() {
        let mut s = session();
        s.apply(Action::SelectColor(1), 0.0).unwrap();
        s.apply(Action::Paint(GridCoord::new(0, 0)), 0.0).unwrap();
        let expected = s.palette().resolve(1).unwrap().color;
        assert_eq!(s.stack().current().get(GridCoord::new(0, 0)), Some(expected));

        s.apply(Action::SelectColor(2), 0.0).unwrap();
        assert_eq!(s.stack().current().get(GridCoord::new(0, 0)), Some(expected));
    }

    #[test]
    fn bad_selection_fails_and_keeps_previous() {
        let mut s = session();
        s.apply(Action::SelectColor(2), 0.0).unwrap();
        let err = s.apply(Action::SelectColor(99), 0.0).unwrap_err();
        assert!(matches!(err, PainterError::PaletteIndex { index: 99, .. }));
        assert_eq!(s.selected(), 2);
    }

    #[test]
    fn poll_yields_pointer_then_key() {
        let s = session();
        let mut input = Scripted {
            pointer: ivec2(5, 5),
            buttons: PointerButtons::LEFT,
            keys: vec![KeyCode::Up],
        };
        assert_eq!(
            s.poll(&mut input).collect::<Vec<_>>(),
            vec![Action::Paint(GridCoord::new(0, 0)), Action::Ascend]
        );

        input.buttons = PointerButtons::empty();
        input.keys = vec![KeyCode::T];
        assert_eq!(s.poll(&mut input).collect::<Vec<_>>(), vec![Action::ToggleTransparency]);
        assert_eq!(s.poll(&mut input).next(), None);
    }

    #[test]
    fn shortcut_pressed_during_click_is_applied() {
        let mut s = session();
        let mut input = Scripted {
            pointer: ivec2(5, 5),
            buttons: PointerButtons::LEFT,
            keys: vec![KeyCode::T],
        };
        let actions: Vec<_> = s.poll(&mut input).collect();
        for action in actions {
            s.apply(action, 0.0).unwrap();
        }
        assert!(s.stack().current().get(GridCoord::new(0, 0)).is_some());
        assert!(s.stack().is_transparent());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut s = session();
        assert_eq!(s.apply(Action::Ascend, 0.0).unwrap(), Flow::Continue);
        assert_eq!(s.apply(Action::Quit, 0.0).unwrap(), Flow::Quit);
    }

    #[test]
    fn saved_notice_expires() {
        let mut status = SaveStatus::default();
        assert!(!status.is_visible(0.0));
        status.arm(10.0);
        assert!(status.is_visible(10.0));
        assert!(status.is_visible(11.9));
        assert!(!status.is_visible(12.0));
    }

    #[test]
    fn ghost_follows_pointer_but_never_persists() {
        let s = session();
        let frame = s.canvas_frame(ivec2(70, 5));
        assert!(matches!(
            frame.last(),
            Some(DrawCommand::OutlineRect { pos, .. }) if *pos == uvec2(64, 0)
        ));
        assert!(s.stack().current().is_empty());
        // pointer over the menu: no preview
        let frame = s.canvas_frame(ivec2(1000, 5));
        assert!(matches!(frame.last(), Some(DrawCommand::Line { .. })));
    }

    #[test]
    fn keys_map_to_shortcuts() {
        assert_eq!(action_for_key(KeyCode::Home), Some(Action::ResetLayer));
        assert_eq!(action_for_key(KeyCode::Key3), Some(Action::SelectColor(2)));
        assert_eq!(action_for_key(KeyCode::Q), None);
    }
}
