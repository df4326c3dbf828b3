use tracing::debug;

use crate::error::PainterError;
use crate::layer::Layer;

/// Ordered layers plus the cursor of the layer being edited.
///
/// Always holds at least one layer. Grows by one when the cursor moves past
/// the top and never shrinks.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: Vec<Layer>,
    cursor: usize,
    transparent: bool,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// Stack with a single empty base layer, cursor on it, transparency off.
    pub fn new() -> Self {
        LayerStack {
            layers: vec![Layer::new()],
            cursor: 0,
            transparent: false,
        }
    }

    /// Layer under the cursor.
    pub fn current(&self) -> &Layer {
        &self.layers[self.cursor]
    }

    #[allow(missing_docs)]
    pub fn current_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.cursor]
    }

    /// Index of the layer being edited.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of layers, at least one.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Never true; a stack always has its base layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[allow(missing_docs)]
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Like [`get`](Self::get) but reports a missing layer as an error.
    pub fn layer(&self, index: usize) -> Result<&Layer, PainterError> {
        self.layers.get(index).ok_or(PainterError::NoSuchLayer {
            index,
            len: self.layers.len(),
        })
    }

    /// All layers, base first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Move up one layer, appending an empty one if the cursor is at the top.
    pub fn ascend(&mut self) -> usize {
        if self.cursor == self.layers.len() - 1 {
            self.layers.push(Layer::new());
            debug!(len = self.layers.len(), "appended layer");
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "ascend");
        self.cursor
    }

    /// Move down one layer; stays at 0 when already at the base.
    pub fn descend(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        debug!(cursor = self.cursor, "descend");
        self.cursor
    }

    /// Cursor back to the base layer; no layer is removed.
    pub fn reset(&mut self) -> usize {
        self.cursor = 0;
        debug!("reset to base layer");
        self.cursor
    }

    /// Whether lower layers show through in the view and in saves.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Flip the transparency flag and return the new value.
    pub fn toggle_transparency(&mut self) -> bool {
        self.transparent = !self.transparent;
        debug!(transparent = self.transparent, "toggled transparency");
        self.transparent
    }
}
