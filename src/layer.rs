use crate::geom::{GridCoord, TileColor};

/// One paintable plane of cells.
///
/// Backed by an association list so enumeration follows insertion order.
/// At most one cell exists per coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    cells: Vec<(GridCoord, TileColor)>,
}

impl Layer {
    /// Empty layer.
    pub fn new() -> Self {
        Layer { cells: Vec::new() }
    }

    /// Replace whatever sits at `coord` with a fresh cell of `color`.
    pub fn paint(&mut self, coord: GridCoord, color: TileColor) {
        self.erase(coord);
        self.cells.push((coord, color));
    }

    /// Remove the cell at `coord`. Returns whether anything was removed.
    pub fn erase(&mut self, coord: GridCoord) -> bool {
        match self.cells.iter().position(|(c, _)| *c == coord) {
            Some(i) => {
                self.cells.remove(i);
                true
            }
            None => false,
        }
    }

    /// Colour painted at `coord`, if any.
    pub fn get(&self, coord: GridCoord) -> Option<TileColor> {
        self.cells
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, color)| *color)
    }

    /// Cells in storage order.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, TileColor)> + '_ {
        self.cells.iter().copied()
    }

    /// Number of painted cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is painted.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
