use macroquad::color::Color;
use macroquad::math::{uvec2, IVec2, UVec2};

/// Pixel size of the hand-drawn tile art; only at this scale are sprites blitted.
pub const TILE_ART_SIZE: u32 = 32;

/// Discrete (column, row) position on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    /// Column, counted from the left edge.
    pub col: u32,
    /// Row, counted from the top edge.
    pub row: u32,
}

impl GridCoord {
    /// Cell at column `col`, row `row`.
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        GridCoord { col, row }
    }
}

/// Screen pixel to grid cell. Many pixels map to one cell.
#[inline]
pub fn screen_to_grid(pixel: UVec2, scale: u32) -> GridCoord {
    debug_assert!(scale > 0, "scale must be positive");
    GridCoord {
        col: pixel.x / scale,
        row: pixel.y / scale,
    }
}

/// Top-left pixel of a grid cell, or `None` if it lies beyond the pixel range.
#[inline]
pub fn grid_to_screen(coord: GridCoord, scale: u32) -> Option<UVec2> {
    Some(uvec2(coord.col.checked_mul(scale)?, coord.row.checked_mul(scale)?))
}

/// Snap a pixel to the top-left corner of the cell containing it.
#[inline]
pub fn snap_to_cell(pixel: UVec2, scale: u32) -> UVec2 {
    debug_assert!(scale > 0, "scale must be positive");
    uvec2(pixel.x - pixel.x % scale, pixel.y - pixel.y % scale)
}

/// 8-bit RGBA colour with channel-wise equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Opacity, 255 is fully opaque.
    pub a: u8,
}

// named colours are self-describing
#[allow(missing_docs)]
impl TileColor {
    pub const WHITE: TileColor = TileColor::rgb(255, 255, 255);
    pub const BLACK: TileColor = TileColor::rgb(0, 0, 0);
    pub const SOFT_BLACK: TileColor = TileColor::rgb(30, 30, 30);
    pub const GRAY: TileColor = TileColor::rgb(128, 128, 128);
    pub const RED: TileColor = TileColor::rgb(255, 0, 0);
    pub const GREEN: TileColor = TileColor::rgb(0, 255, 0);
    pub const BLUE: TileColor = TileColor::rgb(0, 0, 255);
    pub const YELLOW: TileColor = TileColor::rgb(255, 255, 0);
    pub const CYAN: TileColor = TileColor::rgb(0, 255, 255);
    pub const MAGENTA: TileColor = TileColor::rgb(255, 0, 255);
    pub const ORANGE: TileColor = TileColor::rgb(255, 165, 0);

    /// Opaque colour.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        TileColor { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        TileColor { r, g, b, a }
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        TileColor { a, ..self }
    }

    /// Channels in RGBA byte order.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#RRGGBB`, `#RRGGBBAA` or one of the basic colour names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "gray" | "grey" => Self::GRAY,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" => Self::CYAN,
            "magenta" => Self::MAGENTA,
            "orange" => Self::ORANGE,
            _ => return None,
        };
        Some(named)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(TileColor::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl From<TileColor> for Color {
    fn from(c: TileColor) -> Self {
        Color::from_rgba(c.r, c.g, c.b, c.a)
    }
}

/// Axis-aligned pixel rectangle used for hit-testing.
///
/// The far edges are exclusive: a pixel exactly on the right or bottom
/// boundary is outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Top-left pixel.
    pub origin: UVec2,
    /// Width and height in pixels.
    pub size: UVec2,
}

impl Region {
    /// Region at `(x, y)` spanning `w × h` pixels.
    #[inline]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Region {
            origin: UVec2::new(x, y),
            size: UVec2::new(w, h),
        }
    }

    /// Whether the pointer position falls inside the region.
    pub fn contains(&self, p: IVec2) -> bool {
        let (px, py) = (i64::from(p.x), i64::from(p.y));
        let (x0, y0) = (i64::from(self.origin.x), i64::from(self.origin.y));
        let (x1, y1) = (x0 + i64::from(self.size.x), y0 + i64::from(self.size.y));
        px >= x0 && px < x1 && py >= y0 && py < y1
    }

    /// Pointer position relative to the region origin, if inside.
    pub fn local(&self, p: IVec2) -> Option<UVec2> {
        self.contains(p)
            .then(|| p.as_uvec2() - self.origin)
    }
}
