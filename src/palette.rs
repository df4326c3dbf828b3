use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::PainterError;
use crate::geom::TileColor;

/// One selectable colour, optionally backed by tile art.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Display name; also the tile art file stem in `.blf` palettes.
    pub name: String,
    /// Colour painted into layers.
    pub color: TileColor,
    /// Tile art drawn at the art scale.
    pub asset: Option<PathBuf>,
    /// (column, row) of the swatch in the picker, if the file placed it.
    pub slot: Option<(u32, u32)>,
}

impl PaletteEntry {
    /// Flat-colour entry without art or a picker slot.
    pub fn new(name: impl Into<String>, color: TileColor) -> Self {
        PaletteEntry {
            name: name.into(),
            color,
            asset: None,
            slot: None,
        }
    }

    /// Attach tile art.
    pub fn with_asset(mut self, asset: impl Into<PathBuf>) -> Self {
        self.asset = Some(asset.into());
        self
    }
}

/// Ordered, non-empty list of selectable entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

#[derive(Deserialize)]
struct JsonPalette {
    entries: Vec<JsonEntry>,
}

#[derive(Deserialize)]
struct JsonEntry {
    #[serde(default)]
    name: String,
    color: String,
    #[serde(default)]
    image: Option<String>,
}

impl Palette {
    /// Fails on an empty entry list.
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self, PainterError> {
        if entries.is_empty() {
            return Err(PainterError::InvalidPalette("palette has no entries".into()));
        }
        Ok(Palette { entries })
    }

    /// Flat colours used when no palette file is available.
    pub fn builtin() -> Self {
        let entries = [
            ("grass", TileColor::rgb(34, 139, 34)),
            ("water", TileColor::rgb(30, 144, 255)),
            ("sand", TileColor::rgb(238, 214, 175)),
            ("stone", TileColor::GRAY),
            ("wall", TileColor::SOFT_BLACK),
            ("lava", TileColor::ORANGE),
            ("path", TileColor::rgb(139, 90, 43)),
            ("marker", TileColor::YELLOW),
        ]
        .into_iter()
        .map(|(name, color)| PaletteEntry::new(name, color))
        .collect();
        Palette { entries }
    }

    /// Load a `.blf` button-listing file or a `.json` palette.
    ///
    /// Tile art for `.blf` entries is looked up under `asset_root`; entries
    /// whose art is missing fall back to flat colour.
    pub fn load(path: impl AsRef<Path>, asset_root: impl AsRef<Path>) -> Result<Self, PainterError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| PainterError::io(path, source))?;

        let mut palette = match path.extension().and_then(|e| e.to_str()) {
            Some("blf") => Self::from_blf_str(&txt, Some(asset_root.as_ref()))?,
            Some("json") => {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                Self::from_json_str(&txt, base).map_err(|err| match err {
                    PainterError::Json { source, .. } => PainterError::Json {
                        path: path.to_path_buf(),
                        source,
                    },
                    other => other,
                })?
            }
            _ => {
                return Err(PainterError::InvalidPalette(format!(
                    "unsupported palette file: {}",
                    path.display()
                )))
            }
        };
        palette.retain_existing_assets();
        Ok(palette)
    }

    /// Parse the `col;row;name;width[;height[;fg[;bg[;contour]]]]` format.
    pub fn from_blf_str(src: &str, asset_root: Option<&Path>) -> Result<Self, PainterError> {
        let mut entries = Vec::new();

        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let bad = |what: &str| {
                PainterError::InvalidPalette(format!("line {}: {}: {:?}", lineno + 1, what, line))
            };

            let fields: Vec<&str> = line.split(';').map(str::trim).collect();
            if fields.len() < 4 {
                return Err(bad("expected at least col;row;name;width"));
            }
            let col: u32 = fields[0].parse().map_err(|_| bad("bad column"))?;
            let row: u32 = fields[1].parse().map_err(|_| bad("bad row"))?;
            let name = fields[2];
            let _width: u32 = fields[3].parse().map_err(|_| bad("bad width"))?;
            if let Some(h) = fields.get(4).filter(|h| !h.is_empty()) {
                h.parse::<u32>().map_err(|_| bad("bad height"))?;
            }
            let color = match fields.get(5).filter(|c| !c.is_empty()) {
                Some(c) => TileColor::parse(c).ok_or_else(|| bad("unknown colour"))?,
                None => TileColor::WHITE,
            };

            entries.push(PaletteEntry {
                name: name.to_owned(),
                color,
                asset: asset_root.map(|root| root.join(format!("{}.png", name.to_lowercase()))),
                slot: Some((col, row)),
            });
        }

        Self::new(entries)
    }

    /// Parse a JSON palette; image paths are relative to `base_dir`.
    pub fn from_json_str(src: &str, base_dir: &Path) -> Result<Self, PainterError> {
        let j: JsonPalette = serde_json::from_str(src).map_err(|source| PainterError::Json {
            path: base_dir.to_path_buf(),
            source,
        })?;

        let entries = j
            .entries
            .into_iter()
            .map(|e| {
                let color = TileColor::parse(&e.color).ok_or_else(|| {
                    PainterError::InvalidPalette(format!(
                        "entry {:?}: unknown colour {:?}",
                        e.name, e.color
                    ))
                })?;
                Ok(PaletteEntry {
                    name: e.name,
                    color,
                    asset: e.image.map(|img| base_dir.join(img)),
                    slot: None,
                })
            })
            .collect::<Result<Vec<_>, PainterError>>()?;

        Self::new(entries)
    }

    /// Drop asset paths that do not point at a file.
    pub fn retain_existing_assets(&mut self) {
        for entry in &mut self.entries {
            if let Some(asset) = &entry.asset {
                if !asset.is_file() {
                    warn!(entry = %entry.name, asset = %asset.display(), "tile art missing, using flat colour");
                    entry.asset = None;
                }
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in picker order.
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Entry at `index`, or [`PainterError::PaletteIndex`].
    pub fn resolve(&self, index: usize) -> Result<&PaletteEntry, PainterError> {
        self.entries.get(index).ok_or(PainterError::PaletteIndex {
            index,
            len: self.entries.len(),
        })
    }

    /// Tile art of the first entry painted with `color`.
    pub fn asset_for(&self, color: TileColor) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.color == color)
            .and_then(|e| e.asset.as_deref())
    }
}
