use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for the painter library.
///
/// Layer and stack editing is total; only palette loading, configuration and
/// export can fail.
#[derive(Debug)]
#[allow(missing_docs)] // variant fields
pub enum PainterError {
    /// File or directory I/O failed
    Io { path: PathBuf, source: io::Error },
    /// A raster could not be encoded as PNG
    Encode {
        path: PathBuf,
        source: png::EncodingError,
    },
    /// A JSON palette could not be parsed
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A palette file is malformed or has no entries
    InvalidPalette(String),
    /// A palette selection index is out of range
    PaletteIndex { index: usize, len: usize },
    /// The requested layer does not exist in the stack
    NoSuchLayer { index: usize, len: usize },
    /// A pixel position lies outside the paintable canvas
    InvalidCoordinate { x: i32, y: i32 },
    /// Canvas dimensions or scale are unusable
    InvalidConfig(String),
}

impl PainterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PainterError::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for PainterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PainterError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            PainterError::Encode { path, source } => {
                write!(f, "PNG encoding error for {}: {}", path.display(), source)
            }
            PainterError::Json { path, source } => {
                write!(f, "JSON parse error in {}: {}", path.display(), source)
            }
            PainterError::InvalidPalette(msg) => write!(f, "Invalid palette: {}", msg),
            PainterError::PaletteIndex { index, len } => write!(
                f,
                "Palette selection {} is out of range (palette has {} entries)",
                index, len
            ),
            PainterError::NoSuchLayer { index, len } => write!(
                f,
                "Layer {} does not exist (stack has {} layers)",
                index, len
            ),
            PainterError::InvalidCoordinate { x, y } => {
                write!(f, "Pixel ({}, {}) is outside the canvas", x, y)
            }
            PainterError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PainterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PainterError::Io { source, .. } => Some(source),
            PainterError::Encode { source, .. } => Some(source),
            PainterError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
