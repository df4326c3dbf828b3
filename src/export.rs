//! Persisting layers as flat PNG rasters, one pixel per cell.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use macroquad::math::UVec2;
use tracing::{debug, info, warn};

use crate::command::{execute, DrawCommand};
use crate::error::PainterError;
use crate::palette::Palette;
use crate::render::{Compositor, Raster, RasterRenderer};
use crate::stack::LayerStack;

/// File holding every layer through the cursor in one image.
pub const SQUASHED_FILE: &str = "layers_squashed.png";

/// `layer_<index>.png`
pub fn layer_file_name(index: usize) -> String {
    format!("layer_{index}.png")
}

/// `layers_<depth>.png`
pub fn depth_file_name(depth: usize) -> String {
    format!("layers_{depth}.png")
}

/// Where finished rasters go.
pub trait ImageSink {
    /// Create `dir` and its parents if missing.
    fn ensure_directory(&mut self, dir: &Path) -> Result<(), PainterError>;

    /// Store `raster` at `path`, replacing any existing file.
    fn write_raster(&mut self, raster: &Raster, path: &Path) -> Result<(), PainterError>;
}

/// Writes PNG files, staging each through a temporary sibling and renaming
/// it into place so a failed write never leaves a half-written target.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngSink;

impl ImageSink for PngSink {
    fn ensure_directory(&mut self, dir: &Path) -> Result<(), PainterError> {
        if dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|source| PainterError::io(dir, source))?;
        info!(dir = %dir.display(), "created output directory");
        Ok(())
    }

    fn write_raster(&mut self, raster: &Raster, path: &Path) -> Result<(), PainterError> {
        let staging = path.with_extension("png.part");
        let result = File::create(&staging)
            .map_err(|source| PainterError::io(&staging, source))
            .and_then(|file| {
                let mut out = BufWriter::new(file);
                encode_png(raster, &mut out).map_err(|source| PainterError::Encode {
                    path: path.to_path_buf(),
                    source,
                })?;
                out.flush().map_err(|source| PainterError::io(&staging, source))
            })
            .and_then(|()| fs::rename(&staging, path).map_err(|source| PainterError::io(path, source)));

        if result.is_err() {
            // best effort; the original error is what gets reported
            let _ = fs::remove_file(&staging);
        }
        result
    }
}

/// Encode as 8-bit RGBA PNG.
pub fn encode_png<W: Write>(raster: &Raster, w: W) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, raster.width(), raster.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(raster.as_bytes())?;
    writer.finish()
}

/// Rasterizes layers at scale 1 onto white and hands them to an [`ImageSink`].
///
/// Export only reads the stack.
pub struct Exporter<S = PngSink> {
    out_dir: PathBuf,
    sink: S,
}

impl Exporter<PngSink> {
    /// Exporter writing PNG files under `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self::with_sink(out_dir, PngSink)
    }
}

impl<S: ImageSink> Exporter<S> {
    /// Exporter handing rasters to a custom sink.
    pub fn with_sink(out_dir: impl Into<PathBuf>, sink: S) -> Self {
        Exporter {
            out_dir: out_dir.into(),
            sink,
        }
    }

    /// Directory the files are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// The sink receiving rasters.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Writes `layer_<index>.png`.
    pub fn export_layer(
        &mut self,
        stack: &LayerStack,
        palette: &Palette,
        index: usize,
        size: UVec2,
    ) -> Result<PathBuf, PainterError> {
        let raster = render_layer(stack, palette, index, size)?;
        self.persist(&raster, layer_file_name(index))
    }

    /// Writes `layers_squashed.png` with every layer up to `through`.
    pub fn export_squashed(
        &mut self,
        stack: &LayerStack,
        palette: &Palette,
        through: usize,
        size: UVec2,
    ) -> Result<PathBuf, PainterError> {
        let raster = render_through(stack, palette, through, size)?;
        self.persist(&raster, SQUASHED_FILE.to_owned())
    }

    /// Writes `layers_<depth>.png` for each non-empty depth up to `through`,
    /// each holding everything from the base through that depth.
    ///
    /// Files from an earlier run with the same names are overwritten.
    pub fn export_per_depth(
        &mut self,
        stack: &LayerStack,
        palette: &Palette,
        through: usize,
        size: UVec2,
    ) -> Result<Vec<PathBuf>, PainterError> {
        stack.layer(through)?;
        let mut written = Vec::new();
        for (depth, layer) in stack.layers().iter().enumerate().take(through + 1) {
            if layer.is_empty() {
                debug!(depth, "skipping empty layer");
                continue;
            }
            let raster = render_through(stack, palette, depth, size)?;
            written.push(self.persist(&raster, depth_file_name(depth))?);
        }
        if written.is_empty() {
            warn!(through, "nothing to export, every layer is empty");
        }
        Ok(written)
    }

    fn persist(&mut self, raster: &Raster, file_name: String) -> Result<PathBuf, PainterError> {
        self.sink.ensure_directory(&self.out_dir)?;
        let path = self.out_dir.join(file_name);
        self.sink.write_raster(raster, &path)?;
        info!(
            path = %path.display(),
            width = raster.width(),
            height = raster.height(),
            "exported raster"
        );
        Ok(path)
    }
}

/// One layer alone on a white `size` raster.
pub fn render_layer(
    stack: &LayerStack,
    palette: &Palette,
    index: usize,
    size: UVec2,
) -> Result<Raster, PainterError> {
    let layer = stack.layer(index)?;
    let mut cmds = Vec::with_capacity(layer.len());
    Compositor::new(palette, 1).compose_layer(layer, 255, &mut cmds);
    Ok(rasterize(&cmds, size))
}

/// Layers `0..=through` squashed onto one white raster.
pub fn render_through(
    stack: &LayerStack,
    palette: &Palette,
    through: usize,
    size: UVec2,
) -> Result<Raster, PainterError> {
    stack.layer(through)?;
    let cmds = Compositor::new(palette, 1).compose_through(stack, through);
    Ok(rasterize(&cmds, size))
}

fn rasterize(cmds: &[DrawCommand], size: UVec2) -> Raster {
    let mut raster = Raster::blank(size.x, size.y);
    execute(cmds, &mut RasterRenderer::new(&mut raster));
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{GridCoord, TileColor};
    use macroquad::math::uvec2;

    /// Records writes instead of touching the disk.
    #[derive(Default)]
    struct MemorySink {
        dirs: Vec<PathBuf>,
        files: Vec<(PathBuf, Raster)>,
        fail_writes: bool,
    }

    impl ImageSink for MemorySink {
        fn ensure_directory(&mut self, dir: &Path) -> Result<(), PainterError> {
            self.dirs.push(dir.to_path_buf());
            Ok(())
        }

        fn write_raster(&mut self, raster: &Raster, path: &Path) -> Result<(), PainterError> {
            if self.fail_writes {
                return Err(PainterError::io(path, std::io::Error::other("read-only")));
            }
            self.files.push((path.to_path_buf(), raster.clone()));
            Ok(())
        }
    }

    fn stack_with(cells: &[&[(u32, u32, TileColor)]]) -> LayerStack {
        let mut stack = LayerStack::new();
        for (i, layer) in cells.iter().enumerate() {
            if i > 0 {
                stack.ascend();
            }
            for &(c, r, color) in layer.iter() {
                stack.current_mut().paint(GridCoord::new(c, r), color);
            }
        }
        stack
    }

    #[test]
    fn layer_export_names_file_after_index() {
        let stack = stack_with(&[&[], &[(0, 0, TileColor::RED)]]);
        let mut ex = Exporter::with_sink("IO", MemorySink::default());
        let path = ex
            .export_layer(&stack, &Palette::builtin(), 1, uvec2(2, 2))
            .unwrap();
        assert_eq!(path, Path::new("IO/layer_1.png"));
        let (_, raster) = &ex.sink().files[0];
        assert_eq!(raster.non_background(TileColor::WHITE), vec![(0, 0, TileColor::RED)]);
    }

    #[test]
    fn squashed_later_layers_win() {
        let stack = stack_with(&[
            &[(0, 0, TileColor::RED), (1, 0, TileColor::GREEN)],
            &[(0, 0, TileColor::BLUE)],
        ]);
        let raster = render_through(&stack, &Palette::builtin(), 1, uvec2(2, 1)).unwrap();
        assert_eq!(raster.get(0, 0), Some(TileColor::BLUE));
        assert_eq!(raster.get(1, 0), Some(TileColor::GREEN));
    }

    #[test]
    fn per_depth_skips_empty_layers() {
        let stack = stack_with(&[&[(0, 0, TileColor::RED)], &[]]);
        let mut ex = Exporter::with_sink("IO", MemorySink::default());
        let written = ex
            .export_per_depth(&stack, &Palette::builtin(), 1, uvec2(1, 1))
            .unwrap();
        assert_eq!(written, vec![PathBuf::from("IO/layers_0.png")]);
        assert_eq!(ex.sink().files.len(), 1);
    }

    #[test]
    fn per_depth_rasters_are_cumulative() {
        let stack = stack_with(&[&[(0, 0, TileColor::RED)], &[(1, 0, TileColor::BLUE)]]);
        let mut ex = Exporter::with_sink("IO", MemorySink::default());
        ex.export_per_depth(&stack, &Palette::builtin(), 1, uvec2(2, 1))
            .unwrap();
        let files = &ex.sink().files;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].1.non_background(TileColor::WHITE).len(), 1);
        assert_eq!(files[1].1.non_background(TileColor::WHITE).len(), 2);
    }

    #[test]
    fn cells_outside_export_size_are_clipped() {
        let stack = stack_with(&[&[(5, 5, TileColor::RED)]]);
        let raster = render_layer(&stack, &Palette::builtin(), 0, uvec2(3, 3)).unwrap();
        assert!(raster.non_background(TileColor::WHITE).is_empty());
    }

    #[test]
    fn missing_layer_is_rejected_before_any_write() {
        let stack = LayerStack::new();
        let mut ex = Exporter::with_sink("IO", MemorySink::default());
        let err = ex
            .export_layer(&stack, &Palette::builtin(), 3, uvec2(1, 1))
            .unwrap_err();
        assert!(matches!(err, PainterError::NoSuchLayer { index: 3, len: 1 }));
        assert!(ex.sink().dirs.is_empty());
    }

    #[test]
    fn failed_write_leaves_stack_intact() {
        let stack = stack_with(&[&[(0, 0, TileColor::RED)]]);
        let before = stack.layers().to_vec();
        let mut ex = Exporter::with_sink(
            "IO",
            MemorySink {
                fail_writes: true,
                ..Default::default()
            },
        );
        assert!(ex
            .export_squashed(&stack, &Palette::builtin(), 0, uvec2(1, 1))
            .is_err());
        assert_eq!(stack.layers(), before.as_slice());
    }
}
