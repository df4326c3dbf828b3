// tests/export_tests.rs

mod common;

use std::fs;

use common::read_png;
use macroquad::math::uvec2;
use tile_painter::{
    Action, CanvasConfig, CumulativeExport, EditorSession, Exporter, GridCoord, LayerStack,
    Palette, PaletteEntry, PainterError, TileColor,
};

fn red_palette() -> Palette {
    Palette::new(vec![
        PaletteEntry::new("red", TileColor::RED),
        PaletteEntry::new("blue", TileColor::BLUE),
    ])
    .unwrap()
}

#[test]
fn single_red_pixel_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("IO");
    let cfg = CanvasConfig::new(3, 3, 10).unwrap();
    let mut session = EditorSession::new(cfg, red_palette(), Exporter::new(&out));

    // pixel (15, 15) at scale 10 is grid cell (1, 1)
    let cell = session.layout().cell_at(macroquad::math::ivec2(15, 15), 10).unwrap();
    assert_eq!(cell, GridCoord::new(1, 1));
    session.apply(Action::Paint(cell), 0.0).unwrap();

    let mut exporter = Exporter::new(&out);
    let path = exporter
        .export_layer(session.stack(), session.palette(), 0, cfg.export_size())
        .unwrap();
    assert_eq!(path, out.join("layer_0.png"));

    let png = read_png(&path);
    assert_eq!((png.width, png.height), (3, 3));
    for y in 0..3 {
        for x in 0..3 {
            let expected = if (x, y) == (1, 1) { TileColor::RED } else { TileColor::WHITE };
            assert_eq!(png.pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn output_directory_is_created_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("IO");
    assert!(!out.exists());
    let mut exporter = Exporter::new(&out);
    exporter
        .export_layer(&LayerStack::new(), &red_palette(), 0, uvec2(2, 2))
        .unwrap();
    assert!(out.join("layer_0.png").is_file());
    // no staging files left behind
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn per_depth_skips_empty_layers_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut stack = LayerStack::new();
    stack.current_mut().paint(GridCoord::new(0, 0), TileColor::RED);
    stack.ascend();

    let mut exporter = Exporter::new(dir.path());
    let written = exporter
        .export_per_depth(&stack, &red_palette(), 1, uvec2(2, 2))
        .unwrap();
    assert_eq!(written, vec![dir.path().join("layers_0.png")]);
    assert!(!dir.path().join("layers_1.png").exists());
}

#[test]
fn squashed_export_stacks_layers_bottom_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut stack = LayerStack::new();
    stack.current_mut().paint(GridCoord::new(0, 0), TileColor::RED);
    stack.current_mut().paint(GridCoord::new(1, 0), TileColor::RED);
    stack.ascend();
    stack.current_mut().paint(GridCoord::new(1, 0), TileColor::BLUE);

    let path = Exporter::new(dir.path())
        .export_squashed(&stack, &red_palette(), 1, uvec2(2, 1))
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "layers_squashed.png");
    let png = read_png(&path);
    assert_eq!(png.pixel(0, 0), TileColor::RED);
    assert_eq!(png.pixel(1, 0), TileColor::BLUE);
}

#[test]
fn unwritable_target_reports_io_error_and_session_survives() {
    let dir = tempfile::tempdir().unwrap();
    // a regular file where the output directory should be
    let blocker = dir.path().join("IO");
    fs::write(&blocker, b"not a directory").unwrap();

    let cfg = CanvasConfig::new(2, 2, 10).unwrap();
    let mut session = EditorSession::new(cfg, red_palette(), Exporter::new(&blocker));
    session.apply(Action::Paint(GridCoord::new(0, 1)), 0.0).unwrap();

    let err = session.apply(Action::Save, 1.0).unwrap_err();
    assert!(matches!(err, PainterError::Io { .. }), "got {err:?}");
    assert!(!session.status().is_visible(1.0));

    // still editable afterwards
    session.apply(Action::Paint(GridCoord::new(1, 1)), 2.0).unwrap();
    assert_eq!(session.stack().current().len(), 2);
}

#[test]
fn session_save_follows_transparency_flag() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = CanvasConfig::new(2, 2, 10).unwrap();
    let mut session = EditorSession::new(cfg, red_palette(), Exporter::new(dir.path()));

    session.apply(Action::Paint(GridCoord::new(0, 0)), 0.0).unwrap();
    session.apply(Action::Ascend, 0.0).unwrap();
    session.apply(Action::SelectColor(1), 0.0).unwrap();
    session.apply(Action::Paint(GridCoord::new(1, 1)), 0.0).unwrap();

    let paths = session.save(5.0).unwrap();
    assert_eq!(paths, vec![dir.path().join("layer_1.png")]);
    assert!(session.status().is_visible(5.5));
    let png = read_png(&paths[0]);
    assert_eq!(png.pixel(0, 0), TileColor::WHITE);
    assert_eq!(png.pixel(1, 1), TileColor::BLUE);

    session.apply(Action::ToggleTransparency, 6.0).unwrap();
    let paths = session.save(6.0).unwrap();
    assert_eq!(paths, vec![dir.path().join("layers_squashed.png")]);
    let png = read_png(&paths[0]);
    assert_eq!(png.pixel(0, 0), TileColor::RED);
    assert_eq!(png.pixel(1, 1), TileColor::BLUE);
}

#[test]
fn per_depth_session_save_overwrites_previous_run() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = CanvasConfig::new(1, 1, 10).unwrap();
    let mut session = EditorSession::new(cfg, red_palette(), Exporter::new(dir.path()))
        .with_cumulative_export(CumulativeExport::PerDepth);
    session.apply(Action::ToggleTransparency, 0.0).unwrap();
    session.apply(Action::Paint(GridCoord::new(0, 0)), 0.0).unwrap();

    let first = session.save(0.0).unwrap();
    session.apply(Action::SelectColor(1), 0.0).unwrap();
    session.apply(Action::Paint(GridCoord::new(0, 0)), 0.0).unwrap();
    let second = session.save(1.0).unwrap();

    assert_eq!(first, second);
    assert_eq!(read_png(&second[0]).pixel(0, 0), TileColor::BLUE);
}
