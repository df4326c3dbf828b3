// tests/palette_tests.rs

use std::fs;

use tile_painter::{PainterError, Palette, TileColor};

#[test]
fn blf_file_keeps_art_that_exists() {
    let dir = tempfile::tempdir().unwrap();
    let art = dir.path().join("raw");
    fs::create_dir(&art).unwrap();
    fs::write(art.join("grass.png"), b"stand-in").unwrap();

    let blf = dir.path().join("buttons.blf");
    fs::write(
        &blf,
        "# tiles\n0;0;Grass;32;32;#228B22\n1;0;Water;32;32;#1E90FF\n",
    )
    .unwrap();

    let palette = Palette::load(&blf, &art).unwrap();
    assert_eq!(palette.len(), 2);
    assert_eq!(
        palette.asset_for(TileColor::rgb(0x22, 0x8b, 0x22)),
        Some(art.join("grass.png").as_path())
    );
    // water.png is absent, so water renders flat
    assert_eq!(palette.resolve(1).unwrap().asset, None);
}

#[test]
fn json_file_errors_carry_the_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("palette.json");
    fs::write(&path, "{ \"entries\": [ { \"color\": 12 } ] }").unwrap();

    match Palette::load(&path, dir.path()) {
        Err(PainterError::Json { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Json error, got {other:?}"),
    }
}

#[test]
fn json_file_with_unknown_colour_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("palette.json");
    fs::write(&path, r#"{ "entries": [ { "name": "x", "color": "puce" } ] }"#).unwrap();
    assert!(matches!(
        Palette::load(&path, dir.path()),
        Err(PainterError::InvalidPalette(_))
    ));
}

#[test]
fn unsupported_extension_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("palette.txt");
    fs::write(&txt, "whatever").unwrap();
    assert!(matches!(
        Palette::load(&txt, dir.path()),
        Err(PainterError::InvalidPalette(_))
    ));
    assert!(matches!(
        Palette::load(dir.path().join("nope.blf"), dir.path()),
        Err(PainterError::Io { .. })
    ));
}
