use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tile_painter::TileColor;

/// Decoded RGBA8 PNG.
pub struct Png {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Png {
    pub fn pixel(&self, x: u32, y: u32) -> TileColor {
        let i = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[i..i + 4];
        TileColor::rgba(p[0], p[1], p[2], p[3])
    }
}

pub fn read_png(path: &Path) -> Png {
    let file = BufReader::new(File::open(path).expect("exported file should exist"));
    let mut reader = png::Decoder::new(file).read_info().expect("valid PNG header");
    let (width, height) = (reader.info().width, reader.info().height);
    let mut pixels = vec![0; (width * height * 4) as usize];
    reader.next_frame(&mut pixels).expect("valid PNG data");
    Png {
        width,
        height,
        pixels,
    }
}
