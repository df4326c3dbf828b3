use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use macroquad::prelude::*;
use tile_painter::render::{ScreenRenderer, TextureCache};
use tile_painter::session::SIDE_MENU_WIDTH;
use tile_painter::{
    execute, Action, CanvasConfig, CumulativeExport, EditorSession, Exporter, FadeMode, Flow,
    InputSource, MacroquadInput, Palette, Region, TileColor,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tile_painter", version, about = "Paint layered tile maps and export them as PNG")]
struct Args {
    /// Map width in cells
    #[arg(long, default_value_t = 30)]
    width: u32,
    /// Map height in cells
    #[arg(long, default_value_t = 15)]
    height: u32,
    /// On-screen pixel size of one cell
    #[arg(long, default_value_t = 32)]
    scale: u32,
    /// Palette file (.blf or .json)
    #[arg(long, default_value = "buttons.blf")]
    palette: PathBuf,
    /// Directory holding tile art for .blf palettes
    #[arg(long, default_value = "data/raw")]
    assets: PathBuf,
    /// Where exported PNGs are written
    #[arg(long, default_value = "IO")]
    out_dir: PathBuf,
    /// Fade lower layers when transparency is on
    #[arg(long)]
    fade: bool,
    /// Write one file per layer depth instead of a single squashed file
    #[arg(long)]
    per_depth: bool,
}

impl Args {
    fn canvas_config(&self) -> anyhow::Result<CanvasConfig> {
        CanvasConfig::new(self.width, self.height, self.scale).context("Checking canvas size")
    }
}

fn window_conf() -> Conf {
    let args = Args::parse();
    let cfg = args.canvas_config().unwrap_or_default();
    let canvas = cfg.canvas_size();
    Conf {
        window_title: "Tile Painter".into(),
        window_width: (canvas.x + SIDE_MENU_WIDTH) as i32,
        window_height: (canvas.y + tile_painter::session::BOTTOM_MENU_HEIGHT) as i32,
        window_resizable: false,
        ..Default::default()
    }
}

fn load_palette(args: &Args) -> anyhow::Result<Palette> {
    if !args.palette.exists() {
        warn!(path = %args.palette.display(), "palette file not found, using built-in colours");
        return Ok(Palette::builtin());
    }
    Palette::load(&args.palette, &args.assets)
        .with_context(|| format!("Loading palette {}", args.palette.display()))
}

fn label(text: &str, r: Region, size: f32, color: TileColor) {
    let dims = measure_text(text, None, size as u16, 1.0);
    draw_text(
        text,
        r.origin.x as f32 + (r.size.x as f32 - dims.width) / 2.0,
        r.origin.y as f32 + (r.size.y as f32 + dims.offset_y) / 2.0,
        size,
        color.into(),
    );
}

fn draw_labels<S: tile_painter::ImageSink>(session: &EditorSession<S>, now: f64) {
    let layout = session.layout();
    let stack = session.stack();
    let bar_y = layout.canvas.size.y as f32;

    draw_text("Tile Painter", 5.0, bar_y + 40.0, 44.0, WHITE);
    label("UP", layout.layer_up, 16.0, TileColor::WHITE);
    label(&stack.cursor().to_string(), layout.layer_indicator, 20.0, TileColor::SOFT_BLACK);
    label("DOWN", layout.layer_down, 14.0, TileColor::WHITE);
    label("SAVE", layout.save, 22.0, TileColor::SOFT_BLACK);
    label("QUIT", layout.quit, 22.0, TileColor::SOFT_BLACK);
    if session.status().is_visible(now) {
        let r = layout.save;
        draw_text("Saved!", r.origin.x as f32, r.origin.y as f32 - 6.0, 18.0, WHITE);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.canvas_config()?;
    let palette = load_palette(&args)?;
    let textures = TextureCache::load(&palette).await;

    let fade = if args.fade { FadeMode::Linear } else { FadeMode::Opaque };
    let cumulative = if args.per_depth {
        CumulativeExport::PerDepth
    } else {
        CumulativeExport::Squashed
    };
    let mut session = EditorSession::new(config, palette, Exporter::new(&args.out_dir))
        .with_fade(fade)
        .with_cumulative_export(cumulative);
    let mut input = MacroquadInput;

    info!(
        width = config.width_cells,
        height = config.height_cells,
        scale = config.scale,
        "session started"
    );

    loop {
        let actions: Vec<Action> = session.poll(&mut input).collect();
        let mut quit = false;
        for action in actions {
            match session.apply(action, get_time()) {
                Ok(Flow::Quit) => quit = true,
                Ok(Flow::Continue) => {}
                Err(err) => warn!("{action:?} failed: {err}"),
            }
        }
        if quit {
            break;
        }

        clear_background(WHITE);
        let frame = session.window_frame(input.pointer_position());
        execute(&frame, &mut ScreenRenderer::new(&textures));
        draw_labels(&session, get_time());

        next_frame().await;
    }

    info!("session ended");
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tile_painter=info")),
        )
        .init();

    if let Err(err) = run(Args::parse()).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}
