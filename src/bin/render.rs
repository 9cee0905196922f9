//! Headless renderer: draws one scene into a PNG
//!
//! With `--frames N` the frame is redrawn N times and the average wall time
//! per frame is logged.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use cpu_raster::rasterizer::{DrawStats, Rasterizer};
use cpu_raster::scene::{load_scene, SceneConfig, SceneError};

#[derive(Parser, Debug)]
#[command(name = "cpu-raster-render", version, about = "Render a scene to PNG on the CPU")]
struct Cli {
    /// Scene file (RON); the built-in sphere scene when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Color output
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Optional grayscale depth output
    #[arg(long)]
    depth_output: Option<PathBuf>,

    /// Number of times to draw the frame
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Override the scene width
    #[arg(long)]
    width: Option<usize>,

    /// Override the scene height
    #[arg(long)]
    height: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SceneError> {
    let (mut scene, base_dir) = match &cli.scene {
        Some(path) => {
            log::info!("Loading scene {}", path.display());
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (load_scene(path)?, base)
        }
        None => (SceneConfig::default(), PathBuf::from(".")),
    };
    if let Some(width) = cli.width {
        scene.width = width;
    }
    if let Some(height) = cli.height {
        scene.height = height;
    }

    let mesh = scene.load_mesh(&base_dir)?;
    let mut framebuffer = scene.framebuffer()?;
    let mut pipeline = scene.pipeline.build();
    pipeline.set_projection(scene.camera.to_camera().view_projection(scene.aspect()));

    let frames = cli.frames.max(1);
    let mut stats = DrawStats::default();
    let start = Instant::now();
    {
        let mut raster = Rasterizer::new();
        raster.set_framebuffer(&mut framebuffer);
        raster.set_pipeline(&pipeline);
        for _ in 0..frames {
            raster.clear();
            stats = raster.draw(&mesh)?;
        }
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    log::info!(
        "{}x{} {} pipeline: {:.2} ms/frame over {} frame(s)",
        scene.width,
        scene.height,
        pipeline.name(),
        elapsed_ms / frames as f64,
        frames
    );
    log::info!(
        "{} of {} triangles rasterized ({} back-facing or degenerate, {} off screen, {} behind camera, {} invalid depth), {} fragments written",
        stats.rasterized(),
        stats.triangles,
        stats.culled_degenerate,
        stats.culled_offscreen,
        stats.culled_behind,
        stats.culled_invalid_depth,
        stats.fragments_written
    );

    framebuffer.save_png(&cli.output)?;
    log::info!("Wrote {}", cli.output.display());

    if let Some(path) = &cli.depth_output {
        framebuffer.depth_image().save(path)?;
        log::info!("Wrote {}", path.display());
    }
    Ok(())
}
