//! cpu-raster viewer
//!
//! Rasterizes the scene on the CPU every frame and shows the framebuffer in
//! a window:
//! - Left-drag orbits the camera
//! - Mouse wheel zooms
//! - R resets the camera, Escape quits

use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::prelude::*;

use cpu_raster::rasterizer::{DrawStats, Rasterizer};
use cpu_raster::scene::{load_scene, SceneConfig};
use cpu_raster::VERSION;

/// Radians of camera rotation per pixel dragged
const ROTATE_SPEED: f32 = 0.01;
/// Distance moved per wheel notch
const ZOOM_STEP: f32 = 0.25;

#[derive(Parser, Debug)]
#[command(name = "cpu-raster", version, about = "Interactive CPU rasterizer viewer")]
struct Cli {
    /// Scene file (RON); the built-in sphere scene when omitted
    scene: Option<PathBuf>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("cpu-raster v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Load the scene named on the command line, falling back to the default
fn load_startup_scene(cli: &Cli) -> (SceneConfig, PathBuf) {
    let Some(path) = &cli.scene else {
        return (SceneConfig::default(), PathBuf::from("."));
    };
    match load_scene(path) {
        Ok(scene) => {
            log::info!("Loaded scene {}", path.display());
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (scene, base)
        }
        Err(e) => {
            log::error!("Failed to load {}: {}, using default scene", path.display(), e);
            (SceneConfig::default(), PathBuf::from("."))
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (scene, base_dir) = load_startup_scene(&cli);
    let mesh = match scene.load_mesh(&base_dir) {
        Ok(mesh) => mesh,
        Err(e) => {
            log::error!("Failed to load mesh: {}", e);
            return;
        }
    };
    let mut fb = match scene.framebuffer() {
        Ok(fb) => fb,
        Err(e) => {
            log::error!("Failed to create framebuffer: {}", e);
            return;
        }
    };

    let aspect = scene.aspect();
    let mut camera = scene.camera.to_camera();
    let mut pipeline = scene.pipeline.build();
    let mut stats = DrawStats::default();
    let mut last_mouse = mouse_position();

    log::info!("=== cpu-raster viewer ({} pipeline) ===", pipeline.name());

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::R) {
            camera = scene.camera.to_camera();
        }

        // Orbit with left drag
        let mouse = mouse_position();
        if is_mouse_button_down(MouseButton::Left) {
            let dx = mouse.0 - last_mouse.0;
            let dy = mouse.1 - last_mouse.1;
            camera.rotate(dy * ROTATE_SPEED, -dx * ROTATE_SPEED);
        }
        last_mouse = mouse;

        let wheel = mouse_wheel().1;
        if wheel != 0.0 {
            camera.zoom(wheel.signum() * ZOOM_STEP);
        }

        // Render
        pipeline.set_projection(camera.view_projection(aspect));
        let start = get_time();
        let result = {
            let mut raster = Rasterizer::new();
            raster.set_framebuffer(&mut fb);
            raster.set_pipeline(&pipeline);
            raster.clear();
            raster.draw(&mesh)
        };
        let render_ms = (get_time() - start) * 1000.0;
        match result {
            Ok(s) => stats = s,
            Err(e) => {
                log::error!("Draw failed: {}", e);
                break;
            }
        }

        // Present, scaled to fit and centered
        let texture = Texture2D::from_rgba8(fb.width() as u16, fb.height() as u16, &fb.to_rgba_bytes());
        texture.set_filter(FilterMode::Nearest);

        let screen_w = screen_width();
        let screen_h = screen_height();
        let scale = (screen_w / fb.width() as f32).min(screen_h / fb.height() as f32);
        let draw_w = fb.width() as f32 * scale;
        let draw_h = fb.height() as f32 * scale;

        clear_background(Color::from_rgba(30, 30, 35, 255));
        draw_texture_ex(
            &texture,
            (screen_w - draw_w) * 0.5,
            (screen_h - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(draw_w, draw_h)),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{:.1} ms | {} / {} tris | {} px | dist {:.2}",
                render_ms,
                stats.rasterized(),
                stats.triangles,
                stats.fragments_written,
                camera.distance
            ),
            10.0,
            20.0,
            18.0,
            Color::from_rgba(200, 200, 200, 255),
        );

        next_frame().await
    }
}
