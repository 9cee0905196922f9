//! cpu-raster: software triangle rasterizer
//!
//! Draws indexed triangle meshes into a color + depth framebuffer on the CPU:
//! - Edge-function scan conversion at pixel centers
//! - Perspective-correct reciprocal depth and a strict less-than z-buffer
//! - Shading through a user-supplied [`rasterizer::Pipeline`]

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod scene;
