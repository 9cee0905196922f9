//! CPU triangle rasterizer
//!
//! Features:
//! - Edge-function scan conversion sampled at pixel centers
//! - Perspective-correct depth (reciprocal depth interpolated in screen space)
//! - Z-buffer with strict less-than test
//! - Pluggable shading through the [`Pipeline`] trait
//!
//! Triangles must wind counter-clockwise in NDC; the other winding produces
//! no fragments.

mod error;
mod framebuffer;
mod math;
mod mesh;
mod pipeline;
mod render;
mod types;

pub use error::*;
pub use framebuffer::*;
pub use math::*;
pub use mesh::*;
pub use pipeline::*;
pub use render::*;
pub use types::*;
