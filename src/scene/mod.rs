//! Scene setup around the rasterizer
//!
//! Camera, procedural meshes and RON scene files. Nothing here is needed to
//! rasterize; it is what the binaries use to produce a projection and a mesh.

mod camera;
mod config;
mod geometry;

pub use camera::*;
pub use config::*;
pub use geometry::*;
