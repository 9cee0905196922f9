//! Triangle scan conversion
//!
//! Edge-function rasterization over a clipped bounding box, sampling pixel
//! centers, with reciprocal depth interpolated in screen space.

use glam::Vec3;

use super::error::RasterResult;
use super::framebuffer::Framebuffer;
use super::math::{edge_function, max3, min3, to_raster_space};
use super::mesh::Mesh;
use super::pipeline::Pipeline;
use super::types::Color;

/// Counters for one `draw` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: usize,
    /// A corner landed at camera depth 0 (or produced non-finite raster coordinates)
    pub culled_invalid_depth: usize,
    /// All three corners behind the camera
    pub culled_behind: usize,
    pub culled_offscreen: usize,
    /// Zero area, or wound the wrong way
    pub culled_degenerate: usize,
    pub fragments_tested: usize,
    pub fragments_written: usize,
}

impl DrawStats {
    pub fn rasterized(&self) -> usize {
        self.triangles
            - self.culled_invalid_depth
            - self.culled_behind
            - self.culled_offscreen
            - self.culled_degenerate
    }

    pub fn accumulate(&mut self, other: &DrawStats) {
        self.triangles += other.triangles;
        self.culled_invalid_depth += other.culled_invalid_depth;
        self.culled_behind += other.culled_behind;
        self.culled_offscreen += other.culled_offscreen;
        self.culled_degenerate += other.culled_degenerate;
        self.fragments_tested += other.fragments_tested;
        self.fragments_written += other.fragments_written;
    }
}

/// Draws meshes into a borrowed framebuffer with a borrowed pipeline.
///
/// Both must be bound before [`Rasterizer::draw`]; drawing unbound is a
/// programming error and panics.
pub struct Rasterizer<'a, P: Pipeline + ?Sized> {
    framebuffer: Option<&'a mut Framebuffer>,
    pipeline: Option<&'a P>,
    width: usize,
    height: usize,
}

impl<'a, P: Pipeline + ?Sized> Default for Rasterizer<'a, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, P: Pipeline + ?Sized> Rasterizer<'a, P> {
    pub fn new() -> Self {
        Self {
            framebuffer: None,
            pipeline: None,
            width: 0,
            height: 0,
        }
    }

    pub fn set_framebuffer(&mut self, framebuffer: &'a mut Framebuffer) {
        self.width = framebuffer.width();
        self.height = framebuffer.height();
        log::trace!("bound framebuffer {}x{}", self.width, self.height);
        self.framebuffer = Some(framebuffer);
    }

    pub fn set_pipeline(&mut self, pipeline: &'a P) {
        self.pipeline = Some(pipeline);
    }

    pub fn is_bound(&self) -> bool {
        self.framebuffer.is_some() && self.pipeline.is_some()
    }

    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_deref()
    }

    /// Clear the bound framebuffer
    pub fn clear(&mut self) {
        self.framebuffer
            .as_deref_mut()
            .expect("Rasterizer::clear called without a framebuffer")
            .clear();
    }

    /// Rasterize every triangle of `mesh`.
    ///
    /// Fails only when the mesh references vertices its attribute pool
    /// cannot address; degenerate triangles are skipped and counted.
    pub fn draw(&mut self, mesh: &Mesh) -> RasterResult<DrawStats> {
        let framebuffer = self
            .framebuffer
            .as_deref_mut()
            .expect("Rasterizer::draw called without a framebuffer");
        let pipeline = self.pipeline.expect("Rasterizer::draw called without a pipeline");
        mesh.validate()?;

        let mut stats = DrawStats::default();

        let width = self.width;
        let height = self.height;
        let (fwidth, fheight) = (width as f32, height as f32);
        let (color_buffer, depth_buffer) = framebuffer.buffers_mut();

        for triangle in mesh.triangles() {
            stats.triangles += 1;

            let v0 = to_raster_space(pipeline.position(mesh, triangle.a), fwidth, fheight);
            let v1 = to_raster_space(pipeline.position(mesh, triangle.b), fwidth, fheight);
            let v2 = to_raster_space(pipeline.position(mesh, triangle.c), fwidth, fheight);

            if !(v0.is_finite() && v1.is_finite() && v2.is_finite()) {
                stats.culled_invalid_depth += 1;
                continue;
            }

            if v0.z < 0.0 && v1.z < 0.0 && v2.z < 0.0 {
                stats.culled_behind += 1;
                continue;
            }

            // Bounding box
            let xmin = min3(v0.x, v1.x, v2.x);
            let ymin = min3(v0.y, v1.y, v2.y);
            let xmax = max3(v0.x, v1.x, v2.x);
            let ymax = max3(v0.y, v1.y, v2.y);

            if xmin > fwidth - 1.0 || xmax < 0.0 || ymin > fheight - 1.0 || ymax < 0.0 {
                stats.culled_offscreen += 1;
                continue;
            }

            // Box corners can be negative; clamp before going unsigned
            let x0 = xmin.floor().max(0.0) as usize;
            let x1 = (xmax.floor() as usize).min(width - 1);
            let y0 = ymin.floor().max(0.0) as usize;
            let y1 = (ymax.floor() as usize).min(height - 1);

            let area = edge_function(v0, v1, v2);
            if area <= 0.0 {
                stats.culled_degenerate += 1;
                continue;
            }

            for y in y0..=y1 {
                let row = y * width;
                for x in x0..=x1 {
                    let sample = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                    let w0 = edge_function(v1, v2, sample);
                    let w1 = edge_function(v2, v0, sample);
                    let w2 = edge_function(v0, v1, sample);
                    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                        continue;
                    }
                    stats.fragments_tested += 1;

                    let w = Vec3::new(w0, w1, w2) / area;
                    let z = 1.0 / (v0.z * w.x + v1.z * w.y + v2.z * w.z);

                    // Depth test, first writer keeps ties
                    let idx = row + x;
                    if z < depth_buffer[idx] {
                        depth_buffer[idx] = z;

                        let mut shaded = Vec3::new(sample.x, sample.y, z);
                        pipeline.pixel(mesh, &mut shaded, w, triangle);
                        color_buffer[idx] = Color::from_unit(shaded);
                        stats.fragments_written += 1;
                    }
                }
            }
        }

        log::debug!(
            "draw: {} triangles, {} rasterized, {} fragments written",
            stats.triangles,
            stats.rasterized(),
            stats.fragments_written
        );
        Ok(stats)
    }
}
