//! Color + depth target for software rendering

use std::path::Path;

use image::{GrayImage, RgbImage};

use super::error::{RasterError, RasterResult};
use super::types::Color;

/// Depth value of a pixel nothing has been drawn to
pub const DEPTH_CLEAR: f32 = f32::MAX;

/// Framebuffer for software rendering
///
/// Both buffers are row-major with the origin at the top-left corner.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    color: Vec<Color>,
    depth: Vec<f32>,
    width: usize,
    height: usize,
    clear_color: Color,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::invalid(format!(
                "framebuffer size {}x{} must be positive",
                width, height
            )));
        }
        let clear_color = Color::WHITE;
        Ok(Self {
            color: vec![clear_color; width * height],
            depth: vec![DEPTH_CLEAR; width * height],
            width,
            height,
            clear_color,
        })
    }

    /// Use `color` for subsequent clears and clear now
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self.clear();
        self
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn clear(&mut self) {
        self.color.fill(self.clear_color);
        self.depth.fill(DEPTH_CLEAR);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_buffer(&self) -> &[Color] {
        &self.color
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    /// Mutable access to both buffers at once
    pub fn buffers_mut(&mut self) -> (&mut [Color], &mut [f32]) {
        (&mut self.color, &mut self.depth)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.color[y * self.width + x])
        } else {
            None
        }
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.depth[y * self.width + x])
        } else {
            None
        }
    }

    /// Color buffer as packed RGB bytes (no copy)
    pub fn as_rgb_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    /// Color buffer expanded to RGBA, for texture uploads
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.color.iter().flat_map(|c| c.to_rgba()).collect()
    }

    pub fn to_image(&self) -> RgbImage {
        // Buffer length always matches the dimensions
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.color[y as usize * self.width + x as usize];
            image::Rgb([c.r, c.g, c.b])
        })
    }

    /// Written depths mapped to grayscale, near = white, untouched = black
    pub fn depth_image(&self) -> GrayImage {
        let written = self.depth.iter().copied().filter(|d| *d < DEPTH_CLEAR);
        let (near, far) = written.fold((f32::MAX, f32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));
        let range = (far - near).max(f32::EPSILON);

        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let d = self.depth[y as usize * self.width + x as usize];
            if d < DEPTH_CLEAR {
                image::Luma([(255.0 - (d - near) / range * 223.0) as u8])
            } else {
                image::Luma([0])
            }
        })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.to_image().save(path)
    }
}
