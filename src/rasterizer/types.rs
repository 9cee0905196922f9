//! Core types for the rasterizer

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Packed RGB color (0-255 per channel)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert a shaded color with components in `[0, 1]`.
    ///
    /// Each channel is scaled by 255 and truncated; out-of-range values
    /// saturate and NaN becomes 0.
    pub fn from_unit(c: Vec3) -> Self {
        Self {
            r: (c.x * 255.0) as u8,
            g: (c.y * 255.0) as u8,
            b: (c.z * 255.0) as u8,
        }
    }

    /// Convert to [u8; 4] with opaque alpha
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A triangle primitive (indices into the mesh's attribute channels)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Triangle {
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    pub fn indices(self) -> [u32; 3] {
        [self.a, self.b, self.c]
    }
}

/// Number of attribute descriptor slots a mesh carries
pub const ATTRIBUTE_SLOTS: usize = 10;

/// Named per-vertex data stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeChannel {
    Position,
    Normal,
    TexCoord,
    /// Free slot for pipeline-specific data; `Reserved(0)` is slot 3
    Reserved(u8),
}

impl AttributeChannel {
    /// Descriptor slot of this channel. May be `>= ATTRIBUTE_SLOTS` for
    /// reserved channels, which the mesh rejects.
    pub fn slot(self) -> usize {
        match self {
            AttributeChannel::Position => 0,
            AttributeChannel::Normal => 1,
            AttributeChannel::TexCoord => 2,
            AttributeChannel::Reserved(n) => 3 + n as usize,
        }
    }

    /// Scalars per vertex when a layout does not say otherwise
    pub fn default_components(self) -> u32 {
        match self {
            AttributeChannel::TexCoord => 2,
            _ => 3,
        }
    }
}

/// How one channel is read from the shared scalar pool, in `f32` units.
/// A stride of 0 marks an undeclared channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLayout {
    pub stride: u32,
    pub offset: u32,
    /// Scalars that make up one vertex of this channel
    pub components: u32,
}

impl AttributeLayout {
    pub fn is_declared(self) -> bool {
        self.stride != 0
    }

    /// First scalar of `vertex` in the pool
    #[inline]
    pub fn start(self, vertex: u32) -> usize {
        self.offset as usize + self.stride as usize * vertex as usize
    }

    /// One past the last scalar of `vertex`
    #[inline]
    pub fn end(self, vertex: u32) -> usize {
        self.start(vertex) + self.components as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_unit_truncates_and_saturates() {
        assert_eq!(Color::from_unit(Vec3::new(1.0, 0.5, 0.0)), Color::new(255, 127, 0));
        assert_eq!(Color::from_unit(Vec3::new(2.0, -1.0, f32::NAN)), Color::new(255, 0, 0));
    }

    #[test]
    fn test_channel_slots() {
        assert_eq!(AttributeChannel::Position.slot(), 0);
        assert_eq!(AttributeChannel::TexCoord.slot(), 2);
        assert_eq!(AttributeChannel::Reserved(6).slot(), ATTRIBUTE_SLOTS - 1);
        assert!(AttributeChannel::Reserved(7).slot() >= ATTRIBUTE_SLOTS);
    }

    #[test]
    fn test_layout_element_span() {
        let layout = AttributeLayout { stride: 8, offset: 6, components: 2 };
        assert_eq!(layout.start(2), 22);
        assert_eq!(layout.end(2), 24);
        assert_eq!(AttributeChannel::TexCoord.default_components(), 2);
        assert_eq!(AttributeChannel::Reserved(1).default_components(), 3);
    }
}
