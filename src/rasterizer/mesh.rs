//! Indexed triangle storage
//!
//! A mesh is a triangle list plus one flat `f32` pool shared by every
//! attribute channel. Each channel reads its data through a stride/offset
//! descriptor, so interleaved and planar layouts look the same to shading
//! code.

use std::mem::size_of;

use bytemuck::Pod;

use super::error::{RasterError, RasterResult};
use super::types::{AttributeChannel, AttributeLayout, Triangle, ATTRIBUTE_SLOTS};

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    layouts: [AttributeLayout; ATTRIBUTE_SLOTS],
    scalars: Vec<f32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the triangle list with a flat index buffer (three per triangle)
    pub fn set_indices(&mut self, indices: &[u32]) -> RasterResult<()> {
        if indices.is_empty() {
            return Err(RasterError::invalid("index buffer is empty"));
        }
        if indices.len() % 3 != 0 {
            return Err(RasterError::invalid(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        self.triangles = indices
            .chunks_exact(3)
            .map(|t| Triangle::new(t[0], t[1], t[2]))
            .collect();
        Ok(())
    }

    /// Replace the shared scalar pool
    pub fn set_attribute_buffer(&mut self, scalars: &[f32]) -> RasterResult<()> {
        if scalars.is_empty() {
            return Err(RasterError::invalid("attribute buffer is empty"));
        }
        self.scalars = scalars.to_vec();
        Ok(())
    }

    /// Declare how `channel` is read from the scalar pool, with the
    /// channel's default width (3 scalars, 2 for texture coordinates).
    ///
    /// `stride` and `offset` count `f32`s, not bytes.
    pub fn set_attribute_layout(
        &mut self,
        channel: AttributeChannel,
        stride: u32,
        offset: u32,
    ) -> RasterResult<()> {
        self.set_attribute_layout_sized(channel, stride, offset, channel.default_components())
    }

    /// [`Mesh::set_attribute_layout`] with an explicit per-vertex width
    pub fn set_attribute_layout_sized(
        &mut self,
        channel: AttributeChannel,
        stride: u32,
        offset: u32,
        components: u32,
    ) -> RasterResult<()> {
        if stride == 0 {
            return Err(RasterError::invalid(format!("stride for {:?} must be nonzero", channel)));
        }
        if components == 0 {
            return Err(RasterError::invalid(format!("{:?} must read at least one scalar", channel)));
        }
        let slot = channel.slot();
        if slot >= ATTRIBUTE_SLOTS {
            return Err(RasterError::invalid(format!(
                "{:?} is outside the {} reserved attribute slots",
                channel, ATTRIBUTE_SLOTS
            )));
        }
        self.layouts[slot] = AttributeLayout { stride, offset, components };
        Ok(())
    }

    /// Current descriptor for `channel` (stride 0 when undeclared)
    pub fn layout(&self, channel: AttributeChannel) -> AttributeLayout {
        self.layouts.get(channel.slot()).copied().unwrap_or_default()
    }

    /// Read one vertex of `channel` as `T`.
    ///
    /// Reads `size_of::<T>() / 4` scalars starting at `offset + stride * vertex`.
    /// This is the per-pixel accessor: it does not return errors and panics
    /// if the read runs past the pool. Meshes accepted by [`Mesh::validate`]
    /// never do for the indices their triangles reference, as long as `T`
    /// is no wider than the channel's declared components.
    #[inline]
    pub fn attribute<T: Pod>(&self, channel: AttributeChannel, vertex: u32) -> T {
        let start = self.layouts[channel.slot()].start(vertex);
        let count = size_of::<T>() / size_of::<f32>();
        bytemuck::pod_read_unaligned(bytemuck::cast_slice(&self.scalars[start..start + count]))
    }

    /// Checked variant of [`Mesh::attribute`]
    pub fn try_attribute<T: Pod>(&self, channel: AttributeChannel, vertex: u32) -> RasterResult<T> {
        let layout = self.layout(channel);
        if !layout.is_declared() {
            return Err(RasterError::invalid(format!("{:?} has no layout", channel)));
        }
        if size_of::<T>() == 0 || size_of::<T>() % size_of::<f32>() != 0 {
            return Err(RasterError::invalid(format!(
                "attribute type of {} bytes is not a whole number of f32s",
                size_of::<T>()
            )));
        }

        let start = layout.start(vertex);
        let end = start + size_of::<T>() / size_of::<f32>();
        if end > self.scalars.len() {
            return Err(RasterError::OutOfRange {
                what: "attribute scalar",
                index: end - 1,
                len: self.scalars.len(),
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytemuck::cast_slice(&self.scalars[start..end])))
    }

    pub fn triangle(&self, index: usize) -> RasterResult<Triangle> {
        self.triangles.get(index).copied().ok_or(RasterError::OutOfRange {
            what: "triangle",
            index,
            len: self.triangles.len(),
        })
    }

    /// Triangles in draw order
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles.iter().copied()
    }

    /// The shared scalar pool
    pub fn attribute_buffer(&self) -> &[f32] {
        &self.scalars
    }

    pub fn primitive_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of vertices whose whole element lies inside the pool for `channel`
    pub fn vertex_count(&self, channel: AttributeChannel) -> usize {
        self.addressable(self.layout(channel))
    }

    fn addressable(&self, layout: AttributeLayout) -> usize {
        let first_end = layout.end(0);
        if !layout.is_declared() || first_end > self.scalars.len() {
            return 0;
        }
        (self.scalars.len() - first_end) / layout.stride as usize + 1
    }

    /// Check that every component of every referenced vertex is addressable
    /// through every declared channel.
    pub fn validate(&self) -> RasterResult<()> {
        let max_index = match self.triangles.iter().flat_map(|t| t.indices()).max() {
            Some(max) => max as usize,
            None => return Ok(()),
        };

        for layout in self.layouts.iter().filter(|l| l.is_declared()) {
            if layout.end(max_index as u32) > self.scalars.len() {
                return Err(RasterError::OutOfRange {
                    what: "vertex",
                    index: max_index,
                    len: self.addressable(*layout),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn interleaved(n: usize) -> Vec<f32> {
        // position(3) normal(3) per vertex
        let mut scalars = Vec::with_capacity(n * 6);
        for i in 0..n {
            let f = i as f32;
            scalars.extend_from_slice(&[f, f + 0.25, -f, 0.0, 1.0, f * 0.5]);
        }
        scalars
    }

    #[test]
    fn test_attribute_round_trip() {
        let n = 5;
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&interleaved(n)).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Position, 6, 0).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Normal, 6, 3).unwrap();

        for i in 0..n as u32 {
            let f = i as f32;
            let p: Vec3 = mesh.attribute(AttributeChannel::Position, i);
            let nrm: Vec3 = mesh.attribute(AttributeChannel::Normal, i);
            assert_eq!(p, Vec3::new(f, f + 0.25, -f));
            assert_eq!(nrm, Vec3::new(0.0, 1.0, f * 0.5));
            assert_eq!(mesh.try_attribute::<Vec3>(AttributeChannel::Normal, i).unwrap(), nrm);
        }
        assert_eq!(mesh.vertex_count(AttributeChannel::Position), n);
        assert_eq!(mesh.vertex_count(AttributeChannel::Normal), n);
    }

    #[test]
    fn test_attribute_reads_narrower_types() {
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        mesh.set_attribute_layout(AttributeChannel::TexCoord, 2, 0).unwrap();
        let uv: Vec2 = mesh.attribute(AttributeChannel::TexCoord, 1);
        assert_eq!(uv, Vec2::new(3.0, 4.0));
        let s: f32 = mesh.attribute(AttributeChannel::TexCoord, 0);
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_try_attribute_errors() {
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&[0.0; 6]).unwrap();
        assert!(matches!(
            mesh.try_attribute::<Vec3>(AttributeChannel::Normal, 0),
            Err(RasterError::InvalidArgument(_))
        ));

        mesh.set_attribute_layout(AttributeChannel::Position, 3, 0).unwrap();
        assert!(mesh.try_attribute::<Vec3>(AttributeChannel::Position, 1).is_ok());
        assert!(matches!(
            mesh.try_attribute::<Vec3>(AttributeChannel::Position, 2),
            Err(RasterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_set_indices_rejects_bad_input_without_effect() {
        let mut mesh = Mesh::new();
        mesh.set_indices(&[0, 1, 2]).unwrap();

        assert!(matches!(mesh.set_indices(&[]), Err(RasterError::InvalidArgument(_))));
        assert!(matches!(mesh.set_indices(&[0, 1]), Err(RasterError::InvalidArgument(_))));
        assert_eq!(mesh.primitive_count(), 1);
        assert_eq!(mesh.triangle(0).unwrap(), Triangle::new(0, 1, 2));
    }

    #[test]
    fn test_set_indices_replaces_previous_list() {
        let mut mesh = Mesh::new();
        mesh.set_indices(&[0, 1, 2, 2, 1, 3]).unwrap();
        assert_eq!(mesh.primitive_count(), 2);
        mesh.set_indices(&[3, 4, 5]).unwrap();
        assert_eq!(mesh.primitive_count(), 1);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![Triangle::new(3, 4, 5)]);
    }

    #[test]
    fn test_triangle_out_of_range() {
        let mut mesh = Mesh::new();
        mesh.set_indices(&[0, 1, 2]).unwrap();
        assert_eq!(
            mesh.triangle(1),
            Err(RasterError::OutOfRange { what: "triangle", index: 1, len: 1 })
        );
    }

    #[test]
    fn test_layout_rejects_zero_stride_and_unknown_slot() {
        let mut mesh = Mesh::new();
        assert!(mesh.set_attribute_layout(AttributeChannel::Position, 0, 0).is_err());
        assert!(mesh.set_attribute_layout(AttributeChannel::Reserved(7), 3, 0).is_err());
        assert!(mesh.set_attribute_layout(AttributeChannel::Reserved(6), 3, 0).is_ok());
        assert!(!mesh.layout(AttributeChannel::Position).is_declared());
        assert!(mesh.set_attribute_buffer(&[]).is_err());
    }

    #[test]
    fn test_validate_catches_unaddressable_vertex() {
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&[0.0; 9]).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Position, 3, 0).unwrap();
        mesh.set_indices(&[0, 1, 2]).unwrap();
        assert!(mesh.validate().is_ok());

        mesh.set_indices(&[0, 1, 3]).unwrap();
        assert!(matches!(
            mesh.validate(),
            Err(RasterError::OutOfRange { what: "vertex", index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_validate_catches_truncated_last_vertex() {
        // Vertex 2 starts inside the pool but its z is missing
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&[0.0; 7]).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Position, 3, 0).unwrap();
        mesh.set_indices(&[0, 1, 2]).unwrap();

        assert_eq!(mesh.vertex_count(AttributeChannel::Position), 2);
        assert!(matches!(
            mesh.validate(),
            Err(RasterError::OutOfRange { what: "vertex", index: 2, len: 2 })
        ));
        assert!(matches!(
            mesh.try_attribute::<Vec3>(AttributeChannel::Position, 2),
            Err(RasterError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_uses_declared_width() {
        // Interleaved position(3) + one scalar; the trailing channel is 1 wide
        let mut mesh = Mesh::new();
        mesh.set_attribute_buffer(&[0.0; 12]).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Position, 4, 0).unwrap();
        mesh.set_attribute_layout(AttributeChannel::Reserved(0), 4, 3).unwrap();
        mesh.set_indices(&[0, 1, 2]).unwrap();
        // Default width of 3 runs past the pool for vertex 2
        assert!(mesh.validate().is_err());

        mesh.set_attribute_layout_sized(AttributeChannel::Reserved(0), 4, 3, 1).unwrap();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.vertex_count(AttributeChannel::Reserved(0)), 3);
        assert_eq!(mesh.attribute::<f32>(AttributeChannel::Reserved(0), 2), 0.0);

        assert!(matches!(
            mesh.set_attribute_layout_sized(AttributeChannel::Normal, 4, 0, 0),
            Err(RasterError::InvalidArgument(_))
        ));
    }
}
