//! Procedural meshes
//!
//! Every generator emits the same interleaved layout: position(3),
//! normal(3), texcoord(2). Faces wind counter-clockwise seen from outside.

use glam::{Vec2, Vec3};

use crate::rasterizer::{AttributeChannel, Mesh, RasterError, RasterResult};

/// Scalars per vertex in generated meshes
pub const VERTEX_STRIDE: u32 = 8;

/// A vertex with position, texture coordinate, and normal
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub pos: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(pos: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self { pos, uv, normal }
    }
}

/// Pack vertices into one interleaved pool and declare the three channels
pub fn interleaved_mesh(vertices: &[Vertex], indices: &[u32]) -> RasterResult<Mesh> {
    let mut scalars = Vec::with_capacity(vertices.len() * VERTEX_STRIDE as usize);
    for v in vertices {
        scalars.extend_from_slice(&v.pos.to_array());
        scalars.extend_from_slice(&v.normal.to_array());
        scalars.extend_from_slice(&v.uv.to_array());
    }

    let mut mesh = Mesh::new();
    mesh.set_attribute_buffer(&scalars)?;
    mesh.set_attribute_layout(AttributeChannel::Position, VERTEX_STRIDE, 0)?;
    mesh.set_attribute_layout(AttributeChannel::Normal, VERTEX_STRIDE, 3)?;
    mesh.set_attribute_layout(AttributeChannel::TexCoord, VERTEX_STRIDE, 6)?;
    mesh.set_indices(indices)?;
    Ok(mesh)
}

/// Unit cube spanning [-1, 1] with per-face normals and UVs
pub fn cube() -> RasterResult<Mesh> {
    let positions = [
        // Front face
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        // Back face
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        // Top face
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        // Bottom face
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        // Right face
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        // Left face
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
    ];

    let normals = [
        Vec3::Z,
        Vec3::NEG_Z,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::X,
        Vec3::NEG_X,
    ];

    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face_idx, normal) in normals.iter().enumerate() {
        let base = face_idx * 4;
        for (i, uv) in uvs.iter().enumerate() {
            vertices.push(Vertex::new(positions[base + i], *uv, *normal));
        }

        // Two triangles per face
        let vbase = base as u32;
        indices.extend_from_slice(&[vbase, vbase + 1, vbase + 2]);
        indices.extend_from_slice(&[vbase, vbase + 2, vbase + 3]);
    }

    interleaved_mesh(&vertices, &indices)
}

/// Unit sphere with `rings` latitude bands and `segments` longitude bands.
///
/// The seam column is duplicated so texture coordinates wrap cleanly; pole
/// caps emit one triangle per segment.
pub fn uv_sphere(rings: u32, segments: u32) -> RasterResult<Mesh> {
    if rings < 2 || segments < 3 {
        return Err(RasterError::InvalidArgument(format!(
            "sphere needs at least 2 rings and 3 segments, got {} and {}",
            rings, segments
        )));
    }

    let vertex_count = rings
        .checked_add(1)
        .zip(segments.checked_add(1))
        .and_then(|(r, s)| r.checked_mul(s))
        .ok_or_else(|| {
            RasterError::InvalidArgument(format!(
                "sphere of {} rings and {} segments has more vertices than u32 indices address",
                rings, segments
            ))
        })?;

    // Every index below is < vertex_count, so the u32 arithmetic cannot overflow
    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for i in 0..=rings {
        let v = i as f32 / rings as f32;
        let theta = v * std::f32::consts::PI;
        for j in 0..=segments {
            let u = j as f32 / segments as f32;
            let phi = u * std::f32::consts::TAU;
            let pos = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.push(Vertex::new(pos, Vec2::new(u, v), pos));
        }
    }

    let row = segments + 1;
    let mut indices = Vec::new();
    for i in 0..rings {
        for j in 0..segments {
            let a = i * row + j;
            let b = a + row;
            let c = b + 1;
            let d = a + 1;
            // Rows 0 and `rings` collapse to a point
            if i + 1 < rings {
                indices.extend_from_slice(&[a, c, b]);
            }
            if i > 0 {
                indices.extend_from_slice(&[a, d, c]);
            }
        }
    }

    interleaved_mesh(&vertices, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle is non-degenerate and its winding agrees with its normals
    fn assert_outward_ccw(mesh: &Mesh) {
        for tri in mesh.triangles() {
            let p: Vec<Vec3> = tri
                .indices()
                .iter()
                .map(|&i| mesh.attribute::<Vec3>(AttributeChannel::Position, i))
                .collect();
            let n: Vec3 = tri
                .indices()
                .iter()
                .map(|&i| mesh.attribute::<Vec3>(AttributeChannel::Normal, i))
                .sum();
            let cross = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(cross.length() > 1e-6, "degenerate triangle {:?}", tri);
            assert!(cross.dot(n) > 0.0, "triangle {:?} winds inward", tri);
        }
    }

    #[test]
    fn test_cube_layout() {
        let mesh = cube().unwrap();
        assert_eq!(mesh.primitive_count(), 12);
        assert_eq!(mesh.vertex_count(AttributeChannel::Position), 24);
        assert!(mesh.validate().is_ok());

        let uv: Vec2 = mesh.attribute(AttributeChannel::TexCoord, 2);
        assert_eq!(uv, Vec2::new(1.0, 1.0));
        let n: Vec3 = mesh.attribute(AttributeChannel::Normal, 5);
        assert_eq!(n, Vec3::NEG_Z);
    }

    #[test]
    fn test_cube_winds_outward() {
        assert_outward_ccw(&cube().unwrap());
    }

    #[test]
    fn test_sphere_winds_outward() {
        let mesh = uv_sphere(8, 12).unwrap();
        // Two pole caps of one triangle per segment, two per quad elsewhere
        assert_eq!(mesh.primitive_count(), (2 * 12 + 2 * 12 * 6) as usize);
        assert!(mesh.validate().is_ok());
        assert_outward_ccw(&mesh);
    }

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = uv_sphere(4, 6).unwrap();
        for i in 0..mesh.vertex_count(AttributeChannel::Position) as u32 {
            let p: Vec3 = mesh.attribute(AttributeChannel::Position, i);
            assert!((p.length() - 1.0).abs() < 0.0001);
        }
    }

    #[test]
    fn test_sphere_rejects_tiny_tessellation() {
        assert!(uv_sphere(1, 8).is_err());
        assert!(uv_sphere(4, 2).is_err());
    }

    #[test]
    fn test_sphere_rejects_unindexable_tessellation() {
        assert!(matches!(
            uv_sphere(u32::MAX, 8),
            Err(RasterError::InvalidArgument(_))
        ));
        assert!(matches!(
            uv_sphere(70_000, 70_000),
            Err(RasterError::InvalidArgument(_))
        ));
    }
}
