//! Shading pipelines
//!
//! A pipeline supplies the two programmable stages of the rasterizer:
//! `position` runs once per triangle corner and `pixel` runs once per
//! fragment that passes the depth test.

use glam::{Mat4, Vec2, Vec3};

use super::math::{barycentric_mix, barycentric_mix2};
use super::mesh::Mesh;
use super::types::{AttributeChannel, Triangle};

pub trait Pipeline {
    /// Position of `vertex` with `x` and `y` not yet divided by depth and
    /// `z` holding camera-space depth (positive in front of the camera).
    fn position(&self, mesh: &Mesh, vertex: u32) -> Vec3;

    /// Shade one fragment.
    ///
    /// `color` arrives holding the sample position (pixel center and
    /// resolved depth) and must leave holding the color, each component in
    /// `[0, 1]`. `barycentric` sums to 1.
    fn pixel(&self, mesh: &Mesh, color: &mut Vec3, barycentric: Vec3, triangle: Triangle);
}

/// Apply `projection` to a position attribute, keeping `xyz` of the result.
#[inline]
fn project(mesh: &Mesh, projection: &Mat4, vertex: u32) -> Vec3 {
    let p: Vec3 = mesh.attribute(AttributeChannel::Position, vertex);
    (*projection * p.extend(1.0)).truncate()
}

/// Interpolated vertex normal at a fragment
#[inline]
fn interpolated_normal(mesh: &Mesh, barycentric: Vec3, triangle: Triangle) -> Vec3 {
    let n0: Vec3 = mesh.attribute(AttributeChannel::Normal, triangle.a);
    let n1: Vec3 = mesh.attribute(AttributeChannel::Normal, triangle.b);
    let n2: Vec3 = mesh.attribute(AttributeChannel::Normal, triangle.c);
    barycentric_mix(n0, n1, n2, barycentric)
}

/// Diffuse term of `normal` against `light_direction`, scaled and clamped
#[inline]
fn diffuse(normal: Vec3, light_direction: Vec3, intensity: f32) -> f32 {
    (normal.dot(light_direction).max(0.0) * intensity).clamp(0.0, 1.0)
}

/// Grey diffuse-only shading from interpolated vertex normals.
///
/// The light direction is not normalized: its length scales the result
/// together with `intensity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusePipeline {
    pub projection: Mat4,
    pub light_direction: Vec3,
    pub intensity: f32,
}

impl DiffusePipeline {
    pub const DEFAULT_LIGHT: Vec3 = Vec3::ONE;
    pub const DEFAULT_INTENSITY: f32 = 0.56;

    pub fn new(projection: Mat4) -> Self {
        Self {
            projection,
            light_direction: Self::DEFAULT_LIGHT,
            intensity: Self::DEFAULT_INTENSITY,
        }
    }
}

impl Default for DiffusePipeline {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl Pipeline for DiffusePipeline {
    #[inline]
    fn position(&self, mesh: &Mesh, vertex: u32) -> Vec3 {
        project(mesh, &self.projection, vertex)
    }

    #[inline]
    fn pixel(&self, mesh: &Mesh, color: &mut Vec3, barycentric: Vec3, triangle: Triangle) {
        let normal = interpolated_normal(mesh, barycentric, triangle);
        *color = Vec3::splat(diffuse(normal, self.light_direction, self.intensity));
    }
}

/// Diffuse shading modulated by a texture-coordinate checkerboard.
///
/// Texture coordinates are interpolated with the screen-space weights
/// (affine), `cells` squares per unit, dark squares at 0.3 and light at 0.7.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckerPipeline {
    pub diffuse: DiffusePipeline,
    pub cells: f32,
}

impl CheckerPipeline {
    pub const DARK: f32 = 0.3;
    pub const LIGHT: f32 = 0.7;

    pub fn new(projection: Mat4) -> Self {
        Self {
            diffuse: DiffusePipeline::new(projection),
            cells: 10.0,
        }
    }

    /// Pattern value at `uv`: either [`Self::DARK`] or [`Self::LIGHT`]
    pub fn pattern(&self, uv: Vec2) -> f32 {
        let u = (uv.x * self.cells).rem_euclid(1.0) > 0.5;
        let v = (uv.y * self.cells).rem_euclid(1.0) < 0.5;
        if u ^ v {
            Self::LIGHT
        } else {
            Self::DARK
        }
    }
}

impl Pipeline for CheckerPipeline {
    #[inline]
    fn position(&self, mesh: &Mesh, vertex: u32) -> Vec3 {
        project(mesh, &self.diffuse.projection, vertex)
    }

    #[inline]
    fn pixel(&self, mesh: &Mesh, color: &mut Vec3, barycentric: Vec3, triangle: Triangle) {
        let uv0: Vec2 = mesh.attribute(AttributeChannel::TexCoord, triangle.a);
        let uv1: Vec2 = mesh.attribute(AttributeChannel::TexCoord, triangle.b);
        let uv2: Vec2 = mesh.attribute(AttributeChannel::TexCoord, triangle.c);
        let uv = barycentric_mix2(uv0, uv1, uv2, barycentric);

        let normal = interpolated_normal(mesh, barycentric, triangle);
        let shade = diffuse(normal, self.diffuse.light_direction, self.diffuse.intensity);
        *color = Vec3::splat((shade * self.pattern(uv)).clamp(0.0, 1.0));
    }
}

/// Pipeline built from two closures
pub struct FnPipeline<V, F> {
    position: V,
    pixel: F,
}

impl<V, F> FnPipeline<V, F>
where
    V: Fn(&Mesh, u32) -> Vec3,
    F: Fn(&Mesh, &mut Vec3, Vec3, Triangle),
{
    pub fn new(position: V, pixel: F) -> Self {
        Self { position, pixel }
    }
}

impl<V, F> Pipeline for FnPipeline<V, F>
where
    V: Fn(&Mesh, u32) -> Vec3,
    F: Fn(&Mesh, &mut Vec3, Vec3, Triangle),
{
    #[inline]
    fn position(&self, mesh: &Mesh, vertex: u32) -> Vec3 {
        (self.position)(mesh, vertex)
    }

    #[inline]
    fn pixel(&self, mesh: &Mesh, color: &mut Vec3, barycentric: Vec3, triangle: Triangle) {
        (self.pixel)(mesh, color, barycentric, triangle)
    }
}

/// The shading variants selectable from a scene file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePipeline {
    Diffuse(DiffusePipeline),
    Checker(CheckerPipeline),
}

impl ScenePipeline {
    pub fn set_projection(&mut self, projection: Mat4) {
        match self {
            ScenePipeline::Diffuse(p) => p.projection = projection,
            ScenePipeline::Checker(p) => p.diffuse.projection = projection,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenePipeline::Diffuse(_) => "diffuse",
            ScenePipeline::Checker(_) => "checker",
        }
    }
}

impl Pipeline for ScenePipeline {
    #[inline]
    fn position(&self, mesh: &Mesh, vertex: u32) -> Vec3 {
        match self {
            ScenePipeline::Diffuse(p) => p.position(mesh, vertex),
            ScenePipeline::Checker(p) => p.position(mesh, vertex),
        }
    }

    #[inline]
    fn pixel(&self, mesh: &Mesh, color: &mut Vec3, barycentric: Vec3, triangle: Triangle) {
        match self {
            ScenePipeline::Diffuse(p) => p.pixel(mesh, color, barycentric, triangle),
            ScenePipeline::Checker(p) => p.pixel(mesh, color, barycentric, triangle),
        }
    }
}
