//! Scalar helpers for scan conversion
//!
//! Vector and matrix types come from glam; this module only holds the few
//! operations the scan loop and the shading variants share.

use glam::{Vec2, Vec3};

/// Signed, doubled area of the triangle (a, b, c).
///
/// Positive when `c` lies on the inner side of the directed edge `a -> b`
/// for triangles that wind counter-clockwise in NDC (clockwise in raster
/// space, where y grows downward). Only `x` and `y` are read.
#[inline]
pub fn edge_function(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

#[inline]
pub fn min3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).min(c)
}

#[inline]
pub fn max3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b).max(c)
}

/// Weighted sum `w.x * a + w.y * b + w.z * c`, accumulated with fused
/// multiply-add per component.
#[inline]
pub fn barycentric_mix(a: Vec3, b: Vec3, c: Vec3, w: Vec3) -> Vec3 {
    Vec3::new(
        w.x.mul_add(a.x, w.y.mul_add(b.x, w.z * c.x)),
        w.x.mul_add(a.y, w.y.mul_add(b.y, w.z * c.y)),
        w.x.mul_add(a.z, w.y.mul_add(b.z, w.z * c.z)),
    )
}

/// Two-component variant of [`barycentric_mix`] for texture coordinates.
#[inline]
pub fn barycentric_mix2(a: Vec2, b: Vec2, c: Vec2, w: Vec3) -> Vec2 {
    Vec2::new(
        w.x.mul_add(a.x, w.y.mul_add(b.x, w.z * c.x)),
        w.x.mul_add(a.y, w.y.mul_add(b.y, w.z * c.y)),
    )
}

/// Convert a pipeline position into raster space.
///
/// `v.x` and `v.y` are divided by the camera depth `v.z`, mapped from
/// `[-1, 1]` to `[0, width]` and `[height, 0]` (y flips), and `z` becomes
/// `1 / z` so depth can be interpolated linearly in screen space.
#[inline]
pub fn to_raster_space(v: Vec3, width: f32, height: f32) -> Vec3 {
    let x = v.x / v.z;
    let y = v.y / v.z;
    Vec3::new(
        (1.0 + x) * 0.5 * width,
        (1.0 - (1.0 + y) * 0.5) * height,
        1.0 / v.z,
    )
}
