//! Orbit camera producing the rasterizer's projection

use glam::{Mat4, Vec3, Vec4};

/// Camera circling a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub rotation_x: f32, // Pitch
    pub rotation_y: f32, // Yaw
    /// Vertical field of view in radians
    pub fov_y: f32,
}

impl OrbitCamera {
    pub const MIN_DISTANCE: f32 = 0.1;

    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance: distance.max(Self::MIN_DISTANCE),
            rotation_x: 0.0,
            rotation_y: 0.0,
            fov_y: 50f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.rotation_y += dy;
        self.rotation_x = (self.rotation_x + dx).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
    }

    /// Move toward (positive) or away from the target
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).max(Self::MIN_DISTANCE);
    }

    /// Unit vector from the target to the eye
    pub fn offset_direction(&self) -> Vec3 {
        Vec3::new(
            self.rotation_x.cos() * self.rotation_y.sin(),
            self.rotation_x.sin(),
            self.rotation_x.cos() * self.rotation_y.cos(),
        )
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.offset_direction() * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Projection leaving the divide to the rasterizer.
    ///
    /// `x` and `y` are scaled so that dividing by depth lands the view
    /// frustum on `[-1, 1]`; `z` becomes the positive distance along the
    /// view direction (view space looks down -Z).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let f = 1.0 / (self.fov_y * 0.5).tan();
        Mat4::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 4.0)
    }
}
