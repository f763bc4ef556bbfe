//! Camera system for 3D rendering

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::physics::Ray;

/// Perspective camera for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Direction the camera is looking at
    pub direction: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Camera {
    /// Create a camera at a specific position looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            direction: (target - position).normalize_or(Vec3::NEG_Z),
            up,
            fov: 60.0_f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Set the vertical field of view in degrees
    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.fov = degrees.to_radians();
        self
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// World-space ray through a pixel, for picking
    ///
    /// `cursor` is in physical pixels with the origin at the top-left.
    pub fn screen_ray(&self, cursor: Vec2, width: u32, height: u32) -> Ray {
        let ndc = Vec2::new(
            2.0 * cursor.x / width.max(1) as f32 - 1.0,
            1.0 - 2.0 * cursor.y / height.max(1) as f32,
        );
        let inverse = self.view_projection_matrix().inverse();

        // wgpu clip space depth runs 0..1
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }
}
