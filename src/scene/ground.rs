//! The static floor every shape lands on

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};

/// A fixed body with an infinite half-space collider
///
/// The body is rotated -90° about X so the collider's local +Z normal points
/// up in world space. The visual plane is finite (`extent` on a side).
#[derive(Debug, Clone)]
pub struct GroundPlane {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    position: Vec3,
    rotation: Quat,
    extent: f32,
}

impl GroundPlane {
    pub fn new(physics: &mut Physics, position: Vec3, extent: f32) -> Self {
        let rotation = Quat::from_rotation_x(-FRAC_PI_2);
        let body = physics.create_static_body(position, rotation);
        let collider = physics.add_half_space(body);

        log::debug!("Ground plane at y = {} ({extent} wide)", position.y);

        Self {
            body,
            collider,
            position,
            rotation,
            extent,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// World up, the plane's surface normal
    pub fn normal(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Model matrix for a unit plane mesh lying in local XY
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.extent, self.extent, 1.0),
            self.rotation,
            self.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Ray;

    #[test]
    fn test_normal_points_up() {
        let mut physics = Physics::new();
        let ground = GroundPlane::new(&mut physics, Vec3::new(0.0, -10.0, 0.0), 1000.0);

        assert!((ground.normal() - Vec3::Y).length() < 1e-5);
        assert_eq!(physics.body_count(), 1);
        assert_eq!(physics.collider_user_data(ground.collider()), Some(0));
    }

    #[test]
    fn test_transform_maps_unit_plane_to_extent() {
        let mut physics = Physics::new();
        let ground = GroundPlane::new(&mut physics, Vec3::new(0.0, -10.0, 0.0), 1000.0);

        let corner = ground.transform().transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((corner.y + 10.0).abs() < 1e-3);
        assert!((corner.x - 500.0).abs() < 1e-2);
        assert!((corner.z.abs() - 500.0).abs() < 1e-2);
    }

    #[test]
    fn test_ray_hits_far_from_origin() {
        let mut physics = Physics::new();
        let ground = GroundPlane::new(&mut physics, Vec3::new(0.0, -10.0, 0.0), 10.0);
        physics.update_queries();

        // The collider is unbounded even though the visual is small
        let ray = Ray::new(Vec3::new(5000.0, 0.0, -3000.0), Vec3::NEG_Y);
        let hit = physics.raycast(&ray, 100.0, |_, _| true).unwrap();

        assert_eq!(hit.collider, ground.collider());
        assert!((hit.distance - 10.0).abs() < 1e-3);
    }
}
