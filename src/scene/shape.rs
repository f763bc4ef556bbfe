//! Falling shapes and their pointer handling

use std::fmt;

use glam::{Quat, Vec3};

use crate::core::ColliderFit;
use crate::physics::{ColliderHandle, ColliderShape, ForceTarget, Physics, RigidBodyHandle};
use crate::renderer::Mesh;

use super::catalog::{Hsl, ShapeKind};

/// Unique token for a spawned shape, increasing within a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything decided at spawn time; never changes afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub color: Hsl,
    pub spawn_position: Vec3,
}

/// Which pointer interaction reached a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Leave,
}

/// A pointer event travelling through the shapes under the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Where the ray entered the shape, when there was a hit
    pub point: Option<Vec3>,
    stopped: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, point: Option<Vec3>) -> Self {
        Self {
            kind,
            point,
            stopped: false,
        }
    }

    /// Keep the event from reaching shapes further along the ray
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// ECS component for a realized shape
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub color: Hsl,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    /// Massless sensor matching the rendered mesh, hit by pointer rays
    pub picker: ColliderHandle,
    /// Held down by the pointer; sampled every frame
    pub activated: bool,
}

impl DynamicShape {
    /// Create the rigid body for a descriptor
    ///
    /// The solid collider follows `fit`. The picker always follows the drawn
    /// geometry and carries `user_data` so pointer rays can find the owning
    /// entity again.
    pub fn spawn(
        physics: &mut Physics,
        descriptor: &ShapeDescriptor,
        scale: f32,
        mass: f32,
        fit: ColliderFit,
        user_data: u128,
    ) -> Self {
        let body = physics.create_dynamic_body(descriptor.spawn_position, Quat::IDENTITY);
        let shape = collider_shape(descriptor.kind, scale, fit);
        let collider = physics.add_collider(body, &shape, mass, 0);
        let visual = collider_shape(descriptor.kind, scale, ColliderFit::Geometry);
        let picker = physics.add_sensor(body, &visual, user_data);

        Self {
            id: descriptor.id,
            kind: descriptor.kind,
            color: descriptor.color,
            body,
            collider,
            picker,
            activated: false,
        }
    }

    /// React to a pointer event; every kind stops propagation
    pub fn on_pointer(&mut self, event: &mut PointerEvent) {
        event.stop_propagation();
        let activated = event.kind == PointerEventKind::Down;
        if self.activated != activated {
            log::trace!(
                "Shape {} {}",
                self.id,
                if activated { "lifted" } else { "released" }
            );
        }
        self.activated = activated;
    }

    /// Replace last frame's force with this frame's
    ///
    /// While activated the body receives exactly `lift` straight up.
    pub fn apply_frame_force(&self, target: &mut impl ForceTarget, lift: f32) {
        target.clear_force(self.body);
        if self.activated {
            target.apply_force(self.body, Vec3::Y * lift);
        }
    }
}

/// Collider geometry for a kind at a uniform scale
///
/// Unit geometry matches the render meshes: a cube of side 1, spheres and
/// cylinders of radius 1 (cylinder height 1), a tetrahedron inscribed in a
/// unit sphere.
pub fn collider_shape(kind: ShapeKind, scale: f32, fit: ColliderFit) -> ColliderShape {
    match fit {
        ColliderFit::Box => ColliderShape::Cuboid {
            half_extents: Vec3::splat(0.5 * scale),
        },
        ColliderFit::Geometry => match kind {
            ShapeKind::Box => ColliderShape::Cuboid {
                half_extents: Vec3::splat(0.5 * scale),
            },
            ShapeKind::Sphere => ColliderShape::Ball { radius: scale },
            ShapeKind::Cylinder => ColliderShape::Cylinder {
                half_height: 0.5 * scale,
                radius: scale,
            },
            ShapeKind::Tetrahedron => ColliderShape::ConvexHull {
                points: Mesh::tetrahedron_points(scale).to_vec(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Ray;

    /// Records every call instead of touching a physics world
    #[derive(Default)]
    struct RecordingTarget {
        calls: Vec<(RigidBodyHandle, Option<Vec3>)>,
    }

    impl ForceTarget for RecordingTarget {
        fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3) {
            self.calls.push((body, Some(force)));
        }

        fn clear_force(&mut self, body: RigidBodyHandle) {
            self.calls.push((body, None));
        }
    }

    fn descriptor(kind: ShapeKind) -> ShapeDescriptor {
        ShapeDescriptor {
            id: ShapeId(7),
            kind,
            color: Hsl::new(200.0, 60.0, 30.0),
            spawn_position: Vec3::new(1.0, 10.0, -1.0),
        }
    }

    fn spawn(physics: &mut Physics, kind: ShapeKind, fit: ColliderFit) -> DynamicShape {
        DynamicShape::spawn(physics, &descriptor(kind), 2.0, 1.0, fit, 42)
    }

    #[test]
    fn test_spawn_places_body_with_unit_mass() {
        let mut physics = Physics::new();
        let shape = spawn(&mut physics, ShapeKind::Sphere, ColliderFit::Box);

        assert_eq!(physics.get_position(shape.body), Some(Vec3::new(1.0, 10.0, -1.0)));
        assert!((physics.get_mass(shape.body).unwrap() - 1.0).abs() < 1e-5);
        assert_eq!(physics.collider_user_data(shape.collider), Some(0));
        assert_eq!(physics.collider_user_data(shape.picker), Some(42));
        assert!(!shape.activated);
    }

    #[test]
    fn test_picker_covers_drawn_sphere() {
        let mut physics = Physics::new();
        let shape = spawn(&mut physics, ShapeKind::Sphere, ColliderFit::Box);
        physics.update_queries();

        // Outside the side-2 box, inside the radius-2 sphere
        let ray = Ray::new(Vec3::new(2.5, 30.0, -1.0), Vec3::NEG_Y);
        let hit = physics.raycast(&ray, 100.0, |_, data| data != 0).unwrap();
        assert_eq!(hit.collider, shape.picker);

        let solid = physics.raycast(&ray, 100.0, |handle, _| handle == shape.collider);
        assert!(solid.is_none());
    }

    #[test]
    fn test_every_kind_spawns_with_geometry_fit() {
        let mut physics = Physics::new();
        for kind in ShapeKind::ALL {
            let shape = spawn(&mut physics, kind, ColliderFit::Geometry);
            assert!((physics.get_mass(shape.body).unwrap() - 1.0).abs() < 1e-4, "{kind}");
        }
        assert_eq!(physics.body_count(), 4);
    }

    #[test]
    fn test_box_fit_ignores_kind() {
        for kind in ShapeKind::ALL {
            assert_eq!(
                collider_shape(kind, 2.0, ColliderFit::Box),
                ColliderShape::Cuboid {
                    half_extents: Vec3::ONE
                }
            );
        }
        assert_eq!(
            collider_shape(ShapeKind::Sphere, 2.0, ColliderFit::Geometry),
            ColliderShape::Ball { radius: 2.0 }
        );
    }

    #[test]
    fn test_pointer_handlers_toggle_and_stop() {
        let mut physics = Physics::new();
        let mut shape = spawn(&mut physics, ShapeKind::Box, ColliderFit::Box);

        let mut down = PointerEvent::new(PointerEventKind::Down, None);
        shape.on_pointer(&mut down);
        assert!(shape.activated);
        assert!(down.propagation_stopped());

        let mut up = PointerEvent::new(PointerEventKind::Up, None);
        shape.on_pointer(&mut up);
        assert!(!shape.activated);
        assert!(up.propagation_stopped());

        shape.on_pointer(&mut PointerEvent::new(PointerEventKind::Down, None));
        let mut leave = PointerEvent::new(PointerEventKind::Leave, None);
        shape.on_pointer(&mut leave);
        assert!(!shape.activated);
        assert!(leave.propagation_stopped());
    }

    #[test]
    fn test_inactive_shape_only_clears() {
        let mut physics = Physics::new();
        let shape = spawn(&mut physics, ShapeKind::Box, ColliderFit::Box);
        let mut target = RecordingTarget::default();

        shape.apply_frame_force(&mut target, 8.0);

        assert_eq!(target.calls, vec![(shape.body, None)]);
    }

    #[test]
    fn test_active_shape_gets_lift_once_per_frame() {
        let mut physics = Physics::new();
        let mut shape = spawn(&mut physics, ShapeKind::Box, ColliderFit::Box);
        shape.on_pointer(&mut PointerEvent::new(PointerEventKind::Down, None));
        let mut target = RecordingTarget::default();

        for _ in 0..3 {
            shape.apply_frame_force(&mut target, 8.0);
        }

        let applied: Vec<Vec3> = target.calls.iter().filter_map(|(_, f)| *f).collect();
        assert_eq!(applied, vec![Vec3::new(0.0, 8.0, 0.0); 3]);
        // Every application is preceded by a clear
        for pair in target.calls.chunks(2) {
            assert_eq!(pair[0].1, None);
            assert!(pair[1].1.is_some());
        }
    }

    #[test]
    fn test_force_does_not_accumulate_in_physics() {
        let mut physics = Physics::new();
        let mut shape = spawn(&mut physics, ShapeKind::Box, ColliderFit::Box);
        shape.on_pointer(&mut PointerEvent::new(PointerEventKind::Down, None));

        for _ in 0..5 {
            shape.apply_frame_force(&mut physics, 8.0);
        }
        assert_eq!(physics.get_applied_force(shape.body), Some(Vec3::new(0.0, 8.0, 0.0)));

        shape.on_pointer(&mut PointerEvent::new(PointerEventKind::Up, None));
        shape.apply_frame_force(&mut physics, 8.0);
        assert_eq!(physics.get_applied_force(shape.body), Some(Vec3::ZERO));
    }
}
