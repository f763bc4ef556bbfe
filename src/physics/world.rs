//! Physics simulation using rapier3d

use glam::{Quat, Vec3};
use rapier3d::na::{self, UnitQuaternion};
use rapier3d::prelude::*;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Collider geometry, in the body's local space
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    /// Y-aligned cylinder
    Cylinder { half_height: f32, radius: f32 },
    ConvexHull { points: Vec<Vec3> },
}

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at `distance` along the ray
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Anything that can receive per-frame forces
pub trait ForceTarget {
    /// Add a force at the body's center of mass for the next step
    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3);

    /// Drop any force left over from the previous frame
    fn clear_force(&mut self, body: RigidBodyHandle);
}

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert rapier3d UnitQuaternion to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refresh the query pipeline without stepping
    ///
    /// Bodies added since the last step are invisible to raycasts until this
    /// (or `step`) runs.
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .position(isometry(position, rotation))
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a dynamic rigid body (affected by forces)
    pub fn create_dynamic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(isometry(position, rotation))
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Attach a collider with a fixed total mass
    ///
    /// `user_data` is stored on the collider and returned by raycasts.
    pub fn add_collider(
        &mut self,
        body: RigidBodyHandle,
        shape: &ColliderShape,
        mass: f32,
        user_data: u128,
    ) -> ColliderHandle {
        let collider = shape_builder(shape)
            .mass(mass)
            .user_data(user_data)
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Attach a massless sensor that raycasts can hit but nothing collides with
    pub fn add_sensor(
        &mut self,
        body: RigidBodyHandle,
        shape: &ColliderShape,
        user_data: u128,
    ) -> ColliderHandle {
        let collider = shape_builder(shape)
            .sensor(true)
            .density(0.0)
            .user_data(user_data)
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add an infinite ground plane whose normal is the body's local +Z
    pub fn add_half_space(&mut self, body: RigidBodyHandle) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(na::Vector3::z_axis()).build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Get the position of a rigid body
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let pos = rb.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Get the rotation of a rigid body
    pub fn get_rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| rapier_to_quat(rb.rotation()))
    }

    /// Get the linear velocity of a body
    pub fn get_linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let vel = rb.linvel();
            Vec3::new(vel.x, vel.y, vel.z)
        })
    }

    /// Force currently queued on a body for the next step
    pub fn get_applied_force(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let force = rb.user_force();
            Vec3::new(force.x, force.y, force.z)
        })
    }

    /// Total mass of a body
    pub fn get_mass(&self, body: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(body.0).map(|rb| rb.mass())
    }

    /// User data attached to a collider
    pub fn collider_user_data(&self, collider: ColliderHandle) -> Option<u128> {
        self.collider_set.get(collider.0).map(|c| c.user_data)
    }

    /// Cast a ray and return the first hit whose collider passes `accept`
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f32,
        accept: impl Fn(ColliderHandle, u128) -> bool,
    ) -> Option<RaycastHit> {
        let (origin, direction) = (ray.origin, ray.direction);
        let query_ray = rapier3d::geometry::Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let predicate =
            |handle: rapier3d::geometry::ColliderHandle, collider: &Collider| {
                accept(ColliderHandle(handle), collider.user_data)
            };
        let filter = QueryFilter::default().predicate(&predicate);

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &query_ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, distance)| RaycastHit {
                collider: ColliderHandle(handle),
                user_data: self.collider_user_data(ColliderHandle(handle)).unwrap_or(0),
                point: ray.at(distance),
                distance,
            })
    }

    /// Every hit along a ray, nearest first
    pub fn raycast_all(
        &self,
        ray: &Ray,
        max_distance: f32,
        accept: impl Fn(ColliderHandle, u128) -> bool,
    ) -> Vec<RaycastHit> {
        let mut hits: Vec<RaycastHit> = Vec::new();
        loop {
            let next = self.raycast(ray, max_distance, |handle, data| {
                accept(handle, data) && !hits.iter().any(|hit| hit.collider == handle)
            });
            match next {
                Some(hit) => hits.push(hit),
                None => break,
            }
        }
        hits
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.rigid_body_set.remove(
            body.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of rigid bodies in the world
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

impl ForceTarget for Physics {
    fn apply_force(&mut self, body: RigidBodyHandle, force: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    fn clear_force(&mut self, body: RigidBodyHandle) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.reset_forces(false);
        }
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_builder(shape: &ColliderShape) -> ColliderBuilder {
    match shape {
        ColliderShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShape::Ball { radius } => ColliderBuilder::ball(*radius),
        ColliderShape::Cylinder {
            half_height,
            radius,
        } => ColliderBuilder::cylinder(*half_height, *radius),
        ColliderShape::ConvexHull { points } => {
            let hull = if has_volume(points) {
                let points: Vec<Point<Real>> =
                    points.iter().map(|p| point![p.x, p.y, p.z]).collect();
                ColliderBuilder::convex_hull(&points)
            } else {
                None
            };
            hull.unwrap_or_else(|| {
                log::warn!(
                    "Degenerate convex hull ({} points), using bounding box",
                    points.len()
                );
                let half = bounding_half_extents(points);
                ColliderBuilder::cuboid(half.x, half.y, half.z)
            })
        }
    }
}

/// Whether the points span a solid, rather than a point, segment or plane
///
/// Hull construction panics on inputs without volume.
fn has_volume(points: &[Vec3]) -> bool {
    let Some(&origin) = points.first() else {
        return false;
    };
    let farthest = |score: &dyn Fn(Vec3) -> f32| {
        points
            .iter()
            .map(|p| (*p, score(*p)))
            .fold((origin, 0.0_f32), |best, (p, s)| if s > best.1 { (p, s) } else { best })
    };

    let (a, along) = farthest(&|p: Vec3| (p - origin).length());
    if !along.is_finite() || along <= f32::EPSILON {
        return false;
    }
    let epsilon = 1e-4 * along;

    let (b, area) = farthest(&|p: Vec3| (a - origin).cross(p - origin).length());
    if area <= epsilon * along {
        return false;
    }
    let normal = (a - origin).cross(b - origin);
    let (_, height) = farthest(&|p: Vec3| normal.dot(p - origin).abs());
    height > epsilon * area
}

fn bounding_half_extents(points: &[Vec3]) -> Vec3 {
    points
        .iter()
        .fold(Vec3::splat(0.01), |half, p| half.max(p.abs()))
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// User data of the collider
    pub user_data: u128,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_ground() -> Physics {
        let mut physics = Physics::with_gravity(Vec3::new(0.0, -2.0, 0.0));
        let ground = physics.create_static_body(
            Vec3::new(0.0, -10.0, 0.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        );
        physics.add_half_space(ground);
        physics
    }

    fn unit_box(physics: &mut Physics, position: Vec3, user_data: u128) -> RigidBodyHandle {
        let body = physics.create_dynamic_body(position, Quat::IDENTITY);
        physics.add_collider(
            body,
            &ColliderShape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
            1.0,
            user_data,
        );
        body
    }

    #[test]
    fn test_collider_mass() {
        let mut physics = Physics::new();
        let body = unit_box(&mut physics, Vec3::ZERO, 0);
        let mass = physics.get_mass(body).unwrap();
        assert!((mass - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_body_falls_and_lands_on_ground() {
        let mut physics = world_with_ground();
        let body = unit_box(&mut physics, Vec3::new(0.0, 0.0, 0.0), 0);

        physics.step(1.0 / 60.0);
        assert!(physics.get_position(body).unwrap().y < 0.0);

        for _ in 0..1200 {
            physics.step(1.0 / 60.0);
        }
        let y = physics.get_position(body).unwrap().y;
        assert!(
            (y - -9.5).abs() < 0.1,
            "box should rest on the ground, y = {y}"
        );
    }

    #[test]
    fn test_force_is_queued_and_cleared() {
        let mut physics = Physics::new();
        let body = unit_box(&mut physics, Vec3::ZERO, 0);

        physics.apply_force(body, Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(physics.get_applied_force(body), Some(Vec3::new(0.0, 8.0, 0.0)));

        physics.clear_force(body);
        assert_eq!(physics.get_applied_force(body), Some(Vec3::ZERO));
    }

    #[test]
    fn test_force_balances_gravity() {
        let mut physics = Physics::with_gravity(Vec3::new(0.0, -2.0, 0.0));
        let body = unit_box(&mut physics, Vec3::ZERO, 0);

        for _ in 0..60 {
            physics.clear_force(body);
            physics.apply_force(body, Vec3::new(0.0, 2.0, 0.0));
            physics.step(1.0 / 60.0);
        }
        let velocity = physics.get_linear_velocity(body).unwrap();
        assert!(velocity.y.abs() < 1e-3, "velocity = {velocity}");
    }

    #[test]
    fn test_raycast_all_is_ordered() {
        let mut physics = world_with_ground();
        unit_box(&mut physics, Vec3::new(0.0, 0.0, 0.0), 1);
        unit_box(&mut physics, Vec3::new(0.0, 3.0, 0.0), 2);
        physics.update_queries();

        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let hits = physics.raycast_all(&ray, 100.0, |_, data| data != 0);

        let order: Vec<u128> = hits.iter().map(|hit| hit.user_data).collect();
        assert_eq!(order, vec![2, 1]);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn test_raycast_hits_ground_plane() {
        let mut physics = world_with_ground();
        physics.update_queries();

        let hit = physics
            .raycast(&Ray::new(Vec3::ZERO, Vec3::NEG_Y), 100.0, |_, _| true)
            .unwrap();
        assert!((hit.point.y - -10.0).abs() < 1e-3);
        assert_eq!(hit.user_data, 0);
    }

    #[test]
    fn test_remove_body() {
        let mut physics = Physics::new();
        let body = unit_box(&mut physics, Vec3::ZERO, 0);
        assert_eq!(physics.body_count(), 1);

        physics.remove_body(body);
        assert_eq!(physics.body_count(), 0);
        assert!(physics.get_position(body).is_none());
    }

    #[test]
    fn test_has_volume() {
        let tetrahedron = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        assert!(has_volume(&tetrahedron));

        let flat = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
        assert!(!has_volume(&flat));
        assert!(!has_volume(&[Vec3::ZERO, Vec3::X, Vec3::X * 2.0]));
        assert!(!has_volume(&[Vec3::ONE; 4]));
        assert!(!has_volume(&[]));
    }

    #[test]
    fn test_coplanar_and_collapsed_hulls_fall_back_to_box() {
        let mut physics = Physics::new();
        let hulls = [
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)],
            vec![Vec3::ZERO; 4],
        ];
        for points in hulls {
            let body = physics.create_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
            physics.add_collider(body, &ColliderShape::ConvexHull { points }, 1.0, 0);
            assert!((physics.get_mass(body).unwrap() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sensor_is_massless_and_hit_by_rays() {
        let mut physics = Physics::new();
        let body = unit_box(&mut physics, Vec3::ZERO, 0);
        physics.add_sensor(body, &ColliderShape::Ball { radius: 2.0 }, 9);
        physics.update_queries();

        assert!((physics.get_mass(body).unwrap() - 1.0).abs() < 1e-4);

        // Outside the unit box, inside the ball
        let ray = Ray::new(Vec3::new(1.5, 10.0, 0.0), Vec3::NEG_Y);
        let hit = physics.raycast(&ray, 100.0, |_, data| data != 0).unwrap();
        assert_eq!(hit.user_data, 9);
    }

    #[test]
    fn test_degenerate_hull_falls_back_to_box() {
        let mut physics = Physics::new();
        let body = physics.create_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_collider(
            body,
            &ColliderShape::ConvexHull {
                points: vec![Vec3::ZERO, Vec3::X],
            },
            1.0,
            0,
        );
        assert!((physics.get_mass(body).unwrap() - 1.0).abs() < 1e-4);
    }
}
