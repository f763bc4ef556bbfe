//! Scene root: owns the live shape list and everything that acts on it

use std::time::Duration;

use glam::{Quat, Vec3};
use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::SceneConfig;
use crate::physics::{Physics, Ray};

use super::catalog::{pick_random_color, pick_random_kind, Hsl, ShapeKind};
use super::ground::GroundPlane;
use super::shape::{DynamicShape, PointerEvent, PointerEventKind, ShapeDescriptor, ShapeId};
use super::spawner::{Spawner, SpawnerState};

/// How far along a pointer ray shapes are picked
const PICK_DISTANCE: f32 = 1000.0;

/// Where a realized shape is this frame, for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePose {
    pub entity: Entity,
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub color: Hsl,
    pub position: Vec3,
    pub rotation: Quat,
    pub activated: bool,
}

/// Collider user data for a shape entity; zero is reserved for the ground
fn entity_user_data(entity: Entity) -> u128 {
    u128::from(entity.to_bits().get())
}

fn entity_from_user_data(data: u128) -> Option<Entity> {
    u64::try_from(data).ok().and_then(Entity::from_bits)
}

/// The falling-shapes scene
///
/// Every descriptor in `shapes` has exactly one entity in `world` carrying
/// a [`DynamicShape`] whose body lives in `physics`.
pub struct SceneRoot {
    config: SceneConfig,
    rng: ChaCha8Rng,
    physics: Physics,
    ground: GroundPlane,
    world: World,
    shapes: Vec<ShapeDescriptor>,
    spawner: Spawner,
    next_id: u64,
    /// Shapes under the pointer, nearest first
    hovered: Vec<Entity>,
    visibility_attached: bool,
    torn_down: bool,
}

impl SceneRoot {
    pub fn new(config: SceneConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut physics = Physics::with_gravity(config.gravity);
        let ground = GroundPlane::new(
            &mut physics,
            Vec3::new(0.0, config.ground_height, 0.0),
            config.ground_extent,
        );
        let spawner = Spawner::new(config.spawn_interval());

        log::info!(
            "Scene ready: one shape every {:?}, gravity {}",
            config.spawn_interval(),
            config.gravity
        );

        Self {
            config,
            rng,
            physics,
            ground,
            world: World::new(),
            shapes: Vec::new(),
            spawner,
            next_id: 0,
            hovered: Vec::new(),
            visibility_attached: true,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Live descriptors in spawn order
    pub fn shapes(&self) -> &[ShapeDescriptor] {
        &self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn spawner_state(&self) -> &SpawnerState {
        self.spawner.state()
    }

    pub fn ground(&self) -> &GroundPlane {
        &self.ground
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Pause spawning while hidden, resume with a fresh timer when visible
    ///
    /// Ignored after [`SceneRoot::teardown`].
    pub fn on_visibility_changed(&mut self, hidden: bool) {
        if !self.visibility_attached {
            return;
        }
        if hidden {
            self.spawner.stop();
        } else {
            self.spawner.start();
        }
    }

    /// Advance one frame
    pub fn update(&mut self, dt: Duration) {
        let due = self.spawner.tick(dt);
        for _ in 0..due {
            self.spawn_shape();
        }

        let lift = self.config.lift_force;
        for (_, shape) in self.world.query_mut::<&DynamicShape>() {
            shape.apply_frame_force(&mut self.physics, lift);
        }

        self.physics
            .step(dt.as_secs_f32().min(self.config.max_physics_step));
    }

    /// Press at `ray`; returns the shape that took the event
    pub fn pointer_down(&mut self, ray: &Ray) -> Option<ShapeId> {
        self.dispatch(PointerEventKind::Down, ray)
    }

    /// Release at `ray`; returns the shape that took the event
    pub fn pointer_up(&mut self, ray: &Ray) -> Option<ShapeId> {
        self.dispatch(PointerEventKind::Up, ray)
    }

    /// Pointer moved; shapes no longer under it get `Leave`
    pub fn pointer_move(&mut self, ray: &Ray) {
        let hits = self.hits_along(ray);
        self.refresh_hover(hits.iter().map(|&(entity, _)| entity).collect());
    }

    /// Pointer left the window
    pub fn pointer_left(&mut self) {
        self.refresh_hover(Vec::new());
    }

    /// Stop spawning, stop listening for visibility, drop every shape
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.spawner.stop();
        self.visibility_attached = false;

        let bodies: Vec<_> = self
            .world
            .query_mut::<&DynamicShape>()
            .into_iter()
            .map(|(_, shape)| shape.body)
            .collect();
        for body in bodies {
            self.physics.remove_body(body);
        }
        self.world.clear();
        self.hovered.clear();

        log::info!("Scene torn down, removed {} shapes", self.shapes.len());
        self.shapes.clear();
    }

    /// Current pose of every realized shape, in spawn order
    pub fn poses(&self) -> Vec<ShapePose> {
        let mut poses: Vec<ShapePose> = self
            .world
            .query::<&DynamicShape>()
            .iter()
            .map(|(entity, shape)| ShapePose {
                entity,
                id: shape.id,
                kind: shape.kind,
                color: shape.color,
                position: self.physics.get_position(shape.body).unwrap_or_default(),
                rotation: self.physics.get_rotation(shape.body).unwrap_or_default(),
                activated: shape.activated,
            })
            .collect();
        poses.sort_by_key(|pose| pose.id);
        poses
    }

    /// Pose of one shape
    pub fn pose(&self, id: ShapeId) -> Option<ShapePose> {
        self.poses().into_iter().find(|pose| pose.id == id)
    }

    fn spawn_shape(&mut self) {
        let id = ShapeId(self.next_id);
        self.next_id += 1;

        let half = self.config.spawn_half_extent;
        let (x, z) = if half > 0.0 {
            (
                self.rng.gen_range(-half..half),
                self.rng.gen_range(-half..half),
            )
        } else {
            (0.0, 0.0)
        };

        let descriptor = ShapeDescriptor {
            id,
            kind: pick_random_kind(&mut self.rng),
            color: pick_random_color(&mut self.rng),
            spawn_position: Vec3::new(x, self.config.spawn_height, z),
        };
        self.realize(descriptor);
    }

    /// Create the body and entity for a descriptor and append it
    fn realize(&mut self, descriptor: ShapeDescriptor) -> Entity {
        let entity = self.world.reserve_entity();
        let shape = DynamicShape::spawn(
            &mut self.physics,
            &descriptor,
            self.config.shape_scale,
            self.config.shape_mass,
            self.config.collider_fit,
            entity_user_data(entity),
        );
        self.world.spawn_at(entity, (shape,));

        log::debug!(
            "Spawned {} {} at {} in {}",
            descriptor.kind,
            descriptor.id,
            descriptor.spawn_position,
            descriptor.color
        );
        self.shapes.push(descriptor);
        entity
    }

    /// Shape entities along a ray, nearest first, with entry points
    fn hits_along(&mut self, ray: &Ray) -> Vec<(Entity, Vec3)> {
        self.physics.update_queries();
        self.physics
            .raycast_all(ray, PICK_DISTANCE, |_, data| data != 0)
            .into_iter()
            .filter_map(|hit| entity_from_user_data(hit.user_data).map(|e| (e, hit.point)))
            .collect()
    }

    /// Deliver Down/Up nearest-first until a handler stops propagation
    fn dispatch(&mut self, kind: PointerEventKind, ray: &Ray) -> Option<ShapeId> {
        let hits = self.hits_along(ray);
        self.refresh_hover(hits.iter().map(|&(entity, _)| entity).collect());

        let mut event = PointerEvent::new(kind, None);
        for (entity, point) in hits {
            let Ok(mut shape) = self.world.get::<&mut DynamicShape>(entity) else {
                continue;
            };
            event.point = Some(point);
            shape.on_pointer(&mut event);
            if event.propagation_stopped() {
                return Some(shape.id);
            }
        }
        None
    }

    fn refresh_hover(&mut self, hovered: Vec<Entity>) {
        for entity in std::mem::replace(&mut self.hovered, hovered) {
            if self.hovered.contains(&entity) {
                continue;
            }
            if let Ok(mut shape) = self.world.get::<&mut DynamicShape>(entity) {
                shape.on_pointer(&mut PointerEvent::new(PointerEventKind::Leave, None));
            }
        }
    }
}
