//! The falling-shapes scene
//!
//! Shapes spawn on a timer above a ground plane, fall under gravity and can
//! be lifted by holding the pointer on them.

mod catalog;
mod ground;
mod root;
mod shape;
mod spawner;

pub use catalog::{Hsl, ShapeKind, pick_random_color, pick_random_kind, srgb_to_linear};
pub use ground::GroundPlane;
pub use root::{SceneRoot, ShapePose};
pub use shape::{
    DynamicShape, PointerEvent, PointerEventKind, ShapeDescriptor, ShapeId, collider_shape,
};
pub use spawner::{RepeatingTimer, Spawner, SpawnerState};
