//! Falling shapes in a lit 3D scene
//!
//! - Shapes spawn periodically while the window is visible
//! - rapier3d simulates them falling onto an infinite ground plane
//! - Holding the pointer on a shape lifts it
//! - wgpu draws everything, winit drives the loop

pub mod core;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod scene;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{AppConfig, Engine, EngineConfig, EngineContext, Game, SceneConfig};
    pub use crate::input::Input;
    pub use crate::physics::{ColliderHandle, Physics, Ray, RigidBodyHandle};
    pub use crate::renderer::{Camera, GpuModel, Light, Material, Mesh, RenderFrame, Renderer};
    pub use crate::scene::{SceneRoot, ShapeKind, ShapePose};
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::{event::MouseButton, keyboard::KeyCode};
}
