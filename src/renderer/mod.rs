//! Rendering module
//!
//! 3D rendering with wgpu: one lit, solid-color pipeline.

mod camera;
mod context;
mod material;
mod mesh;

pub use camera::Camera;
pub use context::{GpuModel, Light, ModelUniform, RenderFrame, Renderer, RendererError};
pub use material::{Material, MaterialUniform};
pub use mesh::{Mesh, Vertex};
