//! Material system for meshes

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Material properties as laid out in the shader
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color (linear RGB)
    pub color: [f32; 3],
    /// Specular strength
    pub specular: f32,
    /// Shininess factor
    pub shininess: f32,
    /// Padding for alignment
    _padding: [f32; 3],
}

impl MaterialUniform {
    /// Create a new material uniform
    pub fn new(color: Vec3, specular: f32, shininess: f32) -> Self {
        Self {
            color: color.into(),
            specular,
            shininess,
            _padding: [0.0; 3],
        }
    }
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Material::default().to_uniform()
    }
}

/// Material definition
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color (linear RGB)
    pub color: Vec3,
    /// Specular reflectivity (0.0 - 1.0)
    pub specular: f32,
    /// Shininess exponent
    pub shininess: f32,
}

impl Material {
    /// Create a new material with a color and a soft highlight
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            specular: 0.25,
            shininess: 16.0,
        }
    }

    /// Create a diffuse material (no specular)
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            specular: 0.0,
            shininess: 1.0,
        }
    }

    /// Convert to uniform data
    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform::new(self.color, self.specular, self.shininess)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::splat(0.8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_shader() {
        // vec3 + f32 + f32, rounded up to 16-byte struct alignment
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_diffuse_has_no_specular() {
        let uniform = Material::diffuse(Vec3::X).to_uniform();
        assert_eq!(uniform.color, [1.0, 0.0, 0.0]);
        assert_eq!(uniform.specular, 0.0);
    }
}
