//! Mesh and vertex definitions
//!
//! Primitive sizes follow the usual unit conventions: a 1x1x1 cube, spheres
//! and cylinders of radius 1, a tetrahedron inscribed in the unit sphere.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex with position and normal
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Get the vertex buffer layout for wgpu
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// A 3D mesh with vertices and indices
#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// GPU vertex buffer (created when uploaded)
    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    /// GPU index buffer (created when uploaded)
    pub(crate) index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    /// Create a mesh from vertices and indices
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    /// Create a unit cube centered at origin
    pub fn cube() -> Self {
        // (normal, tangent u, tangent v) per face, u x v = normal
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * su + v * sv) * 0.5;
                vertices.push(Vertex::new(position.into(), normal.into()));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::from_data(vertices, indices)
    }

    /// Create a square plane in the XY plane facing +Z
    ///
    /// Rotating it -90° about X lays it flat facing up.
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-half, -half, 0.0], normal),
            Vertex::new([half, -half, 0.0], normal),
            Vertex::new([half, half, 0.0], normal),
            Vertex::new([-half, half, 0.0], normal),
        ];

        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::from_data(vertices, indices)
    }

    /// Create a UV sphere
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let position = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                let normal = position.normalize_or(Vec3::Y);

                vertices.push(Vertex::new(position.into(), normal.into()));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Self::from_data(vertices, indices)
    }

    /// Create a closed Y-aligned cylinder centered at origin
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let half = height / 2.0;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side wall, duplicated seam vertex so normals stay smooth
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            let normal = [cos, 0.0, sin];
            vertices.push(Vertex::new([radius * cos, -half, radius * sin], normal));
            vertices.push(Vertex::new([radius * cos, half, radius * sin], normal));
        }
        for segment in 0..segments {
            let bottom = segment * 2;
            let top = bottom + 1;
            let next_bottom = bottom + 2;
            let next_top = bottom + 3;
            indices.extend_from_slice(&[bottom, top, next_bottom]);
            indices.extend_from_slice(&[next_bottom, top, next_top]);
        }

        // Caps
        for (y, normal_y) in [(half, 1.0_f32), (-half, -1.0)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex::new([0.0, y, 0.0], [0.0, normal_y, 0.0]));
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let (sin, cos) = theta.sin_cos();
                vertices.push(Vertex::new([radius * cos, y, radius * sin], [0.0, normal_y, 0.0]));
            }
            for segment in 0..segments {
                let a = center + 1 + segment;
                let b = a + 1;
                if normal_y > 0.0 {
                    indices.extend_from_slice(&[center, b, a]);
                } else {
                    indices.extend_from_slice(&[center, a, b]);
                }
            }
        }

        Self::from_data(vertices, indices)
    }

    /// Corner points of a regular tetrahedron inscribed in a sphere of `radius`
    pub fn tetrahedron_points(radius: f32) -> [Vec3; 4] {
        let s = radius / 3.0_f32.sqrt();
        [
            Vec3::new(1.0, 1.0, 1.0) * s,
            Vec3::new(-1.0, -1.0, 1.0) * s,
            Vec3::new(-1.0, 1.0, -1.0) * s,
            Vec3::new(1.0, -1.0, -1.0) * s,
        ]
    }

    /// Create a flat-shaded regular tetrahedron
    pub fn tetrahedron(radius: f32) -> Self {
        let [a, b, c, d] = Self::tetrahedron_points(radius);
        let faces = [[a, b, c], [a, d, b], [a, c, d], [b, d, c]];

        let mut vertices = Vec::with_capacity(12);
        let mut indices = Vec::with_capacity(12);
        for [p0, p1, p2] in faces {
            let mut normal = (p1 - p0).cross(p2 - p0).normalize();
            let (p1, p2) = if normal.dot(p0) < 0.0 {
                normal = -normal;
                (p2, p1)
            } else {
                (p1, p2)
            };
            let base = vertices.len() as u32;
            for p in [p0, p1, p2] {
                vertices.push(Vertex::new(p.into(), normal.into()));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        Self::from_data(vertices, indices)
    }

    /// Get the number of indices
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle winds counter-clockwise when seen from outside
    fn assert_outward_winding(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            if face_normal.length_squared() < 1e-10 {
                continue;
            }
            let vertex_normal = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(
                face_normal.dot(vertex_normal) > 0.0,
                "triangle {tri:?} winds inward"
            );
        }
    }

    fn assert_indices_in_range(mesh: &Mesh) {
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_cube() {
        let cube = Mesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_indices_in_range(&cube);
        assert_outward_winding(&cube);
        for v in &cube.vertices {
            assert!(v.position.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6));
        }
    }

    #[test]
    fn test_plane_faces_z() {
        let plane = Mesh::plane(1000.0);
        assert_indices_in_range(&plane);
        assert_outward_winding(&plane);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(plane.vertices[2].position, [500.0, 500.0, 0.0]);
    }

    #[test]
    fn test_sphere() {
        let sphere = Mesh::sphere(1.0, 16, 8);
        assert_indices_in_range(&sphere);
        assert_outward_winding(&sphere);
        for v in &sphere.vertices {
            assert!((Vec3::from(v.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cylinder() {
        let cylinder = Mesh::cylinder(1.0, 1.0, 24);
        assert_indices_in_range(&cylinder);
        assert_outward_winding(&cylinder);
        for v in &cylinder.vertices {
            assert!(v.position[1].abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_tetrahedron() {
        let tetra = Mesh::tetrahedron(1.0);
        assert_eq!(tetra.vertices.len(), 12);
        assert_indices_in_range(&tetra);
        assert_outward_winding(&tetra);
        for p in Mesh::tetrahedron_points(1.0) {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }
}
