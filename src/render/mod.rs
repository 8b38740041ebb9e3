//! Render module for the panorama sphere
//!
//! Vertex format and sphere mesh generation; pipeline management lives in
//! [`pipeline`].

mod pipeline;

pub use pipeline::{PanoramaPipeline, SceneUniforms};

use std::f32::consts::{PI, TAU};

/// Vertex format for the panorama sphere
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Generated sphere mesh data
pub struct SphereMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Generate a UV sphere viewed from the inside.
    ///
    /// Rings run pole to pole, segments around the equator. The X axis is
    /// mirrored so the equirectangular image reads correctly from the
    /// center rather than appearing written backwards.
    pub fn new(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.clamp(8, 128);
        let rings = rings.clamp(4, 64);

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

        for v in 0..=rings {
            // phi from 0 at the top pole to PI at the bottom
            let phi = (v as f32 / rings as f32) * PI;
            let y = phi.cos() * radius;
            let ring_radius = phi.sin() * radius;

            for h in 0..=segments {
                let theta = (h as f32 / segments as f32) * TAU;
                let x = -theta.cos() * ring_radius;
                let z = theta.sin() * ring_radius;

                // Equirectangular UVs: u wraps with longitude, v runs from
                // the top image row at the top pole
                let u = h as f32 / segments as f32;
                let v_coord = v as f32 / rings as f32;

                vertices.push(Vertex {
                    position: [x, y, z],
                    uv: [u, v_coord],
                });
            }
        }

        for v in 0..rings {
            for h in 0..segments {
                let top_left = v * (segments + 1) + h;
                let top_right = top_left + 1;
                let bottom_left = top_left + segments + 1;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[top_left, top_right, bottom_left]);
                indices.extend_from_slice(&[bottom_left, top_right, bottom_right]);
            }
        }

        Self { vertices, indices }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get index count
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_mesh_counts() {
        let mesh = SphereMesh::new(500.0, 60, 40);
        assert_eq!(mesh.vertex_count(), 61 * 41);
        assert_eq!(mesh.index_count(), 60 * 40 * 6);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = SphereMesh::new(500.0, 16, 8);
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 500.0).abs() < 1e-2, "vertex off sphere: {}", len);
        }
    }

    #[test]
    fn test_sphere_uv_range() {
        let mesh = SphereMesh::new(500.0, 16, 8);
        for vertex in &mesh.vertices {
            let [u, v] = vertex.uv;
            assert!((0.0..=1.0).contains(&u));
            assert!((0.0..=1.0).contains(&v));
        }
        // Seam vertices reach both ends of the texture
        assert!(mesh.vertices.iter().any(|v| v.uv[0] == 0.0));
        assert!(mesh.vertices.iter().any(|v| v.uv[0] == 1.0));
    }

    #[test]
    fn test_sphere_indices_in_bounds() {
        let mesh = SphereMesh::new(500.0, 12, 6);
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn test_tessellation_clamped() {
        let mesh = SphereMesh::new(500.0, 0, 0);
        assert_eq!(mesh.vertex_count(), 9 * 5);
    }
}
