use glam::{Vec2, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position: position.to_array(), normal: normal.to_array(), uv: uv.to_array() }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn cube(size: f32) -> Self {
        let hs = size * 0.5;
        let positions = [
            Vec3::new(-hs, -hs, -hs),
            Vec3::new(hs, -hs, -hs),
            Vec3::new(hs, hs, -hs),
            Vec3::new(-hs, hs, -hs),
            Vec3::new(-hs, -hs, hs),
            Vec3::new(hs, -hs, hs),
            Vec3::new(hs, hs, hs),
            Vec3::new(-hs, hs, hs),
        ];

        let uv_quad = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let mut vertices = Vec::with_capacity(24);
        let mut write_face = |indices: [usize; 4], normal: Vec3| {
            for (i, &index) in indices.iter().enumerate() {
                vertices.push(MeshVertex::new(positions[index], normal, uv_quad[i]));
            }
        };

        write_face([0, 3, 2, 1], Vec3::NEG_Z);
        write_face([4, 5, 6, 7], Vec3::Z);
        write_face([0, 4, 7, 3], Vec3::NEG_X);
        write_face([1, 2, 6, 5], Vec3::X);
        write_face([3, 7, 6, 2], Vec3::Y);
        write_face([0, 1, 5, 4], Vec3::NEG_Y);

        Self::new(vertices, quad_indices(6))
    }

    /// Square ground plane in XZ facing +Y.
    pub fn plane(size: f32) -> Self {
        let hs = size * 0.5;
        let vertices = vec![
            MeshVertex::new(Vec3::new(-hs, 0.0, hs), Vec3::Y, Vec2::new(0.0, 0.0)),
            MeshVertex::new(Vec3::new(hs, 0.0, hs), Vec3::Y, Vec2::new(1.0, 0.0)),
            MeshVertex::new(Vec3::new(hs, 0.0, -hs), Vec3::Y, Vec2::new(1.0, 1.0)),
            MeshVertex::new(Vec3::new(-hs, 0.0, -hs), Vec3::Y, Vec2::new(0.0, 1.0)),
        ];
        Self::new(vertices, quad_indices(1))
    }
}

fn quad_indices(quads: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads as usize * 6);
    for quad in 0..quads {
        let base = quad * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a).normalize();
            let stored = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.99, "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = Mesh::plane(10.0);
        assert_eq!(mesh.index_count(), 6);
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(mesh.vertices[mesh.indices[i] as usize].position));
        assert!((b - a).cross(c - a).normalize().abs_diff_eq(Vec3::Y, 1e-5));
    }
}
