//! The shared sprite quad.
//!
//! Every instance in every group stretches the same unit quad; the
//! per-instance transform and the atlas slice do the rest. A backend
//! uploads this mesh once at startup.

use bytemuck::{Pod, Zeroable};

/// One quad vertex: position and texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Position in the quad's local space.
    pub position: [f32; 3],
    /// Texture coordinate before atlas remapping.
    pub uv: [f32; 2],
}

/// A unit quad centered on the origin, two counter-clockwise triangles.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadMesh {
    /// The four corner vertices.
    pub vertices: [QuadVertex; 4],
    /// Six indices, two triangles.
    pub indices: [u16; 6],
}

impl QuadMesh {
    /// Creates the shared unit quad: corners at (±0.5, ±0.5, 0).
    #[must_use]
    pub const fn unit() -> Self {
        Self {
            vertices: [
                QuadVertex {
                    position: [-0.5, -0.5, 0.0],
                    uv: [0.0, 0.0],
                },
                QuadVertex {
                    position: [0.5, -0.5, 0.0],
                    uv: [1.0, 0.0],
                },
                QuadVertex {
                    position: [-0.5, 0.5, 0.0],
                    uv: [0.0, 1.0],
                },
                QuadVertex {
                    position: [0.5, 0.5, 0.0],
                    uv: [1.0, 1.0],
                },
            ],
            indices: [0, 2, 1, 2, 3, 1],
        }
    }

    /// Vertex data as raw bytes for buffer upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for buffer upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Default for QuadMesh {
    fn default() -> Self {
        Self::unit()
    }
}
