//! Per-instance attribute rows uploaded to the renderer.
//!
//! Each pool keeps one dense array per attribute; rows at the same index
//! belong to the same instance. Layouts are `#[repr(C)]` plain-old-data so
//! the presentation adapter can cast whole live ranges to bytes.

use bytemuck::{Pod, Zeroable};

use crate::math::{ColorRgba, Vec2};

/// Column-major 4x4 instance transform.
///
/// Built as translate * rotate-z * scale, which is all a camera-facing
/// sprite quad needs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Matrix columns, column-major.
    pub cols: [[f32; 4]; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// The identity transform.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Builds a transform from position, z-rotation (radians) and scale.
    #[must_use]
    pub fn from_trs(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            cols: [
                [cos * scale.x, sin * scale.x, 0.0, 0.0],
                [-sin * scale.y, cos * scale.y, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [position.x, position.y, 0.0, 1.0],
            ],
        }
    }

    /// Builds a pure translation.
    #[must_use]
    pub fn from_translation(position: Vec2) -> Self {
        Self::from_trs(position, 0.0, Vec2::ONE)
    }

    /// Returns the translation column as a 2D position.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-instance data consumed by the sprite shader.
///
/// One element per live slot, uploaded as a structured buffer next to the
/// transform array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceShaderData {
    /// Tint color, multiplied over the sampled texel.
    pub color: [f32; 4],
    /// Which UV rectangle of the group's atlas this instance samples.
    pub sprite_index: u32,
    /// Explicit padding to a 16-byte row tail.
    pub _pad: [u32; 3],
}

impl InstanceShaderData {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates shader data for a sprite index with a tint.
    #[must_use]
    pub fn new(sprite_index: u32, color: ColorRgba) -> Self {
        Self {
            color: color.to_array(),
            sprite_index,
            _pad: [0; 3],
        }
    }

    /// Untinted shader data for a sprite index.
    #[must_use]
    pub fn untinted(sprite_index: u32) -> Self {
        Self::new(sprite_index, ColorRgba::WHITE)
    }
}

impl Default for InstanceShaderData {
    fn default() -> Self {
        Self::untinted(0)
    }
}

/// The attribute bundle carried by spawn and update requests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstanceAttributes {
    /// World transform of the quad.
    pub transform: InstanceTransform,
    /// Shader-visible attributes (tint, sprite index).
    pub shader: InstanceShaderData,
}

impl InstanceAttributes {
    /// Convenience constructor from the common spawn parameters.
    #[must_use]
    pub fn new(position: Vec2, rotation: f32, scale: Vec2, sprite_index: u32, color: ColorRgba) -> Self {
        Self {
            transform: InstanceTransform::from_trs(position, rotation, scale),
            shader: InstanceShaderData::new(sprite_index, color),
        }
    }
}
