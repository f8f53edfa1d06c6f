//! # Sprite Atlases
//!
//! One atlas per texture group: a texture reference plus the UV
//! rectangle and pivot of every sprite slice. Supplied once by the
//! asset-loading layer at group registration and immutable afterwards -
//! instances select a slice by index at spawn/update time.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use stampede_core::Vec2;

/// Opaque reference to a texture owned by the rendering backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TextureId(pub u32);

/// One sprite slice of an atlas: where it sits in the texture and where
/// its pivot is in local units.
///
/// Uploaded as-is to the sprite shader's slice buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct SpriteSlice {
    /// UV rectangle as (u, v, width, height) in normalized coordinates.
    pub uv: [f32; 4],
    /// Pivot point in local sprite units.
    pub pivot: [f32; 2],
}

impl SpriteSlice {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a slice from a UV rectangle and pivot.
    #[must_use]
    pub const fn new(uv: [f32; 4], pivot: Vec2) -> Self {
        Self {
            uv,
            pivot: [pivot.x, pivot.y],
        }
    }

    /// A slice covering the whole texture, centered pivot.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            uv: [0.0, 0.0, 1.0, 1.0],
            pivot: [0.5, 0.5],
        }
    }
}

/// The immutable atlas description of one texture group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteAtlas {
    /// Backend texture this atlas samples.
    pub texture: TextureId,
    /// Slice table, indexed by an instance's sprite index.
    pub slices: Vec<SpriteSlice>,
}

impl SpriteAtlas {
    /// Creates an atlas from explicit slices.
    ///
    /// # Panics
    ///
    /// Panics if `slices` is empty - a group must have at least one
    /// sprite to render.
    #[must_use]
    pub fn new(texture: TextureId, slices: Vec<SpriteSlice>) -> Self {
        assert!(!slices.is_empty(), "atlas needs at least one slice");
        Self { texture, slices }
    }

    /// Slices a uniform `cols` x `rows` sheet, row-major from the top
    /// left, pivots centered.
    ///
    /// # Panics
    ///
    /// Panics if `cols` or `rows` is zero.
    #[must_use]
    pub fn grid(texture: TextureId, cols: u32, rows: u32) -> Self {
        assert!(cols > 0 && rows > 0, "grid atlas needs at least one cell");
        let width = 1.0 / cols as f32;
        let height = 1.0 / rows as f32;
        let mut slices = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                slices.push(SpriteSlice {
                    uv: [col as f32 * width, row as f32 * height, width, height],
                    pivot: [0.5, 0.5],
                });
            }
        }
        Self { texture, slices }
    }

    /// Number of slices in this atlas.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Returns a slice by sprite index.
    #[must_use]
    pub fn slice(&self, sprite_index: u32) -> Option<&SpriteSlice> {
        self.slices.get(sprite_index as usize)
    }

    /// Slice table as raw bytes, ready for buffer upload.
    #[must_use]
    pub fn slice_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.slices)
    }
}
