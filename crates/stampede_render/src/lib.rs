//! # Stampede Render
//!
//! The presentation seam between instance pools and a rendering backend.
//!
//! The pools produce dense attribute ranges; this crate describes what a
//! backend consumes alongside them (atlas slices, the shared quad) and
//! the [`PresentationAdapter`] trait the backend implements. The crate
//! deliberately contains no graphics API code - a backend binds buffers
//! and issues one instanced draw per group, everything else lives
//! upstream.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod atlas;
pub mod quad;

pub use adapter::{DrawSubmission, GroupFrame, PresentationAdapter, RecordingAdapter};
pub use atlas::{SpriteAtlas, SpriteSlice, TextureId};
pub use quad::QuadMesh;
