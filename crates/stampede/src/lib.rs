//! # Stampede
//!
//! Batched sprite instancing: thousands of moving, expiring sprites per
//! texture group, one draw call per group.
//!
//! ```text
//! ┌──────────────────┐  requests   ┌───────────────────┐  snapshots  ┌──────────────────┐
//! │  OwnerDirectory  │────────────>│ LifecycleScheduler │────────────>│ Presentation     │
//! │  (bodies, anim)  │   (queued)  │  (pools, phases)   │  (dense)    │ Adapter (1 draw  │
//! │                  │<────────────│                    │             │  per group)      │
//! └──────────────────┘   handles   └───────────────────┘             └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `animation`: sprite flipbook clips and playback state
//! - `director`: the simulation layer owning logical sprite bodies
//! - `driver`: per-frame wiring of director, scheduler and adapter
//! - `config`: TOML configuration for groups and churn parameters

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod animation;
pub mod config;
pub mod director;
pub mod driver;

// Re-export the kernel and the presentation seam
pub use stampede_core as core;
pub use stampede_render as render;

// Re-export commonly used types
pub use animation::{AnimationClip, AnimationFrame, AnimationState, LoopMode};
pub use config::{ConfigError, GroupSpec, StampedeConfig};
pub use director::{OwnerDirectory, SpriteBody};
pub use driver::FrameDriver;
