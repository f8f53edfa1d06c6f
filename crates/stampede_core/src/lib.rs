//! # Stampede Core
//!
//! Instance pool lifecycle kernel for batched sprite rendering:
//! - Thousands of short-lived instances per texture group
//! - One dense, hole-free attribute range per group, every frame
//! - O(1) spawn and despawn under heavy churn
//!
//! ## Architecture Rules
//!
//! 1. **Dense arrays stay dense** - removal swaps the last live slot down
//! 2. **Handles never carry slot indices** - slots reshuffle, handles don't
//! 3. **Structural mutation only at sync points** - requests are queued
//!    during the frame and applied in a fixed phase order
//!
//! ## Example
//!
//! ```rust,ignore
//! use stampede_core::{GroupConfig, LifecycleScheduler, SchedulerConfig};
//!
//! let mut scheduler = LifecycleScheduler::new(SchedulerConfig::default());
//! let group = scheduler.register_group(GroupConfig::default())?;
//! let port = scheduler.port();
//! let handle = port.request_spawn(group, attrs);
//! let report = scheduler.advance_frame(1.0 / 60.0)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod pool;

pub use config::{GroupConfig, LifetimeRange, SchedulerConfig, DEFAULT_GROUP_CAPACITY};
pub use error::{PoolError, PoolResult};
pub use frame::{
    DespawnRequest, FrameReport, LifecycleScheduler, ReportAccumulator, RequestPort,
    SpawnRequest, UpdateRequest, MAX_GROUPS,
};
pub use math::{ColorRgba, Vec2};
pub use pool::{
    GroupId, InstanceAttributes, InstanceHandle, InstancePool, InstanceShaderData,
    InstanceTransform, PoolSnapshot, SlotTable,
};
