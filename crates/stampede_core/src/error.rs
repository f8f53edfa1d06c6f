//! # Pool Error Types
//!
//! All errors that can occur in the instance pool lifecycle.
//!
//! Per-request failures (`DuplicateHandle`, `UnknownHandle`) are recorded
//! and skipped by the scheduler's drain loops; `AllocationFailure` is the
//! only error that escalates out of a frame.

use thiserror::Error;

use crate::pool::{GroupId, InstanceHandle};

/// Errors that can occur in the instance pool lifecycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Released a slot outside the live range. Indicates a double release
    /// or a corrupted owner mapping, so it is never silently ignored.
    #[error("slot {slot} is not live (live range 0..{active})")]
    InvalidSlot {
        /// The slot index that was released.
        slot: usize,
        /// Number of live slots at the time of the release.
        active: usize,
    },

    /// Spawned a handle that already resolves to a live slot.
    #[error("handle {handle:?} is already live")]
    DuplicateHandle {
        /// The handle that was spawned twice.
        handle: InstanceHandle,
    },

    /// Updated or despawned a handle that is not currently live.
    /// Often legitimately stale: the instance may have expired or been
    /// despawned earlier in the same frame.
    #[error("handle {handle:?} does not resolve to a live slot")]
    UnknownHandle {
        /// The handle that failed to resolve.
        handle: InstanceHandle,
    },

    /// Capacity growth could not be satisfied. Fatal for the group:
    /// the process is out of memory for instance storage.
    #[error("failed to grow instance storage to {requested} slots")]
    AllocationFailure {
        /// The capacity that could not be reserved.
        requested: usize,
    },

    /// A request was routed to a group id that was never registered.
    #[error("group {group:?} is not registered")]
    UnknownGroup {
        /// The unregistered group id.
        group: GroupId,
    },

    /// The group registry is full; no further groups can be registered.
    #[error("group registry is full ({limit} groups)")]
    RegistryFull {
        /// The registry limit.
        limit: usize,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
