//! # Instance Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - The owning texture group
//! - A serial number unique within that group's lifetime
//!
//! A handle deliberately does NOT embed a slot index: the slot of a live
//! instance changes whenever another instance in the same group is
//! despawned. Resolution from handle to slot goes through the group's
//! slot table.

/// Identifier for one texture group (one texture/material pair, one
/// batched draw call).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct GroupId(u16);

impl GroupId {
    /// Creates a group id from a registry index.
    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the registry index of this group.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Number of bits reserved for the per-group serial number.
const SERIAL_BITS: u32 = 48;

/// Mask covering the serial portion of a handle.
const SERIAL_MASK: u64 = (1 << SERIAL_BITS) - 1;

/// Stable identity for one sprite instance.
///
/// The id is split into two parts:
/// - Upper 16 bits: group index
/// - Lower 48 bits: serial number, never reused within a group's lifetime
///
/// A handle resolves to exactly one live slot, or to "not present" once
/// the instance has been despawned or expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    /// Creates a handle from a group and a serial number.
    ///
    /// Serial numbers wider than 48 bits are truncated; a group would
    /// need to spawn ~2.8e14 instances to wrap.
    #[inline]
    #[must_use]
    pub const fn new(group: GroupId, serial: u64) -> Self {
        Self(((group.0 as u64) << SERIAL_BITS) | (serial & SERIAL_MASK))
    }

    /// Returns the owning group.
    #[inline]
    #[must_use]
    pub const fn group(self) -> GroupId {
        GroupId((self.0 >> SERIAL_BITS) as u16)
    }

    /// Returns the serial portion of this handle.
    #[inline]
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.0 & SERIAL_MASK
    }

    /// Null/invalid handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for InstanceHandle {
    fn default() -> Self {
        Self::NULL
    }
}
