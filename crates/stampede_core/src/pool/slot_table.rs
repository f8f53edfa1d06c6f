//! # Slot Table
//!
//! Dense slot lifecycle for one texture group.
//!
//! The table maintains the central invariant of the whole pipeline: live
//! slots always form the contiguous range `[0, active)`. Removal from the
//! middle swaps the last live slot down into the hole, so removal is O(1)
//! at the cost of slot order stability - callers must never assume a slot
//! index persists across removals.
//!
//! Both directions of the handle mapping live here:
//! - `owner_at_slot[i]` - which handle currently occupies slot `i`
//! - `slot_of[handle]` - which slot a handle currently occupies
//!
//! After every operation, `slot_of[owner_at_slot[i]] == i` for every live
//! slot `i`.

use std::collections::HashMap;

use crate::error::{PoolError, PoolResult};
use crate::pool::handle::InstanceHandle;

/// Outcome of releasing a slot.
///
/// When the released slot was not the last live one, the previous last
/// slot's occupant has been moved down into it; the pool must mirror the
/// same move in every attribute array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleasedSlot {
    /// The handle that was removed.
    pub removed: InstanceHandle,
    /// The handle that was moved into the freed slot, if any.
    pub moved: Option<InstanceHandle>,
}

/// Dense slot allocation for one group.
pub struct SlotTable {
    /// Handle occupying each live slot. `len() == active`.
    owner_at_slot: Vec<InstanceHandle>,
    /// Forward mapping from handle to its current slot.
    slot_of: HashMap<InstanceHandle, usize>,
    /// Reserved slot capacity. Grows by doubling, never shrinks.
    capacity: usize,
}

impl SlotTable {
    /// Creates a table with `initial_capacity` slots reserved.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            owner_at_slot: Vec::with_capacity(initial_capacity),
            slot_of: HashMap::with_capacity(initial_capacity),
            capacity: initial_capacity,
        }
    }

    /// Returns the number of live slots.
    #[inline]
    #[must_use]
    pub fn active(&self) -> usize {
        self.owner_at_slot.len()
    }

    /// Returns the reserved slot capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks if no slots are live.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner_at_slot.is_empty()
    }

    /// Checks if the next allocation will have to grow.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.active() == self.capacity
    }

    /// The capacity the table will grow to when full: double, minimum 1.
    #[inline]
    #[must_use]
    pub const fn grown_capacity(&self) -> usize {
        if self.capacity == 0 {
            1
        } else {
            self.capacity * 2
        }
    }

    /// Resolves a handle to its current slot.
    #[inline]
    #[must_use]
    pub fn resolve(&self, handle: InstanceHandle) -> Option<usize> {
        self.slot_of.get(&handle).copied()
    }

    /// Checks whether a handle is currently live.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.slot_of.contains_key(&handle)
    }

    /// Returns the handle occupying a live slot.
    #[inline]
    #[must_use]
    pub fn owner_at(&self, slot: usize) -> Option<InstanceHandle> {
        self.owner_at_slot.get(slot).copied()
    }

    /// Allocates the next slot for `handle` and records both mappings.
    ///
    /// Grows capacity (doubling, minimum 1) when full. The returned slot
    /// is always the previous `active` count, keeping the live range
    /// contiguous.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if the grown capacity cannot be reserved.
    pub fn allocate(&mut self, handle: InstanceHandle) -> PoolResult<usize> {
        debug_assert!(
            !self.slot_of.contains_key(&handle),
            "allocate called for a live handle; callers check first"
        );

        if self.is_full() {
            let new_capacity = self.grown_capacity();
            self.grow(new_capacity)?;
        }

        let slot = self.owner_at_slot.len();
        self.owner_at_slot.push(handle);
        self.slot_of.insert(handle, slot);
        Ok(slot)
    }

    /// Releases a live slot, keeping the live range dense.
    ///
    /// If the slot is not the last live one, the last slot's occupant is
    /// moved down into it and that handle's forward mapping is re-pointed.
    /// Releasing the last slot touches no other slot.
    ///
    /// # Errors
    ///
    /// `InvalidSlot` if `slot` is outside the live range - a double
    /// release would corrupt the owner map, so it is never a no-op.
    pub fn release(&mut self, slot: usize) -> PoolResult<ReleasedSlot> {
        let active = self.owner_at_slot.len();
        if slot >= active {
            return Err(PoolError::InvalidSlot { slot, active });
        }

        let removed = self.owner_at_slot.swap_remove(slot);
        self.slot_of.remove(&removed);

        let moved = self.owner_at_slot.get(slot).copied();
        if let Some(moved_handle) = moved {
            self.slot_of.insert(moved_handle, slot);
        }

        Ok(ReleasedSlot { removed, moved })
    }

    /// Reserves capacity for `new_capacity` slots.
    ///
    /// Existing live slots are untouched; `[active, new_capacity)` is
    /// reserved but not live.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if the reservation cannot be satisfied.
    pub fn grow(&mut self, new_capacity: usize) -> PoolResult<()> {
        if new_capacity <= self.capacity {
            return Ok(());
        }
        let additional = new_capacity - self.owner_at_slot.len();
        self.owner_at_slot
            .try_reserve_exact(additional)
            .map_err(|_| PoolError::AllocationFailure {
                requested: new_capacity,
            })?;
        self.slot_of
            .try_reserve(new_capacity - self.slot_of.len())
            .map_err(|_| PoolError::AllocationFailure {
                requested: new_capacity,
            })?;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Iterates over `(slot, handle)` for every live slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, InstanceHandle)> + '_ {
        self.owner_at_slot.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::handle::GroupId;

    fn handle(serial: u64) -> InstanceHandle {
        InstanceHandle::new(GroupId::new(0), serial)
    }

    #[test]
    fn test_allocate_is_dense() {
        let mut table = SlotTable::new(4);
        for serial in 0..4 {
            let slot = table.allocate(handle(serial)).unwrap();
            assert_eq!(slot, serial as usize);
        }
        assert_eq!(table.active(), 4);
        assert_eq!(table.capacity(), 4);
    }

    #[test]
    fn test_allocate_grows_by_doubling() {
        let mut table = SlotTable::new(4);
        for serial in 0..5 {
            table.allocate(handle(serial)).unwrap();
        }
        assert_eq!(table.active(), 5);
        assert_eq!(table.capacity(), 8);
        // The first four handles kept their mappings across the growth.
        for serial in 0..4 {
            assert_eq!(table.resolve(handle(serial)), Some(serial as usize));
        }
    }

    #[test]
    fn test_zero_capacity_grows_to_one() {
        let mut table = SlotTable::new(0);
        let slot = table.allocate(handle(0)).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(table.capacity(), 1);
    }

    #[test]
    fn test_release_last_touches_nothing_else() {
        let mut table = SlotTable::new(4);
        for serial in 0..3 {
            table.allocate(handle(serial)).unwrap();
        }
        let released = table.release(2).unwrap();
        assert_eq!(released.removed, handle(2));
        assert_eq!(released.moved, None);
        assert_eq!(table.resolve(handle(0)), Some(0));
        assert_eq!(table.resolve(handle(1)), Some(1));
        assert_eq!(table.active(), 2);
    }

    #[test]
    fn test_release_middle_moves_last_down() {
        // Spawn A, B, C into slots 0, 1, 2; despawn B: C moves to slot 1.
        let mut table = SlotTable::new(4);
        let (a, b, c) = (handle(0), handle(1), handle(2));
        table.allocate(a).unwrap();
        table.allocate(b).unwrap();
        table.allocate(c).unwrap();

        let released = table.release(1).unwrap();
        assert_eq!(released.removed, b);
        assert_eq!(released.moved, Some(c));
        assert_eq!(table.active(), 2);
        assert_eq!(table.resolve(a), Some(0));
        assert_eq!(table.resolve(c), Some(1));
        assert_eq!(table.resolve(b), None);

        // Despawn A: C, the sole survivor, lands in slot 0.
        let released = table.release(0).unwrap();
        assert_eq!(released.moved, Some(c));
        assert_eq!(table.resolve(c), Some(0));
        assert_eq!(table.active(), 1);
    }

    #[test]
    fn test_double_release_is_an_error() {
        let mut table = SlotTable::new(2);
        table.allocate(handle(0)).unwrap();
        table.release(0).unwrap();
        assert_eq!(
            table.release(0),
            Err(PoolError::InvalidSlot { slot: 0, active: 0 })
        );
    }

    #[test]
    fn test_owner_map_is_consistent_under_churn() {
        let mut table = SlotTable::new(2);
        for serial in 0..64 {
            table.allocate(handle(serial)).unwrap();
        }
        // Release every third slot, always from the front.
        for _ in 0..20 {
            table.release(0).unwrap();
        }
        assert_eq!(table.active(), 44);
        for (slot, owner) in table.iter() {
            assert_eq!(table.resolve(owner), Some(slot));
        }
    }
}
