//! # Instance Pool
//!
//! One texture group's instances: a slot table plus parallel attribute
//! arrays (transform, shader data, remaining lifetime). All handle-based
//! operations live here; the arrays themselves are only ever exposed as
//! read-only slices over the live range.

use tracing::debug;

use crate::config::GroupConfig;
use crate::error::{PoolError, PoolResult};
use crate::pool::attribute::{InstanceAttributes, InstanceShaderData, InstanceTransform};
use crate::pool::handle::{GroupId, InstanceHandle};
use crate::pool::slot_table::SlotTable;

/// Read-only view of one group's live instances, handed to the
/// presentation adapter once per frame after all mutation phases.
#[derive(Clone, Copy, Debug)]
pub struct PoolSnapshot<'a> {
    /// The group this snapshot belongs to.
    pub group: GroupId,
    /// Number of live instances. Equals the length of both slices.
    pub active: usize,
    /// Transforms of the live range, one per slot.
    pub transforms: &'a [InstanceTransform],
    /// Shader attributes of the live range, one per slot.
    pub shader_data: &'a [InstanceShaderData],
}

impl<'a> PoolSnapshot<'a> {
    /// Live transforms as raw bytes, ready for buffer upload.
    #[must_use]
    pub fn transform_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.transforms)
    }

    /// Live shader data as raw bytes, ready for buffer upload.
    #[must_use]
    pub fn shader_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.shader_data)
    }
}

/// Dense instance storage for one texture group.
///
/// The pool's arrays are parallel: for every live slot `i`,
/// `transforms[i]`, `shader_data[i]` (and `remaining_life[i]` for mortal
/// groups) describe the instance whose handle is `owner_at(i)`.
pub struct InstancePool {
    /// The group this pool serves.
    group: GroupId,
    /// Slot lifecycle and both directions of the handle mapping.
    slots: SlotTable,
    /// World transform per live slot.
    transforms: Vec<InstanceTransform>,
    /// Shader attributes per live slot.
    shader_data: Vec<InstanceShaderData>,
    /// Remaining lifetime in seconds per live slot. Empty for immortal
    /// groups.
    remaining_life: Vec<f32>,
    /// Whether this group carries lifetimes at all.
    mortal: bool,
    /// Registration-time configuration, immutable afterwards.
    config: GroupConfig,
}

impl InstancePool {
    /// Creates a pool with the group's initial capacity reserved.
    #[must_use]
    pub fn new(group: GroupId, config: GroupConfig) -> Self {
        let capacity = config.initial_capacity;
        let mortal = config.lifetime.is_some();
        Self {
            group,
            slots: SlotTable::new(capacity),
            transforms: Vec::with_capacity(capacity),
            shader_data: Vec::with_capacity(capacity),
            remaining_life: if mortal {
                Vec::with_capacity(capacity)
            } else {
                Vec::new()
            },
            mortal,
            config,
        }
    }

    /// Returns the group id this pool serves.
    #[inline]
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Returns the registration-time configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Returns the number of live instances.
    #[inline]
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots.active()
    }

    /// Returns the reserved capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Whether instances in this group expire on their own.
    #[inline]
    #[must_use]
    pub const fn is_mortal(&self) -> bool {
        self.mortal
    }

    /// Resolves a handle to its current slot.
    #[inline]
    #[must_use]
    pub fn resolve(&self, handle: InstanceHandle) -> Option<usize> {
        self.slots.resolve(handle)
    }

    /// Returns the handle occupying a live slot.
    #[inline]
    #[must_use]
    pub fn owner_at(&self, slot: usize) -> Option<InstanceHandle> {
        self.slots.owner_at(slot)
    }

    /// Returns the attribute rows at a live slot.
    #[must_use]
    pub fn attributes_at(&self, slot: usize) -> Option<(&InstanceTransform, &InstanceShaderData)> {
        Some((self.transforms.get(slot)?, self.shader_data.get(slot)?))
    }

    /// Returns the remaining lifetime at a live slot of a mortal group.
    #[must_use]
    pub fn remaining_life_at(&self, slot: usize) -> Option<f32> {
        self.remaining_life.get(slot).copied()
    }

    /// Spawns an instance for `handle`.
    ///
    /// `lifetime` is ignored for immortal groups; a mortal group with
    /// `None` gets an instance that never expires.
    ///
    /// # Errors
    ///
    /// - `DuplicateHandle` if the handle already resolves to a live slot;
    ///   the pool is left untouched.
    /// - `AllocationFailure` if capacity growth cannot be satisfied.
    pub fn spawn(
        &mut self,
        handle: InstanceHandle,
        attrs: &InstanceAttributes,
        lifetime: Option<f32>,
    ) -> PoolResult<usize> {
        if self.slots.contains(handle) {
            return Err(PoolError::DuplicateHandle { handle });
        }

        // Grow every parallel array in lock-step before the slot table
        // commits to a new slot.
        if self.slots.is_full() {
            let new_capacity = self.slots.grown_capacity();
            self.grow(new_capacity)?;
        }

        let slot = self.slots.allocate(handle)?;
        debug_assert_eq!(slot, self.transforms.len());
        self.transforms.push(attrs.transform);
        self.shader_data.push(attrs.shader);
        if self.mortal {
            self.remaining_life.push(lifetime.unwrap_or(f32::INFINITY));
        }
        Ok(slot)
    }

    /// Despawns the instance behind `handle`, returning the slot it
    /// occupied. The last live slot is swapped into the hole, keeping
    /// every array dense.
    ///
    /// # Errors
    ///
    /// `UnknownHandle` if the handle does not resolve to a live slot.
    pub fn despawn(&mut self, handle: InstanceHandle) -> PoolResult<usize> {
        let slot = self
            .slots
            .resolve(handle)
            .ok_or(PoolError::UnknownHandle { handle })?;
        self.slots.release(slot)?;
        self.transforms.swap_remove(slot);
        self.shader_data.swap_remove(slot);
        if self.mortal {
            self.remaining_life.swap_remove(slot);
        }
        Ok(slot)
    }

    /// Overwrites the attributes of a live instance in place. Never moves
    /// or reorders slots.
    ///
    /// # Errors
    ///
    /// `UnknownHandle` if the handle does not resolve to a live slot.
    pub fn update(&mut self, handle: InstanceHandle, attrs: &InstanceAttributes) -> PoolResult<usize> {
        let slot = self
            .slots
            .resolve(handle)
            .ok_or(PoolError::UnknownHandle { handle })?;
        self.transforms[slot] = attrs.transform;
        self.shader_data[slot] = attrs.shader;
        Ok(slot)
    }

    /// Advances lifetimes by `dt` seconds and appends the handles of
    /// expired instances to `expired`.
    ///
    /// Detection only: nothing is despawned here. The scheduler feeds
    /// the collected handles into the despawn phase of the same frame.
    pub fn tick(&mut self, dt: f32, expired: &mut Vec<InstanceHandle>) {
        if !self.mortal {
            return;
        }
        for (slot, life) in self.remaining_life.iter_mut().enumerate() {
            *life -= dt;
            if *life <= 0.0 {
                if let Some(owner) = self.slots.owner_at(slot) {
                    expired.push(owner);
                }
            }
        }
    }

    /// Read-only view of the live range.
    ///
    /// Must only be taken between mutation phases; the scheduler
    /// guarantees this by ordering snapshots after all queue drains.
    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot<'_> {
        debug_assert_eq!(self.transforms.len(), self.slots.active());
        PoolSnapshot {
            group: self.group,
            active: self.slots.active(),
            transforms: &self.transforms,
            shader_data: &self.shader_data,
        }
    }

    /// Grows the slot table and every attribute array in lock-step.
    fn grow(&mut self, new_capacity: usize) -> PoolResult<()> {
        self.slots.grow(new_capacity)?;
        let alloc_err = |_| PoolError::AllocationFailure {
            requested: new_capacity,
        };
        self.transforms
            .try_reserve_exact(new_capacity - self.transforms.len())
            .map_err(alloc_err)?;
        self.shader_data
            .try_reserve_exact(new_capacity - self.shader_data.len())
            .map_err(alloc_err)?;
        if self.mortal {
            self.remaining_life
                .try_reserve_exact(new_capacity - self.remaining_life.len())
                .map_err(alloc_err)?;
        }
        debug!(
            group = self.group.index(),
            new_capacity, "grew instance storage"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LifetimeRange;
    use crate::math::{ColorRgba, Vec2};

    fn pool(capacity: usize) -> InstancePool {
        InstancePool::new(
            GroupId::new(0),
            GroupConfig {
                initial_capacity: capacity,
                lifetime: None,
            },
        )
    }

    fn mortal_pool(capacity: usize) -> InstancePool {
        InstancePool::new(
            GroupId::new(0),
            GroupConfig {
                initial_capacity: capacity,
                lifetime: Some(LifetimeRange::new(1.0, 3.0)),
            },
        )
    }

    fn handle(serial: u64) -> InstanceHandle {
        InstanceHandle::new(GroupId::new(0), serial)
    }

    fn attrs_at(x: f32) -> InstanceAttributes {
        InstanceAttributes::new(Vec2::new(x, 0.0), 0.0, Vec2::ONE, 0, ColorRgba::WHITE)
    }

    #[test]
    fn test_spawn_writes_all_arrays() {
        let mut pool = mortal_pool(4);
        let slot = pool.spawn(handle(0), &attrs_at(5.0), Some(2.0)).unwrap();
        assert_eq!(slot, 0);
        assert_eq!(pool.active(), 1);
        let (transform, shader) = pool.attributes_at(0).unwrap();
        assert_eq!(transform.translation(), Vec2::new(5.0, 0.0));
        assert_eq!(shader.sprite_index, 0);
        assert!((pool.remaining_life_at(0).unwrap() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_duplicate_spawn_leaves_pool_unchanged() {
        let mut pool = pool(4);
        pool.spawn(handle(0), &attrs_at(1.0), None).unwrap();
        let err = pool.spawn(handle(0), &attrs_at(9.0), None).unwrap_err();
        assert_eq!(err, PoolError::DuplicateHandle { handle: handle(0) });
        assert_eq!(pool.active(), 1);
        let (transform, _) = pool.attributes_at(0).unwrap();
        assert_eq!(transform.translation(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_despawn_swaps_attributes_down() {
        let mut pool = pool(4);
        let (a, b, c) = (handle(0), handle(1), handle(2));
        pool.spawn(a, &attrs_at(0.0), None).unwrap();
        pool.spawn(b, &attrs_at(1.0), None).unwrap();
        pool.spawn(c, &attrs_at(2.0), None).unwrap();

        let freed = pool.despawn(b).unwrap();
        assert_eq!(freed, 1);
        assert_eq!(pool.active(), 2);
        // C's attributes followed its handle into slot 1.
        assert_eq!(pool.resolve(c), Some(1));
        let (transform, _) = pool.attributes_at(1).unwrap();
        assert_eq!(transform.translation(), Vec2::new(2.0, 0.0));
        // A is untouched in slot 0.
        let (transform, _) = pool.attributes_at(0).unwrap();
        assert_eq!(transform.translation(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_despawned_handle_no_longer_resolves() {
        let mut pool = pool(4);
        pool.spawn(handle(0), &attrs_at(0.0), None).unwrap();
        pool.despawn(handle(0)).unwrap();
        assert_eq!(
            pool.despawn(handle(0)),
            Err(PoolError::UnknownHandle { handle: handle(0) })
        );
        assert_eq!(pool.resolve(handle(0)), None);
    }

    #[test]
    fn test_update_overwrites_in_place() {
        let mut pool = pool(4);
        pool.spawn(handle(0), &attrs_at(0.0), None).unwrap();
        pool.spawn(handle(1), &attrs_at(1.0), None).unwrap();

        pool.update(handle(0), &attrs_at(42.0)).unwrap();
        assert_eq!(pool.resolve(handle(0)), Some(0));
        let (transform, _) = pool.attributes_at(0).unwrap();
        assert_eq!(transform.translation(), Vec2::new(42.0, 0.0));

        let missing = handle(99);
        assert_eq!(
            pool.update(missing, &attrs_at(0.0)),
            Err(PoolError::UnknownHandle { handle: missing })
        );
    }

    #[test]
    fn test_growth_preserves_existing_instances() {
        let mut pool = pool(4);
        for serial in 0..5 {
            pool.spawn(handle(serial), &attrs_at(serial as f32), None)
                .unwrap();
        }
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.active(), 5);
        for serial in 0..5 {
            let slot = pool.resolve(handle(serial)).unwrap();
            let (transform, _) = pool.attributes_at(slot).unwrap();
            assert_eq!(transform.translation().x, serial as f32);
        }
    }

    #[test]
    fn test_tick_detects_but_does_not_despawn() {
        let mut pool = mortal_pool(4);
        pool.spawn(handle(0), &attrs_at(0.0), Some(0.5)).unwrap();
        pool.spawn(handle(1), &attrs_at(1.0), Some(5.0)).unwrap();

        let mut expired = Vec::new();
        pool.tick(1.0, &mut expired);
        assert_eq!(expired, vec![handle(0)]);
        // Detection only - both instances still live.
        assert_eq!(pool.active(), 2);
    }

    #[test]
    fn test_immortal_lifetime_in_mortal_pool() {
        let mut pool = mortal_pool(4);
        pool.spawn(handle(0), &attrs_at(0.0), None).unwrap();
        let mut expired = Vec::new();
        pool.tick(1.0e6, &mut expired);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_snapshot_covers_live_range() {
        let mut pool = pool(4);
        for serial in 0..3 {
            pool.spawn(handle(serial), &attrs_at(serial as f32), None)
                .unwrap();
        }
        pool.despawn(handle(1)).unwrap();

        let snap = pool.snapshot();
        assert_eq!(snap.active, 2);
        assert_eq!(snap.transforms.len(), 2);
        assert_eq!(snap.shader_data.len(), 2);
        assert_eq!(snap.transform_bytes().len(), 2 * InstanceTransform::SIZE);
        assert_eq!(snap.shader_bytes().len(), 2 * InstanceShaderData::SIZE);
    }
}
