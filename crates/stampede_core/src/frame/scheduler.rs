//! # Lifecycle Scheduler
//!
//! Owns every group's pool and drives the per-frame phase order:
//! expire, spawn, update, despawn, present. All three request queues are
//! collected up front with no mutation, then applied at the phase
//! boundaries, so producers enqueueing mid-frame land in the next frame
//! and a snapshot never observes a half-applied mutation.
//!
//! Per-request failures are counted in the [`FrameReport`] and skipped;
//! only allocation failure aborts a frame.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, warn};

use crate::config::{GroupConfig, SchedulerConfig};
use crate::error::{PoolError, PoolResult};
use crate::frame::report::FrameReport;
use crate::frame::request::{RequestHub, RequestPort, MAX_GROUPS};
use crate::pool::{GroupId, InstanceHandle, InstancePool, PoolSnapshot};

/// Frame orchestrator for all instance pools.
pub struct LifecycleScheduler {
    /// One pool per registered group, indexed by `GroupId`.
    pools: Vec<InstancePool>,
    /// Queue endpoints shared with owner-side ports.
    hub: RequestHub,
    /// Deterministic rng for lifetime sampling.
    rng: ChaCha8Rng,
    /// Scratch list of handles that expired in the current frame.
    expired: Vec<InstanceHandle>,
    /// Monotonic frame counter.
    frame: u64,
    /// Queue drops already attributed to earlier frames.
    dropped_seen: u64,
}

impl LifecycleScheduler {
    /// Creates a scheduler with no groups registered.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            pools: Vec::new(),
            hub: RequestHub::new(config.queue_capacity),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            expired: Vec::new(),
            frame: 0,
            dropped_seen: 0,
        }
    }

    /// Registers a texture group and creates its pool.
    ///
    /// Groups are registered once at load time and live until the
    /// scheduler is dropped.
    ///
    /// # Errors
    ///
    /// `RegistryFull` if `MAX_GROUPS` groups already exist.
    pub fn register_group(&mut self, config: GroupConfig) -> PoolResult<GroupId> {
        let index = self.pools.len();
        if index >= MAX_GROUPS {
            return Err(PoolError::RegistryFull { limit: MAX_GROUPS });
        }
        #[allow(clippy::cast_possible_truncation)]
        let group = GroupId::new(index as u16);
        self.pools.push(InstancePool::new(group, config));
        debug!(group = index, capacity = config.initial_capacity, "registered group");
        Ok(group)
    }

    /// Returns a new owner-side request port.
    #[must_use]
    pub fn port(&self) -> RequestPort {
        self.hub.port()
    }

    /// Number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.pools.len()
    }

    /// Returns a group's pool, if registered.
    #[must_use]
    pub fn pool(&self, group: GroupId) -> Option<&InstancePool> {
        self.pools.get(group.index())
    }

    /// Total live instances across all groups.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.pools.iter().map(InstancePool::active).sum()
    }

    /// Current frame number.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs the mutation phases of one frame: expire, then spawn, update
    /// and despawn applied from the collected queues.
    ///
    /// After this returns the pools are stable; take [`snapshots`] and
    /// hand them to the presentation layer before the next call.
    ///
    /// [`snapshots`]: Self::snapshots
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if any pool's growth cannot be satisfied.
    /// Every other per-request failure is recorded in the report and
    /// skipped.
    pub fn advance_frame(&mut self, dt: f32) -> PoolResult<FrameReport> {
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        // Collect everything first; nothing mutates until the phases run.
        let spawns: Vec<_> = self.hub.spawn_rx.try_iter().collect();
        let updates: Vec<_> = self.hub.update_rx.try_iter().collect();
        let despawns: Vec<_> = self.hub.despawn_rx.try_iter().collect();
        let mut despawn_set: HashSet<InstanceHandle> =
            despawns.iter().map(|req| req.handle).collect();
        let mut respawned: HashSet<InstanceHandle> = HashSet::new();

        // Phase 1: expire. Detection only; the handles join the despawn
        // pass below.
        self.expired.clear();
        for pool in &mut self.pools {
            pool.tick(dt, &mut self.expired);
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            report.expired = self.expired.len() as u32;
        }

        // Phase 2: spawn-apply.
        for req in spawns {
            let Some(pool) = self.pools.get_mut(req.handle.group().index()) else {
                warn!(handle = ?req.handle, "spawn request for unregistered group");
                report.rejected_spawns += 1;
                continue;
            };
            let lifetime = pool
                .config()
                .lifetime
                .map(|range| range.sample(&mut self.rng));
            match pool.spawn(req.handle, &req.attrs, lifetime) {
                Ok(_) => report.spawned += 1,
                // The owner despawned and respawned the same id this
                // frame; honor the despawn first so the spawn lands with
                // fresh attributes.
                Err(PoolError::DuplicateHandle { .. })
                    if despawn_set.remove(&req.handle) =>
                {
                    pool.despawn(req.handle)?;
                    report.despawned += 1;
                    pool.spawn(req.handle, &req.attrs, lifetime)?;
                    report.spawned += 1;
                    respawned.insert(req.handle);
                }
                Err(PoolError::DuplicateHandle { handle }) => {
                    warn!(?handle, "duplicate spawn rejected");
                    report.rejected_spawns += 1;
                }
                Err(err @ PoolError::AllocationFailure { .. }) => {
                    error!(group = req.handle.group().index(), %err, "instance storage exhausted");
                    return Err(err);
                }
                Err(err) => {
                    warn!(%err, "spawn request skipped");
                    report.rejected_spawns += 1;
                }
            }
        }

        // Phase 3: update-apply. Stale handles are expected - the object
        // may already be gone this frame.
        for req in updates {
            let Some(pool) = self.pools.get_mut(req.handle.group().index()) else {
                report.stale_updates += 1;
                continue;
            };
            match pool.update(req.handle, &req.attrs) {
                Ok(_) => report.updated += 1,
                Err(_) => report.stale_updates += 1,
            }
        }

        // Phase 4: despawn-apply. Expirations first, then the queue;
        // already-gone handles are skipped silently (idempotent).
        let mut expired = std::mem::take(&mut self.expired);
        for handle in expired.drain(..) {
            // A respawn already replaced the instance this entry refers
            // to; the fresh instance must not inherit the stale expiry.
            if respawned.contains(&handle) {
                continue;
            }
            // An instance can expire and be explicitly despawned in the
            // same frame; whichever applies first wins.
            despawn_set.remove(&handle);
            if let Some(pool) = self.pools.get_mut(handle.group().index()) {
                if pool.despawn(handle).is_ok() {
                    report.despawned += 1;
                }
            }
        }
        self.expired = expired;

        for req in despawns {
            if !despawn_set.remove(&req.handle) {
                // Consumed by a respawn or expiry above, or a duplicate
                // request; despawn is idempotent either way.
                continue;
            }
            let Some(pool) = self.pools.get_mut(req.handle.group().index()) else {
                report.stale_despawns += 1;
                continue;
            };
            match pool.despawn(req.handle) {
                Ok(_) => report.despawned += 1,
                Err(_) => report.stale_despawns += 1,
            }
        }

        let dropped_total = self.hub.dropped_requests();
        report.dropped_requests = dropped_total - self.dropped_seen;
        self.dropped_seen = dropped_total;

        report.live_after = self.total_live();
        self.frame += 1;
        Ok(report)
    }

    /// Phase 5: read-only snapshots of every group's live range, in
    /// group order. Call after [`advance_frame`]; the views stay
    /// consistent until the next mutation phase.
    ///
    /// [`advance_frame`]: Self::advance_frame
    pub fn snapshots(&self) -> impl Iterator<Item = PoolSnapshot<'_>> {
        self.pools.iter().map(InstancePool::snapshot)
    }
}
