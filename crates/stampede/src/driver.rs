//! # Frame Driver
//!
//! Per-frame wiring: integrate the owner directory, run the scheduler's
//! mutation phases, then hand every non-empty group's snapshot to the
//! presentation adapter. Groups with zero live instances are skipped -
//! there is nothing to draw and no buffer worth touching.

use tracing::warn;

use stampede_core::{
    FrameReport, GroupConfig, GroupId, LifecycleScheduler, PoolResult, ReportAccumulator,
    RequestPort, SchedulerConfig,
};
use stampede_render::{GroupFrame, PresentationAdapter, SpriteAtlas};

use crate::director::OwnerDirectory;

/// Owns the scheduler, the directory and the per-group atlases, and
/// drives them through one frame at a time.
pub struct FrameDriver {
    /// Pool scheduler.
    scheduler: LifecycleScheduler,
    /// Simulation layer.
    directory: OwnerDirectory,
    /// Atlas per group, indexed by `GroupId`.
    atlases: Vec<SpriteAtlas>,
    /// Report accumulation across frames.
    accumulator: ReportAccumulator,
}

impl FrameDriver {
    /// Creates a driver with no groups registered.
    #[must_use]
    pub fn new(config: SchedulerConfig, sim_seed: u64) -> Self {
        let scheduler = LifecycleScheduler::new(config);
        let directory = OwnerDirectory::new(scheduler.port(), sim_seed);
        Self {
            scheduler,
            directory,
            atlases: Vec::new(),
            accumulator: ReportAccumulator::new(),
        }
    }

    /// Registers a texture group: its atlas and its pool configuration.
    ///
    /// # Errors
    ///
    /// `RegistryFull` if the scheduler cannot take another group.
    pub fn register_group(&mut self, atlas: SpriteAtlas, config: GroupConfig) -> PoolResult<GroupId> {
        let group = self.scheduler.register_group(config)?;
        debug_assert_eq!(group.index(), self.atlases.len());
        self.atlases.push(atlas);
        Ok(group)
    }

    /// Returns a request port for external producers.
    #[must_use]
    pub fn port(&self) -> RequestPort {
        self.scheduler.port()
    }

    /// The scheduler, for read-only pool inspection.
    #[must_use]
    pub fn scheduler(&self) -> &LifecycleScheduler {
        &self.scheduler
    }

    /// The owner directory.
    #[must_use]
    pub fn directory(&self) -> &OwnerDirectory {
        &self.directory
    }

    /// Mutable access to the owner directory for spawn/despawn bursts.
    pub fn directory_mut(&mut self) -> &mut OwnerDirectory {
        &mut self.directory
    }

    /// The report accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &ReportAccumulator {
        &self.accumulator
    }

    /// Spawns a burst of bodies into a group, sized to its atlas.
    pub fn spawn_burst(&mut self, group: GroupId, count: usize, clip: Option<usize>) {
        let Some(atlas) = self.atlases.get(group.index()) else {
            warn!(group = group.index(), "spawn burst for unregistered group");
            return;
        };
        #[allow(clippy::cast_possible_truncation)]
        let sprite_choices = atlas.slice_count() as u32;
        self.directory.spawn_burst(group, count, sprite_choices, clip);
    }

    /// Runs one frame: integrate, mutate, present.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if a pool cannot grow; the frame is abandoned
    /// at that point and no snapshots are presented.
    pub fn run_frame(
        &mut self,
        dt: f32,
        adapter: &mut impl PresentationAdapter,
    ) -> PoolResult<FrameReport> {
        // Owner side first: refreshed attributes land in this frame's
        // update phase.
        self.directory.integrate(dt);

        let report = self.scheduler.advance_frame(dt)?;

        for snapshot in self.scheduler.snapshots() {
            if snapshot.active == 0 {
                continue;
            }
            let atlas = &self.atlases[snapshot.group.index()];
            adapter.present(&GroupFrame {
                texture: atlas.texture,
                atlas,
                snapshot,
            });
        }
        adapter.frame_end(&report);

        // Expired instances are gone from the pools now; drop their
        // bodies so the directory stops updating them.
        let scheduler = &self.scheduler;
        self.directory.retire_dead(|handle| {
            scheduler
                .pool(handle.group())
                .is_some_and(|pool| pool.resolve(handle).is_some())
        });

        self.accumulator.record(&report);
        Ok(report)
    }
}
