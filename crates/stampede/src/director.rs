//! # Owner Directory
//!
//! The simulation layer that owns logical sprite objects. Bodies carry
//! the source-of-truth motion state (position, heading, spin, scale);
//! every frame the directory integrates them, advances their animation
//! and pushes the resulting attributes through the request queues. It
//! never touches pool internals - handles and queues are the whole
//! contract.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use stampede_core::{
    ColorRgba, GroupId, InstanceAttributes, InstanceHandle, RequestPort, Vec2,
};

use crate::animation::{AnimationClip, AnimationState};

// ============================================================================
// SPAWN CONSTANTS
// ============================================================================

/// Half-extent of the square spawn area, in world units.
pub const SPAWN_EXTENT: f32 = 20.0;

/// Maximum linear speed of a spawned body (units per second).
pub const MAX_SPEED: f32 = 2.0;

/// Maximum spin of a spawned body (radians per second).
pub const MAX_OMEGA: f32 = 2.0;

/// One logical sprite object.
///
/// The directory is the source of truth for this state; the pool only
/// ever sees the baked transform and shader attributes.
#[derive(Clone, Copy, Debug)]
pub struct SpriteBody {
    /// The instance this body drives.
    pub handle: InstanceHandle,
    /// Group the instance lives in.
    pub group: GroupId,
    /// World position.
    pub position: Vec2,
    /// Facing angle in radians.
    pub heading: f32,
    /// Linear speed along the facing direction, units per second.
    pub speed: f32,
    /// Spin in radians per second.
    pub omega: f32,
    /// Sprite scale.
    pub scale: Vec2,
    /// Tint color.
    pub color: ColorRgba,
    /// Current atlas slice.
    pub sprite_index: u32,
    /// Flipbook playback, if this body is animated.
    pub animation: Option<AnimationState>,
}

impl SpriteBody {
    /// Bakes the body's current state into instance attributes.
    #[must_use]
    pub fn attributes(&self) -> InstanceAttributes {
        InstanceAttributes::new(
            self.position,
            self.heading,
            self.scale,
            self.sprite_index,
            self.color,
        )
    }
}

/// The simulation layer owning all sprite bodies.
pub struct OwnerDirectory {
    /// Request endpoint into the scheduler.
    port: RequestPort,
    /// All live bodies, unordered.
    bodies: Vec<SpriteBody>,
    /// Clip table referenced by animated bodies.
    clips: Vec<AnimationClip>,
    /// Deterministic rng for spawn placement.
    rng: ChaCha8Rng,
}

impl OwnerDirectory {
    /// Creates a directory over a request port.
    #[must_use]
    pub fn new(port: RequestPort, seed: u64) -> Self {
        Self {
            port,
            bodies: Vec::new(),
            clips: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Registers an animation clip, returning its index for spawns.
    pub fn add_clip(&mut self, clip: AnimationClip) -> usize {
        self.clips.push(clip);
        self.clips.len() - 1
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the live bodies.
    #[must_use]
    pub fn bodies(&self) -> &[SpriteBody] {
        &self.bodies
    }

    /// Spawns `count` bodies into `group`, scattered uniformly over the
    /// spawn area with random motion and a random sprite out of
    /// `sprite_choices`.
    ///
    /// Each body's instance handle is issued immediately; the instances
    /// go live at the next frame's spawn phase.
    pub fn spawn_burst(
        &mut self,
        group: GroupId,
        count: usize,
        sprite_choices: u32,
        clip: Option<usize>,
    ) {
        debug_assert!(
            clip.map_or(true, |index| index < self.clips.len()),
            "clip index out of range"
        );
        for _ in 0..count {
            let position = Vec2::new(
                self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                self.rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
            );
            let body = SpriteBody {
                handle: InstanceHandle::NULL,
                group,
                position,
                heading: self.rng.gen_range(0.0..std::f32::consts::TAU),
                speed: self.rng.gen_range(0.0..MAX_SPEED),
                omega: self.rng.gen_range(-MAX_OMEGA..MAX_OMEGA),
                scale: Vec2::ONE,
                color: ColorRgba::WHITE,
                sprite_index: self.rng.gen_range(0..sprite_choices.max(1)),
                animation: clip.map(AnimationState::new),
            };
            let handle = self.port.request_spawn(group, body.attributes());
            self.bodies.push(SpriteBody { handle, ..body });
        }
        debug!(group = group.index(), count, "spawn burst requested");
    }

    /// Despawns up to `count` random bodies.
    pub fn despawn_burst(&mut self, count: usize) {
        for _ in 0..count {
            if self.bodies.is_empty() {
                break;
            }
            let index = self.rng.gen_range(0..self.bodies.len());
            let body = self.bodies.swap_remove(index);
            self.port.request_despawn(body.handle);
        }
    }

    /// Integrates every body by `dt` seconds and queues the refreshed
    /// attributes.
    ///
    /// Updates for bodies whose instance has already expired are skipped
    /// as stale by the scheduler - harmless by design.
    pub fn integrate(&mut self, dt: f32) {
        for body in &mut self.bodies {
            body.heading += body.omega * dt;
            let direction = Vec2::new(body.heading.cos(), body.heading.sin());
            body.position = body.position + direction * (body.speed * dt);

            if let Some(state) = body.animation.as_mut() {
                if let Some(clip) = self.clips.get(state.clip) {
                    body.sprite_index = state.advance(clip, dt);
                }
            }

            self.port.request_update(body.handle, body.attributes());
        }
    }

    /// Drops bodies whose instance is no longer live.
    ///
    /// `is_live` is queried once per body; the typical caller passes a
    /// handle-resolution check against the scheduler's pools.
    pub fn retire_dead(&mut self, is_live: impl Fn(InstanceHandle) -> bool) {
        let before = self.bodies.len();
        self.bodies.retain(|body| is_live(body.handle));
        let retired = before - self.bodies.len();
        if retired > 0 {
            debug!(retired, "retired bodies for dead instances");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampede_core::{
        GroupConfig, LifecycleScheduler, SchedulerConfig,
    };

    fn setup() -> (LifecycleScheduler, GroupId, OwnerDirectory) {
        let mut scheduler = LifecycleScheduler::new(SchedulerConfig::default());
        let group = scheduler.register_group(GroupConfig::default()).unwrap();
        let directory = OwnerDirectory::new(scheduler.port(), 42);
        (scheduler, group, directory)
    }

    #[test]
    fn test_spawn_burst_goes_live_next_frame() {
        let (mut scheduler, group, mut directory) = setup();
        directory.spawn_burst(group, 10, 4, None);
        assert_eq!(directory.body_count(), 10);

        let report = scheduler.advance_frame(0.016).unwrap();
        assert_eq!(report.spawned, 10);
        assert_eq!(report.live_after, 10);
    }

    #[test]
    fn test_integrate_moves_instances() {
        let (mut scheduler, group, mut directory) = setup();
        directory.spawn_burst(group, 1, 1, None);
        scheduler.advance_frame(0.016).unwrap();

        let handle = directory.bodies()[0].handle;
        let before = directory.bodies()[0].position;

        directory.integrate(1.0);
        let report = scheduler.advance_frame(0.016).unwrap();
        assert_eq!(report.updated, 1);

        let pool = scheduler.pool(group).unwrap();
        let slot = pool.resolve(handle).unwrap();
        let rendered = pool.attributes_at(slot).unwrap().0.translation();
        // The pool shows the integrated position, not the spawn position.
        assert_eq!(rendered, directory.bodies()[0].position);
        assert_ne!(rendered, before);
    }

    #[test]
    fn test_despawn_burst_removes_instances() {
        let (mut scheduler, group, mut directory) = setup();
        directory.spawn_burst(group, 8, 1, None);
        scheduler.advance_frame(0.016).unwrap();

        directory.despawn_burst(3);
        assert_eq!(directory.body_count(), 5);
        let report = scheduler.advance_frame(0.016).unwrap();
        assert_eq!(report.despawned, 3);
        assert_eq!(report.live_after, 5);
    }

    #[test]
    fn test_retire_dead_drops_stale_bodies() {
        let (mut scheduler, group, mut directory) = setup();
        directory.spawn_burst(group, 4, 1, None);
        scheduler.advance_frame(0.016).unwrap();

        // Kill one instance behind the directory's back.
        let victim = directory.bodies()[0].handle;
        let port = scheduler.port();
        port.request_despawn(victim);
        scheduler.advance_frame(0.016).unwrap();

        directory.retire_dead(|handle| {
            scheduler
                .pool(handle.group())
                .is_some_and(|pool| pool.resolve(handle).is_some())
        });
        assert_eq!(directory.body_count(), 3);
        assert!(directory.bodies().iter().all(|body| body.handle != victim));
    }

    #[test]
    fn test_animated_bodies_change_sprite() {
        let (mut scheduler, group, mut directory) = setup();
        let clip = directory.add_clip(AnimationClip::from_range(
            0,
            4,
            10.0,
            crate::animation::LoopMode::Restart,
        ));
        directory.spawn_burst(group, 1, 1, Some(clip));
        scheduler.advance_frame(0.016).unwrap();

        directory.integrate(0.15);
        scheduler.advance_frame(0.016).unwrap();

        let body = &directory.bodies()[0];
        assert_eq!(body.sprite_index, 1);
        let pool = scheduler.pool(group).unwrap();
        let slot = pool.resolve(body.handle).unwrap();
        assert_eq!(pool.attributes_at(slot).unwrap().1.sprite_index, 1);
    }
}
