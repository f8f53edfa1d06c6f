//! # Request Queues
//!
//! The only channel between owner-side code and the pools.
//!
//! Requests flow through bounded crossbeam channels and are drained by
//! the scheduler at phase boundaries. A full queue drops the request and
//! counts the drop - one stalled producer must never block or corrupt
//! the frame loop.
//!
//! Handles are issued on the sending side: every spawn request draws a
//! serial number from the group's atomic counter, so the caller holds a
//! stable identity immediately, before the spawn is applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

use crate::pool::{GroupId, InstanceAttributes, InstanceHandle};

/// Maximum number of groups a scheduler can register.
///
/// Serial counters are pre-allocated per group; 256 texture groups is
/// far more than any realistic scene uses.
pub const MAX_GROUPS: usize = 256;

/// Request to spawn one instance.
#[derive(Clone, Copy, Debug)]
pub struct SpawnRequest {
    /// The handle issued to the caller at request time.
    pub handle: InstanceHandle,
    /// Initial attributes for the instance.
    pub attrs: InstanceAttributes,
}

/// Request to overwrite one live instance's attributes.
#[derive(Clone, Copy, Debug)]
pub struct UpdateRequest {
    /// The instance to update.
    pub handle: InstanceHandle,
    /// Replacement attributes.
    pub attrs: InstanceAttributes,
}

/// Request to despawn one instance.
///
/// Despawning a handle that is already gone is not an error; the
/// scheduler skips it silently.
#[derive(Clone, Copy, Debug)]
pub struct DespawnRequest {
    /// The instance to despawn.
    pub handle: InstanceHandle,
}

/// Owner-side endpoint for issuing lifecycle requests.
///
/// Cheap to clone; every simulation thread can hold its own. The port
/// never touches pool internals - it only enqueues.
#[derive(Clone)]
pub struct RequestPort {
    spawn_tx: Sender<SpawnRequest>,
    update_tx: Sender<UpdateRequest>,
    despawn_tx: Sender<DespawnRequest>,
    /// Next serial per group, shared across all port clones.
    serials: Arc<[AtomicU64]>,
    /// Requests dropped because a queue was full.
    dropped: Arc<AtomicU64>,
}

impl RequestPort {
    /// Requests a spawn and returns the instance's handle immediately.
    ///
    /// The spawn is applied at the next frame's spawn phase. If the
    /// queue is full the request is dropped (counted, warned) - the
    /// returned handle then simply never goes live, and later requests
    /// against it are skipped as stale.
    #[must_use]
    pub fn request_spawn(&self, group: GroupId, attrs: InstanceAttributes) -> InstanceHandle {
        let Some(serial_slot) = self.serials.get(group.index()) else {
            warn!(group = group.index(), "spawn request for unknown group");
            return InstanceHandle::NULL;
        };
        let serial = serial_slot.fetch_add(1, Ordering::Relaxed);
        let handle = InstanceHandle::new(group, serial);

        if let Err(err) = self.spawn_tx.try_send(SpawnRequest { handle, attrs }) {
            self.count_drop("spawn", &err);
        }
        handle
    }

    /// Requests a spawn under a handle the caller already holds.
    ///
    /// This is the respawn path: pairing it with a despawn request for
    /// the same handle in the same frame replaces the instance while
    /// keeping its identity. Spawning a handle that stays live is
    /// rejected as a duplicate at apply time.
    pub fn request_spawn_at(&self, handle: InstanceHandle, attrs: InstanceAttributes) {
        if let Err(err) = self.spawn_tx.try_send(SpawnRequest { handle, attrs }) {
            self.count_drop("spawn", &err);
        }
    }

    /// Requests an attribute update for a live instance.
    pub fn request_update(&self, handle: InstanceHandle, attrs: InstanceAttributes) {
        if let Err(err) = self.update_tx.try_send(UpdateRequest { handle, attrs }) {
            self.count_drop("update", &err);
        }
    }

    /// Requests a despawn. Idempotent from the caller's point of view.
    pub fn request_despawn(&self, handle: InstanceHandle) {
        if let Err(err) = self.despawn_tx.try_send(DespawnRequest { handle }) {
            self.count_drop("despawn", &err);
        }
    }

    /// Total requests dropped over this port family's lifetime.
    #[must_use]
    pub fn dropped_requests(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn count_drop<T>(&self, kind: &'static str, err: &TrySendError<T>) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        match err {
            TrySendError::Full(_) => warn!(kind, "request queue full, dropping request"),
            TrySendError::Disconnected(_) => {
                warn!(kind, "request queue disconnected, dropping request");
            }
        }
    }
}

/// Scheduler-side endpoint holding the queue receivers.
pub struct RequestHub {
    /// Spawn queue receiver.
    pub(crate) spawn_rx: Receiver<SpawnRequest>,
    /// Update queue receiver.
    pub(crate) update_rx: Receiver<UpdateRequest>,
    /// Despawn queue receiver.
    pub(crate) despawn_rx: Receiver<DespawnRequest>,
    /// Port template cloned out to owners.
    port: RequestPort,
}

impl RequestHub {
    /// Creates the three bounded queues and the shared serial counters.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        let (spawn_tx, spawn_rx) = bounded(queue_capacity);
        let (update_tx, update_rx) = bounded(queue_capacity);
        let (despawn_tx, despawn_rx) = bounded(queue_capacity);
        let serials: Arc<[AtomicU64]> =
            (0..MAX_GROUPS).map(|_| AtomicU64::new(0)).collect();

        Self {
            spawn_rx,
            update_rx,
            despawn_rx,
            port: RequestPort {
                spawn_tx,
                update_tx,
                despawn_tx,
                serials,
                dropped: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    /// Returns a new owner-side port.
    #[must_use]
    pub fn port(&self) -> RequestPort {
        self.port.clone()
    }

    /// Total requests dropped across all ports.
    #[must_use]
    pub fn dropped_requests(&self) -> u64 {
        self.port.dropped_requests()
    }
}
