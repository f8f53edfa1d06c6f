//! # Frame Reports
//!
//! Per-frame lifecycle counters and their accumulator.
//!
//! Every rejected or stale request surfaces here instead of failing the
//! frame, so the numbers double as the drop diagnostic required by the
//! error policy: a misbehaving producer shows up as counts, not crashes.

/// Lifecycle counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number this report describes.
    pub frame: u64,
    /// Instances spawned this frame.
    pub spawned: u32,
    /// Spawn requests rejected (duplicate handle or unknown group).
    pub rejected_spawns: u32,
    /// Instances updated this frame.
    pub updated: u32,
    /// Update requests skipped because the handle was no longer live.
    pub stale_updates: u32,
    /// Instances despawned this frame (explicit and expired).
    pub despawned: u32,
    /// Despawn requests skipped because the handle was already gone.
    pub stale_despawns: u32,
    /// Instances whose lifetime ran out this frame.
    pub expired: u32,
    /// Requests dropped at the queues since the previous frame.
    pub dropped_requests: u64,
    /// Total live instances across all groups after the frame.
    pub live_after: usize,
}

impl FrameReport {
    /// Requests that did not apply cleanly this frame.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        u64::from(self.rejected_spawns)
            + u64::from(self.stale_updates)
            + u64::from(self.stale_despawns)
            + self.dropped_requests
    }
}

/// Accumulator over many frames' reports.
#[derive(Clone, Debug, Default)]
pub struct ReportAccumulator {
    /// Frames recorded.
    pub frames_recorded: u64,
    /// Sum of spawned instances.
    pub spawned_sum: u64,
    /// Sum of despawned instances.
    pub despawned_sum: u64,
    /// Sum of expired instances.
    pub expired_sum: u64,
    /// Sum of applied updates.
    pub updated_sum: u64,
    /// Sum of skipped requests of all kinds.
    pub skipped_sum: u64,
    /// Highest live count observed after any frame.
    pub peak_live: usize,
}

impl ReportAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame's report.
    pub fn record(&mut self, report: &FrameReport) {
        self.frames_recorded += 1;
        self.spawned_sum += u64::from(report.spawned);
        self.despawned_sum += u64::from(report.despawned);
        self.expired_sum += u64::from(report.expired);
        self.updated_sum += u64::from(report.updated);
        self.skipped_sum += report.skipped();
        self.peak_live = self.peak_live.max(report.live_after);
    }

    /// Average spawns per frame.
    #[must_use]
    pub fn avg_spawned(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.spawned_sum as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the recorded frames.
    pub fn print_summary(&self) {
        println!("┌─ LIFECYCLE ────────────────────────────────────────────────┐");
        println!("│ Frames recorded:   {:>12}", self.frames_recorded);
        println!("│ Spawned:           {:>12}", self.spawned_sum);
        println!("│ Despawned:         {:>12}", self.despawned_sum);
        println!("│ Expired:           {:>12}", self.expired_sum);
        println!("│ Updates applied:   {:>12}", self.updated_sum);
        println!("│ Requests skipped:  {:>12}", self.skipped_sum);
        println!("│ Peak live:         {:>12}", self.peak_live);
        println!("└────────────────────────────────────────────────────────────┘");
    }
}
