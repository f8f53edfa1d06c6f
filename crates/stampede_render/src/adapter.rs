//! # Presentation Adapter
//!
//! The seam a rendering backend implements. Once per frame, after all
//! mutation phases, the driver hands the adapter one [`GroupFrame`] per
//! texture group with instances: dense attribute slices plus the group's
//! atlas. A real backend uploads the slices and issues one instanced
//! draw; the [`RecordingAdapter`] here stores what it was given so tests
//! and headless runs can inspect it.

use parking_lot::Mutex;
use tracing::trace;

use stampede_core::{
    FrameReport, GroupId, InstanceShaderData, InstanceTransform, PoolSnapshot,
};

use crate::atlas::{SpriteAtlas, TextureId};

/// Everything a backend needs to draw one group this frame.
#[derive(Clone, Copy, Debug)]
pub struct GroupFrame<'a> {
    /// Texture the group's material binds.
    pub texture: TextureId,
    /// The group's slice table.
    pub atlas: &'a SpriteAtlas,
    /// Dense live-range view from the group's pool.
    pub snapshot: PoolSnapshot<'a>,
}

/// A rendering backend, from the pools' point of view.
///
/// `present` is called once per non-empty group per frame, strictly
/// after the frame's mutation phases; the slices stay valid for the
/// duration of the call. `frame_end` closes the frame with its report.
pub trait PresentationAdapter {
    /// Consumes one group's live range for this frame.
    fn present(&mut self, frame: &GroupFrame<'_>);

    /// Called once per frame after every group has been presented.
    fn frame_end(&mut self, report: &FrameReport) {
        let _ = report;
    }
}

/// One recorded draw, an owned copy of what a backend would upload.
#[derive(Clone, Debug)]
pub struct DrawSubmission {
    /// Frame number the submission belongs to.
    pub frame: u64,
    /// Source group.
    pub group: GroupId,
    /// Bound texture.
    pub texture: TextureId,
    /// Instances in the draw.
    pub instance_count: usize,
    /// Copied transform range.
    pub transforms: Vec<InstanceTransform>,
    /// Copied shader data range.
    pub shader_data: Vec<InstanceShaderData>,
}

/// Headless adapter that records every submission.
///
/// Stands in for a GPU backend in tests, benches and the demo binary.
/// Interior-mutable so frame inspection can happen from outside the
/// frame loop.
#[derive(Default)]
pub struct RecordingAdapter {
    submissions: Mutex<Vec<DrawSubmission>>,
    current_frame: u64,
    frames_ended: u64,
}

impl RecordingAdapter {
    /// Creates an empty recording adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames closed so far.
    #[must_use]
    pub const fn frames_ended(&self) -> u64 {
        self.frames_ended
    }

    /// Takes all recorded submissions, leaving the store empty.
    #[must_use]
    pub fn drain_submissions(&self) -> Vec<DrawSubmission> {
        std::mem::take(&mut *self.submissions.lock())
    }

    /// Number of submissions currently recorded.
    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }
}

impl PresentationAdapter for RecordingAdapter {
    fn present(&mut self, frame: &GroupFrame<'_>) {
        trace!(
            group = frame.snapshot.group.index(),
            instances = frame.snapshot.active,
            "recording group frame"
        );
        self.submissions.lock().push(DrawSubmission {
            frame: self.current_frame,
            group: frame.snapshot.group,
            texture: frame.texture,
            instance_count: frame.snapshot.active,
            transforms: frame.snapshot.transforms.to_vec(),
            shader_data: frame.snapshot.shader_data.to_vec(),
        });
    }

    fn frame_end(&mut self, report: &FrameReport) {
        self.current_frame = report.frame + 1;
        self.frames_ended += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampede_core::{ColorRgba, GroupConfig, InstanceAttributes, InstancePool, Vec2};

    #[test]
    fn test_recording_adapter_copies_live_range() {
        let mut pool = InstancePool::new(GroupId::new(0), GroupConfig::default());
        let handle = stampede_core::InstanceHandle::new(GroupId::new(0), 0);
        let attrs = InstanceAttributes::new(
            Vec2::new(4.0, 2.0),
            0.0,
            Vec2::ONE,
            3,
            ColorRgba::WHITE,
        );
        pool.spawn(handle, &attrs, None).unwrap();

        let atlas = SpriteAtlas::grid(TextureId(7), 4, 4);
        let mut adapter = RecordingAdapter::new();
        adapter.present(&GroupFrame {
            texture: atlas.texture,
            atlas: &atlas,
            snapshot: pool.snapshot(),
        });
        adapter.frame_end(&FrameReport::default());

        let submissions = adapter.drain_submissions();
        assert_eq!(submissions.len(), 1);
        let draw = &submissions[0];
        assert_eq!(draw.texture, TextureId(7));
        assert_eq!(draw.instance_count, 1);
        assert_eq!(draw.transforms[0].translation(), Vec2::new(4.0, 2.0));
        assert_eq!(draw.shader_data[0].sprite_index, 3);
        assert_eq!(adapter.frames_ended(), 1);
    }
}
