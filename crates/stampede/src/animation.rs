//! # Sprite Animation
//!
//! Flipbook animation over atlas slices. A clip is a list of frames,
//! each naming a sprite index and how long it stays up; playback state
//! advances by wall time and reports the sprite index the instance
//! should show.

use serde::{Deserialize, Serialize};

/// One animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Atlas slice shown during this frame.
    pub sprite_index: u32,
    /// How long the frame stays up, in seconds.
    pub frame_time: f32,
}

/// What happens when playback reaches the last frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Jump back to the first frame.
    Restart,
    /// Play backwards to the first frame, then forwards again.
    PingPong,
    /// Hold the last frame forever.
    Stop,
}

/// A flipbook clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// The frames, played in order.
    pub frames: Vec<AnimationFrame>,
    /// Behavior at the end of the frame list.
    pub loop_mode: LoopMode,
}

impl AnimationClip {
    /// Creates a clip from explicit frames.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty.
    #[must_use]
    pub fn new(frames: Vec<AnimationFrame>, loop_mode: LoopMode) -> Self {
        assert!(!frames.is_empty(), "clip needs at least one frame");
        Self { frames, loop_mode }
    }

    /// Creates a clip over a contiguous run of sprite indices at a
    /// fixed frame rate.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or `fps` is not positive.
    #[must_use]
    pub fn from_range(first_sprite: u32, count: u32, fps: f32, loop_mode: LoopMode) -> Self {
        assert!(count > 0, "clip needs at least one frame");
        assert!(fps > 0.0, "frame rate must be positive");
        let frame_time = 1.0 / fps;
        let frames = (0..count)
            .map(|i| AnimationFrame {
                sprite_index: first_sprite + i,
                frame_time,
            })
            .collect();
        Self { frames, loop_mode }
    }

    /// Number of frames in the clip.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the clip has no frames. Never true for a constructed clip.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Playback state for one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    /// Index into the owner's clip table.
    pub clip: usize,
    /// Current frame within the clip.
    frame: usize,
    /// Time spent on the current frame.
    elapsed: f32,
    /// Playback direction: forward or backward (ping-pong).
    reversed: bool,
    /// Set once a `Stop` clip has held its last frame.
    finished: bool,
}

impl AnimationState {
    /// Starts playback of a clip from its first frame.
    #[must_use]
    pub const fn new(clip: usize) -> Self {
        Self {
            clip,
            frame: 0,
            elapsed: 0.0,
            reversed: false,
            finished: false,
        }
    }

    /// Whether a `Stop` clip has reached and held its last frame.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances playback by `dt` seconds and returns the sprite index
    /// to show.
    pub fn advance(&mut self, clip: &AnimationClip, dt: f32) -> u32 {
        debug_assert!(!clip.frames.is_empty());
        if self.finished || clip.frames.len() == 1 {
            self.finished |= clip.loop_mode == LoopMode::Stop;
            return clip.frames[self.frame.min(clip.frames.len() - 1)].sprite_index;
        }

        self.elapsed += dt;
        while self.elapsed >= clip.frames[self.frame].frame_time {
            self.elapsed -= clip.frames[self.frame].frame_time;
            self.step(clip);
            if self.finished {
                break;
            }
        }
        clip.frames[self.frame].sprite_index
    }

    /// Steps one frame in the current direction, handling clip ends.
    fn step(&mut self, clip: &AnimationClip) {
        let last = clip.frames.len() - 1;
        match clip.loop_mode {
            LoopMode::Restart => {
                self.frame = if self.frame == last { 0 } else { self.frame + 1 };
            }
            LoopMode::Stop => {
                if self.frame == last {
                    self.finished = true;
                } else {
                    self.frame += 1;
                }
            }
            LoopMode::PingPong => {
                if self.reversed {
                    if self.frame == 0 {
                        self.reversed = false;
                        self.frame = 1.min(last);
                    } else {
                        self.frame -= 1;
                    }
                } else if self.frame == last {
                    self.reversed = true;
                    self.frame = last.saturating_sub(1);
                } else {
                    self.frame += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(loop_mode: LoopMode) -> AnimationClip {
        // Four frames, 10 fps.
        AnimationClip::from_range(0, 4, 10.0, loop_mode)
    }

    #[test]
    fn test_restart_wraps_around() {
        let clip = clip(LoopMode::Restart);
        let mut state = AnimationState::new(0);
        assert_eq!(state.advance(&clip, 0.05), 0);
        assert_eq!(state.advance(&clip, 0.1), 1);
        assert_eq!(state.advance(&clip, 0.2), 3);
        // Passing the last frame restarts at the first.
        assert_eq!(state.advance(&clip, 0.1), 0);
    }

    #[test]
    fn test_stop_holds_last_frame() {
        let clip = clip(LoopMode::Stop);
        let mut state = AnimationState::new(0);
        // Far past the end of the clip.
        assert_eq!(state.advance(&clip, 10.0), 3);
        assert!(state.is_finished());
        assert_eq!(state.advance(&clip, 10.0), 3);
    }

    #[test]
    fn test_ping_pong_reverses() {
        let clip = clip(LoopMode::PingPong);
        let mut state = AnimationState::new(0);
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(state.advance(&clip, 0.1));
        }
        assert_eq!(seen, vec![1, 2, 3, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn test_single_frame_clip_is_stable() {
        let clip = AnimationClip::from_range(7, 1, 10.0, LoopMode::Restart);
        let mut state = AnimationState::new(0);
        assert_eq!(state.advance(&clip, 5.0), 7);
        assert_eq!(state.advance(&clip, 5.0), 7);
    }
}
