//! Fixed-step animation clock.

use serde::{Deserialize, Serialize};

/// Playback options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seconds each frame stays on screen.
    pub frame_time: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { frame_time: 0.2 }
    }
}

impl PlaybackConfig {
    pub fn with_frame_time(mut self, frame_time: f32) -> Self {
        self.frame_time = frame_time;
        self
    }
}

/// Steps through `frame_count` frames at a fixed rate, wrapping at the end.
#[derive(Clone, Debug)]
pub struct FramePlayback {
    config: PlaybackConfig,
    frame_count: usize,
    current: usize,
    timer: f32,
}

impl FramePlayback {
    pub fn new(config: PlaybackConfig, frame_count: usize) -> Self {
        Self {
            config,
            frame_count,
            current: 0,
            timer: 0.0,
        }
    }

    #[inline]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Frame currently shown
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Add `dt` seconds. Returns true if the shown frame changed.
    ///
    /// A non-positive frame time or a single frame never advances.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.frame_count <= 1 || self.config.frame_time <= 0.0 || !dt.is_finite() {
            return false;
        }

        self.timer += dt.max(0.0);
        let steps = (self.timer / self.config.frame_time).floor();
        if steps < 1.0 {
            return false;
        }
        self.timer -= steps * self.config.frame_time;

        let previous = self.current;
        self.current = (self.current + steps as usize) % self.frame_count;
        self.current != previous
    }

    /// Show `frame` and restart its timer. Out-of-range frames wrap.
    pub fn seek(&mut self, frame: usize) {
        self.current = if self.frame_count == 0 {
            0
        } else {
            frame % self.frame_count
        };
        self.timer = 0.0;
    }

    /// Change the frame count, keeping the current frame when still valid.
    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count;
        if self.current >= frame_count {
            self.seek(0);
        }
    }
}
