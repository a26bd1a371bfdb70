//! Ordered frame list with a current-frame cursor.

use voxframe_core::{ColorIndex, Error, Result};

use crate::frame::{Frame, FrameSnapshot};
use crate::grid::GridStore;

/// The frames of one voxel object, in playback order.
///
/// An animation always holds at least one frame.
#[derive(Debug)]
pub struct Animation {
    frames: Vec<Frame>,
    current: usize,
}

impl Animation {
    /// Animation with one frame seeded with a voxel at the origin.
    pub fn new(seed_color: ColorIndex) -> Self {
        Self {
            frames: vec![Frame::with_seed_voxel(seed_color)],
            current: 0,
        }
    }

    /// Wrap existing frames; fails on an empty list.
    pub fn from_frames(frames: Vec<Frame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::InvalidData("animation needs at least one frame".into()));
        }
        Ok(Self { frames, current: 0 })
    }

    /// Reopen an editing session from stored snapshots.
    pub fn from_snapshots(snapshots: &[FrameSnapshot]) -> Result<Self> {
        let frames = snapshots
            .iter()
            .map(Frame::from_snapshot)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(frames = frames.len(), "animation restored from snapshots");
        Self::from_frames(frames)
    }

    /// Number of frames
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if there are no frames, which never holds after construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    #[inline]
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Index of the frame being edited
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn current(&self) -> &Frame {
        &self.frames[self.current]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.current]
    }

    /// Make `index` the current frame.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.current = index;
        true
    }

    /// Append a frame seeded with one voxel at the origin and select it.
    pub fn add_frame(&mut self, seed_color: ColorIndex) -> usize {
        self.frames.push(Frame::with_seed_voxel(seed_color));
        self.current = self.frames.len() - 1;
        self.current
    }

    /// Append a deep copy of the current frame and select it.
    pub fn duplicate_current(&mut self) -> usize {
        let copy = self.current().duplicate();
        self.frames.push(copy);
        self.current = self.frames.len() - 1;
        self.current
    }

    /// Delete the current frame and select the one before it.
    ///
    /// The last remaining frame cannot be deleted.
    pub fn delete_current(&mut self) -> Option<Frame> {
        if self.frames.len() <= 1 {
            return None;
        }
        let removed = self.frames.remove(self.current);
        self.current = self.current.saturating_sub(1);
        Some(removed)
    }

    /// Grids of every frame, in order.
    pub fn grids(&self) -> impl Iterator<Item = &GridStore> {
        self.frames.iter().map(Frame::grid)
    }

    /// Snapshot of every frame, in order.
    pub fn snapshots(&self) -> Vec<FrameSnapshot> {
        self.frames.iter().map(Frame::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxframe_core::GridPos;

    #[test]
    fn new_animation_has_one_seeded_frame() {
        let animation = Animation::new(ColorIndex(1));
        assert_eq!(animation.len(), 1);
        assert_eq!(animation.current().grid().color(GridPos::ZERO), Some(ColorIndex(1)));
    }

    #[test]
    fn add_and_duplicate_select_the_new_frame() {
        let mut animation = Animation::new(ColorIndex(0));
        assert_eq!(animation.add_frame(ColorIndex(2)), 1);
        assert_eq!(animation.current_index(), 1);
        assert_eq!(animation.duplicate_current(), 2);
        assert_eq!(animation.frames()[2].snapshot(), animation.frames()[1].snapshot());
        assert!(animation.select(0));
        assert!(!animation.select(3));
        assert_eq!(animation.current_index(), 0);
    }

    #[test]
    fn last_frame_cannot_be_deleted() {
        let mut animation = Animation::new(ColorIndex(0));
        animation.add_frame(ColorIndex(1));
        assert!(animation.delete_current().is_some());
        assert_eq!(animation.current_index(), 0);
        assert!(animation.delete_current().is_none());
        assert_eq!(animation.len(), 1);
    }

    #[test]
    fn snapshots_roundtrip() {
        let mut animation = Animation::new(ColorIndex(0));
        animation.add_frame(ColorIndex(3));
        let restored = Animation::from_snapshots(&animation.snapshots()).unwrap();
        assert_eq!(restored.snapshots(), animation.snapshots());
        assert!(Animation::from_snapshots(&[]).is_err());
    }
}
