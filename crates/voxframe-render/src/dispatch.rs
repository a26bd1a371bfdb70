//! Per-frame compute dispatch parameters.

use voxframe_bake::PackedArtifact;

use crate::error::{GpuError, Result};
use crate::gpu::QUAD_INDICES;

/// Everything the per-instance compute kernel and the instanced draw need
/// for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDispatch {
    pub frame: usize,
    /// First entry of the frame in the instance stream
    pub instance_start: u32,
    /// Face instances in the frame; may be zero
    pub instance_count: u32,
    /// Thread groups along X
    pub thread_groups: u32,
}

impl FrameDispatch {
    /// Dispatch for `frame` with kernels of `group_size` threads.
    pub fn for_frame(artifact: &PackedArtifact, frame: usize, group_size: u32) -> Result<Self> {
        if group_size == 0 {
            return Err(GpuError::InvalidState("thread group size is zero".into()));
        }
        let (Some(&instance_start), Some(&instance_count)) = (
            artifact.instance_start.get(frame),
            artifact.instance_count.get(frame),
        ) else {
            return Err(GpuError::InvalidState(format!(
                "frame {frame} out of range for {} frames",
                artifact.frame_count()
            )));
        };

        Ok(Self {
            frame,
            instance_start,
            instance_count,
            thread_groups: instance_count.div_ceil(group_size),
        })
    }

    /// Whether there is anything to draw
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.instance_count == 0
    }

    /// Indices submitted per instance by the draw call.
    #[inline]
    pub const fn indices_per_instance() -> u32 {
        QUAD_INDICES.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(counts: &[u32]) -> PackedArtifact {
        let mut starts = Vec::new();
        let mut running = 0;
        for count in counts {
            starts.push(running);
            running += count;
        }
        PackedArtifact {
            instance_start: starts,
            instance_count: counts.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn thread_groups_round_up() {
        let artifact = artifact(&[64, 65, 1]);
        let groups: Vec<u32> = (0..3)
            .map(|f| FrameDispatch::for_frame(&artifact, f, 64).unwrap().thread_groups)
            .collect();
        assert_eq!(groups, vec![1, 2, 1]);

        let second = FrameDispatch::for_frame(&artifact, 1, 64).unwrap();
        assert_eq!(second.instance_start, 64);
        assert_eq!(second.instance_count, 65);
    }

    #[test]
    fn empty_frame_dispatches_nothing() {
        let dispatch = FrameDispatch::for_frame(&artifact(&[0]), 0, 32).unwrap();
        assert!(dispatch.is_empty());
        assert_eq!(dispatch.thread_groups, 0);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let artifact = artifact(&[4]);
        assert!(matches!(
            FrameDispatch::for_frame(&artifact, 1, 64),
            Err(GpuError::InvalidState(_))
        ));
        assert!(FrameDispatch::for_frame(&artifact, 0, 0).is_err());
    }

    #[test]
    fn two_triangles_per_instance() {
        assert_eq!(FrameDispatch::indices_per_instance(), 6);
    }
}
