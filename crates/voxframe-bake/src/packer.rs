//! Compiles animation frames into a [`PackedArtifact`].
//!
//! Culling is independent per frame and may run on the rayon pool. Merging
//! into the shared position pool and the running instance total is
//! sequential, in frame order, so the output does not depend on scheduling.

use hashbrown::HashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use voxframe_core::constants::{FACE_COUNT, VOXEL_SIZE};
use voxframe_core::{ColorIndex, GridBounds, GridPos, Transparency};
use voxframe_voxel::{cull_grid, Animation, CulledVoxel, FrameSnapshot, GridStore};

use crate::artifact::PackedArtifact;

/// Packing options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Cull frames on the rayon pool.
    pub parallel: bool,
    /// World units per grid cell, applied to the bounds.
    pub voxel_size: f32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            voxel_size: VOXEL_SIZE,
        }
    }
}

impl PackConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f32) -> Self {
        self.voxel_size = voxel_size;
        self
    }
}

/// Frame → instance-buffer compiler.
#[derive(Clone, Debug, Default)]
pub struct FramePacker {
    config: PackConfig,
}

impl FramePacker {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Pack every frame of an animation.
    pub fn pack_animation<T>(&self, animation: &Animation, transparency: &T) -> PackedArtifact
    where
        T: Transparency + Sync + ?Sized,
    {
        self.pack(animation.frames(), transparency)
    }

    /// Pack `frames` in order.
    ///
    /// Fully occluded voxels are dropped; a frame with nothing visible packs
    /// to zero instances.
    #[cfg_attr(feature = "profiling-tracy", tracing::instrument(level = "trace", skip_all))]
    pub fn pack<G, T>(&self, frames: &[G], transparency: &T) -> PackedArtifact
    where
        G: AsRef<GridStore> + Sync,
        T: Transparency + Sync + ?Sized,
    {
        let culled: Vec<Vec<CulledVoxel>> = {
            #[cfg(feature = "profiling-tracy")]
            let _span = tracing::trace_span!("pack.cull", frames = frames.len()).entered();

            if self.config.parallel {
                frames
                    .par_iter()
                    .map(|grid| cull_frame(grid.as_ref(), transparency))
                    .collect()
            } else {
                frames
                    .iter()
                    .map(|grid| cull_frame(grid.as_ref(), transparency))
                    .collect()
            }
        };

        let mut merge = Merge::with_frames(frames.len());
        {
            #[cfg(feature = "profiling-tracy")]
            let _span = tracing::trace_span!("pack.merge").entered();

            for voxels in &culled {
                merge.push_frame(voxels);
            }
        }

        let bounds = frames
            .iter()
            .filter_map(|grid| grid.as_ref().bounds())
            .reduce(|a, b| a.union(&b))
            .map(|b: GridBounds| b.to_world_aabb(self.config.voxel_size))
            .unwrap_or_default();

        let editor_frames = frames
            .iter()
            .map(|grid| FrameSnapshot::from_grid(grid.as_ref()))
            .collect();

        let artifact = merge.finish(bounds, editor_frames);
        tracing::debug!(
            frames = artifact.frame_count(),
            positions = artifact.positions.len(),
            instances = artifact.total_instances(),
            max_instance_count = artifact.max_instance_count,
            "frames packed"
        );
        artifact
    }
}

/// Visible voxels of one frame, opaque colors first.
///
/// Both groups keep lexicographic cell order.
fn cull_frame<T: Transparency + ?Sized>(grid: &GridStore, transparency: &T) -> Vec<CulledVoxel> {
    let (mut opaque, transparent): (Vec<_>, Vec<_>) = cull_grid(grid, transparency)
        .into_iter()
        .partition(|voxel| !transparency.is_transparent(voxel.color));
    opaque.extend(transparent);
    opaque
}

/// Sequential half of packing: position dedup and running totals.
#[derive(Default)]
struct Merge {
    artifact: PackedArtifact,
    dedup: HashMap<(GridPos, ColorIndex), u32>,
    running: u32,
}

impl Merge {
    fn with_frames(frames: usize) -> Self {
        let mut merge = Self::default();
        merge.artifact.face_indices.reserve(frames * FACE_COUNT);
        merge.artifact.instance_start.reserve(frames);
        merge.artifact.instance_count.reserve(frames);
        merge
    }

    fn position_index(&mut self, voxel: &CulledVoxel) -> u32 {
        let artifact = &mut self.artifact;
        *self
            .dedup
            .entry((voxel.pos, voxel.color))
            .or_insert_with(|| {
                artifact.positions.push(voxel.pos.to_vec3());
                artifact.color_indices.push(voxel.color);
                (artifact.positions.len() - 1) as u32
            })
    }

    fn push_frame(&mut self, voxels: &[CulledVoxel]) {
        let mut buckets: [Vec<u32>; FACE_COUNT] = Default::default();
        for voxel in voxels {
            let index = self.position_index(voxel);
            for face in voxel.faces.faces() {
                buckets[face.index()].push(index);
            }
        }

        let mut cumulative = 0u32;
        for bucket in &buckets {
            cumulative += bucket.len() as u32;
            self.artifact.face_indices.push(cumulative);
            self.artifact.voxel_indices.extend_from_slice(bucket);
        }
        self.artifact.instance_start.push(self.running);
        self.artifact.instance_count.push(cumulative);
        self.running += cumulative;
    }

    fn finish(
        mut self,
        bounds: voxframe_core::Aabb,
        editor_frames: Vec<FrameSnapshot>,
    ) -> PackedArtifact {
        self.artifact.max_instance_count =
            self.artifact.instance_count.iter().copied().max().unwrap_or(0);
        self.artifact.bounds = bounds;
        self.artifact.editor_frames = editor_frames;
        self.artifact
    }
}
