//! Sizes of the buffers an instanced renderer allocates for one artifact.

use std::mem::size_of;

use glam::{Mat4, Vec3};
use voxframe_bake::PackedArtifact;

/// Buffers allocated per artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// `Vec3` per deduplicated position
    VoxelPositions,
    /// Cumulative per-face counts, six per frame
    FaceIndices,
    /// Position index per face instance
    VoxelIndices,
    /// Per-instance transform written by the compute kernel, reused by every frame
    TransformMatrices,
    /// Color index per position
    ColorIndices,
}

impl BufferKind {
    /// All kinds, in allocation order. Matches the discriminants.
    pub const ALL: [Self; 5] = [
        Self::VoxelPositions,
        Self::FaceIndices,
        Self::VoxelIndices,
        Self::TransformMatrices,
        Self::ColorIndices,
    ];

    /// Debug label handed to the backend
    pub const fn label(self) -> &'static str {
        match self {
            Self::VoxelPositions => "voxel_positions",
            Self::FaceIndices => "face_indices",
            Self::VoxelIndices => "voxel_indices",
            Self::ColorIndices => "color_indices",
            Self::TransformMatrices => "transform_matrices",
        }
    }

    /// Bytes per element
    pub const fn stride(self) -> usize {
        match self {
            Self::VoxelPositions => size_of::<Vec3>(),
            Self::FaceIndices | Self::VoxelIndices | Self::ColorIndices => size_of::<u32>(),
            Self::TransformMatrices => size_of::<Mat4>(),
        }
    }
}

/// One structured buffer: element count and stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferDesc {
    pub kind: BufferKind,
    pub len: usize,
    pub stride: usize,
}

impl BufferDesc {
    fn new(kind: BufferKind, len: usize) -> Self {
        Self {
            kind,
            len,
            stride: kind.stride(),
        }
    }

    /// Total size in bytes.
    #[inline]
    pub const fn size_bytes(&self) -> usize {
        self.len * self.stride
    }
}

/// The full buffer set of one artifact, sized exactly from its arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferLayout {
    buffers: [BufferDesc; 5],
}

impl BufferLayout {
    pub fn for_artifact(artifact: &PackedArtifact) -> Self {
        let len = |kind: BufferKind| match kind {
            BufferKind::VoxelPositions => artifact.positions.len(),
            BufferKind::FaceIndices => artifact.face_indices.len(),
            BufferKind::VoxelIndices => artifact.voxel_indices.len(),
            BufferKind::ColorIndices => artifact.color_indices.len(),
            BufferKind::TransformMatrices => artifact.max_instance_count as usize,
        };
        Self {
            buffers: BufferKind::ALL.map(|kind| BufferDesc::new(kind, len(kind))),
        }
    }

    /// Descriptor of one buffer
    #[inline]
    pub fn get(&self, kind: BufferKind) -> BufferDesc {
        self.buffers[kind as usize]
    }

    /// Descriptors in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferDesc> {
        self.buffers.iter()
    }

    /// Bytes across all buffers.
    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(BufferDesc::size_bytes).sum()
    }
}
