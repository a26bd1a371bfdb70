//! GPU boundary for baked voxframe artifacts.
//!
//! This crate owns no graphics API. It defines the data that crosses into
//! one: Pod element types, the face rotation table and quad geometry, buffer
//! layouts sized from a [`PackedArtifact`](voxframe_bake::PackedArtifact),
//! scoped buffer ownership against a [`GpuBackend`], per-frame dispatch
//! parameters, the playback clock and static-mesh assembly for exporters.

pub mod dispatch;
pub mod error;
pub mod gpu;
pub mod layout;
pub mod mesh;
pub mod playback;
pub mod renderer;
pub mod upload;

pub use dispatch::FrameDispatch;
pub use error::{GpuError, Result};
pub use gpu::{
    face_rotation, face_rotation_matrices, instance_transform, GpuColor, FACE_ROTATIONS,
    QUAD_INDICES, QUAD_VERTICES,
};
pub use layout::{BufferDesc, BufferKind, BufferLayout};
pub use mesh::{expand_frame_cpu, ExpandedFrame, StaticMesh};
pub use playback::{FramePlayback, PlaybackConfig};
pub use renderer::ArtifactRenderer;
pub use upload::{ArtifactBuffers, GpuBackend, SharedBuffers};
