//! Scoped GPU buffer ownership for baked artifacts.
//!
//! GPU buffers are not collected automatically. Every buffer created here is
//! handed back to the backend by an explicit `release`/`disable`; a partial
//! allocation is unwound before the error is returned.

use glam::Mat4;
use voxframe_bake::PackedArtifact;
use voxframe_core::{PaletteIndex, PaletteSet};

use crate::error::{GpuError, Result};
use crate::gpu::{face_rotation_matrices, GpuColor, QUAD_INDICES, QUAD_VERTICES};
use crate::layout::{BufferDesc, BufferKind, BufferLayout};

/// The allocation side of a graphics API.
pub trait GpuBackend {
    /// Handle to one structured buffer.
    type Buffer;

    /// Create a structured buffer of `len` elements of `stride` bytes.
    ///
    /// `contents`, when given, holds exactly `len * stride` bytes to upload.
    fn create_buffer(
        &mut self,
        label: &str,
        len: usize,
        stride: usize,
        contents: Option<&[u8]>,
    ) -> Result<Self::Buffer>;

    /// Return a buffer to the backend.
    fn release(&mut self, buffer: Self::Buffer);
}

fn create_from<B: GpuBackend, T: bytemuck::Pod>(
    backend: &mut B,
    label: &str,
    data: &[T],
) -> Result<B::Buffer> {
    backend.create_buffer(
        label,
        data.len(),
        std::mem::size_of::<T>(),
        Some(bytemuck::cast_slice(data)),
    )
}

/// Buffers shared by every artifact: quad geometry, the face rotation table
/// and one color buffer per palette.
pub struct SharedBuffers<B: GpuBackend> {
    pub quad_vertices: B::Buffer,
    pub quad_indices: B::Buffer,
    pub rotations: B::Buffer,
    colors: Vec<B::Buffer>,
}

impl<B: GpuBackend> SharedBuffers<B> {
    /// Upload the shared buffers for every palette of `palettes`.
    pub fn create(backend: &mut B, palettes: &PaletteSet) -> Result<Self> {
        let mut created: Vec<B::Buffer> = Vec::with_capacity(3 + palettes.len());
        if let Err(error) = upload_shared(backend, palettes, &mut created) {
            tracing::warn!(%error, created = created.len(), "shared buffer upload failed");
            for buffer in created {
                backend.release(buffer);
            }
            return Err(error);
        }

        let mut buffers = created.into_iter();
        match (buffers.next(), buffers.next(), buffers.next()) {
            (Some(quad_vertices), Some(quad_indices), Some(rotations)) => Ok(Self {
                quad_vertices,
                quad_indices,
                rotations,
                colors: buffers.collect(),
            }),
            _ => Err(GpuError::InvalidState("shared buffers missing".into())),
        }
    }

    /// Color buffer of a palette, if that palette was uploaded.
    #[inline]
    pub fn color_buffer(&self, palette: PaletteIndex) -> Option<&B::Buffer> {
        self.colors.get(palette.as_usize())
    }

    /// Number of palette color buffers
    #[inline]
    pub fn palette_count(&self) -> usize {
        self.colors.len()
    }

    /// Free all shared buffers.
    pub fn release(self, backend: &mut B) {
        backend.release(self.quad_vertices);
        backend.release(self.quad_indices);
        backend.release(self.rotations);
        for buffer in self.colors {
            backend.release(buffer);
        }
    }
}

fn upload_shared<B: GpuBackend>(
    backend: &mut B,
    palettes: &PaletteSet,
    created: &mut Vec<B::Buffer>,
) -> Result<()> {
    created.push(create_from(backend, "quad_vertices", &QUAD_VERTICES)?);
    created.push(create_from(backend, "quad_indices", &QUAD_INDICES)?);
    let rotations: [Mat4; 6] = face_rotation_matrices();
    created.push(create_from(backend, "rotation_matrices", &rotations)?);
    for palette in palettes.palettes() {
        let colors = GpuColor::palette_buffer(palette);
        created.push(create_from(backend, &palette.name, &colors)?);
    }
    Ok(())
}

/// The per-artifact buffer set, allocated on enable and released on disable.
pub struct ArtifactBuffers<B: GpuBackend> {
    buffers: Vec<B::Buffer>,
    layout: Option<BufferLayout>,
}

impl<B: GpuBackend> Default for ArtifactBuffers<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GpuBackend> ArtifactBuffers<B> {
    /// Disabled buffer set holding nothing.
    pub const fn new() -> Self {
        Self {
            buffers: Vec::new(),
            layout: None,
        }
    }

    /// Whether the buffers are currently allocated
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.layout.is_some()
    }

    /// Layout of the allocated buffers
    #[inline]
    pub fn layout(&self) -> Option<&BufferLayout> {
        self.layout.as_ref()
    }

    /// Allocate and fill every buffer of `artifact`.
    ///
    /// On failure, buffers created so far are released and the set stays
    /// disabled.
    #[cfg_attr(feature = "profiling-tracy", tracing::instrument(level = "trace", skip_all))]
    pub fn enable(&mut self, backend: &mut B, artifact: &PackedArtifact) -> Result<()> {
        if self.is_enabled() {
            return Err(GpuError::InvalidState(
                "artifact buffers already enabled".into(),
            ));
        }

        let layout = BufferLayout::for_artifact(artifact);
        let mut created = Vec::with_capacity(BufferKind::ALL.len());
        for desc in layout.iter() {
            match upload(backend, desc, artifact) {
                Ok(buffer) => created.push(buffer),
                Err(error) => {
                    tracing::warn!(
                        %error,
                        buffer = desc.kind.label(),
                        bytes = desc.size_bytes(),
                        "artifact buffer allocation failed"
                    );
                    for buffer in created {
                        backend.release(buffer);
                    }
                    return Err(error);
                }
            }
        }

        tracing::debug!(
            bytes = layout.total_bytes(),
            frames = artifact.frame_count(),
            "artifact buffers enabled"
        );
        self.buffers = created;
        self.layout = Some(layout);
        Ok(())
    }

    /// Release every buffer. Does nothing when already disabled.
    pub fn disable(&mut self, backend: &mut B) {
        if self.layout.take().is_some() {
            for buffer in self.buffers.drain(..) {
                backend.release(buffer);
            }
            tracing::debug!("artifact buffers disabled");
        }
    }

    /// Allocated buffer of one kind
    #[inline]
    pub fn get(&self, kind: BufferKind) -> Option<&B::Buffer> {
        self.buffers.get(kind as usize)
    }
}

impl<B: GpuBackend> Drop for ArtifactBuffers<B> {
    fn drop(&mut self) {
        if self.is_enabled() {
            tracing::warn!(
                buffers = self.buffers.len(),
                "artifact buffers dropped while enabled; GPU memory leaked"
            );
        }
    }
}

fn upload<B: GpuBackend>(
    backend: &mut B,
    desc: &BufferDesc,
    artifact: &PackedArtifact,
) -> Result<B::Buffer> {
    let contents: Option<&[u8]> = match desc.kind {
        BufferKind::VoxelPositions => Some(bytemuck::cast_slice(&artifact.positions)),
        BufferKind::FaceIndices => Some(bytemuck::cast_slice(&artifact.face_indices)),
        BufferKind::VoxelIndices => Some(bytemuck::cast_slice(&artifact.voxel_indices)),
        BufferKind::ColorIndices => Some(bytemuck::cast_slice(&artifact.color_indices)),
        // Filled by the compute kernel.
        BufferKind::TransformMatrices => None,
    };
    backend.create_buffer(desc.kind.label(), desc.len, desc.stride, contents)
}
