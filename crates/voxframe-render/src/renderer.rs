//! Per-object driver of an instanced artifact renderer.

use voxframe_bake::PackedArtifact;
use voxframe_core::PaletteIndex;

use crate::dispatch::FrameDispatch;
use crate::error::Result;
use crate::playback::{FramePlayback, PlaybackConfig};
use crate::upload::{ArtifactBuffers, GpuBackend, SharedBuffers};

/// Owns one artifact's GPU buffers and decides when to re-dispatch.
pub struct ArtifactRenderer<B: GpuBackend> {
    artifact: PackedArtifact,
    buffers: ArtifactBuffers<B>,
    playback: FramePlayback,
    group_size: u32,
}

impl<B: GpuBackend> ArtifactRenderer<B> {
    /// Disabled renderer for `artifact`, dispatching `group_size`-thread groups.
    pub fn new(artifact: PackedArtifact, playback: PlaybackConfig, group_size: u32) -> Self {
        let frames = artifact.frame_count();
        Self {
            artifact,
            buffers: ArtifactBuffers::new(),
            playback: FramePlayback::new(playback, frames),
            group_size,
        }
    }

    #[inline]
    pub fn artifact(&self) -> &PackedArtifact {
        &self.artifact
    }

    #[inline]
    pub fn buffers(&self) -> &ArtifactBuffers<B> {
        &self.buffers
    }

    #[inline]
    pub fn playback(&self) -> &FramePlayback {
        &self.playback
    }

    /// Allocate the buffers and return the first dispatch.
    pub fn enable(&mut self, backend: &mut B) -> Result<FrameDispatch> {
        self.buffers.enable(backend, &self.artifact)?;
        self.playback.seek(0);
        match self.current_dispatch() {
            Ok(dispatch) => Ok(dispatch),
            Err(error) => {
                self.buffers.disable(backend);
                Err(error)
            }
        }
    }

    /// Release the buffers.
    pub fn disable(&mut self, backend: &mut B) {
        self.buffers.disable(backend);
    }

    /// Dispatch of the frame currently shown.
    pub fn current_dispatch(&self) -> Result<FrameDispatch> {
        FrameDispatch::for_frame(&self.artifact, self.playback.current(), self.group_size)
    }

    /// Advance the clock; returns the new dispatch when the frame changed.
    pub fn update(&mut self, dt: f32) -> Result<Option<FrameDispatch>> {
        if !self.buffers.is_enabled() || !self.playback.advance(dt) {
            return Ok(None);
        }
        self.current_dispatch().map(Some)
    }

    /// Show the artifact with another palette.
    ///
    /// Only the color buffer binding changes. Returns false, keeping the
    /// current palette, if `shared` has no buffer for `palette`.
    pub fn set_palette(&mut self, shared: &SharedBuffers<B>, palette: PaletteIndex) -> bool {
        if shared.color_buffer(palette).is_none() {
            tracing::warn!(palette = palette.0, "no color buffer for palette");
            return false;
        }
        self.artifact.set_palette_index(palette);
        true
    }

    /// Color buffer to bind for the current palette.
    pub fn color_buffer<'a>(&self, shared: &'a SharedBuffers<B>) -> Option<&'a B::Buffer> {
        shared.color_buffer(self.artifact.palette_index)
    }
}
