//! Baking of voxel animations into GPU-instancing-ready buffers.
//!
//! [`FramePacker`] culls every frame, deduplicates `(cell, color)` pairs into a
//! shared position pool and lays face instances out face-major per frame.
//! The result is a [`PackedArtifact`], which can be validated and persisted.

pub mod artifact;
pub mod packer;

pub use artifact::{PackedArtifact, ARTIFACT_MAGIC, FORMAT_VERSION};
pub use packer::{FramePacker, PackConfig};

use voxframe_core::{Error, PaletteIndex, PaletteProvider, Result};
use voxframe_voxel::Animation;

/// Pack `animation` with the transparency of `palette` and tag the artifact
/// with that palette.
pub fn bake<P: PaletteProvider + ?Sized>(
    animation: &Animation,
    palettes: &P,
    palette: PaletteIndex,
    config: PackConfig,
) -> Result<PackedArtifact> {
    let mask = palettes
        .transparency(palette)
        .ok_or_else(|| Error::NotFound(format!("palette {}", palette.0)))?;
    let mut artifact = FramePacker::new(config).pack_animation(animation, &mask);
    artifact.palette_index = palette;
    Ok(artifact)
}
