//! The baked, frame-indexed instance buffers.
//!
//! Layout of one frame `f` inside the flat arrays:
//!
//! ```text
//! voxel_indices[instance_start[f] .. instance_start[f] + instance_count[f]]
//!     = face 0 bucket | face 1 bucket | ... | face 5 bucket
//! face_indices[f * 6 + i] = instances of faces 0..=i in frame f
//! ```
//!
//! Each entry of `voxel_indices` indexes `positions` / `color_indices`.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use voxframe_core::constants::FACE_COUNT;
use voxframe_core::{Aabb, ColorIndex, Error, Face, PaletteIndex, Result};
use voxframe_voxel::FrameSnapshot;

/// Leading bytes of an encoded artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"VXFA";

/// Encoding version written after [`ARTIFACT_MAGIC`].
pub const FORMAT_VERSION: u8 = 1;

/// Compiled output of one bake.
///
/// Immutable after packing except for `palette_index`, which a renderer may
/// swap without touching geometry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackedArtifact {
    /// Deduplicated voxel positions, in grid units.
    pub positions: Vec<Vec3>,
    /// Color of each entry of `positions`.
    pub color_indices: Vec<ColorIndex>,
    /// One entry per face instance, face-major within each frame.
    pub voxel_indices: Vec<u32>,
    /// Six cumulative per-face instance counts per frame.
    pub face_indices: Vec<u32>,
    /// First instance of each frame.
    pub instance_start: Vec<u32>,
    /// Instance count of each frame.
    pub instance_count: Vec<u32>,
    /// Largest `instance_count`, for sizing reusable per-frame buffers.
    pub max_instance_count: u32,
    /// World-space box over every frame's occupied cells.
    pub bounds: Aabb,
    /// Palette the artifact is currently shown with.
    pub palette_index: PaletteIndex,
    /// Every occupied cell of each frame, for reopening the editor.
    pub editor_frames: Vec<FrameSnapshot>,
}

impl PackedArtifact {
    /// Number of frames
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.instance_count.len()
    }

    /// Face instances across all frames
    #[inline]
    pub fn total_instances(&self) -> usize {
        self.voxel_indices.len()
    }

    /// Range of `voxel_indices` belonging to `frame`.
    pub fn instance_range(&self, frame: usize) -> Option<Range<usize>> {
        let start = *self.instance_start.get(frame)? as usize;
        let count = *self.instance_count.get(frame)? as usize;
        Some(start..start + count)
    }

    /// Range of `voxel_indices` holding the `face` instances of `frame`.
    pub fn face_range(&self, frame: usize, face: Face) -> Option<Range<usize>> {
        let start = *self.instance_start.get(frame)? as usize;
        let base = frame * FACE_COUNT;
        let end = *self.face_indices.get(base + face.index())? as usize;
        let begin = match face.index() {
            0 => 0,
            i => *self.face_indices.get(base + i - 1)? as usize,
        };
        Some(start + begin..start + end)
    }

    /// Position indices of every face instance of `frame`.
    pub fn frame_voxel_indices(&self, frame: usize) -> Option<&[u32]> {
        self.voxel_indices.get(self.instance_range(frame)?)
    }

    /// Swap the palette without rebaking.
    pub fn set_palette_index(&mut self, palette: PaletteIndex) {
        tracing::debug!(from = self.palette_index.0, to = palette.0, "palette swapped");
        self.palette_index = palette;
    }

    /// Check that every array agrees with every other.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidData(msg));

        if self.color_indices.len() != self.positions.len() {
            return invalid(format!(
                "{} positions but {} color indices",
                self.positions.len(),
                self.color_indices.len()
            ));
        }

        let frames = self.frame_count();
        if self.instance_start.len() != frames {
            return invalid(format!(
                "{} instance starts for {frames} frames",
                self.instance_start.len()
            ));
        }
        if self.face_indices.len() != frames * FACE_COUNT {
            return invalid(format!(
                "{} face indices for {frames} frames",
                self.face_indices.len()
            ));
        }
        if self.editor_frames.len() != frames {
            return invalid(format!(
                "{} editor frames for {frames} frames",
                self.editor_frames.len()
            ));
        }

        let mut running = 0u32;
        for frame in 0..frames {
            if self.instance_start[frame] != running {
                return invalid(format!(
                    "frame {frame} starts at {} instead of {running}",
                    self.instance_start[frame]
                ));
            }
            let counts = &self.face_indices[frame * FACE_COUNT..(frame + 1) * FACE_COUNT];
            if counts.windows(2).any(|w| w[0] > w[1]) {
                return invalid(format!("frame {frame} face counts decrease"));
            }
            if counts[FACE_COUNT - 1] != self.instance_count[frame] {
                return invalid(format!(
                    "frame {frame} has {} face instances but an instance count of {}",
                    counts[FACE_COUNT - 1],
                    self.instance_count[frame]
                ));
            }
            running = match running.checked_add(self.instance_count[frame]) {
                Some(next) => next,
                None => return invalid(format!("instance counts overflow at frame {frame}")),
            };
        }
        if running as usize != self.voxel_indices.len() {
            return invalid(format!(
                "frames cover {running} instances but {} voxel indices are stored",
                self.voxel_indices.len()
            ));
        }

        if let Some(bad) = self
            .voxel_indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return invalid(format!(
                "voxel index {bad} out of range for {} positions",
                self.positions.len()
            ));
        }

        let max = self.instance_count.iter().copied().max().unwrap_or(0);
        if self.max_instance_count != max {
            return invalid(format!(
                "max instance count is {} but the largest frame has {max}",
                self.max_instance_count
            ));
        }

        self.editor_frames.iter().try_for_each(FrameSnapshot::validate)
    }

    /// Encode with a magic/version header.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))?;
        let mut bytes = Vec::with_capacity(ARTIFACT_MAGIC.len() + 1 + body.len());
        bytes.extend_from_slice(&ARTIFACT_MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend(body);
        Ok(bytes)
    }

    /// Decode and validate bytes produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = ARTIFACT_MAGIC.len() + 1;
        if bytes.len() < header || bytes[..ARTIFACT_MAGIC.len()] != ARTIFACT_MAGIC {
            return Err(Error::InvalidData("not a voxframe artifact".into()));
        }
        let version = bytes[ARTIFACT_MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported artifact version {version}"
            )));
        }
        let artifact: Self = bincode::deserialize(&bytes[header..])
            .map_err(|e| Error::Serialization(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write the encoded artifact to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }

    /// Read and validate an artifact from `path`.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(&bytes)
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(" | ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

struct Position(Vec3);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl fmt::Display for PackedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.bounds.center();
        let extents = self.bounds.half_extents();
        writeln!(
            f,
            "Bounds: center ({:.3}, {:.3}, {:.3}) extents ({:.3}, {:.3}, {:.3})",
            center.x, center.y, center.z, extents.x, extents.y, extents.z
        )?;
        f.write_str("Positions: ")?;
        write_joined(f, self.positions.iter().map(|p| Position(*p)))?;
        f.write_str("\nVoxel Indices: ")?;
        write_joined(f, &self.voxel_indices)?;
        f.write_str("\nFace Indices: ")?;
        write_joined(f, &self.face_indices)?;
        f.write_str("\nColor Indices: ")?;
        write_joined(f, &self.color_indices)?;
        write!(f, "\nFrames: {}", self.frame_count())?;
        f.write_str("\nIndices Start/Count: ")?;
        write_joined(
            f,
            self.instance_start
                .iter()
                .zip(&self.instance_count)
                .map(|(start, count)| format!("({start}; {count})")),
        )?;
        write!(f, "\nMax indices: {}", self.max_instance_count)
    }
}
