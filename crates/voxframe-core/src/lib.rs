//! Core types, math, and traits for voxframe.
//!
//! This crate provides the foundational types used throughout the toolkit:
//! - Grid coordinates and integer bounds
//! - The six voxel faces and their fixed enumeration order
//! - Voxel records, color indices and proxy handles
//! - Palettes and the palette-provider seam
//! - World-space bounding boxes and common error types

pub mod coords;
pub mod error;
pub mod face;
pub mod math;
pub mod palette;
pub mod types;

pub use coords::{GridBounds, GridPos};
pub use error::{Error, Result};
pub use face::{Face, FaceSet};
pub use math::Aabb;
pub use palette::{
    Palette, PaletteColor, PaletteIndex, PaletteProvider, PaletteSet, Transparency,
    TransparencyMask,
};
pub use types::{ColorIndex, ProxyId, Voxel};

/// Toolkit-wide constants
pub mod constants {
    /// Edge length of one grid cell in world units.
    pub const VOXEL_SIZE: f32 = 0.1;
    /// Inverse of [`VOXEL_SIZE`], used when converting local positions back to cells.
    pub const CELLS_PER_UNIT: f32 = 10.0;
    /// Number of faces on a voxel.
    pub const FACE_COUNT: usize = 6;
    /// Rotation snapping step applied before grid snapping, in degrees.
    pub const ROTATION_SNAP_DEGREES: f32 = 45.0;
}
