//! Core voxel types.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Index of a color inside an externally owned palette.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Pod,
    Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(transparent)]
pub struct ColorIndex(pub u32);

impl ColorIndex {
    /// Index as a `usize`, for palette lookups.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ColorIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle of the visual proxy that represents a voxel in the editor.
///
/// `ProxyId::NONE` marks voxels that have no visual counterpart (headless
/// grids, fixtures, voxels decoded from an artifact before a frame adopts them).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProxyId(pub u64);

impl ProxyId {
    /// No proxy attached
    pub const NONE: Self = Self(0);

    /// Returns true if this handle refers to a proxy
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// A single occupied cell. Empty cells are not represented at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voxel {
    /// Palette color of the voxel
    pub color: ColorIndex,
    /// Visual proxy owned by this grid entry
    pub proxy: ProxyId,
}

impl Voxel {
    /// Create a voxel with no visual proxy
    #[inline]
    pub const fn new(color: ColorIndex) -> Self {
        Self {
            color,
            proxy: ProxyId::NONE,
        }
    }

    /// Create a voxel owning the given proxy handle
    #[inline]
    pub const fn with_proxy(color: ColorIndex, proxy: ProxyId) -> Self {
        Self { color, proxy }
    }
}
