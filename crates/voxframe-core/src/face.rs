//! The six axis-aligned voxel faces.
//!
//! The enumeration order `+Y, -Z, -Y, +Z, -X, +X` is shared with the GPU side:
//! packed instance buffers are grouped face-major in this order and the
//! instancing kernel picks its per-face rotation matrix by the same index.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::coords::GridPos;

/// One of the six faces of a voxel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Face {
    /// Top face (+Y)
    PosY = 0,
    /// Back face (-Z)
    NegZ = 1,
    /// Bottom face (-Y)
    NegY = 2,
    /// Front face (+Z)
    PosZ = 3,
    /// Left face (-X)
    NegX = 4,
    /// Right face (+X)
    PosX = 5,
}

impl Face {
    /// All faces in packing order
    pub const ALL: [Self; 6] = [
        Self::PosY,
        Self::NegZ,
        Self::NegY,
        Self::PosZ,
        Self::NegX,
        Self::PosX,
    ];

    /// Face for a packing index (0..6)
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::PosY),
            1 => Some(Self::NegZ),
            2 => Some(Self::NegY),
            3 => Some(Self::PosZ),
            4 => Some(Self::NegX),
            5 => Some(Self::PosX),
            _ => None,
        }
    }

    /// Packing index of this face
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Offset to the neighbor cell across this face
    #[inline]
    pub const fn offset(self) -> GridPos {
        match self {
            Self::PosY => GridPos::new(0, 1, 0),
            Self::NegZ => GridPos::new(0, 0, -1),
            Self::NegY => GridPos::new(0, -1, 0),
            Self::PosZ => GridPos::new(0, 0, 1),
            Self::NegX => GridPos::new(-1, 0, 0),
            Self::PosX => GridPos::new(1, 0, 0),
        }
    }

    /// Outward unit normal
    #[inline]
    pub fn normal(self) -> Vec3 {
        self.offset().to_vec3()
    }

    /// The face on the other side of the cell
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosY => Self::NegY,
            Self::NegZ => Self::PosZ,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegX => Self::PosX,
            Self::PosX => Self::NegX,
        }
    }

    /// Face whose outward direction matches an integer direction, if any.
    pub fn from_offset(offset: GridPos) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.offset() == offset)
    }

    /// Single-face set
    #[inline]
    pub const fn as_set(self) -> FaceSet {
        FaceSet::from_bits_truncate(1 << self as u8)
    }
}

bitflags! {
    /// Subset of the six faces of a voxel; bit `i` is face index `i`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FaceSet: u8 {
        const POS_Y = 1 << 0;
        const NEG_Z = 1 << 1;
        const NEG_Y = 1 << 2;
        const POS_Z = 1 << 3;
        const NEG_X = 1 << 4;
        const POS_X = 1 << 5;
    }
}

impl FaceSet {
    /// Check whether a face is in the set
    #[inline]
    pub const fn has(self, face: Face) -> bool {
        self.contains(face.as_set())
    }

    /// Add a face to the set
    #[inline]
    pub fn insert_face(&mut self, face: Face) {
        self.insert(face.as_set());
    }

    /// Number of faces in the set
    #[inline]
    pub const fn count(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Faces in the set, in packing order
    pub fn faces(self) -> impl Iterator<Item = Face> {
        Face::ALL.into_iter().filter(move |face| self.has(*face))
    }
}
