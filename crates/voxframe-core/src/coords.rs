//! Integer grid coordinates and bounds.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use bytemuck::{Pod, Zeroable};
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{CELLS_PER_UNIT, VOXEL_SIZE};
use crate::math::Aabb;

/// Position of a cell on the unbounded voxel grid.
///
/// Also used for integer offsets (face directions, block offsets). Ordering is
/// lexicographic by `(x, y, z)`, which is the canonical enumeration order for
/// anything that must be deterministic.
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
#[repr(C)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    /// The grid origin.
    pub const ZERO: Self = Self::new(0, 0, 0);
    /// Unit offset along +X.
    pub const X: Self = Self::new(1, 0, 0);
    /// Unit offset along +Y.
    pub const Y: Self = Self::new(0, 1, 0);
    /// Unit offset along +Z.
    pub const Z: Self = Self::new(0, 0, 1);

    /// Create a new grid position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Create a position with the same value on every axis
    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self::new(v, v, v)
    }

    /// In-plane tangent of a direction: components rotated as `(z, x, y)`.
    #[inline]
    pub const fn tangent(self) -> Self {
        Self::new(self.z, self.x, self.y)
    }

    /// In-plane bitangent of a direction: components rotated as `(y, z, x)`.
    #[inline]
    pub const fn bitangent(self) -> Self {
        Self::new(self.y, self.z, self.x)
    }

    /// Floor division on every axis (rounds toward negative infinity).
    #[inline]
    pub const fn div_floor(self, n: i32) -> Self {
        debug_assert!(n > 0);
        Self::new(
            self.x.div_euclid(n),
            self.y.div_euclid(n),
            self.z.div_euclid(n),
        )
    }

    /// Scale every axis by `n`, or `None` on overflow.
    #[inline]
    pub fn checked_mul(self, n: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_mul(n)?,
            self.y.checked_mul(n)?,
            self.z.checked_mul(n)?,
        ))
    }

    /// Non-negative remainder on every axis, the complement of [`Self::div_floor`].
    #[inline]
    pub const fn rem_floor(self, n: i32) -> Self {
        debug_assert!(n > 0);
        Self::new(
            self.x.rem_euclid(n),
            self.y.rem_euclid(n),
            self.z.rem_euclid(n),
        )
    }

    /// Component-wise minimum
    #[inline]
    pub fn min_per_axis(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum
    #[inline]
    pub fn max_per_axis(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Convert to floating point Vec3 in grid units
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Position of this cell in frame-local world units.
    #[inline]
    pub fn to_local_position(self) -> Vec3 {
        self.to_vec3() * VOXEL_SIZE
    }

    /// Nearest cell to a frame-local position (each axis rounded to nearest).
    #[inline]
    pub fn from_local_position(local: Vec3) -> Self {
        let scaled = (local * CELLS_PER_UNIT).round();
        Self::new(scaled.x as i32, scaled.y as i32, scaled.z as i32)
    }

    /// Nearest integer direction to a (roughly axis-aligned) vector.
    #[inline]
    pub fn from_direction(direction: Vec3) -> Self {
        let rounded = direction.round();
        Self::new(rounded.x as i32, rounded.y as i32, rounded.z as i32)
    }
}

impl From<IVec3> for GridPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<GridPos> for IVec3 {
    fn from(p: GridPos) -> Self {
        p.to_ivec3()
    }
}

impl Add for GridPos {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for GridPos {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for GridPos {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for GridPos {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<i32> for GridPos {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Inclusive integer bounding box over occupied cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    /// Smallest occupied coordinate on each axis
    pub min: GridPos,
    /// Largest occupied coordinate on each axis
    pub max: GridPos,
}

impl GridBounds {
    /// Bounds covering a single cell
    #[inline]
    pub const fn from_point(pos: GridPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// Smallest bounds containing every position, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = GridPos>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::from_point(first);
        for pos in points {
            bounds.include(pos);
        }
        Some(bounds)
    }

    /// Grow the bounds to include a cell
    #[inline]
    pub fn include(&mut self, pos: GridPos) {
        self.min = self.min.min_per_axis(pos);
        self.max = self.max.max_per_axis(pos);
    }

    /// Union of two bounds
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_per_axis(other.min),
            max: self.max.max_per_axis(other.max),
        }
    }

    /// Check whether a cell lies inside the bounds
    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Number of cells spanned on each axis (`max - min + 1`).
    #[inline]
    pub fn span(&self) -> GridPos {
        self.max - self.min + GridPos::splat(1)
    }

    /// World-space box spanning `min..max + 1` cells, scaled by `voxel_size`.
    pub fn to_world_aabb(&self, voxel_size: f32) -> Aabb {
        let center = (self.min.to_vec3() + self.max.to_vec3() + Vec3::ONE) * 0.5 * voxel_size;
        let half_extents = self.span().to_vec3() * 0.5 * voxel_size;
        Aabb::from_center_half_extents(center, half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tangent_frame_is_orthogonal_to_axis_directions() {
        for dir in [GridPos::X, GridPos::Y, GridPos::Z, -GridPos::X, -GridPos::Y, -GridPos::Z] {
            let t = dir.tangent().to_ivec3();
            let b = dir.bitangent().to_ivec3();
            let d = dir.to_ivec3();
            assert_eq!(t.dot(d), 0);
            assert_eq!(b.dot(d), 0);
            assert_eq!(t.dot(b), 0);
        }
    }

    #[test]
    fn checked_mul_reports_overflow() {
        assert_eq!(GridPos::new(-3, 0, 7).checked_mul(2), Some(GridPos::new(-6, 0, 14)));
        assert_eq!(GridPos::new(0, i32::MAX / 2 + 1, 0).checked_mul(2), None);
        assert_eq!(GridPos::splat(i32::MIN).checked_mul(-1), None);
    }

    #[test]
    fn div_floor_rounds_toward_negative_infinity() {
        let pos = GridPos::new(-1, 3, -4);
        assert_eq!(pos.div_floor(2), GridPos::new(-1, 1, -2));
        assert_eq!(pos.rem_floor(2), GridPos::new(1, 1, 0));
        assert_eq!(pos.div_floor(2) * 2 + pos.rem_floor(2), pos);
    }

    #[test]
    fn local_position_roundtrip() {
        let pos = GridPos::new(12, -7, 3);
        assert_eq!(GridPos::from_local_position(pos.to_local_position()), pos);
        assert_eq!(
            GridPos::from_local_position(Vec3::new(0.149, -0.051, 0.0)),
            GridPos::new(1, -1, 0)
        );
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut cells = vec![
            GridPos::new(1, 0, 0),
            GridPos::new(0, 1, 0),
            GridPos::new(0, 0, 1),
            GridPos::new(0, 0, 0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                GridPos::new(0, 0, 0),
                GridPos::new(0, 0, 1),
                GridPos::new(0, 1, 0),
                GridPos::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn bounds_world_box_spans_one_extra_cell() {
        let bounds = GridBounds::from_points([GridPos::new(0, 0, 0), GridPos::new(1, 3, 0)]).unwrap();
        assert_eq!(bounds.span(), GridPos::new(2, 4, 1));

        let aabb = bounds.to_world_aabb(0.1);
        assert_relative_eq!(aabb.center().x, 0.1);
        assert_relative_eq!(aabb.center().y, 0.2);
        assert_relative_eq!(aabb.center().z, 0.05);
        assert_relative_eq!(aabb.half_extents().x, 0.1);
        assert_relative_eq!(aabb.half_extents().y, 0.2);
        assert_relative_eq!(aabb.half_extents().z, 0.05);
    }

    #[test]
    fn empty_points_have_no_bounds() {
        assert!(GridBounds::from_points(std::iter::empty()).is_none());
    }
}
