//! Free transforms applied to a group of selected voxels.
//!
//! While the user drags, rotates or scales a selection the voxels leave the
//! grid lattice. A [`Selection`] tracks where each selected voxel currently
//! sits in frame-local units together with the accumulated rotation and the
//! uniform scale; [`crate::EditEngine::rescale`] turns that state back into
//! grid cells.

use glam::{Quat, Vec3};
use voxframe_core::constants::ROTATION_SNAP_DEGREES;
use voxframe_core::GridPos;

/// A selected voxel and its current continuous position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectedVoxel {
    /// Cell the voxel occupies in the grid
    pub cell: GridPos,
    /// Frame-local position after the free transform
    pub position: Vec3,
}

/// Selected voxels plus the transform applied to them.
///
/// Rotation is tracked as one axis-angle vector in degrees (direction is the
/// axis, length is the angle), which is exact for rotations about one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    voxels: Vec<SelectedVoxel>,
    rotation_degrees: Vec3,
    scale: f32,
}

impl Selection {
    /// Select cells at their lattice positions, unrotated and unscaled.
    pub fn new(cells: impl IntoIterator<Item = GridPos>) -> Self {
        let mut cells: Vec<_> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        Self {
            voxels: cells
                .into_iter()
                .map(|cell| SelectedVoxel {
                    cell,
                    position: cell.to_local_position(),
                })
                .collect(),
            rotation_degrees: Vec3::ZERO,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn voxels(&self) -> &[SelectedVoxel] {
        &self.voxels
    }

    /// Selected cells in lexicographic order.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.voxels.iter().map(|v| v.cell)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Accumulated rotation as an axis-angle vector in degrees.
    #[inline]
    pub fn rotation_degrees(&self) -> Vec3 {
        self.rotation_degrees
    }

    /// Uniform scale read off the selection.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Mean position of the selected voxels.
    pub fn center(&self) -> Vec3 {
        if self.voxels.is_empty() {
            return Vec3::ZERO;
        }
        self.voxels.iter().map(|v| v.position).sum::<Vec3>() / self.voxels.len() as f32
    }

    /// Move every selected voxel by `offset` (frame-local units).
    pub fn translate(&mut self, offset: Vec3) {
        for voxel in &mut self.voxels {
            voxel.position += offset;
        }
    }

    /// Rotate the selection about its center by an axis-angle vector in degrees.
    pub fn rotate(&mut self, axis_angle_degrees: Vec3) {
        self.rotate_about_center(axis_angle_degrees);
        self.rotation_degrees += axis_angle_degrees;
    }

    /// Set the uniform scale.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Round the accumulated rotation to the nearest snap step about its own
    /// axis, rotating positions to match.
    pub(crate) fn snap_rotation(&mut self) {
        let angle = self.rotation_degrees.length();
        if angle == 0.0 {
            return;
        }
        let axis = self.rotation_degrees / angle;
        let snapped = (angle / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES;
        self.rotate_about_center(axis * (snapped - angle));
        self.rotation_degrees = axis * snapped;
    }

    fn rotate_about_center(&mut self, axis_angle_degrees: Vec3) {
        let angle = axis_angle_degrees.length();
        if angle == 0.0 {
            return;
        }
        let rotation = Quat::from_axis_angle(axis_angle_degrees / angle, angle.to_radians());
        let center = self.center();
        for voxel in &mut self.voxels {
            voxel.position = center + rotation * (voxel.position - center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_selection_sits_on_lattice() {
        let selection = Selection::new([GridPos::X, GridPos::ZERO, GridPos::X]);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.cells().collect::<Vec<_>>(), vec![GridPos::ZERO, GridPos::X]);
        assert_relative_eq!(selection.voxels()[1].position.x, 0.1);
        assert_relative_eq!(selection.center().x, 0.05);
        assert_relative_eq!(selection.scale(), 1.0);
    }

    #[test]
    fn rotation_snaps_to_nearest_step() {
        let mut selection = Selection::new([-GridPos::X, GridPos::ZERO, GridPos::X]);
        selection.rotate(Vec3::new(0.0, 80.0, 0.0));
        selection.snap_rotation();
        assert_relative_eq!(selection.rotation_degrees().y, 90.0);

        // A quarter turn about +Y carries +X onto -Z.
        let moved = selection.voxels()[2].position;
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, -0.1, epsilon = 1e-5);
    }

    #[test]
    fn small_rotation_snaps_back_to_identity() {
        let mut selection = Selection::new([GridPos::ZERO, GridPos::Y]);
        selection.rotate(Vec3::new(0.0, 0.0, 20.0));
        selection.snap_rotation();
        assert_relative_eq!(selection.rotation_degrees().length(), 0.0);
        assert_relative_eq!(selection.voxels()[1].position.y, 0.1, epsilon = 1e-5);
        assert_relative_eq!(selection.voxels()[1].position.x, 0.0, epsilon = 1e-5);
    }
}
